//! Parameter declarations
//!
//! A sweep file lists its `vars` as a mix of bare strings and single- or
//! multi-key mappings. [`VarEntry`] mirrors that shape for deserialization;
//! [`flatten_entries`] turns it into the ordered [`ParameterDeclaration`] list
//! the matrix builder consumes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Scalar;

/// One classified parameter declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterDeclaration {
    /// Appended verbatim to every invocation
    Positional(String),
    /// Included unchanged in every invocation
    ConstantFlag { key: String, value: Scalar },
    /// One matrix dimension; every value is tried
    SweptFlag { key: String, values: Vec<Scalar> },
}

impl ParameterDeclaration {
    pub fn positional(value: impl Into<String>) -> Self {
        ParameterDeclaration::Positional(value.into())
    }

    pub fn constant(key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        ParameterDeclaration::ConstantFlag {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn swept<V: Into<Scalar>>(
        key: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        ParameterDeclaration::SweptFlag {
            key: key.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Value side of a `key: value` entry in `vars`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Swept(Vec<Scalar>),
    Constant(Scalar),
}

/// One item of the `vars` list as written in a sweep file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarEntry {
    Positional(String),
    /// Keys keep document order
    Flags(IndexMap<String, FlagValue>),
}

/// Flatten file entries into declarations, preserving document order.
pub fn flatten_entries(entries: Vec<VarEntry>) -> Vec<ParameterDeclaration> {
    let mut declarations = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            VarEntry::Positional(value) => {
                declarations.push(ParameterDeclaration::Positional(value));
            }
            VarEntry::Flags(flags) => {
                declarations.extend(flags.into_iter().map(|(key, value)| match value {
                    FlagValue::Swept(values) => ParameterDeclaration::SweptFlag { key, values },
                    FlagValue::Constant(value) => ParameterDeclaration::ConstantFlag { key, value },
                }));
            }
        }
    }
    declarations
}
