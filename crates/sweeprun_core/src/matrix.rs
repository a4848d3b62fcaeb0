//! Matrix builder
//!
//! Splits the declaration list into the three things an invocation is made
//! of: constant flags, positional parameters, and the swept dimensions.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{Argument, ParameterDeclaration, Position, Scalar};

/// All candidate values of one swept flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    key: String,
    arguments: Vec<Argument>,
}

impl Dimension {
    /// Build a dimension, numbering each value by its 1-based position.
    pub fn new(key: impl Into<String>, values: Vec<Scalar>) -> Result<Self, ConfigError> {
        let key = key.into();
        if values.is_empty() {
            return Err(ConfigError::EmptyDimension { key });
        }

        let total = values.len();
        let arguments = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| Argument {
                key: key.clone(),
                value,
                position: Position {
                    current: i + 1,
                    total,
                },
            })
            .collect();

        Ok(Self { key, arguments })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    /// Always false for a dimension built through [`Dimension::new`]
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }
}

/// Swept dimensions in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    dimensions: Vec<Dimension>,
}

impl Matrix {
    pub fn new(dimensions: Vec<Dimension>) -> Self {
        Self { dimensions }
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Number of dimensions
    pub fn ndim(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Length of each dimension, in declaration order
    pub fn shape(&self) -> Vec<usize> {
        self.dimensions.iter().map(Dimension::len).collect()
    }

    /// Number of combinations the matrix expands to (1 for an empty matrix)
    pub fn cardinality(&self) -> usize {
        self.dimensions.iter().map(Dimension::len).product()
    }
}

/// Output of [`build_matrix`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatrixParts {
    pub constant_flags: Vec<Argument>,
    pub positionals: Vec<String>,
    pub matrix: Matrix,
}

/// Classify declarations into constant flags, positionals and the matrix.
///
/// Duplicate keys are kept as given and show up as repeated flags.
pub fn build_matrix(declarations: &[ParameterDeclaration]) -> Result<MatrixParts, ConfigError> {
    let mut parts = MatrixParts::default();
    let mut dimensions = Vec::new();

    for declaration in declarations {
        match declaration {
            ParameterDeclaration::Positional(value) => parts.positionals.push(value.clone()),
            ParameterDeclaration::ConstantFlag { key, value } => parts
                .constant_flags
                .push(Argument::constant(key.clone(), value.clone())),
            ParameterDeclaration::SweptFlag { key, values } => {
                dimensions.push(Dimension::new(key.clone(), values.clone())?);
            }
        }
    }

    parts.matrix = Matrix::new(dimensions);
    Ok(parts)
}
