//! Sweep plan: everything needed to run a sweep, built once up front.

use std::path::Path;

use crate::combinations::{Combination, generate};
use crate::command::{Invocation, build_invocation};
use crate::error::ConfigError;
use crate::matrix::{MatrixParts, build_matrix};
use crate::model::{Argument, ParameterDeclaration};

/// Immutable enumeration of one sweep
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPlan {
    constant_flags: Vec<Argument>,
    positionals: Vec<String>,
    combinations: Vec<Combination>,
}

impl SweepPlan {
    /// Classify the declarations and expand the matrix.
    pub fn from_declarations(declarations: &[ParameterDeclaration]) -> Result<Self, ConfigError> {
        let MatrixParts {
            constant_flags,
            positionals,
            matrix,
        } = build_matrix(declarations)?;

        Ok(Self {
            constant_flags,
            positionals,
            combinations: generate(&matrix),
        })
    }

    pub fn constant_flags(&self) -> &[Argument] {
        &self.constant_flags
    }

    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    pub fn combinations(&self) -> &[Combination] {
        &self.combinations
    }

    /// Number of invocations the sweep will make (never zero)
    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }

    /// The combination progress columns are laid out from
    pub fn first(&self) -> Option<&Combination> {
        self.combinations.first()
    }

    /// Build the invocation for one combination of this plan.
    pub fn invocation(&self, executable: &Path, combination: &Combination) -> Invocation {
        build_invocation(
            executable,
            &self.constant_flags,
            combination,
            &self.positionals,
        )
    }

    /// Every invocation of the sweep, in run order
    pub fn invocations<'a>(&'a self, executable: &'a Path) -> impl Iterator<Item = Invocation> + 'a {
        self.combinations
            .iter()
            .map(move |combination| self.invocation(executable, combination))
    }
}
