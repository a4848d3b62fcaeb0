//! Combination generator
//!
//! Expands a [`Matrix`] into every Cartesian-product combination.
//!
//! Dimensions are consumed front to back and each chosen argument is
//! prepended to the combinations produced for the remaining dimensions. The
//! result is that every combination lists its arguments in **reverse
//! declaration order**: the last-declared dimension comes first. Progress
//! columns are built from the first combination and indexed by position, so
//! this order is part of the contract and must not be normalized.
//!
//! Enumeration order is deterministic: the first-declared dimension varies
//! slowest and each dimension's values are taken in declared order.
//!
//! The full product is materialized, O(∏ len(dimension)) in time and memory.

use serde::{Deserialize, Serialize};

use crate::matrix::{Dimension, Matrix};
use crate::model::Argument;

/// One argument per dimension, last-declared dimension first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Combination {
    arguments: Vec<Argument>,
}

impl Combination {
    pub fn new(arguments: Vec<Argument>) -> Self {
        Self { arguments }
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Argument> {
        self.arguments.iter()
    }

    /// Dimension keys by column
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.arguments.iter().map(|a| a.key.as_str())
    }
}

impl<'a> IntoIterator for &'a Combination {
    type Item = &'a Argument;
    type IntoIter = std::slice::Iter<'a, Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.arguments.iter()
    }
}

/// Generate every combination of the matrix.
///
/// An empty matrix yields a single empty combination so that a sweep always
/// runs at least once.
pub fn generate(matrix: &Matrix) -> Vec<Combination> {
    let mut combinations = Vec::with_capacity(matrix.cardinality());
    let mut prefix = Vec::with_capacity(matrix.ndim());
    expand(&mut prefix, matrix.dimensions(), &mut combinations);
    combinations
}

/// `prefix` holds the chosen arguments in declaration order; the emitted
/// combination is its reversal, which is the same as prepending each choice.
fn expand<'a>(
    prefix: &mut Vec<&'a Argument>,
    remaining: &'a [Dimension],
    out: &mut Vec<Combination>,
) {
    let Some((dimension, rest)) = remaining.split_first() else {
        out.push(Combination::new(
            prefix.iter().rev().map(|&arg| arg.clone()).collect(),
        ));
        return;
    };

    for argument in dimension.arguments() {
        prefix.push(argument);
        expand(prefix, rest, out);
        prefix.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Scalar;

    fn dim(key: &str, values: &[&str]) -> Dimension {
        Dimension::new(key, values.iter().map(|v| Scalar::from(*v)).collect()).unwrap()
    }

    fn values(combination: &Combination) -> Vec<String> {
        combination.iter().map(|a| a.value.to_string()).collect()
    }

    #[test]
    fn test_empty_matrix_yields_one_empty_combination() {
        let combinations = generate(&Matrix::default());
        assert_eq!(combinations.len(), 1);
        assert!(combinations[0].is_empty());
    }

    #[test]
    fn test_single_dimension() {
        let matrix = Matrix::new(vec![dim("a", &["1", "2", "3"])]);
        let combinations = generate(&matrix);

        let all: Vec<_> = combinations.iter().map(values).collect();
        assert_eq!(all, vec![vec!["1"], vec!["2"], vec!["3"]]);
    }

    #[test]
    fn test_reverse_column_order_and_enumeration() {
        let matrix = Matrix::new(vec![dim("target", &["x86", "arm"]), dim("mode", &["debug", "release"])]);
        let combinations = generate(&matrix);

        let all: Vec<_> = combinations.iter().map(values).collect();
        assert_eq!(
            all,
            vec![
                vec!["debug", "x86"],
                vec!["release", "x86"],
                vec!["debug", "arm"],
                vec!["release", "arm"],
            ]
        );
        for combination in &combinations {
            assert_eq!(combination.keys().collect::<Vec<_>>(), vec!["mode", "target"]);
        }
    }

    #[test]
    fn test_positions_follow_values() {
        let matrix = Matrix::new(vec![dim("a", &["p", "q"]), dim("b", &["x", "y", "z"])]);
        let combinations = generate(&matrix);

        let last = combinations.last().unwrap();
        assert_eq!(last.arguments()[0].position.current, 3);
        assert_eq!(last.arguments()[0].position.total, 3);
        assert_eq!(last.arguments()[1].position.current, 2);
        assert_eq!(last.arguments()[1].position.total, 2);
    }
}
