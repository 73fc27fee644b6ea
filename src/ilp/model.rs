//! 0/1 integer program for the diversity criterion.
//!
//! Cluster editing formulation: one binary variable per unordered
//! element pair ("i and j share a group"), maximizing the sum of
//! pairwise distances over same-group pairs, subject to
//!
//! - degree rows: each element shares its group with exactly
//!   `group_size - 1` others,
//! - transitivity triples: i~j and j~k imply i~k,
//! - optional forbidden pairs (preclustered elements) fixed to 0.
//!
//! The variance criterion is quadratic in the group assignment and
//! has no such formulation; callers must reject it upstream.

use crate::data::DistanceMatrix;
use crate::error::{Error, Result};

/// Row sense of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sense {
    /// Left-hand side equals the right-hand side.
    Eq,
    /// Left-hand side is at most the right-hand side.
    Le,
}

/// One row of the constraint matrix, sparse form.
#[derive(Debug, Clone)]
pub struct LinearConstraint {
    /// (pair-variable index, coefficient) terms.
    pub terms: Vec<(usize, f64)>,
    /// Row sense.
    pub sense: Sense,
    /// Right-hand side.
    pub rhs: f64,
}

/// The assembled 0/1 program.
///
/// Variables are indexed canonically over pairs `i < j`; see
/// [`IlpModel::pair_index`]. The model only *describes* the program —
/// solving happens behind the [`IlpSolver`](crate::ilp::IlpSolver)
/// boundary.
#[derive(Debug, Clone)]
pub struct IlpModel {
    n: usize,
    n_groups: usize,
    group_size: usize,
    coefficients: Vec<f64>,
    forbidden: Vec<usize>,
}

impl IlpModel {
    /// Builds the diversity program for `n_groups` equal-size groups.
    ///
    /// Requires the group count to divide the element count; the
    /// degree rows fix every group to exactly `n / n_groups` members.
    /// `forbidden_pairs` (from preclustering) are fixed to 0, which
    /// shrinks the solution space but forfeits global optimality.
    pub fn formulate(
        distances: &DistanceMatrix,
        n_groups: usize,
        forbidden_pairs: &[(usize, usize)],
    ) -> Result<Self> {
        let n = distances.len();
        if n_groups < 2 || n_groups > n {
            return Err(Error::invalid(format!(
                "group count {n_groups} outside [2, {n}]"
            )));
        }
        if n % n_groups != 0 {
            return Err(Error::invalid(format!(
                "exact method needs equal group sizes: {n_groups} does not divide {n}"
            )));
        }
        let group_size = n / n_groups;

        let mut coefficients = Vec::with_capacity(n * (n - 1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                coefficients.push(distances.get(i, j));
            }
        }

        let mut model = Self {
            n,
            n_groups,
            group_size,
            coefficients,
            forbidden: Vec::new(),
        };
        let mut forbidden = Vec::with_capacity(forbidden_pairs.len());
        for &(i, j) in forbidden_pairs {
            if i == j || i >= n || j >= n {
                return Err(Error::invalid(format!("forbidden pair ({i}, {j}) out of range")));
            }
            forbidden.push(model.pair_index(i, j));
        }
        forbidden.sort_unstable();
        forbidden.dedup();
        model.forbidden = forbidden;
        Ok(model)
    }

    /// Number of elements.
    pub fn n_elements(&self) -> usize {
        self.n
    }

    /// Number of groups the degree rows encode.
    pub fn n_groups(&self) -> usize {
        self.n_groups
    }

    /// Members per group.
    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// Number of pair variables.
    pub fn var_count(&self) -> usize {
        self.coefficients.len()
    }

    /// Canonical variable index of the unordered pair `{i, j}`.
    pub fn pair_index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i != j && i < self.n && j < self.n);
        let (a, b) = if i < j { (i, j) } else { (j, i) };
        a * (2 * self.n - a - 1) / 2 + (b - a - 1)
    }

    /// Objective coefficients (pairwise distances), maximized.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Pair variables fixed to 0 by preclustering.
    pub fn forbidden(&self) -> &[usize] {
        &self.forbidden
    }

    /// Whether the pair `{i, j}` is forbidden from sharing a group.
    pub fn is_forbidden(&self, i: usize, j: usize) -> bool {
        self.forbidden.binary_search(&self.pair_index(i, j)).is_ok()
    }

    /// Materializes the full constraint matrix in sparse rows.
    pub fn constraints(&self) -> Vec<LinearConstraint> {
        let n = self.n;
        let mut rows =
            Vec::with_capacity(n + n * (n - 1) * (n - 2) / 2 + self.forbidden.len());

        // Degree rows: each element has group_size - 1 same-group partners.
        for i in 0..n {
            let terms: Vec<(usize, f64)> = (0..n)
                .filter(|&j| j != i)
                .map(|j| (self.pair_index(i, j), 1.0))
                .collect();
            rows.push(LinearConstraint {
                terms,
                sense: Sense::Eq,
                rhs: (self.group_size - 1) as f64,
            });
        }

        // Transitivity: for each triple, sharing two edges forces the third.
        for i in 0..n {
            for j in (i + 1)..n {
                for k in (j + 1)..n {
                    let ij = self.pair_index(i, j);
                    let jk = self.pair_index(j, k);
                    let ik = self.pair_index(i, k);
                    for (a, b, c) in [(ij, jk, ik), (ij, ik, jk), (jk, ik, ij)] {
                        rows.push(LinearConstraint {
                            terms: vec![(a, 1.0), (b, 1.0), (c, -1.0)],
                            sense: Sense::Le,
                            rhs: 1.0,
                        });
                    }
                }
            }
        }

        // Preclustering: forbidden pairs are fixed to 0.
        for &v in &self.forbidden {
            rows.push(LinearConstraint {
                terms: vec![(v, 1.0)],
                sense: Sense::Eq,
                rhs: 0.0,
            });
        }

        rows
    }

    /// Number of constraint rows [`IlpModel::constraints`] produces.
    pub fn constraint_count(&self) -> usize {
        let n = self.n;
        n + n * (n - 1) * (n - 2) / 2 + self.forbidden.len()
    }

    /// Validates internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.coefficients.len() != self.n * (self.n - 1) / 2 {
            return Err(Error::invalid("coefficient vector does not match pair count"));
        }
        if let Some(&v) = self.forbidden.iter().find(|&&v| v >= self.var_count()) {
            return Err(Error::invalid(format!("forbidden variable {v} out of range")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FeatureMatrix;

    fn distances_1d(values: &[f64]) -> DistanceMatrix {
        let rows: Vec<Vec<f64>> = values.iter().map(|&v| vec![v]).collect();
        DistanceMatrix::euclidean(&FeatureMatrix::from_rows(&rows).unwrap())
    }

    #[test]
    fn test_pair_index_is_canonical_and_dense() {
        let model =
            IlpModel::formulate(&distances_1d(&[0.0, 1.0, 2.0, 3.0]), 2, &[]).unwrap();
        let mut seen = vec![false; model.var_count()];
        for i in 0..4 {
            for j in (i + 1)..4 {
                let v = model.pair_index(i, j);
                assert_eq!(v, model.pair_index(j, i));
                assert!(!seen[v], "index {v} reused");
                seen[v] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_formulate_rejects_uneven_groups() {
        let err = IlpModel::formulate(&distances_1d(&[0.0, 1.0, 2.0, 3.0, 4.0]), 2, &[]);
        assert!(err.is_err());
    }

    #[test]
    fn test_coefficients_are_distances() {
        let distances = distances_1d(&[0.0, 3.0, 7.0, 10.0]);
        let model = IlpModel::formulate(&distances, 2, &[]).unwrap();
        assert_eq!(model.coefficients()[model.pair_index(0, 2)], 7.0);
        assert_eq!(model.coefficients()[model.pair_index(1, 3)], 7.0);
    }

    #[test]
    fn test_constraint_counts() {
        let model =
            IlpModel::formulate(&distances_1d(&[0.0, 1.0, 2.0, 3.0]), 2, &[(0, 1)]).unwrap();
        let rows = model.constraints();
        // 4 degree rows + 3 * C(4,3) = 12 transitivity rows + 1 fix.
        assert_eq!(rows.len(), 17);
        assert_eq!(rows.len(), model.constraint_count());
    }

    #[test]
    fn test_degree_rows_encode_group_size() {
        let model =
            IlpModel::formulate(&distances_1d(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]), 2, &[])
                .unwrap();
        let rows = model.constraints();
        for row in rows.iter().take(6) {
            assert_eq!(row.sense, Sense::Eq);
            assert_eq!(row.rhs, 2.0);
            assert_eq!(row.terms.len(), 5);
        }
    }

    #[test]
    fn test_forbidden_pairs_deduped_and_queryable() {
        let model = IlpModel::formulate(
            &distances_1d(&[0.0, 1.0, 2.0, 3.0]),
            2,
            &[(0, 1), (1, 0)],
        )
        .unwrap();
        assert_eq!(model.forbidden().len(), 1);
        assert!(model.is_forbidden(0, 1));
        assert!(model.is_forbidden(1, 0));
        assert!(!model.is_forbidden(2, 3));
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_forbidden_pair_out_of_range() {
        let err = IlpModel::formulate(&distances_1d(&[0.0, 1.0]), 2, &[(0, 5)]);
        assert!(err.is_err());
    }
}
