//! Input data representations.
//!
//! A run works on exactly one of two representations: an N×d feature
//! table ([`FeatureMatrix`]) or an N×N symmetric dissimilarity matrix
//! ([`DistanceMatrix`]). Both are validated once at construction and
//! immutable for the duration of a run; all working storage is owned
//! by the run and released when it returns.

use std::borrow::Cow;

use crate::error::{Error, Result};

/// Tolerance used when checking symmetry and zero diagonals.
const DETECT_EPS: f64 = 1e-9;

/// An N×d feature table, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    n: usize,
    d: usize,
    values: Vec<f64>,
}

impl FeatureMatrix {
    /// Builds a feature matrix from per-element rows.
    ///
    /// All rows must have the same positive length and every value
    /// must be finite.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::invalid("feature table has no rows"));
        }
        let d = rows[0].len();
        if d == 0 {
            return Err(Error::invalid("feature table has no columns"));
        }
        let mut values = Vec::with_capacity(rows.len() * d);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != d {
                return Err(Error::invalid(format!(
                    "row {i} has {} columns, expected {d}",
                    row.len()
                )));
            }
            for &v in row {
                if !v.is_finite() {
                    return Err(Error::invalid(format!("non-finite value in row {i}")));
                }
                values.push(v);
            }
        }
        Ok(Self {
            n: rows.len(),
            d,
            values,
        })
    }

    /// Internal constructor for already-validated storage.
    pub(crate) fn from_parts(n: usize, d: usize, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), n * d);
        Self { n, d, values }
    }

    /// Number of elements (rows).
    pub fn n_rows(&self) -> usize {
        self.n
    }

    /// Feature dimensionality (columns).
    pub fn n_cols(&self) -> usize {
        self.d
    }

    /// The feature vector of element `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.d..(i + 1) * self.d]
    }

    /// Column means across all rows (the grand mean vector).
    pub fn column_means(&self) -> Vec<f64> {
        let mut means = vec![0.0; self.d];
        for i in 0..self.n {
            for (m, &v) in means.iter_mut().zip(self.row(i)) {
                *m += v;
            }
        }
        for m in &mut means {
            *m /= self.n as f64;
        }
        means
    }
}

/// An N×N symmetric dissimilarity matrix with a zero diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// Builds a distance matrix from a square table.
    ///
    /// The table must be symmetric (within a small tolerance), have a
    /// zero diagonal, and contain only finite non-negative values.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n = rows.len();
        if n == 0 {
            return Err(Error::invalid("distance matrix has no rows"));
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(Error::invalid(format!(
                    "distance matrix row {i} has {} entries, expected {n}",
                    row.len()
                )));
            }
        }
        let mut values = vec![0.0; n * n];
        for i in 0..n {
            if rows[i][i].abs() > DETECT_EPS {
                return Err(Error::invalid(format!("non-zero diagonal at ({i}, {i})")));
            }
            for j in 0..n {
                let v = rows[i][j];
                if !v.is_finite() || v < 0.0 {
                    return Err(Error::invalid(format!(
                        "distance ({i}, {j}) must be finite and non-negative"
                    )));
                }
                if (v - rows[j][i]).abs() > DETECT_EPS {
                    return Err(Error::invalid(format!("asymmetric entries at ({i}, {j})")));
                }
                // Store the symmetrized value so both triangles agree exactly.
                values[i * n + j] = 0.5 * (v + rows[j][i]);
            }
        }
        for i in 0..n {
            values[i * n + i] = 0.0;
        }
        Ok(Self { n, values })
    }

    /// Derives the Euclidean distance matrix of a feature table.
    pub fn euclidean(features: &FeatureMatrix) -> Self {
        let n = features.n_rows();
        let mut values = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let dist = euclidean_distance(features.row(i), features.row(j));
                values[i * n + j] = dist;
                values[j * n + i] = dist;
            }
        }
        Self { n, values }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Whether the matrix is empty.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// The dissimilarity between elements `i` and `j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n + j]
    }

    /// Sum of dissimilarities from element `i` to every other element.
    ///
    /// Used by the matching generator's extreme-first ordering.
    pub fn total_distance(&self, i: usize) -> f64 {
        self.values[i * self.n..(i + 1) * self.n].iter().sum()
    }
}

/// Euclidean distance between two equally-sized vectors.
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// The active data representation for a run.
#[derive(Debug, Clone)]
pub enum Data {
    /// Raw feature vectors; distances are derived on demand.
    Features(FeatureMatrix),
    /// A precomputed dissimilarity matrix.
    Distances(DistanceMatrix),
}

impl Data {
    /// Builds a [`Data`] value from a raw table, auto-detecting the
    /// representation: a square, symmetric table with a zero diagonal
    /// is treated as a distance matrix, anything else as features.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        if looks_like_distances(rows) {
            Ok(Data::Distances(DistanceMatrix::from_rows(rows)?))
        } else {
            Ok(Data::Features(FeatureMatrix::from_rows(rows)?))
        }
    }

    /// Number of elements described by this data.
    pub fn len(&self) -> usize {
        match self {
            Data::Features(f) => f.n_rows(),
            Data::Distances(d) => d.len(),
        }
    }

    /// Whether the data describes zero elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The feature table, if this run carries one.
    pub fn features(&self) -> Option<&FeatureMatrix> {
        match self {
            Data::Features(f) => Some(f),
            Data::Distances(_) => None,
        }
    }

    /// A dissimilarity matrix for this data: borrowed when one was
    /// supplied, derived via Euclidean distance otherwise.
    pub fn to_distances(&self) -> Cow<'_, DistanceMatrix> {
        match self {
            Data::Features(f) => Cow::Owned(DistanceMatrix::euclidean(f)),
            Data::Distances(d) => Cow::Borrowed(d),
        }
    }
}

fn looks_like_distances(rows: &[Vec<f64>]) -> bool {
    let n = rows.len();
    if n == 0 || rows.iter().any(|r| r.len() != n) {
        return false;
    }
    for i in 0..n {
        if rows[i][i].abs() > DETECT_EPS {
            return false;
        }
        for j in (i + 1)..n {
            if (rows[i][j] - rows[j][i]).abs() > DETECT_EPS || rows[i][j] < 0.0 {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_matrix_from_rows() {
        let m = FeatureMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.n_rows(), 2);
        assert_eq!(m.n_cols(), 2);
        assert_eq!(m.row(1), &[3.0, 4.0]);
    }

    #[test]
    fn test_feature_matrix_rejects_ragged_rows() {
        let err = FeatureMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]);
        assert!(err.is_err());
    }

    #[test]
    fn test_feature_matrix_rejects_nan() {
        let err = FeatureMatrix::from_rows(&[vec![1.0, f64::NAN]]);
        assert!(err.is_err());
    }

    #[test]
    fn test_column_means() {
        let m = FeatureMatrix::from_rows(&[vec![1.0, 10.0], vec![3.0, 20.0]]).unwrap();
        assert_eq!(m.column_means(), vec![2.0, 15.0]);
    }

    #[test]
    fn test_distance_matrix_validation() {
        let ok = DistanceMatrix::from_rows(&[
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, 3.0],
            vec![2.0, 3.0, 0.0],
        ]);
        assert!(ok.is_ok());

        let asym = DistanceMatrix::from_rows(&[vec![0.0, 1.0], vec![2.0, 0.0]]);
        assert!(asym.is_err());

        let diag = DistanceMatrix::from_rows(&[vec![1.0, 1.0], vec![1.0, 0.0]]);
        assert!(diag.is_err());

        let negative = DistanceMatrix::from_rows(&[vec![0.0, -1.0], vec![-1.0, 0.0]]);
        assert!(negative.is_err());
    }

    #[test]
    fn test_euclidean_derivation() {
        let features = FeatureMatrix::from_rows(&[vec![0.0, 0.0], vec![3.0, 4.0]]).unwrap();
        let distances = DistanceMatrix::euclidean(&features);
        assert!((distances.get(0, 1) - 5.0).abs() < 1e-12);
        assert_eq!(distances.get(0, 0), 0.0);
        assert_eq!(distances.get(1, 0), distances.get(0, 1));
    }

    #[test]
    fn test_total_distance() {
        let d = DistanceMatrix::from_rows(&[
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, 4.0],
            vec![2.0, 4.0, 0.0],
        ])
        .unwrap();
        assert!((d.total_distance(0) - 3.0).abs() < 1e-12);
        assert!((d.total_distance(2) - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_data_detection_distances() {
        let data = Data::from_rows(&[
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, 3.0],
            vec![2.0, 3.0, 0.0],
        ])
        .unwrap();
        assert!(matches!(data, Data::Distances(_)));
    }

    #[test]
    fn test_data_detection_features() {
        // Square but not symmetric with zero diagonal: a feature table.
        let data = Data::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert!(matches!(data, Data::Features(_)));
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn test_data_to_distances_borrows_supplied_matrix() {
        let data = Data::from_rows(&[vec![0.0, 2.0], vec![2.0, 0.0]]).unwrap();
        match data.to_distances() {
            Cow::Borrowed(d) => assert_eq!(d.get(0, 1), 2.0),
            Cow::Owned(_) => panic!("supplied matrix should be borrowed"),
        }
    }
}
