//! K-plus feature augmentation.

use crate::data::FeatureMatrix;

/// Augments a feature matrix for the k-plus criterion.
///
/// For each original column with grand mean `m`, one extra column is
/// appended holding `(x - m)^2` per row. Running the variance
/// criterion on the augmented matrix balances group means *and*
/// group standard deviations simultaneously.
pub fn kplus_augment(features: &FeatureMatrix) -> FeatureMatrix {
    let n = features.n_rows();
    let d = features.n_cols();
    let means = features.column_means();

    let mut values = Vec::with_capacity(n * d * 2);
    for i in 0..n {
        let row = features.row(i);
        values.extend_from_slice(row);
        for (j, &v) in row.iter().enumerate() {
            let dev = v - means[j];
            values.push(dev * dev);
        }
    }
    FeatureMatrix::from_parts(n, d * 2, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_augment_doubles_columns() {
        let features =
            FeatureMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 6.0]]).unwrap();
        let augmented = kplus_augment(&features);
        assert_eq!(augmented.n_rows(), 2);
        assert_eq!(augmented.n_cols(), 4);
    }

    #[test]
    fn test_augment_squared_deviations() {
        // Column means: 2.0 and 4.0.
        let features =
            FeatureMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 6.0]]).unwrap();
        let augmented = kplus_augment(&features);
        assert_eq!(augmented.row(0), &[1.0, 2.0, 1.0, 4.0]);
        assert_eq!(augmented.row(1), &[3.0, 6.0, 1.0, 4.0]);
    }

    #[test]
    fn test_augment_preserves_original_columns() {
        let features = FeatureMatrix::from_rows(&[vec![5.0], vec![7.0], vec![9.0]]).unwrap();
        let augmented = kplus_augment(&features);
        for i in 0..3 {
            assert_eq!(augmented.row(i)[0], features.row(i)[0]);
        }
    }
}
