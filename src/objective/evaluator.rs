//! Incremental objective evaluation.
//!
//! The exchange engine's inner loop asks for the objective delta of a
//! hypothetical swap of two elements between two groups. The built-in
//! objectives answer in O(1) (diversity) or O(d) (variance family)
//! from cached per-group state; committing a swap updates that state
//! in O(N) or O(d). The custom fallback recomputes the full scalar
//! per candidate.
//!
//! Call protocol: [`Evaluator::swap_delta`] never changes observable
//! state; [`Evaluator::commit_swap`] must be called *before* the
//! caller swaps the two labels in the assignment vector.

use std::borrow::Cow;
use std::sync::Arc;

use crate::data::{Data, DistanceMatrix, FeatureMatrix};
use crate::error::{Error, Result};
use crate::objective::kplus::kplus_augment;
use crate::objective::types::{Objective, ScoringFn};

/// Stateful evaluator for one run.
pub enum Evaluator<'a> {
    /// Cluster-editing criterion with cached element↔group distance sums.
    Diversity(DiversityEval<'a>),
    /// Variance / k-plus criterion with cached per-group moments.
    Variance(VarianceEval<'a>),
    /// Opaque scoring function; no incremental support.
    Custom(CustomEval<'a>),
}

impl<'a> Evaluator<'a> {
    /// Builds the evaluator state for `assignment` over `k` groups.
    ///
    /// Fails on labels outside `[0, k)`, on empty groups, or when a
    /// feature-only objective meets distance-only data.
    pub fn new(
        data: &'a Data,
        objective: &Objective,
        assignment: &[usize],
        k: usize,
    ) -> Result<Self> {
        if assignment.len() != data.len() {
            return Err(Error::invalid(format!(
                "assignment length {} does not match data length {}",
                assignment.len(),
                data.len()
            )));
        }
        if let Some(&label) = assignment.iter().find(|&&g| g >= k) {
            return Err(Error::invalid(format!(
                "assignment label {label} outside [0, {k})"
            )));
        }
        match objective {
            Objective::Diversity => Ok(Evaluator::Diversity(DiversityEval::new(
                data.to_distances(),
                assignment,
                k,
            ))),
            Objective::Variance => {
                let features = data.features().ok_or_else(|| {
                    Error::invalid("variance objective requires feature data")
                })?;
                Ok(Evaluator::Variance(VarianceEval::new(
                    Cow::Borrowed(features),
                    assignment,
                    k,
                )?))
            }
            Objective::KPlus => {
                let features = data.features().ok_or_else(|| {
                    Error::invalid("kplus objective requires feature data")
                })?;
                Ok(Evaluator::Variance(VarianceEval::new(
                    Cow::Owned(kplus_augment(features)),
                    assignment,
                    k,
                )?))
            }
            Objective::Custom(f) => Ok(Evaluator::Custom(CustomEval::new(
                data,
                Arc::clone(f),
                assignment,
            ))),
        }
    }

    /// Current objective value.
    pub fn value(&self) -> f64 {
        match self {
            Evaluator::Diversity(e) => e.value,
            Evaluator::Variance(e) => e.value,
            Evaluator::Custom(e) => e.value,
        }
    }

    /// Objective delta of exchanging elements `i` and `j`.
    ///
    /// The assignment is passed mutably so the custom fallback can
    /// evaluate the swapped labeling in place; it is always restored
    /// before this returns.
    pub fn swap_delta(&self, assignment: &mut [usize], i: usize, j: usize) -> f64 {
        match self {
            Evaluator::Diversity(e) => e.swap_delta(assignment, i, j),
            Evaluator::Variance(e) => e.swap_delta(assignment, i, j),
            Evaluator::Custom(e) => e.swap_delta(assignment, i, j),
        }
    }

    /// Commits the exchange of `i` and `j` into the cached state.
    ///
    /// `assignment` must still hold the pre-swap labels; the caller
    /// swaps them afterwards.
    pub fn commit_swap(&mut self, assignment: &[usize], i: usize, j: usize) {
        match self {
            Evaluator::Diversity(e) => e.commit_swap(assignment, i, j),
            Evaluator::Variance(e) => e.commit_swap(assignment, i, j),
            Evaluator::Custom(e) => e.commit_swap(assignment, i, j),
        }
    }
}

/// Diversity state: `contrib[i * k + g]` is the summed distance from
/// element `i` to all current members of group `g`.
pub struct DiversityEval<'a> {
    distances: Cow<'a, DistanceMatrix>,
    contrib: Vec<f64>,
    k: usize,
    value: f64,
}

impl<'a> DiversityEval<'a> {
    fn new(distances: Cow<'a, DistanceMatrix>, assignment: &[usize], k: usize) -> Self {
        let n = assignment.len();
        let mut contrib = vec![0.0; n * k];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = distances.get(i, j);
                contrib[i * k + assignment[j]] += d;
                contrib[j * k + assignment[i]] += d;
            }
        }
        let value = 0.5
            * assignment
                .iter()
                .enumerate()
                .map(|(i, &g)| contrib[i * k + g])
                .sum::<f64>();
        Self {
            distances,
            contrib,
            k,
            value,
        }
    }

    fn swap_delta(&self, assignment: &[usize], i: usize, j: usize) -> f64 {
        let (g, h) = (assignment[i], assignment[j]);
        let k = self.k;
        self.contrib[i * k + h] + self.contrib[j * k + g]
            - self.contrib[i * k + g]
            - self.contrib[j * k + h]
            - 2.0 * self.distances.get(i, j)
    }

    fn commit_swap(&mut self, assignment: &[usize], i: usize, j: usize) {
        let delta = self.swap_delta(assignment, i, j);
        let (g, h) = (assignment[i], assignment[j]);
        let k = self.k;
        for l in 0..assignment.len() {
            let to_i = self.distances.get(l, i);
            let to_j = self.distances.get(l, j);
            self.contrib[l * k + g] += to_j - to_i;
            self.contrib[l * k + h] += to_i - to_j;
        }
        self.value += delta;
    }
}

/// Variance state: per-group coordinate sums, squared-norm totals and
/// sizes, from which each group's within-group sum of squares is
/// `sq[g] - |sums[g]|^2 / size[g]`.
pub struct VarianceEval<'a> {
    features: Cow<'a, FeatureMatrix>,
    row_sqnorm: Vec<f64>,
    sums: Vec<f64>,
    sq: Vec<f64>,
    sizes: Vec<usize>,
    ss: Vec<f64>,
    value: f64,
}

impl<'a> VarianceEval<'a> {
    fn new(features: Cow<'a, FeatureMatrix>, assignment: &[usize], k: usize) -> Result<Self> {
        let n = features.n_rows();
        let d = features.n_cols();

        let row_sqnorm: Vec<f64> = (0..n)
            .map(|i| features.row(i).iter().map(|v| v * v).sum())
            .collect();

        let mut sums = vec![0.0; k * d];
        let mut sq = vec![0.0; k];
        let mut sizes = vec![0usize; k];
        for (i, &g) in assignment.iter().enumerate() {
            for (s, &v) in sums[g * d..(g + 1) * d].iter_mut().zip(features.row(i)) {
                *s += v;
            }
            sq[g] += row_sqnorm[i];
            sizes[g] += 1;
        }
        if let Some(g) = sizes.iter().position(|&s| s == 0) {
            return Err(Error::invalid(format!("group {g} has no members")));
        }

        let ss: Vec<f64> = (0..k)
            .map(|g| sq[g] - sqnorm(&sums[g * d..(g + 1) * d]) / sizes[g] as f64)
            .collect();
        let value = ss.iter().sum();

        Ok(Self {
            features,
            row_sqnorm,
            sums,
            sq,
            sizes,
            ss,
            value,
        })
    }

    fn group_ss_after(&self, g: usize, removed: usize, added: usize) -> f64 {
        let d = self.features.n_cols();
        let out = self.features.row(removed);
        let inn = self.features.row(added);
        let sum = &self.sums[g * d..(g + 1) * d];
        let mut norm = 0.0;
        for ((&s, &o), &a) in sum.iter().zip(out).zip(inn) {
            let v = s - o + a;
            norm += v * v;
        }
        let q = self.sq[g] - self.row_sqnorm[removed] + self.row_sqnorm[added];
        q - norm / self.sizes[g] as f64
    }

    fn swap_delta(&self, assignment: &[usize], i: usize, j: usize) -> f64 {
        let (g, h) = (assignment[i], assignment[j]);
        self.group_ss_after(g, i, j) + self.group_ss_after(h, j, i) - self.ss[g] - self.ss[h]
    }

    fn commit_swap(&mut self, assignment: &[usize], i: usize, j: usize) {
        let (g, h) = (assignment[i], assignment[j]);
        let new_g = self.group_ss_after(g, i, j);
        let new_h = self.group_ss_after(h, j, i);
        let d = self.features.n_cols();
        for idx in 0..d {
            let xi = self.features.row(i)[idx];
            let xj = self.features.row(j)[idx];
            self.sums[g * d + idx] += xj - xi;
            self.sums[h * d + idx] += xi - xj;
        }
        self.sq[g] += self.row_sqnorm[j] - self.row_sqnorm[i];
        self.sq[h] += self.row_sqnorm[i] - self.row_sqnorm[j];
        self.value += new_g + new_h - self.ss[g] - self.ss[h];
        self.ss[g] = new_g;
        self.ss[h] = new_h;
    }
}

fn sqnorm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum()
}

/// Custom-objective state: the cached scalar only.
pub struct CustomEval<'a> {
    data: &'a Data,
    func: Arc<ScoringFn>,
    value: f64,
}

impl<'a> CustomEval<'a> {
    fn new(data: &'a Data, func: Arc<ScoringFn>, assignment: &[usize]) -> Self {
        let value = func(data, assignment);
        Self { data, func, value }
    }

    fn swap_delta(&self, assignment: &mut [usize], i: usize, j: usize) -> f64 {
        assignment.swap(i, j);
        let swapped = (self.func)(self.data, assignment);
        assignment.swap(i, j);
        swapped - self.value
    }

    fn commit_swap(&mut self, assignment: &[usize], i: usize, j: usize) {
        let mut next = assignment.to_vec();
        next.swap(i, j);
        self.value = (self.func)(self.data, &next);
    }
}

/// Computes the objective value of an assignment from scratch.
///
/// One-shot convenience for callers that only need the scalar; the
/// exchange engine keeps an [`Evaluator`] alive instead.
pub fn objective_value(
    data: &Data,
    objective: &Objective,
    assignment: &[usize],
    k: usize,
) -> Result<f64> {
    Ok(Evaluator::new(data, objective, assignment, k)?.value())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_d(values: &[f64]) -> Data {
        Data::Features(
            FeatureMatrix::from_rows(&values.iter().map(|&v| vec![v]).collect::<Vec<_>>())
                .unwrap(),
        )
    }

    fn naive_diversity(data: &Data, assignment: &[usize]) -> f64 {
        let distances = data.to_distances();
        let n = assignment.len();
        let mut total = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                if assignment[i] == assignment[j] {
                    total += distances.get(i, j);
                }
            }
        }
        total
    }

    fn naive_variance(features: &FeatureMatrix, assignment: &[usize], k: usize) -> f64 {
        let d = features.n_cols();
        let mut total = 0.0;
        for g in 0..k {
            let members: Vec<usize> = (0..features.n_rows())
                .filter(|&i| assignment[i] == g)
                .collect();
            let mut centroid = vec![0.0; d];
            for &i in &members {
                for (c, &v) in centroid.iter_mut().zip(features.row(i)) {
                    *c += v;
                }
            }
            for c in &mut centroid {
                *c /= members.len() as f64;
            }
            for &i in &members {
                total += features
                    .row(i)
                    .iter()
                    .zip(&centroid)
                    .map(|(&v, &c)| (v - c) * (v - c))
                    .sum::<f64>();
            }
        }
        total
    }

    #[test]
    fn test_diversity_value_matches_naive() {
        let data = one_d(&[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
        let assignment = vec![0, 0, 0, 1, 1, 1];
        let eval = Evaluator::new(&data, &Objective::Diversity, &assignment, 2).unwrap();
        assert!((eval.value() - naive_diversity(&data, &assignment)).abs() < 1e-9);
        // Low/high split: 1+1+2 per group = 4 + 4.
        assert!((eval.value() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_diversity_delta_matches_recompute() {
        let data = one_d(&[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
        let mut assignment = vec![0, 0, 0, 1, 1, 1];
        let eval = Evaluator::new(&data, &Objective::Diversity, &assignment, 2).unwrap();

        for i in 0..6 {
            for j in 0..6 {
                if assignment[i] == assignment[j] {
                    continue;
                }
                let delta = eval.swap_delta(&mut assignment, i, j);
                let mut swapped = assignment.clone();
                swapped.swap(i, j);
                let expected =
                    naive_diversity(&data, &swapped) - naive_diversity(&data, &assignment);
                assert!(
                    (delta - expected).abs() < 1e-9,
                    "delta mismatch for swap ({i}, {j}): {delta} vs {expected}"
                );
            }
        }
    }

    #[test]
    fn test_diversity_commit_keeps_state_consistent() {
        let data = one_d(&[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
        let mut assignment = vec![0, 0, 0, 1, 1, 1];
        let mut eval = Evaluator::new(&data, &Objective::Diversity, &assignment, 2).unwrap();

        eval.commit_swap(&assignment, 2, 3);
        assignment.swap(2, 3);
        assert!((eval.value() - naive_diversity(&data, &assignment)).abs() < 1e-9);

        // Deltas computed against the updated state must still agree.
        let delta = eval.swap_delta(&mut assignment, 0, 4);
        let mut swapped = assignment.clone();
        swapped.swap(0, 4);
        let expected = naive_diversity(&data, &swapped) - naive_diversity(&data, &assignment);
        assert!((delta - expected).abs() < 1e-9);
    }

    #[test]
    fn test_variance_value_matches_naive() {
        let features = FeatureMatrix::from_rows(&[
            vec![0.0, 0.0],
            vec![1.0, 1.0],
            vec![4.0, 0.0],
            vec![5.0, 3.0],
        ])
        .unwrap();
        let assignment = vec![0, 1, 0, 1];
        let expected = naive_variance(&features, &assignment, 2);
        let data = Data::Features(features);
        let eval = Evaluator::new(&data, &Objective::Variance, &assignment, 2).unwrap();
        assert!((eval.value() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_variance_delta_and_commit_match_recompute() {
        let features = FeatureMatrix::from_rows(&[
            vec![0.0, 0.0],
            vec![1.0, 2.0],
            vec![4.0, 0.0],
            vec![5.0, 3.0],
            vec![2.0, 2.0],
            vec![8.0, 1.0],
        ])
        .unwrap();
        let mut assignment = vec![0, 0, 1, 1, 2, 2];
        let data = Data::Features(features.clone());
        let mut eval = Evaluator::new(&data, &Objective::Variance, &assignment, 3).unwrap();

        let delta = eval.swap_delta(&mut assignment, 1, 2);
        let mut swapped = assignment.clone();
        swapped.swap(1, 2);
        let expected = naive_variance(&features, &swapped, 3)
            - naive_variance(&features, &assignment, 3);
        assert!((delta - expected).abs() < 1e-9);

        eval.commit_swap(&assignment, 1, 2);
        assignment.swap(1, 2);
        assert!((eval.value() - naive_variance(&features, &assignment, 3)).abs() < 1e-9);
    }

    #[test]
    fn test_variance_rejects_distance_data() {
        let data = Data::from_rows(&[vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        let err = Evaluator::new(&data, &Objective::Variance, &[0, 1], 2);
        assert!(err.is_err());
    }

    #[test]
    fn test_kplus_equals_variance_on_augmented_features() {
        let features = FeatureMatrix::from_rows(&[
            vec![0.0],
            vec![1.0],
            vec![5.0],
            vec![6.0],
        ])
        .unwrap();
        let assignment = vec![0, 1, 0, 1];

        let augmented = kplus_augment(&features);
        let expected = naive_variance(&augmented, &assignment, 2);

        let data = Data::Features(features);
        let eval = Evaluator::new(&data, &Objective::KPlus, &assignment, 2).unwrap();
        assert!((eval.value() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_custom_objective_delta_restores_assignment() {
        let data = one_d(&[0.0, 1.0, 2.0, 3.0]);
        let objective = Objective::custom(naive_diversity);
        let mut assignment = vec![0, 0, 1, 1];
        let eval = Evaluator::new(&data, &objective, &assignment, 2).unwrap();

        let delta = eval.swap_delta(&mut assignment, 1, 2);
        assert_eq!(assignment, vec![0, 0, 1, 1]);

        let builtin = Evaluator::new(&data, &Objective::Diversity, &assignment, 2).unwrap();
        let expected = builtin.swap_delta(&mut assignment, 1, 2);
        assert!((delta - expected).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_label_out_of_range() {
        let data = one_d(&[0.0, 1.0]);
        let err = Evaluator::new(&data, &Objective::Diversity, &[0, 2], 2);
        assert!(err.is_err());
    }

    #[test]
    fn test_objective_value_convenience() {
        let data = one_d(&[0.0, 1.0, 10.0, 11.0]);
        let value = objective_value(&data, &Objective::Diversity, &[0, 1, 0, 1], 2).unwrap();
        // Pairs (0,2) and (1,3): 10 + 10.
        assert!((value - 20.0).abs() < 1e-9);
    }
}
