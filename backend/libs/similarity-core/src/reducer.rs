/// Truncated SVD over the term-weight matrix
///
/// Projects each record onto the top `K` right singular vectors, where
/// `K = min(target_dims, vocabulary_size)`.
use nalgebra::{DMatrix, DVector};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::SvdAlgorithm;
use crate::error::{Result, SimilarityError};
use crate::vectorizer::TermWeightMatrix;

const SVD_MAX_ITERATIONS: usize = 10_000;

/// Dense record vectors in the latent space
#[derive(Debug, Clone)]
pub struct ReducedMatrix {
    vectors: Array2<f64>,
    singular_values: Vec<f64>,
    explained_variance_ratio: Vec<f64>,
}

impl ReducedMatrix {
    pub fn vectors(&self) -> &Array2<f64> {
        &self.vectors
    }

    pub fn n_rows(&self) -> usize {
        self.vectors.nrows()
    }

    pub fn dimensions(&self) -> usize {
        self.vectors.ncols()
    }

    pub fn singular_values(&self) -> &[f64] {
        &self.singular_values
    }

    pub fn explained_variance_ratio(&self) -> &[f64] {
        &self.explained_variance_ratio
    }

    pub fn into_vectors(self) -> Array2<f64> {
        self.vectors
    }
}

pub fn reduce(
    matrix: &TermWeightMatrix,
    target_dims: usize,
    algorithm: SvdAlgorithm,
) -> Result<ReducedMatrix> {
    if target_dims == 0 {
        return Err(SimilarityError::InvalidArgument(
            "target_dims must be positive".to_string(),
        ));
    }
    if matrix.vocabulary_size() == 0 {
        return Err(SimilarityError::DegenerateCorpus {
            records: matrix.n_rows(),
        });
    }

    let k = target_dims.min(matrix.vocabulary_size());

    let (singular_values, v_t) = match algorithm {
        SvdAlgorithm::Exact => exact_svd(to_dense(matrix))?,
        SvdAlgorithm::Randomized {
            oversamples,
            power_iterations,
            seed,
        } => randomized_svd(matrix, k, oversamples, power_iterations, seed)?,
    };

    let components = top_components(&singular_values, &v_t, k);

    // Components beyond the matrix rank stay as zero columns
    let mut basis = DMatrix::<f64>::zeros(matrix.vocabulary_size(), k);
    let mut kept_values = vec![0.0; k];
    for (j, (value, direction)) in components.into_iter().enumerate() {
        kept_values[j] = value;
        basis.set_column(j, &direction);
    }

    let projected = sparse_mul(matrix, &basis);
    let vectors = Array2::from_shape_fn((projected.nrows(), k), |(i, j)| projected[(i, j)]);
    let explained_variance_ratio = explained_variance_ratio(matrix, &vectors);

    debug!(
        rows = vectors.nrows(),
        dimensions = k,
        explained = explained_variance_ratio.iter().sum::<f64>(),
        "Reduced term-weight matrix"
    );

    Ok(ReducedMatrix {
        vectors,
        singular_values: kept_values,
        explained_variance_ratio,
    })
}

fn to_dense(matrix: &TermWeightMatrix) -> DMatrix<f64> {
    let mut dense = DMatrix::<f64>::zeros(matrix.n_rows(), matrix.vocabulary_size());
    for (i, row) in matrix.rows().enumerate() {
        for &(column, weight) in row {
            dense[(i, column)] = weight;
        }
    }
    dense
}

/// `X · D` using the sparse rows of `X`
fn sparse_mul(matrix: &TermWeightMatrix, dense: &DMatrix<f64>) -> DMatrix<f64> {
    let mut out = DMatrix::<f64>::zeros(matrix.n_rows(), dense.ncols());
    for (i, row) in matrix.rows().enumerate() {
        for &(column, weight) in row {
            for j in 0..dense.ncols() {
                out[(i, j)] += weight * dense[(column, j)];
            }
        }
    }
    out
}

/// `Xᵀ · D` using the sparse rows of `X`
fn sparse_transpose_mul(matrix: &TermWeightMatrix, dense: &DMatrix<f64>) -> DMatrix<f64> {
    let mut out = DMatrix::<f64>::zeros(matrix.vocabulary_size(), dense.ncols());
    for (i, row) in matrix.rows().enumerate() {
        for &(column, weight) in row {
            for j in 0..dense.ncols() {
                out[(column, j)] += weight * dense[(i, j)];
            }
        }
    }
    out
}

fn exact_svd(x: DMatrix<f64>) -> Result<(Vec<f64>, DMatrix<f64>)> {
    let svd = x
        .try_svd(false, true, f64::EPSILON, SVD_MAX_ITERATIONS)
        .ok_or_else(|| SimilarityError::Decomposition("SVD did not converge".to_string()))?;
    let v_t = svd.v_t.ok_or_else(|| {
        SimilarityError::Decomposition("missing right singular vectors".to_string())
    })?;
    Ok((svd.singular_values.iter().copied().collect(), v_t))
}

/// Randomized range finder followed by an exact SVD of the projected matrix
///
/// Only the `samples`-column sketches are dense; `X` stays sparse.
fn randomized_svd(
    matrix: &TermWeightMatrix,
    k: usize,
    oversamples: usize,
    power_iterations: usize,
    seed: u64,
) -> Result<(Vec<f64>, DMatrix<f64>)> {
    let (n, m) = (matrix.n_rows(), matrix.vocabulary_size());
    let samples = (k + oversamples).min(n.min(m)).max(1);

    let mut rng = StdRng::seed_from_u64(seed);
    let omega = DMatrix::<f64>::from_fn(m, samples, |_, _| rng.gen_range(-1.0..1.0));

    let mut q = sparse_mul(matrix, &omega).qr().q();
    for _ in 0..power_iterations {
        let z = sparse_transpose_mul(matrix, &q).qr().q();
        q = sparse_mul(matrix, &z).qr().q();
    }

    // B = Qᵀ·X = (Xᵀ·Q)ᵀ
    let b = sparse_transpose_mul(matrix, &q).transpose();
    exact_svd(b)
}

/// Top `k` right singular vectors by descending singular value, each signed
/// so its largest-magnitude entry is positive
fn top_components(
    singular_values: &[f64],
    v_t: &DMatrix<f64>,
    k: usize,
) -> Vec<(f64, DVector<f64>)> {
    let mut order: Vec<usize> = (0..singular_values.len().min(v_t.nrows())).collect();
    order.sort_by(|&a, &b| singular_values[b].total_cmp(&singular_values[a]));

    order
        .into_iter()
        .take(k)
        .map(|idx| {
            let mut direction: DVector<f64> = v_t.row(idx).transpose();
            let pivot = direction
                .iter()
                .copied()
                .fold(0.0_f64, |acc, v| if v.abs() > acc.abs() { v } else { acc });
            if pivot < 0.0 {
                direction.neg_mut();
            }
            (singular_values[idx], direction)
        })
        .collect()
}

fn explained_variance_ratio(matrix: &TermWeightMatrix, reduced: &Array2<f64>) -> Vec<f64> {
    let n = matrix.n_rows() as f64;
    let mut sums = vec![0.0; matrix.vocabulary_size()];
    let mut squares = vec![0.0; matrix.vocabulary_size()];
    for row in matrix.rows() {
        for &(column, weight) in row {
            sums[column] += weight;
            squares[column] += weight * weight;
        }
    }
    let total: f64 = sums
        .iter()
        .zip(&squares)
        .map(|(sum, sq)| sq / n - (sum / n).powi(2))
        .sum();

    reduced
        .columns()
        .into_iter()
        .map(|c| {
            if total > 0.0 {
                variance(&c.to_vec()) / total
            } else {
                0.0
            }
        })
        .collect()
}

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}
