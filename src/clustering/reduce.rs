//! Two-dimensional projections of the fragment distance matrix.
//!
//! PCA treats each row of the distance matrix as the feature vector of one fragment and is
//! deterministic. t-SNE consumes the distances directly and is reproducible for a fixed seed.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

const POWER_ITERATIONS: usize = 1000;
const POWER_TOLERANCE: f64 = 1e-12;
const NEGLIGIBLE: f64 = 1e-12;

/// Project rows of `data` onto its first two principal components
pub fn pca(data: &Array2<f64>) -> Array2<f64> {
    let (n, d) = data.dim();
    let mut projection = Array2::zeros((n, 2));
    if n == 0 || d == 0 {
        return projection;
    }

    let means = data.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(d));
    let centered = data - &means;
    let mut covariance = centered.t().dot(&centered) / (n.max(2) - 1) as f64;

    let mut components: Vec<Array1<f64>> = Vec::with_capacity(2);
    let mut leading_value = None;
    for component in 0..2 {
        let Some((value, vector)) = dominant_eigenpair(&covariance, &components) else {
            break;
        };
        let leading = *leading_value.get_or_insert(value);
        if value <= NEGLIGIBLE * leading.max(1.0) {
            break;
        }

        projection.column_mut(component).assign(&centered.dot(&vector));

        let column = vector.view().insert_axis(Axis(1));
        covariance = covariance - column.dot(&column.t()) * value;
        components.push(vector);
    }
    projection
}

fn norm(v: &Array1<f64>) -> f64 {
    v.dot(v).sqrt()
}

/// Largest eigenpair of a symmetric positive semi-definite matrix by power iteration,
/// kept orthogonal to `found`
fn dominant_eigenpair(matrix: &Array2<f64>, found: &[Array1<f64>]) -> Option<(f64, Array1<f64>)> {
    let orthogonalize = |v: &mut Array1<f64>| {
        for previous in found {
            let overlap = v.dot(previous);
            v.scaled_add(-overlap, previous);
        }
    };

    let start = (0..matrix.ncols()).max_by(|&a, &b| {
        let (na, nb) = (matrix.column(a).dot(&matrix.column(a)), matrix.column(b).dot(&matrix.column(b)));
        na.total_cmp(&nb)
    })?;
    let mut vector = matrix.column(start).to_owned();
    orthogonalize(&mut vector);
    let length = norm(&vector);
    if length <= NEGLIGIBLE {
        return None;
    }
    vector /= length;

    for _ in 0..POWER_ITERATIONS {
        let mut next = matrix.dot(&vector);
        orthogonalize(&mut next);
        let length = norm(&next);
        if length <= NEGLIGIBLE {
            return None;
        }
        next /= length;
        let change = (&next - &vector).mapv(f64::abs).sum();
        vector = next;
        if change < POWER_TOLERANCE {
            break;
        }
    }

    let value = vector.dot(&matrix.dot(&vector));
    if let Some(largest) = vector.iter().copied().max_by(|a, b| a.abs().total_cmp(&b.abs()))
        && largest < 0.0
    {
        vector.mapv_inplace(|x| -x);
    }
    Some((value, vector))
}

/// Parameters for exact t-SNE
#[derive(Debug, Clone, PartialEq)]
pub struct TsneParams {
    pub perplexity: f64,
    pub iterations: usize,
    /// Fixed step size; `None` scales it with the number of points
    pub learning_rate: Option<f64>,
    pub seed: u64,
}

impl Default for TsneParams {
    fn default() -> Self {
        Self { perplexity: 30.0, iterations: 500, learning_rate: None, seed: 42 }
    }
}

impl TsneParams {
    /// Step size for `n` points. Exaggerated attractions grow as `1 / n`, so a fixed rate
    /// overshoots on small corpora.
    pub fn learning_rate_for(&self, n: usize) -> f64 {
        self.learning_rate.unwrap_or(n as f64 / (4.0 * EARLY_EXAGGERATION))
    }
}

const EARLY_EXAGGERATION: f64 = 12.0;
const EXAGGERATION_ITERATIONS: usize = 100;
const MOMENTUM_SWITCH: usize = 250;
const MIN_GAIN: f64 = 0.01;
const ENTROPY_TOLERANCE: f64 = 1e-5;
const BINARY_SEARCH_STEPS: usize = 100;

/// Squared entries of a precomputed distance matrix, scaled to mean 1
fn squared_distances(distances: &Array2<f64>) -> Vec<Vec<f64>> {
    let n = distances.nrows();
    let rows: Vec<Vec<f64>> =
        distances.outer_iter().map(|row| row.iter().map(|d| d * d).collect()).collect();

    let pairs = (n * n.saturating_sub(1)).max(1) as f64;
    let mean = rows.iter().flatten().sum::<f64>() / pairs;
    if mean <= NEGLIGIBLE {
        return rows;
    }
    rows.into_iter().map(|row| row.into_iter().map(|d| d / mean).collect()).collect()
}

/// Conditional affinities of point `i` with the precision tuned to `target_entropy`
fn conditional_row(d2: &[f64], i: usize, target_entropy: f64) -> Vec<f64> {
    let shift =
        d2.iter().enumerate().filter(|&(j, _)| j != i).map(|(_, &d)| d).fold(f64::INFINITY, f64::min);
    let (mut beta, mut lower, mut upper) = (1.0_f64, 0.0_f64, f64::INFINITY);
    let mut row = vec![0.0; d2.len()];

    for _ in 0..BINARY_SEARCH_STEPS {
        let mut sum = 0.0;
        let mut weighted = 0.0;
        for (j, &d) in d2.iter().enumerate() {
            row[j] = if j == i { 0.0 } else { (-(d - shift) * beta).exp() };
            sum += row[j];
            weighted += (d - shift) * row[j];
        }
        let entropy = sum.ln() + beta * weighted / sum;
        let diff = entropy - target_entropy;
        if diff.abs() < ENTROPY_TOLERANCE {
            break;
        }
        if diff > 0.0 {
            lower = beta;
            beta = if upper.is_finite() { (beta + upper) / 2.0 } else { beta * 2.0 };
        } else {
            upper = beta;
            beta = (beta + lower) / 2.0;
        }
    }

    let sum: f64 = row.iter().sum();
    row.iter_mut().for_each(|p| *p /= sum);
    row
}

/// Standard normal sample via Box-Muller
fn gaussian(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.r#gen::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.r#gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Exact t-SNE embedding from a precomputed square distance matrix
pub fn tsne(distances: &Array2<f64>, params: &TsneParams) -> Array2<f64> {
    let n = distances.nrows();
    if n < 2 {
        return Array2::zeros((n, 2));
    }

    let perplexity = params.perplexity.min((n - 1) as f64 / 3.0).max(1.0);
    let target_entropy = perplexity.ln();
    let d2 = squared_distances(distances);
    let conditional: Vec<Vec<f64>> =
        (0..n).into_par_iter().map(|i| conditional_row(&d2[i], i, target_entropy)).collect();

    let mut p = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..n {
            p[i][j] = ((conditional[i][j] + conditional[j][i]) / (2.0 * n as f64)).max(NEGLIGIBLE);
        }
    }

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut y: Vec<[f64; 2]> =
        (0..n).map(|_| [gaussian(&mut rng) * 1e-4, gaussian(&mut rng) * 1e-4]).collect();
    let mut update = vec![[0.0_f64; 2]; n];
    let mut gains = vec![[1.0_f64; 2]; n];
    let learning_rate = params.learning_rate_for(n);

    for iteration in 0..params.iterations {
        let exaggeration = if iteration < EXAGGERATION_ITERATIONS { EARLY_EXAGGERATION } else { 1.0 };
        let momentum = if iteration < MOMENTUM_SWITCH { 0.5 } else { 0.8 };

        let kernel: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| {
                (0..n)
                    .map(|j| {
                        if i == j {
                            return 0.0;
                        }
                        let (dx, dy) = (y[i][0] - y[j][0], y[i][1] - y[j][1]);
                        1.0 / (1.0 + dx * dx + dy * dy)
                    })
                    .collect()
            })
            .collect();
        let kernel_sum = kernel.iter().map(|row| row.iter().sum::<f64>()).sum::<f64>().max(NEGLIGIBLE);

        let gradient: Vec<[f64; 2]> = (0..n)
            .into_par_iter()
            .map(|i| {
                let mut g = [0.0; 2];
                for j in 0..n {
                    let q = (kernel[i][j] / kernel_sum).max(NEGLIGIBLE);
                    let strength = (exaggeration * p[i][j] - q) * kernel[i][j];
                    g[0] += 4.0 * strength * (y[i][0] - y[j][0]);
                    g[1] += 4.0 * strength * (y[i][1] - y[j][1]);
                }
                g
            })
            .collect();

        for i in 0..n {
            for k in 0..2 {
                gains[i][k] = if (gradient[i][k] > 0.0) != (update[i][k] > 0.0) {
                    gains[i][k] + 0.2
                } else {
                    (gains[i][k] * 0.8).max(MIN_GAIN)
                };
                update[i][k] =
                    momentum * update[i][k] - learning_rate * gains[i][k] * gradient[i][k];
                y[i][k] += update[i][k];
            }
        }

        for k in 0..2 {
            let mean = y.iter().map(|point| point[k]).sum::<f64>() / n as f64;
            y.iter_mut().for_each(|point| point[k] -= mean);
        }
    }

    Array2::from_shape_fn((n, 2), |(i, k)| y[i][k])
}
