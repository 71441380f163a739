// =============================================================================
// OEM: Orthogonalizing EM for the Lasso
// =============================================================================
//
// Solves  1/2 ‖y − Xβ‖² + λ Σ pf_j |β_j|  for tall, dense X.
//
// THE IDEA
// --------
// Pad X with extra rows so that the augmented Gram matrix becomes d·I, where
// d is the largest eigenvalue of A = X'X. With an orthogonal design the lasso
// has a closed form, so each EM step is a soft-threshold:
//
//     u   = X'y − Aβ + dβ
//     β_j = S(u_j, λ·pf_j) / d          S(z, t) = sign(z)·max(|z| − t, 0)
//
// The padding rows never need to exist: only A and X'y are used, both
// computed once at construction. Each iteration costs O(p²).
//
// =============================================================================

use ndarray::{Array1, Array2};
use sprs::CsVec;

use super::PathSolver;
use crate::convert::largest_symmetric_eigenvalue;
use crate::error::{PathError, Result};

/// Dense OEM lasso solver for problems with n > 2p.
#[derive(Debug, Clone)]
pub struct OemSolver {
    /// X'X
    gram: Array2<f64>,
    /// X'y
    xty: Array1<f64>,
    /// Largest eigenvalue of X'X
    d: f64,
    penalty_factor: Array1<f64>,
    tolerance: f64,
    lambda: f64,
    beta: Array1<f64>,
}

impl OemSolver {
    pub fn new(
        x: &Array2<f64>,
        y: &Array1<f64>,
        penalty_factor: &Array1<f64>,
        tolerance: f64,
    ) -> Result<Self> {
        let p = x.ncols();
        if y.len() != x.nrows() {
            return Err(PathError::DimensionMismatch(format!(
                "X has {} rows but y has {} elements",
                x.nrows(),
                y.len()
            )));
        }
        if penalty_factor.len() != p {
            return Err(PathError::DimensionMismatch(format!(
                "X has {} columns but penalty_factor has {} elements",
                p,
                penalty_factor.len()
            )));
        }

        let gram = x.t().dot(x);
        let xty = x.t().dot(y);
        let d = largest_symmetric_eigenvalue(gram.view())?;
        // A zero design leaves every iterate at zero for any positive d
        let d = if d > 0.0 { d } else { 1.0 };

        Ok(Self {
            gram,
            xty,
            d,
            penalty_factor: penalty_factor.clone(),
            tolerance,
            lambda: 0.0,
            beta: Array1::zeros(p),
        })
    }

    /// Current iterate as a dense vector.
    pub fn beta(&self) -> &Array1<f64> {
        &self.beta
    }

    fn step(&self) -> Array1<f64> {
        let u = &self.xty - &self.gram.dot(&self.beta) + &(&self.beta * self.d);
        Array1::from_shape_fn(u.len(), |j| {
            soft_threshold(u[j], self.lambda * self.penalty_factor[j]) / self.d
        })
    }
}

impl PathSolver for OemSolver {
    fn lambda_zero(&self) -> f64 {
        self.xty
            .iter()
            .zip(self.penalty_factor.iter())
            .filter(|(_, &pf)| pf > 0.0)
            .map(|(&c, &pf)| c.abs() / pf)
            .fold(0.0, f64::max)
    }

    fn init(&mut self, lambda: f64) {
        self.lambda = lambda;
        self.beta.fill(0.0);
    }

    fn init_warm(&mut self, lambda: f64) {
        self.lambda = lambda;
    }

    fn solve(&mut self, max_iterations: usize) -> usize {
        for iteration in 1..=max_iterations {
            let next = self.step();
            let change = l2_distance(&next, &self.beta);
            let size = l2_norm(&self.beta);
            self.beta = next;

            if change <= self.tolerance * size {
                return iteration;
            }
        }
        max_iterations
    }

    fn coefficients(&self) -> CsVec<f64> {
        let (indices, values): (Vec<usize>, Vec<f64>) = self
            .beta
            .iter()
            .enumerate()
            .filter(|(_, &b)| b != 0.0)
            .map(|(j, &b)| (j, b))
            .unzip();
        CsVec::new(self.beta.len(), indices, values)
    }
}

fn soft_threshold(z: f64, t: f64) -> f64 {
    if z > t {
        z - t
    } else if z < -t {
        z + t
    } else {
        0.0
    }
}

fn l2_norm(v: &Array1<f64>) -> f64 {
    v.dot(v).sqrt()
}

fn l2_distance(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
