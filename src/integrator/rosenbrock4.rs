//! Rosenbrock 4, a linearly-implicit 4-stage method for stiff systems.
//!
//! Classic Kaps–Rentrop/Shampine coefficients, the same ones behind
//! boost::numeric::odeint's `rosenbrock4` and Numerical Recipes' stiff-system
//! chapter. Each stage solves one linear system via
//! [`crate::integrator::linalg::solve`] instead of carrying a dense
//! linear-algebra dependency for this scope.

use crate::dynamical_system::DynamicalSystem;
use crate::integrator::{linalg, stepper::Stepper};

const GAMMA: f64 = 0.25;

const A21: f64 = 2.0;
const A31: f64 = 48.0 / 25.0;
const A32: f64 = 6.0 / 25.0;

const C21: f64 = -8.0;
const C31: f64 = 372.0 / 25.0;
const C32: f64 = 12.0 / 5.0;
const C41: f64 = -112.0 / 125.0;
const C42: f64 = -54.0 / 125.0;
const C43: f64 = -2.0 / 5.0;

const C1X: f64 = 0.5;
const C2X: f64 = -1.5;
const C3X: f64 = 121.0 / 50.0;
const C4X: f64 = 29.0 / 250.0;

const B1: f64 = 19.0 / 9.0;
const B2: f64 = 0.5;
const B3: f64 = 25.0 / 108.0;
const B4: f64 = 125.0 / 108.0;

const E1: f64 = 17.0 / 54.0;
const E2: f64 = 7.0 / 36.0;
const E3: f64 = 0.0;
const E4: f64 = 125.0 / 108.0;

const DEFAULT_TOL: f64 = 1e-6;
const MAX_RETRIES: u32 = 8;

pub struct Rosenbrock4 {
    n: usize,
    tol: f64,
}

impl Rosenbrock4 {
    pub fn new(n_states: usize, tol: Option<f64>) -> Self {
        Self {
            n: n_states,
            tol: tol.unwrap_or(DEFAULT_TOL),
        }
    }

    /// Builds the row-major matrix `(1/(gamma*h)) * I - J` for the linear
    /// solves, where `j` is the column-major Jacobian from the Dynamical
    /// System (`j[col * n + row] == df_row/dx_col`).
    fn system_matrix(&self, j: &[f64], h: f64) -> Vec<f64> {
        let n = self.n;
        let mut a = vec![0.0; n * n];
        for row in 0..n {
            for col in 0..n {
                a[row * n + col] = -j[col * n + row];
            }
            a[row * n + row] += 1.0 / (GAMMA * h);
        }
        a
    }

    fn try_step(&self, sys: &mut dyn DynamicalSystem, x0: &[f64], t: f64, h: f64) -> Option<(Vec<f64>, f64)> {
        let n = self.n;
        let mut j = vec![0.0; n * n];
        let mut dfdt = vec![0.0; n];
        if sys.provides_jacobian() {
            sys.get_jacobian(&mut j);
            let mut discard_j = vec![0.0; n * n];
            sys.get_numerical_jacobian(&mut discard_j, &mut dfdt);
        } else {
            sys.get_numerical_jacobian(&mut j, &mut dfdt);
        }

        let a = self.system_matrix(&j, h);

        sys.set_continuous_states(x0);
        sys.set_time(t);
        let mut f0 = vec![0.0; n];
        sys.get_derivatives(&mut f0);

        let rhs1: Vec<f64> = (0..n).map(|i| f0[i] + h * C1X * dfdt[i]).collect();
        let g1 = linalg::solve(a.clone(), rhs1, n)?;

        let mut x2 = vec![0.0; n];
        for i in 0..n {
            x2[i] = x0[i] + A21 * g1[i];
        }
        sys.set_continuous_states(&x2);
        let mut f1 = vec![0.0; n];
        sys.get_derivatives(&mut f1);
        let rhs2: Vec<f64> = (0..n).map(|i| f1[i] + h * C2X * dfdt[i] + C21 * g1[i] / h).collect();
        let g2 = linalg::solve(a.clone(), rhs2, n)?;

        let mut x3 = vec![0.0; n];
        for i in 0..n {
            x3[i] = x0[i] + A31 * g1[i] + A32 * g2[i];
        }
        sys.set_continuous_states(&x3);
        let mut f2 = vec![0.0; n];
        sys.get_derivatives(&mut f2);
        let rhs3: Vec<f64> = (0..n)
            .map(|i| f2[i] + h * C3X * dfdt[i] + (C31 * g1[i] + C32 * g2[i]) / h)
            .collect();
        let g3 = linalg::solve(a.clone(), rhs3, n)?;

        let mut x4 = vec![0.0; n];
        for i in 0..n {
            x4[i] = x0[i] + A31 * g1[i] + A32 * g2[i] + g3[i];
        }
        sys.set_continuous_states(&x4);
        let mut f3 = vec![0.0; n];
        sys.get_derivatives(&mut f3);
        let rhs4: Vec<f64> = (0..n)
            .map(|i| f3[i] + h * C4X * dfdt[i] + (C41 * g1[i] + C42 * g2[i] + C43 * g3[i]) / h)
            .collect();
        let g4 = linalg::solve(a, rhs4, n)?;

        let mut x_new = vec![0.0; n];
        let mut err_norm = 0.0_f64;
        for i in 0..n {
            x_new[i] = x0[i] + B1 * g1[i] + B2 * g2[i] + B3 * g3[i] + B4 * g4[i];
            let err = E1 * g1[i] + E2 * g2[i] + E3 * g3[i] + E4 * g4[i];
            let scale = self.tol + self.tol * x0[i].abs();
            err_norm = err_norm.max((err / scale).abs());
        }
        Some((x_new, err_norm))
    }
}

impl Stepper for Rosenbrock4 {
    fn do_step(&mut self, sys: &mut dyn DynamicalSystem, states: &mut [f64], t: f64, dt: f64) -> (f64, f64) {
        let x0 = states.to_vec();
        let mut trial_dt = dt;

        for _ in 0..MAX_RETRIES {
            if let Some((x_new, err)) = self.try_step(sys, &x0, t, trial_dt) {
                if err <= 1.0 || trial_dt.abs() < 1e-12 {
                    states.copy_from_slice(&x_new);
                    sys.set_continuous_states(states);
                    sys.set_time(t + trial_dt);
                    let factor = (0.9 * err.max(1e-12).powf(-0.25)).clamp(0.2, 5.0);
                    return (t + trial_dt, trial_dt * factor);
                }
                let factor = (0.9 * err.powf(-1.0 / 3.0)).clamp(0.1, 0.5);
                trial_dt *= factor;
            } else {
                // Singular system matrix: shrink and retry.
                trial_dt *= 0.5;
            }
        }

        sys.set_continuous_states(states);
        sys.set_time(t + trial_dt);
        (t + trial_dt, trial_dt)
    }

    fn do_step_const(&mut self, sys: &mut dyn DynamicalSystem, states: &mut [f64], t: f64, dt: f64) {
        let x0 = states.to_vec();
        if let Some((x_new, _err)) = self.try_step(sys, &x0, t, dt) {
            states.copy_from_slice(&x_new);
        }
        sys.set_continuous_states(states);
        sys.set_time(t + dt);
    }

    fn reset(&mut self) {}
}
