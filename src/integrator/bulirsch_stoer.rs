//! Bulirsch–Stoer extrapolation, adaptive, dense output.
//!
//! Modeled on boost::numeric::odeint's `bulirsch_stoer_dense_out`: repeated
//! modified-midpoint sub-stepping at an increasing sequence of substep
//! counts, Richardson/polynomial extrapolation of the results to estimate
//! the true solution and its error. Dense output is approximated the same
//! way as in
//! [`crate::integrator::dormand_prince`]: a cubic Hermite interpolant over
//! the last accepted step.

use crate::dynamical_system::DynamicalSystem;
use crate::integrator::stepper::Stepper;

/// Bulirsch–Stoer's classic substep sequence: 2, 4, 6, 8, 10, 12, ...
const SUBSTEPS: [usize; 7] = [2, 4, 6, 8, 10, 12, 14];

const DEFAULT_TOL: f64 = 1e-6;
const MAX_RETRIES: u32 = 6;

struct DenseCache {
    t0: f64,
    dt: f64,
    x0: Vec<f64>,
    f0: Vec<f64>,
    x1: Vec<f64>,
    f1: Vec<f64>,
}

pub struct BulirschStoer {
    n: usize,
    tol: f64,
    cache: Option<DenseCache>,
}

impl BulirschStoer {
    pub fn new(n_states: usize, tol: Option<f64>) -> Self {
        Self {
            n: n_states,
            tol: tol.unwrap_or(DEFAULT_TOL),
            cache: None,
        }
    }

    /// Modified midpoint rule: `steps` substeps of size `dt/steps` over `[t, t+dt]`.
    fn modified_midpoint(&self, sys: &mut dyn DynamicalSystem, x0: &[f64], t: f64, dt: f64, steps: usize) -> Vec<f64> {
        let n = self.n;
        let h = dt / steps as f64;

        let mut f = vec![0.0; n];
        sys.set_continuous_states(x0);
        sys.set_time(t);
        sys.get_derivatives(&mut f);

        let mut y_prev = x0.to_vec();
        let mut y = vec![0.0; n];
        for i in 0..n {
            y[i] = x0[i] + h * f[i];
        }

        for step in 1..steps {
            sys.set_continuous_states(&y);
            sys.set_time(t + step as f64 * h);
            sys.get_derivatives(&mut f);
            let mut y_next = vec![0.0; n];
            for i in 0..n {
                y_next[i] = y_prev[i] + 2.0 * h * f[i];
            }
            y_prev = y;
            y = y_next;
        }

        sys.set_continuous_states(&y);
        sys.set_time(t + dt);
        sys.get_derivatives(&mut f);
        for i in 0..n {
            y[i] = 0.5 * (y[i] + y_prev[i] + h * f[i]);
        }
        y
    }

    /// Neville-style rational/polynomial extrapolation to `steps -> infinity`
    /// given the table of estimates at each substep count so far, returning
    /// the extrapolated value and an error estimate for the last column.
    fn extrapolate(table: &[Vec<f64>], substeps: &[usize], n: usize) -> (Vec<f64>, f64) {
        let k = table.len();
        let mut tableau = table.to_vec();
        let mut err_norm = 0.0_f64;

        for col in 1..k {
            for row in (col..k).rev() {
                let factor = (substeps[row] as f64 / substeps[row - col]) * (substeps[row] as f64 / substeps[row - col]) - 1.0;
                let mut next = vec![0.0; n];
                for i in 0..n {
                    next[i] = tableau[row][i] + (tableau[row][i] - tableau[row - 1][i]) / factor.max(1e-12);
                }
                if row == k - 1 && col == k - 1 {
                    for i in 0..n {
                        err_norm = err_norm.max((next[i] - tableau[row][i]).abs());
                    }
                }
                tableau[row] = next;
            }
        }
        (tableau[k - 1].clone(), err_norm)
    }
}

impl Stepper for BulirschStoer {
    fn do_step(&mut self, sys: &mut dyn DynamicalSystem, states: &mut [f64], t: f64, dt: f64) -> (f64, f64) {
        let x0 = states.to_vec();
        let mut trial_dt = dt;

        for _ in 0..MAX_RETRIES {
            let mut table = Vec::with_capacity(SUBSTEPS.len());
            let mut err_norm = f64::INFINITY;
            let mut used = 0;
            for (idx, &steps) in SUBSTEPS.iter().enumerate() {
                let y = self.modified_midpoint(sys, &x0, t, trial_dt, steps);
                table.push(y);
                used = idx + 1;
                if used >= 2 {
                    let (_, e) = Self::extrapolate(&table, &SUBSTEPS[..used], self.n);
                    let scale = self.tol + self.tol * x0.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
                    err_norm = e / scale;
                    if err_norm <= 1.0 {
                        break;
                    }
                }
            }

            if err_norm <= 1.0 || trial_dt.abs() < 1e-12 {
                let (y_final, _) = Self::extrapolate(&table, &SUBSTEPS[..used], self.n);
                let mut f0 = vec![0.0; self.n];
                sys.set_continuous_states(&x0);
                sys.set_time(t);
                sys.get_derivatives(&mut f0);
                let mut f1 = vec![0.0; self.n];
                sys.set_continuous_states(&y_final);
                sys.set_time(t + trial_dt);
                sys.get_derivatives(&mut f1);

                self.cache = Some(DenseCache {
                    t0: t,
                    dt: trial_dt,
                    x0: x0.clone(),
                    f0,
                    x1: y_final.clone(),
                    f1,
                });

                states.copy_from_slice(&y_final);
                let factor = (0.9 * err_norm.max(1e-12).powf(-0.2)).clamp(0.2, 4.0);
                return (t + trial_dt, trial_dt * factor);
            }

            trial_dt *= 0.5;
        }

        sys.set_continuous_states(states);
        sys.set_time(t + trial_dt);
        (t + trial_dt, trial_dt)
    }

    fn do_step_const(&mut self, sys: &mut dyn DynamicalSystem, states: &mut [f64], t: f64, dt: f64) {
        let within_cache = self
            .cache
            .as_ref()
            .map(|c| t >= c.t0 - 1e-9 && (t + dt) <= c.t0 + c.dt + 1e-9)
            .unwrap_or(false);

        if within_cache {
            let cache = self.cache.as_ref().unwrap();
            let s = ((t + dt - cache.t0) / cache.dt).clamp(0.0, 1.0);
            let s2 = s * s;
            let s3 = s2 * s;
            let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
            let h10 = s3 - 2.0 * s2 + s;
            let h01 = -2.0 * s3 + 3.0 * s2;
            let h11 = s3 - s2;
            for i in 0..self.n {
                states[i] = h00 * cache.x0[i] + h10 * cache.dt * cache.f0[i] + h01 * cache.x1[i] + h11 * cache.dt * cache.f1[i];
            }
            sys.set_continuous_states(states);
            sys.set_time(t + dt);
        } else {
            let x0 = states.to_vec();
            let y = self.modified_midpoint(sys, &x0, t, dt, *SUBSTEPS.last().unwrap());
            states.copy_from_slice(&y);
            sys.set_continuous_states(states);
            sys.set_time(t + dt);
        }
    }

    fn reset(&mut self) {
        self.cache = None;
    }
}
