//! Backward Differentiation Formula, fixed order 1–5, implicit multi-step.
//!
//! Modeled on SUNDIALS CVODE in BDF mode: owns its own integrator memory and
//! re-initialises on any externally-imposed state change, but uses a single
//! caller-selected order throughout a run rather than CVODE's automatic
//! order/step adaptation — a deliberate simplification (see DESIGN.md), with
//! Newton iteration on the implicit corrector using the analytic Jacobian
//! when available, the numeric one otherwise.

use std::collections::VecDeque;

use crate::dynamical_system::DynamicalSystem;
use crate::integrator::{linalg, rk4::Rk4, stepper::Stepper};

const DEFAULT_TOL: f64 = 1e-10;
const NEWTON_ITERS: u32 = 4;

/// `(alpha_0, [alpha_1..alpha_k], beta)` for `alpha_0 x_{n+1} + sum alpha_j x_{n+1-j} = h * beta * f_{n+1}`.
fn coefficients(order: usize) -> (f64, &'static [f64], f64) {
    match order {
        1 => (1.0, &[-1.0], 1.0),
        2 => (1.5, &[-2.0, 0.5], 1.0),
        3 => (11.0 / 6.0, &[-3.0, 1.5, -1.0 / 3.0], 1.0),
        4 => (25.0 / 12.0, &[-4.0, 3.0, -4.0 / 3.0, 0.25], 1.0),
        _ => (137.0 / 60.0, &[-5.0, 5.0, -10.0 / 3.0, 1.25, -0.2], 1.0),
    }
}

pub struct Bdf {
    n: usize,
    order: usize,
    tol: f64,
    history: VecDeque<Vec<f64>>,
    bootstrap: Rk4,
    step_dt: Option<f64>,
}

impl Bdf {
    pub fn new(n_states: usize, order: usize, tol: Option<f64>) -> Self {
        Self {
            n: n_states,
            order: order.clamp(1, 5),
            tol: tol.unwrap_or(DEFAULT_TOL),
            history: VecDeque::with_capacity(5),
            bootstrap: Rk4::new(n_states),
            step_dt: None,
        }
    }

    fn step(&mut self, sys: &mut dyn DynamicalSystem, states: &mut [f64], t: f64, dt: f64) {
        if self.step_dt != Some(dt) {
            self.history.clear();
            self.step_dt = Some(dt);
        }
        if self.history.is_empty() {
            self.history.push_front(states.to_vec());
        }
        if self.history.len() <= self.order {
            self.bootstrap.do_step(sys, states, t, dt);
            self.history.push_front(states.to_vec());
            if self.history.len() > self.order + 1 {
                self.history.pop_back();
            }
            return;
        }

        let n = self.n;
        let (alpha0, alphas, beta) = coefficients(self.order);

        // rhs contribution from history, independent of the unknown x_{n+1}.
        let mut const_part = vec![0.0; n];
        for (j, alpha_j) in alphas.iter().enumerate() {
            let x_j = &self.history[j];
            for i in 0..n {
                const_part[i] += alpha_j * x_j[i];
            }
        }

        let mut x = self.history[0].clone();
        for _ in 0..NEWTON_ITERS {
            sys.set_continuous_states(&x);
            sys.set_time(t + dt);
            let mut f = vec![0.0; n];
            sys.get_derivatives(&mut f);

            let mut residual = vec![0.0; n];
            for i in 0..n {
                residual[i] = alpha0 * x[i] + const_part[i] - dt * beta * f[i];
            }

            let mut j = vec![0.0; n * n];
            let mut dfdt_unused = vec![0.0; n];
            if sys.provides_jacobian() {
                sys.get_jacobian(&mut j);
            } else {
                sys.get_numerical_jacobian(&mut j, &mut dfdt_unused);
            }

            // Newton system: (alpha0 * I - h*beta*J) * dx = -residual
            let mut a = vec![0.0; n * n];
            for row in 0..n {
                for col in 0..n {
                    a[row * n + col] = -dt * beta * j[col * n + row];
                }
                a[row * n + row] += alpha0;
            }
            let neg_residual: Vec<f64> = residual.iter().map(|r| -r).collect();
            let Some(dx) = linalg::solve(a, neg_residual, n) else {
                break;
            };

            let mut max_dx = 0.0_f64;
            for i in 0..n {
                x[i] += dx[i];
                max_dx = max_dx.max(dx[i].abs());
            }
            if max_dx < self.tol {
                break;
            }
        }

        states.copy_from_slice(&x);
        sys.set_continuous_states(states);
        sys.set_time(t + dt);

        self.history.push_front(x);
        if self.history.len() > self.order + 1 {
            self.history.pop_back();
        }
    }
}

impl Stepper for Bdf {
    fn do_step(&mut self, sys: &mut dyn DynamicalSystem, states: &mut [f64], t: f64, dt: f64) -> (f64, f64) {
        self.step(sys, states, t, dt);
        (t + dt, dt)
    }

    fn do_step_const(&mut self, sys: &mut dyn DynamicalSystem, states: &mut [f64], t: f64, dt: f64) {
        self.step(sys, states, t, dt);
    }

    fn reset(&mut self) {
        self.history.clear();
        self.step_dt = None;
    }
}
