//! Adams–Moulton predictor-corrector, non-stiff, fixed order.
//!
//! Carries real Adams–Bashforth/Moulton coefficient tables for orders 1–5
//! and clamps any higher requested order down to 5 — a deliberate
//! simplification recorded in DESIGN.md rather than a silent truncation.

use std::collections::VecDeque;

use crate::dynamical_system::DynamicalSystem;
use crate::integrator::{rk4::Rk4, stepper::Stepper};

const DEFAULT_TOL: f64 = 1e-10;

fn ab_coefficients(order: usize) -> (&'static [f64], f64) {
    match order {
        1 => (&[1.0], 1.0),
        2 => (&[3.0, -1.0], 2.0),
        3 => (&[23.0, -16.0, 5.0], 12.0),
        4 => (&[55.0, -59.0, 37.0, -9.0], 24.0),
        _ => (&[1901.0, -2774.0, 2616.0, -1274.0, 251.0], 720.0),
    }
}

fn am_coefficients(order: usize) -> (&'static [f64], f64) {
    match order {
        1 => (&[1.0], 1.0),
        2 => (&[1.0, 1.0], 2.0),
        3 => (&[5.0, 8.0, -1.0], 12.0),
        4 => (&[9.0, 19.0, -5.0, 1.0], 24.0),
        _ => (&[251.0, 646.0, -264.0, 106.0, -19.0], 720.0),
    }
}

pub struct AdamsMoulton {
    n: usize,
    order: usize,
    _tol: f64,
    history: VecDeque<Vec<f64>>,
    bootstrap: Rk4,
    step_dt: Option<f64>,
}

impl AdamsMoulton {
    pub fn new(n_states: usize, order: usize, tol: Option<f64>) -> Self {
        Self {
            n: n_states,
            order: order.clamp(1, 5),
            _tol: tol.unwrap_or(DEFAULT_TOL),
            history: VecDeque::with_capacity(5),
            bootstrap: Rk4::new(n_states),
            step_dt: None,
        }
    }

    fn push(&mut self, f: Vec<f64>) {
        self.history.push_front(f);
        if self.history.len() > self.order {
            self.history.pop_back();
        }
    }

    fn step(&mut self, sys: &mut dyn DynamicalSystem, states: &mut [f64], t: f64, dt: f64) {
        if self.step_dt != Some(dt) {
            self.history.clear();
            self.step_dt = Some(dt);
        }
        if self.history.is_empty() {
            let mut f0 = vec![0.0; self.n];
            sys.get_derivatives(&mut f0);
            self.push(f0);
        }
        if self.history.len() < self.order {
            self.bootstrap.do_step(sys, states, t, dt);
            let mut f_new = vec![0.0; self.n];
            sys.get_derivatives(&mut f_new);
            self.push(f_new);
            return;
        }

        let x0 = states.to_vec();
        let (ab, ab_denom) = ab_coefficients(self.order);
        let (am, am_denom) = am_coefficients(self.order);

        let mut x_pred = vec![0.0; self.n];
        for i in 0..self.n {
            let sum: f64 = ab.iter().zip(self.history.iter()).map(|(c, f)| c * f[i]).sum();
            x_pred[i] = x0[i] + (dt / ab_denom) * sum;
        }

        sys.set_continuous_states(&x_pred);
        sys.set_time(t + dt);
        let mut f_pred = vec![0.0; self.n];
        sys.get_derivatives(&mut f_pred);

        let mut x_new = vec![0.0; self.n];
        for i in 0..self.n {
            let mut sum = am[0] * f_pred[i];
            for (k, c) in am.iter().enumerate().skip(1) {
                sum += c * self.history[k - 1][i];
            }
            x_new[i] = x0[i] + (dt / am_denom) * sum;
        }

        sys.set_continuous_states(&x_new);
        states.copy_from_slice(&x_new);

        let mut f_new = vec![0.0; self.n];
        sys.get_derivatives(&mut f_new);
        self.push(f_new);
    }
}

impl Stepper for AdamsMoulton {
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
