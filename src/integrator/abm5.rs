//! Adams–Bashforth–Moulton predictor-corrector, 5th order, fixed step.
//! Must be re-initialised (history discarded) whenever the step size
//! changes, since the Adams coefficients assume a constant step.

use std::collections::VecDeque;

use crate::dynamical_system::DynamicalSystem;
use crate::integrator::{rk4::Rk4, stepper::Stepper};

const AB5: [f64; 5] = [1901.0, -2774.0, 2616.0, -1274.0, 251.0];
const AM5: [f64; 5] = [251.0, 646.0, -264.0, 106.0, -19.0];

pub struct AdamsBashforthMoulton5 {
    n: usize,
    /// Past derivatives, most recent first. Bootstrapped with RK4 until 5
    /// deep.
    history: VecDeque<Vec<f64>>,
    bootstrap: Rk4,
    step_dt: Option<f64>,
}

impl AdamsBashforthMoulton5 {
    pub fn new(n_states: usize) -> Self {
        Self {
            n: n_states,
            history: VecDeque::with_capacity(5),
            bootstrap: Rk4::new(n_states),
            step_dt: None,
        }
    }

    fn push(&mut self, f: Vec<f64>) {
        self.history.push_front(f);
        if self.history.len() > 5 {
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

        if self.history.len() < 5 {
            self.bootstrap.do_step(sys, states, t, dt);
            let mut f_new = vec![0.0; self.n];
            sys.get_derivatives(&mut f_new);
            self.push(f_new);
            return;
        }

        let x0 = states.to_vec();
        let mut x_pred = vec![0.0; self.n];
        for i in 0..self.n {
            let sum: f64 = (0..5).map(|k| AB5[k] * self.history[k][i]).sum();
            x_pred[i] = x0[i] + (dt / 720.0) * sum;
        }

        sys.set_continuous_states(&x_pred);
        sys.set_time(t + dt);
        let mut f_pred = vec![0.0; self.n];
        sys.get_derivatives(&mut f_pred);

        let mut x_new = vec![0.0; self.n];
        for i in 0..self.n {
            let sum = AM5[0] * f_pred[i]
                + AM5[1] * self.history[0][i]
                + AM5[2] * self.history[1][i]
                + AM5[3] * self.history[2][i]
                + AM5[4] * self.history[3][i];
            x_new[i] = x0[i] + (dt / 720.0) * sum;
        }

        sys.set_continuous_states(&x_new);
        states.copy_from_slice(&x_new);

        let mut f_new = vec![0.0; self.n];
        sys.get_derivatives(&mut f_new);
        self.push(f_new);
    }
}

impl Stepper for AdamsBashforthMoulton5 {
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
