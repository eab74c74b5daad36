//! Classical 4th-order Runge–Kutta. Reference-only: fixed step, no error
//! control. Also used internally by the multi-step steppers to bootstrap
//! their history.

use crate::dynamical_system::DynamicalSystem;
use crate::integrator::stepper::Stepper;

pub struct Rk4 {
    k1: Vec<f64>,
    k2: Vec<f64>,
    k3: Vec<f64>,
    k4: Vec<f64>,
    tmp: Vec<f64>,
}

impl Rk4 {
    pub fn new(n_states: usize) -> Self {
        Self {
            k1: vec![0.0; n_states],
            k2: vec![0.0; n_states],
            k3: vec![0.0; n_states],
            k4: vec![0.0; n_states],
            tmp: vec![0.0; n_states],
        }
    }

    fn step(&mut self, sys: &mut dyn DynamicalSystem, states: &mut [f64], t: f64, dt: f64) {
        let x0 = states.to_vec();

        sys.get_derivatives(&mut self.k1);

        for i in 0..x0.len() {
            self.tmp[i] = x0[i] + 0.5 * dt * self.k1[i];
        }
        sys.set_continuous_states(&self.tmp);
        sys.set_time(t + 0.5 * dt);
        sys.get_derivatives(&mut self.k2);

        for i in 0..x0.len() {
            self.tmp[i] = x0[i] + 0.5 * dt * self.k2[i];
        }
        sys.set_continuous_states(&self.tmp);
        sys.get_derivatives(&mut self.k3);

        for i in 0..x0.len() {
            self.tmp[i] = x0[i] + dt * self.k3[i];
        }
        sys.set_continuous_states(&self.tmp);
        sys.set_time(t + dt);
        sys.get_derivatives(&mut self.k4);

        for i in 0..x0.len() {
            states[i] = x0[i] + (dt / 6.0) * (self.k1[i] + 2.0 * self.k2[i] + 2.0 * self.k3[i] + self.k4[i]);
        }
        sys.set_continuous_states(states);
    }
}

impl Stepper for Rk4 {
    fn do_step(&mut self, sys: &mut dyn DynamicalSystem, states: &mut [f64], t: f64, dt: f64) -> (f64, f64) {
        self.step(sys, states, t, dt);
        (t + dt, dt)
    }

    fn do_step_const(&mut self, sys: &mut dyn DynamicalSystem, states: &mut [f64], t: f64, dt: f64) {
        self.step(sys, states, t, dt);
    }

    fn reset(&mut self) {}
}
