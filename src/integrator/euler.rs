//! Explicit Euler. Reference-only: first order, no error control.
//!
//! Uses the `Stepper` trait's explicit `do_step`/`do_step_const` split.

use crate::dynamical_system::DynamicalSystem;
use crate::integrator::stepper::Stepper;

pub struct Euler {
    dx: Vec<f64>,
}

impl Euler {
    pub fn new(n_states: usize) -> Self {
        Self { dx: vec![0.0; n_states] }
    }

    fn step(&mut self, sys: &mut dyn DynamicalSystem, states: &mut [f64], dt: f64) {
        sys.get_derivatives(&mut self.dx);
        for (x, dx) in states.iter_mut().zip(self.dx.iter()) {
            *x += dx * dt;
        }
    }
}

impl Stepper for Euler {
    fn do_step(&mut self, sys: &mut dyn DynamicalSystem, states: &mut [f64], t: f64, dt: f64) -> (f64, f64) {
        self.step(sys, states, dt);
        (t + dt, dt)
    }

    fn do_step_const(&mut self, sys: &mut dyn DynamicalSystem, states: &mut [f64], _t: f64, dt: f64) {
        self.step(sys, states, dt);
    }

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Decay {
        t: f64,
        x: f64,
    }

    impl DynamicalSystem for Decay {
        fn n_states(&self) -> usize {
            1
        }
        fn n_event_indicators(&self) -> usize {
            0
        }
        fn set_time(&mut self, t: f64) -> crate::error::FmiStatus {
            self.t = t;
            crate::error::FmiStatus::Ok
        }
        fn get_time(&self) -> f64 {
            self.t
        }
        fn set_continuous_states(&mut self, x: &[f64]) -> crate::error::FmiStatus {
            self.x = x[0];
            crate::error::FmiStatus::Ok
        }
        fn get_continuous_states(&self, x: &mut [f64]) -> crate::error::FmiStatus {
            x[0] = self.x;
            crate::error::FmiStatus::Ok
        }
        fn get_derivatives(&mut self, dx: &mut [f64]) -> crate::error::FmiStatus {
            dx[0] = 1.0;
            crate::error::FmiStatus::Ok
        }
        fn get_event_indicators(&mut self, _g: &mut [f64]) -> crate::error::FmiStatus {
            crate::error::FmiStatus::Ok
        }
        fn save_event_indicators(&mut self) {}
        fn check_state_event(&mut self) -> bool {
            false
        }
        fn check_step_event(&mut self) -> bool {
            false
        }
    }

    #[test]
    fn single_step_matches_linear_slope() {
        let mut sys = Decay { t: 0.0, x: 0.0 };
        let mut euler = Euler::new(1);
        let mut states = [0.0];
        let (t, _) = euler.do_step(&mut sys, &mut states, 0.0, 1.0);
        assert_eq!(t, 1.0);
        assert_eq!(states[0], 1.0);
    }
}
