//! End-to-end integrator scenarios, run against hand-written
//! `DynamicalSystem` fixtures rather than a compiled FMU — these exercise
//! the event-bracketing/stepping contract directly, with no FFI boundary
//! in the loop.

use assert_approx_eq::assert_approx_eq;
use fmi::dynamical_system::DynamicalSystem;
use fmi::error::FmiStatus;
use fmi::integrator::{Integrator, IntegratorType};

/// ẋ = s·k, s flipping sign whenever x crosses ±1.
struct Zigzag {
    t: f64,
    x: f64,
    s: f64,
    k: f64,
    prev_g: [f64; 2],
}

impl Zigzag {
    fn new() -> Self {
        Self { t: 0.0, x: 0.0, s: 1.0, k: 1.0, prev_g: [-1.0, -1.0] }
    }

    fn indicators(&self) -> [f64; 2] {
        [self.x - 1.0, -self.x - 1.0]
    }
}

impl DynamicalSystem for Zigzag {
    fn n_states(&self) -> usize {
        1
    }
    fn n_event_indicators(&self) -> usize {
        2
    }
    fn set_time(&mut self, t: f64) -> FmiStatus {
        self.t = t;
        FmiStatus::Ok
    }
    fn get_time(&self) -> f64 {
        self.t
    }
    fn set_continuous_states(&mut self, x: &[f64]) -> FmiStatus {
        self.x = x[0];
        FmiStatus::Ok
    }
    fn get_continuous_states(&self, x: &mut [f64]) -> FmiStatus {
        x[0] = self.x;
        FmiStatus::Ok
    }
    fn get_derivatives(&mut self, dx: &mut [f64]) -> FmiStatus {
        dx[0] = self.s * self.k;
        FmiStatus::Ok
    }
    fn get_event_indicators(&mut self, g: &mut [f64]) -> FmiStatus {
        g.copy_from_slice(&self.indicators());
        FmiStatus::Ok
    }
    fn save_event_indicators(&mut self) {
        self.prev_g = self.indicators();
    }
    fn check_state_event(&mut self) -> bool {
        let g = self.indicators();
        let crossed = g.iter().zip(&self.prev_g).any(|(c, p)| c * p < 0.0);
        if crossed {
            self.s = -self.s;
        }
        crossed
    }
    fn check_step_event(&mut self) -> bool {
        false
    }
}

#[test]
fn zigzag_reaches_x_one_within_tolerance() {
    let mut sys = Zigzag::new();
    let mut integrator = Integrator::new(IntegratorType::Rk4, 1, None);
    let mut states = [0.0];
    sys.save_event_indicators();
    let info = integrator.integrate(&mut sys, &mut states, 0.0, 1.0, 0.01, 1e-6);
    assert!(info.state_event, "expected a bracketed event near t=1.0");
    assert_approx_eq!(sys.x, 1.0, 1e-4);
}

/// ẋ = sgn·k·x·(1−x), sign flipping at a precomputed switch time, per
/// the closed-form logistic solution used to check the trajectory.
struct Stiff2 {
    t: f64,
    x: f64,
    k: f64,
    t_s: f64,
}

impl Stiff2 {
    fn new() -> Self {
        let k = 100.0_f64;
        let t_s = 0.5 + (0.6_f64 / 0.4).ln() / k;
        let x0 = 1.0 / (1.0 + (k / 2.0).exp());
        Self { t: 0.0, x: x0, k, t_s }
    }

    fn sign(&self) -> f64 {
        if self.t < self.t_s {
            1.0
        } else {
            -1.0
        }
    }

    fn expected(&self, t: f64) -> f64 {
        let t_prime = t.min(2.0 * self.t_s - t);
        let e = (self.k * t_prime).exp();
        e / (1.0 + e)
    }
}

impl DynamicalSystem for Stiff2 {
    fn n_states(&self) -> usize {
        1
    }
    fn n_event_indicators(&self) -> usize {
        0
    }
    fn set_time(&mut self, t: f64) -> FmiStatus {
        self.t = t;
        FmiStatus::Ok
    }
    fn get_time(&self) -> f64 {
        self.t
    }
    fn set_continuous_states(&mut self, x: &[f64]) -> FmiStatus {
        self.x = x[0];
        FmiStatus::Ok
    }
    fn get_continuous_states(&self, x: &mut [f64]) -> FmiStatus {
        x[0] = self.x;
        FmiStatus::Ok
    }
    fn get_derivatives(&mut self, dx: &mut [f64]) -> FmiStatus {
        dx[0] = self.sign() * self.k * self.x * (1.0 - self.x);
        FmiStatus::Ok
    }
    fn get_event_indicators(&mut self, _g: &mut [f64]) -> FmiStatus {
        FmiStatus::Ok
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
fn stiff2_tracks_the_closed_form_logistic_solution() {
    let mut sys = Stiff2::new();
    let mut integrator = Integrator::new(IntegratorType::DormandPrince, 1, Some(1e-8));
    let mut states = [sys.x];
    integrator.integrate(&mut sys, &mut states, 0.0, 1.0, 1e-3, 1e-6);
    let expected = sys.expected(1.0);
    assert_approx_eq!(sys.x, expected, 1e-2);
}

/// Robertson's classic three-species stiff chemical kinetics problem.
struct Robertson {
    t: f64,
    y: [f64; 3],
}

impl Robertson {
    fn new() -> Self {
        Self { t: 0.0, y: [1.0, 0.0, 0.0] }
    }
}

impl DynamicalSystem for Robertson {
    fn n_states(&self) -> usize {
        3
    }
    fn n_event_indicators(&self) -> usize {
        0
    }
    fn set_time(&mut self, t: f64) -> FmiStatus {
        self.t = t;
        FmiStatus::Ok
    }
    fn get_time(&self) -> f64 {
        self.t
    }
    fn set_continuous_states(&mut self, x: &[f64]) -> FmiStatus {
        self.y.copy_from_slice(x);
        FmiStatus::Ok
    }
    fn get_continuous_states(&self, x: &mut [f64]) -> FmiStatus {
        x.copy_from_slice(&self.y);
        FmiStatus::Ok
    }
    fn get_derivatives(&mut self, dx: &mut [f64]) -> FmiStatus {
        let [x, y, z] = self.y;
        dx[0] = -0.04 * x + 1.0e4 * y * z;
        dx[1] = 0.04 * x - 1.0e4 * y * z - 3.0e7 * y * y;
        dx[2] = 3.0e7 * y * y;
        FmiStatus::Ok
    }
    fn get_event_indicators(&mut self, _g: &mut [f64]) -> FmiStatus {
        FmiStatus::Ok
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
fn robertson_matches_reference_trajectory_with_a_stiff_stepper() {
    let mut sys = Robertson::new();
    let mut integrator = Integrator::new(IntegratorType::Bdf { order: 5 }, 3, Some(1e-10));
    let mut states = sys.y;
    integrator.integrate(&mut sys, &mut states, 0.0, 100.0, 0.1, 1e-6);
    assert_approx_eq!(sys.y[0], 0.6172349, 1e-4);
}
