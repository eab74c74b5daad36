//! Thin coordinator around one [`Stepper`] and a back-pointer to a
//! [`crate::dynamical_system::DynamicalSystem`]. Owns the event-bracketing
//! and bisection loop described in the original `Integrator::integrate`.

pub mod abm5;
pub mod adams_moulton;
pub mod bdf;
pub mod bulirsch_stoer;
pub mod cash_karp;
pub mod dormand_prince;
pub mod euler;
pub mod fehlberg78;
pub mod linalg;
pub mod rk4;
pub mod rosenbrock4;
pub mod stepper;

pub use stepper::{EventInfo, Stepper};

use crate::dynamical_system::DynamicalSystem;

/// Which integration method to construct, and with what parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntegratorType {
    Euler,
    Rk4,
    AdamsBashforthMoulton5,
    CashKarp,
    DormandPrince,
    Fehlberg78,
    BulirschStoer,
    Rosenbrock4,
    Bdf { order: usize },
    AdamsMoulton { order: usize },
}

/// Integrator configuration and what the last `set_properties` call
/// actually applied — tolerances may have been replaced by the stepper's
/// own defaults, or by +infinity for non-adaptive steppers.
#[derive(Debug, Clone, Copy)]
pub struct Properties {
    pub kind: IntegratorType,
    pub name: &'static str,
    pub order: u32,
    pub abstol: f64,
    pub reltol: f64,
}

impl Properties {
    fn non_adaptive(kind: IntegratorType, name: &'static str, order: u32) -> Self {
        Self {
            kind,
            name,
            order,
            abstol: f64::INFINITY,
            reltol: f64::INFINITY,
        }
    }
}

fn build_stepper(kind: IntegratorType, n_states: usize, abstol: Option<f64>) -> (Box<dyn Stepper>, Properties) {
    match kind {
        IntegratorType::Euler => (
            Box::new(euler::Euler::new(n_states)),
            Properties::non_adaptive(kind, "Euler", 1),
        ),
        IntegratorType::Rk4 => (
            Box::new(rk4::Rk4::new(n_states)),
            Properties::non_adaptive(kind, "RungeKutta", 4),
        ),
        IntegratorType::AdamsBashforthMoulton5 => (
            Box::new(abm5::AdamsBashforthMoulton5::new(n_states)),
            Properties::non_adaptive(kind, "AdamsBashforthMoulton", 5),
        ),
        IntegratorType::CashKarp => {
            let tol = abstol.unwrap_or(1e-6);
            (
                Box::new(cash_karp::CashKarp::new(n_states, Some(tol))),
                Properties { kind, name: "CashKarp", order: 5, abstol: tol, reltol: tol },
            )
        }
        IntegratorType::DormandPrince => {
            let tol = abstol.unwrap_or(1e-6);
            (
                Box::new(dormand_prince::DormandPrince5::new(n_states, Some(tol))),
                Properties { kind, name: "DormandPrince", order: 5, abstol: tol, reltol: tol },
            )
        }
        IntegratorType::Fehlberg78 => {
            let tol = abstol.unwrap_or(1e-6);
            (
                Box::new(fehlberg78::Fehlberg78::new(n_states, Some(tol))),
                Properties { kind, name: "Fehlberg", order: 8, abstol: tol, reltol: tol },
            )
        }
        IntegratorType::BulirschStoer => {
            let tol = abstol.unwrap_or(1e-6);
            (
                Box::new(bulirsch_stoer::BulirschStoer::new(n_states, Some(tol))),
                Properties { kind, name: "Bulirsch Stoer", order: 0, abstol: tol, reltol: tol },
            )
        }
        IntegratorType::Rosenbrock4 => {
            let tol = abstol.unwrap_or(1e-6);
            (
                Box::new(rosenbrock4::Rosenbrock4::new(n_states, Some(tol))),
                Properties { kind, name: "Rosenbrock", order: 4, abstol: tol, reltol: tol },
            )
        }
        IntegratorType::Bdf { order } => {
            let tol = abstol.unwrap_or(1e-10);
            (
                Box::new(bdf::Bdf::new(n_states, order, Some(tol))),
                Properties { kind, name: "BDF", order: order.clamp(1, 5) as u32, abstol: tol, reltol: tol },
            )
        }
        IntegratorType::AdamsMoulton { order } => {
            let tol = abstol.unwrap_or(1e-10);
            (
                Box::new(adams_moulton::AdamsMoulton::new(n_states, order, Some(tol))),
                Properties { kind, name: "ABM2", order: order.clamp(1, 5) as u32, abstol: tol, reltol: tol },
            )
        }
    }
}

/// Floor below which the bisection half-width `eps` passed to [`Integrator::integrate`]
/// is clamped, since the bisection loop never terminates in finite steps
/// once `eps` drops near machine epsilon relative to typical event times.
const MIN_EVENT_SEARCH_EPS: f64 = 1e-12;

pub struct Integrator {
    stepper: Box<dyn Stepper>,
    properties: Properties,
    n_states: usize,
    warned_eps_clamp: bool,
}

impl Integrator {
    pub fn new(kind: IntegratorType, n_states: usize, abstol: Option<f64>) -> Self {
        let (stepper, properties) = build_stepper(kind, n_states, abstol);
        Self { stepper, properties, n_states, warned_eps_clamp: false }
    }

    /// Replaces the current stepper with a freshly constructed one,
    /// discarding any stepping history the old one held.
    pub fn set_properties(&mut self, kind: IntegratorType, abstol: Option<f64>) {
        let (stepper, properties) = build_stepper(kind, self.n_states, abstol);
        self.stepper = stepper;
        self.properties = properties;
    }

    pub fn get_properties(&self) -> Properties {
        self.properties
    }

    /// The event-bracketing loop: runs the stepper to `t0 + delta_t`, then
    /// bisects any detected state-event bracket down to width `eps`.
    pub fn integrate(
        &mut self,
        sys: &mut dyn DynamicalSystem,
        states: &mut [f64],
        t0: f64,
        delta_t: f64,
        dt: f64,
        eps: f64,
    ) -> EventInfo {
        let eps = if eps < MIN_EVENT_SEARCH_EPS {
            if !self.warned_eps_clamp {
                log::warn!(
                    target: "fmi",
                    "event search precision {eps} is below the {MIN_EVENT_SEARCH_EPS} floor; clamping"
                );
                self.warned_eps_clamp = true;
            }
            MIN_EVENT_SEARCH_EPS
        } else {
            eps
        };

        let mut backup = states.to_vec();
        let mut info = self.stepper.invoke_method(sys, states, t0, delta_t, dt);

        if !info.state_event {
            return info;
        }

        // If the stepper overshot the requested horizon before detecting the
        // sign change, narrow the bracket back onto [t0, t0+delta_t] first.
        let t_end = t0 + delta_t;
        if info.t_upper > t_end {
            self.stepper.do_step_const(sys, &mut backup, info.t_lower, t_end - info.t_lower);
            if sys.check_state_event() {
                info.t_upper = t_end;
            } else {
                backup.copy_from_slice(states);
                info.t_lower = t_end;
            }
        }

        let mut t_lower = info.t_lower;
        let mut t_upper = info.t_upper;
        let mut left_state = backup;

        while (t_upper - t_lower) > eps / 2.0 {
            let mid = t_lower + (t_upper - t_lower) / 2.0;
            let mut probe = left_state.clone();
            self.stepper.do_step_const(sys, &mut probe, t_lower, mid - t_lower);
            sys.set_continuous_states(&probe);
            sys.set_time(mid);

            if !sys.check_state_event() {
                left_state = probe;
                t_lower = mid;
            } else {
                sys.set_continuous_states(&left_state);
                sys.set_time(t_lower);
                self.stepper.reset();
                t_upper = mid;
            }
        }

        t_upper += eps / 8.0;
        states.copy_from_slice(&left_state);
        sys.set_continuous_states(states);
        sys.set_time(t_lower);

        EventInfo {
            state_event: true,
            step_event: false,
            t_lower,
            t_upper,
        }
    }
}
