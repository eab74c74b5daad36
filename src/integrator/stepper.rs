//! The `Stepper` contract every integration method implements, and the
//! shared `invoke_method` outer loop built on top of it.
//!
//! Generalises a single-stepper trait to the whole integrator family, and
//! gives the outer stepping loop a default implementation so each concrete
//! stepper only has to supply `do_step`/`do_step_const`/`reset`.

use crate::dynamical_system::DynamicalSystem;

/// Outcome of one `invoke_method` call: either a bracketed state event, a
/// reported step event, or neither (the full `Δt` horizon was reached).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EventInfo {
    pub state_event: bool,
    pub step_event: bool,
    /// Left/right bracket of a detected state event. Equal to the reached
    /// time when no state event occurred.
    pub t_lower: f64,
    pub t_upper: f64,
}

impl EventInfo {
    fn none_at(t: f64) -> Self {
        Self {
            state_event: false,
            step_event: false,
            t_lower: t,
            t_upper: t,
        }
    }
}

/// One ODE integration method. Implementors only need `do_step`,
/// `do_step_const`, and `reset` — `invoke_method` is provided.
pub trait Stepper {
    /// Takes one step, possibly shorter than `dt` if adaptive error control
    /// reduced it internally. Returns the time actually reached and the
    /// step size suggested for the next call.
    fn do_step(&mut self, sys: &mut dyn DynamicalSystem, states: &mut [f64], t: f64, dt: f64) -> (f64, f64);

    /// Takes exactly one step of exactly `dt`. Adaptive steppers with dense
    /// output implement this via interpolation; others just call their
    /// standard step with a fixed size.
    fn do_step_const(&mut self, sys: &mut dyn DynamicalSystem, states: &mut [f64], t: f64, dt: f64);

    /// Discards any multi-step or stiffness history, e.g. after an
    /// externally-imposed state change.
    fn reset(&mut self);

    /// Advances from `t0` to `t0 + delta_t` using repeated `do_step` calls,
    /// stopping early at the first state or step event.
    fn invoke_method(
        &mut self,
        sys: &mut dyn DynamicalSystem,
        states: &mut [f64],
        t0: f64,
        delta_t: f64,
        dt: f64,
    ) -> EventInfo {
        let t_end = t0 + delta_t;
        let mut t = t0;
        let mut prev_states = states.to_vec();

        sys.set_continuous_states(states);
        sys.set_time(t);
        sys.save_event_indicators();

        loop {
            let remaining = t_end - t;
            if remaining <= 1e-13 {
                self.reset();
                return EventInfo::none_at(t);
            }

            prev_states.copy_from_slice(states);
            let prev_t = t;

            if remaining <= dt {
                self.do_step_const(sys, states, t, remaining);
                t = t_end;
            } else {
                let (new_t, _suggested_dt) = self.do_step(sys, states, t, dt);
                t = new_t;
            }

            sys.set_continuous_states(states);
            sys.set_time(t);

            if sys.check_state_event() {
                states.copy_from_slice(&prev_states);
                sys.set_continuous_states(states);
                sys.set_time(prev_t);
                return EventInfo {
                    state_event: true,
                    step_event: false,
                    t_lower: prev_t,
                    t_upper: t,
                };
            }
            if sys.check_step_event() {
                return EventInfo {
                    state_event: false,
                    step_event: true,
                    t_lower: t,
                    t_upper: t,
                };
            }
            if t >= t_end - 1e-13 {
                self.reset();
                return EventInfo::none_at(t);
            }
        }
    }
}
