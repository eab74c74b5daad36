//! Cash–Karp embedded Runge–Kutta 4(5), adaptive step size via the embedded
//! error estimate. Explicit, no dense output — `do_step_const` falls back to
//! one un-controlled evaluation of the underlying formula.

use crate::dynamical_system::DynamicalSystem;
use crate::integrator::stepper::Stepper;

const C: [f64; 6] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 3.0 / 5.0, 1.0, 7.0 / 8.0];

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 3.0 / 10.0;
const A42: f64 = -9.0 / 10.0;
const A43: f64 = 6.0 / 5.0;
const A51: f64 = -11.0 / 54.0;
const A52: f64 = 5.0 / 2.0;
const A53: f64 = -70.0 / 27.0;
const A54: f64 = 35.0 / 27.0;
const A61: f64 = 1631.0 / 55296.0;
const A62: f64 = 175.0 / 512.0;
const A63: f64 = 575.0 / 13824.0;
const A64: f64 = 44275.0 / 110592.0;
const A65: f64 = 253.0 / 4096.0;

const B5: [f64; 6] = [37.0 / 378.0, 0.0, 250.0 / 621.0, 125.0 / 594.0, 0.0, 512.0 / 1771.0];
const B4: [f64; 6] = [
    2825.0 / 27648.0,
    0.0,
    18575.0 / 48384.0,
    13525.0 / 55296.0,
    277.0 / 14336.0,
    1.0 / 4.0,
];

const DEFAULT_TOL: f64 = 1e-6;
const MAX_RETRIES: u32 = 8;

pub struct CashKarp {
    n: usize,
    tol: f64,
    k: [Vec<f64>; 6],
    tmp: Vec<f64>,
    y5: Vec<f64>,
}

impl CashKarp {
    pub fn new(n_states: usize, tol: Option<f64>) -> Self {
        Self {
            n: n_states,
            tol: tol.unwrap_or(DEFAULT_TOL),
            k: std::array::from_fn(|_| vec![0.0; n_states]),
            tmp: vec![0.0; n_states],
            y5: vec![0.0; n_states],
        }
    }

    /// Evaluates all six stages and the 5th/4th order solutions at `(t, x0)`
    /// for a trial step `dt`; returns `(y5, error_norm)`.
    fn stages(&mut self, sys: &mut dyn DynamicalSystem, x0: &[f64], t: f64, dt: f64) -> f64 {
        sys.set_continuous_states(x0);
        sys.set_time(t);
        sys.get_derivatives(&mut self.k[0]);

        for i in 0..self.n {
            self.tmp[i] = x0[i] + dt * A21 * self.k[0][i];
        }
        sys.set_continuous_states(&self.tmp);
        sys.set_time(t + C[1] * dt);
        sys.get_derivatives(&mut self.k[1]);

        for i in 0..self.n {
            self.tmp[i] = x0[i] + dt * (A31 * self.k[0][i] + A32 * self.k[1][i]);
        }
        sys.set_continuous_states(&self.tmp);
        sys.set_time(t + C[2] * dt);
        sys.get_derivatives(&mut self.k[2]);

        for i in 0..self.n {
            self.tmp[i] = x0[i] + dt * (A41 * self.k[0][i] + A42 * self.k[1][i] + A43 * self.k[2][i]);
        }
        sys.set_continuous_states(&self.tmp);
        sys.set_time(t + C[3] * dt);
        sys.get_derivatives(&mut self.k[3]);

        for i in 0..self.n {
            self.tmp[i] =
                x0[i] + dt * (A51 * self.k[0][i] + A52 * self.k[1][i] + A53 * self.k[2][i] + A54 * self.k[3][i]);
        }
        sys.set_continuous_states(&self.tmp);
        sys.set_time(t + C[4] * dt);
        sys.get_derivatives(&mut self.k[4]);

        for i in 0..self.n {
            self.tmp[i] = x0[i]
                + dt * (A61 * self.k[0][i] + A62 * self.k[1][i] + A63 * self.k[2][i] + A64 * self.k[3][i] + A65 * self.k[4][i]);
        }
        sys.set_continuous_states(&self.tmp);
        sys.set_time(t + C[5] * dt);
        sys.get_derivatives(&mut self.k[5]);

        let mut err_norm = 0.0_f64;
        for i in 0..self.n {
            let sum5: f64 = (0..6).map(|s| B5[s] * self.k[s][i]).sum();
            let sum4: f64 = (0..6).map(|s| B4[s] * self.k[s][i]).sum();
            self.y5[i] = x0[i] + dt * sum5;
            let y4 = x0[i] + dt * sum4;
            let scale = self.tol + self.tol * x0[i].abs();
            err_norm = err_norm.max(((self.y5[i] - y4) / scale).abs());
        }
        err_norm
    }

    fn adaptive_step(&mut self, sys: &mut dyn DynamicalSystem, states: &mut [f64], t: f64, dt: f64) -> (f64, f64) {
        let x0 = states.to_vec();
        let mut trial_dt = dt;

        for _ in 0..MAX_RETRIES {
            let err = self.stages(sys, &x0, t, trial_dt);
            if err <= 1.0 || trial_dt.abs() < 1e-12 {
                states.copy_from_slice(&self.y5);
                sys.set_continuous_states(states);
                sys.set_time(t + trial_dt);
                let safety = 0.9_f64;
                let factor = (safety * err.max(1e-12).powf(-0.2)).clamp(0.2, 5.0);
                return (t + trial_dt, trial_dt * factor);
            }
            let factor = (0.9 * err.powf(-0.25)).clamp(0.1, 0.5);
            trial_dt *= factor;
        }

        states.copy_from_slice(&self.y5);
        sys.set_continuous_states(states);
        sys.set_time(t + trial_dt);
        (t + trial_dt, trial_dt)
    }
}

impl Stepper for CashKarp {
    fn do_step(&mut self, sys: &mut dyn DynamicalSystem, states: &mut [f64], t: f64, dt: f64) -> (f64, f64) {
        self.adaptive_step(sys, states, t, dt)
    }

    fn do_step_const(&mut self, sys: &mut dyn DynamicalSystem, states: &mut [f64], t: f64, dt: f64) {
        let x0 = states.to_vec();
        self.stages(sys, &x0, t, dt);
        states.copy_from_slice(&self.y5);
        sys.set_continuous_states(states);
        sys.set_time(t + dt);
    }

    fn reset(&mut self) {}
}
