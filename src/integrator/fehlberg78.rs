//! Runge–Kutta–Fehlberg 7(8), adaptive, high order. Recommended for smooth
//! systems where the extra stages pay for themselves in step size.
//!
//! Reproduces Fehlberg's original 13-stage 7(8) coefficient set directly,
//! rather than depending on an external ODE crate for it.

use crate::dynamical_system::DynamicalSystem;
use crate::integrator::stepper::Stepper;

const C: [f64; 13] = [
    0.0,
    2.0 / 27.0,
    1.0 / 9.0,
    1.0 / 6.0,
    5.0 / 12.0,
    1.0 / 2.0,
    5.0 / 6.0,
    1.0 / 6.0,
    2.0 / 3.0,
    1.0 / 3.0,
    1.0,
    0.0,
    1.0,
];

// Lower-triangular Butcher coefficients, row i holds a[i][0..i].
#[rustfmt::skip]
const A: [&[f64]; 13] = [
    &[],
    &[2.0 / 27.0],
    &[1.0 / 36.0, 1.0 / 12.0],
    &[1.0 / 24.0, 0.0, 1.0 / 8.0],
    &[5.0 / 12.0, 0.0, -25.0 / 16.0, 25.0 / 16.0],
    &[1.0 / 20.0, 0.0, 0.0, 1.0 / 4.0, 1.0 / 5.0],
    &[-25.0 / 108.0, 0.0, 0.0, 125.0 / 108.0, -65.0 / 27.0, 125.0 / 54.0],
    &[31.0 / 300.0, 0.0, 0.0, 0.0, 61.0 / 225.0, -2.0 / 9.0, 13.0 / 900.0],
    &[2.0, 0.0, 0.0, -53.0 / 6.0, 704.0 / 45.0, -107.0 / 9.0, 67.0 / 90.0, 3.0],
    &[-91.0 / 108.0, 0.0, 0.0, 23.0 / 108.0, -976.0 / 135.0, 311.0 / 54.0, -19.0 / 60.0, 17.0 / 6.0, -1.0 / 12.0],
    &[2383.0 / 4100.0, 0.0, 0.0, -341.0 / 164.0, 4496.0 / 1025.0, -301.0 / 82.0, 2133.0 / 4100.0, 45.0 / 82.0, 45.0 / 164.0, 18.0 / 41.0],
    &[3.0 / 205.0, 0.0, 0.0, 0.0, 0.0, -6.0 / 41.0, -3.0 / 205.0, -3.0 / 41.0, 3.0 / 41.0, 6.0 / 41.0, 0.0],
    &[-1777.0 / 4100.0, 0.0, 0.0, -341.0 / 164.0, 4496.0 / 1025.0, -289.0 / 82.0, 2193.0 / 4100.0, 51.0 / 82.0, 33.0 / 164.0, 12.0 / 41.0, 0.0, 1.0],
];

const B8: [f64; 13] = [
    0.0, 0.0, 0.0, 0.0, 0.0,
    34.0 / 105.0, 9.0 / 35.0, 9.0 / 35.0, 9.0 / 280.0, 9.0 / 280.0,
    0.0, 41.0 / 840.0, 41.0 / 840.0,
];
const B7: [f64; 13] = [
    41.0 / 840.0, 0.0, 0.0, 0.0, 0.0,
    34.0 / 105.0, 9.0 / 35.0, 9.0 / 35.0, 9.0 / 280.0, 9.0 / 280.0,
    41.0 / 840.0, 0.0, 0.0,
];

const DEFAULT_TOL: f64 = 1e-6;
const MAX_RETRIES: u32 = 8;

pub struct Fehlberg78 {
    n: usize,
    tol: f64,
    k: [Vec<f64>; 13],
    tmp: Vec<f64>,
    y8: Vec<f64>,
}

impl Fehlberg78 {
    pub fn new(n_states: usize, tol: Option<f64>) -> Self {
        Self {
            n: n_states,
            tol: tol.unwrap_or(DEFAULT_TOL),
            k: std::array::from_fn(|_| vec![0.0; n_states]),
            tmp: vec![0.0; n_states],
            y8: vec![0.0; n_states],
        }
    }

    fn stages(&mut self, sys: &mut dyn DynamicalSystem, x0: &[f64], t: f64, dt: f64) -> f64 {
        for stage in 0..13 {
            if stage == 0 {
                self.tmp.copy_from_slice(x0);
            } else {
                self.tmp.copy_from_slice(x0);
                for (j, a) in A[stage].iter().enumerate() {
                    if *a != 0.0 {
                        for i in 0..self.n {
                            self.tmp[i] += dt * a * self.k[j][i];
                        }
                    }
                }
            }
            sys.set_continuous_states(&self.tmp);
            sys.set_time(t + C[stage] * dt);
            let mut k_stage = std::mem::take(&mut self.k[stage]);
            sys.get_derivatives(&mut k_stage);
            self.k[stage] = k_stage;
        }

        let mut err_norm = 0.0_f64;
        for i in 0..self.n {
            let sum8: f64 = (0..13).map(|s| B8[s] * self.k[s][i]).sum();
            let sum7: f64 = (0..13).map(|s| B7[s] * self.k[s][i]).sum();
            self.y8[i] = x0[i] + dt * sum8;
            let y7 = x0[i] + dt * sum7;
            let scale = self.tol + self.tol * x0[i].abs();
            err_norm = err_norm.max(((self.y8[i] - y7) / scale).abs());
        }
        err_norm
    }
}

impl Stepper for Fehlberg78 {
    fn do_step(&mut self, sys: &mut dyn DynamicalSystem, states: &mut [f64], t: f64, dt: f64) -> (f64, f64) {
        let x0 = states.to_vec();
        let mut trial_dt = dt;

        for _ in 0..MAX_RETRIES {
            let err = self.stages(sys, &x0, t, trial_dt);
            if err <= 1.0 || trial_dt.abs() < 1e-12 {
                states.copy_from_slice(&self.y8);
                sys.set_continuous_states(states);
                sys.set_time(t + trial_dt);
                let factor = (0.9 * err.max(1e-12).powf(-1.0 / 8.0)).clamp(0.2, 5.0);
                return (t + trial_dt, trial_dt * factor);
            }
            let factor = (0.9 * err.powf(-1.0 / 7.0)).clamp(0.1, 0.5);
            trial_dt *= factor;
        }

        states.copy_from_slice(&self.y8);
        sys.set_continuous_states(states);
        sys.set_time(t + trial_dt);
        (t + trial_dt, trial_dt)
    }

    fn do_step_const(&mut self, sys: &mut dyn DynamicalSystem, states: &mut [f64], t: f64, dt: f64) {
        let x0 = states.to_vec();
        self.stages(sys, &x0, t, dt);
        states.copy_from_slice(&self.y8);
        sys.set_continuous_states(states);
        sys.set_time(t + dt);
    }

    fn reset(&mut self) {}
}
