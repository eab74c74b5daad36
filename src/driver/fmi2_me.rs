//! FMI 2.0 Model Exchange driver.
//!
//! Shares the event-classification/bracketing contract with `fmi1_me`, but
//! differs in three ways: the richer `setupExperiment`/init-mode state
//! machine, `CallbackFunctions` passed by pointer (so the logger/environment
//! can be swapped post-instantiation), and an optional analytic Jacobian via
//! `fmi2GetDirectionalDerivative`.

use std::ffi::CString;
use std::sync::Arc;

use fmi_schema::fmi2::ScalarVariableElement;

use crate::bare_fmu::BareFmuV2;
use crate::driver::{DriverConfig, EventFlags, PendingEvent, VariableKind, VariableMap, VariableValue, EVENT_ITERATION_LIMIT};
use crate::dynamical_system::DynamicalSystem;
use crate::error::{Error, FmiStatus, Result};
use crate::ffi::fmi2::{CallbackFunctions, CallbackLogger, EventInfo};
use crate::integrator::{Integrator, IntegratorType};
use crate::logger::{default_allocate_memory, default_free_memory, default_succinct_logger};
use crate::typedefs::{Fmi2Boolean, Fmi2ComponentEnvironment, FmiComponent, FmiString, FmiValueReference};

/// `fmi2ModelExchange` from the standard's `fmi2TypesPlatform.h`-adjacent
/// `fmi2Type` enum.
const FMI2_MODEL_EXCHANGE: i32 = 0;

/// Reads `ModelStructure/Derivatives` to pair each continuous state's value
/// reference with its derivative's, in `Derivatives`-list order — the order
/// `get_continuous_states`/`get_derivatives` return their slices in, per the
/// standard.
fn state_and_derivative_vrs(description: &fmi_schema::fmi2::Fmi2ModelDescription) -> (Vec<FmiValueReference>, Vec<FmiValueReference>) {
    let variables: Vec<&fmi_schema::fmi2::ScalarVariable> = description.get_model_variables().collect();
    let mut state_vrs = Vec::new();
    let mut derivative_vrs = Vec::new();

    for dep in &description.model_structure.derivatives.unknowns {
        let Some(der_var) = variables.get(dep.index as usize - 1) else {
            continue;
        };
        let ScalarVariableElement::Real(real) = &der_var.elem else {
            continue;
        };
        let Some(state_index) = real.derivative else {
            continue;
        };
        let Some(state_var) = variables.get(state_index as usize - 1) else {
            continue;
        };
        state_vrs.push(state_var.value_reference);
        derivative_vrs.push(der_var.value_reference);
    }
    (state_vrs, derivative_vrs)
}

fn kind_of(elem: &ScalarVariableElement) -> VariableKind {
    match elem {
        ScalarVariableElement::Real(_) => VariableKind::Real,
        ScalarVariableElement::Integer(_) => VariableKind::Integer,
        ScalarVariableElement::Boolean(_) => VariableKind::Boolean,
        ScalarVariableElement::String | ScalarVariableElement::Enumeration => VariableKind::String,
    }
}

/// One running instantiation of a loaded FMI 2.0 Model Exchange FMU.
pub struct Fmi2ModelExchange {
    bare: Arc<BareFmuV2>,
    component: FmiComponent,
    _instance_name: CString,
    /// Kept alive for the component's whole lifetime: `fmi2Instantiate` only
    /// receives a pointer to this, so the FMU dereferences it live on every
    /// callback, and `set_callbacks`/`set_component_environment` can mutate
    /// it after the fact (unlike v1, where the struct is copied by value).
    callbacks: Box<CallbackFunctions>,
    config: DriverConfig,
    variables: VariableMap,
    n_states: usize,
    n_indicators: usize,
    /// Value references of the continuous states and, index-for-index, their
    /// derivatives — read once from `ModelStructure/Derivatives` at
    /// construction time, consumed by [`Fmi2ModelExchange::directional_jacobian`].
    state_vrs: Vec<FmiValueReference>,
    derivative_vrs: Vec<FmiValueReference>,
    integrator: Option<Integrator>,

    time: f64,
    event_indicators: Vec<f64>,
    prev_event_indicators: Vec<f64>,
    upcoming_time_event: bool,
    next_event_time: f64,
    state_event_latch: bool,
    pending_event: Option<PendingEvent>,
    terminate_requested: bool,

    last_status: FmiStatus,
    fatal: bool,
}

impl Fmi2ModelExchange {
    pub fn new(bare: Arc<BareFmuV2>, instance_name: &str, config: DriverConfig) -> Result<Self> {
        Self::new_with_logger(bare, instance_name, config, default_succinct_logger)
    }

    pub fn new_with_logger(bare: Arc<BareFmuV2>, instance_name: &str, config: DriverConfig, logger: CallbackLogger) -> Result<Self> {
        let instance_name_c = CString::new(instance_name.as_bytes()).map_err(|_| Error::UnsupportedFmuType(instance_name.to_owned()))?;
        let guid_c = CString::new(bare.description.guid.as_bytes()).map_err(|_| Error::UnsupportedFmuType(bare.description.guid.clone()))?;
        let resource_location_c =
            CString::new(bare.resource_location.as_str().as_bytes()).map_err(|_| Error::UnsupportedFmuType(bare.resource_location.to_string()))?;

        let mut callbacks = Box::new(CallbackFunctions {
            logger,
            allocate_memory: default_allocate_memory,
            free_memory: default_free_memory,
            step_finished: no_op_step_finished,
            component_environment: std::ptr::null_mut(),
        });
        let self_ptr = callbacks.as_mut() as *mut CallbackFunctions as Fmi2ComponentEnvironment;
        callbacks.component_environment = self_ptr;

        let component = unsafe {
            (bare.symbols.instantiate)(
                instance_name_c.as_ptr(),
                FMI2_MODEL_EXCHANGE,
                guid_c.as_ptr(),
                resource_location_c.as_ptr(),
                callbacks.as_ref() as *const CallbackFunctions,
                false as Fmi2Boolean,
                config.logging_on as Fmi2Boolean,
            )
        };
        if component.is_null() {
            return Err(Error::Instantiation { model_name: bare.description.model_name.clone() });
        }

        let n_states = bare.description.num_states();
        let n_indicators = bare.description.num_event_indicators();

        let mut variables = VariableMap::new();
        for var in bare.description.get_model_variables() {
            variables.insert(var.name.clone(), var.value_reference, kind_of(&var.elem));
        }

        let (state_vrs, derivative_vrs) = state_and_derivative_vrs(&bare.description);

        Ok(Self {
            bare,
            component,
            _instance_name: instance_name_c,
            callbacks,
            config,
            variables,
            n_states,
            n_indicators,
            state_vrs,
            derivative_vrs,
            integrator: Some(Integrator::new(IntegratorType::Rk4, n_states, None)),
            time: 0.0,
            event_indicators: vec![0.0; n_indicators],
            prev_event_indicators: vec![0.0; n_indicators],
            upcoming_time_event: false,
            next_event_time: f64::INFINITY,
            state_event_latch: false,
            pending_event: None,
            terminate_requested: false,
            last_status: FmiStatus::Ok,
            fatal: false,
        })
    }

    /// Swaps the logger the FMU calls back into, taking effect on the very
    /// next call — legal only because v2 passes `CallbackFunctions` by
    /// pointer (see the `callbacks` field doc).
    pub fn set_callbacks(&mut self, logger: CallbackLogger) {
        self.callbacks.logger = logger;
    }

    pub fn set_component_environment(&mut self, env: Fmi2ComponentEnvironment) {
        self.callbacks.component_environment = env;
    }

    fn record_status(&mut self, status: FmiStatus) -> FmiStatus {
        self.last_status = status;
        if status == FmiStatus::Fatal {
            self.fatal = true;
        }
        status
    }

    pub fn get_last_status(&self) -> FmiStatus {
        self.last_status
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    pub fn set_integrator_properties(&mut self, kind: IntegratorType, abstol: Option<f64>) {
        if let Some(integrator) = self.integrator.as_mut() {
            integrator.set_properties(kind, abstol);
        }
    }

    /// True iff the FMU declares `providesDirectionalDerivative` and the
    /// symbol actually resolved.
    pub fn has_directional_derivative(&self) -> bool {
        self.bare.symbols.get_directional_derivative.is_some()
            && self
                .bare
                .description
                .model_exchange
                .as_ref()
                .and_then(|me| me.provides_directional_derivative)
                .unwrap_or(false)
    }

    /// Full v2 init sequence: `setupExperiment` →
    /// `enterInitializationMode` → `exitInitializationMode` → one
    /// `newDiscreteStates` call (the FMU may still be signalling events at
    /// the boundary) → `enterContinuousTimeMode`.
    pub fn initialize(&mut self, start_time: f64, tolerance_defined: bool, tolerance: f64, stop_time: Option<f64>) -> FmiStatus {
        if self.fatal {
            return FmiStatus::Fatal;
        }
        let (tol_defined, tol) = if tolerance_defined {
            (true, tolerance)
        } else {
            match self.bare.description.default_experiment.as_ref().map(|de| de.tolerance()) {
                Some(t) => (true, t),
                None => (false, tolerance),
            }
        };

        self.time = start_time;
        let status = unsafe {
            (self.bare.symbols.setup_experiment)(
                self.component,
                tol_defined as Fmi2Boolean,
                tol,
                start_time,
                stop_time.is_some() as Fmi2Boolean,
                stop_time.unwrap_or(0.0),
            )
        };
        self.record_status(status.into());

        let status = unsafe { (self.bare.symbols.enter_initialization_mode)(self.component) };
        self.record_status(status.into());

        let status = unsafe { (self.bare.symbols.exit_initialization_mode)(self.component) };
        self.record_status(status.into());

        self.enter_continuous_time_mode();

        if self.n_indicators > 0 {
            let mut current = vec![0.0; self.n_indicators];
            self.get_raw_event_indicators(&mut current);
            self.event_indicators = current.clone();
            self.prev_event_indicators = current;
        }
        self.last_status
    }

    /// `exitInitializationMode` leaves the FMU in Event Mode; one round of
    /// `newDiscreteStates` plus `enterContinuousTimeMode` is required before
    /// any continuous-time call (`setTime`, `getDerivatives`, ...) is legal.
    fn enter_continuous_time_mode(&mut self) {
        self.handle_events();
        let status = unsafe { (self.bare.symbols.enter_continuous_time_mode)(self.component) };
        self.record_status(status.into());
    }

    pub fn terminate(&mut self) -> FmiStatus {
        if self.fatal {
            return FmiStatus::Fatal;
        }
        let status = unsafe { (self.bare.symbols.terminate)(self.component) };
        self.record_status(status.into())
    }

    pub fn get_real(&mut self, vrs: &[FmiValueReference], values: &mut [f64]) -> FmiStatus {
        if self.fatal {
            return FmiStatus::Fatal;
        }
        let status = unsafe { (self.bare.symbols.get_real)(self.component, vrs.as_ptr(), vrs.len(), values.as_mut_ptr()) };
        self.record_status(status.into())
    }

    pub fn set_real(&mut self, vrs: &[FmiValueReference], values: &[f64]) -> FmiStatus {
        if self.fatal {
            return FmiStatus::Fatal;
        }
        let status = unsafe { (self.bare.symbols.set_real)(self.component, vrs.as_ptr(), vrs.len(), values.as_ptr()) };
        self.record_status(status.into())
    }

    pub fn get_integer(&mut self, vrs: &[FmiValueReference], values: &mut [i32]) -> FmiStatus {
        if self.fatal {
            return FmiStatus::Fatal;
        }
        let status = unsafe { (self.bare.symbols.get_integer)(self.component, vrs.as_ptr(), vrs.len(), values.as_mut_ptr()) };
        self.record_status(status.into())
    }

    pub fn set_integer(&mut self, vrs: &[FmiValueReference], values: &[i32]) -> FmiStatus {
        if self.fatal {
            return FmiStatus::Fatal;
        }
        let status = unsafe { (self.bare.symbols.set_integer)(self.component, vrs.as_ptr(), vrs.len(), values.as_ptr()) };
        self.record_status(status.into())
    }

    pub fn get_boolean(&mut self, vrs: &[FmiValueReference], values: &mut [bool]) -> FmiStatus {
        if self.fatal {
            return FmiStatus::Fatal;
        }
        let mut raw = vec![0 as Fmi2Boolean; values.len()];
        let status = unsafe { (self.bare.symbols.get_boolean)(self.component, vrs.as_ptr(), vrs.len(), raw.as_mut_ptr()) };
        for (v, r) in values.iter_mut().zip(&raw) {
            *v = *r != 0;
        }
        self.record_status(status.into())
    }

    pub fn set_boolean(&mut self, vrs: &[FmiValueReference], values: &[bool]) -> FmiStatus {
        if self.fatal {
            return FmiStatus::Fatal;
        }
        let raw: Vec<Fmi2Boolean> = values.iter().map(|b| *b as Fmi2Boolean).collect();
        let status = unsafe { (self.bare.symbols.set_boolean)(self.component, vrs.as_ptr(), vrs.len(), raw.as_ptr()) };
        self.record_status(status.into())
    }

    pub fn get_string(&mut self, vrs: &[FmiValueReference]) -> (Vec<String>, FmiStatus) {
        if self.fatal {
            return (vec![String::new(); vrs.len()], FmiStatus::Fatal);
        }
        let mut ptrs: Vec<FmiString> = vec![std::ptr::null(); vrs.len()];
        let status = unsafe { (self.bare.symbols.get_string)(self.component, vrs.as_ptr(), vrs.len(), ptrs.as_mut_ptr()) };
        let values = ptrs.iter().map(|p| unsafe { crate::logger::c_str_or(*p, "") }).collect();
        (values, self.record_status(status.into()))
    }

    pub fn set_string(&mut self, vrs: &[FmiValueReference], values: &[&str]) -> FmiStatus {
        if self.fatal {
            return FmiStatus::Fatal;
        }
        let cstrings: Vec<CString> = values.iter().map(|s| CString::new(s.as_bytes()).unwrap_or_default()).collect();
        let ptrs: Vec<FmiString> = cstrings.iter().map(|c| c.as_ptr()).collect();
        let status = unsafe { (self.bare.symbols.set_string)(self.component, vrs.as_ptr(), vrs.len(), ptrs.as_ptr()) };
        self.record_status(status.into())
    }

    pub fn get_real_by_name(&mut self, name: &str) -> (f64, FmiStatus) {
        match self.variables.lookup(name) {
            Some((vr, VariableKind::Real)) => {
                let mut value = [0.0];
                let status = self.get_real(&[vr], &mut value);
                (value[0], status)
            }
            _ => {
                log::warn!(target: "fmi", "unknown or non-Real variable: {name}");
                (f64::NAN, FmiStatus::Discard)
            }
        }
    }

    pub fn set_real_by_name(&mut self, name: &str, value: f64) -> FmiStatus {
        match self.variables.lookup(name) {
            Some((vr, VariableKind::Real)) => self.set_real(&[vr], &[value]),
            _ => {
                log::warn!(target: "fmi", "unknown or non-Real variable: {name}");
                FmiStatus::Discard
            }
        }
    }

    /// Unified by-name accessor across all four scalar kinds, dispatching on
    /// the kind recorded in the variable map. An unknown name or a kind
    /// mismatch is a warning-logged `Discard`, never fatal.
    pub fn get_by_name(&mut self, name: &str) -> (Option<VariableValue>, FmiStatus) {
        match self.variables.lookup(name) {
            Some((vr, VariableKind::Real)) => {
                let mut v = [0.0];
                let status = self.get_real(&[vr], &mut v);
                (Some(VariableValue::Real(v[0])), status)
            }
            Some((vr, VariableKind::Integer)) => {
                let mut v = [0];
                let status = self.get_integer(&[vr], &mut v);
                (Some(VariableValue::Integer(v[0])), status)
            }
            Some((vr, VariableKind::Boolean)) => {
                let mut v = [false];
                let status = self.get_boolean(&[vr], &mut v);
                (Some(VariableValue::Boolean(v[0])), status)
            }
            Some((vr, VariableKind::String)) => {
                let (values, status) = self.get_string(&[vr]);
                (Some(VariableValue::String(values.into_iter().next().unwrap_or_default())), status)
            }
            None => {
                log::warn!(target: "fmi", "unknown variable: {name}");
                (None, FmiStatus::Discard)
            }
        }
    }

    pub fn set_by_name(&mut self, name: &str, value: &VariableValue) -> FmiStatus {
        match (self.variables.lookup(name), value) {
            (Some((vr, VariableKind::Real)), VariableValue::Real(v)) => self.set_real(&[vr], &[*v]),
            (Some((vr, VariableKind::Integer)), VariableValue::Integer(v)) => self.set_integer(&[vr], &[*v]),
            (Some((vr, VariableKind::Boolean)), VariableValue::Boolean(v)) => self.set_boolean(&[vr], &[*v]),
            (Some((vr, VariableKind::String)), VariableValue::String(v)) => self.set_string(&[vr], &[v.as_str()]),
            (Some(_), _) => {
                log::warn!(target: "fmi", "variable kind mismatch for: {name}");
                FmiStatus::Discard
            }
            (None, _) => {
                log::warn!(target: "fmi", "unknown variable: {name}");
                FmiStatus::Discard
            }
        }
    }

    fn get_raw_event_indicators(&mut self, g: &mut [f64]) -> FmiStatus {
        if self.fatal {
            return FmiStatus::Fatal;
        }
        let status = unsafe { (self.bare.symbols.get_event_indicators)(self.component, g.as_mut_ptr(), g.len()) };
        self.record_status(status.into())
    }

    pub fn check_time_event(&self) -> bool {
        self.upcoming_time_event
    }

    pub fn get_time_event(&self) -> f64 {
        if self.upcoming_time_event {
            self.next_event_time
        } else {
            f64::INFINITY
        }
    }

    pub fn terminate_requested(&self) -> bool {
        self.terminate_requested
    }

    /// Loops `newDiscreteStates` until it reports no further discrete update
    /// pending, bounded by [`EVENT_ITERATION_LIMIT`].
    pub fn handle_events(&mut self) -> FmiStatus {
        if self.fatal {
            return FmiStatus::Fatal;
        }
        let status = unsafe { (self.bare.symbols.enter_event_mode)(self.component) };
        self.record_status(status.into());

        for _ in 0..EVENT_ITERATION_LIMIT {
            let mut event_info = EventInfo::default();
            let status = unsafe { (self.bare.symbols.new_discrete_states)(self.component, &mut event_info) };
            self.record_status(status.into());
            self.upcoming_time_event = event_info.next_event_time_defined != 0;
            self.next_event_time = event_info.next_event_time;
            if event_info.terminate_simulation != 0 {
                self.terminate_requested = true;
            }
            if event_info.new_discrete_states_needed == 0 {
                break;
            }
        }

        let status = unsafe { (self.bare.symbols.enter_continuous_time_mode)(self.component) };
        self.record_status(status.into());
        self.state_event_latch = false;
        self.last_status
    }

    pub fn step_over_event(&mut self) -> FmiStatus {
        if self.fatal {
            return FmiStatus::Fatal;
        }
        let Some(pending) = self.pending_event.take() else {
            return self.last_status;
        };
        let dt = pending.t_upper - pending.t_lower;

        let mut x = vec![0.0; self.n_states];
        self.get_continuous_states(&mut x);
        let mut dx = vec![0.0; self.n_states];
        self.get_derivatives(&mut dx);
        for i in 0..self.n_states {
            x[i] += dt * dx[i];
        }
        self.set_continuous_states(&x);
        self.set_time(pending.t_upper);

        self.check_step_event();
        self.handle_events();
        if self.n_indicators > 0 {
            let mut current = vec![0.0; self.n_indicators];
            self.get_raw_event_indicators(&mut current);
            self.event_indicators = current.clone();
            self.prev_event_indicators = current;
        }
        self.last_status
    }

    /// Analytic Jacobian via `fmi2GetDirectionalDerivative`, probing one
    /// unit seed direction per state. Only used when
    /// [`Fmi2ModelExchange::has_directional_derivative`] is true.
    fn directional_jacobian(&mut self, j: &mut [f64]) -> FmiStatus {
        let Some(get_dd) = self.bare.symbols.get_directional_derivative else {
            return FmiStatus::Warning;
        };
        if self.state_vrs.len() != self.n_states || self.derivative_vrs.len() != self.n_states {
            log::warn!(target: "fmi", "ModelStructure/Derivatives didn't resolve a value reference for every state; skipping analytic Jacobian");
            return FmiStatus::Warning;
        }
        let n = self.n_states;
        let mut seed = vec![0.0; n];
        let mut column = vec![0.0; n];
        let mut status = FmiStatus::Ok;
        for col in 0..n {
            seed.iter_mut().for_each(|s| *s = 0.0);
            seed[col] = 1.0;
            let raw = unsafe {
                get_dd(
                    self.component,
                    self.derivative_vrs.as_ptr(),
                    n,
                    self.state_vrs.as_ptr(),
                    n,
                    seed.as_ptr(),
                    column.as_mut_ptr(),
                )
            };
            status = self.record_status(raw.into());
            for row in 0..n {
                j[col * n + row] = column[row];
            }
        }
        status
    }

    /// The key public method: advances from the current time
    /// towards `t_end`, bracketing/localising any event to within
    /// `eventSearchPrecision`.
    pub fn integrate(&mut self, t_end_request: f64, dt: f64) -> (f64, EventFlags) {
        if self.fatal || self.terminate_requested {
            return (self.time, EventFlags::default());
        }

        let eps = self.config.event_search_precision;

        if self.n_states == 0 {
            let mut t_end = t_end_request;
            let mut flags = EventFlags::default();
            if self.check_time_event() && self.next_event_time <= t_end {
                t_end = self.next_event_time;
                flags.time_event = true;
            }
            self.set_time(t_end);
            if flags.time_event {
                if self.config.stop_before_event {
                    self.pending_event = Some(PendingEvent { t_lower: t_end, t_upper: t_end });
                } else {
                    self.handle_events();
                }
            }
            return (self.time, flags);
        }

        if self.config.stop_before_event && self.pending_event.is_some() {
            self.step_over_event();
        }

        let mut t_end = t_end_request;
        let mut flags = EventFlags::default();
        if self.check_time_event() && self.next_event_time < t_end {
            t_end = self.next_event_time - eps / 2.0;
            flags.time_event = true;
        }

        self.save_event_indicators();

        let t0 = self.time;
        let delta_t = t_end - t0;
        let mut states = vec![0.0; self.n_states];
        self.get_continuous_states(&mut states);

        let mut integrator = self.integrator.take().expect("integrator present while n_states > 0");
        let info = integrator.integrate(self, &mut states, t0, delta_t, dt, eps);
        self.integrator = Some(integrator);

        if info.step_event {
            flags.step_event = true;
            self.handle_events();
        } else if info.state_event {
            flags.state_event = true;
            self.pending_event = Some(PendingEvent { t_lower: info.t_lower, t_upper: info.t_upper });
            if !self.config.stop_before_event {
                self.step_over_event();
            }
        } else if flags.time_event {
            self.set_time(self.next_event_time);
            if self.config.stop_before_event {
                self.pending_event = Some(PendingEvent { t_lower: self.next_event_time, t_upper: self.next_event_time });
            } else {
                self.handle_events();
            }
        }

        (self.time, flags)
    }
}

impl DynamicalSystem for Fmi2ModelExchange {
    fn n_states(&self) -> usize {
        self.n_states
    }

    fn n_event_indicators(&self) -> usize {
        self.n_indicators
    }

    fn set_time(&mut self, t: f64) -> FmiStatus {
        if self.fatal {
            return FmiStatus::Fatal;
        }
        let status = unsafe { (self.bare.symbols.set_time)(self.component, t) };
        self.time = t;
        self.record_status(status.into())
    }

    fn get_time(&self) -> f64 {
        self.time
    }

    fn rewind_time(&mut self, delta: f64) -> FmiStatus {
        self.set_time(self.time - delta)
    }

    fn set_continuous_states(&mut self, x: &[f64]) -> FmiStatus {
        if self.fatal {
            return FmiStatus::Fatal;
        }
        let status = unsafe { (self.bare.symbols.set_continuous_states)(self.component, x.as_ptr(), x.len()) };
        self.record_status(status.into())
    }

    fn get_continuous_states(&self, x: &mut [f64]) -> FmiStatus {
        if self.fatal {
            return FmiStatus::Fatal;
        }
        unsafe { (self.bare.symbols.get_continuous_states)(self.component, x.as_mut_ptr(), x.len()) }.into()
    }

    fn get_derivatives(&mut self, dx: &mut [f64]) -> FmiStatus {
        if self.fatal {
            return FmiStatus::Fatal;
        }
        let status = unsafe { (self.bare.symbols.get_derivatives)(self.component, dx.as_mut_ptr(), dx.len()) };
        self.record_status(status.into())
    }

    fn get_event_indicators(&mut self, g: &mut [f64]) -> FmiStatus {
        let status = self.get_raw_event_indicators(g);
        if self.n_indicators > 0 {
            self.event_indicators.copy_from_slice(g);
        }
        status
    }

    fn save_event_indicators(&mut self) {
        self.prev_event_indicators.copy_from_slice(&self.event_indicators);
    }

    fn check_state_event(&mut self) -> bool {
        if self.n_indicators == 0 {
            return false;
        }
        let mut current = vec![0.0; self.n_indicators];
        self.get_raw_event_indicators(&mut current);
        let sign_changed = current
            .iter()
            .zip(&self.prev_event_indicators)
            .any(|(c, p)| c * p < 0.0);
        self.event_indicators = current;
        if sign_changed {
            self.state_event_latch = true;
        }
        self.state_event_latch
    }

    fn check_step_event(&mut self) -> bool {
        if self.fatal {
            return false;
        }
        let mut enter_event_mode: Fmi2Boolean = 0;
        let mut terminate_simulation: Fmi2Boolean = 0;
        let status = unsafe {
            (self.bare.symbols.completed_integrator_step)(self.component, true as Fmi2Boolean, &mut enter_event_mode, &mut terminate_simulation)
        };
        self.record_status(status.into());
        if terminate_simulation != 0 {
            self.terminate_requested = true;
        }
        enter_event_mode != 0
    }

    fn provides_jacobian(&self) -> bool {
        self.has_directional_derivative()
    }

    fn get_jacobian(&mut self, j: &mut [f64]) -> FmiStatus {
        if !self.has_directional_derivative() {
            return FmiStatus::Warning;
        }
        self.directional_jacobian(j)
    }
}

impl Drop for Fmi2ModelExchange {
    fn drop(&mut self) {
        unsafe { (self.bare.symbols.free_instance)(self.component) };
    }
}

/// Default `stepFinished` callback: v2 only invokes this for asynchronous
/// Co-Simulation `doStep`, out of scope here, so it's a
/// deliberate no-op rather than a used code path.
extern "C" fn no_op_step_finished(_component_environment: Fmi2ComponentEnvironment, _status: i32) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_of_maps_every_element_variant() {
        assert_eq!(kind_of(&ScalarVariableElement::Real(Default::default())), VariableKind::Real);
        assert_eq!(kind_of(&ScalarVariableElement::Integer(Default::default())), VariableKind::Integer);
        assert_eq!(kind_of(&ScalarVariableElement::Boolean(Default::default())), VariableKind::Boolean);
        assert_eq!(kind_of(&ScalarVariableElement::String), VariableKind::String);
    }
}
