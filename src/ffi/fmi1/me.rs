//! Raw FMI 1.0 Model Exchange C ABI.
//!
//! Signatures and resolution order below mirror the FMI 1.0 Model Exchange
//! header exactly, translated from C function-pointer-struct members into a
//! Rust struct of `unsafe extern "C" fn` pointers, each resolved individually
//! through [`libloading`] rather than generated by `bindgen` — this crate
//! carries no vendored FMI 1.0 C headers for `bindgen` to parse (see
//! DESIGN.md).

use crate::typedefs::{Fmi1Boolean, FmiComponent, FmiInteger, FmiReal, FmiString, FmiValueReference};
use libloading::Library;

// See the matching note in `ffi::fmi2::CallbackLogger`: pinned to fixed
// arity (no trailing `...`) because stable Rust cannot define a C-variadic
// function body, only declare one. DESIGN.md records this as a disclosed
// simplification.
pub type CallbackLogger = unsafe extern "C" fn(
    component: FmiComponent,
    instance_name: FmiString,
    status: FmiInteger,
    category: FmiString,
    message: FmiString,
);
pub type CallbackAllocateMemory = unsafe extern "C" fn(n_obj: usize, size: usize) -> *mut std::ffi::c_void;
pub type CallbackFreeMemory = unsafe extern "C" fn(obj: *mut std::ffi::c_void);

#[repr(C)]
#[derive(Clone, Copy)]
pub struct CallbackFunctions {
    pub logger: CallbackLogger,
    pub allocate_memory: CallbackAllocateMemory,
    pub free_memory: CallbackFreeMemory,
}

/// Mirrors `fmiEventInfo` from `fmiModelTypes.h`: the raw v1 event-info
/// struct returned by `initialize`/`eventUpdate`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct EventInfo {
    pub iteration_converged: Fmi1Boolean,
    pub state_value_references_changed: Fmi1Boolean,
    pub state_values_changed: Fmi1Boolean,
    pub terminate_simulation: Fmi1Boolean,
    pub upcoming_time_event: Fmi1Boolean,
    pub next_event_time: FmiReal,
}

type FInstantiateModel = unsafe extern "C" fn(
    instance_name: FmiString,
    guid: FmiString,
    functions: CallbackFunctions,
    logging_on: Fmi1Boolean,
) -> FmiComponent;
type FFreeModelInstance = unsafe extern "C" fn(c: FmiComponent);
type FSetTime = unsafe extern "C" fn(c: FmiComponent, time: FmiReal) -> FmiInteger;
type FSetContinuousStates = unsafe extern "C" fn(c: FmiComponent, x: *const FmiReal, nx: usize) -> FmiInteger;
type FCompletedIntegratorStep = unsafe extern "C" fn(c: FmiComponent, call_event_update: *mut Fmi1Boolean) -> FmiInteger;
type FSetReal = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *const FmiReal) -> FmiInteger;
type FSetInteger = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *const FmiInteger) -> FmiInteger;
type FSetBoolean = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *const Fmi1Boolean) -> FmiInteger;
type FSetString = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *const FmiString) -> FmiInteger;
type FInitialize = unsafe extern "C" fn(c: FmiComponent, tolerance_controlled: Fmi1Boolean, relative_tolerance: FmiReal, event_info: *mut EventInfo) -> FmiInteger;
type FGetDerivatives = unsafe extern "C" fn(c: FmiComponent, derivatives: *mut FmiReal, nx: usize) -> FmiInteger;
type FGetEventIndicators = unsafe extern "C" fn(c: FmiComponent, event_indicators: *mut FmiReal, ni: usize) -> FmiInteger;
type FGetReal = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *mut FmiReal) -> FmiInteger;
type FGetInteger = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *mut FmiInteger) -> FmiInteger;
type FGetBoolean = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *mut Fmi1Boolean) -> FmiInteger;
type FGetString = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *mut FmiString) -> FmiInteger;
type FEventUpdate = unsafe extern "C" fn(c: FmiComponent, intermediate_results: Fmi1Boolean, event_info: *mut EventInfo) -> FmiInteger;
type FGetContinuousStates = unsafe extern "C" fn(c: FmiComponent, states: *mut FmiReal, nx: usize) -> FmiInteger;
type FGetNominalContinuousStates = unsafe extern "C" fn(c: FmiComponent, x_nominal: *mut FmiReal, nx: usize) -> FmiInteger;
type FTerminate = unsafe extern "C" fn(c: FmiComponent) -> FmiInteger;

/// Resolved function-pointer table for one loaded FMI 1.0 Model Exchange
/// shared library. Every symbol is mandatory for v1 ME — there is no
/// "trap" subset the way v2 has, because v1 ME/CS are separate binaries.
pub struct Symbols {
    pub instantiate_model: FInstantiateModel,
    pub free_model_instance: FFreeModelInstance,
    pub set_time: FSetTime,
    pub set_continuous_states: FSetContinuousStates,
    pub completed_integrator_step: FCompletedIntegratorStep,
    pub set_real: FSetReal,
    pub set_integer: FSetInteger,
    pub set_boolean: FSetBoolean,
    pub set_string: FSetString,
    pub initialize: FInitialize,
    pub get_derivatives: FGetDerivatives,
    pub get_event_indicators: FGetEventIndicators,
    pub get_real: FGetReal,
    pub get_integer: FGetInteger,
    pub get_boolean: FGetBoolean,
    pub get_string: FGetString,
    pub event_update: FEventUpdate,
    pub get_continuous_states: FGetContinuousStates,
    pub get_nominal_continuous_states: FGetNominalContinuousStates,
    pub terminate: FTerminate,
}

macro_rules! resolve {
    ($lib:expr, $model_id:expr, $name:literal) => {{
        let symbol_name = format!("{}_{}", $model_id, $name);
        crate::ffi::resolve_symbol($lib, symbol_name.as_bytes())?
    }};
}

impl Symbols {
    /// Resolves every v1 ME symbol, each prefixed with `<model_id>_` as
    /// FMI 1.0 requires.
    pub fn resolve(lib: &Library, model_id: &str) -> Result<Self, libloading::Error> {
        Ok(Self {
            instantiate_model: resolve!(lib, model_id, "instantiateModel"),
            free_model_instance: resolve!(lib, model_id, "freeModelInstance"),
            set_time: resolve!(lib, model_id, "setTime"),
            set_continuous_states: resolve!(lib, model_id, "setContinuousStates"),
            completed_integrator_step: resolve!(lib, model_id, "completedIntegratorStep"),
            set_real: resolve!(lib, model_id, "setReal"),
            set_integer: resolve!(lib, model_id, "setInteger"),
            set_boolean: resolve!(lib, model_id, "setBoolean"),
            set_string: resolve!(lib, model_id, "setString"),
            initialize: resolve!(lib, model_id, "initialize"),
            get_derivatives: resolve!(lib, model_id, "getDerivatives"),
            get_event_indicators: resolve!(lib, model_id, "getEventIndicators"),
            get_real: resolve!(lib, model_id, "getReal"),
            get_integer: resolve!(lib, model_id, "getInteger"),
            get_boolean: resolve!(lib, model_id, "getBoolean"),
            get_string: resolve!(lib, model_id, "getString"),
            event_update: resolve!(lib, model_id, "eventUpdate"),
            get_continuous_states: resolve!(lib, model_id, "getContinuousStates"),
            get_nominal_continuous_states: resolve!(lib, model_id, "getNominalContinuousStates"),
            terminate: resolve!(lib, model_id, "terminate"),
        })
    }
}
