//! Raw FMI 2.0 Model Exchange (+ Co-Simulation common subset) C ABI.
//!
//! Field names/order below mirror the standard's `fmi2Functions` struct
//! exactly. Functions belonging to a variant the FMU's Model Description
//! does not declare are bound to [`do_not_call`] rather than left
//! unresolved, matching the standard's `fmi2DoNotCall` pattern.

use crate::typedefs::{Fmi2Boolean, Fmi2ComponentEnvironment, FmiComponent, FmiInteger, FmiReal, FmiString, FmiValueReference};
use libloading::Library;

// `fmi2CallbackLogger` is C-variadic (`message, ...`) in the standard header,
// so the FMU can hand it a printf-style format string. Stable Rust can
// declare a variadic `extern "C"` function signature but cannot *define* one
// — `c_variadic` is nightly-only. Formatting the variadic arguments is the
// exporting FMU's responsibility in practice, not the importer's, so the
// callback here is pinned to the fixed-arity case: a fully-formatted
// `message` with no trailing arguments, which is how the vast majority of
// real FMUs call it. See DESIGN.md.
pub type CallbackLogger = unsafe extern "C" fn(
    component_environment: Fmi2ComponentEnvironment,
    instance_name: FmiString,
    status: FmiInteger,
    category: FmiString,
    message: FmiString,
);
pub type CallbackAllocateMemory = unsafe extern "C" fn(n_obj: usize, size: usize) -> *mut std::ffi::c_void;
pub type CallbackFreeMemory = unsafe extern "C" fn(obj: *mut std::ffi::c_void);
pub type StepFinished = unsafe extern "C" fn(component_environment: Fmi2ComponentEnvironment, status: FmiInteger);

#[repr(C)]
#[derive(Clone, Copy)]
pub struct CallbackFunctions {
    pub logger: CallbackLogger,
    pub allocate_memory: CallbackAllocateMemory,
    pub free_memory: CallbackFreeMemory,
    pub step_finished: StepFinished,
    pub component_environment: Fmi2ComponentEnvironment,
}

/// Mirrors `fmi2EventInfo`: the raw v2 event-info struct returned by
/// `newDiscreteStates`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct EventInfo {
    pub new_discrete_states_needed: Fmi2Boolean,
    pub terminate_simulation: Fmi2Boolean,
    pub nominals_of_continuous_states_changed: Fmi2Boolean,
    pub values_of_continuous_states_changed: Fmi2Boolean,
    pub next_event_time_defined: Fmi2Boolean,
    pub next_event_time: FmiReal,
}

type FGetVersion = unsafe extern "C" fn() -> FmiString;
type FSetDebugLogging = unsafe extern "C" fn(c: FmiComponent, logging_on: Fmi2Boolean, n_categories: usize, categories: *const FmiString) -> FmiInteger;
type FInstantiate = unsafe extern "C" fn(
    instance_name: FmiString,
    fmu_type: FmiInteger,
    fmu_guid: FmiString,
    fmu_resource_location: FmiString,
    functions: *const CallbackFunctions,
    visible: Fmi2Boolean,
    logging_on: Fmi2Boolean,
) -> FmiComponent;
type FFreeInstance = unsafe extern "C" fn(c: FmiComponent);
type FSetupExperiment = unsafe extern "C" fn(c: FmiComponent, tolerance_defined: Fmi2Boolean, tolerance: FmiReal, start_time: FmiReal, stop_time_defined: Fmi2Boolean, stop_time: FmiReal) -> FmiInteger;
type FEnterInitializationMode = unsafe extern "C" fn(c: FmiComponent) -> FmiInteger;
type FExitInitializationMode = unsafe extern "C" fn(c: FmiComponent) -> FmiInteger;
type FTerminate = unsafe extern "C" fn(c: FmiComponent) -> FmiInteger;
type FReset = unsafe extern "C" fn(c: FmiComponent) -> FmiInteger;
type FGetReal = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *mut FmiReal) -> FmiInteger;
type FGetInteger = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *mut FmiInteger) -> FmiInteger;
type FGetBoolean = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *mut Fmi2Boolean) -> FmiInteger;
type FGetString = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *mut FmiString) -> FmiInteger;
type FSetReal = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *const FmiReal) -> FmiInteger;
type FSetInteger = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *const FmiInteger) -> FmiInteger;
type FSetBoolean = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *const Fmi2Boolean) -> FmiInteger;
type FSetString = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *const FmiString) -> FmiInteger;
type FGetDirectionalDerivative = unsafe extern "C" fn(
    c: FmiComponent,
    v_unknown_ref: *const FmiValueReference,
    n_unknown: usize,
    v_known_ref: *const FmiValueReference,
    n_known: usize,
    dv_known: *const FmiReal,
    dv_unknown: *mut FmiReal,
) -> FmiInteger;
type FEnterEventMode = unsafe extern "C" fn(c: FmiComponent) -> FmiInteger;
type FNewDiscreteStates = unsafe extern "C" fn(c: FmiComponent, event_info: *mut EventInfo) -> FmiInteger;
type FEnterContinuousTimeMode = unsafe extern "C" fn(c: FmiComponent) -> FmiInteger;
type FCompletedIntegratorStep = unsafe extern "C" fn(c: FmiComponent, no_set_fmu_state_prior_to_current_point: Fmi2Boolean, enter_event_mode: *mut Fmi2Boolean, terminate_simulation: *mut Fmi2Boolean) -> FmiInteger;
type FSetTime = unsafe extern "C" fn(c: FmiComponent, time: FmiReal) -> FmiInteger;
type FSetContinuousStates = unsafe extern "C" fn(c: FmiComponent, x: *const FmiReal, nx: usize) -> FmiInteger;
type FGetDerivatives = unsafe extern "C" fn(c: FmiComponent, derivatives: *mut FmiReal, nx: usize) -> FmiInteger;
type FGetEventIndicators = unsafe extern "C" fn(c: FmiComponent, event_indicators: *mut FmiReal, ni: usize) -> FmiInteger;
type FGetContinuousStates = unsafe extern "C" fn(c: FmiComponent, x: *mut FmiReal, nx: usize) -> FmiInteger;
type FGetNominalsOfContinuousStates = unsafe extern "C" fn(c: FmiComponent, x_nominal: *mut FmiReal, nx: usize) -> FmiInteger;

// Co-Simulation subset. The driver never steps a CS FMU (no master algorithm)
// but the Model Manager still resolves these so a CS-only or CS+ME FMU can
// be loaded, identified, and unloaded.
type FSetRealInputDerivatives = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, order: *const FmiInteger, value: *const FmiReal) -> FmiInteger;
type FGetRealOutputDerivatives = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, order: *const FmiInteger, value: *mut FmiReal) -> FmiInteger;
type FDoStep = unsafe extern "C" fn(c: FmiComponent, current_communication_point: FmiReal, communication_step_size: FmiReal, no_set_fmu_state_prior_to_current_point: Fmi2Boolean) -> FmiInteger;
type FCancelStep = unsafe extern "C" fn(c: FmiComponent) -> FmiInteger;
type FGetStatus = unsafe extern "C" fn(c: FmiComponent, kind: FmiInteger, value: *mut FmiInteger) -> FmiInteger;
type FGetRealStatus = unsafe extern "C" fn(c: FmiComponent, kind: FmiInteger, value: *mut FmiReal) -> FmiInteger;
type FGetIntegerStatus = unsafe extern "C" fn(c: FmiComponent, kind: FmiInteger, value: *mut FmiInteger) -> FmiInteger;
type FGetBooleanStatus = unsafe extern "C" fn(c: FmiComponent, kind: FmiInteger, value: *mut Fmi2Boolean) -> FmiInteger;
type FGetStringStatus = unsafe extern "C" fn(c: FmiComponent, kind: FmiInteger, value: *mut FmiString) -> FmiInteger;

/// Resolved function-pointer table for one loaded FMI 2.0 shared library.
///
/// `do_not_call`-bound fields are still present (so the driver never has to
/// check for a null function pointer) but calling them aborts the process,
/// matching the original's `fmi2DoNotCall` trap pattern for entry points the
/// Model Description did not declare support for.
pub struct Symbols {
    pub get_version: FGetVersion,
    pub set_debug_logging: FSetDebugLogging,
    pub instantiate: FInstantiate,
    pub free_instance: FFreeInstance,
    pub setup_experiment: FSetupExperiment,
    pub enter_initialization_mode: FEnterInitializationMode,
    pub exit_initialization_mode: FExitInitializationMode,
    pub terminate: FTerminate,
    pub reset: FReset,
    pub get_real: FGetReal,
    pub get_integer: FGetInteger,
    pub get_boolean: FGetBoolean,
    pub get_string: FGetString,
    pub set_real: FSetReal,
    pub set_integer: FSetInteger,
    pub set_boolean: FSetBoolean,
    pub set_string: FSetString,
    pub get_directional_derivative: Option<FGetDirectionalDerivative>,

    // Model Exchange subset — bound to `do_not_call` if the FMU is CS-only.
    pub enter_event_mode: FEnterEventMode,
    pub new_discrete_states: FNewDiscreteStates,
    pub enter_continuous_time_mode: FEnterContinuousTimeMode,
    pub completed_integrator_step: FCompletedIntegratorStep,
    pub set_time: FSetTime,
    pub set_continuous_states: FSetContinuousStates,
    pub get_derivatives: FGetDerivatives,
    pub get_event_indicators: FGetEventIndicators,
    pub get_continuous_states: FGetContinuousStates,
    pub get_nominals_of_continuous_states: FGetNominalsOfContinuousStates,

    // Co-Simulation subset — bound to `do_not_call` if the FMU is ME-only.
    pub set_real_input_derivatives: FSetRealInputDerivatives,
    pub get_real_output_derivatives: FGetRealOutputDerivatives,
    pub do_step: FDoStep,
    pub cancel_step: FCancelStep,
    pub get_status: FGetStatus,
    pub get_real_status: FGetRealStatus,
    pub get_integer_status: FGetIntegerStatus,
    pub get_boolean_status: FGetBooleanStatus,
    pub get_string_status: FGetStringStatus,
}

/// Trap bound to any function-pointer slot for a variant subset the FMU's
/// Model Description did not declare. Mirrors the standard's
/// `fmi2DoNotCall`.
pub extern "C" fn do_not_call() -> ! {
    panic!("called an FMI2 function not supported by this FMU's declared variant");
}

macro_rules! resolve {
    ($lib:expr, $name:literal) => {{
        crate::ffi::resolve_symbol($lib, concat!("fmi2", $name).as_bytes())?
    }};
}

impl Symbols {
    /// Resolves the common subset plus, conditionally, the ME and CS
    /// subsets: after the common subset, ME-specific and CS-specific
    /// symbols are resolved only if the Model Description declares the
    /// matching variant.
    pub fn resolve(lib: &Library, provides_me: bool, provides_cs: bool) -> Result<Self, libloading::Error> {
        let get_directional_derivative = unsafe {
            lib.get::<FGetDirectionalDerivative>(b"fmi2GetDirectionalDerivative")
                .ok()
                .map(|s| *s)
        };

        macro_rules! me_symbol {
            ($field_ty:ty, $name:literal) => {
                if provides_me {
                    resolve!(lib, $name)
                } else {
                    unsafe { std::mem::transmute::<extern "C" fn() -> !, $field_ty>(do_not_call) }
                }
            };
        }

        macro_rules! cs_symbol {
            ($field_ty:ty, $name:literal) => {
                if provides_cs {
                    resolve!(lib, $name)
                } else {
                    unsafe { std::mem::transmute::<extern "C" fn() -> !, $field_ty>(do_not_call) }
                }
            };
        }

        Ok(Self {
            get_version: resolve!(lib, "GetVersion"),
            set_debug_logging: resolve!(lib, "SetDebugLogging"),
            instantiate: resolve!(lib, "Instantiate"),
            free_instance: resolve!(lib, "FreeInstance"),
            setup_experiment: resolve!(lib, "SetupExperiment"),
            enter_initialization_mode: resolve!(lib, "EnterInitializationMode"),
            exit_initialization_mode: resolve!(lib, "ExitInitializationMode"),
            terminate: resolve!(lib, "Terminate"),
            reset: resolve!(lib, "Reset"),
            get_real: resolve!(lib, "GetReal"),
            get_integer: resolve!(lib, "GetInteger"),
            get_boolean: resolve!(lib, "GetBoolean"),
            get_string: resolve!(lib, "GetString"),
            set_real: resolve!(lib, "SetReal"),
            set_integer: resolve!(lib, "SetInteger"),
            set_boolean: resolve!(lib, "SetBoolean"),
            set_string: resolve!(lib, "SetString"),
            get_directional_derivative,

            enter_event_mode: me_symbol!(FEnterEventMode, "EnterEventMode"),
            new_discrete_states: me_symbol!(FNewDiscreteStates, "NewDiscreteStates"),
            enter_continuous_time_mode: me_symbol!(FEnterContinuousTimeMode, "EnterContinuousTimeMode"),
            completed_integrator_step: me_symbol!(FCompletedIntegratorStep, "CompletedIntegratorStep"),
            set_time: me_symbol!(FSetTime, "SetTime"),
            set_continuous_states: me_symbol!(FSetContinuousStates, "SetContinuousStates"),
            get_derivatives: me_symbol!(FGetDerivatives, "GetDerivatives"),
            get_event_indicators: me_symbol!(FGetEventIndicators, "GetEventIndicators"),
            get_continuous_states: me_symbol!(FGetContinuousStates, "GetContinuousStates"),
            get_nominals_of_continuous_states: me_symbol!(FGetNominalsOfContinuousStates, "GetNominalsOfContinuousStates"),

            set_real_input_derivatives: cs_symbol!(FSetRealInputDerivatives, "SetRealInputDerivatives"),
            get_real_output_derivatives: cs_symbol!(FGetRealOutputDerivatives, "GetRealOutputDerivatives"),
            do_step: cs_symbol!(FDoStep, "DoStep"),
            cancel_step: cs_symbol!(FCancelStep, "CancelStep"),
            get_status: cs_symbol!(FGetStatus, "GetStatus"),
            get_real_status: cs_symbol!(FGetRealStatus, "GetRealStatus"),
            get_integer_status: cs_symbol!(FGetIntegerStatus, "GetIntegerStatus"),
            get_boolean_status: cs_symbol!(FGetBooleanStatus, "GetBooleanStatus"),
            get_string_status: cs_symbol!(FGetStringStatus, "GetStringStatus"),
        })
    }
}
