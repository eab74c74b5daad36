//! Raw FMI 1.0 Co-Simulation C ABI.
//!
//! No vendored `fmi_cs.h` is available in this crate's source material (only
//! `fmi_me.h` is carried); the signatures below are reconstructed from the
//! public FMI 1.0 standard, which is stable and narrow enough to transcribe
//! directly, following the exact same `<model_id>_` resolution convention and
//! callback types already grounded in [`super::me`].
//!
//! The driver never steps a CS FMU (co-simulation master algorithms are out
//! of scope for this importer) — this table exists so the Model Manager can
//! still load, identify, and unload CS FMUs per its registry contract.

use super::me::CallbackFunctions;
use crate::typedefs::{Fmi1Boolean, FmiComponent, FmiInteger, FmiReal, FmiString, FmiValueReference};
use libloading::Library;

type FInstantiateSlave = unsafe extern "C" fn(
    instance_name: FmiString,
    guid: FmiString,
    fmu_location: FmiString,
    mime_type: FmiString,
    timeout: FmiReal,
    visible: Fmi1Boolean,
    interactive: Fmi1Boolean,
    functions: CallbackFunctions,
    logging_on: Fmi1Boolean,
) -> FmiComponent;
type FInitializeSlave = unsafe extern "C" fn(c: FmiComponent, t_start: FmiReal, stop_time_defined: Fmi1Boolean, t_stop: FmiReal) -> FmiInteger;
type FTerminateSlave = unsafe extern "C" fn(c: FmiComponent) -> FmiInteger;
type FResetSlave = unsafe extern "C" fn(c: FmiComponent) -> FmiInteger;
type FFreeSlaveInstance = unsafe extern "C" fn(c: FmiComponent);
type FSetReal = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *const FmiReal) -> FmiInteger;
type FSetInteger = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *const FmiInteger) -> FmiInteger;
type FSetBoolean = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *const Fmi1Boolean) -> FmiInteger;
type FSetString = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *const FmiString) -> FmiInteger;
type FGetReal = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *mut FmiReal) -> FmiInteger;
type FGetInteger = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *mut FmiInteger) -> FmiInteger;
type FGetBoolean = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *mut Fmi1Boolean) -> FmiInteger;
type FGetString = unsafe extern "C" fn(c: FmiComponent, vr: *const FmiValueReference, nvr: usize, value: *mut FmiString) -> FmiInteger;
type FDoStep = unsafe extern "C" fn(c: FmiComponent, current_communication_point: FmiReal, communication_step_size: FmiReal, new_step: Fmi1Boolean) -> FmiInteger;
type FCancelStep = unsafe extern "C" fn(c: FmiComponent) -> FmiInteger;
type FGetStatus = unsafe extern "C" fn(c: FmiComponent, kind: FmiInteger, value: *mut FmiInteger) -> FmiInteger;

/// Resolved function-pointer table for one loaded FMI 1.0 Co-Simulation
/// shared library. The importer only uses this to satisfy the Model
/// Manager's load/identify/unload contract — no stepping loop is built on
/// top of it.
pub struct Symbols {
    pub instantiate_slave: FInstantiateSlave,
    pub initialize_slave: FInitializeSlave,
    pub terminate_slave: FTerminateSlave,
    pub reset_slave: FResetSlave,
    pub free_slave_instance: FFreeSlaveInstance,
    pub set_real: FSetReal,
    pub set_integer: FSetInteger,
    pub set_boolean: FSetBoolean,
    pub set_string: FSetString,
    pub get_real: FGetReal,
    pub get_integer: FGetInteger,
    pub get_boolean: FGetBoolean,
    pub get_string: FGetString,
    pub do_step: FDoStep,
    pub cancel_step: FCancelStep,
    pub get_status: FGetStatus,
}

macro_rules! resolve {
    ($lib:expr, $model_id:expr, $name:literal) => {{
        let symbol_name = format!("{}_{}", $model_id, $name);
        crate::ffi::resolve_symbol($lib, symbol_name.as_bytes())?
    }};
}

impl Symbols {
    pub fn resolve(lib: &Library, model_id: &str) -> Result<Self, libloading::Error> {
        Ok(Self {
            instantiate_slave: resolve!(lib, model_id, "instantiateSlave"),
            initialize_slave: resolve!(lib, model_id, "initializeSlave"),
            terminate_slave: resolve!(lib, model_id, "terminateSlave"),
            reset_slave: resolve!(lib, model_id, "resetSlave"),
            free_slave_instance: resolve!(lib, model_id, "freeSlaveInstance"),
            set_real: resolve!(lib, model_id, "setReal"),
            set_integer: resolve!(lib, model_id, "setInteger"),
            set_boolean: resolve!(lib, model_id, "setBoolean"),
            set_string: resolve!(lib, model_id, "setString"),
            get_real: resolve!(lib, model_id, "getReal"),
            get_integer: resolve!(lib, model_id, "getInteger"),
            get_boolean: resolve!(lib, model_id, "getBoolean"),
            get_string: resolve!(lib, model_id, "getString"),
            do_step: resolve!(lib, model_id, "doStep"),
            cancel_step: resolve!(lib, model_id, "cancelStep"),
            get_status: resolve!(lib, model_id, "getStatus"),
        })
    }
}
