//! Model Manager registry behaviour that doesn't require a compiled FMU
//! binary to exercise: unknown-id lookups and unload-of-nothing are well
//! defined outcomes, not exceptions (see `fmi::error::UnloadFmuStatus`).

use fmi::error::UnloadFmuStatus;
use fmi::model_manager::ModelManager;

#[test]
fn unknown_model_identifier_resolves_to_nothing() {
    let manager = ModelManager::get();
    assert!(manager.get_model("does-not-exist").is_none());
    assert!(manager.get_slave("does-not-exist").is_none());
    assert!(manager.get_instance("does-not-exist").is_none());
    assert!(manager.type_of_loaded_fmu("does-not-exist").is_none());
}

#[test]
fn unloading_an_unknown_identifier_reports_not_found() {
    let manager = ModelManager::get();
    assert_eq!(manager.unload_fmu("does-not-exist-either"), UnloadFmuStatus::NotFound);
}
