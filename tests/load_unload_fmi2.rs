//! Exercises the Model Manager's load/duplicate/unload contract and the FMI
//! 2.0 driver against a real compiled FMU. Requires `FMU_DATA_DIR` to point
//! at a local Modelica Reference-FMUs checkout — `#[ignore]`d so `cargo
//! test` stays offline by default. Run explicitly with
//! `cargo test -- --ignored`.

use fmi::error::LoadFmuStatus;
use fmi::model_manager::ModelManager;

#[test_log::test]
#[ignore = "requires FMU_DATA_DIR to point at a local Reference-FMUs checkout"]
fn loading_the_same_identifier_twice_reports_duplicate() {
    let reference_fmus = test_data::ReferenceFmus::new().unwrap();
    let path = reference_fmus.reference_fmu("BouncingBall", "2.0").unwrap();

    let manager = ModelManager::get();
    let first = manager.load_fmu(&path);
    assert_eq!(first.status, LoadFmuStatus::Success);
    let model_id = first.model_identifier.unwrap();

    let second = manager.load_fmu(&path);
    assert_eq!(second.status, LoadFmuStatus::Duplicate);

    assert_eq!(manager.unload_fmu(&model_id), fmi::error::UnloadFmuStatus::Ok);
}

#[test_log::test]
#[ignore = "requires FMU_DATA_DIR to point at a local Reference-FMUs checkout"]
fn loading_by_explicit_id_matches_declared_identifier() {
    let reference_fmus = test_data::ReferenceFmus::new().unwrap();
    let path = reference_fmus.reference_fmu("BouncingBall", "2.0").unwrap();

    let manager = ModelManager::get();
    let outcome = manager.load_fmu_by_id("BouncingBall", &path);
    assert_eq!(outcome.status, LoadFmuStatus::Success);
    let model_id = outcome.model_identifier.unwrap();
    assert_eq!(manager.unload_fmu(&model_id), fmi::error::UnloadFmuStatus::Ok);
}

#[test_log::test]
#[ignore = "requires FMU_DATA_DIR to point at a local Reference-FMUs checkout"]
fn loading_by_explicit_id_rejects_a_mismatched_identifier() {
    let reference_fmus = test_data::ReferenceFmus::new().unwrap();
    let path = reference_fmus.reference_fmu("BouncingBall", "2.0").unwrap();

    let manager = ModelManager::get();
    let outcome = manager.load_fmu_by_id("NotBouncingBall", &path);
    assert_eq!(outcome.status, LoadFmuStatus::IdentifierInvalid);
    assert!(outcome.model_identifier.is_none());
}

#[test_log::test]
#[ignore = "requires FMU_DATA_DIR to point at a local Reference-FMUs checkout"]
fn bouncing_ball_integrates_past_its_first_event() {
    use fmi::bare_fmu::BareFmu;
    use fmi::driver::fmi2_me::Fmi2ModelExchange;
    use fmi::driver::DriverConfig;
    use fmi::dynamical_system::DynamicalSystem as _;

    let reference_fmus = test_data::ReferenceFmus::new().unwrap();
    let path = reference_fmus.reference_fmu("BouncingBall", "2.0").unwrap();

    let manager = ModelManager::get();
    let model_id = manager.load_fmu(&path).model_identifier.unwrap();
    let BareFmu::V2(bare) = manager.get_instance(&model_id).unwrap() else {
        panic!("expected a v2 Bare FMU");
    };

    let mut instance = Fmi2ModelExchange::new(bare, "bouncing_ball_test", DriverConfig::default()).unwrap();
    instance.initialize(0.0, false, 0.0, None);

    let t_before = instance.get_time();
    let (t_after, flags) = instance.integrate(2.0, 0.001);
    assert!(t_after >= t_before);
    // BouncingBall crosses h=0 within the first two seconds.
    assert!(flags.any());
}
