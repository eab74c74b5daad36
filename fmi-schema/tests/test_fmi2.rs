//! Test FMI 2.0 schema by parsing the FMI2.xml file.

#[test]
#[cfg(feature = "fmi2")]
fn test_fmi2() {
    use fmi_schema::fmi2::Fmi2ModelDescription;

    let test_file = std::env::current_dir()
        .map(|path| path.join("tests/FMI2.xml"))
        .unwrap();
    let xml_content = std::fs::read_to_string(test_file).unwrap();
    let model: Fmi2ModelDescription = fmi_schema::deserialize(&xml_content).unwrap();

    assert_eq!(model.model_name, "BouncingBall");
    assert_eq!(model.num_event_indicators(), 1);
    assert_eq!(model.num_states(), 2);
}
