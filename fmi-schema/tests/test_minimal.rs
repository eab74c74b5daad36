use std::str::FromStr;

use fmi_schema::minimal::ModelDescription;

#[test]
fn test_minimal() -> Result<(), Box<dyn std::error::Error>> {
    let test_file = std::env::current_dir().map(|path| path.join("tests/FMI2.xml"))?;
    let data = std::fs::read_to_string(test_file)?;
    let md = ModelDescription::from_str(&data)?;
    assert_eq!(md.version()?, semver::Version::new(2, 0, 0));
    assert_eq!(md.model_name, "BouncingBall");

    Ok(())
}
