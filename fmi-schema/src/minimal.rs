//! Minimal FMI definitions for determining FMI version.

use std::str::FromStr;

/// A minimal model description that only contains the FMI version.
/// Used to determine the FMI version of an FMU before committing to the
/// full FMI 1.0 or FMI 2.0 parser.
#[derive(Default, PartialEq, Debug, hard_xml::XmlRead)]
#[xml(tag = "fmiModelDescription")]
pub struct ModelDescription {
    #[xml(attr = "fmiVersion")]
    pub fmi_version: String,
    #[xml(attr = "modelName")]
    pub model_name: String,
}

impl ModelDescription {
    /// Returns the parsed FMI version as a semver::Version
    pub fn version(&self) -> Result<semver::Version, crate::Error> {
        lenient_semver::parse(&self.fmi_version).map_err(|e| e.owned().into())
    }
}

impl FromStr for ModelDescription {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hard_xml::XmlRead::from_str(s).map_err(crate::Error::XmlParse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_unknown_children_and_attrs() {
        let s = r#"<fmiModelDescription fmiVersion="2.0" modelName="Zigzag" guid="{x}">
            <ModelVariables><ScalarVariable name="x" valueReference="0"/></ModelVariables>
        </fmiModelDescription>"#;
        let md = ModelDescription::from_str(s).unwrap();
        assert_eq!(md.fmi_version, "2.0");
        assert_eq!(md.model_name, "Zigzag");
    }
}
