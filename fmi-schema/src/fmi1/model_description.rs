use crate::{traits::FmiModelDescription, Error};

use super::ScalarVariable;

/// Top-level FMI 1.0 Model Exchange `modelDescription.xml` root element.
///
/// Unlike FMI 2.0, which nests `modelIdentifier`/`numberOfEventIndicators`
/// inside a `<ModelExchange>` child so one description can additionally
/// carry `<CoSimulation>`, FMI 1.0 ME puts them directly on the root —
/// a v1 FMU is either an ME binary or a CS binary, never both from one XML.
#[derive(Default, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(
    tag = "fmiModelDescription",
    strict(unknown_attribute, unknown_element)
)]
pub struct Fmi1ModelDescription {
    #[xml(attr = "fmiVersion")]
    pub fmi_version: String,

    #[xml(attr = "modelName")]
    pub model_name: String,

    /// Short class name according to C-syntax, used to build the
    /// `<modelIdentifier>_<fmiFunctionName>` symbol prefix.
    #[xml(attr = "modelIdentifier")]
    pub model_identifier: String,

    #[xml(attr = "guid")]
    pub guid: String,

    #[xml(attr = "description")]
    pub description: Option<String>,

    #[xml(attr = "author")]
    pub author: Option<String>,

    #[xml(attr = "version")]
    pub version: Option<String>,

    #[xml(attr = "generationTool")]
    pub generation_tool: Option<String>,

    #[xml(attr = "generationDateAndTime")]
    pub generation_date_and_time: Option<String>,

    #[xml(attr = "variableNamingConvention")]
    pub variable_naming_convention: Option<String>,

    #[xml(attr = "numberOfContinuousStates")]
    pub number_of_continuous_states: u32,

    #[xml(attr = "numberOfEventIndicators")]
    pub number_of_event_indicators: u32,

    #[xml(child = "UnitDefinitions")]
    pub unit_definitions: Option<UnitDefinitions>,

    #[xml(child = "DefaultExperiment")]
    pub default_experiment: Option<DefaultExperiment>,

    #[xml(child = "VendorAnnotations")]
    pub vendor_annotations: Option<VendorAnnotations>,

    #[xml(child = "ModelVariables", default)]
    pub model_variables: ModelVariables,
}

impl Fmi1ModelDescription {
    pub fn num_variables(&self) -> usize {
        self.model_variables.variables.len()
    }

    pub fn num_states(&self) -> usize {
        self.number_of_continuous_states as usize
    }

    pub fn num_event_indicators(&self) -> usize {
        self.number_of_event_indicators as usize
    }

    pub fn get_model_variables(&self) -> impl Iterator<Item = &ScalarVariable> {
        self.model_variables.variables.iter()
    }

    pub fn model_variable_by_name(&self, name: &str) -> Result<&ScalarVariable, Error> {
        self.model_variables
            .variables
            .iter()
            .find(|var| var.name == name)
            .ok_or_else(|| Error::VariableNotFound(name.to_owned()))
    }
}

impl FmiModelDescription for Fmi1ModelDescription {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn version_string(&self) -> &str {
        &self.fmi_version
    }

    fn serialize(&self) -> Result<String, Error> {
        hard_xml::XmlWrite::to_string(self).map_err(Error::XmlParse)
    }

    fn deserialize(xml: &str) -> Result<Self, Error> {
        hard_xml::XmlRead::from_str(xml).map_err(Error::XmlParse)
    }
}

#[derive(Default, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "VendorAnnotations", strict(unknown_element))]
pub struct VendorAnnotations {
    #[xml(child = "Tool")]
    pub tools: Vec<Tool>,
}

#[derive(Default, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "Tool")]
pub struct Tool {
    #[xml(attr = "name")]
    pub name: String,
}

#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "DefaultExperiment")]
pub struct DefaultExperiment {
    #[xml(attr = "startTime")]
    pub start_time: Option<f64>,
    #[xml(attr = "stopTime")]
    pub stop_time: Option<f64>,
    #[xml(attr = "tolerance")]
    pub tolerance: Option<f64>,
}

impl crate::traits::DefaultExperiment for Fmi1ModelDescription {
    fn start_time(&self) -> Option<f64> {
        self.default_experiment.as_ref().and_then(|de| de.start_time)
    }

    fn stop_time(&self) -> Option<f64> {
        self.default_experiment.as_ref().and_then(|de| de.stop_time)
    }

    fn tolerance(&self) -> Option<f64> {
        self.default_experiment.as_ref().and_then(|de| de.tolerance)
    }

    fn step_size(&self) -> Option<f64> {
        None
    }
}

#[derive(Default, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "UnitDefinitions", strict(unknown_element))]
pub struct UnitDefinitions {
    #[xml(child = "BaseUnit")]
    pub units: Vec<BaseUnit>,
}

#[derive(Default, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "BaseUnit")]
pub struct BaseUnit {
    #[xml(attr = "unit")]
    pub unit: String,
}

#[derive(Default, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "ModelVariables", strict(unknown_attribute, unknown_element))]
pub struct ModelVariables {
    #[xml(child = "ScalarVariable")]
    pub variables: Vec<ScalarVariable>,
}

#[cfg(test)]
mod tests {
    use hard_xml::XmlRead;

    use super::*;

    #[test]
    fn test_model_description() {
        let s = r##"<?xml version="1.0" encoding="UTF-8"?>
<fmiModelDescription
 fmiVersion="1.0"
 modelName="Zigzag"
 modelIdentifier="zigzag"
 guid="{8c4e810f-3df3-4a00-8276-176fa3c9f9e0}"
 description="Sawtooth state-event model"
 numberOfContinuousStates="1"
 numberOfEventIndicators="1">
 <DefaultExperiment startTime="0.0" stopTime="10.0" tolerance="0.0001"/>
 <ModelVariables>
    <ScalarVariable name="x" valueReference="0" causality="output" variability="continuous">
        <Real start="0.0"/>
    </ScalarVariable>
    <ScalarVariable name="der(x)" valueReference="1" causality="internal" variability="continuous">
        <Real derivative="1"/>
    </ScalarVariable>
 </ModelVariables>
</fmiModelDescription>"##;
        let md = Fmi1ModelDescription::from_str(s).unwrap();
        assert_eq!(md.fmi_version, "1.0");
        assert_eq!(md.model_identifier, "zigzag");
        assert_eq!(md.num_states(), 1);
        assert_eq!(md.num_event_indicators(), 1);
        assert_eq!(md.num_variables(), 2);
        assert!(md.model_variable_by_name("x").is_ok());
        assert!(md.model_variable_by_name("missing").is_err());
    }
}
