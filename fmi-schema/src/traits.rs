//! Common traits for FMI schema

/// The major FMI version a model description declares, independent of the
/// concrete schema (1.0 or 2.0) used to parse it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MajorVersion {
    FMI1,
    FMI2,
}

pub trait DefaultExperiment {
    fn start_time(&self) -> Option<f64>;
    fn stop_time(&self) -> Option<f64>;
    fn tolerance(&self) -> Option<f64>;
    fn step_size(&self) -> Option<f64>;
}

/// Common surface shared by every version's top-level model description.
pub trait FmiModelDescription: Sized {
    fn model_name(&self) -> &str;
    fn version_string(&self) -> &str;
    fn serialize(&self) -> Result<String, crate::Error>;
    fn deserialize(xml: &str) -> Result<Self, crate::Error>;

    /// Parses [`Self::version_string`] as a semver version.
    fn version(&self) -> Result<semver::Version, crate::Error> {
        lenient_semver::parse(self.version_string())
            .map_err(|e| e.owned().into())
    }

    /// The major FMI version, derived from [`Self::version`].
    fn major_version(&self) -> Result<MajorVersion, crate::Error> {
        match self.version()?.major {
            1 => Ok(MajorVersion::FMI1),
            2 => Ok(MajorVersion::FMI2),
            _ => Err(crate::Error::XmlParse(format!(
                "unsupported FMI version: {}",
                self.version_string()
            ))),
        }
    }
}

/// Common surface shared by the `ModelExchange`/`CoSimulation` interface-type
/// child elements across FMI versions.
pub trait FmiInterfaceType {
    fn model_identifier(&self) -> &str;
    fn needs_execution_tool(&self) -> Option<bool>;
    fn can_be_instantiated_only_once_per_process(&self) -> Option<bool>;
    fn can_get_and_set_fmu_state(&self) -> Option<bool>;
    fn can_serialize_fmu_state(&self) -> Option<bool>;
    fn provides_directional_derivatives(&self) -> Option<bool>;
    fn provides_adjoint_derivatives(&self) -> Option<bool>;
    fn provides_per_element_dependencies(&self) -> Option<bool>;
}
