#![doc=include_str!( "../README.md")]
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![deny(unsafe_code)]
#![deny(clippy::all)]

use thiserror::Error;

pub mod date_time;
#[cfg(feature = "fmi1")]
pub mod fmi1;
#[cfg(feature = "fmi2")]
pub mod fmi2;
pub mod minimal;
pub mod traits;
pub mod variable_counts;

pub use traits::MajorVersion;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Variable {0} not found")]
    VariableNotFound(String),

    #[error(transparent)]
    Semver(#[from] lenient_semver::parser::OwnedError),

    #[error("Error parsing XML: {0}")]
    XmlParse(String),
}

/// Deserializes any schema type that derives `hard_xml::XmlRead` from its XML
/// document or fragment.
pub fn deserialize<'a, T: hard_xml::XmlRead<'a>>(xml: &'a str) -> Result<T, Error> {
    T::from_str(xml).map_err(|e| Error::XmlParse(e.to_string()))
}

/// Serializes any schema type that derives `hard_xml::XmlWrite` to XML. When
/// `fragment` is `false` the result is prefixed with an XML declaration;
/// when `true` the bare element is returned.
pub fn serialize<T: hard_xml::XmlWrite>(value: &T, fragment: bool) -> Result<String, Error> {
    let xml = value
        .to_string()
        .map_err(|e| Error::XmlParse(e.to_string()))?;
    let body = xml.strip_prefix("<?xml version=\"1.0\" encoding=\"UTF-8\"?>").unwrap_or(&xml);
    if fragment {
        Ok(body.trim_start().to_string())
    } else if xml.starts_with("<?xml") {
        Ok(xml)
    } else {
        Ok(format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>{body}"
        ))
    }
}
