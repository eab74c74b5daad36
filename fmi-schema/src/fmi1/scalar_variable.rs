use std::{fmt::Display, str::FromStr};

/// Enumeration that defines the causality of the variable, FMI 1.0 naming
/// (a strict subset of the FMI 2.0 set: no `calculatedParameter`).
#[derive(Clone, Default, PartialEq, Debug)]
pub enum Causality {
    Input,
    Output,
    #[default]
    Internal,
    None,
}

impl FromStr for Causality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input" => Ok(Causality::Input),
            "output" => Ok(Causality::Output),
            "internal" => Ok(Causality::Internal),
            "none" => Ok(Causality::None),
            _ => Err(format!("Invalid Causality: {}", s)),
        }
    }
}

impl Display for Causality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Causality::Input => "input",
            Causality::Output => "output",
            Causality::Internal => "internal",
            Causality::None => "none",
        };
        write!(f, "{}", s)
    }
}

/// FMI 1.0's variability enumeration lacks `fixed`; otherwise matches 2.0.
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub enum Variability {
    Parameter,
    Constant,
    Discrete,
    #[default]
    Continuous,
}

impl FromStr for Variability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parameter" => Ok(Variability::Parameter),
            "constant" => Ok(Variability::Constant),
            "discrete" => Ok(Variability::Discrete),
            "continuous" => Ok(Variability::Continuous),
            _ => Err(format!("Invalid Variability: {}", s)),
        }
    }
}

impl Display for Variability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Variability::Parameter => "parameter",
            Variability::Constant => "constant",
            Variability::Discrete => "discrete",
            Variability::Continuous => "continuous",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "Real")]
pub struct Real {
    #[xml(attr = "declaredType")]
    pub declared_type: Option<String>,

    /// Value before initialization.
    #[xml(attr = "start")]
    pub start: Option<f64>,

    /// If present, this variable is the derivative of the variable with
    /// ScalarVariable index "derivative".
    #[xml(attr = "derivative")]
    pub derivative: Option<u32>,

    /// `true` if the `start` value is fixed, i.e. an initialization problem
    /// must not change it.
    #[xml(attr = "fixed")]
    pub fixed: Option<bool>,
}

#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "Integer")]
pub struct Integer {
    #[xml(attr = "declaredType")]
    pub declared_type: Option<String>,
    #[xml(attr = "start")]
    pub start: Option<i32>,
    #[xml(attr = "fixed")]
    pub fixed: Option<bool>,
}

#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "Boolean")]
pub struct Boolean {
    #[xml(attr = "declaredType")]
    pub declared_type: Option<String>,
    #[xml(attr = "start")]
    pub start: Option<bool>,
}

#[derive(Clone, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
pub enum ScalarVariableElement {
    #[xml(tag = "Real")]
    Real(Real),
    #[xml(tag = "Integer")]
    Integer(Integer),
    #[xml(tag = "Boolean")]
    Boolean(Boolean),
    #[xml(tag = "String")]
    String,
    #[xml(tag = "Enumeration")]
    Enumeration,
}

impl Default for ScalarVariableElement {
    fn default() -> Self {
        Self::Real(Real::default())
    }
}

#[derive(Default, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "ScalarVariable", strict(unknown_attribute, unknown_element))]
pub struct ScalarVariable {
    #[xml(attr = "name")]
    pub name: String,

    #[xml(attr = "valueReference")]
    pub value_reference: u32,

    #[xml(attr = "description")]
    pub description: Option<String>,

    #[xml(attr = "causality", default)]
    pub causality: Causality,

    #[xml(attr = "variability", default)]
    pub variability: Variability,

    /// Another variable this one is an alias of, if any.
    #[xml(attr = "alias")]
    pub alias: Option<String>,

    #[xml(
        child = "Real",
        child = "Integer",
        child = "Boolean",
        child = "String",
        child = "Enumeration"
    )]
    pub elem: ScalarVariableElement,
}

impl ScalarVariable {
    pub fn is_continuous_input(&self) -> bool {
        matches!(
            (&self.elem, &self.causality),
            (ScalarVariableElement::Real { .. }, Causality::Input)
        )
    }
}

#[cfg(test)]
mod tests {
    use hard_xml::XmlRead;

    use super::*;

    #[test]
    fn test_scalar_variable() {
        let s = r#"
        <ScalarVariable
            name="inertia1.J"
            valueReference="1073741824"
            description="Moment of load inertia"
            causality="internal"
            variability="parameter">
            <Real declaredType="Modelica.SIunits.Inertia" start="1" fixed="true"/>
        </ScalarVariable>
        "#;
        let sv = ScalarVariable::from_str(s).unwrap();
        assert_eq!(sv.name, "inertia1.J");
        assert_eq!(sv.value_reference, 1073741824);
        assert_eq!(sv.causality, Causality::Internal);
        assert_eq!(sv.variability, Variability::Parameter);
        assert_eq!(
            sv.elem,
            ScalarVariableElement::Real(Real {
                declared_type: Some("Modelica.SIunits.Inertia".to_string()),
                start: Some(1.0),
                derivative: None,
                fixed: Some(true),
            })
        );
    }
}
