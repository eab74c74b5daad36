//! FMI 1.0 schema definitions.
//!
//! This module covers the Model Exchange subset of the FMI 1.0 XML schema:
//! the importer only drives ME FMUs (see the crate root docs), so the
//! Co-Simulation-only elements (`<Implementation>`, CS capability flags) are
//! intentionally not modeled here.

mod model_description;
mod scalar_variable;

use std::str::FromStr;

pub use model_description::*;
pub use scalar_variable::*;

use crate::{
    traits::FmiModelDescription as _,
    variable_counts::{Counts, VariableCounts},
    Error,
};

impl FromStr for Fmi1ModelDescription {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::deserialize(s)
    }
}

impl VariableCounts for ModelVariables {
    fn model_counts(&self) -> Counts {
        self.variables.iter().fold(Counts::default(), |mut cts, sv| {
            match sv.variability {
                Variability::Constant => cts.num_constants += 1,
                Variability::Continuous => cts.num_continuous += 1,
                Variability::Discrete => cts.num_discrete += 1,
                Variability::Parameter => cts.num_parameters += 1,
            }
            match sv.causality {
                Causality::Input => cts.num_inputs += 1,
                Causality::Output => cts.num_outputs += 1,
                Causality::Internal => cts.num_local += 1,
                Causality::None => {}
            }
            match sv.elem {
                ScalarVariableElement::Real { .. } => cts.num_real_vars += 1,
                ScalarVariableElement::Integer { .. } => cts.num_integer_vars += 1,
                ScalarVariableElement::Enumeration { .. } => cts.num_enum_vars += 1,
                ScalarVariableElement::Boolean { .. } => cts.num_bool_vars += 1,
                ScalarVariableElement::String { .. } => cts.num_string_vars += 1,
            }
            cts
        })
    }
}
