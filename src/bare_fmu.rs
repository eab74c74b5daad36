//! Bare FMU: a loaded shared library paired with its parsed Model
//! Description, shared by every FMU Instance built on top of it.
//!
//! Mirrors the classic `BareFMUModelExchange`/`BareFMUCoSimulation`/`BareFMU2`
//! split: each variant owns a resolved function table plus a parsed Model
//! Description, formerly behind a `shared_ptr`. [`BareFmu`] folds those three
//! into one tagged enum — the abstract entity is the same across variants,
//! only the resolved symbol table and XML type differ.

use std::sync::Arc;

use libloading::Library;

use crate::ffi;

/// One loaded FMI 1.0 Model Exchange shared library.
pub struct BareFmuMeV1 {
    pub description: Arc<fmi_schema::fmi1::Fmi1ModelDescription>,
    pub symbols: ffi::fmi1::me::Symbols,
    /// Kept alive for as long as any resolved symbol may be called.
    _library: Library,
}

/// One loaded FMI 1.0 Co-Simulation shared library. Never stepped by this
/// crate — tracked so the Model Manager can load, identify, and unload it
/// like any other registered FMU.
pub struct BareFmuCsV1 {
    pub description: Arc<fmi_schema::fmi1::Fmi1ModelDescription>,
    pub symbols: ffi::fmi1::cs::Symbols,
    _library: Library,
}

/// One loaded FMI 2.0 shared library. FMI 2.0 unifies ME and CS behind one
/// `fmi2*` symbol namespace, so a single resolved table covers both — fields
/// outside the variant(s) the description actually declares are bound to the
/// `do_not_call` trap (see [`ffi::fmi2::do_not_call`]).
pub struct BareFmuV2 {
    pub description: Arc<fmi_schema::fmi2::Fmi2ModelDescription>,
    pub symbols: ffi::fmi2::Symbols,
    /// URL of the FMU's `resources/` directory, passed to `fmi2Instantiate`.
    pub resource_location: url::Url,
    _library: Library,
}

/// A loaded FMI shared library plus its parsed model description, tagged by
/// FMI version/variant. Cheaply clonable (`Arc`-wrapped) so every FMU
/// Instance built from the same Model Identifier shares one load.
#[derive(Clone)]
pub enum BareFmu {
    MeV1(Arc<BareFmuMeV1>),
    CsV1(Arc<BareFmuCsV1>),
    V2(Arc<BareFmuV2>),
}

impl BareFmuMeV1 {
    pub fn new(library: Library, description: fmi_schema::fmi1::Fmi1ModelDescription) -> Result<Self, libloading::Error> {
        let symbols = ffi::fmi1::me::Symbols::resolve(&library, &description.model_identifier)?;
        Ok(Self {
            description: Arc::new(description),
            symbols,
            _library: library,
        })
    }
}

impl BareFmuCsV1 {
    pub fn new(library: Library, description: fmi_schema::fmi1::Fmi1ModelDescription) -> Result<Self, libloading::Error> {
        let symbols = ffi::fmi1::cs::Symbols::resolve(&library, &description.model_identifier)?;
        Ok(Self {
            description: Arc::new(description),
            symbols,
            _library: library,
        })
    }
}

impl BareFmuV2 {
    pub fn new(
        library: Library,
        description: fmi_schema::fmi2::Fmi2ModelDescription,
        resource_location: url::Url,
    ) -> Result<Self, libloading::Error> {
        let provides_me = description.model_exchange.is_some();
        let provides_cs = description.co_simulation.is_some();
        let symbols = ffi::fmi2::Symbols::resolve(&library, provides_me, provides_cs)?;
        Ok(Self {
            description: Arc::new(description),
            symbols,
            resource_location,
            _library: library,
        })
    }
}

impl BareFmu {
    /// The model name as recorded in the Model Description, regardless of
    /// variant — used for log messages and error context.
    pub fn model_name(&self) -> &str {
        match self {
            BareFmu::MeV1(fmu) => &fmu.description.model_name,
            BareFmu::CsV1(fmu) => &fmu.description.model_name,
            BareFmu::V2(fmu) => &fmu.description.model_name,
        }
    }

    /// Number of references to this Bare FMU still outstanding, counting the
    /// Model Manager's own registry slot. Used by "unload by ID" to decide
    /// between `Ok` and `InUse`.
    pub fn strong_count(&self) -> usize {
        match self {
            BareFmu::MeV1(fmu) => Arc::strong_count(fmu),
            BareFmu::CsV1(fmu) => Arc::strong_count(fmu),
            BareFmu::V2(fmu) => Arc::strong_count(fmu),
        }
    }
}
