//! Locates locally-cached Modelica Reference-FMUs for the handful of tests
//! that need to exercise the real FFI boundary rather than a hand-written
//! `DynamicalSystem` fixture.
//!
//! FMU binaries aren't vendored into the repository; point `FMU_DATA_DIR` at
//! a local checkout of the Modelica `Reference-FMUs` release archive
//! (https://github.com/modelica/Reference-FMUs/releases) to run the tests
//! gated on this crate.

use std::path::PathBuf;

/// A handle onto a local directory of Modelica Reference-FMUs, laid out as
/// `<FMU_DATA_DIR>/<version>/<name>.fmu`.
pub struct ReferenceFmus {
    root: PathBuf,
}

impl ReferenceFmus {
    /// Resolves the reference FMU directory from the `FMU_DATA_DIR`
    /// environment variable.
    pub fn new() -> anyhow::Result<Self> {
        let root = std::env::var_os("FMU_DATA_DIR")
            .ok_or_else(|| anyhow::anyhow!("FMU_DATA_DIR not set; point it at a local Reference-FMUs checkout"))?;
        Ok(Self { root: PathBuf::from(root) })
    }

    /// Path to one reference FMU, suitable for
    /// [`fmi::model_manager::ModelManager::load_fmu`].
    pub fn reference_fmu(&self, name: &str, version: &str) -> anyhow::Result<PathBuf> {
        let path = self.root.join(version).join(format!("{name}.fmu"));
        if !path.is_file() {
            anyhow::bail!("reference FMU not found at {}", path.display());
        }
        Ok(path)
    }
}
