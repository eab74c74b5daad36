//! Process-wide registry of loaded FMUs.
//!
//! A private-constructor singleton backed by three separate collections (one
//! per variant: FMI 1.0 ME, FMI 1.0 CS, FMI 2.0), each keyed by model
//! identifier, so that loading the same FMU twice reuses the existing Bare
//! FMU instead of loading the shared library again.

use std::{
    collections::HashMap,
    io::Read,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, OnceLock},
};

use libloading::Library;

use crate::{
    bare_fmu::{BareFmu, BareFmuCsV1, BareFmuMeV1, BareFmuV2},
    error::{LoadFmuStatus, Result, UnloadFmuStatus},
};

/// Outcome of a [`ModelManager`] load call.
///
/// `model_identifier`/`fmu_type` are populated only when `status` is
/// [`LoadFmuStatus::Success`] or [`LoadFmuStatus::Duplicate`] — mirroring the
/// original `loadFMU`'s out-parameters, which are only meaningfully set on
/// those two outcomes.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub model_identifier: Option<String>,
    pub fmu_type: Option<FmuType>,
    pub status: LoadFmuStatus,
}

impl LoadOutcome {
    fn loaded(model_identifier: String, fmu_type: FmuType, status: LoadFmuStatus) -> Self {
        Self { model_identifier: Some(model_identifier), fmu_type: Some(fmu_type), status }
    }

    fn failed(status: LoadFmuStatus) -> Self {
        Self { model_identifier: None, fmu_type: None, status }
    }
}

const MODEL_DESCRIPTION_FILE: &str = "modelDescription.xml";

/// Which FMI variant a loaded model identifier resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FmuType {
    MeV1,
    CsV1,
    V2,
}

#[derive(Default)]
struct Registries {
    me_v1: HashMap<String, Arc<BareFmuMeV1>>,
    cs_v1: HashMap<String, Arc<BareFmuCsV1>>,
    v2: HashMap<String, Arc<BareFmuV2>>,
}

/// Singleton registry of loaded Bare FMUs, keyed by model identifier within
/// each of the three variant-specific collections. Loading the same
/// identifier twice under the same variant returns [`LoadFmuStatus::Duplicate`]
/// rather than reloading the shared library.
pub struct ModelManager {
    registries: Mutex<Registries>,
}

fn singleton() -> &'static ModelManager {
    static INSTANCE: OnceLock<ModelManager> = OnceLock::new();
    INSTANCE.get_or_init(|| ModelManager {
        registries: Mutex::new(Registries::default()),
    })
}

fn extract_archive(archive: impl AsRef<Path>, outdir: impl AsRef<Path>) -> Result<()> {
    let file = std::fs::File::open(archive.as_ref())?;
    let mut zip = zip::ZipArchive::new(file)?;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let outpath = outdir.as_ref().join(entry.name());
        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut outfile = std::fs::File::create(&outpath)?;
            std::io::copy(&mut entry, &mut outfile)?;
        }
    }
    Ok(())
}

/// Locates the platform-specific shared library for `model_identifier` under
/// an unzipped FMU's `binaries/` directory. Returns `None` if this host's
/// (OS, architecture) has no corresponding platform folder in the FMI
/// standard's naming convention — the FMU may still be valid for other
/// platforms.
fn platform_binary(dir: &Path, model_identifier: &str) -> Option<PathBuf> {
    let platform_folder = match (std::env::consts::OS, std::env::consts::ARCH) {
        ("windows", "x86_64") => "win64",
        ("windows", "x86") => "win32",
        ("linux", "x86_64") => "linux64",
        ("linux", "x86") => "linux32",
        ("macos", "x86_64") => "darwin64",
        ("macos", "x86") => "darwin32",
        (os, arch) => {
            log::warn!(target: "fmi", "no shared library naming convention known for platform {os}/{arch}");
            return None;
        }
    };
    let fname = format!("{model_identifier}{}", std::env::consts::DLL_SUFFIX);
    Some(dir.join("binaries").join(platform_folder).join(fname))
}

/// A freshly unzipped FMU directory plus its peeked-at version, before the
/// version-specific model description has been fully parsed.
struct ExtractedFmu {
    _dir: tempfile::TempDir,
    dir_path: PathBuf,
    description_xml: String,
    major_version: u32,
}

/// Unzips the archive, reads `modelDescription.xml`, and peeks at its
/// declared FMI version — every failure along the way is a recognised load
/// outcome, not an exception, so this reports a [`LoadFmuStatus`] directly
/// rather than a bare [`crate::error::Error`].
fn extract_and_peek(fmu_path: impl AsRef<Path>) -> std::result::Result<ExtractedFmu, LoadFmuStatus> {
    let dir = match tempfile::Builder::new().prefix("fmi-rs").tempdir() {
        Ok(dir) => dir,
        Err(e) => {
            log::warn!(target: "fmi", "failed to create an extraction directory: {e}");
            return Err(LoadFmuStatus::Failed);
        }
    };

    if let Err(e) = extract_archive(&fmu_path, dir.path()) {
        log::warn!(target: "fmi", "failed to extract FMU archive: {e}");
        return Err(LoadFmuStatus::DescriptionInvalidUrl);
    }

    let description_path = dir.path().join(MODEL_DESCRIPTION_FILE);
    let mut description_xml = String::new();
    let read = std::fs::File::open(&description_path).and_then(|mut f| f.read_to_string(&mut description_xml));
    if let Err(e) = read {
        log::warn!(target: "fmi", "failed to read {}: {e}", description_path.display());
        return Err(LoadFmuStatus::DescriptionInvalidUrl);
    }

    let peek: fmi_schema::minimal::ModelDescription = match description_xml.parse() {
        Ok(peek) => peek,
        Err(e) => {
            log::warn!(target: "fmi", "failed to parse {}: {e}", description_path.display());
            return Err(LoadFmuStatus::DescriptionInvalid);
        }
    };
    let version = match peek.version() {
        Ok(v) => v,
        Err(e) => {
            log::warn!(target: "fmi", "failed to determine FMI version: {e}");
            return Err(LoadFmuStatus::DescriptionInvalid);
        }
    };

    Ok(ExtractedFmu {
        dir_path: dir.path().to_path_buf(),
        _dir: dir,
        description_xml,
        major_version: version.major as u32,
    })
}

impl ModelManager {
    /// Returns the process-wide Model Manager instance.
    pub fn get() -> &'static ModelManager {
        singleton()
    }

    /// Loads an FMU archive, taking the model identifier from the Model
    /// Description rather than from the caller — the "discovery" overload of
    /// `loadFMU`.
    pub fn load_fmu(&self, fmu_path: impl AsRef<Path>) -> LoadOutcome {
        self.load(fmu_path, None)
    }

    /// Loads an FMU archive under a caller-supplied model identifier,
    /// reporting [`LoadFmuStatus::IdentifierInvalid`] if it does not match
    /// any identifier the Model Description declares — the explicit-ID
    /// overload of `loadFMU`.
    pub fn load_fmu_by_id(&self, model_identifier: &str, fmu_path: impl AsRef<Path>) -> LoadOutcome {
        self.load(fmu_path, Some(model_identifier))
    }

    fn load(&self, fmu_path: impl AsRef<Path>, requested_identifier: Option<&str>) -> LoadOutcome {
        let extracted = match extract_and_peek(fmu_path) {
            Ok(extracted) => extracted,
            Err(status) => return LoadOutcome::failed(status),
        };

        match extracted.major_version {
            1 => self.load_fmi1(extracted, requested_identifier),
            2 => self.load_fmi2(extracted, requested_identifier),
            other => {
                log::warn!(target: "fmi", "unsupported FMI version: {other}");
                LoadOutcome::failed(LoadFmuStatus::DescriptionInvalid)
            }
        }
    }

    fn load_fmi1(&self, extracted: ExtractedFmu, requested_identifier: Option<&str>) -> LoadOutcome {
        use fmi_schema::fmi1::Fmi1ModelDescription;

        let description: Fmi1ModelDescription = match extracted.description_xml.parse() {
            Ok(description) => description,
            Err(e) => {
                log::warn!(target: "fmi", "failed to parse FMI 1.0 model description: {e}");
                return LoadOutcome::failed(LoadFmuStatus::DescriptionInvalid);
            }
        };

        if let Some(requested) = requested_identifier {
            if requested != description.model_identifier {
                log::warn!(
                    target: "fmi",
                    "requested model identifier {requested:?} does not match the declared identifier {:?}",
                    description.model_identifier
                );
                return LoadOutcome::failed(LoadFmuStatus::IdentifierInvalid);
            }
        }

        let model_identifier = description.model_identifier.clone();

        // FMI 1.0 declares ME and CS via mutually-exclusive top-level
        // elements in the same modelDescription.xml shape; a single binary
        // serves one of the two.
        let is_cs = description_declares_cs(&extracted.description_xml);
        let fmu_type = if is_cs { FmuType::CsV1 } else { FmuType::MeV1 };

        let mut regs = self.registries.lock().unwrap();
        let already_loaded = if is_cs {
            regs.cs_v1.contains_key(&model_identifier)
        } else {
            regs.me_v1.contains_key(&model_identifier)
        };
        if already_loaded {
            return LoadOutcome::loaded(model_identifier, fmu_type, LoadFmuStatus::Duplicate);
        }

        let Some(lib_path) = platform_binary(&extracted.dir_path, &model_identifier) else {
            return LoadOutcome::failed(LoadFmuStatus::SharedLibInvalidUrl);
        };
        let library = match unsafe { Library::new(&lib_path) } {
            Ok(library) => library,
            Err(e) => {
                log::warn!(target: "fmi", "failed to load shared library {}: {e}", lib_path.display());
                return LoadOutcome::failed(LoadFmuStatus::SharedLibLoadFailed);
            }
        };

        if is_cs {
            let bare = match BareFmuCsV1::new(library, description) {
                Ok(bare) => bare,
                Err(_) => return LoadOutcome::failed(LoadFmuStatus::SharedLibLoadFailed),
            };
            regs.cs_v1.insert(model_identifier.clone(), Arc::new(bare));
        } else {
            let bare = match BareFmuMeV1::new(library, description) {
                Ok(bare) => bare,
                Err(_) => return LoadOutcome::failed(LoadFmuStatus::SharedLibLoadFailed),
            };
            regs.me_v1.insert(model_identifier.clone(), Arc::new(bare));
        }
        LoadOutcome::loaded(model_identifier, fmu_type, LoadFmuStatus::Success)
    }

    fn load_fmi2(&self, extracted: ExtractedFmu, requested_identifier: Option<&str>) -> LoadOutcome {
        use fmi_schema::fmi2::Fmi2ModelDescription;

        let description: Fmi2ModelDescription = match extracted.description_xml.parse() {
            Ok(description) => description,
            Err(e) => {
                log::warn!(target: "fmi", "failed to parse FMI 2.0 model description: {e}");
                return LoadOutcome::failed(LoadFmuStatus::DescriptionInvalid);
            }
        };

        let declared_me = description.model_exchange.as_ref().map(|me| me.model_identifier.as_str());
        let declared_cs = description.co_simulation.as_ref().map(|cs| cs.model_identifier.as_str());
        let Some(model_identifier) = declared_me.or(declared_cs).map(str::to_owned) else {
            log::warn!(target: "fmi", "model description declares neither Model Exchange nor Co-Simulation");
            return LoadOutcome::failed(LoadFmuStatus::DescriptionInvalid);
        };

        if let Some(requested) = requested_identifier {
            if Some(requested) != declared_me && Some(requested) != declared_cs {
                log::warn!(
                    target: "fmi",
                    "requested model identifier {requested:?} does not match a declared identifier"
                );
                return LoadOutcome::failed(LoadFmuStatus::IdentifierInvalid);
            }
        }

        let mut regs = self.registries.lock().unwrap();
        if regs.v2.contains_key(&model_identifier) {
            return LoadOutcome::loaded(model_identifier, FmuType::V2, LoadFmuStatus::Duplicate);
        }

        let Some(lib_path) = platform_binary(&extracted.dir_path, &model_identifier) else {
            return LoadOutcome::failed(LoadFmuStatus::SharedLibInvalidUrl);
        };
        let library = match unsafe { Library::new(&lib_path) } {
            Ok(library) => library,
            Err(e) => {
                log::warn!(target: "fmi", "failed to load shared library {}: {e}", lib_path.display());
                return LoadOutcome::failed(LoadFmuStatus::SharedLibLoadFailed);
            }
        };
        let resource_location = match url::Url::from_file_path(extracted.dir_path.join("resources")) {
            Ok(url) => url,
            Err(_) => return LoadOutcome::failed(LoadFmuStatus::SharedLibInvalidUrl),
        };
        let bare = match BareFmuV2::new(library, description, resource_location) {
            Ok(bare) => bare,
            Err(_) => return LoadOutcome::failed(LoadFmuStatus::SharedLibLoadFailed),
        };
        regs.v2.insert(model_identifier.clone(), Arc::new(bare));
        LoadOutcome::loaded(model_identifier, FmuType::V2, LoadFmuStatus::Success)
    }

    /// Returns the FMI 1.0 Model Exchange Bare FMU registered under `id`, if any.
    pub fn get_model(&self, id: &str) -> Option<BareFmu> {
        self.registries
            .lock()
            .unwrap()
            .me_v1
            .get(id)
            .cloned()
            .map(BareFmu::MeV1)
    }

    /// Returns the FMI 1.0 Co-Simulation Bare FMU registered under `id`, if any.
    pub fn get_slave(&self, id: &str) -> Option<BareFmu> {
        self.registries
            .lock()
            .unwrap()
            .cs_v1
            .get(id)
            .cloned()
            .map(BareFmu::CsV1)
    }

    /// Returns the FMI 2.0 Bare FMU registered under `id`, if any.
    pub fn get_instance(&self, id: &str) -> Option<BareFmu> {
        self.registries
            .lock()
            .unwrap()
            .v2
            .get(id)
            .cloned()
            .map(BareFmu::V2)
    }

    /// Returns which variant, if any, `id` is currently registered under.
    pub fn type_of_loaded_fmu(&self, id: &str) -> Option<FmuType> {
        let regs = self.registries.lock().unwrap();
        if regs.me_v1.contains_key(id) {
            Some(FmuType::MeV1)
        } else if regs.cs_v1.contains_key(id) {
            Some(FmuType::CsV1)
        } else if regs.v2.contains_key(id) {
            Some(FmuType::V2)
        } else {
            None
        }
    }

    /// Unloads the Bare FMU registered under `id`, in whichever variant
    /// collection it is found. Refuses if any FMU Instance still holds a
    /// reference to it.
    pub fn unload_fmu(&self, id: &str) -> UnloadFmuStatus {
        let mut regs = self.registries.lock().unwrap();

        if let Some(fmu) = regs.me_v1.get(id) {
            if Arc::strong_count(fmu) > 1 {
                return UnloadFmuStatus::InUse;
            }
            regs.me_v1.remove(id);
            return UnloadFmuStatus::Ok;
        }
        if let Some(fmu) = regs.cs_v1.get(id) {
            if Arc::strong_count(fmu) > 1 {
                return UnloadFmuStatus::InUse;
            }
            regs.cs_v1.remove(id);
            return UnloadFmuStatus::Ok;
        }
        if let Some(fmu) = regs.v2.get(id) {
            if Arc::strong_count(fmu) > 1 {
                return UnloadFmuStatus::InUse;
            }
            regs.v2.remove(id);
            return UnloadFmuStatus::Ok;
        }
        UnloadFmuStatus::NotFound
    }

    /// Unloads every currently-loaded FMU. Refuses (leaving the registry
    /// untouched) if any single one is still in use.
    pub fn unload_all_fmus(&self) -> UnloadFmuStatus {
        let regs = self.registries.lock().unwrap();
        let any_in_use = regs.me_v1.values().any(|f| Arc::strong_count(f) > 1)
            || regs.cs_v1.values().any(|f| Arc::strong_count(f) > 1)
            || regs.v2.values().any(|f| Arc::strong_count(f) > 1);
        drop(regs);

        if any_in_use {
            return UnloadFmuStatus::InUse;
        }
        let mut regs = self.registries.lock().unwrap();
        regs.me_v1.clear();
        regs.cs_v1.clear();
        regs.v2.clear();
        UnloadFmuStatus::Ok
    }
}

/// FMI 1.0's modelDescription.xml is shaped differently for ME vs CS
/// (`<Implementation>` only appears for a Co-Simulation FMU); peeking for it
/// in the raw XML avoids needing two different top-level schema types for
/// what is otherwise the same document shape.
fn description_declares_cs(xml: &str) -> bool {
    xml.contains("<Implementation")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unload_not_found_is_reported() {
        let mgr = ModelManager::get();
        assert_eq!(mgr.unload_fmu("DoesNotExist"), UnloadFmuStatus::NotFound);
    }

    #[test]
    fn type_of_unloaded_fmu_is_none() {
        let mgr = ModelManager::get();
        assert_eq!(mgr.type_of_loaded_fmu("DoesNotExist"), None);
    }
}
