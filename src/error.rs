//! Crate-wide error and status types.
//!
//! `Error` is for exceptional, non-recoverable-by-protocol failures (I/O,
//! parsing, FFI resolution). Ordinary FMI call outcomes use [`FmiStatus`],
//! and Model Manager load/unload outcomes use their own status enums,
//! because "duplicate" or "in use" are expected results, not exceptions —
//! matching the distinction the original `ModelManager.h` draws between its
//! `LoadFMUStatus`/`UnloadFMUStatus` enums and thrown exceptions.

use crate::typedefs::{FmiInteger, FmiValueReference};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown variable: {name}")]
    UnknownVariable { name: String },

    #[error("unknown value reference: {vr}")]
    UnknownValueReference { vr: FmiValueReference },

    #[error("model type {0} not supported by this FMU")]
    UnsupportedFmuType(String),

    #[error("instantiate{{Model}} returned a null component for model \"{model_name}\"")]
    Instantiation { model_name: String },

    #[error("unsupported FMU location URL scheme {scheme:?}")]
    UnsupportedUrlScheme { scheme: String },

    #[error("FMU location is not a valid file:// URL or absolute path: {reason}")]
    InvalidFmuLocation { reason: String },

    #[error("FMI version of loaded API ({found}) doesn't match expected ({expected})")]
    FmiVersionMismatch { found: String, expected: String },

    #[error("the FMU instance is in the Fatal state and can no longer be used")]
    Fatal,

    #[error("integrator cannot be initialized with zero continuous states")]
    NoStates,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    UrlParse(#[from] url::ParseError),

    #[error(transparent)]
    Schema(#[from] fmi_schema::Error),

    #[error(transparent)]
    Utf8Error(#[from] std::str::Utf8Error),

    #[error(transparent)]
    LibLoading {
        #[from]
        source: libloading::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// The FMI standard's public status set, unified across 1.0 and 2.0.
///
/// v2's `Pending` has no meaning outside an asynchronous Co-Simulation
/// `doStep`, which is out of scope here; it is mapped to `Discard` at the
/// driver boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FmiStatus {
    Ok,
    Warning,
    Discard,
    Error,
    Fatal,
}

impl FmiStatus {
    pub fn is_error(self) -> bool {
        matches!(self, FmiStatus::Error | FmiStatus::Fatal)
    }

    /// True once status is worse than `Warning` — the integrator's
    /// event-search loop stops bisecting at this point.
    pub fn worse_than_warning(self) -> bool {
        matches!(self, FmiStatus::Discard | FmiStatus::Error | FmiStatus::Fatal)
    }
}

/// Maps a raw `fmi1Status`/`fmi2Status` return code onto [`FmiStatus`].
/// v2's `fmi2Pending` (5) only has meaning for an asynchronous Co-Simulation
/// `doStep`, out of scope here, and is folded into `Discard`; any other
/// unrecognised code is treated as `Fatal` rather than panicking, since a
/// misbehaving FMU returning garbage should invalidate the instance, not
/// crash the caller.
impl From<FmiInteger> for FmiStatus {
    fn from(code: FmiInteger) -> Self {
        match code {
            0 => FmiStatus::Ok,
            1 => FmiStatus::Warning,
            2 => FmiStatus::Discard,
            3 => FmiStatus::Error,
            4 => FmiStatus::Fatal,
            5 => FmiStatus::Discard,
            _ => FmiStatus::Fatal,
        }
    }
}

impl std::fmt::Display for FmiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FmiStatus::Ok => "OK",
            FmiStatus::Warning => "Warning",
            FmiStatus::Discard => "Discard",
            FmiStatus::Error => "Error",
            FmiStatus::Fatal => "Fatal",
        };
        f.write_str(s)
    }
}

/// Outcome of [`crate::model_manager::ModelManager`]'s load operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadFmuStatus {
    Success,
    /// The model identifier is already loaded under this variant's registry.
    Duplicate,
    DescriptionInvalidUrl,
    DescriptionInvalid,
    /// The requested model identifier does not match any identifier the
    /// description declares. Only reachable from the explicit-ID load entry
    /// point — the discovery entry point always takes whatever the
    /// description declares.
    IdentifierInvalid,
    SharedLibInvalidUrl,
    SharedLibLoadFailed,
    /// Anything else — an I/O failure extracting the archive, for instance —
    /// that isn't one of the more specific outcomes above.
    Failed,
}

/// Outcome of [`crate::model_manager::ModelManager`]'s unload operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnloadFmuStatus {
    Ok,
    NotFound,
    /// Refused: an `FMU Instance` still holds a reference to the Bare FMU.
    InUse,
}
