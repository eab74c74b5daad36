//! The `fmi` crate imports FMI 1.0/2.0 Model Exchange FMUs and drives them
//! against a built-in family of ODE integrators. See
//! http://www.fmi-standard.org/
//!
//! # Examples
//!
//! ```no_run
//! # #[cfg(feature = "fmi2")] {
//! let manager = fmi::model_manager::ModelManager::get();
//! let outcome = manager.load_fmu("data/bouncing_ball.fmu");
//! let model_id = outcome.model_identifier.unwrap();
//! if let Some(fmi::bare_fmu::BareFmu::V2(bare)) = manager.get_instance(&model_id) {
//!     let mut instance = fmi::driver::fmi2_me::Fmi2ModelExchange::new(
//!         bare,
//!         "bouncing_ball",
//!         fmi::driver::DriverConfig::default(),
//!     ).unwrap();
//!     instance.initialize(0.0, false, 0.0, None);
//! }
//! # }
//! ```
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![deny(clippy::all)]

pub mod bare_fmu;
pub mod driver;
pub mod dynamical_system;
pub mod error;
pub mod ffi;
pub mod integrator;
pub mod logger;
pub mod model_manager;
pub mod typedefs;
pub mod url;

// Re-exports: the surface most callers reach for first.
pub use crate::dynamical_system::DynamicalSystem;
pub use crate::error::{Error, FmiStatus, LoadFmuStatus, Result, UnloadFmuStatus};
pub use crate::model_manager::ModelManager;

pub mod built_info {
    //! Build-time metadata (crate version, target triple, git SHA) emitted
    //! by `build.rs` via the `built` crate.
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}
