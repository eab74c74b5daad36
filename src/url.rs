//! FMU directory URL ↔ filesystem path conversion.
//!
//! Only `file://` URLs are accepted; this is a narrow collaborator, not a
//! general browser-grade URL handler.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Converts a `file://` URL to a filesystem path.
pub fn url_to_path(url: &url::Url) -> Result<PathBuf> {
    url.to_file_path().map_err(|_| Error::InvalidFmuLocation {
        reason: format!("non-file URL scheme {:?}", url.scheme()),
    })
}

/// Converts a filesystem path to a `file://` URL.
pub fn path_to_url(path: &Path) -> Result<url::Url> {
    url::Url::from_file_path(path).map_err(|_| Error::InvalidFmuLocation {
        reason: format!("path is not absolute: {}", path.display()),
    })
}

/// Parses a string that may be either a bare filesystem path or a `file://`
/// URL, since the Model Manager's load entry points accept either from
/// callers.
pub fn parse_fmu_location(location: &str) -> Result<PathBuf> {
    match url::Url::parse(location) {
        Ok(url) if url.scheme() == "file" => url_to_path(&url),
        Ok(url) => Err(Error::UnsupportedUrlScheme { scheme: url.scheme().to_owned() }),
        Err(_) => Ok(PathBuf::from(location)),
    }
}

/// The platform tag used under `binaries/<platform>/` in an unzipped FMU.
pub fn platform_binaries_dir() -> &'static str {
    match (std::env::consts::OS, std::env::consts::ARCH) {
        ("windows", "x86_64") => "win64",
        ("windows", _) => "win32",
        ("linux", "x86_64") => "linux64",
        ("linux", _) => "linux32",
        ("macos", _) => "darwin64",
        _ => "unknown",
    }
}

/// The shared-library file extension for the current platform.
pub fn platform_lib_extension() -> &'static str {
    match std::env::consts::OS {
        "windows" => "dll",
        "macos" => "dylib",
        _ => "so",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_path_is_passed_through() {
        let p = parse_fmu_location("/tmp/zigzag").unwrap();
        assert_eq!(p, PathBuf::from("/tmp/zigzag"));
    }

    #[test]
    fn file_url_round_trips() {
        let url = url::Url::parse("file:///tmp/zigzag/modelDescription.xml").unwrap();
        let path = url_to_path(&url).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/zigzag/modelDescription.xml"));
        let back = path_to_url(&path).unwrap();
        assert_eq!(back.scheme(), "file");
    }

    #[test]
    fn non_file_scheme_rejected() {
        let url = url::Url::parse("https://example.com/a.fmu").unwrap();
        assert!(url_to_path(&url).is_err());
    }
}
