//! Parameter file loading
//!
//! Parameters are TOML files in `$ROBOT_SW_ROOT/params`, deserialised straight into the structs
//! of the module that uses them.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable (ROBOT_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot read the parameter file {0:?}: {1}")]
    FileLoadError(PathBuf, std::io::Error),

    #[error("Invalid parameters: {0}")]
    DeserialiseError(toml::de::Error)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Path of the parameter file `name` in the software tree.
pub fn params_path(name: &str) -> Result<PathBuf, LoadError> {
    let mut path = crate::host::get_sw_root().map_err(|_| LoadError::SwRootNotSet)?;
    path.push("params");
    path.push(name);

    Ok(path)
}

/// Load the parameter file `name`, relative to `$ROBOT_SW_ROOT/params`.
pub fn load<P: DeserializeOwned>(name: &str) -> Result<P, LoadError> {
    load_from_path(params_path(name)?)
}

pub fn load_from_path<P, F>(path: F) -> Result<P, LoadError>
where
    P: DeserializeOwned,
    F: AsRef<Path>
{
    let path = path.as_ref();

    let contents = fs::read_to_string(path)
        .map_err(|e| LoadError::FileLoadError(path.to_path_buf(), e))?;

    from_str(&contents)
}

/// Parse parameters from a TOML string.
pub fn from_str<P: DeserializeOwned>(params_str: &str) -> Result<P, LoadError> {
    toml::from_str(params_str).map_err(LoadError::DeserialiseError)
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct CycleParams {
        period_s: f64,
        #[serde(default)]
        name: Option<String>,
    }

    #[test]
    fn test_from_str() {
        let p: CycleParams = from_str("period_s = 0.5").unwrap();
        assert_eq!(p.period_s, 0.5);
        assert!(p.name.is_none());

        let err = from_str::<CycleParams>("period_s = \"fast\"").unwrap_err();
        assert!(matches!(err, LoadError::DeserialiseError(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_from_path::<CycleParams, _>("/nonexistent/params.toml").unwrap_err();

        match err {
            LoadError::FileLoadError(path, _) => assert_eq!(path, PathBuf::from("/nonexistent/params.toml")),
            e => panic!("Unexpected error {}", e)
        }
    }
}
