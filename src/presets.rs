//! YAML preset loading for vehicles, engines, and tires.
//!
//! Presets live in a base directory with one subdirectory per kind:
//!
//! ```text
//! presets/
//! ├── vehicles/   VehicleSpec files (sedan.yaml, ...)
//! ├── engines/    EngineParams files
//! └── tires/      TireParams files
//! ```
//!
//! Each file holds one spec. Loading validates nothing beyond
//! deserialization; structural validation happens when the spec is handed
//! to `PhysicsWorld`.

use crate::types::{EngineParams, TireParams, VehicleSpec};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors from preset loading.
#[derive(Debug)]
pub enum PresetError {
    /// Filesystem error while reading a preset file
    Io(std::io::Error),
    /// The file exists but is not a valid preset of the requested kind
    Parse(serde_yaml::Error),
    /// No preset file with that name exists
    NotFound(String),
}

impl std::fmt::Display for PresetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PresetError::Io(e) => write!(f, "preset I/O error: {}", e),
            PresetError::Parse(e) => write!(f, "preset parse error: {}", e),
            PresetError::NotFound(name) => write!(f, "preset not found: {}", name),
        }
    }
}

impl std::error::Error for PresetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PresetError::Io(e) => Some(e),
            PresetError::Parse(e) => Some(e),
            PresetError::NotFound(_) => None,
        }
    }
}

impl From<std::io::Error> for PresetError {
    fn from(e: std::io::Error) -> Self {
        PresetError::Io(e)
    }
}

impl From<serde_yaml::Error> for PresetError {
    fn from(e: serde_yaml::Error) -> Self {
        PresetError::Parse(e)
    }
}

/// Loads parameter presets from a directory tree of YAML files.
pub struct PresetLoader {
    base_dir: PathBuf,
}

impl PresetLoader {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Loads a complete vehicle spec by preset name.
    pub fn load_vehicle(&self, name: &str) -> Result<VehicleSpec, PresetError> {
        self.load("vehicles", name)
    }

    /// Loads engine parameters by preset name.
    pub fn load_engine(&self, name: &str) -> Result<EngineParams, PresetError> {
        self.load("engines", name)
    }

    /// Loads tire parameters by preset name.
    pub fn load_tire(&self, name: &str) -> Result<TireParams, PresetError> {
        self.load("tires", name)
    }

    /// Names of all available vehicle presets, sorted.
    pub fn list_vehicles(&self) -> Result<Vec<String>, PresetError> {
        self.list("vehicles")
    }

    /// Names of all available engine presets, sorted.
    pub fn list_engines(&self) -> Result<Vec<String>, PresetError> {
        self.list("engines")
    }

    /// Names of all available tire presets, sorted.
    pub fn list_tires(&self) -> Result<Vec<String>, PresetError> {
        self.list("tires")
    }

    fn load<T: DeserializeOwned>(&self, kind: &str, name: &str) -> Result<T, PresetError> {
        let path = self.base_dir.join(kind).join(format!("{}.yaml", name));
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PresetError::NotFound(name.to_string()));
            }
            Err(e) => return Err(PresetError::Io(e)),
        };
        Ok(serde_yaml::from_str(&contents)?)
    }

    fn list(&self, kind: &str) -> Result<Vec<String>, PresetError> {
        let dir = self.base_dir.join(kind);
        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("yaml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        // Stable order regardless of filesystem enumeration
        names.sort();
        Ok(names)
    }
}

// =============================================================================
// Tests
// =============================================================================
