//! JSON test script
//!
//! A script names the ROM, an optional starting state, the controller setup
//! and the snapshot encoding for a run:
//!
//! ```json
//! {
//!   "Rom File": "game.a26",
//!   "Initial State File": "",
//!   "Expected ROM SHA1": "1b0a6e1ac1d4a0bd3e9ef5e1cf1f0e2a8f2cb4a3",
//!   "Disable State Blocks": ["TIA"],
//!   "Controller 1 Type": "Gamepad",
//!   "Controller 2 Type": "None",
//!   "Differential Compression": {
//!     "Enabled": true,
//!     "Max Differences": 4096,
//!     "Use Zlib": false
//!   }
//! }
//! ```
//!
//! Relative paths are resolved against the directory holding the script.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::error::ReplayError;
use crate::state::{CodecKind, DifferentialSettings};

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("malformed test script: {0}")]
    Json(#[from] serde_json::Error),

    #[error("'Expected ROM SHA1' is not a SHA1 hex digest: '{0}'")]
    InvalidDigest(String),
}

/// Settings for differential snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DifferentialCompression {
    #[serde(rename = "Enabled")]
    pub enabled: bool,
    #[serde(rename = "Max Differences")]
    pub max_differences: usize,
    /// Compress the differential payload
    #[serde(rename = "Use Zlib")]
    pub use_zlib: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestScript {
    #[serde(rename = "Rom File")]
    pub rom_file: PathBuf,
    /// Cold start when absent or empty
    #[serde(
        rename = "Initial State File",
        default,
        deserialize_with = "empty_path_as_none"
    )]
    pub initial_state_file: Option<PathBuf>,
    #[serde(rename = "Expected ROM SHA1")]
    pub expected_rom_sha1: String,
    #[serde(rename = "Disable State Blocks")]
    pub disable_state_blocks: Vec<String>,
    #[serde(rename = "Controller 1 Type")]
    pub controller1_type: String,
    #[serde(rename = "Controller 2 Type")]
    pub controller2_type: String,
    #[serde(rename = "Differential Compression")]
    pub differential_compression: DifferentialCompression,
}

fn empty_path_as_none<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let path = Option::<String>::deserialize(deserializer)?;
    Ok(path.filter(|p| !p.is_empty()).map(PathBuf::from))
}

impl TestScript {
    /// Parse a script from JSON text
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        let script: Self = serde_json::from_str(json)?;
        script.validate()?;
        Ok(script)
    }

    /// Read a script file and resolve its paths against the file's directory
    pub fn from_file(path: &Path) -> Result<Self, ReplayError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ReplayError::io("test script", path, e))?;
        let mut script = Self::from_json(&json)?;
        if let Some(dir) = path.parent() {
            script.resolve_paths(dir);
        }
        Ok(script)
    }

    /// Make relative file paths relative to `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        if self.rom_file.is_relative() {
            self.rom_file = base.join(&self.rom_file);
        }
        if let Some(state) = &mut self.initial_state_file
            && state.is_relative()
        {
            *state = base.join(&*state);
        }
    }

    fn validate(&self) -> Result<(), ScriptError> {
        let digest = self.expected_rom_sha1.trim();
        if digest.len() != 40 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ScriptError::InvalidDigest(self.expected_rom_sha1.clone()));
        }
        Ok(())
    }

    /// Snapshot encoding selected by the script
    pub fn codec_kind(&self) -> CodecKind {
        let compression = &self.differential_compression;
        if compression.enabled {
            CodecKind::Differential(DifferentialSettings {
                max_differences: compression.max_differences,
                compress: compression.use_zlib,
            })
        } else {
            CodecKind::Full
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DIGEST: &str = "a9993e364706816aba3e25717850c26c9cd0d89d";

    fn script_json(initial_state: &str, enabled: bool) -> String {
        format!(
            r#"{{
                "Rom File": "roms/game.a26",
                "Initial State File": "{initial_state}",
                "Expected ROM SHA1": "{DIGEST}",
                "Disable State Blocks": ["TIA"],
                "Controller 1 Type": "Gamepad",
                "Controller 2 Type": "None",
                "Differential Compression": {{
                    "Enabled": {enabled},
                    "Max Differences": 4096,
                    "Use Zlib": true
                }},
                "Comment": "unknown keys are ignored"
            }}"#
        )
    }

    #[test]
    fn test_parse_full_script() {
        let script = TestScript::from_json(&script_json("start.state", true)).unwrap();
        assert_eq!(script.rom_file, PathBuf::from("roms/game.a26"));
        assert_eq!(
            script.initial_state_file,
            Some(PathBuf::from("start.state"))
        );
        assert_eq!(script.disable_state_blocks, vec!["TIA".to_string()]);
        assert_eq!(script.controller1_type, "Gamepad");
        assert_eq!(
            script.codec_kind(),
            CodecKind::Differential(DifferentialSettings {
                max_differences: 4096,
                compress: true,
            })
        );
    }

    #[test]
    fn test_empty_initial_state_is_cold_start() {
        let script = TestScript::from_json(&script_json("", false)).unwrap();
        assert_eq!(script.initial_state_file, None);
        assert_eq!(script.codec_kind(), CodecKind::Full);
    }

    #[test]
    fn test_missing_initial_state_is_cold_start() {
        let json = script_json("", false).replace(r#""Initial State File": "","#, "");
        let script = TestScript::from_json(&json).unwrap();
        assert_eq!(script.initial_state_file, None);
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let json = script_json("", false).replace(r#""Controller 2 Type": "None","#, "");
        let err = TestScript::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("Controller 2 Type"));
    }

    #[test]
    fn test_wrong_type_is_an_error() {
        let json = script_json("", false).replace("4096", "\"lots\"");
        assert!(matches!(
            TestScript::from_json(&json),
            Err(ScriptError::Json(_))
        ));
    }

    #[test]
    fn test_bad_digest() {
        let json = script_json("", false).replace(DIGEST, "not-a-digest");
        assert!(matches!(
            TestScript::from_json(&json),
            Err(ScriptError::InvalidDigest(_))
        ));
    }

    #[test]
    fn test_from_file_resolves_relative_paths() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.json");
        std::fs::write(&path, script_json("start.state", true)).unwrap();

        let script = TestScript::from_file(&path).unwrap();
        assert_eq!(script.rom_file, dir.path().join("roms/game.a26"));
        assert_eq!(
            script.initial_state_file,
            Some(dir.path().join("start.state"))
        );
    }

    #[test]
    fn test_from_file_missing() {
        let dir = TempDir::new().unwrap();
        let err = TestScript::from_file(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ReplayError::Io { .. }));
    }
}
