//! User settings consumed by the rest timer.
//!
//! Settings are owned elsewhere; this module only reads them. Providers are
//! injected into the components that need them, and the feedback adapter
//! asks again on every completion so edits apply without a restart.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Settings directory below the home directory.
const SETTINGS_DIR: &str = ".liftlog";

/// Settings file name.
const SETTINGS_FILE: &str = "settings.json";

/// Longest rest period accepted as a default (one hour).
pub const MAX_REST_SECONDS: u32 = 3600;

// ============================================================================
// Settings
// ============================================================================

/// Rest timer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Play a sound when a rest period ends
    pub sound_enabled: bool,
    /// Vibrate when a rest period ends
    pub vibration_enabled: bool,
    /// Rest used when neither the set nor its template specify one
    pub default_rest_seconds: u32,
    /// Custom sound file for the completion cue
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            vibration_enabled: true,
            default_rest_seconds: 90,
            sound_file: None,
        }
    }
}

impl Settings {
    /// Disables the completion sound.
    pub fn with_sound(mut self, enabled: bool) -> Self {
        self.sound_enabled = enabled;
        self
    }

    /// Disables the completion vibration.
    pub fn with_vibration(mut self, enabled: bool) -> Self {
        self.vibration_enabled = enabled;
        self
    }

    /// Sets the fallback rest period.
    pub fn with_default_rest_seconds(mut self, seconds: u32) -> Self {
        self.default_rest_seconds = seconds;
        self
    }

    /// Validates the settings.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_rest_seconds > MAX_REST_SECONDS {
            return Err(format!(
                "default rest must be between 0 and {MAX_REST_SECONDS} seconds"
            ));
        }
        if let Some(path) = &self.sound_file {
            if path.as_os_str().is_empty() {
                return Err("sound file path must not be empty".to_string());
            }
        }
        Ok(())
    }

    /// Fallback rest period, `None` when disabled.
    pub fn default_rest(&self) -> Option<u32> {
        Some(self.default_rest_seconds).filter(|s| *s > 0)
    }
}

// ============================================================================
// Providers
// ============================================================================

/// Source of the current settings.
pub trait SettingsProvider: Send + Sync {
    /// Returns the settings as of now.
    fn settings(&self) -> Settings;
}

/// Fixed settings, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSettings(pub Settings);

impl SettingsProvider for StaticSettings {
    fn settings(&self) -> Settings {
        self.0.clone()
    }
}

/// Settings read from a JSON file on every request.
///
/// A missing file yields the defaults; an unreadable or invalid file is
/// logged and also yields the defaults.
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
}

impl FileSettings {
    /// Reads settings from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads settings from `~/.liftlog/settings.json`.
    pub fn from_default_location() -> Option<Self> {
        default_settings_path().map(Self::new)
    }

    /// Path of the settings file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Settings, String> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No settings file, using defaults");
                return Ok(Settings::default());
            }
            Err(e) => return Err(e.to_string()),
        };
        let settings: Settings = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
        settings.validate()?;
        Ok(settings)
    }
}

impl SettingsProvider for FileSettings {
    fn settings(&self) -> Settings {
        self.load().unwrap_or_else(|e| {
            warn!(path = %self.path.display(), "Ignoring settings file: {}", e);
            Settings::default()
        })
    }
}

/// Returns `~/.liftlog/settings.json`.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(SETTINGS_DIR).join(SETTINGS_FILE))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let settings = Settings::default();
        assert!(settings.sound_enabled);
        assert!(settings.vibration_enabled);
        assert_eq!(settings.default_rest_seconds, 90);
        assert!(settings.sound_file.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let settings = Settings::default()
            .with_sound(false)
            .with_vibration(false)
            .with_default_rest_seconds(0);

        assert!(!settings.sound_enabled);
        assert!(!settings.vibration_enabled);
        assert_eq!(settings.default_rest(), None);
    }

    #[test]
    fn test_validate() {
        assert!(Settings::default().validate().is_ok());
        assert!(Settings::default()
            .with_default_rest_seconds(MAX_REST_SECONDS)
            .validate()
            .is_ok());
        assert!(Settings::default()
            .with_default_rest_seconds(MAX_REST_SECONDS + 1)
            .validate()
            .is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"soundEnabled":false}"#).unwrap();
        assert!(!settings.sound_enabled);
        assert!(settings.vibration_enabled);
        assert_eq!(settings.default_rest_seconds, 90);
    }

    #[test]
    fn test_file_settings_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FileSettings::new(dir.path().join("settings.json"));
        assert_eq!(provider.settings(), Settings::default());
    }

    #[test]
    fn test_file_settings_reads_on_every_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let provider = FileSettings::new(&path);

        std::fs::write(&path, r#"{"vibrationEnabled":false}"#).unwrap();
        assert!(!provider.settings().vibration_enabled);

        std::fs::write(&path, r#"{"vibrationEnabled":true,"soundEnabled":false}"#).unwrap();
        let settings = provider.settings();
        assert!(settings.vibration_enabled);
        assert!(!settings.sound_enabled);
    }

    #[test]
    fn test_file_settings_invalid_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();

        assert_eq!(FileSettings::new(&path).settings(), Settings::default());

        std::fs::write(&path, r#"{"defaultRestSeconds":99999}"#).unwrap();
        assert_eq!(FileSettings::new(&path).settings(), Settings::default());
    }
}
