//! What to play when a rest period ends.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Longest the completion cue may play.
pub const MAX_CUE_DURATION: Duration = Duration::from_secs(3);

/// Pitch of the synthesized beep, in Hz.
pub const BEEP_FREQUENCY: f32 = 880.0;

/// Represents the source of the completion cue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundSource {
    /// An audio file chosen by the user.
    File {
        /// Display name, usually the file stem.
        name: String,
        /// Full path to the sound file.
        path: PathBuf,
    },
    /// A short tone generated at playback time.
    Beep {
        /// Name shown in logs.
        name: String,
    },
}

impl SoundSource {
    /// Creates a file-backed source.
    #[must_use]
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::File {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Creates a file-backed source named after the file stem.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "custom".to_string());
        Self::file(name, path)
    }

    /// Creates a synthesized beep source.
    #[must_use]
    pub fn beep(name: impl Into<String>) -> Self {
        Self::Beep { name: name.into() }
    }

    /// Returns the name of the sound source.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } | Self::Beep { name } => name,
        }
    }

    /// Returns true if this source is a file.
    #[must_use]
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }

    /// Returns true if this source is synthesized.
    #[must_use]
    pub fn is_beep(&self) -> bool {
        matches!(self, Self::Beep { .. })
    }

    /// Returns the file path if this source is a file.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File { path, .. } => Some(path),
            Self::Beep { .. } => None,
        }
    }
}

/// Returns the built-in completion cue.
#[must_use]
pub fn default_sound() -> SoundSource {
    SoundSource::beep("rest-complete")
}

/// Returns the cue for an optional user-configured file.
#[must_use]
pub fn sound_for(sound_file: Option<&Path>) -> SoundSource {
    match sound_file {
        Some(path) => SoundSource::from_path(path),
        None => default_sound(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_source() {
        let source = SoundSource::file("bell", "/sounds/bell.wav");
        assert!(source.is_file());
        assert!(!source.is_beep());
        assert_eq!(source.name(), "bell");
        assert_eq!(source.path(), Some(Path::new("/sounds/bell.wav")));
    }

    #[test]
    fn test_from_path_uses_stem() {
        let source = SoundSource::from_path("/home/me/gong.ogg");
        assert_eq!(source.name(), "gong");
    }

    #[test]
    fn test_beep_source() {
        let source = default_sound();
        assert!(source.is_beep());
        assert!(source.path().is_none());
        assert!(!source.name().is_empty());
    }

    #[test]
    fn test_sound_for() {
        assert!(sound_for(None).is_beep());
        assert!(sound_for(Some(Path::new("/a/b.wav"))).is_file());
    }
}
