//! Core type definitions shared by screens and services

use std::fmt;

/// What a screen shows: in flight, loaded, or failed
#[derive(Clone, Debug, PartialEq)]
pub enum DisplayState<T> {
    Loading,
    Success(T),
    Error(String),
}

impl<T> DisplayState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, DisplayState::Loading)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            DisplayState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            DisplayState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Observable state of the audio player
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    Error(String),
}

impl PlaybackState {
    pub fn label(&self) -> &str {
        match self {
            PlaybackState::Idle => "Stopped",
            PlaybackState::Loading => "Loading",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
            PlaybackState::Error(message) => message,
        }
    }
}

/// School level of the reader, ordered from elementary to senior high
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EducationLevel {
    Sd,
    Smp,
    Sma,
}

impl EducationLevel {
    pub const ALL: [EducationLevel; 3] = [EducationLevel::Sd, EducationLevel::Smp, EducationLevel::Sma];

    /// Level assumed when a profile has none recorded
    pub const FALLBACK: EducationLevel = EducationLevel::Sma;

    pub fn as_str(self) -> &'static str {
        match self {
            EducationLevel::Sd => "SD",
            EducationLevel::Smp => "SMP",
            EducationLevel::Sma => "SMA",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "SD" => Some(EducationLevel::Sd),
            "SMP" => Some(EducationLevel::Smp),
            "SMA" => Some(EducationLevel::Sma),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            EducationLevel::Sd => EducationLevel::Smp,
            EducationLevel::Smp => EducationLevel::Sma,
            EducationLevel::Sma => EducationLevel::Sd,
        }
    }
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_state_accessors() {
        let loaded: DisplayState<u8> = DisplayState::Success(3);
        assert_eq!(loaded.success(), Some(&3));
        assert!(!loaded.is_loading());
        let failed: DisplayState<u8> = DisplayState::Error("nope".into());
        assert_eq!(failed.error(), Some("nope"));
    }

    #[test]
    fn test_education_level_parse_and_order() {
        assert_eq!(EducationLevel::parse("smp"), Some(EducationLevel::Smp));
        assert_eq!(EducationLevel::parse(""), None);
        assert!(EducationLevel::Sd < EducationLevel::Sma);
        assert_eq!(EducationLevel::Sma.next(), EducationLevel::Sd);
    }
}
