//! Playback snapshot handed to renderers

use super::types::PlaybackState;

/// Everything a player bar needs to draw itself
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaybackInfo {
    pub state: PlaybackState,
    pub url: Option<String>,
    pub position_ms: u64,
    pub duration_ms: u64,
}

impl PlaybackInfo {
    pub fn progress_ratio(&self) -> f64 {
        if self.duration_ms > 0 {
            (self.position_ms as f64 / self.duration_ms as f64).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }
}

pub fn format_duration(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}", minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_ratio_clamps() {
        let info = PlaybackInfo { position_ms: 45_000, duration_ms: 30_000, ..Default::default() };
        assert_eq!(info.progress_ratio(), 1.0);
        assert_eq!(PlaybackInfo::default().progress_ratio(), 0.0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(83_500), "1:23");
    }
}
