//! Progress bar rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use faunadex::model::{PlaybackInfo, PlaybackState, format_duration};

pub fn render_progress_bar(frame: &mut Frame, area: Rect, playback: &PlaybackInfo) {
    let status_text = match &playback.state {
        PlaybackState::Idle => " No narration playing".to_string(),
        PlaybackState::Loading => " ⏳ Loading narration".to_string(),
        PlaybackState::Playing => " ▶ Narration".to_string(),
        PlaybackState::Paused => " ⏸  Narration".to_string(),
        PlaybackState::Error(message) => format!(" ✖ {}", message),
    };

    let time_str = format!(
        "{} / {}",
        format_duration(playback.position_ms),
        format_duration(playback.duration_ms)
    );

    let inner_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([Constraint::Length(3)])
        .split(area);

    let title = format!("{} ", status_text);
    let controls_info = " Space play/pause | ←/→ seek | s stop ";

    let gauge_color = match playback.state {
        PlaybackState::Error(_) => Color::Red,
        _ => Color::Green,
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(Style::default().fg(gauge_color))
        .ratio(playback.progress_ratio())
        .label(time_str);

    frame.render_widget(gauge, inner_chunks[0]);
}
