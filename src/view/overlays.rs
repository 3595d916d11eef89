//! Overlay rendering (error notification, help popup)

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub fn render_error_notification(frame: &mut Frame, message: &str) {
    let area = frame.area();

    // Fixed width popup (responsive to screen size)
    let popup_width = 52.min(area.width.saturating_sub(4));
    let inner_width = popup_width.saturating_sub(4).max(1) as usize;

    let line_count = message.chars().count().div_ceil(inner_width) as u16;

    // Height: top border (1) + message lines + bottom border (1)
    let popup_height = (2 + line_count.max(1)).min(area.height.saturating_sub(4));

    let popup_area = Rect {
        x: area.width.saturating_sub(popup_width) / 2,
        y: area.height.saturating_sub(popup_height) / 2,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let error_widget = Paragraph::new(message.to_string())
        .style(Style::default().fg(Color::Red))
        .wrap(ratatui::widgets::Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Error (Esc to dismiss) ")
                .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        );

    frame.render_widget(error_widget, popup_area);
}

pub fn render_help_popup(frame: &mut Frame) {
    let area = frame.area();

    let keybindings = [
        ("", "── Dashboard ──"),
        ("↑ / ↓", "Move selection"),
        ("← / →", "Move filter cursor"),
        ("Space", "Toggle filter"),
        ("/", "Search by name"),
        ("Enter", "Open animal"),
        ("F", "Favorite / Unfavorite"),
        ("A", "Open in AR"),
        ("P", "Profile"),
        ("R", "Reload"),
        ("", ""),
        ("", "── Animal ──"),
        ("Tab", "Next section"),
        ("N / M", "Narrate description / fun fact"),
        ("Space", "Play / Pause"),
        ("← / →", "Seek 5s"),
        ("S", "Stop narration"),
        ("Esc", "Back"),
        ("", ""),
        ("", "── Profile / AR ──"),
        ("L", "Cycle education level"),
        ("E / W", "Edit profile / Change password"),
        ("O", "Sign out"),
        ("I", "Install AR runtime"),
        ("G / D", "Grant / Deny camera"),
        ("S / P", "Scan / Detect plane"),
        ("Enter / C", "Place / Clear animals"),
        ("", ""),
        ("", "── General ──"),
        ("?", "Toggle this help"),
        ("Ctrl+Q", "Quit"),
    ];

    let popup_width = 62.min(area.width);
    let popup_height = (keybindings.len() as u16 + 2).min(area.height.saturating_sub(4));

    let popup_area = Rect {
        x: area.width.saturating_sub(popup_width) / 2,
        y: area.height.saturating_sub(popup_height) / 2,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let lines: Vec<Line> = keybindings
        .iter()
        .map(|(key, desc)| {
            if key.is_empty() {
                // Section header or empty line
                Line::from(Span::styled(
                    format!("{:^38}", desc),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(
                        format!("{:>18}", key),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(desc.to_string(), Style::default().fg(Color::White)),
                ])
            }
        })
        .collect();

    let help_text = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help (? or Esc to close) ")
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        )
        .style(Style::default().bg(Color::Black));

    frame.render_widget(help_text, popup_area);
}
