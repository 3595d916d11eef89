//! Layout rendering (top bar, filter bar)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use faunadex::controller::{DashboardFilter, FilterOption};
use faunadex::model::UserProfile;

pub fn render_top_bar(frame: &mut Frame, area: Rect, query: &str, searching: bool, user: Option<&UserProfile>) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(32), // Signed-in user
        ])
        .split(area);

    let search_style = if searching {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    let search_text = if query.is_empty() && !searching {
        "Press / to search by name..."
    } else {
        query
    };

    let search = Paragraph::new(search_text)
        .style(search_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search ")
                .padding(Padding::horizontal(1))
                .border_style(if searching {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                }),
        );
    frame.render_widget(search, chunks[0]);

    let user_text = match user {
        Some(user) => format!("{} ({})", user.username, user.effective_level()),
        None => "Guest".to_string(),
    };
    let user_widget = Paragraph::new(user_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Explorer "));
    frame.render_widget(user_widget, chunks[1]);
}

pub fn render_filter_bar(frame: &mut Frame, area: Rect, filter: &DashboardFilter, cursor: usize) {
    let spans: Vec<Span> = FilterOption::ALL
        .iter()
        .enumerate()
        .flat_map(|(i, option)| {
            let mut style = if filter.is_selected(*option) {
                Style::default().fg(Color::Black).bg(Color::Green)
            } else {
                Style::default().fg(Color::White)
            };
            if i == cursor {
                style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
            }
            [Span::styled(format!(" {} ", option.label()), style), Span::raw(" ")]
        })
        .collect();

    let bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Filters (←/→ Space) ")
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(bar, area);
}
