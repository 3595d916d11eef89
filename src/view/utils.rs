//! Utility functions for rendering UI components

use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, List, ListItem, ListState},
    Frame,
};

pub fn render_scrollable_list(
    frame: &mut Frame,
    area: Rect,
    items: Vec<ListItem>,
    selected_index: usize,
    block: Block,
) {
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default()); // Highlight handled by item styles

    let mut list_state = ListState::default();
    list_state.select(Some(selected_index));

    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Calculate width needed for index column (log10(n) + padding)
pub fn calculate_num_width(item_count: usize) -> usize {
    if item_count == 0 {
        2
    } else {
        let digits = (item_count as f64).log10().floor() as usize + 1;
        digits + 1
    }
}

pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() > max_width {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_width)
    } else {
        format!("{:<width$}", s, width = max_width)
    }
}

/// Column widths for the animal list: (num, favorite, name, scientific, status)
pub fn calculate_animal_column_widths(content_width: usize, item_count: usize) -> (usize, usize, usize, usize, usize) {
    // Format: " {num}   {fav}   {name}   {scientific}   {status}"
    let num_width = calculate_num_width(item_count);
    let favorite_width = 2;
    let status_width = 4;
    let fixed_width = 1 + num_width + 3 + favorite_width + 3 + 3 + 3 + status_width;
    let remaining_width = content_width.saturating_sub(fixed_width);
    let name_width = (remaining_width * 50) / 100;
    let scientific_width = remaining_width.saturating_sub(name_width);

    (num_width, favorite_width, name_width, scientific_width, status_width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string_pads_and_cuts() {
        assert_eq!(truncate_string("Komodo", 8), "Komodo  ");
        assert_eq!(truncate_string("Orangutan Tapanuli", 10), "Orangut...");
    }

    #[test]
    fn test_column_widths_fill_content() {
        let (num, fav, name, scientific, status) = calculate_animal_column_widths(80, 12);
        assert_eq!(num, 3);
        assert_eq!(1 + num + 3 + fav + 3 + name + 3 + scientific + 3 + status, 80);
    }
}
