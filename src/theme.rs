use ratatui::style::{Color, Modifier, Style};

// Centralized colors for the terminal frontend.

pub fn surface_bg() -> Color {
    Color::Black
}
pub fn surface_fg() -> Color {
    Color::Gray
}
pub fn surface_border() -> Color {
    Color::DarkGray
}

// Menu
pub fn menu_bg() -> Color {
    Color::DarkGray
}
pub fn menu_fg() -> Color {
    Color::White
}
pub fn menu_border() -> Color {
    Color::Gray
}
pub fn menu_divider() -> Color {
    Color::Gray
}
pub fn menu_selected_bg() -> Color {
    Color::Gray
}
pub fn menu_selected_fg() -> Color {
    Color::Black
}

/// Overlay dims what is under it without hiding it.
pub fn overlay_style() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

pub fn status_style() -> Style {
    Style::default().bg(Color::Blue).fg(Color::White)
}

pub fn log_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn menu_item_style(hovered: bool) -> Style {
    if hovered {
        Style::default().bg(menu_selected_bg()).fg(menu_selected_fg())
    } else {
        Style::default().bg(menu_bg()).fg(menu_fg())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hovered_items_swap_to_selected_colors() {
        assert_eq!(menu_item_style(true).bg, Some(menu_selected_bg()));
        assert_eq!(menu_item_style(false).fg, Some(menu_fg()));
    }
}
