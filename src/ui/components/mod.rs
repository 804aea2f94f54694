pub mod date_input;

use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Spans,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// A rect of the given percentage size centered in `r`
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Y/N popup drawn over the current screen
pub fn render_delete_confirmation<B: Backend>(frame: &mut Frame<B>, what: &str, consequence: &str) {
    let popup_area = centered_rect(50, 25, frame.size());

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(format!("Are you sure you want to delete this {}?", what)),
        Spans::from(""),
        Spans::from(consequence.to_string()),
        Spans::from(""),
        Spans::from("<Y> Yes  <N> No"),
    ])
    .block(Block::default().title("Confirm Delete").borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}

/// Wrapping selection helpers shared by the list screens
pub fn next_index(selected: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match selected {
        Some(i) if i + 1 < len => i + 1,
        _ => 0,
    })
}

pub fn previous_index(selected: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match selected {
        Some(0) | None => len - 1,
        Some(i) => i - 1,
    })
}

/// Free-text field editing: characters append, backspace deletes
pub fn edit_text(text: &mut String, key: KeyCode) {
    match key {
        KeyCode::Char(c) => text.push(c),
        KeyCode::Backspace => {
            text.pop();
        }
        _ => {}
    }
}

/// Step to the neighbouring option, wrapping. An unknown `current` lands on an end.
pub fn cycle<T: Copy + PartialEq>(options: &[T], current: T, forward: bool) -> T {
    let position = options.iter().position(|o| *o == current);
    let index = if forward {
        next_index(position, options.len())
    } else {
        previous_index(position, options.len())
    };
    index.map(|i| options[i]).unwrap_or(current)
}

/// `cycle` over record ids; `None` is one of the stops when `allow_none`
pub fn cycle_id(current: Option<i32>, ids: &[i32], forward: bool, allow_none: bool) -> Option<i32> {
    let mut stops: Vec<Option<i32>> = Vec::with_capacity(ids.len() + 1);
    if allow_none {
        stops.push(None);
    }
    stops.extend(ids.iter().copied().map(Some));
    cycle(&stops, current, forward)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_wraps_both_ways() {
        let options = ["low", "medium", "high"];
        assert_eq!(cycle(&options, "high", true), "low");
        assert_eq!(cycle(&options, "low", false), "high");
        assert_eq!(cycle(&options, "medium", true), "high");
        assert_eq!(cycle(&[] as &[&str], "x", true), "x");
    }

    #[test]
    fn test_cycle_id() {
        assert_eq!(cycle_id(Some(1), &[1, 2], true, false), Some(2));
        assert_eq!(cycle_id(Some(2), &[1, 2], true, false), Some(1));
        assert_eq!(cycle_id(None, &[1, 2], true, true), Some(1));
        assert_eq!(cycle_id(Some(2), &[1, 2], true, true), None);
        assert_eq!(cycle_id(None, &[1, 2], false, true), Some(2));
        assert_eq!(cycle_id(Some(9), &[], true, false), Some(9));
    }

    #[test]
    fn test_selection_wraps() {
        assert_eq!(next_index(Some(2), 3), Some(0));
        assert_eq!(next_index(Some(0), 3), Some(1));
        assert_eq!(previous_index(Some(0), 3), Some(2));
        assert_eq!(previous_index(Some(2), 3), Some(1));
        assert_eq!(next_index(None, 0), None);
        assert_eq!(previous_index(Some(1), 0), None);
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(50, 50, outer);
        assert_eq!(inner.width, 50);
        assert_eq!(inner.height, 20);
        assert_eq!(inner.x, 25);
        assert_eq!(inner.y, 10);
    }
}
