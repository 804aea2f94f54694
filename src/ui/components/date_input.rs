use chrono::{Datelike, NaiveDate};
use crossterm::event::KeyCode;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

impl DatePart {
    fn width(&self) -> usize {
        match self {
            DatePart::Year => 4,
            DatePart::Month | DatePart::Day => 2,
        }
    }

    fn placeholder(&self) -> &'static str {
        match self {
            DatePart::Year => "[YYYY]",
            DatePart::Month => "[MM]",
            DatePart::Day => "[DD]",
        }
    }
}

/// Digit-by-digit date entry for one part (year, month, day) at a time.
///
/// Optional dates start unset; typing into them starts from `fallback`.
/// `Delete` clears an optional date.
pub struct DateInputState {
    date: Option<NaiveDate>,
    fallback: NaiveDate,
    optional: bool,
    pub editing: bool,
    pub date_part: DatePart,
    buffer: String,
}

impl DateInputState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            fallback: date,
            optional: false,
            editing: false,
            date_part: DatePart::Year,
            buffer: String::new(),
        }
    }

    pub fn optional(date: Option<NaiveDate>, fallback: NaiveDate) -> Self {
        Self {
            date,
            fallback,
            optional: true,
            editing: false,
            date_part: DatePart::Year,
            buffer: String::new(),
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        self.date_part = DatePart::Year;
        self.buffer.clear();
    }

    pub fn next_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        };
        self.buffer.clear();
    }

    pub fn previous_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        };
        self.buffer.clear();
    }

    /// Apply a completed buffer to the current part. Impossible dates are ignored.
    fn commit(&mut self) {
        let current = self.date.unwrap_or(self.fallback);
        let candidate = match self.date_part {
            DatePart::Year => self
                .buffer
                .parse::<i32>()
                .ok()
                .filter(|y| (1900..=2100).contains(y))
                .and_then(|y| current.with_year(y)),
            DatePart::Month => self.buffer.parse::<u32>().ok().and_then(|m| current.with_month(m)),
            DatePart::Day => self.buffer.parse::<u32>().ok().and_then(|d| current.with_day(d)),
        };

        if let Some(date) = candidate {
            self.date = Some(date);
            self.fallback = date;
            if self.date_part != DatePart::Day {
                self.next_date_part();
                return;
            }
        }
        self.buffer.clear();
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.buffer.push(c);
                if self.buffer.len() == self.date_part.width() {
                    self.commit();
                }
            }
            KeyCode::Backspace => {
                self.buffer.pop();
            }
            KeyCode::Delete if self.optional => {
                self.date = None;
                self.buffer.clear();
            }
            KeyCode::Right => self.next_date_part(),
            KeyCode::Left => self.previous_date_part(),
            _ => {}
        }
    }

    pub fn get_display_string(&self) -> String {
        let date = match (self.date, self.editing) {
            (Some(date), _) => date,
            (None, false) => return "Not set".to_string(),
            (None, true) => self.fallback,
        };

        if !self.editing {
            return date.format("%Y-%m-%d").to_string();
        }

        let marker = if self.buffer.is_empty() {
            self.date_part.placeholder().to_string()
        } else {
            format!("[{}]", self.buffer)
        };
        let (year, month, day) = (
            format!("{:04}", date.year()),
            format!("{:02}", date.month()),
            format!("{:02}", date.day()),
        );

        match self.date_part {
            DatePart::Year => format!("{}{}-{}-{}", year, marker, month, day),
            DatePart::Month => format!("{}-{}{}-{}", year, month, marker, day),
            DatePart::Day => format!("{}-{}-{}{}", year, month, day, marker),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn type_digits(state: &mut DateInputState, digits: &str) {
        for c in digits.chars() {
            state.handle_input(KeyCode::Char(c));
        }
    }

    #[test]
    fn test_typing_a_full_date() {
        let mut state = DateInputState::new(date(2024, 1, 15));
        state.toggle_editing();
        type_digits(&mut state, "20250630");
        assert_eq!(state.date(), Some(date(2025, 6, 30)));
        assert_eq!(state.date_part, DatePart::Day);
    }

    #[test]
    fn test_invalid_day_is_ignored() {
        let mut state = DateInputState::new(date(2023, 2, 10));
        state.toggle_editing();
        state.date_part = DatePart::Day;
        type_digits(&mut state, "30");
        assert_eq!(state.date(), Some(date(2023, 2, 10)));

        type_digits(&mut state, "28");
        assert_eq!(state.date(), Some(date(2023, 2, 28)));
    }

    #[test]
    fn test_year_out_of_range_is_ignored() {
        let mut state = DateInputState::new(date(2024, 5, 1));
        state.toggle_editing();
        type_digits(&mut state, "1800");
        assert_eq!(state.date(), Some(date(2024, 5, 1)));
        assert_eq!(state.date_part, DatePart::Year);
    }

    #[test]
    fn test_optional_date_can_be_cleared() {
        let mut state = DateInputState::optional(Some(date(2024, 5, 1)), date(2024, 4, 1));
        state.toggle_editing();
        state.handle_input(KeyCode::Delete);
        assert_eq!(state.date(), None);

        state.toggle_editing();
        assert_eq!(state.get_display_string(), "Not set");
    }

    #[test]
    fn test_required_date_ignores_delete() {
        let mut state = DateInputState::new(date(2024, 5, 1));
        state.toggle_editing();
        state.handle_input(KeyCode::Delete);
        assert_eq!(state.date(), Some(date(2024, 5, 1)));
    }

    #[test]
    fn test_display_marks_current_part() {
        let mut state = DateInputState::new(date(2024, 5, 1));
        assert_eq!(state.get_display_string(), "2024-05-01");

        state.toggle_editing();
        state.next_date_part();
        assert_eq!(state.get_display_string(), "2024-05[MM]-01");

        type_digits(&mut state, "1");
        assert_eq!(state.get_display_string(), "2024-05[1]-01");
    }
}
