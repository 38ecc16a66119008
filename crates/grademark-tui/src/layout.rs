// Screen layout: panel arrangement and sizing.
//
// Divides the terminal area into fixed zones for the grading screen:
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +-------------------------+------------------------+
// | Submission (65%)         | Scoring (35%)          |
// |                          |                        |
// +-------------------------+------------------------+
// | Message Line (1 row)                              |
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Flex, Layout, Rect};

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: row counter and grading progress.
    pub status_bar: Rect,
    /// Left panel: prompt, rubric, and image references for the current row.
    pub submission: Rect,
    /// Right panel: tier radio and fine score slider.
    pub scoring: Rect,
    /// Outcome of the last load/export, or an error.
    pub message: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect) -> AppLayout {
    // Vertical: status(1) | middle(fill) | message(1) | help(1)
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(vertical[1]);

    AppLayout {
        status_bar: vertical[0],
        submission: horizontal[0],
        scoring: horizontal[1],
        message: vertical[2],
        help_bar: vertical[3],
    }
}

/// Compute a centered rectangle of the given size within `area`, clamped to
/// the available space.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width);
    let clamped_height = height.min(area.height);

    let vertical = Layout::vertical([Constraint::Length(clamped_height)])
        .flex(Flex::Center)
        .split(area);

    let horizontal = Layout::horizontal([Constraint::Length(clamped_width)])
        .flex(Flex::Center)
        .split(vertical[0]);

    horizontal[0]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_area() -> Rect {
        Rect::new(0, 0, 120, 40)
    }

    #[test]
    fn layout_all_rects_nonzero() {
        let layout = build_layout(test_area());
        let rects = [
            ("status_bar", layout.status_bar),
            ("submission", layout.submission),
            ("scoring", layout.scoring),
            ("message", layout.message),
            ("help_bar", layout.help_bar),
        ];
        for (name, rect) in rects {
            assert!(rect.width > 0 && rect.height > 0, "{name} is empty: {rect:?}");
        }
    }

    #[test]
    fn fixed_rows_are_one_high() {
        let layout = build_layout(test_area());
        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.message.height, 1);
        assert_eq!(layout.help_bar.height, 1);
        assert_eq!(layout.status_bar.y, 0);
        assert_eq!(layout.help_bar.y, 39);
    }

    #[test]
    fn submission_is_wider_than_scoring() {
        let layout = build_layout(test_area());
        assert!(layout.submission.width > layout.scoring.width);
        assert_eq!(layout.submission.width + layout.scoring.width, 120);
        assert_eq!(layout.submission.height, layout.scoring.height);
    }

    #[test]
    fn centered_rect_is_centered() {
        let area = Rect::new(0, 0, 80, 24);
        let result = centered_rect(30, 6, area);
        assert_eq!(result.width, 30);
        assert_eq!(result.height, 6);
        let dx = (result.x + result.width / 2) as i32 - 40;
        let dy = (result.y + result.height / 2) as i32 - 12;
        assert!(dx.abs() <= 1 && dy.abs() <= 1, "off-center by ({dx}, {dy})");
    }

    #[test]
    fn centered_rect_clamps_to_small_area() {
        let area = Rect::new(0, 0, 10, 3);
        let result = centered_rect(30, 6, area);
        assert!(result.width <= area.width);
        assert!(result.height <= area.height);
    }
}
