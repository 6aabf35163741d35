//! Contextual help bar component.
//!
//! Displays the key hints of the active context on one line at the bottom of
//! the screen.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::events::{keybindings, KeyContext};
use crate::ui::theme::theme;

/// Render the hints of one or more contexts, in order.
pub fn render_context_help(frame: &mut Frame, area: Rect, contexts: &[KeyContext]) {
    frame.render_widget(Paragraph::new(hint_line(contexts)), area);
}

/// Build the styled hint line: keys in brackets, then their description.
fn hint_line(contexts: &[KeyContext]) -> Line<'static> {
    let t = theme();
    let spans: Vec<Span<'static>> = contexts
        .iter()
        .flat_map(|c| keybindings(*c).iter())
        .flat_map(|b| {
            [
                Span::styled(format!(" [{}]", b.keys), Style::default().fg(t.accent)),
                Span::styled(format!(" {}", b.description), Style::default().fg(t.muted)),
            ]
        })
        .collect();
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_line_has_key_and_description_per_binding() {
        let line = hint_line(&[KeyContext::Editing]);
        assert_eq!(line.spans.len(), keybindings(KeyContext::Editing).len() * 2);
        assert_eq!(line.spans[0].content, " [Tab]");
    }

    #[test]
    fn test_hint_line_concatenates_contexts() {
        let line = hint_line(&[KeyContext::Login, KeyContext::Global]);
        let expected = keybindings(KeyContext::Login).len() + keybindings(KeyContext::Global).len();
        assert_eq!(line.spans.len(), expected * 2);
    }

    #[test]
    fn test_hint_line_empty() {
        assert!(hint_line(&[]).spans.is_empty());
    }
}
