//! Progress spinner for slow backend calls.
//!
//! Generation and upload requests can take a while, so the spinner shows how
//! long the current one has been running.

use std::time::Instant;

use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::Line,
    widgets::Paragraph,
    Frame,
};

use crate::ui::theme::theme;

const FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

#[derive(Debug, Clone, Default)]
pub struct Spinner {
    /// Label and start time of the running operation.
    running: Option<(String, Instant)>,
    step: usize,
}

impl Spinner {
    pub fn start(&mut self, label: impl Into<String>) {
        self.running = Some((label.into(), Instant::now()));
        self.step = 0;
    }

    pub fn stop(&mut self) {
        self.running = None;
    }

    pub fn is_spinning(&self) -> bool {
        self.running.is_some()
    }

    pub fn tick(&mut self) {
        if self.running.is_some() {
            self.step = (self.step + 1) % FRAMES.len();
        }
    }

    /// `⠹ Generating test cases... 12s`, or an empty line when idle.
    pub fn line(&self) -> Line<'static> {
        match &self.running {
            Some((label, started)) => Line::styled(
                format!(
                    "{} {} {}s",
                    FRAMES[self.step],
                    label,
                    started.elapsed().as_secs()
                ),
                Style::default().fg(theme().accent),
            ),
            None => Line::default(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if self.is_spinning() {
            frame.render_widget(Paragraph::new(self.line()).alignment(Alignment::Center), area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(spinner: &Spinner) -> String {
        spinner.line().spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_idle_is_blank() {
        let spinner = Spinner::default();
        assert!(!spinner.is_spinning());
        assert!(text(&spinner).is_empty());
    }

    #[test]
    fn test_label_and_elapsed() {
        let mut spinner = Spinner::default();
        spinner.start("Uploading and processing the file...");
        assert_eq!(text(&spinner), "⠋ Uploading and processing the file... 0s");
        spinner.stop();
        assert!(!spinner.is_spinning());
    }

    #[test]
    fn test_frames_wrap() {
        let mut spinner = Spinner::default();
        spinner.start("x");
        for _ in 0..FRAMES.len() + 1 {
            spinner.tick();
        }
        assert_eq!(spinner.step, 1);
    }

    #[test]
    fn test_idle_tick_is_noop() {
        let mut spinner = Spinner::default();
        spinner.tick();
        assert_eq!(spinner.step, 0);
    }
}
