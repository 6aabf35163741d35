//! Terminal event polling.

use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEventKind, KeyModifiers};

use super::Event;

/// Interval between ticks in milliseconds. Banner expiry and spinners advance
/// on ticks.
const TICK_RATE_MS: u64 = 100;

/// Turns crossterm input into [`Event`]s.
///
/// Ticks are emitted on a fixed schedule even while keys are being pressed,
/// so a user typing in a field does not freeze the banners.
pub struct EventHandler {
    tick_rate: Duration,
    last_tick: Instant,
}

impl EventHandler {
    pub fn new() -> Self {
        Self::with_tick_rate(TICK_RATE_MS)
    }

    pub fn with_tick_rate(tick_rate_ms: u64) -> Self {
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms),
            last_tick: Instant::now(),
        }
    }

    /// Block until the next key press, resize or tick.
    pub fn next(&mut self) -> std::io::Result<Event> {
        loop {
            let timeout = self.until_tick();
            if event::poll(timeout)? {
                if let Some(event) = translate(event::read()?) {
                    return Ok(event);
                }
            }
            if self.until_tick().is_zero() {
                self.last_tick = Instant::now();
                return Ok(Event::Tick);
            }
        }
    }

    fn until_tick(&self) -> Duration {
        self.tick_rate.saturating_sub(self.last_tick.elapsed())
    }
}

/// Map a terminal event. Ctrl+C always quits; key releases and other input
/// kinds are skipped.
fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Release => None,
        CrosstermEvent::Key(key)
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            Some(Event::Quit)
        }
        CrosstermEvent::Key(key) => Some(Event::Key(key)),
        CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
        _ => None,
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEvent;

    use super::*;

    #[test]
    fn test_default_tick_rate() {
        assert_eq!(EventHandler::default().tick_rate, Duration::from_millis(TICK_RATE_MS));
    }

    #[test]
    fn test_ctrl_c_becomes_quit() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(translate(CrosstermEvent::Key(ctrl_c)), Some(Event::Quit));

        let plain = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        assert_eq!(translate(CrosstermEvent::Key(plain)), Some(Event::Key(plain)));
    }

    #[test]
    fn test_releases_and_focus_are_skipped() {
        let mut release = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(translate(CrosstermEvent::Key(release)), None);
        assert_eq!(translate(CrosstermEvent::FocusLost), None);
        assert_eq!(translate(CrosstermEvent::Resize(80, 24)), Some(Event::Resize(80, 24)));
    }

    #[test]
    fn test_until_tick_counts_down() {
        let mut handler = EventHandler::with_tick_rate(10_000);
        assert!(handler.until_tick() > Duration::from_secs(9));

        handler.last_tick = Instant::now() - Duration::from_secs(11);
        assert!(handler.until_tick().is_zero());
    }
}
