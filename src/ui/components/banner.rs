//! Transient banners.
//!
//! Validation failures, server errors and confirmations are stacked in a strip
//! docked above the footer. A banner removes itself once its lifetime is over;
//! the lifetime comes from `settings.banner_seconds`.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::config::DEFAULT_BANNER_SECONDS;
use crate::ui::theme::theme;

/// How many banners are kept at once.
const CAPACITY: usize = 3;

/// Severity of a banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Info,
    Success,
    Warning,
    Error,
}

impl BannerKind {
    fn symbol(&self) -> &'static str {
        match self {
            BannerKind::Info => "ℹ",
            BannerKind::Success => "✓",
            BannerKind::Warning => "⚠",
            BannerKind::Error => "✗",
        }
    }

    fn style(&self) -> Style {
        let t = theme();
        let color = match self {
            BannerKind::Info => t.accent,
            BannerKind::Success => t.selected,
            BannerKind::Warning => t.warning,
            BannerKind::Error => t.error,
        };
        Style::default().fg(color)
    }
}

/// One banner on screen.
#[derive(Debug, Clone)]
pub struct Banner {
    pub text: String,
    pub kind: BannerKind,
    expires_at: Instant,
}

impl Banner {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// The queue of visible banners, oldest first.
#[derive(Debug)]
pub struct Banners {
    queue: VecDeque<Banner>,
    lifetime: Duration,
}

impl Default for Banners {
    fn default() -> Self {
        Self::with_lifetime(Duration::from_secs(DEFAULT_BANNER_SECONDS))
    }
}

impl Banners {
    pub fn with_lifetime(lifetime: Duration) -> Self {
        Self {
            queue: VecDeque::with_capacity(CAPACITY),
            lifetime,
        }
    }

    #[cfg(test)]
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Show a banner. The oldest one is dropped when the strip is full.
    pub fn show(&mut self, kind: BannerKind, text: impl Into<String>) {
        if self.queue.len() == CAPACITY {
            self.queue.pop_front();
        }
        self.queue.push_back(Banner {
            text: text.into(),
            kind,
            expires_at: Instant::now() + self.lifetime,
        });
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.show(BannerKind::Info, text);
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.show(BannerKind::Success, text);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.show(BannerKind::Warning, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.show(BannerKind::Error, text);
    }

    /// Drop every banner whose lifetime is over at `now`.
    pub fn prune(&mut self, now: Instant) {
        self.queue.retain(|b| !b.is_expired(now));
    }

    /// Called on every tick.
    pub fn tick(&mut self) {
        self.prune(Instant::now());
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Banner> {
        self.queue.iter()
    }

    /// Draw the strip at the bottom of `area`, one line per banner. Long
    /// texts are cut at the strip width.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if self.queue.is_empty() || area.height < 4 {
            return;
        }
        let height = (self.queue.len() as u16 + 2).min(area.height - 1);
        let width = area.width.saturating_sub(4).min(90);
        let strip = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + area.height - height - 1,
            width,
            height,
        );

        let worst = self
            .queue
            .iter()
            .map(|b| b.kind)
            .max_by_key(|k| *k as u8)
            .unwrap_or(BannerKind::Info);

        let lines: Vec<Line> = self
            .queue
            .iter()
            .map(|b| {
                let style = b.kind.style();
                Line::from(vec![
                    Span::styled(format!("{} ", b.kind.symbol()), style.add_modifier(Modifier::BOLD)),
                    Span::styled(b.text.as_str(), style),
                ])
            })
            .collect();

        frame.render_widget(Clear, strip);
        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(worst.style()),
            ),
            strip,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lifetime_is_five_seconds() {
        assert_eq!(Banners::default().lifetime(), Duration::from_secs(5));
    }

    #[test]
    fn test_kinds_in_order() {
        let mut banners = Banners::default();
        banners.error("Invalid issue key");
        banners.success("Sent");
        let kinds: Vec<_> = banners.iter().map(|b| b.kind).collect();
        assert_eq!(kinds, vec![BannerKind::Error, BannerKind::Success]);
    }

    #[test]
    fn test_full_strip_drops_oldest() {
        let mut banners = Banners::default();
        for i in 0..5 {
            banners.info(format!("banner {}", i));
        }
        assert_eq!(banners.len(), CAPACITY);
        assert_eq!(banners.iter().next().map(|b| b.text.as_str()), Some("banner 2"));
    }

    #[test]
    fn test_prune_after_lifetime() {
        let mut banners = Banners::with_lifetime(Duration::from_secs(5));
        banners.warning("epic");
        let shown = Instant::now();
        banners.prune(shown + Duration::from_secs(4));
        assert_eq!(banners.len(), 1);
        banners.prune(shown + Duration::from_secs(6));
        assert!(banners.is_empty());
    }

    #[test]
    fn test_zero_lifetime_is_gone_on_next_tick() {
        let mut banners = Banners::with_lifetime(Duration::ZERO);
        banners.error("gone");
        banners.tick();
        assert!(banners.is_empty());
    }
}
