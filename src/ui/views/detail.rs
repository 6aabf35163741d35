//! Issue detail panel.
//!
//! Shows the issue fetched by a lookup: title, type, status, assignee and the
//! description converted from HTML to plain text.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::api::Issue;
use crate::ui::theme::theme;

/// Shown when an issue has no description.
pub const NO_DESCRIPTION: &str = "No description available for this issue.";

/// Convert an HTML fragment to plain text.
///
/// Block-level tags become line breaks, list items get a bullet, every other
/// tag is dropped and the common entities are decoded.
pub fn html_to_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut chars = html.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '<' => {
                let mut tag = String::new();
                for t in chars.by_ref() {
                    if t == '>' {
                        break;
                    }
                    tag.push(t);
                }
                push_tag(&mut out, &tag);
            }
            '&' => {
                let mut entity = String::new();
                while let Some(&e) = chars.peek() {
                    if e == ';' || entity.len() > 8 {
                        break;
                    }
                    entity.push(e);
                    chars.next();
                }
                if chars.peek() == Some(&';') {
                    chars.next();
                    match decode_entity(&entity) {
                        Some(decoded) => out.push(decoded),
                        None => {
                            out.push('&');
                            out.push_str(&entity);
                            out.push(';');
                        }
                    }
                } else {
                    out.push('&');
                    out.push_str(&entity);
                }
            }
            '\r' => {}
            _ => out.push(c),
        }
    }

    tidy_lines(&out)
}

fn push_tag(out: &mut String, tag: &str) {
    let name: String = tag
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    let closing = tag.starts_with('/');

    match name.as_str() {
        "br" => out.push('\n'),
        "li" if !closing => {
            ensure_line_start(out);
            out.push_str("• ");
        }
        "p" | "div" | "ul" | "ol" | "li" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "tr"
        | "blockquote" | "pre" => ensure_line_start(out),
        _ => {}
    }
}

fn ensure_line_start(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = match code.strip_prefix(&['x', 'X'][..]) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}

/// Trim each line and collapse runs of blank lines.
fn tidy_lines(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() && lines.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// The description of an issue as plain text, or the placeholder.
pub fn description_text(issue: &Issue) -> String {
    let text = issue
        .description
        .as_deref()
        .map(html_to_text)
        .unwrap_or_default();
    if text.trim().is_empty() {
        NO_DESCRIPTION.to_string()
    } else {
        text
    }
}

/// Render the issue panel.
pub fn render_issue(frame: &mut Frame, area: Rect, key: &str, issue: &Issue) {
    let t = theme();
    let label = Style::default().fg(t.muted);

    let mut type_span = Span::raw(issue.issue_type.clone());
    if issue.is_epic() {
        type_span = type_span.style(Style::default().fg(t.warning).add_modifier(Modifier::BOLD));
    }

    let mut lines = vec![
        Line::from(Span::styled(
            issue.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Type: ", label),
            type_span,
            Span::styled("   Status: ", label),
            Span::raw(issue.status.clone()),
            Span::styled("   Assignee: ", label),
            Span::raw(if issue.assignee.is_empty() {
                "Unassigned".to_string()
            } else {
                issue.assignee.clone()
            }),
        ]),
        Line::raw(""),
    ];
    lines.extend(description_text(issue).lines().map(|l| Line::raw(l.to_string())));

    let block = Block::default()
        .title(Span::styled(format!(" {} ", key), t.title()))
        .borders(Borders::ALL)
        .border_style(t.border(false));

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}
