//! Text shaping and narrative rendering collaborators
//!
//! The engine never formats user-visible text on its own; it composes
//! fragments through the [`TextShaper`] and [`NarrativeRenderer`] traits so a
//! host application can plug in its own localization and link markup. The
//! default implementations here produce plain English text and are what the
//! crate's own tests render with.

use super::types::ActivityKind;

/// Visible-width truncation and escaping of raw text.
///
/// Passed explicitly into every run; there is no ambient locale or
/// formatting state.
pub trait TextShaper {
    /// Truncate to at most `max_chars` visible characters, ellipsized.
    fn truncate_visual(&self, text: &str, max_chars: usize) -> String;

    /// Escape text for safe rendering.
    fn escape(&self, text: &str) -> String;
}

/// Character-count truncation with a one-character ellipsis, plus HTML
/// entity escaping.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultShaper;

impl TextShaper for DefaultShaper {
    fn truncate_visual(&self, text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            return text.to_string();
        }
        if max_chars <= 1 {
            return "\u{2026}".to_string();
        }
        let mut out: String = text.chars().take(max_chars - 1).collect();
        out.push('\u{2026}');
        out
    }

    fn escape(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                _ => out.push(c),
            }
        }
        out
    }
}

/// Arguments handed to a category line template.
#[derive(Debug, Clone, Copy)]
pub struct LineArgs<'a> {
    /// Composed actor fragment ("Alice", "Alice and Bob", ...).
    pub actors: &'a str,
    pub actor_count: usize,
    /// Composed target fragment ("PageA, PageB (2 edits)", ...).
    pub pages: &'a str,
    pub page_count: usize,
    /// Sole actor's display name when the group has exactly one actor,
    /// empty otherwise; intended for grammatical-gender-aware phrasing.
    pub sole_actor: &'a str,
}

/// Composes localized narrative text from engine-built fragments.
pub trait NarrativeRenderer {
    /// Label for a target (page title or recipient name).
    fn page_label(&self, kind: ActivityKind, target: &str) -> String;

    /// Label for an actor display name (already truncated by the engine).
    fn actor_label(&self, name: &str) -> String;

    /// Parenthesized action-count phrase, e.g. `"(3 edits)"`.
    fn group_count(&self, kind: ActivityKind, count: usize, actor: &str) -> String;

    fn comma_separator(&self) -> &str {
        ", "
    }

    fn and_separator(&self) -> &str {
        " and "
    }

    /// One full summary line for a grouped category.
    fn line(&self, kind: ActivityKind, args: &LineArgs<'_>) -> String;

    /// One full summary line for a single system message.
    fn system_line(&self, actor_label: &str, message: &str) -> String;
}

/// Plain-text English renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishRenderer;

impl NarrativeRenderer for EnglishRenderer {
    fn page_label(&self, _kind: ActivityKind, target: &str) -> String {
        target.to_string()
    }

    fn actor_label(&self, name: &str) -> String {
        name.to_string()
    }

    fn group_count(&self, kind: ActivityKind, count: usize, _actor: &str) -> String {
        let noun = match kind {
            ActivityKind::Edit => "edits",
            ActivityKind::Comment => "comments",
            ActivityKind::UserMessage => "messages",
            _ => "times",
        };
        format!("({} {})", count, noun)
    }

    fn line(&self, kind: ActivityKind, args: &LineArgs<'_>) -> String {
        match kind {
            ActivityKind::Edit => format!("{} edited {}", args.actors, args.pages),
            ActivityKind::Comment => format!("{} commented on {}", args.actors, args.pages),
            ActivityKind::Friend => {
                format!("{} became friends with {}", args.actors, args.pages)
            }
            ActivityKind::Foe => format!("{} became foes with {}", args.actors, args.pages),
            ActivityKind::UserMessage => {
                if args.page_count > 1 {
                    format!("{} sent messages to {}", args.actors, args.pages)
                } else {
                    format!("{} sent a message to {}", args.actors, args.pages)
                }
            }
            // System messages normally go through system_line; compose
            // something sensible anyway.
            ActivityKind::SystemMessage => format!("{} {}", args.actors, args.pages),
        }
    }

    fn system_line(&self, actor_label: &str, message: &str) -> String {
        format!("{} {}", actor_label, message)
    }
}
