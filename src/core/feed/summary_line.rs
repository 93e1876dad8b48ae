//! Summary line grouping and stacking engine
//!
//! Converts the per-target grouped map into compact narrative lines, one per
//! displayed target cluster. The interesting part is singleton stacking:
//! when a target was touched by exactly one actor, other not-yet-displayed
//! targets of the same category with the same sole actor are folded into the
//! same line, so "Bob edited A", "Bob edited B" and "Bob edited C" collapse
//! into "Bob edited A, B, C".
//!
//! Output examples (with the plain English renderer):
//! - `Alice edited Main Page (3 edits)`
//! - `Bob edited PageA, PageB, PageC`
//! - `Alice, Bob and Carol commented on Main Page`
//! - `Alice sent a message to Bob (2 messages)`

use super::render::{LineArgs, NarrativeRenderer, TextShaper};
use super::types::{ActivityItem, ActivityKind, GroupedActivity, SummaryLine, TargetGroup};
use crate::config::FeedConfig;
use indexmap::IndexMap;
use std::cmp::Reverse;
use std::collections::HashSet;
use tracing::debug;

/// Groups older than this never produce a summary line.
pub const RECENCY_WINDOW_SECS: i64 = 60 * 60 * 24 * 3;

/// Maximum distinct targets folded into one line fragment.
pub const STACK_LIMIT: usize = 5;

/// Visible-character budget for actor display names in line fragments.
pub const ACTOR_LABEL_CHARS: usize = 15;

/// Produce the full sorted summary line list for one aggregation run.
///
/// Grouped categories run in a fixed order with a fresh displayed set each;
/// system messages bypass grouping and contribute one line per item. The
/// result is sorted descending by timestamp.
pub fn summarize(
    grouped: &GroupedActivity,
    items: &[ActivityItem],
    config: &FeedConfig,
    cutoff: i64,
    shaper: &dyn TextShaper,
    renderer: &dyn NarrativeRenderer,
) -> Vec<SummaryLine> {
    let mut lines = Vec::new();

    let categories = [
        (config.show_edits, ActivityKind::Edit),
        (config.show_comments, ActivityKind::Comment),
        (config.show_relationships, ActivityKind::Friend),
        (config.show_messages_sent, ActivityKind::UserMessage),
    ];
    for (enabled, kind) in categories {
        if !enabled {
            continue;
        }
        if let Some(groups) = grouped.groups(kind) {
            let mut displayed = HashSet::new();
            summarize_category(groups, kind, cutoff, &mut displayed, shaper, renderer, &mut lines);
        }
    }

    for item in items {
        if item.kind == ActivityKind::SystemMessage {
            let label =
                renderer.actor_label(&shaper.truncate_visual(&item.actor_name, ACTOR_LABEL_CHARS));
            lines.push(SummaryLine {
                kind: ActivityKind::SystemMessage,
                timestamp: item.timestamp,
                text: renderer.system_line(&label, &item.summary_text),
            });
        }
    }

    lines.sort_by_key(|line| Reverse(line.timestamp));
    debug!(lines = lines.len(), "composed summary lines");
    lines
}

/// Run one category pass over its target groups.
///
/// `displayed` is the set of targets already rendered within this pass; it
/// is created empty by the caller and discarded afterwards. Groups whose
/// `last_timestamp` falls outside the recency window are skipped outright
/// and never participate in stacking.
pub fn summarize_category(
    groups: &IndexMap<String, TargetGroup>,
    kind: ActivityKind,
    cutoff: i64,
    displayed: &mut HashSet<String>,
    shaper: &dyn TextShaper,
    renderer: &dyn NarrativeRenderer,
    out: &mut Vec<SummaryLine>,
) {
    for (target, group) in groups {
        if group.last_timestamp < cutoff {
            continue;
        }
        if displayed.contains(target) {
            continue;
        }
        displayed.insert(target.clone());

        let actor_count = group.actor_count();
        let mut pages = renderer.page_label(kind, target);
        let mut page_count = 1;
        let mut sole_actor = String::new();

        if let Some((name, actions)) = group.sole_actor() {
            sole_actor = name.to_string();
            if actions.len() > 1 {
                pages.push(' ');
                pages.push_str(&renderer.group_count(kind, actions.len(), name));
            }

            // Stack other single-actor targets of this category that share
            // the same sole actor, up to the fragment cap.
            for (other_target, other_group) in groups {
                if page_count >= STACK_LIMIT {
                    break;
                }
                if displayed.contains(other_target) || other_group.last_timestamp < cutoff {
                    continue;
                }
                let (other_name, other_actions) = match other_group.sole_actor() {
                    Some(found) => found,
                    None => continue,
                };
                if other_name != name {
                    continue;
                }

                displayed.insert(other_target.clone());
                pages.push_str(renderer.comma_separator());
                pages.push_str(&renderer.page_label(kind, other_target));
                if other_actions.len() > 1 {
                    pages.push(' ');
                    pages.push_str(&renderer.group_count(kind, other_actions.len(), name));
                }
                page_count += 1;
            }
        }

        let actors = compose_actors(group, shaper, renderer);

        if !pages.is_empty() || !kind.requires_target_fragment() {
            out.push(SummaryLine {
                kind,
                timestamp: group.last_timestamp,
                text: renderer.line(
                    kind,
                    &LineArgs {
                        actors: &actors,
                        actor_count,
                        pages: &pages,
                        page_count,
                        sole_actor: &sole_actor,
                    },
                ),
            });
        }
    }
}

/// Join a group's actor labels: comma-separated, localized "and" before the
/// final name when there are two or more.
fn compose_actors(
    group: &TargetGroup,
    shaper: &dyn TextShaper,
    renderer: &dyn NarrativeRenderer,
) -> String {
    let labels: Vec<String> = group
        .actions_by_actor
        .keys()
        .map(|name| renderer.actor_label(&shaper.truncate_visual(name, ACTOR_LABEL_CHARS)))
        .collect();

    match labels.len() {
        0 => String::new(),
        1 => labels.into_iter().next().unwrap_or_default(),
        n => {
            let mut out = labels[..n - 1].join(renderer.comma_separator());
            out.push_str(renderer.and_separator());
            out.push_str(&labels[n - 1]);
            out
        }
    }
}
