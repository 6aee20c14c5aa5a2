//! Line-oriented rendering of the feed.
//!
//! This is the single rendering boundary: per-kind presentation lives in
//! one exhaustive match, so the store and views stay kind-agnostic and a
//! new kind fails to compile here instead of falling through quietly.

use pulse_core::models::{EventPayload, TimelineEvent};
use pulse_core::FeedStore;

pub fn render_event(event: &TimelineEvent) -> String {
    let time = event.timestamp.format("%Y-%m-%d %H:%M");
    let mut line = format!("{}  [{:<13}] {}", time, event.kind().label(), event.title);
    let detail = detail(event);
    if !detail.is_empty() {
        line.push_str(&format!("  ({detail})"));
    }
    if let Some(description) = &event.description {
        let snippet: String = description.chars().take(80).collect();
        line.push_str(&format!("\n    {}", snippet.replace('\n', " ")));
    }
    line
}

fn detail(event: &TimelineEvent) -> String {
    match &event.payload {
        EventPayload::Message { direction, channel } => match channel {
            Some(channel) => format!("{:?} via {channel}", direction).to_lowercase(),
            None => format!("{:?}", direction).to_lowercase(),
        },
        EventPayload::Roi { impact, category } => join_opt(&[impact, category]),
        EventPayload::Risk { level, category } => {
            let level = level.map(|l| format!("{:?}", l).to_lowercase());
            join_opt(&[&level, category])
        }
        EventPayload::Recommendation { category } => join_opt(&[category]),
        EventPayload::Session { recurring } => {
            if *recurring {
                "recurring".to_string()
            } else {
                String::new()
            }
        }
        EventPayload::Comment(meta) => format!("by {}", meta.author_name),
        EventPayload::FieldChange {
            field,
            old_value,
            new_value,
        } => format!(
            "{field}: {} -> {}",
            old_value.as_deref().unwrap_or("-"),
            new_value.as_deref().unwrap_or("-")
        ),
        EventPayload::LifeEvent { category } => join_opt(&[category]),
        EventPayload::Financial { status, amount } => {
            let amount = amount.map(|a| format!("{a:.2}"));
            join_opt(&[status, &amount])
        }
        EventPayload::Followup {
            assignee,
            completed,
        } => {
            let status = Some(if *completed { "done" } else { "open" }.to_string());
            join_opt(&[assignee, &status])
        }
        EventPayload::FormResponse { form, answers } => {
            let count = Some(format!("{} answers", answers.len()));
            join_opt(&[form, &count])
        }
        EventPayload::Other => String::new(),
    }
}

fn join_opt(parts: &[&Option<String>]) -> String {
    parts
        .iter()
        .filter_map(|p| p.as_deref())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render_feed(store: &FeedStore) -> String {
    let visible = store.visible();
    if visible.is_empty() {
        return "(empty feed)".to_string();
    }
    let total = visible.len();
    let mut out: Vec<String> = visible.iter().map(|e| render_event(e)).collect();
    if store.window_limit().is_some() {
        let hidden = store
            .events()
            .iter()
            .filter(|e| store.filters().allows(e.kind()))
            .count()
            .saturating_sub(total);
        if hidden > 0 {
            out.push(format!("... {hidden} older entries (use --all to reveal)"));
        }
    }
    out.join("\n")
}

pub fn render_conversation(store: &FeedStore) -> String {
    let groups = store.day_groups();
    if groups.is_empty() {
        return "(empty feed)".to_string();
    }
    let mut out = Vec::new();
    for group in groups {
        out.push(format!("== {} ==", group.date));
        for event in group.events {
            out.push(render_event(event));
        }
    }
    out.join("\n")
}
