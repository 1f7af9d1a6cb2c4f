//! Plain-text rendering of slides, selections and poller progress.

use std::fmt::Write as _;

use wrapped_core::{
    ActivityData, EmojisData, OverviewData, Phase, PollerView, RankingData, RoastsData,
    Selection, SlideKind, SlideRecord, SummaryData, VirtualSlide, WordsData,
};
use wrapped_engine::ProgressSink;

use super::flow::Deck;

const LIST_LIMIT: usize = 5;

/// The current slide followed by a position footer.
pub(crate) fn render_deck(deck: &Deck) -> String {
    let Some(slide) = deck.current() else {
        return "Nothing to show.\n".to_string();
    };
    let mut out = render_slide(slide);
    let _ = writeln!(
        out,
        "\n[{}/{}]{}",
        deck.cursor.index() + 1,
        deck.cursor.len(),
        if deck.cursor.is_last() {
            "  (end)"
        } else {
            "  `wrapped next` to continue"
        }
    );
    out
}

/// Every slide of the deck, separated by rules.
pub(crate) fn render_all(deck: &Deck) -> String {
    deck.slides
        .iter()
        .map(render_slide)
        .collect::<Vec<_>>()
        .join("\n----\n\n")
}

pub(crate) fn render_slide(slide: &VirtualSlide) -> String {
    let mut out = String::new();
    match slide {
        VirtualSlide::Intro => {
            out.push_str("WhatsApp Wrapped\n");
            out.push_str("Let's see what your group has been up to.\n");
        }
        VirtualSlide::Outro => {
            out.push_str("That's a wrap!\n");
            out.push_str("Same time next year.\n");
        }
        VirtualSlide::Regular(record) => render_record(&mut out, record),
        VirtualSlide::BrainRot(record) => {
            let roasts: RoastsData = record.view();
            let _ = writeln!(out, "Brain rot score: {}/100", roasts.brainrot_score);
            if !roasts.group_roast.is_empty() {
                let _ = writeln!(out, "\n{}", roasts.group_roast);
            }
        }
        VirtualSlide::IndividualRoasts { entries, page } => {
            let _ = writeln!(out, "Roasts, part {}", page + 1);
            for entry in entries {
                let _ = writeln!(out, "\n{}\n  {}", entry.name, entry.roast);
            }
        }
        VirtualSlide::SignatureWords {
            entries,
            page,
            total_pages,
        } => {
            let _ = writeln!(out, "Signature words ({}/{})", page + 1, total_pages);
            for entry in entries {
                let _ = writeln!(out, "  {}: {}", entry.name, entry.words.join(", "));
            }
        }
        VirtualSlide::Summary(summary) => render_summary(&mut out, summary),
    }
    out
}

fn render_record(out: &mut String, record: &SlideRecord) {
    if !record.title.is_empty() {
        let _ = writeln!(out, "{}\n", record.title);
    }
    match record.kind() {
        SlideKind::Overview => {
            let data: OverviewData = record.view();
            let _ = writeln!(out, "{} messages", format_with_commas(data.total_messages));
            let _ = writeln!(
                out,
                "{} active days, longest streak {} days",
                data.streak.total_active_days, data.streak.longest_streak
            );
            let media = data.total_images + data.total_videos + data.total_gifs + data.total_stickers;
            if media > 0 {
                let _ = writeln!(out, "{} photos, videos, gifs and stickers", format_with_commas(media));
            }
        }
        SlideKind::Ranking => {
            let data: RankingData = record.view();
            for (place, entry) in data.rankings.iter().take(LIST_LIMIT).enumerate() {
                let _ = writeln!(
                    out,
                    "{}. {} ({})",
                    place + 1,
                    entry.name,
                    format_with_commas(entry.count)
                );
            }
        }
        SlideKind::Emojis => {
            let data: EmojisData = record.view();
            let line = data
                .group_top_emojis
                .iter()
                .take(LIST_LIMIT)
                .map(|(emoji, count)| format!("{emoji} x{count}"))
                .collect::<Vec<_>>()
                .join("   ");
            let _ = writeln!(out, "{line}");
        }
        SlideKind::Activity => {
            let data: ActivityData = record.view();
            if let Some(day) = data.busiest_day {
                let _ = writeln!(out, "Busiest day: {} ({} messages)", day.date, day.count);
            }
            match (data.peak_hour_formatted, data.peak_hour) {
                (Some(formatted), _) => {
                    let _ = writeln!(out, "Peak hour: {formatted}");
                }
                (None, Some(hour)) => {
                    let _ = writeln!(out, "Peak hour: {hour:02}:00");
                }
                (None, None) => {}
            }
        }
        SlideKind::Words => {
            let data: WordsData = record.view();
            for (word, count) in data.top_words.iter().take(LIST_LIMIT) {
                let _ = writeln!(out, "  {word} ({count})");
            }
            if !data.topics.is_empty() {
                let _ = writeln!(out, "Topics: {}", data.topics.join(", "));
            }
        }
        _ => render_fields(out, record),
    }
}

/// Fallback for kinds without a dedicated layout: top-level scalar fields.
fn render_fields(out: &mut String, record: &SlideRecord) {
    for (key, value) in &record.data {
        let text = match value {
            serde_json::Value::String(text) => text.clone(),
            serde_json::Value::Number(number) => number.to_string(),
            serde_json::Value::Bool(flag) => flag.to_string(),
            _ => continue,
        };
        let _ = writeln!(out, "  {}: {}", key.replace('_', " "), text);
    }
}

fn render_summary(out: &mut String, summary: &SummaryData) {
    let _ = writeln!(out, "{} in review\n", summary.group_name);
    let _ = writeln!(out, "Messages: {}", format_with_commas(summary.total_messages));
    let _ = writeln!(
        out,
        "Active days: {}  Longest streak: {}",
        summary.active_days, summary.longest_streak
    );
    if let Some(top) = &summary.top_chatter {
        let _ = writeln!(out, "Top chatter: {} ({})", top.name, format_with_commas(top.count));
    }
    let _ = writeln!(out, "Peak hour: {:02}:00", summary.peak_hour);
    if let Some(day) = &summary.busiest_day {
        let _ = writeln!(out, "Busiest day: {}", day.date);
    }
    if !summary.top_emoji.is_empty() {
        let _ = writeln!(out, "Top emoji: {}", summary.top_emoji);
    }
    if !summary.top_words.is_empty() {
        let _ = writeln!(out, "Top words: {}", summary.top_words.join(", "));
    }
    let _ = writeln!(out, "Brain rot: {}/100", summary.brain_rot_score);
}

pub(crate) fn render_selection(selection: &Selection) -> String {
    let mut out = String::new();
    for participant in selection.participants() {
        let mark = if participant.selected { "x" } else { " " };
        let _ = writeln!(out, "[{mark}] {}", participant.name);
    }
    let _ = writeln!(
        out,
        "{} of {} selected",
        selection.selected_count(),
        selection.len()
    );
    out
}

pub(crate) fn render_progress(view: &PollerView) -> String {
    match view.phase {
        Phase::Idle => "Waiting to start".to_string(),
        Phase::Starting => "Starting analysis...".to_string(),
        Phase::Polling => match &view.current_step {
            Some(step) => format!("{:>3}% {}", view.progress, step),
            None => format!("{:>3}% Analyzing...", view.progress),
        },
        Phase::Completed => "100% Done".to_string(),
        Phase::Failed => match &view.error {
            Some(err) => format!("Stopped: {}", err.user_message()),
            None => "Stopped".to_string(),
        },
    }
}

/// Prints each progress change to stderr.
pub(crate) struct TerminalSink;

impl ProgressSink for TerminalSink {
    fn emit(&self, view: &PollerView) {
        eprintln!("{}", render_progress(view));
    }
}

fn format_with_commas(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
