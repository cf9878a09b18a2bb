use colored::Colorize;
use steam_storage::commands::{
    CmdMessage, CompatEntry, MessageLevel, OptimiseReport, OutcomeKind,
};
use steam_storage::model::{bytes_to_gb, signed_bytes_to_gb, TitleSummary, VolumeUsage};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const NAME_WIDTH: usize = 44;
const ID_WIDTH: usize = 10;
const UNKNOWN: &str = "?";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_listing(volumes: &[VolumeUsage], titles: &[TitleSummary]) {
    for (i, volume) in volumes.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!(
            "{} {} {}",
            volume.id.bold(),
            volume.path.display().to_string().dimmed(),
            format!("({:.2} GB free)", bytes_to_gb(volume.free_bytes)).cyan()
        );
        for title in titles.iter().filter(|t| t.volume == volume.id) {
            println!("{}", format_title_row(title));
        }
    }
}

fn format_title_row(title: &TitleSummary) -> String {
    let id = title.app_id.as_deref().unwrap_or(UNKNOWN);
    let name = truncate_to_width(title.name.as_deref().unwrap_or(UNKNOWN), NAME_WIDTH);
    let padding = NAME_WIDTH.saturating_sub(name.width());
    let mut row = format!(
        "  {:>id_w$}  {}{}  {:>10}",
        id,
        name,
        " ".repeat(padding),
        format_size(title.size_bytes),
        id_w = ID_WIDTH
    );
    if let Some(other) = &title.split_from {
        row.push_str(&format!("  {}", format!("[split: files on {other}]").red()));
    }
    row
}

pub(super) fn print_optimise_header(report: &OptimiseReport) {
    let mode = if report.dry_run { " (dry run)" } else { "" };
    println!(
        "{}{}",
        format!(
            "Optimising {} -> {}: {:.2} GB budget ({:.2} GB free, {:.2} GB reserve)",
            report.source,
            report.destination,
            signed_bytes_to_gb(report.initial_budget),
            bytes_to_gb(report.free_bytes),
            bytes_to_gb(report.reserve_bytes)
        )
        .bold(),
        mode
    );
}

/// Candidates that were looked at and left where they are.
pub(super) fn print_optimise_skipped(report: &OptimiseReport) {
    for outcome in &report.outcomes {
        if outcome.kind == OutcomeKind::DoesNotFit {
            println!(
                "{}",
                format!(
                    "  does not fit: {} ({})",
                    outcome.title,
                    format_size(outcome.size_bytes)
                )
                .dimmed()
            );
        }
    }
}

pub(super) fn print_compat(entries: &[CompatEntry]) {
    let mut last_library: Option<&str> = None;
    for entry in entries {
        if last_library != Some(entry.library.as_str()) {
            println!("{}", entry.library.bold());
            last_library = Some(entry.library.as_str());
        }
        let state = if entry.installed {
            "installed".green()
        } else {
            "orphaned".yellow()
        };
        println!("  {:>id_w$}  {}", entry.app_id, state, id_w = ID_WIDTH);
    }
}

fn format_size(bytes: Option<u64>) -> String {
    match bytes {
        Some(b) => format!("{:.2} GB", bytes_to_gb(b)),
        None => UNKNOWN.to_string(),
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }
    result
}
