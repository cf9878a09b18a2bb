//! # Capacity Optimiser
//!
//! Fills a destination library with games from a source library, largest first, until the
//! destination's free space minus the reserve is used up.
//!
//! This is first-fit-decreasing: every candidate is considered exactly once in
//! non-increasing size order and taken if it still fits the remaining budget. It tends to
//! move few, large games and then top up with small ones, but it is a heuristic and can
//! leave space unused that an exact bin-packing search would have filled.
//!
//! The budget is fixed when the run starts. Space freed on the destination during the run
//! is never reconsidered, and a candidate that was skipped is never retried.

use crate::commands::relocate::relocate;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{bytes_to_gb, gb_to_bytes, signed_bytes_to_gb, VolumeSet};
use crate::registry::Registry;
use crate::store::LibraryStore;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OutcomeKind {
    Moved,
    /// Dry run: would have been moved.
    Planned,
    DoesNotFit,
    /// `SizeOnDisk` missing or not a number.
    Unsizable(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub title: String,
    pub size_bytes: Option<u64>,
    /// Budget used by this title. Zero unless it was taken, and zero for a split title
    /// whose game files already sit on the destination.
    pub charged_bytes: u64,
    pub kind: OutcomeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptimiseReport {
    pub source: String,
    pub destination: String,
    pub free_bytes: u64,
    pub reserve_bytes: u64,
    pub initial_budget: i64,
    pub remaining_budget: i64,
    pub dry_run: bool,
    /// Stopped early because a move left a game split across libraries.
    pub interrupted: bool,
    pub outcomes: Vec<Outcome>,
}

impl OptimiseReport {
    /// Titles moved (or planned, for a dry run), in the order they were taken.
    pub fn taken(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.kind, OutcomeKind::Moved | OutcomeKind::Planned))
    }

    pub fn taken_bytes(&self) -> u64 {
        self.taken().map(|o| o.charged_bytes).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    index: usize,
    size: u64,
    /// What taking it costs the destination.
    charge: u64,
}

/// Largest first; the sort is stable so ties keep registry order.
fn order_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| b.size.cmp(&a.size));
}

pub fn run<S: LibraryStore>(
    store: &mut S,
    volumes: &VolumeSet,
    registry: &mut Registry,
    source: &str,
    destination: &str,
    reserve_gb: f64,
    dry_run: bool,
) -> Result<CmdResult> {
    let src = volumes.require(source)?.id.clone();
    let dst = volumes.require(destination)?;
    let free_bytes = store.free_bytes(dst)?;
    let dst = dst.id.clone();
    let reserve_bytes = gb_to_bytes(reserve_gb);
    let initial_budget = i64::try_from(free_bytes)
        .unwrap_or(i64::MAX)
        .saturating_sub(i64::try_from(reserve_bytes).unwrap_or(i64::MAX));

    let mut report = OptimiseReport {
        source: src.clone(),
        destination: dst.clone(),
        free_bytes,
        reserve_bytes,
        initial_budget,
        remaining_budget: initial_budget,
        dry_run,
        interrupted: false,
        outcomes: Vec::new(),
    };
    let mut result = CmdResult::default();

    if src == dst {
        result.add_message(CmdMessage::warning(format!(
            "Source and destination are both {src}, nothing to do"
        )));
        return Ok(result.with_optimise(report));
    }

    let mut candidates = Vec::new();
    for index in registry.on_volume(&src) {
        let Some(title) = registry.get(index) else {
            continue;
        };
        match title.size_on_disk() {
            Ok(size) => {
                let charge = if title.install_volume() == dst { 0 } else { size };
                candidates.push(Candidate {
                    index,
                    size,
                    charge,
                })
            }
            Err(e) => {
                result.add_message(CmdMessage::warning(format!(
                    "Skipping {}: {}",
                    title.label(),
                    e
                )));
                report.outcomes.push(Outcome {
                    title: title.label(),
                    size_bytes: None,
                    charged_bytes: 0,
                    kind: OutcomeKind::Unsizable(e.to_string()),
                });
            }
        }
    }
    order_candidates(&mut candidates);

    tracing::debug!(
        source = %src,
        destination = %dst,
        candidates = candidates.len(),
        budget = initial_budget,
        "optimising"
    );

    let mut budget = initial_budget;
    for candidate in candidates {
        let label = match registry.get(candidate.index) {
            Some(title) => title.label(),
            None => continue,
        };
        let charge = i64::try_from(candidate.charge).unwrap_or(i64::MAX);

        if charge > budget {
            report.outcomes.push(Outcome {
                title: label,
                size_bytes: Some(candidate.size),
                charged_bytes: 0,
                kind: OutcomeKind::DoesNotFit,
            });
            continue;
        }

        if dry_run {
            budget -= charge;
            result.add_message(CmdMessage::info(format!(
                "Would move {} ({:.2} GB)",
                label,
                bytes_to_gb(candidate.size)
            )));
            report.outcomes.push(Outcome {
                title: label,
                size_bytes: Some(candidate.size),
                charged_bytes: candidate.charge,
                kind: OutcomeKind::Planned,
            });
            continue;
        }

        match relocate(store, volumes, registry, candidate.index, &dst) {
            Ok(_) => {
                budget -= charge;
                result.add_message(CmdMessage::success(format!(
                    "Moved {} ({:.2} GB)",
                    label,
                    bytes_to_gb(candidate.size)
                )));
                report.outcomes.push(Outcome {
                    title: label,
                    size_bytes: Some(candidate.size),
                    charged_bytes: candidate.charge,
                    kind: OutcomeKind::Moved,
                });
            }
            Err(e) => {
                let partial = e.is_partial();
                result.add_message(if partial {
                    CmdMessage::error(e.to_string())
                } else {
                    CmdMessage::warning(e.to_string())
                });
                report.outcomes.push(Outcome {
                    title: label,
                    size_bytes: Some(candidate.size),
                    charged_bytes: 0,
                    kind: OutcomeKind::Failed(e.to_string()),
                });
                if partial {
                    report.interrupted = true;
                    break;
                }
            }
        }
    }
    report.remaining_budget = budget;

    let verb = if dry_run { "would move" } else { "moved" };
    let count = report.taken().count();
    let summary = format!(
        "Finished: {} {} game{} ({:.2} GB), {:.2} GB of budget left",
        verb,
        count,
        if count == 1 { "" } else { "s" },
        bytes_to_gb(report.taken_bytes()),
        signed_bytes_to_gb(budget)
    );
    if report.interrupted {
        result.add_message(CmdMessage::error(format!(
            "Stopped early after a partial move. {summary}"
        )));
    } else {
        result.add_message(CmdMessage::info(summary));
    }

    Ok(result.with_optimise(report))
}
