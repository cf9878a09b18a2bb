use crate::model::{TitleSummary, VolumeUsage};
use serde::Serialize;

pub mod compat;
pub mod delete;
pub mod list;
pub mod optimise;
pub mod relocate;

pub use compat::CompatEntry;
pub use optimise::{OptimiseReport, Outcome, OutcomeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct CmdResult {
    pub volumes: Vec<VolumeUsage>,
    pub titles: Vec<TitleSummary>,
    pub optimise: Option<OptimiseReport>,
    pub compat: Vec<CompatEntry>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_volumes(mut self, volumes: Vec<VolumeUsage>) -> Self {
        self.volumes = volumes;
        self
    }

    pub fn with_titles(mut self, titles: Vec<TitleSummary>) -> Self {
        self.titles = titles;
        self
    }

    pub fn with_optimise(mut self, report: OptimiseReport) -> Self {
        self.optimise = Some(report);
        self
    }

    pub fn with_compat(mut self, entries: Vec<CompatEntry>) -> Self {
        self.compat = entries;
        self
    }
}
