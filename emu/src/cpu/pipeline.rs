//! # Three-stage pipeline
//!
//! ```text
//!            fetch ─▶ ┌─────────┐ ─▶ ┌─────────┐ ─▶ ┌───────────┐
//!                     │ fetched │    │ decoded │    │ executing │ ─▶ dispatcher
//!                     └─────────┘    └─────────┘    └───────────┘
//! ```
//!
//! Every realised opcode fetch shifts the slots by one. A flush empties all
//! of them, so the two following fetches refill the pipe before anything
//! executes again. The dispatcher takes the executing slot when it starts
//! the instruction.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineEntry {
    pub opcode: u32,
    pub address: u32,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    fetched: Option<PipelineEntry>,
    decoded: Option<PipelineEntry>,
    executing: Option<PipelineEntry>,
}

impl Pipeline {
    #[must_use]
    pub const fn fetched(&self) -> Option<PipelineEntry> {
        self.fetched
    }

    #[must_use]
    pub const fn decoded(&self) -> Option<PipelineEntry> {
        self.decoded
    }

    #[must_use]
    pub const fn executing(&self) -> Option<PipelineEntry> {
        self.executing
    }

    pub(crate) fn advance(&mut self, entry: PipelineEntry) {
        self.executing = self.decoded.take();
        self.decoded = self.fetched.replace(entry);
    }

    pub(crate) fn take_executing(&mut self) -> Option<PipelineEntry> {
        self.executing.take()
    }

    pub(crate) fn flush(&mut self) {
        *self = Self::default();
    }
}
