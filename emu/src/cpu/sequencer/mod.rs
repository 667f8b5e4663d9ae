//! # Cycle sequencers
//!
//! An instruction that needs more than one cycle leaves a continuation in
//! [`Processor::sequencer`]. The continuation runs once per clock, after the
//! transaction it asserted has been realised, until it re-asserts the next
//! opcode fetch (or flushes the pipeline) and goes back to
//! [`Sequencer::BeginInstruction`].
//!
//! Each continuation carries the whole state it needs, so two cores never
//! share anything and a [`Processor`] can be cloned or serialized between
//! any two clocks.

mod block_transfer;
mod load_store;
mod multiply;
mod swap;

use serde::{Deserialize, Serialize};

pub use block_transfer::BlockTransferSequence;
pub use load_store::{LoadCast, LoadSequence, LoadStage, StoreSequence};
pub use multiply::{MultiplyKind, MultiplyOperands, MultiplySequence};
pub use swap::{SwapSequence, SwapStage};

use crate::cpu::fault::CpuFault;
use crate::cpu::processor::Processor;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sequencer {
    /// Between instructions: the next clock starts whatever reached the
    /// execute stage.
    #[default]
    BeginInstruction,
    Internal(InternalCycles),
    Load(LoadSequence),
    Store(StoreSequence),
    BlockTransfer(BlockTransferSequence),
    Swap(SwapSequence),
    Multiply(MultiplySequence),
}

/// Idle cycles with no memory request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalCycles {
    /// Internal cycles left, this one included.
    pub remaining: u8,
    /// Where to refill the pipeline once done, `None` to keep fetching.
    pub branch_target: Option<u32>,
}

impl Processor {
    pub(crate) fn step_sequencer(&mut self) -> Result<(), CpuFault> {
        match self.sequencer {
            Sequencer::BeginInstruction => return self.begin_instruction(),
            Sequencer::Internal(cycles) => self.step_internal(cycles),
            Sequencer::Load(sequence) => self.step_load(sequence),
            Sequencer::Store(sequence) => self.step_store(sequence),
            Sequencer::BlockTransfer(sequence) => self.step_block_transfer(sequence),
            Sequencer::Swap(sequence) => self.step_swap(sequence),
            Sequencer::Multiply(sequence) => self.step_multiply(sequence),
        }

        Ok(())
    }

    fn step_internal(&mut self, cycles: InternalCycles) {
        if cycles.remaining > 1 {
            self.request_internal_cycles(cycles.remaining - 1, cycles.branch_target);
            return;
        }

        match cycles.branch_target {
            Some(target) => self.flush_pipeline(target),
            None => self.finish_instruction(true),
        }
    }
}
