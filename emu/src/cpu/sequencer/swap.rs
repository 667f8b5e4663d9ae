//! SWP and SWPB: read, write, one internal cycle, then Rd.

use serde::{Deserialize, Serialize};

use crate::cpu::processor::Processor;
use crate::cpu::registers::REG_PROGRAM_COUNTER;
use crate::cpu::sequencer::{LoadCast, Sequencer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapStage {
    Write,
    Internal,
    Commit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapSequence {
    pub stage: SwapStage,
    pub address: u32,
    pub cast: LoadCast,
    /// Rm as read on the first cycle.
    pub source: u32,
    pub destination: usize,
    /// Old memory value, valid from the write stage on.
    pub loaded: u32,
}

impl Processor {
    pub(crate) fn start_swap(
        &mut self,
        address: u32,
        cast: LoadCast,
        source: u32,
        destination: usize,
    ) {
        self.lines.request_read(address, cast.width(), false);
        self.sequencer = Sequencer::Swap(SwapSequence {
            stage: SwapStage::Write,
            address,
            cast,
            source,
            destination,
            loaded: 0,
        });
    }

    pub(super) fn step_swap(&mut self, sequence: SwapSequence) {
        match sequence.stage {
            SwapStage::Write => {
                let width = sequence.cast.width();
                let loaded = sequence.cast.apply(self.lines.data, sequence.address);
                self.lines.request_write(
                    sequence.address,
                    width,
                    width.replicate(sequence.source),
                    false,
                );
                self.sequencer = Sequencer::Swap(SwapSequence {
                    stage: SwapStage::Internal,
                    loaded,
                    ..sequence
                });
            }
            SwapStage::Internal => {
                self.lines.request_internal(self.next_fetch_address());
                self.sequencer = Sequencer::Swap(SwapSequence {
                    stage: SwapStage::Commit,
                    ..sequence
                });
            }
            SwapStage::Commit => {
                self.registers
                    .set_register_at(sequence.destination, sequence.loaded);
                if sequence.destination == REG_PROGRAM_COUNTER {
                    self.flush_pipeline(sequence.loaded);
                } else {
                    self.finish_instruction(true);
                }
            }
        }
    }
}
