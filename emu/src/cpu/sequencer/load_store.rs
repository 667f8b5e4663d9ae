//! Single loads (LDR, LDRB, LDRH, LDRSB, LDRSH) and stores.
//!
//! ```text
//! LDR   cycle 1  address on the bus, read requested        (S fetch realised)
//!       cycle 2  read realised, base written back          (N)
//!       cycle 3  internal, destination written             (I)
//! STR   cycle 1  address and replicated value on the bus   (S fetch realised)
//!       cycle 2  write realised, base written back         (N)
//! ```

use serde::{Deserialize, Serialize};

use crate::bus::TransferWidth;
use crate::cpu::processor::Processor;
use crate::cpu::registers::REG_PROGRAM_COUNTER;
use crate::cpu::sequencer::Sequencer;

/// How a loaded bus value becomes a register value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadCast {
    Word,
    UnsignedByte,
    UnsignedHalfWord,
    SignedByte,
    SignedHalfWord,
}

impl LoadCast {
    #[must_use]
    pub const fn width(self) -> TransferWidth {
        match self {
            Self::Word => TransferWidth::Word,
            Self::UnsignedByte | Self::SignedByte => TransferWidth::Byte,
            Self::UnsignedHalfWord | Self::SignedHalfWord => TransferWidth::HalfWord,
        }
    }

    /// `raw` is the value the bus returned for `address`. Misaligned words
    /// and half-words come back rotated; a signed half-word at an odd
    /// address degrades to a signed byte.
    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_possible_wrap)]
    #[allow(clippy::cast_sign_loss)]
    #[must_use]
    pub const fn apply(self, raw: u32, address: u32) -> u32 {
        match self {
            Self::Word => raw.rotate_right((address & 0b11) * 8),
            Self::UnsignedByte => raw & 0xFF,
            Self::UnsignedHalfWord => (raw & 0xFFFF).rotate_right((address & 0b1) * 8),
            Self::SignedByte => raw as u8 as i8 as i32 as u32,
            Self::SignedHalfWord => {
                if address & 0b1 == 1 {
                    (raw >> 8) as u8 as i8 as i32 as u32
                } else {
                    raw as u16 as i16 as i32 as u32
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadStage {
    Writeback,
    Commit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSequence {
    pub stage: LoadStage,
    pub address: u32,
    pub cast: LoadCast,
    pub destination: usize,
    /// Base register and its new value.
    pub writeback: Option<(usize, u32)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSequence {
    /// Base register and its new value.
    pub writeback: Option<(usize, u32)>,
}

const fn writes_program_counter(writeback: Option<(usize, u32)>) -> bool {
    matches!(writeback, Some((REG_PROGRAM_COUNTER, _)))
}

impl Processor {
    pub(crate) fn start_load(
        &mut self,
        address: u32,
        cast: LoadCast,
        destination: usize,
        writeback: Option<(usize, u32)>,
    ) {
        self.lines.request_read(address, cast.width(), false);
        self.sequencer = Sequencer::Load(LoadSequence {
            stage: LoadStage::Writeback,
            address,
            cast,
            destination,
            writeback,
        });
    }

    /// `value` is the register value; narrow widths are replicated here.
    pub(crate) fn start_store(
        &mut self,
        address: u32,
        width: TransferWidth,
        value: u32,
        writeback: Option<(usize, u32)>,
    ) {
        self.lines
            .request_write(address, width, width.replicate(value), false);
        self.sequencer = Sequencer::Store(StoreSequence { writeback });
    }

    pub(super) fn step_load(&mut self, sequence: LoadSequence) {
        match sequence.stage {
            LoadStage::Writeback => {
                if let Some((base, value)) = sequence.writeback {
                    self.registers.set_register_at(base, value);
                }
                self.lines.request_internal(self.next_fetch_address());
                self.sequencer = Sequencer::Load(LoadSequence {
                    stage: LoadStage::Commit,
                    ..sequence
                });
            }
            LoadStage::Commit => {
                let value = sequence.cast.apply(self.lines.data, sequence.address);
                self.registers
                    .set_register_at(sequence.destination, value);

                if sequence.destination == REG_PROGRAM_COUNTER
                    || writes_program_counter(sequence.writeback)
                {
                    self.flush_pipeline(self.registers.program_counter());
                } else {
                    self.finish_instruction(true);
                }
            }
        }
    }

    pub(super) fn step_store(&mut self, sequence: StoreSequence) {
        if let Some((base, value)) = sequence.writeback {
            self.registers.set_register_at(base, value);
        }

        if writes_program_counter(sequence.writeback) {
            self.flush_pipeline(self.registers.program_counter());
        } else {
            self.finish_instruction(false);
        }
    }
}
