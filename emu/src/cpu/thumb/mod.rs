//! # THUMB Instruction Set (16-bit)
//!
//! Compressed encodings of a subset of the ARM instructions. Only branches
//! are conditional and nearly everything sets the flags.
//!
//! | Bits 15-8   | Format | Category                          |
//! |-------------|--------|-----------------------------------|
//! | 0x00-0x17   | 1      | Move shifted register             |
//! | 0x18-0x1F   | 2      | Add/subtract                      |
//! | 0x20-0x3F   | 3      | Move/compare/add/subtract imm8    |
//! | 0x40-0x43   | 4      | ALU operations                    |
//! | 0x44-0x47   | 5      | Hi register operations, BX        |
//! | 0x48-0x4F   | 6      | PC-relative load                  |
//! | 0x50-0x5F   | 7, 8   | Load/store register offset        |
//! | 0x60-0x7F   | 9      | Load/store immediate offset       |
//! | 0x80-0x8F   | 10     | Load/store half-word              |
//! | 0x90-0x9F   | 11     | SP-relative load/store            |
//! | 0xA0-0xAF   | 12     | Load address                      |
//! | 0xB0        | 13     | Add offset to SP                  |
//! | 0xB4-0xBD   | 14     | PUSH/POP                          |
//! | 0xC0-0xCF   | 15     | Multiple load/store               |
//! | 0xD0-0xDD   | 16     | Conditional branch                |
//! | 0xDF        | 17     | Software interrupt                |
//! | 0xE0-0xE7   | 18     | Unconditional branch              |
//! | 0xF0-0xFF   | 19     | Long branch with link             |

use std::fmt::Display;

use tracing::trace;

use crate::bitwise::Bits;
use crate::cpu::fault::CpuFault;
use crate::cpu::pipeline::PipelineEntry;
use crate::cpu::processor::Processor;

pub mod alu_instructions;

pub mod dispatch;

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::cast_lossless)]
pub mod operations;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ThumbOpcode {
    pub raw: u16,
    pub address: u32,
}

impl std::ops::Deref for ThumbOpcode {
    type Target = u16;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

impl ThumbOpcode {
    /// Register number in `bits`, for the 3-bit and 4-bit fields.
    #[must_use]
    pub fn register(self, bits: std::ops::RangeInclusive<u8>) -> usize {
        usize::from(self.raw.get_bits(bits))
    }

    /// Unsigned immediate in `bits`.
    #[must_use]
    pub fn immediate(self, bits: std::ops::RangeInclusive<u8>) -> u32 {
        u32::from(self.raw.get_bits(bits))
    }
}

impl Display for ThumbOpcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#010x}: {:04x}", self.address, self.raw)
    }
}

/// Runs the first cycle of the THUMB instruction in `entry`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn execute(processor: &mut Processor, entry: PipelineEntry) -> Result<(), CpuFault> {
    let opcode = ThumbOpcode {
        raw: entry.opcode as u16,
        address: entry.address,
    };

    trace!("{opcode}");
    dispatch::THUMB_HANDLERS[usize::from(opcode.raw >> 8)](processor, opcode)
}
