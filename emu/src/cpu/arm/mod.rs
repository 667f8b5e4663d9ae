//! # ARM Instruction Set (32-bit)
//!
//! Full-featured instruction set with conditional execution on every instruction.
//!
//! ## Format
//!
//! ```text
//! 31-28   27-25   24-0
//! [Cond] [Format] [Instruction-specific]
//! ```
//!
//! - **Condition (bits 28-31)**: See [`condition`](super::condition)
//! - **Format (bits 25-27)**: Determines instruction category
//!
//! ## Instruction Categories
//!
//! | Bits 27-25 | Category              | Examples                    |
//! |------------|-----------------------|-----------------------------|
//! | 00x        | Data Processing       | AND, ADD, CMP, MOV          |
//! | 000        | Multiply/Swap/BX      | MUL, SWP, BX                |
//! | 01x        | Single Data Transfer  | LDR, STR                    |
//! | 100        | Block Data Transfer   | LDM, STM                    |
//! | 101        | Branch                | B, BL                       |
//! | 110, 1110  | Coprocessor           | LDC, CDP, MRC (ignored)     |
//! | 1111       | Software Interrupt    | SWI                         |
//!
//! ## Submodules
//!
//! - [`dispatch`] - 4096-entry handler table keyed on bits 27-20 and 7-4
//! - [`operations`] - Execution
//! - [`alu_instruction`] - Data processing operation codes

use std::fmt::Display;

use tracing::trace;

use crate::bitwise::Bits;
use crate::cpu::condition::Condition;
use crate::cpu::fault::CpuFault;
use crate::cpu::pipeline::PipelineEntry;
use crate::cpu::processor::Processor;

#[allow(clippy::cast_possible_truncation)]
pub mod alu_instruction;

pub mod dispatch;

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::similar_names)]
pub mod operations;

/// An ARM opcode with the address it was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmOpcode {
    pub raw: u32,
    pub address: u32,
}

impl std::ops::Deref for ArmOpcode {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

impl ArmOpcode {
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn condition(self) -> Condition {
        Condition::from(self.raw.get_bits(28..=31) as u8)
    }

    /// Bits 27-20 followed by bits 7-4.
    #[must_use]
    pub const fn dispatch_key(self) -> usize {
        (((self.raw >> 16) & 0xFF0) | ((self.raw >> 4) & 0xF)) as usize
    }

    #[must_use]
    pub fn rn(self) -> usize {
        self.raw.get_bits(16..=19) as usize
    }

    #[must_use]
    pub fn rd(self) -> usize {
        self.raw.get_bits(12..=15) as usize
    }

    #[must_use]
    pub fn rs(self) -> usize {
        self.raw.get_bits(8..=11) as usize
    }

    #[must_use]
    pub fn rm(self) -> usize {
        self.raw.get_bits(0..=3) as usize
    }
}

impl Display for ArmOpcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#010x}: {:08x}", self.address, self.raw)
    }
}

/// Runs the first cycle of the ARM instruction in `entry`.
pub(crate) fn execute(processor: &mut Processor, entry: PipelineEntry) -> Result<(), CpuFault> {
    let opcode = ArmOpcode {
        raw: entry.opcode,
        address: entry.address,
    };

    let condition = opcode.condition();
    if !processor.cpsr.can_execute(condition) {
        trace!("{opcode} skipped, condition {condition:?} failed");
        return Ok(());
    }

    trace!("{opcode}");
    dispatch::ARM_HANDLERS[opcode.dispatch_key()](processor, opcode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fields() {
        // LDR R2, [R0, R1]
        let opcode = ArmOpcode {
            raw: 0xE790_2001,
            address: 0x0300_0000,
        };
        assert_eq!(opcode.condition(), Condition::AL);
        assert_eq!(opcode.rn(), 0);
        assert_eq!(opcode.rd(), 2);
        assert_eq!(opcode.rm(), 1);
        assert_eq!(opcode.dispatch_key(), 0x790);
        assert_eq!(*opcode, 0xE790_2001);
    }

    #[test]
    fn dispatch_key_of_multiply() {
        // MUL R0, R1, R2
        let opcode = ArmOpcode {
            raw: 0xE000_0291,
            address: 0,
        };
        assert_eq!(opcode.dispatch_key(), 0x009);
    }
}
