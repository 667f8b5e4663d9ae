//! MUL, MLA and the long multiplies.
//!
//! The result is computed up front and committed on the last internal
//! cycle. The multiplier array needs one internal cycle per significant
//! byte of the multiplier (`m`), plus one to accumulate and one for the
//! high word of a long result.

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::processor::Processor;
use crate::cpu::registers::REG_PROGRAM_COUNTER;
use crate::cpu::sequencer::Sequencer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiplyKind {
    Mul,
    Mla,
    Umull,
    Umlal,
    Smull,
    Smlal,
}

impl MultiplyKind {
    #[must_use]
    pub const fn is_long(self) -> bool {
        matches!(self, Self::Umull | Self::Umlal | Self::Smull | Self::Smlal)
    }

    #[must_use]
    pub const fn accumulates(self) -> bool {
        matches!(self, Self::Mla | Self::Umlal | Self::Smlal)
    }

    /// Unsigned long multiplies stop early only on leading zero bytes.
    #[must_use]
    pub const fn is_unsigned(self) -> bool {
        matches!(self, Self::Umull | Self::Umlal)
    }

    #[allow(clippy::cast_lossless)]
    #[must_use]
    pub const fn internal_cycles(self, multiplier: u32) -> u8 {
        let m = multiplier_cycles(multiplier, !self.is_unsigned());
        m + self.accumulates() as u8 + self.is_long() as u8
    }

    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_possible_wrap)]
    #[allow(clippy::cast_sign_loss)]
    #[allow(clippy::cast_lossless)]
    #[must_use]
    pub const fn compute(self, operands: MultiplyOperands) -> u64 {
        let MultiplyOperands {
            multiplicand,
            multiplier,
            accumulate,
        } = operands;

        match self {
            Self::Mul => multiplicand.wrapping_mul(multiplier) as u64,
            Self::Mla => multiplicand
                .wrapping_mul(multiplier)
                .wrapping_add(accumulate as u32) as u64,
            Self::Umull => multiplicand as u64 * multiplier as u64,
            Self::Umlal => (multiplicand as u64 * multiplier as u64).wrapping_add(accumulate),
            Self::Smull => {
                (multiplicand as i32 as i64).wrapping_mul(multiplier as i32 as i64) as u64
            }
            Self::Smlal => ((multiplicand as i32 as i64).wrapping_mul(multiplier as i32 as i64)
                as u64)
                .wrapping_add(accumulate),
        }
    }
}

/// `m` in the ARM7TDMI timings: 1 to 4 depending on how many of the top
/// bytes of the multiplier are all zeros (or all ones when `signed`).
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub const fn multiplier_cycles(multiplier: u32, signed: bool) -> u8 {
    let masks = [0xFFFF_FF00, 0xFFFF_0000, 0xFF00_0000];
    let mut index = 0;
    while index < masks.len() {
        let top = multiplier & masks[index];
        if top == 0 || (signed && top == masks[index]) {
            return index as u8 + 1;
        }
        index += 1;
    }
    4
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MultiplyOperands {
    /// Rm.
    pub multiplicand: u32,
    /// Rs, which also sets the timing.
    pub multiplier: u32,
    /// Rn for MLA, RdHi:RdLo for the long accumulates.
    pub accumulate: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplySequence {
    pub remaining: u8,
    pub result: u64,
    pub long: bool,
    /// Rd, or RdLo for long results.
    pub destination: usize,
    pub destination_high: usize,
    pub set_flags: bool,
}

impl Processor {
    pub(crate) fn start_multiply(
        &mut self,
        kind: MultiplyKind,
        operands: MultiplyOperands,
        destination: usize,
        destination_high: usize,
        set_flags: bool,
    ) {
        let sequence = MultiplySequence {
            remaining: kind.internal_cycles(operands.multiplier),
            result: kind.compute(operands),
            long: kind.is_long(),
            destination,
            destination_high,
            set_flags,
        };

        self.lines.request_internal(self.next_fetch_address());
        self.sequencer = Sequencer::Multiply(sequence);
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(super) fn step_multiply(&mut self, sequence: MultiplySequence) {
        if sequence.remaining > 1 {
            self.lines.request_internal(self.next_fetch_address());
            self.sequencer = Sequencer::Multiply(MultiplySequence {
                remaining: sequence.remaining - 1,
                ..sequence
            });
            return;
        }

        let low = sequence.result as u32;
        self.registers.set_register_at(sequence.destination, low);

        let (sign, zero) = if sequence.long {
            self.registers
                .set_register_at(sequence.destination_high, (sequence.result >> 32) as u32);
            (sequence.result.get_bit(63), sequence.result == 0)
        } else {
            (low.get_bit(31), low == 0)
        };

        if sequence.set_flags {
            self.cpsr.set_sign_flag(sign);
            self.cpsr.set_zero_flag(zero);
        }

        let writes_program_counter = sequence.destination == REG_PROGRAM_COUNTER
            || (sequence.long && sequence.destination_high == REG_PROGRAM_COUNTER);
        if writes_program_counter {
            self.flush_pipeline(self.registers.program_counter());
        } else {
            self.finish_instruction(true);
        }
    }
}
