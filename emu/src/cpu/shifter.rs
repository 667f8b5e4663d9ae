//! # Barrel shifter
//!
//! ```text
//! ┌──────┬───────────┬──────────────────────────┬───────────────────────────┐
//! │ Kind │ Amount    │ Result                   │ Carry out                 │
//! ├──────┼───────────┼──────────────────────────┼───────────────────────────┤
//! │ LSL  │ 0         │ value                    │ carry in                  │
//! │      │ 1..=31    │ value << n               │ bit 32-n                  │
//! │      │ 32        │ 0                        │ bit 0                     │
//! │      │ 33..      │ 0                        │ 0                         │
//! │ LSR  │ 0, 32     │ 0                        │ bit 31                    │
//! │      │ 1..=31    │ value >> n               │ bit n-1                   │
//! │      │ 33..      │ 0                        │ 0                         │
//! │ ASR  │ 0, 32..   │ bit 31 everywhere        │ bit 31                    │
//! │      │ 1..=31    │ value >> n (signed)      │ bit n-1                   │
//! │ ROR  │ 0 (RRX)   │ carry in:value >> 1      │ bit 0                     │
//! │      │ n & 31 =0 │ value                    │ bit 31                    │
//! │      │ otherwise │ value rotated by n & 31  │ bit (n & 31) - 1          │
//! └──────┴───────────┴──────────────────────────┴───────────────────────────┘
//! ```
//!
//! An amount of 0 follows the immediate-shift encoding (`LSR #0` means
//! `LSR #32`, `ROR #0` means `RRX`). Register-specified LSL, ASR and ROR by 0
//! leave the operand and the carry alone, see [`register_amount_is_noop`];
//! register-specified LSR by 0 still means LSR by 32.

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::psr::Psr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftKind {
    Lsl,
    Lsr,
    Asr,
    Ror,
}

impl From<u32> for ShiftKind {
    fn from(op_code: u32) -> Self {
        match op_code & 0b11 {
            0b00 => Self::Lsl,
            0b01 => Self::Lsr,
            0b10 => Self::Asr,
            _ => Self::Ror,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftResult {
    pub result: u32,
    pub carry: bool,
}

#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn barrel_shift(kind: ShiftKind, amount: u32, value: u32, carry_in: bool) -> ShiftResult {
    let (result, carry) = match kind {
        ShiftKind::Lsl => match amount {
            0 => (value, carry_in),
            1..=31 => (value << amount, value.get_bit((32 - amount) as u8)),
            32 => (0, value.get_bit(0)),
            _ => (0, false),
        },
        ShiftKind::Lsr => match amount {
            0 | 32 => (0, value.get_bit(31)),
            1..=31 => (value >> amount, value.get_bit((amount - 1) as u8)),
            _ => (0, false),
        },
        ShiftKind::Asr => match amount {
            1..=31 => (
                ((value as i32) >> amount) as u32,
                value.get_bit((amount - 1) as u8),
            ),
            _ => (((value as i32) >> 31) as u32, value.get_bit(31)),
        },
        ShiftKind::Ror => match (amount, amount & 0b1_1111) {
            (0, _) => ((u32::from(carry_in) << 31) | (value >> 1), value.get_bit(0)),
            (_, 0) => (value, value.get_bit(31)),
            (_, rotation) => (
                value.rotate_right(rotation),
                value.get_bit((rotation - 1) as u8),
            ),
        },
    };

    ShiftResult { result, carry }
}

/// Whether a register-specified shift by `amount` passes the operand through
/// with the carry untouched.
#[must_use]
pub const fn register_amount_is_noop(kind: ShiftKind, amount: u32) -> bool {
    amount == 0 && !matches!(kind, ShiftKind::Lsr)
}

/// Shifts `value` and stores the carry out in `flags`.
pub fn shift(kind: ShiftKind, amount: u32, value: u32, flags: &mut Psr) -> u32 {
    let shifted = barrel_shift(kind, amount, value, flags.carry_flag());
    flags.set_carry_flag(shifted.carry);
    shifted.result
}

/// Shifts `value` without touching the flags. RRX still reads the carry.
#[must_use]
pub fn shift_preserving(kind: ShiftKind, amount: u32, value: u32, flags: Psr) -> u32 {
    barrel_shift(kind, amount, value, flags.carry_flag()).result
}
