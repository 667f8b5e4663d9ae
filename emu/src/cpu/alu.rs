//! # ALU
//!
//! Flag-computing arithmetic and logic shared by the ARM and THUMB handlers.
//! Every operation takes its operands and the flags register; it returns the
//! result and touches nothing else.
//!
//! - Additions set C on a carry out of bit 31 and V when both operands share
//!   a sign the result does not have.
//! - Subtractions set C when no borrow happens (`op1 >= op2`, with SBC
//!   borrowing an extra one when C is clear) and V when the operands differ
//!   in sign and the result's sign differs from `op1`.
//! - Logic operations only set N and Z; C comes from the shifter.

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::psr::Psr;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArithmeticOpResult {
    pub result: u32,
    pub carry: bool,
    pub overflow: bool,
    pub sign: bool,
    pub zero: bool,
}

fn add_with_carry(op1: u32, op2: u32, carry_in: bool) -> ArithmeticOpResult {
    // 33 bits wide so bit 32 is the carry.
    let wide = u64::from(op1) + u64::from(op2) + u64::from(carry_in);
    #[allow(clippy::cast_possible_truncation)]
    let result = wide as u32;

    ArithmeticOpResult {
        result,
        carry: wide > u64::from(u32::MAX),
        overflow: ((op1 ^ result) & (op2 ^ result)).get_bit(31),
        sign: result.get_bit(31),
        zero: result == 0,
    }
}

fn sub_with_carry(op1: u32, op2: u32, carry_in: bool) -> ArithmeticOpResult {
    let borrow = u32::from(!carry_in);
    let result = op1.wrapping_sub(op2).wrapping_sub(borrow);

    ArithmeticOpResult {
        result,
        carry: u64::from(op1) >= u64::from(op2) + u64::from(borrow),
        overflow: ((op1 ^ op2) & (op1 ^ result)).get_bit(31),
        sign: result.get_bit(31),
        zero: result == 0,
    }
}

fn arithmetic(op_result: &ArithmeticOpResult, flags: &mut Psr) -> u32 {
    flags.set_flags(op_result);
    op_result.result
}

fn logical(result: u32, flags: &mut Psr) -> u32 {
    flags.set_sign_and_zero(result);
    result
}

pub fn add(op1: u32, op2: u32, flags: &mut Psr) -> u32 {
    arithmetic(&add_with_carry(op1, op2, false), flags)
}

pub fn adc(op1: u32, op2: u32, flags: &mut Psr) -> u32 {
    let carry = flags.carry_flag();
    arithmetic(&add_with_carry(op1, op2, carry), flags)
}

pub fn sub(op1: u32, op2: u32, flags: &mut Psr) -> u32 {
    arithmetic(&sub_with_carry(op1, op2, true), flags)
}

pub fn sbc(op1: u32, op2: u32, flags: &mut Psr) -> u32 {
    let carry = flags.carry_flag();
    arithmetic(&sub_with_carry(op1, op2, carry), flags)
}

/// `op2 - op1`
pub fn rsb(op1: u32, op2: u32, flags: &mut Psr) -> u32 {
    sub(op2, op1, flags)
}

/// `op2 - op1 - !C`
pub fn rsc(op1: u32, op2: u32, flags: &mut Psr) -> u32 {
    sbc(op2, op1, flags)
}

pub fn and(op1: u32, op2: u32, flags: &mut Psr) -> u32 {
    logical(op1 & op2, flags)
}

pub fn eor(op1: u32, op2: u32, flags: &mut Psr) -> u32 {
    logical(op1 ^ op2, flags)
}

pub fn orr(op1: u32, op2: u32, flags: &mut Psr) -> u32 {
    logical(op1 | op2, flags)
}

pub fn bic(op1: u32, op2: u32, flags: &mut Psr) -> u32 {
    logical(op1 & !op2, flags)
}

pub fn mov(op2: u32, flags: &mut Psr) -> u32 {
    logical(op2, flags)
}

pub fn mvn(op2: u32, flags: &mut Psr) -> u32 {
    logical(!op2, flags)
}
