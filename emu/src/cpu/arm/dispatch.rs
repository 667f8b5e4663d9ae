//! Decode happens once, at compile time: every combination of bits 27-20
//! and 7-4 maps to the handler that runs the first cycle of the
//! instruction.
//!
//! ```text
//! key = bits[27:20] << 4 | bits[7:4]
//!
//! 000x xxxx 1001   MUL, MLA, UMULL..SMLAL, SWP
//! 000x xxxx 1xx1   LDRH, STRH, LDRSB, LDRSH
//! 0001 0010 0001   BX
//! 0001 0x00 0000   MRS
//! 0001 0x10 0000   MSR register
//! 000x xxxx xxx0   data processing, shift by immediate
//! 000x xxxx 0xx1   data processing, shift by register
//! 0011 0x10 xxxx   MSR immediate
//! 001x xxxx xxxx   data processing, immediate
//! 010x xxxx xxxx   LDR, STR immediate offset
//! 011x xxxx xxx0   LDR, STR register offset
//! 100x xxxx xxxx   LDM, STM
//! 101x xxxx xxxx   B, BL
//! 110x xxxx xxxx   LDC, STC
//! 1110 xxxx xxxx   CDP, MRC, MCR
//! 1111 xxxx xxxx   SWI
//! ```

use crate::cpu::arm::ArmOpcode;
use crate::cpu::arm::operations::{self, IMMEDIATE, SHIFT_BY_IMMEDIATE, SHIFT_BY_REGISTER};
use crate::cpu::fault::CpuFault;
use crate::cpu::processor::Processor;

pub type ArmHandler = fn(&mut Processor, ArmOpcode) -> Result<(), CpuFault>;

pub static ARM_HANDLERS: [ArmHandler; 4096] = {
    let mut table: [ArmHandler; 4096] = [operations::undefined; 4096];
    let mut key = 0;
    while key < table.len() {
        table[key] = ArmInstruction::decode(key).handler();
        key += 1;
    }
    table
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmInstruction {
    DataProcessingImmediate,
    DataProcessingShiftByImmediate,
    DataProcessingShiftByRegister,
    Multiply,
    MultiplyLong,
    SingleDataSwap,
    BranchAndExchange,
    Mrs,
    MsrRegister,
    MsrImmediate,
    HalfwordDataTransferRegisterOffset,
    HalfwordDataTransferImmediateOffset,
    SingleDataTransferImmediateOffset,
    SingleDataTransferRegisterOffset,
    BlockDataTransfer,
    Branch,
    BranchLink,
    Coprocessor,
    SoftwareInterrupt,
    Undefined,
}

impl ArmInstruction {
    /// `key` is [`ArmOpcode::dispatch_key`].
    #[must_use]
    pub const fn decode(key: usize) -> Self {
        let hi = key >> 4;
        let lo = key & 0xF;

        match hi & 0xE0 {
            0x00 => Self::decode_data_processing_group(hi, lo),
            0x20 => match hi {
                0x30 | 0x34 => Self::Undefined,
                0x32 | 0x36 => Self::MsrImmediate,
                _ => Self::DataProcessingImmediate,
            },
            0x40 => Self::SingleDataTransferImmediateOffset,
            0x60 => {
                if lo & 0b1 == 0 {
                    Self::SingleDataTransferRegisterOffset
                } else {
                    Self::Undefined
                }
            }
            0x80 => Self::BlockDataTransfer,
            0xA0 => {
                if hi & 0x10 == 0 {
                    Self::Branch
                } else {
                    Self::BranchLink
                }
            }
            0xC0 => Self::Coprocessor,
            _ => {
                if hi & 0x10 == 0 {
                    Self::Coprocessor
                } else {
                    Self::SoftwareInterrupt
                }
            }
        }
    }

    const fn decode_data_processing_group(hi: usize, lo: usize) -> Self {
        if lo == 0b1001 {
            return if hi & 0xFC == 0x00 {
                Self::Multiply
            } else if hi & 0xF8 == 0x08 {
                Self::MultiplyLong
            } else if hi & 0xFB == 0x10 {
                Self::SingleDataSwap
            } else {
                Self::Undefined
            };
        }

        if lo & 0b1001 == 0b1001 {
            let load = hi & 0x01 != 0;
            // Stores only exist for unsigned half-words.
            if !load && lo != 0b1011 {
                return Self::Undefined;
            }
            return if hi & 0x04 != 0 {
                Self::HalfwordDataTransferImmediateOffset
            } else {
                Self::HalfwordDataTransferRegisterOffset
            };
        }

        // TST, TEQ, CMP and CMN without S are the PSR transfers.
        if matches!(hi, 0x10 | 0x12 | 0x14 | 0x16) {
            return match (hi, lo) {
                (0x12, 0b0001) => Self::BranchAndExchange,
                (0x10 | 0x14, 0b0000) => Self::Mrs,
                (0x12 | 0x16, 0b0000) => Self::MsrRegister,
                _ => Self::Undefined,
            };
        }

        if lo & 0b1 == 0 {
            Self::DataProcessingShiftByImmediate
        } else {
            Self::DataProcessingShiftByRegister
        }
    }

    const fn handler(self) -> ArmHandler {
        match self {
            Self::DataProcessingImmediate => operations::data_processing::<IMMEDIATE>,
            Self::DataProcessingShiftByImmediate => {
                operations::data_processing::<SHIFT_BY_IMMEDIATE>
            }
            Self::DataProcessingShiftByRegister => operations::data_processing::<SHIFT_BY_REGISTER>,
            Self::Multiply => operations::multiply,
            Self::MultiplyLong => operations::multiply_long,
            Self::SingleDataSwap => operations::swap,
            Self::BranchAndExchange => operations::branch_and_exchange,
            Self::Mrs => operations::mrs,
            Self::MsrRegister => operations::msr::<false>,
            Self::MsrImmediate => operations::msr::<true>,
            Self::HalfwordDataTransferRegisterOffset => {
                operations::halfword_data_transfer::<false>
            }
            Self::HalfwordDataTransferImmediateOffset => operations::halfword_data_transfer::<true>,
            Self::SingleDataTransferImmediateOffset => operations::single_data_transfer::<false>,
            Self::SingleDataTransferRegisterOffset => operations::single_data_transfer::<true>,
            Self::BlockDataTransfer => operations::block_data_transfer,
            Self::Branch => operations::branch::<false>,
            Self::BranchLink => operations::branch::<true>,
            Self::Coprocessor => operations::coprocessor,
            Self::SoftwareInterrupt => operations::software_interrupt,
            Self::Undefined => operations::undefined,
        }
    }
}
