//! THUMB formats are told apart by the top byte alone, so the handler
//! table has 256 entries built at compile time.

use crate::cpu::fault::CpuFault;
use crate::cpu::processor::Processor;
use crate::cpu::thumb::ThumbOpcode;
use crate::cpu::thumb::operations;

pub type ThumbHandler = fn(&mut Processor, ThumbOpcode) -> Result<(), CpuFault>;

pub static THUMB_HANDLERS: [ThumbHandler; 256] = {
    let mut table: [ThumbHandler; 256] = [operations::undefined; 256];
    let mut index = 0;
    while index < table.len() {
        table[index] = ThumbInstruction::decode(index).handler();
        index += 1;
    }
    table
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbInstruction {
    MoveShiftedRegister,
    AddSubtract,
    MoveCompareAddSubtractImm,
    AluOp,
    HiRegisterOpBx,
    PcRelativeLoad,
    LoadStoreRegisterOffset,
    LoadStoreSignExtByteHalfword,
    LoadStoreImmOffset,
    LoadStoreHalfword,
    SpRelativeLoadStore,
    LoadAddress,
    AddOffsetToSp,
    PushPopReg,
    MultipleLoadStore,
    CondBranch,
    Swi,
    UncondBranch,
    LongBranchLinkPrefix,
    LongBranchLinkSuffix,
    Undefined,
}

impl ThumbInstruction {
    /// `index` is bits 15-8 of the opcode.
    #[must_use]
    pub const fn decode(index: usize) -> Self {
        match index {
            0x00..=0x17 => Self::MoveShiftedRegister,
            0x18..=0x1F => Self::AddSubtract,
            0x20..=0x3F => Self::MoveCompareAddSubtractImm,
            0x40..=0x43 => Self::AluOp,
            0x44..=0x47 => Self::HiRegisterOpBx,
            0x48..=0x4F => Self::PcRelativeLoad,
            // Bit 9 of the opcode.
            0x50..=0x5F if index & 0b10 == 0 => Self::LoadStoreRegisterOffset,
            0x50..=0x5F => Self::LoadStoreSignExtByteHalfword,
            0x60..=0x7F => Self::LoadStoreImmOffset,
            0x80..=0x8F => Self::LoadStoreHalfword,
            0x90..=0x9F => Self::SpRelativeLoadStore,
            0xA0..=0xAF => Self::LoadAddress,
            0xB0 => Self::AddOffsetToSp,
            0xB4 | 0xB5 | 0xBC | 0xBD => Self::PushPopReg,
            0xC0..=0xCF => Self::MultipleLoadStore,
            0xD0..=0xDD => Self::CondBranch,
            0xDF => Self::Swi,
            0xE0..=0xE7 => Self::UncondBranch,
            0xF0..=0xF7 => Self::LongBranchLinkPrefix,
            0xF8..=0xFF => Self::LongBranchLinkSuffix,
            _ => Self::Undefined,
        }
    }

    const fn handler(self) -> ThumbHandler {
        match self {
            Self::MoveShiftedRegister => operations::move_shifted_register,
            Self::AddSubtract => operations::add_subtract,
            Self::MoveCompareAddSubtractImm => operations::move_compare_add_sub_imm,
            Self::AluOp => operations::alu_operation,
            Self::HiRegisterOpBx => operations::hi_register_operation,
            Self::PcRelativeLoad => operations::pc_relative_load,
            Self::LoadStoreRegisterOffset => operations::load_store_register_offset,
            Self::LoadStoreSignExtByteHalfword => operations::load_store_sign_extended,
            Self::LoadStoreImmOffset => operations::load_store_immediate_offset,
            Self::LoadStoreHalfword => operations::load_store_halfword,
            Self::SpRelativeLoadStore => operations::sp_relative_load_store,
            Self::LoadAddress => operations::load_address,
            Self::AddOffsetToSp => operations::add_offset_to_sp,
            Self::PushPopReg => operations::push_pop,
            Self::MultipleLoadStore => operations::multiple_load_store,
            Self::CondBranch => operations::conditional_branch,
            Self::Swi => operations::software_interrupt,
            Self::UncondBranch => operations::unconditional_branch,
            Self::LongBranchLinkPrefix => operations::long_branch_link_prefix,
            Self::LongBranchLinkSuffix => operations::long_branch_link_suffix,
            Self::Undefined => operations::undefined,
        }
    }
}
