use std::fmt::Display;

use crate::cpu::alu;
use crate::cpu::psr::Psr;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ArmModeAluInstruction {
    And = 0x0,
    Eor = 0x1,
    Sub = 0x2,
    Rsb = 0x3,
    Add = 0x4,
    Adc = 0x5,
    Sbc = 0x6,
    Rsc = 0x7,
    Tst = 0x8,
    Teq = 0x9,
    Cmp = 0xA,
    Cmn = 0xB,
    Orr = 0xC,
    Mov = 0xD,
    Bic = 0xE,
    Mvn = 0xF,
}

impl Display for ArmModeAluInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::And => f.write_str("AND"),
            Self::Eor => f.write_str("EOR"),
            Self::Sub => f.write_str("SUB"),
            Self::Rsb => f.write_str("RSB"),
            Self::Add => f.write_str("ADD"),
            Self::Adc => f.write_str("ADC"),
            Self::Sbc => f.write_str("SBC"),
            Self::Rsc => f.write_str("RSC"),
            Self::Tst => f.write_str("TST"),
            Self::Teq => f.write_str("TEQ"),
            Self::Cmp => f.write_str("CMP"),
            Self::Cmn => f.write_str("CMN"),
            Self::Orr => f.write_str("ORR"),
            Self::Mov => f.write_str("MOV"),
            Self::Bic => f.write_str("BIC"),
            Self::Mvn => f.write_str("MVN"),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum AluInstructionKind {
    /// C comes from the barrel shifter, V is untouched.
    Logical,
    Arithmetic,
}

impl ArmModeAluInstruction {
    #[must_use]
    pub const fn kind(self) -> AluInstructionKind {
        use ArmModeAluInstruction::{
            Adc, Add, And, Bic, Cmn, Cmp, Eor, Mov, Mvn, Orr, Rsb, Rsc, Sbc, Sub, Teq, Tst,
        };
        match self {
            And | Eor | Tst | Teq | Orr | Mov | Bic | Mvn => AluInstructionKind::Logical,
            Sub | Rsb | Add | Adc | Sbc | Rsc | Cmp | Cmn => AluInstructionKind::Arithmetic,
        }
    }

    /// TST, TEQ, CMP and CMN only set flags.
    #[must_use]
    pub const fn is_test(self) -> bool {
        matches!(self, Self::Tst | Self::Teq | Self::Cmp | Self::Cmn)
    }

    /// Runs the operation on `flags`; the caller decides whether to keep
    /// them and where the result goes.
    pub fn execute(self, op1: u32, op2: u32, flags: &mut Psr) -> u32 {
        match self {
            Self::And | Self::Tst => alu::and(op1, op2, flags),
            Self::Eor | Self::Teq => alu::eor(op1, op2, flags),
            Self::Sub | Self::Cmp => alu::sub(op1, op2, flags),
            Self::Rsb => alu::rsb(op1, op2, flags),
            Self::Add | Self::Cmn => alu::add(op1, op2, flags),
            Self::Adc => alu::adc(op1, op2, flags),
            Self::Sbc => alu::sbc(op1, op2, flags),
            Self::Rsc => alu::rsc(op1, op2, flags),
            Self::Orr => alu::orr(op1, op2, flags),
            Self::Mov => alu::mov(op2, flags),
            Self::Bic => alu::bic(op1, op2, flags),
            Self::Mvn => alu::mvn(op2, flags),
        }
    }
}

impl From<u32> for ArmModeAluInstruction {
    fn from(alu_op_code: u32) -> Self {
        use ArmModeAluInstruction::{
            Adc, Add, And, Bic, Cmn, Cmp, Eor, Mov, Mvn, Orr, Rsb, Rsc, Sbc, Sub, Teq, Tst,
        };
        match alu_op_code & 0xF {
            0x0 => And,
            0x1 => Eor,
            0x2 => Sub,
            0x3 => Rsb,
            0x4 => Add,
            0x5 => Adc,
            0x6 => Sbc,
            0x7 => Rsc,
            0x8 => Tst,
            0x9 => Teq,
            0xA => Cmp,
            0xB => Cmn,
            0xC => Orr,
            0xD => Mov,
            0xE => Bic,
            _ => Mvn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn opcode_field_decodes_every_operation() {
        for code in 0..16_u32 {
            let instruction = ArmModeAluInstruction::from(code);
            assert_eq!(instruction as u32, code);
        }
    }

    #[test]
    fn tests_and_kinds() {
        assert!(ArmModeAluInstruction::Cmn.is_test());
        assert!(!ArmModeAluInstruction::Mov.is_test());
        assert_eq!(ArmModeAluInstruction::Teq.kind(), AluInstructionKind::Logical);
        assert_eq!(ArmModeAluInstruction::Rsc.kind(), AluInstructionKind::Arithmetic);
    }

    #[test]
    fn compare_sets_flags_like_subtract() {
        let mut flags = Psr::default();
        ArmModeAluInstruction::Cmp.execute(3, 3, &mut flags);
        assert!(flags.zero_flag());
        assert!(flags.carry_flag());
    }

    #[test]
    fn display() {
        assert_eq!(ArmModeAluInstruction::Bic.to_string(), "BIC");
    }
}
