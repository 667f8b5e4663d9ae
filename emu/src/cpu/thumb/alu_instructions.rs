use std::fmt::Display;

/// Format 4, bits 9-6.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum ThumbModeAluInstruction {
    And = 0x0,
    Eor = 0x1,
    Lsl = 0x2,
    Lsr = 0x3,
    Asr = 0x4,
    Adc = 0x5,
    Sbc = 0x6,
    Ror = 0x7,
    Tst = 0x8,
    Neg = 0x9,
    Cmp = 0xA,
    Cmn = 0xB,
    Orr = 0xC,
    Mul = 0xD,
    Bic = 0xE,
    Mvn = 0xF,
}

impl From<u16> for ThumbModeAluInstruction {
    fn from(alu_op_code: u16) -> Self {
        use ThumbModeAluInstruction::{
            Adc, And, Asr, Bic, Cmn, Cmp, Eor, Lsl, Lsr, Mul, Mvn, Neg, Orr, Ror, Sbc, Tst,
        };
        match alu_op_code & 0xF {
            0x0 => And,
            0x1 => Eor,
            0x2 => Lsl,
            0x3 => Lsr,
            0x4 => Asr,
            0x5 => Adc,
            0x6 => Sbc,
            0x7 => Ror,
            0x8 => Tst,
            0x9 => Neg,
            0xA => Cmp,
            0xB => Cmn,
            0xC => Orr,
            0xD => Mul,
            0xE => Bic,
            _ => Mvn,
        }
    }
}

impl Display for ThumbModeAluInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::And => "AND",
            Self::Eor => "EOR",
            Self::Lsl => "LSL",
            Self::Lsr => "LSR",
            Self::Asr => "ASR",
            Self::Adc => "ADC",
            Self::Sbc => "SBC",
            Self::Ror => "ROR",
            Self::Tst => "TST",
            Self::Neg => "NEG",
            Self::Cmp => "CMP",
            Self::Cmn => "CMN",
            Self::Orr => "ORR",
            Self::Mul => "MUL",
            Self::Bic => "BIC",
            Self::Mvn => "MVN",
        };
        f.write_str(name)
    }
}

/// Format 5, bits 9-8.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThumbHighRegisterOperation {
    Add,
    Cmp,
    Mov,
    Bx,
}

impl Display for ThumbHighRegisterOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mov => f.write_str("MOV"),
            Self::Cmp => f.write_str("CMP"),
            Self::Add => f.write_str("ADD"),
            Self::Bx => f.write_str("BX"),
        }
    }
}

impl From<u16> for ThumbHighRegisterOperation {
    fn from(op: u16) -> Self {
        match op & 0b11 {
            0 => Self::Add,
            1 => Self::Cmp,
            2 => Self::Mov,
            _ => Self::Bx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_conversion_thumb_alu_op() {
        let op: ThumbModeAluInstruction = 0b0000.into();
        assert_eq!(op, ThumbModeAluInstruction::And);
        let op: ThumbModeAluInstruction = 0b0001.into();
        assert_eq!(op, ThumbModeAluInstruction::Eor);
        let op: ThumbModeAluInstruction = 0b1101.into();
        assert_eq!(op, ThumbModeAluInstruction::Mul);
        let op: ThumbModeAluInstruction = 0b1111.into();
        assert_eq!(op, ThumbModeAluInstruction::Mvn);
    }

    #[test]
    fn high_register_operations() {
        assert_eq!(ThumbHighRegisterOperation::from(3), ThumbHighRegisterOperation::Bx);
        assert_eq!(ThumbHighRegisterOperation::from(2).to_string(), "MOV");
    }
}
