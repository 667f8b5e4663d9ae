//! # Condition codes
//!
//! Every ARM instruction carries a condition in bits 31-28. The dispatcher
//! checks it against the CPSR flags before looking the handler up; a failing
//! condition spends the cycle without side effects. THUMB only uses the same
//! encoding for its conditional branch family.
//!
//! ```text
//! ┌──────┬────────┬──────────────────────────┐
//! │ Code │ Suffix │ Passes when              │
//! ├──────┼────────┼──────────────────────────┤
//! │ 0000 │   EQ   │ Z                        │
//! │ 0001 │   NE   │ !Z                       │
//! │ 0010 │   CS   │ C                        │
//! │ 0011 │   CC   │ !C                       │
//! │ 0100 │   MI   │ N                        │
//! │ 0101 │   PL   │ !N                       │
//! │ 0110 │   VS   │ V                        │
//! │ 0111 │   VC   │ !V                       │
//! │ 1000 │   HI   │ C && !Z                  │
//! │ 1001 │   LS   │ !C || Z                  │
//! │ 1010 │   GE   │ N == V                   │
//! │ 1011 │   LT   │ N != V                   │
//! │ 1100 │   GT   │ !Z && N == V             │
//! │ 1101 │   LE   │ Z || N != V              │
//! │ 1110 │   AL   │ always                   │
//! │ 1111 │   NV   │ never (reserved)         │
//! └──────┴────────┴──────────────────────────┘
//! ```
//!
//! The evaluation itself lives on [`Psr::can_execute`](super::psr::Psr::can_execute).

use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    EQ = 0x0,
    NE = 0x1,
    CS = 0x2,
    CC = 0x3,
    MI = 0x4,
    PL = 0x5,
    VS = 0x6,
    VC = 0x7,
    HI = 0x8,
    LS = 0x9,
    GE = 0xA,
    LT = 0xB,
    GT = 0xC,
    LE = 0xD,
    AL = 0xE,
    /// Reserved on ARMv4. Evaluated as never passing.
    NV = 0xF,
}

impl From<u8> for Condition {
    fn from(code: u8) -> Self {
        match code & 0xF {
            0x0 => Self::EQ,
            0x1 => Self::NE,
            0x2 => Self::CS,
            0x3 => Self::CC,
            0x4 => Self::MI,
            0x5 => Self::PL,
            0x6 => Self::VS,
            0x7 => Self::VC,
            0x8 => Self::HI,
            0x9 => Self::LS,
            0xA => Self::GE,
            0xB => Self::LT,
            0xC => Self::GT,
            0xD => Self::LE,
            0xE => Self::AL,
            _ => Self::NV,
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let suffix = match self {
            Self::EQ => "EQ",
            Self::NE => "NE",
            Self::CS => "CS",
            Self::CC => "CC",
            Self::MI => "MI",
            Self::PL => "PL",
            Self::VS => "VS",
            Self::VC => "VC",
            Self::HI => "HI",
            Self::LS => "LS",
            Self::GE => "GE",
            Self::LT => "LT",
            Self::GT => "GT",
            Self::LE => "LE",
            Self::AL => "",
            Self::NV => "NV",
        };
        write!(f, "{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_code_round_trips_through_its_discriminant() {
        for code in 0..16_u8 {
            let condition = Condition::from(code);
            assert_eq!(condition as u8, code);
        }
    }

    #[test]
    fn upper_bits_are_ignored() {
        assert_eq!(Condition::from(0xE0), Condition::EQ);
        assert_eq!(Condition::from(0x1E), Condition::AL);
    }

    #[test]
    fn always_has_no_suffix() {
        assert_eq!(Condition::AL.to_string(), "");
        assert_eq!(Condition::GT.to_string(), "GT");
    }
}
