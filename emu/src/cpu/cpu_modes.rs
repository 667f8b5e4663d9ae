//! # Operating modes
//!
//! ```text
//! ┌────────────┬───────┬─────────────┬──────┬──────────────────────────┐
//! │ Mode       │ Bits  │ Privileged  │ SPSR │ Banked registers         │
//! ├────────────┼───────┼─────────────┼──────┼──────────────────────────┤
//! │ User       │ 10000 │ no          │ no   │ none                     │
//! │ FIQ        │ 10001 │ yes         │ yes  │ R8-R14                   │
//! │ IRQ        │ 10010 │ yes         │ yes  │ R13-R14                  │
//! │ Supervisor │ 10011 │ yes         │ yes  │ R13-R14                  │
//! │ Abort      │ 10111 │ yes         │ yes  │ R13-R14                  │
//! │ Undefined  │ 11011 │ yes         │ yes  │ R13-R14                  │
//! │ System     │ 11111 │ yes         │ no   │ shares User registers    │
//! └────────────┴───────┴─────────────┴──────┴──────────────────────────┘
//! ```

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::cpu::fault::CpuFault;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// The normal program execution state.
    User = 0b10000,

    /// Fast interrupt, with its own R8-R14.
    Fiq = 0b10001,

    /// General-purpose interrupt handling.
    Irq = 0b10010,

    /// Entered on reset and by SWI.
    Supervisor = 0b10011,

    /// Entered after a data or prefetch abort.
    Abort = 0b10111,

    /// Entered when an undefined instruction traps.
    Undefined = 0b11011,

    /// Privileged mode running on the User registers.
    System = 0b11111,
}

impl Mode {
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        !matches!(self, Self::User)
    }

    /// User and System have no SPSR.
    #[must_use]
    pub const fn has_spsr(self) -> bool {
        !matches!(self, Self::User | Self::System)
    }
}

impl From<Mode> for u32 {
    fn from(m: Mode) -> Self {
        m as Self
    }
}

impl TryFrom<u32> for Mode {
    type Error = CpuFault;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        match bits {
            0b10000 => Ok(Self::User),
            0b10001 => Ok(Self::Fiq),
            0b10010 => Ok(Self::Irq),
            0b10011 => Ok(Self::Supervisor),
            0b10111 => Ok(Self::Abort),
            0b11011 => Ok(Self::Undefined),
            0b11111 => Ok(Self::System),
            _ => Err(CpuFault::InvalidMode { bits }),
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::User => "USR",
            Self::Fiq => "FIQ",
            Self::Irq => "IRQ",
            Self::Supervisor => "SVC",
            Self::Abort => "ABT",
            Self::Undefined => "UND",
            Self::System => "SYS",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn valid_mode_bits_decode() {
        for mode in [
            Mode::User,
            Mode::Fiq,
            Mode::Irq,
            Mode::Supervisor,
            Mode::Abort,
            Mode::Undefined,
            Mode::System,
        ] {
            assert_eq!(Mode::try_from(u32::from(mode)), Ok(mode));
        }
    }

    #[test]
    fn invalid_mode_bits_are_a_fault() {
        assert_eq!(Mode::try_from(0), Err(CpuFault::InvalidMode { bits: 0 }));
        assert_eq!(
            Mode::try_from(0b10100),
            Err(CpuFault::InvalidMode { bits: 0b10100 })
        );
    }

    #[test]
    fn privileges() {
        assert!(!Mode::User.is_privileged());
        assert!(Mode::System.is_privileged());
        assert!(!Mode::System.has_spsr());
        assert!(Mode::Fiq.has_spsr());
    }
}
