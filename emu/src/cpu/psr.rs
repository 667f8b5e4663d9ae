//! # Program Status Registers (CPSR and SPSR)
//!
//! ```text
//! 31 30 29 28 27 26      8 7 6 5 4   0
//! ┌──┬──┬──┬──┬──┬────────┬─┬─┬─┬─────┐
//! │N │Z │C │V │Q │Reserved│I│F│T│Mode │
//! └──┴──┴──┴──┴──┴────────┴─┴─┴─┴─────┘
//! ```
//!
//! A [`Psr`] can only hold one of the seven defined modes: every conversion
//! from raw bits goes through [`Psr::try_from`], which rejects anything else
//! with [`CpuFault::InvalidMode`].

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::bus::TransferWidth;
use crate::cpu::alu::ArithmeticOpResult;
use crate::cpu::fault::CpuFault;
use crate::cpu::{condition::Condition, cpu_modes::Mode};

const MODE_MASK: u32 = 0b1_1111;

/// Program Status Register, used for both the CPSR and the banked SPSRs.
///
/// # Example
///
/// ```
/// use emu::cpu::psr::Psr;
/// use emu::cpu::cpu_modes::Mode;
///
/// let mut cpsr = Psr::from(Mode::System);
/// cpsr.set_carry_flag(true);
/// assert!(cpsr.carry_flag());
/// assert_eq!(u32::from(cpsr), 0x2000_001F);
/// assert!(Psr::try_from(0x2000_0000).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Psr(u32);

impl Psr {
    /// Evaluates an ARM condition code against the N, Z, C and V flags.
    #[must_use]
    pub fn can_execute(self, cond: Condition) -> bool {
        use Condition::{AL, CC, CS, EQ, GE, GT, HI, LE, LS, LT, MI, NE, NV, PL, VC, VS};
        match cond {
            EQ => self.zero_flag(),
            NE => !self.zero_flag(),
            CS => self.carry_flag(),
            CC => !self.carry_flag(),
            MI => self.sign_flag(),
            PL => !self.sign_flag(),
            VS => self.overflow_flag(),
            VC => !self.overflow_flag(),
            HI => self.carry_flag() && !self.zero_flag(),
            LS => !self.carry_flag() || self.zero_flag(),
            GE => self.sign_flag() == self.overflow_flag(),
            LT => self.sign_flag() != self.overflow_flag(),
            GT => !self.zero_flag() && (self.sign_flag() == self.overflow_flag()),
            LE => self.zero_flag() || (self.sign_flag() != self.overflow_flag()),
            AL => true,
            NV => false,
        }
    }

    /// N => Bit 31
    #[must_use]
    pub fn sign_flag(self) -> bool {
        self.0.get_bit(31)
    }

    /// Z => Bit 30
    #[must_use]
    pub fn zero_flag(self) -> bool {
        self.0.get_bit(30)
    }

    /// C => Bit 29, (0=Borrow/No Carry, 1=Carry/No Borrow)
    #[must_use]
    pub fn carry_flag(self) -> bool {
        self.0.get_bit(29)
    }

    /// V => Bit 28
    #[must_use]
    pub fn overflow_flag(self) -> bool {
        self.0.get_bit(28)
    }

    /// Q => Bit 27. Nothing on ARMv4 sets it, MSR can still write it.
    #[must_use]
    pub fn sticky_overflow(self) -> bool {
        self.0.get_bit(27)
    }

    /// I => Bit 7, (0=Enable, 1=Disable)
    #[must_use]
    pub fn irq_disable(self) -> bool {
        self.0.get_bit(7)
    }

    /// F => Bit 6, (0=Enable, 1=Disable)
    #[must_use]
    pub fn fiq_disable(self) -> bool {
        self.0.get_bit(6)
    }

    /// T => Bit 5, (0=ARM, 1=THUMB)
    #[must_use]
    pub fn state_bit(self) -> bool {
        self.0.get_bit(5)
    }

    /// M4-M0 => Bits 4-0
    #[must_use]
    pub fn mode(self) -> Mode {
        match Mode::try_from(self.0 & MODE_MASK) {
            Ok(mode) => mode,
            Err(_) => unreachable!("PSR built with invalid mode bits {:#07b}", self.0),
        }
    }

    #[must_use]
    pub fn cpu_state(self) -> CpuState {
        self.state_bit().into()
    }

    pub fn set_sign_flag(&mut self, value: bool) {
        self.0.set_bit(31, value);
    }

    pub fn set_zero_flag(&mut self, value: bool) {
        self.0.set_bit(30, value);
    }

    pub fn set_carry_flag(&mut self, value: bool) {
        self.0.set_bit(29, value);
    }

    pub fn set_overflow_flag(&mut self, value: bool) {
        self.0.set_bit(28, value);
    }

    pub fn set_flags(&mut self, op_result: &ArithmeticOpResult) {
        self.set_carry_flag(op_result.carry);
        self.set_zero_flag(op_result.zero);
        self.set_sign_flag(op_result.sign);
        self.set_overflow_flag(op_result.overflow);
    }

    /// Sets N and Z from a 32-bit result, leaving C and V alone.
    pub fn set_sign_and_zero(&mut self, result: u32) {
        self.set_sign_flag(result.get_bit(31));
        self.set_zero_flag(result == 0);
    }

    /// Copies N, Z, C and V from `other`.
    pub fn set_condition_flags(&mut self, other: Self) {
        const FLAGS: u32 = 0xF000_0000;
        self.0 = (self.0 & !FLAGS) | (other.0 & FLAGS);
    }

    pub fn set_irq_disable(&mut self, value: bool) {
        self.0.set_bit(7, value);
    }

    pub fn set_fiq_disable(&mut self, value: bool) {
        self.0.set_bit(6, value);
    }

    pub fn set_cpu_state(&mut self, state: CpuState) {
        self.0.set_bit(5, state.into());
    }

    pub const fn set_mode(&mut self, m: Mode) {
        self.0 = (self.0 & !MODE_MASK) | m as u32;
    }
}

impl Default for Psr {
    fn default() -> Self {
        Self::from(Mode::User)
    }
}

impl From<Mode> for Psr {
    fn from(m: Mode) -> Self {
        Self(m as u32)
    }
}

impl TryFrom<u32> for Psr {
    type Error = CpuFault;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Mode::try_from(value & MODE_MASK)?;
        Ok(Self(value))
    }
}

impl From<Psr> for u32 {
    fn from(p: Psr) -> Self {
        p.0
    }
}

impl std::fmt::Debug for Psr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Psr({:#010x} {self})", self.0)
    }
}

impl Display for Psr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let flag = |set: bool, c: char| if set { c } else { '-' };
        write!(
            f,
            "{}{}{}{} {}{}{} {}",
            flag(self.sign_flag(), 'N'),
            flag(self.zero_flag(), 'Z'),
            flag(self.carry_flag(), 'C'),
            flag(self.overflow_flag(), 'V'),
            flag(self.irq_disable(), 'I'),
            flag(self.fiq_disable(), 'F'),
            flag(self.state_bit(), 'T'),
            self.mode()
        )
    }
}

/// The execution state selected by the T bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    /// 16-bit instructions.
    Thumb,
    /// 32-bit instructions.
    Arm,
}

impl CpuState {
    /// Bytes between two consecutive opcodes.
    #[must_use]
    pub const fn instruction_size(self) -> u32 {
        match self {
            Self::Arm => 4,
            Self::Thumb => 2,
        }
    }

    #[must_use]
    pub const fn fetch_width(self) -> TransferWidth {
        match self {
            Self::Arm => TransferWidth::Word,
            Self::Thumb => TransferWidth::HalfWord,
        }
    }

    /// Clears the low bits an opcode address cannot have in this state.
    #[must_use]
    pub const fn align(self, address: u32) -> u32 {
        match self {
            Self::Arm => address & !0b11,
            Self::Thumb => address & !0b1,
        }
    }
}

impl From<CpuState> for bool {
    fn from(state: CpuState) -> Self {
        match state {
            CpuState::Arm => false,
            CpuState::Thumb => true,
        }
    }
}

impl From<bool> for CpuState {
    fn from(state: bool) -> Self {
        if state { Self::Thumb } else { Self::Arm }
    }
}

impl Display for CpuState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Arm => write!(f, "ARM"),
            Self::Thumb => write!(f, "THUMB"),
        }
    }
}
