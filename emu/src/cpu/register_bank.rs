//! # Banked registers
//!
//! Storage for the registers that are swapped out of the register file when
//! the mode changes. See [`cpu_modes`](super::cpu_modes) for which mode banks
//! what.
//!
//! The live values of the active mode are always the ones in
//! [`Registers`]; the slot of the active bank here is stale until the next
//! [`RegisterBank::switch`] saves it.

use serde::{Deserialize, Serialize};

use crate::cpu::cpu_modes::Mode;
use crate::cpu::psr::Psr;
use crate::cpu::registers::{REG_LR, REG_SP, Registers};

/// Physical register sets. User and System share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bank {
    User,
    Fiq,
    Irq,
    Supervisor,
    Abort,
    Undefined,
}

impl Bank {
    /// Index into the R13/R14 storage.
    const fn index(self) -> usize {
        self as usize
    }

    /// Index into the SPSR storage, `None` for the User bank.
    const fn spsr_index(self) -> Option<usize> {
        match self {
            Self::User => None,
            bank => Some(bank as usize - 1),
        }
    }
}

impl From<Mode> for Bank {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::User | Mode::System => Self::User,
            Mode::Fiq => Self::Fiq,
            Mode::Irq => Self::Irq,
            Mode::Supervisor => Self::Supervisor,
            Mode::Abort => Self::Abort,
            Mode::Undefined => Self::Undefined,
        }
    }
}

const HIGH_REGISTERS: std::ops::RangeInclusive<usize> = 8..=12;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterBank {
    /// R8-R12 of every mode but FIQ.
    shared_high: [u32; 5],
    /// R8-R12 of FIQ.
    fiq_high: [u32; 5],
    /// R13 and R14 per bank, in [`Bank`] order.
    stack_and_link: [[u32; 2]; 6],
    /// SPSR per exception bank.
    spsr: [Psr; 5],
}

impl RegisterBank {
    /// Moves the outgoing mode's banked registers out of `registers` and the
    /// incoming mode's ones in. Switching between modes sharing a bank is a
    /// no-op.
    pub fn switch(&mut self, registers: &mut Registers, from: Mode, to: Mode) {
        let (from, to) = (Bank::from(from), Bank::from(to));
        if from == to {
            return;
        }

        self.save(registers, from);
        self.load(registers, to);
    }

    fn save(&mut self, registers: &Registers, bank: Bank) {
        let high = if bank == Bank::Fiq {
            &mut self.fiq_high
        } else {
            &mut self.shared_high
        };
        for (slot, reg) in high.iter_mut().zip(HIGH_REGISTERS) {
            *slot = registers.register_at(reg);
        }

        self.stack_and_link[bank.index()] =
            [registers.register_at(REG_SP), registers.register_at(REG_LR)];
    }

    fn load(&self, registers: &mut Registers, bank: Bank) {
        let high = if bank == Bank::Fiq {
            &self.fiq_high
        } else {
            &self.shared_high
        };
        for (value, reg) in high.iter().zip(HIGH_REGISTERS) {
            registers.set_register_at(reg, *value);
        }

        let [sp, lr] = self.stack_and_link[bank.index()];
        registers.set_register_at(REG_SP, sp);
        registers.set_register_at(REG_LR, lr);
    }

    /// The SPSR of `mode`, if it has one.
    #[must_use]
    pub fn spsr(&self, mode: Mode) -> Option<Psr> {
        Bank::from(mode).spsr_index().map(|index| self.spsr[index])
    }

    /// Writes the SPSR of `mode`. Returns `false` when the mode has none.
    pub fn set_spsr(&mut self, mode: Mode, psr: Psr) -> bool {
        Bank::from(mode).spsr_index().is_some_and(|index| {
            self.spsr[index] = psr;
            true
        })
    }

    /// Reads the User-mode copy of `reg` while `active` is the current mode.
    #[must_use]
    pub fn user_register(&self, registers: &Registers, active: Mode, reg: usize) -> u32 {
        let bank = Bank::from(active);
        match reg {
            8..=12 if bank == Bank::Fiq => self.shared_high[reg - 8],
            13 | 14 if bank != Bank::User => self.stack_and_link[Bank::User.index()][reg - 13],
            _ => registers.register_at(reg),
        }
    }

    /// Writes the User-mode copy of `reg` while `active` is the current mode.
    pub fn set_user_register(
        &mut self,
        registers: &mut Registers,
        active: Mode,
        reg: usize,
        value: u32,
    ) {
        let bank = Bank::from(active);
        match reg {
            8..=12 if bank == Bank::Fiq => self.shared_high[reg - 8] = value,
            13 | 14 if bank != Bank::User => {
                self.stack_and_link[Bank::User.index()][reg - 13] = value;
            }
            _ => registers.set_register_at(reg, value),
        }
    }

    /// Banked R13 of `mode`. Only meaningful for a mode that is not active.
    #[must_use]
    pub fn stack_pointer(&self, mode: Mode) -> u32 {
        self.stack_and_link[Bank::from(mode).index()][0]
    }

    pub fn set_stack_pointer(&mut self, mode: Mode, value: u32) {
        self.stack_and_link[Bank::from(mode).index()][0] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn numbered_registers() -> Registers {
        let mut registers = Registers::default();
        for reg in 0..16 {
            registers.set_register_at(reg, reg as u32);
        }
        registers
    }

    #[test]
    fn irq_banks_only_sp_and_lr() {
        let mut bank = RegisterBank::default();
        let mut registers = numbered_registers();

        bank.switch(&mut registers, Mode::System, Mode::Irq);
        assert_eq!(registers.register_at(12), 12);
        assert_eq!(registers.register_at(REG_SP), 0);
        assert_eq!(registers.register_at(REG_LR), 0);

        registers.set_register_at(REG_SP, 0x0300_7FA0);
        registers.set_register_at(10, 0xAA);
        bank.switch(&mut registers, Mode::Irq, Mode::User);
        assert_eq!(registers.register_at(REG_SP), 13);
        assert_eq!(registers.register_at(REG_LR), 14);
        assert_eq!(registers.register_at(10), 0xAA);

        bank.switch(&mut registers, Mode::User, Mode::Irq);
        assert_eq!(registers.register_at(REG_SP), 0x0300_7FA0);
    }

    #[test]
    fn fiq_banks_r8_to_r14() {
        let mut bank = RegisterBank::default();
        let mut registers = numbered_registers();

        bank.switch(&mut registers, Mode::Supervisor, Mode::Fiq);
        for reg in 8..=14 {
            assert_eq!(registers.register_at(reg), 0);
        }
        assert_eq!(registers.register_at(7), 7);

        registers.set_register_at(8, 0x88);
        bank.switch(&mut registers, Mode::Fiq, Mode::Supervisor);
        for reg in 8..=14 {
            assert_eq!(registers.register_at(reg), reg as u32);
        }
    }

    #[test]
    fn user_and_system_share_registers() {
        let mut bank = RegisterBank::default();
        let mut registers = numbered_registers();
        bank.switch(&mut registers, Mode::User, Mode::System);
        assert_eq!(registers, numbered_registers());
    }

    #[test]
    fn spsr_only_for_exception_modes() {
        let mut bank = RegisterBank::default();
        let saved = Psr::from(Mode::User);

        assert!(bank.set_spsr(Mode::Supervisor, saved));
        assert_eq!(bank.spsr(Mode::Supervisor), Some(saved));
        assert_eq!(bank.spsr(Mode::Irq), Some(Psr::default()));
        assert!(!bank.set_spsr(Mode::System, saved));
        assert_eq!(bank.spsr(Mode::User), None);
    }

    #[test]
    fn user_view_from_fiq() {
        let mut bank = RegisterBank::default();
        let mut registers = numbered_registers();
        bank.switch(&mut registers, Mode::User, Mode::Fiq);
        registers.set_register_at(9, 0x99);

        assert_eq!(bank.user_register(&registers, Mode::Fiq, 9), 9);
        assert_eq!(bank.user_register(&registers, Mode::Fiq, 13), 13);
        assert_eq!(bank.user_register(&registers, Mode::Fiq, 3), 3);

        bank.set_user_register(&mut registers, Mode::Fiq, 14, 0x1234);
        assert_eq!(registers.register_at(REG_LR), 0);
        bank.switch(&mut registers, Mode::Fiq, Mode::User);
        assert_eq!(registers.register_at(REG_LR), 0x1234);
        assert_eq!(registers.register_at(9), 9);
    }

    #[test]
    fn user_view_from_user_is_the_register_file() {
        let bank = RegisterBank::default();
        let registers = numbered_registers();
        assert_eq!(bank.user_register(&registers, Mode::System, 13), 13);
    }
}
