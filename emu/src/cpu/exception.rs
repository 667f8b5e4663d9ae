//! # Exceptions
//!
//! | Exception           | Vector     | Mode | LR               | F set |
//! |---------------------|------------|------|------------------|-------|
//! | Undefined           | 0x00000004 | UND  | next instruction | no    |
//! | Software interrupt  | 0x00000008 | SVC  | next instruction | no    |
//! | IRQ                 | 0x00000018 | IRQ  | interrupted + 4  | no    |
//! | FIQ                 | 0x0000001C | FIQ  | interrupted + 4  | yes   |
//!
//! Entry always switches to ARM state and masks IRQs.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cpu::cpu_modes::Mode;
use crate::cpu::processor::Processor;
use crate::cpu::psr::CpuState;
use crate::cpu::registers::REG_LR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Exception {
    Undefined,
    SoftwareInterrupt,
    Irq,
    Fiq,
}

impl Exception {
    #[must_use]
    pub const fn vector(self) -> u32 {
        match self {
            Self::Undefined => 0x04,
            Self::SoftwareInterrupt => 0x08,
            Self::Irq => 0x18,
            Self::Fiq => 0x1C,
        }
    }

    #[must_use]
    pub const fn mode(self) -> Mode {
        match self {
            Self::Undefined => Mode::Undefined,
            Self::SoftwareInterrupt => Mode::Supervisor,
            Self::Irq => Mode::Irq,
            Self::Fiq => Mode::Fiq,
        }
    }
}

impl Display for Exception {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined instruction"),
            Self::SoftwareInterrupt => f.write_str("software interrupt"),
            Self::Irq => f.write_str("IRQ"),
            Self::Fiq => f.write_str("FIQ"),
        }
    }
}

impl Processor {
    pub(crate) fn enter_exception(&mut self, exception: Exception, return_address: u32) {
        let saved = self.cpsr;
        let mode = exception.mode();

        self.switch_mode(mode);
        self.register_bank.set_spsr(mode, saved);
        self.registers.set_register_at(REG_LR, return_address);

        self.cpsr.set_cpu_state(CpuState::Arm);
        self.cpsr.set_irq_disable(true);
        if exception == Exception::Fiq {
            self.cpsr.set_fiq_disable(true);
        }

        debug!(
            "{exception} from {} mode, return to {return_address:#010x}",
            saved.mode()
        );
        self.flush_pipeline(exception.vector());
    }
}
