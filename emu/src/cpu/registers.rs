//! # Register file
//!
//! The sixteen registers visible in the current mode.
//!
//! - **R0-R12**: General purpose
//! - **R13 (SP)**: Stack pointer by convention
//! - **R14 (LR)**: Link register
//! - **R15 (PC)**: Address of the most recently fetched opcode, which is
//!   the executing instruction + 8 in ARM state and + 4 in THUMB state
//!
//! Banked copies for the other modes live in
//! [`RegisterBank`](super::register_bank::RegisterBank).

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Stack Pointer register index.
pub const REG_SP: usize = 0xD;

/// Link Register index.
pub const REG_LR: usize = 0xE;

/// Program Counter register index.
pub const REG_PROGRAM_COUNTER: usize = 0xF;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers([u32; 16]);

impl Registers {
    #[must_use]
    pub const fn program_counter(&self) -> u32 {
        self.0[REG_PROGRAM_COUNTER]
    }

    pub const fn set_program_counter(&mut self, new_value: u32) {
        self.0[REG_PROGRAM_COUNTER] = new_value;
    }

    /// # Panics
    ///
    /// Panics if `reg` is not a register index.
    #[must_use]
    pub const fn register_at(&self, reg: usize) -> u32 {
        self.0[reg]
    }

    /// # Panics
    ///
    /// Panics if `reg` is not a register index.
    pub const fn set_register_at(&mut self, reg: usize, new_value: u32) {
        self.0[reg] = new_value;
    }

    #[must_use]
    pub const fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

impl Display for Registers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (row, chunk) in self.0.chunks(4).enumerate() {
            for (col, value) in chunk.iter().enumerate() {
                let index = row * 4 + col;
                write!(f, "R{index:<2}={value:08X} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
