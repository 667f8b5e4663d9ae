//! # Bus contract and transaction lines
//!
//! The core never touches memory from an instruction handler. Handlers and
//! sequencers only assert [`BusLines`]; the clock driver realises the
//! asserted transaction through a [`Bus`] on the following cycle and latches
//! the returned value back onto the data line.
//!
//! ```text
//!   cycle N                          cycle N+1
//!   ┌──────────────────────┐         ┌─────────────────────────────────┐
//!   │ handler asserts      │         │ driver calls Bus::read_*/write_*│
//!   │ address/width/MREQ   │ ──────▶ │ data line <- value              │
//!   └──────────────────────┘         │ wait states <- returned count   │
//!                                    └─────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

/// Synchronous memory system seen by the core.
///
/// Every access reports how many extra wait states it costs; the core stalls
/// for that many clocks before doing anything else.
pub trait Bus {
    /// Returns `(value, wait_states)`.
    fn read_byte(&mut self, address: u32, sequential: bool) -> (u8, u32);

    /// Returns `(value, wait_states)`.
    fn read_half_word(&mut self, address: u32, sequential: bool) -> (u16, u32);

    /// Returns `(value, wait_states)`.
    fn read_word(&mut self, address: u32, sequential: bool) -> (u32, u32);

    /// Returns the wait states.
    fn write_byte(&mut self, address: u32, value: u8, sequential: bool) -> u32;

    /// Returns the wait states.
    fn write_half_word(&mut self, address: u32, value: u16, sequential: bool) -> u32;

    /// Returns the wait states.
    fn write_word(&mut self, address: u32, value: u32, sequential: bool) -> u32;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferWidth {
    Byte,
    HalfWord,
    #[default]
    Word,
}

impl TransferWidth {
    /// Copies the low byte or half-word of `value` over the whole bus, the
    /// way the core drives the data lines on narrow stores.
    #[must_use]
    pub const fn replicate(self, value: u32) -> u32 {
        match self {
            Self::Byte => (value & 0xFF) * 0x0101_0101,
            Self::HalfWord => (value & 0xFFFF) * 0x0001_0001,
            Self::Word => value,
        }
    }
}

/// The latched intent for the next memory cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusLines {
    pub address: u32,
    /// Value to write, or the value returned by the last read.
    pub data: u32,
    pub width: TransferWidth,
    /// nMREQ inverted: a transaction happens on the next clock.
    pub memory_request: bool,
    /// SEQ: the access continues from the previous address.
    pub sequential: bool,
    /// nOPC inverted: the access is an opcode fetch.
    pub opcode_fetch: bool,
    /// nRW: the access is a write.
    pub write: bool,
}

impl BusLines {
    pub(crate) const fn request_opcode_fetch(
        &mut self,
        address: u32,
        width: TransferWidth,
        sequential: bool,
    ) {
        self.address = address;
        self.width = width;
        self.memory_request = true;
        self.sequential = sequential;
        self.opcode_fetch = true;
        self.write = false;
    }

    pub(crate) const fn request_read(
        &mut self,
        address: u32,
        width: TransferWidth,
        sequential: bool,
    ) {
        self.address = address;
        self.width = width;
        self.memory_request = true;
        self.sequential = sequential;
        self.opcode_fetch = false;
        self.write = false;
    }

    /// `value` is driven as is; narrow stores must already be replicated.
    pub(crate) const fn request_write(
        &mut self,
        address: u32,
        width: TransferWidth,
        value: u32,
        sequential: bool,
    ) {
        self.address = address;
        self.data = value;
        self.width = width;
        self.memory_request = true;
        self.sequential = sequential;
        self.opcode_fetch = false;
        self.write = true;
    }

    /// An internal cycle: no memory request, the address lines are parked
    /// on `next_address`.
    pub(crate) const fn request_internal(&mut self, next_address: u32) {
        self.address = next_address;
        self.memory_request = false;
        self.sequential = false;
        self.opcode_fetch = false;
        self.write = false;
    }
}
