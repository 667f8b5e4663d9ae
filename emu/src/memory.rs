//! # Reference memory
//!
//! [`InternalMemory`] is a [`Bus`] with the handheld's CPU-visible regions
//! and default wait states. It is what the tests and the runner plug into
//! the core; a full system would put its own memory map behind [`Bus`].
//!
//! ```text
//! ┌─────────────────────────┬──────────────────┬─────────────────────────┐
//! │ Region                  │ Size             │ Wait states (8/16 │ 32) │
//! ├─────────────────────────┼──────────────────┼─────────────────────────┤
//! │ BIOS      0x0000_0000   │ 16 KiB           │ 0 │ 0                   │
//! │ WRAM      0x0200_0000   │ 256 KiB mirrored │ 2 │ 5                   │
//! │ IWRAM     0x0300_0000   │ 32 KiB mirrored  │ 0 │ 0                   │
//! │ ROM       0x0800_0000   │ up to 32 MiB x3  │ N 4, S 2 │ N 7, S 5     │
//! │ SRAM      0x0E00_0000   │ sparse, 8 bit    │ 4 │ 4                   │
//! │ elsewhere               │ sparse           │ 0 │ 0                   │
//! └─────────────────────────┴──────────────────┴─────────────────────────┘
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::bus::{Bus, TransferWidth};

const BIOS_SIZE: usize = 0x0000_4000;
const WORKING_RAM_SIZE: usize = 0x0004_0000;
const WORKING_IRAM_SIZE: usize = 0x0000_8000;
const ROM_REGION_SIZE: u32 = 0x0200_0000;

const WORKING_RAM_WAIT: u32 = 2;
const WORKING_RAM_WORD_WAIT: u32 = 5;
const ROM_NON_SEQUENTIAL_WAIT: u32 = 4;
const ROM_SEQUENTIAL_WAIT: u32 = 2;
const SRAM_WAIT: u32 = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternalMemory {
    /// From 0x00000000 to 0x00003FFF.
    bios_system_rom: Vec<u8>,

    /// From 0x02000000 to 0x0203FFFF, mirrored up to 0x02FFFFFF.
    working_ram: Vec<u8>,

    /// From 0x03000000 to 0x03007FFF, mirrored up to 0x03FFFFFF.
    working_iram: Vec<u8>,

    /// Seen three times, from 0x08000000, 0x0A000000 and 0x0C000000.
    rom: Vec<u8>,

    /// Every other address, SRAM included.
    unused_region: HashMap<u32, u8>,
}

impl Default for InternalMemory {
    fn default() -> Self {
        Self::new(&[], Vec::new())
    }
}

impl InternalMemory {
    /// `bios` is truncated or zero padded to 16 KiB.
    #[must_use]
    pub fn new(bios: &[u8], rom: Vec<u8>) -> Self {
        let mut bios_system_rom = vec![0; BIOS_SIZE];
        let len = bios.len().min(BIOS_SIZE);
        bios_system_rom[..len].copy_from_slice(&bios[..len]);

        Self {
            bios_system_rom,
            working_ram: vec![0; WORKING_RAM_SIZE],
            working_iram: vec![0; WORKING_IRAM_SIZE],
            rom,
            unused_region: HashMap::new(),
        }
    }

    /// Copies `bytes` starting at `address`, writing through ROM and BIOS.
    pub fn load(&mut self, address: u32, bytes: &[u8]) {
        for (address, value) in (address..).zip(bytes) {
            match address {
                0x0000_0000..=0x0000_3FFF => self.bios_system_rom[address as usize] = *value,
                0x0800_0000..=0x0DFF_FFFF => {
                    let offset = Self::rom_offset(address);
                    if offset >= self.rom.len() {
                        self.rom.resize(offset + 1, 0);
                    }
                    self.rom[offset] = *value;
                }
                _ => self.write_at(address, *value),
            }
        }
    }

    #[must_use]
    pub fn read_at(&self, address: u32) -> u8 {
        match address {
            0x0000_0000..=0x0000_3FFF => self.bios_system_rom[address as usize],
            0x0200_0000..=0x02FF_FFFF => self.working_ram[Self::working_ram_offset(address)],
            0x0300_0000..=0x03FF_FFFF => self.working_iram[Self::working_iram_offset(address)],
            0x0800_0000..=0x0DFF_FFFF => self.read_rom(Self::rom_offset(address)),
            _ => {
                trace!("read on unused memory {address:#010x}");
                self.unused_region.get(&address).copied().unwrap_or(0)
            }
        }
    }

    /// BIOS and ROM ignore writes.
    pub fn write_at(&mut self, address: u32, value: u8) {
        match address {
            0x0000_0000..=0x0000_3FFF | 0x0800_0000..=0x0DFF_FFFF => {
                trace!("write to read-only memory {address:#010x}");
            }
            0x0200_0000..=0x02FF_FFFF => {
                self.working_ram[Self::working_ram_offset(address)] = value;
            }
            0x0300_0000..=0x03FF_FFFF => {
                self.working_iram[Self::working_iram_offset(address)] = value;
            }
            _ => {
                self.unused_region.insert(address, value);
            }
        }
    }

    #[must_use]
    pub fn read_word_at(&self, address: u32) -> u32 {
        let address = address & !0b11;
        u32::from_le_bytes([
            self.read_at(address),
            self.read_at(address.wrapping_add(1)),
            self.read_at(address.wrapping_add(2)),
            self.read_at(address.wrapping_add(3)),
        ])
    }

    fn read_rom(&self, offset: usize) -> u8 {
        self.rom.get(offset).copied().unwrap_or_else(|| {
            // Empty cartridge space: the ROM leaves the low 16 bits of the
            // half-word address on the shared address/data bus.
            let [low, high] = (((offset >> 1) & 0xFFFF) as u16).to_le_bytes();
            if offset & 1 == 0 { low } else { high }
        })
    }

    const fn working_ram_offset(address: u32) -> usize {
        (address as usize) & (WORKING_RAM_SIZE - 1)
    }

    const fn working_iram_offset(address: u32) -> usize {
        (address as usize) & (WORKING_IRAM_SIZE - 1)
    }

    const fn rom_offset(address: u32) -> usize {
        ((address - 0x0800_0000) % ROM_REGION_SIZE) as usize
    }

    fn wait_states(address: u32, width: TransferWidth, sequential: bool) -> u32 {
        match address >> 24 {
            0x02 if width == TransferWidth::Word => WORKING_RAM_WORD_WAIT,
            0x02 => WORKING_RAM_WAIT,
            0x08..=0x0D => {
                let first = if sequential {
                    ROM_SEQUENTIAL_WAIT
                } else {
                    ROM_NON_SEQUENTIAL_WAIT
                };
                // The 16-bit cartridge bus needs a second, sequential access for words.
                if width == TransferWidth::Word {
                    first + ROM_SEQUENTIAL_WAIT + 1
                } else {
                    first
                }
            }
            0x0E | 0x0F => SRAM_WAIT,
            _ => 0,
        }
    }
}

impl Bus for InternalMemory {
    fn read_byte(&mut self, address: u32, sequential: bool) -> (u8, u32) {
        let wait = Self::wait_states(address, TransferWidth::Byte, sequential);
        (self.read_at(address), wait)
    }

    fn read_half_word(&mut self, address: u32, sequential: bool) -> (u16, u32) {
        let address = address & !0b1;
        let wait = Self::wait_states(address, TransferWidth::HalfWord, sequential);
        let value = u16::from_le_bytes([
            self.read_at(address),
            self.read_at(address.wrapping_add(1)),
        ]);
        (value, wait)
    }

    fn read_word(&mut self, address: u32, sequential: bool) -> (u32, u32) {
        let wait = Self::wait_states(address, TransferWidth::Word, sequential);
        (self.read_word_at(address), wait)
    }

    fn write_byte(&mut self, address: u32, value: u8, sequential: bool) -> u32 {
        self.write_at(address, value);
        Self::wait_states(address, TransferWidth::Byte, sequential)
    }

    fn write_half_word(&mut self, address: u32, value: u16, sequential: bool) -> u32 {
        let address = address & !0b1;
        for (address, byte) in (address..).zip(value.to_le_bytes()) {
            self.write_at(address, byte);
        }
        Self::wait_states(address, TransferWidth::HalfWord, sequential)
    }

    fn write_word(&mut self, address: u32, value: u32, sequential: bool) -> u32 {
        let address = address & !0b11;
        for (address, byte) in (address..).zip(value.to_le_bytes()) {
            self.write_at(address, byte);
        }
        Self::wait_states(address, TransferWidth::Word, sequential)
    }
}
