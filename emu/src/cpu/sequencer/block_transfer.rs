//! LDM and STM, ARM and THUMB (PUSH, POP, LDMIA, STMIA).
//!
//! Registers always move in ascending order from the lowest address. The
//! base is written back on the second cycle, so a store of a base that is
//! not first in the list sees the written back value, and a load of the
//! base overwrites the written back value.
//!
//! A load value is committed one cycle after its read is realised; the
//! last one is committed during the trailing internal cycle.

use serde::{Deserialize, Serialize};

use crate::bus::TransferWidth;
use crate::cpu::flags::{Indexing, LoadStoreKind, Offsetting};
use crate::cpu::processor::Processor;
use crate::cpu::registers::REG_PROGRAM_COUNTER;
use crate::cpu::sequencer::Sequencer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTransferSequence {
    pub kind: LoadStoreKind,
    /// Registers not transferred yet, bit N for RN.
    pub registers: u16,
    /// Address of the next transfer.
    pub address: u32,
    pub base: usize,
    /// New base value, taken on the second cycle.
    pub writeback: Option<u32>,
    /// S bit without R15 loaded: transfer the User bank.
    pub user_bank: bool,
    /// S bit with R15 loaded: CPSR <- SPSR once done.
    pub restore_cpsr: bool,
    /// Register whose value is on the data lines.
    pub pending: Option<usize>,
    /// Register and value waiting to be committed.
    pub loaded: Option<(usize, u32)>,
    pub program_counter_written: bool,
}

impl BlockTransferSequence {
    /// `registers` empty transfers R15 alone over a 0x40 byte span.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        kind: LoadStoreKind,
        registers: u16,
        base: usize,
        base_value: u32,
        indexing: Indexing,
        offsetting: Offsetting,
        writeback: bool,
        psr_or_user: bool,
    ) -> Self {
        let (registers, span) = if registers == 0 {
            (1 << REG_PROGRAM_COUNTER, 0x40)
        } else {
            (registers, 4 * registers.count_ones())
        };

        let (address, final_base) = block_addresses(base_value, span, indexing, offsetting);
        let loads_program_counter =
            kind == LoadStoreKind::Load && registers & (1 << REG_PROGRAM_COUNTER) != 0;

        Self {
            kind,
            registers,
            address,
            base,
            writeback: writeback.then_some(final_base),
            user_bank: psr_or_user && !loads_program_counter,
            restore_cpsr: psr_or_user && loads_program_counter,
            pending: None,
            loaded: None,
            program_counter_written: false,
        }
    }

    fn pop_register(&mut self) -> Option<usize> {
        if self.registers == 0 {
            return None;
        }
        let register = self.registers.trailing_zeros() as usize;
        self.registers &= self.registers - 1;
        Some(register)
    }
}

/// Returns the lowest transfer address and the final base value.
#[must_use]
pub const fn block_addresses(
    base: u32,
    span: u32,
    indexing: Indexing,
    offsetting: Offsetting,
) -> (u32, u32) {
    match (offsetting, indexing) {
        (Offsetting::Up, Indexing::Post) => (base, base.wrapping_add(span)),
        (Offsetting::Up, Indexing::Pre) => (base.wrapping_add(4), base.wrapping_add(span)),
        (Offsetting::Down, Indexing::Post) => (
            base.wrapping_sub(span).wrapping_add(4),
            base.wrapping_sub(span),
        ),
        (Offsetting::Down, Indexing::Pre) => (base.wrapping_sub(span), base.wrapping_sub(span)),
    }
}

impl Processor {
    pub(crate) fn start_block_transfer(&mut self, mut sequence: BlockTransferSequence) {
        let Some(first) = sequence.pop_register() else {
            self.finish_instruction(true);
            return;
        };

        match sequence.kind {
            LoadStoreKind::Load => {
                self.lines
                    .request_read(sequence.address, TransferWidth::Word, false);
                sequence.pending = Some(first);
            }
            LoadStoreKind::Store => {
                let value = self.block_store_value(&sequence, first);
                self.lines
                    .request_write(sequence.address, TransferWidth::Word, value, false);
            }
        }

        sequence.address = sequence.address.wrapping_add(4);
        self.sequencer = Sequencer::BlockTransfer(sequence);
    }

    pub(super) fn step_block_transfer(&mut self, mut sequence: BlockTransferSequence) {
        if let Some(value) = sequence.writeback.take() {
            self.registers.set_register_at(sequence.base, value);
            sequence.program_counter_written |= sequence.base == REG_PROGRAM_COUNTER;
        }

        match sequence.kind {
            LoadStoreKind::Load => self.step_block_load(sequence),
            LoadStoreKind::Store => self.step_block_store(sequence),
        }
    }

    fn step_block_load(&mut self, mut sequence: BlockTransferSequence) {
        if let Some((register, value)) = sequence.loaded.take() {
            self.commit_block_load(&mut sequence, register, value);
        }

        if let Some(register) = sequence.pending.take() {
            sequence.loaded = Some((register, self.lines.data));

            if let Some(next) = sequence.pop_register() {
                self.lines
                    .request_read(sequence.address, TransferWidth::Word, true);
                sequence.address = sequence.address.wrapping_add(4);
                sequence.pending = Some(next);
            } else {
                self.lines.request_internal(self.next_fetch_address());
            }

            self.sequencer = Sequencer::BlockTransfer(sequence);
            return;
        }

        if sequence.restore_cpsr {
            self.restore_cpsr_from_spsr();
        }

        if sequence.program_counter_written {
            self.flush_pipeline(self.registers.program_counter());
        } else {
            self.finish_instruction(true);
        }
    }

    fn commit_block_load(
        &mut self,
        sequence: &mut BlockTransferSequence,
        register: usize,
        value: u32,
    ) {
        if sequence.user_bank {
            self.write_user_register(register, value);
        } else {
            self.registers.set_register_at(register, value);
        }
        sequence.program_counter_written |= register == REG_PROGRAM_COUNTER;
    }

    fn step_block_store(&mut self, mut sequence: BlockTransferSequence) {
        if let Some(register) = sequence.pop_register() {
            let value = self.block_store_value(&sequence, register);
            self.lines
                .request_write(sequence.address, TransferWidth::Word, value, true);
            sequence.address = sequence.address.wrapping_add(4);
            self.sequencer = Sequencer::BlockTransfer(sequence);
        } else if sequence.program_counter_written {
            self.flush_pipeline(self.registers.program_counter());
        } else {
            self.finish_instruction(false);
        }
    }

    /// R15 is stored 12 bytes past the instruction.
    fn block_store_value(&self, sequence: &BlockTransferSequence, register: usize) -> u32 {
        let value = if sequence.user_bank {
            self.read_user_register(register)
        } else {
            self.registers.register_at(register)
        };

        if register == REG_PROGRAM_COUNTER {
            value.wrapping_add(4)
        } else {
            value
        }
    }
}
