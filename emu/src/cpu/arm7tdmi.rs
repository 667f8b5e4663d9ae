//! # Clock driver
//!
//! [`Arm7tdmi`] owns a [`Processor`] and the [`Bus`] it talks to, and ties
//! them together once per master clock:
//!
//! 1. while wait states are pending, the clock only burns one of them;
//! 2. the transaction latched on [`BusLines`] during the previous clock is
//!    realised and its data latched back onto the lines;
//! 3. a realised opcode fetch shifts the pipeline and asserts the next fetch;
//! 4. the armed sequencer continuation runs and may override those lines.
//!
//! A [`CpuFault`] halts the core: every later [`Arm7tdmi::clock`] returns
//! it again until [`Arm7tdmi::reset`].

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::bus::{Bus, BusLines, TransferWidth};
use crate::cpu::config::CpuConfig;
use crate::cpu::fault::CpuFault;
use crate::cpu::pipeline::{Pipeline, PipelineEntry};
use crate::cpu::processor::Processor;
use crate::cpu::psr::Psr;
use crate::cpu::registers::Registers;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arm7tdmi<B: Bus> {
    processor: Processor,
    bus: B,
    wait_states: u32,
    cycles: u64,
    fault: Option<CpuFault>,
}

impl<B: Bus> Arm7tdmi<B> {
    pub fn new(bus: B, start_vector: u32) -> Self {
        Self::with_config(bus, CpuConfig::default(), start_vector)
    }

    pub fn with_config(bus: B, config: CpuConfig, start_vector: u32) -> Self {
        Self {
            processor: Processor::new(config, start_vector),
            bus,
            wait_states: 0,
            cycles: 0,
            fault: None,
        }
    }

    /// Back to power-on state with the first fetch asserted at
    /// `start_vector`. The bus is left untouched.
    pub fn reset(&mut self, start_vector: u32) {
        self.processor.reset(start_vector);
        self.wait_states = 0;
        self.cycles = 0;
        self.fault = None;
    }

    /// Advances exactly one master clock.
    ///
    /// # Errors
    ///
    /// Returns the fault that halted the core, on the clock it happens and
    /// on every clock after it.
    pub fn clock(&mut self) -> Result<(), CpuFault> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }

        self.cycles += 1;

        if self.wait_states > 0 {
            self.wait_states -= 1;
            return Ok(());
        }

        if let Some(entry) = self.step_memory() {
            self.processor.step_pipeline(entry);
        }

        self.processor.step_sequencer().inspect_err(|&fault| {
            error!("core halted after {} cycles: {fault}", self.cycles);
            self.fault = Some(fault);
        })
    }

    /// Clocks the core `cycles` times.
    ///
    /// # Errors
    ///
    /// Stops at the first fault and returns it.
    pub fn run(&mut self, cycles: u64) -> Result<(), CpuFault> {
        for _ in 0..cycles {
            self.clock()?;
        }
        Ok(())
    }

    /// Realises the latched transaction, if any. Returns the fetched opcode
    /// when it was an opcode fetch.
    #[allow(clippy::cast_possible_truncation)]
    fn step_memory(&mut self) -> Option<PipelineEntry> {
        let lines = &mut self.processor.lines;
        if !lines.memory_request {
            return None;
        }
        lines.memory_request = false;

        let BusLines {
            address,
            data,
            width,
            sequential,
            ..
        } = *lines;

        if lines.write {
            self.wait_states = match width {
                TransferWidth::Byte => self.bus.write_byte(address, data as u8, sequential),
                TransferWidth::HalfWord => {
                    self.bus.write_half_word(address, data as u16, sequential)
                }
                TransferWidth::Word => self.bus.write_word(address, data, sequential),
            };
            return None;
        }

        let (value, wait_states) = match width {
            TransferWidth::Byte => {
                let (value, wait) = self.bus.read_byte(address, sequential);
                (u32::from(value), wait)
            }
            TransferWidth::HalfWord => {
                let (value, wait) = self.bus.read_half_word(address, sequential);
                (u32::from(value), wait)
            }
            TransferWidth::Word => self.bus.read_word(address, sequential),
        };
        lines.data = value;
        self.wait_states = wait_states;

        lines.opcode_fetch.then_some(PipelineEntry {
            opcode: value,
            address,
        })
    }

    /// Level of the nIRQ input, sampled when an instruction starts.
    pub const fn set_irq_line(&mut self, asserted: bool) {
        self.processor.set_irq_line(asserted);
    }

    /// Level of the nFIQ input, sampled when an instruction starts.
    pub const fn set_fiq_line(&mut self, asserted: bool) {
        self.processor.set_fiq_line(asserted);
    }

    #[must_use]
    pub const fn bus(&self) -> &B {
        &self.bus
    }

    pub const fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Snapshot of everything but the bus, for save states.
    #[must_use]
    pub const fn processor(&self) -> &Processor {
        &self.processor
    }

    /// Swaps in a saved processor. Pending wait states and any fault are
    /// dropped; the cycle counter keeps going.
    pub fn restore(&mut self, processor: Processor) {
        self.processor = processor;
        self.wait_states = 0;
        self.fault = None;
    }

    #[must_use]
    pub const fn registers(&self) -> &Registers {
        self.processor.registers()
    }

    #[must_use]
    pub const fn cpsr(&self) -> Psr {
        self.processor.cpsr()
    }

    #[must_use]
    pub fn spsr(&self) -> Option<Psr> {
        self.processor.spsr()
    }

    #[must_use]
    pub const fn lines(&self) -> &BusLines {
        self.processor.lines()
    }

    #[must_use]
    pub const fn pipeline(&self) -> &Pipeline {
        self.processor.pipeline()
    }

    #[must_use]
    pub const fn wait_states(&self) -> u32 {
        self.wait_states
    }

    /// Clocks since the last reset, wait states included.
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    #[must_use]
    pub const fn fault(&self) -> Option<CpuFault> {
        self.fault
    }

    /// See [`Processor::next_instruction_address`].
    #[must_use]
    pub fn next_instruction_address(&self) -> Option<u32> {
        self.processor.next_instruction_address()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::config::UndefinedPolicy;
    use crate::cpu::cpu_modes::Mode;
    use crate::cpu::psr::CpuState;
    use crate::cpu::registers::{REG_LR, REG_PROGRAM_COUNTER};
    use crate::cpu::sequencer::Sequencer;
    use crate::memory::InternalMemory;
    use pretty_assertions::assert_eq;

    const PROGRAM: u32 = 0x0300_0000;
    const DATA: u32 = 0x0300_1000;

    /// Two fetches before the first instruction reaches execute.
    const PIPELINE_FILL: u64 = 2;

    fn core_with(program: &[u32], config: CpuConfig) -> Arm7tdmi<InternalMemory> {
        let mut memory = InternalMemory::default();
        let bytes: Vec<u8> = program.iter().flat_map(|word| word.to_le_bytes()).collect();
        memory.load(PROGRAM, &bytes);
        Arm7tdmi::with_config(memory, config, PROGRAM)
    }

    fn core(program: &[u32]) -> Arm7tdmi<InternalMemory> {
        core_with(program, CpuConfig::default())
    }

    fn set_register(cpu: &mut Arm7tdmi<InternalMemory>, reg: usize, value: u32) {
        cpu.processor.registers.set_register_at(reg, value);
    }

    fn register(cpu: &Arm7tdmi<InternalMemory>, reg: usize) -> u32 {
        cpu.registers().register_at(reg)
    }

    #[test]
    fn reset_asserts_the_first_fetch() {
        let cpu = core(&[]);
        assert_eq!(cpu.cpsr().mode(), Mode::System);
        assert_eq!(cpu.cpsr().cpu_state(), CpuState::Arm);
        assert_eq!(register(&cpu, REG_PROGRAM_COUNTER), PROGRAM);
        assert_eq!(cpu.lines().address, PROGRAM);
        assert!(cpu.lines().memory_request);
        assert!(cpu.lines().opcode_fetch);
        assert!(!cpu.lines().sequential);

        let cpu = Arm7tdmi::new(InternalMemory::default(), 0);
        assert_eq!(cpu.cpsr().mode(), Mode::Supervisor);
        assert!(cpu.cpsr().irq_disable());
        assert!(cpu.cpsr().fiq_disable());
        assert_eq!(cpu.registers().register_at(13), 0x0300_7FE0);
    }

    #[test]
    fn pipeline_fill_then_execute() {
        // MOV R0, #1
        let mut cpu = core(&[0xE3A0_0001, 0xE1A0_0000, 0xE1A0_0000]);

        cpu.clock().unwrap();
        assert_eq!(cpu.pipeline().fetched().map(|e| e.address), Some(PROGRAM));
        assert!(cpu.lines().sequential);

        cpu.clock().unwrap();
        assert_eq!(cpu.next_instruction_address(), Some(PROGRAM));
        assert_eq!(register(&cpu, 0), 0);

        cpu.clock().unwrap();
        assert_eq!(register(&cpu, 0), 1);
        assert_eq!(register(&cpu, REG_PROGRAM_COUNTER), PROGRAM + 8);
        assert_eq!(cpu.cycles(), 3);
    }

    #[test]
    fn word_load_with_register_offset() {
        // LDR R2, [R0, R1]
        let mut cpu = core(&[0xE790_2001]);
        cpu.bus_mut().load(DATA + 4, &0xBEEF_FEED_u32.to_le_bytes());
        set_register(&mut cpu, 0, DATA);
        set_register(&mut cpu, 1, 4);
        cpu.run(PIPELINE_FILL).unwrap();

        cpu.clock().unwrap();
        assert_eq!(cpu.lines().address, DATA + 4);
        assert!(cpu.lines().memory_request);
        assert!(!cpu.lines().opcode_fetch);
        assert!(!cpu.lines().sequential);

        cpu.clock().unwrap();
        assert!(!cpu.lines().memory_request);
        assert_eq!(register(&cpu, 2), 0);

        cpu.clock().unwrap();
        assert_eq!(register(&cpu, 2), 0xBEEF_FEED);
        assert!(cpu.lines().opcode_fetch);
        assert_eq!(cpu.lines().address, PROGRAM + 12);
        assert_eq!(cpu.cycles(), PIPELINE_FILL + 3);
        assert!(matches!(cpu.processor().sequencer(), Sequencer::BeginInstruction));
    }

    #[test]
    fn swap_returns_the_old_value() {
        // SWP R1, R2, [R0]
        let mut cpu = core(&[0xE100_1092]);
        cpu.bus_mut().load(DATA, &0xABCD_EFFF_u32.to_le_bytes());
        set_register(&mut cpu, 0, DATA);
        set_register(&mut cpu, 2, 0x1234_5678);
        cpu.run(PIPELINE_FILL).unwrap();

        cpu.run(3).unwrap();
        assert_eq!(register(&cpu, 1), 0);
        assert_eq!(cpu.bus().read_word_at(DATA), 0x1234_5678);

        cpu.clock().unwrap();
        assert_eq!(register(&cpu, 1), 0xABCD_EFFF);
        assert!(cpu.lines().opcode_fetch);
    }

    #[test]
    fn store_multiple_walks_up_with_writeback() {
        // STMIA R0!, {R1-R7}
        let mut cpu = core(&[0xE8A0_00FE]);
        set_register(&mut cpu, 0, DATA);
        for reg in 1..=7 {
            set_register(&mut cpu, reg, reg as u32);
        }
        cpu.run(PIPELINE_FILL).unwrap();

        for n in 0..7 {
            cpu.clock().unwrap();
            assert_eq!(cpu.lines().address, DATA + 4 * n);
            assert!(cpu.lines().write);
            assert_eq!(cpu.lines().sequential, n > 0);
        }

        cpu.clock().unwrap();
        assert!(cpu.lines().opcode_fetch);
        assert!(!cpu.lines().sequential);
        assert_eq!(register(&cpu, 0), DATA + 0x1C);
        for n in 0..7 {
            assert_eq!(cpu.bus().read_word_at(DATA + 4 * n), n + 1);
        }
    }

    #[test]
    fn load_multiple_commits_one_cycle_late() {
        // LDMIA R0, {R1, R2}
        let mut cpu = core(&[0xE890_0006]);
        cpu.bus_mut().load(DATA, &[0x11, 0, 0, 0, 0x22, 0, 0, 0]);
        set_register(&mut cpu, 0, DATA);
        cpu.run(PIPELINE_FILL).unwrap();

        cpu.clock().unwrap();
        assert_eq!(cpu.lines().address, DATA);

        cpu.clock().unwrap();
        assert_eq!(cpu.lines().address, DATA + 4);
        assert_eq!(register(&cpu, 1), 0);

        cpu.clock().unwrap();
        assert!(!cpu.lines().memory_request);
        assert_eq!(register(&cpu, 1), 0x11);
        assert_eq!(register(&cpu, 2), 0);

        cpu.clock().unwrap();
        assert_eq!(register(&cpu, 2), 0x22);
        assert!(cpu.lines().opcode_fetch);
    }

    /// Lands the pipeline on the fifth word, which holds MOV R2, #3.
    const TARGET: u32 = PROGRAM + 0x10;

    fn program_with_target(first: u32) -> Vec<u32> {
        // MOV R1, #1 three times, then MOV R2, #3
        vec![first, 0xE3A0_1001, 0xE3A0_1001, 0xE3A0_1001, 0xE3A0_2003]
    }

    #[test]
    fn load_into_program_counter_refills_the_pipeline() {
        // LDR PC, [R0]
        let mut cpu = core(&program_with_target(0xE590_F000));
        cpu.bus_mut().load(DATA, &TARGET.to_le_bytes());
        set_register(&mut cpu, 0, DATA);
        cpu.run(PIPELINE_FILL + 3).unwrap();

        assert_eq!(register(&cpu, REG_PROGRAM_COUNTER), TARGET);
        assert_eq!(cpu.lines().address, TARGET);
        assert!(cpu.lines().opcode_fetch);
        assert!(!cpu.lines().sequential);
        assert_eq!(cpu.pipeline().fetched(), None);
        assert_eq!(cpu.cycles(), PIPELINE_FILL + 3);

        cpu.run(2).unwrap();
        assert_eq!(cpu.next_instruction_address(), Some(TARGET));
        assert_eq!(register(&cpu, 2), 0);

        cpu.clock().unwrap();
        assert_eq!(register(&cpu, 2), 3);
        assert_eq!(register(&cpu, 1), 0);
        assert_eq!(cpu.cycles(), PIPELINE_FILL + 3 + 3);
    }

    #[test]
    fn load_multiple_with_program_counter_restores_cpsr() {
        // LDMIA R0, {R1, PC}^
        let mut cpu = core(&program_with_target(0xE8D0_8002));
        let mut bytes = 0x55_u32.to_le_bytes().to_vec();
        bytes.extend(TARGET.to_le_bytes());
        cpu.bus_mut().load(DATA, &bytes);

        cpu.processor.switch_mode(Mode::Irq);
        let mut saved = Psr::from(Mode::System);
        saved.set_zero_flag(true);
        assert!(cpu.processor.register_bank.set_spsr(Mode::Irq, saved));
        set_register(&mut cpu, 0, DATA);
        cpu.run(PIPELINE_FILL).unwrap();

        cpu.clock().unwrap();
        assert_eq!(cpu.lines().address, DATA);
        cpu.clock().unwrap();
        assert_eq!(cpu.lines().address, DATA + 4);
        assert!(cpu.lines().sequential);
        cpu.clock().unwrap();
        assert!(!cpu.lines().memory_request);
        assert_eq!(register(&cpu, 1), 0x55);
        assert_eq!(cpu.cpsr().mode(), Mode::Irq);

        cpu.clock().unwrap();
        assert_eq!(cpu.cpsr().mode(), Mode::System);
        assert!(cpu.cpsr().zero_flag());
        assert_eq!(cpu.spsr(), None);
        assert_eq!(register(&cpu, REG_PROGRAM_COUNTER), TARGET);
        assert_eq!(cpu.lines().address, TARGET);
        assert!(cpu.lines().opcode_fetch);
        assert!(!cpu.lines().sequential);
        assert_eq!(cpu.pipeline().fetched(), None);

        cpu.run(3).unwrap();
        assert_eq!(register(&cpu, 2), 3);
        assert_eq!(register(&cpu, 1), 0x55);
        assert_eq!(cpu.cycles(), PIPELINE_FILL + 4 + 3);
    }

    #[test]
    fn empty_register_list_loads_program_counter() {
        // LDMIA R0!, {}
        let mut cpu = core(&program_with_target(0xE8B0_0000));
        cpu.bus_mut().load(DATA, &TARGET.to_le_bytes());
        set_register(&mut cpu, 0, DATA);
        cpu.run(PIPELINE_FILL + 1).unwrap();
        assert_eq!(cpu.lines().address, DATA);

        cpu.clock().unwrap();
        assert_eq!(register(&cpu, 0), DATA + 0x40);
        assert!(!cpu.lines().memory_request);

        cpu.clock().unwrap();
        assert_eq!(register(&cpu, REG_PROGRAM_COUNTER), TARGET);
        assert_eq!(cpu.lines().address, TARGET);
        assert!(cpu.lines().opcode_fetch);

        cpu.run(3).unwrap();
        assert_eq!(register(&cpu, 2), 3);
        assert_eq!(cpu.cycles(), PIPELINE_FILL + 3 + 3);
    }

    #[test]
    fn empty_register_list_stores_program_counter() {
        // STMIA R0!, {}
        let mut cpu = core(&[0xE8A0_0000]);
        set_register(&mut cpu, 0, DATA);
        cpu.run(PIPELINE_FILL + 1).unwrap();
        assert_eq!(cpu.lines().address, DATA);
        assert!(cpu.lines().write);

        cpu.clock().unwrap();
        assert_eq!(cpu.bus().read_word_at(DATA), PROGRAM + 12);
        assert_eq!(cpu.bus().read_word_at(DATA + 4), 0);
        assert_eq!(register(&cpu, 0), DATA + 0x40);
        assert!(cpu.lines().opcode_fetch);
        assert_eq!(cpu.lines().address, PROGRAM + 12);
        assert_eq!(cpu.cycles(), PIPELINE_FILL + 2);
    }

    #[test]
    fn store_multiple_of_the_base_register() {
        // STMIA R0!, {R0, R1}: the base goes out first, unchanged
        let mut cpu = core(&[0xE8A0_0003]);
        set_register(&mut cpu, 0, DATA);
        set_register(&mut cpu, 1, 0x11);
        cpu.run(PIPELINE_FILL + 3).unwrap();
        assert_eq!(cpu.bus().read_word_at(DATA), DATA);
        assert_eq!(cpu.bus().read_word_at(DATA + 4), 0x11);
        assert_eq!(register(&cpu, 0), DATA + 8);
        assert!(cpu.lines().opcode_fetch);
        assert_eq!(cpu.lines().address, PROGRAM + 12);

        // STMIA R1!, {R0, R1}: the base goes out second, written back
        let mut cpu = core(&[0xE8A1_0003]);
        set_register(&mut cpu, 0, 0x22);
        set_register(&mut cpu, 1, DATA);
        cpu.run(PIPELINE_FILL + 3).unwrap();
        assert_eq!(cpu.bus().read_word_at(DATA), 0x22);
        assert_eq!(cpu.bus().read_word_at(DATA + 4), DATA + 8);
        assert_eq!(register(&cpu, 1), DATA + 8);
        assert!(cpu.lines().opcode_fetch);
        assert_eq!(cpu.lines().address, PROGRAM + 12);
    }

    #[test]
    fn load_multiple_of_the_base_register_overrides_writeback() {
        // LDMIA R0!, {R0, R1}
        let mut cpu = core(&[0xE8B0_0003]);
        cpu.bus_mut().load(DATA, &[0xAA, 0, 0, 0, 0xBB, 0, 0, 0]);
        set_register(&mut cpu, 0, DATA);
        cpu.run(PIPELINE_FILL + 2).unwrap();
        assert_eq!(register(&cpu, 0), DATA + 8);
        assert_eq!(cpu.lines().address, DATA + 4);

        cpu.clock().unwrap();
        assert_eq!(register(&cpu, 0), 0xAA);
        assert_eq!(register(&cpu, 1), 0);

        cpu.clock().unwrap();
        assert_eq!(register(&cpu, 0), 0xAA);
        assert_eq!(register(&cpu, 1), 0xBB);
        assert!(cpu.lines().opcode_fetch);
        assert_eq!(cpu.lines().address, PROGRAM + 12);
        assert_eq!(cpu.cycles(), PIPELINE_FILL + 4);
    }

    #[test]
    fn branch_flushes_and_refills() {
        // B to the fourth word
        let mut cpu = core(&[
            0xEA00_0001,
            0xE3A0_0001,
            0xE3A0_0002,
            // MOV R1, #3
            0xE3A0_1003,
        ]);
        cpu.run(PIPELINE_FILL + 1).unwrap();
        assert_eq!(register(&cpu, REG_PROGRAM_COUNTER), PROGRAM + 12);
        assert!(cpu.pipeline().decoded().is_none());
        assert!(!cpu.lines().sequential);

        cpu.run(2).unwrap();
        assert_eq!(register(&cpu, 1), 0);
        cpu.clock().unwrap();
        assert_eq!(register(&cpu, 1), 3);
        assert_eq!(register(&cpu, 0), 0);
    }

    #[test]
    fn branch_and_exchange_into_thumb() {
        // BX R0, then MOV R1, #42 in THUMB
        let mut cpu = core(&[0xE12F_FF10, 0x0000_212A]);
        set_register(&mut cpu, 0, (PROGRAM + 4) | 1);
        cpu.run(PIPELINE_FILL + 1).unwrap();
        assert_eq!(cpu.cpsr().cpu_state(), CpuState::Thumb);
        assert_eq!(cpu.lines().width, TransferWidth::HalfWord);
        assert_eq!(cpu.lines().address, PROGRAM + 4);

        cpu.run(3).unwrap();
        assert_eq!(register(&cpu, 1), 42);
        assert_eq!(register(&cpu, REG_PROGRAM_COUNTER), PROGRAM + 8);
    }

    #[test]
    fn wait_states_stall_the_core() {
        // LDR R2, [R0, R1] from on-board WRAM
        let mut cpu = core(&[0xE790_2001]);
        cpu.bus_mut().load(0x0200_0000, &0xCAFE_u32.to_le_bytes());
        set_register(&mut cpu, 0, 0x0200_0000);
        cpu.run(PIPELINE_FILL + 2).unwrap();
        assert_eq!(cpu.wait_states(), 5);

        cpu.run(5).unwrap();
        assert_eq!(cpu.wait_states(), 0);
        assert_eq!(register(&cpu, 2), 0);

        cpu.clock().unwrap();
        assert_eq!(register(&cpu, 2), 0xCAFE);
        assert_eq!(cpu.cycles(), PIPELINE_FILL + 3 + 5);
    }

    #[test]
    fn faults_halt_until_reset() {
        let config = CpuConfig {
            undefined_instruction: UndefinedPolicy::Fault,
            ..CpuConfig::default()
        };
        let mut cpu = core_with(&[0xE7F0_00F0], config);
        cpu.run(PIPELINE_FILL).unwrap();

        let expected = CpuFault::UndefinedInstruction {
            state: CpuState::Arm,
            opcode: 0xE7F0_00F0,
            address: PROGRAM,
        };
        assert_eq!(cpu.clock(), Err(expected));
        assert_eq!(cpu.clock(), Err(expected));
        assert_eq!(cpu.run(10), Err(expected));
        assert_eq!(cpu.cycles(), PIPELINE_FILL + 1);
        assert_eq!(cpu.fault(), Some(expected));

        cpu.reset(PROGRAM);
        assert_eq!(cpu.fault(), None);
        assert_eq!(cpu.run(PIPELINE_FILL), Ok(()));
    }

    #[test]
    fn undefined_instruction_traps_by_default() {
        let mut cpu = core(&[0xE7F0_00F0]);
        cpu.run(PIPELINE_FILL + 1).unwrap();
        assert_eq!(cpu.cpsr().mode(), Mode::Undefined);
        assert_eq!(register(&cpu, REG_LR), PROGRAM + 4);
        assert_eq!(register(&cpu, REG_PROGRAM_COUNTER), 0x04);
    }

    #[test]
    fn irq_replaces_the_next_instruction() {
        let mut cpu = core(&[0xE3A0_0001]);
        cpu.set_irq_line(true);
        cpu.run(PIPELINE_FILL + 1).unwrap();

        assert_eq!(register(&cpu, 0), 0);
        assert_eq!(cpu.cpsr().mode(), Mode::Irq);
        assert!(cpu.cpsr().irq_disable());
        assert_eq!(register(&cpu, REG_LR), PROGRAM + 4);
        assert_eq!(register(&cpu, REG_PROGRAM_COUNTER), 0x18);
        assert_eq!(cpu.spsr().map(Psr::mode), Some(Mode::System));
    }

    #[test]
    fn masked_irq_is_ignored() {
        let mut cpu = Arm7tdmi::new(InternalMemory::default(), 0);
        cpu.set_irq_line(true);
        cpu.run(PIPELINE_FILL + 1).unwrap();
        assert_eq!(cpu.cpsr().mode(), Mode::Supervisor);
    }

    #[test]
    fn reset_is_idempotent() {
        // LDR R2, [R0, R1], interrupted half way
        let mut cpu = core(&[0xE790_2001]);
        set_register(&mut cpu, 0, DATA);
        cpu.set_irq_line(true);
        cpu.run(PIPELINE_FILL + 2).unwrap();

        cpu.reset(PROGRAM);
        let fresh = core(&[]);
        assert_eq!(cpu.processor(), fresh.processor());
        assert_eq!(cpu.cycles(), 0);
        assert_eq!(cpu.wait_states(), 0);

        cpu.reset(PROGRAM);
        assert_eq!(cpu.processor(), fresh.processor());
    }

    #[test]
    fn save_state_round_trip() {
        // STMIA R0!, {R1-R7}, saved in the middle of the transfer
        let mut cpu = core(&[0xE8A0_00FE]);
        set_register(&mut cpu, 0, DATA);
        cpu.run(PIPELINE_FILL + 3).unwrap();

        let saved = serde_json::to_string(cpu.processor()).unwrap();
        let mut restored = core(&[0xE8A0_00FE]);
        restored.restore(serde_json::from_str(&saved).unwrap());
        assert_eq!(restored.processor(), cpu.processor());

        cpu.run(10).unwrap();
        restored.run(10).unwrap();
        assert_eq!(restored.processor(), cpu.processor());
        assert_eq!(register(&restored, 0), DATA + 0x1C);
    }
}
