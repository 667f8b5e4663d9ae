//! # Processor state
//!
//! Everything the ARM7TDMI keeps between two clock edges, without the bus.
//! Instruction handlers and sequencers only ever see a [`Processor`], so the
//! only way they can reach memory is by asserting [`BusLines`].
//!
//! Per clock, after the driver has realised the previous cycle's
//! transaction:
//!
//! 1. [`Processor::step_pipeline`] runs when an opcode fetch was realised:
//!    it shifts the pipeline, moves R15 to the fetched address and asserts
//!    the next sequential fetch.
//! 2. [`Processor::step_sequencer`] runs the armed continuation, which may
//!    override the lines asserted by step 1.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::bus::{BusLines, TransferWidth};
use crate::cpu::config::{CpuConfig, UndefinedPolicy};
use crate::cpu::cpu_modes::Mode;
use crate::cpu::exception::Exception;
use crate::cpu::fault::CpuFault;
use crate::cpu::pipeline::{Pipeline, PipelineEntry};
use crate::cpu::psr::{CpuState, Psr};
use crate::cpu::register_bank::RegisterBank;
use crate::cpu::registers::{REG_PROGRAM_COUNTER, REG_SP, Registers};
use crate::cpu::sequencer::{InternalCycles, Sequencer};
use crate::cpu::{arm, thumb};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Processor {
    pub(crate) registers: Registers,
    pub(crate) register_bank: RegisterBank,
    pub(crate) cpsr: Psr,
    pub(crate) pipeline: Pipeline,
    pub(crate) lines: BusLines,
    pub(crate) sequencer: Sequencer,
    pub(crate) config: CpuConfig,
    irq_line: bool,
    fiq_line: bool,
}

impl Processor {
    pub(crate) fn new(config: CpuConfig, start_vector: u32) -> Self {
        let mut processor = Self {
            registers: Registers::default(),
            register_bank: RegisterBank::default(),
            cpsr: Psr::default(),
            pipeline: Pipeline::default(),
            lines: BusLines::default(),
            sequencer: Sequencer::default(),
            config,
            irq_line: false,
            fiq_line: false,
        };
        processor.reset(start_vector);
        processor
    }

    /// Power-on state with the first fetch asserted at `start_vector`.
    ///
    /// Vector 0 is a hardware reset (Supervisor, interrupts masked). Any
    /// other vector follows the post-boot convention and starts in System
    /// mode with interrupts enabled.
    pub(crate) fn reset(&mut self, start_vector: u32) {
        let config = self.config;
        let mode = if start_vector == 0 {
            Mode::Supervisor
        } else {
            Mode::System
        };

        let mut register_bank = RegisterBank::default();
        let stack_pointers = config.stack_pointers;
        register_bank.set_stack_pointer(Mode::User, stack_pointers.user);
        register_bank.set_stack_pointer(Mode::Irq, stack_pointers.irq);
        register_bank.set_stack_pointer(Mode::Supervisor, stack_pointers.supervisor);

        let mut registers = Registers::default();
        registers.set_register_at(REG_SP, register_bank.stack_pointer(mode));
        registers.set_program_counter(start_vector);

        let mut cpsr = Psr::from(mode);
        if mode == Mode::Supervisor {
            cpsr.set_irq_disable(true);
            cpsr.set_fiq_disable(true);
        }

        let mut lines = BusLines::default();
        lines.request_opcode_fetch(start_vector, TransferWidth::Word, false);

        *self = Self {
            registers,
            register_bank,
            cpsr,
            pipeline: Pipeline::default(),
            lines,
            sequencer: Sequencer::BeginInstruction,
            config,
            irq_line: false,
            fiq_line: false,
        };
    }

    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.registers
    }

    #[must_use]
    pub const fn register_bank(&self) -> &RegisterBank {
        &self.register_bank
    }

    #[must_use]
    pub const fn cpsr(&self) -> Psr {
        self.cpsr
    }

    /// SPSR of the current mode, `None` in User and System.
    #[must_use]
    pub fn spsr(&self) -> Option<Psr> {
        self.register_bank.spsr(self.cpsr.mode())
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.cpsr.mode()
    }

    #[must_use]
    pub const fn lines(&self) -> &BusLines {
        &self.lines
    }

    #[must_use]
    pub const fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    #[must_use]
    pub const fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    #[must_use]
    pub const fn config(&self) -> &CpuConfig {
        &self.config
    }

    /// Address of the instruction that reaches the execute stage next.
    #[must_use]
    pub fn next_instruction_address(&self) -> Option<u32> {
        self.pipeline.decoded().map(|entry| entry.address)
    }

    pub(crate) const fn set_irq_line(&mut self, asserted: bool) {
        self.irq_line = asserted;
    }

    pub(crate) const fn set_fiq_line(&mut self, asserted: bool) {
        self.fiq_line = asserted;
    }

    pub(crate) fn step_pipeline(&mut self, entry: PipelineEntry) {
        self.pipeline.advance(entry);
        self.registers.set_program_counter(entry.address);

        let state = self.cpsr.cpu_state();
        self.lines.request_opcode_fetch(
            entry.address.wrapping_add(state.instruction_size()),
            state.fetch_width(),
            true,
        );
    }

    /// The continuation armed between instructions.
    pub(crate) fn begin_instruction(&mut self) -> Result<(), CpuFault> {
        let Some(entry) = self.pipeline.take_executing() else {
            return Ok(());
        };

        if let Some(interrupt) = self.pending_interrupt() {
            self.enter_exception(interrupt, entry.address.wrapping_add(4));
            return Ok(());
        }

        match self.cpsr.cpu_state() {
            CpuState::Arm => arm::execute(self, entry),
            CpuState::Thumb => thumb::execute(self, entry),
        }
    }

    fn pending_interrupt(&self) -> Option<Exception> {
        if self.fiq_line && !self.cpsr.fiq_disable() {
            Some(Exception::Fiq)
        } else if self.irq_line && !self.cpsr.irq_disable() {
            Some(Exception::Irq)
        } else {
            None
        }
    }

    /// Empties the pipeline and asserts a non-sequential fetch at `target`,
    /// aligned for the current state.
    pub(crate) fn flush_pipeline(&mut self, target: u32) {
        let state = self.cpsr.cpu_state();
        let target = state.align(target);
        trace!("pipeline flush to {target:#010x}");

        self.registers.set_program_counter(target);
        self.pipeline.flush();
        self.lines
            .request_opcode_fetch(target, state.fetch_width(), false);
        self.sequencer = Sequencer::BeginInstruction;
    }

    /// Re-asserts the opcode fetch after the last cycle of an instruction.
    pub(crate) fn finish_instruction(&mut self, sequential: bool) {
        let state = self.cpsr.cpu_state();
        self.lines
            .request_opcode_fetch(self.next_fetch_address(), state.fetch_width(), sequential);
        self.sequencer = Sequencer::BeginInstruction;
    }

    /// Where the next opcode fetch goes once the current instruction is done.
    pub(crate) fn next_fetch_address(&self) -> u32 {
        self.registers
            .program_counter()
            .wrapping_add(self.cpsr.cpu_state().instruction_size())
    }

    /// Spends `cycles` internal cycles after this one, then either resumes
    /// fetching or branches to `branch_target`.
    pub(crate) fn request_internal_cycles(&mut self, cycles: u8, branch_target: Option<u32>) {
        self.lines.request_internal(self.next_fetch_address());
        self.sequencer = Sequencer::Internal(InternalCycles {
            remaining: cycles,
            branch_target,
        });
    }

    /// Reads `reg` as an operand; R15 reads `pc_extra` bytes further ahead.
    pub(crate) const fn operand_register(&self, reg: usize, pc_extra: u32) -> u32 {
        let value = self.registers.register_at(reg);
        if reg == REG_PROGRAM_COUNTER {
            value.wrapping_add(pc_extra)
        } else {
            value
        }
    }

    pub(crate) fn switch_mode(&mut self, mode: Mode) {
        let current = self.cpsr.mode();
        if current != mode {
            trace!("mode switch {current} -> {mode}");
            self.register_bank
                .switch(&mut self.registers, current, mode);
        }
        self.cpsr.set_mode(mode);
    }

    /// Replaces the CPSR, banking registers if the mode changes.
    pub(crate) fn write_cpsr(&mut self, psr: Psr) {
        self.switch_mode(psr.mode());
        self.cpsr = psr;
    }

    pub(crate) fn restore_cpsr_from_spsr(&mut self) {
        match self.spsr() {
            Some(spsr) => self.write_cpsr(spsr),
            None => debug!("no SPSR to restore in {} mode", self.cpsr.mode()),
        }
    }

    pub(crate) fn read_user_register(&self, reg: usize) -> u32 {
        self.register_bank
            .user_register(&self.registers, self.cpsr.mode(), reg)
    }

    pub(crate) fn write_user_register(&mut self, reg: usize, value: u32) {
        let mode = self.cpsr.mode();
        self.register_bank
            .set_user_register(&mut self.registers, mode, reg, value);
    }

    pub(crate) fn undefined_instruction(
        &mut self,
        opcode: u32,
        address: u32,
    ) -> Result<(), CpuFault> {
        let state = self.cpsr.cpu_state();
        match self.config.undefined_instruction {
            UndefinedPolicy::Exception => {
                debug!("undefined {state} instruction {opcode:#010x} at {address:#010x}");
                self.enter_exception(
                    Exception::Undefined,
                    address.wrapping_add(state.instruction_size()),
                );
                Ok(())
            }
            UndefinedPolicy::Fault => Err(CpuFault::UndefinedInstruction {
                state,
                opcode,
                address,
            }),
        }
    }
}
