//! First cycle of every ARM instruction.
//!
//! Single-cycle instructions complete here and leave the sequential opcode
//! fetch asserted by the pipeline. Anything longer asserts its first bus
//! transaction and arms a [`Sequencer`](crate::cpu::sequencer::Sequencer).
//!
//! R15 holds the address of the last fetched opcode, which is the executing
//! address plus 8.

use tracing::{debug, warn};

use crate::bitwise::Bits;
use crate::bus::TransferWidth;
use crate::cpu::arm::ArmOpcode;
use crate::cpu::arm::alu_instruction::{AluInstructionKind, ArmModeAluInstruction};
use crate::cpu::exception::Exception;
use crate::cpu::fault::CpuFault;
use crate::cpu::flags::{Indexing, LoadStoreKind, Offsetting};
use crate::cpu::processor::Processor;
use crate::cpu::psr::{CpuState, Psr};
use crate::cpu::registers::{REG_LR, REG_PROGRAM_COUNTER};
use crate::cpu::sequencer::{BlockTransferSequence, LoadCast, MultiplyKind, MultiplyOperands};
use crate::cpu::shifter::{self, ShiftKind};

pub const SIZE_OF_INSTRUCTION: u32 = 4;

/// Operand 2 is `imm8 ROR 2*rot`.
pub const IMMEDIATE: u8 = 0;
/// Operand 2 is `Rm` shifted by a 5-bit immediate.
pub const SHIFT_BY_IMMEDIATE: u8 = 1;
/// Operand 2 is `Rm` shifted by the low byte of `Rs`, one internal cycle.
pub const SHIFT_BY_REGISTER: u8 = 2;

pub type HandlerResult = Result<(), CpuFault>;

fn shift_operand(
    kind: ShiftKind,
    amount: u32,
    value: u32,
    flags: &mut Psr,
    update_carry: bool,
) -> u32 {
    if update_carry {
        shifter::shift(kind, amount, value, flags)
    } else {
        shifter::shift_preserving(kind, amount, value, *flags)
    }
}

pub fn data_processing<const OPERAND: u8>(
    processor: &mut Processor,
    opcode: ArmOpcode,
) -> HandlerResult {
    let alu_instruction = ArmModeAluInstruction::from(opcode.get_bits(21..=24));
    let set_conditions = opcode.get_bit(20);
    let logical = alu_instruction.kind() == AluInstructionKind::Logical;
    let update_carry = logical && set_conditions;

    // Flags are computed on a copy and only kept with S.
    let mut flags = processor.cpsr;

    // With a register shift R15 is read one cycle later.
    let pc_extra = if OPERAND == SHIFT_BY_REGISTER { 4 } else { 0 };

    let op2 = match OPERAND {
        IMMEDIATE => {
            let rotation = opcode.get_bits(8..=11) * 2;
            let value = opcode.get_bits(0..=7).rotate_right(rotation);
            if rotation != 0 && update_carry {
                flags.set_carry_flag(value.get_bit(31));
            }
            value
        }
        SHIFT_BY_IMMEDIATE => {
            let kind = ShiftKind::from(opcode.get_bits(5..=6));
            let amount = opcode.get_bits(7..=11);
            let rm = processor.operand_register(opcode.rm(), 0);
            shift_operand(kind, amount, rm, &mut flags, update_carry)
        }
        _ => {
            let kind = ShiftKind::from(opcode.get_bits(5..=6));
            let amount = processor.operand_register(opcode.rs(), 0) & 0xFF;
            let rm = processor.operand_register(opcode.rm(), pc_extra);
            if shifter::register_amount_is_noop(kind, amount) {
                rm
            } else {
                shift_operand(kind, amount, rm, &mut flags, update_carry)
            }
        }
    };

    let rn = processor.operand_register(opcode.rn(), pc_extra);
    let result = alu_instruction.execute(rn, op2, &mut flags);

    let destination = opcode.rd();
    let writes_program_counter = !alu_instruction.is_test() && destination == REG_PROGRAM_COUNTER;

    if set_conditions {
        if writes_program_counter {
            processor.restore_cpsr_from_spsr();
        } else {
            processor.cpsr.set_condition_flags(flags);
        }
    }

    if !alu_instruction.is_test() && !writes_program_counter {
        processor.registers.set_register_at(destination, result);
    }

    let branch_target = writes_program_counter.then_some(result);
    if OPERAND == SHIFT_BY_REGISTER {
        processor.request_internal_cycles(1, branch_target);
    } else if let Some(target) = branch_target {
        processor.flush_pipeline(target);
    }

    Ok(())
}

pub fn mrs(processor: &mut Processor, opcode: ArmOpcode) -> HandlerResult {
    let psr = if opcode.get_bit(22) {
        processor.spsr().unwrap_or_else(|| {
            debug!("MRS from SPSR in {} mode reads the CPSR", processor.mode());
            processor.cpsr
        })
    } else {
        processor.cpsr
    };

    processor
        .registers
        .set_register_at(opcode.rd(), u32::from(psr));
    Ok(())
}

pub fn msr<const IMMEDIATE_OPERAND: bool>(
    processor: &mut Processor,
    opcode: ArmOpcode,
) -> HandlerResult {
    let operand = if IMMEDIATE_OPERAND {
        opcode
            .get_bits(0..=7)
            .rotate_right(opcode.get_bits(8..=11) * 2)
    } else {
        processor.operand_register(opcode.rm(), 0)
    };

    let mut mask = 0;
    if opcode.get_bit(16) {
        mask |= 0x0000_00FF;
    }
    if opcode.get_bit(17) {
        mask |= 0x0000_FF00;
    }
    if opcode.get_bit(18) {
        mask |= 0x00FF_0000;
    }
    if opcode.get_bit(19) {
        mask |= 0xFF00_0000;
    }

    let mode = processor.mode();
    if !mode.is_privileged() {
        mask &= 0xFF00_0000;
    }

    if opcode.get_bit(22) {
        let Some(spsr) = processor.spsr() else {
            debug!("MSR to SPSR ignored in {mode} mode");
            return Ok(());
        };
        let psr = Psr::try_from((u32::from(spsr) & !mask) | (operand & mask))?;
        processor.register_bank.set_spsr(mode, psr);
    } else {
        let current = processor.cpsr;
        let psr = Psr::try_from((u32::from(current) & !mask) | (operand & mask))?;
        if psr.state_bit() != current.state_bit() {
            warn!("MSR at {:#010x} changed the T bit", opcode.address);
        }
        processor.write_cpsr(psr);
    }

    Ok(())
}

pub fn branch_and_exchange(processor: &mut Processor, opcode: ArmOpcode) -> HandlerResult {
    let target = processor.operand_register(opcode.rm(), 0);
    processor
        .cpsr
        .set_cpu_state(CpuState::from(target.get_bit(0)));
    processor.flush_pipeline(target);
    Ok(())
}

pub fn branch<const LINK: bool>(processor: &mut Processor, opcode: ArmOpcode) -> HandlerResult {
    let offset = (opcode.get_bits(0..=23) << 2).sign_extended(26);
    let pc = processor.registers.program_counter();

    if LINK {
        processor
            .registers
            .set_register_at(REG_LR, pc.wrapping_sub(SIZE_OF_INSTRUCTION));
    }

    processor.flush_pipeline(pc.wrapping_add(offset));
    Ok(())
}

/// Base and writeback for LDR, STR and the half-word transfers.
fn transfer_address(
    processor: &Processor,
    opcode: ArmOpcode,
    offset: u32,
) -> (u32, Option<(usize, u32)>) {
    let indexing = Indexing::from(opcode.get_bit(24));
    let offsetting = Offsetting::from(opcode.get_bit(23));
    let write_back = opcode.get_bit(21);

    let base = processor.operand_register(opcode.rn(), 0);
    let offset_base = offsetting.apply(base, offset);

    match indexing {
        Indexing::Pre => (offset_base, write_back.then_some((opcode.rn(), offset_base))),
        Indexing::Post => (base, Some((opcode.rn(), offset_base))),
    }
}

pub fn single_data_transfer<const REGISTER_OFFSET: bool>(
    processor: &mut Processor,
    opcode: ArmOpcode,
) -> HandlerResult {
    let offset = if REGISTER_OFFSET {
        let kind = ShiftKind::from(opcode.get_bits(5..=6));
        let amount = opcode.get_bits(7..=11);
        let rm = processor.operand_register(opcode.rm(), 0);
        shifter::shift_preserving(kind, amount, rm, processor.cpsr)
    } else {
        opcode.get_bits(0..=11)
    };

    if !opcode.get_bit(24) && opcode.get_bit(21) {
        debug!("{opcode}: user mode translation has no effect");
    }

    let (address, writeback) = transfer_address(processor, opcode, offset);
    let byte = opcode.get_bit(22);

    match LoadStoreKind::from(opcode.get_bit(20)) {
        LoadStoreKind::Load => {
            let cast = if byte {
                LoadCast::UnsignedByte
            } else {
                LoadCast::Word
            };
            processor.start_load(address, cast, opcode.rd(), writeback);
        }
        LoadStoreKind::Store => {
            let width = if byte {
                TransferWidth::Byte
            } else {
                TransferWidth::Word
            };
            let value = processor.operand_register(opcode.rd(), 4);
            processor.start_store(address, width, value, writeback);
        }
    }

    Ok(())
}

pub fn halfword_data_transfer<const IMMEDIATE_OFFSET: bool>(
    processor: &mut Processor,
    opcode: ArmOpcode,
) -> HandlerResult {
    let offset = if IMMEDIATE_OFFSET {
        (opcode.get_bits(8..=11) << 4) | opcode.get_bits(0..=3)
    } else {
        processor.operand_register(opcode.rm(), 0)
    };

    let (address, writeback) = transfer_address(processor, opcode, offset);

    match (LoadStoreKind::from(opcode.get_bit(20)), opcode.get_bits(5..=6)) {
        (LoadStoreKind::Load, sh @ 1..=3) => {
            let cast = match sh {
                1 => LoadCast::UnsignedHalfWord,
                2 => LoadCast::SignedByte,
                _ => LoadCast::SignedHalfWord,
            };
            processor.start_load(address, cast, opcode.rd(), writeback);
        }
        (LoadStoreKind::Store, 1) => {
            let value = processor.operand_register(opcode.rd(), 4);
            processor.start_store(address, TransferWidth::HalfWord, value, writeback);
        }
        _ => return processor.undefined_instruction(opcode.raw, opcode.address),
    }

    Ok(())
}

pub fn swap(processor: &mut Processor, opcode: ArmOpcode) -> HandlerResult {
    let cast = if opcode.get_bit(22) {
        LoadCast::UnsignedByte
    } else {
        LoadCast::Word
    };
    let address = processor.operand_register(opcode.rn(), 0);
    let source = processor.operand_register(opcode.rm(), 0);

    processor.start_swap(address, cast, source, opcode.rd());
    Ok(())
}

pub fn multiply(processor: &mut Processor, opcode: ArmOpcode) -> HandlerResult {
    let kind = if opcode.get_bit(21) {
        MultiplyKind::Mla
    } else {
        MultiplyKind::Mul
    };

    // Rd and Rn swap places compared to data processing.
    let destination = opcode.get_bits(16..=19) as usize;
    let accumulate = processor.operand_register(opcode.get_bits(12..=15) as usize, 0);

    let operands = MultiplyOperands {
        multiplicand: processor.operand_register(opcode.rm(), 0),
        multiplier: processor.operand_register(opcode.rs(), 0),
        accumulate: u64::from(accumulate),
    };

    processor.start_multiply(kind, operands, destination, destination, opcode.get_bit(20));
    Ok(())
}

pub fn multiply_long(processor: &mut Processor, opcode: ArmOpcode) -> HandlerResult {
    let kind = match (opcode.get_bit(22), opcode.get_bit(21)) {
        (false, false) => MultiplyKind::Umull,
        (false, true) => MultiplyKind::Umlal,
        (true, false) => MultiplyKind::Smull,
        (true, true) => MultiplyKind::Smlal,
    };

    let destination_high = opcode.get_bits(16..=19) as usize;
    let destination_low = opcode.get_bits(12..=15) as usize;
    let accumulate = (u64::from(processor.registers.register_at(destination_high)) << 32)
        | u64::from(processor.registers.register_at(destination_low));

    let operands = MultiplyOperands {
        multiplicand: processor.operand_register(opcode.rm(), 0),
        multiplier: processor.operand_register(opcode.rs(), 0),
        accumulate,
    };

    processor.start_multiply(
        kind,
        operands,
        destination_low,
        destination_high,
        opcode.get_bit(20),
    );
    Ok(())
}

pub fn block_data_transfer(processor: &mut Processor, opcode: ArmOpcode) -> HandlerResult {
    let base = opcode.rn();
    let sequence = BlockTransferSequence::new(
        LoadStoreKind::from(opcode.get_bit(20)),
        opcode.get_bits(0..=15) as u16,
        base,
        processor.operand_register(base, 0),
        Indexing::from(opcode.get_bit(24)),
        Offsetting::from(opcode.get_bit(23)),
        opcode.get_bit(21),
        opcode.get_bit(22),
    );

    processor.start_block_transfer(sequence);
    Ok(())
}

pub fn software_interrupt(processor: &mut Processor, opcode: ArmOpcode) -> HandlerResult {
    debug!("SWI {:#08x} at {:#010x}", opcode.get_bits(0..=23), opcode.address);
    processor.enter_exception(
        Exception::SoftwareInterrupt,
        opcode.address.wrapping_add(SIZE_OF_INSTRUCTION),
    );
    Ok(())
}

/// No coprocessor is attached: the instruction takes one cycle and does nothing.
pub fn coprocessor(_processor: &mut Processor, opcode: ArmOpcode) -> HandlerResult {
    debug!("{opcode}: coprocessor instruction ignored");
    Ok(())
}

pub fn undefined(processor: &mut Processor, opcode: ArmOpcode) -> HandlerResult {
    processor.undefined_instruction(opcode.raw, opcode.address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::config::CpuConfig;
    use crate::cpu::cpu_modes::Mode;
    use crate::cpu::sequencer::Sequencer;
    use pretty_assertions::assert_eq;

    const ADDRESS: u32 = 0x0300_0000;

    /// A processor with R15 where it is while `ADDRESS` executes.
    fn setup() -> Processor {
        let mut processor = Processor::new(CpuConfig::default(), ADDRESS);
        processor
            .registers
            .set_program_counter(ADDRESS + 2 * SIZE_OF_INSTRUCTION);
        processor
    }

    fn run(processor: &mut Processor, raw: u32) -> HandlerResult {
        let opcode = ArmOpcode {
            raw,
            address: ADDRESS,
        };
        crate::cpu::arm::dispatch::ARM_HANDLERS[opcode.dispatch_key()](processor, opcode)
    }

    #[test]
    fn add_immediate() {
        let mut processor = setup();
        processor.registers.set_register_at(1, 41);
        // ADD R0, R1, #1
        run(&mut processor, 0xE281_0001).unwrap();
        assert_eq!(processor.registers.register_at(0), 42);
        assert_eq!(processor.sequencer, Sequencer::BeginInstruction);
    }

    #[test]
    fn rotated_immediate_sets_carry_for_logical_ops() {
        let mut processor = setup();
        // MOVS R0, #0x80000000 (imm 2 ROR 2)
        run(&mut processor, 0xE3B0_0102).unwrap();
        assert_eq!(processor.registers.register_at(0), 0x8000_0000);
        assert!(processor.cpsr.carry_flag());
        assert!(processor.cpsr.sign_flag());
    }

    #[test]
    fn unrotated_immediate_keeps_carry() {
        let mut processor = setup();
        processor.cpsr.set_carry_flag(true);
        // MOVS R0, #0
        run(&mut processor, 0xE3B0_0000).unwrap();
        assert!(processor.cpsr.carry_flag());
        assert!(processor.cpsr.zero_flag());
    }

    #[test]
    fn flags_only_change_with_s() {
        let mut processor = setup();
        // SUB R0, R0, #1
        run(&mut processor, 0xE240_0001).unwrap();
        assert_eq!(processor.registers.register_at(0), u32::MAX);
        assert!(!processor.cpsr.sign_flag());
        assert!(!processor.cpsr.carry_flag());
    }

    #[test]
    fn compare_does_not_write_rd() {
        let mut processor = setup();
        processor.registers.set_register_at(0, 5);
        // CMP R0, #5
        run(&mut processor, 0xE350_0005).unwrap();
        assert!(processor.cpsr.zero_flag());
        assert!(processor.cpsr.carry_flag());
        assert_eq!(processor.registers.register_at(0), 5);
    }

    #[test]
    fn program_counter_operand_reads_ahead() {
        let mut processor = setup();
        // MOV R0, PC
        run(&mut processor, 0xE1A0_000F).unwrap();
        assert_eq!(processor.registers.register_at(0), ADDRESS + 8);

        processor.registers.set_register_at(1, 0);
        // MOV R0, PC, LSL R1
        run(&mut processor, 0xE1A0_011F).unwrap();
        assert_eq!(processor.registers.register_at(0), ADDRESS + 12);
    }

    #[test]
    fn register_shift_takes_an_internal_cycle() {
        let mut processor = setup();
        processor.registers.set_register_at(1, 1);
        processor.registers.set_register_at(2, 4);
        // MOV R0, R1, LSL R2
        run(&mut processor, 0xE1A0_0211).unwrap();
        assert_eq!(processor.registers.register_at(0), 16);
        assert!(!processor.lines.memory_request);
        assert!(matches!(processor.sequencer, Sequencer::Internal(_)));
    }

    #[test]
    fn register_lsr_by_zero_shifts_by_32() {
        let mut processor = setup();
        processor.registers.set_register_at(1, 0x8000_0000);
        // MOVS R0, R1, LSR R2 with R2 = 0
        run(&mut processor, 0xE1B0_0231).unwrap();
        assert_eq!(processor.registers.register_at(0), 0);
        assert!(processor.cpsr.carry_flag());
        assert!(processor.cpsr.zero_flag());
    }

    #[test]
    fn register_shift_by_zero_keeps_operand_and_carry() {
        // MOVS R0, R1, {LSL, ASR, ROR} R2 with R2 = 0
        for raw in [0xE1B0_0211, 0xE1B0_0251, 0xE1B0_0271] {
            let mut processor = setup();
            processor.cpsr.set_carry_flag(true);
            processor.registers.set_register_at(1, 0x8000_0001);
            run(&mut processor, raw).unwrap();
            assert_eq!(processor.registers.register_at(0), 0x8000_0001, "{raw:#010x}");
            assert!(processor.cpsr.carry_flag(), "{raw:#010x}");
        }
    }

    #[test]
    fn register_shift_uses_the_low_byte() {
        let mut processor = setup();
        processor.registers.set_register_at(1, 0x8000_0000);
        processor.registers.set_register_at(2, 0x100);
        // MOVS R0, R1, LSR R2: the low byte is 0
        run(&mut processor, 0xE1B0_0231).unwrap();
        assert_eq!(processor.registers.register_at(0), 0);
        assert!(processor.cpsr.carry_flag());
    }

    #[test]
    fn arithmetic_ignores_shifter_carry() {
        let mut processor = setup();
        processor.registers.set_register_at(1, 0x8000_0001);
        // ADDS R0, R2, R1, LSL #1 (shifter carry out is 1)
        run(&mut processor, 0xE092_0081).unwrap();
        assert_eq!(processor.registers.register_at(0), 2);
        assert!(!processor.cpsr.carry_flag());
    }

    #[test]
    fn movs_pc_lr_restores_cpsr() {
        let mut processor = setup();
        let mut user = Psr::from(Mode::User);
        user.set_zero_flag(true);
        processor.enter_exception(Exception::SoftwareInterrupt, 0x0800_0104);
        processor.register_bank.set_spsr(Mode::Supervisor, user);
        // MOVS PC, LR
        run(&mut processor, 0xE1B0_F00E).unwrap();

        assert_eq!(processor.mode(), Mode::User);
        assert!(processor.cpsr.zero_flag());
        assert_eq!(processor.registers.program_counter(), 0x0800_0104);
        assert!(!processor.lines.sequential);
    }

    #[test]
    fn branch_with_link() {
        let mut processor = setup();
        // BL +0x100 (offset field 0x3E: 8 + 0xF8)
        run(&mut processor, 0xEB00_003E).unwrap();
        assert_eq!(processor.registers.register_at(REG_LR), ADDRESS + 4);
        assert_eq!(processor.registers.program_counter(), ADDRESS + 0x100);
        assert!(processor.pipeline.decoded().is_none());

        let mut processor = setup();
        // B -8, onto itself
        run(&mut processor, 0xEAFF_FFFE).unwrap();
        assert_eq!(processor.registers.program_counter(), ADDRESS);
    }

    #[test]
    fn branch_and_exchange_to_thumb() {
        let mut processor = setup();
        processor.registers.set_register_at(0, 0x0300_0101);
        // BX R0
        run(&mut processor, 0xE12F_FF10).unwrap();
        assert_eq!(processor.cpsr.cpu_state(), CpuState::Thumb);
        assert_eq!(processor.registers.program_counter(), 0x0300_0100);
        assert_eq!(processor.lines.width, TransferWidth::HalfWord);
    }

    #[test]
    fn msr_in_user_mode_only_writes_flags() {
        let mut processor = setup();
        processor.write_cpsr(Psr::from(Mode::User));
        processor.registers.set_register_at(0, 0xF000_001F);
        // MSR CPSR_fc, R0
        run(&mut processor, 0xE129_F000).unwrap();
        assert_eq!(processor.mode(), Mode::User);
        assert!(processor.cpsr.sign_flag());
        assert!(processor.cpsr.overflow_flag());
    }

    #[test]
    fn msr_switches_mode_and_banks() {
        let mut processor = setup();
        // MSR CPSR_c, #0xD2 (IRQ, I and F set)
        run(&mut processor, 0xE321_F0D2).unwrap();
        assert_eq!(processor.mode(), Mode::Irq);
        assert_eq!(processor.registers.register_at(0xD), 0x0300_7FA0);
    }

    #[test]
    fn msr_with_invalid_mode_faults() {
        let mut processor = setup();
        // MSR CPSR_c, #0x00
        let fault = run(&mut processor, 0xE321_F000).unwrap_err();
        assert_eq!(fault, CpuFault::InvalidMode { bits: 0 });
    }

    #[test]
    fn spsr_transfers_in_system_mode() {
        let mut processor = setup();
        processor.registers.set_register_at(0, 0);
        // MSR SPSR_f, R0 is ignored
        run(&mut processor, 0xE168_F000).unwrap();
        // MRS R1, SPSR reads the CPSR
        run(&mut processor, 0xE14F_1000).unwrap();
        assert_eq!(processor.registers.register_at(1), u32::from(processor.cpsr));
    }

    #[test]
    fn store_program_counter_reads_twelve_ahead() {
        let mut processor = setup();
        processor.registers.set_register_at(0, 0x0300_1000);
        // STR PC, [R0]
        run(&mut processor, 0xE580_F000).unwrap();
        assert!(processor.lines.write);
        assert_eq!(processor.lines.data, ADDRESS + 12);
    }

    #[test]
    fn post_indexed_load_always_writes_back() {
        let mut processor = setup();
        processor.registers.set_register_at(1, 0x0300_1000);
        // LDR R0, [R1], #4
        run(&mut processor, 0xE491_0004).unwrap();
        assert_eq!(processor.lines.address, 0x0300_1000);
        match processor.sequencer {
            Sequencer::Load(sequence) => {
                assert_eq!(sequence.writeback, Some((1, 0x0300_1004)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn signed_halfword_load_decodes_cast() {
        let mut processor = setup();
        processor.registers.set_register_at(1, 0x0300_1000);
        // LDRSH R0, [R1, #-2]
        run(&mut processor, 0xE151_00F2).unwrap();
        assert_eq!(processor.lines.address, 0x0300_0FFE);
        assert_eq!(processor.lines.width, TransferWidth::HalfWord);
        match processor.sequencer {
            Sequencer::Load(sequence) => {
                assert_eq!(sequence.cast, LoadCast::SignedHalfWord);
                assert_eq!(sequence.writeback, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn undefined_enters_the_exception_by_default() {
        let mut processor = setup();
        // Register offset LDR with bit 4 set.
        run(&mut processor, 0xE790_0010).unwrap();
        assert_eq!(processor.mode(), Mode::Undefined);
        assert_eq!(processor.registers.register_at(REG_LR), ADDRESS + 4);
        assert_eq!(processor.registers.program_counter(), 0x04);
    }

    #[test]
    fn coprocessor_is_a_no_op() {
        let mut processor = setup();
        let before = processor.clone();
        // CDP p1, 0, c0, c0, c0
        run(&mut processor, 0xEE00_0100).unwrap();
        assert_eq!(processor, before);
    }
}
