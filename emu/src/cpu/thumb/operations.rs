//! First cycle of every THUMB instruction.
//!
//! R15 holds the address of the last fetched opcode, which is the executing
//! address plus 4. Multi-cycle instructions share the ARM sequencers.

use tracing::debug;

use crate::bitwise::Bits;
use crate::cpu::alu;
use crate::cpu::condition::Condition;
use crate::cpu::exception::Exception;
use crate::cpu::fault::CpuFault;
use crate::cpu::flags::{Indexing, LoadStoreKind, Offsetting};
use crate::cpu::processor::Processor;
use crate::cpu::psr::CpuState;
use crate::cpu::registers::{REG_LR, REG_PROGRAM_COUNTER, REG_SP};
use crate::cpu::sequencer::{BlockTransferSequence, LoadCast, MultiplyKind, MultiplyOperands};
use crate::cpu::shifter::{self, ShiftKind};
use crate::cpu::thumb::ThumbOpcode;
use crate::cpu::thumb::alu_instructions::{ThumbHighRegisterOperation, ThumbModeAluInstruction};

pub const SIZE_OF_INSTRUCTION: u32 = 2;

pub type HandlerResult = Result<(), CpuFault>;

fn register(processor: &Processor, reg: usize) -> u32 {
    processor.registers.register_at(reg)
}

/// Format 1: LSL, LSR, ASR by a 5-bit immediate.
pub fn move_shifted_register(processor: &mut Processor, opcode: ThumbOpcode) -> HandlerResult {
    let kind = ShiftKind::from(opcode.immediate(11..=12));
    let amount = opcode.immediate(6..=10);
    let source = register(processor, opcode.register(3..=5));

    let result = shifter::shift(kind, amount, source, &mut processor.cpsr);
    processor.cpsr.set_sign_and_zero(result);
    processor
        .registers
        .set_register_at(opcode.register(0..=2), result);
    Ok(())
}

/// Format 2.
pub fn add_subtract(processor: &mut Processor, opcode: ThumbOpcode) -> HandlerResult {
    let immediate = opcode.get_bit(10);
    let subtract = opcode.get_bit(9);

    let op1 = register(processor, opcode.register(3..=5));
    let op2 = if immediate {
        opcode.immediate(6..=8)
    } else {
        register(processor, opcode.register(6..=8))
    };

    let result = if subtract {
        alu::sub(op1, op2, &mut processor.cpsr)
    } else {
        alu::add(op1, op2, &mut processor.cpsr)
    };
    processor
        .registers
        .set_register_at(opcode.register(0..=2), result);
    Ok(())
}

/// Format 3. MOV only sets N and Z.
pub fn move_compare_add_sub_imm(processor: &mut Processor, opcode: ThumbOpcode) -> HandlerResult {
    let destination = opcode.register(8..=10);
    let immediate = opcode.immediate(0..=7);
    let current = register(processor, destination);
    let flags = &mut processor.cpsr;

    let result = match opcode.get_bits(11..=12) {
        0 => Some(alu::mov(immediate, flags)),
        1 => {
            alu::sub(current, immediate, flags);
            None
        }
        2 => Some(alu::add(current, immediate, flags)),
        _ => Some(alu::sub(current, immediate, flags)),
    };

    if let Some(result) = result {
        processor.registers.set_register_at(destination, result);
    }
    Ok(())
}

/// Format 4. Register shifts take one internal cycle, MUL goes through the
/// multiplier.
pub fn alu_operation(processor: &mut Processor, opcode: ThumbOpcode) -> HandlerResult {
    use ThumbModeAluInstruction::{
        Adc, And, Asr, Bic, Cmn, Cmp, Eor, Lsl, Lsr, Mul, Mvn, Neg, Orr, Ror, Sbc, Tst,
    };

    let instruction = ThumbModeAluInstruction::from(opcode.get_bits(6..=9));
    let destination = opcode.register(0..=2);
    let rd = register(processor, destination);
    let rs = register(processor, opcode.register(3..=5));
    let flags = &mut processor.cpsr;

    let result = match instruction {
        And => Some(alu::and(rd, rs, flags)),
        Eor => Some(alu::eor(rd, rs, flags)),
        Lsl | Lsr | Asr | Ror => {
            let kind = match instruction {
                Lsl => ShiftKind::Lsl,
                Lsr => ShiftKind::Lsr,
                Asr => ShiftKind::Asr,
                _ => ShiftKind::Ror,
            };
            let amount = rs & 0xFF;
            let result = if shifter::register_amount_is_noop(kind, amount) {
                rd
            } else {
                shifter::shift(kind, amount, rd, flags)
            };
            flags.set_sign_and_zero(result);
            processor.registers.set_register_at(destination, result);
            processor.request_internal_cycles(1, None);
            return Ok(());
        }
        Adc => Some(alu::adc(rd, rs, flags)),
        Sbc => Some(alu::sbc(rd, rs, flags)),
        Tst => {
            alu::and(rd, rs, flags);
            None
        }
        Neg => Some(alu::sub(0, rs, flags)),
        Cmp => {
            alu::sub(rd, rs, flags);
            None
        }
        Cmn => {
            alu::add(rd, rs, flags);
            None
        }
        Orr => Some(alu::orr(rd, rs, flags)),
        Mul => {
            let operands = MultiplyOperands {
                multiplicand: rs,
                multiplier: rd,
                accumulate: 0,
            };
            processor.start_multiply(MultiplyKind::Mul, operands, destination, destination, true);
            return Ok(());
        }
        Bic => Some(alu::bic(rd, rs, flags)),
        Mvn => Some(alu::mvn(rs, flags)),
    };

    if let Some(result) = result {
        processor.registers.set_register_at(destination, result);
    }
    Ok(())
}

/// Format 5. Only CMP sets flags.
pub fn hi_register_operation(processor: &mut Processor, opcode: ThumbOpcode) -> HandlerResult {
    let operation = ThumbHighRegisterOperation::from(opcode.get_bits(8..=9));
    let destination = (usize::from(opcode.get_bit(7)) << 3) | opcode.register(0..=2);
    let source = (usize::from(opcode.get_bit(6)) << 3) | opcode.register(3..=5);

    let rd = register(processor, destination);
    let rs = register(processor, source);

    let result = match operation {
        ThumbHighRegisterOperation::Add => rd.wrapping_add(rs),
        ThumbHighRegisterOperation::Cmp => {
            alu::sub(rd, rs, &mut processor.cpsr);
            return Ok(());
        }
        ThumbHighRegisterOperation::Mov => rs,
        ThumbHighRegisterOperation::Bx => {
            processor
                .cpsr
                .set_cpu_state(CpuState::from(rs.get_bit(0)));
            processor.flush_pipeline(rs);
            return Ok(());
        }
    };

    if destination == REG_PROGRAM_COUNTER {
        processor.flush_pipeline(result);
    } else {
        processor.registers.set_register_at(destination, result);
    }
    Ok(())
}

/// Format 6: the base is R15 with bit 1 cleared.
pub fn pc_relative_load(processor: &mut Processor, opcode: ThumbOpcode) -> HandlerResult {
    let base = processor.registers.program_counter() & !0b10;
    let address = base.wrapping_add(opcode.immediate(0..=7) << 2);
    processor.start_load(address, LoadCast::Word, opcode.register(8..=10), None);
    Ok(())
}

fn load_or_store(
    processor: &mut Processor,
    kind: LoadStoreKind,
    address: u32,
    cast: LoadCast,
    reg: usize,
) {
    match kind {
        LoadStoreKind::Load => processor.start_load(address, cast, reg, None),
        LoadStoreKind::Store => {
            let value = register(processor, reg);
            processor.start_store(address, cast.width(), value, None);
        }
    }
}

/// Format 7.
pub fn load_store_register_offset(processor: &mut Processor, opcode: ThumbOpcode) -> HandlerResult {
    let kind = LoadStoreKind::from(opcode.get_bit(11));
    let cast = if opcode.get_bit(10) {
        LoadCast::UnsignedByte
    } else {
        LoadCast::Word
    };
    let address = register(processor, opcode.register(3..=5))
        .wrapping_add(register(processor, opcode.register(6..=8)));

    load_or_store(processor, kind, address, cast, opcode.register(0..=2));
    Ok(())
}

/// Format 8: STRH, LDRH, LDSB, LDSH.
pub fn load_store_sign_extended(processor: &mut Processor, opcode: ThumbOpcode) -> HandlerResult {
    let address = register(processor, opcode.register(3..=5))
        .wrapping_add(register(processor, opcode.register(6..=8)));

    let (kind, cast) = match (opcode.get_bit(10), opcode.get_bit(11)) {
        (false, false) => (LoadStoreKind::Store, LoadCast::UnsignedHalfWord),
        (false, true) => (LoadStoreKind::Load, LoadCast::UnsignedHalfWord),
        (true, false) => (LoadStoreKind::Load, LoadCast::SignedByte),
        (true, true) => (LoadStoreKind::Load, LoadCast::SignedHalfWord),
    };

    load_or_store(processor, kind, address, cast, opcode.register(0..=2));
    Ok(())
}

/// Format 9: word offsets are scaled by 4.
pub fn load_store_immediate_offset(
    processor: &mut Processor,
    opcode: ThumbOpcode,
) -> HandlerResult {
    let kind = LoadStoreKind::from(opcode.get_bit(11));
    let (cast, offset) = if opcode.get_bit(12) {
        (LoadCast::UnsignedByte, opcode.immediate(6..=10))
    } else {
        (LoadCast::Word, opcode.immediate(6..=10) << 2)
    };
    let address = register(processor, opcode.register(3..=5)).wrapping_add(offset);

    load_or_store(processor, kind, address, cast, opcode.register(0..=2));
    Ok(())
}

/// Format 10.
pub fn load_store_halfword(processor: &mut Processor, opcode: ThumbOpcode) -> HandlerResult {
    let kind = LoadStoreKind::from(opcode.get_bit(11));
    let address =
        register(processor, opcode.register(3..=5)).wrapping_add(opcode.immediate(6..=10) << 1);

    load_or_store(
        processor,
        kind,
        address,
        LoadCast::UnsignedHalfWord,
        opcode.register(0..=2),
    );
    Ok(())
}

/// Format 11.
pub fn sp_relative_load_store(processor: &mut Processor, opcode: ThumbOpcode) -> HandlerResult {
    let kind = LoadStoreKind::from(opcode.get_bit(11));
    let address = register(processor, REG_SP).wrapping_add(opcode.immediate(0..=7) << 2);

    load_or_store(processor, kind, address, LoadCast::Word, opcode.register(8..=10));
    Ok(())
}

/// Format 12: Rd = (SP or PC with bit 1 cleared) + imm8 * 4.
pub fn load_address(processor: &mut Processor, opcode: ThumbOpcode) -> HandlerResult {
    let base = if opcode.get_bit(11) {
        register(processor, REG_SP)
    } else {
        processor.registers.program_counter() & !0b10
    };

    processor.registers.set_register_at(
        opcode.register(8..=10),
        base.wrapping_add(opcode.immediate(0..=7) << 2),
    );
    Ok(())
}

/// Format 13.
pub fn add_offset_to_sp(processor: &mut Processor, opcode: ThumbOpcode) -> HandlerResult {
    let offset = opcode.immediate(0..=6) << 2;
    let sp = register(processor, REG_SP);
    let sp = if opcode.get_bit(7) {
        sp.wrapping_sub(offset)
    } else {
        sp.wrapping_add(offset)
    };

    processor.registers.set_register_at(REG_SP, sp);
    Ok(())
}

/// Format 14: PUSH is STMDB SP!, POP is LDMIA SP!. R adds LR to a push
/// and PC to a pop.
pub fn push_pop(processor: &mut Processor, opcode: ThumbOpcode) -> HandlerResult {
    let kind = LoadStoreKind::from(opcode.get_bit(11));
    let mut registers = opcode.get_bits(0..=7);

    let (indexing, offsetting) = match kind {
        LoadStoreKind::Store => {
            if opcode.get_bit(8) {
                registers |= 1 << REG_LR;
            }
            (Indexing::Pre, Offsetting::Down)
        }
        LoadStoreKind::Load => {
            if opcode.get_bit(8) {
                registers |= 1 << REG_PROGRAM_COUNTER;
            }
            (Indexing::Post, Offsetting::Up)
        }
    };

    let sequence = BlockTransferSequence::new(
        kind,
        registers,
        REG_SP,
        register(processor, REG_SP),
        indexing,
        offsetting,
        true,
        false,
    );
    processor.start_block_transfer(sequence);
    Ok(())
}

/// Format 15: STMIA and LDMIA with writeback.
pub fn multiple_load_store(processor: &mut Processor, opcode: ThumbOpcode) -> HandlerResult {
    let base = opcode.register(8..=10);
    let sequence = BlockTransferSequence::new(
        LoadStoreKind::from(opcode.get_bit(11)),
        opcode.get_bits(0..=7),
        base,
        register(processor, base),
        Indexing::Post,
        Offsetting::Up,
        true,
        false,
    );
    processor.start_block_transfer(sequence);
    Ok(())
}

/// Format 16.
pub fn conditional_branch(processor: &mut Processor, opcode: ThumbOpcode) -> HandlerResult {
    let condition = Condition::from(opcode.get_bits(8..=11) as u8);
    if processor.cpsr.can_execute(condition) {
        let offset = (opcode.immediate(0..=7) << 1).sign_extended(9);
        let target = processor.registers.program_counter().wrapping_add(offset);
        processor.flush_pipeline(target);
    }
    Ok(())
}

/// Format 17.
pub fn software_interrupt(processor: &mut Processor, opcode: ThumbOpcode) -> HandlerResult {
    debug!("SWI {:#04x} at {:#010x}", opcode.get_bits(0..=7), opcode.address);
    processor.enter_exception(
        Exception::SoftwareInterrupt,
        opcode.address.wrapping_add(SIZE_OF_INSTRUCTION),
    );
    Ok(())
}

/// Format 18.
pub fn unconditional_branch(processor: &mut Processor, opcode: ThumbOpcode) -> HandlerResult {
    let offset = (opcode.immediate(0..=10) << 1).sign_extended(12);
    let target = processor.registers.program_counter().wrapping_add(offset);
    processor.flush_pipeline(target);
    Ok(())
}

/// Format 19, first half: LR = PC + (offset << 12).
pub fn long_branch_link_prefix(processor: &mut Processor, opcode: ThumbOpcode) -> HandlerResult {
    let offset = opcode.immediate(0..=10).sign_extended(11) << 12;
    let lr = processor.registers.program_counter().wrapping_add(offset);
    processor.registers.set_register_at(REG_LR, lr);
    Ok(())
}

/// Format 19, second half: branch to LR + (offset << 1) and leave the return
/// address, with bit 0 set, in LR.
pub fn long_branch_link_suffix(processor: &mut Processor, opcode: ThumbOpcode) -> HandlerResult {
    let target = register(processor, REG_LR).wrapping_add(opcode.immediate(0..=10) << 1);
    let return_address = opcode.address.wrapping_add(SIZE_OF_INSTRUCTION) | 1;

    processor
        .registers
        .set_register_at(REG_LR, return_address);
    processor.flush_pipeline(target);
    Ok(())
}

pub fn undefined(processor: &mut Processor, opcode: ThumbOpcode) -> HandlerResult {
    processor.undefined_instruction(u32::from(opcode.raw), opcode.address)
}
