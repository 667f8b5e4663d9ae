use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cpu::psr::CpuState;

/// Instance-level fault. Once [`Arm7tdmi::clock`](super::arm7tdmi::Arm7tdmi::clock)
/// returns one the core stays halted until it is reset; the host decides
/// whether to log, stop or reset.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuFault {
    #[error("undefined {state} instruction {opcode:#010x} at {address:#010x}")]
    UndefinedInstruction {
        state: CpuState,
        opcode: u32,
        address: u32,
    },

    #[error("invalid PSR mode bits {bits:#07b}")]
    InvalidMode { bits: u32 },
}
