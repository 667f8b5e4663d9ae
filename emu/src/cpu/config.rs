use serde::{Deserialize, Serialize};

/// What the core does with an encoding the ARM7TDMI leaves undefined.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedPolicy {
    /// Take the undefined-instruction exception, like the hardware.
    #[default]
    Exception,

    /// Halt the core with [`CpuFault::UndefinedInstruction`](super::fault::CpuFault).
    Fault,
}

/// Banked R13 values installed by a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackPointers {
    /// User and System.
    pub user: u32,
    pub irq: u32,
    pub supervisor: u32,
}

impl Default for StackPointers {
    fn default() -> Self {
        Self {
            user: 0x0300_7F00,
            irq: 0x0300_7FA0,
            supervisor: 0x0300_7FE0,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    pub undefined_instruction: UndefinedPolicy,
    pub stack_pointers: StackPointers,
}
