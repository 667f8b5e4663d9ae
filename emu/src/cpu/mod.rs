//! # ARM7TDMI core
//!
//! [`arm7tdmi::Arm7tdmi`] is the entry point: it clocks a
//! [`processor::Processor`] against a [`Bus`](crate::bus::Bus).

pub mod alu;

#[allow(clippy::cast_possible_truncation)]
pub mod arm;

#[allow(clippy::module_name_repetitions)]
pub mod arm7tdmi;
pub mod condition;
pub mod config;
pub mod cpu_modes;
pub mod exception;
pub mod fault;
pub mod flags;
pub mod pipeline;
pub mod processor;
pub mod psr;
pub mod register_bank;
pub mod registers;

#[allow(clippy::cast_possible_truncation)]
pub mod sequencer;

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
pub mod shifter;

#[allow(clippy::cast_possible_truncation)]
pub mod thumb;
