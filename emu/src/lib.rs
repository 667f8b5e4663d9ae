#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
mod bitwise;

#[allow(clippy::cast_lossless)]
pub mod bus;
pub mod cpu;

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::unreadable_literal)]
pub mod memory;
