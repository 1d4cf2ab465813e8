//! A CHIP-8 interpreter core.
//!
//! [`emu::Chip8`] holds the whole machine state. A host loads a program, then calls
//! [`emu::Chip8::step`] once per instruction and [`emu::Chip8::tick_timers`] at 60Hz,
//! reading the display and writing the keyboard in between.

pub mod emu;
mod nibble;

pub use nibble::u4;
