use std::{io, path::PathBuf};

pub const DISPLAY_X: usize = 64;
pub const DISPLAY_Y: usize = 32;

/// Monochrome frame buffer, row-major: pixel `(x, y)` lives at `x + y * DISPLAY_X`.
pub type Display = [bool; DISPLAY_X * DISPLAY_Y];

/// What a single `step` did, as far as the host loop is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The instruction executed; keep stepping.
    Continue,
    /// A sprite was drawn. Hosts that sync drawing to the frame rate should present a frame.
    Drew,
    /// Fx0A found no key pressed; the same instruction runs again on the next step.
    WaitingForKey,
    /// The word at the program counter is not a known instruction. Execution continues.
    Unrecognized { opcode: u16 },
    /// The machine is halted and nothing was executed.
    Halted,
}

/// Error types that can occur while loading or running a program.
#[derive(Debug, thiserror::Error)]
pub enum Chip8Error {
    #[error("Stack overflow: call depth exceeded {capacity} entries")]
    StackOverflow { capacity: usize },

    #[error("Stack underflow: attempted to return from a subroutine with empty call stack")]
    StackUnderflow,

    #[error("Program counter out of bounds at address {address:#06X}")]
    ProgramCounterOutOfBounds { address: u16 },

    #[error("Memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: u16 },

    #[error("CPU frequency must be a positive number of Hz, got {hz}")]
    InvalidCpuHz { hz: f32 },

    #[error("No program has been loaded")]
    NotLoaded,

    #[error("Failed to read ROM file {}", path.display())]
    RomRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
