use std::{ops::Range, path::Path};

use rand::{SeedableRng, rngs::StdRng};

use super::{
    Chip8Error, DISPLAY_X, DISPLAY_Y, Display, FONT, FONT_END_ADDRESS, FONT_START_ADDRESS, Opcode,
    Quirks, StepOutcome,
};
use crate::u4;

pub const ROM_START_ADDRESS: usize = 0x200;
pub const MEMORY_SIZE: usize = 4096;
/// Largest ROM that fits between `ROM_START_ADDRESS` and the end of memory.
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - ROM_START_ADDRESS;
pub const STACK_SIZE: usize = 16;

/// CHIP-8 virtual machine state.
///
/// `step` and `tick_timers` must be driven from a single thread; the host owns the cadence
/// between them. Between calls the host may read the display and write the keyboard.
pub struct Chip8 {
    /// 4KB memory array
    pub(crate) memory: [u8; MEMORY_SIZE],
    /// 64x32 monochrome pixels, row-major
    pub(crate) display: Display,

    /// Address of the next instruction to fetch
    pub(crate) pc: u16,
    /// Index register, used for memory operations
    pub(crate) i: u16,
    /// General-purpose registers V0-VF (VF doubles as the flag register)
    pub(crate) v: [u8; 16],
    /// Return addresses, `stack[..sp]` is live
    pub(crate) stack: [u16; STACK_SIZE],
    /// Number of live stack entries
    pub(crate) sp: usize,

    /// Decrements at 60Hz until it reaches 0
    pub(crate) delay_timer: u8,
    /// Decrements at 60Hz, beeps while non-zero
    pub(crate) sound_timer: u8,

    /// 16 keys, true = pressed
    pub(crate) keypad: [bool; 16],

    pub(crate) halted: bool,
    pub(crate) loaded: bool,

    pub(crate) quirks: Quirks,
    pub(crate) rng: StdRng,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_quirks(Quirks::default())
    }

    pub fn with_quirks(quirks: Quirks) -> Self {
        Self::blank(quirks, StdRng::from_os_rng())
    }

    /// Uses a fixed seed for Cxnn so runs are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    fn blank(quirks: Quirks, rng: StdRng) -> Self {
        let mut memory = [0; MEMORY_SIZE];
        memory[FONT_START_ADDRESS..FONT_END_ADDRESS].copy_from_slice(&FONT);

        Chip8 {
            memory,
            display: [false; DISPLAY_X * DISPLAY_Y],
            pc: ROM_START_ADDRESS as u16,
            i: 0,
            v: [0; 16],
            stack: [0; STACK_SIZE],
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            keypad: [false; 16],
            halted: false,
            loaded: false,
            quirks,
            rng,
        }
    }

    /// Returns the machine to its freshly constructed state. Program memory is cleared.
    pub fn reset(&mut self) {
        log::debug!("Resetting machine");
        let rng = self.rng.clone();
        *self = Self::blank(self.quirks, rng);
    }

    /// Copies `rom` into program memory at 0x200 and returns the number of bytes written.
    ///
    /// Anything past `MAX_ROM_SIZE` bytes is dropped.
    pub fn load_rom(&mut self, rom: &[u8]) -> usize {
        let copy_size = rom.len().min(MAX_ROM_SIZE);
        if copy_size < rom.len() {
            log::warn!(
                "ROM is {} bytes, truncating to {} bytes",
                rom.len(),
                MAX_ROM_SIZE
            );
        }

        self.memory[ROM_START_ADDRESS..ROM_START_ADDRESS + copy_size]
            .copy_from_slice(&rom[..copy_size]);
        self.pc = ROM_START_ADDRESS as u16;
        self.loaded = true;

        log::debug!("Loaded {} bytes at {:#05X}", copy_size, ROM_START_ADDRESS);
        copy_size
    }

    /// Reads a ROM file and loads it, see `load_rom`.
    pub fn load_rom_file(&mut self, path: impl AsRef<Path>) -> Result<usize, Chip8Error> {
        let path = path.as_ref();
        let rom = std::fs::read(path).map_err(|source| Chip8Error::RomRead {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(self.load_rom(&rom))
    }

    /// Executes a single fetch-decode-execute cycle.
    ///
    /// Errors are fatal: the machine is halted before the error is returned, and every
    /// later call returns `StepOutcome::Halted` without touching state.
    pub fn step(&mut self) -> Result<StepOutcome, Chip8Error> {
        if self.halted {
            return Ok(StepOutcome::Halted);
        }
        if !self.loaded {
            return Err(Chip8Error::NotLoaded);
        }

        let address = self.pc;
        let result = self.fetch().and_then(|word| {
            let opcode = Opcode::decode(word);
            log::trace!("{:#05X}: {:04X} {:?}", address, word, opcode);
            self.execute(opcode)
        });

        if let Err(e) = &result {
            log::error!("Halting at {:#05X}: {}", address, e);
            self.halted = true;
        }

        result
    }

    /// Updates the delay and sound timers. Should be called at 60Hz.
    pub fn tick_timers(&mut self) {
        if self.halted {
            return;
        }
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Stops the machine. Used by hosts to request termination.
    pub fn halt(&mut self) {
        self.halted = true;
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Returns true if the sound timer is greater than zero, indicating a beep should be played.
    pub fn should_beep(&self) -> bool {
        self.sound_timer > 0
    }

    /// Set the state of a key on the keypad.
    pub fn set_key(&mut self, key: u4, pressed: bool) {
        self.keypad[key] = pressed;
    }

    pub fn keyboard(&self) -> &[bool; 16] {
        &self.keypad
    }

    /// Get the state of a pixel on the display (true = on, false = off).
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        debug_assert!(
            x < DISPLAY_X && y < DISPLAY_Y,
            "pixel ({x}, {y}) is off screen"
        );
        self.display[x + y * DISPLAY_X]
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.v
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Live return addresses, oldest first.
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.sp]
    }

    pub fn memory(&self) -> &[u8; MEMORY_SIZE] {
        &self.memory
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    /// Fetches the instruction word at the program counter and advances past it.
    fn fetch(&mut self) -> Result<u16, Chip8Error> {
        let pc = self.pc as usize;
        if pc + 1 >= MEMORY_SIZE {
            return Err(Chip8Error::ProgramCounterOutOfBounds { address: self.pc });
        }

        let word = u16::from_be_bytes([self.memory[pc], self.memory[pc + 1]]);
        self.pc += 2;
        Ok(word)
    }

    /// Memory range of `len` bytes starting at I, checked as a whole so that an instruction
    /// running off the end of memory fails before it touches anything.
    pub(crate) fn index_range(&self, len: usize) -> Result<Range<usize>, Chip8Error> {
        let start = self.i as usize;
        let end = start + len;
        if end > MEMORY_SIZE {
            let address = start.max(MEMORY_SIZE) as u16;
            return Err(Chip8Error::MemoryOutOfBounds { address });
        }
        Ok(start..end)
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}
