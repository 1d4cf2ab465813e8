use super::{Chip8, Chip8Error, StepOutcome};
use crate::u4;

pub const DEFAULT_CPU_HZ: f32 = 700.0;
pub const TIMER_HZ: f32 = 60.0;

const TIMER_TIME_STEP: f32 = 1.0 / TIMER_HZ;

/// High-level emulator runner that manages timing internally.
pub struct Chip8Runner {
    chip8: Chip8,
    cpu_time_step: f32,
    cpu_dt_accumulator: f32,
    timer_dt_accumulator: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerStatus {
    Running,
    Halted,
}

impl Chip8Runner {
    pub fn new(chip8: Chip8) -> Self {
        Self::from_time_step(chip8, 1.0 / DEFAULT_CPU_HZ)
    }

    /// Runs `cpu_hz` instructions per second. Rejects zero, negative and NaN rates.
    pub fn with_cpu_hz(chip8: Chip8, cpu_hz: f32) -> Result<Self, Chip8Error> {
        if !(cpu_hz > 0.0 && cpu_hz.is_finite()) {
            return Err(Chip8Error::InvalidCpuHz { hz: cpu_hz });
        }
        Ok(Self::from_time_step(chip8, 1.0 / cpu_hz))
    }

    fn from_time_step(chip8: Chip8, cpu_time_step: f32) -> Self {
        Self {
            chip8,
            cpu_time_step,
            cpu_dt_accumulator: 0.0,
            timer_dt_accumulator: 0.0,
        }
    }

    /// Update emulator by delta time, handles both CPU and timer cycles.
    ///
    /// Runs as many timer ticks and CPU cycles as fit in the elapsed time `dt`.
    /// Returns early if a frame has to be rendered or a key is awaited before the next cycle.
    pub fn update(&mut self, dt: f32) -> Result<RunnerStatus, Chip8Error> {
        self.cpu_dt_accumulator += dt;
        self.timer_dt_accumulator += dt;

        while self.timer_dt_accumulator >= TIMER_TIME_STEP {
            self.timer_dt_accumulator -= TIMER_TIME_STEP;
            self.chip8.tick_timers();
        }

        while self.cpu_dt_accumulator >= self.cpu_time_step {
            self.cpu_dt_accumulator -= self.cpu_time_step;

            match self.chip8.step()? {
                StepOutcome::Drew | StepOutcome::WaitingForKey => {
                    // Yield to the host for this frame.
                    // We clear the accumulator to avoid "catching up" in the next frame.
                    self.cpu_dt_accumulator = 0.0;
                    break;
                }
                StepOutcome::Halted => return Ok(RunnerStatus::Halted),
                StepOutcome::Continue | StepOutcome::Unrecognized { .. } => {}
            }
        }

        if self.chip8.is_halted() {
            Ok(RunnerStatus::Halted)
        } else {
            Ok(RunnerStatus::Running)
        }
    }

    /// Returns true if the sound timer is active, indicating a beep should be played.
    pub fn should_beep(&self) -> bool {
        self.chip8.should_beep()
    }

    /// Set the state of a key on the keypad.
    pub fn set_key(&mut self, key: u4, pressed: bool) {
        self.chip8.set_key(key, pressed)
    }

    /// Get the state of a pixel on the display (true = on, false = off).
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.chip8.pixel(x, y)
    }

    pub fn chip8_ref(&self) -> &Chip8 {
        &self.chip8
    }

    pub fn chip8_mut(&mut self) -> &mut Chip8 {
        &mut self.chip8
    }
}
