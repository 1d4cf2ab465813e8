use rand::Rng;

use super::{
    AluOp, Chip8, Chip8Error, DISPLAY_X, DISPLAY_Y, FONT_GLYPH_SIZE, FONT_START_ADDRESS, Opcode,
    STACK_SIZE, StepOutcome,
};
use crate::u4;

impl Chip8 {
    /// Applies one decoded instruction. The program counter already points past it.
    pub(crate) fn execute(&mut self, opcode: Opcode) -> Result<StepOutcome, Chip8Error> {
        match opcode {
            Opcode::ClearScreen => {
                self.display.fill(false);
            }
            Opcode::Return => {
                if self.sp == 0 {
                    return Err(Chip8Error::StackUnderflow);
                }
                self.sp -= 1;
                self.pc = self.stack[self.sp];
            }
            Opcode::Jump { nnn } => {
                self.pc = nnn;
            }
            Opcode::Call { nnn } => {
                if self.sp == STACK_SIZE {
                    return Err(Chip8Error::StackOverflow {
                        capacity: STACK_SIZE,
                    });
                }
                self.stack[self.sp] = self.pc;
                self.sp += 1;
                self.pc = nnn;
            }
            Opcode::JumpOffset { x, nnn } => {
                let offset = if self.quirks.jump_offset_uses_vx {
                    self.v[x]
                } else {
                    self.v[0]
                };
                self.pc = nnn.wrapping_add(offset.into());
            }
            Opcode::SkipEqImm { x, nn } => self.skip_if(self.v[x] == nn),
            Opcode::SkipNeImm { x, nn } => self.skip_if(self.v[x] != nn),
            Opcode::SkipEqReg { x, y } => self.skip_if(self.v[x] == self.v[y]),
            Opcode::SkipNeReg { x, y } => self.skip_if(self.v[x] != self.v[y]),
            Opcode::LoadImm { x, nn } => {
                self.v[x] = nn;
            }
            Opcode::AddImm { x, nn } => {
                self.v[x] = self.v[x].wrapping_add(nn);
            }
            Opcode::Alu { x, y, op } => {
                self.execute_alu(x, y, op);
            }
            Opcode::Random { x, nn } => {
                let rand_byte: u8 = self.rng.random();
                self.v[x] = rand_byte & nn;
            }
            Opcode::LoadIndex { nnn } => {
                self.i = nnn;
            }
            Opcode::AddIndex { x } => {
                self.i = self.i.wrapping_add(self.v[x].into());
            }
            Opcode::FontAddr { x } => {
                let glyph_offset = u16::from(self.v[x]) * FONT_GLYPH_SIZE as u16;
                self.i = FONT_START_ADDRESS as u16 + glyph_offset;
            }
            Opcode::Draw { x, y, n } => {
                return self.execute_draw(x, y, n);
            }
            Opcode::SkipKeyDown { x } => {
                let key = u4::truncate(self.v[x]);
                self.skip_if(self.keypad[key]);
            }
            Opcode::SkipKeyUp { x } => {
                let key = u4::truncate(self.v[x]);
                self.skip_if(!self.keypad[key]);
            }
            Opcode::WaitKey { x } => {
                return Ok(self.execute_wait_key(x));
            }
            Opcode::ReadDelay { x } => {
                self.v[x] = self.delay_timer;
            }
            Opcode::SetDelay { x } => {
                self.delay_timer = self.v[x];
            }
            Opcode::SetSound { x } => {
                self.sound_timer = self.v[x];
            }
            Opcode::Bcd { x } => {
                let value = self.v[x];
                let digits = self.index_range(3)?;
                self.memory[digits].copy_from_slice(&[value / 100, (value / 10) % 10, value % 10]);
            }
            Opcode::StoreRegs { x } => {
                let count = usize::from(x) + 1;
                let dest = self.index_range(count)?;
                self.memory[dest].copy_from_slice(&self.v[..count]);
                self.i = self.quirks.index_increment.apply(self.i, x.get());
            }
            Opcode::LoadRegs { x } => {
                let count = usize::from(x) + 1;
                let src = self.index_range(count)?;
                self.v[..count].copy_from_slice(&self.memory[src]);
                self.i = self.quirks.index_increment.apply(self.i, x.get());
            }
            Opcode::Unknown(opcode) => {
                log::warn!(
                    "Unrecognized instruction {:04X} at {:#05X}",
                    opcode,
                    self.pc.wrapping_sub(2)
                );
                return Ok(StepOutcome::Unrecognized { opcode });
            }
        };

        Ok(StepOutcome::Continue)
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.pc = self.pc.wrapping_add(2);
        }
    }

    fn execute_alu(&mut self, x: u4, y: u4, op: AluOp) {
        match op {
            AluOp::Copy => self.v[x] = self.v[y],
            AluOp::Or => {
                self.v[x] |= self.v[y];
                self.reset_vf_after_logic();
            }
            AluOp::And => {
                self.v[x] &= self.v[y];
                self.reset_vf_after_logic();
            }
            AluOp::Xor => {
                self.v[x] ^= self.v[y];
                self.reset_vf_after_logic();
            }
            AluOp::Add => {
                let (res, carry) = self.v[x].overflowing_add(self.v[y]);
                self.v[x] = res;
                self.v[0xF] = carry as u8;
            }
            AluOp::Sub => {
                let (vx, vy) = (self.v[x], self.v[y]);
                self.v[x] = vx.wrapping_sub(vy);
                self.v[0xF] = (vx > vy) as u8;
            }
            AluOp::SubReverse => {
                let (vx, vy) = (self.v[x], self.v[y]);
                self.v[x] = vy.wrapping_sub(vx);
                self.v[0xF] = (vy > vx) as u8;
            }
            AluOp::ShiftRight => {
                let source = self.shift_source(x, y);
                self.v[x] = source >> 1;
                self.v[0xF] = source & 1;
            }
            AluOp::ShiftLeft => {
                let source = self.shift_source(x, y);
                self.v[x] = source << 1;
                self.v[0xF] = source >> 7;
            }
        }
    }

    fn shift_source(&self, x: u4, y: u4) -> u8 {
        if self.quirks.shift_loads_vy {
            self.v[y]
        } else {
            self.v[x]
        }
    }

    fn reset_vf_after_logic(&mut self) {
        if self.quirks.logic_resets_vf {
            self.v[0xF] = 0;
        }
    }

    fn execute_draw(&mut self, x: u4, y: u4, n: u4) -> Result<StepOutcome, Chip8Error> {
        let x_pos = self.v[x] as usize % DISPLAY_X;
        let y_pos = self.v[y] as usize % DISPLAY_Y;

        // Sprites are clipped at the right and bottom edges
        let row_count = usize::from(n).min(DISPLAY_Y - y_pos);
        let col_count = 8usize.min(DISPLAY_X - x_pos);

        let sprite = self.index_range(row_count)?;
        self.v[0xF] = 0;

        let mut collision = false;
        for row in 0..row_count {
            let sprite_byte = self.memory[sprite.start + row];

            for col in 0..col_count {
                if sprite_byte & (0x80 >> col) == 0 {
                    continue;
                }

                let pixel = &mut self.display[(x_pos + col) + (y_pos + row) * DISPLAY_X];
                collision |= *pixel;
                *pixel ^= true;
            }
        }

        self.v[0xF] = collision as u8;
        Ok(StepOutcome::Drew)
    }

    fn execute_wait_key(&mut self, x: u4) -> StepOutcome {
        match self.keypad.iter().position(|&pressed| pressed) {
            Some(key) => {
                self.v[x] = key as u8;
                StepOutcome::Continue
            }
            None => {
                // Run this instruction again on the next step
                self.pc = self.pc.wrapping_sub(2);
                StepOutcome::WaitingForKey
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{IndexIncrement, Quirks};
    use super::*;

    fn run(rom: &[u8], steps: usize) -> Chip8 {
        run_with(Quirks::default(), rom, steps)
    }

    fn run_with(quirks: Quirks, rom: &[u8], steps: usize) -> Chip8 {
        let mut chip8 = Chip8::with_quirks(quirks).with_seed(7);
        chip8.load_rom(rom);
        for _ in 0..steps {
            chip8.step().unwrap();
        }
        chip8
    }

    #[test]
    fn clear_screen() {
        let mut chip8 = run(&[0x00, 0xE0], 0);
        chip8.display.fill(true);
        chip8.step().unwrap();
        assert!(chip8.display().iter().all(|&p| !p));
    }

    #[test]
    fn add_immediate_wraps_without_flag() {
        let chip8 = run(&[0x6F, 0x00, 0x60, 0xFF, 0x70, 0x02], 3);
        assert_eq!(chip8.registers()[0], 0x01);
        assert_eq!(chip8.registers()[0xF], 0);
    }

    #[test]
    fn load_then_add_zero_is_identity() {
        for x in 0..0xFu8 {
            for nn in [0x00, 0x01, 0x7F, 0xFF] {
                let chip8 = run(&[0x60 | x, nn, 0x70 | x, 0x00], 2);
                assert_eq!(chip8.registers()[x as usize], nn);
            }
        }
    }

    #[test]
    fn jump_sets_pc() {
        let chip8 = run(&[0x13, 0x45], 1);
        assert_eq!(chip8.pc(), 0x345);
    }

    #[test]
    fn call_then_return_restores_pc() {
        // 0x200: call 0x206; 0x206: return
        let mut chip8 = run(&[0x22, 0x06, 0x00, 0x00, 0x00, 0x00, 0x00, 0xEE], 1);
        assert_eq!(chip8.pc(), 0x206);
        assert_eq!(chip8.stack(), &[0x202]);
        chip8.step().unwrap();
        assert_eq!(chip8.pc(), 0x202);
        assert!(chip8.stack().is_empty());
    }

    #[test]
    fn return_without_call_is_fatal() {
        let mut chip8 = run(&[0x00, 0xEE], 0);
        assert!(matches!(chip8.step(), Err(Chip8Error::StackUnderflow)));
        assert!(chip8.is_halted());
    }

    #[test]
    fn stack_overflow_halts() {
        // 0x200: call 0x200, forever
        let mut chip8 = run(&[0x22, 0x00], STACK_SIZE);
        assert_eq!(chip8.stack().len(), STACK_SIZE);

        assert!(matches!(
            chip8.step(),
            Err(Chip8Error::StackOverflow { capacity: 16 })
        ));
        assert!(chip8.is_halted());

        let pc = chip8.pc();
        assert_eq!(chip8.step().unwrap(), StepOutcome::Halted);
        assert_eq!(chip8.pc(), pc);
        assert_eq!(chip8.stack().len(), STACK_SIZE);
    }

    #[test]
    fn skip_immediate() {
        let chip8 = run(&[0x60, 0x05, 0x30, 0x05], 2);
        assert_eq!(chip8.pc(), 0x206);
        let chip8 = run(&[0x60, 0x05, 0x30, 0x06], 2);
        assert_eq!(chip8.pc(), 0x204);
        let chip8 = run(&[0x60, 0x05, 0x40, 0x06], 2);
        assert_eq!(chip8.pc(), 0x206);
        let chip8 = run(&[0x60, 0x05, 0x40, 0x05], 2);
        assert_eq!(chip8.pc(), 0x204);
    }

    #[test]
    fn skip_register() {
        let chip8 = run(&[0x60, 0x05, 0x61, 0x05, 0x50, 0x10], 3);
        assert_eq!(chip8.pc(), 0x208);
        let chip8 = run(&[0x60, 0x05, 0x61, 0x05, 0x90, 0x10], 3);
        assert_eq!(chip8.pc(), 0x206);
        let chip8 = run(&[0x60, 0x05, 0x61, 0x04, 0x90, 0x10], 3);
        assert_eq!(chip8.pc(), 0x208);
    }

    #[test]
    fn logic_ops_clear_vf() {
        for (op, expected) in [(0x1, 0b1110), (0x2, 0b1000), (0x3, 0b0110)] {
            let chip8 = run(&[0x60, 0b1100, 0x61, 0b1010, 0x6F, 0x09, 0x80, 0x10 | op], 4);
            assert_eq!(chip8.registers()[0], expected);
            assert_eq!(chip8.registers()[0xF], 0);
        }
    }

    #[test]
    fn logic_ops_keep_vf_without_reset_quirk() {
        let quirks = Quirks {
            logic_resets_vf: false,
            ..Quirks::default()
        };
        let chip8 = run_with(quirks, &[0x6F, 0x09, 0x60, 0x01, 0x80, 0x11], 3);
        assert_eq!(chip8.registers()[0xF], 0x09);
    }

    #[test]
    fn add_register_sets_carry() {
        let chip8 = run(&[0x60, 0xF0, 0x61, 0x20, 0x80, 0x14], 3);
        assert_eq!(chip8.registers()[0], 0x10);
        assert_eq!(chip8.registers()[0xF], 1);

        let chip8 = run(&[0x60, 0xF0, 0x61, 0x0F, 0x80, 0x14], 3);
        assert_eq!(chip8.registers()[0], 0xFF);
        assert_eq!(chip8.registers()[0xF], 0);
    }

    #[test]
    fn carry_matches_nine_bit_sum() {
        for (a, b) in [(0u8, 0u8), (1, 255), (128, 128), (127, 128), (200, 100)] {
            let chip8 = run(&[0x60, a, 0x61, b, 0x80, 0x14], 3);
            let sum = u16::from(a) + u16::from(b);
            assert_eq!(chip8.registers()[0], (sum % 256) as u8);
            assert_eq!(chip8.registers()[0xF], (sum > 255) as u8);
        }
    }

    #[test]
    fn sub_sets_flag_only_when_strictly_greater() {
        let chip8 = run(&[0x60, 0x09, 0x61, 0x03, 0x80, 0x15], 3);
        assert_eq!(chip8.registers()[0], 6);
        assert_eq!(chip8.registers()[0xF], 1);

        let chip8 = run(&[0x60, 0x03, 0x61, 0x09, 0x80, 0x15], 3);
        assert_eq!(chip8.registers()[0], 0xFA);
        assert_eq!(chip8.registers()[0xF], 0);

        let chip8 = run(&[0x60, 0x04, 0x61, 0x04, 0x80, 0x15], 3);
        assert_eq!(chip8.registers()[0], 0);
        assert_eq!(chip8.registers()[0xF], 0);
    }

    #[test]
    fn sub_reverse() {
        let chip8 = run(&[0x60, 0x03, 0x61, 0x09, 0x80, 0x17], 3);
        assert_eq!(chip8.registers()[0], 6);
        assert_eq!(chip8.registers()[0xF], 1);

        let chip8 = run(&[0x60, 0x09, 0x61, 0x03, 0x80, 0x17], 3);
        assert_eq!(chip8.registers()[0], 0xFA);
        assert_eq!(chip8.registers()[0xF], 0);
    }

    #[test]
    fn shifts_load_vy_first() {
        let chip8 = run(&[0x60, 0xFF, 0x61, 0b0000_0011, 0x80, 0x16], 3);
        assert_eq!(chip8.registers()[0], 0b0000_0001);
        assert_eq!(chip8.registers()[0xF], 1);

        let chip8 = run(&[0x60, 0x00, 0x61, 0b1000_0001, 0x80, 0x1E], 3);
        assert_eq!(chip8.registers()[0], 0b0000_0010);
        assert_eq!(chip8.registers()[0xF], 1);

        let chip8 = run(&[0x61, 0b0100_0000, 0x80, 0x1E], 2);
        assert_eq!(chip8.registers()[0], 0b1000_0000);
        assert_eq!(chip8.registers()[0xF], 0);
    }

    #[test]
    fn shifts_in_place_with_quirk() {
        let quirks = Quirks {
            shift_loads_vy: false,
            ..Quirks::default()
        };
        let chip8 = run_with(quirks, &[0x60, 0b0000_0110, 0x61, 0xFF, 0x80, 0x16], 3);
        assert_eq!(chip8.registers()[0], 0b0000_0011);
        assert_eq!(chip8.registers()[0xF], 0);
    }

    #[test]
    fn copy_register() {
        let chip8 = run(&[0x61, 0x42, 0x80, 0x10], 2);
        assert_eq!(chip8.registers()[0], 0x42);
    }

    #[test]
    fn jump_offset_uses_v0() {
        let chip8 = run(&[0x60, 0x10, 0x62, 0x40, 0xB2, 0x00], 3);
        assert_eq!(chip8.pc(), 0x210);
    }

    #[test]
    fn jump_offset_uses_vx_with_quirk() {
        let quirks = Quirks {
            jump_offset_uses_vx: true,
            ..Quirks::default()
        };
        let chip8 = run_with(quirks, &[0x60, 0x10, 0x62, 0x40, 0xB2, 0x00], 3);
        assert_eq!(chip8.pc(), 0x240);
    }

    #[test]
    fn random_is_masked_and_seeded() {
        let a = run(&[0xC0, 0x0F, 0xC1, 0xFF], 2);
        let b = run(&[0xC0, 0x0F, 0xC1, 0xFF], 2);
        assert!(a.registers()[0] <= 0x0F);
        assert_eq!(a.registers()[..2], b.registers()[..2]);

        let zero = run(&[0xC0, 0x00], 1);
        assert_eq!(zero.registers()[0], 0);
    }

    #[test]
    fn index_operations() {
        let chip8 = run(&[0xA1, 0x23, 0x60, 0x10, 0xF0, 0x1E], 3);
        assert_eq!(chip8.index(), 0x133);
    }

    #[test]
    fn font_address() {
        let chip8 = run(&[0x60, 0x0A, 0xF0, 0x29], 2);
        assert_eq!(chip8.index(), 0x50 + 0xA * 5);
        assert_eq!(chip8.memory()[chip8.index() as usize], 0xF0);
    }

    #[test]
    fn bcd_reconstructs_value() {
        for n in 0..=255u8 {
            let chip8 = run(&[0x60, n, 0xA3, 0x00, 0xF0, 0x33], 3);
            let digits = &chip8.memory()[0x300..0x303];
            let value = 100 * digits[0] as u16 + 10 * digits[1] as u16 + digits[2] as u16;
            assert_eq!(value, n as u16);
        }
    }

    #[test]
    fn bcd_past_end_of_memory_halts() {
        let mut chip8 = run(&[0xAF, 0xFE, 0x60, 0x7B, 0xF0, 0x33], 2);
        assert!(matches!(
            chip8.step(),
            Err(Chip8Error::MemoryOutOfBounds { address: 0x1000 })
        ));
        assert!(chip8.is_halted());
        assert_eq!(&chip8.memory()[0xFFE..], &[0, 0]);
    }

    #[test]
    fn draw_past_end_of_memory_halts() {
        // I = 0xFFF, two-row sprite: the second row is past the end of memory
        let mut chip8 = run(&[0xAF, 0xFF, 0x6F, 0x05, 0xD0, 0x02], 2);
        assert!(matches!(
            chip8.step(),
            Err(Chip8Error::MemoryOutOfBounds { address: 0x1000 })
        ));
        assert!(chip8.is_halted());
        assert!(chip8.display().iter().all(|&p| !p));
        assert_eq!(chip8.registers()[0xF], 5);
    }

    #[test]
    fn store_regs_past_end_of_memory_halts() {
        // I = 0xFFE, V0..V2 = 7, 8, 9, store V0..=V2
        let rom = [0xAF, 0xFE, 0x60, 0x07, 0x61, 0x08, 0x62, 0x09, 0xF2, 0x55];
        let mut chip8 = run(&rom, 4);
        assert!(matches!(
            chip8.step(),
            Err(Chip8Error::MemoryOutOfBounds { address: 0x1000 })
        ));
        assert!(chip8.is_halted());
        assert_eq!(&chip8.memory()[0xFFE..], &[0, 0]);
        assert_eq!(chip8.index(), 0xFFE);
    }

    #[test]
    fn load_regs_past_end_of_memory_halts() {
        // I = 0xFFF, V0 = 3, load V0..=V1
        let mut chip8 = run(&[0xAF, 0xFF, 0x60, 0x03, 0xF1, 0x65], 2);
        assert!(matches!(
            chip8.step(),
            Err(Chip8Error::MemoryOutOfBounds { address: 0x1000 })
        ));
        assert!(chip8.is_halted());
        assert_eq!(chip8.registers()[0], 3);
        assert_eq!(chip8.index(), 0xFFF);
    }

    #[test]
    fn flag_wins_when_x_is_vf() {
        // VF = 0xF0 + 0x20: result 0x10 is overwritten by the carry
        let chip8 = run(&[0x6F, 0xF0, 0x61, 0x20, 0x8F, 0x14], 3);
        assert_eq!(chip8.registers()[0xF], 1);

        // VF = 3 - 5: result 0xFE is overwritten by the no-borrow flag
        let chip8 = run(&[0x6F, 0x03, 0x61, 0x05, 0x8F, 0x15], 3);
        assert_eq!(chip8.registers()[0xF], 0);

        // VF = 0x02 >> 1: result 1 is overwritten by the shifted out bit
        let chip8 = run(&[0x61, 0x02, 0x8F, 0x16], 2);
        assert_eq!(chip8.registers()[0xF], 0);

        // VF = 0x81 << 1: result 2 is overwritten by the shifted out bit
        let chip8 = run(&[0x61, 0x81, 0x8F, 0x1E], 2);
        assert_eq!(chip8.registers()[0xF], 1);
    }

    #[test]
    fn store_and_load_registers_inclusive() {
        // V0..V2 = 1,2,3; I = 0x300; store V0..=V2; clear; I = 0x300; load V0..=V1
        let rom = [
            0x60, 0x01, 0x61, 0x02, 0x62, 0x03, 0xA3, 0x00, 0xF2, 0x55, 0x60, 0x00, 0x61, 0x00,
            0x62, 0x00, 0xA3, 0x00, 0xF1, 0x65,
        ];
        let mut chip8 = run(&rom, 5);
        assert_eq!(&chip8.memory()[0x300..0x304], &[1, 2, 3, 0]);
        assert_eq!(chip8.index(), 0x301);

        for _ in 0..5 {
            chip8.step().unwrap();
        }
        assert_eq!(&chip8.registers()[..3], &[1, 2, 0]);
        assert_eq!(chip8.index(), 0x301);
    }

    #[test]
    fn store_registers_index_quirks() {
        let rom = [0xA3, 0x00, 0xF3, 0x55];
        let by_count = Quirks {
            index_increment: IndexIncrement::ByCount,
            ..Quirks::default()
        };
        assert_eq!(run_with(by_count, &rom, 2).index(), 0x304);

        let unchanged = Quirks {
            index_increment: IndexIncrement::Unchanged,
            ..Quirks::default()
        };
        assert_eq!(run_with(unchanged, &rom, 2).index(), 0x300);
    }

    #[test]
    fn timer_registers() {
        let mut chip8 = run(&[0x60, 0x20, 0xF0, 0x15, 0xF0, 0x18, 0xF1, 0x07], 3);
        assert_eq!(chip8.delay_timer(), 0x20);
        assert_eq!(chip8.sound_timer(), 0x20);
        chip8.tick_timers();
        chip8.step().unwrap();
        assert_eq!(chip8.registers()[1], 0x1F);
    }

    #[test]
    fn skip_on_key_state() {
        let mut chip8 = run(&[0x60, 0x05, 0xE0, 0x9E], 1);
        chip8.set_key(u4::new(5), true);
        chip8.step().unwrap();
        assert_eq!(chip8.pc(), 0x206);

        let mut chip8 = run(&[0x60, 0x05, 0xE0, 0x9E], 1);
        chip8.step().unwrap();
        assert_eq!(chip8.pc(), 0x204);

        let mut chip8 = run(&[0x60, 0x05, 0xE0, 0xA1], 1);
        chip8.step().unwrap();
        assert_eq!(chip8.pc(), 0x206);

        let mut chip8 = run(&[0x60, 0x05, 0xE0, 0xA1], 1);
        chip8.set_key(u4::new(5), true);
        chip8.step().unwrap();
        assert_eq!(chip8.pc(), 0x204);
    }

    #[test]
    fn wait_key_blocks_until_pressed() {
        let mut chip8 = run(&[0xF4, 0x0A], 0);
        for _ in 0..3 {
            assert_eq!(chip8.step().unwrap(), StepOutcome::WaitingForKey);
            assert_eq!(chip8.pc(), 0x200);
        }

        chip8.set_key(u4::new(3), true);
        assert_eq!(chip8.step().unwrap(), StepOutcome::Continue);
        assert_eq!(chip8.registers()[4], 3);
        assert_eq!(chip8.pc(), 0x202);
    }

    #[test]
    fn wait_key_takes_lowest_pressed_key() {
        let mut chip8 = run(&[0xF0, 0x0A], 0);
        chip8.set_key(u4::new(0xC), true);
        chip8.set_key(u4::new(0x7), true);
        chip8.step().unwrap();
        assert_eq!(chip8.registers()[0], 0x7);
    }

    #[test]
    fn draw_sets_pixels_and_reports_collision() {
        // I = font glyph 0, draw it at (0, 0) twice
        let rom = [0xA0, 0x50, 0xD0, 0x05, 0xD0, 0x05];
        let mut chip8 = run(&rom, 1);

        assert_eq!(chip8.step().unwrap(), StepOutcome::Drew);
        assert_eq!(chip8.registers()[0xF], 0);
        assert!((0..4).all(|x| chip8.pixel(x, 0)));
        assert!(chip8.pixel(0, 1) && !chip8.pixel(1, 1) && chip8.pixel(3, 1));

        chip8.step().unwrap();
        assert_eq!(chip8.registers()[0xF], 1);
        assert!(chip8.display().iter().all(|&p| !p));
    }

    #[test]
    fn draw_clears_stale_vf() {
        let chip8 = run(&[0x6F, 0x01, 0xA0, 0x50, 0xD0, 0x01], 3);
        assert_eq!(chip8.registers()[0xF], 0);
    }

    #[test]
    fn draw_clips_at_edges() {
        // Full 8-pixel row at (60, 31): only four columns and one row land on screen
        let rom = [0x60, 60, 0x61, 31, 0xA2, 0x0A, 0xD0, 0x12, 0x00, 0x00, 0xFF, 0xFF];
        let chip8 = run(&rom, 4);
        let lit: Vec<(usize, usize)> = (0..DISPLAY_Y)
            .flat_map(|y| (0..DISPLAY_X).map(move |x| (x, y)))
            .filter(|&(x, y)| chip8.pixel(x, y))
            .collect();
        assert_eq!(lit, vec![(60, 31), (61, 31), (62, 31), (63, 31)]);
    }

    #[test]
    fn draw_wraps_start_position() {
        let rom = [0x60, 64 + 2, 0x61, 32 + 1, 0xA0, 0x50, 0xD0, 0x11];
        let chip8 = run(&rom, 4);
        assert!(chip8.pixel(2, 1));
        assert!(chip8.pixel(5, 1));
    }

    #[test]
    fn unknown_opcode_continues() {
        let mut chip8 = run(&[0x01, 0x23, 0x60, 0x01], 0);
        assert_eq!(
            chip8.step().unwrap(),
            StepOutcome::Unrecognized { opcode: 0x0123 }
        );
        assert!(!chip8.is_halted());
        assert_eq!(chip8.pc(), 0x202);
        chip8.step().unwrap();
        assert_eq!(chip8.registers()[0], 1);
    }
}
