use crate::{
    definitions::{cpu, display},
    devices::{DisplayCommands, KeyboardCommands},
    opcode::{AluOp, Instruction, Operation, ProgramCounterStep},
    ProcessError,
};

use super::ChipSet;

/// the width of a sprite row in pixels
const SPRITE_WIDTH: usize = 8;

impl ChipSet {
    /// Applies a single decoded instruction to the machine state.
    ///
    /// Returns the program counter movement the instruction asks for and
    /// the operation the driver shall act on. Every instruction except the
    /// explicit jump, call and return forms moves the counter to the next
    /// opcode, skips move it over one additional opcode.
    pub(super) fn execute<D, K>(
        &mut self,
        instruction: Instruction,
        display: &mut D,
        keyboard: &K,
    ) -> Result<(ProgramCounterStep, Operation), ProcessError>
    where
        D: DisplayCommands,
        K: KeyboardCommands,
    {
        log::debug!("opcode {:#06X} - {:?}", self.opcode, instruction);

        let mut operation = Operation::None;

        let step = match instruction {
            Instruction::Clear => {
                display.clear();
                operation = Operation::Draw;
                ProgramCounterStep::Next
            }
            Instruction::Return => {
                // return from sub routine => pop from stack
                ProgramCounterStep::Jump(self.pop_stack()?)
            }
            Instruction::Jump { nnn } => ProgramCounterStep::Jump(nnn),
            Instruction::Call { nnn } => {
                // set the program counter to the opcode after the call
                self.push_stack(self.program_counter + ProgramCounterStep::Next.step())?;
                ProgramCounterStep::Jump(nnn)
            }
            Instruction::SkipEqImm { x, nn } => ProgramCounterStep::cond(self.registers[x] == nn),
            Instruction::SkipNeImm { x, nn } => ProgramCounterStep::cond(self.registers[x] != nn),
            Instruction::SkipEqReg { x, y } => {
                ProgramCounterStep::cond(self.registers[x] == self.registers[y])
            }
            Instruction::LoadImm { x, nn } => {
                self.registers[x] = nn;
                ProgramCounterStep::Next
            }
            Instruction::AddImm { x, nn } => {
                // let VX overflow, but ignore carry
                self.registers[x] = self.registers[x].wrapping_add(nn);
                ProgramCounterStep::Next
            }
            Instruction::Alu { op, x, y } => {
                self.alu(op, x, y);
                ProgramCounterStep::Next
            }
            Instruction::SkipNeReg { x, y } => {
                ProgramCounterStep::cond(self.registers[x] != self.registers[y])
            }
            Instruction::LoadIndex { nnn } => {
                self.index_register = nnn;
                ProgramCounterStep::Next
            }
            Instruction::JumpOffset { nnn } => {
                ProgramCounterStep::Jump(self.registers[0] as usize + nnn)
            }
            Instruction::Random { x, nn } => {
                // using a fill bytes call here, as the trait RngCore does
                // not support random u8.
                let mut rand: [u8; 1] = [0];
                self.rng.fill_bytes(&mut rand);
                self.registers[x] = nn & rand[0];
                ProgramCounterStep::Next
            }
            Instruction::Draw { x, y, n } => {
                self.draw(x, y, n, display);
                operation = Operation::Draw;
                ProgramCounterStep::Next
            }
            Instruction::SkipKey { x, pressed } => {
                let held = keyboard.is_pressed(self.registers[x]);
                ProgramCounterStep::cond(if pressed { held } else { !held })
            }
            Instruction::GetDelay { x } => {
                self.registers[x] = self.delay_timer.get_value();
                ProgramCounterStep::Next
            }
            Instruction::WaitKey { x } => {
                // suspend the instruction clock until the keypad reports
                // the next press, the timer clock keeps running
                self.awaiting_key = Some(x);
                operation = Operation::Wait;
                ProgramCounterStep::None
            }
            Instruction::SetDelay { x } => {
                self.delay_timer.set_value(self.registers[x]);
                ProgramCounterStep::Next
            }
            Instruction::SetSound { x } => {
                self.sound_timer.set_value(self.registers[x]);
                ProgramCounterStep::Next
            }
            Instruction::AddIndex { x } => {
                // I is intentionally not masked to 12 bits here, the
                // historical interpreter leaves it unmasked
                let xi = self.registers[x] as usize;
                self.index_register = self.index_register.wrapping_add(xi);
                ProgramCounterStep::Next
            }
            Instruction::FontIndex { x } => {
                // the glyphs sit at the start of memory in character order,
                // 5 bytes each
                let val = self.registers[x] as usize;
                self.index_register = display::fontset::LOCATION + display::fontset::CHAR_SIZE * val;
                ProgramCounterStep::Next
            }
            Instruction::StoreBcd { x } => {
                let i = self.index_register;
                let r = self.registers[x];

                self.memory[i] = r / 100; // 246u8 / 100 => 2
                self.memory[i + 1] = r / 10 % 10; // 246u8 / 10 => 24 % 10 => 4
                self.memory[i + 2] = r % 10; // 246u8 % 10 => 6
                ProgramCounterStep::Next
            }
            Instruction::StoreRegisters { x } => {
                // I itself is left unmodified
                let i = self.index_register;
                self.memory[i..=(i + x)].copy_from_slice(&self.registers[..=x]);
                ProgramCounterStep::Next
            }
            Instruction::LoadRegisters { x } => {
                let i = self.index_register;
                self.registers[..=x].copy_from_slice(&self.memory[i..=(i + x)]);
                ProgramCounterStep::Next
            }
        };

        Ok((step, operation))
    }

    /// The register to register arithmetic of the `8XYT` opcode family.
    fn alu(&mut self, op: AluOp, x: usize, y: usize) {
        match op {
            AluOp::Assign => self.registers[x] = self.registers[y],
            AluOp::Or => self.registers[x] |= self.registers[y],
            AluOp::And => self.registers[x] &= self.registers[y],
            AluOp::Xor => self.registers[x] ^= self.registers[y],
            AluOp::Add => {
                let (res, carry) = self.registers[x].overflowing_add(self.registers[y]);
                self.registers[x] = res;
                self.registers[cpu::register::LAST] = carry as u8;
            }
            AluOp::Sub => {
                // VF is 1 when there is no borrow
                let (res, borrow) = self.registers[x].overflowing_sub(self.registers[y]);
                self.registers[x] = res;
                self.registers[cpu::register::LAST] = !borrow as u8;
            }
            AluOp::ShiftRight => {
                // the flag takes the pre-shift bit
                self.registers[cpu::register::LAST] = self.registers[x] & 1;
                self.registers[x] >>= 1;
            }
            AluOp::SubReverse => {
                let (res, borrow) = self.registers[y].overflowing_sub(self.registers[x]);
                self.registers[x] = res;
                self.registers[cpu::register::LAST] = !borrow as u8;
            }
            AluOp::ShiftLeft => {
                self.registers[cpu::register::LAST] = self.registers[x] >> 7;
                self.registers[x] <<= 1;
            }
        }
    }

    /// XOR-composites an `n` rows tall sprite from `memory[I..I + n)` onto
    /// the display at the origin `(VX, VY)`, most significant bit leftmost.
    ///
    /// `VF` reports if any pixel flipped from set to unset during the draw,
    /// the display implementation handles the coordinate wrap around.
    fn draw<D: DisplayCommands>(&mut self, x: usize, y: usize, n: usize, display: &mut D) {
        let index = self.index_register;
        let origin_x = self.registers[x] as usize;
        let origin_y = self.registers[y] as usize;

        // set VF to 0, a collision during the draw sets it back
        self.registers[cpu::register::LAST] = 0;

        for (row, byte) in self.memory[index..(index + n)].iter().enumerate() {
            for col in 0..SPRITE_WIDTH {
                let mask = 0x80 >> col;
                if byte & mask == 0 {
                    continue;
                }

                if display.set_pixel(origin_x + col, origin_y + row, true) {
                    self.registers[cpu::register::LAST] = 1;
                }
            }
        }
    }
}
