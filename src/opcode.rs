//! Opcode abstractions, field extraction and the decoded instruction set.
use crate::{
    definitions::{cpu, memory},
    OpcodeError,
};

/// the mask for the first four bits
pub(crate) const OPCODE_MASK_F000: u16 = 0xF000;

/// the mask for the last twelve bits
pub(crate) const OPCODE_MASK_0FFF: u16 = 0x0FFF;

/// the mask for the last eight bits
pub(crate) const OPCODE_MASK_00FF: u16 = 0x00FF;

/// the mask for the last four bits
pub(crate) const OPCODE_MASK_000F: u16 = 0x000F;

/// the size of a single byte
const BYTE_SIZE: u16 = 0x8;

/// a wrapper type for u16 to make it clear what is meant to be used
pub type Opcode = u16;

/// will build an opcode from data and the given point
///
/// # Arguments
///
/// - `data` - A slice of u8 data entries used to generate the opcodes
/// - `pointer` - Where in the data the opcode shall be extracted, so `pointer` and `pointer + 1`
/// make the opcode up
///
/// # Example
/// ```rust
/// # use chip::opcode::*;
///  const OPCODES: [Opcode; 2] = [0x00EE, 0x1EDA];
///  const SPLIT_OPCODE: [u8; 4] = [0x00, 0xEE, 0x1E, 0xDA];
///  for (i, val) in OPCODES.iter().enumerate() {
///      let opcode = build_opcode(&SPLIT_OPCODE, i * 2).expect("This will work.");
///      assert_eq!(opcode, *val);
///  }
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, OpcodeError> {
    // controlling that there is no illegal access here
    if pointer + 1 < data.len() {
        Ok(Opcode::from_be_bytes([data[pointer], data[pointer + 1]]))
    } else {
        Err(OpcodeError::MemoryInvalid {
            pointer,
            len: data.len(),
        })
    }
}

/// These are special traits used to filter out information
/// from opcodes
pub trait OpcodeTrait {
    /// the opcode family, so the topmost nibble moved down to `0x0-0xF`
    fn t(&self) -> usize;

    /// the bottom twelve bits, used as call and jump targets
    fn nnn(&self) -> usize;

    /// the bottom byte, used as an immediate operand
    fn nn(&self) -> u8;

    /// the topmost byte
    fn high(&self) -> u8;

    /// the second nibble, used as a register index
    fn x(&self) -> usize;

    /// the third nibble, used as a register index
    fn y(&self) -> usize;

    /// the bottom nibble, used as a sub opcode or sprite height
    fn n(&self) -> usize;
}

impl OpcodeTrait for Opcode {
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.t(), 0x1);
    /// ```
    fn t(&self) -> usize {
        ((self & OPCODE_MASK_F000) >> (3 * 4)) as usize
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.nnn(), 0xEDA)
    /// ```
    fn nnn(&self) -> usize {
        (self & OPCODE_MASK_0FFF) as usize
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.nn(), 0xDA)
    /// ```
    fn nn(&self) -> u8 {
        (self & OPCODE_MASK_00FF) as u8
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.high(), 0x1E)
    /// ```
    fn high(&self) -> u8 {
        (self >> BYTE_SIZE) as u8
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.x(), 0xE);
    /// ```
    fn x(&self) -> usize {
        ((self & OPCODE_MASK_0FFF) >> BYTE_SIZE) as usize
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.y(), 0xD);
    /// ```
    fn y(&self) -> usize {
        ((self & OPCODE_MASK_00FF) >> (BYTE_SIZE / 2)) as usize
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.n(), 0xA);
    /// ```
    fn n(&self) -> usize {
        (self & OPCODE_MASK_000F) as usize
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents the program steps that the chip
/// can take.
pub enum ProgramCounterStep {
    /// Will not change the program counter
    None,
    /// Will move the program counter to the next opcode
    Next,
    /// Will move the program counter over the next opcode
    Skip,
    /// Will simply move the program counter to the given location.
    ///
    /// Attention this can __panic__ if there is an out of bound
    /// situation.
    Jump(usize),
}

impl ProgramCounterStep {
    /// Will return a Skip if the condition is true.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next, ProgramCounterStep::cond(false));
    /// assert_eq!(ProgramCounterStep::Skip, ProgramCounterStep::cond(true));
    /// ```
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::Next
        }
    }

    /// Maps the [`ProgramCounterStep`](ProgramCounterStep) to the corresponding movement distanz.
    #[inline]
    pub fn step(&self) -> usize {
        match *self {
            ProgramCounterStep::Next => memory::opcodes::SIZE,
            ProgramCounterStep::Skip => 2 * memory::opcodes::SIZE,
            ProgramCounterStep::None => 0,
            ProgramCounterStep::Jump(pointer) => {
                assert!(
                    cpu::PROGRAM_COUNTER <= pointer && pointer < memory::SIZE,
                    "Memory pointer '{:#06X}' is out of bounds error!",
                    pointer
                );

                pointer
            }
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents a command from the interpreter up to the gui.
pub enum Operation {
    /// If no action has to be taken.
    None,
    /// If the gui shall wait for the next key press
    Wait,
    /// A redraw command
    Draw,
}

/// The register to register operations of the `8XYT` opcode family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    /// `8XY0` Sets VX to the value of VY.
    Assign,
    /// `8XY1` Sets VX to VX or VY. (Bitwise OR operation)
    Or,
    /// `8XY2` Sets VX to VX and VY. (Bitwise AND operation)
    And,
    /// `8XY3` Sets VX to VX xor VY.
    Xor,
    /// `8XY4` Adds VY to VX. VF is set to 1 when there's a carry, and to 0 when there isn't.
    Add,
    /// `8XY5` VY is subtracted from VX. VF is set to 0 when there's a borrow, and 1 when
    /// there isn't.
    Sub,
    /// `8XY6` Stores the least significant bit of VX in VF and then shifts VX to the right
    /// by 1.
    ShiftRight,
    /// `8XY7` Sets VX to VY minus VX. VF is set to 0 when there's a borrow, and 1 when
    /// there isn't.
    SubReverse,
    /// `8XYE` Stores the most significant bit of VX in VF and then shifts VX to the left by 1.
    ShiftLeft,
}

/// A fully decoded instruction.
///
/// Splitting the decoding out from the execution keeps both halves
/// independently testable, the executor only ever sees valid
/// instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `00E0` Clears the screen.
    Clear,
    /// `00EE` Returns from a subroutine.
    Return,
    /// `1NNN` Jumps to address NNN.
    Jump { nnn: usize },
    /// `2NNN` Calls subroutine at NNN.
    Call { nnn: usize },
    /// `3XNN` Skips the next instruction if VX equals NN.
    SkipEqImm { x: usize, nn: u8 },
    /// `4XNN` Skips the next instruction if VX doesn't equal NN.
    SkipNeImm { x: usize, nn: u8 },
    /// `5XY0` Skips the next instruction if VX equals VY.
    SkipEqReg { x: usize, y: usize },
    /// `6XNN` Sets VX to NN.
    LoadImm { x: usize, nn: u8 },
    /// `7XNN` Adds NN to VX. (Carry flag is not changed)
    AddImm { x: usize, nn: u8 },
    /// `8XYT` Register to register arithmetic, see [`AluOp`](AluOp).
    Alu { op: AluOp, x: usize, y: usize },
    /// `9XY0` Skips the next instruction if VX doesn't equal VY.
    SkipNeReg { x: usize, y: usize },
    /// `ANNN` Sets I to the address NNN.
    LoadIndex { nnn: usize },
    /// `BNNN` Jumps to the address NNN plus V0.
    JumpOffset { nnn: usize },
    /// `CXNN` Sets VX to the result of a bitwise and operation on a random number and NN.
    Random { x: usize, nn: u8 },
    /// `DXYN` Draws a sprite at coordinate (VX, VY) that has a width of 8 pixels and a
    /// height of N pixels, read bit-coded from memory location I. VF is set to 1 if any
    /// screen pixels are flipped from set to unset.
    Draw { x: usize, y: usize, n: usize },
    /// `EX9E` / `EXA1` Skips the next instruction depending on whether the key stored in
    /// VX is pressed.
    SkipKey { x: usize, pressed: bool },
    /// `FX07` Sets VX to the value of the delay timer.
    GetDelay { x: usize },
    /// `FX0A` A key press is awaited, and then stored in VX. Only the instruction clock
    /// is halted until the next key event.
    WaitKey { x: usize },
    /// `FX15` Sets the delay timer to VX.
    SetDelay { x: usize },
    /// `FX18` Sets the sound timer to VX.
    SetSound { x: usize },
    /// `FX1E` Adds VX to I. VF is not affected and I is not masked to 12 bits.
    AddIndex { x: usize },
    /// `FX29` Sets I to the location of the sprite for the character in VX.
    FontIndex { x: usize },
    /// `FX33` Stores the binary-coded decimal representation of VX at I, I+1 and I+2.
    StoreBcd { x: usize },
    /// `FX55` Stores V0 to VX (including VX) in memory starting at address I.
    StoreRegisters { x: usize },
    /// `FX65` Fills V0 to VX (including VX) with values from memory starting at address I.
    LoadRegisters { x: usize },
}

impl Instruction {
    /// Will decode a raw opcode into its tagged representation.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// assert_eq!(
    ///     Instruction::decode(0x1ABC),
    ///     Ok(Instruction::Jump { nnn: 0xABC })
    /// );
    /// assert!(Instruction::decode(0x00E1).is_err());
    /// ```
    pub fn decode(opcode: Opcode) -> Result<Self, OpcodeError> {
        let invalid = Err(OpcodeError::InvalidOpcode(opcode));
        let (x, y) = (opcode.x(), opcode.y());

        let instruction = match opcode.t() {
            0x0 => match opcode {
                0x00E0 => Instruction::Clear,
                0x00EE => Instruction::Return,
                _ => return invalid,
            },
            0x1 => Instruction::Jump { nnn: opcode.nnn() },
            0x2 => Instruction::Call { nnn: opcode.nnn() },
            0x3 => Instruction::SkipEqImm { x, nn: opcode.nn() },
            0x4 => Instruction::SkipNeImm { x, nn: opcode.nn() },
            0x5 => match opcode.n() {
                0x0 => Instruction::SkipEqReg { x, y },
                _ => return invalid,
            },
            0x6 => Instruction::LoadImm { x, nn: opcode.nn() },
            0x7 => Instruction::AddImm { x, nn: opcode.nn() },
            0x8 => {
                let op = match opcode.n() {
                    0x0 => AluOp::Assign,
                    0x1 => AluOp::Or,
                    0x2 => AluOp::And,
                    0x3 => AluOp::Xor,
                    0x4 => AluOp::Add,
                    0x5 => AluOp::Sub,
                    0x6 => AluOp::ShiftRight,
                    0x7 => AluOp::SubReverse,
                    0xE => AluOp::ShiftLeft,
                    _ => return invalid,
                };
                Instruction::Alu { op, x, y }
            }
            0x9 => match opcode.n() {
                0x0 => Instruction::SkipNeReg { x, y },
                _ => return invalid,
            },
            0xA => Instruction::LoadIndex { nnn: opcode.nnn() },
            0xB => Instruction::JumpOffset { nnn: opcode.nnn() },
            0xC => Instruction::Random { x, nn: opcode.nn() },
            0xD => Instruction::Draw {
                x,
                y,
                n: opcode.n(),
            },
            0xE => match opcode.nn() {
                0x9E => Instruction::SkipKey { x, pressed: true },
                0xA1 => Instruction::SkipKey { x, pressed: false },
                _ => return invalid,
            },
            0xF => match opcode.nn() {
                0x07 => Instruction::GetDelay { x },
                0x0A => Instruction::WaitKey { x },
                0x15 => Instruction::SetDelay { x },
                0x18 => Instruction::SetSound { x },
                0x1E => Instruction::AddIndex { x },
                0x29 => Instruction::FontIndex { x },
                0x33 => Instruction::StoreBcd { x },
                0x55 => Instruction::StoreRegisters { x },
                0x65 => Instruction::LoadRegisters { x },
                _ => return invalid,
            },
            _ => return invalid,
        };

        Ok(instruction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_simple() {
        let conv = Instruction::decode(0x00E0);
        assert_eq!(conv, Ok(Instruction::Clear));
    }

    #[test]
    fn test_decode_simple_fail() {
        let conv = Instruction::decode(0x00E1);
        assert_eq!(conv, Err(OpcodeError::InvalidOpcode(0x00E1)));
    }

    #[test]
    fn test_decode_multiple() {
        let tests = [
            // Zero
            (0x00E0, Ok(Instruction::Clear)),
            (0x00EE, Ok(Instruction::Return)),
            (0x00E1, Err(())),
            // One
            (0x1919, Ok(Instruction::Jump { nnn: 0x919 })),
            // Two
            (0x2222, Ok(Instruction::Call { nnn: 0x222 })),
            // Three
            (0x3123, Ok(Instruction::SkipEqImm { x: 0x1, nn: 0x23 })),
            // Four
            (0x4123, Ok(Instruction::SkipNeImm { x: 0x1, nn: 0x23 })),
            // Five
            (0x5120, Ok(Instruction::SkipEqReg { x: 0x1, y: 0x2 })),
            (0x5121, Err(())),
            // Six
            (0x6123, Ok(Instruction::LoadImm { x: 0x1, nn: 0x23 })),
            // Seven
            (0x7123, Ok(Instruction::AddImm { x: 0x1, nn: 0x23 })),
            // Eight
            (
                0x8120,
                Ok(Instruction::Alu {
                    op: AluOp::Assign,
                    x: 0x1,
                    y: 0x2,
                }),
            ),
            (
                0x8121,
                Ok(Instruction::Alu {
                    op: AluOp::Or,
                    x: 0x1,
                    y: 0x2,
                }),
            ),
            (
                0x8122,
                Ok(Instruction::Alu {
                    op: AluOp::And,
                    x: 0x1,
                    y: 0x2,
                }),
            ),
            (
                0x8123,
                Ok(Instruction::Alu {
                    op: AluOp::Xor,
                    x: 0x1,
                    y: 0x2,
                }),
            ),
            (
                0x8124,
                Ok(Instruction::Alu {
                    op: AluOp::Add,
                    x: 0x1,
                    y: 0x2,
                }),
            ),
            (
                0x8125,
                Ok(Instruction::Alu {
                    op: AluOp::Sub,
                    x: 0x1,
                    y: 0x2,
                }),
            ),
            (
                0x8126,
                Ok(Instruction::Alu {
                    op: AluOp::ShiftRight,
                    x: 0x1,
                    y: 0x2,
                }),
            ),
            (
                0x8127,
                Ok(Instruction::Alu {
                    op: AluOp::SubReverse,
                    x: 0x1,
                    y: 0x2,
                }),
            ),
            (
                0x812E,
                Ok(Instruction::Alu {
                    op: AluOp::ShiftLeft,
                    x: 0x1,
                    y: 0x2,
                }),
            ),
            (0x8128, Err(())),
            // Nine
            (0x9120, Ok(Instruction::SkipNeReg { x: 0x1, y: 0x2 })),
            (0x9121, Err(())),
            // A
            (0xA222, Ok(Instruction::LoadIndex { nnn: 0x222 })),
            // B
            (0xB222, Ok(Instruction::JumpOffset { nnn: 0x222 })),
            // C
            (0xC123, Ok(Instruction::Random { x: 0x1, nn: 0x23 })),
            // D
            (
                0xD123,
                Ok(Instruction::Draw {
                    x: 0x1,
                    y: 0x2,
                    n: 0x3,
                }),
            ),
            // E
            (
                0xE19E,
                Ok(Instruction::SkipKey {
                    x: 0x1,
                    pressed: true,
                }),
            ),
            (
                0xE1A1,
                Ok(Instruction::SkipKey {
                    x: 0x1,
                    pressed: false,
                }),
            ),
            (0xE111, Err(())),
            // F
            (0xF007, Ok(Instruction::GetDelay { x: 0x0 })),
            (0xF00A, Ok(Instruction::WaitKey { x: 0x0 })),
            (0xF015, Ok(Instruction::SetDelay { x: 0x0 })),
            (0xF018, Ok(Instruction::SetSound { x: 0x0 })),
            (0xF01E, Ok(Instruction::AddIndex { x: 0x0 })),
            (0xF029, Ok(Instruction::FontIndex { x: 0x0 })),
            (0xF033, Ok(Instruction::StoreBcd { x: 0x0 })),
            (0xF055, Ok(Instruction::StoreRegisters { x: 0x0 })),
            (0xF065, Ok(Instruction::LoadRegisters { x: 0x0 })),
            (0xF0AA, Err(())),
        ];
        for (value, res) in tests {
            let conv = Instruction::decode(value);
            assert_eq!(conv, res.map_err(|_| OpcodeError::InvalidOpcode(value)));
        }
    }

    #[test]
    fn test_build_opcode_out_of_bounds() {
        let data = [0x00, 0xE0];
        assert_eq!(
            build_opcode(&data, 1),
            Err(OpcodeError::MemoryInvalid { pointer: 1, len: 2 })
        );
    }
}
