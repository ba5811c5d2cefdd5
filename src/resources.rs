use crate::{
    definitions::{cpu, memory},
    RomError,
};

/// The largest program that fits into ram behind the interpreter area.
pub const MAX_PROGRAM_SIZE: usize = memory::SIZE - cpu::PROGRAM_COUNTER;

#[derive(Clone)]
/// Represents a single validated rom with it's information
pub struct Rom {
    /// The rom name
    name: String,
    /// The raw program bytes, copied verbatim into memory starting at
    /// `0x200` on chip construction
    data: Box<[u8]>,
}

impl Rom {
    /// Will generate a new rom based of the given data.
    ///
    /// Programs that do not fit into memory are rejected up front, instead
    /// of being silently truncated while writing into ram.
    pub fn new(name: &str, data: &[u8]) -> Result<Self, RomError> {
        if data.len() > MAX_PROGRAM_SIZE {
            return Err(RomError::TooLarge {
                size: data.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }

        Ok(Rom {
            name: name.to_string(),
            data: data.into(),
        })
    }

    /// Will return a slice of the program bytes
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    /// Will return the name of the rom.
    pub fn get_name(&self) -> &str {
        &self.name
    }
}
