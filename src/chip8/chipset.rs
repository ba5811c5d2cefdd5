use std::time::Instant;

use rand::{rngs::SmallRng, RngCore, SeedableRng};

use crate::{
    definitions::{cpu, display, memory, timer},
    devices::{DisplayCommands, KeyboardCommands},
    opcode::{self, Instruction, Opcode, Operation, ProgramCounterStep},
    resources::Rom,
    timer::{Clock, Timer},
    ProcessError, StackError,
};

/// The ChipSet struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instant on the
/// Chip8 CPU.
pub struct ChipSet {
    /// name of the loaded rom
    pub(super) name: String,
    /// the currently fetched opcode, all two bytes long and stored big-endian
    pub(super) opcode: Opcode,
    /// - `0x000-0x04F` - Used for the built in `4x5` pixel font set (`0-F`)
    /// - `0x200-0xFFF` - Program ROM and work RAM
    pub(super) memory: Box<[u8]>,
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions; thus, it should be avoided. In an addition operation, `VF` is the carry flag,
    /// while in subtraction, it is the "no borrow" flag. In the draw instruction `VF` is set upon
    /// pixel collision.
    pub(super) registers: [u8; cpu::register::SIZE],
    /// The index for the register, this is a special register entry
    /// called index `I`. It is logically a 12-bit address, but kept
    /// unmasked the way the historical interpreter did.
    pub(super) index_register: usize,
    /// The program counter is a CPU register in the computer processor which has the address of the
    /// next instruction to be executed from memory.
    pub(super) program_counter: usize,
    /// The stack is only used to store return addresses when subroutines are called. The original
    /// [RCA 1802](https://de.wikipedia.org/wiki/RCA1802) version allocated `48` bytes for up to
    /// `12` levels of nesting; modern implementations usually have more.
    /// (here we are using `16`)
    pub(super) stack: Vec<usize>,
    /// Delay timer: This timer is intended to be used for timing the events of games. Its value
    /// can be set and read.
    /// Counts down at 60 hertz, until it reaches 0.
    pub(super) delay_timer: Timer,
    /// Sound timer: This timer is used for sound effects. While it drains
    /// a beeping sound is made.
    /// Counts down at 60 hertz, until it reaches 0.
    pub(super) sound_timer: Timer,
    /// Gates instruction execution at 500 hertz.
    pub(super) cpu_clock: Clock,
    /// Gates the countdown timer decrements at 60 hertz, independent of
    /// whether an instruction executed.
    pub(super) timer_clock: Clock,
    /// The register index a pending key wait will store its key into.
    /// While this is set the instruction clock is suspended, the timer
    /// clock keeps running.
    pub(super) awaiting_key: Option<usize>,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RngCore + Send>,
}

impl ChipSet {
    /// will create a new chipset object
    ///
    /// `now` arms both clocks, the same instant has to be the base of the
    /// later [`cycle`](ChipSet::cycle) calls.
    pub fn new(rom: Rom, now: Instant) -> Self {
        // initialize all the memory with 0
        let mut ram = vec![0; memory::SIZE].into_boxed_slice();

        // load fonts
        ram[display::fontset::LOCATION..][..display::fontset::FONTSET.len()]
            .copy_from_slice(&display::fontset::FONTSET);

        // write the rom data into memory, the rom length was validated on
        // construction
        ram[cpu::PROGRAM_COUNTER..][..rom.get_data().len()].copy_from_slice(rom.get_data());

        Self {
            name: rom.get_name().to_string(),
            opcode: 0,
            memory: ram,
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER,
            stack: Vec::with_capacity(cpu::stack::SIZE),
            delay_timer: Timer::default(),
            sound_timer: Timer::default(),
            cpu_clock: Clock::new(cpu::INTERVAL, now),
            timer_clock: Clock::new(timer::INTERVAL, now),
            awaiting_key: None,
            rng: Box::new(SmallRng::from_entropy()),
        }
    }

    /// Drives the machine up to the given point in time.
    ///
    /// Runs at most one fetch-decode-execute step, gated by the 500 hertz
    /// instruction clock, and decrements the countdown timers whenever the
    /// independent 60 hertz timer clock fires. A call is non blocking, even
    /// while a key wait is pending.
    pub fn cycle<D, K>(
        &mut self,
        now: Instant,
        display: &mut D,
        keyboard: &K,
    ) -> Result<Operation, ProcessError>
    where
        D: DisplayCommands,
        K: KeyboardCommands,
    {
        let mut operation = Operation::None;

        if self.cpu_clock.tick(now) {
            operation = self.next(display, keyboard)?;
        }

        if self.timer_clock.tick(now) {
            self.tick_timers(display);
        }

        Ok(operation)
    }

    /// will advance the program by a single step, ignoring the clocks
    pub fn next<D, K>(&mut self, display: &mut D, keyboard: &K) -> Result<Operation, ProcessError>
    where
        D: DisplayCommands,
        K: KeyboardCommands,
    {
        // a pending key wait suspends execution until the keypad reports
        // the next press
        if let Some(x) = self.awaiting_key {
            return Ok(match keyboard.last_pressed() {
                Some(key) => {
                    self.registers[x] = key & 0xF;
                    self.awaiting_key = None;
                    self.move_program_counter(ProgramCounterStep::Next);
                    Operation::None
                }
                None => Operation::Wait,
            });
        }

        // will build the opcode given from the pointer
        self.opcode = opcode::build_opcode(&self.memory, self.program_counter)
            .map_err(ProcessError::Opcode)?;

        let instruction = match Instruction::decode(self.opcode) {
            Ok(instruction) => instruction,
            Err(err) => {
                // an unsupported opcode does not halt the machine, it is
                // reported and skipped over
                log::warn!("{}", err);
                self.move_program_counter(ProgramCounterStep::Next);
                return Ok(Operation::None);
            }
        };

        let (step, operation) = self.execute(instruction, display, keyboard)?;
        self.move_program_counter(step);
        Ok(operation)
    }

    /// Decrements both countdown timers by one tick, the buzzer fires for
    /// every tick the sound timer is still draining.
    pub(super) fn tick_timers<D: DisplayCommands>(&mut self, display: &mut D) {
        self.delay_timer.decrement();
        if self.sound_timer.decrement() {
            display.buzz();
        }
    }

    /// will return the name of the loaded rom
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// will return the sound timer
    pub fn get_sound_timer(&self) -> u8 {
        self.sound_timer.get_value()
    }

    /// will return the delay timer
    pub fn get_delay_timer(&self) -> u8 {
        self.delay_timer.get_value()
    }

    /// will move the program counter forward by the given step
    pub(super) fn move_program_counter(&mut self, step: ProgramCounterStep) {
        self.program_counter = if let ProgramCounterStep::Jump(_) = step {
            step.step()
        } else {
            self.program_counter + step.step()
        }
    }

    /// Will push the current pointer to the stack.
    ///
    /// A full stack is a machine fault, the historical semantics leave the
    /// behavior undefined so it is reported instead of clamped.
    pub(super) fn push_stack(&mut self, pointer: usize) -> Result<(), StackError> {
        if self.stack.len() == cpu::stack::SIZE {
            Err(StackError::Full)
        } else {
            // push to stack
            self.stack.push(pointer);
            Ok(())
        }
    }

    /// Will pop the last return address from the stack, the vacated slot
    /// is dropped with the pop.
    pub(super) fn pop_stack(&mut self) -> Result<usize, StackError> {
        self.stack.pop().ok_or(StackError::Empty)
    }
}
