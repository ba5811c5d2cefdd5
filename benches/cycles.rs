use std::time::Instant;

use chip::{
    chip8::ChipSet,
    devices::{DisplayCommands, KeyboardCommands},
    resources::Rom,
};
use criterion::{criterion_group, criterion_main, Criterion};

/// a display sink that swallows all side effects
struct NullDisplay;

impl DisplayCommands for NullDisplay {
    fn clear(&mut self) {}

    fn set_pixel(&mut self, _x: usize, _y: usize, _value: bool) -> bool {
        false
    }

    fn buzz(&mut self) {}
}

/// a keypad that never reports a press
struct NullKeyboard;

impl KeyboardCommands for NullKeyboard {
    fn is_pressed(&self, _key: u8) -> bool {
        false
    }

    fn last_pressed(&self) -> Option<u8> {
        None
    }
}

/// a tight arithmetic loop: V0 = 5, then increment and jump back forever
const PROGRAM: [u8; 6] = [0x60, 0x05, 0x70, 0x01, 0x12, 0x02];

fn get_default_chip() -> ChipSet {
    let rom = Rom::new("bench", &PROGRAM).expect("The bench program has to fit into memory.");
    ChipSet::new(rom, Instant::now())
}

pub fn step_bench(c: &mut Criterion) {
    let mut chip = get_default_chip();
    let mut display = NullDisplay;
    let keyboard = NullKeyboard;

    c.bench_function("step_bench", |b| {
        b.iter(|| {
            chip.next(&mut display, &keyboard)
                .expect("The bench program never faults.");
        });
    });
}

criterion_group!(benches, step_bench);
criterion_main!(benches);
