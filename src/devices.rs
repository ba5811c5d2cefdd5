//! The capability traits over which the chip reaches the outside world.
//!
//! The chip itself never owns a window, an audio device or the keyboard
//! state, it only consumes these two interfaces, so the front end is free
//! to implement them however it likes.

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for the display based side effects
pub trait DisplayCommands {
    /// Will clear the display, all pixels off
    fn clear(&mut self);

    /// XORs the pixel at `(x, y)` with `value` and reports whether the
    /// pixel flipped from set to unset.
    ///
    /// Coordinates are taken modulo the display width and height, sprites
    /// wrap around the frame.
    fn set_pixel(&mut self, x: usize, y: usize, value: bool) -> bool;

    /// Emits a single audible pulse
    fn buzz(&mut self);
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for reading the keypad state
///
/// Input is done with a hex keyboard that has 16 keys ranging `0-F`. Three
/// opcodes are used to detect input. One skips an instruction if a specific
/// key is pressed, while another does the same if a specific key is not
/// pressed. The third waits for a key press, and then stores it in one of
/// the data registers.
pub trait KeyboardCommands {
    /// Checks if the given key `0x0-0xF` is currently held down
    fn is_pressed(&self, key: u8) -> bool;

    /// Returns the most recent key press since the previous poll, if any.
    ///
    /// This is the non blocking half of the key wait opcode, the chip polls
    /// it on every instruction tick while it is suspended, so the driver
    /// loop never freezes.
    fn last_pressed(&self) -> Option<u8>;
}
