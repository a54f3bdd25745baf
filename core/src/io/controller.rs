use std::fmt;
use std::sync::Arc;

use bitflags::*;
use itertools::Itertools;
use parking_lot::Mutex;

use crate::error::DeviceError;

bitflags! {
    /// Button masks of the 16-bit controller register.
    ///
    /// The register is active low: a set bit means the button is *released*.
    /// Bits 3..0 are unused and always read as set.
    #[derive(Default)]
    pub struct Buttons: u16 {
        const B      = 1 << 15;
        const Y      = 1 << 14;
        const SELECT = 1 << 13;
        const START  = 1 << 12;
        const UP     = 1 << 11;
        const DOWN   = 1 << 10;
        const LEFT   = 1 << 9;
        const RIGHT  = 1 << 8;
        const A      = 1 << 7;
        const X      = 1 << 6;
        const L      = 1 << 5;
        const R      = 1 << 4;
    }
}

const UNUSED_BITS: u16 = 0x000F;

const BUTTON_NAMES: [(Buttons, &str); 12] = [
    (Buttons::B, "B"),
    (Buttons::Y, "Y"),
    (Buttons::SELECT, "SELECT"),
    (Buttons::START, "START"),
    (Buttons::UP, "UP"),
    (Buttons::DOWN, "DOWN"),
    (Buttons::LEFT, "LEFT"),
    (Buttons::RIGHT, "RIGHT"),
    (Buttons::A, "A"),
    (Buttons::X, "X"),
    (Buttons::L, "L"),
    (Buttons::R, "R"),
];

/// A snapshot of the controller register.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ControllerState(u16);

impl ControllerState {
    pub const fn from_raw(raw: u16) -> Self {
        ControllerState(raw)
    }

    /// The active-low register value.
    pub fn raw(&self) -> u16 {
        self.0
    }

    /// True if every button in `buttons` is held down.
    pub fn is_pressed(&self, buttons: Buttons) -> bool {
        self.0 & buttons.bits() == 0
    }

    /// True if every button in `buttons` is up.
    pub fn is_released(&self, buttons: Buttons) -> bool {
        self.0 & buttons.bits() == buttons.bits()
    }

    pub fn pressed(&self) -> Buttons {
        Buttons::from_bits_truncate(!self.0)
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        ControllerState(0xFFFF)
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pressed = self.pressed();
        if pressed.is_empty() {
            return write!(f, "-");
        }
        let names = BUTTON_NAMES
            .iter()
            .filter(|(button, _)| pressed.contains(*button))
            .map(|(_, name)| name)
            .join(" ");
        write!(f, "{}", names)
    }
}

#[derive(Debug)]
struct Register {
    value: u16,
    connected: bool,
}

/// The controller input register. Cloning yields another handle to the same register.
///
/// Reading does not require ownership. The simulation side (`press`, `release`,
/// `disconnect`) stands in for the physical controller.
#[derive(Debug, Clone)]
pub struct Controller {
    register: Arc<Mutex<Register>>,
}

impl Controller {
    pub fn new() -> Self {
        Controller {
            register: Arc::new(Mutex::new(Register {
                value: 0xFFFF,
                connected: true,
            })),
        }
    }

    /// Reads the current button state.
    pub fn state(&self) -> Result<ControllerState, DeviceError> {
        let register = self.register.lock();
        if !register.connected {
            return Err(DeviceError::InputUnavailable);
        }
        Ok(ControllerState(register.value | UNUSED_BITS))
    }

    pub fn press(&self, buttons: Buttons) {
        self.register.lock().value &= !buttons.bits();
    }

    pub fn release(&self, buttons: Buttons) {
        self.register.lock().value |= buttons.bits();
    }

    /// Replaces the whole register with the given set of held buttons.
    pub fn set_pressed(&self, buttons: Buttons) {
        self.register.lock().value = !buttons.bits();
    }

    pub fn disconnect(&self) {
        log::warn!("Controller disconnected");
        self.register.lock().connected = false;
    }

    pub fn connect(&self) {
        self.register.lock().connected = true;
    }
}

impl Default for Controller {
    fn default() -> Self {
        Controller::new()
    }
}
