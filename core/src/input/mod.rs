//! Controller and console input
//!
//! A move token from a sequence file is parsed into an [`InputFrame`]: the
//! state of both joystick ports plus the console switches for one step.
//!
//! # Token Formats
//!
//! - **Canonical**: `|<console>|<port 1>|<port 2>|`, one positional field per
//!   gamepad port (ports configured as `None` have no field).
//!   - console: `Prs12` (power, reset, select, left/right difficulty)
//!   - gamepad: `UDLRA` (up, down, left, right, fire)
//!   - `.` marks a released button, e.g. `|.....|U..RA|`
//! - **Compact**: `.` for an idle frame, or any set of distinct mnemonics
//!   from the port 1 gamepad and the console, e.g. `U`, `RA`, `r`.

mod parser;

pub use parser::{ControllerParser, InputError};

use std::fmt;
use std::str::FromStr;

bitflags::bitflags! {
    /// Joystick buttons for a gamepad port
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GamepadButtons: u8 {
        const UP = 0b0000_0001;
        const DOWN = 0b0000_0010;
        const LEFT = 0b0000_0100;
        const RIGHT = 0b0000_1000;
        const FIRE = 0b0001_0000;
    }
}

bitflags::bitflags! {
    /// Console front panel switches
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ConsoleButtons: u8 {
        const POWER = 0b0000_0001;
        const RESET = 0b0000_0010;
        const SELECT = 0b0000_0100;
        const LEFT_DIFFICULTY = 0b0000_1000;
        const RIGHT_DIFFICULTY = 0b0001_0000;
    }
}

/// Positional mnemonics for the gamepad field, in field order
pub(crate) const GAMEPAD_MNEMONICS: [(char, GamepadButtons); 5] = [
    ('U', GamepadButtons::UP),
    ('D', GamepadButtons::DOWN),
    ('L', GamepadButtons::LEFT),
    ('R', GamepadButtons::RIGHT),
    ('A', GamepadButtons::FIRE),
];

/// Positional mnemonics for the console field, in field order
pub(crate) const CONSOLE_MNEMONICS: [(char, ConsoleButtons); 5] = [
    ('P', ConsoleButtons::POWER),
    ('r', ConsoleButtons::RESET),
    ('s', ConsoleButtons::SELECT),
    ('1', ConsoleButtons::LEFT_DIFFICULTY),
    ('2', ConsoleButtons::RIGHT_DIFFICULTY),
];

/// Controller port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    One,
    Two,
}

impl Port {
    pub(crate) fn index(self) -> usize {
        match self {
            Port::One => 0,
            Port::Two => 1,
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Port::One => write!(f, "1"),
            Port::Two => write!(f, "2"),
        }
    }
}

/// Device plugged into a controller port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PortKind {
    #[default]
    None,
    Gamepad,
}

impl FromStr for PortKind {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("none") {
            Ok(PortKind::None)
        } else if s.eq_ignore_ascii_case("gamepad") {
            Ok(PortKind::Gamepad)
        } else {
            Err(InputError::UnknownControllerType(s.to_string()))
        }
    }
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortKind::None => write!(f, "None"),
            PortKind::Gamepad => write!(f, "Gamepad"),
        }
    }
}

/// State of one controller port for a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PortInput {
    #[default]
    None,
    Gamepad(GamepadButtons),
}

impl PortInput {
    /// Button mask as the core sees it (unplugged ports read as released)
    pub fn code(&self) -> u8 {
        match self {
            PortInput::None => 0,
            PortInput::Gamepad(buttons) => buttons.bits(),
        }
    }
}

/// Structured input for one emulation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InputFrame {
    pub port1: PortInput,
    pub port2: PortInput,
    pub console: ConsoleButtons,
}

impl InputFrame {
    pub fn power(&self) -> bool {
        self.console.contains(ConsoleButtons::POWER)
    }

    pub fn reset(&self) -> bool {
        self.console.contains(ConsoleButtons::RESET)
    }

    pub fn select(&self) -> bool {
        self.console.contains(ConsoleButtons::SELECT)
    }

    pub fn left_difficulty(&self) -> bool {
        self.console.contains(ConsoleButtons::LEFT_DIFFICULTY)
    }

    pub fn right_difficulty(&self) -> bool {
        self.console.contains(ConsoleButtons::RIGHT_DIFFICULTY)
    }

    /// Get the input for a port
    pub fn port(&self, port: Port) -> PortInput {
        match port {
            Port::One => self.port1,
            Port::Two => self.port2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_kind_from_str() {
        assert_eq!("None".parse::<PortKind>().unwrap(), PortKind::None);
        assert_eq!("Gamepad".parse::<PortKind>().unwrap(), PortKind::Gamepad);
        assert_eq!("gamepad".parse::<PortKind>().unwrap(), PortKind::Gamepad);
        assert!(matches!(
            "Paddle".parse::<PortKind>(),
            Err(InputError::UnknownControllerType(ref s)) if s == "Paddle"
        ));
    }

    #[test]
    fn test_port_input_code() {
        assert_eq!(PortInput::None.code(), 0);
        let buttons = GamepadButtons::UP | GamepadButtons::FIRE;
        assert_eq!(PortInput::Gamepad(buttons).code(), 0b0001_0001);
    }

    #[test]
    fn test_frame_console_accessors() {
        let frame = InputFrame {
            console: ConsoleButtons::RESET | ConsoleButtons::RIGHT_DIFFICULTY,
            ..Default::default()
        };
        assert!(frame.reset());
        assert!(frame.right_difficulty());
        assert!(!frame.power());
        assert!(!frame.select());
        assert!(!frame.left_difficulty());
    }
}
