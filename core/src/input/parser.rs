//! Move token parser

use super::{
    CONSOLE_MNEMONICS, ConsoleButtons, GAMEPAD_MNEMONICS, GamepadButtons, InputFrame, Port,
    PortInput, PortKind,
};

/// Field separator for canonical tokens
const SEPARATOR: char = '|';

/// Released button marker
const RELEASED: char = '.';

/// Input parsing and controller configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// Controller type string is not a supported device
    #[error("input type not recognized: '{0}'")]
    UnknownControllerType(String),

    /// Token does not match the grammar for the configured ports
    #[error("move provided cannot be parsed: '{token}' ({reason})")]
    InvalidToken { token: String, reason: String },
}

impl InputError {
    fn invalid(token: &str, reason: impl Into<String>) -> Self {
        InputError::InvalidToken {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}

/// Parses move tokens according to the configured port devices
///
/// Both ports start unplugged; configure them with
/// [`set_port_type`](Self::set_port_type) before parsing.
#[derive(Debug, Clone, Default)]
pub struct ControllerParser {
    ports: [PortKind; 2],
}

impl ControllerParser {
    /// Create a parser with both ports unplugged
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with both ports configured
    pub fn with_ports(port1: PortKind, port2: PortKind) -> Self {
        Self {
            ports: [port1, port2],
        }
    }

    /// Configure a port from its textual type (`None` or `Gamepad`)
    pub fn set_port_type(&mut self, port: Port, kind: &str) -> Result<(), InputError> {
        self.ports[port.index()] = kind.parse()?;
        Ok(())
    }

    /// Device configured on a port
    pub fn port_kind(&self, port: Port) -> PortKind {
        self.ports[port.index()]
    }

    /// Parse a move token into an input frame
    pub fn parse(&self, token: &str) -> Result<InputFrame, InputError> {
        if token.is_empty() {
            return Err(InputError::invalid(token, "empty token"));
        }

        if token.starts_with(SEPARATOR) {
            self.parse_canonical(token)
        } else {
            self.parse_compact(token)
        }
    }

    fn parse_canonical(&self, token: &str) -> Result<InputFrame, InputError> {
        let inner = token
            .strip_prefix(SEPARATOR)
            .and_then(|t| t.strip_suffix(SEPARATOR))
            .ok_or_else(|| InputError::invalid(token, "missing closing separator"))?;

        let mut fields = inner.split(SEPARATOR);

        let console_field = fields
            .next()
            .ok_or_else(|| InputError::invalid(token, "missing console field"))?;
        let console = parse_positional(token, console_field, &CONSOLE_MNEMONICS)?;

        let mut frame = InputFrame {
            console,
            ..Default::default()
        };

        for port in [Port::One, Port::Two] {
            let input = match self.port_kind(port) {
                PortKind::None => PortInput::None,
                PortKind::Gamepad => {
                    let field = fields.next().ok_or_else(|| {
                        InputError::invalid(token, format!("missing field for port {port}"))
                    })?;
                    PortInput::Gamepad(parse_positional(token, field, &GAMEPAD_MNEMONICS)?)
                }
            };
            match port {
                Port::One => frame.port1 = input,
                Port::Two => frame.port2 = input,
            }
        }

        if fields.next().is_some() {
            return Err(InputError::invalid(token, "unexpected trailing field"));
        }

        Ok(frame)
    }

    fn parse_compact(&self, token: &str) -> Result<InputFrame, InputError> {
        let mut frame = InputFrame {
            port1: match self.port_kind(Port::One) {
                PortKind::None => PortInput::None,
                PortKind::Gamepad => PortInput::Gamepad(GamepadButtons::empty()),
            },
            port2: match self.port_kind(Port::Two) {
                PortKind::None => PortInput::None,
                PortKind::Gamepad => PortInput::Gamepad(GamepadButtons::empty()),
            },
            console: ConsoleButtons::empty(),
        };

        if token.len() == 1 && token.starts_with(RELEASED) {
            return Ok(frame);
        }

        for c in token.chars() {
            if let Some((_, flag)) = CONSOLE_MNEMONICS.iter().find(|(m, _)| *m == c) {
                if frame.console.contains(*flag) {
                    return Err(InputError::invalid(token, format!("duplicate '{c}'")));
                }
                frame.console.insert(*flag);
                continue;
            }

            let Some((_, flag)) = GAMEPAD_MNEMONICS.iter().find(|(m, _)| *m == c) else {
                return Err(InputError::invalid(token, format!("unknown button '{c}'")));
            };

            match &mut frame.port1 {
                PortInput::Gamepad(buttons) => {
                    if buttons.contains(*flag) {
                        return Err(InputError::invalid(token, format!("duplicate '{c}'")));
                    }
                    buttons.insert(*flag);
                }
                PortInput::None => {
                    return Err(InputError::invalid(
                        token,
                        format!("button '{c}' pressed but port 1 has no gamepad"),
                    ));
                }
            }
        }

        Ok(frame)
    }
}

/// Decode a fixed-width positional field into a button set
fn parse_positional<F>(token: &str, field: &str, mnemonics: &[(char, F)]) -> Result<F, InputError>
where
    F: bitflags::Flags + Copy,
{
    let width = mnemonics.len();
    if field.chars().count() != width {
        return Err(InputError::invalid(
            token,
            format!("field '{field}' must be {width} characters"),
        ));
    }

    let mut buttons = F::empty();
    for (c, (mnemonic, flag)) in field.chars().zip(mnemonics) {
        if c == *mnemonic {
            buttons.insert(*flag);
        } else if c != RELEASED {
            return Err(InputError::invalid(
                token,
                format!("expected '{mnemonic}' or '{RELEASED}', found '{c}'"),
            ));
        }
    }
    Ok(buttons)
}
