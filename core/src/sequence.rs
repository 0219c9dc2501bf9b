//! Move sequence files

use std::path::Path;

use crate::error::ReplayError;
use crate::input::{ControllerParser, InputError, InputFrame};

/// Parsed move sequence, with the source tokens kept for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySequence {
    tokens: Vec<String>,
    frames: Vec<InputFrame>,
}

impl ReplaySequence {
    /// Parse whitespace-separated move tokens in order
    pub fn parse(text: &str, parser: &ControllerParser) -> Result<Self, InputError> {
        let mut sequence = Self::default();
        for token in text.split_whitespace() {
            sequence.frames.push(parser.parse(token)?);
            sequence.tokens.push(token.to_string());
        }
        Ok(sequence)
    }

    pub fn from_file(path: &Path, parser: &ControllerParser) -> Result<Self, ReplayError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ReplayError::io("sequence file", path, e))?;
        let sequence = Self::parse(&text, parser)?;
        tracing::debug!(moves = sequence.len(), path = %path.display(), "sequence loaded");
        Ok(sequence)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[InputFrame] {
        &self.frames
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Token and parsed frame for each step
    pub fn iter(&self) -> impl Iterator<Item = (&str, &InputFrame)> {
        self.tokens.iter().map(String::as_str).zip(&self.frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ConsoleButtons, GamepadButtons, PortInput, PortKind};
    use tempfile::TempDir;

    fn gamepad_parser() -> ControllerParser {
        ControllerParser::with_ports(PortKind::Gamepad, PortKind::None)
    }

    #[test]
    fn test_parse_in_order() {
        let sequence = ReplaySequence::parse("U U\nL\tR  A\n", &gamepad_parser()).unwrap();
        assert_eq!(sequence.len(), 5);
        assert_eq!(sequence.tokens(), ["U", "U", "L", "R", "A"]);
        assert_eq!(
            sequence.frames()[2].port1,
            PortInput::Gamepad(GamepadButtons::LEFT)
        );
    }

    #[test]
    fn test_mixed_forms() {
        let sequence =
            ReplaySequence::parse("|.r...|.....| . RA", &gamepad_parser()).unwrap();
        let frames = sequence.frames();
        assert_eq!(frames[0].console, ConsoleButtons::RESET);
        assert_eq!(frames[1], InputFrame {
            port1: PortInput::Gamepad(GamepadButtons::empty()),
            ..Default::default()
        });
        assert_eq!(
            frames[2].port1,
            PortInput::Gamepad(GamepadButtons::RIGHT | GamepadButtons::FIRE)
        );
    }

    #[test]
    fn test_bad_token_fails_whole_sequence() {
        let parser = gamepad_parser();
        assert!(ReplaySequence::parse("U X", &parser).is_err());
    }

    #[test]
    fn test_empty_sequence() {
        let sequence = ReplaySequence::parse(" \n ", &gamepad_parser()).unwrap();
        assert!(sequence.is_empty());
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("moves.txt");
        std::fs::write(&path, "U D\n").unwrap();

        let sequence = ReplaySequence::from_file(&path, &gamepad_parser()).unwrap();
        let steps: Vec<_> = sequence.iter().map(|(token, _)| token).collect();
        assert_eq!(steps, ["U", "D"]);

        let err = ReplaySequence::from_file(&dir.path().join("nope.txt"), &gamepad_parser())
            .unwrap_err();
        assert!(matches!(err, ReplayError::Io { .. }));
    }
}
