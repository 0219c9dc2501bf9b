//! Full snapshot encoding

use super::{StateError, StateReader, StateWriter};

/// Writes every block verbatim into a fixed buffer
pub struct ContiguousWriter<'a> {
    out: &'a mut [u8],
    pos: usize,
}

impl<'a> ContiguousWriter<'a> {
    pub fn new(out: &'a mut [u8]) -> Self {
        Self { out, pos: 0 }
    }
}

impl StateWriter for ContiguousWriter<'_> {
    fn push_contiguous(&mut self, data: &[u8]) -> Result<(), StateError> {
        let end = self.pos + data.len();
        if end > self.out.len() {
            return Err(StateError::CapacityExceeded {
                required: end,
                capacity: self.out.len(),
            });
        }
        self.out[self.pos..end].copy_from_slice(data);
        self.pos = end;
        Ok(())
    }

    fn output_size(&self) -> usize {
        self.pos
    }
}

/// Reads every block verbatim from a buffer
pub struct ContiguousReader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> ContiguousReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }
}

impl StateReader for ContiguousReader<'_> {
    fn pop_contiguous(&mut self, out: &mut [u8]) -> Result<(), StateError> {
        let end = self.pos + out.len();
        if end > self.input.len() {
            return Err(StateError::Truncated {
                required: end,
                available: self.input.len(),
            });
        }
        out.copy_from_slice(&self.input[self.pos..end]);
        self.pos = end;
        Ok(())
    }

    fn input_size(&self) -> usize {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let mut buffer = [0u8; 6];
        let mut writer = ContiguousWriter::new(&mut buffer);
        writer.push_contiguous(&[1, 2]).unwrap();
        writer.push_differential(&[3, 4, 5, 6]).unwrap();
        assert_eq!(writer.output_size(), 6);
        assert_eq!(buffer, [1, 2, 3, 4, 5, 6]);

        let mut reader = ContiguousReader::new(&buffer);
        let mut a = [0u8; 2];
        let mut b = [0u8; 4];
        reader.pop_contiguous(&mut a).unwrap();
        reader.pop_differential(&mut b).unwrap();
        assert_eq!(a, [1, 2]);
        assert_eq!(b, [3, 4, 5, 6]);
        assert_eq!(reader.input_size(), 6);
    }

    #[test]
    fn test_overflow_is_an_error() {
        let mut buffer = [0u8; 3];
        let mut writer = ContiguousWriter::new(&mut buffer);
        writer.push_contiguous(&[1, 2]).unwrap();
        assert_eq!(
            writer.push_contiguous(&[3, 4]),
            Err(StateError::CapacityExceeded {
                required: 4,
                capacity: 3
            })
        );
        // Nothing partial is written
        assert_eq!(buffer, [1, 2, 0]);
    }

    #[test]
    fn test_truncated_input() {
        let buffer = [1u8, 2];
        let mut reader = ContiguousReader::new(&buffer);
        let mut out = [0u8; 3];
        assert_eq!(
            reader.pop_contiguous(&mut out),
            Err(StateError::Truncated {
                required: 3,
                available: 2
            })
        );
    }
}
