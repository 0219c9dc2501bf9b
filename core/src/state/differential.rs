//! Differential snapshot encoding against a baseline
//!
//! The baseline is a full contiguous snapshot taken earlier, so the offset of
//! every block inside it equals the number of bytes pushed before that block.

use byteorder::{ByteOrder, LittleEndian};

use super::{DIFFERENTIAL_BLOCK_HEADER, RUN_HEADER, StateError, StateReader, StateWriter};

/// Reusable working memory for differential encoding
///
/// Holds the uncompressed run records of one block and its compressed form.
/// Buffers grow to the largest block seen and are then reused.
#[derive(Debug, Default)]
pub struct DiffScratch {
    runs: Vec<u8>,
    packed: Vec<u8>,
}

impl DiffScratch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            runs: Vec::with_capacity(capacity),
            packed: Vec::with_capacity(lz4_flex::block::get_maximum_output_size(capacity)),
        }
    }
}

/// Encodes a core's live state as changes against a baseline snapshot
///
/// `max_differences` bounds the encoded run bytes (run headers plus changed
/// bytes) of one snapshot; going over fails with
/// [`StateError::DifferenceBudgetExceeded`]. A payload never exceeds its raw
/// runs, so a buffer of `differential_state_size + max_differences` bytes
/// holds any snapshot within budget. Smaller buffers fail with
/// [`StateError::CapacityExceeded`].
pub struct DifferentialWriter<'a> {
    out: &'a mut [u8],
    pos: usize,
    baseline: &'a [u8],
    baseline_pos: usize,
    max_differences: usize,
    differences: usize,
    compress: bool,
    scratch: &'a mut DiffScratch,
}

impl<'a> DifferentialWriter<'a> {
    pub fn new(
        out: &'a mut [u8],
        baseline: &'a [u8],
        max_differences: usize,
        compress: bool,
        scratch: &'a mut DiffScratch,
    ) -> Self {
        Self {
            out,
            pos: 0,
            baseline,
            baseline_pos: 0,
            max_differences,
            differences: 0,
            compress,
            scratch,
        }
    }

    /// Run bytes encoded so far, counted against the budget
    pub fn differences(&self) -> usize {
        self.differences
    }

    fn capacity_error(&self, required: usize) -> StateError {
        StateError::CapacityExceeded {
            required,
            capacity: self.out.len(),
        }
    }

    /// Append run records for every changed region of `data`
    fn encode_runs(&mut self, data: &[u8], reference: &[u8]) -> Result<(), StateError> {
        self.scratch.runs.clear();

        let mut i = 0;
        while i < data.len() {
            if data[i] == reference[i] {
                i += 1;
                continue;
            }

            let start = i;
            while i < data.len() && data[i] != reference[i] {
                i += 1;
            }

            self.differences += RUN_HEADER + (i - start);
            if self.differences > self.max_differences {
                return Err(StateError::DifferenceBudgetExceeded {
                    differences: self.differences,
                    max: self.max_differences,
                });
            }

            let mut header = [0u8; RUN_HEADER];
            LittleEndian::write_u32(&mut header[..4], start as u32);
            LittleEndian::write_u32(&mut header[4..], (i - start) as u32);
            self.scratch.runs.extend_from_slice(&header);
            self.scratch.runs.extend_from_slice(&data[start..i]);
        }

        Ok(())
    }
}

impl StateWriter for DifferentialWriter<'_> {
    fn push_contiguous(&mut self, data: &[u8]) -> Result<(), StateError> {
        let end = self.pos + data.len();
        if end > self.out.len() {
            return Err(self.capacity_error(end));
        }
        self.out[self.pos..end].copy_from_slice(data);
        self.pos = end;
        self.baseline_pos += data.len();
        Ok(())
    }

    fn push_differential(&mut self, data: &[u8]) -> Result<(), StateError> {
        let start = self.baseline_pos;
        let end = start + data.len();
        let baseline = self.baseline;
        let reference = baseline.get(start..end).ok_or(StateError::BaselineMismatch {
            end,
            len: baseline.len(),
        })?;
        self.baseline_pos = end;

        self.encode_runs(data, reference)?;
        let raw_len = self.scratch.runs.len();

        // Unchanged blocks store an empty payload even when compressing.
        // Runs that LZ4 cannot shrink are stored raw (payload_len == raw_len).
        let scratch = &mut *self.scratch;
        let payload: &[u8] = if self.compress && raw_len > 0 {
            scratch
                .packed
                .resize(lz4_flex::block::get_maximum_output_size(raw_len), 0);
            let packed_len = lz4_flex::block::compress_into(&scratch.runs, &mut scratch.packed)
                .map_err(|e| StateError::Corrupt(e.to_string()))?;
            if packed_len < raw_len {
                &scratch.packed[..packed_len]
            } else {
                &scratch.runs
            }
        } else {
            &scratch.runs
        };
        let payload_len = payload.len();

        let payload_start = self.pos + DIFFERENTIAL_BLOCK_HEADER;
        let payload_end = payload_start + payload_len;
        if payload_end > self.out.len() {
            return Err(StateError::CapacityExceeded {
                required: payload_end,
                capacity: self.out.len(),
            });
        }
        self.out[payload_start..payload_end].copy_from_slice(payload);

        let header = &mut self.out[self.pos..payload_start];
        LittleEndian::write_u32(&mut header[..4], payload_len as u32);
        LittleEndian::write_u32(&mut header[4..], raw_len as u32);
        self.pos = payload_end;
        Ok(())
    }

    fn output_size(&self) -> usize {
        self.pos
    }
}

/// Rebuilds a core's state from a baseline snapshot and differential data
pub struct DifferentialReader<'a> {
    input: &'a [u8],
    pos: usize,
    baseline: &'a [u8],
    baseline_pos: usize,
    compress: bool,
    scratch: &'a mut DiffScratch,
}

impl<'a> DifferentialReader<'a> {
    pub fn new(
        input: &'a [u8],
        baseline: &'a [u8],
        compress: bool,
        scratch: &'a mut DiffScratch,
    ) -> Self {
        Self {
            input,
            pos: 0,
            baseline,
            baseline_pos: 0,
            compress,
            scratch,
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], StateError> {
        let input = self.input;
        let end = self.pos + len;
        let bytes = input.get(self.pos..end).ok_or(StateError::Truncated {
            required: end,
            available: input.len(),
        })?;
        self.pos = end;
        Ok(bytes)
    }
}

impl StateReader for DifferentialReader<'_> {
    fn pop_contiguous(&mut self, out: &mut [u8]) -> Result<(), StateError> {
        let bytes = self.take(out.len())?;
        out.copy_from_slice(bytes);
        self.baseline_pos += out.len();
        Ok(())
    }

    fn pop_differential(&mut self, out: &mut [u8]) -> Result<(), StateError> {
        let start = self.baseline_pos;
        let end = start + out.len();
        let reference = self.baseline.get(start..end).ok_or(StateError::BaselineMismatch {
            end,
            len: self.baseline.len(),
        })?;
        out.copy_from_slice(reference);
        self.baseline_pos = end;

        let header = self.take(DIFFERENTIAL_BLOCK_HEADER)?;
        let payload_len = LittleEndian::read_u32(&header[..4]) as usize;
        let raw_len = LittleEndian::read_u32(&header[4..]) as usize;
        let payload = self.take(payload_len)?;

        // Worst case is one run record per byte
        if raw_len > out.len() * (RUN_HEADER + 1) {
            return Err(StateError::Corrupt(format!(
                "{raw_len} bytes of runs for a {} byte block",
                out.len()
            )));
        }

        if self.compress && payload_len < raw_len {
            let runs = &mut self.scratch.runs;
            runs.clear();
            runs.resize(raw_len, 0);
            let decoded = lz4_flex::block::decompress_into(payload, runs)
                .map_err(|e| StateError::Corrupt(e.to_string()))?;
            if decoded != raw_len {
                return Err(StateError::Corrupt(format!(
                    "decompressed {decoded} bytes, expected {raw_len}"
                )));
            }
            apply_runs(runs, out)
        } else {
            if payload_len != raw_len {
                return Err(StateError::Corrupt(format!(
                    "payload is {payload_len} bytes but {raw_len} uncompressed"
                )));
            }
            apply_runs(payload, out)
        }
    }

    fn input_size(&self) -> usize {
        self.pos
    }
}

/// Overwrite the changed regions of `out` with the bytes from run records
fn apply_runs(mut runs: &[u8], out: &mut [u8]) -> Result<(), StateError> {
    while !runs.is_empty() {
        if runs.len() < RUN_HEADER {
            return Err(StateError::Corrupt("partial run header".to_string()));
        }
        let offset = LittleEndian::read_u32(&runs[..4]) as usize;
        let len = LittleEndian::read_u32(&runs[4..RUN_HEADER]) as usize;
        runs = &runs[RUN_HEADER..];

        let bytes = runs
            .get(..len)
            .ok_or_else(|| StateError::Corrupt(format!("run of {len} bytes is cut short")))?;
        let dst = out.get_mut(offset..offset + len).ok_or_else(|| {
            StateError::Corrupt(format!("run {offset}+{len} outside of block"))
        })?;
        dst.copy_from_slice(bytes);
        runs = &runs[len..];
    }
    Ok(())
}
