//! Checkpoint codec: `ScanState` to and from a fixed-size byte buffer.
//!
//! Layout (little-endian):
//!
//! ```text
//! version:u8 | mode:u8 | bracket_depth:u16 | n_indents:u16 | indent:u16 * n_indents
//!            | n_delims:u16 | (quote:u8 | flags:u8 | interpolation:u16) * n_delims
//! ```
//!
//! `interpolation == 0xFFFF` means no interpolation is open. An empty buffer decodes to the
//! initial state, which is what the host passes before the first scan.
//!
//! Decoding is strict. A buffer that does not describe a state the scanner could have produced is
//! rejected rather than repaired, so a corrupted checkpoint can never steer a rescan.

use super::state::{Delimiter, LexicalMode, ScanState};
use crate::diagnostics::CheckpointError;

/// Capacity of the host's checkpoint buffer.
pub const SERIALIZATION_BUFFER_SIZE: usize = 1024;

pub const CHECKPOINT_VERSION: u8 = 1;

const NO_INTERPOLATION: u16 = u16::MAX;

const FLAG_TRIPLE: u8 = 0b0001;
const FLAG_RAW: u8 = 0b0010;
const FLAG_FORMAT: u8 = 0b0100;
const FLAG_BYTES: u8 = 0b1000;
const FLAG_MASK: u8 = FLAG_TRIPLE | FLAG_RAW | FLAG_FORMAT | FLAG_BYTES;

const HEADER_LEN: usize = 6;

/// Bytes needed to encode `state`.
pub fn encoded_len(state: &ScanState) -> usize {
    HEADER_LEN + 2 * state.indents.len() + 2 + 4 * state.delimiters.len()
}

/// Write `state` into `buffer`, returning the number of bytes used.
pub fn encode(state: &ScanState, buffer: &mut [u8]) -> Result<usize, CheckpointError> {
    let needed = encoded_len(state);
    let capacity = buffer.len().min(SERIALIZATION_BUFFER_SIZE);
    if needed > capacity {
        return Err(CheckpointError::StateTooLarge { needed, capacity });
    }

    let mut writer = Writer { buffer, pos: 0 };
    writer.u8(CHECKPOINT_VERSION);
    writer.u8(state.mode.to_byte());
    writer.u16(state.bracket_depth);
    writer.u16(count(state.indents.len()));
    for &indent in &state.indents {
        writer.u16(indent);
    }
    writer.u16(count(state.delimiters.len()));
    for delimiter in &state.delimiters {
        writer.u8(delimiter.quote as u8);
        writer.u8(flags_of(delimiter));
        writer.u16(delimiter.interpolation.unwrap_or(NO_INTERPOLATION));
    }
    debug_assert_eq!(writer.pos, needed);
    Ok(writer.pos)
}

/// Encode into a fresh vector.
pub fn encode_to_vec(state: &ScanState) -> Result<Vec<u8>, CheckpointError> {
    let mut buffer = [0u8; SERIALIZATION_BUFFER_SIZE];
    let len = encode(state, &mut buffer)?;
    Ok(buffer[..len].to_vec())
}

/// Decode a buffer written by [`encode`]. `bytes` must be exactly the written length.
pub fn decode(bytes: &[u8]) -> Result<ScanState, CheckpointError> {
    if bytes.is_empty() {
        return Ok(ScanState::default());
    }

    let mut reader = Reader { bytes, pos: 0 };
    let version = reader.u8()?;
    if version != CHECKPOINT_VERSION {
        return Err(CheckpointError::Version(version));
    }
    let mode_byte = reader.u8()?;
    let mode = LexicalMode::from_byte(mode_byte).ok_or(CheckpointError::Mode(mode_byte))?;
    let bracket_depth = reader.u16()?;

    let n_indents = usize::from(reader.u16()?);
    let mut indents = Vec::with_capacity(n_indents);
    for _ in 0..n_indents {
        indents.push(reader.u16()?);
    }
    if indents.first() != Some(&0) || indents.windows(2).any(|w| w[0] >= w[1]) {
        return Err(CheckpointError::Indents);
    }

    let n_delims = usize::from(reader.u16()?);
    let mut delimiters = Vec::with_capacity(n_delims);
    for _ in 0..n_delims {
        let quote = reader.u8()?;
        let flags = reader.u8()?;
        let interpolation = reader.u16()?;
        delimiters.push(delimiter_from(quote, flags, interpolation)?);
    }

    if reader.pos != bytes.len() {
        return Err(CheckpointError::TrailingBytes {
            extra: bytes.len() - reader.pos,
        });
    }

    check_interpolations(&delimiters, bracket_depth)?;

    let state = ScanState {
        indents,
        delimiters,
        bracket_depth,
        mode,
    };
    let derived = state.derived_mode();
    if mode != derived {
        return Err(CheckpointError::ModeMismatch {
            stored: mode.as_str(),
            derived: derived.as_str(),
        });
    }
    Ok(state)
}

fn count(len: usize) -> u16 {
    // Bounded by SERIALIZATION_BUFFER_SIZE, which `encode` checked first.
    u16::try_from(len).unwrap_or(u16::MAX)
}

fn flags_of(delimiter: &Delimiter) -> u8 {
    let mut flags = 0;
    if delimiter.triple {
        flags |= FLAG_TRIPLE;
    }
    if delimiter.raw {
        flags |= FLAG_RAW;
    }
    if delimiter.format {
        flags |= FLAG_FORMAT;
    }
    if delimiter.bytes {
        flags |= FLAG_BYTES;
    }
    flags
}

fn delimiter_from(quote: u8, flags: u8, interpolation: u16) -> Result<Delimiter, CheckpointError> {
    let quote = match quote {
        b'\'' => '\'',
        b'"' => '"',
        other => return Err(CheckpointError::Quote(other)),
    };
    let format = flags & FLAG_FORMAT != 0;
    let bytes = flags & FLAG_BYTES != 0;
    if flags & !FLAG_MASK != 0 || (format && bytes) {
        return Err(CheckpointError::Flags(flags));
    }
    Ok(Delimiter {
        quote,
        triple: flags & FLAG_TRIPLE != 0,
        raw: flags & FLAG_RAW != 0,
        format,
        bytes,
        interpolation: (interpolation != NO_INTERPOLATION).then_some(interpolation),
    })
}

/// Strings nest only through interpolations: every delimiter below the innermost one must be an
/// f-string with an open interpolation, opened at strictly increasing bracket depths.
fn check_interpolations(delimiters: &[Delimiter], bracket_depth: u16) -> Result<(), CheckpointError> {
    let bad = CheckpointError::Interpolation { bracket_depth };
    let mut floor: Option<u16> = None;
    for (i, d) in delimiters.iter().enumerate() {
        let is_innermost = i + 1 == delimiters.len();
        match d.interpolation {
            Some(at) => {
                if !d.format || at >= bracket_depth || floor.is_some_and(|f| at <= f) {
                    return Err(bad);
                }
                floor = Some(at);
            }
            None if !is_innermost => return Err(bad),
            None => {}
        }
    }
    Ok(())
}

struct Writer<'b> {
    buffer: &'b mut [u8],
    pos: usize,
}

impl Writer<'_> {
    fn u8(&mut self, value: u8) {
        self.buffer[self.pos] = value;
        self.pos += 1;
    }

    fn u16(&mut self, value: u16) {
        self.buffer[self.pos..self.pos + 2].copy_from_slice(&value.to_le_bytes());
        self.pos += 2;
    }
}

struct Reader<'b> {
    bytes: &'b [u8],
    pos: usize,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], CheckpointError> {
        let end = self.pos + N;
        let chunk = self.bytes.get(self.pos..end).ok_or(CheckpointError::Truncated {
            needed: end,
            found: self.bytes.len(),
        })?;
        self.pos = end;
        let mut out = [0u8; N];
        out.copy_from_slice(chunk);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, CheckpointError> {
        Ok(self.take::<1>()?[0])
    }

    fn u16(&mut self) -> Result<u16, CheckpointError> {
        Ok(u16::from_le_bytes(self.take::<2>()?))
    }
}
