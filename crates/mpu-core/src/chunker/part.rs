//! Part type and split planning.

use std::ops::Range;

use crate::error::UploadError;

/// One part of a multipart upload: 1-based number and byte range [start, end) (half-open).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Part {
    /// Part number as used by the remote session (1-based).
    pub number: u32,
    /// Start offset (inclusive).
    pub start: u64,
    /// End offset (exclusive).
    pub end: u64,
}

impl Part {
    /// Length of this part in bytes.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn range(&self) -> Range<u64> {
        self.start..self.end
    }
}

/// Number of parts needed for `file_size` bytes at `part_size` bytes each (ceil division).
pub fn part_count(file_size: u64, part_size: u64) -> Result<u32, UploadError> {
    if part_size == 0 {
        return Err(UploadError::Configuration("part size must be greater than zero".into()));
    }
    let count = file_size.div_ceil(part_size);
    u32::try_from(count).map_err(|_| {
        UploadError::Configuration(format!(
            "{} parts of {} bytes exceed the part number range",
            count, part_size
        ))
    })
}

/// Builds the part plan for a file.
///
/// Parts are numbered from 1 and are all `part_size` long except possibly the last.
/// A zero-byte file has no parts.
pub fn split(file_size: u64, part_size: u64) -> Result<Vec<Part>, UploadError> {
    let count = part_count(file_size, part_size)?;
    let mut out = Vec::with_capacity(count as usize);
    for number in 1..=count {
        let start = u64::from(number - 1) * part_size;
        let end = start.saturating_add(part_size).min(file_size);
        out.push(Part { number, start, end });
    }
    Ok(out)
}
