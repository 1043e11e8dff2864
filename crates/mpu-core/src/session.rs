//! Remote multipart session and the set of confirmed part receipts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chunker::{self, Part};
use crate::error::UploadError;

/// A multipart session as created by the remote. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    pub upload_id: String,
    pub bucket: String,
    pub object_key: String,
    pub total_size: u64,
    pub part_size: u64,
    pub total_parts: u32,
}

impl UploadSession {
    /// Build a session, deriving `total_parts` from size and part size.
    pub fn new(
        upload_id: String,
        bucket: String,
        object_key: String,
        total_size: u64,
        part_size: u64,
    ) -> Result<Self, UploadError> {
        let total_parts = chunker::part_count(total_size, part_size)?;
        Ok(Self {
            upload_id,
            bucket,
            object_key,
            total_size,
            part_size,
            total_parts,
        })
    }

    pub fn parts(&self) -> Result<Vec<Part>, UploadError> {
        chunker::split(self.total_size, self.part_size)
    }
}

/// Proof that one part is stored remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartReceipt {
    pub part_number: u32,
    pub etag: String,
}

/// Confirmed receipts keyed by part number. Grows only; the first receipt for
/// a part number is kept.
#[derive(Debug, Clone, Default)]
pub struct ReceiptSet {
    by_part: BTreeMap<u32, String>,
}

impl ReceiptSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a receipt. Returns false (and keeps the existing ETag) if the
    /// part was already confirmed.
    pub fn confirm(&mut self, receipt: PartReceipt) -> bool {
        if self.by_part.contains_key(&receipt.part_number) {
            return false;
        }
        self.by_part.insert(receipt.part_number, receipt.etag);
        true
    }

    pub fn contains(&self, part_number: u32) -> bool {
        self.by_part.contains_key(&part_number)
    }

    pub fn len(&self) -> usize {
        self.by_part.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_part.is_empty()
    }

    /// Receipts ordered by part number.
    pub fn to_vec(&self) -> Vec<PartReceipt> {
        self.by_part
            .iter()
            .map(|(n, etag)| PartReceipt {
                part_number: *n,
                etag: etag.clone(),
            })
            .collect()
    }

    /// Bytes covered by confirmed parts of `parts`.
    pub fn confirmed_bytes(&self, parts: &[Part]) -> u64 {
        parts
            .iter()
            .filter(|p| self.contains(p.number))
            .map(Part::len)
            .sum()
    }

    /// True if the confirmed part numbers are exactly `1..=total_parts`.
    pub fn covers(&self, total_parts: u32) -> bool {
        self.by_part.len() == total_parts as usize
            && self.by_part.keys().copied().eq(1..=total_parts)
    }

    /// Part numbers in `1..=total_parts` with no receipt yet.
    pub fn missing(&self, total_parts: u32) -> Vec<u32> {
        (1..=total_parts).filter(|n| !self.contains(*n)).collect()
    }
}
