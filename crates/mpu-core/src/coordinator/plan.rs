//! Turn a wave's destination list into upload jobs.

use std::collections::HashSet;

use super::outcome::FailedPart;
use crate::chunker::Part;
use crate::remote::PresignedUrl;
use crate::session::ReceiptSet;

/// Jobs to run for one wave plus entries that were set aside.
#[derive(Debug, Default)]
pub struct WavePlan {
    pub jobs: Vec<(Part, String)>,
    /// Entries that cannot be honoured (unknown or duplicated part numbers).
    pub rejected: Vec<FailedPart>,
    /// Entries for parts that already have a receipt; never uploaded twice.
    pub already_confirmed: Vec<u32>,
}

/// Match destinations against the part plan.
///
/// `parts` must be the full plan (index = part number - 1).
pub fn plan_wave(urls: &[PresignedUrl], parts: &[Part], confirmed: &ReceiptSet) -> WavePlan {
    let mut plan = WavePlan::default();
    let mut seen = HashSet::new();
    for entry in urls {
        let n = entry.part_number;
        let part = match n.checked_sub(1).and_then(|i| parts.get(i as usize)) {
            Some(p) => *p,
            None => {
                tracing::warn!(part = n, "remote offered a part number outside the plan");
                plan.rejected.push(FailedPart {
                    part_number: n,
                    reason: "part number outside the plan".into(),
                });
                continue;
            }
        };
        if !seen.insert(n) {
            tracing::warn!(part = n, "remote offered the same part twice in one wave");
            plan.rejected.push(FailedPart {
                part_number: n,
                reason: "duplicate destination in wave".into(),
            });
            continue;
        }
        if confirmed.contains(n) {
            tracing::debug!(part = n, "skipping already confirmed part");
            plan.already_confirmed.push(n);
            continue;
        }
        plan.jobs.push((part, entry.url.clone()));
    }
    plan
}
