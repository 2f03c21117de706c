//! Gap-filling identity id allocation.
//!
//! Ids are badge numbers, so a deleted identity's id is handed out again
//! instead of growing the id space. The smallest positive id not currently
//! in use wins.

use crate::types::IdentityId;

/// Compute the next identity id from the ids currently in use
///
/// Returns `None` only when every id up to `u32::MAX` is taken. Zero is never
/// a valid identity id and is ignored if present.
pub fn next_identity_id<I>(existing: I) -> Option<IdentityId>
where
    I: IntoIterator<Item = IdentityId>,
{
    let mut ids: Vec<IdentityId> = existing.into_iter().filter(|id| *id > 0).collect();
    ids.sort_unstable();
    ids.dedup();

    let mut candidate: IdentityId = 1;
    for id in ids {
        if id > candidate {
            // First hole after the run that starts at 1
            return Some(candidate);
        }
        candidate = id.checked_add(1)?;
    }

    Some(candidate)
}
