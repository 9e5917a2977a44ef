use std::sync::atomic::{AtomicI64, Ordering};

use super::PostId;

/// Issues timestamp-derived post ids that never repeat within the process.
///
/// The id is the creation millisecond, bumped past the last issued value
/// when two posts land in the same millisecond or the clock steps back.
#[derive(Debug, Default)]
pub struct PostIdGenerator {
    last: AtomicI64,
}

impl PostIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, now: i64) -> PostId {
        let mut issued = now;
        // fetch_update retries the closure on contention, so `issued` ends as the stored value
        let _ = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                issued = now.max(last.saturating_add(1));
                Some(issued)
            });
        PostId::new(issued.to_string())
    }
}
