//! Expiry policy - a post is visible for 24 hours after creation.
//!
//! Visibility is always computed against the caller's `now`; nothing about
//! expiry is stored on the post itself.

use std::fmt;

use super::Post;

/// Lifetime of a post in milliseconds.
pub const EXPIRY_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

const MINUTE_MS: i64 = 60 * 1000;
const HOUR_MS: i64 = 60 * MINUTE_MS;

/// Whether `post` is still visible at `now` (milliseconds since epoch).
///
/// Posts stamped in the future are visible.
pub fn is_visible(post: &Post, now: i64) -> bool {
    now.saturating_sub(post.created_at) < EXPIRY_WINDOW_MS
}

/// The visible posts, in input order.
pub fn filter_visible(posts: Vec<Post>, now: i64) -> Vec<Post> {
    posts.into_iter().filter(|p| is_visible(p, now)).collect()
}

/// Drop expired posts in place and return how many were removed.
pub fn retain_visible(posts: &mut Vec<Post>, now: i64) -> usize {
    let before = posts.len();
    posts.retain(|p| is_visible(p, now));
    before - posts.len()
}

/// Coarse, human readable age of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeLabel {
    Minutes(i64),
    Hours(i64),
    OverADay,
}

pub fn age_label(created_at: i64, now: i64) -> AgeLabel {
    let age = now.saturating_sub(created_at).max(0);
    if age < HOUR_MS {
        AgeLabel::Minutes(age / MINUTE_MS)
    } else if age < EXPIRY_WINDOW_MS {
        AgeLabel::Hours(age / HOUR_MS)
    } else {
        AgeLabel::OverADay
    }
}

impl fmt::Display for AgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgeLabel::Minutes(1) => write!(f, "1 minute ago"),
            AgeLabel::Minutes(n) => write!(f, "{n} minutes ago"),
            AgeLabel::Hours(1) => write!(f, "1 hour ago"),
            AgeLabel::Hours(n) => write!(f, "{n} hours ago"),
            AgeLabel::OverADay => write!(f, "more than 24 hours ago"),
        }
    }
}
