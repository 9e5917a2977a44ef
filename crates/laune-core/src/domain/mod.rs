//! Domain entities - posts and the rules around their lifetime.

mod expiry;
mod id;
mod post;

pub use expiry::{AgeLabel, EXPIRY_WINDOW_MS, age_label, filter_visible, is_visible, retain_visible};
pub use id::PostIdGenerator;
pub use post::{Mood, NewPost, Post, PostId};
