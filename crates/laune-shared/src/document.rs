//! The shared document: `{ "posts": [...] }`, read and written whole.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use laune_core::domain::Post;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedDocument {
    pub posts: Vec<Post>,
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Document is not valid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("Document is not a JSON object")]
    NotAnObject,
}

impl SharedDocument {
    pub fn new(posts: Vec<Post>) -> Self {
        Self { posts }
    }

    /// Parse document text.
    ///
    /// The text must be a JSON object. A missing or null `posts` field
    /// reads as an empty list, and entries that are not valid posts are
    /// skipped; see [`SharedDocument::decode_lenient`] to learn how many.
    pub fn decode(text: &str) -> Result<Self, DocumentError> {
        Self::decode_lenient(text).map(|(doc, _)| doc)
    }

    /// Like [`SharedDocument::decode`], also returning how many entries
    /// were discarded. A `posts` field that is not an array counts as one.
    pub fn decode_lenient(text: &str) -> Result<(Self, usize), DocumentError> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(mut object) = value else {
            return Err(DocumentError::NotAnObject);
        };

        let entries = match object.remove("posts") {
            None | Some(Value::Null) => return Ok((Self::default(), 0)),
            Some(Value::Array(entries)) => entries,
            Some(_) => return Ok((Self::default(), 1)),
        };

        let total = entries.len();
        let posts: Vec<Post> = entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect();
        let discarded = total - posts.len();
        Ok((Self { posts }, discarded))
    }

    /// Two-space indented JSON, the layout other clients write.
    pub fn encode_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laune_core::domain::{Mood, NewPost, PostId};

    fn sample() -> Post {
        Post::new(
            PostId::from("1"),
            NewPost::new(1.0, 2.0, Mood::Happy, "n", "c"),
            10,
        )
    }

    #[test]
    fn test_missing_or_malformed_posts_read_as_empty() {
        assert_eq!(SharedDocument::decode("{}").unwrap().posts, vec![]);
        assert_eq!(SharedDocument::decode(r#"{"posts":null}"#).unwrap().posts, vec![]);

        let (doc, discarded) = SharedDocument::decode_lenient(r#"{"posts":"oops"}"#).unwrap();
        assert!(doc.posts.is_empty());
        assert_eq!(discarded, 1);
    }

    #[test]
    fn test_bad_entries_are_skipped_one_by_one() {
        let text = r#"{"posts": [
            {"id":"1","lat":1.0,"lng":2.0,"mood":"happy","nickname":"n","comment":"c","timestamp":10},
            {"id":"2","lat":1.0,"lng":2.0,"mood":"angry","nickname":"n","comment":"c","timestamp":10},
            42
        ]}"#;

        let (doc, discarded) = SharedDocument::decode_lenient(text).unwrap();
        assert_eq!(doc.posts, vec![sample()]);
        assert_eq!(discarded, 2);

        let (_, discarded) =
            SharedDocument::decode_lenient(&SharedDocument::new(vec![sample()]).encode_pretty().unwrap())
                .unwrap();
        assert_eq!(discarded, 0);
    }

    #[test]
    fn test_rejects_non_object_and_bad_json() {
        assert!(matches!(
            SharedDocument::decode("[1,2]"),
            Err(DocumentError::NotAnObject)
        ));
        assert!(matches!(
            SharedDocument::decode("{not json"),
            Err(DocumentError::Syntax(_))
        ));
    }

    #[test]
    fn test_encode_is_pretty_printed() {
        let text = SharedDocument::new(vec![sample()]).encode_pretty().unwrap();
        assert!(text.starts_with("{\n  \"posts\": ["));
        assert_eq!(SharedDocument::decode(&text).unwrap().posts, vec![sample()]);
    }
}
