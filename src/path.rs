//! Logical path resolution against a nested archive
//!
//! A logical path is an ordered list of object keys (segments may contain
//! spaces). Resolution never fails: a missing segment or a null intermediate
//! simply yields "not found".

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

/// An ordered sequence of key segments into the archive
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogicalPath(Vec<String>);

impl LogicalPath {
    /// Split a dotted path on every `.`
    ///
    /// There is no escape mechanism, so a key containing a literal dot cannot
    /// be expressed this way; use [`LogicalPath::from_segments`] for those.
    pub fn parse(path: &str) -> Self {
        LogicalPath(path.split('.').map(str::to_string).collect())
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LogicalPath(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Resolve the path, returning `None` when any segment is unreachable
    pub fn get<'a>(&self, archive: &'a Value) -> Option<&'a Value> {
        let mut current = archive;
        for segment in &self.0 {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// True when the final key is present, even if its value is null
    pub fn exists(&self, archive: &Value) -> bool {
        self.get(archive).is_some()
    }

    /// Length of the array at this path, 0 for anything else
    pub fn length(&self, archive: &Value) -> usize {
        match self.get(archive) {
            Some(Value::Array(items)) => items.len(),
            _ => 0,
        }
    }

    /// Resolve to an array slice, empty when absent or not an array
    pub fn array<'a>(&self, archive: &'a Value) -> &'a [Value] {
        match self.get(archive) {
            Some(Value::Array(items)) => items,
            _ => &[],
        }
    }

    /// Resolve to an object, `None` when absent or not an object
    pub fn object<'a>(&self, archive: &'a Value) -> Option<&'a serde_json::Map<String, Value>> {
        self.get(archive).and_then(Value::as_object)
    }
}

impl fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl From<&str> for LogicalPath {
    fn from(path: &str) -> Self {
        LogicalPath::parse(path)
    }
}

impl<'de> Deserialize<'de> for LogicalPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(LogicalPath::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn archive() -> Value {
        json!({
            "Profile And Settings": {
                "Profile Info": {
                    "ProfileMap": {"userName": "alice", "bio": null}
                }
            },
            "Comment": {"Comments": {"CommentsList": [{"date": "d1"}, {"date": "d2"}]}}
        })
    }

    #[test]
    fn test_get_with_spaced_segments() {
        let data = archive();
        let path = LogicalPath::parse("Profile And Settings.Profile Info.ProfileMap.userName");
        assert_eq!(path.get(&data), Some(&json!("alice")));
    }

    #[test]
    fn test_missing_intermediate_is_not_found() {
        let data = archive();
        let path = LogicalPath::parse("Profile And Settings.Nope.ProfileMap");
        assert_eq!(path.get(&data), None);
        assert!(!path.exists(&data));
        assert_eq!(path.length(&data), 0);
    }

    #[test]
    fn test_null_intermediate_is_not_found() {
        let data = archive();
        let path = LogicalPath::parse("Profile And Settings.Profile Info.ProfileMap.bio.text");
        assert!(!path.exists(&data));
    }

    #[test]
    fn test_exists_for_null_leaf() {
        let data = archive();
        let path = LogicalPath::parse("Profile And Settings.Profile Info.ProfileMap.bio");
        assert!(path.exists(&data));
        assert_eq!(path.get(&data), Some(&Value::Null));
    }

    #[test]
    fn test_length_and_array_index() {
        let data = archive();
        let list = LogicalPath::parse("Comment.Comments.CommentsList");
        assert_eq!(list.length(&data), 2);
        assert_eq!(list.array(&data).len(), 2);

        let second = LogicalPath::parse("Comment.Comments.CommentsList.1.date");
        assert_eq!(second.get(&data), Some(&json!("d2")));

        let profile = LogicalPath::parse("Profile And Settings.Profile Info.ProfileMap");
        assert_eq!(profile.length(&data), 0);
    }

    #[test]
    fn test_segments_with_literal_dots() {
        let data = json!({"a.b": {"c": 1}});
        assert!(!LogicalPath::parse("a.b.c").exists(&data));
        assert_eq!(LogicalPath::from_segments(["a.b", "c"]).get(&data), Some(&json!(1)));
    }
}
