//! The loaded archive and everything derived from it
//!
//! A `Session` owns at most one parsed archive and the last normalized mapping
//! extracted from it. Loading replaces both, but only when the new input
//! parses; a failed load leaves the previous archive in place.

use crate::classify::{classify_field, FieldCounts};
use crate::error::{MeltError, Result};
use crate::melt::{
    ChatKind, ExtractMode, MeltConfig, Section, SectionExtractor, SqlData, SqlDataAssembler,
};
use crate::path::LogicalPath;
use crate::schema::{generate_inserts, generate_schema};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

/// Summary of a freshly loaded file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileInfo {
    pub name: String,
    /// Size in kilobytes with two decimals, e.g. `"1.50 KB"`
    pub size: String,
    /// Top-level element or key count
    pub items: usize,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub display_name: Value,
    pub user_name: Value,
    pub likes_received: Value,
    pub following_count: Value,
    pub follower_count: Value,
    pub birth_date: Value,
    pub email_address: Value,
    pub bio: Value,
    pub avatar: Value,
    pub age: Value,
    pub friends_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteCounts {
    pub collections: usize,
    pub comments: usize,
    pub effects: usize,
    pub hashtags: usize,
    pub sounds: usize,
    pub videos: usize,
    pub liked_items: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessageCounts {
    pub direct: usize,
    pub group: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivityCounts {
    pub hashtags: usize,
    pub logins: usize,
    pub searches: usize,
    pub reposts: usize,
    pub shares: usize,
    pub statuses: usize,
    pub stickers: usize,
    pub total: usize,
}

/// Dashboard numbers for the loaded archive
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchiveStats {
    pub profile: ProfileSummary,
    pub comments: usize,
    pub blocked: usize,
    pub following: usize,
    pub followers: usize,
    pub videos: usize,
    pub favorites: FavoriteCounts,
    pub messages: MessageCounts,
    pub activity: ActivityCounts,
}

/// Result of resolving an arbitrary path
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PathProbe {
    /// Large arrays are cut to their first elements
    Preview {
        #[serde(rename = "_preview")]
        preview: bool,
        count: usize,
        first10: Vec<Value>,
        message: String,
    },
    Value(Value),
    Missing,
}

/// Parse archive bytes, SIMD first with a `serde_json` fallback
pub fn parse_archive(bytes: &[u8]) -> Result<Value> {
    let mut scratch = bytes.to_vec();
    match simd_json::serde::from_slice::<Value>(&mut scratch) {
        Ok(value) => Ok(value),
        Err(simd_err) => serde_json::from_slice(bytes).map_err(|e| {
            warn!(error = %simd_err, "SIMD parse failed");
            MeltError::Parse(e.to_string())
        }),
    }
}

#[derive(Debug, Default)]
pub struct Session {
    config: MeltConfig,
    archive: Option<Value>,
    last: Option<SqlData>,
}

impl Session {
    pub fn new(config: MeltConfig) -> Self {
        Session {
            config,
            archive: None,
            last: None,
        }
    }

    pub fn config(&self) -> &MeltConfig {
        &self.config
    }

    pub fn archive(&self) -> Option<&Value> {
        self.archive.as_ref()
    }

    /// The mapping produced by the last `extract` or `set_normalized`
    pub fn last(&self) -> Option<&SqlData> {
        self.last.as_ref()
    }

    /// Parse and hold a new archive
    pub fn load(&mut self, name: &str, bytes: &[u8]) -> Result<FileInfo> {
        let archive = parse_archive(bytes)?;

        let (items, kind) = match &archive {
            Value::Array(items) => (items.len(), "array"),
            Value::Object(map) => (map.len(), "object"),
            _ => (0, "object"),
        };
        let info = FileInfo {
            name: name.to_string(),
            size: format!("{:.2} KB", bytes.len() as f64 / 1024.0),
            items,
            kind,
        };

        info!(name, size = %info.size, items, "Loaded archive");
        self.archive = Some(archive);
        self.last = None;
        Ok(info)
    }

    fn require_archive(&self) -> Result<&Value> {
        self.archive
            .as_ref()
            .ok_or(MeltError::InvalidState("No data loaded"))
    }

    fn require_normalized(&self) -> Result<&SqlData> {
        self.last
            .as_ref()
            .ok_or(MeltError::InvalidState("No normalized data; extract first"))
    }

    /// Run every extractor and keep the result for schema and insert generation
    pub fn extract(&mut self, mode: ExtractMode) -> Result<&SqlData> {
        let archive = self.require_archive()?;
        let data = SqlDataAssembler::new(archive, &self.config).assemble(mode);
        Ok(self.last.insert(data))
    }

    /// Use a previously exported mapping instead of extracting one
    pub fn set_normalized(&mut self, data: SqlData) {
        self.last = Some(data);
    }

    pub fn schema(&self) -> Result<String> {
        Ok(generate_schema(self.require_normalized()?))
    }

    pub fn inserts(&self, include_id: bool) -> Result<String> {
        Ok(generate_inserts(self.require_normalized()?, include_id))
    }

    pub fn present_sections(&self) -> Result<Vec<Section>> {
        let archive = self.require_archive()?;
        Ok(SectionExtractor::new(archive, &self.config).present_sections())
    }

    /// Classify `field` of `table` in the last extracted mapping
    pub fn classify_field(&self, table: &str, field: &str) -> Result<FieldCounts> {
        let data = self.require_normalized()?;
        let rows = data.data.get(table).unwrap_or(&[]);
        Ok(classify_field(rows, field))
    }

    pub fn probe(&self, path: &str) -> Result<PathProbe> {
        let archive = self.require_archive()?;
        let probe = match LogicalPath::parse(path).get(archive) {
            None => PathProbe::Missing,
            Some(Value::Array(items)) if items.len() > self.config.large_array_threshold => {
                PathProbe::Preview {
                    preview: true,
                    count: items.len(),
                    first10: items
                        .iter()
                        .take(self.config.large_array_preview)
                        .cloned()
                        .collect(),
                    message: format!(
                        "Large array ({} items). Showing first {}.",
                        items.len(),
                        self.config.large_array_preview
                    ),
                }
            }
            Some(value) => PathProbe::Value(value.clone()),
        };
        Ok(probe)
    }

    pub fn stats(&self) -> Result<ArchiveStats> {
        let archive = self.require_archive()?;
        let paths = &self.config.paths;
        let len = |path: &LogicalPath| path.length(archive);

        let empty = Map::new();
        let profile = paths.profile.object(archive).unwrap_or(&empty);
        let or = |key: &str, default: Value| match profile.get(key) {
            Some(value) if truthy(value) => value.clone(),
            _ => default,
        };
        let extractor = SectionExtractor::new(archive, &self.config);
        let friends_count = extractor.friends().len();

        let mut favorites = FavoriteCounts {
            collections: len(&paths.favorite_collections),
            comments: len(&paths.favorite_comments),
            effects: len(&paths.favorite_effects),
            hashtags: len(&paths.favorite_hashtags),
            sounds: len(&paths.favorite_sounds),
            videos: len(&paths.favorite_videos),
            liked_items: len(&paths.favorite_likes),
            total: 0,
        };
        favorites.total = favorites.collections
            + favorites.comments
            + favorites.effects
            + favorites.hashtags
            + favorites.sounds
            + favorites.videos
            + favorites.liked_items;

        let messages = extractor.messages();
        let direct = messages.iter().filter(|m| m.kind == ChatKind::Direct).count();
        let group = messages.len() - direct;

        let mut activity = ActivityCounts {
            hashtags: len(&paths.hashtag_activity),
            logins: len(&paths.login_history),
            searches: len(&paths.searches),
            reposts: len(&paths.reposts),
            shares: len(&paths.share_history),
            statuses: len(&paths.status_list),
            stickers: len(&paths.sticker_list),
            total: 0,
        };
        activity.total = activity.hashtags
            + activity.logins
            + activity.searches
            + activity.reposts
            + activity.shares
            + activity.statuses
            + activity.stickers;

        Ok(ArchiveStats {
            profile: ProfileSummary {
                display_name: or("displayName", Value::from("Unknown")),
                user_name: or("userName", Value::from("@username")),
                likes_received: or("likesReceived", Value::from(0)),
                following_count: or("followingCount", Value::from(0)),
                follower_count: or("followerCount", Value::from(0)),
                birth_date: or("birthDate", Value::Null),
                email_address: or("emailAddress", Value::Null),
                bio: or("bio", Value::Null),
                avatar: or("avatar", Value::Null),
                age: or("age", Value::Null),
                friends_count,
            },
            comments: len(&paths.comments),
            blocked: len(&paths.blocked),
            following: len(&paths.following),
            followers: len(&paths.followers),
            videos: len(&paths.posts),
            favorites,
            messages: MessageCounts {
                direct,
                group,
                total: direct + group,
            },
            activity,
        })
    }
}

/// Empty strings, zero and false fall back to the default like absent keys
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_archive;
    use serde_json::json;

    fn loaded() -> Session {
        let mut session = Session::default();
        let bytes = serde_json::to_vec(&sample_archive()).unwrap();
        session.load("user_data.json", &bytes).unwrap();
        session
    }

    #[test]
    fn test_load_file_info() {
        let mut session = Session::default();
        let info = session.load("a.json", br#"{"a": 1, "b": [1, 2]}"#).unwrap();
        assert_eq!(info.name, "a.json");
        assert_eq!(info.items, 2);
        assert_eq!(info.kind, "object");
        assert_eq!(info.size, "0.02 KB");

        let info = session.load("b.json", b"[1, 2, 3]").unwrap();
        assert_eq!(info.items, 3);
        assert_eq!(info.kind, "array");
    }

    #[test]
    fn test_failed_load_keeps_previous_archive() {
        let mut session = loaded();
        let err = session.load("broken.json", b"{not json").unwrap_err();
        assert!(matches!(err, MeltError::Parse(_)));
        assert!(err.to_string().starts_with("Failed to parse: "));

        let archive = session.archive().unwrap();
        assert!(archive.get("Comment").is_some());
    }

    #[test]
    fn test_operations_before_load() {
        let mut session = Session::default();
        assert!(matches!(session.stats(), Err(MeltError::InvalidState(_))));
        assert!(matches!(session.extract(ExtractMode::Full), Err(MeltError::InvalidState(_))));
        assert!(matches!(session.schema(), Err(MeltError::InvalidState(_))));
        assert!(matches!(session.inserts(true), Err(MeltError::InvalidState(_))));
        assert!(matches!(session.probe("a"), Err(MeltError::InvalidState(_))));
    }

    #[test]
    fn test_schema_requires_extraction() {
        let mut session = loaded();
        assert!(matches!(session.schema(), Err(MeltError::InvalidState(_))));

        session.extract(ExtractMode::Preview).unwrap();
        let ddl = session.schema().unwrap();
        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS users"));
        let dml = session.inserts(false).unwrap();
        assert!(dml.starts_with("-- INSERT statements for user: alice"));
    }

    #[test]
    fn test_reload_discards_last_mapping() {
        let mut session = loaded();
        session.extract(ExtractMode::Full).unwrap();
        session.load("other.json", b"{}").unwrap();
        assert!(session.last().is_none());
    }

    #[test]
    fn test_stats() {
        let stats = loaded().stats().unwrap();
        assert_eq!(stats.profile.display_name, json!("Alice"));
        assert_eq!(stats.profile.likes_received, json!(1200));
        assert_eq!(stats.profile.age, Value::Null);
        assert_eq!(stats.profile.friends_count, 1);
        assert_eq!(stats.comments, 2);
        assert_eq!(stats.following, 2);
        assert_eq!(stats.followers, 2);
        assert_eq!(stats.videos, 1);
        assert_eq!(stats.favorites.sounds, 1);
        assert_eq!(stats.favorites.liked_items, 1);
        assert_eq!(stats.favorites.total, 3);
        assert_eq!(stats.messages.direct, 2);
        assert_eq!(stats.messages.group, 1);
        assert_eq!(stats.messages.total, 3);
        assert_eq!(stats.activity.logins, 1);
        assert_eq!(stats.activity.total, 2);
    }

    #[test]
    fn test_stats_defaults() {
        let mut session = Session::default();
        session.load("empty.json", b"{}").unwrap();
        let stats = session.stats().unwrap();
        assert_eq!(stats.profile.display_name, json!("Unknown"));
        assert_eq!(stats.profile.user_name, json!("@username"));
        assert_eq!(stats.profile.follower_count, json!(0));
        assert_eq!(stats.favorites, FavoriteCounts::default());
    }

    #[test]
    fn test_probe() {
        let mut session = Session::default();
        let items: Vec<Value> = (0..60).map(|n| json!(n)).collect();
        let bytes = serde_json::to_vec(&json!({"a": {"big": items, "small": [1, 2]}})).unwrap();
        session.load("p.json", &bytes).unwrap();

        match session.probe("a.big").unwrap() {
            PathProbe::Preview { count, first10, message, .. } => {
                assert_eq!(count, 60);
                assert_eq!(first10.len(), 10);
                assert_eq!(message, "Large array (60 items). Showing first 10.");
            }
            other => panic!("expected preview, got {:?}", other),
        }
        assert_eq!(session.probe("a.small").unwrap(), PathProbe::Value(json!([1, 2])));
        assert_eq!(session.probe("a.none").unwrap(), PathProbe::Missing);

        let preview = serde_json::to_value(session.probe("a.big").unwrap()).unwrap();
        assert_eq!(preview["_preview"], json!(true));
        assert_eq!(preview["count"], json!(60));
    }

    #[test]
    fn test_present_sections() {
        let sections = loaded().present_sections().unwrap();
        assert!(sections.contains(&Section::Profile));
        assert!(sections.contains(&Section::Friends));
        assert!(sections.contains(&Section::Messages));
        assert!(!sections.contains(&Section::Reposts));
    }

    #[test]
    fn test_classify_field() {
        let mut session = loaded();
        session.extract(ExtractMode::Full).unwrap();
        let counts = session.classify_field("messages", "Content").unwrap();
        // the shared link was reduced to its file name during extraction
        assert_eq!(counts.file_path, 1);
        assert_eq!(counts.string, 2);
        assert_eq!(counts.total(), 3);

        let missing = session.classify_field("no_such_table", "x").unwrap();
        assert_eq!(missing.total(), 0);
    }
}
