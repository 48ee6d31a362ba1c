use crate::error::{MeltError, Result};
use crate::paths::ArchivePaths;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

/// One flat output record: column name → scalar (or nested JSON serialized at insert time)
pub type Row = Map<String, Value>;

/// Configuration for the extraction pass
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MeltConfig {
    /// Rows kept per table in preview mode
    pub preview_limit: usize,

    /// Messages kept in preview mode, balanced between direct and group chats
    pub message_preview_limit: usize,

    /// Maximum characters for stored free text (comments, favorite comments)
    pub text_limit: usize,

    /// Maximum characters for message content
    pub message_text_limit: usize,

    /// Arrays longer than this are previewed by path probes
    pub large_array_threshold: usize,

    /// Elements shown for a previewed large array
    pub large_array_preview: usize,

    /// Logical-key → path dictionary
    pub paths: ArchivePaths,
}

impl Default for MeltConfig {
    fn default() -> Self {
        MeltConfig {
            preview_limit: 5,
            message_preview_limit: 20,
            text_limit: 200,
            message_text_limit: 100,
            large_array_threshold: 50,
            large_array_preview: 10,
            paths: ArchivePaths::default(),
        }
    }
}

impl MeltConfig {
    /// Defaults, overlaid by an optional config file and then an optional paths file
    ///
    /// Both files are JSON; keys they omit keep their defaults.
    pub fn from_files(config: Option<&Path>, paths: Option<&Path>) -> Result<Self> {
        let mut melt_config = match config {
            Some(file) => serde_json::from_slice(&std::fs::read(file)?)?,
            None => MeltConfig::default(),
        };
        if let Some(file) = paths {
            melt_config.paths = serde_json::from_slice(&std::fs::read(file)?)?;
        }
        Ok(melt_config)
    }
}

/// Bounded preview or unbounded export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    Preview,
    Full,
}

impl ExtractMode {
    pub fn is_full(self) -> bool {
        self == ExtractMode::Full
    }
}

/// Every output table, in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Profile,
    Comments,
    Blocked,
    Following,
    Friends,
    Posts,
    DeletedPosts,
    Messages,
    FavoriteCollections,
    FavoriteComments,
    FavoriteEffects,
    FavoriteHashtags,
    FavoriteSounds,
    FavoriteVideos,
    FavoriteLikes,
    Reposts,
    Searches,
    LiveHistory,
    LiveModerator,
    LiveWatchHistory,
    LoginHistory,
    IncomeWallet,
    IncomeTransaction,
}

impl Section {
    pub const ALL: [Section; 23] = [
        Section::Profile,
        Section::Comments,
        Section::Blocked,
        Section::Following,
        Section::Friends,
        Section::Posts,
        Section::DeletedPosts,
        Section::Messages,
        Section::FavoriteCollections,
        Section::FavoriteComments,
        Section::FavoriteEffects,
        Section::FavoriteHashtags,
        Section::FavoriteSounds,
        Section::FavoriteVideos,
        Section::FavoriteLikes,
        Section::Reposts,
        Section::Searches,
        Section::LiveHistory,
        Section::LiveModerator,
        Section::LiveWatchHistory,
        Section::LoginHistory,
        Section::IncomeWallet,
        Section::IncomeTransaction,
    ];

    /// Key of this section in the normalized mapping
    pub fn table_name(self) -> &'static str {
        match self {
            Section::Profile => "profile",
            Section::Comments => "comments",
            Section::Blocked => "blocked",
            Section::Following => "following",
            Section::Friends => "friends",
            Section::Posts => "posts",
            Section::DeletedPosts => "deletedPosts",
            Section::Messages => "messages",
            Section::FavoriteCollections => "favoriteCollections",
            Section::FavoriteComments => "favoriteComments",
            Section::FavoriteEffects => "favoriteEffects",
            Section::FavoriteHashtags => "favoriteHashtags",
            Section::FavoriteSounds => "favoriteSounds",
            Section::FavoriteVideos => "favoriteVideos",
            Section::FavoriteLikes => "favoriteLikes",
            Section::Reposts => "reposts",
            Section::Searches => "searches",
            Section::LiveHistory => "liveHistory",
            Section::LiveModerator => "liveModerator",
            Section::LiveWatchHistory => "liveWatchHistory",
            Section::LoginHistory => "loginHistory",
            Section::IncomeWallet => "incomeWallet",
            Section::IncomeTransaction => "incomeTransaction",
        }
    }

    /// Archive paths whose presence makes this section available
    ///
    /// Friends and messages are computed, so either of their sources counts.
    pub fn source_paths(self, paths: &ArchivePaths) -> Vec<&crate::path::LogicalPath> {
        match self {
            Section::Profile => vec![&paths.profile],
            Section::Comments => vec![&paths.comments],
            Section::Blocked => vec![&paths.blocked],
            Section::Following => vec![&paths.following],
            Section::Friends => vec![&paths.following, &paths.followers],
            Section::Posts => vec![&paths.posts],
            Section::DeletedPosts => vec![&paths.deleted_posts],
            Section::Messages => vec![&paths.direct_messages, &paths.group_chats],
            Section::FavoriteCollections => vec![&paths.favorite_collections],
            Section::FavoriteComments => vec![&paths.favorite_comments],
            Section::FavoriteEffects => vec![&paths.favorite_effects],
            Section::FavoriteHashtags => vec![&paths.favorite_hashtags],
            Section::FavoriteSounds => vec![&paths.favorite_sounds],
            Section::FavoriteVideos => vec![&paths.favorite_videos],
            Section::FavoriteLikes => vec![&paths.favorite_likes],
            Section::Reposts => vec![&paths.reposts],
            Section::Searches => vec![&paths.searches],
            Section::LiveHistory => vec![&paths.live_history],
            Section::LiveModerator => vec![&paths.live_moderator],
            Section::LiveWatchHistory => vec![&paths.live_watch_history],
            Section::LoginHistory => vec![&paths.login_history],
            Section::IncomeWallet => vec![&paths.income_wallet],
            Section::IncomeTransaction => vec![&paths.income_transaction],
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Convert a typed record into a flat row, keeping declaration order
pub fn to_row<T: Serialize>(record: &T) -> Row {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map,
        _ => Row::new(),
    }
}

// Per-section record shapes. Each struct is the allow-list for its table:
// fields are always emitted, as null when the archive omits them.

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRow {
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
    pub total_messages: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentRow {
    pub date: Value,
    pub comment: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PostRow {
    pub date: Value,
    pub likes: Value,
    pub who_can_view: Value,
    #[serde(rename = "shortId")]
    pub short_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeletedPostRow {
    pub date: Value,
    pub date_deleted: Value,
    pub likes: Value,
    #[serde(rename = "shortId")]
    pub short_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Direct,
    Group,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageRow {
    #[serde(rename = "type")]
    pub kind: ChatKind,
    pub with: String,
    #[serde(rename = "Date")]
    pub date: Value,
    #[serde(rename = "From")]
    pub from: Value,
    #[serde(rename = "Content")]
    pub content: Value,
}

/// A mutual follow: present in both the following and followers lists
#[derive(Debug, Clone, Serialize)]
pub struct FriendRow {
    #[serde(rename = "UserName")]
    pub user_name: String,
    #[serde(rename = "dateFollowing")]
    pub date_following: Value,
    #[serde(rename = "dateFollower")]
    pub date_follower: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FavoriteCollectionRow {
    pub date: Value,
    pub favorite_collection: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FavoriteCommentRow {
    pub favorite_comment: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FavoriteEffectRow {
    pub date: Value,
    pub effect_link: Value,
}

/// Dated link: favorite hashtags, sounds, videos and reposts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LinkRow {
    pub date: Value,
    pub link: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct LikeRow {
    pub date: Value,
    pub link: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchRow {
    pub date: Value,
    pub search_term: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveHistoryRow {
    pub room_id: Value,
    pub title: Value,
    pub started: Value,
    pub ended: Value,
    pub duration: Value,
    pub earning: Value,
    pub like: Value,
    pub view: Value,
    pub gifter: Value,
    pub muted: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveModeratorRow {
    pub name: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveWatchRow {
    pub room_id: String,
    pub comment: Value,
    pub comment_time: Value,
    pub raw_time: Value,
    pub time: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginRow {
    pub date: Value,
    #[serde(rename = "IP")]
    pub ip: Value,
    pub device_model: Value,
    pub device_system: Value,
    pub network_type: Value,
    pub carrier: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WalletRow {
    pub date: Value,
    #[serde(rename = "Type")]
    pub kind: Value,
    pub coin_amount: Value,
}

/// A link referenced by a post or deleted post, keyed by its short hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoHashEntry {
    pub hash_id: String,
    pub link: String,
    pub deleted: bool,
}

/// One named table of the normalized mapping
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub rows: Vec<Row>,
}

/// Ordered table name → rows mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tables(Vec<Table>);

impl Tables {
    pub fn new() -> Self {
        Tables(Vec::new())
    }

    pub fn push(&mut self, name: impl Into<String>, rows: Vec<Row>) {
        self.0.push(Table {
            name: name.into(),
            rows,
        });
    }

    pub fn get(&self, name: &str) -> Option<&[Row]> {
        self.0
            .iter()
            .find(|table| table.name == name)
            .map(|table| table.rows.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|table| table.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.0.iter().map(|table| table.rows.len()).sum()
    }
}

impl Serialize for Tables {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for table in &self.0 {
            map.serialize_entry(&table.name, &table.rows)?;
        }
        map.end()
    }
}

/// The normalized mapping plus its side outputs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlData {
    pub user_name: Option<String>,
    pub data: Tables,
    pub video_hash: Vec<VideoHashEntry>,
    pub is_full: bool,
}

impl SqlData {
    /// Rebuild from a previously exported JSON document
    ///
    /// A missing `data` object is a generation failure. Non-array tables are
    /// kept as empty tables; non-object rows are wrapped as `{"value": ...}`.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut doc) = value else {
            return Err(MeltError::Generation(
                "Invalid sqlData: expected a JSON object".to_string(),
            ));
        };

        let Some(Value::Object(data)) = doc.remove("data") else {
            return Err(MeltError::Generation(
                "Invalid sqlData: missing data object".to_string(),
            ));
        };

        let user_name = match doc.remove("userName") {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };

        let video_hash = match doc.remove("videoHash") {
            Some(v @ Value::Array(_)) => serde_json::from_value(v)
                .map_err(|e| MeltError::Generation(format!("Invalid sqlData videoHash: {}", e)))?,
            _ => Vec::new(),
        };

        let is_full = matches!(doc.remove("isFull"), Some(Value::Bool(true)));

        let mut tables = Tables::new();
        for (name, rows) in data {
            let rows = match rows {
                Value::Array(items) => items.into_iter().map(wrap_row).collect(),
                _ => Vec::new(),
            };
            tables.push(name, rows);
        }

        Ok(SqlData {
            user_name,
            data: tables,
            video_hash,
            is_full,
        })
    }
}

/// Objects are rows as-is; scalars become a single `value` column
pub fn wrap_row(item: Value) -> Row {
    match item {
        Value::Object(map) => map,
        other => {
            let mut row = Row::new();
            row.insert("value".to_string(), other);
            row
        }
    }
}
