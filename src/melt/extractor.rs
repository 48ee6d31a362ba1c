use crate::melt::types::*;
use crate::path::LogicalPath;
use crate::text::{normalize_value, short_hash, truncate_value};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

static DIRECT_CHAT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Chat History with (.*)$").unwrap());

static GROUP_CHAT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Group Chat with Group_Chat_(.*)$").unwrap());

/// Maps each archive section to its flat row shape
///
/// Absent or malformed sections yield empty collections; records that are
/// not objects are skipped.
pub struct SectionExtractor<'a> {
    archive: &'a Value,
    config: &'a MeltConfig,
}

impl<'a> SectionExtractor<'a> {
    pub fn new(archive: &'a Value, config: &'a MeltConfig) -> Self {
        SectionExtractor { archive, config }
    }

    /// Object records of the array at `path`
    fn records(&self, path: &LogicalPath) -> impl Iterator<Item = &'a Map<String, Value>> {
        let items = path.array(self.archive);
        let skipped = items.iter().filter(|item| !item.is_object()).count();
        if skipped > 0 {
            warn!(path = %path, skipped, "Skipping non-object records");
        }
        items.iter().filter_map(Value::as_object)
    }

    /// Rows kept verbatim; scalar elements become `{"value": ...}`
    fn passthrough(&self, path: &LogicalPath) -> Vec<Row> {
        path.array(self.archive).iter().cloned().map(wrap_row).collect()
    }

    /// The profile's `userName`, if it is a string
    pub fn user_name(&self) -> Option<String> {
        self.config
            .paths
            .profile
            .object(self.archive)
            .and_then(|profile| profile.get("userName"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub fn profile(&self, friends_count: usize, total_messages: usize) -> ProfileRow {
        let empty = Map::new();
        let raw = self.config.paths.profile.object(self.archive).unwrap_or(&empty);

        ProfileRow {
            display_name: field(raw, "displayName"),
            user_name: field(raw, "userName"),
            likes_received: field(raw, "likesReceived"),
            following_count: field(raw, "followingCount"),
            follower_count: field(raw, "followerCount"),
            birth_date: field(raw, "birthDate"),
            email_address: field(raw, "emailAddress"),
            bio: field(raw, "bio"),
            avatar: field(raw, "avatar"),
            age: field(raw, "age"),
            friends_count,
            total_messages,
        }
    }

    pub fn comments(&self) -> Vec<CommentRow> {
        let limit = self.config.text_limit;
        self.records(&self.config.paths.comments)
            .map(|item| CommentRow {
                date: field(item, "date"),
                comment: truncate_value(&field(item, "comment"), limit),
            })
            .collect()
    }

    pub fn blocked(&self) -> Vec<Row> {
        self.passthrough(&self.config.paths.blocked)
    }

    pub fn following(&self) -> Vec<Row> {
        self.passthrough(&self.config.paths.following)
    }

    /// Inner join of following × followers on `UserName`, in following order
    pub fn friends(&self) -> Vec<FriendRow> {
        let followers: HashMap<&str, Value> = self
            .records(&self.config.paths.followers)
            .filter_map(|f| Some((user_name_of(f)?, field(f, "Date"))))
            .collect();

        self.records(&self.config.paths.following)
            .filter_map(|f| {
                let name = user_name_of(f)?;
                let date_follower = followers.get(name)?.clone();
                Some(FriendRow {
                    user_name: name.to_string(),
                    date_following: field(f, "Date"),
                    date_follower,
                })
            })
            .collect()
    }

    /// Active posts; every linked post also yields a video-hash entry
    pub fn posts(&self, video_hash: &mut Vec<VideoHashEntry>) -> Vec<PostRow> {
        self.records(&self.config.paths.posts)
            .map(|item| PostRow {
                date: field(item, "Date"),
                likes: field(item, "Likes"),
                who_can_view: field(item, "WhoCanView"),
                short_id: link_hash(item, &["id", "videoId"], false, video_hash),
            })
            .collect()
    }

    pub fn deleted_posts(&self, video_hash: &mut Vec<VideoHashEntry>) -> Vec<DeletedPostRow> {
        self.records(&self.config.paths.deleted_posts)
            .map(|item| DeletedPostRow {
                date: field(item, "Date"),
                date_deleted: field(item, "DateDeleted"),
                likes: field(item, "Likes"),
                short_id: link_hash(item, &["id"], true, video_hash),
            })
            .collect()
    }

    /// Direct chats followed by group chats, flattened into one list
    pub fn messages(&self) -> Vec<MessageRow> {
        let paths = &self.config.paths;
        let mut messages = self.chat_messages(&paths.direct_messages, &DIRECT_CHAT_REGEX, ChatKind::Direct);
        messages.extend(self.chat_messages(&paths.group_chats, &GROUP_CHAT_REGEX, ChatKind::Group));
        messages
    }

    fn chat_messages(&self, path: &LogicalPath, key_regex: &Regex, kind: ChatKind) -> Vec<MessageRow> {
        let Some(chats) = path.object(self.archive) else {
            return Vec::new();
        };
        let limit = self.config.message_text_limit;
        let mut messages = Vec::new();

        for (key, history) in chats {
            let Some(captures) = key_regex.captures(key) else {
                debug!(key = %key, "Ignoring unrecognised chat key");
                continue;
            };
            let Value::Array(entries) = history else {
                continue;
            };
            let raw_with = captures.get(1).map_or("", |m| m.as_str());
            let with = raw_with.strip_suffix(':').unwrap_or(raw_with);

            for msg in entries.iter().filter_map(Value::as_object) {
                messages.push(MessageRow {
                    kind,
                    with: with.to_string(),
                    date: field(msg, "Date"),
                    from: field(msg, "From"),
                    content: truncate_value(&normalize_value(&field(msg, "Content")), limit),
                });
            }
        }

        messages
    }

    pub fn favorite_collections(&self) -> Vec<FavoriteCollectionRow> {
        self.records(&self.config.paths.favorite_collections)
            .map(|item| FavoriteCollectionRow {
                date: field(item, "Date"),
                favorite_collection: field(item, "FavoriteCollection"),
            })
            .collect()
    }

    pub fn favorite_comments(&self) -> Vec<FavoriteCommentRow> {
        let limit = self.config.text_limit;
        self.records(&self.config.paths.favorite_comments)
            .map(|item| FavoriteCommentRow {
                favorite_comment: truncate_value(&field(item, "FavoriteComment"), limit),
            })
            .collect()
    }

    pub fn favorite_effects(&self) -> Vec<FavoriteEffectRow> {
        self.records(&self.config.paths.favorite_effects)
            .map(|item| FavoriteEffectRow {
                date: field(item, "Date"),
                effect_link: normalize_value(&field(item, "EffectLink")),
            })
            .collect()
    }

    pub fn favorite_hashtags(&self) -> Vec<LinkRow> {
        self.link_rows(&self.config.paths.favorite_hashtags)
    }

    pub fn favorite_sounds(&self) -> Vec<LinkRow> {
        self.link_rows(&self.config.paths.favorite_sounds)
    }

    pub fn favorite_videos(&self) -> Vec<LinkRow> {
        self.link_rows(&self.config.paths.favorite_videos)
    }

    pub fn reposts(&self) -> Vec<LinkRow> {
        self.link_rows(&self.config.paths.reposts)
    }

    fn link_rows(&self, path: &LogicalPath) -> Vec<LinkRow> {
        self.records(path)
            .map(|item| LinkRow {
                date: field(item, "Date"),
                link: normalize_value(&field(item, "Link")),
            })
            .collect()
    }

    pub fn favorite_likes(&self) -> Vec<LikeRow> {
        self.records(&self.config.paths.favorite_likes)
            .map(|item| LikeRow {
                date: field(item, "date"),
                link: normalize_value(&field(item, "link")),
            })
            .collect()
    }

    pub fn searches(&self) -> Vec<SearchRow> {
        self.records(&self.config.paths.searches)
            .map(|item| SearchRow {
                date: field(item, "Date"),
                search_term: field(item, "SearchTerm"),
            })
            .collect()
    }

    pub fn live_history(&self) -> Vec<LiveHistoryRow> {
        self.records(&self.config.paths.live_history)
            .map(|item| LiveHistoryRow {
                room_id: field(item, "RoomId"),
                title: field(item, "RoomTitle"),
                started: field(item, "LiveStartTime"),
                ended: field(item, "LiveEndTime"),
                duration: field(item, "LiveDuration"),
                earning: field(item, "TotalEarning"),
                like: field(item, "TotalLike"),
                view: field(item, "TotalView"),
                gifter: field(item, "TotalGifter"),
                muted: item.get("MutedList").and_then(Value::as_array).map_or(0, Vec::len),
            })
            .collect()
    }

    /// Moderators listed either as plain names or as `{Name}` objects
    pub fn live_moderator(&self) -> Vec<LiveModeratorRow> {
        self.config
            .paths
            .live_moderator
            .array(self.archive)
            .iter()
            .filter_map(|item| {
                let name = match item {
                    Value::String(s) if !s.is_empty() => item.clone(),
                    Value::Object(obj) => match obj.get("Name") {
                        Some(n @ Value::String(s)) if !s.is_empty() => n.clone(),
                        Some(n @ Value::Number(_)) => n.clone(),
                        _ => return None,
                    },
                    _ => return None,
                };
                Some(LiveModeratorRow { name })
            })
            .collect()
    }

    /// One row per comment, carrying the parent room's watch time
    pub fn live_watch_history(&self) -> Vec<LiveWatchRow> {
        let Some(rooms) = self.config.paths.live_watch_history.object(self.archive) else {
            return Vec::new();
        };

        let mut rows = Vec::new();
        for (room_id, entry) in rooms {
            let Some(entry) = entry.as_object() else {
                continue;
            };
            let watch_time = field(entry, "WatchTime");
            let Some(Value::Array(comments)) = entry.get("Comments") else {
                continue;
            };
            for comment in comments.iter().filter_map(Value::as_object) {
                rows.push(LiveWatchRow {
                    room_id: room_id.clone(),
                    comment: field(comment, "CommentContent"),
                    comment_time: field(comment, "CommentTime"),
                    raw_time: field(comment, "RawTime"),
                    time: watch_time.clone(),
                });
            }
        }
        rows
    }

    pub fn login_history(&self) -> Vec<LoginRow> {
        self.records(&self.config.paths.login_history)
            .map(|item| LoginRow {
                date: field(item, "Date"),
                ip: field(item, "IP"),
                device_model: field(item, "DeviceModel"),
                device_system: field(item, "DeviceSystem"),
                network_type: field(item, "NetworkType"),
                carrier: field(item, "Carrier"),
            })
            .collect()
    }

    pub fn income_wallet(&self) -> Vec<WalletRow> {
        self.records(&self.config.paths.income_wallet)
            .map(|item| WalletRow {
                date: field(item, "Date"),
                kind: field(item, "Type"),
                coin_amount: field(item, "CoinAmount"),
            })
            .collect()
    }

    /// Transactions keep their original structure
    pub fn income_transaction(&self) -> Vec<Row> {
        self.passthrough(&self.config.paths.income_transaction)
    }

    /// Sections whose source path(s) exist in the archive
    pub fn present_sections(&self) -> Vec<Section> {
        Section::ALL
            .into_iter()
            .filter(|section| {
                section
                    .source_paths(&self.config.paths)
                    .iter()
                    .any(|path| path.exists(self.archive))
            })
            .collect()
    }
}

fn field(record: &Map<String, Value>, key: &str) -> Value {
    record.get(key).cloned().unwrap_or(Value::Null)
}

fn user_name_of(record: &Map<String, Value>) -> Option<&str> {
    record
        .get("UserName")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
}

/// Hash the post's link, else its first usable id, else the whole record
///
/// Every hash is recorded in `video_hash`, so a `shortId` always has a row to
/// reference. Unlinked posts record the text that was hashed as their link.
fn link_hash(
    item: &Map<String, Value>,
    id_keys: &[&str],
    deleted: bool,
    video_hash: &mut Vec<VideoHashEntry>,
) -> String {
    let source = match item.get("Link").and_then(Value::as_str).filter(|l| !l.is_empty()) {
        Some(link) => link.to_string(),
        None => id_keys
            .iter()
            .find_map(|key| match item.get(*key) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(Value::Number(n)) if n.as_f64() != Some(0.0) => Some(n.to_string()),
                _ => None,
            })
            .unwrap_or_else(|| serde_json::to_string(item).unwrap_or_default()),
    };

    let hash_id = short_hash(&source);
    video_hash.push(VideoHashEntry {
        hash_id: hash_id.clone(),
        link: source,
        deleted,
    });
    hash_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_archive;
    use serde_json::json;

    fn extract<T>(archive: &Value, f: impl FnOnce(&SectionExtractor) -> T) -> T {
        let config = MeltConfig::default();
        let extractor = SectionExtractor::new(archive, &config);
        f(&extractor)
    }

    #[test]
    fn test_friends_intersection_in_following_order() {
        let archive = json!({
            "Profile And Settings": {
                "Following": {"Following": [
                    {"UserName": "a", "Date": "f-a"},
                    {"UserName": "b", "Date": "f-b"}
                ]},
                "Follower": {"FansList": [{"UserName": "a", "Date": "r-a"}]}
            }
        });

        let friends = extract(&archive, |e| e.friends());
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].user_name, "a");
        assert_eq!(friends[0].date_following, json!("f-a"));
        assert_eq!(friends[0].date_follower, json!("r-a"));
    }

    #[test]
    fn test_missing_sections_are_empty() {
        let archive = json!({"Unrelated": true});
        extract(&archive, |e| {
            assert!(e.comments().is_empty());
            assert!(e.friends().is_empty());
            assert!(e.messages().is_empty());
            assert!(e.live_watch_history().is_empty());
            assert!(e.live_moderator().is_empty());
            assert!(e.blocked().is_empty());
            assert!(e.present_sections().is_empty());
            assert_eq!(e.user_name(), None);
        });
    }

    #[test]
    fn test_malformed_sections_are_empty() {
        let archive = json!({
            "Comment": {"Comments": {"CommentsList": "not a list"}},
            "Direct Message": {"Direct Messages": {"ChatHistory": []}}
        });
        extract(&archive, |e| {
            assert!(e.comments().is_empty());
            assert!(e.messages().is_empty());
        });
    }

    #[test]
    fn test_comment_truncation() {
        let long = "x".repeat(250);
        let archive = json!({
            "Comment": {"Comments": {"CommentsList": [
                {"date": "d", "comment": long, "extra": "dropped"},
                "junk"
            ]}}
        });

        let comments = extract(&archive, |e| e.comments());
        assert_eq!(comments.len(), 1);
        let text = comments[0].comment.as_str().unwrap();
        assert_eq!(text.chars().count(), 200);
        assert!(text.ends_with("..."));

        let row = to_row(&comments[0]);
        assert!(!row.contains_key("extra"));
    }

    #[test]
    fn test_posts_hash_links_and_fallbacks() {
        let link = "https://www.tiktokv.com/share/video/7212345678901234567/";
        let archive = json!({
            "Post": {
                "Posts": {"VideoList": [
                    {"Date": "d1", "Likes": "3", "Link": link},
                    {"Date": "d2", "videoId": "v-2"}
                ]},
                "Recently Deleted Posts": {"PostList": [
                    {"Date": "d3", "DateDeleted": "d4", "Link": link}
                ]}
            }
        });

        let mut video_hash = Vec::new();
        let (posts, deleted) = extract(&archive, |e| {
            (e.posts(&mut video_hash), e.deleted_posts(&mut video_hash))
        });

        assert_eq!(posts[0].short_id, "017v0q84");
        assert_eq!(posts[1].short_id, short_hash("v-2"));
        assert_eq!(deleted[0].short_id, "017v0q84");
        assert_eq!(video_hash.len(), 3);
        assert!(!video_hash[0].deleted);
        assert_eq!(video_hash[1].hash_id, short_hash("v-2"));
        assert_eq!(video_hash[1].link, "v-2");
        assert!(video_hash[2].deleted);
    }

    #[test]
    fn test_post_without_any_id_hashes_record() {
        let archive = json!({"Post": {"Posts": {"VideoList": [{"Date": "d1", "Likes": 2}]}}});
        let mut video_hash = Vec::new();
        let posts = extract(&archive, |e| e.posts(&mut video_hash));
        assert_eq!(posts[0].short_id, short_hash(r#"{"Date":"d1","Likes":2}"#));
        assert_eq!(video_hash.len(), 1);
        assert_eq!(video_hash[0].hash_id, posts[0].short_id);
        assert_eq!(video_hash[0].link, r#"{"Date":"d1","Likes":2}"#);
    }

    #[test]
    fn test_messages_tagging_and_normalizing() {
        let archive = sample_archive();
        let messages = extract(&archive, |e| e.messages());

        let direct: Vec<_> = messages.iter().filter(|m| m.kind == ChatKind::Direct).collect();
        let group: Vec<_> = messages.iter().filter(|m| m.kind == ChatKind::Group).collect();
        assert_eq!(direct.len(), 2);
        assert_eq!(group.len(), 1);
        assert_eq!(direct[0].with, "bob");
        assert_eq!(group[0].with, "weekend");
        assert_eq!(direct[1].content, json!("clip.mp4"));

        let row = to_row(&messages[0]);
        assert_eq!(row.get("type"), Some(&json!("direct")));
    }

    #[test]
    fn test_live_sections() {
        let archive = sample_archive();
        extract(&archive, |e| {
            let moderators = e.live_moderator();
            let names: Vec<&Value> = moderators.iter().map(|m| &m.name).collect();
            assert_eq!(names, vec![&json!("mod_one"), &json!("mod_two")]);

            let watch = e.live_watch_history();
            assert_eq!(watch.len(), 2);
            assert!(watch.iter().all(|w| w.room_id == "7001"));
            assert_eq!(watch[0].time, json!("2023-05-01 20:00:00"));

            let history = e.live_history();
            assert_eq!(history[0].muted, 2);
        });
    }

    #[test]
    fn test_link_fields_are_normalized() {
        let archive = sample_archive();
        extract(&archive, |e| {
            assert_eq!(e.favorite_sounds()[0].link, json!("7000001"));
            assert_eq!(e.favorite_likes()[0].link, json!("7000002"));
        });
    }

    #[test]
    fn test_present_sections_includes_computed() {
        let archive = sample_archive();
        let present = extract(&archive, |e| e.present_sections());
        assert!(present.contains(&Section::Profile));
        assert!(present.contains(&Section::Friends));
        assert!(present.contains(&Section::Messages));
        assert!(!present.contains(&Section::IncomeTransaction));
    }

    #[test]
    fn test_message_content_truncation() {
        let long_text = "m".repeat(150);
        let long_url = format!("https://im.tiktok.com/media/{}/{}.mp4", "d".repeat(80), "n".repeat(120));
        let archive = json!({
            "Direct Message": {"Direct Messages": {"ChatHistory": {
                "Chat History with bob:": [
                    {"Date": "d1", "From": "bob", "Content": long_text},
                    {"Date": "d2", "From": "bob", "Content": long_url}
                ]
            }}}
        });

        let messages = extract(&archive, |e| e.messages());
        let text = messages[0].content.as_str().unwrap();
        assert_eq!(text.chars().count(), 100);
        assert!(text.ends_with("..."));
        assert_eq!(&text[..97], &"m".repeat(97));

        // the URL is reduced to its file name first, then bounded
        let url = messages[1].content.as_str().unwrap();
        assert_eq!(url.chars().count(), 100);
        assert!(url.starts_with("nnnn"));
        assert!(!url.contains("://"));
        assert!(url.ends_with("..."));
    }

    #[test]
    fn test_favorite_comment_truncation() {
        let archive = json!({
            "Likes and Favorites": {"Favorite Comment": {"FavoriteCommentList": [
                {"FavoriteComment": "c".repeat(250)},
                {"FavoriteComment": "short"}
            ]}}
        });

        let favorites = extract(&archive, |e| e.favorite_comments());
        let text = favorites[0].favorite_comment.as_str().unwrap();
        assert_eq!(text.chars().count(), 200);
        assert!(text.ends_with("..."));
        assert_eq!(favorites[1].favorite_comment, json!("short"));
    }
}
