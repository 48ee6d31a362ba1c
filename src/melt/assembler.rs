//! Orchestrates every section extractor into one normalized mapping
//!
//! Preview mode caps each table; full mode emits everything. Both modes emit
//! the same table set in the same order.

use crate::melt::extractor::SectionExtractor;
use crate::melt::types::*;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub struct SqlDataAssembler<'a> {
    extractor: SectionExtractor<'a>,
    config: &'a MeltConfig,
}

impl<'a> SqlDataAssembler<'a> {
    pub fn new(archive: &'a Value, config: &'a MeltConfig) -> Self {
        SqlDataAssembler {
            extractor: SectionExtractor::new(archive, config),
            config,
        }
    }

    pub fn assemble(&self, mode: ExtractMode) -> SqlData {
        let ex = &self.extractor;
        let mut raw_video_hash = Vec::new();

        let friends = ex.friends();
        let messages = ex.messages();
        let profile = ex.profile(friends.len(), messages.len());
        let posts = ex.posts(&mut raw_video_hash);
        let deleted_posts = ex.deleted_posts(&mut raw_video_hash);

        let limit = match mode {
            ExtractMode::Full => usize::MAX,
            ExtractMode::Preview => self.config.preview_limit,
        };
        let messages = match mode {
            ExtractMode::Full => messages,
            ExtractMode::Preview => balanced_preview(messages, self.config.message_preview_limit),
        };

        let mut tables = TableSet::new(limit);
        tables.single(Section::Profile, &profile);
        tables.typed(Section::Comments, ex.comments());
        tables.rows(Section::Blocked, ex.blocked());
        tables.rows(Section::Following, ex.following());
        tables.typed(Section::Friends, friends);
        tables.typed(Section::Posts, posts);
        tables.typed(Section::DeletedPosts, deleted_posts);
        tables.uncapped(Section::Messages, messages);
        tables.typed(Section::FavoriteCollections, ex.favorite_collections());
        tables.typed(Section::FavoriteComments, ex.favorite_comments());
        tables.typed(Section::FavoriteEffects, ex.favorite_effects());
        tables.typed(Section::FavoriteHashtags, ex.favorite_hashtags());
        tables.typed(Section::FavoriteSounds, ex.favorite_sounds());
        tables.typed(Section::FavoriteVideos, ex.favorite_videos());
        tables.typed(Section::FavoriteLikes, ex.favorite_likes());
        tables.typed(Section::Reposts, ex.reposts());
        tables.typed(Section::Searches, ex.searches());
        tables.typed(Section::LiveHistory, ex.live_history());
        tables.typed(Section::LiveModerator, ex.live_moderator());
        tables.typed(Section::LiveWatchHistory, ex.live_watch_history());
        tables.typed(Section::LoginHistory, ex.login_history());
        tables.typed(Section::IncomeWallet, ex.income_wallet());
        tables.rows(Section::IncomeTransaction, ex.income_transaction());

        let data = tables.finish();
        let video_hash = dedup_video_hash(raw_video_hash);

        info!(
            mode = ?mode,
            tables = data.len(),
            rows = data.row_count(),
            video_links = video_hash.len(),
            "Assembled normalized mapping"
        );

        SqlData {
            user_name: ex.user_name(),
            data,
            video_hash,
            is_full: mode.is_full(),
        }
    }
}

/// Accumulates tables in emission order, applying the row cap
struct TableSet {
    limit: usize,
    tables: Tables,
}

impl TableSet {
    fn new(limit: usize) -> Self {
        TableSet {
            limit,
            tables: Tables::new(),
        }
    }

    fn single<T: Serialize>(&mut self, section: Section, record: &T) {
        self.tables.push(section.table_name(), vec![to_row(record)]);
    }

    fn typed<T: Serialize>(&mut self, section: Section, records: Vec<T>) {
        let total = records.len();
        let rows: Vec<Row> = records.iter().take(self.limit).map(to_row).collect();
        debug!(table = %section, total, kept = rows.len(), "Extracted section");
        self.tables.push(section.table_name(), rows);
    }

    fn uncapped<T: Serialize>(&mut self, section: Section, records: Vec<T>) {
        debug!(table = %section, kept = records.len(), "Extracted section");
        self.tables.push(section.table_name(), records.iter().map(to_row).collect());
    }

    fn rows(&mut self, section: Section, mut rows: Vec<Row>) {
        let total = rows.len();
        rows.truncate(self.limit);
        debug!(table = %section, total, kept = rows.len(), "Extracted section");
        self.tables.push(section.table_name(), rows);
    }

    fn finish(self) -> Tables {
        self.tables
    }
}

/// Up to `cap` messages, half direct and half group where both sides allow
///
/// Whichever side runs short is backfilled from the other, so the preview
/// always holds `min(cap, total)` messages, direct ones first.
pub fn balanced_preview(messages: Vec<MessageRow>, cap: usize) -> Vec<MessageRow> {
    let (direct, group): (Vec<MessageRow>, Vec<MessageRow>) = messages
        .into_iter()
        .partition(|message| message.kind == ChatKind::Direct);

    let mut take_direct = direct.len().min(cap / 2);
    let take_group = group.len().min(cap - take_direct);
    if take_direct + take_group < cap {
        take_direct = direct.len().min(cap - take_group);
    }

    direct
        .into_iter()
        .take(take_direct)
        .chain(group.into_iter().take(take_group))
        .collect()
}

/// One entry per `hashId`
///
/// A link still referenced by an active post is not deleted. A different
/// link hashing to an existing id is a collision; the first link is kept.
pub fn dedup_video_hash(entries: Vec<VideoHashEntry>) -> Vec<VideoHashEntry> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<VideoHashEntry> = Vec::with_capacity(entries.len());

    for entry in entries {
        match index.get(&entry.hash_id).copied() {
            Some(pos) => {
                let kept = &mut unique[pos];
                if kept.link != entry.link {
                    warn!(
                        hash_id = %entry.hash_id,
                        kept = %kept.link,
                        dropped = %entry.link,
                        "Video link hash collision"
                    );
                    continue;
                }
                kept.deleted = kept.deleted && entry.deleted;
            }
            None => {
                index.insert(entry.hash_id.clone(), unique.len());
                unique.push(entry);
            }
        }
    }

    unique
}
