//! The logical-key → dot-path dictionary for the TikTok data export
//!
//! Every field deserializes from a dotted string, so a JSON override file only
//! needs to name the keys it changes; the rest keep their defaults.

use crate::path::LogicalPath;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArchivePaths {
    pub profile: LogicalPath,
    pub comments: LogicalPath,
    pub blocked: LogicalPath,
    pub following: LogicalPath,
    pub followers: LogicalPath,
    #[serde(alias = "videos")]
    pub posts: LogicalPath,
    pub deleted_posts: LogicalPath,

    pub favorite_collections: LogicalPath,
    pub favorite_comments: LogicalPath,
    pub favorite_effects: LogicalPath,
    pub favorite_hashtags: LogicalPath,
    pub favorite_sounds: LogicalPath,
    pub favorite_videos: LogicalPath,
    #[serde(alias = "likedItems")]
    pub favorite_likes: LogicalPath,

    pub direct_messages: LogicalPath,
    pub group_chats: LogicalPath,

    pub hashtag_activity: LogicalPath,
    pub login_history: LogicalPath,
    #[serde(alias = "searchHistory")]
    pub searches: LogicalPath,
    pub reposts: LogicalPath,
    pub share_history: LogicalPath,
    pub status_list: LogicalPath,
    pub sticker_list: LogicalPath,

    pub live_history: LogicalPath,
    pub live_moderator: LogicalPath,
    pub live_watch_history: LogicalPath,

    pub income_wallet: LogicalPath,
    pub income_transaction: LogicalPath,
}

impl Default for ArchivePaths {
    fn default() -> Self {
        let p = LogicalPath::parse;
        ArchivePaths {
            profile: p("Profile And Settings.Profile Info.ProfileMap"),
            comments: p("Comment.Comments.CommentsList"),
            blocked: p("Profile And Settings.Block List.BlockList"),
            following: p("Profile And Settings.Following.Following"),
            followers: p("Profile And Settings.Follower.FansList"),
            posts: p("Post.Posts.VideoList"),
            deleted_posts: p("Post.Recently Deleted Posts.PostList"),

            favorite_collections: p("Likes and Favorites.Favorite Collection.FavoriteCollectionList"),
            favorite_comments: p("Likes and Favorites.Favorite Comment.FavoriteCommentList"),
            favorite_effects: p("Likes and Favorites.Favorite Effects.FavoriteEffectsList"),
            favorite_hashtags: p("Likes and Favorites.Favorite Hashtags.FavoriteHashtagList"),
            favorite_sounds: p("Likes and Favorites.Favorite Sounds.FavoriteSoundList"),
            favorite_videos: p("Likes and Favorites.Favorite Videos.FavoriteVideoList"),
            favorite_likes: p("Likes and Favorites.Like List.ItemFavoriteList"),

            direct_messages: p("Direct Message.Direct Messages.ChatHistory"),
            group_chats: p("Direct Message.Group Chat.GroupChat"),

            hashtag_activity: p("Your Activity.Hashtag.HashtagList"),
            login_history: p("Your Activity.Login History.LoginHistoryList"),
            searches: p("Your Activity.Searches.SearchList"),
            reposts: p("Your Activity.Reposts.RepostList"),
            share_history: p("Your Activity.Share History.ShareHistoryList"),
            status_list: p("Your Activity.Status.Status List"),
            sticker_list: p("Your Activity.Stickers.StickerList"),

            live_history: p("TikTok Live.Go Live History.GoLiveList"),
            live_moderator: p(
                "TikTok Live.Go Live Settings.SettingsMap.People you assigned to moderate your LIVE",
            ),
            live_watch_history: p("TikTok Live.Watch Live History.WatchLiveMap"),

            income_wallet: p("Income+ Wallet.Coin Purchase History.CoinPurchaseHistoryList"),
            income_transaction: p("Income+ Wallet.Transaction History.TransactionsHistoryList"),
        }
    }
}
