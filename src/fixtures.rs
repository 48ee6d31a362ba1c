//! Small but complete export archive used across the test modules

use serde_json::{json, Value};

pub fn sample_archive() -> Value {
    json!({
        "Profile And Settings": {
            "Profile Info": {
                "ProfileMap": {
                    "displayName": "Alice",
                    "userName": "alice",
                    "likesReceived": 1200,
                    "followingCount": 2,
                    "followerCount": 2,
                    "birthDate": "01-Jan-2000",
                    "emailAddress": "alice@example.com",
                    "bio": "I'm here",
                    "avatar": "https://p16.tiktokcdn.com/avatar/alice.jpeg",
                    "internalFlag": true
                }
            },
            "Following": {"Following": [
                {"Date": "2023-01-01 10:00:00", "UserName": "bob"},
                {"Date": "2023-01-02 10:00:00", "UserName": "carol"}
            ]},
            "Follower": {"FansList": [
                {"Date": "2023-02-01 10:00:00", "UserName": "bob"},
                {"Date": "2023-02-02 10:00:00", "UserName": "dave"}
            ]},
            "Block List": {"BlockList": [
                {"Date": "2023-03-01 10:00:00", "UserName": "mallory"}
            ]}
        },
        "Comment": {"Comments": {"CommentsList": [
            {"date": "2023-04-01 12:00:00", "comment": "O'Brien said hi", "photo": "N/A"},
            {"date": "2023-04-02 12:00:00", "comment": "second"}
        ]}},
        "Post": {
            "Posts": {"VideoList": [
                {
                    "Date": "2023-05-01 09:00:00",
                    "Link": "https://www.tiktokv.com/share/video/7212345678901234567/",
                    "Likes": "10",
                    "WhoCanView": "Everyone",
                    "Sound": "original"
                }
            ]},
            "Recently Deleted Posts": {"PostList": [
                {
                    "Date": "2023-05-02 09:00:00",
                    "DateDeleted": "2023-05-03 09:00:00",
                    "Link": "https://www.tiktokv.com/share/video/7299999999999999999/",
                    "Likes": "1"
                }
            ]}
        },
        "Direct Message": {
            "Direct Messages": {"ChatHistory": {
                "Chat History with bob:": [
                    {"Date": "2023-06-01 08:00:00", "From": "bob", "Content": "hey"},
                    {"Date": "2023-06-01 08:01:00", "From": "alice", "Content": "https://im.tiktok.com/media/clip.mp4"}
                ],
                "Unexpected key": [{"Content": "ignored"}]
            }},
            "Group Chat": {"GroupChat": {
                "Group Chat with Group_Chat_weekend:": [
                    {"Date": "2023-06-02 08:00:00", "From": "carol", "Content": "plans?"}
                ]
            }}
        },
        "Likes and Favorites": {
            "Favorite Sounds": {"FavoriteSoundList": [
                {"Date": "2023-07-01 10:00:00", "Link": "https://www.tiktok.com/music/7000001"}
            ]},
            "Like List": {"ItemFavoriteList": [
                {"date": "2023-07-02 10:00:00", "link": "https://www.tiktokv.com/share/video/7000002/"}
            ]},
            "Favorite Comment": {"FavoriteCommentList": [
                {"FavoriteComment": "great"}
            ]}
        },
        "Your Activity": {
            "Searches": {"SearchList": [
                {"Date": "2023-08-01 10:00:00", "SearchTerm": "rust"}
            ]},
            "Login History": {"LoginHistoryList": [
                {"Date": "2023-08-02 10:00:00", "IP": "10.0.0.1", "DeviceModel": "Pixel", "DeviceSystem": "Android", "NetworkType": "Wi-Fi", "Carrier": "None"}
            ]}
        },
        "TikTok Live": {
            "Go Live History": {"GoLiveList": [
                {"RoomId": "7001", "RoomTitle": "hello", "LiveStartTime": "s", "LiveEndTime": "e", "LiveDuration": "1h", "TotalEarning": 0, "TotalLike": 5, "TotalView": 9, "TotalGifter": 0, "MutedList": ["x", "y"]}
            ]},
            "Go Live Settings": {"SettingsMap": {
                "People you assigned to moderate your LIVE": ["mod_one", {"Name": "mod_two"}, {"Other": 1}, null]
            }},
            "Watch Live History": {"WatchLiveMap": {
                "7001": {
                    "WatchTime": "2023-05-01 20:00:00",
                    "Comments": [
                        {"CommentContent": "wow", "CommentTime": "20:01", "RawTime": 1682971260},
                        {"CommentContent": "bye", "CommentTime": "20:05", "RawTime": 1682971500}
                    ]
                },
                "7002": "not an object"
            }}
        },
        "Income+ Wallet": {
            "Coin Purchase History": {"CoinPurchaseHistoryList": [
                {"Date": "2023-09-01", "Type": "Purchase", "CoinAmount": 70, "Price": "0.99"}
            ]}
        }
    })
}
