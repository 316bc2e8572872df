pub mod ranking;

pub use ranking::{rank_feed, FeedMode, RankingConfig};
