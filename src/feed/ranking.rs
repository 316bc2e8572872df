//! Feed ordering: scoring, tiered shuffling and promotion.
//!
//! Everything in this module is pure so it can be exercised without a
//! database. Callers load candidate posts, pick a [`FeedMode`] and hand
//! in the RNG; pagination is applied to the fully ranked list.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::post::Post;

/// How a feed request wants its posts ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    /// Scored, tiered and shuffled. The default.
    #[default]
    Algorithm,
    /// Newest first.
    Recent,
    /// Highest raw engagement first.
    Popular,
}

impl FeedMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedMode::Algorithm => "algorithm",
            FeedMode::Recent => "recent",
            FeedMode::Popular => "popular",
        }
    }
}

/// Tunable weights for the algorithmic feed.
#[derive(Debug, Clone)]
pub struct RankingConfig {
    pub like_weight: f64,
    pub comment_weight: f64,
    pub repost_weight: f64,
    /// Time constant of the exponential decay, in hours.
    pub decay_hours: f64,
    /// Posts younger than this many hours get the freshness boost.
    pub fresh_window_hours: f64,
    pub fresh_boost: f64,
    /// Scores strictly above this land in the high tier.
    pub high_tier_threshold: f64,
    /// Scores strictly above this (and not high) land in the medium tier.
    pub low_tier_threshold: f64,
    /// Chance of promoting a nearby post after each emission.
    pub promote_probability: f64,
    /// How far ahead the promotion step may reach.
    pub promote_window: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            like_weight: 1.0,
            comment_weight: 2.0,
            repost_weight: 1.5,
            decay_hours: 24.0,
            fresh_window_hours: 2.0,
            fresh_boost: 3.0,
            high_tier_threshold: 5.0,
            low_tier_threshold: 1.0,
            promote_probability: 0.10,
            promote_window: 5,
        }
    }
}

impl RankingConfig {
    /// Weighted engagement, before freshness and decay.
    pub fn engagement_score(&self, post: &Post) -> f64 {
        post.likes_count as f64 * self.like_weight
            + post.comments_count as f64 * self.comment_weight
            + post.reposts_count as f64 * self.repost_weight
    }

    /// Final score: `(engagement + boost + 1) * e^(-age / decay)`.
    pub fn final_score(&self, post: &Post, now: DateTime<Utc>) -> f64 {
        let age_hours = (now - post.created_at).num_milliseconds() as f64 / 3_600_000.0;
        let boost = if age_hours < self.fresh_window_hours {
            self.fresh_boost
        } else {
            0.0
        };
        (self.engagement_score(post) + boost + 1.0) * (-age_hours / self.decay_hours).exp()
    }

    fn tier_for(&self, score: f64) -> Tier {
        if score > self.high_tier_threshold {
            Tier::High
        } else if score > self.low_tier_threshold {
            Tier::Medium
        } else {
            Tier::Low
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Tier {
    High,
    Medium,
    Low,
}

/// Rank `posts` for one feed page.
///
/// `Recent` and `Popular` are plain stable sorts. `Algorithm` scores every
/// post, splits the set into high/medium/low tiers, shuffles within each
/// tier and then walks the list front to back, occasionally promoting one
/// of the next few pending posts to the very next slot. The result is
/// always a permutation of the input; `offset`/`limit` slice it afterwards.
pub fn rank_feed<R: Rng>(
    posts: Vec<Post>,
    mode: FeedMode,
    offset: usize,
    limit: usize,
    now: DateTime<Utc>,
    config: &RankingConfig,
    rng: &mut R,
) -> Vec<Post> {
    let ranked = match mode {
        FeedMode::Recent => {
            let mut posts = posts;
            posts.sort_by_key(|p| std::cmp::Reverse(p.created_at));
            posts
        }
        FeedMode::Popular => {
            let mut posts = posts;
            posts.sort_by_key(|p| {
                std::cmp::Reverse(
                    p.likes_count as i64 + p.comments_count as i64 + p.reposts_count as i64,
                )
            });
            posts
        }
        FeedMode::Algorithm => rank_algorithmic(posts, now, config, rng),
    };

    ranked.into_iter().skip(offset).take(limit).collect()
}

fn rank_algorithmic<R: Rng>(
    posts: Vec<Post>,
    now: DateTime<Utc>,
    config: &RankingConfig,
    rng: &mut R,
) -> Vec<Post> {
    let mut high = Vec::new();
    let mut medium = Vec::new();
    let mut low = Vec::new();

    for post in posts {
        match config.tier_for(config.final_score(&post, now)) {
            Tier::High => high.push(post),
            Tier::Medium => medium.push(post),
            Tier::Low => low.push(post),
        }
    }

    high.shuffle(rng);
    medium.shuffle(rng);
    low.shuffle(rng);

    let mut pending: VecDeque<Post> =
        high.into_iter().chain(medium).chain(low).collect();
    let mut out = Vec::with_capacity(pending.len());

    while let Some(post) = pending.pop_front() {
        out.push(post);

        // One promotion roll per ordinary emission. A promoted post is
        // emitted immediately and does not roll again.
        if !pending.is_empty() && rng.gen::<f64>() < config.promote_probability {
            let window = pending.len().min(config.promote_window);
            let picked = rng.gen_range(0..window);
            if let Some(promoted) = pending.remove(picked) {
                out.push(promoted);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn post_aged(
        id: i32,
        likes: i32,
        comments: i32,
        reposts: i32,
        age_hours: f64,
        now: DateTime<Utc>,
    ) -> Post {
        Post {
            id,
            author_id: 1,
            content: format!("post {id}"),
            media: serde_json::json!([]),
            likes_count: likes,
            comments_count: comments,
            reposts_count: reposts,
            created_at: now - Duration::milliseconds((age_hours * 3_600_000.0) as i64),
            updated_at: now - Duration::milliseconds((age_hours * 3_600_000.0) as i64),
        }
    }

    fn ids(posts: &[Post]) -> Vec<i32> {
        posts.iter().map(|p| p.id).collect()
    }

    #[test]
    fn recent_mode_orders_newest_first() {
        let now = Utc::now();
        let posts = vec![
            post_aged(1, 0, 0, 0, 5.0, now),
            post_aged(2, 0, 0, 0, 1.0, now),
            post_aged(3, 0, 0, 0, 3.0, now),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        let ranked = rank_feed(
            posts,
            FeedMode::Recent,
            0,
            10,
            now,
            &RankingConfig::default(),
            &mut rng,
        );
        assert_eq!(ids(&ranked), vec![2, 3, 1]);
    }

    #[test]
    fn popular_mode_orders_by_raw_engagement() {
        let now = Utc::now();
        let posts = vec![
            post_aged(1, 1, 1, 0, 1.0, now),
            post_aged(2, 4, 3, 3, 1.0, now),
            post_aged(3, 2, 2, 1, 1.0, now),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        let ranked = rank_feed(
            posts,
            FeedMode::Popular,
            0,
            10,
            now,
            &RankingConfig::default(),
            &mut rng,
        );
        assert_eq!(ids(&ranked), vec![2, 3, 1]);
    }

    #[test]
    fn engagement_score_applies_weights() {
        let now = Utc::now();
        let config = RankingConfig::default();
        let post = post_aged(1, 2, 3, 4, 0.0, now);
        // 2*1.0 + 3*2.0 + 4*1.5
        assert!((config.engagement_score(&post) - 14.0).abs() < 1e-9);
    }

    #[test]
    fn fresh_post_gets_boost() {
        let now = Utc::now();
        let config = RankingConfig::default();
        let post = post_aged(1, 0, 0, 0, 0.0, now);
        // (0 + 3 + 1) * e^0
        assert!((config.final_score(&post, now) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn boost_stops_at_window_boundary() {
        let now = Utc::now();
        let config = RankingConfig::default();
        let post = post_aged(1, 0, 0, 0, 2.0, now);
        let expected = (-2.0f64 / 24.0).exp();
        assert!((config.final_score(&post, now) - expected).abs() < 1e-9);
    }

    #[test]
    fn score_decays_with_age() {
        let now = Utc::now();
        let config = RankingConfig::default();
        let post = post_aged(1, 0, 0, 0, 24.0, now);
        let expected = (-1.0f64).exp();
        assert!((config.final_score(&post, now) - expected).abs() < 1e-9);
    }

    #[test]
    fn tier_thresholds_are_exclusive() {
        let config = RankingConfig::default();
        assert_eq!(config.tier_for(5.1), Tier::High);
        assert_eq!(config.tier_for(5.0), Tier::Medium);
        assert_eq!(config.tier_for(1.1), Tier::Medium);
        assert_eq!(config.tier_for(1.0), Tier::Low);
        assert_eq!(config.tier_for(0.2), Tier::Low);
    }

    #[test]
    fn algorithm_keeps_tier_order_without_promotion() {
        let now = Utc::now();
        let config = RankingConfig {
            promote_probability: 0.0,
            ..RankingConfig::default()
        };

        // High: heavy engagement while fresh. Medium: fresh but quiet.
        // Low: old and quiet.
        let mut posts = Vec::new();
        for id in 1..=4 {
            posts.push(post_aged(id, 10, 2, 1, 0.5, now));
        }
        for id in 5..=8 {
            posts.push(post_aged(id, 0, 0, 0, 0.5, now));
        }
        for id in 9..=12 {
            posts.push(post_aged(id, 0, 0, 0, 72.0, now));
        }

        let mut rng = StdRng::seed_from_u64(99);
        let ranked = rank_feed(posts, FeedMode::Algorithm, 0, 100, now, &config, &mut rng);

        let positions: Vec<usize> = (1..=12)
            .map(|id| ranked.iter().position(|p| p.id == id).unwrap())
            .collect();
        let max_high = positions[0..4].iter().max().unwrap();
        let min_medium = positions[4..8].iter().min().unwrap();
        let max_medium = positions[4..8].iter().max().unwrap();
        let min_low = positions[8..12].iter().min().unwrap();
        assert!(max_high < min_medium);
        assert!(max_medium < min_low);
    }

    #[test]
    fn algorithm_emits_every_post_exactly_once() {
        let now = Utc::now();
        let posts: Vec<Post> = (1..=30)
            .map(|id| post_aged(id, id % 7, id % 3, id % 5, (id % 48) as f64, now))
            .collect();

        let mut rng = StdRng::seed_from_u64(42);
        let ranked = rank_feed(
            posts,
            FeedMode::Algorithm,
            0,
            100,
            now,
            &RankingConfig::default(),
            &mut rng,
        );

        let mut got = ids(&ranked);
        got.sort_unstable();
        assert_eq!(got, (1..=30).collect::<Vec<i32>>());
    }

    #[test]
    fn constant_promotion_still_preserves_permutation() {
        let now = Utc::now();
        let posts: Vec<Post> = (1..=20)
            .map(|id| post_aged(id, id, 0, 0, 1.0, now))
            .collect();
        let config = RankingConfig {
            promote_probability: 1.0,
            ..RankingConfig::default()
        };

        let mut rng = StdRng::seed_from_u64(5);
        let ranked = rank_feed(posts, FeedMode::Algorithm, 0, 100, now, &config, &mut rng);

        let mut got = ids(&ranked);
        got.sort_unstable();
        assert_eq!(got, (1..=20).collect::<Vec<i32>>());
    }

    #[test]
    fn pages_tile_the_ranked_list() {
        let now = Utc::now();
        let posts: Vec<Post> = (1..=10)
            .map(|id| post_aged(id, 0, 0, 0, id as f64, now))
            .collect();

        let mut all = Vec::new();
        for offset in [0usize, 4, 8] {
            let page: Vec<Post> = (1..=10)
                .map(|id| post_aged(id, 0, 0, 0, id as f64, now))
                .collect();
            let mut rng = StdRng::seed_from_u64(1);
            all.extend(ids(&rank_feed(
                page,
                FeedMode::Recent,
                offset,
                4,
                now,
                &RankingConfig::default(),
                &mut rng,
            )));
        }

        let mut rng = StdRng::seed_from_u64(1);
        let full = rank_feed(
            posts,
            FeedMode::Recent,
            0,
            10,
            now,
            &RankingConfig::default(),
            &mut rng,
        );
        assert_eq!(all, ids(&full));
    }

    #[test]
    fn offset_past_end_is_empty() {
        let now = Utc::now();
        let posts = vec![post_aged(1, 0, 0, 0, 1.0, now)];
        let mut rng = StdRng::seed_from_u64(3);
        let ranked = rank_feed(
            posts,
            FeedMode::Algorithm,
            10,
            5,
            now,
            &RankingConfig::default(),
            &mut rng,
        );
        assert!(ranked.is_empty());
    }

    #[test]
    fn empty_input_yields_empty_page() {
        let now = Utc::now();
        for mode in [FeedMode::Algorithm, FeedMode::Recent, FeedMode::Popular] {
            let mut rng = StdRng::seed_from_u64(11);
            let ranked = rank_feed(
                Vec::new(),
                mode,
                0,
                20,
                now,
                &RankingConfig::default(),
                &mut rng,
            );
            assert!(ranked.is_empty());
        }
    }
}
