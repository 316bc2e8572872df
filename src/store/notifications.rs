// Copyright (c) EntreeFox Team
// SPDX-License-Identifier: Apache-2.0

//! Notification feed, derived on demand from the interaction tables.
//! There is no notifications table; recent comments, likes and follows
//! aimed at the user are fetched per stream and merged.

use anyhow::Result;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::models::notification::{NotificationEvent, NotificationKind};
use crate::models::user::UserSummary;
use crate::schema::{comments, follows, likes, posts, users};

use super::SocialStore;

/// How many rows each stream contributes before the merge.
const PER_STREAM_LIMIT: i64 = 50;
/// Size cap of the merged feed.
const MERGED_FEED_LIMIT: usize = 50;

impl SocialStore {
    /// Recent activity aimed at a user, newest first. `Ok(None)` when the
    /// user does not exist. The three streams are fetched concurrently on
    /// separate pooled connections.
    pub async fn get_notifications(&self, user_id: i32) -> Result<Option<Vec<NotificationEvent>>> {
        let mut conn = self.get_connection().await?;

        let user_exists = users::table
            .filter(users::id.eq(user_id))
            .count()
            .get_result::<i64>(&mut conn)
            .await?
            > 0;
        if !user_exists {
            return Ok(None);
        }
        drop(conn);

        let (comment_events, like_events, follow_events) = futures::try_join!(
            self.comment_events(user_id),
            self.like_events(user_id),
            self.follow_events(user_id),
        )?;

        debug!(
            "Merging notifications for user {}: {} comments, {} likes, {} follows",
            user_id,
            comment_events.len(),
            like_events.len(),
            follow_events.len()
        );

        Ok(Some(merge_notifications(
            comment_events,
            like_events,
            follow_events,
        )))
    }

    /// Comments left by other users on this user's posts.
    async fn comment_events(&self, user_id: i32) -> Result<Vec<NotificationEvent>> {
        let mut conn = self.get_connection().await?;

        let rows = comments::table
            .inner_join(posts::table.on(posts::id.eq(comments::post_id)))
            .inner_join(users::table.on(users::id.eq(comments::author_id)))
            .filter(posts::author_id.eq(user_id))
            .filter(comments::author_id.ne(user_id))
            .order(comments::created_at.desc())
            .limit(PER_STREAM_LIMIT)
            .select((UserSummary::as_select(), comments::post_id, comments::created_at))
            .load::<(UserSummary, i32, DateTime<Utc>)>(&mut conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(actor, post_id, created_at)| {
                NotificationEvent::new(NotificationKind::Comment, actor, Some(post_id), created_at)
            })
            .collect())
    }

    /// Likes by other users on this user's posts.
    async fn like_events(&self, user_id: i32) -> Result<Vec<NotificationEvent>> {
        let mut conn = self.get_connection().await?;

        let rows = likes::table
            .inner_join(posts::table.on(posts::id.eq(likes::post_id)))
            .inner_join(users::table.on(users::id.eq(likes::user_id)))
            .filter(posts::author_id.eq(user_id))
            .filter(likes::user_id.ne(user_id))
            .order(likes::created_at.desc())
            .limit(PER_STREAM_LIMIT)
            .select((UserSummary::as_select(), likes::post_id, likes::created_at))
            .load::<(UserSummary, i32, DateTime<Utc>)>(&mut conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(actor, post_id, created_at)| {
                NotificationEvent::new(NotificationKind::Like, actor, Some(post_id), created_at)
            })
            .collect())
    }

    /// New followers of this user.
    async fn follow_events(&self, user_id: i32) -> Result<Vec<NotificationEvent>> {
        let mut conn = self.get_connection().await?;

        let rows = follows::table
            .inner_join(users::table.on(users::id.eq(follows::follower_id)))
            .filter(follows::following_id.eq(user_id))
            .order(follows::created_at.desc())
            .limit(PER_STREAM_LIMIT)
            .select((UserSummary::as_select(), follows::created_at))
            .load::<(UserSummary, DateTime<Utc>)>(&mut conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(actor, created_at)| {
                NotificationEvent::new(NotificationKind::Follow, actor, None, created_at)
            })
            .collect())
    }
}

/// Merge the per-stream results into one feed, newest first, capped.
fn merge_notifications(
    comment_events: Vec<NotificationEvent>,
    like_events: Vec<NotificationEvent>,
    follow_events: Vec<NotificationEvent>,
) -> Vec<NotificationEvent> {
    let mut merged: Vec<NotificationEvent> = comment_events
        .into_iter()
        .chain(like_events)
        .chain(follow_events)
        .collect();
    merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    merged.truncate(MERGED_FEED_LIMIT);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn actor(id: i32) -> UserSummary {
        UserSummary {
            id,
            first_name: format!("User{id}"),
            last_name: "Example".to_string(),
            profile_image_url: None,
            is_verified: false,
        }
    }

    fn event(kind: NotificationKind, seconds: i64, base: DateTime<Utc>) -> NotificationEvent {
        let post_id = match kind {
            NotificationKind::Follow => None,
            _ => Some(7),
        };
        NotificationEvent::new(kind, actor(1), post_id, base + Duration::seconds(seconds))
    }

    #[test]
    fn merged_feed_is_newest_first() {
        let base = Utc::now();
        let merged = merge_notifications(
            vec![event(NotificationKind::Comment, 3, base)],
            vec![
                event(NotificationKind::Like, 5, base),
                event(NotificationKind::Like, 1, base),
            ],
            vec![event(NotificationKind::Follow, 4, base)],
        );

        let offsets: Vec<i64> = merged
            .iter()
            .map(|e| (e.created_at - base).num_seconds())
            .collect();
        assert_eq!(offsets, vec![5, 4, 3, 1]);
    }

    #[test]
    fn merged_feed_is_capped() {
        let base = Utc::now();
        let comments: Vec<_> = (0..25)
            .map(|i| event(NotificationKind::Comment, i, base))
            .collect();
        let likes: Vec<_> = (25..50)
            .map(|i| event(NotificationKind::Like, i, base))
            .collect();
        let follows: Vec<_> = (50..75)
            .map(|i| event(NotificationKind::Follow, i, base))
            .collect();

        let merged = merge_notifications(comments, likes, follows);

        assert_eq!(merged.len(), MERGED_FEED_LIMIT);
        // The cap keeps the newest events.
        assert_eq!((merged[0].created_at - base).num_seconds(), 74);
        assert_eq!(
            (merged[MERGED_FEED_LIMIT - 1].created_at - base).num_seconds(),
            25
        );
    }

    #[test]
    fn events_carry_fixed_messages_and_unread_state() {
        let base = Utc::now();
        let like = event(NotificationKind::Like, 0, base);
        assert_eq!(like.message, "liked your post");
        assert!(!like.is_read);

        let comment = event(NotificationKind::Comment, 0, base);
        assert_eq!(comment.message, "commented on your post");
        assert_eq!(comment.post_id, Some(7));

        let follow = event(NotificationKind::Follow, 0, base);
        assert_eq!(follow.message, "started following you");
        assert_eq!(follow.post_id, None);
    }
}
