// Copyright (c) EntreeFox Team
// SPDX-License-Identifier: Apache-2.0

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{debug, info};

use crate::feed::{rank_feed, FeedMode};
use crate::models::post::{FeedPost, MediaItem, NewPost, Post, PostChanges};
use crate::models::user::UserSummary;
use crate::schema::{likes, posts, reposts, saved_posts, users};

use super::SocialStore;

impl SocialStore {
    /// Create a post. Returns `Ok(None)` when the author does not exist.
    pub async fn create_post(
        &self,
        author_id: i32,
        content: String,
        media: Vec<MediaItem>,
    ) -> Result<Option<Post>> {
        let mut conn = self.get_connection().await?;

        let author_exists = users::table
            .filter(users::id.eq(author_id))
            .count()
            .get_result::<i64>(&mut conn)
            .await?
            > 0;
        if !author_exists {
            debug!("Author not found: {}", author_id);
            return Ok(None);
        }

        let now = Utc::now();
        let new_post = NewPost {
            author_id,
            content,
            media: serde_json::to_value(&media)?,
            created_at: now,
            updated_at: now,
        };

        let post = diesel::insert_into(posts::table)
            .values(&new_post)
            .get_result::<Post>(&mut conn)
            .await?;

        info!("Created post {} for user {}", post.id, author_id);
        Ok(Some(post))
    }

    /// Fetch a single post with author and viewer flags.
    pub async fn get_post(&self, post_id: i32, viewer_id: Option<i32>) -> Result<Option<FeedPost>> {
        let mut conn = self.get_connection().await?;

        let post = posts::table
            .find(post_id)
            .first::<Post>(&mut conn)
            .await
            .optional()?;

        let post = match post {
            Some(post) => post,
            None => return Ok(None),
        };

        let mut hydrated = self.hydrate_posts(vec![post], viewer_id).await?;
        Ok(hydrated.pop())
    }

    /// Edit a post's content and/or media. Returns `Ok(None)` when the post
    /// is missing or not owned by `author_id`.
    pub async fn update_post(
        &self,
        post_id: i32,
        author_id: i32,
        content: Option<String>,
        media: Option<Vec<MediaItem>>,
    ) -> Result<Option<Post>> {
        let mut conn = self.get_connection().await?;

        let media = match media {
            Some(items) => Some(serde_json::to_value(&items)?),
            None => None,
        };
        let changes = PostChanges {
            content,
            media,
            updated_at: Utc::now(),
        };

        let updated = diesel::update(
            posts::table
                .filter(posts::id.eq(post_id))
                .filter(posts::author_id.eq(author_id)),
        )
        .set(&changes)
        .get_result::<Post>(&mut conn)
        .await
        .optional()?;

        if updated.is_some() {
            info!("Updated post {} for user {}", post_id, author_id);
        }
        Ok(updated)
    }

    /// Delete a post and, via cascading foreign keys, its comments, likes,
    /// reposts and saves. Returns false when the post is missing or not
    /// owned by `author_id`.
    pub async fn delete_post(&self, post_id: i32, author_id: i32) -> Result<bool> {
        let mut conn = self.get_connection().await?;

        let deleted = diesel::delete(
            posts::table
                .filter(posts::id.eq(post_id))
                .filter(posts::author_id.eq(author_id)),
        )
        .execute(&mut conn)
        .await?;

        if deleted > 0 {
            info!("Deleted post {} for user {}", post_id, author_id);
        }
        Ok(deleted > 0)
    }

    /// Rank the whole post set and serve one page of it.
    pub async fn get_feed(
        &self,
        mode: FeedMode,
        viewer_id: Option<i32>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<FeedPost>> {
        let mut conn = self.get_connection().await?;

        let candidates = posts::table
            .order(posts::created_at.desc())
            .load::<Post>(&mut conn)
            .await?;
        drop(conn);

        debug!(
            "Ranking {} posts in {} mode (offset {}, limit {})",
            candidates.len(),
            mode.as_str(),
            offset,
            limit
        );

        let now = Utc::now();
        // ThreadRng is not Send, so it must not live across an await.
        let page = {
            let mut rng = rand::thread_rng();
            rank_feed(candidates, mode, offset, limit, now, &self.ranking, &mut rng)
        };

        self.hydrate_posts(page, viewer_id).await
    }

    /// Posts authored by one user, newest first. `Ok(None)` when the user
    /// does not exist.
    pub async fn user_posts(
        &self,
        user_id: i32,
        viewer_id: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> Result<Option<Vec<FeedPost>>> {
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

        let page = posts::table
            .filter(posts::author_id.eq(user_id))
            .order(posts::created_at.desc())
            .limit(limit)
            .offset(offset)
            .load::<Post>(&mut conn)
            .await?;
        drop(conn);

        Ok(Some(self.hydrate_posts(page, viewer_id).await?))
    }

    /// Posts a user has reposted, most recent repost first.
    pub async fn reposted_posts(
        &self,
        user_id: i32,
        viewer_id: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> Result<Option<Vec<FeedPost>>> {
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

        let page = reposts::table
            .filter(reposts::user_id.eq(user_id))
            .inner_join(posts::table)
            .order(reposts::created_at.desc())
            .limit(limit)
            .offset(offset)
            .select(Post::as_select())
            .load::<Post>(&mut conn)
            .await?;
        drop(conn);

        Ok(Some(self.hydrate_posts(page, viewer_id).await?))
    }

    /// Posts a user has saved, most recently saved first.
    pub async fn saved_posts(
        &self,
        user_id: i32,
        viewer_id: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> Result<Option<Vec<FeedPost>>> {
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

        let page = saved_posts::table
            .filter(saved_posts::user_id.eq(user_id))
            .inner_join(posts::table)
            .order(saved_posts::created_at.desc())
            .limit(limit)
            .offset(offset)
            .select(Post::as_select())
            .load::<Post>(&mut conn)
            .await?;
        drop(conn);

        Ok(Some(self.hydrate_posts(page, viewer_id).await?))
    }

    /// Attach author summaries and per-viewer membership flags to a page of
    /// posts, preserving order. Authors and flags are fetched in one batch
    /// query each.
    async fn hydrate_posts(
        &self,
        page: Vec<Post>,
        viewer_id: Option<i32>,
    ) -> Result<Vec<FeedPost>> {
        if page.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.get_connection().await?;

        let post_ids: Vec<i32> = page.iter().map(|p| p.id).collect();
        let author_ids: Vec<i32> = page.iter().map(|p| p.author_id).collect();

        let authors: HashMap<i32, UserSummary> = users::table
            .filter(users::id.eq_any(&author_ids))
            .select(UserSummary::as_select())
            .load::<UserSummary>(&mut conn)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let (liked, reposted, saved) = match viewer_id {
            Some(viewer) => {
                let liked: HashSet<i32> = likes::table
                    .filter(likes::user_id.eq(viewer))
                    .filter(likes::post_id.eq_any(&post_ids))
                    .select(likes::post_id)
                    .load::<i32>(&mut conn)
                    .await?
                    .into_iter()
                    .collect();
                let reposted: HashSet<i32> = reposts::table
                    .filter(reposts::user_id.eq(viewer))
                    .filter(reposts::post_id.eq_any(&post_ids))
                    .select(reposts::post_id)
                    .load::<i32>(&mut conn)
                    .await?
                    .into_iter()
                    .collect();
                let saved: HashSet<i32> = saved_posts::table
                    .filter(saved_posts::user_id.eq(viewer))
                    .filter(saved_posts::post_id.eq_any(&post_ids))
                    .select(saved_posts::post_id)
                    .load::<i32>(&mut conn)
                    .await?
                    .into_iter()
                    .collect();
                (liked, reposted, saved)
            }
            None => (HashSet::new(), HashSet::new(), HashSet::new()),
        };

        let mut out = Vec::with_capacity(page.len());
        for post in page {
            let author = match authors.get(&post.author_id) {
                Some(author) => author.clone(),
                None => {
                    // Author row vanished between the two queries.
                    debug!("Skipping post {} with missing author", post.id);
                    continue;
                }
            };
            out.push(FeedPost {
                id: post.id,
                author,
                content: post.content,
                media: post.media,
                likes_count: post.likes_count,
                comments_count: post.comments_count,
                reposts_count: post.reposts_count,
                created_at: post.created_at,
                updated_at: post.updated_at,
                is_liked: liked.contains(&post.id),
                is_reposted: reposted.contains(&post.id),
                is_saved: saved.contains(&post.id),
            });
        }

        Ok(out)
    }
}
