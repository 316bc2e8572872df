// Copyright (c) EntreeFox Team
// SPDX-License-Identifier: Apache-2.0

//! Like, repost and save toggles.
//!
//! Toggles are delete-first: a removed row means the caller just switched
//! the interaction off, otherwise a conflict-safe insert switches it on.
//! Counters move only by the number of rows actually changed, so two racing
//! togglers can never double-count.

use anyhow::Result;
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;
use tracing::{debug, info};

use crate::models::interaction::{
    LikeToggle, NewLike, NewRepost, NewSavedPost, RepostToggle, SaveToggle,
};
use crate::schema::{likes, posts, reposts, saved_posts};

use super::SocialStore;

impl SocialStore {
    /// Flip the caller's like on a post. `Ok(None)` when the post (or the
    /// user) does not exist.
    pub async fn toggle_like(&self, user_id: i32, post_id: i32) -> Result<Option<LikeToggle>> {
        debug!("Toggling like: user {} post {}", user_id, post_id);

        let mut conn = self.get_connection().await?;

        let post_exists = posts::table
            .filter(posts::id.eq(post_id))
            .count()
            .get_result::<i64>(&mut conn)
            .await?
            > 0;
        if !post_exists {
            debug!("Post not found: {}", post_id);
            return Ok(None);
        }

        let result = conn
            .build_transaction()
            .run(|mut conn| {
                Box::pin(async move {
                    let removed = diesel::delete(
                        likes::table
                            .filter(likes::user_id.eq(user_id))
                            .filter(likes::post_id.eq(post_id)),
                    )
                    .execute(&mut conn)
                    .await?;

                    if removed > 0 {
                        diesel::sql_query(
                            "UPDATE posts SET likes_count = GREATEST(likes_count - 1, 0) WHERE id = $1",
                        )
                        .bind::<diesel::sql_types::Integer, _>(post_id)
                        .execute(&mut conn)
                        .await?;
                        return Result::<_, DieselError>::Ok(false);
                    }

                    let new_like = NewLike {
                        user_id,
                        post_id,
                        created_at: Utc::now(),
                    };
                    let inserted = diesel::insert_into(likes::table)
                        .values(&new_like)
                        .on_conflict((likes::user_id, likes::post_id))
                        .do_nothing()
                        .execute(&mut conn)
                        .await?;

                    // A lost insert race means the row already exists;
                    // the counter must not move again.
                    if inserted > 0 {
                        diesel::update(posts::table.filter(posts::id.eq(post_id)))
                            .set(posts::likes_count.eq(posts::likes_count + 1))
                            .execute(&mut conn)
                            .await?;
                    }

                    Ok(true)
                })
            })
            .await;

        match result {
            Ok(liked) => {
                info!(
                    "User {} {} post {}",
                    user_id,
                    if liked { "liked" } else { "unliked" },
                    post_id
                );
                Ok(Some(LikeToggle { liked }))
            }
            Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Flip the caller's repost on a post. The returned count is read back
    /// inside the same transaction so the client can render it as-is.
    pub async fn toggle_repost(&self, user_id: i32, post_id: i32) -> Result<Option<RepostToggle>> {
        debug!("Toggling repost: user {} post {}", user_id, post_id);

        let mut conn = self.get_connection().await?;

        let post_exists = posts::table
            .filter(posts::id.eq(post_id))
            .count()
            .get_result::<i64>(&mut conn)
            .await?
            > 0;
        if !post_exists {
            debug!("Post not found: {}", post_id);
            return Ok(None);
        }

        let result = conn
            .build_transaction()
            .run(|mut conn| {
                Box::pin(async move {
                    let removed = diesel::delete(
                        reposts::table
                            .filter(reposts::user_id.eq(user_id))
                            .filter(reposts::post_id.eq(post_id)),
                    )
                    .execute(&mut conn)
                    .await?;

                    let is_reposted = if removed > 0 {
                        diesel::sql_query(
                            "UPDATE posts SET reposts_count = GREATEST(reposts_count - 1, 0) WHERE id = $1",
                        )
                        .bind::<diesel::sql_types::Integer, _>(post_id)
                        .execute(&mut conn)
                        .await?;
                        false
                    } else {
                        let new_repost = NewRepost {
                            user_id,
                            post_id,
                            created_at: Utc::now(),
                        };
                        let inserted = diesel::insert_into(reposts::table)
                            .values(&new_repost)
                            .on_conflict((reposts::user_id, reposts::post_id))
                            .do_nothing()
                            .execute(&mut conn)
                            .await?;

                        if inserted > 0 {
                            diesel::update(posts::table.filter(posts::id.eq(post_id)))
                                .set(posts::reposts_count.eq(posts::reposts_count + 1))
                                .execute(&mut conn)
                                .await?;
                        }
                        true
                    };

                    let reposts_count = posts::table
                        .filter(posts::id.eq(post_id))
                        .select(posts::reposts_count)
                        .first::<i32>(&mut conn)
                        .await?;

                    Result::<_, DieselError>::Ok(RepostToggle {
                        is_reposted,
                        reposts_count,
                    })
                })
            })
            .await;

        match result {
            Ok(toggle) => {
                info!(
                    "User {} {} post {}",
                    user_id,
                    if toggle.is_reposted {
                        "reposted"
                    } else {
                        "un-reposted"
                    },
                    post_id
                );
                Ok(Some(toggle))
            }
            Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Flip the caller's save on a post. Saves keep no counter on the post
    /// row, so no transaction is needed around the two statements.
    pub async fn toggle_save(&self, user_id: i32, post_id: i32) -> Result<Option<SaveToggle>> {
        debug!("Toggling save: user {} post {}", user_id, post_id);

        let mut conn = self.get_connection().await?;

        let post_exists = posts::table
            .filter(posts::id.eq(post_id))
            .count()
            .get_result::<i64>(&mut conn)
            .await?
            > 0;
        if !post_exists {
            debug!("Post not found: {}", post_id);
            return Ok(None);
        }

        let removed = diesel::delete(
            saved_posts::table
                .filter(saved_posts::user_id.eq(user_id))
                .filter(saved_posts::post_id.eq(post_id)),
        )
        .execute(&mut conn)
        .await?;

        if removed > 0 {
            info!("User {} unsaved post {}", user_id, post_id);
            return Ok(Some(SaveToggle { saved: false }));
        }

        let new_save = NewSavedPost {
            user_id,
            post_id,
            created_at: Utc::now(),
        };
        let inserted = diesel::insert_into(saved_posts::table)
            .values(&new_save)
            .on_conflict((saved_posts::user_id, saved_posts::post_id))
            .do_nothing()
            .execute(&mut conn)
            .await;

        match inserted {
            Ok(_) => {
                info!("User {} saved post {}", user_id, post_id);
                Ok(Some(SaveToggle { saved: true }))
            }
            Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
