// Copyright (c) EntreeFox Team
// SPDX-License-Identifier: Apache-2.0

//! Counter reconciliation. Denormalized counters are recomputed from the
//! interaction tables, either for one post or for the whole corpus.

use anyhow::Result;
use diesel_async::RunQueryDsl;
use tracing::info;

use super::SocialStore;

impl SocialStore {
    /// Recount likes_count, comments_count and reposts_count on posts and
    /// replies_count on comments. Returns the number of rows rewritten.
    pub async fn reconcile_counters(&self, post_id: Option<i32>) -> Result<usize> {
        let mut conn = self.get_connection().await?;
        let mut touched = 0;

        match post_id {
            Some(post_id) => {
                touched += diesel::sql_query(
                    "UPDATE posts
                     SET likes_count = (
                         SELECT COUNT(*) FROM likes WHERE likes.post_id = posts.id
                     )
                     WHERE id = $1",
                )
                .bind::<diesel::sql_types::Integer, _>(post_id)
                .execute(&mut conn)
                .await?;

                touched += diesel::sql_query(
                    "UPDATE posts
                     SET comments_count = (
                         SELECT COUNT(*) FROM comments WHERE comments.post_id = posts.id
                     )
                     WHERE id = $1",
                )
                .bind::<diesel::sql_types::Integer, _>(post_id)
                .execute(&mut conn)
                .await?;

                touched += diesel::sql_query(
                    "UPDATE posts
                     SET reposts_count = (
                         SELECT COUNT(*) FROM reposts WHERE reposts.post_id = posts.id
                     )
                     WHERE id = $1",
                )
                .bind::<diesel::sql_types::Integer, _>(post_id)
                .execute(&mut conn)
                .await?;

                touched += diesel::sql_query(
                    "UPDATE comments
                     SET replies_count = (
                         SELECT COUNT(*) FROM comments AS replies
                         WHERE replies.parent_id = comments.id
                     )
                     WHERE post_id = $1",
                )
                .bind::<diesel::sql_types::Integer, _>(post_id)
                .execute(&mut conn)
                .await?;

                info!("Reconciled counters for post {}: {} rows", post_id, touched);
            }
            None => {
                touched += diesel::sql_query(
                    "UPDATE posts
                     SET likes_count = (
                         SELECT COUNT(*) FROM likes WHERE likes.post_id = posts.id
                     )",
                )
                .execute(&mut conn)
                .await?;

                touched += diesel::sql_query(
                    "UPDATE posts
                     SET comments_count = (
                         SELECT COUNT(*) FROM comments WHERE comments.post_id = posts.id
                     )",
                )
                .execute(&mut conn)
                .await?;

                touched += diesel::sql_query(
                    "UPDATE posts
                     SET reposts_count = (
                         SELECT COUNT(*) FROM reposts WHERE reposts.post_id = posts.id
                     )",
                )
                .execute(&mut conn)
                .await?;

                touched += diesel::sql_query(
                    "UPDATE comments
                     SET replies_count = (
                         SELECT COUNT(*) FROM comments AS replies
                         WHERE replies.parent_id = comments.id
                     )",
                )
                .execute(&mut conn)
                .await?;

                info!("Reconciled counters for all posts: {} rows", touched);
            }
        }

        Ok(touched)
    }
}
