// Copyright (c) EntreeFox Team
// SPDX-License-Identifier: Apache-2.0

//! Two-level comment threads.
//!
//! Threads hold top-level comments and one layer of replies. A reply
//! aimed at another reply is silently attached to that reply's top-level
//! parent, so stored depth never exceeds two.

use std::collections::HashMap;

use anyhow::Result;
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;
use tracing::{debug, info};

use crate::models::comment::{Comment, NewComment, ThreadNode};
use crate::models::user::UserSummary;
use crate::schema::{comments, posts, users};

use super::SocialStore;

impl SocialStore {
    /// Add a comment or reply to a post. `Ok(None)` when the post is
    /// missing, or when `parent_id` does not name a comment on that post.
    pub async fn create_comment(
        &self,
        post_id: i32,
        author_id: i32,
        parent_id: Option<i32>,
        content: String,
    ) -> Result<Option<Comment>> {
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
                    let parent_id = match parent_id {
                        Some(requested) => {
                            let parent = comments::table
                                .filter(comments::id.eq(requested))
                                .filter(comments::post_id.eq(post_id))
                                .select(comments::parent_id)
                                .first::<Option<i32>>(&mut conn)
                                .await
                                .optional()?;
                            match parent {
                                // Reply to a reply: hang it off the
                                // top-level comment instead.
                                Some(Some(top_level)) => {
                                    debug!(
                                        "Flattening reply under comment {} onto comment {}",
                                        requested, top_level
                                    );
                                    Some(top_level)
                                }
                                Some(None) => Some(requested),
                                None => return Result::<_, DieselError>::Ok(None),
                            }
                        }
                        None => None,
                    };

                    let new_comment = NewComment {
                        post_id,
                        author_id,
                        parent_id,
                        content,
                        created_at: Utc::now(),
                    };
                    let comment = diesel::insert_into(comments::table)
                        .values(&new_comment)
                        .get_result::<Comment>(&mut conn)
                        .await?;

                    // comments_count covers replies as well.
                    diesel::update(posts::table.filter(posts::id.eq(post_id)))
                        .set(posts::comments_count.eq(posts::comments_count + 1))
                        .execute(&mut conn)
                        .await?;

                    if let Some(parent) = comment.parent_id {
                        diesel::update(comments::table.filter(comments::id.eq(parent)))
                            .set(comments::replies_count.eq(comments::replies_count + 1))
                            .execute(&mut conn)
                            .await?;
                    }

                    Ok(Some(comment))
                })
            })
            .await;

        match result {
            Ok(Some(comment)) => {
                info!("User {} commented on post {}", author_id, post_id);
                Ok(Some(comment))
            }
            Ok(None) => {
                debug!("Parent comment not found on post {}", post_id);
                Ok(None)
            }
            Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a comment the caller authored, along with its replies.
    /// Returns false when the comment is missing or not owned by
    /// `author_id`.
    pub async fn delete_comment(&self, comment_id: i32, author_id: i32) -> Result<bool> {
        let mut conn = self.get_connection().await?;

        let deleted = conn
            .build_transaction()
            .run(|mut conn| {
                Box::pin(async move {
                    // The row lock keeps new replies out until the delete
                    // commits: inserting a reply key-shares its parent row.
                    let target = comments::table
                        .filter(comments::id.eq(comment_id))
                        .filter(comments::author_id.eq(author_id))
                        .select((comments::post_id, comments::parent_id))
                        .for_update()
                        .first::<(i32, Option<i32>)>(&mut conn)
                        .await
                        .optional()?;
                    let (post_id, parent_id) = match target {
                        Some(target) => target,
                        None => return Result::<_, DieselError>::Ok(false),
                    };

                    // One statement removes the comment and its replies;
                    // its affected-row count is exactly what the post
                    // counter owes.
                    let removed = diesel::delete(
                        comments::table.filter(
                            comments::id
                                .eq(comment_id)
                                .or(comments::parent_id.eq(comment_id)),
                        ),
                    )
                    .execute(&mut conn)
                    .await?;

                    diesel::sql_query(
                        "UPDATE posts SET comments_count = GREATEST(comments_count - $1, 0) WHERE id = $2",
                    )
                    .bind::<diesel::sql_types::Integer, _>(removed as i32)
                    .bind::<diesel::sql_types::Integer, _>(post_id)
                    .execute(&mut conn)
                    .await?;

                    if let Some(parent) = parent_id {
                        diesel::sql_query(
                            "UPDATE comments SET replies_count = GREATEST(replies_count - 1, 0) WHERE id = $1",
                        )
                        .bind::<diesel::sql_types::Integer, _>(parent)
                        .execute(&mut conn)
                        .await?;
                    }

                    Ok(true)
                })
            })
            .await?;

        if deleted {
            info!("User {} deleted comment {}", author_id, comment_id);
        }
        Ok(deleted)
    }

    /// The full comment thread of a post: top-level comments newest first,
    /// each carrying its replies oldest first. `Ok(None)` when the post
    /// does not exist.
    pub async fn get_thread(&self, post_id: i32) -> Result<Option<Vec<ThreadNode>>> {
        let mut conn = self.get_connection().await?;

        let post_exists = posts::table
            .filter(posts::id.eq(post_id))
            .count()
            .get_result::<i64>(&mut conn)
            .await?
            > 0;
        if !post_exists {
            return Ok(None);
        }

        let rows = comments::table
            .inner_join(users::table.on(users::id.eq(comments::author_id)))
            .filter(comments::post_id.eq(post_id))
            .order((comments::created_at.asc(), comments::id.asc()))
            .select((Comment::as_select(), UserSummary::as_select()))
            .load::<(Comment, UserSummary)>(&mut conn)
            .await?;

        Ok(Some(assemble_thread(rows)))
    }
}

/// Build the nested thread from rows sorted oldest first. Creation order
/// guarantees every parent precedes its replies, so a single pass suffices.
fn assemble_thread(rows: Vec<(Comment, UserSummary)>) -> Vec<ThreadNode> {
    let mut tops: Vec<ThreadNode> = Vec::new();
    let mut slot_by_id: HashMap<i32, usize> = HashMap::new();

    for (comment, author) in rows {
        match comment.parent_id {
            None => {
                slot_by_id.insert(comment.id, tops.len());
                tops.push(ThreadNode::new(comment, author));
            }
            Some(parent_id) => {
                // A reply whose parent is gone (or is itself a reply)
                // has nowhere to hang; drop it.
                if let Some(&slot) = slot_by_id.get(&parent_id) {
                    tops[slot].replies.push(ThreadNode::new(comment, author));
                }
            }
        }
    }

    tops.reverse();
    tops
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn author(id: i32) -> UserSummary {
        UserSummary {
            id,
            first_name: format!("User{id}"),
            last_name: "Example".to_string(),
            profile_image_url: None,
            is_verified: false,
        }
    }

    fn comment(id: i32, parent_id: Option<i32>, at: DateTime<Utc>) -> (Comment, UserSummary) {
        (
            Comment {
                id,
                post_id: 1,
                author_id: id,
                parent_id,
                content: format!("comment {id}"),
                replies_count: 0,
                created_at: at,
            },
            author(id),
        )
    }

    #[test]
    fn tops_newest_first_replies_oldest_first() {
        let base = Utc::now();
        let rows = vec![
            comment(1, None, base),
            comment(2, Some(1), base + Duration::seconds(1)),
            comment(3, Some(1), base + Duration::seconds(2)),
            comment(4, None, base + Duration::seconds(3)),
        ];

        let thread = assemble_thread(rows);

        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0].id, 4);
        assert_eq!(thread[1].id, 1);
        let replies: Vec<i32> = thread[1].replies.iter().map(|r| r.id).collect();
        assert_eq!(replies, vec![2, 3]);
        assert!(thread[0].replies.is_empty());
    }

    #[test]
    fn orphaned_reply_is_dropped() {
        let base = Utc::now();
        let rows = vec![
            comment(1, None, base),
            comment(2, Some(99), base + Duration::seconds(1)),
        ];

        let thread = assemble_thread(rows);

        assert_eq!(thread.len(), 1);
        assert_eq!(thread[0].id, 1);
        assert!(thread[0].replies.is_empty());
    }

    #[test]
    fn reply_rows_never_collect_their_own_replies() {
        let base = Utc::now();
        // Row 3 claims row 2 (a reply) as parent; stored data should never
        // look like this, and assembly refuses to nest a third level.
        let rows = vec![
            comment(1, None, base),
            comment(2, Some(1), base + Duration::seconds(1)),
            comment(3, Some(2), base + Duration::seconds(2)),
        ];

        let thread = assemble_thread(rows);

        assert_eq!(thread.len(), 1);
        assert_eq!(thread[0].replies.len(), 1);
        assert_eq!(thread[0].replies[0].id, 2);
        assert!(thread[0].replies[0].replies.is_empty());
    }

    #[test]
    fn empty_thread_is_empty() {
        assert!(assemble_thread(Vec::new()).is_empty());
    }

    // Deletion must lock the target before counting anything, or a reply
    // committed while the delete waits is removed but never subtracted
    // from comments_count.
    #[test]
    fn deletion_locks_the_target_row() {
        let query = comments::table
            .filter(comments::id.eq(7))
            .filter(comments::author_id.eq(3))
            .select((comments::post_id, comments::parent_id))
            .for_update();
        let sql = diesel::debug_query::<diesel::pg::Pg, _>(&query).to_string();
        assert!(sql.contains("FOR UPDATE"));
    }

    // The decrement is the delete's affected-row count, so the statement
    // itself must cover the replies rather than leaving them to the
    // cascade, which reports nothing.
    #[test]
    fn deletion_removes_replies_in_the_same_statement() {
        let query = diesel::delete(
            comments::table.filter(comments::id.eq(7).or(comments::parent_id.eq(7))),
        );
        let sql = diesel::debug_query::<diesel::pg::Pg, _>(&query).to_string();
        assert!(sql.contains(r#""comments"."id" = $1"#));
        assert!(sql.contains(" OR "));
        assert!(sql.contains(r#""comments"."parent_id" = $2"#));
    }
}
