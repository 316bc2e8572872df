// Copyright (c) EntreeFox Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::user::UserSummary;

#[derive(Debug, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Comment {
    pub id: i32,
    pub post_id: i32,
    pub author_id: i32,
    pub parent_id: Option<i32>,
    pub content: String,
    pub replies_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewComment {
    pub post_id: i32,
    pub author_id: i32,
    pub parent_id: Option<i32>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// One node of a post's comment thread. Top-level nodes carry their replies
/// oldest-first; reply nodes always have an empty `replies` list.
#[derive(Debug, Serialize)]
pub struct ThreadNode {
    pub id: i32,
    pub post_id: i32,
    pub author: UserSummary,
    pub parent_id: Option<i32>,
    pub content: String,
    pub replies_count: i32,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<ThreadNode>,
}

impl ThreadNode {
    pub fn new(comment: Comment, author: UserSummary) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author,
            parent_id: comment.parent_id,
            content: comment.content,
            replies_count: comment.replies_count,
            created_at: comment.created_at,
            replies: Vec::new(),
        }
    }
}
