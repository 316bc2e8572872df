// Copyright (c) EntreeFox Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

/// Membership row for "this user currently likes this post".
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::likes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewLike {
    pub user_id: i32,
    pub post_id: i32,
    pub created_at: DateTime<Utc>,
}

/// Same membership shape as likes; reposts additionally feed the
/// "reposted by me" timeline view.
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::reposts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewRepost {
    pub user_id: i32,
    pub post_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::saved_posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewSavedPost {
    pub user_id: i32,
    pub post_id: i32,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a like toggle: the membership state after the flip.
#[derive(Debug, Serialize)]
pub struct LikeToggle {
    pub liked: bool,
}

/// Outcome of a repost toggle. Carries the authoritative post-toggle count
/// because the reposted-items timeline renders it immediately.
#[derive(Debug, Serialize)]
pub struct RepostToggle {
    pub is_reposted: bool,
    pub reposts_count: i32,
}

/// Outcome of a save toggle. Saves keep no counter on the post.
#[derive(Debug, Serialize)]
pub struct SaveToggle {
    pub saved: bool,
}
