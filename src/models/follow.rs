// Copyright (c) EntreeFox Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::user::UserSummary;

/// Directed edge in the social graph: follower_id follows following_id.
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::follows)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewFollow {
    pub follower_id: i32,
    pub following_id: i32,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a follow toggle: the edge state after the flip.
#[derive(Debug, Serialize)]
pub struct FollowToggle {
    pub following: bool,
}

/// One entry of a followers/following listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct FollowDetail {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub profile_image_url: Option<String>,
    pub is_verified: bool,
    pub followed_at: DateTime<Utc>,
}

impl FollowDetail {
    pub fn new(user: UserSummary, followed_at: DateTime<Utc>) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            profile_image_url: user.profile_image_url,
            is_verified: user.is_verified,
            followed_at,
        }
    }
}

/// Follower/following edge counts for a user, derived by counting rows
/// (user rows never carry denormalized graph counters).
#[derive(Debug, Serialize)]
pub struct FollowStats {
    pub user: UserSummary,
    pub followers_count: i64,
    pub following_count: i64,
}

/// Query parameters for paginating followers/following lists.
#[derive(Debug, Deserialize)]
pub struct FollowsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub page: Option<i64>,
}

impl FollowsQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(50).clamp(1, 100)
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Effective row offset. A page number past the first wins over a raw
    /// offset.
    pub fn offset(&self) -> i64 {
        let page = self.page();
        if page > 1 {
            (page - 1) * self.limit()
        } else {
            self.offset.unwrap_or(0).max(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(limit: Option<i64>, offset: Option<i64>, page: Option<i64>) -> FollowsQuery {
        FollowsQuery {
            limit,
            offset,
            page,
        }
    }

    #[test]
    fn limit_is_clamped_to_a_sane_range() {
        assert_eq!(query(None, None, None).limit(), 50);
        assert_eq!(query(Some(0), None, None).limit(), 1);
        assert_eq!(query(Some(-5), None, None).limit(), 1);
        assert_eq!(query(Some(500), None, None).limit(), 100);
    }

    #[test]
    fn page_wins_over_offset_and_never_goes_negative() {
        assert_eq!(query(Some(10), Some(3), Some(4)).offset(), 30);
        assert_eq!(query(Some(10), Some(3), None).offset(), 3);
        assert_eq!(query(Some(10), Some(3), Some(1)).offset(), 3);
        assert_eq!(query(None, Some(-9), None).offset(), 0);
        assert_eq!(query(Some(10), None, Some(-2)).offset(), 0);
    }
}
