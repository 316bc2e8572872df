// Copyright (c) EntreeFox Team
// SPDX-License-Identifier: Apache-2.0

//! Follow graph. Edge counts are derived by counting rows; user rows carry
//! no follower counters that could drift.

use anyhow::Result;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;
use tracing::{debug, info};

use crate::models::follow::{FollowDetail, FollowStats, FollowToggle, NewFollow};
use crate::models::user::UserSummary;
use crate::schema::{follows, users};

use super::SocialStore;

impl SocialStore {
    /// Flip the follower -> following edge. `Ok(None)` when either user
    /// does not exist. Self-follows are rejected before this is called.
    pub async fn toggle_follow(
        &self,
        follower_id: i32,
        following_id: i32,
    ) -> Result<Option<FollowToggle>> {
        debug!("Toggling follow: {} -> {}", follower_id, following_id);

        let mut conn = self.get_connection().await?;

        let follower_exists = users::table
            .filter(users::id.eq(follower_id))
            .count()
            .get_result::<i64>(&mut conn)
            .await?
            > 0;
        if !follower_exists {
            debug!("Follower not found: {}", follower_id);
            return Ok(None);
        }

        let following_exists = users::table
            .filter(users::id.eq(following_id))
            .count()
            .get_result::<i64>(&mut conn)
            .await?
            > 0;
        if !following_exists {
            debug!("Followee not found: {}", following_id);
            return Ok(None);
        }

        let removed = diesel::delete(
            follows::table
                .filter(follows::follower_id.eq(follower_id))
                .filter(follows::following_id.eq(following_id)),
        )
        .execute(&mut conn)
        .await?;

        if removed > 0 {
            info!("User {} unfollowed user {}", follower_id, following_id);
            return Ok(Some(FollowToggle { following: false }));
        }

        let new_follow = NewFollow {
            follower_id,
            following_id,
            created_at: Utc::now(),
        };
        let inserted = diesel::insert_into(follows::table)
            .values(&new_follow)
            .on_conflict((follows::follower_id, follows::following_id))
            .do_nothing()
            .execute(&mut conn)
            .await;

        match inserted {
            Ok(_) => {
                info!("User {} followed user {}", follower_id, following_id);
                Ok(Some(FollowToggle { following: true }))
            }
            Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Users following `user_id`, most recent edge first, with the total
    /// edge count for pagination. `Ok(None)` when the user is missing.
    pub async fn followers(
        &self,
        user_id: i32,
        limit: i64,
        offset: i64,
    ) -> Result<Option<(Vec<FollowDetail>, i64)>> {
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

        let rows = follows::table
            .filter(follows::following_id.eq(user_id))
            .inner_join(users::table.on(users::id.eq(follows::follower_id)))
            .order(follows::created_at.desc())
            .limit(limit)
            .offset(offset)
            .select((UserSummary::as_select(), follows::created_at))
            .load::<(UserSummary, DateTime<Utc>)>(&mut conn)
            .await?;

        let total = follows::table
            .filter(follows::following_id.eq(user_id))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        let details = rows
            .into_iter()
            .map(|(user, followed_at)| FollowDetail::new(user, followed_at))
            .collect();
        Ok(Some((details, total)))
    }

    /// Users that `user_id` follows, most recent edge first, with the
    /// total edge count. `Ok(None)` when the user is missing.
    pub async fn following(
        &self,
        user_id: i32,
        limit: i64,
        offset: i64,
    ) -> Result<Option<(Vec<FollowDetail>, i64)>> {
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

        let rows = follows::table
            .filter(follows::follower_id.eq(user_id))
            .inner_join(users::table.on(users::id.eq(follows::following_id)))
            .order(follows::created_at.desc())
            .limit(limit)
            .offset(offset)
            .select((UserSummary::as_select(), follows::created_at))
            .load::<(UserSummary, DateTime<Utc>)>(&mut conn)
            .await?;

        let total = follows::table
            .filter(follows::follower_id.eq(user_id))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        let details = rows
            .into_iter()
            .map(|(user, followed_at)| FollowDetail::new(user, followed_at))
            .collect();
        Ok(Some((details, total)))
    }

    /// Follower/following counts for a user.
    pub async fn follow_stats(&self, user_id: i32) -> Result<Option<FollowStats>> {
        let mut conn = self.get_connection().await?;

        let user = users::table
            .filter(users::id.eq(user_id))
            .select(UserSummary::as_select())
            .first::<UserSummary>(&mut conn)
            .await
            .optional()?;
        let user = match user {
            Some(user) => user,
            None => return Ok(None),
        };

        let followers_count = follows::table
            .filter(follows::following_id.eq(user_id))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;
        let following_count = follows::table
            .filter(follows::follower_id.eq(user_id))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        Ok(Some(FollowStats {
            user,
            followers_count,
            following_count,
        }))
    }
}
