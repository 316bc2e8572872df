// Copyright (c) EntreeFox Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use crate::models::follow::FollowsQuery;
use crate::store::SocialStore;

use super::metrics;

#[derive(Debug, Deserialize)]
pub struct FollowRequest {
    pub follower_id: i32,
}

/// Flip the follower -> followee edge
pub async fn toggle_follow(
    State(store): State<Arc<SocialStore>>,
    Path(user_id): Path<i32>,
    Json(payload): Json<FollowRequest>,
) -> impl IntoResponse {
    if payload.follower_id == user_id {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Users cannot follow themselves"
            })),
        );
    }

    match store.toggle_follow(payload.follower_id, user_id).await {
        Ok(Some(toggle)) => {
            metrics::TOGGLES.with_label_values(&["follow"]).inc();
            (
                StatusCode::OK,
                Json(json!({
                    "following": toggle.following
                })),
            )
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "User not found"
            })),
        ),
        Err(e) => {
            error!(
                "Failed to toggle follow {} -> {}: {}",
                payload.follower_id, user_id, e
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Failed to toggle follow: {}", e)
                })),
            )
        }
    }
}

/// Get a list of users that follow a user
pub async fn get_followers(
    State(store): State<Arc<SocialStore>>,
    Path(user_id): Path<i32>,
    Query(query): Query<FollowsQuery>,
) -> impl IntoResponse {
    let limit = query.limit();
    let offset = query.offset();
    let page = query.page();

    debug!(
        "Getting followers for user {}, limit: {}, offset: {}",
        user_id, limit, offset
    );

    match store.followers(user_id, limit, offset).await {
        Ok(Some((users, total))) => {
            let total_pages = (total as f64 / limit as f64).ceil() as i64;
            (
                StatusCode::OK,
                Json(json!({
                    "users": users,
                    "pagination": {
                        "total": total,
                        "limit": limit,
                        "offset": offset,
                        "page": page,
                        "total_pages": total_pages
                    }
                })),
            )
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "User not found"
            })),
        ),
        Err(e) => {
            error!("Failed to fetch followers for user {}: {}", user_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Failed to fetch followers: {}", e)
                })),
            )
        }
    }
}

/// Get a list of users that a user is following
pub async fn get_following(
    State(store): State<Arc<SocialStore>>,
    Path(user_id): Path<i32>,
    Query(query): Query<FollowsQuery>,
) -> impl IntoResponse {
    let limit = query.limit();
    let offset = query.offset();
    let page = query.page();

    debug!(
        "Getting following for user {}, limit: {}, offset: {}",
        user_id, limit, offset
    );

    match store.following(user_id, limit, offset).await {
        Ok(Some((users, total))) => {
            let total_pages = (total as f64 / limit as f64).ceil() as i64;
            (
                StatusCode::OK,
                Json(json!({
                    "users": users,
                    "pagination": {
                        "total": total,
                        "limit": limit,
                        "offset": offset,
                        "page": page,
                        "total_pages": total_pages
                    }
                })),
            )
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "User not found"
            })),
        ),
        Err(e) => {
            error!("Failed to fetch following for user {}: {}", user_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Failed to fetch following: {}", e)
                })),
            )
        }
    }
}

/// Follower and following counts for a user
pub async fn get_follow_stats(
    State(store): State<Arc<SocialStore>>,
    Path(user_id): Path<i32>,
) -> impl IntoResponse {
    match store.follow_stats(user_id).await {
        Ok(Some(stats)) => (
            StatusCode::OK,
            Json(json!({
                "user": stats.user,
                "followers_count": stats.followers_count,
                "following_count": stats.following_count
            })),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "User not found"
            })),
        ),
        Err(e) => {
            error!("Failed to fetch follow stats for user {}: {}", user_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Failed to fetch follow stats: {}", e)
                })),
            )
        }
    }
}
