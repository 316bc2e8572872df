// Copyright (c) EntreeFox Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::store::SocialStore;

use super::metrics;

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub user_id: i32,
}

/// Flip the caller's like on a post
pub async fn toggle_like(
    State(store): State<Arc<SocialStore>>,
    Path(post_id): Path<i32>,
    Json(payload): Json<ToggleRequest>,
) -> impl IntoResponse {
    match store.toggle_like(payload.user_id, post_id).await {
        Ok(Some(toggle)) => {
            metrics::TOGGLES.with_label_values(&["like"]).inc();
            (
                StatusCode::OK,
                Json(json!({
                    "liked": toggle.liked
                })),
            )
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Post or user not found"
            })),
        ),
        Err(e) => {
            error!("Failed to toggle like on post {}: {}", post_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Failed to toggle like: {}", e)
                })),
            )
        }
    }
}

/// Flip the caller's repost on a post
pub async fn toggle_repost(
    State(store): State<Arc<SocialStore>>,
    Path(post_id): Path<i32>,
    Json(payload): Json<ToggleRequest>,
) -> impl IntoResponse {
    match store.toggle_repost(payload.user_id, post_id).await {
        Ok(Some(toggle)) => {
            metrics::TOGGLES.with_label_values(&["repost"]).inc();
            (
                StatusCode::OK,
                Json(json!({
                    "is_reposted": toggle.is_reposted,
                    "reposts_count": toggle.reposts_count
                })),
            )
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Post or user not found"
            })),
        ),
        Err(e) => {
            error!("Failed to toggle repost on post {}: {}", post_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Failed to toggle repost: {}", e)
                })),
            )
        }
    }
}

/// Flip the caller's save on a post
pub async fn toggle_save(
    State(store): State<Arc<SocialStore>>,
    Path(post_id): Path<i32>,
    Json(payload): Json<ToggleRequest>,
) -> impl IntoResponse {
    match store.toggle_save(payload.user_id, post_id).await {
        Ok(Some(toggle)) => {
            metrics::TOGGLES.with_label_values(&["save"]).inc();
            (
                StatusCode::OK,
                Json(json!({
                    "saved": toggle.saved
                })),
            )
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Post or user not found"
            })),
        ),
        Err(e) => {
            error!("Failed to toggle save on post {}: {}", post_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Failed to toggle save: {}", e)
                })),
            )
        }
    }
}
