// Copyright (c) EntreeFox Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::error;

use crate::store::SocialStore;

use super::metrics;

/// Recent activity aimed at a user, newest first
pub async fn get_notifications(
    State(store): State<Arc<SocialStore>>,
    Path(user_id): Path<i32>,
) -> impl IntoResponse {
    match store.get_notifications(user_id).await {
        Ok(Some(notifications)) => {
            metrics::NOTIFICATION_FEEDS.inc();
            let count = notifications.len();
            (
                StatusCode::OK,
                Json(json!({
                    "notifications": notifications,
                    "count": count
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
            error!("Failed to fetch notifications for user {}: {}", user_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Failed to fetch notifications: {}", e)
                })),
            )
        }
    }
}
