// Copyright (c) EntreeFox Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use crate::feed::FeedMode;
use crate::store::SocialStore;

use super::metrics;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub viewer_id: Option<i32>,
    #[serde(default)]
    pub mode: FeedMode,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Serve one page of the ranked feed.
pub async fn get_feed(
    State(store): State<Arc<SocialStore>>,
    Query(query): Query<FeedQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = query.offset.unwrap_or(0);

    debug!(
        "Feed request: mode {}, viewer {:?}, limit {}, offset {}",
        query.mode.as_str(),
        query.viewer_id,
        limit,
        offset
    );
    metrics::FEED_REQUESTS
        .with_label_values(&[query.mode.as_str()])
        .inc();

    match store.get_feed(query.mode, query.viewer_id, offset, limit).await {
        Ok(posts) => {
            let count = posts.len();
            (
                StatusCode::OK,
                Json(json!({
                    "posts": posts,
                    "pagination": {
                        "limit": limit,
                        "offset": offset,
                        "count": count
                    }
                })),
            )
        }
        Err(e) => {
            error!("Failed to build feed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Failed to build feed: {}", e)
                })),
            )
        }
    }
}
