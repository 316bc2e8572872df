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

use crate::models::post::validate_comment_input;
use crate::store::SocialStore;

use super::posts::AuthorRequest;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub author_id: i32,
    pub content: String,
    pub parent_id: Option<i32>,
}

/// Comment on a post, or reply to a comment on it
pub async fn create_comment(
    State(store): State<Arc<SocialStore>>,
    Path(post_id): Path<i32>,
    Json(payload): Json<CreateCommentRequest>,
) -> impl IntoResponse {
    if let Err(e) = validate_comment_input(&payload.content) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": e.to_string()
            })),
        );
    }

    match store
        .create_comment(
            post_id,
            payload.author_id,
            payload.parent_id,
            payload.content,
        )
        .await
    {
        Ok(Some(comment)) => (
            StatusCode::CREATED,
            Json(json!({
                "comment": comment
            })),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Post, parent comment or author not found"
            })),
        ),
        Err(e) => {
            error!("Failed to create comment on post {}: {}", post_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Failed to create comment: {}", e)
                })),
            )
        }
    }
}

/// The post's comment thread: top-level newest first, replies oldest first
pub async fn get_thread(
    State(store): State<Arc<SocialStore>>,
    Path(post_id): Path<i32>,
) -> impl IntoResponse {
    match store.get_thread(post_id).await {
        Ok(Some(comments)) => {
            let count = comments.len();
            (
                StatusCode::OK,
                Json(json!({
                    "comments": comments,
                    "count": count
                })),
            )
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Post not found"
            })),
        ),
        Err(e) => {
            error!("Failed to fetch thread for post {}: {}", post_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Failed to fetch comments: {}", e)
                })),
            )
        }
    }
}

/// Delete a comment and its replies (author only)
pub async fn delete_comment(
    State(store): State<Arc<SocialStore>>,
    Path(comment_id): Path<i32>,
    Json(payload): Json<AuthorRequest>,
) -> impl IntoResponse {
    match store.delete_comment(comment_id, payload.author_id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({
                "deleted": true
            })),
        ),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Comment not found"
            })),
        ),
        Err(e) => {
            error!("Failed to delete comment {}: {}", comment_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Failed to delete comment: {}", e)
                })),
            )
        }
    }
}
