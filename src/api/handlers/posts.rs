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
use tracing::error;

use crate::models::post::{validate_post_input, validate_post_update, MediaItem};
use crate::store::SocialStore;

use super::TimelineQuery;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub author_id: i32,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub media: Vec<MediaItem>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub author_id: i32,
    pub content: Option<String>,
    pub media: Option<Vec<MediaItem>>,
}

#[derive(Debug, Deserialize)]
pub struct AuthorRequest {
    pub author_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct ViewerQuery {
    pub viewer_id: Option<i32>,
}

/// Create a post
pub async fn create_post(
    State(store): State<Arc<SocialStore>>,
    Json(payload): Json<CreatePostRequest>,
) -> impl IntoResponse {
    if let Err(e) = validate_post_input(&payload.content, &payload.media) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": e.to_string()
            })),
        );
    }

    match store
        .create_post(payload.author_id, payload.content, payload.media)
        .await
    {
        Ok(Some(post)) => (
            StatusCode::CREATED,
            Json(json!({
                "post": post
            })),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Author not found"
            })),
        ),
        Err(e) => {
            error!("Failed to create post: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Failed to create post: {}", e)
                })),
            )
        }
    }
}

/// Get a single post with viewer annotations
pub async fn get_post(
    State(store): State<Arc<SocialStore>>,
    Path(post_id): Path<i32>,
    Query(query): Query<ViewerQuery>,
) -> impl IntoResponse {
    match store.get_post(post_id, query.viewer_id).await {
        Ok(Some(post)) => (
            StatusCode::OK,
            Json(json!({
                "post": post
            })),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Post not found"
            })),
        ),
        Err(e) => {
            error!("Failed to fetch post {}: {}", post_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Failed to fetch post: {}", e)
                })),
            )
        }
    }
}

/// Edit a post's content and/or media (author only)
pub async fn update_post(
    State(store): State<Arc<SocialStore>>,
    Path(post_id): Path<i32>,
    Json(payload): Json<UpdatePostRequest>,
) -> impl IntoResponse {
    if let Err(e) = validate_post_update(payload.content.as_deref(), payload.media.as_deref()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": e.to_string()
            })),
        );
    }

    match store
        .update_post(post_id, payload.author_id, payload.content, payload.media)
        .await
    {
        Ok(Some(post)) => (
            StatusCode::OK,
            Json(json!({
                "post": post
            })),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Post not found"
            })),
        ),
        Err(e) => {
            error!("Failed to update post {}: {}", post_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Failed to update post: {}", e)
                })),
            )
        }
    }
}

/// Delete a post and everything hanging off it (author only)
pub async fn delete_post(
    State(store): State<Arc<SocialStore>>,
    Path(post_id): Path<i32>,
    Json(payload): Json<AuthorRequest>,
) -> impl IntoResponse {
    match store.delete_post(post_id, payload.author_id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({
                "deleted": true
            })),
        ),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Post not found"
            })),
        ),
        Err(e) => {
            error!("Failed to delete post {}: {}", post_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Failed to delete post: {}", e)
                })),
            )
        }
    }
}

/// Posts authored by a user, newest first
pub async fn get_user_posts(
    State(store): State<Arc<SocialStore>>,
    Path(user_id): Path<i32>,
    Query(query): Query<TimelineQuery>,
) -> impl IntoResponse {
    let limit = query.limit();
    let offset = query.offset();

    match store
        .user_posts(user_id, query.viewer_id, limit, offset)
        .await
    {
        Ok(Some(posts)) => {
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
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "User not found"
            })),
        ),
        Err(e) => {
            error!("Failed to fetch posts for user {}: {}", user_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Failed to fetch posts: {}", e)
                })),
            )
        }
    }
}

/// Posts a user has reposted, most recent repost first
pub async fn get_user_reposts(
    State(store): State<Arc<SocialStore>>,
    Path(user_id): Path<i32>,
    Query(query): Query<TimelineQuery>,
) -> impl IntoResponse {
    let limit = query.limit();
    let offset = query.offset();

    match store
        .reposted_posts(user_id, query.viewer_id, limit, offset)
        .await
    {
        Ok(Some(posts)) => {
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
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "User not found"
            })),
        ),
        Err(e) => {
            error!("Failed to fetch reposts for user {}: {}", user_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Failed to fetch reposts: {}", e)
                })),
            )
        }
    }
}

/// Posts a user has saved, most recently saved first
pub async fn get_user_saved(
    State(store): State<Arc<SocialStore>>,
    Path(user_id): Path<i32>,
    Query(query): Query<TimelineQuery>,
) -> impl IntoResponse {
    let limit = query.limit();
    let offset = query.offset();

    match store
        .saved_posts(user_id, query.viewer_id, limit, offset)
        .await
    {
        Ok(Some(posts)) => {
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
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "User not found"
            })),
        ),
        Err(e) => {
            error!("Failed to fetch saved posts for user {}: {}", user_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Failed to fetch saved posts: {}", e)
                })),
            )
        }
    }
}
