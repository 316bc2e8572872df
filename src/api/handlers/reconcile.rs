// Copyright (c) EntreeFox Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection, extract::State, http::StatusCode, response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::store::SocialStore;

#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    pub post_id: Option<i32>,
}

/// Recompute denormalized counters from the interaction tables. Scoped to
/// one post when the body names one, otherwise the whole corpus. A body
/// that fails to parse is rejected rather than treated as whole-corpus:
/// reconciliation is too heavy to run off a typo.
pub async fn reconcile_counters(
    State(store): State<Arc<SocialStore>>,
    payload: Result<Json<ReconcileRequest>, JsonRejection>,
) -> impl IntoResponse {
    let post_id = match payload {
        Ok(Json(request)) => request.post_id,
        // No body at all is the documented whole-corpus form.
        Err(JsonRejection::MissingJsonContentType(_)) => None,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": rejection.to_string()
                })),
            );
        }
    };

    match store.reconcile_counters(post_id).await {
        Ok(updated) => (
            StatusCode::OK,
            Json(json!({
                "updated_rows": updated
            })),
        ),
        Err(e) => {
            error!("Counter reconciliation failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Reconciliation failed: {}", e)
                })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;

    async fn extract(request: Request<Body>) -> Result<Json<ReconcileRequest>, JsonRejection> {
        Json::from_request(request, &()).await
    }

    fn json_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/reconcile")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    // A bare POST carries no JSON content type. That is the one rejection
    // the handler maps to the whole-corpus sweep.
    #[test]
    fn bodyless_request_is_the_whole_corpus_form() {
        let request = Request::builder()
            .method("POST")
            .uri("/reconcile")
            .body(Body::empty())
            .unwrap();
        let rejection = tokio_test::block_on(extract(request)).unwrap_err();
        assert!(matches!(rejection, JsonRejection::MissingJsonContentType(_)));
    }

    // A body that fails to parse must surface as an error, never fall
    // through to reconciling every post.
    #[test]
    fn malformed_body_is_rejected() {
        let rejection = tokio_test::block_on(extract(json_request(r#"{"post_id": "#)))
            .unwrap_err();
        assert!(!matches!(rejection, JsonRejection::MissingJsonContentType(_)));
    }

    #[test]
    fn scoped_body_names_one_post() {
        let Json(parsed) =
            tokio_test::block_on(extract(json_request(r#"{"post_id": 7}"#))).unwrap();
        assert_eq!(parsed.post_id, Some(7));
    }

    #[test]
    fn explicit_empty_object_is_also_whole_corpus() {
        let Json(parsed) = tokio_test::block_on(extract(json_request("{}"))).unwrap();
        assert_eq!(parsed.post_id, None);
    }
}
