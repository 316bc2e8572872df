// Copyright (c) EntreeFox Team
// SPDX-License-Identifier: Apache-2.0

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec, TextEncoder,
};
use tracing::error;

/// Feed pages served, labelled by ranking mode.
pub static FEED_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "entreefox_feed_requests_total",
        "Feed pages served, by ranking mode",
        &["mode"]
    )
    .expect("register feed request counter")
});

/// Successful interaction toggles, labelled by kind.
pub static TOGGLES: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "entreefox_toggles_total",
        "Successful interaction toggles, by kind",
        &["kind"]
    )
    .expect("register toggle counter")
});

/// Notification feeds served.
pub static NOTIFICATION_FEEDS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "entreefox_notification_feeds_total",
        "Notification feeds served"
    )
    .expect("register notification counter")
});

/// Prometheus metrics endpoint
pub async fn get_metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    match encoder.encode_to_string(&prometheus::gather()) {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, String::new())
        }
    }
}
