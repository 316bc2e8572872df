// Copyright (c) EntreeFox Team
// SPDX-License-Identifier: Apache-2.0

pub mod comments;
pub mod feed;
pub mod follows;
pub mod health;
pub mod interactions;
pub mod metrics;
pub mod notifications;
pub mod posts;
pub mod reconcile;

use serde::Deserialize;

/// Query parameters shared by the timeline-style listings.
#[derive(Debug, Deserialize)]
pub struct TimelineQuery {
    pub viewer_id: Option<i32>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl TimelineQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}
