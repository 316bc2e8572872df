// Copyright (c) EntreeFox Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::user::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Comment,
    Like,
    Follow,
}

impl NotificationKind {
    /// Fixed display message per notification type.
    pub fn message(&self) -> &'static str {
        match self {
            NotificationKind::Comment => "commented on your post",
            NotificationKind::Like => "liked your post",
            NotificationKind::Follow => "started following you",
        }
    }
}

/// One entry of a user's notification feed. There is no read-state ledger;
/// every served event reports `is_read: false`.
#[derive(Debug, Serialize)]
pub struct NotificationEvent {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: &'static str,
    pub actor: UserSummary,
    pub post_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

impl NotificationEvent {
    pub fn new(
        kind: NotificationKind,
        actor: UserSummary,
        post_id: Option<i32>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            message: kind.message(),
            actor,
            post_id,
            created_at,
            is_read: false,
        }
    }
}
