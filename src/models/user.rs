// Copyright (c) EntreeFox Team
// SPDX-License-Identifier: Apache-2.0

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// The public identity fields attached to feed posts, thread comments,
/// follow listings and notifications. User rows are owned by the auth
/// service; this crate only ever reads this projection of them.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserSummary {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub profile_image_url: Option<String>,
    pub is_verified: bool,
}
