// Copyright (c) EntreeFox Team
// SPDX-License-Identifier: Apache-2.0

//! Persistence layer for the social tables.
//!
//! Every handler goes through [`SocialStore`]; nothing else touches the
//! pool. Methods that look up a row the caller named return
//! `Ok(None)` when that row is absent (or not owned by the caller), so
//! the API layer can answer 404 without inspecting errors.

mod comments;
mod follows;
mod interactions;
mod notifications;
mod posts;
mod reconcile;

use std::sync::Arc;

use anyhow::Result;
use diesel_async::RunQueryDsl;

use crate::db::{Database, DbConnection};
use crate::feed::RankingConfig;

/// Shared access point for all reads and writes.
pub struct SocialStore {
    /// Database connection
    db: Arc<Database>,
    /// Weights used by the algorithmic feed
    ranking: RankingConfig,
}

impl SocialStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            ranking: RankingConfig::default(),
        }
    }

    /// Get a database connection from the pool
    async fn get_connection(&self) -> Result<DbConnection> {
        self.db.get_connection().await
    }

    /// Cheap liveness probe for the health endpoint.
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.get_connection().await?;
        diesel::sql_query("SELECT 1").execute(&mut conn).await?;
        Ok(())
    }
}
