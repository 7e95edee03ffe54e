//! Core use-case services.
//!
//! # Responsibility
//! - Validate caller input and orchestrate repository calls.
//! - Compose calendar, grid and aggregation reads into display models.
//! - Emit metadata-only log events for bulk mutations.

pub mod calendar_service;
pub mod fiscal_service;
pub mod plan_service;
pub mod pop_filter;
pub mod table_service;

use crate::repo::RepoResult;
use log::{info, warn};
use std::time::Instant;

/// Logs the outcome of a mutation with its affected-row count.
fn log_mutation(event: &str, module: &str, started_at: Instant, outcome: &RepoResult<usize>) {
    match outcome {
        Ok(count) => info!(
            "event={event} module={module} status=ok count={count} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => warn!(
            "event={event} module={module} status=error duration_ms={} error_kind={} error={err}",
            started_at.elapsed().as_millis(),
            err.kind().as_str()
        ),
    }
}
