//! Configuration constants for the importer
//!
//! This module centralizes the tunable parameters used throughout the
//! application.

use std::time::Duration;

// ============================================================================
// Connection Pool Configuration
// ============================================================================

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// How long SQLite waits on a locked database before failing a statement
///
/// Imports hold a write transaction for the whole file, so a second writer
/// against the same database file waits here instead of failing immediately.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// Reader Configuration
// ============================================================================

/// Number of rows decoded per Arrow record batch
///
/// The cursor converts one batch at a time into rows, so this bounds the
/// number of decoded rows held in memory while an import is running.
pub const DEFAULT_BATCH_SIZE: usize = 1024;

// ============================================================================
// Progress Reporting
// ============================================================================

pub const PROGRESS_TEMPLATE: &str =
    "[{elapsed_precise}] {msg} [{bar:30.green/blue}] {human_pos}/{human_len} ({percent}%) | {per_sec}";
