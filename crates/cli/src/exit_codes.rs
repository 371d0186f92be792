//! CLI Exit Code Registry
//!
//! Single source of truth for all CLI exit codes. Exit codes are part of
//! the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, bad config)   |
//! | 3-9     | ingest           | Manifest build codes                     |
//! | 50-59   | fetch            | External data source connectors          |

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, unreadable or invalid config.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Ingest (3-9)
// =============================================================================

/// No dated input file found for the configured pattern.
pub const EXIT_INGEST_NO_INPUT: u8 = 3;

/// Input file could not be parsed into rows/records.
pub const EXIT_INGEST_PARSE: u8 = 4;

/// Identity schema missing or invalid (individual record rejections are
/// reported, not fatal).
pub const EXIT_INGEST_SCHEMA: u8 = 5;

/// Engine invariant violation (empty group, empty alias set) signalling
/// upstream data corruption.
pub const EXIT_INGEST_INVARIANT: u8 = 6;

/// File read/write failure during ingest.
pub const EXIT_INGEST_IO: u8 = 7;

// =============================================================================
// Fetch (50-59)
// =============================================================================

/// Missing credentials (no --api-token flag, no env var).
pub const EXIT_FETCH_NOT_AUTH: u8 = 50;

/// Upstream rejected our credentials (401/403).
pub const EXIT_FETCH_AUTH: u8 = 51;

/// Upstream rejected the request as invalid (400).
pub const EXIT_FETCH_VALIDATION: u8 = 52;

/// Rate limited after retries (429).
pub const EXIT_FETCH_RATE_LIMIT: u8 = 53;

/// Upstream failure after retries (5xx, network, malformed response).
pub const EXIT_FETCH_UPSTREAM: u8 = 54;
