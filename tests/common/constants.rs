//! Shared constants for end-to-end tests

// ============================================================================
// Timing
// ============================================================================

/// Timeout for requests issued by the test client, in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 5;

/// How long to wait for a spawned server to accept requests
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Poll interval while waiting for server readiness
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

// ============================================================================
// Canonical payload fields
// ============================================================================

pub const TEST_LYRICS: &str = "saawan ki raaton mein";
pub const TEST_EMOTION: &str = "Love";
pub const TEST_GENRE: &str = "Bollywood Fusion";
pub const TEST_TEMPO: u32 = 110;
