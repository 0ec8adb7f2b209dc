//! Canonical schema constants for structured logging and events
//!
//! Field keys are what log readers (the test capture layer, log tooling)
//! look up; the logging macros emit fields under these exact names.

// Operation boundaries
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Entity identifiers
pub const FIELD_LIBRARY: &str = "library";
pub const FIELD_LINE_ID: &str = "line_id";

// Collection sizes
pub const FIELD_LINE_COUNT: &str = "line_count";

// Error fields
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
