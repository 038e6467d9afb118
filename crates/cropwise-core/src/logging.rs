//! Structured logging schema for cropwise.
//!
//! Identity fields (`subsystem`, `component`, `op`) are written inline in each
//! `#[instrument]` attribute. The constants below name outcome fields that a
//! span declares as `tracing::field::Empty` and fills in with
//! [`tracing::Span::record`] once the value is known, so every subsystem
//! records them under the same name.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), artifact loading |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-feature iteration, raw model output |

// ─── Prediction fields ─────────────────────────────────────────────────────

/// Width of the scaled feature vector fed to the yield model.
pub const FEATURE_COUNT: &str = "feature_count";

/// Classifier output label.
pub const LABEL: &str = "label";

/// Classifier confidence.
pub const CONFIDENCE: &str = "confidence";

/// Number of remedy entries produced.
pub const REMEDY_COUNT: &str = "remedy_count";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

// ─── External call fields ──────────────────────────────────────────────────

/// Attempt number for the external call (1-based).
pub const ATTEMPT: &str = "attempt";

/// Whether the external call finally succeeded.
pub const SUCCESS: &str = "success";
