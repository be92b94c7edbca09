// Single source of truth for all default values.

// --- Retrieval ---
pub const DEFAULT_SEMANTIC_WEIGHT: f64 = 0.9;
pub const DEFAULT_LEXICAL_WEIGHT: f64 = 0.1;
pub const DEFAULT_CANDIDATE_POOL: usize = 20;
pub const DEFAULT_RETRIEVAL_TOP_N: usize = 20;

// --- Rerank ---
pub const DEFAULT_RERANK_TOP_K: usize = 4;

// --- Cache ---
pub const DEFAULT_CACHE_CAPACITY: usize = 5_000;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 86_400; // 24 hours
pub const DEFAULT_SINGLE_FLIGHT: bool = true;

// --- Circuit breaker ---
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;
pub const DEFAULT_SUCCESS_THRESHOLD: u32 = 2;
pub const DEFAULT_RESET_TIMEOUT_SECS: f64 = 60.0;

// --- Retry ---
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_BACKOFF_SECS: f64 = 1.0;
pub const DEFAULT_MAX_BACKOFF_SECS: f64 = 16.0;
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

// --- Pipeline ---
pub const DEFAULT_DEADLINE_SECS: Option<f64> = None;
pub const DEFAULT_RETURN_SOURCES: bool = true;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
