//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! Durations here are defaults; most can be overridden through the
//! environment (see [`crate::config`]).

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 5000;

/// Default HTTP server startup timeout (how long to wait for server to be ready)
pub const DEFAULT_SERVER_STARTUP_TIMEOUT_SECS: u64 = 10;

/// Default HTTP server readiness poll interval
pub const DEFAULT_SERVER_POLL_INTERVAL_MS: u64 = 50;

/// Shortest self-scheduled requeue. A healthy certificate with zero slack
/// yields a zero-day delay; this keeps it from spinning.
pub const DEFAULT_MIN_REQUEUE_SECS: u64 = 60;

/// Longest self-scheduled requeue (30 days). The runtime's delay queue
/// cannot hold arbitrarily distant deadlines.
pub const DEFAULT_MAX_REQUEUE_SECS: u64 = 30 * 24 * 60 * 60;

/// Requeue used when a CertCheck has TLS targets but none of them is healthy
/// (10 hours, the classic controller re-sync period)
pub const DEFAULT_RESYNC_INTERVAL_SECS: u64 = 10 * 60 * 60;

/// Fibonacci error backoff lower bound (minutes)
pub const DEFAULT_BACKOFF_MIN_MINUTES: u64 = 1;

/// Fibonacci error backoff upper bound (minutes)
pub const DEFAULT_BACKOFF_MAX_MINUTES: u64 = 10;

/// Default delay before restarting the watch stream after it ends (seconds)
pub const DEFAULT_WATCH_RESTART_DELAY_SECS: u64 = 5;

/// Default number of CertChecks reconciled in parallel
pub const DEFAULT_MAX_CONCURRENT_RECONCILIATIONS: u16 = 10;

/// Seconds in one classification day
pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Secret type carrying a TLS key pair
pub const TLS_SECRET_TYPE: &str = "kubernetes.io/tls";

/// Data key holding the PEM certificate in a TLS secret
pub const TLS_CERT_KEY: &str = "tls.crt";

/// Annotation recording whether the certificate was still valid when last evaluated
pub const ANNOTATION_ACTIVE: &str = "certcheck.amsy.dev/active";

/// Annotation recording the certificate's notBefore
pub const ANNOTATION_NOT_BEFORE: &str = "certcheck.amsy.dev/notBefore";

/// Annotation recording the certificate's notAfter
pub const ANNOTATION_NOT_AFTER: &str = "certcheck.amsy.dev/notAfter";

/// Annotation set by `certctl reconcile` to force a pass
pub const ANNOTATION_RECONCILE: &str = "certcheck.amsy.dev/reconcile";

/// Controller name reported on published events
pub const EVENT_REPORTER: &str = "cert-check-controller";

/// Name of the certificate state gauge
pub const CERTIFICATE_GAUGE_NAME: &str = "is_expired_certificate";
