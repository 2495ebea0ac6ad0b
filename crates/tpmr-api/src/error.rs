use thiserror::Error;

/// Coarse failure classes that callers act on.
///
/// Every [`Error`] maps onto exactly one of these through [`Error::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network unreachable, timeout, unexpected reply shape, device-side
    /// error, or a session that expired again right after re-login.
    /// Safe to retry later, with back-off, except for
    /// [`Error::InvalidValue`] which fails the same way every time.
    ConnectionFailed,
    /// Credentials rejected, or a session-call attempted without `login`.
    /// Not retried automatically.
    LoginFailed,
}

/// Top-level error type for the `tpmr-api` crate.
///
/// Covers every failure mode of the router protocol: handshake, transport,
/// reply decoding, and device-reported errors. Variants stay fine-grained so
/// a stale session, a busy device, a timeout and a malformed reply remain
/// distinguishable; [`Error::kind`] folds them into the two-kind taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The device rejected the supplied credentials.
    #[error("Login rejected by device (code {code})")]
    InvalidCredentials { code: i64 },

    /// A session-call was attempted without an active session.
    #[error("Not logged in -- call login() first")]
    NotLoggedIn,

    /// The device reported that the session token is no longer valid.
    #[error("Session expired")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP client could not be constructed.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Device ──────────────────────────────────────────────────────
    /// The device answered 503 -- usually another session is mid-write.
    #[error("Device busy")]
    DeviceBusy,

    /// Non-success HTTP status outside the expiry/busy cases.
    #[error("Unexpected HTTP status {status}")]
    Http { status: u16 },

    /// Non-zero `[error]` code in a session-call reply or `$.ret` in a
    /// handshake reply.
    #[error("Device reported error code {code}")]
    Device { code: i64 },

    // ── Request ─────────────────────────────────────────────────────
    /// A value that cannot be encoded into a request body.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    // ── Data ────────────────────────────────────────────────────────
    /// The reply could not be parsed at all, with the raw body for debugging.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String, body: String },

    /// The key material fetched from the device was unusable.
    #[error("Invalid key material: {0}")]
    KeyMaterial(String),
}

impl Error {
    /// Classify this error into the caller-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCredentials { .. } | Self::NotLoggedIn => ErrorKind::LoginFailed,
            Self::SessionExpired
            | Self::Transport(_)
            | Self::Timeout { .. }
            | Self::InvalidUrl(_)
            | Self::Tls(_)
            | Self::DeviceBusy
            | Self::Http { .. }
            | Self::Device { .. }
            | Self::MalformedResponse { .. }
            | Self::KeyMaterial(_)
            | Self::InvalidValue { .. } => ErrorKind::ConnectionFailed,
        }
    }

    /// Returns `true` if this error should be reported as a credentials problem.
    pub fn is_login_failed(&self) -> bool {
        self.kind() == ErrorKind::LoginFailed
    }

    /// Returns `true` if this error should be reported as a connectivity problem.
    pub fn is_connection_failed(&self) -> bool {
        self.kind() == ErrorKind::ConnectionFailed
    }

    /// Returns `true` if this is a transient error worth retrying later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::DeviceBusy | Self::SessionExpired => true,
            _ => false,
        }
    }

    pub(crate) fn malformed(message: impl Into<String>, body: &str) -> Self {
        Self::MalformedResponse {
            message: message.into(),
            body: body.to_owned(),
        }
    }
}
