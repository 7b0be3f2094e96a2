//! Application error type.
//!
//! Errors carry the process exit code alongside the message so `main` can stay
//! a one-liner. Exit codes:
//!
//! - `2` — usage / configuration problems
//! - `3` — no usable data for the requested query
//! - `4` — runtime failures (network, decode, terminal)

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// A failed network request (connection error or non-2xx status).
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(4, message)
    }

    /// A response that arrived but did not have the expected shape.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(4, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
