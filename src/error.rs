//! Application error type carrying a process exit code.
//!
//! Exit codes:
//! - `2`: usage / configuration (bad flag, bad control value)
//! - `3`: data (missing columns, no usable rows)
//! - `4`: runtime (network, IO, terminal, server)

pub const EXIT_USAGE: u8 = 2;
pub const EXIT_DATA: u8 = 3;
pub const EXIT_RUNTIME: u8 = 4;

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

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, message)
    }

    pub fn data(message: impl Into<String>) -> Self {
        Self::new(EXIT_DATA, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(EXIT_RUNTIME, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    /// True for errors caused by caller input rather than the environment.
    pub fn is_usage(&self) -> bool {
        self.exit_code == EXIT_USAGE
    }

    pub fn message(&self) -> &str {
        &self.message
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
