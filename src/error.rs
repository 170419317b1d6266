use thiserror::Error;

/// Errors raised by the decoder and the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsightError {
    /// The type tag is not in the supported-model registry.
    #[error("`{0}` is not a supported statistical model")]
    NotAModel(String),

    /// No naming scheme is registered for this back-end.
    #[error("no naming scheme registered for back-end `{0}`")]
    UnsupportedBackend(String),

    /// A rule claimed a parameter but produced an unusable record.
    #[error("rule `{rule}` matched `{parameter}` but produced no {what}")]
    MalformedName {
        rule: &'static str,
        parameter: String,
        what: &'static str,
    },

    /// Bad caller input (unreadable parameter list, descriptor, ...).
    #[error("{0}")]
    Input(String),
}

impl InsightError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }
}

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

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<InsightError> for AppError {
    fn from(err: InsightError) -> Self {
        let exit_code = match err {
            InsightError::MalformedName { .. } => 4,
            InsightError::NotAModel(_) | InsightError::UnsupportedBackend(_) | InsightError::Input(_) => 2,
        };
        AppError::new(exit_code, err.to_string())
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
