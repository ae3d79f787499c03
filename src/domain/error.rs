//! Domain error types.

pub type Result<T> = std::result::Result<T, BreadfreeError>;

/// Top-level error type for breadfree.
#[derive(Debug, thiserror::Error)]
pub enum BreadfreeError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol} between {start} and {end}")]
    NoData {
        symbol: String,
        start: String,
        end: String,
    },

    #[error("insufficient funds for {symbol}: need {required:.2}, have {available:.2}")]
    InsufficientFunds {
        symbol: String,
        required: f64,
        available: f64,
    },

    #[error("no open position in {symbol}")]
    NoPosition { symbol: String },

    #[error("invalid order for {symbol}: {reason}")]
    InvalidOrder { symbol: String, reason: String },

    #[error("strategy has no symbol assigned")]
    SymbolNotSet,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BreadfreeError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        BreadfreeError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Process exit status for this error class.
    pub fn exit_code(&self) -> u8 {
        match self {
            BreadfreeError::Io(_) => 1,
            BreadfreeError::ConfigParse { .. }
            | BreadfreeError::ConfigMissing { .. }
            | BreadfreeError::ConfigInvalid { .. } => 2,
            BreadfreeError::Data { .. } | BreadfreeError::NoData { .. } => 3,
            BreadfreeError::InsufficientFunds { .. }
            | BreadfreeError::NoPosition { .. }
            | BreadfreeError::InvalidOrder { .. }
            | BreadfreeError::SymbolNotSet => 4,
        }
    }
}

impl From<&BreadfreeError> for std::process::ExitCode {
    fn from(err: &BreadfreeError) -> Self {
        std::process::ExitCode::from(err.exit_code())
    }
}
