use engine::EngineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Engine(#[from] EngineError),
    #[error("expense \"{title}\": {source}")]
    Expense { title: String, source: EngineError },
    #[error("unknown participant \"{0}\"")]
    UnknownParticipant(String),
    /// Stands in for a fault whose details went to the log only.
    #[error("internal error, see the log for details")]
    Internal,
}

impl AppError {
    /// Whether the message is safe to show as is. Engine faults are not.
    pub fn is_user_facing(&self) -> bool {
        match self {
            AppError::Engine(source) | AppError::Expense { source, .. } => {
                source.is_user_facing()
            }
            _ => true,
        }
    }

    /// Logs an internal fault in full and replaces it with [`AppError::Internal`].
    pub fn for_user(self) -> AppError {
        if self.is_user_facing() {
            return self;
        }
        tracing::error!(error = %self, "internal fault");
        AppError::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faults_are_hidden_from_users() {
        let fault = AppError::Expense {
            title: "Dinner".to_string(),
            source: EngineError::ArithmeticOverflow("add(1, 2) is out of range".to_string()),
        };
        assert!(!fault.is_user_facing());
        let shown = fault.for_user();
        assert!(matches!(shown, AppError::Internal));
        assert!(!shown.to_string().contains("out of range"));

        let input = AppError::Engine(EngineError::InvalidSplit("percentages sum to 90".to_string()));
        assert!(input.is_user_facing());
        assert_eq!(input.for_user().to_string(), "Invalid split: percentages sum to 90");

        assert!(AppError::UnknownParticipant("Zed".to_string()).is_user_facing());
    }
}
