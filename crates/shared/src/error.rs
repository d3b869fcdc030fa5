use serde::{Deserialize, Serialize};

/// Failure taxonomy shared by both request surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Server unreachable, timed out, or answered with a non-success status.
    Transport,
    /// Response arrived but lacked the expected field.
    Protocol,
    /// Server reported a handled failure through an `error` field.
    Application,
    /// Local pre-flight check; never reaches the network.
    Validation,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Protocol => "protocol",
            Self::Application => "application",
            Self::Validation => "validation",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
