use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One conversation turn. Fields are private so a turn cannot change after it
/// is appended to a history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

impl LifecycleState {
    pub fn is_pending(self) -> bool {
        self == Self::Pending
    }
}

/// Label returned by the classifier. Multi-label predictions arrive as a
/// single comma separated string ("Action, Thriller").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    predicted_label: String,
}

impl Prediction {
    pub fn new(predicted_label: impl Into<String>) -> Self {
        Self {
            predicted_label: predicted_label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.predicted_label
    }

    pub fn genres(&self) -> Vec<&str> {
        self.predicted_label
            .split(',')
            .map(str::trim)
            .filter(|genre| !genre.is_empty())
            .collect()
    }
}
