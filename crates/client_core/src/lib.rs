//! Request-lifecycle controllers for the Cinematch assistant and genre
//! classifier.
//!
//! Layers, leaves first: [`transport`] adapters perform the HTTP exchange,
//! [`lifecycle::Lifecycle`] enforces single-flight and staleness, and the
//! [`conversation`] / [`classification`] controllers own their stores and
//! publish view snapshots for a renderer.

use std::sync::Arc;

pub mod classification;
pub mod config;
pub mod conversation;
pub mod error;
pub mod lifecycle;
pub mod presets;
pub mod transport;

pub use classification::{ClassificationController, ClassificationView, Outcome};
pub use config::{load_settings, ClientSettings, EndpointProfile, SettingsError};
pub use conversation::{ConversationController, ConversationView};
pub use error::{ClientError, ErrorSurface};
pub use lifecycle::Rejection;
pub use presets::{DraftStats, ExamplePlot, QuickQuestion};
pub use transport::{
    ClassificationTransport, ConversationTransport, HttpClassificationAdapter,
    HttpConversationAdapter,
};

/// How a completed request was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The result was written to the store.
    Applied,
    /// The owning controller was reset or dropped first; nothing was written.
    Stale,
}

/// Both controllers wired to HTTP adapters sharing one connection pool.
pub struct Controllers {
    pub conversation: ConversationController,
    pub classification: ClassificationController,
}

impl Controllers {
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, SettingsError> {
        let http = settings.http_client()?;
        tracing::info!(base_url = settings.base_url(), "configured cinematch endpoints");
        Ok(Self {
            conversation: ConversationController::new(Arc::new(HttpConversationAdapter::new(
                http.clone(),
                settings,
            ))),
            classification: ClassificationController::new(Arc::new(
                HttpClassificationAdapter::new(http, settings),
            )),
        })
    }
}
