//! Traits describing the host document and the contact backend, plus their error types.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::contact::{ContactReceipt, ContactRequest, FormField};
use crate::model::{Bounds, ElementId, Style};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to the contact backend.
pub enum PortError {
    /// Network layer failed or the response body could not be decoded.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Backend answered with a non-success status.
    #[error("Backend rejected request with status {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message supplied by the backend, if any.
        message: Option<String>,
    },
    /// Backend answered 2xx but did not confirm the submission.
    #[error("Submission was not accepted")]
    NotAccepted {
        /// Message supplied by the backend, if any.
        message: Option<String>,
    },
}

impl PortError {
    /// Message supplied by the backend, if the failure carried one.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            PortError::Rejected { message, .. } | PortError::NotAccepted { message } => {
                message.as_deref()
            }
            PortError::Network(_) => None,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
/// Errors raised by client-side form checks.
pub enum FormError {
    /// A required field is blank.
    #[error("{} is required", .0.label())]
    MissingField(FormField),
}

/// Host document holding the elements that timelines animate.
///
/// Elements may disappear at any time; every method treats a detached element as absent.
pub trait Document {
    /// Current bounds of an attached element.
    fn bounds(&self, element: ElementId) -> Option<Bounds>;

    /// Current style of an attached element.
    fn style(&self, element: ElementId) -> Option<Style>;

    /// Write a style. Detached elements are ignored.
    fn apply(&mut self, element: ElementId, style: &Style);
}

#[async_trait]
/// Trait for backends accepting contact requests.
pub trait ContactPort: Send + Sync {
    /// Submit a validated contact request.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails, the backend rejects it,
    /// or the backend does not confirm it.
    async fn submit(&self, request: &ContactRequest) -> Result<ContactReceipt, PortError>;
}
