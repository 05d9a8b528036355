//! High-level contact service used by front ends.

use std::sync::Arc;

use tracing::{info, warn};

use crate::contact::{ContactForm, Notification};
use crate::ports::{ContactPort, PortError};

/// Title of the confirmation notification.
pub const SUCCESS_TITLE: &str = "Request Submitted Successfully!";
/// Body of the confirmation notification.
pub const SUCCESS_DESCRIPTION: &str = "Our team will contact you within 24 hours.";
/// Title of the failure notification.
pub const FAILURE_TITLE: &str = "Submission Failed";
/// Body of the failure notification when the backend gave no message.
pub const FAILURE_FALLBACK: &str = "Please try again later.";

/// Public entry point for submitting the contact form.
pub struct ContactService {
    port: Arc<dyn ContactPort>,
}

impl ContactService {
    /// Create a new service bound to the provided backend.
    #[must_use]
    pub fn new(port: Arc<dyn ContactPort>) -> Self {
        Self { port }
    }

    /// Validate and submit the form, returning the notification to show.
    ///
    /// The form is cleared only when the backend confirms the request; on any
    /// failure it is left untouched so the visitor can resubmit.
    pub async fn submit(&self, form: &mut ContactForm) -> Notification {
        let request = match form.validate() {
            Ok(request) => request,
            Err(err) => return Notification::error(FAILURE_TITLE, err.to_string()),
        };

        let outcome = match self.port.submit(&request).await {
            Ok(receipt) if receipt.success => Ok(receipt),
            Ok(receipt) => Err(PortError::NotAccepted {
                message: receipt.message,
            }),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(receipt) => {
                info!(id = ?receipt.id, "contact request submitted");
                form.clear();
                Notification::success(SUCCESS_TITLE, SUCCESS_DESCRIPTION)
            }
            Err(err) => {
                warn!(error = %err, "contact request failed");
                let description = err.backend_message().unwrap_or(FAILURE_FALLBACK);
                Notification::error(FAILURE_TITLE, description)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::contact::{ContactReceipt, ContactRequest, NotificationKind};

    struct ScriptedPort {
        reply: Mutex<Option<Result<ContactReceipt, PortError>>>,
        seen: Mutex<Vec<ContactRequest>>,
    }

    impl ScriptedPort {
        fn replying(reply: Result<ContactReceipt, PortError>) -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(Some(reply)),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ContactPort for ScriptedPort {
        async fn submit(&self, request: &ContactRequest) -> Result<ContactReceipt, PortError> {
            self.seen.lock().expect("lock").push(request.clone());
            self.reply
                .lock()
                .expect("lock")
                .take()
                .unwrap_or(Err(PortError::NotAccepted { message: None }))
        }
    }

    fn jane() -> ContactForm {
        ContactForm {
            name: "Jane Doe".into(),
            email: "jane@co.com".into(),
            company: "Acme".into(),
            ..ContactForm::default()
        }
    }

    fn receipt(success: bool, message: Option<&str>) -> ContactReceipt {
        ContactReceipt {
            success,
            message: message.map(str::to_owned),
            id: None,
        }
    }

    #[tokio::test]
    async fn success_clears_form() {
        let port = ScriptedPort::replying(Ok(receipt(true, None)));
        let service = ContactService::new(port.clone());
        let mut form = jane();

        let notification = service.submit(&mut form).await;
        assert_eq!(notification.kind, NotificationKind::Success);
        assert_eq!(notification.title, SUCCESS_TITLE);
        assert!(form.is_empty());
        assert_eq!(port.seen.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn rejection_keeps_form_and_shows_backend_message() {
        let port = ScriptedPort::replying(Err(PortError::Rejected {
            status: 500,
            message: Some("Server error".into()),
        }));
        let service = ContactService::new(port);
        let mut form = jane();

        let notification = service.submit(&mut form).await;
        assert_eq!(notification.kind, NotificationKind::Error);
        assert!(notification.description.contains("Server error"));
        assert_eq!(form, jane());
    }

    #[tokio::test]
    async fn unconfirmed_submission_is_a_failure() {
        let port = ScriptedPort::replying(Ok(receipt(false, None)));
        let service = ContactService::new(port);
        let mut form = jane();

        let notification = service.submit(&mut form).await;
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.description, FAILURE_FALLBACK);
        assert_eq!(form, jane());
    }

    #[tokio::test]
    async fn missing_field_never_reaches_backend() {
        let port = ScriptedPort::replying(Ok(receipt(true, None)));
        let service = ContactService::new(port.clone());
        let mut form = jane();
        form.company.clear();

        let notification = service.submit(&mut form).await;
        assert_eq!(notification.kind, NotificationKind::Error);
        assert!(notification.description.contains("Company Name"));
        assert!(port.seen.lock().expect("lock").is_empty());
        assert_eq!(form.name, "Jane Doe");
    }
}
