//! Contact form state, wire types and user-facing notifications.

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::ports::FormError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Body of `POST /api/contact`.
pub struct ContactRequest {
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Company name.
    pub company: String,
    /// Phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Kind of waste the enquiry is about.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waste_type: Option<String>,
    /// Free-form message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
/// Backend answer to a contact submission.
pub struct ContactReceipt {
    /// Whether the backend accepted the request.
    pub success: bool,
    /// Optional human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// Optional identifier of the stored enquiry.
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Editable fields of the contact form, in display order.
pub enum FormField {
    /// Full name.
    Name,
    /// Email address.
    Email,
    /// Company name.
    Company,
    /// Phone number.
    Phone,
    /// Type of waste.
    WasteType,
    /// Message.
    Message,
}

impl FormField {
    /// All fields in display order.
    pub const ALL: [FormField; 6] = [
        FormField::Name,
        FormField::Email,
        FormField::Company,
        FormField::Phone,
        FormField::WasteType,
        FormField::Message,
    ];

    /// Label shown next to the input.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Full Name",
            FormField::Email => "Email Address",
            FormField::Company => "Company Name",
            FormField::Phone => "Phone Number",
            FormField::WasteType => "Type of Waste",
            FormField::Message => "Message",
        }
    }

    /// Placeholder shown while the input is empty.
    #[must_use]
    pub fn placeholder(self) -> &'static str {
        match self {
            FormField::Name => "John Doe",
            FormField::Email => "john@company.com",
            FormField::Company => "Your Company",
            FormField::Phone => "+91 98765 43210",
            FormField::WasteType => "Organic, Plastic, Mixed, etc.",
            FormField::Message => "Tell us about your waste management needs...",
        }
    }

    /// Whether the form refuses to submit while this field is blank.
    #[must_use]
    pub fn is_required(self) -> bool {
        matches!(self, FormField::Name | FormField::Email | FormField::Company)
    }

    /// Next field, wrapping around.
    #[must_use]
    pub fn next(self) -> FormField {
        let index = FormField::ALL
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0);
        FormField::ALL
            .get((index + 1) % FormField::ALL.len())
            .copied()
            .unwrap_or(FormField::Name)
    }

    /// Previous field, wrapping around.
    #[must_use]
    pub fn previous(self) -> FormField {
        let index = FormField::ALL
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0);
        FormField::ALL
            .get((index + FormField::ALL.len() - 1) % FormField::ALL.len())
            .copied()
            .unwrap_or(FormField::Name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Current contents of the contact form.
pub struct ContactForm {
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Company name.
    pub company: String,
    /// Phone number.
    pub phone: String,
    /// Type of waste.
    pub waste_type: String,
    /// Message.
    pub message: String,
}

impl ContactForm {
    /// Read a field.
    #[must_use]
    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Company => &self.company,
            FormField::Phone => &self.phone,
            FormField::WasteType => &self.waste_type,
            FormField::Message => &self.message,
        }
    }

    /// Edit a field.
    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
            FormField::Company => &mut self.company,
            FormField::Phone => &mut self.phone,
            FormField::WasteType => &mut self.waste_type,
            FormField::Message => &mut self.message,
        }
    }

    /// Check required fields and build the request body.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::MissingField`] for the first blank required field.
    pub fn validate(&self) -> Result<ContactRequest, FormError> {
        if let Some(missing) = FormField::ALL
            .into_iter()
            .find(|field| field.is_required() && self.field(*field).trim().is_empty())
        {
            return Err(FormError::MissingField(missing));
        }

        let optional = |value: &str| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        };
        Ok(ContactRequest {
            name: self.name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            company: self.company.trim().to_owned(),
            phone: optional(&self.phone),
            waste_type: optional(&self.waste_type),
            message: optional(&self.message),
        })
    }

    /// Reset every field.
    pub fn clear(&mut self) {
        *self = ContactForm::default();
    }

    /// Whether every field is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        FormField::ALL
            .into_iter()
            .all(|field| self.field(field).is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Tone of a notification.
pub enum NotificationKind {
    /// Something worked.
    Success,
    /// Something failed.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Transient message shown to the visitor.
pub struct Notification {
    /// Tone.
    pub kind: NotificationKind,
    /// Headline.
    pub title: String,
    /// Details.
    pub description: String,
    /// When it was raised.
    pub raised_at: DateTime<Local>,
}

impl Notification {
    /// Success notification raised now.
    #[must_use]
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, title, description)
    }

    /// Error notification raised now.
    #[must_use]
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, title, description)
    }

    fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            raised_at: Local::now(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}: {}", self.title, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ContactForm {
        ContactForm {
            name: "Jane Doe".into(),
            email: "jane@co.com".into(),
            company: "Acme".into(),
            ..ContactForm::default()
        }
    }

    #[test]
    fn validate_requires_name_email_company() {
        let mut form = filled();
        form.email = "   ".into();
        assert_eq!(
            form.validate(),
            Err(FormError::MissingField(FormField::Email))
        );
        assert_eq!(
            ContactForm::default().validate(),
            Err(FormError::MissingField(FormField::Name))
        );
    }

    #[test]
    fn optional_fields_are_omitted_when_blank() {
        let request = filled().validate().expect("required fields present");
        let json = serde_json::to_value(&request).expect("serialisable");
        assert_eq!(
            json,
            serde_json::json!({ "name": "Jane Doe", "email": "jane@co.com", "company": "Acme" })
        );
    }

    #[test]
    fn waste_type_is_camel_case_on_the_wire() {
        let mut form = filled();
        form.waste_type = "Organic".into();
        let json = serde_json::to_value(form.validate().expect("valid")).expect("serialisable");
        assert_eq!(json.get("wasteType"), Some(&serde_json::json!("Organic")));
    }

    #[test]
    fn field_cycling_wraps() {
        assert_eq!(FormField::Message.next(), FormField::Name);
        assert_eq!(FormField::Name.previous(), FormField::Message);
        assert_eq!(FormField::Email.next(), FormField::Company);
    }

    #[test]
    fn clear_empties_the_form() {
        let mut form = filled();
        form.clear();
        assert!(form.is_empty());
    }
}
