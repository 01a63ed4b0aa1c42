pub mod controller;
pub mod notice;
pub mod relay;
pub mod timers;

use std::{fmt, sync::LazyLock};

use chrono::NaiveDateTime;
use regex::Regex;
use thiserror::Error;

pub use controller::{ContactController, ContactForm, FormState, SubmitOutcome};
pub use notice::{Notice, NoticeKind, NotificationSlot};
pub use relay::{DeliveryError, Relay, RelayRequest, TemplateParams};

pub const MESSAGE_SOFT_LIMIT: usize = 1000;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Whether a field's group keeps its `focused` style after blur. Any typed
/// text counts, whitespace included.
pub fn keeps_focus_style(value: &str) -> bool {
    !value.is_empty()
}

/// Raw values of the contact form as read from the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub company: String,
    pub service: String,
}

impl ContactFields {
    /// Strips surrounding whitespace from every field, the way values are
    /// captured at submit time.
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
            company: self.company.trim().to_string(),
            service: self.service.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    WebDevelopment,
    MobileApp,
    UiUxDesign,
    Consulting,
    Other,
}

impl Service {
    pub fn all() -> [Service; 5] {
        [
            Self::WebDevelopment,
            Self::MobileApp,
            Self::UiUxDesign,
            Self::Consulting,
            Self::Other,
        ]
    }

    /// Value used by the `<select>` option.
    pub fn value(&self) -> &'static str {
        match self {
            Self::WebDevelopment => "web-development",
            Self::MobileApp => "mobile-app",
            Self::UiUxDesign => "ui-ux-design",
            Self::Consulting => "consulting",
            Self::Other => "other",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::WebDevelopment => "Web Development",
            Self::MobileApp => "Mobile App Development",
            Self::UiUxDesign => "UI/UX Design",
            Self::Consulting => "Technical Consulting",
            Self::Other => "Other",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::all().into_iter().find(|s| s.value() == value)
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    MissingName,
    MissingEmail,
    InvalidEmail,
    MissingSubject,
    MissingMessage,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::MissingName => "Name is required",
            Self::MissingEmail => "Email is required",
            Self::InvalidEmail => "Please enter a valid email address",
            Self::MissingSubject => "Subject is required",
            Self::MissingMessage => "Message is required",
        };
        f.write_str(msg)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", join_violations(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A set of form values that passed validation and may be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub company: Option<String>,
    pub service: Option<Service>,
}

impl TryFrom<&ContactFields> for Submission {
    type Error = ValidationError;

    fn try_from(fields: &ContactFields) -> Result<Self, Self::Error> {
        let mut violations = Vec::new();
        if fields.name.trim().is_empty() {
            violations.push(Violation::MissingName);
        }
        let email = fields.email.trim();
        if email.is_empty() {
            violations.push(Violation::MissingEmail);
        } else if !is_valid_email(email) {
            violations.push(Violation::InvalidEmail);
        }
        if fields.subject.trim().is_empty() {
            violations.push(Violation::MissingSubject);
        }
        if fields.message.trim().is_empty() {
            violations.push(Violation::MissingMessage);
        }
        if !violations.is_empty() {
            return Err(ValidationError { violations });
        }

        let company = Some(fields.company.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        Ok(Self {
            name: fields.name.trim().to_string(),
            email: email.to_string(),
            subject: fields.subject.trim().to_string(),
            message: fields.message.trim().to_string(),
            company,
            service: Service::from_value(fields.service.trim()),
        })
    }
}

/// en-US style "Oct 18, 2026, 02:05 PM".
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// Character counter shown under the message box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharCount {
    pub count: usize,
    pub limit: usize,
}

impl CharCount {
    pub fn of(message: &str) -> Self {
        Self {
            count: message.chars().count(),
            limit: MESSAGE_SOFT_LIMIT,
        }
    }

    /// Above 90% of the limit.
    pub fn is_near_limit(&self) -> bool {
        self.count * 10 > self.limit * 9
    }
}

impl fmt::Display for CharCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.count, self.limit)
    }
}
