use std::time::Duration;

pub const NOTICE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

impl NoticeKind {
    pub fn class(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Success => "✔",
            Self::Error => "⚠",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Holds at most one visible notice. Showing a notice evicts the previous
/// one; dismissal is keyed by id so a timer armed for an evicted notice
/// cannot remove its replacement.
#[derive(Debug, Clone, Default)]
pub struct NotificationSlot {
    current: Option<(u64, Notice)>,
    next_id: u64,
}

impl NotificationSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, notice: Notice) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.current = Some((id, notice));
        id
    }

    /// Returns true if the notice was still showing.
    pub fn dismiss(&mut self, id: u64) -> bool {
        match self.current {
            Some((current, _)) if current == id => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref().map(|(_, n)| n)
    }
}
