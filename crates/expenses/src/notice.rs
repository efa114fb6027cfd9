use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    expires_at: Option<Instant>,
}

/// The error and success banners. At most one of each.
///
/// Errors stay until dismissed or replaced; successes expire.
#[derive(Debug, Clone, Default)]
pub struct Notices {
    error: Option<Notice>,
    success: Option<Notice>,
}

impl Notices {
    pub fn error(&mut self, message: impl Into<String>) {
        self.error = Some(Notice {
            level: NoticeLevel::Error,
            message: message.into(),
            expires_at: None,
        });
    }

    pub fn success(&mut self, message: impl Into<String>, ttl: Duration) {
        self.success = Some(Notice {
            level: NoticeLevel::Success,
            message: message.into(),
            expires_at: Some(Instant::now() + ttl),
        });
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Dismisses both banners.
    pub fn dismiss(&mut self) {
        self.error = None;
        self.success = None;
    }

    /// Drops notices whose deadline passed. Returns `true` if any did.
    pub fn expire(&mut self, now: Instant) -> bool {
        let mut expired = false;
        for slot in [&mut self.error, &mut self.success] {
            if slot
                .as_ref()
                .and_then(|notice| notice.expires_at)
                .is_some_and(|deadline| deadline <= now)
            {
                *slot = None;
                expired = true;
            }
        }
        expired
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|notice| notice.message.as_str())
    }

    pub fn success_message(&self) -> Option<&str> {
        self.success.as_ref().map(|notice| notice.message.as_str())
    }

    /// Notices in display order, error first.
    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.error.iter().chain(self.success.iter())
    }
}
