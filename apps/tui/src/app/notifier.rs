use chrono::{DateTime, Local};
use std::time::{Duration, Instant};

/// How long every notification stays on screen.
pub const NOTIFICATION_LIFETIME: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl NotificationKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub kind: NotificationKind,
    pub shown_at: DateTime<Local>,
    expires_at: Instant,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Fire-and-forget messages. Nothing is queued or merged: each notification is
/// visible from the moment it is raised until its own deadline passes.
#[derive(Debug, Default)]
pub struct Notifier {
    active: Vec<Notification>,
    next_id: u64,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: NotificationKind) -> u64 {
        self.notify_at(message, kind, Instant::now())
    }

    pub fn notify_at(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        now: Instant,
    ) -> u64 {
        let message = message.into();
        match kind {
            NotificationKind::Error => tracing::warn!(%message, "notification"),
            NotificationKind::Success | NotificationKind::Info => {
                tracing::info!(kind = kind.label(), %message, "notification");
            }
        }

        self.next_id += 1;
        let id = self.next_id;
        self.active.push(Notification {
            id,
            message,
            kind,
            shown_at: Local::now(),
            expires_at: now + NOTIFICATION_LIFETIME,
        });
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.notify(message, NotificationKind::Success)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.notify(message, NotificationKind::Error)
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.notify(message, NotificationKind::Info)
    }

    /// Drops every notification whose lifetime has elapsed.
    pub fn prune(&mut self, now: Instant) {
        self.active.retain(|notification| !notification.is_expired(now));
    }

    /// Removes one notification early. Unknown or already expired ids are ignored.
    pub fn dismiss(&mut self, id: u64) {
        self.active.retain(|notification| notification.id != id);
    }

    /// Removes the most recent notification, if any.
    pub fn dismiss_latest(&mut self) {
        if let Some(id) = self.active.last().map(|notification| notification.id) {
            self.dismiss(id);
        }
    }

    pub fn active(&self) -> &[Notification] {
        &self.active
    }

    pub fn count_of(&self, kind: NotificationKind) -> usize {
        self.active.iter().filter(|n| n.kind == kind).count()
    }
}
