use std::fmt;

/// Session lifecycle notifications delivered through the event bus.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum SessionEvent {
    /// A request was rejected and there was no refresh token to recover with.
    SessionExpired,
    /// The backend refused the refresh token.
    RefreshFailed,
}

impl SessionEvent {
    pub const ALL: [SessionEvent; 2] = [SessionEvent::SessionExpired, SessionEvent::RefreshFailed];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionEvent::SessionExpired => "SESSION_EXPIRED",
            SessionEvent::RefreshFailed => "REFRESH_FAILED",
        }
    }
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
