//! Session configuration.

use std::time::Duration;

/// Identity sent by `USER` when the caller passes an empty user name.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Knobs for a [`FtpClient`](crate::FtpClient) session.
///
/// Timeouts default to `None`, meaning a reply read blocks until the server
/// answers or hangs up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Emit the protocol conversation to the session's diagnostic sink.
    pub verbose: bool,
    pub anonymous_user: String,
    pub connect_timeout: Option<Duration>,
    pub read_timeout: Option<Duration>,
    pub write_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            verbose: false,
            anonymous_user: ANONYMOUS_USER.to_string(),
            connect_timeout: None,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_anonymous_user(mut self, user: impl Into<String>) -> Self {
        self.anonymous_user = user.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Deadline for each reply read on the control connection.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }
}
