//! [crate] A minimal client for the FTP control channel.
//! It connects, authenticates and issues a handful of control commands
//! (`PWD`, `CWD`, `PASV`, `QUIT`), decoding the server's numeric replies.
//! No data channel transfers and no encrypted sessions.
//! # Example:
//! ```no_run
//! use cable::FtpClient;
//! use cable::Result;
//!
//! fn main() -> Result<()> {
//!     let mut client = FtpClient::new();
//!     client.connect("ftp.debian.org:21")?;
//!     client.login("", "")?;
//!
//!     let reply = client.pwd()?;
//!     println!("cwd: {:?}", reply.quoted_text());
//!
//!     let endpoint = client.pasv()?;
//!     println!("passive endpoint: {}", endpoint);
//!
//!     client.quit()?;
//!     Ok(())
//! }
//!```

pub mod client;
pub mod config;
pub mod diagnostics;
pub mod passive;
pub mod reply;

pub use client::{FtpClient, SessionState};
pub use config::ClientConfig;
pub use diagnostics::{DiagnosticSink, LogSink, NoopSink};
pub use reply::Reply;

/// Protocol line terminator for commands.
pub const CRLF: &str = "\r\n";

/// Errors surfaced by the control-channel client.
#[derive(Debug, thiserror::Error)]
pub enum FtpError {
    /// Dialing or stream I/O failed, including the server hanging up.
    #[error("Connection Error: {0}")]
    ConnectionError(#[from] std::io::Error),
    /// A reply line did not start with a three digit status code.
    #[error("Response Error: malformed reply {0:?}")]
    MalformedReply(String),
    /// A `PASV` reply without a usable `(h1,h2,h3,h4,p1,p2)` group.
    #[error("Response Error: malformed passive mode reply {0:?}")]
    MalformedPasvReply(String),
    #[error("Connection Error: no connection open")]
    NotConnected,
    /// A command verb or argument that would not fit on one line.
    #[error("Command Error: {0}")]
    InvalidArgument(String),
    #[error("Command Error: cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
    /// The server rejected `USER` or `PASS`.
    #[error("Login Error: {0}")]
    LoginError(Reply),
}

/// Generic Result type defaults to Result<T, FtpError>
pub type Result<T> = std::result::Result<T, FtpError>;

/// Reply codes the client and its callers commonly look at.
pub mod status {
    pub const SERVICE_READY: u16 = 220;
    pub const SERVICE_CLOSING: u16 = 221;
    pub const FILE_ACTION_OK: u16 = 250;
    pub const PATH_CREATED: u16 = 257;
    pub const NOT_LOGGED_IN: u16 = 530;
    pub const FILE_NOT_AVAILABLE: u16 = 550;
}
