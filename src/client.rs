use super::config::ClientConfig;
use super::diagnostics::{DiagnosticSink, NoopSink};
use super::passive::parse_pasv_reply;
use super::*;
use std::fmt;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;
use std::net::SocketAddrV4;
use std::net::TcpStream;
use std::net::ToSocketAddrs;
use std::time::Duration;

/// Longest reply line accepted, terminator included.
pub const MAX_REPLY_LINE: usize = 8 * 1024;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unconnected,
    Connected,
    Authenticated,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Unconnected => "unconnected",
            SessionState::Connected => "connected",
            SessionState::Authenticated => "logged in",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// One control-channel conversation with an FTP server.
///
/// Every operation writes one command line and blocks for one reply line.
/// The session owns its stream exclusively; callers sharing a session
/// across threads must serialize access themselves.
pub struct FtpClient<S = TcpStream> {
    reader: Option<BufReader<S>>,
    state: SessionState,
    passive: Option<SocketAddrV4>,
    config: ClientConfig,
    sink: Box<dyn DiagnosticSink>,
}

impl FtpClient<TcpStream> {
    /// Unconnected session with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Open a FTP connection and read the server greeting.
    ///
    /// # Arguments
    /// address     Server address to connect, as `host:port`
    ///
    /// # Example
    /// ```no_run
    /// # fn main() -> cable::Result<()> {
    /// let mut client = cable::FtpClient::new();
    /// let greeting = client.connect("127.0.0.1:21")?;
    /// println!("{}", greeting);
    /// client.quit()?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    /// `ConnectionError` if the dial or greeting read fails, `MalformedReply`
    /// for an undecodable greeting, `InvalidState` if already connected.
    pub fn connect(&mut self, address: impl ToSocketAddrs) -> Result<Reply> {
        self.ensure_detached("connect")?;

        let stream = self.dial(address)?;
        stream.set_read_timeout(self.config.read_timeout)?;
        stream.set_write_timeout(self.config.write_timeout)?;
        self.attach(stream)
    }

    /// Change the deadlines on the live control connection.
    pub fn set_timeouts(&mut self, read: Option<Duration>, write: Option<Duration>) -> Result<()> {
        let stream = self.reader.as_ref().ok_or(FtpError::NotConnected)?.get_ref();
        stream.set_read_timeout(read)?;
        stream.set_write_timeout(write)?;
        self.config.read_timeout = read;
        self.config.write_timeout = write;
        Ok(())
    }

    fn dial(&self, address: impl ToSocketAddrs) -> io::Result<TcpStream> {
        let Some(timeout) = self.config.connect_timeout else {
            return TcpStream::connect(address);
        };

        let mut last_error = None;
        for addr in address.to_socket_addrs()? {
            log::debug!("dialing {} with a {:?} timeout", addr, timeout);
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => return Ok(stream),
                Err(error) => last_error = Some(error),
            }
        }
        Err(last_error.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "address did not resolve to any socket address",
            )
        }))
    }
}

impl Default for FtpClient<TcpStream> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Read + Write> FtpClient<S> {
    pub fn with_config(config: ClientConfig) -> Self {
        FtpClient {
            reader: None,
            state: SessionState::Unconnected,
            passive: None,
            config,
            sink: Box::new(NoopSink),
        }
    }

    /// Route this session's verbose output to `sink`.
    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.config.verbose = verbose;
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.reader.is_some()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// Data endpoint from the last successful `PASV` on this connection.
    pub fn passive_addr(&self) -> Option<SocketAddrV4> {
        self.passive
    }

    pub fn passive_port(&self) -> Option<u16> {
        self.passive.map(|addr| addr.port())
    }

    /// Take ownership of an already open byte stream and read the greeting.
    ///
    /// On failure the stream is dropped and the session stays unconnected.
    pub fn attach(&mut self, stream: S) -> Result<Reply> {
        self.ensure_detached("connect")?;

        let previous = self.state;
        self.reader = Some(BufReader::new(stream));
        self.passive = None;
        match self.receive() {
            Ok(greeting) => {
                self.state = SessionState::Connected;
                Ok(greeting)
            }
            Err(error) => {
                self.reader = None;
                self.state = previous;
                Err(error)
            }
        }
    }

    /// Release the connection, if any, and move to `Closed`.
    /// Safe to call any number of times.
    pub fn close(&mut self) {
        if let Some(reader) = self.reader.take() {
            log::debug!("closing control connection");
            drop(reader);
        }
        self.state = SessionState::Closed;
        self.passive = None;
    }

    /// Perform Login to server.
    /// # Arguments
    /// username    user name, `anonymous` (or the configured identity) if empty
    /// password    password for given user, may be empty
    ///
    /// # Errors
    /// `LoginError` if the server answers `USER` or `PASS` with a 4xx/5xx
    /// reply. `PASS` is not sent when `USER` fails. A failing `PASS` leaves
    /// the connection open and unauthenticated.
    pub fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let username = if username.is_empty() {
            self.config.anonymous_user.clone()
        } else {
            username.to_string()
        };

        let reply = self.execute("USER", Some(&username))?;
        if reply.is_negative() {
            return Err(FtpError::LoginError(reply));
        }

        let reply = self.execute("PASS", Some(password))?;
        if reply.is_negative() {
            return Err(FtpError::LoginError(reply));
        }

        self.state = SessionState::Authenticated;
        Ok(())
    }

    /// Send `QUIT` and close the connection, whether or not a reply arrives.
    pub fn quit(&mut self) -> Result<Reply> {
        let reply = self.execute("QUIT", None);
        self.close();
        reply
    }

    /// `PWD`. The directory is in the reply text, see [`Reply::quoted_text`].
    pub fn pwd(&mut self) -> Result<Reply> {
        self.execute("PWD", None)
    }

    pub fn cwd(&mut self, path: &str) -> Result<Reply> {
        self.execute("CWD", Some(path))
    }

    /// Ask the server to listen for a data connection and record where.
    ///
    /// # Errors
    /// `MalformedPasvReply` if the reply has no `(h1,h2,h3,h4,p1,p2)` group.
    /// The previously recorded endpoint is kept in that case.
    pub fn pasv(&mut self) -> Result<SocketAddrV4> {
        let reply = self.execute("PASV", None)?;
        let endpoint = parse_pasv_reply(&reply.message)?;
        self.passive = Some(endpoint);
        Ok(endpoint)
    }

    /// Write `VERB[ argument]` and read exactly one reply line.
    ///
    /// # Errors
    /// `InvalidArgument` if the verb or argument contains CR or LF; nothing
    /// is written then. Any I/O failure closes the session, since the reply
    /// stream can no longer be trusted to line up with commands.
    pub fn execute(&mut self, verb: &str, argument: Option<&str>) -> Result<Reply> {
        self.send(verb, argument)?;
        self.receive()
    }

    fn ensure_detached(&self, operation: &'static str) -> Result<()> {
        if self.reader.is_some() {
            return Err(FtpError::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    fn send(&mut self, verb: &str, argument: Option<&str>) -> Result<()> {
        let breaks_line = |part: &str| part.contains(|c: char| c == '\r' || c == '\n');
        if breaks_line(verb) || argument.is_some_and(breaks_line) {
            return Err(FtpError::InvalidArgument(format!(
                "line break in {} command",
                verb.escape_debug()
            )));
        }

        let reader = self.reader.as_mut().ok_or(FtpError::NotConnected)?;

        let command = match argument {
            Some(argument) => format!("{} {}", verb, argument),
            None => verb.to_string(),
        };
        if self.config.verbose {
            if verb.eq_ignore_ascii_case("PASS") {
                self.sink.emit(&format!(">>> {} ****", verb));
            } else {
                self.sink.emit(&format!(">>> {}", command));
            }
        }

        if let Err(error) = write_command(reader.get_mut(), &command) {
            self.close();
            return Err(error.into());
        }
        Ok(())
    }

    fn receive(&mut self) -> Result<Reply> {
        let reader = self.reader.as_mut().ok_or(FtpError::NotConnected)?;

        let line = match read_reply_line(reader) {
            Ok(line) => line,
            Err(error) => {
                self.close();
                return Err(error);
            }
        };

        let reply = Reply::parse(&String::from_utf8_lossy(&line))?;
        if self.config.verbose {
            self.sink.emit(&format!("<<< {} {}", reply.code, reply.message));
        }
        Ok(reply)
    }
}

fn write_command<W: Write>(stream: &mut W, command: &str) -> io::Result<()> {
    stream.write_all(command.as_bytes())?;
    stream.write_all(CRLF.as_bytes())?;
    stream.flush()
}

/// Read one line of at most `MAX_REPLY_LINE` bytes. An error here leaves
/// the stream mid-line.
fn read_reply_line<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    let mut line = Vec::new();
    let read = reader
        .take(MAX_REPLY_LINE as u64)
        .read_until(b'\n', &mut line)?;
    if read == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "server closed the control connection",
        )
        .into());
    }
    if line.len() >= MAX_REPLY_LINE && !line.ends_with(b"\n") {
        let head = String::from_utf8_lossy(&line[..64]);
        return Err(FtpError::MalformedReply(format!(
            "{}... (longer than {} bytes)",
            head, MAX_REPLY_LINE
        )));
    }
    Ok(line)
}
