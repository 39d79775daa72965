use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{SocketAddr, TcpListener};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cable::{status, ClientConfig, FtpClient, FtpError, SessionState};

enum Answer {
    Send(&'static str),
    Silent,
    HangUp,
}

/// Loopback stub server for a single session. Returns every command line it
/// received once the client goes away.
fn spawn_server(
    greeting: &'static str,
    answer: fn(&str) -> Answer,
) -> (SocketAddr, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut writer = stream.try_clone().unwrap();
        let mut reader = BufReader::new(stream);
        writer.write_all(greeting.as_bytes()).unwrap();

        let mut commands = Vec::new();
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).unwrap_or(0) == 0 {
                break;
            }
            let command = line.trim_end_matches(|c| c == '\r' || c == '\n').to_string();
            let answer = answer(&command);
            commands.push(command);
            match answer {
                Answer::Send(reply) => writer.write_all(reply.as_bytes()).unwrap(),
                Answer::Silent => {}
                Answer::HangUp => break,
            }
        }
        commands
    });

    (addr, handle)
}

fn well_behaved(command: &str) -> Answer {
    match command.split(' ').next().unwrap_or("") {
        "USER" | "PASS" => Answer::Send("230 Logged in\n"),
        "PWD" => Answer::Send("257 \"/\" is the current directory\n"),
        "CWD" => Answer::Send("250 Directory changed\n"),
        "PASV" => Answer::Send("227 Entering Passive Mode (127,0,0,1,200,13)\n"),
        "QUIT" => Answer::Send("221 Bye\n"),
        _ => Answer::Send("502 Command not implemented\n"),
    }
}

#[test]
fn full_anonymous_session() {
    let (addr, server) = spawn_server("220 Welcome\n", well_behaved);

    let mut client = FtpClient::new();
    let greeting = client.connect(addr).unwrap();
    assert_eq!(greeting.code, status::SERVICE_READY);
    assert_eq!(greeting.message, "Welcome");

    client.login("", "").unwrap();
    assert!(client.is_logged_in());

    let pwd = client.pwd().unwrap();
    assert_eq!(pwd.code, status::PATH_CREATED);
    assert_eq!(pwd.quoted_text().as_deref(), Some("/"));

    let endpoint = client.pasv().unwrap();
    assert_eq!(endpoint.port(), 51213);
    assert_eq!(client.passive_port(), Some(200 * 256 + 13));

    let bye = client.quit().unwrap();
    assert_eq!(bye.code, status::SERVICE_CLOSING);
    assert!(!client.is_connected());
    assert_eq!(client.state(), SessionState::Closed);

    // The server only returns once it sees the client hang up.
    let commands = server.join().unwrap();
    assert_eq!(commands, vec!["USER anonymous", "PASS ", "PWD", "PASV", "QUIT"]);
}

#[test]
fn cwd_and_connect_timeout() {
    let (addr, server) = spawn_server("220 Welcome\n", well_behaved);

    let config = ClientConfig::default().with_connect_timeout(Duration::from_secs(5));
    let mut client: FtpClient = FtpClient::with_config(config);
    client.connect(addr).unwrap();
    client.login("bob", "hunter2").unwrap();
    assert_eq!(client.cwd("/pub").unwrap().code, status::FILE_ACTION_OK);
    client.quit().unwrap();

    let commands = server.join().unwrap();
    assert_eq!(commands, vec!["USER bob", "PASS hunter2", "CWD /pub", "QUIT"]);
}

#[test]
fn malformed_greeting_fails_connect() {
    let (addr, server) = spawn_server("hello\n", well_behaved);

    let mut client = FtpClient::new();
    assert!(matches!(
        client.connect(addr),
        Err(FtpError::MalformedReply(_))
    ));
    assert!(!client.is_connected());
    assert_eq!(client.state(), SessionState::Unconnected);

    assert!(server.join().unwrap().is_empty());
}

#[test]
fn quit_closes_when_server_hangs_up() {
    let (addr, server) = spawn_server("220 Welcome\n", |command| match command {
        "QUIT" => Answer::HangUp,
        _ => well_behaved(command),
    });

    let mut client = FtpClient::new();
    client.connect(addr).unwrap();
    match client.quit() {
        Err(FtpError::ConnectionError(_)) => {}
        other => panic!("unexpected {:?}", other),
    }
    assert!(!client.is_connected());
    assert!(matches!(client.pwd(), Err(FtpError::NotConnected)));

    assert_eq!(server.join().unwrap(), vec!["QUIT"]);
}

#[test]
fn read_timeout_bounds_a_silent_server() {
    let (addr, server) = spawn_server("220 Welcome\n", |command| match command {
        "QUIT" => Answer::Silent,
        _ => well_behaved(command),
    });

    let config = ClientConfig::default().with_read_timeout(Duration::from_millis(200));
    let mut client: FtpClient = FtpClient::with_config(config);
    client.connect(addr).unwrap();

    match client.quit() {
        Err(FtpError::ConnectionError(error)) => {
            assert!(matches!(
                error.kind(),
                ErrorKind::WouldBlock | ErrorKind::TimedOut
            ));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(!client.is_connected());

    assert_eq!(server.join().unwrap(), vec!["QUIT"]);
}

#[test]
fn rejected_login_over_tcp() {
    let (addr, server) = spawn_server("220 Welcome\n", |command| {
        if command.starts_with("USER") {
            Answer::Send("530 Anonymous access denied\n")
        } else {
            well_behaved(command)
        }
    });

    let mut client = FtpClient::new();
    client.connect(addr).unwrap();
    match client.login("", "") {
        Err(FtpError::LoginError(reply)) => {
            assert_eq!(reply.code, status::NOT_LOGGED_IN);
            assert_eq!(reply.message, "Anonymous access denied");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(client.state(), SessionState::Connected);
    client.close();
    client.close();

    assert_eq!(server.join().unwrap(), vec!["USER anonymous"]);
}

#[test]
fn connect_while_connected_is_invalid() {
    let (addr, server) = spawn_server("220 Welcome\n", well_behaved);

    let mut client = FtpClient::new();
    client.connect(addr).unwrap();
    assert!(matches!(
        client.connect(addr),
        Err(FtpError::InvalidState { .. })
    ));
    client.quit().unwrap();

    assert_eq!(server.join().unwrap(), vec!["QUIT"]);
}

#[test]
fn dial_failure_is_a_connection_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let mut client = FtpClient::new();
    assert!(matches!(
        client.connect(addr),
        Err(FtpError::ConnectionError(_))
    ));
    assert_eq!(client.state(), SessionState::Unconnected);
}
