use std::time::Duration;

use cable::{ClientConfig, FtpClient, LogSink, Result};
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

/// Log in to an FTP server, report the working directory and passive endpoint.
#[derive(Debug, Parser)]
#[command(name = "cable", version)]
struct Args {
    /// Server address as host:port
    address: String,

    /// User name; anonymous when omitted
    #[arg(short, long, default_value = "")]
    user: String,

    #[arg(short, long, default_value = "")]
    password: String,

    /// Directory to change into after logging in
    #[arg(long)]
    cwd: Option<String>,

    /// Connect and reply timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Print the control-channel conversation
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = ClientConfig::default().with_verbose(args.verbose);
    if let Some(secs) = args.timeout {
        let timeout = Duration::from_secs(secs);
        config = config
            .with_connect_timeout(timeout)
            .with_read_timeout(timeout)
            .with_write_timeout(timeout);
    }

    let mut client: FtpClient =
        FtpClient::with_config(config).with_sink(LogSink::new("cable::session"));
    client.connect(args.address.as_str())?;
    client.login(&args.user, &args.password)?;

    if let Some(dir) = &args.cwd {
        let reply = client.cwd(dir)?;
        if reply.is_negative() {
            eprintln!("CWD {} refused: {}", dir, reply);
        }
    }

    let reply = client.pwd()?;
    match reply.quoted_text() {
        Some(path) => println!("directory: {}", path),
        None => println!("directory: ({})", reply),
    }

    let endpoint = client.pasv()?;
    println!("passive endpoint: {}", endpoint);

    client.quit()?;
    Ok(())
}
