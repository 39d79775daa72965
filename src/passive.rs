//! Decoding of the `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)` reply.

use super::*;
use regex::Regex;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::OnceLock;

fn tuple_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\(([^()]*)\)").expect("valid PASV tuple pattern"))
}

/// Extract the data endpoint announced in a passive mode reply message.
///
/// The message must hold a parenthesized group of exactly six comma
/// separated decimal bytes. The first four are the host, the last two the
/// port as `p1 * 256 + p2`.
///
/// # Errors
/// `MalformedPasvReply` if the group is missing, has the wrong number of
/// fields, or a field is not a number in `0..=255`.
pub fn parse_pasv_reply(message: &str) -> Result<SocketAddrV4> {
    let malformed = || FtpError::MalformedPasvReply(message.to_string());

    let group = tuple_pattern()
        .captures(message)
        .and_then(|caps| caps.get(1))
        .ok_or_else(malformed)?;

    let fields = group
        .as_str()
        .split(',')
        .map(|field| field.trim().parse::<u8>())
        .collect::<std::result::Result<Vec<u8>, _>>()
        .map_err(|_| malformed())?;

    let &[h1, h2, h3, h4, p1, p2] = fields.as_slice() else {
        return Err(malformed());
    };

    let port = u16::from(p1) * 256 + u16::from(p2);
    Ok(SocketAddrV4::new(Ipv4Addr::new(h1, h2, h3, h4), port))
}
