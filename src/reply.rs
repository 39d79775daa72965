//! Decoding of server reply lines.
//!
//! A reply line is a three digit status code, one separator character and
//! free text. The separator is a space for final replies and `-` for the
//! first line of a multi-line reply; either way it is stripped.

use super::*;
use std::fmt;

/// One decoded server reply line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: u16,
    pub message: String,
}

impl Reply {
    /// Parse a single reply line. Trailing CR and LF are ignored.
    ///
    /// # Errors
    /// `MalformedReply` when the first three characters are not ASCII
    /// digits. No reply is produced in that case.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(|c| c == '\r' || c == '\n');
        let malformed = || FtpError::MalformedReply(line.to_string());

        let digits = line
            .get(..3)
            .filter(|code| code.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(malformed)?;
        let code: u16 = digits.parse().map_err(|_| malformed())?;

        let mut rest = line[3..].chars();
        rest.next();

        Ok(Reply {
            code,
            message: rest.as_str().to_string(),
        })
    }

    /// 1xx
    pub fn is_positive_preliminary(&self) -> bool {
        (100..200).contains(&self.code)
    }

    /// 2xx
    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    /// 3xx
    pub fn is_positive_intermediate(&self) -> bool {
        (300..400).contains(&self.code)
    }

    /// Transient (4xx) or permanent (5xx) failure.
    pub fn is_negative(&self) -> bool {
        self.code >= 400
    }

    /// First double-quoted string in the message, with `""` unescaped to `"`.
    ///
    /// Servers answer `PWD` with `257 "<path>" ...`; this pulls the path out.
    pub fn quoted_text(&self) -> Option<String> {
        let start = self.message.find('"')?;
        let mut chars = self.message[start + 1..].chars().peekable();
        let mut text = String::new();
        while let Some(c) = chars.next() {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                } else {
                    return Some(text);
                }
            }
            text.push(c);
        }
        None
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.message)
    }
}
