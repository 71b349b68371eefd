//! BiF: the tagged-field binary-interchange format.
//!
//! BiF is the format the snapshot harness uses to record a compiler run.
//! A document is a sequence of fields. Each field begins with `:`, then a
//! kind byte (`i` integer or `b` blob), a single space, the field name
//! terminated by a single space, then the value:
//!
//! - integer: ASCII decimal digits terminated by a newline
//! - blob: an ASCII decimal byte count terminated by a newline, then exactly
//!   that many raw bytes, then a trailing newline (not counted)
//!
//! A run snapshot is the three fields `i exit_code`, `b stdout`, `b stderr`,
//! in that order.

use std::fmt;

/// A single BiF field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Int { name: String, value: i64 },
    Blob { name: String, data: Vec<u8> },
}

impl Field {
    /// The field's name.
    pub fn name(&self) -> &str {
        match self {
            Self::Int { name, .. } => name,
            Self::Blob { name, .. } => name,
        }
    }
}

/// A decode failure with byte-offset context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BifError {
    /// Input ended in the middle of a field.
    Truncated { offset: usize },
    /// A field did not start with `:` or carried an unknown kind byte.
    BadTag { offset: usize, found: u8 },
    /// An integer or byte-count value was not valid ASCII decimal.
    BadInteger { offset: usize },
    /// A snapshot was missing one of its three expected fields.
    MissingField { name: &'static str },
}

impl fmt::Display for BifError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { offset } => write!(f, "truncated BiF input at byte {offset}"),
            Self::BadTag { offset, found } => {
                write!(f, "bad BiF field tag {:?} at byte {offset}", *found as char)
            }
            Self::BadInteger { offset } => write!(f, "bad BiF integer at byte {offset}"),
            Self::MissingField { name } => write!(f, "missing BiF snapshot field `{name}`"),
        }
    }
}

impl std::error::Error for BifError {}

/// Encode a sequence of fields.
pub fn encode(fields: &[Field]) -> Vec<u8> {
    let mut out = Vec::new();
    for field in fields {
        match field {
            Field::Int { name, value } => {
                out.extend_from_slice(format!(":i {name} {value}\n").as_bytes());
            }
            Field::Blob { name, data } => {
                out.extend_from_slice(format!(":b {name} {}\n", data.len()).as_bytes());
                out.extend_from_slice(data);
                out.push(b'\n');
            }
        }
    }
    out
}

/// Decode a sequence of fields, consuming the entire input.
pub fn decode(bytes: &[u8]) -> Result<Vec<Field>, BifError> {
    let mut fields = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos] != b':' {
            return Err(BifError::BadTag {
                offset: pos,
                found: bytes[pos],
            });
        }
        let kind = *bytes.get(pos + 1).ok_or(BifError::Truncated { offset: pos })?;
        if bytes.get(pos + 2) != Some(&b' ') {
            return Err(BifError::Truncated { offset: pos });
        }
        pos += 3;
        let name_end = find(bytes, pos, b' ')?;
        let name = String::from_utf8_lossy(&bytes[pos..name_end]).into_owned();
        pos = name_end + 1;
        match kind {
            b'i' => {
                let line_end = find(bytes, pos, b'\n')?;
                let value = parse_int(&bytes[pos..line_end], pos)?;
                pos = line_end + 1;
                fields.push(Field::Int { name, value });
            }
            b'b' => {
                let line_end = find(bytes, pos, b'\n')?;
                let len = parse_int(&bytes[pos..line_end], pos)? as usize;
                pos = line_end + 1;
                if pos + len + 1 > bytes.len() {
                    return Err(BifError::Truncated { offset: pos });
                }
                let data = bytes[pos..pos + len].to_vec();
                pos += len + 1; // skip the trailing newline
                fields.push(Field::Blob { name, data });
            }
            other => {
                return Err(BifError::BadTag {
                    offset: pos - 2,
                    found: other,
                })
            }
        }
    }
    Ok(fields)
}

fn find(bytes: &[u8], from: usize, needle: u8) -> Result<usize, BifError> {
    bytes[from..]
        .iter()
        .position(|&b| b == needle)
        .map(|i| from + i)
        .ok_or(BifError::Truncated { offset: from })
}

fn parse_int(digits: &[u8], offset: usize) -> Result<i64, BifError> {
    std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(BifError::BadInteger { offset })
}

/// The three-field snapshot of one compiler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub exit_code: i64,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl Snapshot {
    /// Encode as the `exit_code` / `stdout` / `stderr` field triple.
    pub fn to_bytes(&self) -> Vec<u8> {
        encode(&[
            Field::Int {
                name: "exit_code".into(),
                value: self.exit_code,
            },
            Field::Blob {
                name: "stdout".into(),
                data: self.stdout.clone(),
            },
            Field::Blob {
                name: "stderr".into(),
                data: self.stderr.clone(),
            },
        ])
    }

    /// Decode from the field triple, enforcing field order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BifError> {
        let fields = decode(bytes)?;
        let mut iter = fields.into_iter();
        let exit_code = match iter.next() {
            Some(Field::Int { ref name, value }) if name == "exit_code" => value,
            _ => return Err(BifError::MissingField { name: "exit_code" }),
        };
        let stdout = match iter.next() {
            Some(Field::Blob { ref name, ref data }) if name == "stdout" => data.clone(),
            _ => return Err(BifError::MissingField { name: "stdout" }),
        };
        let stderr = match iter.next() {
            Some(Field::Blob { ref name, ref data }) if name == "stderr" => data.clone(),
            _ => return Err(BifError::MissingField { name: "stderr" }),
        };
        Ok(Self {
            exit_code,
            stdout,
            stderr,
        })
    }
}
