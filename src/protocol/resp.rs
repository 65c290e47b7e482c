use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Largest bulk string payload accepted from a client
pub const MAX_BULK_LEN: usize = 8 * 1024 * 1024;

/// Largest element count accepted for a single array
pub const MAX_ARRAY_LEN: usize = 1024 * 1024;

/// Deepest array nesting accepted. Requests are flat; replies nest one level.
pub const MAX_DEPTH: usize = 32;

/// RESP (REdis Serialization Protocol) data types
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  /// Simple strings, used for status replies like "OK"
  SimpleString(String),
  /// Errors
  Error(String),
  /// Integers
  Integer(i64),
  /// Bulk strings, binary safe (can be null)
  BulkString(Option<Vec<u8>>),
  /// Arrays of other values (can be null)
  Array(Option<Vec<Value>>),
}

impl Value {
  /// Create a simple OK response
  pub fn ok() -> Self {
    Value::SimpleString("OK".to_string())
  }

  /// Create an error response
  pub fn error(msg: impl Into<String>) -> Self {
    Value::Error(msg.into())
  }

  /// Create a non-null bulk string
  pub fn bulk(data: impl Into<Vec<u8>>) -> Self {
    Value::BulkString(Some(data.into()))
  }

  /// Text content of a simple or bulk string argument.
  ///
  /// Bulk strings that are not valid UTF-8 yield `None`.
  pub fn as_text(&self) -> Option<String> {
    match self {
      Value::BulkString(Some(data)) => String::from_utf8(data.clone()).ok(),
      Value::SimpleString(s) => Some(s.clone()),
      _ => None,
    }
  }

  /// Encode Value to RESP bytes
  pub fn encode(&self) -> Bytes {
    let mut buf = BytesMut::new();
    self.encode_to(&mut buf);
    buf.freeze()
  }

  fn encode_to(&self, buf: &mut BytesMut) {
    match self {
      Value::SimpleString(s) => Self::put_line(buf, b'+', s.as_bytes()),
      Value::Error(e) => Self::put_line(buf, b'-', e.as_bytes()),
      Value::Integer(i) => Self::put_line(buf, b':', i.to_string().as_bytes()),
      Value::BulkString(None) => buf.put_slice(b"$-1\r\n"),
      Value::BulkString(Some(data)) => {
        Self::put_line(buf, b'$', data.len().to_string().as_bytes());
        buf.put_slice(data);
        buf.put_slice(b"\r\n");
      }
      Value::Array(None) => buf.put_slice(b"*-1\r\n"),
      Value::Array(Some(items)) => {
        Self::put_line(buf, b'*', items.len().to_string().as_bytes());
        for item in items {
          item.encode_to(buf);
        }
      }
    }
  }

  fn put_line(buf: &mut BytesMut, marker: u8, line: &[u8]) {
    buf.put_u8(marker);
    buf.put_slice(line);
    buf.put_slice(b"\r\n");
  }
}

/// Malformed RESP input. The connection cannot recover from these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
  #[error("invalid type marker '{}'", char::from(*.0))]
  InvalidMarker(u8),

  #[error("invalid length or integer '{0}'")]
  InvalidNumber(String),

  #[error("bulk string not terminated by CRLF")]
  MissingTerminator,

  #[error("{kind} length {len} exceeds limit of {limit}")]
  TooLarge {
    kind: &'static str,
    len: usize,
    limit: usize,
  },

  #[error("arrays nested deeper than {0} levels")]
  TooDeep(usize),
}

/// Parser for RESP protocol
pub struct Parser;

/// Result of a parse step: `Ok(None)` means more bytes are needed
type ParseResult<T> = Result<Option<T>, ProtocolError>;

impl Parser {
  /// Parse one value from the front of `buffer`.
  ///
  /// Returns the value and the number of bytes it occupied, `Ok(None)` when
  /// the buffer holds only part of a frame.
  pub fn parse(buffer: &[u8]) -> ParseResult<(Value, usize)> {
    let mut pos = 0;
    match Self::parse_value(buffer, &mut pos, 0)? {
      Some(value) => Ok(Some((value, pos))),
      None => Ok(None),
    }
  }

  fn parse_value(buffer: &[u8], pos: &mut usize, depth: usize) -> ParseResult<Value> {
    let Some(&marker) = buffer.get(*pos) else {
      return Ok(None);
    };
    *pos += 1;

    match marker {
      b'+' => Ok(Self::read_line(buffer, pos)
        .map(|line| Value::SimpleString(String::from_utf8_lossy(line).into_owned()))),
      b'-' => Ok(Self::read_line(buffer, pos)
        .map(|line| Value::Error(String::from_utf8_lossy(line).into_owned()))),
      b':' => Ok(Self::read_number(buffer, pos)?.map(Value::Integer)),
      b'$' => Self::parse_bulk_string(buffer, pos),
      b'*' => Self::parse_array(buffer, pos, depth + 1),
      other => Err(ProtocolError::InvalidMarker(other)),
    }
  }

  fn parse_bulk_string(buffer: &[u8], pos: &mut usize) -> ParseResult<Value> {
    let Some(len) = Self::read_number(buffer, pos)? else {
      return Ok(None);
    };

    if len == -1 {
      return Ok(Some(Value::BulkString(None)));
    }
    let len = usize::try_from(len).map_err(|_| ProtocolError::InvalidNumber(len.to_string()))?;
    if len > MAX_BULK_LEN {
      return Err(ProtocolError::TooLarge {
        kind: "bulk string",
        len,
        limit: MAX_BULK_LEN,
      });
    }

    // payload plus trailing \r\n
    if *pos + len + 2 > buffer.len() {
      return Ok(None);
    }
    if &buffer[*pos + len..*pos + len + 2] != b"\r\n" {
      return Err(ProtocolError::MissingTerminator);
    }

    let data = buffer[*pos..*pos + len].to_vec();
    *pos += len + 2;
    Ok(Some(Value::BulkString(Some(data))))
  }

  fn parse_array(buffer: &[u8], pos: &mut usize, depth: usize) -> ParseResult<Value> {
    if depth > MAX_DEPTH {
      return Err(ProtocolError::TooDeep(MAX_DEPTH));
    }
    let Some(count) = Self::read_number(buffer, pos)? else {
      return Ok(None);
    };

    if count == -1 {
      return Ok(Some(Value::Array(None)));
    }
    let count =
      usize::try_from(count).map_err(|_| ProtocolError::InvalidNumber(count.to_string()))?;
    if count > MAX_ARRAY_LEN {
      return Err(ProtocolError::TooLarge {
        kind: "array",
        len: count,
        limit: MAX_ARRAY_LEN,
      });
    }

    let mut items = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
      match Self::parse_value(buffer, pos, depth)? {
        Some(item) => items.push(item),
        None => return Ok(None),
      }
    }

    Ok(Some(Value::Array(Some(items))))
  }

  fn read_number(buffer: &[u8], pos: &mut usize) -> ParseResult<i64> {
    let Some(line) = Self::read_line(buffer, pos) else {
      return Ok(None);
    };
    match atoi::atoi::<i64>(line) {
      Some(n) if !line.is_empty() && line.len() == n.to_string().len() => Ok(Some(n)),
      _ => Err(ProtocolError::InvalidNumber(
        String::from_utf8_lossy(line).into_owned(),
      )),
    }
  }

  fn read_line<'a>(buffer: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
    let start = *pos;
    let end = buffer[start..]
      .windows(2)
      .position(|w| w == b"\r\n")
      .map(|offset| start + offset)?;
    *pos = end + 2;
    Some(&buffer[start..end])
  }
}
