//! Byte-level STOMP framing for `tokio_util::codec::Framed`.

use crate::broker::stomp::frame::{Command, Frame};
use crate::error::BrokerError;
use bytes::{Buf, BufMut, BytesMut};
use std::str::FromStr;
use tokio_util::codec::{Decoder, Encoder};

pub const DEFAULT_MAX_FRAME_LEN: usize = 8 * 1024 * 1024;

const NUL: u8 = 0;
const EOL: u8 = b'\n';
const CR: u8 = b'\r';

#[derive(Clone, Debug)]
pub struct StompCodec {
    max_frame_len: usize,
}

impl StompCodec {
    pub fn new(max_frame_len: usize) -> Self {
        Self { max_frame_len }
    }

    fn check_len(&self, len: usize) -> Result<(), BrokerError> {
        if len > self.max_frame_len {
            return Err(BrokerError::Protocol(format!(
                "frame exceeds {} bytes",
                self.max_frame_len
            )));
        }
        Ok(())
    }
}

impl Default for StompCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_LEN)
    }
}

/// Locates the blank line ending the frame head.
/// Returns the head length and the offset at which the body starts.
fn find_head_end(buf: &[u8]) -> Option<(usize, usize)> {
    let mut line_start = 0;
    while let Some(pos) = buf[line_start..].iter().position(|b| *b == EOL) {
        let line_end = line_start + pos;
        let line = &buf[line_start..line_end];
        if line.is_empty() || line == [CR] {
            return Some((line_start, line_end + 1));
        }
        line_start = line_end + 1;
    }
    None
}

fn unescape(raw: &str) -> Result<String, BrokerError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            Some(other) => {
                return Err(BrokerError::Protocol(format!(
                    "undefined header escape \\{other}"
                )))
            }
            None => return Err(BrokerError::Protocol("dangling header escape".into())),
        }
    }
    Ok(out)
}

fn put_escaped(dst: &mut BytesMut, raw: &str) {
    for c in raw.chars() {
        match c {
            '\\' => dst.put_slice(b"\\\\"),
            '\n' => dst.put_slice(b"\\n"),
            '\r' => dst.put_slice(b"\\r"),
            ':' => dst.put_slice(b"\\c"),
            _ => {
                let mut utf8 = [0u8; 4];
                dst.put_slice(c.encode_utf8(&mut utf8).as_bytes());
            }
        }
    }
}

fn parse_head(head: &[u8]) -> Result<(Command, Vec<(String, String)>), BrokerError> {
    let head = std::str::from_utf8(head)
        .map_err(|_| BrokerError::Protocol("frame head is not UTF-8".into()))?;
    let mut lines = head
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line));

    let command_line = lines.next().unwrap_or_default();
    let command = Command::from_str(command_line)
        .map_err(|_| BrokerError::Protocol(format!("unknown command {command_line:?}")))?;

    let mut headers = Vec::new();
    for line in lines.filter(|line| !line.is_empty()) {
        let Some((name, value)) = line.split_once(':') else {
            return Err(BrokerError::Protocol(format!("malformed header {line:?}")));
        };
        if command.escapes_headers() {
            headers.push((unescape(name)?, unescape(value)?));
        } else {
            headers.push((name.to_string(), value.to_string()));
        }
    }
    Ok((command, headers))
}

impl Decoder for StompCodec {
    type Item = Frame;
    type Error = BrokerError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // Heart-beats and the optional EOLs trailing a frame.
        let skip = src.iter().take_while(|b| **b == EOL || **b == CR).count();
        src.advance(skip);
        if src.is_empty() {
            return Ok(None);
        }

        let Some((head_len, body_start)) = find_head_end(src) else {
            self.check_len(src.len())?;
            return Ok(None);
        };
        let (command, headers) = parse_head(&src[..head_len])?;

        let content_length = headers
            .iter()
            .find(|(name, _)| name == "content-length")
            .map(|(_, value)| {
                value.trim().parse::<usize>().map_err(|_| {
                    BrokerError::Protocol(format!("invalid content-length {value:?}"))
                })
            })
            .transpose()?;

        let body_len = match content_length {
            Some(len) => {
                let frame_len = body_start
                    .checked_add(len)
                    .and_then(|end| end.checked_add(1))
                    .ok_or_else(|| {
                        BrokerError::Protocol(format!("content-length {len} out of range"))
                    })?;
                self.check_len(frame_len)?;
                if src.len() < frame_len {
                    return Ok(None);
                }
                if src[body_start + len] != NUL {
                    return Err(BrokerError::Protocol(
                        "body not terminated after content-length".into(),
                    ));
                }
                len
            }
            None => match src[body_start..].iter().position(|b| *b == NUL) {
                Some(len) => len,
                None => {
                    self.check_len(src.len())?;
                    return Ok(None);
                }
            },
        };

        let mut raw = src.split_to(body_start + body_len + 1);
        raw.advance(body_start);
        raw.truncate(body_len);

        Ok(Some(Frame {
            command,
            headers,
            body: raw.freeze(),
        }))
    }
}

impl Encoder<Frame> for StompCodec {
    type Error = BrokerError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let command: &'static str = frame.command.into();
        dst.reserve(command.len() + frame.body.len() + 64);
        dst.put_slice(command.as_bytes());
        dst.put_u8(EOL);

        for (name, value) in frame
            .headers
            .iter()
            .filter(|(name, _)| name != "content-length")
        {
            if frame.command.escapes_headers() {
                put_escaped(dst, name);
                dst.put_u8(b':');
                put_escaped(dst, value);
            } else {
                dst.put_slice(name.as_bytes());
                dst.put_u8(b':');
                dst.put_slice(value.as_bytes());
            }
            dst.put_u8(EOL);
        }
        if !frame.body.is_empty() {
            dst.put_slice(format!("content-length:{}", frame.body.len()).as_bytes());
            dst.put_u8(EOL);
        }

        dst.put_u8(EOL);
        dst.put_slice(&frame.body);
        dst.put_u8(NUL);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::StompCodec;
    use crate::broker::stomp::frame::{Command, Frame};
    use crate::error::BrokerError;
    use bytes::BytesMut;
    use tokio_util::codec::{Decoder, Encoder};

    fn decode_all(codec: &mut StompCodec, wire: &[u8]) -> Vec<Frame> {
        let mut buf = BytesMut::from(wire);
        let mut frames = Vec::new();
        while let Some(frame) = codec.decode(&mut buf).expect("valid wire data") {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn decodes_message_terminated_by_nul() {
        let wire = b"MESSAGE\nsubscription:1\ndestination:/topic/scans\n\n{\"name\":\"start\"}\0";
        let frames = decode_all(&mut StompCodec::default(), wire);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].command, Command::Message);
        assert_eq!(frames[0].header("subscription"), Some("1"));
        assert_eq!(&frames[0].body[..], b"{\"name\":\"start\"}");
    }

    #[test]
    fn content_length_allows_embedded_nul() {
        let wire = b"MESSAGE\ncontent-length:5\n\na\0b\0c\0";
        let frames = decode_all(&mut StompCodec::default(), wire);

        assert_eq!(&frames[0].body[..], b"a\0b\0c");
    }

    #[test]
    fn skips_heartbeats_and_accepts_crlf() {
        let wire = b"\n\r\nRECEIPT\r\nreceipt-id:bye\r\n\r\n\0\n\nERROR\nmessage:oops\n\n\0";
        let frames = decode_all(&mut StompCodec::default(), wire);

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].command, Command::Receipt);
        assert_eq!(frames[0].header("receipt-id"), Some("bye"));
        assert_eq!(frames[1].command, Command::Error);
        assert_eq!(frames[1].error_message(), "oops");
    }

    #[test]
    fn partial_frame_waits_for_more_bytes() {
        let mut codec = StompCodec::default();
        let mut buf = BytesMut::from(&b"MESSAGE\nsubscription:1\n\npart"[..]);
        assert!(codec.decode(&mut buf).expect("incomplete is not an error").is_none());

        buf.extend_from_slice(b"ial\0");
        let frame = codec
            .decode(&mut buf)
            .expect("complete frame")
            .expect("frame available");
        assert_eq!(&frame.body[..], b"partial");
        assert!(buf.is_empty());
    }

    #[test]
    fn unescapes_headers_except_on_connected() {
        let wire = b"MESSAGE\ndestination:/topic/a\\cb\\\\c\\n\n\n\0CONNECTED\nserver:x\\cy\n\n\0";
        let frames = decode_all(&mut StompCodec::default(), wire);

        assert_eq!(frames[0].header("destination"), Some("/topic/a:b\\c\n"));
        assert_eq!(frames[1].header("server"), Some("x\\cy"));
    }

    #[test]
    fn rejects_bad_input() {
        let mut codec = StompCodec::default();

        let mut unknown = BytesMut::from(&b"HELLO\n\n\0"[..]);
        assert!(matches!(
            codec.decode(&mut unknown),
            Err(BrokerError::Protocol(_))
        ));

        let mut bad_escape = BytesMut::from(&b"MESSAGE\nx:\\t\n\n\0"[..]);
        assert!(matches!(
            codec.decode(&mut bad_escape),
            Err(BrokerError::Protocol(_))
        ));

        let mut bad_length = BytesMut::from(&b"MESSAGE\ncontent-length:2\n\nabc\0"[..]);
        assert!(matches!(
            codec.decode(&mut bad_length),
            Err(BrokerError::Protocol(_))
        ));
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let mut codec = StompCodec::new(16);
        let mut buf = BytesMut::from(&b"MESSAGE\n\n0123456789abcdef"[..]);

        assert!(matches!(
            codec.decode(&mut buf),
            Err(BrokerError::Protocol(_))
        ));
    }

    #[test]
    fn huge_content_length_is_rejected() {
        let mut codec = StompCodec::default();
        let mut buf =
            BytesMut::from(&b"MESSAGE\ncontent-length:18446744073709551615\n\nx\0"[..]);

        assert!(matches!(
            codec.decode(&mut buf),
            Err(BrokerError::Protocol(_))
        ));
    }

    #[test]
    fn content_length_beyond_limit_is_rejected_before_body_arrives() {
        let mut codec = StompCodec::new(64);
        let mut buf = BytesMut::from(&b"MESSAGE\ncontent-length:1000\n\nabc"[..]);

        assert!(matches!(
            codec.decode(&mut buf),
            Err(BrokerError::Protocol(_))
        ));
    }

    #[test]
    fn encodes_escaped_headers_and_content_length() {
        let mut codec = StompCodec::default();
        let mut dst = BytesMut::new();
        let frame = Frame::new(Command::Send)
            .with_header("destination", "/queue/a:b")
            .with_body("hi");

        codec.encode(frame, &mut dst).expect("encode");
        assert_eq!(
            &dst[..],
            b"SEND\ndestination:/queue/a\\cb\ncontent-length:2\n\nhi\0"
        );
    }

    #[test]
    fn connect_headers_are_not_escaped() {
        let mut codec = StompCodec::default();
        let mut dst = BytesMut::new();

        codec
            .encode(Frame::connect("localhost", "guest", "pa:ss"), &mut dst)
            .expect("encode");
        let wire = String::from_utf8(dst.to_vec()).expect("utf8");

        assert!(wire.starts_with("CONNECT\naccept-version:1.2\n"));
        assert!(wire.contains("passcode:pa:ss\n"));
        assert!(wire.contains("heart-beat:0,0\n"));
        assert!(wire.ends_with("\n\n\0"));
    }
}
