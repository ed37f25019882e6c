//! STOMP frame model.

use bytes::Bytes;
use strum::{Display, EnumString, IntoStaticStr};

pub const ACCEPT_VERSION: &str = "1.2";

#[derive(Clone, Copy, Debug, Display, EnumString, IntoStaticStr, PartialEq, Eq, Hash)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    Connect,
    Stomp,
    Connected,
    Send,
    Subscribe,
    Unsubscribe,
    Ack,
    Nack,
    Begin,
    Commit,
    Abort,
    Disconnect,
    Message,
    Receipt,
    Error,
}

impl Command {
    /// Header values of the connection handshake frames are sent raw.
    pub fn escapes_headers(self) -> bool {
        !matches!(self, Command::Connect | Command::Connected)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub command: Command,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Frame {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Looks up a header. When a header repeats, the first occurrence wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn connect(host: &str, login: &str, passcode: &str) -> Self {
        Frame::new(Command::Connect)
            .with_header("accept-version", ACCEPT_VERSION)
            .with_header("host", host)
            .with_header("login", login)
            .with_header("passcode", passcode)
            .with_header("heart-beat", "0,0")
    }

    pub fn subscribe(destination: &str, id: &str) -> Self {
        Frame::new(Command::Subscribe)
            .with_header("id", id)
            .with_header("destination", destination)
            .with_header("ack", "auto")
    }

    pub fn disconnect(receipt: &str) -> Self {
        Frame::new(Command::Disconnect).with_header("receipt", receipt)
    }

    /// Human-readable reason carried by an ERROR frame.
    pub fn error_message(&self) -> String {
        match self.header("message") {
            Some(message) => message.to_string(),
            None => String::from_utf8_lossy(&self.body).into_owned(),
        }
    }
}
