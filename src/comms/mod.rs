//! Inter-robot messaging, core-facing side.
//!
//! Robots exchange single-line text messages of the form
//! `"<from> <command> <args...>"`. How the lines travel (socket, radio
//! bridge, bench harness) is the transport's problem; the core only parses
//! them and polls a [`MessageChannel`].

use std::str::FromStr;

use crossbeam_channel::{Receiver, TryRecvError};

use crate::error::{HelmError, Result};

/// A parsed inter-robot message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Hostname of the sending robot.
    pub from: String,
    /// Command verb, e.g. `goto` or `found`.
    pub command: String,
    /// Remaining whitespace-separated tokens.
    pub args: Vec<String>,
}

impl FromStr for Message {
    type Err = HelmError;

    fn from_str(line: &str) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        let from = tokens
            .next()
            .ok_or_else(|| HelmError::Message("empty message".into()))?;
        let command = tokens
            .next()
            .ok_or_else(|| HelmError::Message(format!("message from {} has no command", from)))?;
        Ok(Message {
            from: from.to_string(),
            command: command.to_string(),
            args: tokens.map(str::to_string).collect(),
        })
    }
}

/// Non-blocking receive side of a message transport.
pub trait MessageChannel {
    fn has_message(&self) -> bool;
    fn try_recv(&mut self) -> Result<Option<Message>>;
}

/// [`MessageChannel`] over a crossbeam channel of raw lines, for transports
/// that run their own receive thread.
pub struct LineChannel {
    rx: Receiver<String>,
}

impl LineChannel {
    pub fn new(rx: Receiver<String>) -> Self {
        Self { rx }
    }
}

impl MessageChannel for LineChannel {
    fn has_message(&self) -> bool {
        !self.rx.is_empty()
    }

    fn try_recv(&mut self) -> Result<Option<Message>> {
        match self.rx.try_recv() {
            Ok(line) => line.parse().map(Some),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                Err(HelmError::FeedClosed("message transport closed".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn test_parse_full_message() {
        let msg: Message = "rover2 goto 120 fast".parse().unwrap();
        assert_eq!(msg.from, "rover2");
        assert_eq!(msg.command, "goto");
        assert_eq!(msg.args, vec!["120", "fast"]);
    }

    #[test]
    fn test_parse_no_args() {
        let msg: Message = "rover1 stop".parse().unwrap();
        assert_eq!(msg.command, "stop");
        assert!(msg.args.is_empty());
    }

    #[test]
    fn test_parse_rejects_incomplete() {
        assert!("".parse::<Message>().is_err());
        assert!("   ".parse::<Message>().is_err());
        assert!("rover1".parse::<Message>().is_err());
    }

    #[test]
    fn test_line_channel_polling() {
        let (tx, rx) = bounded(4);
        let mut channel = LineChannel::new(rx);

        assert!(!channel.has_message());
        assert_eq!(channel.try_recv().unwrap(), None);

        tx.send("rover3 found teal".to_string()).unwrap();
        assert!(channel.has_message());
        let msg = channel.try_recv().unwrap().unwrap();
        assert_eq!(msg.from, "rover3");
        assert_eq!(msg.args, vec!["teal"]);

        drop(tx);
        assert!(channel.try_recv().is_err());
    }
}
