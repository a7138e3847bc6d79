use anyhow::{bail, Context};
use radarcore::protocol::{Command, EncodedFrame};
use serde::{Deserialize, Serialize};

/// A command the controller sends just before the given tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledCommand {
    pub tick: u64,
    pub command: Command,
}

/// Scheduled commands, handed out in tick order.
pub struct CommandScript {
    pending: Vec<ScheduledCommand>,
    cursor: usize,
}

impl CommandScript {
    pub fn new(mut commands: Vec<ScheduledCommand>) -> Self {
        commands.sort_by_key(|entry| entry.tick);
        Self {
            pending: commands,
            cursor: 0,
        }
    }

    /// Frames due at or before `tick` that have not been handed out yet.
    pub fn due(&mut self, tick: u64) -> Vec<EncodedFrame> {
        let start = self.cursor;
        while self.cursor < self.pending.len() && self.pending[self.cursor].tick <= tick {
            self.cursor += 1;
        }
        self.pending[start..self.cursor]
            .iter()
            .map(|entry| entry.command.encode())
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.pending.len() - self.cursor
    }
}

/// Parses bytes written as hex pairs, e.g. `"FD FC FB FA 02 00"`.
pub fn parse_hex(text: &str) -> anyhow::Result<Vec<u8>> {
    let digits: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        bail!("invalid hex digit '{}' in '{}'", bad, text);
    }
    if digits.len() % 2 != 0 {
        bail!("odd number of hex digits in '{}'", text);
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .with_context(|| format!("invalid hex byte '{}'", &digits[i..i + 2]))
        })
        .collect()
}

pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{:02X}", byte))
        .collect::<Vec<_>>()
        .join(" ")
}
