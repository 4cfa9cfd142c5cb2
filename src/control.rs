//! Textual control lines, as typed on the binary's stdin.

use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};

use crate::events::ViewerCommand;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlLine {
    Next,
    Previous,
    Random,
    Goto(isize),
    Find(String),
    Start {
        randomly: bool,
        start_at: Option<isize>,
    },
    Stop,
    Toggle,
    Endless(bool),
    State,
    Quit,
}

impl ControlLine {
    /// Command for lines that need no reply; `None` for `find`, `state` and `quit`.
    pub fn into_command(self) -> Option<ViewerCommand> {
        let command = match self {
            Self::Next => ViewerCommand::Next,
            Self::Previous => ViewerCommand::Previous,
            Self::Random => ViewerCommand::Random,
            Self::Goto(index) => ViewerCommand::SwitchTo(index),
            Self::Start { randomly, start_at } => {
                ViewerCommand::SlideshowStart { randomly, start_at }
            }
            Self::Stop => ViewerCommand::SlideshowStop,
            Self::Toggle => ViewerCommand::SlideshowToggle,
            Self::Endless(endless) => ViewerCommand::SetEndless(endless),
            Self::Find(_) | Self::State | Self::Quit => return None,
        };
        Some(command)
    }
}

impl FromStr for ControlLine {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or_else(|| anyhow!("empty command"))?;
        let parsed = match verb.to_ascii_lowercase().as_str() {
            "next" | "n" => Self::Next,
            "prev" | "previous" | "p" => Self::Previous,
            "random" | "r" => Self::Random,
            "goto" | "g" => {
                let raw = words.next().ok_or_else(|| anyhow!("goto needs an index"))?;
                Self::Goto(parse_index(raw)?)
            }
            "find" | "f" => {
                let name = words.collect::<Vec<_>>().join(" ");
                if name.is_empty() {
                    bail!("find needs an image name");
                }
                return Ok(Self::Find(name));
            }
            "start" => {
                let mut randomly = false;
                let mut start_at = None;
                for word in words.by_ref() {
                    if word.eq_ignore_ascii_case("random") {
                        randomly = true;
                    } else {
                        start_at = Some(parse_index(word)?);
                    }
                }
                Self::Start { randomly, start_at }
            }
            "stop" => Self::Stop,
            "toggle" | "t" => Self::Toggle,
            "endless" => match words.next() {
                Some("on") => Self::Endless(true),
                Some("off") => Self::Endless(false),
                other => bail!("endless expects on|off, got {other:?}"),
            },
            "state" | "s" => Self::State,
            "quit" | "q" | "exit" => Self::Quit,
            other => bail!("unknown command '{other}'"),
        };
        if let Some(extra) = words.next() {
            bail!("unexpected argument '{extra}'");
        }
        Ok(parsed)
    }
}

fn parse_index(raw: &str) -> Result<isize> {
    raw.parse()
        .with_context(|| format!("'{raw}' is not an image index"))
}
