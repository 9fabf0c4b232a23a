//! REPL command parsing

use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;
use std::str::FromStr;

use taskboard_core::task::TaskId;

/// Editable field in an `edit` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Title,
    Description,
    DueDate,
    Status,
    Progress,
}

impl FromStr for EditField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "title" => Ok(Self::Title),
            "desc" | "description" => Ok(Self::Description),
            "due" => Ok(Self::DueDate),
            "status" => Ok(Self::Status),
            "progress" => Ok(Self::Progress),
            other => Err(anyhow!("unknown field: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add {
        due_date: Option<NaiveDate>,
        title: String,
    },
    Edit {
        id: TaskId,
        changes: Vec<(EditField, String)>,
    },
    Delete(TaskId),
    Toggle(TaskId),
    Search(String),
    Filter(String),
    More,
    List,
    Help,
    Quit,
}

fn parse_id(raw: &str) -> Result<TaskId> {
    let raw = raw.trim().trim_start_matches('#');
    if raw.is_empty() {
        bail!("missing task id");
    }
    Ok(raw.parse::<TaskId>()?)
}

/// `key=value` pairs; a value runs until the next recognised `key=`.
fn parse_changes(rest: &str) -> Result<Vec<(EditField, String)>> {
    let mut changes: Vec<(EditField, String)> = Vec::new();
    for token in rest.split_whitespace() {
        let field = token
            .split_once('=')
            .and_then(|(key, value)| key.parse::<EditField>().ok().map(|f| (f, value)));
        if let Some((field, value)) = field {
            changes.push((field, value.to_string()));
            continue;
        }
        match changes.last_mut() {
            Some((_, value)) => {
                value.push(' ');
                value.push_str(token);
            }
            None => bail!("expected field=value, got {:?}", token),
        }
    }
    if changes.is_empty() {
        bail!("nothing to change");
    }
    Ok(changes)
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match cmd {
            "add" => {
                let (first, remainder) = rest.split_once(' ').unwrap_or((rest, ""));
                Ok(match NaiveDate::parse_from_str(first, "%Y-%m-%d") {
                    Ok(due_date) => Command::Add {
                        due_date: Some(due_date),
                        title: remainder.trim().to_string(),
                    },
                    Err(_) => Command::Add {
                        due_date: None,
                        title: rest.to_string(),
                    },
                })
            }
            "edit" => {
                let (id, changes) = rest.split_once(' ').unwrap_or((rest, ""));
                Ok(Command::Edit {
                    id: parse_id(id)?,
                    changes: parse_changes(changes)?,
                })
            }
            "delete" | "rm" => Ok(Command::Delete(parse_id(rest)?)),
            "toggle" | "done" => Ok(Command::Toggle(parse_id(rest)?)),
            "search" => Ok(Command::Search(rest.to_string())),
            "filter" => {
                if rest.is_empty() {
                    bail!("usage: filter <all|pending|in-progress|completed>");
                }
                Ok(Command::Filter(rest.to_string()))
            }
            "more" => Ok(Command::More),
            "list" | "ls" => Ok(Command::List),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(anyhow!("unknown command: {} (try `help`)", other)),
        }
    }
}
