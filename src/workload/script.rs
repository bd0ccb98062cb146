//! Command Scripts
//!
//! A line-oriented format for replaying a session against a `Yodelr`:
//!
//! ```text
//! # comments and blank lines are skipped
//! add_user alice
//! add_post alice 4 #post is posted
//! posts_for_topic post
//! trending 0 9
//! delete_user alice
//! ```
//!
//! Everything after the timestamp of `add_post` is the post text, kept
//! verbatim.

use super::{WorkloadError, WorkloadResult};
use crate::service::Yodelr;
use crate::storage::{Timestamp, YodelrError};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till1},
    character::complete::{char, digit1, multispace1, satisfy},
    combinator::{all_consuming, eof, map_res, opt, peek, recognize, rest, value},
    sequence::{pair, preceded, terminated},
    IResult,
};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// One scripted call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    AddUser { user: String },
    AddPost { user: String, timestamp: Timestamp, text: String },
    DeleteUser { user: String },
    PostsForUser { user: String },
    PostsForTopic { topic: String },
    Trending { from: Timestamp, to: Timestamp },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddUser { .. } => "add_user",
            Command::AddPost { .. } => "add_post",
            Command::DeleteUser { .. } => "delete_user",
            Command::PostsForUser { .. } => "posts_for_user",
            Command::PostsForTopic { .. } => "posts_for_topic",
            Command::Trending { .. } => "trending",
        }
    }

    /// Run the command against a service
    pub fn execute<Y: Yodelr + ?Sized>(&self, yodelr: &Y) -> Result<CommandOutput, YodelrError> {
        match self {
            Command::AddUser { user } => yodelr.add_user(user).map(|_| CommandOutput::Done),
            Command::AddPost {
                user,
                timestamp,
                text,
            } => yodelr
                .add_post(user, text, *timestamp)
                .map(|_| CommandOutput::Done),
            Command::DeleteUser { user } => yodelr.delete_user(user).map(|_| CommandOutput::Done),
            Command::PostsForUser { user } => yodelr.get_posts_for_user(user).map(CommandOutput::Posts),
            Command::PostsForTopic { topic } => {
                yodelr.get_posts_for_topic(topic).map(CommandOutput::Posts)
            }
            Command::Trending { from, to } => yodelr
                .get_trending_topics(*from, *to)
                .map(CommandOutput::Topics),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::AddUser { user } | Command::DeleteUser { user } | Command::PostsForUser { user } => {
                write!(f, "{} {}", self.name(), user)
            }
            Command::AddPost {
                user,
                timestamp,
                text,
            } => write!(f, "add_post {} {} {}", user, timestamp, text),
            Command::PostsForTopic { topic } => write!(f, "posts_for_topic {}", topic),
            Command::Trending { from, to } => write!(f, "trending {} {}", from, to),
        }
    }
}

/// Verb at the start of a script line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    AddUser,
    AddPost,
    DeleteUser,
    PostsForUser,
    PostsForTopic,
    Trending,
}

fn is_separator(c: char) -> bool {
    c.is_whitespace()
}

/// Parse the first whitespace-delimited word of a line
fn parse_verb_word(input: &str) -> IResult<&str, &str> {
    take_till1(is_separator)(input)
}

/// Match a whole word against the known verbs
fn parse_verb(word: &str) -> IResult<&str, Verb> {
    all_consuming(alt((
        value(Verb::AddUser, tag("add_user")),
        value(Verb::AddPost, tag("add_post")),
        value(Verb::DeleteUser, tag("delete_user")),
        value(Verb::PostsForUser, tag("posts_for_user")),
        value(Verb::PostsForTopic, tag("posts_for_topic")),
        value(Verb::Trending, tag("trending")),
    )))(word)
}

/// Parse a separated argument word (user or topic)
fn parse_word(input: &str) -> IResult<&str, &str> {
    preceded(multispace1, take_till1(is_separator))(input)
}

/// Parse a separated, optionally negative, integer timestamp
fn parse_timestamp(input: &str) -> IResult<&str, Timestamp> {
    preceded(
        multispace1,
        terminated(
            map_res(recognize(pair(opt(char('-')), digit1)), str::parse::<Timestamp>),
            peek(alt((multispace1, eof))),
        ),
    )(input)
}

/// Parse post text: one separator, then the rest of the line verbatim
fn parse_text(input: &str) -> IResult<&str, &str> {
    alt((eof, preceded(satisfy(is_separator), rest)))(input)
}

fn first_token(input: &str) -> Option<&str> {
    input.split_whitespace().next()
}

/// Run one argument parser, describing a failure by the argument's role
fn expect<'a, O, F>(input: &'a str, mut parser: F, what: &str) -> Result<(&'a str, O), String>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    parser(input).map_err(|_| match first_token(input) {
        None => format!("missing {}", what),
        Some(token) => format!("invalid {} '{}'", what, token),
    })
}

/// Parse one command, returning the unconsumed input
fn parse_command(input: &str) -> Result<(&str, Command), String> {
    let (input, word) = expect(input, parse_verb_word, "command")?;
    let verb = match parse_verb(word) {
        Ok((_, verb)) => verb,
        Err(_) => return Err(format!("unknown command '{}'", word)),
    };

    let parsed = match verb {
        Verb::AddUser | Verb::DeleteUser | Verb::PostsForUser => {
            let (input, user) = expect(input, parse_word, "user")?;
            let user = user.to_string();
            let command = match verb {
                Verb::AddUser => Command::AddUser { user },
                Verb::DeleteUser => Command::DeleteUser { user },
                _ => Command::PostsForUser { user },
            };
            (input, command)
        }
        Verb::AddPost => {
            let (input, user) = expect(input, parse_word, "user")?;
            let (input, timestamp) = expect(input, parse_timestamp, "timestamp")?;
            let (input, text) = expect(input, parse_text, "post text")?;
            (
                input,
                Command::AddPost {
                    user: user.to_string(),
                    timestamp,
                    text: text.to_string(),
                },
            )
        }
        Verb::PostsForTopic => {
            let (input, topic) = expect(input, parse_word, "topic")?;
            (
                input,
                Command::PostsForTopic {
                    topic: topic.to_string(),
                },
            )
        }
        Verb::Trending => {
            let (input, from) = expect(input, parse_timestamp, "start timestamp")?;
            let (input, to) = expect(input, parse_timestamp, "end timestamp")?;
            (input, Command::Trending { from, to })
        }
    };

    Ok(parsed)
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (remaining, command) = parse_command(line.trim_start())?;

        match first_token(remaining) {
            None => Ok(command),
            Some(extra) => Err(format!(
                "unexpected argument '{}' for {}",
                extra,
                command.name()
            )),
        }
    }
}

/// Parse a whole script, keeping 1-based line numbers
pub fn parse_script(script: &str) -> WorkloadResult<Vec<(usize, Command)>> {
    let mut commands = Vec::new();

    for (idx, raw) in script.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let command = raw
            .trim_start()
            .parse()
            .map_err(|message| WorkloadError::Parse {
                line: idx + 1,
                message,
            })?;
        commands.push((idx + 1, command));
    }

    Ok(commands)
}

/// What a successful command produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum CommandOutput {
    Done,
    Posts(Vec<String>),
    Topics(Vec<String>),
}

/// Outcome of one replayed command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    pub line: usize,
    pub command: Command,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<CommandOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of replaying a script
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplayReport {
    pub results: Vec<CommandResult>,
    pub failed: usize,
}

impl ReplayReport {
    pub fn succeeded(&self) -> usize {
        self.results.len() - self.failed
    }
}

/// Execute parsed commands in order
///
/// Rejections for unknown users are recorded on the command and replay
/// continues. Any other error aborts the replay.
pub fn replay<Y: Yodelr + ?Sized>(
    yodelr: &Y,
    commands: Vec<(usize, Command)>,
) -> WorkloadResult<ReplayReport> {
    let mut report = ReplayReport::default();

    for (line, command) in commands {
        let (output, error) = match command.execute(yodelr) {
            Ok(output) => (Some(output), None),
            Err(e @ YodelrError::UnknownUser(_)) => {
                tracing::debug!(line, command = %command, error = %e, "Command rejected");
                report.failed += 1;
                (None, Some(e.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        report.results.push(CommandResult {
            line,
            command,
            output,
            error,
        });
    }

    tracing::info!(
        commands = report.results.len(),
        failed = report.failed,
        "Script replayed"
    );
    Ok(report)
}
