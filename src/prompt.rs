//! Interactive questions behind a trait so the pipeline can run without a terminal.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::path::Path;

pub const PATH_QUESTION: &str = "Enter a file path:\n>";

pub fn overwrite_question(path: &Path) -> String {
    format!("The file {} already exists.\nReplace it? (Y/n)", path.display())
}

/// Something that can put a question to the user and return one line of answer.
pub trait Prompt {
    /// Returns the answer without its line terminator.
    fn ask(&mut self, question: &str) -> io::Result<String>;
}

/// Prompt over a reader/writer pair, usually stdin and stdout.
pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl Terminal<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompt for Terminal<R, W> {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        // EOF reads as an empty answer
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(strip_line_ending(line))
    }
}

fn strip_line_ending(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

/// Replays canned answers in order and records every question asked.
#[derive(Debug, Default)]
pub struct Scripted {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl Scripted {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Prompt for Scripted {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        self.asked.push(question.to_string());
        self.answers.pop_front().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("no scripted answer left for {:?}", question),
            )
        })
    }
}
