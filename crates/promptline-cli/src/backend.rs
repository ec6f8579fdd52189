//! Language backends shipped with the binary.
//!
//! Both share a small generic lexer: it tags comments, strings, numbers,
//! keywords, operators and brackets well enough for most expression
//! languages, and reports unbalanced brackets and unterminated strings as
//! diagnostics.

use std::io::{self, BufRead, BufReader, ErrorKind, Read, Write};
use std::process::{ChildStdin, Command, Stdio};
use std::thread;

use anyhow::{Context, Result, anyhow, bail};
use promptline_core::highlight::PLAIN_STYLE;
use promptline_core::{Backend, Diagnostic, HighlightToken};
use tracing::debug;

const KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "repeat", "in", "function", "fn", "return", "break", "next",
    "let", "TRUE", "FALSE", "NULL", "true", "false",
];

const OPERATOR_CHARS: &str = "+-*/%^<>=!&|:~$@?,;";

/// Echoes each submission back as its output.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoBackend;

impl Backend for EchoBackend {
    fn evaluate(&mut self, code: &str, _sink: &mut dyn FnMut(&str)) -> Result<String> {
        Ok(code.to_string())
    }

    fn highlight(&self, code: &str) -> Result<Vec<HighlightToken>> {
        Ok(highlight(code))
    }

    fn validate(&self, code: &str) -> Result<Vec<Diagnostic>> {
        Ok(validate(code))
    }
}

/// Pipes each submission into `sh -c <command>` and streams its stdout.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    command: String,
}

impl CommandBackend {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Backend for CommandBackend {
    fn evaluate(&mut self, code: &str, sink: &mut dyn FnMut(&str)) -> Result<String> {
        debug!(command = %self.command, "spawning evaluator");
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to spawn `{}`", self.command))?;

        let stdin = child.stdin.take().context("Evaluator stdin unavailable")?;
        let stdout = child.stdout.take().context("Evaluator stdout unavailable")?;
        let stderr = child.stderr.take().context("Evaluator stderr unavailable")?;

        // The child may fill any pipe before reading the next one, so stdin and
        // stderr get their own threads while stdout streams here.
        let (written, stderr) = thread::scope(|scope| -> Result<_> {
            let writer = scope.spawn(move || write_input(stdin, code));
            let reader = scope.spawn(move || {
                let mut buf = Vec::new();
                let mut stderr = stderr;
                stderr.read_to_end(&mut buf).map(|_| buf)
            });

            for line in BufReader::new(stdout).lines() {
                let line = line.context("Failed to read evaluator output")?;
                sink(&format!("{line}\n"));
            }

            let written = writer
                .join()
                .map_err(|_| anyhow!("Evaluator stdin writer panicked"))?;
            let stderr = reader
                .join()
                .map_err(|_| anyhow!("Evaluator stderr reader panicked"))?
                .context("Failed to read evaluator stderr")?;
            Ok((written, stderr))
        })?;

        let status = child.wait().context("Failed to wait for evaluator")?;
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            bail!("`{}` exited with {}: {}", self.command, status, stderr.trim());
        }
        written.context("Failed to write code to evaluator")?;
        Ok(String::new())
    }

    fn highlight(&self, code: &str) -> Result<Vec<HighlightToken>> {
        Ok(highlight(code))
    }

    fn validate(&self, code: &str) -> Result<Vec<Diagnostic>> {
        Ok(validate(code))
    }
}

/// Writes the whole submission and closes stdin. A child that exits without
/// reading all of it is not an error.
fn write_input(mut stdin: ChildStdin, code: &str) -> io::Result<()> {
    match stdin.write_all(code.as_bytes()) {
        Err(err) if err.kind() != ErrorKind::BrokenPipe => Err(err),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Plain,
    Comment,
    Str { terminated: bool },
    Number,
    Word,
    Operator,
    Bracket,
}

/// One lexeme as a byte range of the source.
#[derive(Debug, Clone, Copy)]
struct Lexeme {
    kind: Kind,
    start: usize,
    end: usize,
}

fn lex(code: &str) -> Vec<Lexeme> {
    let mut lexemes = Vec::new();
    let mut chars = code.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let kind = match c {
            '#' => {
                while chars.next_if(|&(_, c)| c != '\n').is_some() {}
                Kind::Comment
            }
            '"' | '\'' | '`' => {
                let mut terminated = false;
                let mut escaped = false;
                for (_, next) in chars.by_ref() {
                    if escaped {
                        escaped = false;
                    } else if next == '\\' {
                        escaped = true;
                    } else if next == c {
                        terminated = true;
                        break;
                    }
                }
                Kind::Str { terminated }
            }
            '0'..='9' => {
                while chars
                    .next_if(|&(_, c)| c.is_ascii_alphanumeric() || c == '.' || c == '_')
                    .is_some()
                {}
                Kind::Number
            }
            c if c.is_alphabetic() || c == '_' || c == '.' => {
                while chars
                    .next_if(|&(_, c)| c.is_alphanumeric() || c == '_' || c == '.')
                    .is_some()
                {}
                Kind::Word
            }
            '(' | ')' | '[' | ']' | '{' | '}' => Kind::Bracket,
            c if OPERATOR_CHARS.contains(c) => {
                while chars.next_if(|&(_, c)| OPERATOR_CHARS.contains(c)).is_some() {}
                Kind::Operator
            }
            ' ' => {
                while chars.next_if(|&(_, c)| c == ' ').is_some() {}
                Kind::Plain
            }
            _ => Kind::Plain,
        };
        let end = chars.peek().map_or(code.len(), |&(idx, _)| idx);
        lexemes.push(Lexeme { kind, start, end });
    }
    lexemes
}

/// Styled tokens covering `code` exactly.
pub fn highlight(code: &str) -> Vec<HighlightToken> {
    lex(code)
        .into_iter()
        .map(|lexeme| {
            let text = &code[lexeme.start..lexeme.end];
            let tag = match lexeme.kind {
                Kind::Plain => PLAIN_STYLE,
                Kind::Comment => "comment",
                Kind::Str { .. } => "string",
                Kind::Number => "number",
                Kind::Word if KEYWORDS.contains(&text) => "keyword",
                Kind::Word => "ident",
                Kind::Operator => "operator",
                Kind::Bracket => "bracket",
            };
            HighlightToken::new(tag, text)
        })
        .collect()
}

/// Bracket and string problems, as 1-based inclusive character positions.
pub fn validate(code: &str) -> Vec<Diagnostic> {
    let position = |byte: usize| code[..byte].chars().count() + 1;
    let mut diagnostics = Vec::new();
    let mut open: Vec<(char, usize)> = Vec::new();

    for lexeme in lex(code) {
        let start = position(lexeme.start);
        match lexeme.kind {
            Kind::Str { terminated: false } => {
                let end = position(lexeme.end) - 1;
                diagnostics.push(Diagnostic::new(start, end, "unterminated string"));
            }
            Kind::Bracket => {
                let Some(c) = code[lexeme.start..].chars().next() else {
                    continue;
                };
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    '}' => '{',
                    _ => {
                        open.push((c, start));
                        continue;
                    }
                };
                if open.last().is_some_and(|&(o, _)| o == expected) {
                    open.pop();
                } else {
                    diagnostics.push(Diagnostic::new(start, start, format!("unexpected `{c}`")));
                }
            }
            _ => {}
        }
    }

    for (c, start) in open {
        diagnostics.push(Diagnostic::new(start, start, format!("unclosed `{c}`")));
    }
    diagnostics.sort_by_key(|d| d.start);
    diagnostics
}
