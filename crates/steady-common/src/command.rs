//! Line-oriented command language used by scripts and the REPL.
//!
//! ```text
//! goto https://example.com
//! click "button[type=submit]"
//! type #email "user@example.com"
//! wait visible .toast --timeout 5000
//! wait text h1 Welcome back
//! script return document.title
//! screenshot out.png
//! ```

use crate::protocol::Locator;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error("Missing {what} for '{command}'")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },
    #[error("Unexpected argument '{0}'")]
    UnexpectedArgument(String),
    #[error("Invalid value for --{flag}: {value}")]
    InvalidFlag { flag: String, value: String },
    #[error("Unknown wait condition: {0}")]
    UnknownWaitCondition(String),
    #[error("Unterminated {0} quote")]
    UnterminatedQuote(char),
    #[error("Empty input")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitCondition {
    Visible(Locator),
    Hidden(Locator),
    Clickable(Locator),
    /// Element text contains the expected string.
    Text(Locator, String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaitOptions {
    /// Overrides the configured wait timeout.
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    GoTo(String),
    Click(Locator),
    Type(Locator, String),
    Clear(Locator),
    Wait(WaitCondition, WaitOptions),
    Script(String),
    Screenshot(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Quoted(String),
    Flag(String),
}

impl Token {
    fn into_text(self) -> String {
        match self {
            Token::Word(s) | Token::Quoted(s) => s,
            Token::Flag(f) => format!("--{}", f),
        }
    }
}

type Tokens = std::vec::IntoIter<Token>;

struct Tokenizer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn consume_while<F>(&mut self, predicate: F) -> String
    where
        F: Fn(char) -> bool,
    {
        let mut result = String::new();
        while let Some(&c) = self.chars.peek() {
            if predicate(c) {
                result.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        result
    }

    fn parse_quoted(&mut self, quote_char: char) -> Result<String, ParseError> {
        let mut result = String::new();
        self.chars.next(); // opening quote

        let mut escaped = false;
        for c in self.chars.by_ref() {
            if escaped {
                result.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote_char {
                return Ok(result);
            } else {
                result.push(c);
            }
        }
        Err(ParseError::UnterminatedQuote(quote_char))
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}

        let c = *self.chars.peek()?;
        if c == '"' || c == '\'' {
            return Some(self.parse_quoted(c).map(Token::Quoted));
        }

        let word = self.consume_while(|c| !c.is_whitespace());
        match word.strip_prefix("--") {
            Some(flag) if !flag.is_empty() => Some(Ok(Token::Flag(flag.to_string()))),
            _ => Some(Ok(Token::Word(word))),
        }
    }
}

/// Parse a single command line.
pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    if head.is_empty() {
        return Err(ParseError::Empty);
    }

    match head.to_lowercase().as_str() {
        // Scripts are passed through verbatim so JS quoting survives.
        "script" | "js" => {
            if rest.is_empty() {
                return Err(ParseError::MissingArgument {
                    command: "script",
                    what: "script body",
                });
            }
            Ok(Command::Script(rest.to_string()))
        }
        "goto" | "navigate" | "visit" => {
            let mut tokens = tokenize(rest)?;
            let url = required(&mut tokens, "goto", "url")?;
            no_more(&mut tokens)?;
            Ok(Command::GoTo(url))
        }
        "click" => {
            let mut tokens = tokenize(rest)?;
            let locator = locator(&mut tokens, "click")?;
            no_more(&mut tokens)?;
            Ok(Command::Click(locator))
        }
        "type" | "fill" => {
            let mut tokens = tokenize(rest)?;
            let locator = locator(&mut tokens, "type")?;
            let text = remaining_text(tokens);
            if text.is_empty() {
                return Err(ParseError::MissingArgument {
                    command: "type",
                    what: "text",
                });
            }
            Ok(Command::Type(locator, text))
        }
        "clear" => {
            let mut tokens = tokenize(rest)?;
            let locator = locator(&mut tokens, "clear")?;
            no_more(&mut tokens)?;
            Ok(Command::Clear(locator))
        }
        "wait" => parse_wait(rest),
        "screenshot" | "snap" => {
            let mut tokens = tokenize(rest)?;
            let path = tokens.next().map(Token::into_text);
            no_more(&mut tokens)?;
            Ok(Command::Screenshot(path))
        }
        _ => Err(ParseError::UnknownCommand(head.to_string())),
    }
}

fn parse_wait(rest: &str) -> Result<Command, ParseError> {
    let mut options = WaitOptions::default();
    let mut tokens = Vec::new();
    let mut tokenizer = tokenize(rest)?;
    while let Some(token) = tokenizer.next() {
        match token {
            Token::Flag(flag) if flag == "timeout" => {
                let value = tokenizer
                    .next()
                    .map(Token::into_text)
                    .unwrap_or_default();
                let ms = value.parse::<u64>().map_err(|_| ParseError::InvalidFlag {
                    flag: flag.clone(),
                    value,
                })?;
                options.timeout_ms = Some(ms);
            }
            other => tokens.push(other),
        }
    }

    let mut tokens = tokens.into_iter();
    let kind = tokens
        .next()
        .map(Token::into_text)
        .ok_or(ParseError::MissingArgument {
            command: "wait",
            what: "condition",
        })?;
    let locator = tokens
        .next()
        .map(Token::into_text)
        .ok_or(ParseError::MissingArgument {
            command: "wait",
            what: "locator",
        })?
        .parse::<Locator>()
        .map_err(|_| ParseError::MissingArgument {
            command: "wait",
            what: "locator",
        })?;

    let condition = match kind.to_lowercase().as_str() {
        "visible" => WaitCondition::Visible(locator),
        "hidden" | "gone" => WaitCondition::Hidden(locator),
        "clickable" => WaitCondition::Clickable(locator),
        "text" => {
            let text = tokens.map(Token::into_text).collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                return Err(ParseError::MissingArgument {
                    command: "wait text",
                    what: "expected text",
                });
            }
            return Ok(Command::Wait(WaitCondition::Text(locator, text), options));
        }
        _ => return Err(ParseError::UnknownWaitCondition(kind)),
    };

    if let Some(extra) = tokens.next() {
        return Err(ParseError::UnexpectedArgument(extra.into_text()));
    }
    Ok(Command::Wait(condition, options))
}

/// Split `input` into tokens, failing on an unclosed quote.
fn tokenize(input: &str) -> Result<Tokens, ParseError> {
    Ok(Tokenizer::new(input)
        .collect::<Result<Vec<_>, _>>()?
        .into_iter())
}

fn required(
    tokens: &mut Tokens,
    command: &'static str,
    what: &'static str,
) -> Result<String, ParseError> {
    tokens
        .next()
        .map(Token::into_text)
        .filter(|s| !s.is_empty())
        .ok_or(ParseError::MissingArgument { command, what })
}

fn locator(tokens: &mut Tokens, command: &'static str) -> Result<Locator, ParseError> {
    required(tokens, command, "locator")?
        .parse()
        .map_err(|_| ParseError::MissingArgument {
            command,
            what: "locator",
        })
}

fn no_more(tokens: &mut Tokens) -> Result<(), ParseError> {
    match tokens.next() {
        Some(token) => Err(ParseError::UnexpectedArgument(token.into_text())),
        None => Ok(()),
    }
}

fn remaining_text(tokens: Tokens) -> String {
    tokens.map(Token::into_text).collect::<Vec<_>>().join(" ")
}
