//! ChatGLM3 assistant-output parsing.
//!
//! The model separates assistant turns with `<|assistant|>`. Each turn starts
//! with a metadata line: empty for ordinary replies, or the tool name when the
//! model decides to call a tool. In the tool case the body is a fenced
//! `tool_call(key=value, ...)` expression.

use glm_engine::{
    ChatMessage, EngineError, Resolution, ResolvedContent, ResponseProcessor, Result, Role,
};
use serde_json::{json, Map, Number, Value};

const ASSISTANT_TOKEN: &str = "<|assistant|>";
const TRAINING_TIME_PLACEHOLDER: &str = "[[训练时间]]";
const TRAINING_TIME: &str = "2023年";

/// Resolver for ChatGLM3-formatted output.
#[derive(Debug, Clone, Default)]
pub struct Glm3ResponseProcessor;

impl Glm3ResponseProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl ResponseProcessor for Glm3ResponseProcessor {
    fn resolve(&self, text: &str, mut history: Vec<ChatMessage>) -> Result<Resolution> {
        let has_tools = history
            .first()
            .map(|m| m.role == Role::System && m.tools.is_some())
            .unwrap_or(false);

        let mut content = ResolvedContent::Text(String::new());
        for segment in text.split(ASSISTANT_TOKEN) {
            if segment.trim().is_empty() {
                continue;
            }
            // A segment without a newline has no metadata line.
            let (metadata, body) = segment.split_once('\n').unwrap_or(("", segment));
            let name = metadata.trim();

            if name.is_empty() {
                let body = body.trim();
                history.push(ChatMessage::assistant(body).with_metadata(metadata));
                content = ResolvedContent::Text(body.replace(TRAINING_TIME_PLACEHOLDER, TRAINING_TIME));
            } else {
                history.push(ChatMessage::assistant(body).with_metadata(metadata));
                content = if has_tools {
                    let parameters = parse_tool_call(&strip_fence(body))?;
                    ResolvedContent::Call(json!({ "name": name, "parameters": parameters }))
                } else {
                    ResolvedContent::Call(json!({ "name": name, "content": body }))
                };
            }
        }

        Ok(Resolution { content, history })
    }
}

/// Drop the first and last lines of a fenced block.
fn strip_fence(body: &str) -> String {
    let lines: Vec<&str> = body.split('\n').collect();
    if lines.len() < 2 {
        return String::new();
    }
    lines[1..lines.len() - 1].join("\n")
}

/// Parse `tool_call(k=v, ...)` into a JSON object of its keyword arguments.
pub fn parse_tool_call(source: &str) -> Result<Map<String, Value>> {
    let trimmed = source.trim();
    let args = trimmed
        .strip_prefix("tool_call")
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix('('))
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| processing(format!("expected tool_call(...), got {trimmed:?}")))?;

    KwargParser::new(args).kwargs()
}

fn processing(msg: String) -> EngineError {
    EngineError::Processing(msg)
}

/// Recursive-descent parser for Python-style keyword arguments.
struct KwargParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> KwargParser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, want: char) -> Result<()> {
        self.skip_ws();
        match self.bump() {
            Some(c) if c == want => Ok(()),
            other => Err(processing(format!(
                "expected {want:?} at offset {}, found {other:?}",
                self.pos
            ))),
        }
    }

    fn kwargs(&mut self) -> Result<Map<String, Value>> {
        let mut out = Map::new();
        loop {
            self.skip_ws();
            if self.peek().is_none() {
                return Ok(out);
            }
            let key = self.ident()?;
            self.expect('=')?;
            let value = self.value()?;
            out.insert(key, value);

            self.skip_ws();
            match self.bump() {
                None => return Ok(out),
                Some(',') => continue,
                Some(c) => {
                    return Err(processing(format!(
                        "unexpected {c:?} after argument at offset {}",
                        self.pos
                    )))
                }
            }
        }
    }

    fn ident(&mut self) -> Result<String> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.bump();
        }
        if start == self.pos {
            return Err(processing(format!("expected identifier at offset {start}")));
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn value(&mut self) -> Result<Value> {
        self.skip_ws();
        match self.peek() {
            Some(q @ ('"' | '\'')) => self.string(q).map(Value::String),
            Some('[') => self.sequence(']'),
            Some('(') => self.sequence(')'),
            Some('{') => self.dict(),
            Some(c) if c == '-' || c == '+' || c.is_ascii_digit() => self.number(),
            Some(c) if c.is_alphabetic() => match self.ident()?.as_str() {
                "True" => Ok(Value::Bool(true)),
                "False" => Ok(Value::Bool(false)),
                "None" => Ok(Value::Null),
                other => Err(processing(format!("unsupported literal {other:?}"))),
            },
            other => Err(processing(format!(
                "unexpected {other:?} at offset {}",
                self.pos
            ))),
        }
    }

    fn string(&mut self, quote: char) -> Result<String> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(processing("unterminated string literal".to_string())),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => self.escape(&mut out)?,
                Some(c) => out.push(c),
            }
        }
    }

    /// Decode the escape sequence after a backslash, Python style.
    ///
    /// Unrecognized escapes keep their backslash.
    fn escape(&mut self, out: &mut String) -> Result<()> {
        let c = self
            .bump()
            .ok_or_else(|| processing("dangling escape".to_string()))?;
        match c {
            '\n' => {}
            '\\' | '\'' | '"' => out.push(c),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'v' => out.push('\u{0b}'),
            'x' => out.push(self.code_point(2)?),
            'u' => out.push(self.code_point(4)?),
            'U' => out.push(self.code_point(8)?),
            '0'..='7' => {
                let mut code = c.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            self.bump();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(code).ok_or_else(|| {
                    processing(format!("invalid octal escape {code:o}"))
                })?);
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    /// Exactly `digits` hex digits naming a Unicode scalar value.
    fn code_point(&mut self, digits: usize) -> Result<char> {
        let start = self.pos;
        let hex: String = self.rest().chars().take(digits).collect();
        if hex.len() != digits || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(processing(format!("truncated escape at offset {start}")));
        }
        self.pos += digits;
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| processing(format!("invalid code point \\u{{{hex}}}")))
    }

    /// A list or tuple; both become JSON arrays.
    fn sequence(&mut self, close: char) -> Result<Value> {
        self.bump();
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.bump();
                return Ok(Value::Array(items));
            }
            items.push(self.value()?);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(c) if c == close => return Ok(Value::Array(items)),
                other => return Err(processing(format!("unexpected {other:?} in sequence"))),
            }
        }
    }

    /// A dict literal with string keys.
    fn dict(&mut self) -> Result<Value> {
        self.bump();
        let mut entries = Map::new();
        loop {
            self.skip_ws();
            let key = match self.peek() {
                Some('}') => {
                    self.bump();
                    return Ok(Value::Object(entries));
                }
                Some(q @ ('"' | '\'')) => self.string(q)?,
                other => {
                    return Err(processing(format!(
                        "expected string key at offset {}, found {other:?}",
                        self.pos
                    )))
                }
            };
            self.expect(':')?;
            let value = self.value()?;
            entries.insert(key, value);

            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(Value::Object(entries)),
                other => return Err(processing(format!("unexpected {other:?} in dict"))),
            }
        }
    }

    fn number(&mut self) -> Result<Value> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E' | '_'))
        {
            self.bump();
        }
        let literal = self.src[start..self.pos].replace('_', "");
        if let Ok(int) = literal.parse::<i64>() {
            return Ok(Value::Number(int.into()));
        }
        literal
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| processing(format!("invalid number {literal:?}")))
    }
}
