//! Recursive-descent parser from tokens to a block AST.
//!
//! Grammar (informal):
//! ```text
//! document  = node*
//! node      = TEXT | var | each | if
//! var       = "{{" PATH "}}"
//! each      = "{{#each" PATH "}}" node* "{{/each}}"
//! if        = "{{#if" cond "}}" node* ("{{else}}" node*)? "{{/if}}"
//! cond      = PATH | "(" "eq" PATH QUOTED ")"
//! ```
//!
//! In strict mode any structural problem is an error. In lenient mode the
//! offending tag is kept as literal text and parsing continues.

use crate::lexer::{Token, tokenize};
use crate::TemplateError;

/// A parsed template node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Var(String),
    Each {
        path: String,
        body: Vec<Node>,
    },
    If {
        condition: Condition,
        then_branch: Vec<Node>,
        else_branch: Vec<Node>,
    },
}

/// An `{{#if}}` condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `{{#if path}}`
    Truthy(String),
    /// `{{#if (eq path "literal")}}`
    Eq { path: String, literal: String },
}

enum TagKind<'a> {
    Var(&'a str),
    EachOpen(&'a str),
    IfOpen(&'a str),
    EachClose,
    IfClose,
    Else,
    /// Unknown `#`/`/` helper; rendered verbatim.
    Literal,
}

fn classify(inner: &str) -> TagKind<'_> {
    match inner {
        "else" => return TagKind::Else,
        "/each" => return TagKind::EachClose,
        "/if" => return TagKind::IfClose,
        _ => {}
    }
    if let Some(path) = block_argument(inner, "#each") {
        return TagKind::EachOpen(path);
    }
    if let Some(cond) = block_argument(inner, "#if") {
        return TagKind::IfOpen(cond);
    }
    if inner.starts_with('#') || inner.starts_with('/') {
        return TagKind::Literal;
    }
    TagKind::Var(inner)
}

/// `"#each items"` with keyword `"#each"` → `Some("items")`.
fn block_argument<'a>(inner: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = inner.strip_prefix(keyword)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let arg = rest.trim();
    (!arg.is_empty()).then_some(arg)
}

fn parse_condition(source: &str) -> Option<Condition> {
    let Some(inner) = source.strip_prefix('(') else {
        return Some(Condition::Truthy(source.to_string()));
    };
    let inner = inner.strip_suffix(')')?.trim();
    let rest = inner.strip_prefix("eq")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let (path, literal) = rest.trim_start().split_once(char::is_whitespace)?;
    let literal = literal.trim();
    let literal = literal.strip_prefix('"')?.strip_suffix('"')?;
    Some(Condition::Eq {
        path: path.to_string(),
        literal: literal.to_string(),
    })
}

/// How a node sequence ended.
enum End<'a> {
    Eof,
    EachClose { raw: &'a str, offset: usize },
    IfClose { raw: &'a str, offset: usize },
    Else { raw: &'a str, offset: usize },
}

impl<'a> End<'a> {
    fn tag(&self) -> Option<(&'a str, usize)> {
        match *self {
            End::Eof => None,
            End::EachClose { raw, offset }
            | End::IfClose { raw, offset }
            | End::Else { raw, offset } => Some((raw, offset)),
        }
    }
}

pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    strict: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, strict: bool) -> Self {
        Self {
            tokens: tokenize(source),
            pos: 0,
            strict,
        }
    }

    pub fn parse_document(&mut self) -> Result<Vec<Node>, TemplateError> {
        let mut out = Vec::new();
        loop {
            let (mut nodes, end) = self.parse_sequence()?;
            out.append(&mut nodes);
            match end.tag() {
                None => return Ok(out),
                Some((raw, offset)) => self.stray(raw, offset, &mut out)?,
            }
        }
    }

    /// Parse nodes until EOF or a closing/else tag.
    fn parse_sequence(&mut self) -> Result<(Vec<Node>, End<'a>), TemplateError> {
        let mut nodes = Vec::new();

        while let Some(token) = self.tokens.get(self.pos).cloned() {
            self.pos += 1;
            match token {
                Token::Text(text) => nodes.push(Node::Text(text.to_string())),
                Token::Unterminated { raw, offset } => {
                    if self.strict {
                        return Err(TemplateError::UnterminatedTag { offset });
                    }
                    nodes.push(Node::Text(raw.to_string()));
                }
                Token::Tag { raw, inner, offset } => match classify(inner) {
                    TagKind::Var(path) => nodes.push(Node::Var(path.to_string())),
                    TagKind::Literal => nodes.push(Node::Text(raw.to_string())),
                    TagKind::EachOpen(path) => nodes.extend(self.parse_each(path, raw, offset)?),
                    TagKind::IfOpen(cond) => nodes.extend(self.parse_if(cond, raw, offset)?),
                    TagKind::EachClose => return Ok((nodes, End::EachClose { raw, offset })),
                    TagKind::IfClose => return Ok((nodes, End::IfClose { raw, offset })),
                    TagKind::Else => return Ok((nodes, End::Else { raw, offset })),
                },
            }
        }

        Ok((nodes, End::Eof))
    }

    fn parse_each(&mut self, path: &str, open_raw: &str, open_offset: usize) -> Result<Vec<Node>, TemplateError> {
        let mut body = Vec::new();
        loop {
            let (mut nodes, end) = self.parse_sequence()?;
            body.append(&mut nodes);
            match end {
                End::EachClose { .. } => {
                    return Ok(vec![Node::Each {
                        path: path.to_string(),
                        body,
                    }]);
                }
                End::Eof => {
                    if self.strict {
                        return Err(TemplateError::UnclosedBlock {
                            block: "each",
                            offset: open_offset,
                        });
                    }
                    let mut out = vec![Node::Text(open_raw.to_string())];
                    out.append(&mut body);
                    return Ok(out);
                }
                End::IfClose { raw, offset } | End::Else { raw, offset } => {
                    self.stray(raw, offset, &mut body)?;
                }
            }
        }
    }

    fn parse_if(&mut self, source: &str, open_raw: &str, open_offset: usize) -> Result<Vec<Node>, TemplateError> {
        let condition = match parse_condition(source) {
            Some(c) => c,
            None if self.strict => {
                return Err(TemplateError::InvalidCondition {
                    condition: source.to_string(),
                    offset: open_offset,
                });
            }
            // An unparseable condition looks up a path that never exists.
            None => Condition::Truthy(source.to_string()),
        };

        let mut then_branch = Vec::new();
        let mut else_part: Option<(&'a str, Vec<Node>)> = None;

        loop {
            let (mut nodes, end) = self.parse_sequence()?;
            match else_part.as_mut() {
                Some((_, branch)) => branch.append(&mut nodes),
                None => then_branch.append(&mut nodes),
            }
            match end {
                End::IfClose { .. } => {
                    return Ok(vec![Node::If {
                        condition,
                        then_branch,
                        else_branch: else_part.map(|(_, b)| b).unwrap_or_default(),
                    }]);
                }
                End::Else { raw, offset } => match else_part.as_mut() {
                    None => else_part = Some((raw, Vec::new())),
                    Some((_, branch)) => self.stray(raw, offset, branch)?,
                },
                End::EachClose { raw, offset } => {
                    let target = match else_part.as_mut() {
                        Some((_, branch)) => branch,
                        None => &mut then_branch,
                    };
                    self.stray(raw, offset, target)?;
                }
                End::Eof => {
                    if self.strict {
                        return Err(TemplateError::UnclosedBlock {
                            block: "if",
                            offset: open_offset,
                        });
                    }
                    let mut out = vec![Node::Text(open_raw.to_string())];
                    out.append(&mut then_branch);
                    if let Some((else_raw, mut branch)) = else_part {
                        out.push(Node::Text(else_raw.to_string()));
                        out.append(&mut branch);
                    }
                    return Ok(out);
                }
            }
        }
    }

    /// A tag that is not valid where it appears.
    fn stray(&self, raw: &str, offset: usize, into: &mut Vec<Node>) -> Result<(), TemplateError> {
        if self.strict {
            return Err(TemplateError::UnexpectedTag {
                tag: raw.to_string(),
                offset,
            });
        }
        into.push(Node::Text(raw.to_string()));
        Ok(())
    }
}
