//! Markup parser.
//!
//! Utilizes a Lexer to receive instances of Token and Region, which it uses
//! to construct a tree of Node instances by recursive descent.
pub mod tree;

use self::tree::{Attribute, Call, Element, Node};
use super::lex::{token::Token, Lexer, TokenResult};
use crate::{
    log::{error_eof, expected_token, Error, ErrorKind, INVALID_SYNTAX, UNEXPECTED_TOKEN},
    region::Region,
};
use morel::Finder;

pub struct Parser<'source> {
    /// Lexer used to pull from source as tokens instead of raw text.
    lexer: Lexer<'source>,
    /// Store peeked tokens.
    ///
    /// Double option is used to remember when the next token is None.
    buffer: Option<Option<(Token, Region)>>,
}

impl<'source> Parser<'source> {
    /// Create a new Parser from the given source.
    #[inline]
    pub fn new(source: &'source str, finder: &'source Finder) -> Self {
        Self {
            lexer: Lexer::new(source, finder),
            buffer: None,
        }
    }

    /// Parse the whole source.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the markup is malformed, such as a tag that
    /// is never closed or closed with the wrong name.
    pub fn compile(mut self) -> Result<Vec<Node>, Error> {
        self.parse_nodes(None)
    }

    /// Parse nodes until the closing tag of the parent, or until the end of
    /// source when there is no parent.
    fn parse_nodes(&mut self, parent: Option<&Element>) -> Result<Vec<Node>, Error> {
        let mut nodes = vec![];

        loop {
            let Some((token, region)) = self.next()? else {
                return match parent {
                    None => Ok(nodes),
                    Some(parent) => {
                        let name = &self.lexer.source[parent.name];

                        Err(Error::new(ErrorKind::InvalidSyntax, INVALID_SYNTAX)
                            .with_pointer(self.lexer.source, parent.region)
                            .with_help(format!("did you close the `{name}` tag with `</{name}>`?")))
                    }
                };
            };

            let node = match token {
                Token::Text => Node::Text(region),
                Token::BeginCall => Node::Call(self.parse_call(region)?),
                Token::BeginTag => Node::Element(self.parse_element(region)?),
                Token::BeginCloseTag => {
                    self.parse_close_tag(region, parent)?;

                    return Ok(nodes);
                }
                received => {
                    return Err(Error::new(ErrorKind::InvalidSyntax, UNEXPECTED_TOKEN)
                        .with_pointer(self.lexer.source, region)
                        .with_help(expected_token("text, a tag or a call", received)))
                }
            };
            nodes.push(node);
        }
    }

    /// Parse an element, beginning after the `<`.
    ///
    /// Children are parsed recursively until the matching closing tag.
    fn parse_element(&mut self, begin: Region) -> Result<Element, Error> {
        // from
        // |
        // <Card title="x" :user="user.name">
        //   ...
        // </Card>
        let (_, name) = self.next_must(Token::Identifier)?;
        let mut attributes = vec![];

        loop {
            match self.next_any_must()? {
                (Token::EndSelfClose, end) => {
                    return Ok(Element {
                        name,
                        attributes,
                        children: vec![],
                        region: begin.combine(end),
                    });
                }
                (Token::EndTag, end) => {
                    let mut element = Element {
                        name,
                        attributes,
                        children: vec![],
                        region: begin.combine(end),
                    };
                    element.children = self.parse_nodes(Some(&element))?;

                    return Ok(element);
                }
                (Token::Colon, colon) => {
                    let (_, name) = self.next_must(Token::Identifier)?;
                    attributes.push(self.parse_attribute(colon, name, true)?);
                }
                (Token::Identifier, name) => {
                    attributes.push(self.parse_attribute(name, name, false)?);
                }
                (received, region) => {
                    return Err(Error::new(ErrorKind::InvalidSyntax, UNEXPECTED_TOKEN)
                        .with_pointer(self.lexer.source, region)
                        .with_help(expected_token("an attribute, `>` or `/>`", received)))
                }
            }
        }
    }

    /// Parse the optional `="value"` part of an attribute.
    fn parse_attribute(
        &mut self,
        begin: Region,
        name: Region,
        bound: bool,
    ) -> Result<Attribute, Error> {
        if !self.next_is(Token::Assign)? {
            return Ok(Attribute {
                name,
                value: None,
                bound,
                region: begin.combine(name),
            });
        }
        self.next()?;
        let (_, string) = self.next_must(Token::String)?;

        Ok(Attribute {
            name,
            // Strip the quotes, which are always one byte.
            value: Some(Region::new(string.begin + 1..string.end - 1)),
            bound,
            region: begin.combine(string),
        })
    }

    /// Parse a closing tag, beginning after the `</`, and check it against
    /// the open parent.
    fn parse_close_tag(&mut self, begin: Region, parent: Option<&Element>) -> Result<(), Error> {
        let (_, name) = self.next_must(Token::Identifier)?;
        let (_, end) = self.next_must(Token::EndTag)?;
        let region = begin.combine(end);
        let source = self.lexer.source;

        match parent {
            Some(parent) if source[parent.name] == source[name] => Ok(()),
            Some(parent) => Err(Error::new(ErrorKind::InvalidSyntax, UNEXPECTED_TOKEN)
                .with_pointer(source, region)
                .with_help(format!(
                    "expected `</{}>`, found `</{}>`",
                    &source[parent.name], &source[name]
                ))),
            None => Err(Error::new(ErrorKind::InvalidSyntax, UNEXPECTED_TOKEN)
                .with_pointer(source, region)
                .with_help(format!("`</{}>` closes a tag that was never opened", &source[name]))),
        }
    }

    /// Parse a call, beginning after the `{{`.
    ///
    /// The parentheses may be left out when there are no arguments.
    fn parse_call(&mut self, begin: Region) -> Result<Call, Error> {
        let (_, name) = self.next_must(Token::Identifier)?;

        let arguments = match self.next_any_must()? {
            (Token::EndCall, end) => {
                return Ok(Call {
                    name,
                    arguments: None,
                    region: begin.combine(end),
                })
            }
            (Token::OpenParen, _) => match self.next_any_must()? {
                (Token::Arguments, arguments) => {
                    self.next_must(Token::CloseParen)?;
                    Some(arguments)
                }
                (Token::CloseParen, _) => None,
                (received, region) => {
                    return Err(Error::new(ErrorKind::InvalidSyntax, UNEXPECTED_TOKEN)
                        .with_pointer(self.lexer.source, region)
                        .with_help(expected_token("arguments or `)`", received)))
                }
            },
            (received, region) => {
                return Err(Error::new(ErrorKind::InvalidSyntax, UNEXPECTED_TOKEN)
                    .with_pointer(self.lexer.source, region)
                    .with_help(expected_token("`(` or `}}`", received)))
            }
        };
        let (_, end) = self.next_must(Token::EndCall)?;

        Ok(Call {
            name,
            arguments,
            region: begin.combine(end),
        })
    }

    /// Peek at the next token.
    fn peek(&mut self) -> TokenResult {
        if let o @ None = &mut self.buffer {
            *o = Some(self.lexer.next()?);
        }

        Ok(self.buffer.flatten())
    }

    /// Get the next token.
    ///
    /// Prefers to pull a token from the internal buffer first, but will pull from
    /// the lexer when the buffer is empty.
    fn next(&mut self) -> TokenResult {
        match self.buffer.take() {
            Some(t) => Ok(t),
            None => self.lexer.next(),
        }
    }

    /// Returns true if the given token matches the upcoming token.
    ///
    /// # Errors
    ///
    /// Propagates any errors reported by the underlying lexer.
    fn next_is(&mut self, expect: Token) -> Result<bool, Error> {
        Ok(self
            .peek()?
            .map(|(token, _)| token == expect)
            .unwrap_or(false))
    }

    /// Get the next token, and compare it to the given token.
    ///
    /// # Errors
    ///
    /// An error is returned if the next token does not match the given token,
    /// or when [next()] returns None.
    fn next_must(&mut self, expect: Token) -> Result<(Token, Region), Error> {
        match self.next()? {
            Some((token, region)) if token == expect => Ok((token, region)),
            Some((token, region)) => Err(Error::new(ErrorKind::InvalidSyntax, UNEXPECTED_TOKEN)
                .with_pointer(self.lexer.source, region)
                .with_help(expected_token(expect, token))),
            None => Err(error_eof(self.lexer.source)),
        }
    }

    /// Get the next token.
    ///
    /// Similar to "next()" but requires that a token is returned.
    fn next_any_must(&mut self) -> Result<(Token, Region), Error> {
        self.next()?.ok_or_else(|| error_eof(self.lexer.source))
    }
}
