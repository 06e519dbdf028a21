use super::super::Marker;
use std::fmt::{Display, Formatter, Result};

/// Types emitted by the Lexer.
///
/// An abstraction over raw markup to make construction of Node types easier.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Token {
    /// Text outside of tags and calls.
    Text,
    /// <
    BeginTag,
    /// </
    BeginCloseTag,
    /// >
    EndTag,
    /// />
    EndSelfClose,
    /// A tag or attribute name.
    Identifier,
    /// The `:` that marks a bound attribute.
    Colon,
    /// =
    Assign,
    /// A quoted attribute value, quotes included.
    String,
    /// Whitespace within a tag or call.
    Whitespace,
    /// {{
    BeginCall,
    /// }}
    EndCall,
    /// (
    OpenParen,
    /// )
    CloseParen,
    /// Everything between the parentheses of a call.
    Arguments,
}

impl Token {
    /// Convert a morel marker id into the Token it begins.
    pub(crate) fn from_usize(id: usize) -> Self {
        match Marker::from(id) {
            Marker::BeginTag => Self::BeginTag,
            Marker::BeginCall => Self::BeginCall,
            Marker::EndCall => Self::EndCall,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Token::Text => write!(f, "text"),
            Token::BeginTag => write!(f, "begin tag (<)"),
            Token::BeginCloseTag => write!(f, "begin closing tag (</)"),
            Token::EndTag => write!(f, "end tag (>)"),
            Token::EndSelfClose => write!(f, "end self closing tag (/>)"),
            Token::Identifier => write!(f, "identifier"),
            Token::Colon => write!(f, "colon (:)"),
            Token::Assign => write!(f, "assign (=)"),
            Token::String => write!(f, "string"),
            Token::Whitespace => write!(f, "whitespace"),
            Token::BeginCall => write!(f, "begin call ({{{{)"),
            Token::EndCall => write!(f, "end call (}}}})"),
            Token::OpenParen => write!(f, "open parenthesis (()"),
            Token::CloseParen => write!(f, "close parenthesis ())"),
            Token::Arguments => write!(f, "arguments"),
        }
    }
}
