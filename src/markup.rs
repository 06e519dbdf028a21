//! Markup pipeline.
//!
//! Markup is lexed into tokens, parsed into a tree of nodes, and the tree is
//! then built into [`ComponentNode`][`crate::ComponentNode`] instances or
//! written out in bracketed notation.
mod build;
mod lex;
mod parse;

pub(crate) use build::Context;
pub(crate) use parse::Parser;

use morel::Syntax;

/// Markers found by the morel [`Finder`][`morel::Finder`] while reading text.
pub(crate) enum Marker {
    /// Beginning of an opening or closing tag.
    BeginTag = 0,
    /// Beginning of an inline call.
    BeginCall = 1,
    /// End of an inline call.
    EndCall = 2,
}

impl From<usize> for Marker {
    fn from(value: usize) -> Self {
        match value {
            0 => Self::BeginTag,
            1 => Self::BeginCall,
            2 => Self::EndCall,
            _ => unreachable!(),
        }
    }
}

impl From<Marker> for usize {
    fn from(k: Marker) -> Self {
        k as usize
    }
}

/// Return the [`Syntax`] that markup is read with.
pub(crate) fn syntax() -> Syntax {
    Syntax::new(vec![
        (Marker::BeginTag.into(), "<".into()),
        (Marker::BeginCall.into(), "{{".into()),
        (Marker::EndCall.into(), "}}".into()),
    ])
}
