/// Describes the internal state of a [`Lexer`][`super::Lexer`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CursorState {
    /// Indicates the [`Lexer`][`super::Lexer`] is reading text.
    Default,
    /// Indicates the [`Lexer`][`super::Lexer`] is inside of an opening or
    /// closing tag.
    Tag,
    /// Indicates the [`Lexer`][`super::Lexer`] is inside of a call, outside
    /// of its parentheses.
    Call,
    /// Indicates the [`Lexer`][`super::Lexer`] is just past the opening
    /// parenthesis of a call.
    Arguments,
}
