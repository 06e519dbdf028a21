pub mod token;

mod state;

use self::{state::CursorState, token::Token};
use crate::{
    log::{Error, ErrorKind, INVALID_SYNTAX, UNEXPECTED_EOF, UNEXPECTED_TOKEN},
    region::Region,
};
use morel::Finder;

/// Result of reading a single [`Token`].
pub type TokenResult = Result<Option<(Token, Region)>, Error>;

/// Provides methods to read markup as [`Token`] instances.
pub struct Lexer<'source> {
    /// Reference to the source text.
    pub source: &'source str,
    /// Position within source.
    pub cursor: usize,
    /// Compiled [`Finder`] instance used to search for markers
    /// in the source text.
    finder: &'source Finder,
    /// Tracks the [`Lexer`] state and determines the action taken
    /// when `.next` is called.
    state: CursorState,
    /// Temporary storage for a [`Token`] that will be read
    /// on the following call to `.next`.
    buffer: Option<(Token, Region)>,
}

impl<'source> Lexer<'source> {
    /// Create a new [`Lexer`] over the given source.
    #[inline]
    pub fn new(source: &'source str, finder: &'source Finder) -> Self {
        Self {
            source,
            cursor: 0,
            finder,
            state: CursorState::Default,
            buffer: None,
        }
    }

    /// Return the next [`Token`] and [`Region`].
    ///
    /// Any instance of [`Token::Whitespace`] is ignored.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an unexpected character is found inside of a
    /// tag or call.
    pub fn next(&mut self) -> TokenResult {
        loop {
            // Always prefer taking from the buffer when possible.
            if let Some(next) = self.buffer.take() {
                return Ok(Some(next));
            }
            if self.source[self.cursor..].is_empty() {
                return Ok(None);
            }

            let c = self.cursor;
            let result = match self.state {
                CursorState::Default => self.lex_default(c),
                CursorState::Tag => self.lex_tag(c),
                CursorState::Call => self.lex_call(c),
                CursorState::Arguments => self.lex_arguments(c),
            }?;

            return match result {
                Some((Token::Whitespace, _)) => continue,
                other => Ok(other),
            };
        }
    }

    /// Return the next [`Token`] and [`Region`] in
    /// [`Default`][`CursorState::Default`] state.
    ///
    /// A `<` only begins a tag when a name or `/name` follows it, and the
    /// name ends where a tag can continue. Otherwise it is text, like a
    /// stray `}}`.
    fn lex_default(&mut self, from: usize) -> TokenResult {
        let mut search = from;
        loop {
            let Some((id, begin, end)) = self.finder.next(self.source, search) else {
                self.cursor = self.source.len();

                return Ok(Some((Token::Text, (from..self.source.len()).into())));
            };

            let rest = &self.source[end..];
            let (token, end, state) = match Token::from_usize(id) {
                Token::BeginTag if is_tag_name(rest, false) => {
                    (Token::BeginTag, end, CursorState::Tag)
                }
                Token::BeginTag if rest.starts_with('/') && is_tag_name(&rest[1..], true) => {
                    (Token::BeginCloseTag, end + 1, CursorState::Tag)
                }
                Token::BeginCall => (Token::BeginCall, end, CursorState::Call),
                _ => {
                    search = end;
                    continue;
                }
            };
            self.state = state;
            self.cursor = end;

            if from == begin {
                return Ok(Some((token, (begin..end).into())));
            }
            self.buffer = Some((token, (begin..end).into()));

            return Ok(Some((Token::Text, (from..begin).into())));
        }
    }

    /// Return the next [`Token`] and [`Region`] in
    /// [`Tag`][`CursorState::Tag`] state.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an unexpected character is found.
    fn lex_tag(&mut self, from: usize) -> TokenResult {
        let mut iterator = self.source[from..]
            .char_indices()
            .map(|(d, c)| (from + d, c));
        let Some((index, char)) = iterator.next() else {
            return Ok(None);
        };

        match char {
            '>' => {
                self.state = CursorState::Default;
                self.advance(from, 1, Token::EndTag)
            }
            '/' if self.source[from + 1..].starts_with('>') => {
                self.state = CursorState::Default;
                self.advance(from, 2, Token::EndSelfClose)
            }
            '=' => self.advance(from, 1, Token::Assign),
            ':' => self.advance(from, 1, Token::Colon),
            '"' | '\'' => self.lex_string(iterator, index, char),
            c if c.is_whitespace() => Ok(Some(self.lex_while(
                iterator,
                index,
                Token::Whitespace,
                char::is_whitespace,
            ))),
            c if is_name_start(c) => Ok(Some(self.lex_while(
                iterator,
                index,
                Token::Identifier,
                is_name_continue,
            ))),
            _ => Err(Error::new(ErrorKind::InvalidSyntax, UNEXPECTED_TOKEN)
                .with_pointer(self.source, index..index + char.len_utf8())
                .with_help(
                    "expected one of `>`, `/>`, `=`, `:`, a name, \
                    or a string quoted with `\"` or `'`",
                )),
        }
    }

    /// Return the next [`Token`] and [`Region`] in
    /// [`Call`][`CursorState::Call`] state.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an unexpected character is found.
    fn lex_call(&mut self, from: usize) -> TokenResult {
        if let Some((id, end)) = self.finder.starts(self.source, from) {
            if Token::from_usize(id) == Token::EndCall {
                self.state = CursorState::Default;
                self.cursor = end;

                return Ok(Some((Token::EndCall, (from..end).into())));
            }
        }

        let mut iterator = self.source[from..]
            .char_indices()
            .map(|(d, c)| (from + d, c));
        let Some((index, char)) = iterator.next() else {
            return Ok(None);
        };

        match char {
            '(' => {
                self.state = CursorState::Arguments;
                self.advance(from, 1, Token::OpenParen)
            }
            c if c.is_whitespace() => Ok(Some(self.lex_while(
                iterator,
                index,
                Token::Whitespace,
                char::is_whitespace,
            ))),
            c if is_name_start(c) => Ok(Some(self.lex_while(
                iterator,
                index,
                Token::Identifier,
                is_name_continue,
            ))),
            _ => Err(Error::new(ErrorKind::InvalidSyntax, UNEXPECTED_TOKEN)
                .with_pointer(self.source, index..index + char.len_utf8())
                .with_help("expected a function name, `(` or `}}`")),
        }
    }

    /// Return [`Token::Arguments`] followed by [`Token::CloseParen`], or only
    /// the parenthesis when there is nothing between them.
    ///
    /// Nested parentheses must balance. Parentheses inside of back-quoted or
    /// quoted text are ignored, and `\` escapes the following character.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the closing parenthesis is never found.
    fn lex_arguments(&mut self, from: usize) -> TokenResult {
        let mut depth = 0_usize;
        let mut quote: Option<char> = None;
        let mut escaped = false;
        let mut close = None;

        for (index, char) in self.source[from..].char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match (quote, char) {
                (_, '\\') => escaped = true,
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '`' | '"' | '\'') => quote = Some(char),
                (None, '(') => depth += 1,
                (None, ')') if depth == 0 => {
                    close = Some(from + index);
                    break;
                }
                (None, ')') => depth -= 1,
                _ => {}
            }
        }

        let Some(close) = close else {
            return Err(Error::new(ErrorKind::InvalidSyntax, UNEXPECTED_EOF)
                .with_pointer(self.source, from.saturating_sub(1)..from)
                .with_help("did you close the call arguments with `)`?"));
        };
        self.state = CursorState::Call;
        self.cursor = close + 1;

        let paren = (Token::CloseParen, (close..close + 1).into());
        if close == from {
            return Ok(Some(paren));
        }
        self.buffer = Some(paren);

        Ok(Some((Token::Arguments, (from..close).into())))
    }

    /// Return a [`Token`] and [`Region`] containing [`Token::String`] using
    /// the given iterator, ending at the first unescaped `quote`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the string is never closed.
    fn lex_string<T>(&mut self, mut iter: T, from: usize, quote: char) -> TokenResult
    where
        T: Iterator<Item = (usize, char)>,
    {
        let mut previous = (from, quote);
        loop {
            match iter.next() {
                Some((index, char)) if char == quote && previous.1 != '\\' => {
                    // Add one to comply with string slice semantics.
                    let to = index + 1;
                    self.cursor = to;

                    return Ok(Some((Token::String, (from..to).into())));
                }
                Some((index, char)) => previous = (index, char),
                None => {
                    return Err(Error::new(ErrorKind::InvalidSyntax, INVALID_SYNTAX)
                        .with_pointer(self.source, from..from + 1)
                        .with_help(format!(
                            "this might be an undelimited string, try closing it with `{quote}`"
                        )));
                }
            }
        }
    }

    /// Return the given [`Token`] covering every character from `from` that
    /// satisfies the predicate.
    fn lex_while<T, P>(
        &mut self,
        mut iter: T,
        from: usize,
        token: Token,
        predicate: P,
    ) -> (Token, Region)
    where
        T: Iterator<Item = (usize, char)>,
        P: Fn(char) -> bool,
    {
        loop {
            match iter.next() {
                Some((index, char)) if !predicate(char) => {
                    self.cursor = index;

                    break (token, (from..index).into());
                }
                Some(_) => continue,
                None => {
                    self.cursor = self.source.len();

                    break (token, (from..self.source.len()).into());
                }
            }
        }
    }

    /// Move the cursor `length` bytes past `from` and return the token.
    fn advance(&mut self, from: usize, length: usize, token: Token) -> TokenResult {
        self.cursor = from + length;

        Ok(Some((token, (from..from + length).into())))
    }
}

/// Return true if the given character may begin a tag, attribute or
/// function name, meaning '_' or an `xid_start`.
fn is_name_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

/// Return true if the text begins with a name that ends in whitespace or
/// `>`, or in `/` when the tag is not a closing one.
fn is_tag_name(text: &str, close: bool) -> bool {
    if !text.starts_with(is_name_start) {
        return false;
    }

    match text.chars().find(|c| !is_name_continue(*c)) {
        Some(c) => c.is_whitespace() || c == '>' || (c == '/' && !close),
        None => false,
    }
}

/// Return true if the given character may continue a name, meaning an
/// `xid_continue` or '-'.
fn is_name_continue(c: char) -> bool {
    c == '-' || unicode_ident::is_xid_continue(c)
}

#[cfg(test)]
mod tests {
    use super::{token::Token, Lexer};
    use crate::{markup::syntax, region::Region, ErrorKind};
    use morel::Finder;

    #[test]
    fn test_lex_text_only() {
        helper_lex_next_auto("lorem ipsum", vec![(Token::Text, 0..11)]);
    }

    #[test]
    fn test_lex_stray_markers_are_text() {
        helper_lex_next_auto("a < b }} c <3", vec![(Token::Text, 0..13)]);
    }

    #[test]
    fn test_lex_unfinished_tag_is_text() {
        let expect = vec![
            (Token::Text, 0..8),
            (Token::BeginCloseTag, 8..10),
            (Token::Identifier, 10..14),
            (Token::EndTag, 14..15),
        ];

        helper_lex_next_auto("Price <b</Card>", expect);
        helper_lex_next_auto("a <b.c </d-", vec![(Token::Text, 0..11)]);
    }

    #[test]
    fn test_lex_self_closing() {
        let expect = vec![
            (Token::BeginTag, 0..1),
            (Token::Identifier, 1..7),
            (Token::Colon, 8..9),
            (Token::Identifier, 9..14),
            (Token::Assign, 14..15),
            (Token::String, 15..26),
            (Token::EndSelfClose, 27..29),
        ];

        helper_lex_next_auto("<Button :label=\"user.name\" />", expect);
    }

    #[test]
    fn test_lex_open_and_close() {
        let expect = vec![
            (Token::Text, 0..3),
            (Token::BeginTag, 3..4),
            (Token::Identifier, 4..8),
            (Token::Identifier, 9..18),
            (Token::Assign, 18..19),
            (Token::String, 19..22),
            (Token::Identifier, 23..31),
            (Token::EndTag, 31..32),
            (Token::Text, 32..34),
            (Token::BeginCloseTag, 34..36),
            (Token::Identifier, 36..40),
            (Token::EndTag, 40..41),
        ];

        helper_lex_next_auto("hi <Card data-role='x' disabled>ok</Card>", expect);
    }

    #[test]
    fn test_lex_call() {
        let expect = vec![
            (Token::BeginCall, 0..2),
            (Token::Identifier, 3..8),
            (Token::OpenParen, 8..9),
            (Token::Arguments, 9..20),
            (Token::CloseParen, 20..21),
            (Token::EndCall, 22..24),
        ];

        helper_lex_next_auto("{{ upper(`hi ${a.b}`) }}", expect);
    }

    #[test]
    fn test_lex_call_nested_parentheses() {
        let expect = vec![
            (Token::BeginCall, 0..2),
            (Token::Identifier, 2..3),
            (Token::OpenParen, 3..4),
            (Token::Arguments, 4..13),
            (Token::CloseParen, 13..14),
            (Token::EndCall, 14..16),
        ];

        helper_lex_next_auto("{{f((a) `)` b)}}", expect);
    }

    #[test]
    fn test_lex_call_empty_arguments() {
        let expect = vec![
            (Token::BeginCall, 0..2),
            (Token::Identifier, 2..5),
            (Token::OpenParen, 5..6),
            (Token::CloseParen, 6..7),
            (Token::EndCall, 7..9),
        ];

        helper_lex_next_auto("{{now()}}", expect);
    }

    #[test]
    fn test_lex_unclosed_string() {
        let finder = Finder::new(syntax());
        let mut lexer = Lexer::new("<A b=\"c />", &finder);
        for _ in 0..4 {
            assert!(lexer.next().is_ok());
        }

        assert_eq!(lexer.next().unwrap_err().kind(), ErrorKind::InvalidSyntax);
    }

    #[test]
    fn test_lex_unclosed_arguments() {
        let finder = Finder::new(syntax());
        let mut lexer = Lexer::new("{{ f(a }}", &finder);
        for _ in 0..3 {
            assert!(lexer.next().is_ok());
        }

        assert!(lexer.next().is_err());
    }

    #[test]
    fn test_lex_unexpected_character() {
        let finder = Finder::new(syntax());
        let mut lexer = Lexer::new("<A %>", &finder);
        for _ in 0..2 {
            assert!(lexer.next().is_ok());
        }

        assert!(lexer.next().is_err());
    }

    /// Helper function which takes in a source string, creates a lexer on that
    /// string and iterates [expect.len()] amount of times and compares the result
    /// against [lexer.next()].
    fn helper_lex_next_auto<T>(source: &str, expect: Vec<(Token, T)>)
    where
        T: Into<Region>,
    {
        let finder = Finder::new(syntax());
        let mut lexer = Lexer::new(source, &finder);
        for (token, region) in expect {
            assert_eq!(lexer.next(), Ok(Some((token, region.into()))))
        }

        assert_eq!(lexer.next(), Ok(None));
        assert_eq!(lexer.next(), Ok(None));
    }
}
