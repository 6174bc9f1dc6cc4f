//! Splits a raw command line into words.
//!
//! Words are separated by unquoted spaces. Single and double quotes group
//! characters (spaces included) into one word and are themselves dropped;
//! a quote of the other kind inside a quoted section is kept literally.
//! There is no escaping and no expansion of any kind.

use thiserror::Error;

/// Diagnostic produced when the input could not be lexed cleanly.
///
/// Warnings never abort lexing: the words assembled so far are still returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LexingWarning {
    /// The line ended while a single- or double-quoted section was still open.
    #[error("Error: Unclosed quotes in command")]
    UnclosedQuote,
}

/// Result of lexing one line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexed {
    pub words: Vec<String>,
    pub warning: Option<LexingWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Unquoted,
    SingleQuote,
    DoubleQuote,
}

struct LexingFSM<'a> {
    input: std::str::Chars<'a>,
    state: LexingState,
    buffer: String,
    words: Vec<String>,
}

impl<'a> LexingFSM<'a> {
    fn new(line: &'a str) -> Self {
        LexingFSM {
            input: line.chars(),
            state: LexingState::Unquoted,
            buffer: String::new(),
            words: Vec::new(),
        }
    }

    fn make_words(mut self) -> Lexed {
        while let Some(ch) = self.input.next() {
            match self.state {
                LexingState::Unquoted => self.handle_unquoted(ch),
                LexingState::SingleQuote => self.handle_quoted(ch, '\''),
                LexingState::DoubleQuote => self.handle_quoted(ch, '"'),
            }
        }
        self.flush_word();

        let warning = match self.state {
            LexingState::Unquoted => None,
            LexingState::SingleQuote | LexingState::DoubleQuote => {
                Some(LexingWarning::UnclosedQuote)
            }
        };
        Lexed {
            words: self.words,
            warning,
        }
    }

    fn handle_unquoted(&mut self, ch: char) {
        match ch {
            ' ' => self.flush_word(),
            '\'' => self.state = LexingState::SingleQuote,
            '"' => self.state = LexingState::DoubleQuote,
            c => self.buffer.push(c),
        }
    }

    fn handle_quoted(&mut self, ch: char, closing: char) {
        if ch == closing {
            self.state = LexingState::Unquoted;
        } else {
            self.buffer.push(ch);
        }
    }

    /// Empty words (e.g. from `''`) are never emitted.
    fn flush_word(&mut self) {
        if !self.buffer.is_empty() {
            self.words.push(std::mem::take(&mut self.buffer));
        }
    }
}

/// Lex `line` into words, reporting an unclosed quote as a warning.
pub fn split_into_words(line: &str) -> Lexed {
    LexingFSM::new(line).make_words()
}

/// Lex `line`, discarding any warning.
pub fn tokenize(line: &str) -> Vec<String> {
    split_into_words(line).words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &str) -> Vec<String> {
        let lexed = split_into_words(line);
        assert_eq!(lexed.warning, None, "unexpected warning for {line:?}");
        lexed.words
    }

    #[test]
    fn test_splits_on_spaces() {
        assert_eq!(words("ls -la /tmp"), vec!["ls", "-la", "/tmp"]);
    }

    #[test]
    fn test_collapses_repeated_and_edge_spaces() {
        assert_eq!(words("   echo    hi  "), vec!["echo", "hi"]);
    }

    #[test]
    fn test_empty_input_yields_no_words() {
        assert!(words("").is_empty());
        assert!(words("    ").is_empty());
    }

    #[test]
    fn test_single_quotes_group_words() {
        assert_eq!(words("a 'b c' d"), vec!["a", "b c", "d"]);
    }

    #[test]
    fn test_other_quote_is_literal_inside_quotes() {
        assert_eq!(words("a \"b'c\" d"), vec!["a", "b'c", "d"]);
        assert_eq!(words("a 'b\"c' d"), vec!["a", "b\"c", "d"]);
    }

    #[test]
    fn test_quoted_sections_join_adjacent_text() {
        assert_eq!(words("ll='ls -la'"), vec!["ll=ls -la"]);
        assert_eq!(words("pre\"mid dle\"post"), vec!["premid dlepost"]);
    }

    #[test]
    fn test_empty_quotes_produce_no_word() {
        assert_eq!(words("echo '' \"\" x"), vec!["echo", "x"]);
    }

    #[test]
    fn test_tabs_are_not_separators() {
        assert_eq!(words("a\tb c"), vec!["a\tb", "c"]);
    }

    #[test]
    fn test_unclosed_quote_warns_but_keeps_words() {
        let lexed = split_into_words("'unterminated");
        assert_eq!(lexed.words, vec!["unterminated"]);
        assert_eq!(lexed.warning, Some(LexingWarning::UnclosedQuote));

        let lexed = split_into_words("echo \"a b");
        assert_eq!(lexed.words, vec!["echo", "a b"]);
        assert_eq!(lexed.warning, Some(LexingWarning::UnclosedQuote));
    }

    #[test]
    fn test_warning_text() {
        assert_eq!(
            LexingWarning::UnclosedQuote.to_string(),
            "Error: Unclosed quotes in command"
        );
    }

    #[test]
    fn test_tokenize_matches_split_into_words() {
        assert_eq!(tokenize("'unterminated"), vec!["unterminated"]);
        assert_eq!(tokenize(""), Vec::<String>::new());
    }
}
