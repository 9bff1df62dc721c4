//! Argv tokenization for command strings.
//!
//! Responsibilities:
//! - Split a free-text command string into argv-style tokens, honoring
//!   quoting and backslash escapes.
//!
//! Does NOT handle:
//! - Environment variable expansion, globbing, or command substitution.
//!   The output is used verbatim as the argv of a spawned process, with no
//!   shell in between, so shell metacharacters have no meaning here.
//!
//! Invariants:
//! - The result is fully materialized; empty input yields an empty vec.
//! - An unterminated quote is not an error: scanning continues to the end
//!   of input and the partial token is kept.

/// Splits `input` into tokens on runs of unquoted whitespace.
///
/// Single- and double-quoted regions are taken literally, except that a
/// backslash inside double quotes (and outside any quotes) escapes the
/// following character: the backslash is dropped and the next character is
/// kept as-is. Inside single quotes a backslash is an ordinary character.
/// A trailing backslash with nothing after it is kept as a literal
/// backslash.
pub fn tokenize(input: &str) -> Vec<String> {
    #[derive(PartialEq)]
    enum State {
        Plain,
        Single,
        Double,
    }

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut state = State::Plain;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match state {
            State::Plain => match c {
                c if c.is_whitespace() => {
                    if in_token {
                        tokens.push(std::mem::take(&mut current));
                        in_token = false;
                    }
                }
                '\'' => {
                    state = State::Single;
                    in_token = true;
                }
                '"' => {
                    state = State::Double;
                    in_token = true;
                }
                '\\' => {
                    current.push(chars.next().unwrap_or('\\'));
                    in_token = true;
                }
                c => {
                    current.push(c);
                    in_token = true;
                }
            },
            State::Single => match c {
                '\'' => state = State::Plain,
                c => current.push(c),
            },
            State::Double => match c {
                '"' => state = State::Plain,
                '\\' => current.push(chars.next().unwrap_or('\\')),
                c => current.push(c),
            },
        }
    }

    if in_token {
        tokens.push(current);
    }
    tokens
}
