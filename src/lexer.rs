//! Lexical analysis (tokenization) of a single command line.
//!
//! The language has no quoting or escaping: a token is any maximal run of
//! characters other than the space character. Tabs and every other character,
//! including `<`, `>` and `*`, belong to the surrounding token.

/// Separator between tokens.
pub const TOKEN_SEPARATOR: char = ' ';

/// Marks a line as a comment when it is the first character.
pub const COMMENT_MARKER: char = '#';

/// Splits `line` into its tokens, in order.
///
/// Runs of spaces count as a single separator and leading/trailing spaces are
/// ignored, so the result never contains an empty token. An empty or blank line
/// yields an empty vector.
pub fn split_into_tokens(line: &str) -> Vec<String> {
    line.split(TOKEN_SEPARATOR)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Whether the whole line is a comment.
pub fn is_comment(line: &str) -> bool {
    line.starts_with(COMMENT_MARKER)
}
