//! Markup stripping for free-text user input.
//!
//! Participant names and message bodies pass through here before they are
//! validated or persisted.

/// Strips markup tags and trims surrounding whitespace.
///
/// Everything between `<` and the matching `>` is dropped, including the
/// delimiters; an unterminated `<` drops the rest of the input.
pub fn strip_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;

    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }

    out.trim().to_string()
}
