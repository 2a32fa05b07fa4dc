mod directive;
mod error;
mod grammar;

pub use directive::{ActionDirective, Actions, Directive, OperatorSpec, RuleDirective};
pub use error::ParseError;

/// Parses one logical line into a [`Directive`].
///
/// # Errors
///
/// Returns [`ParseError`] if the line is not a valid directive. The error
/// carries the 1-based column of the offending character.
pub fn directive(input: &str) -> Result<Directive, ParseError> {
    use winnow::Parser;
    grammar::directive
        .parse(input)
        .map_err(|e| ParseError::new(e.offset() + 1, e.inner().to_string()))
}

/// Splits raw directive text into logical lines.
///
/// Blank lines and `#` comments are skipped; a trailing `\` joins the next
/// physical line. Each entry carries the 1-based number of its first
/// physical line.
pub(crate) fn logical_lines(input: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut joined = String::new();
    let mut start = 0;
    for (idx, raw) in input.lines().enumerate() {
        if joined.is_empty() {
            let trimmed = raw.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            start = idx + 1;
        }
        match raw.trim_end().strip_suffix('\\') {
            Some(head) => joined.push_str(head),
            None => {
                joined.push_str(raw);
                lines.push((start, std::mem::take(&mut joined)));
            }
        }
    }
    if !joined.is_empty() {
        lines.push((start, joined));
    }
    lines
}
