//! Description extraction from markdown bodies.

fn is_heading(line: &str) -> bool {
    line.starts_with('#')
}

/// First non-blank line of `body` that is not a markdown heading.
pub fn first_paragraph_line(body: &str) -> Option<&str> {
    body.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !is_heading(line))
}

/// First non-blank line of `body`, heading or not.
pub fn first_line(body: &str) -> Option<&str> {
    body.lines().map(str::trim).find(|line| !line.is_empty())
}

/// Resolves a description: explicit value, then the first non-heading line,
/// then the first line, then empty.
pub fn describe(explicit: Option<&str>, body: &str) -> String {
    explicit
        .or_else(|| first_paragraph_line(body))
        .or_else(|| first_line(body))
        .unwrap_or_default()
        .to_string()
}
