// Error-trace line numbers rebased onto the student's fragment
use regex::{Captures, Regex};
use std::sync::OnceLock;

fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r", line ([0-9]+)").expect("line pattern is valid"))
}

/// Replace every `, line N` with `, line N - offset`, one line at a time
///
/// Lines without the pattern, and the rest of every line, are kept verbatim.
pub fn remap_line_numbers(text: &str, offset: i64) -> String {
    if offset == 0 {
        return text.to_string();
    }
    let pattern = line_pattern();
    text.split_inclusive('\n')
        .map(|line| {
            pattern.replace_all(line, |caps: &Captures| match caps[1].parse::<i64>() {
                Ok(number) => format!(", line {}", number - offset),
                Err(_) => caps[0].to_string(),
            })
        })
        .collect()
}
