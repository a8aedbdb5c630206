/// Token returned when a command contains nothing but whitespace.
pub const FALLBACK_TOKEN: &str = "bash";

/// Split a free-text shell command into argument tokens.
///
/// Single and double quotes group words and are dropped from the output.
/// Runs of spaces never produce empty tokens. An unmatched opening quote
/// swallows the rest of the input into one token. The result is never
/// empty: blank input yields `[FALLBACK_TOKEN]`.
pub fn tokenize(command: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in command.chars() {
        match quote {
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            Some(open) if ch == open => quote = None,
            None if ch == ' ' => flush(&mut current, &mut parts),
            _ => current.push(ch),
        }
    }
    flush(&mut current, &mut parts);

    if parts.is_empty() {
        parts.push(FALLBACK_TOKEN.to_string());
    }
    parts
}

fn flush(current: &mut String, parts: &mut Vec<String>) {
    let token = current.trim();
    if !token.is_empty() {
        parts.push(token.to_string());
    }
    current.clear();
}
