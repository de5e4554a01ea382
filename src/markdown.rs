//! Telegram MarkdownV2 escaping.

/// Characters with special meaning in MarkdownV2.
const SPECIAL_CHARS: &[char] = &[
    '\\', '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Characters left alone by [`smart_escape_markdown`] so bold and links survive.
const FORMATTING_CHARS: &[char] = &['*', '[', ']', '(', ')'];

/// Escape every MarkdownV2 special character, producing plain text.
#[must_use]
pub fn escape_markdown(text: &str) -> String {
    escape_except(text, &[])
}

/// Escape MarkdownV2 special characters but keep `*`, `[`, `]`, `(` and `)`.
#[must_use]
pub fn smart_escape_markdown(text: &str) -> String {
    escape_except(text, FORMATTING_CHARS)
}

fn escape_except(text: &str, keep: &[char]) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 4);
    for c in text.chars() {
        if SPECIAL_CHARS.contains(&c) && !keep.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Split `text` into pieces of at most `max_chars` characters, preferring
/// line breaks as split points.
#[must_use]
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();

        if current_len + line_len > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len > max_chars {
            for c in line.chars() {
                if current_len == max_chars {
                    chunks.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                current.push(c);
                current_len += 1;
            }
        } else {
            current.push_str(line);
            current_len += line_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
