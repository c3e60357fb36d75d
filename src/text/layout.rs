use regex::Regex;
use std::sync::LazyLock;

// `<<EOF` or `<<-EOF` closing a line opens a heredoc body
static HEREDOC_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<<-?([A-Za-z_][A-Za-z0-9_-]*)$").unwrap());

// A stray `\r` is treated like any other trailing whitespace.
const TRAILING: [char; 3] = [' ', '\t', '\r'];

struct Line<'a> {
    content: &'a str,
    ending: &'a str,
}

impl Line<'_> {
    fn is_blank(&self) -> bool {
        self.content.trim_matches(TRAILING).is_empty()
    }
}

/// Renders text in the canonical layout.
///
/// Trailing spaces, tabs and stray carriage returns are stripped outside
/// heredoc bodies. Leading and trailing blank lines are dropped, and a
/// non-empty result always ends with exactly one line terminator. Per-line
/// terminators are kept. Comment lines never open a heredoc.
pub fn canonicalize(text: &str) -> String {
    let default_ending = if text.contains("\r\n") { "\r\n" } else { "\n" };
    let mut lines: Vec<Line<'_>> = Vec::new();
    let mut heredoc: Option<&str> = None;

    for raw in text.split_inclusive('\n') {
        let (content, ending) = split_ending(raw);

        if let Some(marker) = heredoc {
            if content.trim() == marker {
                heredoc = None;
                lines.push(Line {
                    content: content.trim_end_matches(TRAILING),
                    ending,
                });
            } else {
                lines.push(Line { content, ending });
            }
            continue;
        }

        let trimmed = content.trim_end_matches(TRAILING);
        heredoc = if is_comment(trimmed) {
            None
        } else {
            HEREDOC_START_RE
                .captures(trimmed)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
        };
        lines.push(Line {
            content: trimmed,
            ending,
        });
    }

    let start = lines
        .iter()
        .position(|line| !line.is_blank())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|line| !line.is_blank())
        .map(|i| i + 1)
        .unwrap_or(0);

    if start >= end {
        return String::new();
    }

    let mut out = String::with_capacity(text.len());
    for line in &lines[start..end - 1] {
        out.push_str(line.content);
        out.push_str(line.ending);
    }

    let last = &lines[end - 1];
    out.push_str(last.content);
    out.push_str(if last.ending.is_empty() {
        default_ending
    } else {
        last.ending
    });

    out
}

fn is_comment(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with('#') || line.starts_with("//")
}

fn split_ending(raw: &str) -> (&str, &str) {
    if let Some(content) = raw.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = raw.strip_suffix('\n') {
        (content, "\n")
    } else if let Some(content) = raw.strip_suffix('\r') {
        // unterminated CRLF on the final line
        (content, "\r\n")
    } else {
        (raw, "")
    }
}
