//! IRC line formatting and parsing.

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;

/// Largest text payload, in bytes, sent in a single `PRIVMSG`.
///
/// Servers cap the whole line at 512 bytes including the prefix they add
/// when relaying, so the text is kept well below that.
pub const MAX_TEXT_BYTES: usize = 400;

/// Removes characters that would end or corrupt an IRC line.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\r' | '\n' | '\0'))
        .collect()
}

/// Splits `text` into pieces of at most `max_bytes` bytes, never inside a
/// UTF-8 character.
pub fn split_text(text: &str, max_bytes: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.len() > max_bytes {
        let mut end = max_bytes;
        while end > 0 && !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            // A single character wider than the limit.
            end = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        let (head, tail) = rest.split_at(end);
        chunks.push(head);
        rest = tail;
    }

    if !rest.is_empty() {
        chunks.push(rest);
    }
    chunks
}

/// Builds the `PRIVMSG` lines for `text`. Empty text produces no lines.
pub fn privmsg_lines(channel: &str, text: &str) -> Vec<String> {
    let text = sanitize(text);
    split_text(&text, MAX_TEXT_BYTES)
        .into_iter()
        .map(|chunk| format!("PRIVMSG {channel} :{chunk}"))
        .collect()
}

/// A line received from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message<'a> {
    pub prefix: Option<&'a str>,
    pub command: &'a str,
    pub params: Vec<&'a str>,
}

impl<'a> Message<'a> {
    /// Parses a raw line. Returns `None` for empty lines.
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut rest = line.trim_end_matches(['\r', '\n']);

        let prefix = match rest.strip_prefix(':') {
            Some(stripped) => {
                let (prefix, tail) = stripped.split_once(' ')?;
                rest = tail;
                Some(prefix)
            }
            None => None,
        };

        let (head, trailing) = match rest.split_once(" :") {
            Some((head, trailing)) => (head, Some(trailing)),
            None => (rest, None),
        };

        let mut words = head.split(' ').filter(|w| !w.is_empty());
        let command = words.next()?;
        let mut params: Vec<&str> = words.collect();
        params.extend(trailing);

        Some(Self {
            prefix,
            command,
            params,
        })
    }
}
