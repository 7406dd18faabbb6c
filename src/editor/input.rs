//! Raw input decoding

/// A decoded chunk of terminal input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Enter,
    Left,
    Right,
    Up,
    Down,
    Backspace,
    /// Ctrl+C
    Interrupt,
    /// ESC on its own
    Escape,
    /// Anything else, unsanitized
    Text(String),
}

impl Key {
    /// Decode one `onData` chunk. Line endings are normalized first.
    pub fn parse(data: &str) -> Key {
        match normalize(data).as_str() {
            "\r" => Key::Enter,
            "\x1b[D" => Key::Left,
            "\x1b[C" => Key::Right,
            "\x1b[A" => Key::Up,
            "\x1b[B" => Key::Down,
            "\x7f" => Key::Backspace,
            "\x03" => Key::Interrupt,
            "\x1b" => Key::Escape,
            other => Key::Text(other.to_string()),
        }
    }
}

/// `\r\n` and lone `\n` both mean Enter
pub fn normalize(data: &str) -> String {
    data.replace("\r\n", "\r").replace('\n', "\r")
}

/// Drop ASCII control characters and replace anything outside ASCII with `?`
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            c if c.is_ascii_control() => None,
            c if !c.is_ascii() => Some('?'),
            c => Some(c),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_special_keys() {
        assert_eq!(Key::parse("\r"), Key::Enter);
        assert_eq!(Key::parse("\x1b[D"), Key::Left);
        assert_eq!(Key::parse("\x1b[C"), Key::Right);
        assert_eq!(Key::parse("\x1b[A"), Key::Up);
        assert_eq!(Key::parse("\x1b[B"), Key::Down);
        assert_eq!(Key::parse("\x7f"), Key::Backspace);
        assert_eq!(Key::parse("\x03"), Key::Interrupt);
        assert_eq!(Key::parse("\x1b"), Key::Escape);
    }

    #[test]
    fn test_line_endings_normalize_to_enter() {
        assert_eq!(Key::parse("\n"), Key::Enter);
        assert_eq!(Key::parse("\r\n"), Key::Enter);
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(Key::parse("a"), Key::Text("a".into()));
        assert_eq!(Key::parse("ls -la\n"), Key::Text("ls -la\r".into()));
        // Unknown escape sequences fall through as text
        assert_eq!(Key::parse("\x1b[H"), Key::Text("\x1b[H".into()));
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("a"), "a");
        assert_eq!(sanitize("\x01b\x7f"), "b");
        assert_eq!(sanitize("é"), "?");
        assert_eq!(sanitize("\x1b[H"), "[H");
        assert_eq!(sanitize(""), "");
    }
}
