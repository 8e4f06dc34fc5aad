//! Terminal output sanitizer

/// Strip ANSI escapes, normalise line endings and drop stray control bytes
///
/// `\n` and `\t` survive; `\r\n` and lone `\r` become `\n`.
pub fn sanitize_output(raw: &str) -> String {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
    let stripped = strip_ansi_escapes::strip(normalized.as_bytes());
    String::from_utf8_lossy(&stripped)
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_color_codes() {
        assert_eq!(sanitize_output("\x1b[31mred\x1b[0m text"), "red text");
    }

    #[test]
    fn test_normalizes_carriage_returns() {
        assert_eq!(sanitize_output("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_drops_control_characters() {
        assert_eq!(sanitize_output("ok\x07\x00\tdone\n"), "ok\tdone\n");
    }
}
