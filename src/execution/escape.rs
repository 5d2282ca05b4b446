//! POSIX shell escaping.
//!
//! Two layers are applied when building a command: the template is
//! metacharacter-escaped with [`escape_shell_cmd`], and every argument is
//! turned into a single opaque token with [`escape_shell_arg`].

/// Characters prefixed with a backslash by [`escape_shell_cmd`].
const META_CHARS: &[char] = &[
    '#', '&', ';', '`', '|', '*', '?', '~', '<', '>', '^', '(', ')', '[', ']', '{', '}', '$',
    '\\', '\n',
];

/// Escape shell metacharacters in a whole command line.
///
/// Quotes are left alone only when they come in pairs; an unpaired `'` or
/// `"` is escaped. While a pair is open, the other quote kind is escaped.
pub fn escape_shell_cmd(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 8);
    // Index of the closing partner of the currently open quote.
    let mut pending: Option<usize> = None;

    for (i, &ch) in chars.iter().enumerate() {
        match ch {
            '\'' | '"' => {
                match pending {
                    None => {
                        pending = chars[i + 1..]
                            .iter()
                            .position(|&c| c == ch)
                            .map(|offset| i + 1 + offset);
                        if pending.is_none() {
                            out.push('\\');
                        }
                    }
                    Some(close) if close == i => pending = None,
                    Some(_) => out.push('\\'),
                }
                out.push(ch);
            }
            c if META_CHARS.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }

    out
}

/// Quote a single argument so the shell sees it as one literal token.
///
/// The value is wrapped in single quotes and each embedded `'` becomes
/// `'\''` (close, escaped quote, reopen).
pub fn escape_shell_arg(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_plain() {
        assert_eq!(escape_shell_arg("hello"), "'hello'");
    }

    #[test]
    fn test_arg_empty() {
        assert_eq!(escape_shell_arg(""), "''");
    }

    #[test]
    fn test_arg_embedded_quote() {
        assert_eq!(escape_shell_arg("O'Brien"), "'O'\\''Brien'");
    }

    #[test]
    fn test_arg_metacharacters_stay_inside_quotes() {
        assert_eq!(escape_shell_arg("; rm -rf /"), "'; rm -rf /'");
        assert_eq!(escape_shell_arg("$(id)`id`"), "'$(id)`id`'");
    }

    #[test]
    fn test_cmd_plain_untouched() {
        assert_eq!(escape_shell_cmd("git log -n %s"), "git log -n %s");
    }

    #[test]
    fn test_cmd_escapes_metacharacters() {
        assert_eq!(escape_shell_cmd("ls; rm -rf /"), "ls\\; rm -rf /");
        assert_eq!(escape_shell_cmd("echo $(id)"), "echo \\$\\(id\\)");
        assert_eq!(escape_shell_cmd("a | b > c"), "a \\| b \\> c");
        assert_eq!(escape_shell_cmd("a\\b"), "a\\\\b");
        assert_eq!(escape_shell_cmd("a\nb"), "a\\\nb");
    }

    #[test]
    fn test_cmd_paired_quotes_kept() {
        assert_eq!(escape_shell_cmd("echo 'a b'"), "echo 'a b'");
        assert_eq!(escape_shell_cmd("echo \"a b\""), "echo \"a b\"");
    }

    #[test]
    fn test_cmd_unpaired_quote_escaped() {
        assert_eq!(escape_shell_cmd("echo it's"), "echo it\\'s");
        assert_eq!(escape_shell_cmd("echo \"open"), "echo \\\"open");
    }

    #[test]
    fn test_cmd_other_quote_inside_pair_escaped() {
        assert_eq!(escape_shell_cmd("echo 'say \"hi'"), "echo 'say \\\"hi'");
    }

    #[test]
    fn test_cmd_percent_untouched() {
        assert_eq!(escape_shell_cmd("%s %% 100%"), "%s %% 100%");
    }
}
