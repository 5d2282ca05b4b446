//! printf-style template substitution.

use thiserror::Error;

/// Template substitution errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The template has more `%s` placeholders than arguments.
    #[error("template expects {expected} arguments, {given} given")]
    TooFewArguments { expected: usize, given: usize },

    /// Arguments were left over after every placeholder was filled.
    #[error("template expects {expected} arguments, {given} given")]
    TooManyArguments { expected: usize, given: usize },

    /// A `%` was followed by something other than `s` or `%`.
    #[error("unsupported conversion '%{0}' (only %s and %% are allowed)")]
    UnsupportedConversion(char),

    /// The template ends in a lone `%`.
    #[error("template ends with a dangling '%'")]
    TrailingPercent,
}

/// Count the `%s` placeholders in a template.
pub fn placeholder_count(template: &str) -> Result<usize, FormatError> {
    let mut count = 0;
    let mut chars = template.chars();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            continue;
        }
        match chars.next() {
            Some('s') => count += 1,
            Some('%') => {}
            Some(other) => return Err(FormatError::UnsupportedConversion(other)),
            None => return Err(FormatError::TrailingPercent),
        }
    }
    Ok(count)
}

/// Substitute `args` into the `%s` placeholders of `template`, in order.
///
/// `%%` produces a literal `%`. The number of placeholders must equal
/// `args.len()`.
pub fn format_template<S: AsRef<str>>(template: &str, args: &[S]) -> Result<String, FormatError> {
    let expected = placeholder_count(template)?;
    if expected > args.len() {
        return Err(FormatError::TooFewArguments {
            expected,
            given: args.len(),
        });
    }
    if expected < args.len() {
        return Err(FormatError::TooManyArguments {
            expected,
            given: args.len(),
        });
    }

    let extra: usize = args.iter().map(|a| a.as_ref().len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut args = args.iter();
    let mut chars = template.chars();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        // placeholder_count already rejected everything but %s and %%
        match chars.next() {
            Some('s') => {
                if let Some(arg) = args.next() {
                    out.push_str(arg.as_ref());
                }
            }
            _ => out.push('%'),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_in_order() {
        let out = format_template("cp %s %s", &["a", "b"]).unwrap();
        assert_eq!(out, "cp a b");
    }

    #[test]
    fn test_no_placeholders() {
        let out = format_template::<&str>("ls -la", &[]).unwrap();
        assert_eq!(out, "ls -la");
    }

    #[test]
    fn test_literal_percent() {
        let out = format_template("date +%%Y %s", &["x"]).unwrap();
        assert_eq!(out, "date +%Y x");
    }

    #[test]
    fn test_argument_text_not_reinterpreted() {
        let out = format_template("echo %s", &["%s %%"]).unwrap();
        assert_eq!(out, "echo %s %%");
    }

    #[test]
    fn test_too_few_arguments() {
        let err = format_template("%s %s", &["a"]).unwrap_err();
        assert_eq!(
            err,
            FormatError::TooFewArguments {
                expected: 2,
                given: 1
            }
        );
    }

    #[test]
    fn test_too_many_arguments() {
        let err = format_template("%s", &["a", "b"]).unwrap_err();
        assert_eq!(
            err,
            FormatError::TooManyArguments {
                expected: 1,
                given: 2
            }
        );
    }

    #[test]
    fn test_unsupported_conversion() {
        let err = format_template("%d", &["1"]).unwrap_err();
        assert_eq!(err, FormatError::UnsupportedConversion('d'));
    }

    #[test]
    fn test_trailing_percent() {
        let err = format_template::<&str>("100%", &[]).unwrap_err();
        assert_eq!(err, FormatError::TrailingPercent);
    }

    #[test]
    fn test_placeholder_count() {
        assert_eq!(placeholder_count("%s %% %s").unwrap(), 2);
        assert_eq!(placeholder_count("").unwrap(), 0);
    }
}
