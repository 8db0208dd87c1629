#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Argument {
    pub(crate) text: String,
    /// The token was written in double quotes (or inside a quote left open at the end).
    pub(crate) quoted: bool,
}

impl Argument {
    fn new(text: &mut String, quoted: bool) -> Self {
        Argument {
            text: std::mem::take(text),
            quoted,
        }
    }
}

/// Splits free-form user arguments into tokens.
///
/// Unquoted spaces separate tokens, `"` opens and closes a quoted token, `\` escapes the
/// next character. Only `\\` and `\"` are real escapes; any other `\x` is kept as written.
/// Empty tokens are dropped.
pub(crate) fn split_command_line_arguments(input: &str) -> Vec<Argument> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    let mut in_quotes = false;

    for c in input.chars() {
        if escaped {
            escaped = false;
            if c != '\\' && c != '"' {
                current.push('\\');
            }
            current.push(c);
        } else if in_quotes {
            match c {
                '\\' => escaped = true,
                '"' => {
                    in_quotes = false;
                    if !current.is_empty() {
                        args.push(Argument::new(&mut current, true));
                    }
                }
                _ => current.push(c),
            }
        } else {
            match c {
                '\\' => escaped = true,
                '"' => {
                    in_quotes = true;
                    if !current.is_empty() {
                        args.push(Argument::new(&mut current, false));
                    }
                }
                ' ' => {
                    if !current.is_empty() {
                        args.push(Argument::new(&mut current, false));
                    }
                }
                _ => current.push(c),
            }
        }
    }

    if escaped {
        current.push('\\');
    }
    if !current.is_empty() {
        args.push(Argument::new(&mut current, in_quotes));
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(args: &[Argument]) -> Vec<&str> {
        args.iter().map(|a| a.text.as_str()).collect()
    }

    #[test]
    fn splits_on_unquoted_spaces_only() {
        let args = split_command_line_arguments(r#"foo "bar baz" qux\"x"#);
        assert_eq!(texts(&args), vec!["foo", "bar baz", "qux\"x"]);
        assert!(!args[0].quoted);
        assert!(args[1].quoted);
        assert!(!args[2].quoted);
    }

    #[test]
    fn escapes_inside_quotes() {
        let args = split_command_line_arguments(r#""say \"hi\" \\ now""#);
        assert_eq!(texts(&args), vec![r#"say "hi" \ now"#]);
        assert!(args[0].quoted);
    }

    #[test]
    fn other_escape_sequences_pass_through() {
        let args = split_command_line_arguments(r#""C:\games\doom" \n"#);
        assert_eq!(texts(&args), vec![r"C:\games\doom", r"\n"]);
    }

    #[test]
    fn unterminated_quote_is_flagged_and_empty_tokens_dropped() {
        let args = split_command_line_arguments(r#"  +set  ""  "open end"#);
        assert_eq!(texts(&args), vec!["+set", "open end"]);
        assert!(!args[0].quoted);
        assert!(args[1].quoted);
    }

    #[test]
    fn quote_glued_to_text_starts_new_token() {
        let args = split_command_line_arguments(r#"-file"a b.wad""#);
        assert_eq!(texts(&args), vec!["-file", "a b.wad"]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(split_command_line_arguments("").is_empty());
        assert!(split_command_line_arguments("   ").is_empty());
    }
}
