//! Turns one raw input line into a line edit or a command.

use crate::error::EditorError;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Blank or whitespace-only input; nothing to do.
    Blank,
    /// `<number> <content>`: store `content` verbatim under `line`.
    LineEdit { line: i64, content: String },
    /// `<name> <args...>`: a named command with whitespace-separated arguments.
    Command { name: String, args: Vec<String> },
}

/// Tokenise a raw input line.
///
/// A first word made only of digits starts a line edit whose content is the rest of
/// the input after one delimiter character, kept verbatim. Anything else is a
/// command whose arguments are split on whitespace.
pub fn tokenise(raw: &str) -> Result<Token, EditorError> {
    let input = raw.trim_start();

    let mut words = input.split_whitespace();
    let Some(first) = words.next() else {
        return Ok(Token::Blank);
    };

    if first.bytes().all(|b| b.is_ascii_digit()) {
        let line = first
            .parse::<i64>()
            .map_err(|_| EditorError::MalformedArgument(first.to_string()))?;

        let mut rest = input[first.len()..].chars();
        rest.next();

        return Ok(Token::LineEdit {
            line,
            content: rest.as_str().to_string(),
        });
    }

    Ok(Token::Command {
        name: first.to_string(),
        args: words.map(str::to_string).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(name: &str, args: &[&str]) -> Token {
        Token::Command {
            name: name.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_blank_input() {
        assert_eq!(tokenise(""), Ok(Token::Blank));
        assert_eq!(tokenise("   \t  "), Ok(Token::Blank));
        assert_eq!(tokenise("\n"), Ok(Token::Blank));
    }

    #[test]
    fn test_single_word_command() {
        assert_eq!(tokenise("cmd"), Ok(command("cmd", &[])));
    }

    #[test]
    fn test_command_with_arguments() {
        assert_eq!(tokenise("cmd 0 1"), Ok(command("cmd", &["0", "1"])));
        assert_eq!(
            tokenise("  exec   ls  -la  "),
            Ok(command("exec", &["ls", "-la"]))
        );
    }

    #[test]
    fn test_command_name_keeps_case() {
        assert_eq!(tokenise("LIST 1"), Ok(command("LIST", &["1"])));
    }

    #[test]
    fn test_bare_number_clears_content() {
        assert_eq!(
            tokenise("1"),
            Ok(Token::LineEdit {
                line: 1,
                content: String::new(),
            })
        );
    }

    #[test]
    fn test_line_edit_content() {
        assert_eq!(
            tokenise("1 printf(\"hello world\")"),
            Ok(Token::LineEdit {
                line: 1,
                content: "printf(\"hello world\")".to_string(),
            })
        );
    }

    #[test]
    fn test_line_edit_keeps_whitespace_after_delimiter() {
        assert_eq!(
            tokenise("20     Buzz  "),
            Ok(Token::LineEdit {
                line: 20,
                content: "    Buzz  ".to_string(),
            })
        );
        assert_eq!(
            tokenise("30\tx"),
            Ok(Token::LineEdit {
                line: 30,
                content: "x".to_string(),
            })
        );
    }

    #[test]
    fn test_zero_is_still_a_line_edit() {
        assert!(matches!(tokenise("0 x"), Ok(Token::LineEdit { line: 0, .. })));
    }

    #[test]
    fn test_mixed_word_is_a_command() {
        assert_eq!(tokenise("10x y"), Ok(command("10x", &["y"])));
        assert_eq!(tokenise("-5 y"), Ok(command("-5", &["y"])));
    }

    #[test]
    fn test_oversized_line_number() {
        assert_eq!(
            tokenise("99999999999999999999 x"),
            Err(EditorError::MalformedArgument(
                "99999999999999999999".to_string()
            ))
        );
    }
}
