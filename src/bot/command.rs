/// A slash command parsed from chat text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: String,
}

/// Parse `/name[@bot] args...`. Returns `None` for plain text.
///
/// The bot mention suffix is dropped and the argument text is trimmed of
/// surrounding whitespace, nothing else.
pub fn parse_command(text: &str) -> Option<Command> {
    let rest = text.strip_prefix('/')?;

    let (head, args) = match rest.find(char::is_whitespace) {
        Some(idx) => (&rest[..idx], rest[idx..].trim()),
        None => (rest, ""),
    };

    let name = head.split_once('@').map_or(head, |(name, _)| name);
    if name.is_empty() {
        return None;
    }

    Some(Command {
        name: name.to_string(),
        args: args.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(name: &str, args: &str) -> Option<Command> {
        Some(Command {
            name: name.to_string(),
            args: args.to_string(),
        })
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(parse_command("select 1"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command(" /start"), None);
        assert_eq!(parse_command("/"), None);
        assert_eq!(parse_command("/@teql_bot"), None);
    }

    #[test]
    fn test_bare_command() {
        assert_eq!(parse_command("/start"), cmd("start", ""));
        assert_eq!(parse_command("/connect"), cmd("connect", ""));
    }

    #[test]
    fn test_args_are_trimmed() {
        assert_eq!(
            parse_command("/query   SELECT * FROM t  \n"),
            cmd("query", "SELECT * FROM t")
        );
        assert_eq!(
            parse_command("/query\nSELECT 1;\nSELECT 2;"),
            cmd("query", "SELECT 1;\nSELECT 2;")
        );
    }

    #[test]
    fn test_bot_mention_is_stripped() {
        assert_eq!(
            parse_command("/query@teql_bot SELECT 1"),
            cmd("query", "SELECT 1")
        );
        assert_eq!(parse_command("/start@teql_bot"), cmd("start", ""));
    }
}
