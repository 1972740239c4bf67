// Line commands understood by the demo shell.

use anyhow::{bail, Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Execute-style: applies `n` now.
    Add(i64),
    /// Record-style: `n` is only applied on redo.
    Record(i64),
    Undo,
    Redo,
    Begin,
    End,
    Clear,
    State,
    /// Adds an execute-style operation whose execute fails.
    Fail,
}

impl Command {
    /// Parses one line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            return Ok(None);
        }

        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default().to_ascii_lowercase();
        let arg = words.next();
        if words.next().is_some() {
            bail!("Too many arguments: {line}");
        }

        let cmd = match (name.as_str(), arg) {
            ("add", Some(n)) => Self::Add(parse_amount(n)?),
            ("record", Some(n)) => Self::Record(parse_amount(n)?),
            ("add" | "record", None) => bail!("`{name}` needs an amount"),
            ("undo", None) => Self::Undo,
            ("redo", None) => Self::Redo,
            ("begin", None) => Self::Begin,
            ("end", None) => Self::End,
            ("clear", None) => Self::Clear,
            ("state", None) => Self::State,
            ("fail", None) => Self::Fail,
            (_, Some(_)) if is_known(&name) => bail!("`{name}` takes no arguments"),
            _ => bail!("Unknown command: {name}"),
        };
        Ok(Some(cmd))
    }
}

fn is_known(name: &str) -> bool {
    matches!(
        name,
        "undo" | "redo" | "begin" | "end" | "clear" | "state" | "fail"
    )
}

fn parse_amount(raw: &str) -> Result<i64> {
    raw.parse()
        .with_context(|| format!("Invalid amount: {raw}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amounts() {
        assert_eq!(Command::parse("add 5").unwrap(), Some(Command::Add(5)));
        assert_eq!(
            Command::parse("record -2").unwrap(),
            Some(Command::Record(-2))
        );
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Command::parse("  UNDO ").unwrap(), Some(Command::Undo));
        assert_eq!(Command::parse("Begin").unwrap(), Some(Command::Begin));
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(Command::parse("").unwrap(), None);
        assert_eq!(Command::parse("   # just a note").unwrap(), None);
        assert_eq!(Command::parse("redo # trailing").unwrap(), Some(Command::Redo));
    }

    #[test]
    fn test_errors() {
        assert!(Command::parse("add").is_err());
        assert!(Command::parse("add x").is_err());
        assert!(Command::parse("undo 3").is_err());
        assert!(Command::parse("add 1 2").is_err());
        assert!(Command::parse("jump").is_err());
    }
}
