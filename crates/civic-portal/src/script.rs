//! Interaction scripts
//!
//! One command per line. Blank lines and lines starting with `#` are
//! skipped.
//!
//! ```text
//! reader on
//! wait 300
//! font 120
//! focus submit
//! insert Your feedback was received
//! ```

use std::str::FromStr;

use civic_a11y::ColorTheme;

/// Script parse error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("line {line}: unknown command `{command}`")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: `{command}` needs an argument")]
    MissingArgument { line: usize, command: String },

    #[error("line {line}: invalid value `{value}` for `{command}`")]
    InvalidValue { line: usize, command: String, value: String },
}

/// Scripted interaction with the portal page
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FontSize(u32),
    Preset(String),
    Theme(ColorTheme),
    ScreenReader(bool),
    HighContrast(bool),
    ReduceMotion(bool),
    FocusIndicators(bool),
    /// Focus the element with this id
    Focus(String),
    /// Insert a paragraph into the page's main region
    Insert(String),
    /// Announce text directly
    Announce(String),
    /// Sleep, then run one event-loop turn
    Wait(u64),
    Open,
    Reset,
    Status,
    Quit,
}

impl Command {
    /// Parse one line; Ok(None) for blank lines and comments
    pub fn parse_line(line: usize, text: &str) -> Result<Option<Self>, ScriptError> {
        let text = text.trim();
        if text.is_empty() || text.starts_with('#') {
            return Ok(None);
        }

        let (command, rest) = match text.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (text, ""),
        };
        let command = command.to_ascii_lowercase();

        let arg = || {
            if rest.is_empty() {
                Err(ScriptError::MissingArgument { line, command: command.clone() })
            } else {
                Ok(rest)
            }
        };
        let invalid = |value: &str| ScriptError::InvalidValue {
            line,
            command: command.clone(),
            value: value.to_string(),
        };
        let switch = |value: &str| match value.to_ascii_lowercase().as_str() {
            "on" | "true" | "yes" => Ok(true),
            "off" | "false" | "no" => Ok(false),
            _ => Err(invalid(value)),
        };

        let parsed = match command.as_str() {
            "font" => {
                let value = arg()?;
                Self::FontSize(value.parse().map_err(|_| invalid(value))?)
            }
            "preset" => Self::Preset(arg()?.to_string()),
            "theme" => {
                let value = arg()?;
                Self::Theme(ColorTheme::from_str(value).map_err(|_| invalid(value))?)
            }
            "reader" => Self::ScreenReader(switch(arg()?)?),
            "contrast" => Self::HighContrast(switch(arg()?)?),
            "motion" => Self::ReduceMotion(switch(arg()?)?),
            "indicators" => Self::FocusIndicators(switch(arg()?)?),
            "focus" => Self::Focus(arg()?.to_string()),
            "insert" => Self::Insert(arg()?.to_string()),
            "say" => Self::Announce(arg()?.to_string()),
            "wait" => {
                let value = arg()?;
                Self::Wait(value.parse().map_err(|_| invalid(value))?)
            }
            "open" => Self::Open,
            "reset" => Self::Reset,
            "status" => Self::Status,
            "quit" | "exit" => Self::Quit,
            other => {
                return Err(ScriptError::UnknownCommand { line, command: other.to_string() });
            }
        };
        Ok(Some(parsed))
    }
}

/// Parse a whole script
pub fn parse(source: &str) -> Result<Vec<Command>, ScriptError> {
    let mut commands = Vec::new();
    for (index, line) in source.lines().enumerate() {
        if let Some(command) = Command::parse_line(index + 1, line)? {
            commands.push(command);
        }
    }
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let script = "\
# enable and adjust
reader on
font 120
preset Extra Large
theme dark
insert Your feedback was received
wait 300
quit
";
        assert_eq!(
            parse(script).unwrap(),
            vec![
                Command::ScreenReader(true),
                Command::FontSize(120),
                Command::Preset("Extra Large".into()),
                Command::Theme(ColorTheme::Dark),
                Command::Insert("Your feedback was received".into()),
                Command::Wait(300),
                Command::Quit,
            ]
        );
    }

    #[test]
    fn test_switch_spellings() {
        assert_eq!(
            Command::parse_line(1, "CONTRAST yes").unwrap(),
            Some(Command::HighContrast(true))
        );
        assert_eq!(
            Command::parse_line(1, "motion off").unwrap(),
            Some(Command::ReduceMotion(false))
        );
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        assert_eq!(
            parse("reader on\nfly away"),
            Err(ScriptError::UnknownCommand { line: 2, command: "fly".into() })
        );
        assert_eq!(
            Command::parse_line(4, "font"),
            Err(ScriptError::MissingArgument { line: 4, command: "font".into() })
        );
        assert_eq!(
            Command::parse_line(5, "theme sepia"),
            Err(ScriptError::InvalidValue {
                line: 5,
                command: "theme".into(),
                value: "sepia".into()
            })
        );
    }
}
