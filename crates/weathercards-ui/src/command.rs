//! Parsing of input lines into front-end commands.

use weathercards_core::InputError;

pub const HELP: &str = "\
Type a city name to see suggestions, or use a command:
  /search <name>          show the weather card for a city
  /pick <n>               show the n-th suggestion
  /edit <tempC> [text]    change the temperature (and description) of the shown city
  /delete                 delete the shown city (asks to confirm)
  /theme                  switch between light and dark
  /refresh                reload the dataset
  /list                   list all cities
  /help                   show this help
  /quit                   exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Text typed into the search box
    Type(String),
    Search(String),
    /// 1-based index into the current suggestions
    Pick(usize),
    Edit {
        temp_c: f64,
        description: Option<String>,
    },
    Delete,
    ToggleTheme,
    Refresh,
    List,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, InputError> {
        let line = line.trim_end_matches(['\r', '\n']);

        let Some(rest) = line.trim_start().strip_prefix('/') else {
            return Ok(Self::Type(line.to_string()));
        };

        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };

        match name.to_lowercase().as_str() {
            "search" | "s" => Ok(Self::Search(args.to_string())),
            "pick" | "p" => args
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map(Self::Pick)
                .ok_or_else(|| InputError::InvalidArgument(format!("pick {}", args))),
            "edit" | "e" => Self::parse_edit(args),
            "delete" | "d" => Ok(Self::Delete),
            "theme" | "t" => Ok(Self::ToggleTheme),
            "refresh" => Ok(Self::Refresh),
            "list" | "l" => Ok(Self::List),
            "help" | "h" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            _ => Err(InputError::UnknownCommand(name.to_string())),
        }
    }

    fn parse_edit(args: &str) -> Result<Self, InputError> {
        let (temp, description) = match args.split_once(char::is_whitespace) {
            Some((temp, description)) => (temp, Some(description.trim().to_string())),
            None => (args, None),
        };

        let temp_c = temp
            .parse::<f64>()
            .ok()
            .filter(|t| t.is_finite())
            .ok_or_else(|| InputError::InvalidArgument(format!("edit {}", args)))?;

        Ok(Self::Edit {
            temp_c,
            description: description.filter(|d| !d.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_typing() {
        assert_eq!(Command::parse("nai").unwrap(), Command::Type("nai".into()));
        assert_eq!(Command::parse("").unwrap(), Command::Type(String::new()));
    }

    #[test]
    fn test_search_keeps_full_name() {
        assert_eq!(
            Command::parse("/search  Dar es Salaam \n").unwrap(),
            Command::Search("Dar es Salaam".into())
        );
        assert_eq!(Command::parse("/search").unwrap(), Command::Search(String::new()));
    }

    #[test]
    fn test_pick_requires_positive_index() {
        assert_eq!(Command::parse("/pick 2").unwrap(), Command::Pick(2));
        assert!(Command::parse("/pick 0").is_err());
        assert!(Command::parse("/pick two").is_err());
    }

    #[test]
    fn test_edit_with_and_without_description() {
        assert_eq!(
            Command::parse("/edit 30 Heavy rain").unwrap(),
            Command::Edit {
                temp_c: 30.0,
                description: Some("Heavy rain".into())
            }
        );
        assert_eq!(
            Command::parse("/edit -2.5").unwrap(),
            Command::Edit {
                temp_c: -2.5,
                description: None
            }
        );
        assert!(Command::parse("/edit warm").is_err());
        assert!(Command::parse("/edit NaN").is_err());
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(Command::parse("/delete").unwrap(), Command::Delete);
        assert_eq!(Command::parse("/THEME").unwrap(), Command::ToggleTheme);
        assert_eq!(Command::parse("/quit").unwrap(), Command::Quit);
        assert!(matches!(
            Command::parse("/fly"),
            Err(InputError::UnknownCommand(name)) if name == "fly"
        ));
    }
}
