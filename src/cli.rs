use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, ValueEnum};
use nimbus_weather::TemperatureUnit;

#[derive(Parser, Debug)]
#[command(name = "nimbus", version, about = "Terminal weather dashboard")]
pub struct Cli {
    #[arg(long, help = "Path to config.toml (default: platform config dir)")]
    pub config: Option<PathBuf>,
    #[arg(long, help = "Show the weather for a city and exit")]
    pub city: Option<String>,
    #[arg(long, conflicts_with = "city", help = "Show the weather where you are and exit")]
    pub locate: bool,
    #[arg(long, value_enum, help = "Switch the temperature unit before showing anything")]
    pub unit: Option<UnitArg>,
    #[arg(long, help = "Hide Kelvin, the hourly trend and air quality")]
    pub reduced: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitArg {
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl From<UnitArg> for TemperatureUnit {
    fn from(arg: UnitArg) -> Self {
        match arg {
            UnitArg::Celsius => TemperatureUnit::Celsius,
            UnitArg::Fahrenheit => TemperatureUnit::Fahrenheit,
            UnitArg::Kelvin => TemperatureUnit::Kelvin,
        }
    }
}

/// One line typed at the interactive prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(String),
    Locate,
    /// Cycle when no unit is given
    Unit(Option<TemperatureUnit>),
    Theme,
    Favorite,
    Unfavorite(String),
    Favorites,
    History,
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word {
            "" => return Err("empty command".to_string()),
            "search" | "s" if rest.is_empty() => return Err("usage: search <city>".to_string()),
            "search" | "s" => Command::Search(rest.to_string()),
            "locate" | "l" => Command::Locate,
            "unit" | "u" if rest.is_empty() => Command::Unit(None),
            "unit" | "u" => Command::Unit(Some(TemperatureUnit::from_str(rest).map_err(|e| e.to_string())?)),
            "theme" | "t" => Command::Theme,
            "fav" | "f" => Command::Favorite,
            "unfav" if rest.is_empty() => return Err("usage: unfav <city>".to_string()),
            "unfav" => Command::Unfavorite(rest.to_string()),
            "favs" => Command::Favorites,
            "history" | "h" => Command::History,
            "show" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            // Anything else is a city name
            _ => Command::Search(line.to_string()),
        };
        Ok(command)
    }
}

pub const HELP: &str = "\
Commands:
  <city> | search <city>   show the weather for a city
  locate                   show the weather where you are
  unit [celsius|fahrenheit|kelvin]
                           cycle or set the temperature unit
  theme                    cycle auto / light / dark
  fav                      add or remove the current city from favorites
  unfav <city>             remove a favorite
  favs                     list favorites
  history                  list recent searches
  show                     redraw the dashboard
  quit                     leave

A bare name that matches a command word runs the command;
use `search <city>` for names that clash with commands.";
