//! Line commands accepted in interactive mode.

use crate::controller::{UiEvent, ViewMode};
use crate::query::SortKey;
use crate::stats::StatsSource;

pub const HELP: &str = "commands:
  view <collection|wantlist|stats>   switch view
  search [text]                      filter rows (no text clears)
  sort <artist|album|genre|year>     click a column header
  source <collection|wantlist|all>   stats source
  theme                              toggle light/dark
  reload                             fetch the data again
  help                               show this help
  quit                               exit
";

#[derive(Clone, Debug)]
pub enum Command {
    Event(UiEvent),
    Reload,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    let command = match head.to_lowercase().as_str() {
        "view" | "v" => {
            let mode = ViewMode::parse(rest).ok_or_else(|| format!("unknown view '{rest}'"))?;
            Command::Event(UiEvent::SetView(mode))
        }
        // shortcuts for the view toggle buttons
        "collection" | "wantlist" | "stats" => match ViewMode::parse(head) {
            Some(mode) => Command::Event(UiEvent::SetView(mode)),
            None => return Err(format!("unknown view '{head}'")),
        },
        "search" | "/" => Command::Event(UiEvent::Search(rest.to_string())),
        "sort" | "s" => {
            let key = SortKey::parse(rest).ok_or_else(|| format!("unknown sort key '{rest}'"))?;
            Command::Event(UiEvent::ClickSort(key))
        }
        "source" => {
            let source =
                StatsSource::parse(rest).ok_or_else(|| format!("unknown stats source '{rest}'"))?;
            Command::Event(UiEvent::SetStatsSource(source))
        }
        "theme" | "t" => Command::Event(UiEvent::ToggleTheme),
        "reload" | "r" => Command::Reload,
        "help" | "?" | "h" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{other}' (type 'help')")),
    };
    Ok(Some(command))
}
