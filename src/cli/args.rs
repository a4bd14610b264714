use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "recordshelf",
    version,
    about = "record collection and wantlist browser",
    long_about = "Recordshelf renders a record collection and wantlist published as static JSON: a searchable, sortable table and a stats dashboard.\n\nExamples:\n  recordshelf -b https://records.example/\n  recordshelf -b ./data -m wantlist -q miles -s year -s year\n  recordshelf -b ./data -m stats --source all -o stats.html\n  recordshelf -b ./data -i\n\nTip: Use --config to persist the data location and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity on stderr (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the rendered screen to a file instead of stdout."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'A',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format: text, json, html (default: inferred from --output, else text)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'b',
        long = "base",
        visible_alias = "base-url",
        value_name = "URL|DIR",
        help_heading = "Input",
        help = "Where collection.json and wantlist.json live: an http(s) base URL or a local directory."
    )]
    pub base: Option<String>,

    #[arg(
        long = "cf",
        visible_alias = "collection-file",
        value_name = "NAME",
        help_heading = "Input",
        help = "Collection resource name (default: collection.json)."
    )]
    pub collection_file: Option<String>,

    #[arg(
        long = "wf",
        visible_alias = "wantlist-file",
        value_name = "NAME",
        help_heading = "Input",
        help = "Wantlist resource name (default: wantlist.json)."
    )]
    pub wantlist_file: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.recordshelf/config.yml when present)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "ic",
        visible_alias = "init-config",
        help_heading = "Input",
        help = "Write a default config file (to --config or ~/.recordshelf/config.yml) and exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'm',
        long = "vw",
        visible_alias = "view",
        value_name = "VIEW",
        help_heading = "View",
        help = "View to show: collection, wantlist, stats (default: last used)."
    )]
    pub view: Option<String>,

    #[arg(
        short = 'q',
        long = "sq",
        visible_alias = "search",
        value_name = "TEXT",
        help_heading = "View",
        help = "Filter rows by artist, album or genre (case-insensitive substring)."
    )]
    pub search: Option<String>,

    #[arg(
        short = 's',
        long = "st",
        visible_alias = "sort",
        value_name = "KEY",
        action = ArgAction::Append,
        help_heading = "View",
        help = "Click a column header: artist, album, genre, year (repeatable; the same key twice sorts descending)."
    )]
    pub sort: Vec<String>,

    #[arg(
        long = "src",
        visible_alias = "source",
        value_name = "SOURCE",
        help_heading = "View",
        help = "Stats source: collection, wantlist, all."
    )]
    pub source: Option<String>,

    #[arg(
        long = "tt",
        visible_alias = "toggle-theme",
        help_heading = "View",
        help = "Toggle the light/dark theme (persisted)."
    )]
    pub toggle_theme: bool,

    #[arg(
        short = 'i',
        long = "it",
        visible_alias = "interactive",
        help_heading = "View",
        help = "Read view commands from stdin and re-render after each (type 'help')."
    )]
    pub interactive: bool,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "Performance",
        help = "Per-request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'w',
        long = "wk",
        visible_alias = "workers",
        value_name = "N",
        help_heading = "Performance",
        help = "Number of runtime worker threads."
    )]
    pub workers: Option<usize>,

    #[arg(
        long = "tg",
        visible_alias = "top-genres",
        value_name = "N",
        help_heading = "Stats",
        help = "Genres shown before the rest is folded into \"Other\" (default: 10)."
    )]
    pub top_genres: Option<usize>,

    #[arg(
        long = "pf",
        visible_alias = "prefs",
        value_name = "FILE",
        help_heading = "Preferences",
        help = "Preference file (defaults to ~/.recordshelf/preferences.yml)."
    )]
    pub prefs: Option<String>,

    #[arg(
        long = "np",
        visible_alias = "no-prefs",
        help_heading = "Preferences",
        help = "Keep theme and view for this session only."
    )]
    pub no_prefs: bool,
}
