use crate::cli::args::CliArgs;
use crate::controller::ViewMode;
use crate::output::OutputFormat;
use crate::query::SortKey;
use crate::stats::StatsSource;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.view.as_deref() {
        if ViewMode::parse(raw).is_none() {
            return Err(format!(
                "invalid --view '{raw}', expected collection, wantlist, or stats"
            ));
        }
    }
    for raw in args.sort.iter() {
        if SortKey::parse(raw).is_none() {
            return Err(format!(
                "invalid --sort '{raw}', expected artist, album, genre, or year"
            ));
        }
    }
    if let Some(raw) = args.source.as_deref() {
        if StatsSource::parse(raw).is_none() {
            return Err(format!(
                "invalid --source '{raw}', expected collection, wantlist, or all"
            ));
        }
    }
    if let Some(raw) = args.output_format.as_deref() {
        if OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --output-format '{raw}', expected text, json, or html"
            ));
        }
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected positive integer".to_string());
        }
    }
    if let Some(workers) = args.workers {
        if workers == 0 {
            return Err("invalid workers, expected positive integer".to_string());
        }
    }
    if let Some(top) = args.top_genres {
        if top == 0 {
            return Err("invalid top-genres, expected positive integer".to_string());
        }
    }
    if args.no_prefs && args.prefs.is_some() {
        return Err("--prefs and --no-prefs cannot be combined".to_string());
    }
    Ok(())
}
