use colored::{ColoredString, Colorize};

use crate::controller::Theme;
use crate::query::SortDirection;
use crate::view::stats::{HeatmapCell, StatsPanel};
use crate::view::{Screen, ScreenBody, StatsView, TableView, ToggleOption};

const MAX_COLUMN_WIDTH: usize = 36;
const BAR_WIDTH: usize = 24;
const SHADES: [char; 4] = ['░', '▒', '▓', '█'];

fn accent(value: &str, theme: Theme) -> ColoredString {
    match theme {
        Theme::Dark => value.bold().bright_cyan(),
        Theme::Light => value.bold().blue(),
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    let mut out = value.to_string();
    out.extend(std::iter::repeat(' ').take(width.saturating_sub(len)));
    out
}

fn bar(scale: f64, width: usize) -> String {
    let filled = ((scale.clamp(0.0, 1.0)) * width as f64).round() as usize;
    let mut out = "█".repeat(filled);
    out.push_str(&"·".repeat(width - filled));
    out
}

fn shade(cell: &HeatmapCell) -> char {
    if cell.is_empty() {
        return '·';
    }
    let idx = (cell.intensity * (SHADES.len() - 1) as f64).round() as usize;
    SHADES[idx.min(SHADES.len() - 1)]
}

fn render_toggle(options: &[ToggleOption], theme: Theme) -> String {
    options
        .iter()
        .map(|o| {
            if o.active {
                format!("[{}]", accent(&o.label, theme))
            } else {
                format!(" {} ", o.label.dimmed())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_table(out: &mut String, table: &TableView, theme: Theme) {
    let header_labels: Vec<String> = table
        .headers
        .iter()
        .map(|h| match h.sort {
            Some(SortDirection::Asc) => format!("{} ▲", h.label.to_uppercase()),
            Some(SortDirection::Desc) => format!("{} ▼", h.label.to_uppercase()),
            None => h.label.to_uppercase(),
        })
        .collect();

    let cells: Vec<[String; 4]> = table
        .rows
        .iter()
        .map(|r| {
            let year = match r.purchase_status.as_deref() {
                Some(status) => format!("{} {}", r.year, status).trim().to_string(),
                None => r.year.clone(),
            };
            [
                truncate(&r.artist, MAX_COLUMN_WIDTH),
                truncate(&r.album, MAX_COLUMN_WIDTH),
                truncate(&r.genre, MAX_COLUMN_WIDTH),
                year,
            ]
        })
        .collect();

    let mut widths = [0usize; 4];
    for (i, label) in header_labels.iter().enumerate().take(4) {
        widths[i] = label.chars().count();
    }
    for row in cells.iter() {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let header_line = header_labels
        .iter()
        .enumerate()
        .map(|(i, l)| pad(l, widths[i]))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(&format!("{}\n", header_line.bold()));

    if let Some(placeholder) = table.placeholder.as_deref() {
        out.push_str(&format!("{}\n", placeholder.italic().dimmed()));
    } else {
        for (row, cell) in table.rows.iter().zip(cells.iter()) {
            let line = cell
                .iter()
                .enumerate()
                .map(|(i, c)| pad(c, widths[i]))
                .collect::<Vec<_>>()
                .join("  ");
            if row.pending {
                out.push_str(&format!("{}\n", line.yellow()));
            } else {
                out.push_str(&line);
                out.push('\n');
            }
        }
    }

    if !table.count_label.is_empty() {
        out.push('\n');
        out.push_str(&format!("{}\n", table.count_label.dimmed()));
    }
}

fn render_stats(out: &mut String, panel: &StatsPanel, theme: Theme) {
    out.push_str(&format!(
        "{}   {}\n\n",
        accent(&panel.title, theme),
        render_toggle(&panel.sources, theme)
    ));

    out.push_str(&format!("{}\n", "By genre".bold()));
    let name_width = panel
        .genres
        .iter()
        .map(|g| g.name.chars().count().min(MAX_COLUMN_WIDTH))
        .max()
        .unwrap_or(0);
    for g in panel.genres.iter() {
        out.push_str(&format!(
            "  {}  {}  {} · {}%\n",
            pad(&truncate(&g.name, MAX_COLUMN_WIDTH), name_width),
            accent(&bar(g.scale, BAR_WIDTH), theme),
            g.count,
            g.percent
        ));
    }

    out.push('\n');
    out.push_str(&format!("{}\n", "By decade".bold()));
    let label_width = panel
        .decades
        .iter()
        .map(|d| d.label.chars().count())
        .max()
        .unwrap_or(0);
    for d in panel.decades.iter() {
        out.push_str(&format!(
            "  {}  {}  {}\n",
            pad(&d.label, label_width),
            accent(&bar(d.scale, BAR_WIDTH), theme),
            d.count
        ));
    }

    out.push('\n');
    out.push_str(&format!("{}\n", "Genre × decade".bold()));
    let col_width = panel
        .heatmap
        .decades
        .iter()
        .map(|d| d.chars().count())
        .max()
        .unwrap_or(1)
        .max(3);
    let mut header = format!("  {}", pad("", name_width));
    for d in panel.heatmap.decades.iter() {
        header.push_str(&format!(" {}", pad(d, col_width)));
    }
    out.push_str(&format!("{}\n", header.dimmed()));
    for row in panel.heatmap.rows.iter() {
        let mut line = format!(
            "  {}",
            pad(&truncate(&row.genre, MAX_COLUMN_WIDTH), name_width)
        );
        for cell in row.cells.iter() {
            let glyph = shade(cell).to_string();
            let glyph = pad(&glyph, col_width);
            if cell.is_empty() {
                line.push_str(&format!(" {}", glyph.dimmed()));
            } else {
                line.push_str(&format!(" {}", accent(&glyph, theme)));
            }
        }
        out.push_str(&line);
        out.push('\n');
    }
}

pub fn render_text(screen: &Screen) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(&render_toggle(&screen.views, screen.theme));
    out.push('\n');
    if let Some(updated) = screen.last_updated.as_deref() {
        out.push_str(&format!("{}\n", updated.dimmed()));
    }
    out.push('\n');

    if screen.show_controls && !screen.query.trim().is_empty() {
        out.push_str(&format!(
            "{} {}\n\n",
            "search ::".bold().white(),
            screen.query.trim().bold().blue()
        ));
    }

    match &screen.body {
        ScreenBody::Table(table) => render_table(&mut out, table, screen.theme),
        ScreenBody::Stats(StatsView::Empty { message }) => {
            out.push_str(&format!("{}\n", message.italic().dimmed()));
        }
        ScreenBody::Stats(StatsView::Ready(panel)) => render_stats(&mut out, panel, screen.theme),
    }
    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(bar(0.5, 4), "██··");
        assert_eq!(bar(1.0, 3), "███");
        assert_eq!(bar(0.0, 2), "··");
    }

    #[test]
    fn long_values_are_truncated() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
