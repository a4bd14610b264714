use super::escape_html;
use crate::view::stats::StatsPanel;
use crate::view::{Screen, ScreenBody, StatsView, TableView, ToggleOption};
use crate::query::SortDirection;

const STYLE: &str = r#"
    :root {
      --bg: #f8fafc;
      --fg: #0f172a;
      --muted: #64748b;
      --card: #ffffff;
      --border: #e2e8f0;
      --accent: #135bec;
      --pending: #b45309;
    }
    [data-theme="dark"] {
      --bg: #0f172a;
      --fg: #f1f5f9;
      --muted: #94a3b8;
      --card: #1e293b;
      --border: #334155;
      --accent: #60a5fa;
      --pending: #fbbf24;
    }
    body { background: var(--bg); color: var(--fg); font-family: 'Inter', sans-serif; margin: 0; }
    header, main { max-width: 1100px; margin: 0 auto; padding: 1.5rem 2rem; }
    .view-toggle-button, .stats-source-button { border: 1px solid var(--border); background: var(--card); color: var(--fg); border-radius: 0.5rem; padding: 0.4rem 0.9rem; }
    .is-active { border-color: var(--accent); color: var(--accent); font-weight: 700; }
    .last-updated, .count, .loading { color: var(--muted); font-size: 0.85rem; }
    table { width: 100%; border-collapse: collapse; background: var(--card); }
    th, td { text-align: left; padding: 0.6rem 0.9rem; border-bottom: 1px solid var(--border); }
    th.sort-asc::after { content: " \25B2"; }
    th.sort-desc::after { content: " \25BC"; }
    tr.is-purchasing td { color: var(--pending); }
    .purchase-status { font-style: italic; font-size: 0.8rem; }
    .stats-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(320px, 1fr)); gap: 1.5rem; }
    .stats-card { background: var(--card); border: 1px solid var(--border); border-radius: 1rem; padding: 1.25rem; }
    .stats-genre-row { margin-bottom: 0.6rem; }
    .stats-genre-labels { display: flex; justify-content: space-between; font-size: 0.85rem; }
    .stats-genre-bar-track { background: var(--border); height: 0.5rem; border-radius: 999px; overflow: hidden; }
    .stats-genre-bar-fill { background: var(--accent); height: 100%; transform-origin: left; }
    .stats-decade-bars { display: flex; align-items: flex-end; gap: 0.5rem; height: 160px; }
    .stats-decade-bar { flex: 1; display: flex; flex-direction: column; align-items: center; justify-content: flex-end; height: 100%; }
    .stats-decade-column { background: var(--accent); width: 100%; height: 100%; transform-origin: bottom; border-radius: 0.25rem 0.25rem 0 0; }
    .stats-decade-label, .stats-decade-count { font-size: 0.75rem; color: var(--muted); }
    .stats-heatmap-grid { display: grid; gap: 2px; margin-top: 0.75rem; }
    .stats-heatmap-cell { height: 1.4rem; border-radius: 0.2rem; }
    .stats-heatmap-cell.is-empty { background: var(--border); opacity: 0.4; }
    .stats-heatmap-row-label { font-size: 0.75rem; white-space: nowrap; overflow: hidden; text-overflow: ellipsis; }
"#;

fn render_toggle(options: &[ToggleOption], class: &str, attr: &str) -> String {
    let mut out = String::new();
    for o in options {
        let active = if o.active { " is-active" } else { "" };
        out.push_str(&format!(
            r#"<button type="button" class="{class}{active}" {attr}="{}">{}</button>"#,
            escape_html(&o.value),
            escape_html(&o.label)
        ));
    }
    out
}

fn render_table(table: &TableView) -> String {
    let mut out = String::new();
    out.push_str(r#"<div class="table-wrapper"><table id="collection-table"><thead><tr>"#);
    for h in table.headers.iter() {
        let class = match h.sort {
            Some(SortDirection::Asc) => r#" class="sort-asc""#,
            Some(SortDirection::Desc) => r#" class="sort-desc""#,
            None => "",
        };
        out.push_str(&format!(
            r#"<th data-key="{}"{class}>{}</th>"#,
            h.key.as_str(),
            escape_html(&h.label)
        ));
    }
    out.push_str("</tr></thead><tbody>");

    if let Some(placeholder) = table.placeholder.as_deref() {
        out.push_str(&format!(
            r#"<tr><td colspan="4" class="loading">{}</td></tr>"#,
            escape_html(placeholder)
        ));
    } else {
        for r in table.rows.iter() {
            let class = if r.pending {
                r#" class="is-purchasing""#
            } else {
                ""
            };
            let status = match r.purchase_status.as_deref() {
                Some(s) => format!(r#" <span class="purchase-status">{}</span>"#, escape_html(s)),
                None => String::new(),
            };
            out.push_str(&format!(
                "<tr{class}><td>{}</td><td>{}</td><td>{}</td><td>{}{status}</td></tr>",
                escape_html(&r.artist),
                escape_html(&r.album),
                escape_html(&r.genre),
                escape_html(&r.year),
            ));
        }
    }
    out.push_str("</tbody></table></div>");
    out.push_str(&format!(
        r#"<p id="count" class="count">{}</p>"#,
        escape_html(&table.count_label)
    ));
    out
}

fn render_stats(panel: &StatsPanel) -> String {
    let mut genres = String::new();
    for g in panel.genres.iter() {
        genres.push_str(&format!(
            r#"<div class="stats-genre-row"><div class="stats-genre-labels"><span class="stats-genre-name">{}</span><span class="stats-genre-meta">{} · {}%</span></div><div class="stats-genre-bar-track"><div class="stats-genre-bar-fill" style="transform: scaleX({:.3})"></div></div></div>"#,
            escape_html(&g.name),
            g.count,
            g.percent,
            g.scale
        ));
    }

    let mut decades = String::new();
    for d in panel.decades.iter() {
        decades.push_str(&format!(
            r#"<div class="stats-decade-bar"><div class="stats-decade-column" style="transform: scaleY({:.3})"></div><div class="stats-decade-label">{}</div><div class="stats-decade-count">{}</div></div>"#,
            d.scale,
            escape_html(&d.label),
            d.count
        ));
    }

    let mut heatmap = String::from("<div></div>");
    for d in panel.heatmap.decades.iter() {
        heatmap.push_str(&format!(
            r#"<div class="stats-decade-label">{}</div>"#,
            escape_html(d)
        ));
    }
    for row in panel.heatmap.rows.iter() {
        heatmap.push_str(&format!(
            r#"<div class="stats-heatmap-row-label">{}</div>"#,
            escape_html(&row.genre)
        ));
        for cell in row.cells.iter() {
            if cell.is_empty() {
                heatmap.push_str(r#"<div class="stats-heatmap-cell is-empty"></div>"#);
            } else {
                heatmap.push_str(&format!(
                    r#"<div class="stats-heatmap-cell" title="{}" style="background-color: color-mix(in srgb, var(--accent) {}%, transparent); opacity: {:.2};"></div>"#,
                    cell.count, cell.color_percent, cell.opacity
                ));
            }
        }
    }

    format!(
        r#"<section id="stats-view">
      <div class="stats-header">
        <h2 class="stats-title">{title}</h2>
        <div class="stats-source-toggle">{sources}</div>
      </div>
      <div class="stats-grid">
        <article class="stats-card">
          <h3 class="stats-card-title">By genre</h3>
          <div class="stats-genre-list">{genres}</div>
        </article>
        <article class="stats-card">
          <h3 class="stats-card-title">By decade</h3>
          <div class="stats-decade-bars">{decades}</div>
          <div class="stats-heatmap">
            <h4 class="stats-card-title">Genre × decade</h4>
            <div class="stats-heatmap-grid" style="grid-template-columns: minmax(0, 5.5rem) repeat({columns}, minmax(0, 1fr));">{heatmap}</div>
          </div>
        </article>
      </div>
    </section>"#,
        title = escape_html(&panel.title),
        sources = render_toggle(&panel.sources, "stats-source-button", "data-source"),
        genres = genres,
        decades = decades,
        columns = panel.heatmap.decades.len(),
        heatmap = heatmap,
    )
}

pub fn render_html(screen: &Screen) -> Vec<u8> {
    let body = match &screen.body {
        ScreenBody::Table(table) => render_table(table),
        ScreenBody::Stats(StatsView::Empty { message }) => format!(
            r#"<section id="stats-view"><p class="loading">{}</p></section>"#,
            escape_html(message)
        ),
        ScreenBody::Stats(StatsView::Ready(panel)) => render_stats(panel),
    };
    let controls = if screen.show_controls && !screen.query.trim().is_empty() {
        format!(
            r#"<p class="controls">Search: <strong>{}</strong></p>"#,
            escape_html(screen.query.trim())
        )
    } else {
        String::new()
    };
    let last_updated = screen
        .last_updated
        .as_deref()
        .map(escape_html)
        .unwrap_or_default();

    let html = format!(
        r####"<!DOCTYPE html>
<html lang="en" data-theme="{theme}">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>Records</title>
  <style>{style}</style>
</head>
<body>
  <header>
    <h1>Records</h1>
    <nav class="view-toggle">{views}</nav>
    <p id="last-updated" class="last-updated">{last_updated}</p>
  </header>
  <main>
    {controls}
    {body}
  </main>
</body>
</html>
"####,
        theme = screen.theme.as_str(),
        style = STYLE,
        views = render_toggle(&screen.views, "view-toggle-button", "data-view"),
        last_updated = last_updated,
        controls = controls,
        body = body,
    );
    html.into_bytes()
}
