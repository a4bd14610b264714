use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::catalog::{Catalog, CatalogItem, CatalogMeta, ItemId};
use crate::controller::{LoadState, Theme, UiEvent, ViewController, ViewMode};
use crate::loader::{DataLoader, LoadError, LoaderOptions, Source};
use crate::prefs::{PreferenceStore, THEME_KEY, VIEW_KEY};
use crate::query::{self, SortDirection, SortKey, SortSpec};
use crate::stats::{self, StatsPolicy, StatsSource};
use crate::view::{ScreenBody, StatsView};

fn meta(json: &str) -> CatalogMeta {
    CatalogMeta::from_json(json).unwrap()
}

fn sample_collection() -> CatalogMeta {
    meta(
        r#"{
            "updated_at": "2024-03-01T12:00:00Z",
            "items": [
                {"id": 1, "artist": "Miles Davis", "album": "Kind of Blue", "genre": "Jazz", "year": 1959},
                {"id": 2, "artist": "can", "album": "Tago Mago", "genre": "Rock", "year": "1971"},
                {"id": 3, "artist": "Björk", "album": "Homogenic", "genre": "Electronic, Pop", "year": 1997},
                {"id": 4, "artist": "Alice Coltrane", "album": "Journey in Satchidananda", "genre": "Jazz", "year": 0}
            ]
        }"#,
    )
}

fn sample_wantlist() -> CatalogMeta {
    meta(
        r#"{
            "updated_at": "2023-06-15T12:00:00Z",
            "items": [
                {"id": 42, "artist": "Sun Ra", "album": "Lanquidity", "genre": "Jazz", "year": 1978, "purchasing": true},
                {"id": 2, "artist": "Can", "album": "Tago Mago", "genre": "Rock", "year": 1971, "purchasing": true},
                {"id": 7, "artist": "Nala Sinephro", "album": "Space 1.8", "genre": "Jazz", "year": 2021}
            ]
        }"#,
    )
}

// preference store the test can still inspect after handing it to a controller
#[derive(Clone, Default)]
struct SharedStore(Arc<Mutex<BTreeMap<String, String>>>);

impl SharedStore {
    fn with(values: &[(&str, &str)]) -> Self {
        let store = Self::default();
        for (k, v) in values {
            store.0.lock().unwrap().insert(k.to_string(), v.to_string());
        }
        store
    }

    fn value(&self, key: &str) -> Option<String> {
        self.0.lock().unwrap().get(key).cloned()
    }
}

impl PreferenceStore for SharedStore {
    fn get(&self, key: &str) -> Option<String> {
        self.value(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        self.0.lock().unwrap().insert(key.to_string(), value.to_string());
    }
}

fn loaded_controller(store: SharedStore, wantlist: Option<CatalogMeta>) -> ViewController {
    let mut controller = ViewController::new(Box::new(store), StatsPolicy::default());
    controller.restore_preferences(Theme::Light);
    controller.finish_load(Ok(Catalog::new(sample_collection(), wantlist)));
    controller
}

fn artists(items: &[&CatalogItem]) -> Vec<String> {
    items.iter().map(|i| i.artist.clone()).collect()
}

#[test]
fn empty_query_keeps_every_item_in_order() {
    let collection = sample_collection();
    let filtered = query::filter_items(&collection.items, "   ");
    assert_eq!(filtered.len(), collection.items.len());
    assert_eq!(
        artists(&filtered),
        vec!["Miles Davis", "can", "Björk", "Alice Coltrane"]
    );
}

#[test]
fn query_matches_artist_album_or_genre_case_insensitively() {
    let collection = sample_collection();
    assert_eq!(
        artists(&query::filter_items(&collection.items, " JAZZ ")),
        vec!["Miles Davis", "Alice Coltrane"]
    );
    assert_eq!(
        artists(&query::filter_items(&collection.items, "mago")),
        vec!["can"]
    );
    assert!(query::filter_items(&collection.items, "1959").is_empty());
}

#[test]
fn sort_is_case_insensitive_and_descending_reverses() {
    let collection = sample_collection();
    let asc = query::apply(&collection.items, "", SortSpec::default());
    assert_eq!(
        artists(&asc),
        vec!["Alice Coltrane", "Björk", "can", "Miles Davis"]
    );

    let desc = query::apply(
        &collection.items,
        "",
        SortSpec {
            key: SortKey::Artist,
            direction: SortDirection::Desc,
        },
    );
    let mut reversed = artists(&asc);
    reversed.reverse();
    assert_eq!(artists(&desc), reversed);
}

#[test]
fn sort_keeps_ties_in_source_order_both_ways() {
    let items = meta(
        r#"{"items": [
            {"artist": "B", "album": "first"},
            {"artist": "a", "album": "x"},
            {"artist": "b", "album": "second"}
        ]}"#,
    )
    .items;
    let asc = query::apply(&items, "", SortSpec::default());
    let albums: Vec<&str> = asc.iter().map(|i| i.album.as_str()).collect();
    assert_eq!(albums, vec!["x", "first", "second"]);

    let desc = query::apply(
        &items,
        "",
        SortSpec {
            key: SortKey::Artist,
            direction: SortDirection::Desc,
        },
    );
    let albums: Vec<&str> = desc.iter().map(|i| i.album.as_str()).collect();
    assert_eq!(albums, vec!["first", "second", "x"]);
}

#[test]
fn year_sort_treats_missing_as_blank() {
    let items = meta(
        r#"{"items": [
            {"artist": "a", "year": 1990},
            {"artist": "b"},
            {"artist": "c", "year": "1985"}
        ]}"#,
    )
    .items;
    let sorted = query::apply(
        &items,
        "",
        SortSpec {
            key: SortKey::Year,
            direction: SortDirection::Asc,
        },
    );
    assert_eq!(artists(&sorted), vec!["b", "c", "a"]);
}

#[test]
fn header_clicks_toggle_then_reset() {
    let mut spec = SortSpec::default();
    spec.click(SortKey::Artist);
    assert_eq!(spec.direction, SortDirection::Desc);
    spec.click(SortKey::Year);
    assert_eq!(spec.key, SortKey::Year);
    assert_eq!(spec.direction, SortDirection::Asc);
    spec.click(SortKey::Year);
    assert_eq!(spec.direction, SortDirection::Desc);
}

#[test]
fn stats_count_genres_decades_and_matrix() {
    let items = meta(
        r#"{"items": [
            {"genre": "Rock", "year": 1971},
            {"genre": "Rock, Jazz", "year": 1971},
            {"genre": "Jazz", "year": 1985}
        ]}"#,
    )
    .items;
    let refs: Vec<&CatalogItem> = items.iter().collect();
    let data = stats::build_stats(&refs, &StatsPolicy::default());

    assert_eq!(
        data.genres,
        vec![("Rock".to_string(), 2), ("Jazz".to_string(), 2)]
    );
    assert_eq!(
        data.decades,
        vec![("70s".to_string(), 2), ("80s".to_string(), 1)]
    );
    assert_eq!(data.matrix.get("Rock", "70s"), 2);
    assert_eq!(data.matrix.get("Jazz", "70s"), 1);
    assert_eq!(data.matrix.get("Jazz", "80s"), 1);
    assert_eq!(data.matrix.get("Rock", "80s"), 0);
    assert_eq!(data.total_genre_count, 4);
    assert_eq!(data.max_cell_count, 2);
}

#[test]
fn decades_follow_the_wrapped_order() {
    let mut decades: Vec<(String, usize)> = ["Unknown", "00s", "50s", "90s", "10s"]
        .iter()
        .map(|d| (d.to_string(), 1))
        .collect();
    stats::sort_decades(&mut decades, stats::UNKNOWN_LABEL);
    let labels: Vec<&str> = decades.iter().map(|(d, _)| d.as_str()).collect();
    assert_eq!(labels, vec!["50s", "90s", "00s", "10s", "Unknown"]);
}

#[test]
fn other_bucket_sums_the_tail() {
    let json = format!(
        r#"{{"items": [{}]}}"#,
        (0..13)
            .map(|i| format!(r#"{{"genre": "G{i}", "year": 1990}}"#))
            .collect::<Vec<_>>()
            .join(",")
    );
    let items = meta(&json).items;
    let refs: Vec<&CatalogItem> = items.iter().collect();
    let data = stats::build_stats(&refs, &StatsPolicy::default());

    assert_eq!(data.genres.len(), 11);
    assert_eq!(
        data.genres.last(),
        Some(&(stats::OTHER_LABEL.to_string(), 3))
    );
    let shown: usize = data.genres.iter().map(|(_, c)| c).sum();
    assert_eq!(shown, data.total_genre_count);
}

#[test]
fn wantlist_row_is_pending_until_collected() {
    let catalog = Catalog::new(sample_collection(), Some(sample_wantlist()));
    let items = query::apply(&catalog.wantlist, "", SortSpec::default());
    let table = crate::view::table::build_table(
        &items,
        ViewMode::Wantlist,
        catalog.collection_ids(),
        SortSpec::default(),
    );

    let sun_ra = table.rows.iter().find(|r| r.artist == "Sun Ra").unwrap();
    assert!(sun_ra.pending);
    assert_eq!(sun_ra.purchase_status.as_deref(), Some("Purchase ongoing..."));

    // id 2 already landed in the collection
    let can = table.rows.iter().find(|r| r.artist == "Can").unwrap();
    assert!(!can.pending);
    assert!(can.purchase_status.is_none());

    assert!(catalog.owns(&ItemId::Number(2)));
    assert!(!catalog.owns(&ItemId::Text("2".to_string())));
    assert_eq!(table.count_label, "3 wants");
}

#[test]
fn collection_rows_are_never_pending() {
    let items = meta(r#"{"items": [{"id": 9, "artist": "x", "purchasing": true}]}"#).items;
    let refs: Vec<&CatalogItem> = items.iter().collect();
    let table = crate::view::table::build_table(
        &refs,
        ViewMode::Collection,
        &HashSet::new(),
        SortSpec::default(),
    );
    assert!(!table.rows[0].pending);
    assert_eq!(table.count_label, "1 record");
}

#[test]
fn last_updated_follows_the_view() {
    let mut controller = loaded_controller(SharedStore::default(), Some(sample_wantlist()));
    let collection_text = controller.last_updated().unwrap().to_string();
    assert!(collection_text.starts_with("Last updated: "));
    assert!(collection_text.contains("2024"));

    controller.apply(UiEvent::SetView(ViewMode::Wantlist));
    assert!(controller.last_updated().unwrap().contains("2023"));

    // stats always reports the collection's timestamp
    controller.apply(UiEvent::SetStatsSource(StatsSource::Wantlist));
    controller.apply(UiEvent::SetView(ViewMode::Stats));
    assert_eq!(controller.last_updated(), Some(collection_text.as_str()));
}

#[test]
fn unparsable_timestamp_keeps_previous_text() {
    let wantlist = meta(r#"{"updated_at": "last tuesday", "items": []}"#);
    let mut controller = loaded_controller(SharedStore::default(), Some(wantlist));
    let before = controller.last_updated().map(str::to_string);
    controller.apply(UiEvent::SetView(ViewMode::Wantlist));
    assert_eq!(controller.last_updated().map(str::to_string), before);
}

#[test]
fn empty_wantlist_stats_fall_back_to_collection() {
    let mut controller = loaded_controller(SharedStore::default(), None);
    controller.apply(UiEvent::SetView(ViewMode::Stats));
    controller.apply(UiEvent::SetStatsSource(StatsSource::Wantlist));

    let screen = controller.render();
    match screen.body {
        ScreenBody::Stats(StatsView::Ready(panel)) => {
            assert_eq!(panel.title, "Collection stats");
            assert!(panel.sources.iter().any(|o| o.active && o.value == "collection"));
        }
        other => panic!("expected stats panel, got {other:?}"),
    }
    assert_eq!(controller.state().stats_source, StatsSource::Collection);
    assert!(!screen.show_controls);
}

#[test]
fn stats_without_data_show_a_message() {
    let mut controller = ViewController::new(Box::new(SharedStore::default()), StatsPolicy::default());
    controller.finish_load(Ok(Catalog::new(CatalogMeta::default(), None)));
    controller.apply(UiEvent::SetView(ViewMode::Stats));
    match controller.render().body {
        ScreenBody::Stats(StatsView::Empty { message }) => {
            assert_eq!(message, "No data loaded yet.")
        }
        other => panic!("expected empty stats, got {other:?}"),
    }
}

#[test]
fn preferences_restore_and_persist() {
    let store = SharedStore::with(&[(THEME_KEY, "dark"), (VIEW_KEY, "wantlist")]);
    let mut controller = ViewController::new(Box::new(store.clone()), StatsPolicy::default());
    controller.restore_preferences(Theme::Light);
    assert_eq!(controller.state().theme, Theme::Dark);
    assert_eq!(controller.state().mode, ViewMode::Wantlist);

    controller.apply(UiEvent::ToggleTheme);
    controller.apply(UiEvent::SetView(ViewMode::Stats));
    assert_eq!(store.value(THEME_KEY).as_deref(), Some("light"));
    assert_eq!(store.value(VIEW_KEY).as_deref(), Some("stats"));
}

#[test]
fn invalid_stored_preferences_are_ignored() {
    let store = SharedStore::with(&[(THEME_KEY, "sepia"), (VIEW_KEY, "Grid")]);
    let mut controller = ViewController::new(Box::new(store), StatsPolicy::default());
    controller.restore_preferences(Theme::Dark);
    assert_eq!(controller.state().theme, Theme::Dark);
    assert_eq!(controller.state().mode, ViewMode::Collection);
}

#[test]
fn search_and_sort_events_shape_the_table() {
    let mut controller = loaded_controller(SharedStore::default(), Some(sample_wantlist()));
    controller.apply(UiEvent::Search("jazz".to_string()));
    controller.apply(UiEvent::ClickSort(SortKey::Artist));
    match controller.render().body {
        ScreenBody::Table(table) => {
            let names: Vec<&str> = table.rows.iter().map(|r| r.artist.as_str()).collect();
            assert_eq!(names, vec!["Miles Davis", "Alice Coltrane"]);
            assert_eq!(table.count_label, "2 records");
            assert_eq!(table.headers[0].sort, Some(SortDirection::Desc));
            assert_eq!(table.rows[1].year, "");
        }
        other => panic!("expected table, got {other:?}"),
    }
}

#[test]
fn empty_wantlist_table_counts_zero_wants() {
    let mut controller = loaded_controller(SharedStore::default(), None);
    controller.apply(UiEvent::SetView(ViewMode::Wantlist));
    match controller.render().body {
        ScreenBody::Table(table) => {
            assert!(table.rows.is_empty());
            assert_eq!(table.placeholder.as_deref(), Some("No records found"));
            assert_eq!(table.count_label, "0 wants");
        }
        other => panic!("expected table, got {other:?}"),
    }
}

#[test]
fn failed_load_renders_the_failure_row() {
    let mut controller = ViewController::new(Box::new(SharedStore::default()), StatsPolicy::default());
    controller.finish_load(Err(LoadError::Status {
        resource: "collection.json".to_string(),
        status: 500,
    }));
    assert!(matches!(controller.load_state(), LoadState::Failed(_)));
    assert!(controller.last_updated().is_none());

    for mode in [ViewMode::Collection, ViewMode::Wantlist] {
        controller.apply(UiEvent::SetView(mode));
        match controller.render().body {
            ScreenBody::Table(table) => {
                assert_eq!(table.placeholder.as_deref(), Some("Failed to load data."));
                assert!(table.count_label.is_empty());
            }
            other => panic!("expected table, got {other:?}"),
        }
    }
}

#[test]
fn screens_render_in_every_format() {
    let mut controller = loaded_controller(SharedStore::default(), Some(sample_wantlist()));
    controller.apply(UiEvent::Search("<b>".to_string()));
    let screen = controller.render();

    let json: serde_json::Value =
        serde_json::from_slice(&crate::output::render_json(&screen)).unwrap();
    assert_eq!(json["view"], "collection");
    assert_eq!(json["body"]["kind"], "table");

    let html = String::from_utf8(crate::output::report::render_html(&screen)).unwrap();
    assert!(html.contains(r#"data-theme="light""#));
    assert!(html.contains("&lt;b&gt;"));
    assert!(!html.contains("<b>"));

    let text = String::from_utf8(crate::output::text::render_text(&screen)).unwrap();
    assert!(text.contains("No records found"));
    assert!(text.contains("0 records"));
}

#[test]
fn stats_html_carries_scales_and_heatmap_colors() {
    let mut controller = loaded_controller(SharedStore::default(), Some(sample_wantlist()));
    controller.apply(UiEvent::SetView(ViewMode::Stats));
    controller.apply(UiEvent::SetStatsSource(StatsSource::All));
    let html = String::from_utf8(crate::output::report::render_html(&controller.render())).unwrap();
    assert!(html.contains("All records stats"));
    assert!(html.contains("scaleX(1.000)"));
    assert!(html.contains("var(--accent) 100%"));
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("recordshelf-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn dir_loader(dir: &PathBuf) -> DataLoader {
    DataLoader::new(LoaderOptions {
        source: Source::Dir(dir.clone()),
        ..LoaderOptions::default()
    })
    .unwrap()
}

#[tokio::test]
async fn directory_source_without_wantlist_degrades() {
    let dir = scratch_dir("no-wantlist");
    std::fs::write(
        dir.join("collection.json"),
        r#"{"updated_at": "2024-03-01T12:00:00Z", "items": [{"id": 1, "artist": "a"}]}"#,
    )
    .unwrap();

    let catalog = dir_loader(&dir).load().await.unwrap();
    assert_eq!(catalog.collection.len(), 1);
    assert!(catalog.wantlist.is_empty());
    assert!(catalog.wantlist_updated_at.is_none());
    assert!(catalog.owns(&ItemId::Number(1)));
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn broken_wantlist_json_degrades() {
    let dir = scratch_dir("broken-wantlist");
    std::fs::write(dir.join("collection.json"), r#"{"items": []}"#).unwrap();
    std::fs::write(dir.join("wantlist.json"), "{not json").unwrap();

    let catalog = dir_loader(&dir).load().await.unwrap();
    assert!(catalog.wantlist.is_empty());
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn missing_collection_fails_the_load() {
    let dir = scratch_dir("no-collection");
    std::fs::write(dir.join("wantlist.json"), r#"{"items": []}"#).unwrap();

    let err = dir_loader(&dir).load().await.unwrap_err();
    assert!(matches!(err, LoadError::Read { .. }));
    let _ = std::fs::remove_dir_all(&dir);
}

// serves canned responses by path, 404 for anything else
async fn serve(routes: Vec<(&'static str, u16, String)>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]).to_string();
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (status, body) = routes
                    .iter()
                    .find(|(p, _, _)| *p == path)
                    .map(|(_, s, b)| (*s, b.clone()))
                    .unwrap_or((404, "not found".to_string()));
                let reason = if status == 200 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    format!("http://{addr}/")
}

fn http_loader(base: &str) -> DataLoader {
    DataLoader::new(LoaderOptions {
        source: Source::parse(base).unwrap(),
        timeout_seconds: 5,
        ..LoaderOptions::default()
    })
    .unwrap()
}

#[tokio::test]
async fn wantlist_404_renders_zero_wants() {
    let base = serve(vec![(
        "/collection.json",
        200,
        r#"{"updated_at": "2024-03-01T12:00:00Z", "items": [{"id": 1, "artist": "a", "genre": "Jazz", "year": 1965}]}"#
            .to_string(),
    )])
    .await;

    let result = http_loader(&base).load().await;
    let mut controller = ViewController::new(Box::new(SharedStore::default()), StatsPolicy::default());
    controller.finish_load(result);
    assert!(matches!(controller.load_state(), LoadState::Loaded(_)));

    controller.apply(UiEvent::SetView(ViewMode::Wantlist));
    match controller.render().body {
        ScreenBody::Table(table) => assert_eq!(table.count_label, "0 wants"),
        other => panic!("expected table, got {other:?}"),
    }
}

#[tokio::test]
async fn collection_http_error_fails_the_load() {
    let base = serve(vec![
        ("/collection.json", 500, "oops".to_string()),
        ("/wantlist.json", 200, r#"{"items": []}"#.to_string()),
    ])
    .await;

    let err = http_loader(&base).load().await.unwrap_err();
    match err {
        LoadError::Status { resource, status } => {
            assert_eq!(resource, "collection.json");
            assert_eq!(status, 500);
        }
        other => panic!("unexpected error {other:?}"),
    }
}
