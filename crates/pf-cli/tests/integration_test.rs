//! End-to-end tests over the native collaborators: rendering from an asset
//! directory, the file-backed layout library, configuration and card lookup.

use std::fs;
use std::path::Path;

use futures::executor::block_on;
use pf_cli::{
    CardDump, CardJob, DigestIds, FileStore, FsAssetLoader, NativeRenderer, SystemTimer,
    load_config,
};
use pf_core::{
    BorderColorKey, BorderImages, CardLookup, FieldKey, KeyValueStore, LayoutEditor,
    LayoutLibrary, ProxyRewriter, TextPosition, default_layout, export_layout_document,
};
use pf_parser::parse_card_json;
use pf_render_canvas::RenderConfig;

fn write_png(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    image::RgbaImage::new(width, height)
        .save(path)
        .expect("write png");
}

fn write_symbol(root: &Path, symbol: &str) {
    let dir = root.join("symbols");
    fs::create_dir_all(&dir).expect("mkdir");
    fs::write(
        dir.join(format!("{symbol}.svg")),
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100"><circle cx="50" cy="50" r="50"/></svg>"#,
    )
    .expect("write symbol");
}

fn blue_card() -> pf_core::CardRecord {
    parse_card_json(
        r#"{
            "id": "c0ffee",
            "name": "Phantom Warrior",
            "type_line": "Creature — Illusion Warrior",
            "mana_cost": "{1}{U}{U}",
            "colors": ["U"],
            "oracle_text": "Phantom Warrior can't be blocked.",
            "power": "2",
            "toughness": "2"
        }"#,
    )
    .expect("card")
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn renders_a_blue_card_from_an_asset_directory() {
    let assets = tempfile::tempdir().expect("tempdir");
    write_png(&assets.path().join("frames").join("blue.png"), 8, 11);
    write_symbol(assets.path(), "U");

    let mut layout = default_layout();
    layout
        .images
        .insert(BorderColorKey::U, BorderImages::url("/frames/blue.png"));

    let mut renderer = NativeRenderer::new(
        FsAssetLoader::new(assets.path()),
        ProxyRewriter::default(),
        RenderConfig::default(),
    );
    let job = CardJob::new(blue_card(), layout);
    let svg = renderer.render(&job).expect("render");

    assert_eq!(svg.file_name, "Phantom_Warrior.svg");
    assert_eq!(svg.report.border, BorderColorKey::U);
    assert!(svg.report.images_drawn.iter().any(|url| url == "/frames/blue.png"));
    assert_eq!(
        svg.report
            .images_drawn
            .iter()
            .filter(|url| *url == "/symbols/U.svg")
            .count(),
        2
    );

    let text = svg.document.to_string();
    let frame_path = assets.path().join("frames").join("blue.png");
    assert!(text.contains(&frame_path.to_string_lossy().into_owned()));
    assert!(text.contains(">Phantom Warrior</text>"));
    assert!(text.contains(">2/2</text>"));
}

#[test]
fn missing_art_is_reported_not_fatal() {
    let assets = tempfile::tempdir().expect("tempdir");
    let mut renderer = NativeRenderer::new(
        FsAssetLoader::new(assets.path()),
        ProxyRewriter::default(),
        RenderConfig::default(),
    );
    let mut job = CardJob::new(blue_card(), default_layout());
    job.background_url = Some(String::from("art/missing.jpg"));

    let svg = renderer.render(&job).expect("render still succeeds");
    assert!(!svg.report.failures.is_empty());
    assert!(svg.document.to_string().contains(">Phantom Warrior</text>"));
}

#[test]
fn export_margin_sets_document_size() {
    let assets = tempfile::tempdir().expect("tempdir");
    let config = RenderConfig {
        export_margin_mm: 5.0,
        ..RenderConfig::default()
    };
    let mut renderer =
        NativeRenderer::new(FsAssetLoader::new(assets.path()), ProxyRewriter::default(), config);
    let svg = renderer
        .render(&CardJob::new(blue_card(), default_layout()))
        .expect("render");
    let dims = pf_core::geometry::CanvasDimensions::at_dpi(300);
    assert_eq!(
        svg.document.size(),
        (f64::from(dims.full_width), f64::from(dims.full_height))
    );
}

// =============================================================================
// Layout library
// =============================================================================

fn classic() -> pf_core::LayoutConfig {
    pf_core::LayoutConfig {
        id: String::from("classic"),
        name: String::from("Classic"),
        ..default_layout()
    }
}

#[test]
fn custom_layouts_persist_across_sessions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("layouts.json");

    let id = {
        let store = FileStore::open(&path).expect("open");
        let mut editor = LayoutEditor::open(
            LayoutLibrary::new(store, vec![classic()]),
            DigestIds::seeded("session-1"),
        );
        editor.create_new().expect("create");
        editor
            .set_general_info(Some(String::from("Showcase")), None)
            .expect("rename");
        editor
            .set_text_position(FieldKey::Loyalty, TextPosition::new(80.0, 88.0, 10.0, 5.0, 10.0))
            .expect("position");
        editor.editing().id.clone()
    };

    let store = FileStore::open(&path).expect("reopen");
    let library = LayoutLibrary::new(store, vec![classic()]);
    let draft = library.active_draft().expect("draft resumes");
    assert_eq!(draft.id, id);
    assert_eq!(draft.name, "Showcase");
    assert!(draft.position(FieldKey::Loyalty).is_some());
    assert_eq!(library.all().len(), 2);
    assert!(!library.is_built_in(&id));
}

#[test]
fn imported_layouts_get_fresh_ids_and_deleting_clears_the_draft() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::open(dir.path().join("layouts.json")).expect("open");
    let mut editor = LayoutEditor::open(
        LayoutLibrary::new(store, vec![classic()]),
        DigestIds::seeded("import"),
    );

    let (file_name, json) = export_layout_document(&classic()).expect("export");
    assert_eq!(file_name, "classic-border.json");
    editor.import_json(&json).expect("import");
    let imported = editor.editing().id.clone();
    assert_ne!(imported, "classic");

    assert!(editor.import_json(r#"{"name": "No images"}"#).is_err());
    assert_eq!(editor.editing().id, imported);

    editor.delete_custom(&imported).expect("delete");
    assert!(!editor.is_active());
    let store = editor.into_library().into_store();
    assert_eq!(store.get(pf_core::DRAFT_KEY).expect("get"), None);
    assert_eq!(store.get(pf_core::COLLECTION_KEY).expect("get").as_deref(), Some("[]"));
}

// =============================================================================
// Configuration and lookup
// =============================================================================

#[test]
fn config_file_is_loaded_from_an_explicit_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("proxyforge.toml");
    fs::write(
        &path,
        r#"
        [render]
        dpi = 150
        export_margin_mm = 2.0

        [proxy]
        mode = "development"

        [paths]
        assets = "/srv/proxyforge/assets"
        "#,
    )
    .expect("write");

    let config = load_config(Some(&path)).expect("load");
    let render = config.render_config(RenderConfig::default()).expect("merge");
    assert_eq!(render.dpi, 150);
    assert_eq!(render.export_margin_mm, 2.0);
    assert_eq!(config.proxy_rewriter().mode, pf_core::ProxyMode::Development);
    assert_eq!(config.assets_root(), Path::new("/srv/proxyforge/assets"));
}

#[test]
fn lookup_resolves_names_from_a_dump_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("cards.json");
    fs::write(
        &path,
        r#"[
            {"id": "a", "name": "Counterspell", "type_line": "Instant", "mana_cost": "{U}{U}"},
            {"id": "b", "name": "Mana Leak", "type_line": "Instant", "mana_cost": "{1}{U}"}
        ]"#,
    )
    .expect("write");

    let dump = CardDump::from_json(&fs::read_to_string(&path).expect("read")).expect("dump");
    assert_eq!(dump.len(), 2);
    let lookup = CardLookup::new(dump, SystemTimer::new());
    let card = block_on(lookup.card_by_name("counterspell")).expect("exact");
    assert_eq!(card.mana_cost.as_deref(), Some("{U}{U}"));
    let fuzzy = block_on(lookup.card_by_name("leak")).expect("fuzzy");
    assert_eq!(fuzzy.id, "b");
    assert_eq!(block_on(lookup.autocomplete("ma")), ["Mana Leak"]);
}
