use std::cell::Cell;
use std::fs;
use std::rc::Rc;

use chrono::{Duration, TimeZone, Utc};
use folio_core::autosave::FlushReason;
use folio_core::codec::{self, RestoreMode};
use folio_core::session::{
    ConfigResource, CredentialPrompt, SessionSettings, DEFAULT_SECRET,
};
use folio_core::workspace::{FlushOutcome, ImportOutcome};
use folio_core::{
    Block, BlockKind, Category, Clock, Document, FolioError, KeyedStore, ManualClock, MemoryStore,
    Result, SessionGate, SqliteStore, Workspace,
};

/// Store wrapper with a shared write budget.
///
/// `None` allows every `set`; `Some(n)` allows `n` more and fails the rest.
struct FailingStore {
    inner: MemoryStore,
    budget: Rc<Cell<Option<usize>>>,
}

impl FailingStore {
    fn new() -> (Self, Rc<Cell<Option<usize>>>) {
        let budget = Rc::new(Cell::new(None));
        let store = Self {
            inner: MemoryStore::new(),
            budget: budget.clone(),
        };
        (store, budget)
    }
}

impl KeyedStore for FailingStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match self.budget.get() {
            Some(0) => return Err(FolioError::Storage("quota exceeded".to_string())),
            Some(n) => self.budget.set(Some(n - 1)),
            None => {}
        }
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.inner.remove(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.inner.keys()
    }
}

struct CountingPrompt(Rc<Cell<u32>>);

impl CredentialPrompt for CountingPrompt {
    fn request_credentials(&self) {
        self.0.set(self.0.get() + 1);
    }
}

fn minecraft() -> Vec<Category> {
    vec![Category::from_name("minecraft").with_projects(["Voyage"])]
}

fn workspace_with<S: KeyedStore>(store: S) -> (Workspace<S>, Rc<ManualClock>) {
    let start = Utc
        .with_ymd_and_hms(2025, 3, 14, 10, 0, 0)
        .single()
        .expect("valid start time");
    let clock = Rc::new(ManualClock::new(start));
    let gate = SessionGate::new(SessionSettings::default(), clock.clone());
    let ws = Workspace::load(store, gate, clock.clone(), minecraft()).expect("load workspace");
    (ws, clock)
}

#[test]
fn test_voyage_export_clear_import_round_trip() {
    let (mut ws, _) = workspace_with(MemoryStore::new());
    ws.login(DEFAULT_SECRET).expect("login");

    let open = ws.open("minecraft", "Voyage").expect("open");
    assert_eq!(open.slug(), "voyage");
    assert_eq!(open.document().len(), 1);

    ws.insert_block(BlockKind::Title, None).unwrap();
    ws.update_block(1, "Overview").unwrap();
    ws.insert_block(BlockKind::Text, None).unwrap();
    ws.update_block(2, "Details").unwrap();
    ws.delete_block(0).unwrap();
    ws.save().unwrap();

    let exported = ws
        .export_project("minecraft", "voyage")
        .unwrap()
        .to_json_pretty()
        .unwrap();

    // Fresh state
    let (mut fresh, _) = workspace_with(MemoryStore::new());
    fresh.login(DEFAULT_SECRET).unwrap();
    match fresh.import(&exported, RestoreMode::Replace).unwrap() {
        ImportOutcome::Project {
            category_id,
            project_id,
            listed,
        } => {
            assert_eq!(category_id, "minecraft");
            assert_eq!(project_id, "voyage");
            assert!(listed);
        }
        other => panic!("expected a project import, got {:?}", other),
    }

    let doc = fresh.view_project("minecraft", "voyage").unwrap();
    assert_eq!(
        doc.content,
        vec![
            Block::Title("Overview".to_string()),
            Block::Text("Details".to_string()),
        ]
    );
    assert_eq!(doc.title, "Voyage");
}

#[test]
fn test_wrong_secret_skips_gated_action() {
    let count = Rc::new(Cell::new(0));
    let clock = Rc::new(ManualClock::new(Utc::now()));
    let gate = SessionGate::new(SessionSettings::default(), clock.clone())
        .with_prompt(CountingPrompt(count.clone()));
    let mut ws = Workspace::load(MemoryStore::new(), gate, clock, minecraft()).unwrap();

    assert!(matches!(ws.login("wrong"), Err(FolioError::Auth)));
    let before = ws.catalog().clone();

    assert!(matches!(
        ws.add_project("minecraft", "Odyssey"),
        Err(FolioError::AuthRequired)
    ));
    assert_eq!(ws.catalog(), &before);
    assert_eq!(count.get(), 1);
    assert!(ws.store().is_empty());
}

#[test]
fn test_failed_backup_write_leaves_no_backup_keys() {
    let mut docs = std::collections::BTreeMap::new();
    for slug in ["one", "two", "three"] {
        docs.insert(
            format!("project_minecraft_{}", slug),
            Document::new(slug, Utc::now()),
        );
    }
    let backup = codec::export_all(docs.clone(), None, Utc::now())
        .to_json_pretty()
        .unwrap();

    let (store, budget) = FailingStore::new();
    let (mut ws, _) = workspace_with(store);
    ws.login(DEFAULT_SECRET).unwrap();
    let keys_before = ws.store().keys().unwrap();

    // First backup key lands, second write fails
    budget.set(Some(1));
    let result = ws.import(&backup, RestoreMode::Replace);
    assert!(matches!(result, Err(FolioError::Storage(_))));

    let keys_after = ws.store().keys().unwrap();
    for key in docs.keys() {
        assert!(!keys_after.contains(key), "{} should not be stored", key);
    }
    assert_eq!(keys_after, keys_before);

    budget.set(None);
    ws.import(&backup, RestoreMode::Replace).unwrap();
    assert_eq!(
        ws.store()
            .keys_with_prefix("project_minecraft_")
            .unwrap()
            .len(),
        3
    );
}

#[test]
fn test_replace_restore_keeps_session_and_drops_other_documents() {
    let (mut ws, _) = workspace_with(MemoryStore::new());
    ws.login(DEFAULT_SECRET).unwrap();
    ws.add_category("Roblox").unwrap();
    ws.add_project("roblox", "D&D Foods").unwrap();
    assert!(ws.store().get("project_roblox_dd-foods").unwrap().is_some());

    let mut docs = std::collections::BTreeMap::new();
    docs.insert(
        "project_minecraft_voyage".to_string(),
        Document::new("Voyage", Utc::now()),
    );
    let backup = codec::export_all(docs, Some(minecraft()), Utc::now())
        .to_json_pretty()
        .unwrap();

    match ws.import(&backup, RestoreMode::Replace).unwrap() {
        ImportOutcome::Catalog(summary) => {
            assert_eq!(summary.written, 1);
            assert_eq!(summary.removed, 1);
            assert_eq!(summary.categories, Some(1));
        }
        other => panic!("expected a restore, got {:?}", other),
    }
    assert!(ws.is_authenticated());
    assert!(ws.store().get("project_roblox_dd-foods").unwrap().is_none());
    assert!(ws.catalog().get("roblox").is_none());
}

#[test]
fn test_merge_restore_keeps_existing_documents() {
    let (mut ws, _) = workspace_with(MemoryStore::new());
    ws.login(DEFAULT_SECRET).unwrap();
    ws.add_category("Roblox").unwrap();
    ws.add_project("roblox", "D&D Foods").unwrap();

    let mut docs = std::collections::BTreeMap::new();
    docs.insert(
        "project_minecraft_voyage".to_string(),
        Document::new("Voyage", Utc::now()),
    );
    let backup = codec::export_all(docs, Some(minecraft()), Utc::now())
        .to_json_pretty()
        .unwrap();

    ws.import(&backup, RestoreMode::Merge).unwrap();
    assert!(ws.store().get("project_roblox_dd-foods").unwrap().is_some());
    assert!(ws.store().get("project_minecraft_voyage").unwrap().is_some());
    assert!(ws.catalog().get("roblox").is_some());
}

#[test]
fn test_category_delete_cascades_only_its_documents() {
    let (mut ws, _) = workspace_with(MemoryStore::new());
    ws.login(DEFAULT_SECRET).unwrap();
    ws.add_category("Mine").unwrap();
    ws.add_project("minecraft", "Odyssey").unwrap();
    ws.add_project("mine", "Shaft").unwrap();
    ws.open("minecraft", "voyage").unwrap();
    ws.save().unwrap();

    let removed = ws.delete_category("minecraft").unwrap();
    assert_eq!(removed, 2);
    assert!(ws.current().is_none());
    assert!(ws.catalog().get("minecraft").is_none());
    assert!(ws.store().get("project_mine_shaft").unwrap().is_some());
    assert!(ws.store().get("project_auth").unwrap().is_some());
    assert!(ws
        .store()
        .keys_with_prefix("project_minecraft_")
        .unwrap()
        .is_empty());
}

#[test]
fn test_last_block_delete_is_rejected() {
    let (mut ws, _) = workspace_with(MemoryStore::new());
    ws.login(DEFAULT_SECRET).unwrap();
    ws.open("minecraft", "voyage").unwrap();

    assert!(matches!(ws.delete_block(0), Err(FolioError::LastBlock)));
    assert_eq!(ws.current().unwrap().document().len(), 1);
}

#[test]
fn test_session_expires_after_a_day() {
    let (mut ws, clock) = workspace_with(MemoryStore::new());
    ws.login(DEFAULT_SECRET).unwrap();
    let expires = ws.session_expires_at().expect("session is valid");
    assert_eq!(expires - clock.now(), Duration::hours(24));

    clock.advance(Duration::hours(24));
    assert!(!ws.is_authenticated());
    assert!(matches!(ws.add_category("Late"), Err(FolioError::AuthRequired)));

    ws.login(DEFAULT_SECRET).unwrap();
    ws.logout().unwrap();
    assert!(!ws.is_authenticated());
}

#[test]
fn test_config_resource_secret_beats_override() {
    let dir = tempfile::tempdir().unwrap();
    let resource = dir.path().join("config.js");
    fs::write(&resource, "const WEBSITE_PASSWORD = 'from-file';\n").unwrap();

    let clock = Rc::new(ManualClock::new(Utc::now()));
    let gate = SessionGate::new(SessionSettings::default(), clock.clone())
        .with_resource(ConfigResource::new(&resource));
    let mut ws = Workspace::load(MemoryStore::new(), gate, clock.clone(), minecraft()).unwrap();

    assert!(matches!(ws.login(DEFAULT_SECRET), Err(FolioError::Auth)));
    ws.login("from-file").unwrap();
    ws.set_secret_override("local").unwrap();
    ws.logout().unwrap();
    assert!(matches!(ws.login("local"), Err(FolioError::Auth)));

    // Unreadable resource falls through to the override
    fs::remove_file(&resource).unwrap();
    ws.login("local").unwrap();
}

#[test]
fn test_autosave_coalesces_and_retries() {
    let (store, budget) = FailingStore::new();
    let (mut ws, clock) = workspace_with(store);
    ws.login(DEFAULT_SECRET).unwrap();
    ws.open("minecraft", "voyage").unwrap();

    let start = clock.now();
    for ms in [0, 400, 800, 1_200] {
        clock.set(start + Duration::milliseconds(ms));
        ws.insert_block(BlockKind::Text, None).unwrap();
        assert_eq!(ws.tick(clock.now()), None);
    }

    budget.set(Some(0));
    assert_eq!(
        ws.tick(start + Duration::milliseconds(3_200)),
        Some(FlushOutcome::Failed(FlushReason::Debounce))
    );
    assert!(ws.autosave().is_dirty());
    assert!(ws.store().get("project_minecraft_voyage").unwrap().is_none());

    budget.set(None);
    assert_eq!(ws.tick(start + Duration::seconds(10)), None);
    assert_eq!(
        ws.tick(start + Duration::seconds(30)),
        Some(FlushOutcome::Saved(FlushReason::Periodic))
    );
    assert!(!ws.autosave().is_dirty());
    let stored = ws.store().get("project_minecraft_voyage").unwrap().unwrap();
    assert_eq!(Document::from_json(&stored).unwrap().len(), 5);
}

#[test]
fn test_failed_load_into_open_page_is_retried() {
    let (store, budget) = FailingStore::new();
    let (mut ws, clock) = workspace_with(store);
    ws.login(DEFAULT_SECRET).unwrap();
    ws.open("minecraft", "voyage").unwrap();
    let start = clock.now();

    budget.set(Some(0));
    let result = ws.import_into_open(
        r#"{"title": "Voyage", "content": [{"type": "image", "content": "a.png"}]}"#,
    );
    assert!(matches!(result, Err(FolioError::Storage(_))));
    assert!(ws.autosave().is_dirty());
    assert!(ws.autosave().has_failed());
    assert_eq!(
        ws.current().unwrap().document().content,
        vec![Block::Image("a.png".to_string())]
    );

    budget.set(None);
    assert_eq!(
        ws.tick(start + Duration::seconds(30)),
        Some(FlushOutcome::Saved(FlushReason::Periodic))
    );
    let stored = ws.store().get("project_minecraft_voyage").unwrap().unwrap();
    assert_eq!(
        Document::from_json(&stored).unwrap().content,
        vec![Block::Image("a.png".to_string())]
    );
}

#[test]
fn test_restore_with_overlapping_category_ids_is_rejected() {
    let (mut ws, _) = workspace_with(MemoryStore::new());
    ws.login(DEFAULT_SECRET).unwrap();

    let mut docs = std::collections::BTreeMap::new();
    docs.insert("project_a_b_x".to_string(), Document::new("x", Utc::now()));
    let categories = vec![
        Category {
            id: "a".to_string(),
            name: "A".to_string(),
            projects: Vec::new(),
        },
        Category {
            id: "a_b".to_string(),
            name: "A B".to_string(),
            projects: vec!["x".to_string()],
        },
    ];
    let backup = codec::export_all(docs, Some(categories), Utc::now())
        .to_json_pretty()
        .unwrap();

    assert!(matches!(
        ws.import(&backup, RestoreMode::Replace),
        Err(FolioError::Schema(_))
    ));
    assert!(ws.store().get("project_a_b_x").unwrap().is_none());
    assert!(ws.catalog().get("a").is_none());
    assert!(ws.catalog().get("minecraft").is_some());
}

#[test]
fn test_folder_import_loads_project_files_and_counts_failures() {
    let (mut source, _) = workspace_with(MemoryStore::new());
    source.login(DEFAULT_SECRET).unwrap();
    source.add_project("minecraft", "Odyssey").unwrap();

    let dir = tempfile::tempdir().unwrap();
    for project in ["voyage", "odyssey"] {
        source
            .export_project("minecraft", project)
            .unwrap()
            .write_to(dir.path())
            .unwrap();
    }
    fs::write(dir.path().join("broken_file.json"), "{not json").unwrap();
    fs::write(dir.path().join("notes.json"), "{}").unwrap();
    source
        .export_all(true)
        .unwrap()
        .write_to(dir.path())
        .unwrap();

    let (mut ws, _) = workspace_with(MemoryStore::new());
    assert!(matches!(
        ws.import_dir(dir.path()),
        Err(FolioError::AuthRequired)
    ));
    ws.login(DEFAULT_SECRET).unwrap();
    let report = ws.import_dir(dir.path()).unwrap();

    let loaded: Vec<String> = report
        .loaded
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect();
    assert_eq!(loaded, vec!["minecraft_odyssey.json", "minecraft_voyage.json"]);
    assert_eq!(report.failed.len(), 2);
    assert!(ws.store().get("project_minecraft_voyage").unwrap().is_some());
    assert!(ws.store().get("project_minecraft_odyssey").unwrap().is_some());
    assert_eq!(
        ws.catalog().require("minecraft").unwrap().projects,
        vec!["Voyage", "Odyssey"]
    );
}

#[test]
fn test_category_rename_keeps_documents() {
    let (mut ws, _) = workspace_with(MemoryStore::new());
    assert!(matches!(
        ws.rename_category("minecraft", "Blocks"),
        Err(FolioError::AuthRequired)
    ));
    ws.login(DEFAULT_SECRET).unwrap();
    ws.add_project("minecraft", "Odyssey").unwrap();

    assert!(ws.rename_category("minecraft", "Block Games").unwrap());
    assert_eq!(ws.catalog().require("minecraft").unwrap().name, "BLOCK GAMES");
    assert!(ws.store().get("project_minecraft_odyssey").unwrap().is_some());

    let stored = ws.store().get("catalog_index").unwrap().unwrap();
    assert!(stored.contains("BLOCK GAMES"));
}

#[test]
fn test_sqlite_store_backs_a_workspace() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("folio.db");

    {
        let (mut ws, _) = workspace_with(SqliteStore::open(&path).unwrap());
        ws.login(DEFAULT_SECRET).unwrap();
        ws.add_project("minecraft", "World of Life Mod").unwrap();
    }

    let (ws, _) = workspace_with(SqliteStore::open(&path).unwrap());
    assert!(ws.is_authenticated());
    let projects = ws.list_projects("minecraft").unwrap();
    let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Voyage", "World of Life Mod"]);
    assert!(!projects[0].stored);
    assert!(projects[1].stored);
    assert_eq!(projects[1].slug, "world-of-life-mod");
}
