//! Application controller.
//!
//! [`Workspace`] owns the store, the session gate, the catalog index, the
//! open project and its autosave scheduler. Front ends translate user
//! intents into calls on it and render what comes back; nothing here knows
//! about terminals.
//!
//! Every mutating command runs the session guard first and fails with
//! `FolioError::AuthRequired` (state untouched) when no session is valid.
//! Multi-key changes go through [`KeyedStore::apply`] so they land
//! all-or-nothing.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::autosave::{AutoSaver, AutosaveSettings, FlushReason};
use crate::catalog::{slugify, CatalogIndex, Category};
use crate::clock::Clock;
use crate::codec::{self, CatalogBundle, Envelope, EnvelopeKind, Imported, ImportedDocument, RestoreMode};
use crate::document::{Block, BlockKind, Document};
use crate::editor::{self, Direction};
use crate::error::{FolioError, Result};
use crate::session::SessionGate;
use crate::store::keys::{
    category_prefix, document_key, is_document_key, parse_document_key, CATALOG_KEY,
    DOCUMENT_PREFIX,
};
use crate::store::{KeyedStore, StoreOp};

/// The project currently being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenProject {
    category_id: String,
    slug: String,
    name: String,
    document: Document,
    stored: bool,
}

impl OpenProject {
    pub fn category_id(&self) -> &str {
        &self.category_id
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Name as listed in the catalog.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn key(&self) -> String {
        document_key(&self.category_id, &self.slug)
    }

    /// Whether a document exists in the store for this project.
    pub fn is_stored(&self) -> bool {
        self.stored
    }
}

/// One row of a project listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSummary {
    pub name: String,
    pub slug: String,
    pub stored: bool,
    pub blocks: usize,
    pub preview: String,
    pub last_modified: Option<DateTime<Utc>>,
}

/// What a bulk restore did.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoreSummary {
    pub kind: EnvelopeKind,
    pub mode: RestoreMode,
    pub written: usize,
    pub removed: usize,
    pub categories: Option<usize>,
}

/// What an import did.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    Project {
        category_id: String,
        project_id: String,
        /// Whether the title is listed in its category after the import.
        listed: bool,
    },
    Catalog(RestoreSummary),
}

/// What a folder import did, file by file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderImport {
    pub loaded: Vec<PathBuf>,
    /// Files that could not be imported, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

/// Result of an autosave attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    Saved(FlushReason),
    Failed(FlushReason),
}

/// Top-level application state.
pub struct Workspace<S: KeyedStore> {
    store: S,
    gate: SessionGate,
    catalog: CatalogIndex,
    open: Option<OpenProject>,
    autosave: AutoSaver,
    clock: Rc<dyn Clock>,
}

fn index_op(catalog: &CatalogIndex) -> Result<StoreOp> {
    Ok(StoreOp::set(CATALOG_KEY, catalog.to_json()?))
}

fn no_open_project() -> FolioError {
    FolioError::InvalidInput("No project is open".to_string())
}

impl<S: KeyedStore> Workspace<S> {
    /// Load the catalog index from `store`.
    ///
    /// When the store has no index yet, `seed` is used until the first
    /// catalog mutation persists it. An unreadable index is logged and
    /// replaced by the seed so that a restore can still repair it.
    pub fn load(
        store: S,
        gate: SessionGate,
        clock: Rc<dyn Clock>,
        seed: Vec<Category>,
    ) -> Result<Self> {
        let catalog = match store.get(CATALOG_KEY)? {
            Some(raw) => CatalogIndex::from_json(&raw).unwrap_or_else(|err| {
                warn!(error = %err, "catalog index unreadable; using configured categories");
                CatalogIndex::new(seed)
            }),
            None => {
                debug!(categories = seed.len(), "no catalog index stored; seeding");
                CatalogIndex::new(seed)
            }
        };
        let autosave = AutoSaver::new(AutosaveSettings::default(), clock.now());
        Ok(Self {
            store,
            gate,
            catalog,
            open: None,
            autosave,
            clock,
        })
    }

    /// Replace the autosave timings.
    pub fn with_autosave(mut self, settings: AutosaveSettings) -> Self {
        self.autosave = AutoSaver::new(settings, self.clock.now());
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    pub fn catalog(&self) -> &CatalogIndex {
        &self.catalog
    }

    pub fn autosave(&self) -> &AutoSaver {
        &self.autosave
    }

    /// The project being edited, if any.
    pub fn current(&self) -> Option<&OpenProject> {
        self.open.as_ref()
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn require_session(&self) -> Result<()> {
        if self.gate.guard(&self.store) {
            Ok(())
        } else {
            Err(FolioError::AuthRequired)
        }
    }

    // --- Session operations ---

    /// Open a session with `secret`.
    ///
    /// # Errors
    ///
    /// Returns `FolioError::Auth` when the secret does not match.
    pub fn login(&mut self, secret: &str) -> Result<()> {
        if self.gate.authenticate(&mut self.store, secret)? {
            Ok(())
        } else {
            Err(FolioError::Auth)
        }
    }

    pub fn logout(&mut self) -> Result<()> {
        self.gate.logout(&mut self.store)
    }

    pub fn is_authenticated(&self) -> bool {
        self.gate.is_valid(&self.store)
    }

    pub fn session_expires_at(&self) -> Option<DateTime<Utc>> {
        self.gate.expires_at(&self.store)
    }

    /// Persist the local secret override.
    pub fn set_secret_override(&mut self, secret: &str) -> Result<()> {
        self.require_session()?;
        self.gate.set_secret_override(&mut self.store, secret)?;
        info!("secret override updated");
        Ok(())
    }

    // --- Catalog operations ---

    pub fn add_category(&mut self, name: &str) -> Result<Category> {
        self.require_session()?;
        let mut catalog = self.catalog.clone();
        let category = catalog.add_category(name)?.clone();
        self.store.apply(&[index_op(&catalog)?])?;
        self.catalog = catalog;
        info!(category = %category.id, "category added");
        Ok(category)
    }

    /// Change a category's display name; its id and documents are kept.
    pub fn rename_category(&mut self, category_id: &str, name: &str) -> Result<bool> {
        self.require_session()?;
        let mut catalog = self.catalog.clone();
        if !catalog.rename_category(category_id, name)? {
            return Ok(false);
        }
        self.store.apply(&[index_op(&catalog)?])?;
        self.catalog = catalog;
        info!(category = %category_id, "category renamed");
        Ok(true)
    }

    /// Delete a category and every document stored under it.
    ///
    /// Returns the number of documents removed.
    pub fn delete_category(&mut self, category_id: &str) -> Result<usize> {
        self.require_session()?;
        self.catalog.require(category_id)?;

        let mut catalog = self.catalog.clone();
        catalog.delete_category(category_id);
        let keys = self.store.keys_with_prefix(&category_prefix(category_id))?;
        let mut ops: Vec<StoreOp> = keys.iter().map(StoreOp::remove).collect();
        ops.push(index_op(&catalog)?);
        self.store.apply(&ops)?;
        self.catalog = catalog;

        if self
            .open
            .as_ref()
            .is_some_and(|open| open.category_id == category_id)
        {
            self.discard_open();
        }
        info!(category = %category_id, documents = keys.len(), "category deleted");
        Ok(keys.len())
    }

    /// List `name` in a category and create its starter document.
    ///
    /// Returns `false` when the name is already listed. An existing document
    /// at the same slug is kept.
    pub fn add_project(&mut self, category_id: &str, name: &str) -> Result<bool> {
        self.require_session()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(FolioError::InvalidInput(
                "Project name cannot be empty".to_string(),
            ));
        }
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(FolioError::InvalidInput(format!(
                "Project name \"{}\" has no letters or digits",
                name
            )));
        }

        let mut catalog = self.catalog.clone();
        if !catalog.add_project(category_id, name)? {
            return Ok(false);
        }
        let key = document_key(category_id, &slug);
        let mut ops = vec![index_op(&catalog)?];
        if self.store.get(&key)?.is_none() {
            ops.push(StoreOp::set(
                key,
                Document::new(name, self.now()).to_json()?,
            ));
        }
        self.store.apply(&ops)?;
        self.catalog = catalog;
        info!(category = %category_id, project = %slug, "project added");
        Ok(true)
    }

    /// Unlist `name` and delete its document.
    ///
    /// The document survives when another listed name maps to the same slug.
    pub fn remove_project(&mut self, category_id: &str, name: &str) -> Result<bool> {
        self.require_session()?;
        let mut catalog = self.catalog.clone();
        if !catalog.remove_project(category_id, name)? {
            return Ok(false);
        }
        let slug = slugify(name);
        let key = document_key(category_id, &slug);
        let still_listed = catalog
            .get(category_id)
            .and_then(|c| c.project_for_slug(&slug))
            .is_some();

        let mut ops = vec![index_op(&catalog)?];
        if !still_listed {
            ops.push(StoreOp::remove(key.clone()));
        }
        self.store.apply(&ops)?;
        self.catalog = catalog;

        if !still_listed && self.open.as_ref().is_some_and(|open| open.key() == key) {
            self.discard_open();
        }
        info!(category = %category_id, project = %slug, "project removed");
        Ok(true)
    }

    /// Summaries of every project listed in a category.
    pub fn list_projects(&self, category_id: &str) -> Result<Vec<ProjectSummary>> {
        let category = self.catalog.require(category_id)?;
        let mut summaries = Vec::with_capacity(category.projects.len());
        for name in &category.projects {
            let slug = slugify(name);
            let key = document_key(category_id, &slug);
            let document = match self.open.as_ref().filter(|open| open.key() == key) {
                Some(open) => Some(open.document.clone()),
                None => self.load_document(&key).unwrap_or_else(|err| {
                    warn!(key = %key, error = %err, "skipping unreadable document");
                    None
                }),
            };
            summaries.push(match document {
                Some(doc) => ProjectSummary {
                    name: name.clone(),
                    slug,
                    stored: true,
                    blocks: doc.len(),
                    preview: doc.preview(),
                    last_modified: Some(doc.last_modified),
                },
                None => ProjectSummary {
                    name: name.clone(),
                    slug,
                    stored: false,
                    blocks: 0,
                    preview: crate::document::EMPTY_PREVIEW.to_string(),
                    last_modified: None,
                },
            });
        }
        Ok(summaries)
    }

    fn load_document(&self, key: &str) -> Result<Option<Document>> {
        self.store
            .get(key)?
            .map(|raw| Document::from_json(&raw))
            .transpose()
    }

    /// Resolve a project by name or slug to `(name, slug, stored document)`.
    fn resolve(&self, category_id: &str, project: &str) -> Result<(String, String, Option<Document>)> {
        let category = self.catalog.require(category_id)?;
        let slug = slugify(project);
        let listed = category.project_for_slug(&slug).map(str::to_string);
        let stored = self.load_document(&document_key(category_id, &slug))?;
        let name = match (listed, &stored) {
            (Some(name), _) => name,
            (None, Some(doc)) => doc.title.clone(),
            (None, None) => {
                return Err(FolioError::NotFound(format!(
                    "Project \"{}\" in {}",
                    project, category_id
                )))
            }
        };
        Ok((name, slug, stored))
    }

    /// Current document of a project without opening it.
    ///
    /// A listed project with no stored document yields its default document.
    pub fn view_project(&self, category_id: &str, project: &str) -> Result<Document> {
        if let Some(open) = self.open.as_ref() {
            if open.category_id == category_id && open.slug == slugify(project) {
                return Ok(open.document.clone());
            }
        }
        let (name, _, stored) = self.resolve(category_id, project)?;
        Ok(stored.unwrap_or_else(|| Document::new(name, self.now())))
    }

    // --- Open project operations ---

    /// Open a project for editing.
    ///
    /// Pending edits of the previously open project are written first. A
    /// listed project without a stored document opens with its default
    /// document, which is persisted on the first save.
    pub fn open(&mut self, category_id: &str, project: &str) -> Result<&OpenProject> {
        let (name, slug, stored) = self.resolve(category_id, project)?;
        self.flush_pending();

        let now = self.now();
        let (document, stored) = match stored {
            Some(doc) => (doc, true),
            None => (Document::new(name.as_str(), now), false),
        };
        self.autosave.reset(now);
        debug!(category = %category_id, project = %slug, stored, "project opened");
        Ok(&*self.open.insert(OpenProject {
            category_id: category_id.to_string(),
            slug,
            name,
            document,
            stored,
        }))
    }

    /// Close the open project, writing pending edits.
    pub fn close(&mut self) -> Result<()> {
        if self.autosave.is_dirty() {
            self.write_open()?;
        }
        self.discard_open();
        Ok(())
    }

    fn discard_open(&mut self) {
        self.open = None;
        let now = self.now();
        self.autosave.reset(now);
    }

    fn flush_pending(&mut self) {
        if self.autosave.is_dirty() {
            if let Err(err) = self.write_open() {
                warn!(error = %err, "could not save previous project");
            }
        }
    }

    fn open_mut(&mut self) -> Result<&mut OpenProject> {
        self.open.as_mut().ok_or_else(no_open_project)
    }

    /// Insert a placeholder block; returns its index.
    pub fn insert_block(&mut self, kind: BlockKind, position: Option<usize>) -> Result<usize> {
        self.require_session()?;
        let now = self.now();
        let open = self.open_mut()?;
        let index = editor::insert(&mut open.document, kind, position, now);
        self.autosave.record_edit(now);
        Ok(index)
    }

    pub fn update_block(&mut self, index: usize, payload: &str) -> Result<bool> {
        self.require_session()?;
        let now = self.now();
        let open = self.open_mut()?;
        let changed = editor::update(&mut open.document, index, payload, now);
        if changed {
            self.autosave.record_edit(now);
        }
        Ok(changed)
    }

    /// Delete a block.
    ///
    /// # Errors
    ///
    /// Returns `FolioError::LastBlock` for a single-block document.
    pub fn delete_block(&mut self, index: usize) -> Result<Option<Block>> {
        self.require_session()?;
        let now = self.now();
        let open = self.open_mut()?;
        let removed = editor::delete(&mut open.document, index, now)?;
        if removed.is_some() {
            self.autosave.record_edit(now);
        }
        Ok(removed)
    }

    pub fn move_block(&mut self, index: usize, direction: Direction) -> Result<bool> {
        self.require_session()?;
        let now = self.now();
        let open = self.open_mut()?;
        let moved = editor::move_block(&mut open.document, index, direction, now);
        if moved {
            self.autosave.record_edit(now);
        }
        Ok(moved)
    }

    /// Retitle the open document. The catalog listing is unaffected.
    pub fn rename(&mut self, title: &str) -> Result<bool> {
        self.require_session()?;
        let title = title.trim();
        if title.is_empty() {
            return Err(FolioError::InvalidInput("Title cannot be empty".to_string()));
        }
        let now = self.now();
        let open = self.open_mut()?;
        let changed = editor::set_title(&mut open.document, title, now);
        if changed {
            self.autosave.record_edit(now);
        }
        Ok(changed)
    }

    /// Write the open document now.
    pub fn save(&mut self) -> Result<()> {
        self.require_session()?;
        self.write_open()
    }

    fn write_open(&mut self) -> Result<()> {
        let open = self.open.as_mut().ok_or_else(no_open_project)?;
        let key = document_key(&open.category_id, &open.slug);
        self.store.set(&key, &open.document.to_json()?)?;
        open.stored = true;
        self.autosave.mark_flushed();
        debug!(key = %key, "document saved");
        Ok(())
    }

    /// Run the autosave policy at `now`.
    ///
    /// Store failures are not errors here: they are logged, the document
    /// stays dirty and the next periodic flush retries.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<FlushOutcome> {
        let reason = self.autosave.poll(now)?;
        if self.open.is_none() {
            self.autosave.mark_flushed();
            return None;
        }
        match self.write_open() {
            Ok(()) => Some(FlushOutcome::Saved(reason)),
            Err(err) => {
                warn!(error = %err, ?reason, "autosave failed; will retry");
                self.autosave.mark_failed();
                Some(FlushOutcome::Failed(reason))
            }
        }
    }

    // --- Export operations ---

    /// Single-project envelope; uses unsaved edits when the project is open.
    pub fn export_project(&self, category_id: &str, project: &str) -> Result<Envelope> {
        let document = self.view_project(category_id, project)?;
        let envelope = codec::export_document(category_id, &slugify(project), &document, self.now());
        info!(category = %category_id, project = %slugify(project), "project exported");
        Ok(envelope)
    }

    pub fn export_catalog(&self) -> Envelope {
        info!(categories = self.catalog.categories().len(), "catalog exported");
        codec::export_catalog(self.catalog.categories(), self.now())
    }

    /// Every stored document, plus the catalog when `include_categories`.
    pub fn export_all(&self, include_categories: bool) -> Result<Envelope> {
        let mut documents = BTreeMap::new();
        for key in self.store.keys_with_prefix(DOCUMENT_PREFIX)? {
            if parse_document_key(&key).is_none() {
                continue;
            }
            if let Some(doc) = self.load_document(&key)? {
                documents.insert(key, doc);
            }
        }
        if let Some(open) = self.open.as_ref().filter(|_| self.autosave.is_dirty()) {
            documents.insert(open.key(), open.document.clone());
        }
        let categories = include_categories.then(|| self.catalog.categories().to_vec());
        info!(documents = documents.len(), include_categories, "bulk export");
        Ok(codec::export_all(documents, categories, self.now()))
    }

    // --- Import operations ---

    /// Import an envelope of any granularity.
    ///
    /// Bulk payloads are applied with `mode`; single projects are written at
    /// their address.
    pub fn import(&mut self, raw: &str, mode: RestoreMode) -> Result<ImportOutcome> {
        self.require_session()?;
        match codec::import_envelope(raw)? {
            Imported::Document(imported) => self.import_project(imported),
            Imported::Catalog(bundle) => self.apply_bundle(bundle, mode).map(ImportOutcome::Catalog),
        }
    }

    /// Replace the open project's document with an imported one.
    ///
    /// Accepts a single-project envelope or a bare document, and saves
    /// immediately. When that write fails the new document stays open and
    /// dirty, and the next periodic flush retries it.
    pub fn import_into_open(&mut self, raw: &str) -> Result<()> {
        self.require_session()?;
        let imported = codec::import_document(raw)?;
        let now = self.now();
        let open = self.open_mut()?;
        open.document = imported.document;
        if let Err(err) = self.write_open() {
            self.autosave.record_edit(now);
            self.autosave.mark_failed();
            return Err(err);
        }
        info!("document loaded from file");
        Ok(())
    }

    /// Import every single-project export in `dir`.
    ///
    /// Files are imported one by one in name order; a file that cannot be
    /// read or decoded is recorded in [`FolderImport::failed`] and the rest
    /// still load. Bulk exports in the folder count as failures.
    ///
    /// # Errors
    ///
    /// Fails only when no session is valid or `dir` cannot be listed.
    pub fn import_dir(&mut self, dir: &Path) -> Result<FolderImport> {
        self.require_session()?;
        let files = crate::fs::project_files(dir).map_err(|e| {
            FolioError::Storage(format!("Failed to read {}: {}", dir.display(), e))
        })?;

        let mut report = FolderImport::default();
        for path in files {
            match self.import_file(&path) {
                Ok(_) => report.loaded.push(path),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping project file");
                    report.failed.push((path, err.to_string()));
                }
            }
        }
        info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            "folder imported"
        );
        Ok(report)
    }

    fn import_file(&mut self, path: &Path) -> Result<ImportOutcome> {
        let raw = std::fs::read_to_string(path)?;
        match codec::import_envelope(&raw)? {
            Imported::Document(imported) => self.import_project(imported),
            Imported::Catalog(bundle) => Err(FolioError::Schema(format!(
                "expected a single project, found a {} export",
                bundle.kind
            ))),
        }
    }

    /// Apply a decoded bulk bundle.
    pub fn restore(&mut self, bundle: CatalogBundle, mode: RestoreMode) -> Result<RestoreSummary> {
        self.require_session()?;
        self.apply_bundle(bundle, mode)
    }

    fn import_project(&mut self, imported: ImportedDocument) -> Result<ImportOutcome> {
        let ImportedDocument {
            category_id,
            project_id,
            document,
        } = imported;
        let (category_id, project_id) = match (category_id, project_id) {
            (Some(c), Some(p)) => (c, p),
            _ => {
                return Err(FolioError::Schema(
                    "single-project export has no categoryId/projectId".to_string(),
                ))
            }
        };
        let key = document_key(&category_id, &project_id);
        if parse_document_key(&key) != Some((category_id.as_str(), project_id.as_str())) {
            return Err(FolioError::Schema(format!(
                "invalid project address {}/{}",
                category_id, project_id
            )));
        }

        let mut catalog = self.catalog.clone();
        let mut ops = vec![StoreOp::set(key.clone(), document.to_json()?)];
        let listed =
            catalog.get(&category_id).is_some() && slugify(&document.title) == project_id;
        if listed && catalog.add_project(&category_id, &document.title)? {
            ops.push(index_op(&catalog)?);
        }
        self.store.apply(&ops)?;
        self.catalog = catalog;

        if let Some(open) = self.open.as_mut().filter(|open| open.key() == key) {
            open.document = document;
            open.stored = true;
            let now = self.clock.now();
            self.autosave.reset(now);
        }
        info!(category = %category_id, project = %project_id, listed, "project imported");
        Ok(ImportOutcome::Project {
            category_id,
            project_id,
            listed,
        })
    }

    fn apply_bundle(&mut self, bundle: CatalogBundle, mode: RestoreMode) -> Result<RestoreSummary> {
        let CatalogBundle {
            kind,
            projects,
            categories,
        } = bundle;
        let carries_projects = matches!(kind, EnvelopeKind::AllProjects | EnvelopeKind::FullBackup);

        let mut ops = Vec::new();
        let mut removed = BTreeSet::new();
        if carries_projects && mode == RestoreMode::Replace {
            for key in self.store.keys_with_prefix(DOCUMENT_PREFIX)? {
                if is_document_key(&key) && !projects.contains_key(&key) {
                    ops.push(StoreOp::remove(key.clone()));
                    removed.insert(key);
                }
            }
        }
        for (key, doc) in &projects {
            ops.push(StoreOp::set(key.clone(), doc.to_json()?));
        }

        let mut catalog = self.catalog.clone();
        let category_count = categories.as_ref().map(Vec::len);
        if let Some(categories) = categories {
            match mode {
                RestoreMode::Replace => catalog = CatalogIndex::new(categories),
                RestoreMode::Merge => catalog.merge(categories),
            }
            ops.push(index_op(&catalog)?);
        }

        self.store.apply(&ops)?;
        self.catalog = catalog;

        if let Some(key) = self.open.as_ref().map(OpenProject::key) {
            if let Some(doc) = projects.get(&key) {
                if let Some(open) = self.open.as_mut() {
                    open.document = doc.clone();
                    open.stored = true;
                }
                let now = self.now();
                self.autosave.reset(now);
            } else if removed.contains(&key) {
                self.discard_open();
            }
        }

        let summary = RestoreSummary {
            kind,
            mode,
            written: projects.len(),
            removed: removed.len(),
            categories: category_count,
        };
        info!(
            kind = %summary.kind,
            mode = %summary.mode,
            written = summary.written,
            removed = summary.removed,
            "bundle restored"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::session::{SessionSettings, DEFAULT_SECRET};
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn workspace() -> (Workspace<MemoryStore>, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new(Utc::now()));
        let gate = SessionGate::new(SessionSettings::default(), clock.clone());
        let seed = vec![Category::from_name("Minecraft").with_projects(["Voyage"])];
        let mut ws = Workspace::load(MemoryStore::new(), gate, clock.clone(), seed).unwrap();
        ws.login(DEFAULT_SECRET).unwrap();
        (ws, clock)
    }

    #[test]
    fn test_listed_project_without_document_opens_default() {
        let (mut ws, _) = workspace();
        let open = ws.open("minecraft", "Voyage").unwrap();
        assert!(!open.is_stored());
        assert_eq!(open.document().title, "Voyage");
        assert!(ws.store().get("project_minecraft_voyage").unwrap().is_none());

        ws.save().unwrap();
        assert!(ws.store().get("project_minecraft_voyage").unwrap().is_some());
    }

    #[test]
    fn test_unknown_project_is_not_found() {
        let (mut ws, _) = workspace();
        assert!(matches!(
            ws.open("minecraft", "missing"),
            Err(FolioError::NotFound(_))
        ));
        assert!(matches!(
            ws.open("nope", "voyage"),
            Err(FolioError::NotFound(_))
        ));
    }

    #[test]
    fn test_edits_require_open_project() {
        let (mut ws, _) = workspace();
        assert!(matches!(
            ws.insert_block(BlockKind::Text, None),
            Err(FolioError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_logout_blocks_edits() {
        let (mut ws, _) = workspace();
        ws.open("minecraft", "voyage").unwrap();
        ws.logout().unwrap();
        assert!(matches!(
            ws.insert_block(BlockKind::Title, None),
            Err(FolioError::AuthRequired)
        ));
        assert_eq!(ws.current().unwrap().document().len(), 1);
    }

    #[test]
    fn test_tick_saves_after_quiet_window() {
        let (mut ws, clock) = workspace();
        ws.open("minecraft", "voyage").unwrap();
        ws.insert_block(BlockKind::Title, Some(0)).unwrap();

        assert_eq!(ws.tick(clock.now() + Duration::seconds(1)), None);
        assert_eq!(
            ws.tick(clock.now() + Duration::seconds(2)),
            Some(FlushOutcome::Saved(FlushReason::Debounce))
        );
        let stored = ws.store().get("project_minecraft_voyage").unwrap().unwrap();
        assert_eq!(Document::from_json(&stored).unwrap().len(), 2);
    }

    #[test]
    fn test_remove_project_deletes_document() {
        let (mut ws, _) = workspace();
        ws.add_project("minecraft", "Odyssey").unwrap();
        assert!(ws.store().get("project_minecraft_odyssey").unwrap().is_some());

        assert!(ws.remove_project("minecraft", "Odyssey").unwrap());
        assert!(ws.store().get("project_minecraft_odyssey").unwrap().is_none());
        assert!(!ws.remove_project("minecraft", "Odyssey").unwrap());
    }

    #[test]
    fn test_add_project_rejects_unsluggable_names() {
        let (mut ws, _) = workspace();
        assert!(matches!(
            ws.add_project("minecraft", "!!!"),
            Err(FolioError::InvalidInput(_))
        ));
        assert!(!ws.add_project("minecraft", "Voyage").unwrap());
    }

    #[test]
    fn test_import_into_open_accepts_bare_document() {
        let (mut ws, _) = workspace();
        ws.open("minecraft", "voyage").unwrap();
        ws.import_into_open(r#"{"title": "Voyage", "content": [{"type": "image", "content": "a.png"}]}"#)
            .unwrap();
        let doc = ws.view_project("minecraft", "voyage").unwrap();
        assert_eq!(doc.content, vec![Block::Image("a.png".into())]);
        assert!(!ws.autosave().is_dirty());
    }

    #[test]
    fn test_export_all_includes_unsaved_open_document() {
        let (mut ws, _) = workspace();
        ws.open("minecraft", "voyage").unwrap();
        ws.insert_block(BlockKind::Text, None).unwrap();

        let envelope = ws.export_all(false).unwrap();
        let projects = envelope.projects.unwrap();
        assert_eq!(projects["project_minecraft_voyage"].len(), 2);
        assert_eq!(envelope.metadata.kind, Some(EnvelopeKind::AllProjects));
    }
}
