//! Portable JSON envelope for import and export.
//!
//! Every export is an [`Envelope`]: a `metadata` object plus exactly one
//! payload. Single-project envelopes carry the blocks at top-level
//! `content`; bulk envelopes carry `projects` (a map keyed by store key)
//! and/or `categories`.
//!
//! ```json
//! {
//!   "metadata": { "categoryId": "minecraft", "projectId": "voyage",
//!                 "title": "Voyage", "exported": "...", "version": "1.0" },
//!   "content": [ { "type": "title", "content": "Overview" } ]
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{is_valid_category_id, Category};
use crate::document::{Block, Document};
use crate::error::{FolioError, Result};
use crate::store::keys::parse_document_key;

/// Envelope format version written on export.
pub const ENVELOPE_VERSION: &str = "1.0";

/// Granularity of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnvelopeKind {
    SingleProject,
    AllProjects,
    Categories,
    FullBackup,
}

impl EnvelopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvelopeKind::SingleProject => "single-project",
            EnvelopeKind::AllProjects => "all-projects",
            EnvelopeKind::Categories => "categories",
            EnvelopeKind::FullBackup => "full-backup",
        }
    }
}

impl fmt::Display for EnvelopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Envelope header. Every field is optional on import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeMetadata {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EnvelopeKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_count: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_count: Option<usize>,
}

/// A full export file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub metadata: EnvelopeMetadata,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<Block>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Document>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<BTreeMap<String, Document>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
}

impl Envelope {
    fn with_metadata(metadata: EnvelopeMetadata) -> Self {
        Self {
            metadata,
            content: None,
            project: None,
            projects: None,
            categories: None,
        }
    }

    /// Effective granularity. Untyped envelopes are single-project.
    pub fn kind(&self) -> EnvelopeKind {
        self.metadata.kind.unwrap_or(EnvelopeKind::SingleProject)
    }

    /// Pretty-printed JSON, two-space indent.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Suggested file name for this export.
    pub fn file_name(&self) -> String {
        let date = self
            .metadata
            .exported
            .unwrap_or_else(Utc::now)
            .format("%Y-%m-%d");
        match self.kind() {
            EnvelopeKind::SingleProject => format!(
                "{}_{}.json",
                self.metadata.category_id.as_deref().unwrap_or("project"),
                self.metadata.project_id.as_deref().unwrap_or("export")
            ),
            EnvelopeKind::AllProjects => format!("projects_backup_{}.json", date),
            EnvelopeKind::FullBackup => format!("all_projects_backup_{}.json", date),
            EnvelopeKind::Categories => format!("categories_{}.json", date),
        }
    }

    /// Write the pretty JSON to `dir/<file_name>` atomically and return the path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        crate::fs::write_atomic(&path, self.to_json_pretty()?.as_bytes()).map_err(|e| {
            FolioError::Storage(format!("Failed to write {}: {}", path.display(), e))
        })?;
        Ok(path)
    }
}

/// Single-project export.
pub fn export_document(
    category_id: &str,
    project_id: &str,
    doc: &Document,
    exported: DateTime<Utc>,
) -> Envelope {
    let mut envelope = Envelope::with_metadata(EnvelopeMetadata {
        category_id: Some(category_id.to_string()),
        project_id: Some(project_id.to_string()),
        title: Some(doc.title.clone()),
        created: Some(doc.created),
        last_modified: Some(doc.last_modified),
        exported: Some(exported),
        version: Some(ENVELOPE_VERSION.to_string()),
        ..Default::default()
    });
    envelope.content = Some(doc.content.clone());
    envelope
}

/// Category list export.
pub fn export_catalog(categories: &[Category], exported: DateTime<Utc>) -> Envelope {
    let mut envelope = Envelope::with_metadata(EnvelopeMetadata {
        kind: Some(EnvelopeKind::Categories),
        exported: Some(exported),
        version: Some(ENVELOPE_VERSION.to_string()),
        category_count: Some(categories.len()),
        ..Default::default()
    });
    envelope.categories = Some(categories.to_vec());
    envelope
}

/// Bulk export keyed by store key.
///
/// Produces `full-backup` when `categories` is given, `all-projects` otherwise.
pub fn export_all(
    documents: BTreeMap<String, Document>,
    categories: Option<Vec<Category>>,
    exported: DateTime<Utc>,
) -> Envelope {
    let kind = if categories.is_some() {
        EnvelopeKind::FullBackup
    } else {
        EnvelopeKind::AllProjects
    };
    let mut envelope = Envelope::with_metadata(EnvelopeMetadata {
        kind: Some(kind),
        exported: Some(exported),
        version: Some(ENVELOPE_VERSION.to_string()),
        project_count: Some(documents.len()),
        category_count: categories.as_ref().map(Vec::len),
        ..Default::default()
    });
    envelope.projects = Some(documents);
    envelope.categories = categories;
    envelope
}

/// A single project decoded from an envelope or a bare document.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedDocument {
    pub category_id: Option<String>,
    pub project_id: Option<String>,
    pub document: Document,
}

/// Bulk payload decoded from an envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogBundle {
    pub kind: EnvelopeKind,
    /// Documents keyed by store key; every key is in the document namespace.
    pub projects: BTreeMap<String, Document>,
    pub categories: Option<Vec<Category>>,
}

/// Result of decoding an import file.
#[derive(Debug, Clone, PartialEq)]
pub enum Imported {
    Document(ImportedDocument),
    Catalog(CatalogBundle),
}

/// How a bulk bundle is applied to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RestoreMode {
    /// Remove every document key, then write the bundle.
    #[default]
    Replace,
    /// Write the bundle over existing keys and leave the rest.
    Merge,
}

impl fmt::Display for RestoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreMode::Replace => f.write_str("replace"),
            RestoreMode::Merge => f.write_str("merge"),
        }
    }
}

impl FromStr for RestoreMode {
    type Err = FolioError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(RestoreMode::Replace),
            "merge" => Ok(RestoreMode::Merge),
            other => Err(FolioError::InvalidInput(format!(
                "Unknown restore mode: {} (use replace or merge)",
                other
            ))),
        }
    }
}

fn parse_value(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).map_err(|e| FolioError::Parse(e.to_string()))
}

fn schema<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| FolioError::Schema(e.to_string()))
}

/// Decode an import file.
///
/// # Errors
///
/// - `FolioError::Parse` if `raw` is not JSON
/// - `FolioError::Schema` if the envelope or its payload is malformed
pub fn import_envelope(raw: &str) -> Result<Imported> {
    let value = parse_value(raw)?;
    if value.get("metadata").is_none() {
        return Err(FolioError::Schema("missing metadata".to_string()));
    }
    decode(schema(value)?)
}

/// Decode an import aimed at one already-open project.
///
/// Accepts a single-project envelope or a bare document JSON.
pub fn import_document(raw: &str) -> Result<ImportedDocument> {
    let value = parse_value(raw)?;
    if value.get("metadata").is_some() {
        return match decode(schema(value)?)? {
            Imported::Document(doc) => Ok(doc),
            Imported::Catalog(bundle) => Err(FolioError::Schema(format!(
                "expected a single project, found a {} export",
                bundle.kind
            ))),
        };
    }
    let mut document: Document = schema(value)?;
    document.ensure_content();
    Ok(ImportedDocument {
        category_id: None,
        project_id: None,
        document,
    })
}

fn decode(envelope: Envelope) -> Result<Imported> {
    match envelope.kind() {
        EnvelopeKind::SingleProject => decode_document(envelope).map(Imported::Document),
        kind => decode_bundle(kind, envelope).map(Imported::Catalog),
    }
}

fn decode_document(envelope: Envelope) -> Result<ImportedDocument> {
    let Envelope {
        metadata,
        content,
        project,
        ..
    } = envelope;
    let now = Utc::now();

    let mut document = match (content, project) {
        (Some(content), _) => Document {
            title: metadata
                .title
                .clone()
                .or_else(|| metadata.project_id.clone())
                .unwrap_or_else(|| "Untitled".to_string()),
            content,
            created: metadata.created.unwrap_or(now),
            last_modified: metadata.last_modified.unwrap_or(now),
        },
        (None, Some(project)) => project,
        (None, None) => {
            return Err(FolioError::Schema(
                "single-project export has no content".to_string(),
            ))
        }
    };
    document.ensure_content();

    Ok(ImportedDocument {
        category_id: metadata.category_id,
        project_id: metadata.project_id,
        document,
    })
}

fn decode_bundle(kind: EnvelopeKind, envelope: Envelope) -> Result<CatalogBundle> {
    let needs_projects = matches!(kind, EnvelopeKind::AllProjects | EnvelopeKind::FullBackup);
    let needs_categories = matches!(kind, EnvelopeKind::Categories | EnvelopeKind::FullBackup);

    if needs_projects && envelope.projects.is_none() {
        return Err(FolioError::Schema(format!("{} export has no projects", kind)));
    }
    if needs_categories && envelope.categories.is_none() {
        return Err(FolioError::Schema(format!(
            "{} export has no categories",
            kind
        )));
    }

    let mut projects = if needs_projects {
        envelope.projects.unwrap_or_default()
    } else {
        BTreeMap::new()
    };
    if let Some(key) = projects.keys().find(|k| parse_document_key(k).is_none()) {
        return Err(FolioError::Schema(format!(
            "{} is not a project key",
            key
        )));
    }
    for doc in projects.values_mut() {
        doc.ensure_content();
    }
    if let Some(categories) = envelope.categories.as_deref().filter(|_| needs_categories) {
        check_category_ids(categories)?;
    }

    Ok(CatalogBundle {
        kind,
        projects,
        categories: if needs_categories {
            envelope.categories
        } else {
            None
        },
    })
}

fn check_category_ids(categories: &[Category]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for category in categories {
        if !is_valid_category_id(&category.id) {
            return Err(FolioError::Schema(format!(
                "invalid category id {:?}",
                category.id
            )));
        }
        if !seen.insert(category.id.as_str()) {
            return Err(FolioError::Schema(format!(
                "duplicate category id {}",
                category.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut doc = Document::new("Voyage", Utc::now());
        doc.content = vec![
            Block::Title("Overview".into()),
            Block::Text("Details".into()),
        ];
        doc
    }

    #[test]
    fn test_document_round_trip() {
        let doc = sample();
        let json = export_document("minecraft", "voyage", &doc, Utc::now())
            .to_json_pretty()
            .unwrap();

        match import_envelope(&json).unwrap() {
            Imported::Document(imported) => {
                assert_eq!(imported.category_id.as_deref(), Some("minecraft"));
                assert_eq!(imported.project_id.as_deref(), Some("voyage"));
                assert_eq!(imported.document.title, doc.title);
                assert_eq!(imported.document.content, doc.content);
            }
            other => panic!("expected a document, got {:?}", other),
        }
    }

    #[test]
    fn test_single_project_wire_shape() {
        let json = export_document("minecraft", "voyage", &sample(), Utc::now())
            .to_json_pretty()
            .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["metadata"]["categoryId"], "minecraft");
        assert_eq!(value["metadata"]["version"], "1.0");
        assert!(value["metadata"].get("type").is_none());
        assert_eq!(value["content"][0]["type"], "title");
        assert_eq!(value["content"][1]["content"], "Details");
        assert!(json.contains("\n  \"metadata\""));
    }

    #[test]
    fn test_project_object_shape_is_accepted() {
        let raw = r#"{
            "metadata": {"categoryId": "roblox", "projectId": "d-d-foods"},
            "project": {"title": "D&D Foods", "content": [{"type": "image", "content": "https://x/y.png"}]}
        }"#;
        match import_envelope(raw).unwrap() {
            Imported::Document(imported) => {
                assert_eq!(imported.document.title, "D&D Foods");
                assert_eq!(imported.document.content.len(), 1);
            }
            other => panic!("expected a document, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_and_schema_errors() {
        assert!(matches!(import_envelope("{not json"), Err(FolioError::Parse(_))));
        assert!(matches!(
            import_envelope(r#"{"content": []}"#),
            Err(FolioError::Schema(_))
        ));
        assert!(matches!(
            import_envelope(r#"{"metadata": {"projectId": "x"}}"#),
            Err(FolioError::Schema(_))
        ));
        assert!(matches!(
            import_envelope(r#"{"metadata": {"type": "all-projects"}}"#),
            Err(FolioError::Schema(_))
        ));
        assert!(matches!(
            import_envelope(r#"{"metadata": {}, "content": [{"type": "video", "content": "x"}]}"#),
            Err(FolioError::Schema(_))
        ));
    }

    #[test]
    fn test_bulk_keys_must_be_project_keys() {
        let raw = r#"{
            "metadata": {"type": "all-projects"},
            "projects": {"project_auth": {"title": "x", "content": []}}
        }"#;
        assert!(matches!(import_envelope(raw), Err(FolioError::Schema(_))));
    }

    #[test]
    fn test_bundle_category_ids_must_be_distinct_and_separator_free() {
        for categories in [
            r#"[{"id": "a", "name": "A"}, {"id": "a_b", "name": "A B"}]"#,
            r#"[{"id": "", "name": "Blank"}]"#,
            r#"[{"id": "a", "name": "A"}, {"id": "a", "name": "Again"}]"#,
        ] {
            let raw = format!(
                r#"{{"metadata": {{"type": "categories"}}, "categories": {}}}"#,
                categories
            );
            assert!(
                matches!(import_envelope(&raw), Err(FolioError::Schema(_))),
                "accepted {}",
                categories
            );
        }
    }

    #[test]
    fn test_full_backup_round_trip() {
        let mut docs = BTreeMap::new();
        docs.insert("project_minecraft_voyage".to_string(), sample());
        let categories = vec![Category::from_name("minecraft").with_projects(["Voyage"])];
        let envelope = export_all(docs.clone(), Some(categories.clone()), Utc::now());

        assert_eq!(envelope.kind(), EnvelopeKind::FullBackup);
        assert_eq!(envelope.metadata.project_count, Some(1));
        assert_eq!(envelope.metadata.category_count, Some(1));

        match import_envelope(&envelope.to_json_pretty().unwrap()).unwrap() {
            Imported::Catalog(bundle) => {
                assert_eq!(bundle.projects, docs);
                assert_eq!(bundle.categories, Some(categories));
            }
            other => panic!("expected a bundle, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_document_import() {
        let raw = r#"{"title": "Loose", "content": []}"#;
        let imported = import_document(raw).unwrap();
        assert_eq!(imported.document.title, "Loose");
        assert_eq!(imported.document.content.len(), 1);
        assert!(imported.category_id.is_none());
    }

    #[test]
    fn test_file_names() {
        let exported = DateTime::parse_from_rfc3339("2025-03-14T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            export_document("minecraft", "voyage", &sample(), exported).file_name(),
            "minecraft_voyage.json"
        );
        assert_eq!(
            export_all(BTreeMap::new(), None, exported).file_name(),
            "projects_backup_2025-03-14.json"
        );
        assert_eq!(
            export_all(BTreeMap::new(), Some(Vec::new()), exported).file_name(),
            "all_projects_backup_2025-03-14.json"
        );
        assert_eq!(
            export_catalog(&[], exported).file_name(),
            "categories_2025-03-14.json"
        );
    }
}
