//! Key layout for the keyed store.
//!
//! Documents live under `project_<categoryId>_<slug>`. The session flag
//! shares the `project_` prefix for compatibility with older stores, so the
//! document namespace is "every `project_` key except the session flag".

/// Prefix shared by every project document key.
pub const DOCUMENT_PREFIX: &str = "project_";

/// Session flag key.
pub const SESSION_KEY: &str = "project_auth";

/// Catalog index blob key.
pub const CATALOG_KEY: &str = "catalog_index";

/// Locally persisted secret override.
pub const SECRET_OVERRIDE_KEY: &str = "site_secret";

/// Build the store key for a project document.
pub fn document_key(category_id: &str, slug: &str) -> String {
    format!("{}{}_{}", DOCUMENT_PREFIX, category_id, slug)
}

/// Prefix covering every document in a category.
pub fn category_prefix(category_id: &str) -> String {
    format!("{}{}_", DOCUMENT_PREFIX, category_id)
}

/// Whether a key belongs to the document namespace.
pub fn is_document_key(key: &str) -> bool {
    key.starts_with(DOCUMENT_PREFIX) && key != SESSION_KEY
}

/// Split a document key into `(category_id, slug)`.
///
/// Category ids never contain `_`, so the first underscore after the prefix
/// is the separator.
pub fn parse_document_key(key: &str) -> Option<(&str, &str)> {
    if !is_document_key(key) {
        return None;
    }
    let rest = &key[DOCUMENT_PREFIX.len()..];
    let (category_id, slug) = rest.split_once('_')?;
    if category_id.is_empty() || slug.is_empty() {
        return None;
    }
    Some((category_id, slug))
}
