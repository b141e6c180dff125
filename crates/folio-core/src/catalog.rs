//! Catalog index: categories and their ordered project names.
//!
//! The index owns membership only. Project documents are stored separately
//! under `(category_id, slugify(name))`; the workspace keeps the two in step
//! on explicit deletes, and a listed name without a stored document is a
//! valid "not yet created" state.

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

/// Normalize a display name into a slug.
///
/// Lowercases, strips everything outside `[a-z0-9]`, whitespace and `-`,
/// then collapses whitespace runs into single dashes. Whitespace at either
/// end becomes a dash as well (`" Voyage "` is `-voyage-`), which keeps
/// keys compatible with existing stores. The output only contains
/// `[a-z0-9-]`, which makes the function idempotent.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_space = false;
    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-') {
            continue;
        }
        if pending_space {
            slug.push('-');
            pending_space = false;
        }
        slug.push(ch);
    }
    if pending_space {
        slug.push('-');
    }
    slug
}

/// Derive a category id from its display name.
///
/// Every character outside `[a-z0-9]` (after lowercasing) becomes `-`, so
/// ids never contain the `_` used as the key separator.
pub fn category_id(name: &str) -> String {
    name.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|ch| {
            if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
                ch
            } else {
                '-'
            }
        })
        .collect()
}

/// Whether `id` can address documents: non-empty and free of the `_` key
/// separator, so its key prefix never covers another category's keys.
pub fn is_valid_category_id(id: &str) -> bool {
    !id.is_empty() && !id.contains('_')
}

/// A named group of projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub projects: Vec<String>,
}

impl Category {
    /// Build a category from a display name.
    pub fn from_name(name: &str) -> Self {
        Self {
            id: category_id(name),
            name: name.trim().to_uppercase(),
            projects: Vec::new(),
        }
    }

    pub fn with_projects<I, S>(mut self, projects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for project in projects {
            self.add_project(&project.into());
        }
        self
    }

    /// Append `name` unless already listed (exact match). Returns whether it was added.
    pub fn add_project(&mut self, name: &str) -> bool {
        if self.projects.iter().any(|p| p == name) {
            return false;
        }
        self.projects.push(name.to_string());
        true
    }

    /// Remove `name` (exact match). Returns whether it was listed.
    pub fn remove_project(&mut self, name: &str) -> bool {
        let before = self.projects.len();
        self.projects.retain(|p| p != name);
        self.projects.len() != before
    }

    /// Listed project name whose slug is `slug`.
    pub fn project_for_slug(&self, slug: &str) -> Option<&str> {
        self.projects
            .iter()
            .find(|p| slugify(p) == slug)
            .map(String::as_str)
    }
}

/// Ordered set of categories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogIndex {
    categories: Vec<Category>,
}

impl CatalogIndex {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn into_categories(self) -> Vec<Category> {
        self.categories
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Look up a category, failing with `NotFound`.
    pub fn require(&self, id: &str) -> Result<&Category> {
        self.get(id)
            .ok_or_else(|| FolioError::NotFound(format!("Category \"{}\"", id)))
    }

    fn require_mut(&mut self, id: &str) -> Result<&mut Category> {
        self.categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| FolioError::NotFound(format!("Category \"{}\"", id)))
    }

    /// Create a category from a display name.
    ///
    /// # Errors
    ///
    /// Returns `FolioError::InvalidInput` when the name is blank or its id
    /// collides with an existing category.
    pub fn add_category(&mut self, name: &str) -> Result<&Category> {
        if name.trim().is_empty() {
            return Err(FolioError::InvalidInput(
                "Category name cannot be empty".to_string(),
            ));
        }
        let category = Category::from_name(name);
        if self.get(&category.id).is_some() {
            return Err(FolioError::InvalidInput(format!(
                "Category \"{}\" already exists",
                category.id
            )));
        }
        self.categories.push(category);
        Ok(&self.categories[self.categories.len() - 1])
    }

    /// Change a category's display name. The id, and with it every
    /// document key, stays the same. Returns whether the name changed.
    ///
    /// # Errors
    ///
    /// Returns `FolioError::InvalidInput` for a blank name and
    /// `FolioError::NotFound` for an unknown id.
    pub fn rename_category(&mut self, id: &str, name: &str) -> Result<bool> {
        if name.trim().is_empty() {
            return Err(FolioError::InvalidInput(
                "Category name cannot be empty".to_string(),
            ));
        }
        let name = name.trim().to_uppercase();
        let category = self.require_mut(id)?;
        if category.name == name {
            return Ok(false);
        }
        category.name = name;
        Ok(true)
    }

    /// Remove a category, returning it.
    pub fn delete_category(&mut self, id: &str) -> Option<Category> {
        let position = self.categories.iter().position(|c| c.id == id)?;
        Some(self.categories.remove(position))
    }

    /// Add a project name to a category. Returns whether it was added.
    pub fn add_project(&mut self, category_id: &str, name: &str) -> Result<bool> {
        Ok(self.require_mut(category_id)?.add_project(name))
    }

    /// Remove a project name from a category. Returns whether it was listed.
    pub fn remove_project(&mut self, category_id: &str, name: &str) -> Result<bool> {
        Ok(self.require_mut(category_id)?.remove_project(name))
    }

    /// Fold `incoming` into this index.
    ///
    /// Unknown categories are appended; known ones gain the projects they
    /// do not list yet, in incoming order.
    pub fn merge(&mut self, incoming: Vec<Category>) {
        for category in incoming {
            match self.categories.iter_mut().find(|c| c.id == category.id) {
                Some(existing) => {
                    for project in &category.projects {
                        existing.add_project(project);
                    }
                }
                None => self.categories.push(category),
            }
        }
    }
}
