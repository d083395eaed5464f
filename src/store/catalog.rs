//! Catalog document: categories mapped to ordered posts.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::StoreError;

/// A link to a channel message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    /// Button label shown in the mini app.
    pub title: String,

    /// Link opened when the post is selected.
    pub url: String,
}

impl Post {
    /// Creates a new post.
    #[must_use]
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// A problem found while checking a catalog document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogIssue {
    /// Category the issue belongs to.
    pub category: String,

    /// Post index inside the category, if the issue concerns a post.
    pub index: Option<usize>,

    /// Human readable description.
    pub message: String,
}

/// Full category to posts mapping, in display order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Catalog {
    categories: IndexMap<String, Vec<Post>>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a catalog from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if the text is not a valid catalog document.
    pub fn from_json(content: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Renders the catalog as indented JSON with non-ASCII text kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if serialization fails.
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Saves the catalog to a JSON file, replacing its contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Returns the posts of a category.
    #[must_use]
    pub fn get(&self, category: &str) -> Option<&Vec<Post>> {
        self.categories.get(category)
    }

    pub(crate) fn get_mut(&mut self, category: &str) -> Option<&mut Vec<Post>> {
        self.categories.get_mut(category)
    }

    /// Checks whether a category exists.
    #[must_use]
    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// Inserts or replaces a category, appending new names at the end.
    pub fn insert(&mut self, category: impl Into<String>, posts: Vec<Post>) -> Option<Vec<Post>> {
        self.categories.insert(category.into(), posts)
    }

    /// Removes a category, keeping the order of the remaining ones.
    pub fn remove(&mut self, category: &str) -> Option<Vec<Post>> {
        self.categories.shift_remove(category)
    }

    /// Returns the category names in display order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Returns the number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Checks if there are no categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Returns the number of posts across all categories.
    #[must_use]
    pub fn post_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// Lists blank names and fields, which the mini app renders as empty buttons.
    #[must_use]
    pub fn validate_all(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();

        for (name, posts) in &self.categories {
            if name.trim().is_empty() {
                issues.push(CatalogIssue {
                    category: name.clone(),
                    index: None,
                    message: "Category name is blank".to_owned(),
                });
            }

            for (index, post) in posts.iter().enumerate() {
                let blank = match (post.title.trim().is_empty(), post.url.trim().is_empty()) {
                    (true, true) => "Post title and url are blank",
                    (true, false) => "Post title is blank",
                    (false, true) => "Post url is blank",
                    (false, false) => continue,
                };
                issues.push(CatalogIssue {
                    category: name.clone(),
                    index: Some(index),
                    message: blank.to_owned(),
                });
            }
        }

        issues
    }

    /// Built-in catalog written when no data file exists yet.
    #[must_use]
    pub fn example() -> Self {
        let mut catalog = Self::new();
        catalog.insert(
            "📢 Announcements",
            vec![Post::new("Welcome to the channel", "https://t.me/c/1/1")],
        );
        catalog.insert(
            "📚 Guides",
            vec![
                Post::new("Getting started", "https://t.me/c/1/2"),
                Post::new("Frequently asked questions", "https://t.me/c/1/3"),
            ],
        );
        catalog.insert("🎉 Events", Vec::new());
        catalog
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = (&'a String, &'a Vec<Post>);
    type IntoIter = indexmap::map::Iter<'a, String, Vec<Post>>;

    fn into_iter(self) -> Self::IntoIter {
        self.categories.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_keeps_category_order() {
        let json = r#"{"Zeta":[],"Alpha":[{"title":"A","url":"https://t.me/c/1"}],"Mid":[]}"#;
        let catalog = Catalog::from_json(json).unwrap();

        let names: Vec<&str> = catalog.names().collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_json_writes_unicode_verbatim() {
        let mut catalog = Catalog::new();
        catalog.insert("Математика 🧮", vec![Post::new("Пределы", "https://t.me/c/1")]);

        let json = catalog.to_json().unwrap();
        assert!(json.contains("Математика 🧮"));
        assert!(json.contains("Пределы"));
        assert!(!json.contains("\\u"));
        assert!(json.contains("\n  \""));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("posts.json");

        let catalog = Catalog::example();
        catalog.save_to_file(&path).unwrap();

        let loaded = Catalog::load_from_file(&path).unwrap();
        assert_eq!(loaded, catalog);
    }

    #[test]
    fn test_remove_keeps_remaining_order() {
        let mut catalog = Catalog::new();
        catalog.insert("a", Vec::new());
        catalog.insert("b", Vec::new());
        catalog.insert("c", Vec::new());

        catalog.remove("b");
        let names: Vec<&str> = catalog.names().collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_validate_all_reports_each_issue() {
        let mut catalog = Catalog::new();
        catalog.insert(" ", vec![Post::new("ok", "https://t.me/c/1")]);
        catalog.insert("News", vec![Post::new("", "https://t.me/c/2"), Post::new("x", " ")]);

        let issues = catalog.validate_all();
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].index, None);
        assert_eq!(issues[1].index, Some(0));
        assert_eq!(issues[2].index, Some(1));
        assert_eq!(issues[2].message, "Post url is blank");
    }

    #[test]
    fn test_whitespace_is_kept_on_round_trip() {
        let mut catalog = Catalog::new();
        catalog.insert(" Math ", vec![Post::new(" Limits ", "https://t.me/c/1 ")]);

        let loaded = Catalog::from_json(&catalog.to_json().unwrap()).unwrap();
        assert_eq!(loaded.get(" Math "), Some(&vec![Post::new(" Limits ", "https://t.me/c/1 ")]));
    }

    #[test]
    fn test_example_is_valid() {
        let catalog = Catalog::example();
        assert!(catalog.validate_all().is_empty());
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.post_count(), 3);
    }
}
