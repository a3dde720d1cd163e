//! Persisted row shapes whose sensitive columns are stored encrypted.
//!
//! Only the columns the codec owns are modelled as typed fields. Every other
//! column (timestamps, flags, tags, foreign keys) is carried through
//! [`serde_json`] untouched in `extra`, so rewriting a row never drops data
//! the codec does not understand.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Database table a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    /// The `bookmark` table.
    Bookmark,
    /// The `folder` table.
    Folder,
}

impl Table {
    /// The table name as it appears in the schema.
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Bookmark => "bookmark",
            Table::Folder => "folder",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of the `bookmark` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkRow {
    /// Primary key.
    pub id: String,
    /// Encrypted target URL.
    pub url: String,
    /// Encrypted page title.
    pub title: String,
    /// Encrypted favicon URL, if one was fetched.
    #[serde(default)]
    pub favicon_url: Option<String>,
    /// Encrypted Open Graph image URL, if one was fetched.
    #[serde(default)]
    pub og_image_url: Option<String>,
    /// Encrypted page description, if one was fetched.
    #[serde(default)]
    pub description: Option<String>,
    /// Columns the codec does not own.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A row of the `folder` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderRow {
    /// Primary key.
    pub id: String,
    /// Encrypted folder name.
    pub name: String,
    /// Encrypted folder icon (usually a single emoji).
    pub icon: String,
    /// Columns the codec does not own.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A persisted row from any table with encrypted columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// A bookmark row.
    Bookmark(BookmarkRow),
    /// A folder row.
    Folder(FolderRow),
}

impl Row {
    /// The table this row belongs to.
    pub fn table(&self) -> Table {
        match self {
            Row::Bookmark(_) => Table::Bookmark,
            Row::Folder(_) => Table::Folder,
        }
    }

    /// Primary key of the row.
    pub fn id(&self) -> &str {
        match self {
            Row::Bookmark(b) => &b.id,
            Row::Folder(f) => &f.id,
        }
    }

    /// Mutable access to every present encrypted column, paired with its
    /// column name. Absent optional columns are skipped.
    pub fn encrypted_columns_mut(&mut self) -> Vec<(&'static str, &mut String)> {
        match self {
            Row::Bookmark(b) => {
                let mut cols: Vec<(&'static str, &mut String)> =
                    vec![("url", &mut b.url), ("title", &mut b.title)];
                if let Some(v) = b.favicon_url.as_mut() {
                    cols.push(("favicon_url", v));
                }
                if let Some(v) = b.og_image_url.as_mut() {
                    cols.push(("og_image_url", v));
                }
                if let Some(v) = b.description.as_mut() {
                    cols.push(("description", v));
                }
                cols
            }
            Row::Folder(f) => vec![("name", &mut f.name), ("icon", &mut f.icon)],
        }
    }

    /// Read-only view of every present encrypted column.
    pub fn encrypted_columns(&self) -> Vec<(&'static str, &str)> {
        match self {
            Row::Bookmark(b) => {
                let mut cols = vec![("url", b.url.as_str()), ("title", b.title.as_str())];
                if let Some(v) = b.favicon_url.as_deref() {
                    cols.push(("favicon_url", v));
                }
                if let Some(v) = b.og_image_url.as_deref() {
                    cols.push(("og_image_url", v));
                }
                if let Some(v) = b.description.as_deref() {
                    cols.push(("description", v));
                }
                cols
            }
            Row::Folder(f) => vec![("name", f.name.as_str()), ("icon", f.icon.as_str())],
        }
    }
}
