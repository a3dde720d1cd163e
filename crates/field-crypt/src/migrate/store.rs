//! [`RowStore`]: the storage seam the migration utility scans and rewrites.

use std::collections::HashMap;

use common::{Row, StoreError, Table};

/// Source of persisted rows with encrypted columns.
#[cfg_attr(test, mockall::automock)]
pub trait RowStore {
    /// Every row of every table with encrypted columns.
    fn rows(&self) -> Result<Vec<Row>, StoreError>;

    /// Overwrite the stored row with the same table and id as `row`.
    fn update(&mut self, row: &Row) -> Result<(), StoreError>;
}

/// In-memory [`RowStore`], keyed by table and id, preserving insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: Vec<Row>,
    index: HashMap<(Table, String), usize>,
    writes: usize,
}

impl MemoryStore {
    /// Create a store holding `rows`.
    pub fn new(rows: impl IntoIterator<Item = Row>) -> Self {
        let mut store = Self::default();
        for row in rows {
            store.insert(row);
        }
        store
    }

    /// Insert or replace a row.
    pub fn insert(&mut self, row: Row) {
        let key = (row.table(), row.id().to_owned());
        match self.index.get(&key) {
            Some(&i) => self.rows[i] = row,
            None => {
                self.index.insert(key, self.rows.len());
                self.rows.push(row);
            }
        }
    }

    /// Look up a row by table and id.
    pub fn get(&self, table: Table, id: &str) -> Option<&Row> {
        self.index
            .get(&(table, id.to_owned()))
            .map(|&i| &self.rows[i])
    }

    /// Number of successful [`RowStore::update`] calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Consume the store and return its rows in insertion order.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl RowStore for MemoryStore {
    fn rows(&self) -> Result<Vec<Row>, StoreError> {
        Ok(self.rows.clone())
    }

    fn update(&mut self, row: &Row) -> Result<(), StoreError> {
        let key = (row.table(), row.id().to_owned());
        let i = *self.index.get(&key).ok_or_else(|| StoreError::NotFound {
            table: row.table(),
            id: row.id().to_owned(),
        })?;
        self.rows[i] = row.clone();
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::FolderRow;

    fn folder(id: &str, name: &str) -> Row {
        Row::Folder(FolderRow {
            id: id.into(),
            name: name.into(),
            icon: "📁".into(),
            extra: Default::default(),
        })
    }

    #[test]
    fn update_replaces_existing_row() {
        let mut store = MemoryStore::new([folder("f_1", "old"), folder("f_2", "other")]);
        store.update(&folder("f_1", "new")).unwrap();
        assert_eq!(store.writes(), 1);
        assert_eq!(store.get(Table::Folder, "f_1"), Some(&folder("f_1", "new")));
        assert_eq!(store.rows().unwrap().len(), 2);
    }

    #[test]
    fn update_of_unknown_row_is_not_found() {
        let mut store = MemoryStore::new([folder("f_1", "old")]);
        let err = store.update(&folder("f_9", "x")).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn insert_preserves_order_and_dedupes() {
        let mut store = MemoryStore::new([folder("a", "1"), folder("b", "2")]);
        store.insert(folder("a", "3"));
        let ids: Vec<_> = store.into_rows().iter().map(|r| r.id().to_owned()).collect();
        assert_eq!(ids, ["a", "b"]);
    }
}
