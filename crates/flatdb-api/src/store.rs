//! The [`TableStore`] trait, the seam between the store engine and the code that uses it.

use crate::prelude::{Conditions, FlatDbResult, Record, RecordId};

/// Table-scoped CRUD over JSON record collections.
///
/// Each call is atomic with respect to the table it touches: it runs entirely while holding the
/// table lock, and either applies all of its effects or none of them.
pub trait TableStore {
    /// Returns the records of `table` matching every condition, in file order.
    ///
    /// With empty conditions every record is returned.
    fn query(&self, table: &str, conditions: &Conditions) -> FlatDbResult<Vec<Record>>;

    /// Inserts a new record and returns the identifier assigned to it.
    ///
    /// `id`, `created_at` and `updated_at` are always set by the store, overriding any value
    /// provided in `fields`.
    fn insert(&self, table: &str, fields: Record) -> FlatDbResult<RecordId>;

    /// Inserts a new record like [`TableStore::insert`], unless a record matching `conditions`
    /// already exists.
    ///
    /// The check and the insert run in the same critical section, so no other writer can add a
    /// matching record in between. Returns [`None`], without writing anything, when a record
    /// matches. Empty conditions match any record.
    fn insert_unless(
        &self,
        table: &str,
        conditions: &Conditions,
        fields: Record,
    ) -> FlatDbResult<Option<RecordId>>;

    /// Merges `fields` into the record with the given id and stamps `updated_at`.
    ///
    /// `id` and `created_at` in `fields` are ignored.
    /// Returns `false`, without writing anything, when no record has that id.
    fn update(&self, table: &str, id: &RecordId, fields: Record) -> FlatDbResult<bool>;

    /// Removes the record with the given id.
    ///
    /// Returns `false`, without writing anything, when no record has that id.
    fn delete(&self, table: &str, id: &RecordId) -> FlatDbResult<bool>;

    /// Overwrites the whole collection of `table`.
    ///
    /// Every record must have an `id` and ids must be pairwise distinct.
    fn replace(&self, table: &str, records: Vec<Record>) -> FlatDbResult<()>;

    /// Runs `f` over the whole collection of `table` while holding its lock, then persists the
    /// collection if `f` changed it.
    ///
    /// If `f` returns an error nothing is written. The resulting collection must satisfy the
    /// same constraints as [`TableStore::replace`].
    fn modify<T, F>(&self, table: &str, f: F) -> FlatDbResult<T>
    where
        F: FnOnce(&mut Vec<Record>) -> FlatDbResult<T>;

    /// Returns the record with the given id, if any.
    fn get(&self, table: &str, id: &RecordId) -> FlatDbResult<Option<Record>> {
        Ok(self
            .query(table, &Conditions::all())?
            .into_iter()
            .find(|record| id.is_id_of(record)))
    }

    /// Returns the number of records in `table`.
    fn count(&self, table: &str) -> FlatDbResult<usize> {
        self.query(table, &Conditions::all())
            .map(|records| records.len())
    }
}
