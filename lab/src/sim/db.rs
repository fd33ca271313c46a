//! In-memory table store.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

use crate::sim::error::StoreError;

/// A record: a flat mapping of field names to values.
pub type Record = Map<String, Value>;

/// Records of one table keyed by id, in insertion order.
///
/// Every value is a `Value::Object`. Order is load-bearing: first-match
/// resolution picks the earliest-inserted surviving record.
pub type Table = Map<String, Value>;

/// Table name to records, in creation order.
pub type Tables = IndexMap<String, Table>;

#[derive(Debug, Clone, Default)]
pub struct Database {
    tables: Tables,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a record, creating the table on first use.
    ///
    /// Replacing an existing id keeps its original position in the table.
    pub fn insert(&mut self, table: &str, record_id: &str, data: Record) {
        self.tables
            .entry(table.to_string())
            .or_default()
            .insert(record_id.to_string(), Value::Object(data));
        debug!(table, record_id, "db insert");
    }

    /// Field-level merge of `data` into an existing record.
    pub fn update(
        &mut self,
        table: &str,
        record_id: &str,
        data: &Record,
    ) -> Result<(), StoreError> {
        let record = self
            .tables
            .get_mut(table)
            .and_then(|records| records.get_mut(record_id))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| record_not_found(table, record_id))?;
        for (field, value) in data {
            record.insert(field.clone(), value.clone());
        }
        debug!(table, record_id, fields = data.len(), "db update");
        Ok(())
    }

    pub fn read(&self, table: &str, record_id: &str) -> Result<Record, StoreError> {
        self.record(table, record_id).cloned()
    }

    /// Remove a record, keeping the relative order of the survivors.
    pub fn delete(&mut self, table: &str, record_id: &str) -> Result<Record, StoreError> {
        let removed = self.read(table, record_id)?;
        if let Some(records) = self.tables.get_mut(table) {
            records.retain(|id, _| id != record_id);
        }
        debug!(table, record_id, "db delete");
        Ok(removed)
    }

    /// Earliest-inserted surviving record of `table`.
    pub fn find_first(&self, table: &str) -> Result<(String, Record), StoreError> {
        let (record_id, record) = self
            .tables
            .get(table)
            .and_then(|records| records.iter().next())
            .ok_or_else(|| StoreError::EmptyTable {
                table: table.to_string(),
            })?;
        let record = record
            .as_object()
            .ok_or_else(|| record_not_found(table, record_id))?;
        Ok((record_id.clone(), record.clone()))
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Independent deep copy of every table.
    pub fn snapshot(&self) -> Tables {
        self.tables.clone()
    }

    fn record(&self, table: &str, record_id: &str) -> Result<&Record, StoreError> {
        self.tables
            .get(table)
            .and_then(|records| records.get(record_id))
            .and_then(Value::as_object)
            .ok_or_else(|| record_not_found(table, record_id))
    }
}

fn record_not_found(table: &str, record_id: &str) -> StoreError {
    StoreError::RecordNotFound {
        table: table.to_string(),
        record_id: record_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().expect("object literal")
    }

    fn seeded() -> Database {
        let mut db = Database::new();
        db.insert(
            "user_record",
            "staging_001",
            record(json!({"status": "active", "env": "staging"})),
        );
        db.insert(
            "user_record",
            "prod_001",
            record(json!({"status": "active", "env": "production"})),
        );
        db
    }

    #[test]
    fn find_first_returns_earliest_inserted() {
        let db = seeded();
        let (id, data) = db.find_first("user_record").expect("first");
        assert_eq!(id, "staging_001");
        assert_eq!(data["env"], json!("staging"));
    }

    #[test]
    fn find_first_ignores_id_ordering() {
        let mut db = Database::new();
        db.insert("t", "zeta", Record::new());
        db.insert("t", "alpha", Record::new());
        assert_eq!(db.find_first("t").expect("first").0, "zeta");
    }

    #[test]
    fn reinsert_keeps_position() {
        let mut db = seeded();
        db.insert("user_record", "staging_001", record(json!({"status": "new"})));
        let (id, data) = db.find_first("user_record").expect("first");
        assert_eq!(id, "staging_001");
        assert_eq!(data, record(json!({"status": "new"})));
    }

    #[test]
    fn delete_promotes_next_surviving_record() {
        let mut db = seeded();
        db.insert("user_record", "later_001", Record::new());
        db.delete("user_record", "staging_001").expect("delete");

        let ids: Vec<String> = db.snapshot()["user_record"].keys().cloned().collect();
        assert_eq!(ids, vec!["prod_001".to_string(), "later_001".to_string()]);
        assert_eq!(db.find_first("user_record").expect("first").0, "prod_001");
    }

    #[test]
    fn find_first_on_missing_or_empty_table_fails() {
        let mut db = Database::new();
        assert!(matches!(
            db.find_first("nope"),
            Err(StoreError::EmptyTable { .. })
        ));

        db.insert("t", "only", Record::new());
        db.delete("t", "only").expect("delete");
        assert!(matches!(db.find_first("t"), Err(StoreError::EmptyTable { .. })));
    }

    #[test]
    fn tables_list_in_creation_order() {
        let mut db = Database::new();
        db.insert("users", "u1", Record::new());
        db.insert("audit", "a1", Record::new());
        assert_eq!(db.table_names(), vec!["users", "audit"]);
    }

    #[test]
    fn update_merges_fields() {
        let mut db = seeded();
        db.update(
            "user_record",
            "prod_001",
            &record(json!({"status": "inactive", "reason": "rotation"})),
        )
        .expect("update");

        let prod = db.read("user_record", "prod_001").expect("read");
        assert_eq!(
            prod,
            record(json!({"status": "inactive", "env": "production", "reason": "rotation"}))
        );
        let staging = db.read("user_record", "staging_001").expect("read");
        assert_eq!(staging["status"], json!("active"));
    }

    #[test]
    fn update_missing_record_or_table_fails() {
        let mut db = seeded();
        let err = db
            .update("user_record", "ghost", &Record::new())
            .expect_err("missing record");
        assert_eq!(err.to_string(), "record ghost not found in user_record");
        assert!(db.update("nope", "staging_001", &Record::new()).is_err());
    }

    #[test]
    fn read_returns_a_copy() {
        let db = seeded();
        let mut copy = db.read("user_record", "staging_001").expect("read");
        copy.insert("status".to_string(), json!("tampered"));
        assert_eq!(
            db.read("user_record", "staging_001").expect("read")["status"],
            json!("active")
        );
    }

    #[test]
    fn snapshot_is_isolated_from_live_tables() {
        let mut db = seeded();
        let mut snap = db.snapshot();
        snap.shift_remove("user_record");
        assert_eq!(db.table_names(), vec!["user_record"]);

        let held = db.snapshot();
        db.update("user_record", "staging_001", &record(json!({"status": "x"})))
            .expect("update");
        assert_eq!(
            held["user_record"]["staging_001"]["status"],
            json!("active")
        );
    }
}
