//! Common test utilities for fixture integration tests
#![allow(dead_code)]

use std::sync::{Arc, Once};
use tabula_fixture::{FixtureConfig, Grid, Instance, Manager, RecordSchema, Result, Session};
use tabula_store::RelationalStore;
use tabula_store_memory::MemoryStore;
use tabula_value::{DataType, Value};

pub const DB: &str = "my_db";
pub const TABLE: &str = "my_table";
pub const OTHER_TABLE: &str = "my_another_table";
pub const DOCS: &str = "documents";

static TRACING: Once = Once::new();

/// Route `tracing` output to the test harness, once per process
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Field group shared by row types
pub fn row_key() -> RecordSchema {
    RecordSchema::builder()
        .nullable("foo", DataType::Str)
        .nullable("bar", DataType::Str)
        .build()
        .unwrap()
}

pub fn row_schema() -> RecordSchema {
    RecordSchema::builder()
        .column("id", DataType::I64)
        .embed(&row_key())
        .column("created_at", DataType::Timestamp)
        .nullable("deleted_at", DataType::Timestamp)
        .build()
        .unwrap()
}

pub fn doc_schema() -> RecordSchema {
    RecordSchema::builder()
        .column("id", DataType::I64)
        .column("title", DataType::Str)
        .nullable("meta", DataType::Json)
        .nullable("tags", DataType::List(Box::new(DataType::Str)))
        .build()
        .unwrap()
}

pub fn grid(rows: &[&[&str]]) -> Grid {
    Grid::from(
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect::<Vec<_>>())
            .collect::<Vec<_>>(),
    )
}

/// Test context with a manager over an in-memory store
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub manager: Manager,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(FixtureConfig::default().with_default_database(DB))
    }

    pub fn with_config(config: FixtureConfig) -> Self {
        init_tracing();

        let store = Arc::new(MemoryStore::new());
        let columns = ["id", "foo", "bar", "created_at", "deleted_at"];
        store.create_table_with_serial(TABLE, &columns, "id");
        store.create_table(OTHER_TABLE, &columns);
        store.create_table_with_serial(DOCS, &["id", "title", "meta", "tags"], "id");

        let instance = Instance::new(store.clone() as Arc<dyn RelationalStore>)
            .with_table(TABLE, row_schema())
            .with_table(OTHER_TABLE, row_schema())
            .with_table(DOCS, doc_schema())
            .with_post_cleanup(TABLE, ["ALTER SEQUENCE my_table_id_seq RESTART"]);

        let manager = Manager::new(config).with_instance(DB, instance);

        Self { store, manager }
    }

    pub fn session(&self) -> Session<'_> {
        self.manager.session()
    }

    /// Replace the contents of `table` with `rows`
    pub fn seed(&self, table: &str, rows: &[&[&str]]) -> Result<u64> {
        let session = self.session();
        session.delete_all(table)?;
        session.insert_rows(table, &grid(rows))
    }

    pub fn count(&self, table: &str) -> u64 {
        self.store.count(table).unwrap()
    }

    pub fn value(&self, table: &str, index: usize, column: &str) -> Value {
        self.store
            .rows(table)
            .and_then(|rows| rows.get(index, column).cloned())
            .unwrap()
    }
}
