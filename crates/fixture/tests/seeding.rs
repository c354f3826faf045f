//! Delete-all, post cleanup and bulk insert

mod common;

use chrono::NaiveDateTime;
use common::{grid, row_key, row_schema, TestContext, DB, TABLE};
use std::sync::Arc;
use tabula_fixture::{
    Error, FixtureConfig, Instance, Manager, Record, RecordSchema, Result, TableMapper, TableRow,
};
use tabula_store::{RelationalStore, StoreError};
use tabula_store_memory::MemoryStore;
use tabula_value::{DataType, Value};

#[test]
fn test_insert_covers_header_columns_only() {
    let ctx = TestContext::new();
    let inserted = ctx
        .seed(
            TABLE,
            &[
                &["foo", "bar", "created_at", "deleted_at"],
                &["foo-1", "abc", "2021-01-01T00:00:00Z", "NULL"],
                &["NULL", "def", "2021-01-02 00:00:00", "2021-01-03T00:00:00Z"],
            ],
        )
        .unwrap();

    assert_eq!(inserted, 2);
    assert_eq!(ctx.value(TABLE, 0, "id"), Value::I64(1));
    assert_eq!(ctx.value(TABLE, 1, "id"), Value::I64(2));
    assert_eq!(ctx.value(TABLE, 1, "foo"), Value::Null);
    assert_eq!(ctx.value(TABLE, 0, "deleted_at"), Value::Null);
    assert_eq!(
        ctx.value(TABLE, 1, "created_at"),
        tabula_value::decode("2021-01-02T00:00:00Z", &DataType::Timestamp).unwrap()
    );
}

#[test]
fn test_insert_does_not_substitute_variables() {
    let ctx = TestContext::new();
    ctx.seed(TABLE, &[&["bar"], &["$id1"]]).unwrap();
    assert_eq!(ctx.value(TABLE, 0, "bar"), Value::from("$id1"));
}

#[test]
fn test_delete_all_restarts_sequence() {
    let ctx = TestContext::new();
    ctx.seed(TABLE, &[&["bar"], &["a"], &["b"]]).unwrap();
    assert_eq!(ctx.count(TABLE), 2);

    ctx.seed(TABLE, &[&["bar"], &["c"]]).unwrap();
    assert_eq!(ctx.count(TABLE), 1);
    assert_eq!(ctx.value(TABLE, 0, "id"), Value::I64(1));
    assert_eq!(
        ctx.store.executed(),
        vec!["ALTER SEQUENCE my_table_id_seq RESTART"; 2]
    );
}

#[test]
fn test_post_cleanup_runs_in_order_and_stops_on_failure() {
    let store = Arc::new(MemoryStore::new());
    store.create_table_with_serial("t", &["id", "name"], "id");
    let instance = Instance::new(store.clone() as Arc<dyn RelationalStore>)
        .with_table(
            "t",
            RecordSchema::builder()
                .column("id", DataType::I64)
                .column("name", DataType::Str)
                .build()
                .unwrap(),
        )
        .with_post_cleanup(
            "t",
            [
                "ALTER SEQUENCE t_id_seq RESTART WITH 5",
                "TRUNCATE t",
                "ALTER SEQUENCE t_id_seq RESTART",
            ],
        );
    let manager = Manager::new(FixtureConfig::default()).with_instance("default", instance);

    let err = manager.session().delete_all("t").unwrap_err();
    match err {
        Error::PostCleanup {
            statement,
            table,
            database,
            source,
        } => {
            assert_eq!(statement, "TRUNCATE t");
            assert_eq!(table, "t");
            assert_eq!(database, "default");
            assert_eq!(source, StoreError::Unsupported("TRUNCATE t".into()));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(
        store.executed(),
        vec!["ALTER SEQUENCE t_id_seq RESTART WITH 5", "TRUNCATE t"]
    );

    manager
        .session()
        .insert_rows("t", &grid(&[&["name"], &["x"]]))
        .unwrap();
    assert_eq!(store.rows("t").unwrap().get(0, "id"), Some(&Value::I64(5)));
}

#[test]
fn test_insert_failure_reports_statement() {
    let store = Arc::new(MemoryStore::new());
    store.create_table("t", &["id"]);
    let instance = Instance::new(store as Arc<dyn RelationalStore>).with_table(
        "t",
        RecordSchema::builder()
            .column("id", DataType::I64)
            .nullable("extra", DataType::Str)
            .build()
            .unwrap(),
    );
    let manager = Manager::new(FixtureConfig::default()).with_instance("main", instance);

    let err = manager
        .session()
        .insert_rows(("t", "main"), &grid(&[&["id", "extra"], &["1", "x"], &["2", "NULL"]]))
        .unwrap_err();

    let Error::Insert {
        statement, source, ..
    } = &err
    else {
        panic!("unexpected error {err:?}");
    };
    assert_eq!(statement.sql, "INSERT INTO t (id,extra) VALUES ($1,$2),($3,$4)");
    assert_eq!(
        statement.args,
        vec![Value::I64(1), Value::from("x"), Value::I64(2), Value::Null]
    );
    assert!(matches!(source, StoreError::UnknownColumn { column, .. } if column == "extra"));
    assert!(err.to_string().starts_with("failed to insert rows \"INSERT INTO t"));
}

#[test]
fn test_insert_decode_failure() {
    let ctx = TestContext::new();
    let err = ctx
        .session()
        .insert_rows(TABLE, &grid(&[&["id"], &["1"], &["one"]]))
        .unwrap_err();

    assert_eq!(err.row_index(), Some(1));
    assert!(matches!(err.cause(), Error::Decode { column, .. } if column == "id"));
    assert_eq!(ctx.count(TABLE), 0);

    let err = ctx
        .session()
        .insert_rows(TABLE, &grid(&[&["id"]]))
        .unwrap_err();
    assert!(matches!(err, Error::RowRequired));
}

#[test]
fn test_unknown_database() {
    let ctx = TestContext::new();
    let err = ctx.session().delete_all((TABLE, "other")).unwrap_err();
    assert_eq!(err.to_string(), "unknown database other");

    let err = ctx
        .session()
        .insert_rows("missing", &grid(&[&["id"], &["1"]]))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownTable { database, .. } if database == DB));
}

#[derive(Debug, PartialEq)]
struct Row {
    id: i64,
    foo: Option<String>,
    bar: Option<String>,
    created_at: NaiveDateTime,
    deleted_at: Option<NaiveDateTime>,
}

impl TableRow for Row {
    fn schema() -> Result<RecordSchema> {
        Ok(row_schema())
    }

    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: record.get_as("id")?,
            foo: record.get_as("foo")?,
            bar: record.get_as("bar")?,
            created_at: record.get_as("created_at")?,
            deleted_at: record.get_as("deleted_at")?,
        })
    }

    fn to_record(&self, schema: Arc<RecordSchema>) -> Result<Record> {
        let mut record = Record::new(schema);
        record.set("id", self.id.into())?;
        record.set("foo", self.foo.clone().into())?;
        record.set("bar", self.bar.clone().into())?;
        record.set("created_at", self.created_at.into())?;
        record.set("deleted_at", self.deleted_at.into())?;
        Ok(record)
    }
}

fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

#[test]
fn test_slice_from_table() {
    let rows: Vec<Row> = TableMapper::default()
        .slice_from_table(&grid(&[
            &["id", "foo", "bar", "created_at", "deleted_at"],
            &["1", "foo-1", "abc", "2021-01-01T00:00:00Z", "NULL"],
            &["2", "NULL", "def", "2021-01-02T00:00:00Z", "2021-01-03T00:00:00Z"],
        ]))
        .unwrap();

    assert_eq!(
        rows,
        vec![
            Row {
                id: 1,
                foo: Some("foo-1".into()),
                bar: Some("abc".into()),
                created_at: ts("2021-01-01 00:00:00"),
                deleted_at: None,
            },
            Row {
                id: 2,
                foo: None,
                bar: Some("def".into()),
                created_at: ts("2021-01-02 00:00:00"),
                deleted_at: Some(ts("2021-01-03 00:00:00")),
            },
        ]
    );

    assert_eq!(row_key().column_names(), vec!["foo", "bar"]);
}

#[test]
fn test_slice_from_table_missing_required_field() {
    let err = TableMapper::default()
        .slice_from_table::<Row>(&grid(&[&["id"], &["1"]]))
        .unwrap_err();
    assert_eq!(err.row_index(), Some(0));
    assert!(matches!(
        err.cause(),
        Error::FieldType { column, expected: "timestamp", .. } if column == "created_at"
    ));
}

#[test]
fn test_insert_typed_records() {
    let ctx = TestContext::new();
    let schema = Arc::new(row_schema());
    let row = Row {
        id: 10,
        foo: None,
        bar: Some("typed".into()),
        created_at: ts("2021-05-01 12:00:00"),
        deleted_at: None,
    };

    let session = ctx.session();
    session.delete_all(TABLE).unwrap();
    session
        .insert_records(TABLE, &[row.to_record(schema).unwrap()])
        .unwrap();

    let mut session = ctx.session();
    session
        .assert_rows(
            TABLE,
            &grid(&[
                &["id", "foo", "bar", "created_at"],
                &["10", "NULL", "typed", "2021-05-01T12:00:00Z"],
            ]),
            true,
        )
        .unwrap();
}
