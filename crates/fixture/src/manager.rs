//! Database registry and scenario sessions

use crate::config::FixtureConfig;
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::mapper::TableMapper;
use crate::query::TableQuery;
use crate::record::{Record, RecordSchema};
use crate::vars::VariableStore;
use std::collections::HashMap;
use std::sync::Arc;
use tabula_store::{Placeholder, RelationalStore, Statement};
use tabula_value::Row;
use tracing::debug;

/// One registered database: its store, table schemas and cleanup statements
#[derive(Clone)]
pub struct Instance {
    store: Arc<dyn RelationalStore>,
    tables: HashMap<String, Arc<RecordSchema>>,
    post_cleanup: HashMap<String, Vec<String>>,
}

impl Instance {
    pub fn new(store: Arc<dyn RelationalStore>) -> Self {
        Self {
            store,
            tables: HashMap::new(),
            post_cleanup: HashMap::new(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>, schema: RecordSchema) -> Self {
        self.tables.insert(table.into(), Arc::new(schema));
        self
    }

    /// Statements run in order after every delete-all on `table`
    pub fn with_post_cleanup<I, S>(mut self, table: impl Into<String>, statements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.post_cleanup
            .entry(table.into())
            .or_default()
            .extend(statements.into_iter().map(Into::into));
        self
    }

    pub fn store(&self) -> &Arc<dyn RelationalStore> {
        &self.store
    }

    pub fn schema(&self, table: &str) -> Option<&Arc<RecordSchema>> {
        self.tables.get(table)
    }

    pub fn post_cleanup(&self, table: &str) -> &[String] {
        self.post_cleanup
            .get(table)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Table addressed by an operation, in the default database unless named
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRef<'a> {
    pub table: &'a str,
    pub database: Option<&'a str>,
}

impl<'a> TableRef<'a> {
    pub fn new(table: &'a str) -> Self {
        Self {
            table,
            database: None,
        }
    }

    pub fn in_database(table: &'a str, database: &'a str) -> Self {
        Self {
            table,
            database: Some(database),
        }
    }
}

impl<'a> From<&'a str> for TableRef<'a> {
    fn from(table: &'a str) -> Self {
        Self::new(table)
    }
}

/// `(table, database)`
impl<'a> From<(&'a str, &'a str)> for TableRef<'a> {
    fn from((table, database): (&'a str, &'a str)) -> Self {
        Self::in_database(table, database)
    }
}

struct Resolved<'m, 't> {
    table: &'t str,
    database: &'t str,
    instance: &'m Instance,
    schema: &'m Arc<RecordSchema>,
}

/// Shared registry of databases, safe to use from concurrent sessions
pub struct Manager {
    config: FixtureConfig,
    mapper: TableMapper,
    instances: HashMap<String, Instance>,
}

impl Manager {
    pub fn new(config: FixtureConfig) -> Self {
        Self {
            config,
            mapper: TableMapper::default(),
            instances: HashMap::new(),
        }
    }

    pub fn with_mapper(mut self, mapper: TableMapper) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn with_instance(mut self, database: impl Into<String>, instance: Instance) -> Self {
        self.instances.insert(database.into(), instance);
        self
    }

    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    pub fn mapper(&self) -> &TableMapper {
        &self.mapper
    }

    pub fn instance(&self, database: &str) -> Result<&Instance> {
        self.instances
            .get(database)
            .ok_or_else(|| Error::UnknownDatabase {
                database: database.to_string(),
            })
    }

    /// Start a scenario with no variable bindings
    pub fn session(&self) -> Session<'_> {
        Session {
            manager: self,
            vars: VariableStore::new(self.config.effective_var_prefix()),
        }
    }

    fn resolve<'m, 't>(&'m self, table_ref: TableRef<'t>) -> Result<Resolved<'m, 't>>
    where
        'm: 't,
    {
        let database = table_ref
            .database
            .unwrap_or(self.config.default_database.as_str());
        let instance = self.instance(database)?;
        let schema = instance
            .schema(table_ref.table)
            .ok_or_else(|| Error::UnknownTable {
                table: table_ref.table.to_string(),
                database: database.to_string(),
            })?;

        Ok(Resolved {
            table: table_ref.table,
            database,
            instance,
            schema,
        })
    }
}

/// One scenario's view of the manager.
///
/// Variables captured by assertions live here and are dropped with the
/// session; operations of one session run strictly one after another.
pub struct Session<'m> {
    manager: &'m Manager,
    vars: VariableStore,
}

impl<'m> Session<'m> {
    pub fn vars(&self) -> &VariableStore {
        &self.vars
    }

    /// Forget all bindings, as at the start of a new scenario
    pub fn reset(&mut self) {
        self.vars.reset();
    }

    /// Delete every row of a table, then run its post-cleanup statements.
    ///
    /// The first failing statement stops the cleanup.
    pub fn delete_all<'t>(&self, table: impl Into<TableRef<'t>>) -> Result<()> {
        let target = self.manager.resolve(table.into())?;
        let store = target.instance.store();

        let deleted = store.delete_all(target.table).map_err(|source| Error::Delete {
            table: target.table.to_string(),
            database: target.database.to_string(),
            source,
        })?;
        debug!(table = target.table, database = target.database, deleted, "deleted all rows");

        for statement in target.instance.post_cleanup(target.table) {
            store.execute(statement).map_err(|source| Error::PostCleanup {
                statement: statement.clone(),
                table: target.table.to_string(),
                database: target.database.to_string(),
                source,
            })?;
            debug!(table = target.table, %statement, "executed post cleanup");
        }

        Ok(())
    }

    /// Insert every data row of a grid in one statement covering the header
    /// columns
    pub fn insert_rows<'t>(&self, table: impl Into<TableRef<'t>>, grid: &Grid) -> Result<u64> {
        let target = self.manager.resolve(table.into())?;
        let records = self
            .manager
            .mapper
            .records_from_table(grid, target.schema)?;

        let columns = grid.header();
        let rows: Vec<Row> = records.iter().map(|r| r.project(columns)).collect();

        let inserted = target
            .instance
            .store()
            .insert(target.table, columns, &rows)
            .map_err(|source| Error::Insert {
                table: target.table.to_string(),
                database: target.database.to_string(),
                statement: Statement::insert(target.table, columns, &rows, Placeholder::Dollar),
                source,
            })?;

        debug!(table = target.table, database = target.database, inserted, "inserted rows");
        Ok(inserted)
    }

    /// Insert typed records, one statement covering every schema column
    pub fn insert_records<'t>(&self, table: impl Into<TableRef<'t>>, records: &[Record]) -> Result<u64> {
        let target = self.manager.resolve(table.into())?;
        let columns = target.schema.column_names();
        let rows: Vec<Row> = records.iter().map(|r| r.project(&columns)).collect();

        target
            .instance
            .store()
            .insert(target.table, &columns, &rows)
            .map_err(|source| Error::Insert {
                table: target.table.to_string(),
                database: target.database.to_string(),
                statement: Statement::insert(target.table, &columns, &rows, Placeholder::Dollar),
                source,
            })
    }

    /// Assert that every grid row matches exactly one stored row.
    ///
    /// With `exhaustive` the table must also hold exactly as many rows as the
    /// grid. Variable tokens are captured from matched rows and substituted
    /// into later rows and later assertions of this session.
    pub fn assert_rows<'t>(
        &mut self,
        table: impl Into<TableRef<'t>>,
        grid: &Grid,
        exhaustive: bool,
    ) -> Result<()> {
        grid.validate()?;
        self.assert(table.into(), Some(grid), exhaustive)
    }

    /// Assert that a table holds no rows
    pub fn assert_empty<'t>(&mut self, table: impl Into<TableRef<'t>>) -> Result<()> {
        self.assert(table.into(), None, true)
    }

    fn assert(&mut self, table_ref: TableRef<'_>, grid: Option<&Grid>, exhaustive: bool) -> Result<()> {
        let manager = self.manager;
        let target = manager.resolve(table_ref)?;
        debug!(
            table = target.table,
            database = target.database,
            rows = grid.map_or(0, Grid::row_count),
            exhaustive,
            "asserting rows"
        );

        let mut query = TableQuery::new(
            &manager.mapper,
            target.instance.store().as_ref(),
            target.table,
            target.schema,
            &mut self.vars,
        );

        let result = (|| -> Result<()> {
            if exhaustive {
                query.check_count(grid.map_or(0, Grid::row_count))?;
            }
            match grid {
                Some(grid) => manager.mapper.iterate_table(grid, target.schema, &mut query),
                None => Ok(()),
            }
        })();

        result.map_err(|err| {
            query.expose_contents(
                err,
                grid.map(Grid::header),
                manager.config.diagnostic_row_limit,
            )
        })
    }
}
