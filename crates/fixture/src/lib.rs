//! Tabular fixtures for relational stores
//!
//! Seeds tables from string grids and asserts that stored rows match them.
//! Grid cells are decoded into typed [`Record`]s through a per-table
//! [`RecordSchema`], matched against the store with equality predicates,
//! and variable tokens such as `$id1` capture generated values from one
//! assertion for use in the next.
//!
//! ```ignore
//! let manager = Manager::new(FixtureConfig::default())
//!     .with_instance("default", Instance::new(store).with_table("users", schema));
//!
//! let mut session = manager.session();
//! session.delete_all("users")?;
//! session.insert_rows("users", &"| name |\n| alice |".parse()?)?;
//! session.assert_rows("users", &"| id   | name  |\n| $id1 | alice |".parse()?, true)?;
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod grid;
pub mod manager;
pub mod mapper;
pub mod predicate;
mod query;
pub mod record;
pub mod render;
pub mod vars;

pub use codec::{CellCodec, CodecRegistry, FnCodec};
pub use config::{FixtureConfig, DEFAULT_DATABASE, DEFAULT_VAR_PREFIX};
pub use error::{Error, Result};
pub use grid::{Grid, STRING_SUFFIX};
pub use manager::{Instance, Manager, Session, TableRef};
pub use mapper::{DecodedRow, RowReceiver, TableMapper};
pub use predicate::build_predicate;
pub use record::{Column, FieldValue, Record, RecordSchema, SchemaBuilder, TableRow};
pub use render::render_table;
pub use vars::VariableStore;
