//! # relq
//!
//! Compiles SELECT statements over related tables and splits each flat
//! result row into the root row plus one nested row per included relation.
//!
//! ## Quick Start
//!
//! ```rust
//! # #[cfg(feature = "rusqlite")]
//! # fn main() -> relq::Result<()> {
//! use relq::prelude::*;
//! use relq::rusqlite::Database;
//!
//! let db = Database::open_in_memory()?;
//! db.execute_batch(
//!     "CREATE TABLE owner (id INTEGER PRIMARY KEY, name TEXT);
//!      CREATE TABLE owned (id INTEGER PRIMARY KEY, ownerId INTEGER, name TEXT);
//!      INSERT INTO owner VALUES (1, 'Arthur');
//!      INSERT INTO owned VALUES (1, 1, 'Towel');",
//! )?;
//!
//! let owned = Relation::foreign_key("owned", "owned", [("id", "ownerId")]);
//! let rows = db.fetch_all(&SelectQuery::table("owner").include([owned]))?;
//!
//! let towel = rows[0].variant("owned").unwrap();
//! assert_eq!(towel.get_as::<String>("name")?, "Towel");
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "rusqlite"))]
//! # fn main() {}
//! ```
//!
//! ## Features
//!
//! | Feature    | Enables                                               |
//! |------------|-------------------------------------------------------|
//! | `rusqlite` | `relq::rusqlite::Database`, `Schema` for `Connection` |
//! | `serde`    | Serialize/Deserialize for values and compiled queries |
//! | `tracing`  | `relq.compile`, `relq.alias` and `relq.query` events  |

pub use relq_core::*;

/// Driver for `rusqlite` connections
#[cfg(feature = "rusqlite")]
pub mod rusqlite;

/// Everything needed to build, compile and run queries
pub mod prelude {
    pub use relq_core::prelude::*;

    #[cfg(feature = "rusqlite")]
    pub use crate::rusqlite::Database;
}
