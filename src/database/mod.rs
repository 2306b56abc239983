//! SQLite layer backing the durable history medium.
//!
//! # Usage
//!
//! ```no_run
//! use hairnova::database::Database;
//!
//! let db = Database::open("history.db").expect("failed to open database");
//! let conn = db.connection();
//! # let _ = conn;
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
