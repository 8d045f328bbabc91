pub mod contact;
pub mod favorite;
pub mod product;
pub mod profile;
pub mod schema;
pub mod settings;

use sqlite::Connection;
use std::path::{Path, PathBuf};

/// Embedded stand-in for the marketplace's relational data service.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(db_path: &Path) -> Result<Self, sqlite::Error> {
        if let Some(parent) = db_path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::warn!("could not create {}: {}", parent.display(), e);
            }
        }
        let conn = Connection::open(db_path)?;
        Self::configure(&conn)?;
        schema::run_migrations(&conn)?;
        log::info!("opened store at {}", db_path.display());
        Ok(Store { conn })
    }

    pub fn open_in_memory() -> Result<Self, sqlite::Error> {
        let conn = Connection::open(":memory:")?;
        Self::configure(&conn)?;
        schema::run_migrations(&conn)?;
        Ok(Store { conn })
    }

    fn configure(conn: &Connection) -> Result<(), sqlite::Error> {
        conn.execute(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )?;
        Ok(())
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

pub fn default_db_path() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("wedding-vendor-market");
    path.push("market.db");
    path
}
