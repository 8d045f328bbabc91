use super::Store;

/// Key/value overrides read by `FeedConfig::load`.
impl Store {
    pub fn get_setting(&self, key: &str) -> Result<Option<String>, sqlite::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM app_settings WHERE key = ?")?;
        stmt.bind((1, key))?;
        match stmt.next()? {
            sqlite::State::Row => Ok(Some(stmt.read::<String, _>(0)?)),
            sqlite::State::Done => Ok(None),
        }
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), sqlite::Error> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO app_settings (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )?;
        stmt.bind((1, key))?;
        stmt.bind((2, value))?;
        stmt.next()?;
        Ok(())
    }

    pub fn delete_setting(&self, key: &str) -> Result<(), sqlite::Error> {
        let mut stmt = self.conn.prepare("DELETE FROM app_settings WHERE key = ?")?;
        stmt.bind((1, key))?;
        stmt.next()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_setting() {
        let store = Store::open_in_memory().unwrap();
        store.set_setting("feed.page_size", "12").unwrap();
        store.set_setting("feed.page_size", "24").unwrap();
        assert_eq!(
            store.get_setting("feed.page_size").unwrap(),
            Some("24".to_string())
        );
    }

    #[test]
    fn test_missing_and_deleted() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.get_setting("search.min_query_chars").unwrap().is_none());
        store.set_setting("search.min_query_chars", "3").unwrap();
        store.delete_setting("search.min_query_chars").unwrap();
        assert!(store.get_setting("search.min_query_chars").unwrap().is_none());
    }
}
