use super::Store;

impl Store {
    /// Idempotent: favoriting twice keeps the original timestamp.
    pub fn add_favorite(
        &self,
        user_id: &str,
        product_id: &str,
        at: i64,
    ) -> Result<(), sqlite::Error> {
        let mut stmt = self.conn.prepare(
            "INSERT OR IGNORE INTO favorites (user_id, product_id, created_at) VALUES (?, ?, ?)",
        )?;
        stmt.bind((1, user_id))?;
        stmt.bind((2, product_id))?;
        stmt.bind((3, at))?;
        stmt.next()?;
        Ok(())
    }

    pub fn remove_favorite(&self, user_id: &str, product_id: &str) -> Result<(), sqlite::Error> {
        let mut stmt = self
            .conn
            .prepare("DELETE FROM favorites WHERE user_id = ? AND product_id = ?")?;
        stmt.bind((1, user_id))?;
        stmt.bind((2, product_id))?;
        stmt.next()?;
        Ok(())
    }

    /// Most recently favorited first.
    pub fn favorite_product_ids(&self, user_id: &str) -> Result<Vec<String>, sqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT product_id FROM favorites WHERE user_id = ?
             ORDER BY created_at DESC, product_id ASC",
        )?;
        stmt.bind((1, user_id))?;
        let mut ids = Vec::new();
        while let sqlite::State::Row = stmt.next()? {
            ids.push(stmt.read::<String, _>(0)?);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::product::fixtures::seed_approved;
    use crate::store::profile::{ProfileRow, Role};

    fn setup() -> Store {
        let store = Store::open_in_memory().unwrap();
        seed_approved(&store, "venue", 3);
        store
            .upsert_profile(&ProfileRow {
                id: "u-1".to_string(),
                display_name: "Rina".to_string(),
                role: Role::User,
                whatsapp: None,
                created_at: 0,
            })
            .unwrap();
        store
    }

    #[test]
    fn test_add_list_remove() {
        let store = setup();
        store.add_favorite("u-1", "p-000", 10).unwrap();
        store.add_favorite("u-1", "p-002", 20).unwrap();
        store.add_favorite("u-1", "p-000", 30).unwrap();

        assert_eq!(
            store.favorite_product_ids("u-1").unwrap(),
            vec!["p-002".to_string(), "p-000".to_string()]
        );

        store.remove_favorite("u-1", "p-002").unwrap();
        assert_eq!(
            store.favorite_product_ids("u-1").unwrap(),
            vec!["p-000".to_string()]
        );
    }

    #[test]
    fn test_favorite_requires_existing_product() {
        let store = setup();
        assert!(store.add_favorite("u-1", "p-missing", 10).is_err());
    }
}
