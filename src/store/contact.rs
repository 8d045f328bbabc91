use super::Store;

impl Store {
    /// Record that someone opened a WhatsApp conversation about a product.
    /// The vendor is taken from the product. Returns false if the product
    /// does not exist.
    pub fn log_contact(
        &self,
        product_id: &str,
        user_id: Option<&str>,
        at: i64,
    ) -> Result<bool, sqlite::Error> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO contact_logs (product_id, vendor_id, user_id, contacted_at)
             SELECT id, vendor_id, ?, ? FROM products WHERE id = ?",
        )?;
        match user_id {
            Some(u) => stmt.bind((1, u))?,
            None => stmt.bind((1, sqlite::Value::Null))?,
        };
        stmt.bind((2, at))?;
        stmt.bind((3, product_id))?;
        stmt.next()?;
        Ok(self.conn.change_count() > 0)
    }

    pub fn vendor_contact_count(&self, vendor_id: &str) -> Result<i64, sqlite::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT COUNT(*) FROM contact_logs WHERE vendor_id = ?")?;
        stmt.bind((1, vendor_id))?;
        stmt.next()?;
        stmt.read::<i64, _>(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::product::fixtures::seed_approved;

    #[test]
    fn test_contacts_counted_per_vendor() {
        let store = Store::open_in_memory().unwrap();
        seed_approved(&store, "makeup", 2);

        assert!(store.log_contact("p-000", None, 100).unwrap());
        assert!(store.log_contact("p-001", Some("u-9"), 200).unwrap());
        assert!(!store.log_contact("p-missing", None, 300).unwrap());

        assert_eq!(store.vendor_contact_count("v-1").unwrap(), 2);
        assert_eq!(store.vendor_contact_count("v-2").unwrap(), 0);
    }
}
