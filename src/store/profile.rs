use serde::{Deserialize, Serialize};

use super::Store;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Vendor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Vendor => "vendor",
            Role::Admin => "admin",
        }
    }

    fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "user" => Ok(Role::User),
            "vendor" => Ok(Role::Vendor),
            "admin" => Ok(Role::Admin),
            other => Err(AppError::Other(format!("unknown profile role '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: String,
    pub display_name: String,
    pub role: Role,
    /// Vendor's WhatsApp number, digits only.
    pub whatsapp: Option<String>,
    pub created_at: i64,
}

impl Store {
    pub fn upsert_profile(&self, profile: &ProfileRow) -> Result<(), sqlite::Error> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO profiles (id, display_name, role, whatsapp, created_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                display_name = excluded.display_name,
                role = excluded.role,
                whatsapp = excluded.whatsapp",
        )?;
        stmt.bind((1, profile.id.as_str()))?;
        stmt.bind((2, profile.display_name.as_str()))?;
        stmt.bind((3, profile.role.as_str()))?;
        match &profile.whatsapp {
            Some(w) => stmt.bind((4, w.as_str()))?,
            None => stmt.bind((4, sqlite::Value::Null))?,
        };
        stmt.bind((5, profile.created_at))?;
        stmt.next()?;
        Ok(())
    }

    pub fn get_profile(&self, id: &str) -> Result<Option<ProfileRow>, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, display_name, role, whatsapp, created_at
             FROM profiles WHERE id = ?",
        )?;
        stmt.bind((1, id))?;
        if let sqlite::State::Done = stmt.next()? {
            return Ok(None);
        }
        let role = stmt.read::<String, _>("role")?;
        Ok(Some(ProfileRow {
            id: stmt.read::<String, _>("id")?,
            display_name: stmt.read::<String, _>("display_name")?,
            role: Role::parse(&role)?,
            whatsapp: stmt.read::<Option<String>, _>("whatsapp")?,
            created_at: stmt.read::<i64, _>("created_at")?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vendor(id: &str) -> ProfileRow {
        ProfileRow {
            id: id.to_string(),
            display_name: "Sekar Ayu Catering".to_string(),
            role: Role::Vendor,
            whatsapp: Some("6281234567890".to_string()),
            created_at: 1_700_000_000,
        }
    }

    #[test]
    fn test_upsert_and_get() {
        let store = Store::open_in_memory().unwrap();
        store.upsert_profile(&vendor("v-1")).unwrap();

        let fetched = store.get_profile("v-1").unwrap().unwrap();
        assert_eq!(fetched, vendor("v-1"));
    }

    #[test]
    fn test_upsert_changes_role() {
        let store = Store::open_in_memory().unwrap();
        let mut profile = vendor("v-1");
        store.upsert_profile(&profile).unwrap();

        profile.role = Role::Admin;
        profile.whatsapp = None;
        store.upsert_profile(&profile).unwrap();

        let fetched = store.get_profile("v-1").unwrap().unwrap();
        assert_eq!(fetched.role, Role::Admin);
        assert!(fetched.whatsapp.is_none());
    }

    #[test]
    fn test_get_missing() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.get_profile("nobody").unwrap().is_none());
    }

    #[test]
    fn test_unknown_role_is_an_error() {
        let store = Store::open_in_memory().unwrap();
        store
            .conn()
            .execute(
                "PRAGMA ignore_check_constraints = ON;
                 INSERT INTO profiles (id, display_name, role, created_at)
                 VALUES ('x-1', 'Legacy', 'moderator', 0);",
            )
            .unwrap();

        let err = store.get_profile("x-1").unwrap_err();
        assert!(err.to_string().contains("moderator"), "{}", err);
    }
}
