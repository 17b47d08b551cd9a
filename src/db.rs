//! SQLite-backed document store.
//!
//! Each collection is a table of schemaless JSON bodies keyed by a generated
//! UUID. No method spans a transaction.

use std::str::FromStr;

use serde_json::{Map, Value};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    types::Json,
};
use uuid::Uuid;

use crate::models::{
    document::Document,
    outcome::{DeleteOutcome, InsertOutcome, UpdateOutcome},
    user::{User, ADMIN_ROLE},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Menu,
    Reviews,
    Users,
    Carts,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Menu,
        Collection::Reviews,
        Collection::Users,
        Collection::Carts,
    ];

    pub fn table(self) -> &'static str {
        match self {
            Collection::Menu => "menu",
            Collection::Reviews => "reviews",
            Collection::Users => "users",
            Collection::Carts => "carts",
        }
    }
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    data: Json<Map<String, Value>>,
}

impl DocumentRow {
    fn into_document(self) -> Document {
        Document {
            id: self.id,
            body: self.data.0,
        }
    }
}

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self::from_pool(pool))
    }

    /// Single-connection in-memory store; the connection is never recycled so
    /// the database lives as long as the pool.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        for collection in Collection::ALL {
            let sql = format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    id TEXT PRIMARY KEY NOT NULL,
                    data TEXT NOT NULL,
                    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
                )",
                collection.table()
            );
            sqlx::query(&sql).execute(&self.pool).await?;
        }

        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS users_email ON users (json_extract(data, '$.email'))",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, sqlx::Error> {
        let sql = format!(
            "SELECT id, data FROM {} ORDER BY created_at, rowid",
            collection.table()
        );
        let rows = sqlx::query_as::<_, DocumentRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(DocumentRow::into_document).collect())
    }

    pub async fn find_by_email(
        &self,
        collection: Collection,
        email: &str,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let sql = format!(
            "SELECT id, data FROM {} WHERE json_extract(data, '$.email') = ? ORDER BY created_at, rowid",
            collection.table()
        );
        let rows = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(email)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(DocumentRow::into_document).collect())
    }

    pub async fn find_one_by_email(
        &self,
        collection: Collection,
        email: &str,
    ) -> Result<Option<Document>, sqlx::Error> {
        let sql = format!(
            "SELECT id, data FROM {} WHERE json_extract(data, '$.email') = ? LIMIT 1",
            collection.table()
        );
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(DocumentRow::into_document))
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let doc = self.find_one_by_email(Collection::Users, email).await?;
        Ok(doc.as_ref().map(User::from))
    }

    /// Stores `body` under a fresh id. Any `_id` in the body is discarded.
    pub async fn insert_one(
        &self,
        collection: Collection,
        mut body: Map<String, Value>,
    ) -> Result<InsertOutcome, sqlx::Error> {
        body.remove("_id");
        let id = Uuid::new_v4().to_string();

        let sql = format!("INSERT INTO {} (id, data) VALUES (?, ?)", collection.table());
        sqlx::query(&sql)
            .bind(&id)
            .bind(Json(&body))
            .execute(&self.pool)
            .await?;

        Ok(InsertOutcome::new(id))
    }

    pub async fn delete_one(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<DeleteOutcome, sqlx::Error> {
        let sql = format!("DELETE FROM {} WHERE id = ?", collection.table());
        let result = sqlx::query(&sql)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(DeleteOutcome::new(result.rows_affected()))
    }

    /// Sets the user's role to admin. Re-promoting matches without modifying.
    pub async fn promote_to_admin(&self, id: Uuid) -> Result<UpdateOutcome, sqlx::Error> {
        let id = id.to_string();

        let matched = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE id = ?")
            .bind(&id)
            .fetch_one(&self.pool)
            .await?;

        let modified = sqlx::query(
            "UPDATE users SET data = json_set(data, '$.role', ?)
             WHERE id = ? AND json_extract(data, '$.role') IS NOT ?",
        )
        .bind(ADMIN_ROLE)
        .bind(&id)
        .bind(ADMIN_ROLE)
        .execute(&self.pool)
        .await?;

        Ok(UpdateOutcome::new(matched as u64, modified.rows_affected()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn store() -> Store {
        let store = Store::in_memory().await.unwrap();
        store.migrate().await.unwrap();
        store
    }

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn migrate_is_repeatable() {
        let store = store().await;
        store.migrate().await.unwrap();
    }

    #[tokio::test]
    async fn insert_assigns_fresh_id_and_drops_client_id() {
        let store = store().await;

        let outcome = store
            .insert_one(
                Collection::Menu,
                body(json!({"_id": "mine", "name": "Soup", "price": 4.5})),
            )
            .await
            .unwrap();

        assert!(outcome.acknowledged);
        assert!(Uuid::parse_str(&outcome.inserted_id).is_ok());

        let docs = store.find_all(Collection::Menu).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, outcome.inserted_id);
        assert_eq!(docs[0].body.get("name"), Some(&json!("Soup")));
        assert!(!docs[0].body.contains_key("_id"));
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = store().await;
        store
            .insert_one(Collection::Carts, body(json!({"email": "a@x.com"})))
            .await
            .unwrap();

        assert!(store.find_all(Collection::Menu).await.unwrap().is_empty());
        assert!(store.find_all(Collection::Reviews).await.unwrap().is_empty());
        assert_eq!(store.find_all(Collection::Carts).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn find_by_email_filters_on_body_field() {
        let store = store().await;
        for email in ["a@x.com", "b@x.com", "a@x.com"] {
            store
                .insert_one(Collection::Carts, body(json!({"email": email, "item": 1})))
                .await
                .unwrap();
        }

        let carts = store.find_by_email(Collection::Carts, "a@x.com").await.unwrap();
        assert_eq!(carts.len(), 2);
        assert!(carts.iter().all(|d| d.get_str("email") == Some("a@x.com")));

        assert!(store
            .find_by_email(Collection::Carts, "c@x.com")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn delete_reports_count() {
        let store = store().await;
        let inserted = store
            .insert_one(Collection::Menu, body(json!({"name": "Pie"})))
            .await
            .unwrap();
        let id = Uuid::parse_str(&inserted.inserted_id).unwrap();

        assert_eq!(store.delete_one(Collection::Menu, id).await.unwrap().deleted_count, 1);
        assert_eq!(store.delete_one(Collection::Menu, id).await.unwrap().deleted_count, 0);
    }

    #[tokio::test]
    async fn promotion_is_idempotent() {
        let store = store().await;
        let inserted = store
            .insert_one(Collection::Users, body(json!({"email": "a@x.com", "name": "A"})))
            .await
            .unwrap();
        let id = Uuid::parse_str(&inserted.inserted_id).unwrap();

        let first = store.promote_to_admin(id).await.unwrap();
        assert_eq!((first.matched_count, first.modified_count), (1, 1));

        let second = store.promote_to_admin(id).await.unwrap();
        assert_eq!((second.matched_count, second.modified_count), (1, 0));

        let user = store.find_user_by_email("a@x.com").await.unwrap().unwrap();
        assert!(user.is_admin());

        let doc = store
            .find_one_by_email(Collection::Users, "a@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.get_str("name"), Some("A"));
    }

    #[tokio::test]
    async fn promoting_unknown_user_matches_nothing() {
        let store = store().await;
        let outcome = store.promote_to_admin(Uuid::new_v4()).await.unwrap();
        assert_eq!(outcome, UpdateOutcome::new(0, 0));
    }

    #[tokio::test]
    async fn duplicate_user_email_violates_unique_index() {
        let store = store().await;
        store
            .insert_one(Collection::Users, body(json!({"email": "a@x.com"})))
            .await
            .unwrap();

        let err = store
            .insert_one(Collection::Users, body(json!({"email": "a@x.com"})))
            .await
            .unwrap_err();
        assert!(err
            .as_database_error()
            .map(|e| e.is_unique_violation())
            .unwrap_or(false));
    }
}
