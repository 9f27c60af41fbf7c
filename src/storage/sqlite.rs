//! SQLite document store / SQLite 文档存储
//!
//! Documents of every collection live in one table as JSON text. Predicates are
//! compiled to `json_extract`/`json_type` conditions so filtering happens in SQLite.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteArguments, SqlitePoolOptions};
use sqlx::{Arguments, Pool, Row, Sqlite};

use super::{DocumentStore, StoreError};
use crate::models::Document;
use crate::search::predicate::SqlParam;
use crate::search::Predicate;

#[derive(Clone)]
pub struct SqliteStore {
    db: Pool<Sqlite>,
}

impl SqliteStore {
    /// Connect and prepare the schema / 连接并初始化表结构
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let db = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;

        // WAL lets readers proceed during imports
        sqlx::query("PRAGMA journal_mode=WAL").execute(&db).await?;
        sqlx::query("PRAGMA busy_timeout=5000").execute(&db).await?;

        let store = Self { db };
        store.init().await?;
        tracing::info!("Document store connected (max {} connections)", max_connections);
        Ok(store)
    }

    /// Create tables if missing; never drops data / 创建表结构
    pub async fn init(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                body TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection)")
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Insert documents into a collection in one transaction / 批量写入
    pub async fn insert_many(&self, collection: &str, docs: &[Document]) -> Result<u64, StoreError> {
        let mut tx = self.db.begin().await?;
        for doc in docs {
            sqlx::query("INSERT INTO documents (collection, body) VALUES (?, ?)")
                .bind(collection)
                .bind(serde_json::to_string(doc)?)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(docs.len() as u64)
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn find(
        &self,
        collection: &str,
        predicate: &Predicate,
        limit: usize,
    ) -> Result<Vec<Document>, StoreError> {
        let mut condition = String::new();
        let mut params = Vec::new();
        predicate.to_sql(&mut condition, &mut params);

        let sql = format!(
            "SELECT body FROM documents WHERE collection = ? AND {} LIMIT ?",
            condition
        );

        let mut args = SqliteArguments::default();
        args.add(collection.to_string());
        for param in params {
            match param {
                SqlParam::Text(s) => args.add(s),
                SqlParam::Int(i) => args.add(i),
                SqlParam::Real(f) => args.add(f),
            }
        }
        args.add(i64::try_from(limit).unwrap_or(i64::MAX));

        let rows = sqlx::query_with(&sql, args).fetch_all(&self.db).await?;

        rows.iter()
            .map(|row| -> Result<Document, StoreError> {
                let body: String = row.try_get("body")?;
                Ok(serde_json::from_str::<Document>(&body)?)
            })
            .collect()
    }

    async fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        let names: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT collection FROM documents ORDER BY collection")
                .fetch_all(&self.db)
                .await?;
        Ok(names.into_iter().map(|(name,)| name).collect())
    }

    async fn estimated_count(&self, collection: &str) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documents WHERE collection = ?")
            .bind(collection)
            .fetch_one(&self.db)
            .await?;
        Ok(count.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::translate;
    use serde_json::{json, Value};

    async fn memory_store() -> SqliteStore {
        // single connection: every connection to :memory: is a separate database
        SqliteStore::connect("sqlite::memory:", 1).await.unwrap()
    }

    fn docs(values: Vec<Value>) -> Vec<Document> {
        values.into_iter().map(|v| v.as_object().cloned().unwrap()).collect()
    }

    #[tokio::test]
    async fn test_typed_equality() {
        let store = memory_store().await;
        store
            .insert_many(
                "dukcapil",
                &docs(vec![
                    json!({"NIK": 3201011205900001_i64, "NAMA_LGKP": "BUDI"}),
                    json!({"NIK": "3201011205900001", "NAMA_LGKP": "ANI"}),
                ]),
            )
            .await
            .unwrap();

        let found = store
            .find("dukcapil", &translate("dukcapil", "3201011205900001"), 10)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["NAMA_LGKP"], "BUDI");

        let found = store.find("dukcapil", &translate("dukcapil", "ani"), 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["NAMA_LGKP"], "ANI");
    }

    #[tokio::test]
    async fn test_default_views_agree_with_memory_evaluation() {
        let store = memory_store().await;
        let rows = docs(vec![
            json!({"Hp": -1, "Tagihan Pokok": 20000000}),
            json!({"Hp": 812, "Tagihan Pokok": 20000000}),
            json!({"Hp": 813, "Tagihan Pokok": 500}),
            json!({"Tagihan Pokok": 30000000}),
            json!({"Hp": 814, "Tagihan Pokok": "99999999"}),
        ]);
        store.insert_many("bankraya_paylater", &rows).await.unwrap();

        let predicate = translate("bankraya_paylater", "");
        let expected = rows.iter().filter(|d| predicate.matches(d)).count();
        let found = store.find("bankraya_paylater", &predicate, 10).await.unwrap();
        assert_eq!(expected, 2);
        assert_eq!(found.len(), expected);

        let rows = docs(vec![
            json!({"Noidentitas": 3201}),
            json!({"Noidentitas": ""}),
            json!({"Noidentitas": 0}),
            json!({"Noidentitas": null}),
            json!({"Noidentitas": false}),
            json!({"Noidentitas": ["X"]}),
            json!({"Fullname": "X"}),
        ]);
        store.insert_many("user_posaja", &rows).await.unwrap();
        let predicate = translate("user_posaja", "");
        let expected = rows.iter().filter(|d| predicate.matches(d)).count();
        let found = store.find("user_posaja", &predicate, 10).await.unwrap();
        assert_eq!(expected, 4);
        assert_eq!(found.len(), expected);
    }

    #[tokio::test]
    async fn test_typed_equality_ignores_other_json_types() {
        let store = memory_store().await;
        let rows = docs(vec![
            json!({"NIK": true, "NAMA": "A"}),
            json!({"NIK": 1, "NAMA": "B"}),
            json!({"NIK": 1.0, "NAMA": "C"}),
            json!({"NIK": "1", "NAMA": "D"}),
            json!({"NIK": [1], "NAMA": ["1"]}),
            json!({"NIK": {"v": 1}, "NAMA": "1"}),
        ]);
        store.insert_many("sim_pendaftaran", &rows).await.unwrap();

        for filter in ["1", "a", "x"] {
            let predicate = translate("sim_pendaftaran", filter);
            let expected: Vec<&Document> = rows.iter().filter(|d| predicate.matches(d)).collect();
            let found = store.find("sim_pendaftaran", &predicate, 10).await.unwrap();
            assert_eq!(found.len(), expected.len(), "filter {}", filter);
            for doc in &found {
                assert!(predicate.matches(doc), "filter {} matched {:?}", filter, doc);
            }
        }

        let found = store.find("sim_pendaftaran", &translate("sim_pendaftaran", "1"), 10).await.unwrap();
        let mut names: Vec<&Value> = found.iter().map(|d| &d["NAMA"]).collect();
        names.sort_by_key(|v| v.to_string());
        assert_eq!(names, vec![&json!("B"), &json!("C")]);
    }

    #[tokio::test]
    async fn test_nested_field_and_limit() {
        let store = memory_store().await;
        let rows: Vec<Value> = (0..15)
            .map(|i| json!({"product": {"fundname": "ALPHA"}, "cls_initialcode": i}))
            .collect();
        store.insert_many("portfolio_bnisekuritas", &docs(rows)).await.unwrap();

        let found = store
            .find("portfolio_bnisekuritas", &translate("portfolio_bnisekuritas", "alpha"), 10)
            .await
            .unwrap();
        assert_eq!(found.len(), 10);
    }

    #[tokio::test]
    async fn test_collections_and_counts() {
        let store = memory_store().await;
        store.insert_many("vehicle", &docs(vec![json!({"NOPOL": "B1"}), json!({"NOPOL": "B2"})])).await.unwrap();
        store.insert_many("fithub", &docs(vec![json!({"name": "A"})])).await.unwrap();

        assert_eq!(store.collection_names().await.unwrap(), vec!["fithub", "vehicle"]);
        assert_eq!(store.estimated_count("vehicle").await.unwrap(), 2);
        assert_eq!(store.estimated_count("missing").await.unwrap(), 0);
    }
}
