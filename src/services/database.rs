use async_trait::async_trait;
use serde::de::DeserializeOwned;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;

use crate::config::DatabaseConfig;
use crate::error::{NotifyError, NotifyResult};

/// Condition on a single document field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPredicate {
    /// The field is present and not null.
    NotNull(&'static str),
}

impl FieldPredicate {
    pub fn field(&self) -> &'static str {
        match self {
            FieldPredicate::NotNull(field) => field,
        }
    }
}

/// Read access to the application's document collections.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn get<T>(&self, collection: &str, id: &str) -> NotifyResult<Option<T>>
    where
        T: DeserializeOwned + Send + 'static;

    async fn query<T>(&self, collection: &str, predicate: &FieldPredicate) -> NotifyResult<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static;
}

#[derive(Clone)]
pub struct DatabaseService {
    db: Surreal<Any>,
}

impl DatabaseService {
    pub async fn new(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let db = any::connect(config.url.as_str()).await?;

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            db.signin(Root {
                username: username.as_str(),
                password: password.as_str(),
            })
            .await?;
        }

        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await?;

        log::info!(
            "Connected to directory store at {} ({}/{})",
            config.url, config.namespace, config.database
        );
        Ok(Self { db })
    }
}

fn predicate_clause(predicate: &FieldPredicate) -> NotifyResult<String> {
    let field = predicate.field();
    // Field names are spliced into the statement, so only plain identifiers get through.
    if field.is_empty() || !field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(NotifyError::Store(format!("unsupported field name: {}", field)));
    }

    Ok(match predicate {
        FieldPredicate::NotNull(_) => format!("{field} != NONE AND {field} != NULL"),
    })
}

#[async_trait]
impl DirectoryStore for DatabaseService {
    async fn get<T>(&self, collection: &str, id: &str) -> NotifyResult<Option<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let record: Option<T> = self.db.select((collection, id)).await?;
        Ok(record)
    }

    async fn query<T>(&self, collection: &str, predicate: &FieldPredicate) -> NotifyResult<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let sql = format!(
            "SELECT * FROM type::table($table) WHERE {}",
            predicate_clause(predicate)?
        );

        let mut response = self.db
            .query(sql)
            .bind(("table", collection.to_string()))
            .await?;

        let records: Vec<T> = response.take(0)?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::{DOCTORS, FCM_TOKEN_FIELD, USERS};
    use crate::models::doctor::DoctorRecord;
    use crate::models::user::UserRecord;
    use serde::Serialize;

    async fn memory_store() -> DatabaseService {
        DatabaseService::new(&DatabaseConfig::in_memory()).await.unwrap()
    }

    async fn insert<T>(store: &DatabaseService, collection: &str, id: &str, record: T)
    where
        T: Serialize + DeserializeOwned + Send + 'static,
    {
        let _: Option<T> = store.db.create((collection, id)).content(record).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_user_by_id() {
        let store = memory_store().await;
        insert(&store, USERS, "u1", UserRecord {
            display_name: Some("Asha".to_string()),
            fcm_token: Some("tok-1".to_string()),
        }).await;

        let user: Option<UserRecord> = store.get(USERS, "u1").await.unwrap();
        let user = user.unwrap();
        assert_eq!(user.display_name.as_deref(), Some("Asha"));
        assert_eq!(user.token(), Some("tok-1"));

        let missing: Option<UserRecord> = store.get(USERS, "nobody").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_get_doctor_by_id() {
        let store = memory_store().await;
        insert(&store, DOCTORS, "d1", DoctorRecord { doctor_name: "Dr. Rao".to_string() }).await;

        let doctor: Option<DoctorRecord> = store.get(DOCTORS, "d1").await.unwrap();
        assert_eq!(doctor.unwrap().doctor_name, "Dr. Rao");
    }

    #[tokio::test]
    async fn test_query_users_with_token() {
        let store = memory_store().await;
        insert(&store, USERS, "u1", UserRecord::with_token("tok-1")).await;
        insert(&store, USERS, "u2", UserRecord::with_token("tok-2")).await;
        insert(&store, USERS, "u3", UserRecord {
            display_name: Some("No Device".to_string()),
            fcm_token: None,
        }).await;

        let users: Vec<UserRecord> = store
            .query(USERS, &FieldPredicate::NotNull(FCM_TOKEN_FIELD))
            .await
            .unwrap();

        let mut tokens: Vec<_> = users.iter().filter_map(|u| u.token()).collect();
        tokens.sort();
        assert_eq!(tokens, vec!["tok-1", "tok-2"]);
    }

    #[tokio::test]
    async fn test_query_empty_collection() {
        let store = memory_store().await;
        let users: Vec<UserRecord> = store
            .query(USERS, &FieldPredicate::NotNull(FCM_TOKEN_FIELD))
            .await
            .unwrap();
        assert!(users.is_empty());
    }

    #[test]
    fn test_predicate_rejects_unsafe_field_names() {
        let clause = predicate_clause(&FieldPredicate::NotNull("fcmToken; DELETE users"));
        assert!(matches!(clause, Err(NotifyError::Store(_))));
        assert_eq!(
            predicate_clause(&FieldPredicate::NotNull("fcmToken")).unwrap(),
            "fcmToken != NONE AND fcmToken != NULL"
        );
    }
}
