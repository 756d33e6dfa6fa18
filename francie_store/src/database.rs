use async_trait::async_trait;
use chrono::Utc;
use francie_core::{MessageStore, Role, StorageError, StoredMessage};
use francie_entities::messages;
use sea_orm::sea_query::Index;
use sea_orm::{
    ColumnTrait, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Schema, Set, SqlErr,
};
use tracing::{debug, info};

const UNIQUE_TURN_INDEX: &str = "idx_messages_session_turn_role";

/// DDL for the message table and its uniqueness index, safe to rerun.
fn schema_statements(backend: DatabaseBackend) -> [String; 2] {
    let mut table = Schema::new(backend).create_table_from_entity(messages::Entity);
    table.if_not_exists();

    let index = Index::create()
        .if_not_exists()
        .name(UNIQUE_TURN_INDEX)
        .table(messages::Entity)
        .col(messages::Column::SessionId)
        .col(messages::Column::Turn)
        .col(messages::Column::Role)
        .unique()
        .to_owned();

    [backend.build(&table).to_string(), backend.build(&index).to_string()]
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn turn_to_column(turn: u32) -> Result<i32, StorageError> {
    i32::try_from(turn).map_err(|_| StorageError::Corrupt(format!("turn out of range: {turn}")))
}

fn turn_from_column(turn: i32) -> Result<u32, StorageError> {
    u32::try_from(turn).map_err(|_| StorageError::Corrupt(format!("negative turn: {turn}")))
}

fn into_stored(model: messages::Model) -> Result<StoredMessage, StorageError> {
    Ok(StoredMessage {
        turn: turn_from_column(model.turn)?,
        role: model.role.parse()?,
        session_id: model.session_id,
        content: model.content,
        created_at: model.created_at.and_utc(),
    })
}

/// Message log persisted through sea-orm.
///
/// Every `append` is a single autocommitted INSERT, so a message is durable
/// once the call returns. A unique index on `(session_id, turn, role)`
/// rejects a second writer that computed the same turn.
pub struct DatabaseMessageStore {
    db: DatabaseConnection,
}

impl DatabaseMessageStore {
    /// Connect to `database_url` and create the schema if it is missing.
    ///
    /// # Arguments
    /// * `database_url` - e.g. `sqlite://chat.db?mode=rwc` or a `postgres://` URL
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        info!("Connecting to message store");
        let db = Database::connect(database_url)
            .await
            .map_err(StorageError::backend)?;
        Self::with_connection(db).await
    }

    /// Wrap an existing connection, creating the schema if it is missing.
    pub async fn with_connection(db: DatabaseConnection) -> Result<Self, StorageError> {
        let store = Self { db };
        store.ensure_schema().await?;
        info!("Message store initialized");
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), StorageError> {
        for statement in schema_statements(self.db.get_database_backend()) {
            self.db
                .execute_unprepared(&statement)
                .await
                .map_err(StorageError::backend)?;
        }
        debug!("Message schema ensured");
        Ok(())
    }
}

#[async_trait]
impl MessageStore for DatabaseMessageStore {
    async fn append(
        &self,
        session_id: &str,
        turn: u32,
        role: Role,
        content: &str,
    ) -> Result<(), StorageError> {
        let model = messages::ActiveModel {
            session_id: Set(session_id.to_owned()),
            turn: Set(turn_to_column(turn)?),
            role: Set(role.as_str().to_owned()),
            content: Set(content.to_owned()),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };

        match messages::Entity::insert(model).exec(&self.db).await {
            Ok(_) => {
                debug!(session_id, turn, %role, "Appended message");
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => Err(StorageError::Conflict {
                session_id: session_id.to_owned(),
                turn,
                role,
            }),
            Err(e) => Err(StorageError::backend(e)),
        }
    }

    async fn max_turn(&self, session_id: &str) -> Result<u32, StorageError> {
        let latest = messages::Entity::find()
            .filter(messages::Column::SessionId.eq(session_id))
            .order_by_desc(messages::Column::Turn)
            .one(&self.db)
            .await
            .map_err(StorageError::backend)?;

        latest.map_or(Ok(0), |model| turn_from_column(model.turn))
    }

    async fn messages(&self, session_id: &str) -> Result<Vec<StoredMessage>, StorageError> {
        messages::Entity::find()
            .filter(messages::Column::SessionId.eq(session_id))
            .order_by_asc(messages::Column::Turn)
            .order_by_asc(messages::Column::Id)
            .all(&self.db)
            .await
            .map_err(StorageError::backend)?
            .into_iter()
            .map(into_stored)
            .collect()
    }
}
