//! SeaORM-backed verification storage.
//!
//! # Example
//!
//! ```rust,ignore
//! use idv_intake::verification::SeaOrmVerificationStore;
//!
//! let db = sea_orm::Database::connect(&database_url).await?;
//! let store = SeaOrmVerificationStore::new(db);
//! store.create_table().await?;
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, EntityTrait, Schema, Set, sea_query::OnConflict,
};

use super::store::VerificationStore;
use super::{VerificationRecord, VerificationUpdate};
use crate::error::{IntakeError, Result};

mod entity {
    pub mod user_verification {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
        #[sea_orm(table_name = "user_verifications")]
        pub struct Model {
            #[sea_orm(primary_key, auto_increment = false)]
            pub user_id: String,
            pub first_name: Option<String>,
            pub last_name: Option<String>,
            pub verified_by: String,
            pub external_id: Option<String>,
            pub status: String,
            pub created_at: DateTimeWithTimeZone,
            pub updated_at: DateTimeWithTimeZone,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }
}

use entity::user_verification;

fn model_to_record(model: user_verification::Model) -> Result<VerificationRecord> {
    Ok(VerificationRecord {
        status: model.status.parse().map_err(IntakeError::internal)?,
        method: model.verified_by.parse().map_err(IntakeError::internal)?,
        subject_id: model.user_id,
        first_name: model.first_name,
        last_name: model.last_name,
        external_id: model.external_id,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

/// SeaORM-backed verification store.
///
/// Upserts are a single `INSERT .. ON CONFLICT (user_id) DO UPDATE ..
/// RETURNING`, so concurrent deliveries for one subject rely on the primary
/// key instead of a read-then-write, and each caller gets back the row it wrote.
#[derive(Clone)]
pub struct SeaOrmVerificationStore {
    db: DatabaseConnection,
}

impl SeaOrmVerificationStore {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create the `user_verifications` table if it does not exist.
    ///
    /// Deployments with their own migrations can skip this.
    pub async fn create_table(&self) -> Result<()> {
        let backend = self.db.get_database_backend();
        let schema = Schema::new(backend);
        let mut statement = schema.create_table_from_entity(user_verification::Entity);
        statement.if_not_exists();

        self.db.execute(backend.build(&statement)).await?;
        Ok(())
    }
}

#[async_trait]
impl VerificationStore for SeaOrmVerificationStore {
    async fn upsert(&self, update: &VerificationUpdate) -> Result<VerificationRecord> {
        tracing::debug!(
            subject_id = %update.subject_id,
            status = %update.status,
            "upserting user verification"
        );

        let now = Utc::now().fixed_offset();
        let active_model = user_verification::ActiveModel {
            user_id: Set(update.subject_id.clone()),
            first_name: Set(update.first_name.clone()),
            last_name: Set(update.last_name.clone()),
            verified_by: Set(update.method.as_str().to_string()),
            external_id: Set(update.external_id.clone()),
            status: Set(update.status.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = user_verification::Entity::insert(active_model)
            .on_conflict(
                OnConflict::column(user_verification::Column::UserId)
                    .update_columns([
                        user_verification::Column::FirstName,
                        user_verification::Column::LastName,
                        user_verification::Column::VerifiedBy,
                        user_verification::Column::ExternalId,
                        user_verification::Column::Status,
                        user_verification::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await?;

        model_to_record(model)
    }

    async fn get(&self, subject_id: &str) -> Result<Option<VerificationRecord>> {
        let model = user_verification::Entity::find_by_id(subject_id.to_string())
            .one(&self.db)
            .await?;

        model.map(model_to_record).transpose()
    }
}
