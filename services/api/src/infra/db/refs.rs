use anyhow::Context as _;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use medworld_api_schema::{
    appointments, assistants, cabinets, consultations, doctors, patients, users,
};

use crate::domain::repository::RefLookupPort;
use crate::error::ApiError;

/// Existence probes backing the foreign-id validation rules.
#[derive(Clone)]
pub struct DbRefLookup {
    pub db: DatabaseConnection,
}

impl RefLookupPort for DbRefLookup {
    async fn user_exists(&self, id: i64) -> Result<bool, ApiError> {
        let count = users::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .context("count user by id")?;
        Ok(count > 0)
    }

    async fn doctor_exists(&self, id: i64) -> Result<bool, ApiError> {
        let count = doctors::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .context("count doctor by id")?;
        Ok(count > 0)
    }

    async fn patient_exists(&self, id: i64) -> Result<bool, ApiError> {
        let count = patients::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .context("count patient by id")?;
        Ok(count > 0)
    }

    async fn assistant_exists(&self, id: i64) -> Result<bool, ApiError> {
        let count = assistants::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .context("count assistant by id")?;
        Ok(count > 0)
    }

    async fn cabinet_exists(&self, id: i64) -> Result<bool, ApiError> {
        let count = cabinets::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .context("count cabinet by id")?;
        Ok(count > 0)
    }

    async fn appointment_exists(&self, id: i64) -> Result<bool, ApiError> {
        let count = appointments::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .context("count appointment by id")?;
        Ok(count > 0)
    }

    async fn consultation_exists(&self, id: i64) -> Result<bool, ApiError> {
        let count = consultations::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .context("count consultation by id")?;
        Ok(count > 0)
    }
}
