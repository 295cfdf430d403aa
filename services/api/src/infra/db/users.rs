use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

use medworld_api_schema::{doctors, patients, users};
use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::repository::UserRepository;
use crate::domain::types::{Credentials, NewUser, UserChanges, UserView};
use crate::error::ApiError;

use super::{doctor_from_model, fetch_page, patient_from_model, unique_conflict, user_from_model};

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

/// Hydrates user rows with their doctor/patient extension rows.
pub(crate) async fn user_views(
    db: &DatabaseConnection,
    models: Vec<users::Model>,
) -> Result<Vec<UserView>, ApiError> {
    let doctor_rows = models
        .load_one(doctors::Entity, db)
        .await
        .context("load user doctor rows")?;
    let patient_rows = models
        .load_one(patients::Entity, db)
        .await
        .context("load user patient rows")?;

    let mut views = Vec::with_capacity(models.len());
    for ((model, doctor), patient) in models.into_iter().zip(doctor_rows).zip(patient_rows) {
        views.push(UserView {
            user: user_from_model(model)?,
            doctor: Some(doctor.map(doctor_from_model)),
            patient: Some(patient.map(patient_from_model)),
        });
    }
    Ok(views)
}

impl UserRepository for DbUserRepository {
    async fn list(&self, page: PageRequest) -> Result<Page<UserView>, ApiError> {
        let query = users::Entity::find().order_by_asc(users::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "users").await?;
        let views = user_views(&self.db, models).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserView>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        match model {
            Some(model) => Ok(user_views(&self.db, vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: i64) -> Result<bool, ApiError> {
        let count = users::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .context("count user by id")?;
        Ok(count > 0)
    }

    async fn email_taken(&self, email: &str, ignore_id: Option<i64>) -> Result<bool, ApiError> {
        let mut query = users::Entity::find().filter(users::Column::Email.eq(email));
        if let Some(id) = ignore_id {
            query = query.filter(users::Column::Id.ne(id));
        }
        let count = query
            .count(&self.db)
            .await
            .context("count users by email")?;
        Ok(count > 0)
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        match model {
            Some(model) => {
                let password_hash = model.password.clone();
                Ok(Some(Credentials {
                    user: user_from_model(model)?,
                    password_hash,
                }))
            }
            None => Ok(None),
        }
    }

    async fn create(&self, new: &NewUser) -> Result<i64, ApiError> {
        let now = Utc::now();
        let model = users::ActiveModel {
            first_name: Set(new.first_name.clone()),
            last_name: Set(new.last_name.clone()),
            email: Set(new.email.clone()),
            password: Set(new.password_hash.clone()),
            phone_number: Set(new.phone_number.clone()),
            address: Set(new.address.clone()),
            gender: Set(new.gender.clone()),
            date_of_birth: Set(new.date_of_birth),
            role: Set(new.role.as_str().to_owned()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|err| unique_conflict(err, "Email"))?;
        Ok(model.id)
    }

    async fn update(&self, id: i64, changes: &UserChanges) -> Result<(), ApiError> {
        let mut am = users::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(first_name) = &changes.first_name {
            am.first_name = Set(first_name.clone());
        }
        if let Some(last_name) = &changes.last_name {
            am.last_name = Set(last_name.clone());
        }
        if let Some(email) = &changes.email {
            am.email = Set(email.clone());
        }
        if let Some(password_hash) = &changes.password_hash {
            am.password = Set(password_hash.clone());
        }
        if let Some(phone_number) = &changes.phone_number {
            am.phone_number = Set(phone_number.clone());
        }
        if let Some(address) = &changes.address {
            am.address = Set(address.clone());
        }
        if let Some(gender) = &changes.gender {
            am.gender = Set(gender.clone());
        }
        if let Some(date_of_birth) = changes.date_of_birth {
            am.date_of_birth = Set(date_of_birth);
        }
        am.updated_at = Set(Utc::now());
        am.update(&self.db)
            .await
            .map_err(|err| unique_conflict(err, "Email"))?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, ApiError> {
        let res = users::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete user")?;
        Ok(res.rows_affected > 0)
    }
}
