use anyhow::Context as _;
use chrono::Utc;
use sea_orm::sea_query::{OnConflict, Query};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    LoaderTrait, QueryFilter, QueryOrder,
};

use medworld_api_schema::{assistant_doctor, assistants, cabinets, doctors, users};
use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::repository::AssistantRepository;
use crate::domain::types::{
    Assistant, AssistantChanges, AssistantView, Doctor, DoctorView, NewAssistant,
};
use crate::error::ApiError;

use super::doctors::{DoctorEmbed, doctor_views};
use super::{
    assistant_from_model, cabinet_from_model, doctor_from_model, fetch_page, unique_conflict,
    user_from_model,
};

/// Relation set to hydrate for a batch of assistant rows.
#[derive(Clone, Copy, Default)]
pub(crate) struct AssistantEmbed {
    pub user: bool,
    pub cabinet: bool,
    pub doctors: bool,
}

impl AssistantEmbed {
    /// user + cabinet + doctors, the shape every assistant response uses.
    pub(crate) fn full() -> Self {
        AssistantEmbed {
            user: true,
            cabinet: true,
            doctors: true,
        }
    }
}

pub(crate) async fn assistant_views(
    db: &DatabaseConnection,
    models: Vec<assistants::Model>,
    embed: AssistantEmbed,
) -> Result<Vec<AssistantView>, ApiError> {
    let user_rows = if embed.user {
        Some(
            models
                .load_one(users::Entity, db)
                .await
                .context("load assistant users")?,
        )
    } else {
        None
    };
    let cabinet_rows = if embed.cabinet {
        Some(
            models
                .load_one(cabinets::Entity, db)
                .await
                .context("load assistant cabinets")?,
        )
    } else {
        None
    };
    let doctor_rows = if embed.doctors {
        Some(
            models
                .load_many_to_many(doctors::Entity, assistant_doctor::Entity, db)
                .await
                .context("load assistant doctors")?,
        )
    } else {
        None
    };

    let mut user_rows = user_rows.map(Vec::into_iter);
    let mut cabinet_rows = cabinet_rows.map(Vec::into_iter);
    let mut doctor_rows = doctor_rows.map(Vec::into_iter);

    let mut views = Vec::with_capacity(models.len());
    for model in models {
        let mut view = AssistantView::from(assistant_from_model(model));
        if let Some(rows) = user_rows.as_mut() {
            let row = rows.next().flatten().context("assistant user row missing")?;
            view.user = Some(user_from_model(row)?);
        }
        if let Some(rows) = cabinet_rows.as_mut() {
            view.cabinet = Some(rows.next().flatten().map(cabinet_from_model));
        }
        if let Some(rows) = doctor_rows.as_mut() {
            let linked = rows.next().unwrap_or_default();
            view.doctors = Some(linked.into_iter().map(doctor_from_model).collect());
        }
        views.push(view);
    }
    Ok(views)
}

#[derive(Clone)]
pub struct DbAssistantRepository {
    pub db: DatabaseConnection,
}

impl AssistantRepository for DbAssistantRepository {
    async fn list(&self, page: PageRequest) -> Result<Page<AssistantView>, ApiError> {
        let query = assistants::Entity::find().order_by_asc(assistants::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "assistants").await?;
        let views = assistant_views(&self.db, models, AssistantEmbed::full()).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<AssistantView>, ApiError> {
        let model = assistants::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find assistant by id")?;
        match model {
            Some(model) => Ok(
                assistant_views(&self.db, vec![model], AssistantEmbed::full())
                    .await?
                    .pop(),
            ),
            None => Ok(None),
        }
    }

    async fn find_base(&self, id: i64) -> Result<Option<Assistant>, ApiError> {
        let model = assistants::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find assistant by id")?;
        Ok(model.map(assistant_from_model))
    }

    async fn create(&self, new: &NewAssistant) -> Result<i64, ApiError> {
        let now = Utc::now();
        let model = assistants::ActiveModel {
            user_id: Set(new.user_id),
            cabinet_id: Set(Some(new.cabinet_id)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|err| unique_conflict(err, "Assistant"))?;
        Ok(model.id)
    }

    async fn update(&self, id: i64, changes: &AssistantChanges) -> Result<(), ApiError> {
        let mut am = assistants::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(cabinet_id) = changes.cabinet_id {
            am.cabinet_id = Set(Some(cabinet_id));
        }
        am.updated_at = Set(Utc::now());
        am.update(&self.db).await.context("update assistant")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, ApiError> {
        let res = assistants::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete assistant")?;
        Ok(res.rows_affected > 0)
    }

    async fn doctors(
        &self,
        assistant_id: i64,
        page: PageRequest,
    ) -> Result<Page<DoctorView>, ApiError> {
        let linked = Query::select()
            .column(assistant_doctor::Column::DoctorId)
            .from(assistant_doctor::Entity)
            .and_where(assistant_doctor::Column::AssistantId.eq(assistant_id))
            .to_owned();
        let query = doctors::Entity::find()
            .filter(doctors::Column::Id.in_subquery(linked))
            .order_by_asc(doctors::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "assistant doctors").await?;
        let embed = DoctorEmbed {
            user: true,
            cabinet: true,
            ..Default::default()
        };
        let views = doctor_views(&self.db, models, embed).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn attached_doctors(&self, assistant_id: i64) -> Result<Vec<Doctor>, ApiError> {
        let linked = Query::select()
            .column(assistant_doctor::Column::DoctorId)
            .from(assistant_doctor::Entity)
            .and_where(assistant_doctor::Column::AssistantId.eq(assistant_id))
            .to_owned();
        let models = doctors::Entity::find()
            .filter(doctors::Column::Id.in_subquery(linked))
            .order_by_asc(doctors::Column::Id)
            .all(&self.db)
            .await
            .context("list assistant doctors")?;
        Ok(models.into_iter().map(doctor_from_model).collect())
    }

    async fn attach(&self, assistant_id: i64, doctor_id: i64) -> Result<bool, ApiError> {
        let now = Utc::now();
        let res = assistant_doctor::Entity::insert(assistant_doctor::ActiveModel {
            assistant_id: Set(assistant_id),
            doctor_id: Set(doctor_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::columns([
                assistant_doctor::Column::AssistantId,
                assistant_doctor::Column::DoctorId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec(&self.db)
        .await;
        match res {
            Ok(_) => Ok(true),
            Err(DbErr::RecordNotInserted) => Ok(false),
            Err(err) => Err(ApiError::Internal(
                anyhow::Error::new(err).context("attach doctor to assistant"),
            )),
        }
    }

    async fn detach(&self, assistant_id: i64, doctor_id: i64) -> Result<bool, ApiError> {
        let res = assistant_doctor::Entity::delete_many()
            .filter(assistant_doctor::Column::AssistantId.eq(assistant_id))
            .filter(assistant_doctor::Column::DoctorId.eq(doctor_id))
            .exec(&self.db)
            .await
            .context("detach doctor from assistant")?;
        Ok(res.rows_affected > 0)
    }
}
