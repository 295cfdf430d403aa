use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

use medworld_api_schema::{cabinets, patients, ratings};
use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::repository::RatingRepository;
use crate::domain::types::{NewRating, RatingChanges, RatingView};
use crate::error::ApiError;

use super::{cabinet_from_model, fetch_page, patient_from_model, rating_from_model};

/// Relation set to hydrate for a batch of rating rows.
#[derive(Clone, Copy, Default)]
pub(crate) struct RatingEmbed {
    pub patient: bool,
    pub cabinet: bool,
}

impl RatingEmbed {
    /// patient + cabinet, the shape unscoped responses use.
    pub(crate) fn full() -> Self {
        RatingEmbed {
            patient: true,
            cabinet: true,
        }
    }
}

pub(crate) async fn rating_views(
    db: &DatabaseConnection,
    models: Vec<ratings::Model>,
    embed: RatingEmbed,
) -> Result<Vec<RatingView>, ApiError> {
    let patient_rows = if embed.patient {
        Some(
            models
                .load_one(patients::Entity, db)
                .await
                .context("load rating patients")?,
        )
    } else {
        None
    };
    let cabinet_rows = if embed.cabinet {
        Some(
            models
                .load_one(cabinets::Entity, db)
                .await
                .context("load rating cabinets")?,
        )
    } else {
        None
    };

    let mut patient_rows = patient_rows.map(Vec::into_iter);
    let mut cabinet_rows = cabinet_rows.map(Vec::into_iter);

    let mut views = Vec::with_capacity(models.len());
    for model in models {
        let mut view = RatingView::from(rating_from_model(model));
        if let Some(rows) = patient_rows.as_mut() {
            let row = rows
                .next()
                .flatten()
                .context("rating patient row missing")?;
            view.patient = Some(patient_from_model(row));
        }
        if let Some(rows) = cabinet_rows.as_mut() {
            let row = rows
                .next()
                .flatten()
                .context("rating cabinet row missing")?;
            view.cabinet = Some(cabinet_from_model(row));
        }
        views.push(view);
    }
    Ok(views)
}

#[derive(Clone)]
pub struct DbRatingRepository {
    pub db: DatabaseConnection,
}

impl RatingRepository for DbRatingRepository {
    async fn list(&self, page: PageRequest) -> Result<Page<RatingView>, ApiError> {
        let query = ratings::Entity::find().order_by_asc(ratings::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "ratings").await?;
        let views = rating_views(&self.db, models, RatingEmbed::full()).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<RatingView>, ApiError> {
        let model = ratings::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find rating by id")?;
        match model {
            Some(model) => Ok(rating_views(&self.db, vec![model], RatingEmbed::full())
                .await?
                .pop()),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: i64) -> Result<bool, ApiError> {
        let count = ratings::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .context("count rating by id")?;
        Ok(count > 0)
    }

    async fn create(&self, new: &NewRating) -> Result<i64, ApiError> {
        let now = Utc::now();
        let model = ratings::ActiveModel {
            patient_id: Set(new.patient_id),
            cabinet_id: Set(new.cabinet_id),
            date: Set(new.date),
            equippement: Set(new.equippement.clone()),
            user_experience: Set(new.user_experience.clone()),
            review: Set(new.review.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("create rating")?;
        Ok(model.id)
    }

    async fn update(&self, id: i64, changes: &RatingChanges) -> Result<(), ApiError> {
        let mut am = ratings::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(equippement) = &changes.equippement {
            am.equippement = Set(equippement.clone());
        }
        if let Some(user_experience) = &changes.user_experience {
            am.user_experience = Set(user_experience.clone());
        }
        if let Some(review) = &changes.review {
            am.review = Set(review.clone());
        }
        am.updated_at = Set(Utc::now());
        am.update(&self.db).await.context("update rating")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, ApiError> {
        let res = ratings::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete rating")?;
        Ok(res.rows_affected > 0)
    }

    async fn list_by_cabinet(
        &self,
        cabinet_id: i64,
        page: PageRequest,
    ) -> Result<Page<RatingView>, ApiError> {
        let query = ratings::Entity::find()
            .filter(ratings::Column::CabinetId.eq(cabinet_id))
            .order_by_asc(ratings::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "cabinet ratings").await?;
        let embed = RatingEmbed {
            patient: true,
            ..Default::default()
        };
        let views = rating_views(&self.db, models, embed).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn list_by_patient(
        &self,
        patient_id: i64,
        page: PageRequest,
    ) -> Result<Page<RatingView>, ApiError> {
        let query = ratings::Entity::find()
            .filter(ratings::Column::PatientId.eq(patient_id))
            .order_by_asc(ratings::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "patient ratings").await?;
        let embed = RatingEmbed {
            cabinet: true,
            ..Default::default()
        };
        let views = rating_views(&self.db, models, embed).await?;
        Ok(Page::from_parts(views, total, page))
    }
}
