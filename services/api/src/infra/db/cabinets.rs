use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

use medworld_api_schema::{
    appointments, assistants, cabinets, doctors, messages, payments, ratings, users,
};
use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::repository::CabinetRepository;
use crate::domain::types::{
    AppointmentView, AssistantView, CabinetChanges, CabinetView, DoctorView, NewCabinet,
    RatingView,
};
use crate::error::ApiError;

use super::appointments::{AppointmentEmbed, appointment_views};
use super::assistants::{AssistantEmbed, assistant_views};
use super::doctors::{DoctorEmbed, doctor_views};
use super::ratings::{RatingEmbed, rating_views};
use super::{
    appointment_from_model, assistant_from_model, cabinet_from_model, doctor_from_model,
    fetch_page, message_from_model, payment_from_model, rating_from_model, user_from_model,
    users_by_ids,
};

/// Relation set to hydrate for a batch of cabinet rows. `nested_users`
/// additionally hangs each embedded doctor's and assistant's user off them.
#[derive(Clone, Copy, Default)]
pub(crate) struct CabinetEmbed {
    pub admin: bool,
    pub doctors: bool,
    pub assistants: bool,
    pub appointments: bool,
    pub messages: bool,
    pub ratings: bool,
    pub payments: bool,
    pub nested_users: bool,
}

impl CabinetEmbed {
    /// admin + doctors + assistants, the shape write responses use.
    pub(crate) fn summary() -> Self {
        CabinetEmbed {
            admin: true,
            doctors: true,
            assistants: true,
            ..Default::default()
        }
    }

    /// Every relation, the shape list and detail responses use.
    pub(crate) fn detail() -> Self {
        CabinetEmbed {
            admin: true,
            doctors: true,
            assistants: true,
            appointments: true,
            messages: true,
            ratings: true,
            payments: true,
            nested_users: false,
        }
    }

    /// The bulk shape: staff carry their users, messages and payments are
    /// left out.
    pub(crate) fn expanded() -> Self {
        CabinetEmbed {
            admin: true,
            doctors: true,
            assistants: true,
            appointments: true,
            ratings: true,
            nested_users: true,
            ..Default::default()
        }
    }
}

pub(crate) async fn cabinet_views(
    db: &DatabaseConnection,
    models: Vec<cabinets::Model>,
    embed: CabinetEmbed,
) -> Result<Vec<CabinetView>, ApiError> {
    let admin_rows = if embed.admin {
        Some(
            models
                .load_one(users::Entity, db)
                .await
                .context("load cabinet admins")?,
        )
    } else {
        None
    };
    let doctor_rows = if embed.doctors {
        Some(
            models
                .load_many(doctors::Entity, db)
                .await
                .context("load cabinet doctors")?,
        )
    } else {
        None
    };
    let assistant_rows = if embed.assistants {
        Some(
            models
                .load_many(assistants::Entity, db)
                .await
                .context("load cabinet assistants")?,
        )
    } else {
        None
    };
    let appointment_rows = if embed.appointments {
        Some(
            models
                .load_many(appointments::Entity, db)
                .await
                .context("load cabinet appointments")?,
        )
    } else {
        None
    };
    let message_rows = if embed.messages {
        Some(
            models
                .load_many(messages::Entity, db)
                .await
                .context("load cabinet messages")?,
        )
    } else {
        None
    };
    let rating_rows = if embed.ratings {
        Some(
            models
                .load_many(ratings::Entity, db)
                .await
                .context("load cabinet ratings")?,
        )
    } else {
        None
    };
    let payment_rows = if embed.payments {
        Some(
            models
                .load_many(payments::Entity, db)
                .await
                .context("load cabinet payments")?,
        )
    } else {
        None
    };

    let user_map = if embed.nested_users {
        let mut ids = Vec::new();
        if let Some(groups) = &doctor_rows {
            for group in groups {
                ids.extend(group.iter().map(|doctor| doctor.user_id));
            }
        }
        if let Some(groups) = &assistant_rows {
            for group in groups {
                ids.extend(group.iter().map(|assistant| assistant.user_id));
            }
        }
        Some(users_by_ids(db, ids).await?)
    } else {
        None
    };

    let mut admin_rows = admin_rows.map(Vec::into_iter);
    let mut doctor_rows = doctor_rows.map(Vec::into_iter);
    let mut assistant_rows = assistant_rows.map(Vec::into_iter);
    let mut appointment_rows = appointment_rows.map(Vec::into_iter);
    let mut message_rows = message_rows.map(Vec::into_iter);
    let mut rating_rows = rating_rows.map(Vec::into_iter);
    let mut payment_rows = payment_rows.map(Vec::into_iter);

    let mut views = Vec::with_capacity(models.len());
    for model in models {
        let mut view = CabinetView::from(cabinet_from_model(model));
        if let Some(rows) = admin_rows.as_mut() {
            view.admin = Some(rows.next().flatten().map(user_from_model).transpose()?);
        }
        if let Some(rows) = doctor_rows.as_mut() {
            let group = rows.next().unwrap_or_default();
            let mut embedded = Vec::with_capacity(group.len());
            for doctor in group {
                let mut dv = DoctorView::from(doctor_from_model(doctor));
                if let Some(map) = &user_map {
                    let user = map
                        .get(&dv.doctor.user_id)
                        .cloned()
                        .context("cabinet doctor user missing")?;
                    dv.user = Some(user);
                }
                embedded.push(dv);
            }
            view.doctors = Some(embedded);
        }
        if let Some(rows) = assistant_rows.as_mut() {
            let group = rows.next().unwrap_or_default();
            let mut embedded = Vec::with_capacity(group.len());
            for assistant in group {
                let mut av = AssistantView::from(assistant_from_model(assistant));
                if let Some(map) = &user_map {
                    let user = map
                        .get(&av.assistant.user_id)
                        .cloned()
                        .context("cabinet assistant user missing")?;
                    av.user = Some(user);
                }
                embedded.push(av);
            }
            view.assistants = Some(embedded);
        }
        if let Some(rows) = appointment_rows.as_mut() {
            let linked = rows.next().unwrap_or_default();
            view.appointments = Some(
                linked
                    .into_iter()
                    .map(appointment_from_model)
                    .collect::<anyhow::Result<Vec<_>>>()?,
            );
        }
        if let Some(rows) = message_rows.as_mut() {
            let linked = rows.next().unwrap_or_default();
            view.messages = Some(
                linked
                    .into_iter()
                    .map(message_from_model)
                    .collect::<anyhow::Result<Vec<_>>>()?,
            );
        }
        if let Some(rows) = rating_rows.as_mut() {
            let linked = rows.next().unwrap_or_default();
            view.ratings = Some(linked.into_iter().map(rating_from_model).collect());
        }
        if let Some(rows) = payment_rows.as_mut() {
            let linked = rows.next().unwrap_or_default();
            view.payments = Some(
                linked
                    .into_iter()
                    .map(payment_from_model)
                    .collect::<anyhow::Result<Vec<_>>>()?,
            );
        }
        views.push(view);
    }
    Ok(views)
}

#[derive(Clone)]
pub struct DbCabinetRepository {
    pub db: DatabaseConnection,
}

impl CabinetRepository for DbCabinetRepository {
    async fn list(&self, page: PageRequest) -> Result<Page<CabinetView>, ApiError> {
        let query = cabinets::Entity::find().order_by_asc(cabinets::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "cabinets").await?;
        let views = cabinet_views(&self.db, models, CabinetEmbed::detail()).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn list_expanded(&self, page: PageRequest) -> Result<Page<CabinetView>, ApiError> {
        let query = cabinets::Entity::find().order_by_asc(cabinets::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "cabinets").await?;
        let views = cabinet_views(&self.db, models, CabinetEmbed::expanded()).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<CabinetView>, ApiError> {
        let model = cabinets::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find cabinet by id")?;
        match model {
            Some(model) => Ok(cabinet_views(&self.db, vec![model], CabinetEmbed::detail())
                .await?
                .pop()),
            None => Ok(None),
        }
    }

    async fn find_summary(&self, id: i64) -> Result<Option<CabinetView>, ApiError> {
        let model = cabinets::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find cabinet by id")?;
        match model {
            Some(model) => Ok(cabinet_views(&self.db, vec![model], CabinetEmbed::summary())
                .await?
                .pop()),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: i64) -> Result<bool, ApiError> {
        let count = cabinets::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .context("count cabinet by id")?;
        Ok(count > 0)
    }

    async fn create(&self, new: &NewCabinet) -> Result<i64, ApiError> {
        let now = Utc::now();
        let model = cabinets::ActiveModel {
            name: Set(new.name.clone()),
            phone: Set(Some(new.phone.clone())),
            admin_id: Set(Some(new.admin_id)),
            access_handicap: Set(new.access_handicap),
            has_parking: Set(new.has_parking),
            has_wifi: Set(new.has_wifi),
            accepts_urgent: Set(new.accepts_urgent),
            accepts_insurance: Set(new.accepts_insurance),
            opening_hours: Set(new.opening_hours.clone()),
            location_lat: Set(new.location_lat),
            location_lng: Set(new.location_lng),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("create cabinet")?;
        Ok(model.id)
    }

    async fn update(&self, id: i64, changes: &CabinetChanges) -> Result<(), ApiError> {
        let mut am = cabinets::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(name) = &changes.name {
            am.name = Set(name.clone());
        }
        if let Some(phone) = &changes.phone {
            am.phone = Set(Some(phone.clone()));
        }
        if let Some(access_handicap) = changes.access_handicap {
            am.access_handicap = Set(access_handicap);
        }
        if let Some(has_parking) = changes.has_parking {
            am.has_parking = Set(has_parking);
        }
        if let Some(has_wifi) = changes.has_wifi {
            am.has_wifi = Set(has_wifi);
        }
        if let Some(accepts_urgent) = changes.accepts_urgent {
            am.accepts_urgent = Set(accepts_urgent);
        }
        if let Some(accepts_insurance) = changes.accepts_insurance {
            am.accepts_insurance = Set(accepts_insurance);
        }
        if let Some(opening_hours) = &changes.opening_hours {
            am.opening_hours = Set(opening_hours.clone());
        }
        if let Some(location_lat) = changes.location_lat {
            am.location_lat = Set(location_lat);
        }
        if let Some(location_lng) = changes.location_lng {
            am.location_lng = Set(location_lng);
        }
        am.updated_at = Set(Utc::now());
        am.update(&self.db).await.context("update cabinet")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, ApiError> {
        let res = cabinets::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete cabinet")?;
        Ok(res.rows_affected > 0)
    }

    async fn doctors(
        &self,
        cabinet_id: i64,
        page: PageRequest,
    ) -> Result<Page<DoctorView>, ApiError> {
        let query = doctors::Entity::find()
            .filter(doctors::Column::CabinetId.eq(cabinet_id))
            .order_by_asc(doctors::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "cabinet doctors").await?;
        let embed = DoctorEmbed {
            user: true,
            assistants: true,
            appointments: true,
            ..Default::default()
        };
        let views = doctor_views(&self.db, models, embed).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn assistants(
        &self,
        cabinet_id: i64,
        page: PageRequest,
    ) -> Result<Page<AssistantView>, ApiError> {
        let query = assistants::Entity::find()
            .filter(assistants::Column::CabinetId.eq(cabinet_id))
            .order_by_asc(assistants::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "cabinet assistants").await?;
        let embed = AssistantEmbed {
            user: true,
            doctors: true,
            ..Default::default()
        };
        let views = assistant_views(&self.db, models, embed).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn appointments(
        &self,
        cabinet_id: i64,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, ApiError> {
        let query = appointments::Entity::find()
            .filter(appointments::Column::CabinetId.eq(cabinet_id))
            .order_by_asc(appointments::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "cabinet appointments").await?;
        let embed = AppointmentEmbed {
            patient: true,
            doctor: true,
            consultation: true,
            ..Default::default()
        };
        let views = appointment_views(&self.db, models, embed).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn ratings(
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
}
