use anyhow::Context as _;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, Query};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

use medworld_api_schema::{
    appointments, assistant_doctor, assistants, cabinets, consultations, doctors, patients,
    payments, users,
};
use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::repository::DoctorRepository;
use crate::domain::types::{
    AppointmentView, AssistantView, ConsultationView, DoctorChanges, DoctorSearchFilter,
    DoctorView, NewDoctor, PatientView,
};
use crate::error::ApiError;

use super::appointments::{AppointmentEmbed, appointment_views};
use super::assistants::{AssistantEmbed, assistant_views};
use super::consultations::{ConsultationEmbed, consultation_views};
use super::patients::{PatientEmbed, patient_views};
use super::{
    appointment_from_model, assistant_from_model, cabinet_from_model, consultation_from_model,
    doctor_from_model, fetch_page, payment_from_model, unique_conflict, user_from_model,
};

/// Doctors at or above this many appointments on file stop matching
/// `available=true` in search.
const AVAILABILITY_APPOINTMENT_CAP: i32 = 20;

/// Relation set to hydrate for a batch of doctor rows.
#[derive(Clone, Copy, Default)]
pub(crate) struct DoctorEmbed {
    pub user: bool,
    pub cabinet: bool,
    pub assistants: bool,
    pub appointments: bool,
    pub consultations: bool,
    pub payments: bool,
}

impl DoctorEmbed {
    /// user + cabinet + assistants, the shape write responses use.
    pub(crate) fn summary() -> Self {
        DoctorEmbed {
            user: true,
            cabinet: true,
            assistants: true,
            ..Default::default()
        }
    }

    /// Every relation, the shape list and detail responses use.
    pub(crate) fn detail() -> Self {
        DoctorEmbed {
            user: true,
            cabinet: true,
            assistants: true,
            appointments: true,
            consultations: true,
            payments: true,
        }
    }
}

pub(crate) async fn doctor_views(
    db: &DatabaseConnection,
    models: Vec<doctors::Model>,
    embed: DoctorEmbed,
) -> Result<Vec<DoctorView>, ApiError> {
    let user_rows = if embed.user {
        Some(
            models
                .load_one(users::Entity, db)
                .await
                .context("load doctor users")?,
        )
    } else {
        None
    };
    let cabinet_rows = if embed.cabinet {
        Some(
            models
                .load_one(cabinets::Entity, db)
                .await
                .context("load doctor cabinets")?,
        )
    } else {
        None
    };
    let assistant_rows = if embed.assistants {
        Some(
            models
                .load_many_to_many(assistants::Entity, assistant_doctor::Entity, db)
                .await
                .context("load doctor assistants")?,
        )
    } else {
        None
    };
    let appointment_rows = if embed.appointments {
        Some(
            models
                .load_many(appointments::Entity, db)
                .await
                .context("load doctor appointments")?,
        )
    } else {
        None
    };
    let consultation_rows = if embed.consultations {
        Some(
            models
                .load_many(consultations::Entity, db)
                .await
                .context("load doctor consultations")?,
        )
    } else {
        None
    };
    let payment_rows = if embed.payments {
        Some(
            models
                .load_many(payments::Entity, db)
                .await
                .context("load doctor payments")?,
        )
    } else {
        None
    };

    let mut user_rows = user_rows.map(Vec::into_iter);
    let mut cabinet_rows = cabinet_rows.map(Vec::into_iter);
    let mut assistant_rows = assistant_rows.map(Vec::into_iter);
    let mut appointment_rows = appointment_rows.map(Vec::into_iter);
    let mut consultation_rows = consultation_rows.map(Vec::into_iter);
    let mut payment_rows = payment_rows.map(Vec::into_iter);

    let mut views = Vec::with_capacity(models.len());
    for model in models {
        let mut view = DoctorView::from(doctor_from_model(model));
        if let Some(rows) = user_rows.as_mut() {
            let row = rows.next().flatten().context("doctor user row missing")?;
            view.user = Some(user_from_model(row)?);
        }
        if let Some(rows) = cabinet_rows.as_mut() {
            view.cabinet = Some(rows.next().flatten().map(cabinet_from_model));
        }
        if let Some(rows) = assistant_rows.as_mut() {
            let linked = rows.next().unwrap_or_default();
            view.assistants = Some(linked.into_iter().map(assistant_from_model).collect());
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
        if let Some(rows) = consultation_rows.as_mut() {
            let linked = rows.next().unwrap_or_default();
            view.consultations = Some(linked.into_iter().map(consultation_from_model).collect());
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
pub struct DbDoctorRepository {
    pub db: DatabaseConnection,
}

impl DoctorRepository for DbDoctorRepository {
    async fn list(&self, page: PageRequest) -> Result<Page<DoctorView>, ApiError> {
        let query = doctors::Entity::find().order_by_asc(doctors::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "doctors").await?;
        let views = doctor_views(&self.db, models, DoctorEmbed::detail()).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn list_summaries(&self, page: PageRequest) -> Result<Page<DoctorView>, ApiError> {
        let query = doctors::Entity::find().order_by_asc(doctors::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "doctors").await?;
        let views = doctor_views(&self.db, models, DoctorEmbed::summary()).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<DoctorView>, ApiError> {
        let model = doctors::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find doctor by id")?;
        match model {
            Some(model) => Ok(doctor_views(&self.db, vec![model], DoctorEmbed::detail())
                .await?
                .pop()),
            None => Ok(None),
        }
    }

    async fn find_summary(&self, id: i64) -> Result<Option<DoctorView>, ApiError> {
        let model = doctors::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find doctor by id")?;
        match model {
            Some(model) => Ok(doctor_views(&self.db, vec![model], DoctorEmbed::summary())
                .await?
                .pop()),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: i64) -> Result<bool, ApiError> {
        let count = doctors::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .context("count doctor by id")?;
        Ok(count > 0)
    }

    async fn search(
        &self,
        filter: &DoctorSearchFilter,
        page: PageRequest,
    ) -> Result<Page<DoctorView>, ApiError> {
        let mut query = doctors::Entity::find();
        if let Some(speciality) = &filter.speciality {
            query = query.filter(doctors::Column::Speciality.eq(speciality));
        }
        if let Some(cabinet_id) = filter.cabinet_id {
            query = query.filter(doctors::Column::CabinetId.eq(cabinet_id));
        }
        if let Some(min) = filter.price_min {
            query = query.filter(doctors::Column::ConsultationPrice.gte(min));
        }
        if let Some(max) = filter.price_max {
            query = query.filter(doctors::Column::ConsultationPrice.lte(max));
        }
        if filter.available {
            let over_cap = Query::select()
                .column(appointments::Column::DoctorId)
                .from(appointments::Entity)
                .group_by_col(appointments::Column::DoctorId)
                .and_having(
                    Expr::expr(Func::count(Expr::col(appointments::Column::Id)))
                        .gte(AVAILABILITY_APPOINTMENT_CAP),
                )
                .to_owned();
            query = query.filter(doctors::Column::Id.not_in_subquery(over_cap));
        }
        let query = query.order_by_asc(doctors::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "doctors").await?;
        let embed = DoctorEmbed {
            payments: false,
            ..DoctorEmbed::detail()
        };
        let views = doctor_views(&self.db, models, embed).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn create(&self, new: &NewDoctor) -> Result<i64, ApiError> {
        let now = Utc::now();
        let model = doctors::ActiveModel {
            user_id: Set(new.user_id),
            cabinet_id: Set(Some(new.cabinet_id)),
            speciality: Set(Some(new.speciality.clone())),
            career_start: Set(Some(new.career_start)),
            consultation_price: Set(new.consultation_price),
            consultation_duration: Set(new.consultation_duration),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|err| unique_conflict(err, "Doctor"))?;
        Ok(model.id)
    }

    async fn update(&self, id: i64, changes: &DoctorChanges) -> Result<(), ApiError> {
        let mut am = doctors::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(cabinet_id) = changes.cabinet_id {
            am.cabinet_id = Set(Some(cabinet_id));
        }
        if let Some(speciality) = &changes.speciality {
            am.speciality = Set(Some(speciality.clone()));
        }
        if let Some(career_start) = changes.career_start {
            am.career_start = Set(Some(career_start));
        }
        if let Some(price) = changes.consultation_price {
            am.consultation_price = Set(price);
        }
        if let Some(duration) = changes.consultation_duration {
            am.consultation_duration = Set(duration);
        }
        am.updated_at = Set(Utc::now());
        am.update(&self.db).await.context("update doctor")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, ApiError> {
        let res = doctors::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete doctor")?;
        Ok(res.rows_affected > 0)
    }

    async fn appointments(
        &self,
        doctor_id: i64,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, ApiError> {
        let query = appointments::Entity::find()
            .filter(appointments::Column::DoctorId.eq(doctor_id))
            .order_by_asc(appointments::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "doctor appointments").await?;
        let embed = AppointmentEmbed {
            patient: true,
            cabinet: true,
            consultation: true,
            ..Default::default()
        };
        let views = appointment_views(&self.db, models, embed).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn consultations(
        &self,
        doctor_id: i64,
        page: PageRequest,
    ) -> Result<Page<ConsultationView>, ApiError> {
        let query = consultations::Entity::find()
            .filter(consultations::Column::DoctorId.eq(doctor_id))
            .order_by_asc(consultations::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "doctor consultations").await?;
        let embed = ConsultationEmbed {
            patient: true,
            appointment: true,
            ..Default::default()
        };
        let views = consultation_views(&self.db, models, embed).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn assistants(
        &self,
        doctor_id: i64,
        page: PageRequest,
    ) -> Result<Page<AssistantView>, ApiError> {
        let linked = Query::select()
            .column(assistant_doctor::Column::AssistantId)
            .from(assistant_doctor::Entity)
            .and_where(assistant_doctor::Column::DoctorId.eq(doctor_id))
            .to_owned();
        let query = assistants::Entity::find()
            .filter(assistants::Column::Id.in_subquery(linked))
            .order_by_asc(assistants::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "doctor assistants").await?;
        let embed = AssistantEmbed {
            user: true,
            cabinet: true,
            ..Default::default()
        };
        let views = assistant_views(&self.db, models, embed).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn patients(
        &self,
        doctor_id: i64,
        page: PageRequest,
    ) -> Result<Page<PatientView>, ApiError> {
        let with_appointments = Query::select()
            .distinct()
            .column(appointments::Column::PatientId)
            .from(appointments::Entity)
            .and_where(appointments::Column::DoctorId.eq(doctor_id))
            .to_owned();
        let query = patients::Entity::find()
            .filter(patients::Column::Id.in_subquery(with_appointments))
            .order_by_asc(patients::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "doctor patients").await?;
        let embed = PatientEmbed {
            user: true,
            appointments: true,
            consultations: true,
            ..Default::default()
        };
        let views = patient_views(&self.db, models, embed).await?;
        Ok(Page::from_parts(views, total, page))
    }
}
