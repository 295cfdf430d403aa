use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

use medworld_api_schema::{
    appointments, consultations, patients, payments, prescriptions, ratings, users,
};
use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::repository::PatientRepository;
use crate::domain::types::{
    AppointmentView, ConsultationView, NewPatient, PatientChanges, PatientView, PrescriptionView,
};
use crate::error::ApiError;

use super::appointments::{AppointmentEmbed, appointment_views};
use super::consultations::{ConsultationEmbed, consultation_views};
use super::prescriptions::{PrescriptionEmbed, prescription_views};
use super::{
    appointment_from_model, consultation_from_model, fetch_page, patient_from_model,
    payment_from_model, prescription_from_model, rating_from_model, unique_conflict,
    user_from_model,
};

/// Relation set to hydrate for a batch of patient rows.
#[derive(Clone, Copy, Default)]
pub(crate) struct PatientEmbed {
    pub user: bool,
    pub appointments: bool,
    pub consultations: bool,
    pub prescriptions: bool,
    pub ratings: bool,
    pub payments: bool,
}

impl PatientEmbed {
    /// user + appointments + consultations, the shape write responses use.
    pub(crate) fn summary() -> Self {
        PatientEmbed {
            user: true,
            appointments: true,
            consultations: true,
            ..Default::default()
        }
    }

    /// Every relation, the shape list and detail responses use.
    pub(crate) fn detail() -> Self {
        PatientEmbed {
            user: true,
            appointments: true,
            consultations: true,
            prescriptions: true,
            ratings: true,
            payments: true,
        }
    }
}

pub(crate) async fn patient_views(
    db: &DatabaseConnection,
    models: Vec<patients::Model>,
    embed: PatientEmbed,
) -> Result<Vec<PatientView>, ApiError> {
    let user_rows = if embed.user {
        Some(
            models
                .load_one(users::Entity, db)
                .await
                .context("load patient users")?,
        )
    } else {
        None
    };
    let appointment_rows = if embed.appointments {
        Some(
            models
                .load_many(appointments::Entity, db)
                .await
                .context("load patient appointments")?,
        )
    } else {
        None
    };
    let consultation_rows = if embed.consultations {
        Some(
            models
                .load_many(consultations::Entity, db)
                .await
                .context("load patient consultations")?,
        )
    } else {
        None
    };
    let prescription_rows = if embed.prescriptions {
        Some(
            models
                .load_many(prescriptions::Entity, db)
                .await
                .context("load patient prescriptions")?,
        )
    } else {
        None
    };
    let rating_rows = if embed.ratings {
        Some(
            models
                .load_many(ratings::Entity, db)
                .await
                .context("load patient ratings")?,
        )
    } else {
        None
    };
    let payment_rows = if embed.payments {
        Some(
            models
                .load_many(payments::Entity, db)
                .await
                .context("load patient payments")?,
        )
    } else {
        None
    };

    let mut user_rows = user_rows.map(Vec::into_iter);
    let mut appointment_rows = appointment_rows.map(Vec::into_iter);
    let mut consultation_rows = consultation_rows.map(Vec::into_iter);
    let mut prescription_rows = prescription_rows.map(Vec::into_iter);
    let mut rating_rows = rating_rows.map(Vec::into_iter);
    let mut payment_rows = payment_rows.map(Vec::into_iter);

    let mut views = Vec::with_capacity(models.len());
    for model in models {
        let mut view = PatientView::from(patient_from_model(model));
        if let Some(rows) = user_rows.as_mut() {
            let row = rows.next().flatten().context("patient user row missing")?;
            view.user = Some(user_from_model(row)?);
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
        if let Some(rows) = prescription_rows.as_mut() {
            let linked = rows.next().unwrap_or_default();
            view.prescriptions = Some(
                linked
                    .into_iter()
                    .map(prescription_from_model)
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
pub struct DbPatientRepository {
    pub db: DatabaseConnection,
}

impl PatientRepository for DbPatientRepository {
    async fn list(&self, page: PageRequest) -> Result<Page<PatientView>, ApiError> {
        let query = patients::Entity::find().order_by_asc(patients::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "patients").await?;
        let views = patient_views(&self.db, models, PatientEmbed::detail()).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn list_summaries(&self, page: PageRequest) -> Result<Page<PatientView>, ApiError> {
        let query = patients::Entity::find().order_by_asc(patients::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "patients").await?;
        let views = patient_views(&self.db, models, PatientEmbed::summary()).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PatientView>, ApiError> {
        let model = patients::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find patient by id")?;
        match model {
            Some(model) => Ok(patient_views(&self.db, vec![model], PatientEmbed::detail())
                .await?
                .pop()),
            None => Ok(None),
        }
    }

    async fn find_summary(&self, id: i64) -> Result<Option<PatientView>, ApiError> {
        let model = patients::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find patient by id")?;
        match model {
            Some(model) => Ok(patient_views(&self.db, vec![model], PatientEmbed::summary())
                .await?
                .pop()),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: i64) -> Result<bool, ApiError> {
        let count = patients::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .context("count patient by id")?;
        Ok(count > 0)
    }

    async fn create(&self, new: &NewPatient) -> Result<i64, ApiError> {
        let now = Utc::now();
        let model = patients::ActiveModel {
            user_id: Set(new.user_id),
            emergency_contact: Set(new.emergency_contact.clone()),
            blood_type: Set(new.blood_type.clone()),
            weight: Set(new.weight),
            medical_history: Set(new.medical_history.clone()),
            allergies: Set(new.allergies.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|err| unique_conflict(err, "Patient"))?;
        Ok(model.id)
    }

    async fn update(&self, id: i64, changes: &PatientChanges) -> Result<(), ApiError> {
        let mut am = patients::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(emergency_contact) = &changes.emergency_contact {
            am.emergency_contact = Set(emergency_contact.clone());
        }
        if let Some(blood_type) = &changes.blood_type {
            am.blood_type = Set(blood_type.clone());
        }
        if let Some(weight) = changes.weight {
            am.weight = Set(weight);
        }
        if let Some(medical_history) = &changes.medical_history {
            am.medical_history = Set(medical_history.clone());
        }
        if let Some(allergies) = &changes.allergies {
            am.allergies = Set(allergies.clone());
        }
        am.updated_at = Set(Utc::now());
        am.update(&self.db).await.context("update patient")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, ApiError> {
        let res = patients::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete patient")?;
        Ok(res.rows_affected > 0)
    }

    async fn appointments(
        &self,
        patient_id: i64,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, ApiError> {
        let query = appointments::Entity::find()
            .filter(appointments::Column::PatientId.eq(patient_id))
            .order_by_asc(appointments::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "patient appointments").await?;
        let embed = AppointmentEmbed {
            doctor: true,
            cabinet: true,
            consultation: true,
            ..Default::default()
        };
        let views = appointment_views(&self.db, models, embed).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn consultations(
        &self,
        patient_id: i64,
        page: PageRequest,
    ) -> Result<Page<ConsultationView>, ApiError> {
        let query = consultations::Entity::find()
            .filter(consultations::Column::PatientId.eq(patient_id))
            .order_by_asc(consultations::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "patient consultations").await?;
        let embed = ConsultationEmbed {
            doctor: true,
            appointment: true,
            ..Default::default()
        };
        let views = consultation_views(&self.db, models, embed).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn prescriptions(
        &self,
        patient_id: i64,
        page: PageRequest,
    ) -> Result<Page<PrescriptionView>, ApiError> {
        let query = prescriptions::Entity::find()
            .filter(prescriptions::Column::PatientId.eq(patient_id))
            .order_by_asc(prescriptions::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "patient prescriptions").await?;
        let embed = PrescriptionEmbed {
            doctor: true,
            consultation: true,
            ..Default::default()
        };
        let views = prescription_views(&self.db, models, embed).await?;
        Ok(Page::from_parts(views, total, page))
    }
}
