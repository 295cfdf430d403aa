use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

use medworld_api_schema::{appointments, consultations, doctors, patients};
use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::repository::ConsultationRepository;
use crate::domain::types::{
    ConsultationChanges, ConsultationView, DoctorView, NewConsultation, PatientView,
};
use crate::error::ApiError;

use super::{
    appointment_from_model, consultation_from_model, doctor_from_model, fetch_page,
    patient_from_model, unique_conflict, user_from_model, users_by_ids,
};

/// Relation set to hydrate for a batch of consultation rows. `nested_users`
/// additionally hangs the doctor's and patient's user off them.
#[derive(Clone, Copy, Default)]
pub(crate) struct ConsultationEmbed {
    pub doctor: bool,
    pub patient: bool,
    pub appointment: bool,
    pub nested_users: bool,
}

impl ConsultationEmbed {
    /// doctor + patient + appointment, the shape most responses use.
    pub(crate) fn full() -> Self {
        ConsultationEmbed {
            doctor: true,
            patient: true,
            appointment: true,
            nested_users: false,
        }
    }

    /// The bulk shape: full plus doctor/patient users.
    pub(crate) fn expanded() -> Self {
        ConsultationEmbed {
            nested_users: true,
            ..Self::full()
        }
    }
}

pub(crate) async fn consultation_views(
    db: &DatabaseConnection,
    models: Vec<consultations::Model>,
    embed: ConsultationEmbed,
) -> Result<Vec<ConsultationView>, ApiError> {
    let doctor_rows = if embed.doctor {
        Some(
            models
                .load_one(doctors::Entity, db)
                .await
                .context("load consultation doctors")?,
        )
    } else {
        None
    };
    let patient_rows = if embed.patient {
        Some(
            models
                .load_one(patients::Entity, db)
                .await
                .context("load consultation patients")?,
        )
    } else {
        None
    };
    let appointment_rows = if embed.appointment {
        Some(
            models
                .load_one(appointments::Entity, db)
                .await
                .context("load consultation appointments")?,
        )
    } else {
        None
    };

    let user_map = if embed.nested_users {
        let mut ids = Vec::new();
        if let Some(rows) = &doctor_rows {
            ids.extend(rows.iter().flatten().map(|doctor| doctor.user_id));
        }
        if let Some(rows) = &patient_rows {
            ids.extend(rows.iter().flatten().map(|patient| patient.user_id));
        }
        Some(users_by_ids(db, ids).await?)
    } else {
        None
    };

    let mut doctor_rows = doctor_rows.map(Vec::into_iter);
    let mut patient_rows = patient_rows.map(Vec::into_iter);
    let mut appointment_rows = appointment_rows.map(Vec::into_iter);

    let mut views = Vec::with_capacity(models.len());
    for model in models {
        let mut view = ConsultationView::from(consultation_from_model(model));
        if let Some(rows) = doctor_rows.as_mut() {
            let row = rows
                .next()
                .flatten()
                .context("consultation doctor row missing")?;
            let mut dv = DoctorView::from(doctor_from_model(row));
            if let Some(map) = &user_map {
                let user = map
                    .get(&dv.doctor.user_id)
                    .cloned()
                    .context("consultation doctor user missing")?;
                dv.user = Some(user);
            }
            view.doctor = Some(dv);
        }
        if let Some(rows) = patient_rows.as_mut() {
            let row = rows
                .next()
                .flatten()
                .context("consultation patient row missing")?;
            let mut pv = PatientView::from(patient_from_model(row));
            if let Some(map) = &user_map {
                let user = map
                    .get(&pv.patient.user_id)
                    .cloned()
                    .context("consultation patient user missing")?;
                pv.user = Some(user);
            }
            view.patient = Some(pv);
        }
        if let Some(rows) = appointment_rows.as_mut() {
            view.appointment = Some(
                rows.next()
                    .flatten()
                    .map(appointment_from_model)
                    .transpose()?,
            );
        }
        views.push(view);
    }
    Ok(views)
}

#[derive(Clone)]
pub struct DbConsultationRepository {
    pub db: DatabaseConnection,
}

impl ConsultationRepository for DbConsultationRepository {
    async fn list(&self, page: PageRequest) -> Result<Page<ConsultationView>, ApiError> {
        let query = consultations::Entity::find().order_by_asc(consultations::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "consultations").await?;
        let views = consultation_views(&self.db, models, ConsultationEmbed::full()).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn list_expanded(&self, page: PageRequest) -> Result<Page<ConsultationView>, ApiError> {
        let query = consultations::Entity::find().order_by_asc(consultations::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "consultations").await?;
        let views = consultation_views(&self.db, models, ConsultationEmbed::expanded()).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ConsultationView>, ApiError> {
        let model = consultations::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find consultation by id")?;
        match model {
            Some(model) => Ok(
                consultation_views(&self.db, vec![model], ConsultationEmbed::full())
                    .await?
                    .pop(),
            ),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: i64) -> Result<bool, ApiError> {
        let count = consultations::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .context("count consultation by id")?;
        Ok(count > 0)
    }

    async fn appointment_consulted(&self, appointment_id: i64) -> Result<bool, ApiError> {
        let count = consultations::Entity::find()
            .filter(consultations::Column::AppointmentId.eq(appointment_id))
            .count(&self.db)
            .await
            .context("count consultations by appointment")?;
        Ok(count > 0)
    }

    async fn create(&self, new: &NewConsultation) -> Result<i64, ApiError> {
        let now = Utc::now();
        let model = consultations::ActiveModel {
            doctor_id: Set(new.doctor_id),
            patient_id: Set(new.patient_id),
            appointment_id: Set(Some(new.appointment_id)),
            notes: Set(new.notes.clone()),
            prescriptions: Set(new.prescriptions.clone()),
            attachments: Set(new.attachments.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|err| unique_conflict(err, "Consultation"))?;
        Ok(model.id)
    }

    async fn update(&self, id: i64, changes: &ConsultationChanges) -> Result<(), ApiError> {
        let mut am = consultations::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(notes) = &changes.notes {
            am.notes = Set(notes.clone());
        }
        if let Some(prescriptions) = &changes.prescriptions {
            am.prescriptions = Set(prescriptions.clone());
        }
        if let Some(attachments) = &changes.attachments {
            am.attachments = Set(attachments.clone());
        }
        am.updated_at = Set(Utc::now());
        am.update(&self.db).await.context("update consultation")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, ApiError> {
        let res = consultations::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete consultation")?;
        Ok(res.rows_affected > 0)
    }

    async fn list_by_patient(
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

    async fn list_by_doctor(
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
}
