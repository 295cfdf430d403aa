use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

use medworld_api_schema::{
    appointments, assistants, cabinets, consultations, doctors, patients, payments,
};
use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::repository::AppointmentRepository;
use crate::domain::types::{
    AppointmentChanges, AppointmentView, DoctorView, NewAppointment, PatientView,
};
use crate::error::ApiError;

use super::{
    appointment_from_model, assistant_from_model, cabinet_from_model, consultation_from_model,
    doctor_from_model, fetch_page, patient_from_model, payment_from_model, user_from_model,
    users_by_ids,
};

/// Relation set to hydrate for a batch of appointment rows. `nested_users`
/// additionally hangs the patient's and doctor's user off them.
#[derive(Clone, Copy, Default)]
pub(crate) struct AppointmentEmbed {
    pub patient: bool,
    pub doctor: bool,
    pub cabinet: bool,
    pub consultation: bool,
    pub created_by_assistant: bool,
    pub payment: bool,
    pub nested_users: bool,
}

impl AppointmentEmbed {
    /// patient + doctor + cabinet + creating assistant, the shape write
    /// responses use.
    pub(crate) fn summary() -> Self {
        AppointmentEmbed {
            patient: true,
            doctor: true,
            cabinet: true,
            created_by_assistant: true,
            ..Default::default()
        }
    }

    /// Every relation, the shape list and detail responses use.
    pub(crate) fn detail() -> Self {
        AppointmentEmbed {
            patient: true,
            doctor: true,
            cabinet: true,
            consultation: true,
            created_by_assistant: true,
            payment: true,
            nested_users: false,
        }
    }

    /// The bulk shape: detail plus patient/doctor users.
    pub(crate) fn expanded() -> Self {
        AppointmentEmbed {
            nested_users: true,
            ..Self::detail()
        }
    }
}

pub(crate) async fn appointment_views(
    db: &DatabaseConnection,
    models: Vec<appointments::Model>,
    embed: AppointmentEmbed,
) -> Result<Vec<AppointmentView>, ApiError> {
    let patient_rows = if embed.patient {
        Some(
            models
                .load_one(patients::Entity, db)
                .await
                .context("load appointment patients")?,
        )
    } else {
        None
    };
    let doctor_rows = if embed.doctor {
        Some(
            models
                .load_one(doctors::Entity, db)
                .await
                .context("load appointment doctors")?,
        )
    } else {
        None
    };
    let cabinet_rows = if embed.cabinet {
        Some(
            models
                .load_one(cabinets::Entity, db)
                .await
                .context("load appointment cabinets")?,
        )
    } else {
        None
    };
    let consultation_rows = if embed.consultation {
        Some(
            models
                .load_one(consultations::Entity, db)
                .await
                .context("load appointment consultations")?,
        )
    } else {
        None
    };
    let assistant_rows = if embed.created_by_assistant {
        Some(
            models
                .load_one(assistants::Entity, db)
                .await
                .context("load appointment assistants")?,
        )
    } else {
        None
    };
    let payment_rows = if embed.payment {
        Some(
            models
                .load_one(payments::Entity, db)
                .await
                .context("load appointment payments")?,
        )
    } else {
        None
    };

    let user_map = if embed.nested_users {
        let mut ids = Vec::new();
        if let Some(rows) = &patient_rows {
            ids.extend(rows.iter().flatten().map(|patient| patient.user_id));
        }
        if let Some(rows) = &doctor_rows {
            ids.extend(rows.iter().flatten().map(|doctor| doctor.user_id));
        }
        Some(users_by_ids(db, ids).await?)
    } else {
        None
    };

    let mut patient_rows = patient_rows.map(Vec::into_iter);
    let mut doctor_rows = doctor_rows.map(Vec::into_iter);
    let mut cabinet_rows = cabinet_rows.map(Vec::into_iter);
    let mut consultation_rows = consultation_rows.map(Vec::into_iter);
    let mut assistant_rows = assistant_rows.map(Vec::into_iter);
    let mut payment_rows = payment_rows.map(Vec::into_iter);

    let mut views = Vec::with_capacity(models.len());
    for model in models {
        let mut view = AppointmentView::from(appointment_from_model(model)?);
        if let Some(rows) = patient_rows.as_mut() {
            let row = rows
                .next()
                .flatten()
                .context("appointment patient row missing")?;
            let mut pv = PatientView::from(patient_from_model(row));
            if let Some(map) = &user_map {
                let user = map
                    .get(&pv.patient.user_id)
                    .cloned()
                    .context("appointment patient user missing")?;
                pv.user = Some(user);
            }
            view.patient = Some(pv);
        }
        if let Some(rows) = doctor_rows.as_mut() {
            let row = rows
                .next()
                .flatten()
                .context("appointment doctor row missing")?;
            let mut dv = DoctorView::from(doctor_from_model(row));
            if let Some(map) = &user_map {
                let user = map
                    .get(&dv.doctor.user_id)
                    .cloned()
                    .context("appointment doctor user missing")?;
                dv.user = Some(user);
            }
            view.doctor = Some(dv);
        }
        if let Some(rows) = cabinet_rows.as_mut() {
            view.cabinet = Some(rows.next().flatten().map(cabinet_from_model));
        }
        if let Some(rows) = consultation_rows.as_mut() {
            view.consultation = Some(rows.next().flatten().map(consultation_from_model));
        }
        if let Some(rows) = assistant_rows.as_mut() {
            view.created_by_assistant = Some(rows.next().flatten().map(assistant_from_model));
        }
        if let Some(rows) = payment_rows.as_mut() {
            view.payment = Some(rows.next().flatten().map(payment_from_model).transpose()?);
        }
        views.push(view);
    }
    Ok(views)
}

#[derive(Clone)]
pub struct DbAppointmentRepository {
    pub db: DatabaseConnection,
}

impl DbAppointmentRepository {
    async fn page_of(
        &self,
        query: sea_orm::Select<appointments::Entity>,
        page: PageRequest,
        embed: AppointmentEmbed,
    ) -> Result<Page<AppointmentView>, ApiError> {
        let (models, total) = fetch_page(&self.db, query, page, "appointments").await?;
        let views = appointment_views(&self.db, models, embed).await?;
        Ok(Page::from_parts(views, total, page))
    }
}

impl AppointmentRepository for DbAppointmentRepository {
    async fn list(&self, page: PageRequest) -> Result<Page<AppointmentView>, ApiError> {
        let query = appointments::Entity::find().order_by_asc(appointments::Column::Id);
        self.page_of(query, page, AppointmentEmbed::detail()).await
    }

    async fn list_expanded(&self, page: PageRequest) -> Result<Page<AppointmentView>, ApiError> {
        let query = appointments::Entity::find().order_by_asc(appointments::Column::Id);
        self.page_of(query, page, AppointmentEmbed::expanded()).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<AppointmentView>, ApiError> {
        let model = appointments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find appointment by id")?;
        match model {
            Some(model) => Ok(
                appointment_views(&self.db, vec![model], AppointmentEmbed::detail())
                    .await?
                    .pop(),
            ),
            None => Ok(None),
        }
    }

    async fn find_summary(&self, id: i64) -> Result<Option<AppointmentView>, ApiError> {
        let model = appointments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find appointment by id")?;
        match model {
            Some(model) => Ok(
                appointment_views(&self.db, vec![model], AppointmentEmbed::summary())
                    .await?
                    .pop(),
            ),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: i64) -> Result<bool, ApiError> {
        let count = appointments::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .context("count appointment by id")?;
        Ok(count > 0)
    }

    async fn create(&self, new: &NewAppointment) -> Result<i64, ApiError> {
        let now = Utc::now();
        let model = appointments::ActiveModel {
            date: Set(new.date),
            status: Set(new.status.as_str().to_owned()),
            patient_id: Set(new.patient_id),
            doctor_id: Set(new.doctor_id),
            cabinet_id: Set(Some(new.cabinet_id)),
            created_by_assistant_id: Set(new.created_by_assistant_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("create appointment")?;
        Ok(model.id)
    }

    async fn update(&self, id: i64, changes: &AppointmentChanges) -> Result<(), ApiError> {
        let mut am = appointments::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(date) = changes.date {
            am.date = Set(date);
        }
        if let Some(status) = changes.status {
            am.status = Set(status.as_str().to_owned());
        }
        if let Some(created_by_assistant_id) = changes.created_by_assistant_id {
            am.created_by_assistant_id = Set(created_by_assistant_id);
        }
        am.updated_at = Set(Utc::now());
        am.update(&self.db).await.context("update appointment")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, ApiError> {
        let res = appointments::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete appointment")?;
        Ok(res.rows_affected > 0)
    }

    async fn list_by_patient(
        &self,
        patient_id: i64,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, ApiError> {
        let query = appointments::Entity::find()
            .filter(appointments::Column::PatientId.eq(patient_id))
            .order_by_asc(appointments::Column::Id);
        let embed = AppointmentEmbed {
            patient: false,
            ..AppointmentEmbed::detail()
        };
        self.page_of(query, page, embed).await
    }

    async fn list_by_doctor(
        &self,
        doctor_id: i64,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, ApiError> {
        let query = appointments::Entity::find()
            .filter(appointments::Column::DoctorId.eq(doctor_id))
            .order_by_asc(appointments::Column::Id);
        let embed = AppointmentEmbed {
            doctor: false,
            ..AppointmentEmbed::detail()
        };
        self.page_of(query, page, embed).await
    }

    async fn list_by_cabinet(
        &self,
        cabinet_id: i64,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, ApiError> {
        let query = appointments::Entity::find()
            .filter(appointments::Column::CabinetId.eq(cabinet_id))
            .order_by_asc(appointments::Column::Id);
        let embed = AppointmentEmbed {
            cabinet: false,
            ..AppointmentEmbed::detail()
        };
        self.page_of(query, page, embed).await
    }
}
