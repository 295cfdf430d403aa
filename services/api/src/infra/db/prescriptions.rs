use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait,
    QueryFilter, QueryOrder,
};

use medworld_api_schema::{consultations, doctors, patients, prescriptions};
use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::repository::PrescriptionRepository;
use crate::domain::types::{
    NewPrescription, Prescription, PrescriptionChanges, PrescriptionView,
};
use crate::error::ApiError;

use super::{
    consultation_from_model, doctor_from_model, fetch_page, patient_from_model,
    prescription_from_model,
};

/// Relation set to hydrate for a batch of prescription rows.
#[derive(Clone, Copy, Default)]
pub(crate) struct PrescriptionEmbed {
    pub consultation: bool,
    pub patient: bool,
    pub doctor: bool,
}

impl PrescriptionEmbed {
    /// consultation + patient + doctor, the shape unscoped responses use.
    pub(crate) fn full() -> Self {
        PrescriptionEmbed {
            consultation: true,
            patient: true,
            doctor: true,
        }
    }
}

pub(crate) async fn prescription_views(
    db: &DatabaseConnection,
    models: Vec<prescriptions::Model>,
    embed: PrescriptionEmbed,
) -> Result<Vec<PrescriptionView>, ApiError> {
    let consultation_rows = if embed.consultation {
        Some(
            models
                .load_one(consultations::Entity, db)
                .await
                .context("load prescription consultations")?,
        )
    } else {
        None
    };
    let patient_rows = if embed.patient {
        Some(
            models
                .load_one(patients::Entity, db)
                .await
                .context("load prescription patients")?,
        )
    } else {
        None
    };
    let doctor_rows = if embed.doctor {
        Some(
            models
                .load_one(doctors::Entity, db)
                .await
                .context("load prescription doctors")?,
        )
    } else {
        None
    };

    let mut consultation_rows = consultation_rows.map(Vec::into_iter);
    let mut patient_rows = patient_rows.map(Vec::into_iter);
    let mut doctor_rows = doctor_rows.map(Vec::into_iter);

    let mut views = Vec::with_capacity(models.len());
    for model in models {
        let mut view = PrescriptionView::from(prescription_from_model(model)?);
        if let Some(rows) = consultation_rows.as_mut() {
            view.consultation = Some(rows.next().flatten().map(consultation_from_model));
        }
        if let Some(rows) = patient_rows.as_mut() {
            let row = rows
                .next()
                .flatten()
                .context("prescription patient row missing")?;
            view.patient = Some(patient_from_model(row));
        }
        if let Some(rows) = doctor_rows.as_mut() {
            let row = rows
                .next()
                .flatten()
                .context("prescription doctor row missing")?;
            view.doctor = Some(doctor_from_model(row));
        }
        views.push(view);
    }
    Ok(views)
}

#[derive(Clone)]
pub struct DbPrescriptionRepository {
    pub db: DatabaseConnection,
}

impl PrescriptionRepository for DbPrescriptionRepository {
    async fn list(&self, page: PageRequest) -> Result<Page<PrescriptionView>, ApiError> {
        let query = prescriptions::Entity::find().order_by_asc(prescriptions::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "prescriptions").await?;
        let views = prescription_views(&self.db, models, PrescriptionEmbed::full()).await?;
        Ok(Page::from_parts(views, total, page))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PrescriptionView>, ApiError> {
        let model = prescriptions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find prescription by id")?;
        match model {
            Some(model) => Ok(
                prescription_views(&self.db, vec![model], PrescriptionEmbed::full())
                    .await?
                    .pop(),
            ),
            None => Ok(None),
        }
    }

    async fn find_base(&self, id: i64) -> Result<Option<Prescription>, ApiError> {
        let model = prescriptions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find prescription by id")?;
        match model {
            Some(model) => Ok(Some(prescription_from_model(model)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, new: &NewPrescription) -> Result<i64, ApiError> {
        let now = Utc::now();
        let model = prescriptions::ActiveModel {
            consultation_id: Set(Some(new.consultation_id)),
            patient_id: Set(new.patient_id),
            doctor_id: Set(new.doctor_id),
            prescription_date: Set(new.prescription_date),
            status: Set(new.status.as_str().to_owned()),
            medications: Set(new.medications.clone()),
            general_instructions: Set(new.general_instructions.clone()),
            valid_until: Set(new.valid_until),
            refills_allowed: Set(new.refills_allowed),
            refills_used: Set(new.refills_used),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("create prescription")?;
        Ok(model.id)
    }

    async fn update(&self, id: i64, changes: &PrescriptionChanges) -> Result<(), ApiError> {
        let mut am = prescriptions::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(status) = changes.status {
            am.status = Set(status.as_str().to_owned());
        }
        if let Some(medications) = &changes.medications {
            am.medications = Set(medications.clone());
        }
        if let Some(general_instructions) = &changes.general_instructions {
            am.general_instructions = Set(general_instructions.clone());
        }
        if let Some(valid_until) = changes.valid_until {
            am.valid_until = Set(valid_until);
        }
        if let Some(refills_allowed) = changes.refills_allowed {
            am.refills_allowed = Set(refills_allowed);
        }
        if let Some(refills_used) = changes.refills_used {
            am.refills_used = Set(refills_used);
        }
        am.updated_at = Set(Utc::now());
        am.update(&self.db).await.context("update prescription")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, ApiError> {
        let res = prescriptions::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete prescription")?;
        Ok(res.rows_affected > 0)
    }

    async fn list_by_patient(
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

    async fn list_by_doctor(
        &self,
        doctor_id: i64,
        page: PageRequest,
    ) -> Result<Page<PrescriptionView>, ApiError> {
        let query = prescriptions::Entity::find()
            .filter(prescriptions::Column::DoctorId.eq(doctor_id))
            .order_by_asc(prescriptions::Column::Id);
        let (models, total) = fetch_page(&self.db, query, page, "doctor prescriptions").await?;
        let embed = PrescriptionEmbed {
            patient: true,
            consultation: true,
            ..Default::default()
        };
        let views = prescription_views(&self.db, models, embed).await?;
        Ok(Page::from_parts(views, total, page))
    }
}
