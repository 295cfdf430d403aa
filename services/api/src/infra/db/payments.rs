use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

use medworld_api_schema::{appointments, cabinets, doctors, patients, payments};
use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::repository::PaymentRepository;
use crate::domain::types::{NewPayment, PaymentChanges, PaymentView};
use crate::error::ApiError;

use super::{
    appointment_from_model, cabinet_from_model, doctor_from_model, fetch_page, patient_from_model,
    payment_from_model,
};

/// Relation set to hydrate for a batch of payment rows.
#[derive(Clone, Copy, Default)]
pub(crate) struct PaymentEmbed {
    pub patient: bool,
    pub doctor: bool,
    pub cabinet: bool,
    pub appointment: bool,
}

impl PaymentEmbed {
    /// patient + doctor + cabinet + appointment, the shape unscoped
    /// responses use.
    pub(crate) fn full() -> Self {
        PaymentEmbed {
            patient: true,
            doctor: true,
            cabinet: true,
            appointment: true,
        }
    }
}

pub(crate) async fn payment_views(
    db: &DatabaseConnection,
    models: Vec<payments::Model>,
    embed: PaymentEmbed,
) -> Result<Vec<PaymentView>, ApiError> {
    let patient_rows = if embed.patient {
        Some(
            models
                .load_one(patients::Entity, db)
                .await
                .context("load payment patients")?,
        )
    } else {
        None
    };
    let doctor_rows = if embed.doctor {
        Some(
            models
                .load_one(doctors::Entity, db)
                .await
                .context("load payment doctors")?,
        )
    } else {
        None
    };
    let cabinet_rows = if embed.cabinet {
        Some(
            models
                .load_one(cabinets::Entity, db)
                .await
                .context("load payment cabinets")?,
        )
    } else {
        None
    };
    let appointment_rows = if embed.appointment {
        Some(
            models
                .load_one(appointments::Entity, db)
                .await
                .context("load payment appointments")?,
        )
    } else {
        None
    };

    let mut patient_rows = patient_rows.map(Vec::into_iter);
    let mut doctor_rows = doctor_rows.map(Vec::into_iter);
    let mut cabinet_rows = cabinet_rows.map(Vec::into_iter);
    let mut appointment_rows = appointment_rows.map(Vec::into_iter);

    let mut views = Vec::with_capacity(models.len());
    for model in models {
        let mut view = PaymentView::from(payment_from_model(model)?);
        if let Some(rows) = patient_rows.as_mut() {
            let row = rows
                .next()
                .flatten()
                .context("payment patient row missing")?;
            view.patient = Some(patient_from_model(row));
        }
        if let Some(rows) = doctor_rows.as_mut() {
            let row = rows
                .next()
                .flatten()
                .context("payment doctor row missing")?;
            view.doctor = Some(doctor_from_model(row));
        }
        if let Some(rows) = cabinet_rows.as_mut() {
            let row = rows
                .next()
                .flatten()
                .context("payment cabinet row missing")?;
            view.cabinet = Some(cabinet_from_model(row));
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
pub struct DbPaymentRepository {
    pub db: DatabaseConnection,
}

impl DbPaymentRepository {
    async fn page_of(
        &self,
        query: sea_orm::Select<payments::Entity>,
        page: PageRequest,
        embed: PaymentEmbed,
    ) -> Result<Page<PaymentView>, ApiError> {
        let (models, total) = fetch_page(&self.db, query, page, "payments").await?;
        let views = payment_views(&self.db, models, embed).await?;
        Ok(Page::from_parts(views, total, page))
    }
}

impl PaymentRepository for DbPaymentRepository {
    async fn list(&self, page: PageRequest) -> Result<Page<PaymentView>, ApiError> {
        let query = payments::Entity::find().order_by_asc(payments::Column::Id);
        self.page_of(query, page, PaymentEmbed::full()).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PaymentView>, ApiError> {
        let model = payments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find payment by id")?;
        match model {
            Some(model) => Ok(payment_views(&self.db, vec![model], PaymentEmbed::full())
                .await?
                .pop()),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: i64) -> Result<bool, ApiError> {
        let count = payments::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .context("count payment by id")?;
        Ok(count > 0)
    }

    async fn create(&self, new: &NewPayment) -> Result<i64, ApiError> {
        let now = Utc::now();
        let model = payments::ActiveModel {
            patient_id: Set(new.patient_id),
            doctor_id: Set(new.doctor_id),
            cabinet_id: Set(new.cabinet_id),
            appointment_id: Set(new.appointment_id),
            amount: Set(new.amount),
            status: Set(new.status.as_str().to_owned()),
            payment_method: Set(new.payment_method.clone()),
            transaction_date: Set(new.transaction_date),
            notes: Set(new.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("create payment")?;
        Ok(model.id)
    }

    async fn update(&self, id: i64, changes: &PaymentChanges) -> Result<(), ApiError> {
        let mut am = payments::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(amount) = changes.amount {
            am.amount = Set(amount);
        }
        if let Some(status) = changes.status {
            am.status = Set(status.as_str().to_owned());
        }
        if let Some(payment_method) = &changes.payment_method {
            am.payment_method = Set(payment_method.clone());
        }
        if let Some(transaction_date) = changes.transaction_date {
            am.transaction_date = Set(transaction_date);
        }
        if let Some(notes) = &changes.notes {
            am.notes = Set(notes.clone());
        }
        am.updated_at = Set(Utc::now());
        am.update(&self.db).await.context("update payment")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, ApiError> {
        let res = payments::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete payment")?;
        Ok(res.rows_affected > 0)
    }

    async fn list_by_patient(
        &self,
        patient_id: i64,
        page: PageRequest,
    ) -> Result<Page<PaymentView>, ApiError> {
        let query = payments::Entity::find()
            .filter(payments::Column::PatientId.eq(patient_id))
            .order_by_asc(payments::Column::Id);
        let embed = PaymentEmbed {
            patient: false,
            ..PaymentEmbed::full()
        };
        self.page_of(query, page, embed).await
    }

    async fn list_by_doctor(
        &self,
        doctor_id: i64,
        page: PageRequest,
    ) -> Result<Page<PaymentView>, ApiError> {
        let query = payments::Entity::find()
            .filter(payments::Column::DoctorId.eq(doctor_id))
            .order_by_asc(payments::Column::Id);
        let embed = PaymentEmbed {
            doctor: false,
            ..PaymentEmbed::full()
        };
        self.page_of(query, page, embed).await
    }

    async fn list_by_cabinet(
        &self,
        cabinet_id: i64,
        page: PageRequest,
    ) -> Result<Page<PaymentView>, ApiError> {
        let query = payments::Entity::find()
            .filter(payments::Column::CabinetId.eq(cabinet_id))
            .order_by_asc(payments::Column::Id);
        let embed = PaymentEmbed {
            cabinet: false,
            ..PaymentEmbed::full()
        };
        self.page_of(query, page, embed).await
    }

    async fn list_by_status(
        &self,
        status: &str,
        page: PageRequest,
    ) -> Result<Page<PaymentView>, ApiError> {
        let query = payments::Entity::find()
            .filter(payments::Column::Status.eq(status))
            .order_by_asc(payments::Column::Id);
        self.page_of(query, page, PaymentEmbed::full()).await
    }
}
