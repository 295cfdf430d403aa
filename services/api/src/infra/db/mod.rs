//! sea-orm repositories.
//!
//! One module per aggregate; shared row-to-domain converters live here so a
//! repository can hydrate rows of a neighbouring aggregate when it embeds
//! them. Status and role columns are stored as strings and parsed on the way
//! out; a row that fails to parse is corrupt data and surfaces as an internal
//! error rather than a panic.

mod appointments;
mod assistants;
mod cabinets;
mod consultations;
mod doctors;
mod messages;
mod patients;
mod payments;
mod prescriptions;
mod ratings;
mod refs;
mod tokens;
mod users;

pub use appointments::DbAppointmentRepository;
pub use assistants::DbAssistantRepository;
pub use cabinets::DbCabinetRepository;
pub use consultations::DbConsultationRepository;
pub use doctors::DbDoctorRepository;
pub use messages::DbMessageRepository;
pub use patients::DbPatientRepository;
pub use payments::DbPaymentRepository;
pub use prescriptions::DbPrescriptionRepository;
pub use ratings::DbRatingRepository;
pub use refs::DbRefLookup;
pub use tokens::DbTokenRepository;
pub use users::DbUserRepository;

use std::collections::HashMap;

use anyhow::Context as _;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, Select,
    SqlErr,
};

use medworld_api_schema as schema;
use medworld_domain::pagination::PageRequest;
use medworld_domain::role::Role;

use crate::domain::types::{
    Appointment, AppointmentStatus, Assistant, Cabinet, Consultation, Doctor, Message,
    MessageStatus, Patient, Payment, PaymentStatus, Prescription, PrescriptionStatus, Rating, User,
};
use crate::error::ApiError;

// ── Shared query helpers ─────────────────────────────────────────────────────

/// Runs `query` as one page plus an unpaged count. `page` is expected to be
/// clamped already; a zero page index is treated as the first page.
pub(crate) async fn fetch_page<E>(
    db: &DatabaseConnection,
    query: Select<E>,
    page: PageRequest,
    entity: &'static str,
) -> Result<(Vec<E::Model>, u64), ApiError>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    let paginator = query.paginate(db, u64::from(page.per_page));
    let total = paginator
        .num_items()
        .await
        .with_context(|| format!("count {entity}"))?;
    let models = paginator
        .fetch_page(u64::from(page.page.saturating_sub(1)))
        .await
        .with_context(|| format!("list {entity}"))?;
    Ok((models, total))
}

/// Batch-loads users keyed by id. Used where rows point at users through
/// more than one foreign key (message sender/receiver) or where the loaded
/// rows are nested too deep for a loader pass.
pub(crate) async fn users_by_ids(
    db: &DatabaseConnection,
    mut ids: Vec<i64>,
) -> Result<HashMap<i64, User>, ApiError> {
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let models = schema::users::Entity::find()
        .filter(schema::users::Column::Id.is_in(ids))
        .all(db)
        .await
        .context("load users by id")?;
    let mut map = HashMap::with_capacity(models.len());
    for model in models {
        let user = user_from_model(model)?;
        map.insert(user.id, user);
    }
    Ok(map)
}

/// Maps a duplicate-key insert to a conflict; anything else stays internal.
pub(crate) fn unique_conflict(err: DbErr, entity: &'static str) -> ApiError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ApiError::Conflict(entity),
        _ => ApiError::Internal(anyhow::Error::new(err)),
    }
}

// ── Row converters ───────────────────────────────────────────────────────────

pub(crate) fn user_from_model(model: schema::users::Model) -> anyhow::Result<User> {
    let role = Role::parse(&model.role)
        .with_context(|| format!("user {}: unknown role {:?}", model.id, model.role))?;
    Ok(User {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        email_verified_at: model.email_verified_at,
        phone_number: model.phone_number,
        avatar_url: model.avatar_url,
        address: model.address,
        gender: model.gender,
        date_of_birth: model.date_of_birth,
        role,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

pub(crate) fn doctor_from_model(model: schema::doctors::Model) -> Doctor {
    Doctor {
        id: model.id,
        user_id: model.user_id,
        speciality: model.speciality,
        career_start: model.career_start,
        cabinet_id: model.cabinet_id,
        consultation_price: model.consultation_price,
        consultation_duration: model.consultation_duration,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub(crate) fn patient_from_model(model: schema::patients::Model) -> Patient {
    Patient {
        id: model.id,
        user_id: model.user_id,
        emergency_contact: model.emergency_contact,
        blood_type: model.blood_type,
        weight: model.weight,
        medical_history: model.medical_history,
        allergies: model.allergies,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub(crate) fn assistant_from_model(model: schema::assistants::Model) -> Assistant {
    Assistant {
        id: model.id,
        user_id: model.user_id,
        cabinet_id: model.cabinet_id,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub(crate) fn cabinet_from_model(model: schema::cabinets::Model) -> Cabinet {
    Cabinet {
        id: model.id,
        name: model.name,
        phone: model.phone,
        admin_id: model.admin_id,
        image: model.image,
        access_handicap: model.access_handicap,
        has_parking: model.has_parking,
        has_wifi: model.has_wifi,
        accepts_urgent: model.accepts_urgent,
        accepts_insurance: model.accepts_insurance,
        opening_hours: model.opening_hours,
        location_lat: model.location_lat,
        location_lng: model.location_lng,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub(crate) fn appointment_from_model(
    model: schema::appointments::Model,
) -> anyhow::Result<Appointment> {
    let status = AppointmentStatus::parse(&model.status)
        .with_context(|| format!("appointment {}: unknown status {:?}", model.id, model.status))?;
    Ok(Appointment {
        id: model.id,
        date: model.date,
        status,
        patient_id: model.patient_id,
        doctor_id: model.doctor_id,
        cabinet_id: model.cabinet_id,
        consultation_id: model.consultation_id,
        created_by_assistant_id: model.created_by_assistant_id,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

pub(crate) fn consultation_from_model(model: schema::consultations::Model) -> Consultation {
    Consultation {
        id: model.id,
        doctor_id: model.doctor_id,
        patient_id: model.patient_id,
        appointment_id: model.appointment_id,
        notes: model.notes,
        prescriptions: model.prescriptions,
        attachments: model.attachments,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub(crate) fn prescription_from_model(
    model: schema::prescriptions::Model,
) -> anyhow::Result<Prescription> {
    let status = PrescriptionStatus::parse(&model.status)
        .with_context(|| format!("prescription {}: unknown status {:?}", model.id, model.status))?;
    Ok(Prescription {
        id: model.id,
        consultation_id: model.consultation_id,
        patient_id: model.patient_id,
        doctor_id: model.doctor_id,
        prescription_date: model.prescription_date,
        status,
        medications: model.medications,
        general_instructions: model.general_instructions,
        valid_until: model.valid_until,
        refills_allowed: model.refills_allowed,
        refills_used: model.refills_used,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

pub(crate) fn message_from_model(model: schema::messages::Model) -> anyhow::Result<Message> {
    let status = MessageStatus::parse(&model.status)
        .with_context(|| format!("message {}: unknown status {:?}", model.id, model.status))?;
    Ok(Message {
        id: model.id,
        sender_id: model.sender_id,
        receiver_id: model.receiver_id,
        cabinet_id: model.cabinet_id,
        date: model.date,
        content: model.content,
        status,
        attachments: model.attachments,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

pub(crate) fn rating_from_model(model: schema::ratings::Model) -> Rating {
    Rating {
        id: model.id,
        patient_id: model.patient_id,
        cabinet_id: model.cabinet_id,
        date: model.date,
        equippement: model.equippement,
        user_experience: model.user_experience,
        review: model.review,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub(crate) fn payment_from_model(model: schema::payments::Model) -> anyhow::Result<Payment> {
    let status = PaymentStatus::parse(&model.status)
        .with_context(|| format!("payment {}: unknown status {:?}", model.id, model.status))?;
    Ok(Payment {
        id: model.id,
        patient_id: model.patient_id,
        doctor_id: model.doctor_id,
        cabinet_id: model.cabinet_id,
        appointment_id: model.appointment_id,
        amount: model.amount,
        status,
        payment_method: model.payment_method,
        transaction_date: model.transaction_date,
        notes: model.notes,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
