use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use medworld_domain::role::Role;
use serde::Serialize;
use serde_json::Value;

// ── Status enums ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SCHEDULED" => Some(Self::Scheduled),
            "CONFIRMED" => Some(Self::Confirmed),
            "IN_PROGRESS" => Some(Self::InProgress),
            "COMPLETED" => Some(Self::Completed),
            "CANCELLED" => Some(Self::Cancelled),
            "NO_SHOW" => Some(Self::NoShow),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::Confirmed => "CONFIRMED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::NoShow => "NO_SHOW",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrescriptionStatus {
    Active,
    Completed,
    Cancelled,
}

impl PrescriptionStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(Self::Active),
            "COMPLETED" => Some(Self::Completed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Unseen,
    Seen,
}

impl MessageStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unseen" => Some(Self::Unseen),
            "seen" => Some(Self::Seen),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unseen => "unseen",
            Self::Seen => "seen",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

// ── Entities ─────────────────────────────────────────────────────────────────
//
// These serialize directly onto the wire; column names are the contract.
// The password hash never appears here — credential lookups return it
// separately via `Credentials`.

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms_opt")]
    pub email_verified_at: Option<DateTime<Utc>>,
    pub phone_number: Option<String>,
    pub avatar_url: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub role: Role,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

/// A user row paired with its stored password hash, for login verification.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: User,
    pub password_hash: String,
}

/// An issued bearer token row. The opaque wire token is `"{id}|{secret}"`;
/// only the digest of the secret is stored.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub id: i64,
    pub user_id: i64,
    pub token_digest: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Doctor {
    pub id: i64,
    pub user_id: i64,
    pub speciality: Option<String>,
    pub career_start: Option<NaiveDate>,
    pub cabinet_id: Option<i64>,
    pub consultation_price: f64,
    pub consultation_duration: i32,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Patient {
    pub id: i64,
    pub user_id: i64,
    pub emergency_contact: Option<String>,
    pub blood_type: Option<String>,
    pub weight: Option<f64>,
    pub medical_history: Option<Value>,
    pub allergies: Option<Value>,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Assistant {
    pub id: i64,
    pub user_id: i64,
    pub cabinet_id: Option<i64>,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Cabinet {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub admin_id: Option<i64>,
    pub image: Option<String>,
    pub access_handicap: bool,
    pub has_parking: bool,
    pub has_wifi: bool,
    pub accepts_urgent: bool,
    pub accepts_insurance: bool,
    pub opening_hours: Option<Value>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Appointment {
    pub id: i64,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub date: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub cabinet_id: Option<i64>,
    pub consultation_id: Option<i64>,
    pub created_by_assistant_id: Option<i64>,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Consultation {
    pub id: i64,
    pub doctor_id: i64,
    pub patient_id: i64,
    pub appointment_id: Option<i64>,
    pub notes: Option<String>,
    pub prescriptions: Option<Value>,
    pub attachments: Option<Value>,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Prescription {
    pub id: i64,
    pub consultation_id: Option<i64>,
    pub patient_id: i64,
    pub doctor_id: i64,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub prescription_date: DateTime<Utc>,
    pub status: PrescriptionStatus,
    pub medications: Option<Value>,
    pub general_instructions: Option<String>,
    pub valid_until: Option<NaiveDate>,
    pub refills_allowed: i32,
    pub refills_used: i32,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub cabinet_id: Option<i64>,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub date: DateTime<Utc>,
    pub content: Option<Value>,
    pub status: MessageStatus,
    pub attachments: Option<Value>,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Rating {
    pub id: i64,
    pub patient_id: i64,
    pub cabinet_id: i64,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub date: DateTime<Utc>,
    pub equippement: Option<Value>,
    pub user_experience: Option<Value>,
    pub review: Option<String>,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub cabinet_id: i64,
    pub appointment_id: Option<i64>,
    pub amount: f64,
    pub status: PaymentStatus,
    pub payment_method: String,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub transaction_date: DateTime<Utc>,
    pub notes: Option<String>,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "medworld_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

// ── Views (entity + embedded relations) ──────────────────────────────────────
//
// Relation slots follow one convention: `None` means the endpoint does not
// embed that relation, so the key is skipped entirely. A loaded slot always
// serializes its key; nullable links are doubly wrapped so a loaded but
// empty link comes out as an explicit `null`, and loaded collections come
// out as `[]` when empty.

#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<Option<Doctor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<Option<Patient>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorView {
    #[serde(flatten)]
    pub doctor: Doctor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cabinet: Option<Option<Cabinet>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistants: Option<Vec<Assistant>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointments: Option<Vec<Appointment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consultations: Option<Vec<Consultation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payments: Option<Vec<Payment>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientView {
    #[serde(flatten)]
    pub patient: Patient,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointments: Option<Vec<Appointment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consultations: Option<Vec<Consultation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prescriptions: Option<Vec<Prescription>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratings: Option<Vec<Rating>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payments: Option<Vec<Payment>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssistantView {
    #[serde(flatten)]
    pub assistant: Assistant,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cabinet: Option<Option<Cabinet>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctors: Option<Vec<Doctor>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CabinetView {
    #[serde(flatten)]
    pub cabinet: Cabinet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<Option<User>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctors: Option<Vec<DoctorView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistants: Option<Vec<AssistantView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointments: Option<Vec<Appointment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratings: Option<Vec<Rating>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payments: Option<Vec<Payment>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<PatientView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<DoctorView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cabinet: Option<Option<Cabinet>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consultation: Option<Option<Consultation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_assistant: Option<Option<Assistant>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<Option<Payment>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsultationView {
    #[serde(flatten)]
    pub consultation: Consultation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<DoctorView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<PatientView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment: Option<Option<Appointment>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrescriptionView {
    #[serde(flatten)]
    pub prescription: Prescription,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consultation: Option<Option<Consultation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<Patient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<Doctor>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    #[serde(flatten)]
    pub message: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cabinet: Option<Option<Cabinet>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingView {
    #[serde(flatten)]
    pub rating: Rating,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<Patient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cabinet: Option<Cabinet>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentView {
    #[serde(flatten)]
    pub payment: Payment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<Patient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<Doctor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cabinet: Option<Cabinet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment: Option<Option<Appointment>>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            user,
            doctor: None,
            patient: None,
        }
    }
}

impl From<Doctor> for DoctorView {
    fn from(doctor: Doctor) -> Self {
        Self {
            doctor,
            user: None,
            cabinet: None,
            assistants: None,
            appointments: None,
            consultations: None,
            payments: None,
        }
    }
}

impl From<Patient> for PatientView {
    fn from(patient: Patient) -> Self {
        Self {
            patient,
            user: None,
            appointments: None,
            consultations: None,
            prescriptions: None,
            ratings: None,
            payments: None,
        }
    }
}

impl From<Assistant> for AssistantView {
    fn from(assistant: Assistant) -> Self {
        Self {
            assistant,
            user: None,
            cabinet: None,
            doctors: None,
        }
    }
}

impl From<Cabinet> for CabinetView {
    fn from(cabinet: Cabinet) -> Self {
        Self {
            cabinet,
            admin: None,
            doctors: None,
            assistants: None,
            appointments: None,
            messages: None,
            ratings: None,
            payments: None,
        }
    }
}

impl From<Appointment> for AppointmentView {
    fn from(appointment: Appointment) -> Self {
        Self {
            appointment,
            patient: None,
            doctor: None,
            cabinet: None,
            consultation: None,
            created_by_assistant: None,
            payment: None,
        }
    }
}

impl From<Consultation> for ConsultationView {
    fn from(consultation: Consultation) -> Self {
        Self {
            consultation,
            doctor: None,
            patient: None,
            appointment: None,
        }
    }
}

impl From<Prescription> for PrescriptionView {
    fn from(prescription: Prescription) -> Self {
        Self {
            prescription,
            consultation: None,
            patient: None,
            doctor: None,
        }
    }
}

impl From<Message> for MessageView {
    fn from(message: Message) -> Self {
        Self {
            message,
            sender: None,
            receiver: None,
            cabinet: None,
        }
    }
}

impl From<Rating> for RatingView {
    fn from(rating: Rating) -> Self {
        Self {
            rating,
            patient: None,
            cabinet: None,
        }
    }
}

impl From<Payment> for PaymentView {
    fn from(payment: Payment) -> Self {
        Self {
            payment,
            patient: None,
            doctor: None,
            cabinet: None,
            appointment: None,
        }
    }
}

// ── Write payloads ───────────────────────────────────────────────────────────
//
// `New*` carries a fully validated create; `*Changes` is a partial patch.
// Patch fields on nullable columns use doubled options: the outer level is
// "field supplied", the inner is the stored value, so an explicit null
// clears the column while an absent key leaves it untouched.

#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub role: Role,
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub phone_number: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub gender: Option<Option<String>>,
    pub date_of_birth: Option<Option<NaiveDate>>,
}

#[derive(Debug, Clone)]
pub struct NewDoctor {
    pub user_id: i64,
    pub cabinet_id: i64,
    pub speciality: String,
    pub career_start: NaiveDate,
    pub consultation_price: f64,
    pub consultation_duration: i32,
}

#[derive(Debug, Clone, Default)]
pub struct DoctorChanges {
    pub cabinet_id: Option<i64>,
    pub speciality: Option<String>,
    pub career_start: Option<NaiveDate>,
    pub consultation_price: Option<f64>,
    pub consultation_duration: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewPatient {
    pub user_id: i64,
    pub emergency_contact: Option<String>,
    pub blood_type: Option<String>,
    pub weight: Option<f64>,
    pub medical_history: Option<Value>,
    pub allergies: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct PatientChanges {
    pub emergency_contact: Option<Option<String>>,
    pub blood_type: Option<Option<String>>,
    pub weight: Option<Option<f64>>,
    pub medical_history: Option<Option<Value>>,
    pub allergies: Option<Option<Value>>,
}

#[derive(Debug, Clone)]
pub struct NewAssistant {
    pub user_id: i64,
    pub cabinet_id: i64,
}

#[derive(Debug, Clone, Default)]
pub struct AssistantChanges {
    pub cabinet_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewCabinet {
    pub admin_id: i64,
    pub name: String,
    pub phone: String,
    pub access_handicap: bool,
    pub has_parking: bool,
    pub has_wifi: bool,
    pub accepts_urgent: bool,
    pub accepts_insurance: bool,
    pub opening_hours: Option<Value>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct CabinetChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub access_handicap: Option<bool>,
    pub has_parking: Option<bool>,
    pub has_wifi: Option<bool>,
    pub accepts_urgent: Option<bool>,
    pub accepts_insurance: Option<bool>,
    pub opening_hours: Option<Option<Value>>,
    pub location_lat: Option<Option<f64>>,
    pub location_lng: Option<Option<f64>>,
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub cabinet_id: i64,
    pub date: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub created_by_assistant_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentChanges {
    pub date: Option<DateTime<Utc>>,
    pub status: Option<AppointmentStatus>,
    pub created_by_assistant_id: Option<Option<i64>>,
}

#[derive(Debug, Clone)]
pub struct NewConsultation {
    pub appointment_id: i64,
    pub doctor_id: i64,
    pub patient_id: i64,
    pub notes: Option<String>,
    pub prescriptions: Option<Value>,
    pub attachments: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct ConsultationChanges {
    pub notes: Option<Option<String>>,
    pub prescriptions: Option<Option<Value>>,
    pub attachments: Option<Option<Value>>,
}

#[derive(Debug, Clone)]
pub struct NewPrescription {
    pub consultation_id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub prescription_date: DateTime<Utc>,
    pub status: PrescriptionStatus,
    pub medications: Option<Value>,
    pub general_instructions: Option<String>,
    pub valid_until: Option<NaiveDate>,
    pub refills_allowed: i32,
    pub refills_used: i32,
}

#[derive(Debug, Clone, Default)]
pub struct PrescriptionChanges {
    pub status: Option<PrescriptionStatus>,
    pub medications: Option<Option<Value>>,
    pub general_instructions: Option<Option<String>>,
    pub valid_until: Option<Option<NaiveDate>>,
    pub refills_allowed: Option<i32>,
    pub refills_used: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub cabinet_id: i64,
    pub date: DateTime<Utc>,
    pub content: Value,
    pub status: MessageStatus,
    pub attachments: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct MessageChanges {
    pub content: Option<Value>,
    pub status: Option<MessageStatus>,
    pub attachments: Option<Option<Value>>,
}

#[derive(Debug, Clone)]
pub struct NewRating {
    pub patient_id: i64,
    pub cabinet_id: i64,
    pub date: DateTime<Utc>,
    pub equippement: Option<Value>,
    pub user_experience: Option<Value>,
    pub review: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RatingChanges {
    pub equippement: Option<Option<Value>>,
    pub user_experience: Option<Option<Value>>,
    pub review: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub cabinet_id: i64,
    pub appointment_id: Option<i64>,
    pub amount: f64,
    pub status: PaymentStatus,
    pub payment_method: String,
    pub transaction_date: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentChanges {
    pub amount: Option<f64>,
    pub status: Option<PaymentStatus>,
    pub payment_method: Option<String>,
    pub transaction_date: Option<DateTime<Utc>>,
    pub notes: Option<Option<String>>,
}

/// Filter for the public doctor search. `available` keeps doctors with
/// fewer than 20 booked appointments.
#[derive(Debug, Clone, Default)]
pub struct DoctorSearchFilter {
    pub speciality: Option<String>,
    pub cabinet_id: Option<i64>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub available: bool,
}

// ── Date parsing ─────────────────────────────────────────────────────────────

/// `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Exactly `YYYY-MM-DD HH:MM:SS`, read as UTC. Appointment dates require
/// this format and nothing else.
pub fn parse_datetime_exact(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Lenient datetime: the exact format, RFC 3339, or a bare date taken as
/// midnight UTC.
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Some(dt) = parse_datetime_exact(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    parse_date(s)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Validate an email address: exactly one '@' with non-empty local and
/// domain parts, no whitespace.
pub fn validate_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => !local.is_empty() && !domain.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn test_user() -> User {
        User {
            id: 1,
            first_name: "Amina".into(),
            last_name: "Benali".into(),
            email: "amina.benali@example.dz".into(),
            email_verified_at: None,
            phone_number: None,
            avatar_url: None,
            address: None,
            gender: Some("female".into()),
            date_of_birth: Some(NaiveDate::from_ymd_opt(1990, 4, 2).unwrap()),
            role: Role::Patient,
            created_at: Utc.with_ymd_and_hms(2025, 11, 22, 9, 30, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 11, 22, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn should_skip_unloaded_relation_slots() {
        let view = UserView::from(test_user());
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("doctor").is_none());
        assert!(json.get("patient").is_none());
    }

    #[test]
    fn should_serialize_loaded_but_empty_relation_as_null() {
        let view = UserView {
            user: test_user(),
            doctor: Some(None),
            patient: Some(None),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert!(json["doctor"].is_null());
        assert!(json["patient"].is_null());
        assert!(json.as_object().unwrap().contains_key("doctor"));
    }

    #[test]
    fn should_serialize_role_under_the_type_key() {
        let json = serde_json::to_value(test_user()).unwrap();
        assert_eq!(json["type"], "patient");
        assert!(json.get("role").is_none());
        assert!(json.get("password").is_none());
    }

    #[test]
    fn should_format_timestamps_and_dates() {
        let json = serde_json::to_value(test_user()).unwrap();
        assert_eq!(json["created_at"], "2025-11-22T09:30:00.000Z");
        assert_eq!(json["date_of_birth"], "1990-04-02");
        assert!(json["email_verified_at"].is_null());
    }

    #[test]
    fn should_parse_status_strings() {
        assert_eq!(
            AppointmentStatus::parse("IN_PROGRESS"),
            Some(AppointmentStatus::InProgress)
        );
        assert_eq!(AppointmentStatus::parse("in_progress"), None);
        assert_eq!(
            PrescriptionStatus::parse("ACTIVE"),
            Some(PrescriptionStatus::Active)
        );
        assert_eq!(MessageStatus::parse("seen"), Some(MessageStatus::Seen));
        assert_eq!(PaymentStatus::parse("refunded"), Some(PaymentStatus::Refunded));
        assert_eq!(PaymentStatus::parse("REFUNDED"), None);
    }

    #[test]
    fn should_serialize_statuses_with_their_wire_spelling() {
        assert_eq!(
            serde_json::to_value(AppointmentStatus::NoShow).unwrap(),
            "NO_SHOW"
        );
        assert_eq!(serde_json::to_value(MessageStatus::Unseen).unwrap(), "unseen");
    }

    #[test]
    fn should_parse_exact_datetimes_only_in_the_declared_format() {
        assert_eq!(
            parse_datetime_exact("2025-12-01 10:30:00"),
            Some(Utc.with_ymd_and_hms(2025, 12, 1, 10, 30, 0).unwrap())
        );
        assert_eq!(parse_datetime_exact("2025-12-01"), None);
        assert_eq!(parse_datetime_exact("2025-12-01T10:30:00Z"), None);
    }

    #[test]
    fn should_parse_lenient_datetimes_from_common_shapes() {
        assert_eq!(
            parse_datetime("2025-12-01 10:30:00"),
            Some(Utc.with_ymd_and_hms(2025, 12, 1, 10, 30, 0).unwrap())
        );
        assert_eq!(
            parse_datetime("2025-12-01T10:30:00Z"),
            Some(Utc.with_ymd_and_hms(2025, 12, 1, 10, 30, 0).unwrap())
        );
        assert_eq!(
            parse_datetime("2025-12-01"),
            Some(Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_datetime("12/01/2025"), None);
    }

    #[test]
    fn should_reject_invalid_calendar_dates() {
        assert_eq!(parse_date("2025-02-30"), None);
        assert_eq!(parse_date("1990-04-02"), NaiveDate::from_ymd_opt(1990, 4, 2));
    }

    #[test]
    fn should_accept_plain_email_addresses() {
        assert!(validate_email("amina.benali@example.dz"));
        assert!(validate_email("a@b"));
    }

    #[test]
    fn should_reject_malformed_email_addresses() {
        assert!(!validate_email(""));
        assert!(!validate_email("no-at-sign"));
        assert!(!validate_email("@example.dz"));
        assert!(!validate_email("amina@"));
        assert!(!validate_email("a@b@c"));
        assert!(!validate_email("amina benali@example.dz"));
    }
}
