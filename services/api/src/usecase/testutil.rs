//! Canned rows and a stubbed foreign-id lookup shared by usecase tests.

use chrono::{DateTime, NaiveDate, TimeZone as _, Utc};

use medworld_domain::pagination::{Page, PageRequest};
use medworld_domain::role::Role;

use crate::domain::repository::RefLookupPort;
use crate::domain::types::{
    Appointment, AppointmentStatus, Assistant, Cabinet, Consultation, Doctor, Message,
    MessageStatus, Patient, Payment, PaymentStatus, Prescription, PrescriptionStatus, Rating, User,
};
use crate::error::ApiError;

/// Foreign-id probe with a switch per table. `StubRefs::default()` answers
/// yes everywhere; flip one field off to simulate a dangling reference.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StubRefs {
    pub users: bool,
    pub doctors: bool,
    pub patients: bool,
    pub assistants: bool,
    pub cabinets: bool,
    pub appointments: bool,
    pub consultations: bool,
}

impl Default for StubRefs {
    fn default() -> Self {
        StubRefs {
            users: true,
            doctors: true,
            patients: true,
            assistants: true,
            cabinets: true,
            appointments: true,
            consultations: true,
        }
    }
}

impl RefLookupPort for StubRefs {
    async fn user_exists(&self, _id: i64) -> Result<bool, ApiError> {
        Ok(self.users)
    }
    async fn doctor_exists(&self, _id: i64) -> Result<bool, ApiError> {
        Ok(self.doctors)
    }
    async fn patient_exists(&self, _id: i64) -> Result<bool, ApiError> {
        Ok(self.patients)
    }
    async fn assistant_exists(&self, _id: i64) -> Result<bool, ApiError> {
        Ok(self.assistants)
    }
    async fn cabinet_exists(&self, _id: i64) -> Result<bool, ApiError> {
        Ok(self.cabinets)
    }
    async fn appointment_exists(&self, _id: i64) -> Result<bool, ApiError> {
        Ok(self.appointments)
    }
    async fn consultation_exists(&self, _id: i64) -> Result<bool, ApiError> {
        Ok(self.consultations)
    }
}

pub(crate) fn empty_page<T>(page: PageRequest) -> Page<T> {
    Page::from_parts(Vec::new(), 0, page)
}

pub(crate) fn ts() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 22, 9, 30, 0).unwrap()
}

pub(crate) fn user(id: i64, role: Role) -> User {
    User {
        id,
        first_name: "Amina".into(),
        last_name: "Benali".into(),
        email: format!("user{id}@example.dz"),
        email_verified_at: None,
        phone_number: None,
        avatar_url: None,
        address: None,
        gender: None,
        date_of_birth: None,
        role,
        created_at: ts(),
        updated_at: ts(),
    }
}

pub(crate) fn doctor(id: i64) -> Doctor {
    Doctor {
        id,
        user_id: id,
        speciality: Some("cardiology".into()),
        career_start: NaiveDate::from_ymd_opt(2015, 9, 1),
        cabinet_id: Some(1),
        consultation_price: 2500.0,
        consultation_duration: 30,
        created_at: ts(),
        updated_at: ts(),
    }
}

pub(crate) fn patient(id: i64) -> Patient {
    Patient {
        id,
        user_id: id,
        emergency_contact: None,
        blood_type: Some("O+".into()),
        weight: Some(70.0),
        medical_history: None,
        allergies: None,
        created_at: ts(),
        updated_at: ts(),
    }
}

pub(crate) fn assistant(id: i64) -> Assistant {
    Assistant {
        id,
        user_id: id,
        cabinet_id: Some(1),
        created_at: ts(),
        updated_at: ts(),
    }
}

pub(crate) fn cabinet(id: i64) -> Cabinet {
    Cabinet {
        id,
        name: "Cabinet El Chifa".into(),
        phone: Some("+213 21 63 11 22".into()),
        admin_id: Some(1),
        image: None,
        access_handicap: false,
        has_parking: true,
        has_wifi: false,
        accepts_urgent: true,
        accepts_insurance: false,
        opening_hours: None,
        location_lat: None,
        location_lng: None,
        created_at: ts(),
        updated_at: ts(),
    }
}

pub(crate) fn appointment(id: i64) -> Appointment {
    Appointment {
        id,
        date: ts(),
        status: AppointmentStatus::Scheduled,
        patient_id: 1,
        doctor_id: 1,
        cabinet_id: Some(1),
        consultation_id: None,
        created_by_assistant_id: None,
        created_at: ts(),
        updated_at: ts(),
    }
}

pub(crate) fn consultation(id: i64) -> Consultation {
    Consultation {
        id,
        doctor_id: 1,
        patient_id: 1,
        appointment_id: Some(1),
        notes: None,
        prescriptions: None,
        attachments: None,
        created_at: ts(),
        updated_at: ts(),
    }
}

pub(crate) fn prescription(id: i64) -> Prescription {
    Prescription {
        id,
        consultation_id: Some(1),
        patient_id: 1,
        doctor_id: 1,
        prescription_date: ts(),
        status: PrescriptionStatus::Active,
        medications: None,
        general_instructions: None,
        valid_until: None,
        refills_allowed: 2,
        refills_used: 0,
        created_at: ts(),
        updated_at: ts(),
    }
}

pub(crate) fn message(id: i64) -> Message {
    Message {
        id,
        sender_id: 1,
        receiver_id: 2,
        cabinet_id: Some(1),
        date: ts(),
        content: Some(serde_json::json!({ "text": "Bonjour" })),
        status: MessageStatus::Unseen,
        attachments: None,
        created_at: ts(),
        updated_at: ts(),
    }
}

pub(crate) fn rating(id: i64) -> Rating {
    Rating {
        id,
        patient_id: 1,
        cabinet_id: 1,
        date: ts(),
        equippement: None,
        user_experience: None,
        review: Some("Accueil impeccable".into()),
        created_at: ts(),
        updated_at: ts(),
    }
}

pub(crate) fn payment(id: i64) -> Payment {
    Payment {
        id,
        patient_id: 1,
        doctor_id: 1,
        cabinet_id: 1,
        appointment_id: None,
        amount: 2500.0,
        status: PaymentStatus::Pending,
        payment_method: "cash".into(),
        transaction_date: ts(),
        notes: None,
        created_at: ts(),
        updated_at: ts(),
    }
}
