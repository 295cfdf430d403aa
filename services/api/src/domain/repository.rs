#![allow(async_fn_in_trait)]

use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::types::{
    AccessToken, AppointmentChanges, AppointmentView, Assistant, AssistantChanges, AssistantView,
    CabinetChanges, CabinetView, ConsultationChanges, ConsultationView, Credentials, Doctor,
    DoctorChanges, DoctorSearchFilter, DoctorView, MessageChanges, MessageView, NewAppointment,
    NewAssistant, NewCabinet, NewConsultation, NewDoctor, NewMessage, NewPatient, NewPayment,
    NewPrescription, NewRating, NewUser, PatientChanges, PatientView, PaymentChanges, PaymentView,
    Prescription, PrescriptionChanges, PrescriptionView, RatingChanges, RatingView, User,
    UserChanges, UserView,
};
use crate::error::ApiError;

/// Repository for user accounts. Views embed the doctor/patient extensions.
pub trait UserRepository: Send + Sync {
    async fn list(&self, page: PageRequest) -> Result<Page<UserView>, ApiError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<UserView>, ApiError>;
    async fn exists(&self, id: i64) -> Result<bool, ApiError>;
    /// Whether the email is already used by a user other than `ignore_id`.
    async fn email_taken(&self, email: &str, ignore_id: Option<i64>) -> Result<bool, ApiError>;
    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, ApiError>;
    async fn create(&self, new: &NewUser) -> Result<i64, ApiError>;
    async fn update(&self, id: i64, changes: &UserChanges) -> Result<(), ApiError>;
    /// Returns `true` if a row was deleted.
    async fn delete(&self, id: i64) -> Result<bool, ApiError>;
}

/// Repository for issued bearer tokens.
pub trait TokenRepository: Send + Sync {
    /// Insert a token row holding the secret digest. Returns the row id,
    /// which becomes the public token prefix.
    async fn create(&self, user_id: i64, name: &str, digest: &str) -> Result<i64, ApiError>;
    async fn find_with_user(&self, id: i64) -> Result<Option<(AccessToken, User)>, ApiError>;
    async fn touch_last_used(&self, id: i64) -> Result<(), ApiError>;
    /// Returns `true` if a row was deleted.
    async fn delete(&self, id: i64) -> Result<bool, ApiError>;
}

pub trait DoctorRepository: Send + Sync {
    async fn list(&self, page: PageRequest) -> Result<Page<DoctorView>, ApiError>;
    /// The short embed (user, cabinet, assistants) used by write responses
    /// and the bulk listing.
    async fn list_summaries(&self, page: PageRequest) -> Result<Page<DoctorView>, ApiError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<DoctorView>, ApiError>;
    async fn find_summary(&self, id: i64) -> Result<Option<DoctorView>, ApiError>;
    async fn exists(&self, id: i64) -> Result<bool, ApiError>;
    async fn search(
        &self,
        filter: &DoctorSearchFilter,
        page: PageRequest,
    ) -> Result<Page<DoctorView>, ApiError>;
    async fn create(&self, new: &NewDoctor) -> Result<i64, ApiError>;
    async fn update(&self, id: i64, changes: &DoctorChanges) -> Result<(), ApiError>;
    async fn delete(&self, id: i64) -> Result<bool, ApiError>;
    async fn appointments(
        &self,
        doctor_id: i64,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, ApiError>;
    async fn consultations(
        &self,
        doctor_id: i64,
        page: PageRequest,
    ) -> Result<Page<ConsultationView>, ApiError>;
    async fn assistants(
        &self,
        doctor_id: i64,
        page: PageRequest,
    ) -> Result<Page<AssistantView>, ApiError>;
    /// Distinct patients that have an appointment with this doctor.
    async fn patients(
        &self,
        doctor_id: i64,
        page: PageRequest,
    ) -> Result<Page<PatientView>, ApiError>;
}

pub trait PatientRepository: Send + Sync {
    async fn list(&self, page: PageRequest) -> Result<Page<PatientView>, ApiError>;
    /// The short embed (user, appointments, consultations) used by write
    /// responses and the bulk listing.
    async fn list_summaries(&self, page: PageRequest) -> Result<Page<PatientView>, ApiError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<PatientView>, ApiError>;
    async fn find_summary(&self, id: i64) -> Result<Option<PatientView>, ApiError>;
    async fn exists(&self, id: i64) -> Result<bool, ApiError>;
    async fn create(&self, new: &NewPatient) -> Result<i64, ApiError>;
    async fn update(&self, id: i64, changes: &PatientChanges) -> Result<(), ApiError>;
    async fn delete(&self, id: i64) -> Result<bool, ApiError>;
    async fn appointments(
        &self,
        patient_id: i64,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, ApiError>;
    async fn consultations(
        &self,
        patient_id: i64,
        page: PageRequest,
    ) -> Result<Page<ConsultationView>, ApiError>;
    async fn prescriptions(
        &self,
        patient_id: i64,
        page: PageRequest,
    ) -> Result<Page<PrescriptionView>, ApiError>;
}

pub trait AssistantRepository: Send + Sync {
    async fn list(&self, page: PageRequest) -> Result<Page<AssistantView>, ApiError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<AssistantView>, ApiError>;
    async fn find_base(&self, id: i64) -> Result<Option<Assistant>, ApiError>;
    async fn create(&self, new: &NewAssistant) -> Result<i64, ApiError>;
    async fn update(&self, id: i64, changes: &AssistantChanges) -> Result<(), ApiError>;
    async fn delete(&self, id: i64) -> Result<bool, ApiError>;
    async fn doctors(
        &self,
        assistant_id: i64,
        page: PageRequest,
    ) -> Result<Page<DoctorView>, ApiError>;
    /// All doctors linked to the assistant, unpaginated, for attach/detach
    /// responses.
    async fn attached_doctors(&self, assistant_id: i64) -> Result<Vec<Doctor>, ApiError>;
    /// Insert the link unless it already exists. Returns `true` when a row
    /// was inserted.
    async fn attach(&self, assistant_id: i64, doctor_id: i64) -> Result<bool, ApiError>;
    /// Returns `true` when a link row was removed.
    async fn detach(&self, assistant_id: i64, doctor_id: i64) -> Result<bool, ApiError>;
}

pub trait CabinetRepository: Send + Sync {
    async fn list(&self, page: PageRequest) -> Result<Page<CabinetView>, ApiError>;
    /// The bulk embed: admin plus doctors/assistants carrying their users.
    async fn list_expanded(&self, page: PageRequest) -> Result<Page<CabinetView>, ApiError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<CabinetView>, ApiError>;
    async fn find_summary(&self, id: i64) -> Result<Option<CabinetView>, ApiError>;
    async fn exists(&self, id: i64) -> Result<bool, ApiError>;
    async fn create(&self, new: &NewCabinet) -> Result<i64, ApiError>;
    async fn update(&self, id: i64, changes: &CabinetChanges) -> Result<(), ApiError>;
    async fn delete(&self, id: i64) -> Result<bool, ApiError>;
    async fn doctors(
        &self,
        cabinet_id: i64,
        page: PageRequest,
    ) -> Result<Page<DoctorView>, ApiError>;
    async fn assistants(
        &self,
        cabinet_id: i64,
        page: PageRequest,
    ) -> Result<Page<AssistantView>, ApiError>;
    async fn appointments(
        &self,
        cabinet_id: i64,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, ApiError>;
    async fn ratings(
        &self,
        cabinet_id: i64,
        page: PageRequest,
    ) -> Result<Page<RatingView>, ApiError>;
}

pub trait AppointmentRepository: Send + Sync {
    async fn list(&self, page: PageRequest) -> Result<Page<AppointmentView>, ApiError>;
    /// The bulk embed: patient/doctor carrying their users.
    async fn list_expanded(&self, page: PageRequest) -> Result<Page<AppointmentView>, ApiError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<AppointmentView>, ApiError>;
    async fn find_summary(&self, id: i64) -> Result<Option<AppointmentView>, ApiError>;
    async fn exists(&self, id: i64) -> Result<bool, ApiError>;
    async fn create(&self, new: &NewAppointment) -> Result<i64, ApiError>;
    async fn update(&self, id: i64, changes: &AppointmentChanges) -> Result<(), ApiError>;
    async fn delete(&self, id: i64) -> Result<bool, ApiError>;
    async fn list_by_patient(
        &self,
        patient_id: i64,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, ApiError>;
    async fn list_by_doctor(
        &self,
        doctor_id: i64,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, ApiError>;
    async fn list_by_cabinet(
        &self,
        cabinet_id: i64,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, ApiError>;
}

pub trait ConsultationRepository: Send + Sync {
    async fn list(&self, page: PageRequest) -> Result<Page<ConsultationView>, ApiError>;
    /// The bulk embed: doctor/patient carrying their users.
    async fn list_expanded(&self, page: PageRequest) -> Result<Page<ConsultationView>, ApiError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<ConsultationView>, ApiError>;
    async fn exists(&self, id: i64) -> Result<bool, ApiError>;
    /// Whether a consultation already references this appointment.
    async fn appointment_consulted(&self, appointment_id: i64) -> Result<bool, ApiError>;
    async fn create(&self, new: &NewConsultation) -> Result<i64, ApiError>;
    async fn update(&self, id: i64, changes: &ConsultationChanges) -> Result<(), ApiError>;
    async fn delete(&self, id: i64) -> Result<bool, ApiError>;
    async fn list_by_patient(
        &self,
        patient_id: i64,
        page: PageRequest,
    ) -> Result<Page<ConsultationView>, ApiError>;
    async fn list_by_doctor(
        &self,
        doctor_id: i64,
        page: PageRequest,
    ) -> Result<Page<ConsultationView>, ApiError>;
}

pub trait PrescriptionRepository: Send + Sync {
    async fn list(&self, page: PageRequest) -> Result<Page<PrescriptionView>, ApiError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<PrescriptionView>, ApiError>;
    /// The bare row, used to check refill bounds against stored values.
    async fn find_base(&self, id: i64) -> Result<Option<Prescription>, ApiError>;
    async fn create(&self, new: &NewPrescription) -> Result<i64, ApiError>;
    async fn update(&self, id: i64, changes: &PrescriptionChanges) -> Result<(), ApiError>;
    async fn delete(&self, id: i64) -> Result<bool, ApiError>;
    async fn list_by_patient(
        &self,
        patient_id: i64,
        page: PageRequest,
    ) -> Result<Page<PrescriptionView>, ApiError>;
    async fn list_by_doctor(
        &self,
        doctor_id: i64,
        page: PageRequest,
    ) -> Result<Page<PrescriptionView>, ApiError>;
}

pub trait MessageRepository: Send + Sync {
    async fn list(&self, page: PageRequest) -> Result<Page<MessageView>, ApiError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<MessageView>, ApiError>;
    async fn exists(&self, id: i64) -> Result<bool, ApiError>;
    async fn create(&self, new: &NewMessage) -> Result<i64, ApiError>;
    async fn update(&self, id: i64, changes: &MessageChanges) -> Result<(), ApiError>;
    async fn delete(&self, id: i64) -> Result<bool, ApiError>;
    /// Messages between two users in either direction, oldest first.
    async fn conversation(
        &self,
        user_a: i64,
        user_b: i64,
        page: PageRequest,
    ) -> Result<Page<MessageView>, ApiError>;
    /// Messages sent or received by one user, newest first.
    async fn list_by_user(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> Result<Page<MessageView>, ApiError>;
}

pub trait RatingRepository: Send + Sync {
    async fn list(&self, page: PageRequest) -> Result<Page<RatingView>, ApiError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<RatingView>, ApiError>;
    async fn exists(&self, id: i64) -> Result<bool, ApiError>;
    async fn create(&self, new: &NewRating) -> Result<i64, ApiError>;
    async fn update(&self, id: i64, changes: &RatingChanges) -> Result<(), ApiError>;
    async fn delete(&self, id: i64) -> Result<bool, ApiError>;
    async fn list_by_cabinet(
        &self,
        cabinet_id: i64,
        page: PageRequest,
    ) -> Result<Page<RatingView>, ApiError>;
    async fn list_by_patient(
        &self,
        patient_id: i64,
        page: PageRequest,
    ) -> Result<Page<RatingView>, ApiError>;
}

pub trait PaymentRepository: Send + Sync {
    async fn list(&self, page: PageRequest) -> Result<Page<PaymentView>, ApiError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<PaymentView>, ApiError>;
    async fn exists(&self, id: i64) -> Result<bool, ApiError>;
    async fn create(&self, new: &NewPayment) -> Result<i64, ApiError>;
    async fn update(&self, id: i64, changes: &PaymentChanges) -> Result<(), ApiError>;
    async fn delete(&self, id: i64) -> Result<bool, ApiError>;
    async fn list_by_patient(
        &self,
        patient_id: i64,
        page: PageRequest,
    ) -> Result<Page<PaymentView>, ApiError>;
    async fn list_by_doctor(
        &self,
        doctor_id: i64,
        page: PageRequest,
    ) -> Result<Page<PaymentView>, ApiError>;
    async fn list_by_cabinet(
        &self,
        cabinet_id: i64,
        page: PageRequest,
    ) -> Result<Page<PaymentView>, ApiError>;
    /// Any string is accepted; an unknown status just matches nothing.
    async fn list_by_status(
        &self,
        status: &str,
        page: PageRequest,
    ) -> Result<Page<PaymentView>, ApiError>;
}

/// Foreign-id existence checks used by request validation before any write.
pub trait RefLookupPort: Send + Sync {
    async fn user_exists(&self, id: i64) -> Result<bool, ApiError>;
    async fn doctor_exists(&self, id: i64) -> Result<bool, ApiError>;
    async fn patient_exists(&self, id: i64) -> Result<bool, ApiError>;
    async fn assistant_exists(&self, id: i64) -> Result<bool, ApiError>;
    async fn cabinet_exists(&self, id: i64) -> Result<bool, ApiError>;
    async fn appointment_exists(&self, id: i64) -> Result<bool, ApiError>;
    async fn consultation_exists(&self, id: i64) -> Result<bool, ApiError>;
}
