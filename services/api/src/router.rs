use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    routing::{delete, get, post, put},
};

use medworld_core::health::{healthz, readyz};
use medworld_core::middleware::{request_id_layer, trace_layer};

use crate::handlers::{
    all::{
        list_all_appointments, list_all_assistants, list_all_cabinets, list_all_consultations,
        list_all_doctors, list_all_patients, list_all_users,
    },
    appointment::{
        create_appointment, delete_appointment, get_appointment, get_appointments_by_cabinet,
        get_appointments_by_doctor, get_appointments_by_patient, list_appointments,
        update_appointment,
    },
    assistant::{
        attach_doctor, create_assistant, delete_assistant, detach_doctor, get_assistant,
        get_assistant_doctors, list_assistants, update_assistant,
    },
    auth::{login, logout, me, register},
    cabinet::{
        create_cabinet, delete_cabinet, get_cabinet, get_cabinet_appointments,
        get_cabinet_assistants, get_cabinet_doctors, get_cabinet_ratings, list_cabinets,
        update_cabinet,
    },
    consultation::{
        create_consultation, delete_consultation, get_consultation, get_consultations_by_doctor,
        get_consultations_by_patient, list_consultations, update_consultation,
    },
    doctor::{
        create_doctor, delete_doctor, get_doctor, get_doctor_appointments, get_doctor_assistants,
        get_doctor_consultations, get_doctor_patients, list_doctors, search_doctors, update_doctor,
    },
    message::{
        delete_message, get_conversation, get_message, get_user_messages, list_messages,
        mark_message_seen, send_message, update_message,
    },
    patient::{
        create_patient, delete_patient, get_patient, get_patient_appointments,
        get_patient_consultations, get_patient_prescriptions, list_patients, update_patient,
    },
    payment::{
        delete_payment, get_payment, get_payments_by_cabinet, get_payments_by_doctor,
        get_payments_by_patient, get_payments_by_status, list_payments, record_payment,
        update_payment,
    },
    prescription::{
        create_prescription, delete_prescription, get_prescription, get_prescriptions_by_doctor,
        get_prescriptions_by_patient, list_prescriptions, update_prescription,
    },
    rating::{
        create_rating, delete_rating, get_rating, get_ratings_by_cabinet, get_ratings_by_patient,
        list_ratings, update_rating,
    },
    user::{create_user, delete_user, get_user, list_users, update_user},
};
use crate::middleware::{
    ADMIN, ADMIN_DOCTOR, ANY_USER, DOCTOR_ADMIN, DOCTOR_PATIENT_ADMIN, PATIENT_ADMIN,
    PATIENT_DOCTOR_ADMIN, SUPERADMIN_ADMIN, authenticate, require_role,
};
use crate::state::AppState;

/// No token required.
fn public_routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        // Doctor search
        .route("/doctors/search/filter", get(search_doctors))
        // Public browse
        .route("/all/doctors", get(list_all_doctors))
        .route("/all/cabinets", get(list_all_cabinets))
}

/// Any authenticated user, no role restriction.
fn authenticated_routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        // Appointments
        .route("/appointments", get(list_appointments))
        .route("/appointments", post(create_appointment))
        .route("/appointments/{id}", get(get_appointment))
        .route("/appointments/{id}", put(update_appointment))
        .route("/appointments/{id}", delete(delete_appointment))
        .route("/appointments/patient/{patient_id}", get(get_appointments_by_patient))
        .route("/appointments/doctor/{doctor_id}", get(get_appointments_by_doctor))
        .route("/appointments/cabinet/{cabinet_id}", get(get_appointments_by_cabinet))
        // Messages
        .route("/messages", get(list_messages))
        .route("/messages", post(send_message))
        .route("/messages/{id}", get(get_message))
        .route("/messages/{id}", put(update_message))
        .route("/messages/{id}", delete(delete_message))
        .route("/messages/{id}/mark-seen", post(mark_message_seen))
        .route("/messages/conversation/{user_a}/{user_b}", get(get_conversation))
        .route("/messages/user/{user_id}", get(get_user_messages))
        // Rating reads
        .route("/ratings", get(list_ratings))
        .route("/ratings/{id}", get(get_rating))
        .route("/ratings/cabinet/{cabinet_id}", get(get_ratings_by_cabinet))
        .route("/ratings/patient/{patient_id}", get(get_ratings_by_patient))
        // Payment reads
        .route("/payments", get(list_payments))
        .route("/payments/{id}", get(get_payment))
        .route("/payments/patient/{patient_id}", get(get_payments_by_patient))
        .route("/payments/doctor/{doctor_id}", get(get_payments_by_doctor))
        .route("/payments/cabinet/{cabinet_id}", get(get_payments_by_cabinet))
        .route("/payments/status/{status}", get(get_payments_by_status))
        // Browse
        .route("/all/appointments", get(list_all_appointments))
        .route_layer(middleware::from_fn(|request: Request, next: Next| {
            require_role(ANY_USER, request, next)
        }))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        // Users
        .route("/users", get(list_users))
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}", put(update_user))
        .route("/users/{id}", delete(delete_user))
        // Doctors
        .route("/doctors", get(list_doctors))
        .route("/doctors", post(create_doctor))
        .route("/doctors/{id}", get(get_doctor))
        .route("/doctors/{id}", put(update_doctor))
        .route("/doctors/{id}", delete(delete_doctor))
        // Payment writes
        .route("/payments", post(record_payment))
        .route("/payments/{id}", put(update_payment))
        .route("/payments/{id}", delete(delete_payment))
        .route_layer(middleware::from_fn(|request: Request, next: Next| {
            require_role(ADMIN, request, next)
        }))
}

fn admin_doctor_routes() -> Router<AppState> {
    Router::new()
        // Assistants
        .route("/assistants", get(list_assistants))
        .route("/assistants", post(create_assistant))
        .route("/assistants/{id}", get(get_assistant))
        .route("/assistants/{id}", put(update_assistant))
        .route("/assistants/{id}", delete(delete_assistant))
        .route("/assistants/{id}/doctors", get(get_assistant_doctors))
        .route("/assistants/{id}/doctors/attach", post(attach_doctor))
        .route("/assistants/{id}/doctors/detach", post(detach_doctor))
        // Browse
        .route("/all/assistants", get(list_all_assistants))
        .route_layer(middleware::from_fn(|request: Request, next: Next| {
            require_role(ADMIN_DOCTOR, request, next)
        }))
}

fn doctor_admin_routes() -> Router<AppState> {
    Router::new()
        // Doctor sub-resources
        .route("/doctors/{id}/appointments", get(get_doctor_appointments))
        .route("/doctors/{id}/consultations", get(get_doctor_consultations))
        .route("/doctors/{id}/assistants", get(get_doctor_assistants))
        .route("/doctors/{id}/patients", get(get_doctor_patients))
        // Patients
        .route("/patients", get(list_patients))
        .route("/patients", post(create_patient))
        .route("/patients/{id}", get(get_patient))
        .route("/patients/{id}", put(update_patient))
        .route("/patients/{id}", delete(delete_patient))
        // Browse
        .route("/all/patients", get(list_all_patients))
        .route_layer(middleware::from_fn(|request: Request, next: Next| {
            require_role(DOCTOR_ADMIN, request, next)
        }))
}

fn patient_doctor_admin_routes() -> Router<AppState> {
    Router::new()
        // Patient sub-resources
        .route("/patients/{id}/appointments", get(get_patient_appointments))
        .route("/patients/{id}/consultations", get(get_patient_consultations))
        .route("/patients/{id}/prescriptions", get(get_patient_prescriptions))
        .route_layer(middleware::from_fn(|request: Request, next: Next| {
            require_role(PATIENT_DOCTOR_ADMIN, request, next)
        }))
}

fn superadmin_admin_routes() -> Router<AppState> {
    Router::new()
        // Cabinets
        .route("/cabinets", get(list_cabinets))
        .route("/cabinets", post(create_cabinet))
        .route("/cabinets/{id}", get(get_cabinet))
        .route("/cabinets/{id}", put(update_cabinet))
        .route("/cabinets/{id}", delete(delete_cabinet))
        .route("/cabinets/{id}/doctors", get(get_cabinet_doctors))
        .route("/cabinets/{id}/assistants", get(get_cabinet_assistants))
        .route("/cabinets/{id}/appointments", get(get_cabinet_appointments))
        .route("/cabinets/{id}/ratings", get(get_cabinet_ratings))
        // Browse
        .route("/all/users", get(list_all_users))
        .route_layer(middleware::from_fn(|request: Request, next: Next| {
            require_role(SUPERADMIN_ADMIN, request, next)
        }))
}

fn doctor_patient_admin_routes() -> Router<AppState> {
    Router::new()
        // Consultations
        .route("/consultations", get(list_consultations))
        .route("/consultations", post(create_consultation))
        .route("/consultations/{id}", get(get_consultation))
        .route("/consultations/{id}", put(update_consultation))
        .route("/consultations/{id}", delete(delete_consultation))
        .route("/consultations/patient/{patient_id}", get(get_consultations_by_patient))
        .route("/consultations/doctor/{doctor_id}", get(get_consultations_by_doctor))
        // Prescriptions
        .route("/prescriptions", get(list_prescriptions))
        .route("/prescriptions", post(create_prescription))
        .route("/prescriptions/{id}", get(get_prescription))
        .route("/prescriptions/{id}", put(update_prescription))
        .route("/prescriptions/{id}", delete(delete_prescription))
        .route("/prescriptions/patient/{patient_id}", get(get_prescriptions_by_patient))
        .route("/prescriptions/doctor/{doctor_id}", get(get_prescriptions_by_doctor))
        // Browse
        .route("/all/consultations", get(list_all_consultations))
        .route_layer(middleware::from_fn(|request: Request, next: Next| {
            require_role(DOCTOR_PATIENT_ADMIN, request, next)
        }))
}

fn patient_admin_routes() -> Router<AppState> {
    Router::new()
        // Rating writes
        .route("/ratings", post(create_rating))
        .route("/ratings/{id}", put(update_rating))
        .route("/ratings/{id}", delete(delete_rating))
        .route_layer(middleware::from_fn(|request: Request, next: Next| {
            require_role(PATIENT_ADMIN, request, next)
        }))
}

pub fn build_router(state: AppState) -> Router {
    // Token resolution runs for every /api/v1 request, including the public
    // routes; it only attaches the principal, the per-group gates decide.
    let api = Router::new()
        .merge(public_routes())
        .merge(authenticated_routes())
        .merge(admin_routes())
        .merge(admin_doctor_routes())
        .merge(doctor_admin_routes())
        .merge(patient_doctor_admin_routes())
        .merge(superadmin_admin_routes())
        .merge(doctor_patient_admin_routes())
        .merge(patient_admin_routes())
        .layer(middleware::from_fn_with_state(state.clone(), authenticate));

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api/v1", api)
        .layer(trace_layer())
        .layer(request_id_layer())
        .with_state(state)
}
