//! sea-orm entities for the MedWorld API database.
//!
//! One module per table. Entities stay wire-agnostic: serialization shapes
//! live in the service's `domain` layer, not here.

pub mod access_tokens;
pub mod appointments;
pub mod assistant_doctor;
pub mod assistants;
pub mod cabinets;
pub mod consultations;
pub mod doctors;
pub mod messages;
pub mod patients;
pub mod payments;
pub mod prescriptions;
pub mod ratings;
pub mod users;
