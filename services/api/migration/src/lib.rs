use sea_orm_migration::prelude::*;

mod m20251122_000001_create_users;
mod m20251122_000002_create_access_tokens;
mod m20251122_000003_create_cabinets;
mod m20251122_000004_create_doctors;
mod m20251122_000005_create_patients;
mod m20251122_000006_create_assistants;
mod m20251122_000007_create_assistant_doctor;
mod m20251122_000008_create_appointments;
mod m20251122_000009_create_consultations;
mod m20251122_000010_link_appointments_consultations;
mod m20251122_000011_create_prescriptions;
mod m20251122_000012_create_messages;
mod m20251122_000013_create_ratings;
mod m20251122_000014_create_payments;
mod m20251122_000015_add_missing_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251122_000001_create_users::Migration),
            Box::new(m20251122_000002_create_access_tokens::Migration),
            Box::new(m20251122_000003_create_cabinets::Migration),
            Box::new(m20251122_000004_create_doctors::Migration),
            Box::new(m20251122_000005_create_patients::Migration),
            Box::new(m20251122_000006_create_assistants::Migration),
            Box::new(m20251122_000007_create_assistant_doctor::Migration),
            Box::new(m20251122_000008_create_appointments::Migration),
            Box::new(m20251122_000009_create_consultations::Migration),
            Box::new(m20251122_000010_link_appointments_consultations::Migration),
            Box::new(m20251122_000011_create_prescriptions::Migration),
            Box::new(m20251122_000012_create_messages::Migration),
            Box::new(m20251122_000013_create_ratings::Migration),
            Box::new(m20251122_000014_create_payments::Migration),
            Box::new(m20251122_000015_add_missing_indexes::Migration),
        ]
    }
}
