pub mod all;
pub mod appointment;
pub mod assistant;
pub mod auth;
pub mod cabinet;
pub mod consultation;
pub mod doctor;
pub mod message;
pub mod patient;
pub mod payment;
pub mod prescription;
pub mod rating;
pub mod user;
