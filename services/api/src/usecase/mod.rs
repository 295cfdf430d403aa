pub mod appointment;
pub mod assistant;
pub mod auth;
pub mod browse;
pub mod cabinet;
pub mod consultation;
pub mod doctor;
pub mod message;
pub mod patient;
pub mod payment;
pub mod prescription;
pub mod rating;
pub mod user;

#[cfg(test)]
pub(crate) mod testutil;

/// Presence check for incoming string fields. Empty and whitespace-only
/// values count as absent.
pub(crate) fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Owned variant of [`present`], for patch fields that move out of the
/// request body.
pub(crate) fn present_owned(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
