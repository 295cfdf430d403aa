use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbAppointmentRepository, DbAssistantRepository, DbCabinetRepository, DbConsultationRepository,
    DbDoctorRepository, DbMessageRepository, DbPatientRepository, DbPaymentRepository,
    DbPrescriptionRepository, DbRatingRepository, DbRefLookup, DbTokenRepository, DbUserRepository,
};

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn token_repo(&self) -> DbTokenRepository {
        DbTokenRepository {
            db: self.db.clone(),
        }
    }

    pub fn doctor_repo(&self) -> DbDoctorRepository {
        DbDoctorRepository {
            db: self.db.clone(),
        }
    }

    pub fn patient_repo(&self) -> DbPatientRepository {
        DbPatientRepository {
            db: self.db.clone(),
        }
    }

    pub fn assistant_repo(&self) -> DbAssistantRepository {
        DbAssistantRepository {
            db: self.db.clone(),
        }
    }

    pub fn cabinet_repo(&self) -> DbCabinetRepository {
        DbCabinetRepository {
            db: self.db.clone(),
        }
    }

    pub fn appointment_repo(&self) -> DbAppointmentRepository {
        DbAppointmentRepository {
            db: self.db.clone(),
        }
    }

    pub fn consultation_repo(&self) -> DbConsultationRepository {
        DbConsultationRepository {
            db: self.db.clone(),
        }
    }

    pub fn prescription_repo(&self) -> DbPrescriptionRepository {
        DbPrescriptionRepository {
            db: self.db.clone(),
        }
    }

    pub fn message_repo(&self) -> DbMessageRepository {
        DbMessageRepository {
            db: self.db.clone(),
        }
    }

    pub fn rating_repo(&self) -> DbRatingRepository {
        DbRatingRepository {
            db: self.db.clone(),
        }
    }

    pub fn payment_repo(&self) -> DbPaymentRepository {
        DbPaymentRepository {
            db: self.db.clone(),
        }
    }

    pub fn refs(&self) -> DbRefLookup {
        DbRefLookup {
            db: self.db.clone(),
        }
    }
}
