//! Bulk browse listings. These return the wide embeds (every relation the
//! detail views carry) and default to larger pages than the resource lists.

use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{
    AppointmentRepository, AssistantRepository, CabinetRepository, ConsultationRepository,
    DoctorRepository, PatientRepository, UserRepository,
};
use crate::domain::types::{
    AppointmentView, AssistantView, CabinetView, ConsultationView, DoctorView, PatientView,
    UserView,
};
use crate::error::ApiError;

pub struct BrowseDoctorsUseCase<R: DoctorRepository> {
    pub repo: R,
}

impl<R: DoctorRepository> BrowseDoctorsUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<DoctorView>, ApiError> {
        self.repo.list_summaries(page).await
    }
}

pub struct BrowseCabinetsUseCase<R: CabinetRepository> {
    pub repo: R,
}

impl<R: CabinetRepository> BrowseCabinetsUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<CabinetView>, ApiError> {
        self.repo.list_expanded(page).await
    }
}

pub struct BrowsePatientsUseCase<R: PatientRepository> {
    pub repo: R,
}

impl<R: PatientRepository> BrowsePatientsUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<PatientView>, ApiError> {
        self.repo.list_summaries(page).await
    }
}

pub struct BrowseAppointmentsUseCase<R: AppointmentRepository> {
    pub repo: R,
}

impl<R: AppointmentRepository> BrowseAppointmentsUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<AppointmentView>, ApiError> {
        self.repo.list_expanded(page).await
    }
}

pub struct BrowseAssistantsUseCase<R: AssistantRepository> {
    pub repo: R,
}

impl<R: AssistantRepository> BrowseAssistantsUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<AssistantView>, ApiError> {
        self.repo.list(page).await
    }
}

pub struct BrowseConsultationsUseCase<R: ConsultationRepository> {
    pub repo: R,
}

impl<R: ConsultationRepository> BrowseConsultationsUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<ConsultationView>, ApiError> {
        self.repo.list_expanded(page).await
    }
}

pub struct BrowseUsersUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> BrowseUsersUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<UserView>, ApiError> {
        self.repo.list(page).await
    }
}
