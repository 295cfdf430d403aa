use serde_json::Value;

use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{CabinetRepository, RefLookupPort};
use crate::domain::types::{
    AppointmentView, AssistantView, CabinetChanges, CabinetView, DoctorView, NewCabinet,
    RatingView,
};
use crate::error::{ApiError, ValidationErrors};
use crate::usecase::{present, present_owned};

// ── ListCabinets ─────────────────────────────────────────────────────────────

pub struct ListCabinetsUseCase<R: CabinetRepository> {
    pub repo: R,
}

impl<R: CabinetRepository> ListCabinetsUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<CabinetView>, ApiError> {
        self.repo.list(page).await
    }
}

// ── GetCabinet ───────────────────────────────────────────────────────────────

pub struct GetCabinetUseCase<R: CabinetRepository> {
    pub repo: R,
}

impl<R: CabinetRepository> GetCabinetUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<CabinetView, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("Cabinet"))
    }
}

// ── CreateCabinet ────────────────────────────────────────────────────────────

pub struct CreateCabinetInput {
    /// Owner account; stored as the cabinet's `admin_id`.
    pub user_id: Option<i64>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub access_handicap: Option<bool>,
    pub has_parking: Option<bool>,
    pub has_wifi: Option<bool>,
    pub accepts_urgent: Option<bool>,
    pub accepts_insurance: Option<bool>,
    pub opening_hours: Option<Value>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
}

pub struct CreateCabinetUseCase<R: CabinetRepository, L: RefLookupPort> {
    pub repo: R,
    pub refs: L,
}

impl<R: CabinetRepository, L: RefLookupPort> CreateCabinetUseCase<R, L> {
    pub async fn execute(&self, input: CreateCabinetInput) -> Result<CabinetView, ApiError> {
        let mut errors = ValidationErrors::new();

        let admin_id = match input.user_id {
            None => {
                errors.required("user_id");
                None
            }
            Some(v) => {
                if self.refs.user_exists(v).await? {
                    Some(v)
                } else {
                    errors.invalid_choice("user_id");
                    None
                }
            }
        };

        let name = present(input.name.as_deref());
        if name.is_none() {
            errors.required("name");
        }

        let phone = match present(input.phone.as_deref()) {
            None => {
                errors.required("phone");
                None
            }
            Some(v) if v.chars().count() > 20 => {
                errors.max_chars("phone", 20);
                None
            }
            Some(v) => Some(v),
        };

        let opening_hours = input.opening_hours.filter(|v| !v.is_null());
        if let Some(v) = &opening_hours {
            if !v.is_array() && !v.is_object() {
                errors.must_be_array("opening_hours");
            }
        }

        errors.into_result()?;
        let (Some(admin_id), Some(name), Some(phone)) = (admin_id, name, phone) else {
            return Err(ApiError::Internal(anyhow::anyhow!(
                "cabinet validation passed with required fields missing"
            )));
        };

        let new = NewCabinet {
            admin_id,
            name: name.to_owned(),
            phone: phone.to_owned(),
            access_handicap: input.access_handicap.unwrap_or(false),
            has_parking: input.has_parking.unwrap_or(false),
            has_wifi: input.has_wifi.unwrap_or(false),
            accepts_urgent: input.accepts_urgent.unwrap_or(false),
            accepts_insurance: input.accepts_insurance.unwrap_or(false),
            opening_hours,
            location_lat: input.location_lat,
            location_lng: input.location_lng,
        };
        let id = self.repo.create(&new).await?;
        self.repo.find_summary(id).await?.ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!("cabinet {id} missing right after insert"))
        })
    }
}

// ── UpdateCabinet ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateCabinetInput {
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

pub struct UpdateCabinetUseCase<R: CabinetRepository> {
    pub repo: R,
}

impl<R: CabinetRepository> UpdateCabinetUseCase<R> {
    pub async fn execute(
        &self,
        id: i64,
        input: UpdateCabinetInput,
    ) -> Result<CabinetView, ApiError> {
        if !self.repo.exists(id).await? {
            return Err(ApiError::NotFound("Cabinet"));
        }

        let mut errors = ValidationErrors::new();

        let phone = match present_owned(input.phone) {
            Some(v) if v.chars().count() > 20 => {
                errors.max_chars("phone", 20);
                None
            }
            other => other,
        };

        let opening_hours = input
            .opening_hours
            .map(|inner| inner.filter(|v| !v.is_null()));
        if let Some(Some(v)) = &opening_hours {
            if !v.is_array() && !v.is_object() {
                errors.must_be_array("opening_hours");
            }
        }

        errors.into_result()?;

        let changes = CabinetChanges {
            name: present_owned(input.name),
            phone,
            access_handicap: input.access_handicap,
            has_parking: input.has_parking,
            has_wifi: input.has_wifi,
            accepts_urgent: input.accepts_urgent,
            accepts_insurance: input.accepts_insurance,
            opening_hours,
            location_lat: input.location_lat,
            location_lng: input.location_lng,
        };
        self.repo.update(id, &changes).await?;
        self.repo
            .find_summary(id)
            .await?
            .ok_or(ApiError::NotFound("Cabinet"))
    }
}

// ── DeleteCabinet ────────────────────────────────────────────────────────────

pub struct DeleteCabinetUseCase<R: CabinetRepository> {
    pub repo: R,
}

impl<R: CabinetRepository> DeleteCabinetUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<(), ApiError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(ApiError::NotFound("Cabinet"))
        }
    }
}

// ── Scoped listings ──────────────────────────────────────────────────────────

pub struct GetCabinetDoctorsUseCase<R: CabinetRepository> {
    pub repo: R,
}

impl<R: CabinetRepository> GetCabinetDoctorsUseCase<R> {
    pub async fn execute(
        &self,
        cabinet_id: i64,
        page: PageRequest,
    ) -> Result<Page<DoctorView>, ApiError> {
        if !self.repo.exists(cabinet_id).await? {
            return Err(ApiError::NotFound("Cabinet"));
        }
        self.repo.doctors(cabinet_id, page).await
    }
}

pub struct GetCabinetAssistantsUseCase<R: CabinetRepository> {
    pub repo: R,
}

impl<R: CabinetRepository> GetCabinetAssistantsUseCase<R> {
    pub async fn execute(
        &self,
        cabinet_id: i64,
        page: PageRequest,
    ) -> Result<Page<AssistantView>, ApiError> {
        if !self.repo.exists(cabinet_id).await? {
            return Err(ApiError::NotFound("Cabinet"));
        }
        self.repo.assistants(cabinet_id, page).await
    }
}

pub struct GetCabinetAppointmentsUseCase<R: CabinetRepository> {
    pub repo: R,
}

impl<R: CabinetRepository> GetCabinetAppointmentsUseCase<R> {
    pub async fn execute(
        &self,
        cabinet_id: i64,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, ApiError> {
        if !self.repo.exists(cabinet_id).await? {
            return Err(ApiError::NotFound("Cabinet"));
        }
        self.repo.appointments(cabinet_id, page).await
    }
}

pub struct GetCabinetRatingsUseCase<R: CabinetRepository> {
    pub repo: R,
}

impl<R: CabinetRepository> GetCabinetRatingsUseCase<R> {
    pub async fn execute(
        &self,
        cabinet_id: i64,
        page: PageRequest,
    ) -> Result<Page<RatingView>, ApiError> {
        if !self.repo.exists(cabinet_id).await? {
            return Err(ApiError::NotFound("Cabinet"));
        }
        self.repo.ratings(cabinet_id, page).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::usecase::testutil::{StubRefs, cabinet, empty_page};

    #[derive(Default)]
    struct MockCabinetRepo {
        cabinet: Option<CabinetView>,
        created: Mutex<Option<NewCabinet>>,
        updated: Mutex<Option<CabinetChanges>>,
    }

    impl CabinetRepository for MockCabinetRepo {
        async fn list(&self, page: PageRequest) -> Result<Page<CabinetView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn list_expanded(&self, page: PageRequest) -> Result<Page<CabinetView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn find_by_id(&self, _id: i64) -> Result<Option<CabinetView>, ApiError> {
            Ok(self.cabinet.clone())
        }
        async fn find_summary(&self, _id: i64) -> Result<Option<CabinetView>, ApiError> {
            Ok(self.cabinet.clone())
        }
        async fn exists(&self, _id: i64) -> Result<bool, ApiError> {
            Ok(self.cabinet.is_some())
        }
        async fn create(&self, new: &NewCabinet) -> Result<i64, ApiError> {
            *self.created.lock().unwrap() = Some(new.clone());
            Ok(1)
        }
        async fn update(&self, _id: i64, changes: &CabinetChanges) -> Result<(), ApiError> {
            *self.updated.lock().unwrap() = Some(changes.clone());
            Ok(())
        }
        async fn delete(&self, _id: i64) -> Result<bool, ApiError> {
            Ok(self.cabinet.is_some())
        }
        async fn doctors(
            &self,
            _cabinet_id: i64,
            page: PageRequest,
        ) -> Result<Page<DoctorView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn assistants(
            &self,
            _cabinet_id: i64,
            page: PageRequest,
        ) -> Result<Page<AssistantView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn appointments(
            &self,
            _cabinet_id: i64,
            page: PageRequest,
        ) -> Result<Page<AppointmentView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn ratings(
            &self,
            _cabinet_id: i64,
            page: PageRequest,
        ) -> Result<Page<RatingView>, ApiError> {
            Ok(empty_page(page))
        }
    }

    fn repo_with_cabinet() -> MockCabinetRepo {
        MockCabinetRepo {
            cabinet: Some(CabinetView::from(cabinet(1))),
            ..Default::default()
        }
    }

    fn create_input() -> CreateCabinetInput {
        CreateCabinetInput {
            user_id: Some(1),
            name: Some("Cabinet El Chifa".into()),
            phone: Some("+213 21 63 11 22".into()),
            access_handicap: None,
            has_parking: Some(true),
            has_wifi: None,
            accepts_urgent: None,
            accepts_insurance: None,
            opening_hours: None,
            location_lat: Some(36.7538),
            location_lng: Some(3.0588),
        }
    }

    #[tokio::test]
    async fn should_create_cabinet_and_default_missing_flags_to_false() {
        let usecase = CreateCabinetUseCase {
            repo: repo_with_cabinet(),
            refs: StubRefs::default(),
        };
        let view = usecase.execute(create_input()).await.unwrap();
        assert_eq!(view.cabinet.id, 1);

        let stored = usecase.repo.created.lock().unwrap().clone().unwrap();
        assert_eq!(stored.admin_id, 1);
        assert!(stored.has_parking);
        assert!(!stored.has_wifi);
        assert_eq!(stored.location_lat, Some(36.7538));
    }

    #[tokio::test]
    async fn should_reject_dangling_owner_reference() {
        let usecase = CreateCabinetUseCase {
            repo: repo_with_cabinet(),
            refs: StubRefs {
                users: false,
                ..Default::default()
            },
        };
        let Err(ApiError::Validation(fields)) = usecase.execute(create_input()).await else {
            panic!("expected validation failure");
        };
        assert_eq!(fields["user_id"], vec!["The selected user id is invalid."]);
    }

    #[tokio::test]
    async fn should_limit_phone_length() {
        let usecase = CreateCabinetUseCase {
            repo: repo_with_cabinet(),
            refs: StubRefs::default(),
        };
        let mut input = create_input();
        input.phone = Some("0".repeat(21));
        let Err(ApiError::Validation(fields)) = usecase.execute(input).await else {
            panic!("expected validation failure");
        };
        assert_eq!(
            fields["phone"],
            vec!["The phone field must not be greater than 20 characters."]
        );
    }

    #[tokio::test]
    async fn should_require_structured_opening_hours() {
        let usecase = CreateCabinetUseCase {
            repo: repo_with_cabinet(),
            refs: StubRefs::default(),
        };
        let mut input = create_input();
        input.opening_hours = Some(json!("9h-17h"));
        let Err(ApiError::Validation(fields)) = usecase.execute(input).await else {
            panic!("expected validation failure");
        };
        assert_eq!(
            fields["opening_hours"],
            vec!["The opening hours field must be an array."]
        );
    }

    #[tokio::test]
    async fn should_return_not_found_before_validating_a_patch() {
        let usecase = UpdateCabinetUseCase {
            repo: MockCabinetRepo::default(),
        };
        let result = usecase.execute(1, UpdateCabinetInput::default()).await;
        assert!(matches!(result, Err(ApiError::NotFound("Cabinet"))));
    }

    #[tokio::test]
    async fn should_patch_flags_and_clear_coordinates() {
        let usecase = UpdateCabinetUseCase {
            repo: repo_with_cabinet(),
        };
        usecase
            .execute(
                1,
                UpdateCabinetInput {
                    has_wifi: Some(true),
                    location_lat: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let changes = usecase.repo.updated.lock().unwrap().clone().unwrap();
        assert_eq!(changes.has_wifi, Some(true));
        assert_eq!(changes.location_lat, Some(None));
        assert_eq!(changes.name, None);
    }

    #[tokio::test]
    async fn should_check_cabinet_before_listing_relationships() {
        let missing = GetCabinetRatingsUseCase {
            repo: MockCabinetRepo::default(),
        };
        let result = missing.execute(1, PageRequest::default()).await;
        assert!(matches!(result, Err(ApiError::NotFound("Cabinet"))));
    }
}
