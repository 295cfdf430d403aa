use serde_json::Value;

use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{RatingRepository, RefLookupPort};
use crate::domain::types::{NewRating, RatingChanges, RatingView, parse_datetime};
use crate::error::{ApiError, ValidationErrors};
use crate::usecase::{present, present_owned};

// ── ListRatings ──────────────────────────────────────────────────────────────

pub struct ListRatingsUseCase<R: RatingRepository> {
    pub repo: R,
}

impl<R: RatingRepository> ListRatingsUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<RatingView>, ApiError> {
        self.repo.list(page).await
    }
}

// ── GetRating ────────────────────────────────────────────────────────────────

pub struct GetRatingUseCase<R: RatingRepository> {
    pub repo: R,
}

impl<R: RatingRepository> GetRatingUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<RatingView, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("Rating"))
    }
}

// ── CreateRating ─────────────────────────────────────────────────────────────

pub struct CreateRatingInput {
    pub patient_id: Option<i64>,
    pub cabinet_id: Option<i64>,
    pub date: Option<String>,
    pub equippement: Option<Value>,
    pub user_experience: Option<Value>,
    pub review: Option<String>,
}

pub struct CreateRatingUseCase<R: RatingRepository, L: RefLookupPort> {
    pub repo: R,
    pub refs: L,
}

impl<R: RatingRepository, L: RefLookupPort> CreateRatingUseCase<R, L> {
    pub async fn execute(&self, input: CreateRatingInput) -> Result<RatingView, ApiError> {
        let mut errors = ValidationErrors::new();

        let patient_id = match input.patient_id {
            None => {
                errors.required("patient_id");
                None
            }
            Some(v) => {
                if self.refs.patient_exists(v).await? {
                    Some(v)
                } else {
                    errors.invalid_choice("patient_id");
                    None
                }
            }
        };
        let cabinet_id = match input.cabinet_id {
            None => {
                errors.required("cabinet_id");
                None
            }
            Some(v) => {
                if self.refs.cabinet_exists(v).await? {
                    Some(v)
                } else {
                    errors.invalid_choice("cabinet_id");
                    None
                }
            }
        };

        let date = match present(input.date.as_deref()) {
            None => {
                errors.required("date");
                None
            }
            Some(v) => match parse_datetime(v) {
                Some(dt) => Some(dt),
                None => {
                    errors.must_be_date("date");
                    None
                }
            },
        };

        errors.into_result()?;
        let (Some(patient_id), Some(cabinet_id), Some(date)) = (patient_id, cabinet_id, date)
        else {
            return Err(ApiError::Internal(anyhow::anyhow!(
                "rating validation passed with required fields missing"
            )));
        };

        let new = NewRating {
            patient_id,
            cabinet_id,
            date,
            equippement: input.equippement.filter(|v| !v.is_null()),
            user_experience: input.user_experience.filter(|v| !v.is_null()),
            review: present_owned(input.review),
        };
        let id = self.repo.create(&new).await?;
        self.repo.find_by_id(id).await?.ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!("rating {id} missing right after insert"))
        })
    }
}

// ── UpdateRating ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateRatingInput {
    pub equippement: Option<Option<Value>>,
    pub user_experience: Option<Option<Value>>,
    pub review: Option<Option<String>>,
}

pub struct UpdateRatingUseCase<R: RatingRepository> {
    pub repo: R,
}

impl<R: RatingRepository> UpdateRatingUseCase<R> {
    pub async fn execute(&self, id: i64, input: UpdateRatingInput) -> Result<RatingView, ApiError> {
        if !self.repo.exists(id).await? {
            return Err(ApiError::NotFound("Rating"));
        }

        let changes = RatingChanges {
            equippement: input
                .equippement
                .map(|inner| inner.filter(|v| !v.is_null())),
            user_experience: input
                .user_experience
                .map(|inner| inner.filter(|v| !v.is_null())),
            review: input.review.map(present_owned),
        };
        self.repo.update(id, &changes).await?;
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("Rating"))
    }
}

// ── DeleteRating ─────────────────────────────────────────────────────────────

pub struct DeleteRatingUseCase<R: RatingRepository> {
    pub repo: R,
}

impl<R: RatingRepository> DeleteRatingUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<(), ApiError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(ApiError::NotFound("Rating"))
        }
    }
}

// ── Lookups ──────────────────────────────────────────────────────────────────

pub struct GetRatingsByCabinetUseCase<R: RatingRepository> {
    pub repo: R,
}

impl<R: RatingRepository> GetRatingsByCabinetUseCase<R> {
    pub async fn execute(
        &self,
        cabinet_id: i64,
        page: PageRequest,
    ) -> Result<Page<RatingView>, ApiError> {
        self.repo.list_by_cabinet(cabinet_id, page).await
    }
}

pub struct GetRatingsByPatientUseCase<R: RatingRepository> {
    pub repo: R,
}

impl<R: RatingRepository> GetRatingsByPatientUseCase<R> {
    pub async fn execute(
        &self,
        patient_id: i64,
        page: PageRequest,
    ) -> Result<Page<RatingView>, ApiError> {
        self.repo.list_by_patient(patient_id, page).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::usecase::testutil::{StubRefs, empty_page, rating};

    #[derive(Default)]
    struct MockRatingRepo {
        rating: Option<RatingView>,
        created: Mutex<Option<NewRating>>,
        updated: Mutex<Option<RatingChanges>>,
    }

    impl RatingRepository for MockRatingRepo {
        async fn list(&self, page: PageRequest) -> Result<Page<RatingView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn find_by_id(&self, _id: i64) -> Result<Option<RatingView>, ApiError> {
            Ok(self.rating.clone())
        }
        async fn exists(&self, _id: i64) -> Result<bool, ApiError> {
            Ok(self.rating.is_some())
        }
        async fn create(&self, new: &NewRating) -> Result<i64, ApiError> {
            *self.created.lock().unwrap() = Some(new.clone());
            Ok(10)
        }
        async fn update(&self, _id: i64, changes: &RatingChanges) -> Result<(), ApiError> {
            *self.updated.lock().unwrap() = Some(changes.clone());
            Ok(())
        }
        async fn delete(&self, _id: i64) -> Result<bool, ApiError> {
            Ok(self.rating.is_some())
        }
        async fn list_by_cabinet(
            &self,
            _cabinet_id: i64,
            page: PageRequest,
        ) -> Result<Page<RatingView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn list_by_patient(
            &self,
            _patient_id: i64,
            page: PageRequest,
        ) -> Result<Page<RatingView>, ApiError> {
            Ok(empty_page(page))
        }
    }

    fn repo_with_rating() -> MockRatingRepo {
        MockRatingRepo {
            rating: Some(RatingView::from(rating(10))),
            ..Default::default()
        }
    }

    fn create_input() -> CreateRatingInput {
        CreateRatingInput {
            patient_id: Some(4),
            cabinet_id: Some(1),
            date: Some("2025-11-22".into()),
            equippement: Some(json!({ "salle": 5 })),
            user_experience: None,
            review: Some("Accueil impeccable".into()),
        }
    }

    #[tokio::test]
    async fn should_create_rating_with_midnight_date() {
        let usecase = CreateRatingUseCase {
            repo: repo_with_rating(),
            refs: StubRefs::default(),
        };
        let view = usecase.execute(create_input()).await.unwrap();
        assert_eq!(view.rating.id, 10);

        let stored = usecase.repo.created.lock().unwrap().clone().unwrap();
        assert_eq!(stored.date.to_rfc3339(), "2025-11-22T00:00:00+00:00");
        assert_eq!(stored.equippement, Some(json!({ "salle": 5 })));
    }

    #[tokio::test]
    async fn should_reject_unparsable_date() {
        let usecase = CreateRatingUseCase {
            repo: repo_with_rating(),
            refs: StubRefs::default(),
        };
        let mut input = create_input();
        input.date = Some("novembre 22".into());
        let Err(ApiError::Validation(fields)) = usecase.execute(input).await else {
            panic!("expected validation failure");
        };
        assert_eq!(fields["date"], vec!["The date field must be a valid date."]);
    }

    #[tokio::test]
    async fn should_reject_dangling_patient_and_cabinet() {
        let usecase = CreateRatingUseCase {
            repo: repo_with_rating(),
            refs: StubRefs {
                patients: false,
                cabinets: false,
                ..Default::default()
            },
        };
        let Err(ApiError::Validation(fields)) = usecase.execute(create_input()).await else {
            panic!("expected validation failure");
        };
        assert!(fields.contains_key("patient_id"));
        assert!(fields.contains_key("cabinet_id"));
    }

    #[tokio::test]
    async fn should_clear_review_on_explicit_null() {
        let usecase = UpdateRatingUseCase {
            repo: repo_with_rating(),
        };
        usecase
            .execute(
                10,
                UpdateRatingInput {
                    review: Some(None),
                    user_experience: Some(Some(json!({ "attente": 3 }))),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let changes = usecase.repo.updated.lock().unwrap().clone().unwrap();
        assert_eq!(changes.review, Some(None));
        assert_eq!(changes.user_experience, Some(Some(json!({ "attente": 3 }))));
        assert_eq!(changes.equippement, None);
    }

    #[tokio::test]
    async fn should_return_not_found_on_repeated_delete() {
        let usecase = DeleteRatingUseCase {
            repo: MockRatingRepo::default(),
        };
        let result = usecase.execute(10).await;
        assert!(matches!(result, Err(ApiError::NotFound("Rating"))));
    }
}
