use serde_json::Value;

use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{MessageRepository, RefLookupPort};
use crate::domain::types::{MessageChanges, MessageStatus, MessageView, NewMessage, parse_datetime};
use crate::error::{ApiError, ValidationErrors};
use crate::usecase::present;

// ── ListMessages ─────────────────────────────────────────────────────────────

pub struct ListMessagesUseCase<R: MessageRepository> {
    pub repo: R,
}

impl<R: MessageRepository> ListMessagesUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<MessageView>, ApiError> {
        self.repo.list(page).await
    }
}

// ── GetMessage ───────────────────────────────────────────────────────────────

pub struct GetMessageUseCase<R: MessageRepository> {
    pub repo: R,
}

impl<R: MessageRepository> GetMessageUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<MessageView, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("Message"))
    }
}

// ── SendMessage ──────────────────────────────────────────────────────────────

pub struct SendMessageInput {
    pub sender_id: Option<i64>,
    pub receiver_id: Option<i64>,
    pub cabinet_id: Option<i64>,
    pub date: Option<String>,
    pub content: Option<Value>,
    pub status: Option<String>,
    pub attachments: Option<Value>,
}

pub struct SendMessageUseCase<R: MessageRepository, L: RefLookupPort> {
    pub repo: R,
    pub refs: L,
}

impl<R: MessageRepository, L: RefLookupPort> SendMessageUseCase<R, L> {
    pub async fn execute(&self, input: SendMessageInput) -> Result<MessageView, ApiError> {
        let mut errors = ValidationErrors::new();

        let sender_id = match input.sender_id {
            None => {
                errors.required("sender_id");
                None
            }
            Some(v) => {
                if self.refs.user_exists(v).await? {
                    Some(v)
                } else {
                    errors.invalid_choice("sender_id");
                    None
                }
            }
        };
        let receiver_id = match input.receiver_id {
            None => {
                errors.required("receiver_id");
                None
            }
            Some(v) => {
                if self.refs.user_exists(v).await? {
                    Some(v)
                } else {
                    errors.invalid_choice("receiver_id");
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

        let content = match input.content.filter(|v| !v.is_null()) {
            None => {
                errors.required("content");
                None
            }
            Some(v) => Some(v),
        };

        let status = match present(input.status.as_deref()) {
            None => {
                errors.required("status");
                None
            }
            Some(v) => match MessageStatus::parse(v) {
                Some(s) => Some(s),
                None => {
                    errors.invalid_choice("status");
                    None
                }
            },
        };

        let attachments = input.attachments.filter(|v| !v.is_null());
        if let Some(v) = &attachments {
            if !v.is_array() && !v.is_object() {
                errors.must_be_array("attachments");
            }
        }

        errors.into_result()?;
        let (
            Some(sender_id),
            Some(receiver_id),
            Some(cabinet_id),
            Some(date),
            Some(content),
            Some(status),
        ) = (sender_id, receiver_id, cabinet_id, date, content, status)
        else {
            return Err(ApiError::Internal(anyhow::anyhow!(
                "message validation passed with required fields missing"
            )));
        };

        let new = NewMessage {
            sender_id,
            receiver_id,
            cabinet_id,
            date,
            content,
            status,
            attachments,
        };
        let id = self.repo.create(&new).await?;
        self.repo.find_by_id(id).await?.ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!("message {id} missing right after insert"))
        })
    }
}

// ── UpdateMessage ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateMessageInput {
    pub content: Option<Value>,
    pub status: Option<String>,
    pub attachments: Option<Option<Value>>,
}

pub struct UpdateMessageUseCase<R: MessageRepository> {
    pub repo: R,
}

impl<R: MessageRepository> UpdateMessageUseCase<R> {
    pub async fn execute(&self, id: i64, input: UpdateMessageInput) -> Result<MessageView, ApiError> {
        if !self.repo.exists(id).await? {
            return Err(ApiError::NotFound("Message"));
        }

        let mut errors = ValidationErrors::new();

        let status = match present(input.status.as_deref()) {
            None => None,
            Some(v) => match MessageStatus::parse(v) {
                Some(s) => Some(s),
                None => {
                    errors.invalid_choice("status");
                    None
                }
            },
        };

        let attachments = input
            .attachments
            .map(|inner| inner.filter(|v| !v.is_null()));
        if let Some(Some(v)) = &attachments {
            if !v.is_array() && !v.is_object() {
                errors.must_be_array("attachments");
            }
        }

        errors.into_result()?;

        let changes = MessageChanges {
            content: input.content.filter(|v| !v.is_null()),
            status,
            attachments,
        };
        self.repo.update(id, &changes).await?;
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("Message"))
    }
}

// ── MarkMessageSeen ──────────────────────────────────────────────────────────

pub struct MarkMessageSeenUseCase<R: MessageRepository> {
    pub repo: R,
}

impl<R: MessageRepository> MarkMessageSeenUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<MessageView, ApiError> {
        if !self.repo.exists(id).await? {
            return Err(ApiError::NotFound("Message"));
        }
        let changes = MessageChanges {
            status: Some(MessageStatus::Seen),
            ..Default::default()
        };
        self.repo.update(id, &changes).await?;
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("Message"))
    }
}

// ── DeleteMessage ────────────────────────────────────────────────────────────

pub struct DeleteMessageUseCase<R: MessageRepository> {
    pub repo: R,
}

impl<R: MessageRepository> DeleteMessageUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<(), ApiError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(ApiError::NotFound("Message"))
        }
    }
}

// ── Lookups ──────────────────────────────────────────────────────────────────

pub struct GetConversationUseCase<R: MessageRepository> {
    pub repo: R,
}

impl<R: MessageRepository> GetConversationUseCase<R> {
    pub async fn execute(
        &self,
        user_a: i64,
        user_b: i64,
        page: PageRequest,
    ) -> Result<Page<MessageView>, ApiError> {
        self.repo.conversation(user_a, user_b, page).await
    }
}

pub struct GetMessagesByUserUseCase<R: MessageRepository> {
    pub repo: R,
}

impl<R: MessageRepository> GetMessagesByUserUseCase<R> {
    pub async fn execute(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> Result<Page<MessageView>, ApiError> {
        self.repo.list_by_user(user_id, page).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::usecase::testutil::{StubRefs, empty_page, message};

    #[derive(Default)]
    struct MockMessageRepo {
        message: Option<MessageView>,
        created: Mutex<Option<NewMessage>>,
        updated: Mutex<Option<MessageChanges>>,
    }

    impl MessageRepository for MockMessageRepo {
        async fn list(&self, page: PageRequest) -> Result<Page<MessageView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn find_by_id(&self, _id: i64) -> Result<Option<MessageView>, ApiError> {
            Ok(self.message.clone())
        }
        async fn exists(&self, _id: i64) -> Result<bool, ApiError> {
            Ok(self.message.is_some())
        }
        async fn create(&self, new: &NewMessage) -> Result<i64, ApiError> {
            *self.created.lock().unwrap() = Some(new.clone());
            Ok(5)
        }
        async fn update(&self, _id: i64, changes: &MessageChanges) -> Result<(), ApiError> {
            *self.updated.lock().unwrap() = Some(changes.clone());
            Ok(())
        }
        async fn delete(&self, _id: i64) -> Result<bool, ApiError> {
            Ok(self.message.is_some())
        }
        async fn conversation(
            &self,
            _user_a: i64,
            _user_b: i64,
            page: PageRequest,
        ) -> Result<Page<MessageView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn list_by_user(
            &self,
            _user_id: i64,
            page: PageRequest,
        ) -> Result<Page<MessageView>, ApiError> {
            Ok(empty_page(page))
        }
    }

    fn repo_with_message() -> MockMessageRepo {
        MockMessageRepo {
            message: Some(MessageView::from(message(5))),
            ..Default::default()
        }
    }

    fn send_input() -> SendMessageInput {
        SendMessageInput {
            sender_id: Some(1),
            receiver_id: Some(2),
            cabinet_id: Some(1),
            date: Some("2025-11-22 09:30:00".into()),
            content: Some(json!({ "text": "Bonjour docteur" })),
            status: Some("unseen".into()),
            attachments: None,
        }
    }

    #[tokio::test]
    async fn should_send_message_with_structured_content() {
        let usecase = SendMessageUseCase {
            repo: repo_with_message(),
            refs: StubRefs::default(),
        };
        let view = usecase.execute(send_input()).await.unwrap();
        assert_eq!(view.message.id, 5);

        let stored = usecase.repo.created.lock().unwrap().clone().unwrap();
        assert_eq!(stored.status, MessageStatus::Unseen);
        assert_eq!(stored.content, json!({ "text": "Bonjour docteur" }));
    }

    #[tokio::test]
    async fn should_require_date_and_content() {
        let usecase = SendMessageUseCase {
            repo: repo_with_message(),
            refs: StubRefs::default(),
        };
        let mut input = send_input();
        input.date = None;
        input.content = Some(json!(null));
        let Err(ApiError::Validation(fields)) = usecase.execute(input).await else {
            panic!("expected validation failure");
        };
        assert_eq!(fields["date"], vec!["The date field is required."]);
        assert_eq!(fields["content"], vec!["The content field is required."]);
    }

    #[tokio::test]
    async fn should_check_both_ends_of_the_conversation() {
        let usecase = SendMessageUseCase {
            repo: repo_with_message(),
            refs: StubRefs {
                users: false,
                ..Default::default()
            },
        };
        let Err(ApiError::Validation(fields)) = usecase.execute(send_input()).await else {
            panic!("expected validation failure");
        };
        assert!(fields.contains_key("sender_id"));
        assert!(fields.contains_key("receiver_id"));
    }

    #[tokio::test]
    async fn should_reject_scalar_attachments() {
        let usecase = SendMessageUseCase {
            repo: repo_with_message(),
            refs: StubRefs::default(),
        };
        let mut input = send_input();
        input.attachments = Some(json!("scan.pdf"));
        let Err(ApiError::Validation(fields)) = usecase.execute(input).await else {
            panic!("expected validation failure");
        };
        assert_eq!(
            fields["attachments"],
            vec!["The attachments field must be an array."]
        );
    }

    #[tokio::test]
    async fn should_mark_message_seen() {
        let usecase = MarkMessageSeenUseCase {
            repo: repo_with_message(),
        };
        usecase.execute(5).await.unwrap();
        let changes = usecase.repo.updated.lock().unwrap().clone().unwrap();
        assert_eq!(changes.status, Some(MessageStatus::Seen));
        assert_eq!(changes.content, None);
    }

    #[tokio::test]
    async fn should_return_not_found_when_marking_missing_message() {
        let usecase = MarkMessageSeenUseCase {
            repo: MockMessageRepo::default(),
        };
        let result = usecase.execute(5).await;
        assert!(matches!(result, Err(ApiError::NotFound("Message"))));
    }

    #[tokio::test]
    async fn should_accept_any_user_pair_for_conversations() {
        let usecase = GetConversationUseCase {
            repo: MockMessageRepo::default(),
        };
        let page = usecase
            .execute(1, 999, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }
}
