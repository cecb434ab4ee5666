use chrono::NaiveDate;
use nertodo_core::db::open_db_in_memory;
use nertodo_core::{
    Entity, EntityType, FixedClock, NerClient, NerError, NerResponse, NerResult,
    SqliteTaskRepository, SqliteUserRepository, SuggestStatus, TaskDraft, TaskService, User,
    UserCredentials, UserRepository,
};
use uuid::Uuid;
use std::cell::Cell;
use std::sync::Arc;

struct StubNer {
    reply: NerResult<NerResponse>,
    calls: Cell<usize>,
}

impl StubNer {
    fn replying(reply: NerResult<NerResponse>) -> Self {
        Self {
            reply,
            calls: Cell::new(0),
        }
    }

    fn entities(success: bool, data: Vec<Entity>) -> Self {
        Self::replying(Ok(NerResponse { success, data }))
    }
}

impl NerClient for StubNer {
    fn extract(&self, _input: &str) -> NerResult<NerResponse> {
        self.calls.set(self.calls.get() + 1);
        self.reply.clone()
    }
}

// 2024-01-03 is a Wednesday.
fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()
}

fn prior() -> TaskDraft {
    TaskDraft {
        title: "typed by hand".to_string(),
        deadline: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
    }
}

fn with_service(check: impl FnOnce(&TaskService<SqliteTaskRepository<'_>>)) {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(
        SqliteTaskRepository::new(&conn),
        Arc::new(FixedClock::at_date(today())),
    );
    check(&service);
}

#[test]
fn two_entity_response_replaces_draft() {
    let ner = StubNer::entities(
        true,
        vec![
            Entity::new("Submit report", EntityType::ActionItem),
            Entity::new("next Monday", EntityType::RelativeDay),
        ],
    );
    with_service(|service| {
        let outcome = service.suggest_task(&ner, "Submit report by next Monday", prior());
        assert!(outcome.applied());
        assert_eq!(outcome.draft.title, "Submit report");
        assert_eq!(
            outcome.draft.deadline,
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
        );
    });
}

#[test]
fn unrecognized_day_phrase_resolves_to_today() {
    let ner = StubNer::entities(
        true,
        vec![
            Entity::new("Submit report", EntityType::ActionItem),
            Entity::new("soonish", EntityType::RelativeDay),
        ],
    );
    with_service(|service| {
        let outcome = service.suggest_task(&ner, "Submit report soonish", prior());
        assert!(outcome.applied());
        assert_eq!(outcome.draft.deadline, today());
    });
}

#[test]
fn gate_keeps_prior_draft_when_entity_count_differs() {
    let ner = StubNer::entities(
        true,
        vec![Entity::new("next friday", EntityType::RelativeDay)],
    );
    with_service(|service| {
        let outcome = service.suggest_task(&ner, "next friday", prior());
        assert_eq!(outcome.draft, prior());
        assert_eq!(
            outcome.status,
            SuggestStatus::Gated {
                success: true,
                entities: 1
            }
        );
    });
}

#[test]
fn gate_keeps_prior_draft_when_service_reports_failure() {
    let ner = StubNer::entities(
        false,
        vec![
            Entity::new("Submit report", EntityType::ActionItem),
            Entity::new("monday", EntityType::RelativeDay),
        ],
    );
    with_service(|service| {
        let outcome = service.suggest_task(&ner, "Submit report monday", prior());
        assert_eq!(outcome.draft, prior());
        assert!(!outcome.applied());
    });
}

#[test]
fn two_entities_without_relative_day_stay_unresolved() {
    let ner = StubNer::entities(
        true,
        vec![
            Entity::new("Submit report", EntityType::ActionItem),
            Entity::new("2024-02-01", EntityType::AbsoluteDate),
        ],
    );
    with_service(|service| {
        let outcome = service.suggest_task(&ner, "Submit report on 2024-02-01", prior());
        assert_eq!(outcome.status, SuggestStatus::Unresolved);
        assert_eq!(outcome.draft, prior());
    });
}

#[test]
fn ner_failure_keeps_prior_draft_and_reports_error() {
    let ner = StubNer::replying(Err(NerError::Http("connection refused".to_string())));
    with_service(|service| {
        let outcome = service.suggest_task(&ner, "Submit report by Friday", prior());
        assert_eq!(outcome.draft, prior());
        assert!(matches!(outcome.status, SuggestStatus::Failed(NerError::Http(_))));
    });
}

#[test]
fn blank_sentence_skips_the_ner_call() {
    let ner = StubNer::entities(true, Vec::new());
    with_service(|service| {
        let outcome = service.suggest_task(&ner, "   ", prior());
        assert_eq!(outcome.status, SuggestStatus::BlankInput);
        assert_eq!(outcome.draft, prior());
    });
    assert_eq!(ner.calls.get(), 0);
}

#[test]
fn blank_resolved_title_keeps_prior_title_and_stays_creatable() {
    let ner = StubNer::entities(
        true,
        vec![
            Entity::new("next friday", EntityType::RelativeDay),
            Entity::new("2024-02-01", EntityType::AbsoluteDate),
        ],
    );
    let conn = open_db_in_memory().unwrap();
    let user = User {
        id: Uuid::new_v4(),
        username: "ada".to_string(),
        email: "ada@example.com".to_string(),
    };
    SqliteUserRepository::new(&conn)
        .insert_user(&UserCredentials {
            user: user.clone(),
            password_hash: "unused".to_string(),
        })
        .unwrap();
    let service = TaskService::new(
        SqliteTaskRepository::new(&conn),
        Arc::new(FixedClock::at_date(today())),
    );

    let outcome = service.suggest_task(&ner, "next friday", prior());
    assert!(outcome.applied());
    assert_eq!(outcome.draft.title, "typed by hand");
    assert_eq!(
        outcome.draft.deadline,
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    );
    assert!(outcome.draft.has_title());

    let task = service
        .create_task(user.id, &outcome.draft.title, "2024-01-05")
        .unwrap();
    assert_eq!(task.title, "typed by hand");
}

#[test]
fn blank_resolved_title_over_blank_prior_is_not_creatable() {
    let ner = StubNer::entities(
        true,
        vec![
            Entity::new("next friday", EntityType::RelativeDay),
            Entity::new("2024-02-01", EntityType::AbsoluteDate),
        ],
    );
    with_service(|service| {
        let outcome = service.suggest_task(&ner, "next friday", service.default_draft());
        assert!(outcome.applied());
        assert_eq!(outcome.draft.title, "");
        assert!(!outcome.draft.has_title());
    });
}
