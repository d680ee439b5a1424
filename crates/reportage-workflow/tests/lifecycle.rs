//! End-to-end lifecycle tests against the in-memory stores.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use reportage_workflow::{
    derived_status, DerivedStatus, DirectoryRef, ForwardRequest, InMemoryCommentStore,
    InMemoryDirectoryStore, InMemoryRequestHistoryStore, InMemoryRequestStore,
    InMemoryResponseHistoryStore, InMemoryResponseStore, NewReportRequest, NewResponseItem,
    ReportRequest, ReportRequestUpdate, RequestService, RequestStatus, RequestStore,
    ResponseService, StatisticsService, UserProfile, WorkflowError,
};

struct Fixture {
    request_store: Arc<InMemoryRequestStore>,
    directory: Arc<InMemoryDirectoryStore>,
    requests: RequestService,
    responses: ResponseService,
    statistics: StatisticsService,
}

fn profile(id: Uuid, name: &str) -> UserProfile {
    UserProfile {
        id,
        full_name: name.to_string(),
        email: None,
        role: None,
        is_senior: false,
        department: None,
        organizations: vec![],
        is_active: true,
    }
}

fn fixture() -> Fixture {
    let request_store = Arc::new(InMemoryRequestStore::new());
    let response_store = Arc::new(InMemoryResponseStore::new());
    let request_history = Arc::new(InMemoryRequestHistoryStore::new());
    let response_history = Arc::new(InMemoryResponseHistoryStore::new());
    let comments = Arc::new(InMemoryCommentStore::new());
    let directory = Arc::new(InMemoryDirectoryStore::new());

    let requests = RequestService::new(
        request_store.clone(),
        response_store.clone(),
        request_history.clone(),
        response_history.clone(),
        comments.clone(),
        directory.clone(),
    );
    let responses = ResponseService::new(
        response_store.clone(),
        request_store.clone(),
        response_history,
        comments,
        directory.clone(),
    );
    let statistics = StatisticsService::new(response_store, request_store.clone(), directory.clone());

    Fixture {
        request_store,
        directory,
        requests,
        responses,
        statistics,
    }
}

async fn add_user(fixture: &Fixture, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    fixture.directory.put_user(profile(id, name)).await;
    id
}

fn new_request(targets: Vec<Uuid>, days_ahead: i64) -> NewReportRequest {
    NewReportRequest {
        title: "Quarterly report".to_string(),
        description: Some("Summarize Q3 activity".to_string()),
        deadline: Utc::now() + Duration::days(days_ahead),
        target_organizations: vec![],
        target_departments: vec![],
        target_users: targets,
    }
}

fn item(title: &str, content: &str, progress: i32) -> NewResponseItem {
    NewResponseItem {
        title: Some(title.to_string()),
        content: Some(content.to_string()),
        progress: Some(progress),
        difficulties: None,
        display_order: None,
    }
}

/// Insert a request directly through the store, bypassing the creation-time
/// deadline validation. Used to simulate requests whose deadline has passed.
async fn seed_request_with_deadline(
    fixture: &Fixture,
    creator: Uuid,
    targets: Vec<Uuid>,
    deadline: chrono::DateTime<Utc>,
) -> ReportRequest {
    let now = Utc::now();
    let request = ReportRequest {
        id: Uuid::new_v4(),
        title: "Backdated".to_string(),
        description: None,
        deadline,
        status: RequestStatus::Pending,
        created_by: creator,
        created_at: now,
        updated_at: now,
        forwarded_from: None,
        forward_note: None,
        target_organizations: vec![],
        target_departments: vec![],
        target_users: targets,
    };
    fixture.request_store.create(request).await.unwrap()
}

#[tokio::test]
async fn test_create_request_validations() {
    let fx = fixture();
    let manager = add_user(&fx, "Manager").await;
    let recipient = add_user(&fx, "Recipient").await;

    // Past deadline rejected.
    let mut input = new_request(vec![recipient], 7);
    input.deadline = Utc::now() - Duration::hours(1);
    match fx.requests.create_request(manager, input).await {
        Err(WorkflowError::DeadlineInPast) => {}
        other => panic!("expected DeadlineInPast, got {other:?}"),
    }

    // Empty recipient set rejected.
    match fx
        .requests
        .create_request(manager, new_request(vec![], 7))
        .await
    {
        Err(WorkflowError::NoRecipients) => {}
        other => panic!("expected NoRecipients, got {other:?}"),
    }

    // Blank title rejected.
    let mut input = new_request(vec![recipient], 7);
    input.title = "   ".to_string();
    assert!(matches!(
        fx.requests.create_request(manager, input).await,
        Err(WorkflowError::Validation(_))
    ));

    // Valid request starts Pending.
    let request = fx
        .requests
        .create_request(manager, new_request(vec![recipient], 7))
        .await
        .unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.created_by, manager);
}

#[tokio::test]
async fn test_submit_and_evaluate_scenario() {
    let fx = fixture();
    let manager = add_user(&fx, "Manager").await;
    let recipient = add_user(&fx, "Recipient").await;

    let request = fx
        .requests
        .create_request(manager, new_request(vec![recipient], 7))
        .await
        .unwrap();

    let response = fx
        .responses
        .submit(
            recipient,
            request.id,
            Some("weekly note".to_string()),
            vec![item("Q3 work", "done X", 80)],
        )
        .await
        .unwrap();

    // Derived status is SUBMITTED while unscored.
    assert_eq!(
        derived_status(Some(&response)),
        DerivedStatus::Submitted
    );
    // Submission advanced the request status.
    let request = fx.requests.get_request(request.id).await.unwrap();
    assert_eq!(request.status, RequestStatus::Submitted);

    // Evaluator scores 8.5 with a comment.
    let evaluated = fx
        .responses
        .evaluate(manager, response.id, 8.5, Some("Good".to_string()))
        .await
        .unwrap();
    assert_eq!(evaluated.score, Some(8.5));
    assert_eq!(evaluated.comment.as_deref(), Some("Good"));
    assert_eq!(derived_status(Some(&evaluated)), DerivedStatus::Completed);

    let request = fx.requests.get_request(request.id).await.unwrap();
    assert_eq!(request.status, RequestStatus::Completed);

    // Further edits by the submitter fail with a conflict.
    match fx
        .responses
        .update(recipient, response.id, None, vec![item("x", "y", 10)])
        .await
    {
        Err(WorkflowError::ResponseLocked(_)) => {}
        other => panic!("expected ResponseLocked, got {other:?}"),
    }

    // Evaluating again also fails.
    match fx.responses.evaluate(manager, response.id, 9.0, None).await {
        Err(WorkflowError::ResponseLocked(_)) => {}
        other => panic!("expected ResponseLocked, got {other:?}"),
    }

    // The final-evaluation comment was logged.
    let log = fx.responses.comment_history(response.id).await.unwrap();
    assert_eq!(log.len(), 1);
    assert!(log[0].is_final_evaluation);
    assert_eq!(log[0].score, Some(8.5));
}

#[tokio::test]
async fn test_overdue_submission_rejected() {
    let fx = fixture();
    let manager = add_user(&fx, "Manager").await;
    let recipient = add_user(&fx, "Recipient").await;

    let request = seed_request_with_deadline(
        &fx,
        manager,
        vec![recipient],
        Utc::now() - Duration::hours(1),
    )
    .await;

    match fx
        .responses
        .submit(recipient, request.id, None, vec![item("a", "b", 10)])
        .await
    {
        Err(WorkflowError::DeadlineExceeded) => {}
        other => panic!("expected DeadlineExceeded, got {other:?}"),
    }

    // No response row was created.
    assert!(fx
        .responses
        .get_by_request_and_user(request.id, recipient)
        .await
        .unwrap()
        .is_none());

    // Status updates are still permitted on overdue requests.
    let updated = fx
        .requests
        .update_status(recipient, request.id, RequestStatus::InProgress)
        .await
        .unwrap();
    assert_eq!(updated.status, RequestStatus::InProgress);
}

#[tokio::test]
async fn test_overdue_update_rejected() {
    let fx = fixture();
    let manager = add_user(&fx, "Manager").await;
    let recipient = add_user(&fx, "Recipient").await;

    // Deadline slightly in the future: submit, then backdate via a fresh
    // seeded request is not possible for updates, so use a short window by
    // seeding the response against an already-overdue request directly.
    let request = fx
        .requests
        .create_request(manager, new_request(vec![recipient], 7))
        .await
        .unwrap();
    let response = fx
        .responses
        .submit(recipient, request.id, None, vec![item("a", "b", 10)])
        .await
        .unwrap();

    // Creator moves the deadline into the past (administrative edit).
    fx.requests
        .update_request(
            manager,
            request.id,
            ReportRequestUpdate {
                title: request.title.clone(),
                description: request.description.clone(),
                deadline: Utc::now() - Duration::hours(1),
                target_organizations: vec![],
                target_departments: vec![],
                target_users: vec![recipient],
            },
        )
        .await
        .unwrap();

    match fx
        .responses
        .update(recipient, response.id, None, vec![item("c", "d", 20)])
        .await
    {
        Err(WorkflowError::DeadlineExceeded) => {}
        other => panic!("expected DeadlineExceeded, got {other:?}"),
    }
}

#[tokio::test]
async fn test_self_evaluation_exactly_once() {
    let fx = fixture();
    let manager = add_user(&fx, "Manager").await;
    let recipient = add_user(&fx, "Recipient").await;

    let request = fx
        .requests
        .create_request(manager, new_request(vec![recipient], 7))
        .await
        .unwrap();
    let response = fx
        .responses
        .submit(recipient, request.id, None, vec![item("a", "b", 50)])
        .await
        .unwrap();

    let updated = fx
        .responses
        .self_evaluate(recipient, response.id, 7.5)
        .await
        .unwrap();
    assert_eq!(updated.self_score, Some(7.5));

    // Second attempt fails and the first value is kept.
    match fx.responses.self_evaluate(recipient, response.id, 9.9).await {
        Err(WorkflowError::SelfScoreAlreadySet(_)) => {}
        other => panic!("expected SelfScoreAlreadySet, got {other:?}"),
    }
    let current = fx.responses.get_response(response.id).await.unwrap();
    assert_eq!(current.self_score, Some(7.5));

    // Self-evaluation is independent of evaluator scoring: scoring first
    // does not block a not-yet-used self-evaluation.
    let other_recipient = add_user(&fx, "Second").await;
    let request2 = fx
        .requests
        .create_request(manager, new_request(vec![other_recipient], 7))
        .await
        .unwrap();
    let response2 = fx
        .responses
        .submit(other_recipient, request2.id, None, vec![item("a", "b", 10)])
        .await
        .unwrap();
    fx.responses
        .evaluate(manager, response2.id, 6.0, None)
        .await
        .unwrap();
    let after = fx
        .responses
        .self_evaluate(other_recipient, response2.id, 8.0)
        .await
        .unwrap();
    assert_eq!(after.self_score, Some(8.0));
    assert_eq!(after.score, Some(6.0));
}

#[tokio::test]
async fn test_send_back_loop() {
    let fx = fixture();
    let manager = add_user(&fx, "Manager").await;
    let recipient = add_user(&fx, "Recipient").await;

    let request = fx
        .requests
        .create_request(manager, new_request(vec![recipient], 7))
        .await
        .unwrap();
    let response = fx
        .responses
        .submit(recipient, request.id, Some("v1".to_string()), vec![item("a", "b", 30)])
        .await
        .unwrap();

    // Send back requires a comment.
    assert!(matches!(
        fx.responses
            .send_back(manager, response.id, "  ".to_string())
            .await,
        Err(WorkflowError::Validation(_))
    ));

    let sent_back = fx
        .responses
        .send_back(manager, response.id, "add details".to_string())
        .await
        .unwrap();
    assert_eq!(sent_back.score, None);
    assert_eq!(derived_status(Some(&sent_back)), DerivedStatus::Submitted);
    assert_eq!(sent_back.comment.as_deref(), Some("add details"));

    let log = fx.responses.comment_history(response.id).await.unwrap();
    assert_eq!(log.len(), 1);
    assert!(!log[0].is_final_evaluation);
    assert_eq!(log[0].score, None);

    // Recipient revises and resubmits.
    let revised = fx
        .responses
        .update(
            recipient,
            response.id,
            Some("v2".to_string()),
            vec![item("a", "b+details", 60)],
        )
        .await
        .unwrap();
    assert_eq!(revised.note.as_deref(), Some("v2"));
    assert_eq!(revised.score, None);

    let history = fx.responses.history(recipient, response.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].version, 1);
    // The snapshot holds the pre-change content.
    assert_eq!(history[0].snapshot.note.as_deref(), Some("v1"));
}

#[tokio::test]
async fn test_history_monotonicity() {
    let fx = fixture();
    let manager = add_user(&fx, "Manager").await;
    let recipient = add_user(&fx, "Recipient").await;

    let request = fx
        .requests
        .create_request(manager, new_request(vec![recipient], 7))
        .await
        .unwrap();

    // Creation leaves no history row (implicit version 0).
    assert!(fx.requests.history(request.id).await.unwrap().is_empty());

    // Three distinct edits produce versions 1..=3.
    for n in 1..=3 {
        fx.requests
            .update_request(
                manager,
                request.id,
                ReportRequestUpdate {
                    title: format!("Edited {n}"),
                    description: request.description.clone(),
                    deadline: request.deadline,
                    target_organizations: vec![],
                    target_departments: vec![],
                    target_users: vec![recipient],
                },
            )
            .await
            .unwrap();
    }

    let history = fx.requests.history(request.id).await.unwrap();
    let versions: Vec<i32> = history.iter().map(|e| e.version).collect();
    assert_eq!(versions, vec![3, 2, 1]);
    // The first snapshot holds the original title.
    assert_eq!(history.last().unwrap().snapshot.title, "Quarterly report");

    // An identical edit is a no-op and appends nothing.
    fx.requests
        .update_request(
            manager,
            request.id,
            ReportRequestUpdate {
                title: "Edited 3".to_string(),
                description: request.description.clone(),
                deadline: request.deadline,
                target_organizations: vec![],
                target_departments: vec![],
                target_users: vec![recipient],
            },
        )
        .await
        .unwrap();
    assert_eq!(fx.requests.history(request.id).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_forward_independence() {
    let fx = fixture();
    let manager = add_user(&fx, "Manager").await;
    let recipient = add_user(&fx, "Recipient").await;
    let next_recipient = add_user(&fx, "Next").await;

    let source = fx
        .requests
        .create_request(manager, new_request(vec![recipient], 7))
        .await
        .unwrap();
    fx.responses
        .submit(recipient, source.id, None, vec![item("a", "b", 40)])
        .await
        .unwrap();

    let before = fx.requests.get_request(source.id).await.unwrap();
    let before_responses = fx.responses.list_by_request(source.id).await.unwrap();
    let before_history = fx.requests.history(source.id).await.unwrap();

    let forwarded = fx
        .requests
        .forward(
            recipient,
            source.id,
            ForwardRequest {
                title: "Forwarded: quarterly report".to_string(),
                forward_note: Some("please handle".to_string()),
                deadline: Utc::now() + Duration::days(3),
                target_users: vec![next_recipient],
            },
        )
        .await
        .unwrap();

    // The forwarded request is new, Pending, owned by the forwarder,
    // carries provenance, and has no responses.
    assert_ne!(forwarded.id, source.id);
    assert_eq!(forwarded.status, RequestStatus::Pending);
    assert_eq!(forwarded.created_by, recipient);
    assert_eq!(forwarded.forwarded_from, Some(source.id));
    assert!(forwarded
        .description
        .as_deref()
        .unwrap()
        .contains("please handle"));
    assert!(fx
        .responses
        .list_by_request(forwarded.id)
        .await
        .unwrap()
        .is_empty());

    // The source is byte-for-byte unchanged.
    let after = fx.requests.get_request(source.id).await.unwrap();
    assert_eq!(after, before);
    assert_eq!(
        fx.responses.list_by_request(source.id).await.unwrap(),
        before_responses
    );
    assert_eq!(fx.requests.history(source.id).await.unwrap(), before_history);
}

#[tokio::test]
async fn test_forward_authorization() {
    let fx = fixture();
    let manager = add_user(&fx, "Manager").await;
    let recipient = add_user(&fx, "Recipient").await;
    let stranger = add_user(&fx, "Stranger").await;

    let source = fx
        .requests
        .create_request(manager, new_request(vec![recipient], 7))
        .await
        .unwrap();

    let input = ForwardRequest {
        title: "fw".to_string(),
        forward_note: None,
        deadline: Utc::now() + Duration::days(1),
        target_users: vec![recipient],
    };

    match fx.requests.forward(stranger, source.id, input.clone()).await {
        Err(WorkflowError::ForwardNotPermitted) => {}
        other => panic!("expected ForwardNotPermitted, got {other:?}"),
    }

    // Creator and recipient may forward.
    assert!(fx.requests.forward(manager, source.id, input.clone()).await.is_ok());
    assert!(fx.requests.forward(recipient, source.id, input).await.is_ok());
}

#[tokio::test]
async fn test_status_transition_rules() {
    let fx = fixture();
    let manager = add_user(&fx, "Manager").await;
    let recipient = add_user(&fx, "Recipient").await;
    let stranger = add_user(&fx, "Stranger").await;

    let request = fx
        .requests
        .create_request(manager, new_request(vec![recipient], 7))
        .await
        .unwrap();

    // Non-recipient cannot touch the status.
    match fx
        .requests
        .update_status(stranger, request.id, RequestStatus::InProgress)
        .await
    {
        Err(WorkflowError::NotRecipient) => {}
        other => panic!("expected NotRecipient, got {other:?}"),
    }

    // Recipient: Pending -> InProgress -> Completed.
    fx.requests
        .update_status(recipient, request.id, RequestStatus::InProgress)
        .await
        .unwrap();
    // Recipient cannot jump to Submitted by hand.
    match fx
        .requests
        .update_status(recipient, request.id, RequestStatus::Submitted)
        .await
    {
        Err(WorkflowError::InvalidTransition { .. }) => {}
        other => panic!("expected InvalidTransition, got {other:?}"),
    }
    fx.requests
        .update_status(recipient, request.id, RequestStatus::Completed)
        .await
        .unwrap();

    // Recipient cannot leave a terminal state.
    match fx
        .requests
        .update_status(recipient, request.id, RequestStatus::InProgress)
        .await
    {
        Err(WorkflowError::InvalidTransition { .. }) => {}
        other => panic!("expected InvalidTransition, got {other:?}"),
    }

    // The creator may reopen from Completed (explicit administrative action).
    let reopened = fx
        .requests
        .update_status(manager, request.id, RequestStatus::InProgress)
        .await
        .unwrap();
    assert_eq!(reopened.status, RequestStatus::InProgress);

    // Cancelled is final even for the creator.
    fx.requests
        .update_status(manager, request.id, RequestStatus::Cancelled)
        .await
        .unwrap();
    match fx
        .requests
        .update_status(manager, request.id, RequestStatus::Pending)
        .await
    {
        Err(WorkflowError::TerminalStatus(RequestStatus::Cancelled)) => {}
        other => panic!("expected TerminalStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_duplicate_submission_rejected() {
    let fx = fixture();
    let manager = add_user(&fx, "Manager").await;
    let recipient = add_user(&fx, "Recipient").await;

    let request = fx
        .requests
        .create_request(manager, new_request(vec![recipient], 7))
        .await
        .unwrap();
    fx.responses
        .submit(recipient, request.id, None, vec![item("a", "b", 10)])
        .await
        .unwrap();

    match fx
        .responses
        .submit(recipient, request.id, None, vec![item("c", "d", 20)])
        .await
    {
        Err(WorkflowError::ResponseAlreadySubmitted) => {}
        other => panic!("expected ResponseAlreadySubmitted, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_recipient_cannot_submit() {
    let fx = fixture();
    let manager = add_user(&fx, "Manager").await;
    let recipient = add_user(&fx, "Recipient").await;
    let stranger = add_user(&fx, "Stranger").await;

    let request = fx
        .requests
        .create_request(manager, new_request(vec![recipient], 7))
        .await
        .unwrap();

    match fx
        .responses
        .submit(stranger, request.id, None, vec![item("a", "b", 10)])
        .await
    {
        Err(WorkflowError::NotRecipient) => {}
        other => panic!("expected NotRecipient, got {other:?}"),
    }
}

#[tokio::test]
async fn test_item_validation_at_submission() {
    let fx = fixture();
    let manager = add_user(&fx, "Manager").await;
    let recipient = add_user(&fx, "Recipient").await;

    let request = fx
        .requests
        .create_request(manager, new_request(vec![recipient], 7))
        .await
        .unwrap();

    let blank = NewResponseItem {
        title: None,
        content: Some("   ".to_string()),
        ..Default::default()
    };
    match fx.responses.submit(recipient, request.id, None, vec![blank]).await {
        Err(WorkflowError::EmptyItem(0)) => {}
        other => panic!("expected EmptyItem, got {other:?}"),
    }

    let bad_progress = NewResponseItem {
        title: Some("ok".to_string()),
        progress: Some(-5),
        ..Default::default()
    };
    match fx
        .responses
        .submit(recipient, request.id, None, vec![bad_progress])
        .await
    {
        Err(WorkflowError::ProgressOutOfRange(-5)) => {}
        other => panic!("expected ProgressOutOfRange, got {other:?}"),
    }
}

#[tokio::test]
async fn test_score_range_validation() {
    let fx = fixture();
    let manager = add_user(&fx, "Manager").await;
    let recipient = add_user(&fx, "Recipient").await;

    let request = fx
        .requests
        .create_request(manager, new_request(vec![recipient], 7))
        .await
        .unwrap();
    let response = fx
        .responses
        .submit(recipient, request.id, None, vec![item("a", "b", 10)])
        .await
        .unwrap();

    assert!(matches!(
        fx.responses.evaluate(manager, response.id, 10.5, None).await,
        Err(WorkflowError::ScoreOutOfRange(_))
    ));
    assert!(matches!(
        fx.responses.self_evaluate(recipient, response.id, -1.0).await,
        Err(WorkflowError::ScoreOutOfRange(_))
    ));
}

#[tokio::test]
async fn test_update_replaces_items_and_keeps_attachments() {
    let fx = fixture();
    let manager = add_user(&fx, "Manager").await;
    let recipient = add_user(&fx, "Recipient").await;

    let request = fx
        .requests
        .create_request(manager, new_request(vec![recipient], 7))
        .await
        .unwrap();
    let response = fx
        .responses
        .submit(recipient, request.id, None, vec![item("a", "b", 10)])
        .await
        .unwrap();

    // Attach a file to the first item.
    let item_id = response.items[0].id;
    fx.responses
        .attach_item_file(
            recipient,
            item_id,
            reportage_workflow::FileMetadata {
                file_name: "evidence.pdf".to_string(),
                file_path: "reports/x/evidence.pdf".to_string(),
                file_type: Some("application/pdf".to_string()),
                file_size: 1024,
            },
        )
        .await
        .unwrap();

    // Revising the item at the same position keeps its attachment.
    let revised = fx
        .responses
        .update(recipient, response.id, None, vec![item("a", "revised", 50)])
        .await
        .unwrap();
    let attachment = revised.items[0].attachment.as_ref().unwrap();
    assert_eq!(attachment.file_name, "evidence.pdf");
}

#[tokio::test]
async fn test_delete_request_cascades() {
    let fx = fixture();
    let manager = add_user(&fx, "Manager").await;
    let recipient = add_user(&fx, "Recipient").await;

    let request = fx
        .requests
        .create_request(manager, new_request(vec![recipient], 7))
        .await
        .unwrap();
    let response = fx
        .responses
        .submit(recipient, request.id, None, vec![item("a", "b", 10)])
        .await
        .unwrap();
    fx.responses
        .attach_item_file(
            recipient,
            response.items[0].id,
            reportage_workflow::FileMetadata {
                file_name: "f.png".to_string(),
                file_path: "reports/f.png".to_string(),
                file_type: None,
                file_size: 10,
            },
        )
        .await
        .unwrap();

    // Only the creator may delete.
    assert!(matches!(
        fx.requests.delete_request(recipient, request.id).await,
        Err(WorkflowError::NotCreator)
    ));

    let files = fx.requests.delete_request(manager, request.id).await.unwrap();
    assert_eq!(files.len(), 1);
    assert!(matches!(
        fx.requests.get_request(request.id).await,
        Err(WorkflowError::RequestNotFound(_))
    ));
    assert!(matches!(
        fx.responses.get_response(response.id).await,
        Err(WorkflowError::ResponseNotFound(_))
    ));
}

#[tokio::test]
async fn test_statistics_rollup() {
    let fx = fixture();
    let manager = add_user(&fx, "Manager").await;
    let recipient = add_user(&fx, "Recipient").await;

    let request = fx
        .requests
        .create_request(manager, new_request(vec![recipient], 7))
        .await
        .unwrap();
    let response = fx
        .responses
        .submit(recipient, request.id, None, vec![item("a", "b", 10)])
        .await
        .unwrap();
    fx.responses
        .evaluate(manager, response.id, 9.0, None)
        .await
        .unwrap();

    let stats = fx.statistics.statistics(Some(recipient)).await.unwrap();
    assert_eq!(stats.summary.total_reports, 1);
    assert_eq!(stats.summary.on_time_reports, 1);
    assert_eq!(stats.summary.overdue_reports, 0);
    assert_eq!(stats.summary.average_score, Some(9.0));
    assert_eq!(stats.reports.len(), 1);
    assert_eq!(stats.reports[0].seq, 1);
    assert_eq!(stats.reports[0].report_name, "Quarterly report");
    assert!(stats.reports[0].on_time);

    // Another user has no reports.
    let other = add_user(&fx, "Other").await;
    let empty = fx.statistics.statistics(Some(other)).await.unwrap();
    assert_eq!(empty.summary.total_reports, 0);
    assert_eq!(empty.summary.average_score, None);
}

#[tokio::test]
async fn test_request_rollup_counts() {
    let fx = fixture();
    let manager = add_user(&fx, "Manager").await;
    let first = add_user(&fx, "First").await;
    let second = add_user(&fx, "Second").await;
    let third = add_user(&fx, "Third").await;

    let request = fx
        .requests
        .create_request(manager, new_request(vec![first, second, third], 7))
        .await
        .unwrap();

    let response = fx
        .responses
        .submit(first, request.id, None, vec![item("a", "b", 10)])
        .await
        .unwrap();
    fx.responses.evaluate(manager, response.id, 8.0, None).await.unwrap();
    fx.responses
        .submit(second, request.id, None, vec![item("c", "d", 20)])
        .await
        .unwrap();

    let request = fx.requests.get_request(request.id).await.unwrap();
    let rollup = fx.requests.rollup(&request).await.unwrap();
    assert_eq!(rollup.completed_count, 1);
    assert_eq!(rollup.submitted_count, 1);
    assert_eq!(rollup.pending_count, 1);
    assert_eq!(rollup.completed_user_ids, vec![first]);
}
