use pinnacle_review::errors::{ApiFailure, ValidationError};
use pinnacle_review::workflow::error_map::{api_message, user_message, validation_message, Operation};
use pinnacle_review::AppError;

fn failure(code: Option<&str>, message: &str) -> ApiFailure {
    ApiFailure {
        status: Some(400),
        code: code.map(str::to_owned),
        message: message.to_owned(),
    }
}

#[test]
fn known_codes_map_to_guidance() {
    let cases = [
        (Some("SESSION_OUTSIDE_ALLOWED_WINDOW"), "x", "outside the window"),
        (Some("NO_AVAILABLE_RESOURCE"), "", "No rooms or online resources"),
        (Some("RESOURCE_UNAVAILABLE"), "Room 301 taken", "no longer available"),
        (None, "Replacement teacher not found", "could not be found"),
        (Some("TEACHER_SCHEDULE_CONFLICT"), "conflict", "already teaches"),
        (None, "Request already processed by another reviewer", "already been decided"),
        (Some("INVALID_REQUEST_STATUS"), "status is APPROVED", "already been decided"),
        (None, "Session not found", "no longer exists"),
        (Some("REASON_TOO_SHORT"), "", "more detailed rejection reason"),
    ];
    for (code, message, expected) in cases {
        let mapped = api_message(&failure(code, message), Operation::SaveDecision);
        assert!(
            mapped.contains(expected),
            "{code:?}/{message:?} mapped to {mapped:?}"
        );
    }
}

#[test]
fn readable_suffix_survives_technical_prefix() {
    let mapped = api_message(
        &failure(None, "ERR_SLOT: session must start at least 24 hours from now"),
        Operation::SaveDecision,
    );
    assert_eq!(mapped, "Session must start at least 24 hours from now.");
}

#[test]
fn nested_technical_prefixes_are_all_stripped() {
    let mapped = api_message(&failure(
        None,
        "BusinessException: ERR_SLOT: class is locked for editing!",
    ), Operation::SaveDecision);
    assert_eq!(mapped, "Class is locked for editing!");
}

#[test]
fn unreadable_messages_fall_back_to_generic() {
    for message in [
        "java.lang.NullPointerException: null",
        "Internal Server Error",
        "SQL_ERROR: select * from sessions where id = 4",
        "ERR_X: failed at com.pinnacle.Service.approve(Service.java:88)",
        "ERR_X: request 3f2b8c1e-9a4d-4e7b-8c1a-2b3c4d5e6f70 failed",
        "",
    ] {
        assert_eq!(
            api_message(&failure(None, message), Operation::SaveDecision),
            Operation::SaveDecision.fallback(),
            "{message:?}"
        );
    }
}

#[test]
fn only_first_line_is_considered() {
    let mapped = api_message(&failure(
        None,
        "ERR_CAPACITY: class size exceeds room capacity\n\tat com.pinnacle.Rooms.check(Rooms.java:12)",
    ), Operation::SaveDecision);
    assert_eq!(mapped, "Class size exceeds room capacity.");
}

#[test]
fn transport_and_auth_errors_have_fixed_messages() {
    assert!(user_message(&AppError::Http("connect timeout".into()), Operation::SaveDecision).contains("Could not reach the server"));
    assert!(user_message(&AppError::Unauthorized("expired".into()), Operation::SaveDecision).contains("not allowed"));
    assert!(user_message(&AppError::Decode("bad json".into()), Operation::SaveDecision).contains("unexpected response"));
    assert_eq!(user_message(&AppError::Io("disk".into()), Operation::SaveDecision), Operation::SaveDecision.fallback());
}

#[test]
fn not_found_prefers_known_phrases() {
    assert!(user_message(&AppError::NotFound("Session not found".into()), Operation::SaveDecision).contains("session for this request"));
    assert!(user_message(&AppError::NotFound("no such row".into()), Operation::SaveDecision).contains("This request no longer exists"));
}

#[test]
fn validation_messages_are_actionable() {
    assert_eq!(
        validation_message(&ValidationError::ReasonTooShort { min: 10, actual: 3 }),
        "Please enter a rejection reason of at least 10 characters."
    );
    assert!(validation_message(&ValidationError::ReplacementTeacherRequired).contains("replacement teacher"));
    assert!(validation_message(&ValidationError::ResourceSelectionRequired).contains("room or online resource"));
    assert!(validation_message(&ValidationError::OptionsLoading).contains("still loading"));
    assert!(
        user_message(&AppError::Validation(ValidationError::NotDecidable(
            pinnacle_review::models::request::RequestStatus::Approved
        )), Operation::SaveDecision)
        .contains("APPROVED")
    );
}

#[test]
fn bare_error_prefix_is_stripped() {
    let mapped = api_message(
        &failure(None, "Error: class is locked for editing"),
        Operation::SaveDecision,
    );
    assert_eq!(mapped, "Class is locked for editing.");

    let mapped = api_message(
        &failure(None, "IllegalStateError: slot already closed for changes"),
        Operation::SaveDecision,
    );
    assert_eq!(mapped, "Slot already closed for changes.");
}

#[test]
fn fallbacks_name_the_failed_operation() {
    let unreadable = failure(None, "upstream down");
    let load_options = api_message(&unreadable, Operation::LoadOptions);
    assert!(load_options.contains("rooms or replacement teachers"), "{load_options}");
    assert!(!load_options.contains("saving"));

    assert!(api_message(&unreadable, Operation::LoadList).contains("request list"));
    assert!(api_message(&unreadable, Operation::LoadRequest).contains("this request"));
    assert!(api_message(&unreadable, Operation::SaveDecision).contains("saving the decision"));

    let fallbacks = [
        Operation::LoadList,
        Operation::LoadRequest,
        Operation::LoadOptions,
        Operation::SaveDecision,
    ]
    .map(Operation::fallback);
    for (i, a) in fallbacks.iter().enumerate() {
        for b in &fallbacks[i + 1..] {
            assert_ne!(a, b);
        }
    }
}
