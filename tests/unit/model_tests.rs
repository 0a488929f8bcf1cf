use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};

use pinnacle_review::models::candidate::{self, SwapCandidate};
use pinnacle_review::models::decision::{ApprovePayload, RejectPayload};
use pinnacle_review::models::request::{RequestPayload, RequestStatus, RequestType, TeacherRequest};
use pinnacle_review::models::resource::EligibleResource;
use pinnacle_review::models::reviewer::{ReviewerContext, Role};
use pinnacle_review::AppError;

fn reschedule(extra: Value) -> TeacherRequest {
    let mut raw = json!({"id": 42, "requestType": "RESCHEDULE", "status": "PENDING", "sessionId": 500});
    if let (Value::Object(base), Value::Object(extra)) = (&mut raw, extra) {
        base.extend(extra);
    }
    TeacherRequest::from_value(&raw).expect("request decodes")
}

fn new_date(request: &TeacherRequest) -> Option<NaiveDate> {
    match request.payload {
        RequestPayload::Reschedule { new_date, .. } => new_date,
        _ => None,
    }
}

// ── Request records ──────────────────────────────────────────

#[test]
fn reschedule_date_found_under_every_known_spelling() {
    let expected = NaiveDate::from_ymd_opt(2026, 11, 9);
    let shapes = [
        json!({"newDate": "2026-11-09"}),
        json!({"newSessionDate": "2026-11-09"}),
        json!({"rescheduleDate": "2026-11-09"}),
        json!({"newSession": {"date": "2026-11-09"}}),
        json!({"rescheduleInfo": {"newDate": "2026-11-09"}}),
        json!({"payload": {"newDate": "2026-11-09"}}),
        json!({"newDate": null, "newSession": {"date": "2026-11-09T00:00:00"}}),
    ];
    for shape in shapes {
        let request = reschedule(shape.clone());
        assert_eq!(new_date(&request), expected, "shape {shape}");
    }
}

#[test]
fn reschedule_slot_found_nested_or_flat() {
    for shape in [
        json!({"newTimeSlotId": 4}),
        json!({"newTimeSlot": {"id": 4, "name": "Evening"}}),
        json!({"newSession": {"timeSlotId": "4"}}),
    ] {
        let request = reschedule(shape.clone());
        let RequestPayload::Reschedule { new_time_slot_id, .. } = request.payload else {
            panic!("reschedule payload expected");
        };
        assert_eq!(new_time_slot_id, Some(4), "shape {shape}");
    }
}

#[test]
fn unparseable_date_is_absent() {
    let request = reschedule(json!({"newDate": "next tuesday"}));
    assert_eq!(new_date(&request), None);
}

#[test]
fn summary_fields_decode_from_nested_shapes() {
    let request = TeacherRequest::from_value(&json!({
        "requestId": "77",
        "type": "swap",
        "requestStatus": "pending",
        "session": {"id": 12, "date": "2026-11-02", "timeSlot": {"name": "08:00-09:30"}},
        "teacher": {"id": 5, "fullName": "Minh Tran"},
        "classEntity": {"id": 9, "name": "IELTS Evening", "code": "IE-09", "course": {"name": "IELTS 6.5"}},
        "createdAt": "2026-10-15T08:30:00+07:00",
        "replacementTeacher": {"id": 99, "fullName": "Hoa Pham"}
    }))
    .expect("request decodes");

    assert_eq!(request.id, 77);
    assert_eq!(request.request_type, RequestType::Swap);
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.session_id, Some(12));
    assert_eq!(request.session_date, NaiveDate::from_ymd_opt(2026, 11, 2));
    assert_eq!(request.time_slot_label.as_deref(), Some("08:00-09:30"));
    assert_eq!(request.teacher_id, Some(5));
    assert_eq!(request.teacher_name.as_deref(), Some("Minh Tran"));
    assert_eq!(request.class_name.as_deref(), Some("IELTS Evening"));
    assert_eq!(request.class_code.as_deref(), Some("IE-09"));
    assert_eq!(request.course_name.as_deref(), Some("IELTS 6.5"));
    assert_eq!(
        request.submitted_at,
        Some(Utc.with_ymd_and_hms(2026, 10, 15, 1, 30, 0).unwrap())
    );
    assert_eq!(request.existing_replacement_teacher_id(), Some(99));
}

#[test]
fn zoneless_timestamp_is_utc() {
    let request = reschedule(json!({"submittedAt": "2026-10-15T08:30:00"}));
    assert_eq!(
        request.submitted_at,
        Some(Utc.with_ymd_and_hms(2026, 10, 15, 8, 30, 0).unwrap())
    );
}

#[test]
fn modality_change_payload_decodes() {
    let request = TeacherRequest::from_value(&json!({
        "id": 8,
        "requestType": "MODALITY_CHANGE",
        "status": "PENDING",
        "currentResource": {"id": 3, "name": "Room 301", "resourceType": "ROOM"},
        "newModality": "ONLINE"
    }))
    .expect("request decodes");

    assert_eq!(
        request.payload,
        RequestPayload::ModalityChange {
            current_modality: Some("ROOM".into()),
            current_resource_id: Some(3),
            current_resource_name: Some("Room 301".into()),
            new_modality: Some("ONLINE".into()),
            new_resource_id: None,
            new_resource_name: None,
        }
    );
    assert_eq!(request.payload.request_type(), RequestType::ModalityChange);
    assert_eq!(request.existing_replacement_teacher_id(), None);
}

#[test]
fn record_without_id_is_rejected() {
    let result = TeacherRequest::from_value(&json!({"requestType": "SWAP", "status": "PENDING"}));
    assert!(matches!(result, Err(AppError::Decode(_))));
}

#[test]
fn unknown_type_is_rejected() {
    let result = TeacherRequest::from_value(&json!({"id": 1, "requestType": "HOLIDAY", "status": "PENDING"}));
    match result {
        Err(AppError::Decode(msg)) => assert!(msg.contains("HOLIDAY")),
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[test]
fn unknown_status_is_rejected() {
    let result = TeacherRequest::from_value(&json!({"id": 1, "requestType": "SWAP", "status": "ARCHIVED"}));
    assert!(matches!(result, Err(AppError::Decode(_))));
}

#[test]
fn status_and_type_parse_case_insensitively() {
    assert_eq!("waiting_confirm".parse::<RequestStatus>().unwrap(), RequestStatus::WaitingConfirm);
    assert_eq!(" Reschedule ".parse::<RequestType>().unwrap(), RequestType::Reschedule);
    assert_eq!(RequestType::ALL.len(), 3);
}

#[test]
fn request_serializes_camel_case_with_tagged_payload() {
    let request = reschedule(json!({"newDate": "2026-11-09", "newTimeSlotId": 4}));
    let value = serde_json::to_value(&request).expect("serializes");

    assert_eq!(value["requestType"], "RESCHEDULE");
    assert_eq!(value["status"], "PENDING");
    assert_eq!(value["sessionId"], 500);
    assert_eq!(value["payload"]["kind"], "RESCHEDULE");
    assert_eq!(value["payload"]["newDate"], "2026-11-09");
}

#[test]
fn records_with_the_same_fields_are_equal_whatever_their_wire_shape() {
    let flat = reschedule(json!({"newDate": "2026-11-09", "newTimeSlotId": 4}));
    let nested = reschedule(json!({"newSession": {"date": "2026-11-09", "timeSlot": {"id": "4"}}}));

    assert_eq!(flat, nested);
}

// ── Eligibility records ──────────────────────────────────────

#[test]
fn resource_name_falls_back_to_id() {
    let resource = EligibleResource::from_value(&json!({"resourceId": 17, "capacity": -3}))
        .expect("resource decodes");

    assert_eq!(resource.id, 17);
    assert_eq!(resource.name, "Resource #17");
    assert_eq!(resource.capacity, None);
}

#[test]
fn resource_without_id_is_rejected() {
    assert!(EligibleResource::from_value(&json!({"name": "Room 1"})).is_err());
}

#[test]
fn candidate_scores_are_clamped_and_rounded() {
    let cases = [
        (json!(140), 100),
        (json!(-5), 0),
        (json!("87.6"), 88),
        (json!(null), 0),
    ];
    for (score, expected) in cases {
        let candidate = SwapCandidate::from_value(&json!({"teacherId": 1, "matchScore": score}))
            .expect("candidate decodes");
        assert_eq!(candidate.match_score, expected, "score {score}");
    }
}

#[test]
fn candidate_skills_accept_strings_and_objects() {
    let candidate = SwapCandidate::from_value(&json!({
        "teacherId": 99,
        "fullName": "Hoa Pham",
        "skills": ["SPEAKING", {"skill": "IELTS", "level": "7.0", "proficiency": "EXPERT"}, {"level": "B2"}]
    }))
    .expect("candidate decodes");

    assert_eq!(candidate.display_name, "Hoa Pham");
    assert_eq!(candidate.skills.len(), 2);
    assert_eq!(candidate.skills[0].skill, "SPEAKING");
    assert_eq!(candidate.skills[1].level.as_deref(), Some("7.0"));
    assert_eq!(candidate.skills[1].proficiency.as_deref(), Some("EXPERT"));
}

#[test]
fn rank_orders_by_score_then_name() {
    let mut candidates: Vec<SwapCandidate> = [(1, "Zoe", 91), (2, "An", 40), (3, "Binh", 91)]
        .into_iter()
        .map(|(id, name, score)| {
            SwapCandidate::from_value(&json!({"teacherId": id, "fullName": name, "matchScore": score}))
                .unwrap()
        })
        .collect();

    candidate::rank(&mut candidates);

    let order: Vec<i64> = candidates.iter().map(|c| c.teacher_id).collect();
    assert_eq!(order, vec![3, 1, 2]);
}

// ── Decision payloads and reviewer ───────────────────────────

#[test]
fn approve_payload_omits_absent_fields() {
    let payload = ApprovePayload {
        replacement_teacher_id: Some(99),
        ..ApprovePayload::default()
    };
    assert_eq!(
        serde_json::to_value(&payload).unwrap(),
        json!({"replacementTeacherId": 99})
    );

    let payload = ApprovePayload {
        note: Some("Room 204 is free".into()),
        new_resource_id: Some(204),
        ..ApprovePayload::default()
    };
    assert_eq!(
        serde_json::to_value(&payload).unwrap(),
        json!({"note": "Room 204 is free", "newResourceId": 204})
    );
}

#[test]
fn reject_payload_carries_reason() {
    let payload = RejectPayload {
        reason: "not enough seats available".into(),
    };
    assert_eq!(
        serde_json::to_value(&payload).unwrap(),
        json!({"reason": "not enough seats available"})
    );
}

#[test]
fn only_staff_roles_decide_requests() {
    let deciders = [Role::Admin, Role::Manager, Role::CenterHead, Role::AcademicAffairs];
    let others = [Role::SubjectLeader, Role::Teacher, Role::Student];

    assert!(deciders.iter().all(|role| role.can_decide_requests()));
    assert!(others.iter().all(|role| !role.can_decide_requests()));

    let reviewer = ReviewerContext {
        user_id: 1,
        display_name: "Teacher and leader".into(),
        roles: others.to_vec(),
    };
    assert!(!reviewer.can_decide_requests());
}
