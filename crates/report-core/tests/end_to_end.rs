use chrono::{TimeZone, Utc};
use report_core::{ReportContext, ReportError, ReportSession, Section, SessionAction, SessionEvent};
use report_types::{Block, BlockType, NormalizedBox};
use serde_json::json;

fn update(session: &mut ReportSession, id: &str, field: &str, value: serde_json::Value) {
    session
        .dispatch(SessionAction::UpdateField {
            id: id.to_string(),
            field: field.to_string(),
            value,
        })
        .unwrap();
}

fn session_with_number_variable() -> (ReportSession, String) {
    let mut session = ReportSession::new();
    session
        .dispatch(SessionAction::LoadBlocks {
            blocks: vec![Block::new(
                "b1",
                1,
                BlockType::Line,
                NormalizedBox::new(0.1, 0.1, 0.2, 0.05),
            )],
        })
        .unwrap();

    let id = match session
        .dispatch(SessionAction::AddVariable {
            section: Section::Manual,
        })
        .unwrap()
    {
        SessionEvent::VariableAdded { id } => id,
        other => panic!("unexpected {:?}", other),
    };
    update(&mut session, &id, "type", json!("number"));
    update(&mut session, &id, "roundingMode", json!("sigfigs"));
    update(&mut session, &id, "sigFigs", json!(3));
    update(&mut session, &id, "previewValue", json!("12345"));
    session
        .dispatch(SessionAction::Bind {
            variable: id.clone(),
            block: "b1".to_string(),
        })
        .unwrap();
    (session, id)
}

#[test]
fn sig_fig_value_lands_at_letter_coordinates() {
    let (session, _) = session_with_number_variable();

    let replacements = session.build_replacements().unwrap();
    assert_eq!(replacements.len(), 1);
    let r = &replacements[0];
    assert!((r.x - 61.2).abs() < 1e-9);
    assert!((r.y - 79.2).abs() < 1e-9);
    assert!((r.width - 122.4).abs() < 1e-9);
    assert!((r.height - 39.6).abs() < 1e-9);
    assert_eq!(r.text, "1.23 × 10⁺⁴");
}

#[test]
fn request_carries_the_same_instruction() {
    let (session, _) = session_with_number_variable();
    let context = ReportContext {
        template: Some("invoice".into()),
        user_sub: "sub-123".into(),
        auth_token: Some("jwt".into()),
        bucket: Some("etl-bucket".into()),
        page_number: 0,
    };
    let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();

    let request = session.build_request(&context, at).unwrap();
    assert_eq!(request.template_id, "users/sub-123/templates/invoice/invoice.pdf");
    assert_eq!(
        request.output_key,
        "users/sub-123/reports/invoice_2025-01-02T03-04-05-000Z.pdf"
    );
    assert_eq!(request.replacements, session.build_replacements().unwrap());

    let body = serde_json::to_value(&request).unwrap();
    assert_eq!(body["replacements"][0]["text"], json!("1.23 × 10⁺⁴"));
    assert_eq!(body["page_number"], json!(0));
}

#[test]
fn removing_the_variable_leaves_nothing_to_replace() {
    let (mut session, id) = session_with_number_variable();
    session
        .dispatch(SessionAction::RemoveVariable { id })
        .unwrap();
    assert_eq!(
        session.build_replacements().unwrap_err(),
        ReportError::NothingToReplace
    );
}
