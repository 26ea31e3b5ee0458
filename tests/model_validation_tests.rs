use message_board::models::{
    CreateReplyRequest, CreateThreadRequest, DeleteReplyRequest, Reply, Thread, ThreadView,
};
use validator::Validate;

fn thread_with_replies(count: usize) -> Thread {
    let mut thread = Thread::new("b", "op".to_string(), "thread-hash".to_string());
    for i in 0..count {
        let mut reply = Reply::new(format!("reply {i}"), "reply-hash".to_string());
        reply.reported = true;
        thread.replies.push(reply);
    }
    thread
}

#[test]
fn test_thread_serializes_mongo_style_id() {
    let thread = thread_with_replies(1);

    let json = serde_json::to_value(&thread).unwrap();

    assert_eq!(json["_id"], thread.id.to_string());
    assert!(json.get("id").is_none());
    assert_eq!(json["replies"][0]["_id"], thread.replies[0].id.to_string());
    // The stored document is complete.
    assert_eq!(json["reported"], false);
    assert_eq!(json["delete_password"], "thread-hash");
}

#[test]
fn test_new_thread_defaults() {
    let thread = Thread::new("b", "op".to_string(), "hash".to_string());

    assert_eq!(thread.board, "b");
    assert_eq!(thread.created_on, thread.bumped_on);
    assert!(!thread.reported);
    assert!(thread.replies.is_empty());
}

#[test]
fn test_views_are_redacted() {
    let thread = thread_with_replies(2);

    for view in [ThreadView::summary(&thread), ThreadView::full(&thread)] {
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("reported"));
        assert!(!json.contains("delete_password"));
        assert!(!json.contains("hash"));
    }
}

#[test]
fn test_summary_keeps_three_newest_replies() {
    let thread = thread_with_replies(5);

    let view = ThreadView::summary(&thread);

    let texts: Vec<&str> = view.replies.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["reply 4", "reply 3", "reply 2"]);
    assert_eq!(view.replycount, Some(5));
}

#[test]
fn test_full_view_keeps_creation_order_without_count() {
    let thread = thread_with_replies(5);

    let view = ThreadView::full(&thread);
    let json = serde_json::to_value(&view).unwrap();

    assert_eq!(view.replies.len(), 5);
    assert_eq!(view.replies[0].text, "reply 0");
    assert!(json.get("replycount").is_none());
}

#[test]
fn test_create_thread_request_rejects_empty_fields() {
    let request = CreateThreadRequest {
        text: String::new(),
        delete_password: String::new(),
    };

    let errors = request.validate().unwrap_err();
    let fields = errors.field_errors();

    assert!(fields.contains_key("text"));
    assert!(fields.contains_key("delete_password"));
}

#[test]
fn test_reply_requests_parse_uuid_ids() {
    let thread_id = uuid::Uuid::new_v4();
    let reply_id = uuid::Uuid::new_v4();

    let request: DeleteReplyRequest = serde_json::from_value(serde_json::json!({
        "thread_id": thread_id,
        "reply_id": reply_id,
        "delete_password": "pw"
    }))
    .unwrap();
    assert_eq!(request.thread_id, thread_id);
    assert!(request.validate().is_ok());

    let malformed = serde_json::from_value::<CreateReplyRequest>(serde_json::json!({
        "thread_id": "123",
        "text": "t",
        "delete_password": "pw"
    }));
    assert!(malformed.is_err());
}
