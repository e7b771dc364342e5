mod common;

use common::{write_bundle, EchoLoader};
use quantflow::{ChatSession, GenerationParams, InferenceService, Role, QUICK_QUESTIONS};

fn service(loader: &EchoLoader) -> (tempfile::TempDir, InferenceService) {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(dir.path());
    let service = InferenceService::load(loader, dir.path()).unwrap();
    (dir, service)
}

#[test]
fn send_appends_user_and_assistant_turns() {
    let (_dir, service) = service(&EchoLoader::replying(" Sure."));
    let mut chat = ChatSession::new(&service, GenerationParams::default());

    assert_eq!(chat.send("Can you help?"), "Sure.");
    chat.send("Again?");

    let roles: Vec<Role> = chat.messages().iter().map(|m| m.role).collect();
    assert_eq!(roles, [Role::User, Role::Assistant, Role::User, Role::Assistant]);
    assert_eq!(chat.messages()[2].content, "Again?");
}

#[test]
fn errors_are_kept_in_transcript() {
    let loader = EchoLoader { fail_generate: true,
                              ..EchoLoader::default() };
    let (_dir, service) = service(&loader);
    let mut chat = ChatSession::new(&service, GenerationParams::default());

    chat.send("hi");
    assert_eq!(chat.messages().len(), 2);
    assert!(chat.messages()[1].content.starts_with("Error generating response:"));
}

#[test]
fn quick_questions_and_clear() {
    let loader = EchoLoader::replying(" ok");
    let (_dir, service) = service(&loader);
    let mut chat = ChatSession::new(&service, GenerationParams::new(60, 0.9).unwrap());

    assert_eq!(chat.ask_quick(2), Some("ok"));
    assert_eq!(chat.messages()[0].content, QUICK_QUESTIONS[2]);
    assert_eq!(chat.ask_quick(QUICK_QUESTIONS.len()), None);
    assert_eq!(chat.messages().len(), 2);
    assert_eq!(loader.calls.lock().unwrap()[0], ("Tell me a joke".to_string(), 60, 0.9));

    chat.clear();
    assert!(chat.messages().is_empty());
}

#[test]
fn transcript_serializes_with_lowercase_roles() {
    let (_dir, service) = service(&EchoLoader::replying(" there"));
    let mut chat = ChatSession::new(&service, GenerationParams::default());
    chat.send("hello");

    let json: serde_json::Value = serde_json::from_str(&chat.to_json().unwrap()).unwrap();
    assert_eq!(json[0]["role"], "user");
    assert_eq!(json[1]["role"], "assistant");
    assert_eq!(json[1]["content"], "there");
}
