//! Tests for the persona chat and its interactive loop

mod helpers;

use helpers::*;
use zuluai::chat::{default_conversation, is_exit, ChatLoop, ChatResponder, ReaderSource};
use zuluai::llm::{Message, Role};
use zuluai::prompts::{CHAT_PERSONA, DEFAULT_CHAT_QUESTION};

fn run_loop(input: &str, model: &std::rc::Rc<ScriptedModel>) -> (usize, String) {
    let chat_loop = ChatLoop::new(ChatResponder::new(boxed(model)));
    let mut source = ReaderSource::new(input.as_bytes());
    let mut out = Vec::new();
    let answered = chat_loop.run(&mut source, &mut out).unwrap();
    (answered, String::from_utf8(out).unwrap())
}

#[test]
fn test_default_conversation_is_persona_then_question() {
    let messages = default_conversation();

    assert_eq!(
        messages,
        vec![
            Message::system(CHAT_PERSONA),
            Message::human(DEFAULT_CHAT_QUESTION)
        ]
    );
}

#[test]
fn test_respond_returns_single_ai_message() -> Result<(), Box<dyn std::error::Error>> {
    let model = ScriptedModel::new(["Pretoria is the administrative capital."]);
    let responder = ChatResponder::new(boxed(&model));

    let reply = responder.respond(&default_conversation())?;

    assert_eq!(reply.role, Role::Ai);
    assert_eq!(reply.content, "Pretoria is the administrative capital.");
    assert!(model.stops()[0].is_empty());
    Ok(())
}

#[test]
fn test_exit_sentinel_is_case_insensitive() {
    assert!(is_exit("exit"));
    assert!(is_exit("EXIT"));
    assert!(is_exit("  Exit \n"));
    assert!(!is_exit("exit now"));
    assert!(!is_exit(""));
}

#[test]
fn test_loop_stops_at_sentinel_without_calling_model() {
    let model = ScriptedModel::new(Vec::<String>::new());

    let (answered, output) = run_loop("EXIT\nWho founded Rome?\n", &model);

    assert_eq!(answered, 0);
    assert_eq!(model.call_count(), 0);
    assert_eq!(output, "Type 'exit' to quit.\n");
}

#[test]
fn test_loop_answers_each_line_without_history() {
    let model = ScriptedModel::new(["In 1910.", "Cape Town."]);

    let (answered, output) = run_loop(
        "When was the Union formed?\n\n   \nWhere does parliament sit?\nexit\n",
        &model,
    );

    assert_eq!(answered, 2);
    assert_eq!(
        output,
        "Type 'exit' to quit.\nAI: In 1910.\nAI: Cape Town.\n"
    );

    let calls = model.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[1],
        vec![
            Message::system(CHAT_PERSONA),
            Message::human("Where does parliament sit?")
        ]
    );
}

#[test]
fn test_loop_ends_at_end_of_input() {
    let model = ScriptedModel::new(["Around 753 BC."]);

    let (answered, output) = run_loop("When was Rome founded?", &model);

    assert_eq!(answered, 1);
    assert!(output.ends_with("AI: Around 753 BC.\n"));
}
