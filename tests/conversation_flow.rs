//! End-to-end conversation scenarios driven through `ConversationController::run`
//! against a recording fake of the AI service.

use std::sync::Mutex;

use async_trait::async_trait;
use sparkle::conversation::{Blur, Length, Style};
use sparkle::error::ServiceResult;
use sparkle::prompts;
use sparkle::{
    AiService, ConversationController, ImagePayload, MessageId, Mode, Request, Sender, ServiceError,
    Submission, Turn,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Text(Vec<Turn>),
    Analyze(String),
    Image(String),
}

/// Records every call; `fail` makes every call return an error
#[derive(Default)]
struct RecordingService {
    calls: Mutex<Vec<Call>>,
    fail: bool,
}

impl RecordingService {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> ServiceResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            Err(ServiceError::Status {
                status: 503,
                body: "unavailable".into(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AiService for RecordingService {
    async fn generate_text(&self, turns: &[Turn]) -> ServiceResult<String> {
        self.record(Call::Text(turns.to_vec()))?;
        Ok(format!("reply #{}", turns.len()))
    }

    async fn analyze_image(&self, prompt: &str, _image: &ImagePayload) -> ServiceResult<String> {
        self.record(Call::Analyze(prompt.to_string()))?;
        Ok("It is a cat.".into())
    }

    async fn generate_image(&self, prompt: &str) -> ServiceResult<ImagePayload> {
        self.record(Call::Image(prompt.to_string()))?;
        Ok(ImagePayload::from_bytes("image/png", prompt.as_bytes()))
    }
}

fn submission(text: &str, mode: Mode) -> Submission {
    Submission {
        text: text.into(),
        mode,
        ..Default::default()
    }
}

async fn send(controller: &mut ConversationController, service: &RecordingService, text: &str, mode: Mode) {
    let request = controller
        .submit_input(submission(text, mode))
        .expect("non-empty submission produces a request");
    controller.run(service, request).await;
}

#[tokio::test]
async fn joke_on_empty_history() {
    let service = RecordingService::default();
    let mut controller = ConversationController::default();

    send(&mut controller, &service, "Tell me a joke.", Mode::Chat).await;

    assert_eq!(service.calls(), vec![Call::Text(vec![Turn::user("Tell me a joke.")])]);
    let messages = controller.messages().as_slice();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[1].sender, Sender::Ai);
    assert_eq!(messages[1].original_prompt_id, Some(messages[0].id));
    assert!(!controller.session().loading.any());
}

#[tokio::test]
async fn attached_image_goes_to_analysis() {
    let service = RecordingService::default();
    let mut controller = ConversationController::default();

    controller.attach_image(ImagePayload::from_base64("image/jpeg", "aGk="));
    controller.set_input("What is this?");
    assert!(controller.submit_and_wait(&service).await);

    assert_eq!(service.calls(), vec![Call::Analyze("What is this?".into())]);
    let reply = controller.messages().last().unwrap();
    assert_eq!(reply.sender, Sender::Ai);
    assert_eq!(reply.text, "It is a cat.");
    assert!(reply.original_image_prompt.is_none());
    assert!(reply.image.is_none());
}

#[tokio::test]
async fn red_bicycle_refined_to_realistic() {
    let service = RecordingService::default();
    let mut controller = ConversationController::default();

    send(&mut controller, &service, "a red bicycle", Mode::Image).await;
    let image_id = controller.messages().last().unwrap().id;
    let before_len = controller.messages().len();

    assert!(controller.open_refine(image_id));
    controller.select_style(Some(Style::Realistic));
    let request = controller.confirm_refine().unwrap();
    assert!(!controller.session().show_refine_menu());
    controller.run(&service, request).await;

    assert_eq!(
        service.calls(),
        vec![
            Call::Image("a red bicycle".into()),
            Call::Image("a red bicycle, in a realistic style".into()),
        ]
    );
    let refined = controller.message(image_id).unwrap();
    assert_eq!(controller.messages().len(), before_len);
    assert!(refined.refined);
    assert_eq!(
        refined.image.as_ref(),
        Some(&ImagePayload::from_bytes("image/png", b"a red bicycle, in a realistic style"))
    );
    assert_eq!(refined.original_image_prompt.as_deref(), Some("a red bicycle"));
}

#[tokio::test]
async fn refine_without_options_is_a_round_trip() {
    let service = RecordingService::default();
    let mut controller = ConversationController::default();

    send(&mut controller, &service, "P", Mode::Image).await;
    let id = controller.messages().last().unwrap().id;
    let before = controller.message(id).unwrap().clone();

    controller.open_refine(id);
    assert!(controller.confirm_refine().is_none());

    let after = controller.message(id).unwrap();
    assert_eq!(after.image, before.image);
    assert_eq!(after.original_image_prompt, before.original_image_prompt);
    assert_eq!(controller.session().notice_text(), Some(prompts::NOTICE_NO_IMAGE_OPTION));
    assert_eq!(service.calls().len(), 1);
}

#[tokio::test]
async fn editing_message_42_replaces_in_place() {
    let service = RecordingService::default();
    let mut controller = ConversationController::default();

    for n in 1..=42 {
        controller.submit_input(submission(&format!("message {n}"), Mode::Chat));
    }
    let target = MessageId(42);
    assert_eq!(controller.message(target).unwrap().text, "message 42");

    assert!(controller.edit_message(target));
    let len = controller.messages().len();
    let request = controller
        .submit_input(Submission {
            text: "message 42, revised".into(),
            mode: Mode::Chat,
            editing_id: controller.session().editing_id,
            ..Default::default()
        })
        .unwrap();

    assert_eq!(controller.messages().len(), len);
    assert_eq!(controller.message(target).unwrap().text, "message 42, revised");
    assert!(controller.session().editing_id.is_none());

    let Request::Chat { turns, reply_to } = &request else {
        panic!("expected chat request");
    };
    assert_eq!(*reply_to, target);
    assert_eq!(turns.len(), 42);
    assert_eq!(turns.last().unwrap().text, "message 42, revised");

    controller.run(&service, request).await;
    assert_eq!(controller.messages().len(), len + 1);
}

#[tokio::test]
async fn message_count_grows_by_one_per_submission() {
    let service = RecordingService::default();
    let mut controller = ConversationController::default();

    let inputs = [("hi", Mode::Chat), ("   ", Mode::Chat), ("a boat", Mode::Image), ("", Mode::Image)];
    for (text, mode) in inputs {
        let before = controller.messages().len();
        match controller.submit_input(submission(text, mode)) {
            Some(request) => {
                assert_eq!(controller.messages().len(), before + 1);
                controller.run(&service, request).await;
            }
            None => assert_eq!(controller.messages().len(), before),
        }
    }
    assert_eq!(service.calls().len(), 2);
}

#[tokio::test]
async fn failures_still_produce_non_empty_ai_messages() {
    let service = RecordingService::failing();
    let mut controller = ConversationController::default();

    send(&mut controller, &service, "hello", Mode::Chat).await;
    send(&mut controller, &service, "a castle", Mode::Image).await;
    controller.attach_image(ImagePayload::from_base64("image/png", "aGk="));
    controller.set_input("describe");
    controller.submit_and_wait(&service).await;

    let ai: Vec<_> = controller
        .messages()
        .iter()
        .filter(|m| m.sender == Sender::Ai)
        .collect();
    assert_eq!(ai.len(), 3);
    assert_eq!(ai[0].text, prompts::CHAT_FALLBACK);
    assert!(ai[0].original_prompt_id.is_none());
    assert!(ai[1].image.as_ref().unwrap().is_placeholder());
    assert_eq!(ai[2].text, prompts::ANALYSIS_FALLBACK);
    assert!(ai.iter().all(|m| !m.text.is_empty()));
    assert!(!controller.session().loading.any());
}

#[tokio::test]
async fn confirm_resets_menu_even_when_refinement_fails() {
    let service = RecordingService::default();
    let mut controller = ConversationController::default();
    send(&mut controller, &service, "x", Mode::Image).await;
    let id = controller.messages().last().unwrap().id;

    let failing = RecordingService::failing();
    controller.open_refine(id);
    controller.select_blur(Some(Blur::Foreground));
    let request = controller.confirm_refine().unwrap();
    assert!(controller.session().refine.is_none());
    controller.run(&failing, request).await;

    assert!(controller.session().refine.is_none());
    let message = controller.message(id).unwrap();
    assert!(message.image.as_ref().unwrap().is_placeholder());
    assert!(!controller.session().loading.image_generation);
}

#[tokio::test]
async fn only_ai_answers_are_refined() {
    let service = RecordingService::default();
    let mut controller = ConversationController::default();
    send(&mut controller, &service, "my question", Mode::Chat).await;
    let user = MessageId(1);

    assert!(!controller.open_refine(user));
    assert!(controller.confirm_refine().is_none());
    assert_eq!(controller.message(user).unwrap().text, "my question");
    assert!(!controller.message(user).unwrap().refined);

    let answer = controller.messages().last().unwrap().id;
    assert!(controller.open_refine(answer));
    controller.select_length(Some(Length::Shorter));
    let request = controller.confirm_refine().unwrap();
    controller.run(&service, request).await;
    assert!(controller.message(answer).unwrap().refined);
    assert!(!controller.message(user).unwrap().refined);
}

#[tokio::test]
async fn new_chat_twice_equals_once() {
    let service = RecordingService::default();
    let mut controller = ConversationController::default();
    send(&mut controller, &service, "hello", Mode::Chat).await;

    controller.start_new_chat();
    let mut once = controller.session().clone();
    controller.start_new_chat();
    let mut twice = controller.session().clone();
    once.notice = None;
    twice.notice = None;

    assert_eq!(once, twice);
    assert!(controller.messages().is_empty());

    send(&mut controller, &service, "again", Mode::Chat).await;
    assert!(controller.messages().iter().all(|m| m.id.0 > 2));
}
