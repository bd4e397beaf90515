// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! End-to-end submission flows over a mock gateway.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use fahz::controller::{parse_submission, Controller, SubmitKind, SubmitOutcome};
use fahz::conversation::{Attachment, MediaKind, MediaRef, Role};
use fahz::error::GatewayError;
use fahz::gateway::MockGateway;
use fahz::personas;

fn controller_with(mock: &MockGateway) -> Controller {
    Controller::new(Arc::new(mock.clone()))
}

#[tokio::test]
async fn chat_round_trip_produces_expected_transcript() {
    let mock = MockGateway::new().with_text_reply("hi there");
    let controller = controller_with(&mock);

    let outcome = controller.submit(SubmitKind::Chat, "hello").await;
    assert_eq!(outcome, SubmitOutcome::Done);

    let messages = controller.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "hello");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, "hi there");
}

#[tokio::test]
async fn mixed_submissions_grow_log_by_two_each() {
    let mock = MockGateway::new()
        .with_text_reply("answer")
        .with_media_reply(MediaRef {
            kind: MediaKind::Image,
            mime_type: "image/png".to_string(),
            path: PathBuf::from("/tmp/a.png"),
        })
        .with_media_reply(MediaRef {
            kind: MediaKind::Video,
            mime_type: "video/mp4".to_string(),
            path: PathBuf::from("/tmp/b.mp4"),
        });
    let controller = controller_with(&mock);

    controller.submit(SubmitKind::Chat, "question").await;
    assert_eq!(controller.log_len(), 2);

    controller.submit(SubmitKind::Image, "a cube").await;
    assert_eq!(controller.log_len(), 4);

    controller.submit(SubmitKind::Video, "a sunrise").await;
    assert_eq!(controller.log_len(), 6);

    // Guarded no-op leaves the log alone
    let outcome = controller.submit(SubmitKind::Chat, "").await;
    assert_eq!(outcome, SubmitOutcome::EmptyInput);
    assert_eq!(controller.log_len(), 6);
    assert_eq!(mock.call_count(), 3);
}

#[tokio::test]
async fn failures_become_assistant_messages_not_panics() {
    let mock = MockGateway::new()
        .with_error_reply(GatewayError::NoImageProduced)
        .with_error_reply(GatewayError::QuotaExceeded)
        .with_error_reply(GatewayError::AccessDenied);
    let controller = controller_with(&mock);

    controller.submit(SubmitKind::Image, "a red cube").await;
    controller.submit(SubmitKind::Chat, "hello").await;
    controller.submit(SubmitKind::Video, "a sunrise").await;

    let messages = controller.messages();
    assert_eq!(messages.len(), 6);
    for reply in [&messages[1], &messages[3], &messages[5]] {
        assert_eq!(reply.role, Role::Assistant);
        assert!(reply.content.starts_with("⚠️"));
    }
    assert!(messages[3].content.contains("lower-tier model"));
    assert!(!controller.is_busy());

    // The session survives: a later submission still works
    controller.submit(SubmitKind::Chat, "still there?").await;
    assert_eq!(controller.log_len(), 8);
}

#[tokio::test]
async fn concurrent_submission_is_rejected_not_queued() {
    let (mock, gate) = MockGateway::new().with_text_reply("done").gated();
    let controller = controller_with(&mock);

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit(SubmitKind::Chat, "first").await }
    });
    while mock.call_count() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert_eq!(
        controller.submit(SubmitKind::Chat, "second").await,
        SubmitOutcome::Busy
    );
    assert_eq!(
        controller.submit(SubmitKind::Image, "third").await,
        SubmitOutcome::Busy
    );

    gate.release();
    assert_eq!(first.await.unwrap(), SubmitOutcome::Done);

    // Only the first submission ever reached the gateway
    assert_eq!(mock.call_count(), 1);
    assert_eq!(controller.log_len(), 2);
}

#[tokio::test]
async fn attachments_travel_with_the_message_and_reach_the_gateway() {
    let mock = MockGateway::new().with_text_reply("nice photo");
    let controller = controller_with(&mock);

    controller.pending().push(Attachment {
        mime_type: "image/jpeg".to_string(),
        data: "ZmFrZQ==".to_string(),
        source: PathBuf::from("/tmp/photo.jpg"),
    });

    controller.submit(SubmitKind::Chat, "what is this?").await;

    assert!(controller.pending().is_empty());
    let call = mock.last_call().unwrap();
    assert_eq!(call.attachments.len(), 1);
    assert_eq!(call.attachments[0].mime_type, "image/jpeg");
    assert_eq!(controller.messages()[0].attachments.len(), 1);
}

#[tokio::test]
async fn generation_config_travels_unmodified() {
    let mock = MockGateway::new();
    let controller = controller_with(&mock);
    controller.set_system_prompt("be terse");
    controller.set_temperature(1.5);

    controller.submit(SubmitKind::Chat, "hello").await;

    let config = mock.last_call().unwrap().config.unwrap();
    assert_eq!(config.system_prompt, "be terse");
    assert_eq!(config.temperature, 1.5);

    controller.set_temperature(0.0);
    controller.submit(SubmitKind::Chat, "again").await;
    assert_eq!(mock.last_call().unwrap().config.unwrap().temperature, 0.0);
}

#[tokio::test]
async fn persona_flow_resets_conversation() {
    let mock = MockGateway::new().with_text_reply("sure");
    let controller = controller_with(&mock);

    controller.submit(SubmitKind::Chat, "hello").await;
    assert_eq!(controller.log_len(), 2);

    let persona = personas::find("chef").unwrap();
    controller.apply_persona(persona);
    assert_eq!(controller.log_len(), 1);
    assert_eq!(controller.config().system_prompt, persona.system_prompt);

    // The greeting names the active model
    let greeting = &controller.messages()[0];
    assert!(greeting.content.contains(&controller.config().model));
}

#[tokio::test]
async fn slash_commands_route_to_the_right_gateway_operation() {
    let mock = MockGateway::new()
        .with_media_reply(MediaRef {
            kind: MediaKind::Image,
            mime_type: "image/png".to_string(),
            path: PathBuf::from("/tmp/cube.png"),
        })
        .with_media_reply(MediaRef {
            kind: MediaKind::Video,
            mime_type: "video/mp4".to_string(),
            path: PathBuf::from("/tmp/sunrise.mp4"),
        });
    let controller = controller_with(&mock);

    let image = parse_submission("/image a red cube");
    controller.submit(image.kind, &image.prompt).await;
    let video = parse_submission("/video a sunrise");
    controller.submit(video.kind, &video.prompt).await;

    let calls = mock.recorded_calls();
    assert_eq!(calls[0].prompt, "a red cube");
    assert_eq!(calls[1].prompt, "a sunrise");

    let messages = controller.messages();
    assert!(messages[1].generated_image.is_some());
    assert!(messages[3].generated_video.is_some());
}
