use chatbridge_core::{BlockEmitter, ChatbridgeError, FinishReason, StreamPart, Usage};
use chatbridge_llm::OllamaStreamAdapter;

fn counter_adapter() -> OllamaStreamAdapter {
    let mut next = 0;
    OllamaStreamAdapter::with_blocks(BlockEmitter::with_id_generator(move || {
        next += 1;
        format!("id-{next}")
    }))
}

fn run(lines: &[&str]) -> Vec<StreamPart> {
    let mut adapter = counter_adapter();
    let mut parts = Vec::new();
    for line in lines {
        parts.extend(adapter.push(format!("{line}\n").as_bytes()).unwrap());
    }
    parts.extend(adapter.finish());
    parts
}

fn kinds(parts: &[StreamPart]) -> Vec<&'static str> {
    parts.iter().map(StreamPart::kind).collect()
}

#[test]
fn text_then_done_yields_the_canonical_sequence() {
    let parts = run(&[
        r#"{"message":{"content":"Hi"}}"#,
        r#"{"done":true,"eval_count":3,"prompt_eval_count":5}"#,
    ]);

    assert_eq!(
        parts,
        vec![
            StreamPart::TextStart { id: "id-1".into() },
            StreamPart::TextDelta {
                id: "id-1".into(),
                delta: "Hi".into()
            },
            StreamPart::TextEnd { id: "id-1".into() },
            StreamPart::Finish {
                finish_reason: FinishReason::Stop,
                usage: Usage::new(5, 3),
            },
        ]
    );
}

#[test]
fn reasoning_closes_before_text_starts() {
    let parts = run(&[
        r#"{"message":{"thinking":"Let me "}}"#,
        r#"{"message":{"thinking":"think"}}"#,
        r#"{"message":{"content":"The "}}"#,
        r#"{"message":{"content":"answer"}}"#,
        r#"{"done":true}"#,
    ]);

    assert_eq!(
        kinds(&parts),
        [
            "reasoning-start",
            "reasoning-delta",
            "reasoning-delta",
            "reasoning-end",
            "text-start",
            "text-delta",
            "text-delta",
            "text-end",
            "finish",
        ]
    );
    assert!(matches!(&parts[1], StreamPart::ReasoningDelta { delta, .. } if delta == "Let me "));
    assert!(matches!(&parts[2], StreamPart::ReasoningDelta { delta, .. } if delta == "think"));
    assert!(matches!(&parts[5], StreamPart::TextDelta { delta, .. } if delta == "The "));
    assert!(matches!(&parts[6], StreamPart::TextDelta { delta, .. } if delta == "answer"));
}

#[test]
fn thinking_and_content_on_one_line_emit_reasoning_first() {
    let parts = run(&[
        r#"{"message":{"thinking":"hmm","content":"ok"},"done":true}"#,
    ]);
    assert_eq!(
        kinds(&parts),
        [
            "reasoning-start",
            "reasoning-delta",
            "reasoning-end",
            "text-start",
            "text-delta",
            "text-end",
            "finish",
        ]
    );
}

#[test]
fn no_content_means_no_text_block() {
    let parts = run(&[r#"{"message":{"thinking":"only"}}"#, r#"{"done":true}"#]);
    assert_eq!(
        kinds(&parts),
        ["reasoning-start", "reasoning-delta", "reasoning-end", "finish"]
    );
}

#[test]
fn no_thinking_means_no_reasoning_block() {
    let parts = run(&[r#"{"message":{"content":"a"}}"#, r#"{"done":true}"#]);
    assert!(!kinds(&parts)
        .iter()
        .any(|kind| kind.starts_with("reasoning")));
}

#[test]
fn malformed_lines_are_skipped_without_ending_the_stream() {
    let parts = run(&[
        r#"{"message":{"content":"a"}}"#,
        "{not json",
        "",
        "   ",
        r#""just a string""#,
        r#"{"message":{"content":"b"}}"#,
        r#"{"done":true}"#,
    ]);
    assert_eq!(
        kinds(&parts),
        ["text-start", "text-delta", "text-delta", "text-end", "finish"]
    );
}

#[test]
fn usage_keeps_the_last_non_zero_counts() {
    let parts = run(&[
        r#"{"message":{"content":"a"},"prompt_eval_count":4,"eval_count":1}"#,
        r#"{"message":{"content":"b"},"prompt_eval_count":0,"eval_count":2}"#,
        r#"{"message":{"content":"c"},"eval_count":0}"#,
        r#"{"done":true,"prompt_eval_count":7}"#,
    ]);
    let last = parts.last().unwrap();
    assert_eq!(
        last,
        &StreamPart::Finish {
            finish_reason: FinishReason::Stop,
            usage: Usage::new(7, 2),
        }
    );
    if let StreamPart::Finish { usage, .. } = last {
        assert_eq!(usage.total_tokens, 9);
    }
}

#[test]
fn lines_split_across_chunks_are_reassembled() {
    let mut adapter = counter_adapter();
    let mut parts = Vec::new();
    for chunk in [
        &b"{\"message\":{\"con"[..],
        b"tent\":\"Hi\"}}\n{\"do",
        b"ne\":true}\n",
    ] {
        parts.extend(adapter.push(chunk).unwrap());
    }
    assert!(adapter.is_finished());
    assert_eq!(kinds(&parts), ["text-start", "text-delta", "text-end", "finish"]);
}

#[test]
fn partial_final_line_is_parsed_at_end_of_body() {
    let mut adapter = counter_adapter();
    let mut parts = adapter
        .push(b"{\"message\":{\"content\":\"Hi\"}}\n{\"done\":true,\"eval_count\":2}")
        .unwrap();
    assert_eq!(kinds(&parts), ["text-start", "text-delta"]);
    parts.extend(adapter.finish());
    assert_eq!(
        parts.last(),
        Some(&StreamPart::Finish {
            finish_reason: FinishReason::Stop,
            usage: Usage::new(0, 2),
        })
    );
}

#[test]
fn missing_done_closes_blocks_with_unknown_reason() {
    let parts = run(&[r#"{"message":{"thinking":"x"}}"#]);
    assert_eq!(
        parts[2..],
        [
            StreamPart::ReasoningEnd { id: "id-1".into() },
            StreamPart::Finish {
                finish_reason: FinishReason::Unknown,
                usage: Usage::default(),
            },
        ]
    );
}

#[test]
fn input_after_done_is_ignored() {
    let mut adapter = counter_adapter();
    let parts = adapter
        .push(b"{\"message\":{\"content\":\"a\"},\"done\":true}\n{\"message\":{\"content\":\"late\"}}\n")
        .unwrap();
    assert_eq!(kinds(&parts), ["text-start", "text-delta", "text-end", "finish"]);
    assert!(adapter
        .push(b"{\"message\":{\"content\":\"later\"}}\n")
        .unwrap()
        .is_empty());
    assert!(adapter.finish().is_empty());
}

#[test]
fn thinking_after_text_opens_a_fresh_reasoning_block() {
    let parts = run(&[
        r#"{"message":{"content":"a"}}"#,
        r#"{"message":{"thinking":"b"}}"#,
        r#"{"message":{"content":"c"}}"#,
        r#"{"done":true}"#,
    ]);
    assert_eq!(
        parts,
        vec![
            StreamPart::TextStart { id: "id-1".into() },
            StreamPart::TextDelta {
                id: "id-1".into(),
                delta: "a".into()
            },
            StreamPart::ReasoningStart { id: "id-2".into() },
            StreamPart::ReasoningDelta {
                id: "id-2".into(),
                delta: "b".into()
            },
            StreamPart::ReasoningEnd { id: "id-2".into() },
            StreamPart::TextDelta {
                id: "id-1".into(),
                delta: "c".into()
            },
            StreamPart::TextEnd { id: "id-1".into() },
            StreamPart::Finish {
                finish_reason: FinishReason::Stop,
                usage: Usage::default(),
            },
        ]
    );
}

#[test]
fn done_reason_length_maps_to_length() {
    let parts = run(&[r#"{"message":{"content":"a"},"done":true,"done_reason":"length"}"#]);
    assert!(matches!(
        parts.last(),
        Some(StreamPart::Finish {
            finish_reason: FinishReason::Length,
            ..
        })
    ));
}

#[test]
fn error_field_emits_an_error_part_and_continues() {
    let parts = run(&[
        r#"{"error":"model is loading"}"#,
        r#"{"message":{"content":"a"},"done":true}"#,
    ]);
    assert_eq!(
        parts[0],
        StreamPart::Error {
            message: "model is loading".into()
        }
    );
    assert_eq!(kinds(&parts[1..]), ["text-start", "text-delta", "text-end", "finish"]);
}

#[test]
fn oversized_line_is_rejected() {
    let mut adapter = counter_adapter().with_max_line_bytes(16);
    let err = adapter.push(&[b'x'; 32]).unwrap_err();
    assert!(matches!(err, ChatbridgeError::LineTooLong { limit: 16 }));
}

#[test]
fn oversized_line_with_its_newline_is_rejected() {
    let mut adapter = counter_adapter().with_max_line_bytes(16);
    let line = format!("{{\"message\":{{\"content\":\"{}\"}}}}\n", "a".repeat(40));
    let err = adapter.push(line.as_bytes()).unwrap_err();
    assert!(matches!(err, ChatbridgeError::LineTooLong { limit: 16 }));
}
