use session_stream::{process_line, ProcessedLine, RenderOptions};

fn plain() -> RenderOptions {
    RenderOptions::default()
}

#[test]
fn nested_user_message_renders_text() {
    let result = process_line(r#"{"message":{"role":"user","content":"Hello"}}"#, &plain());
    assert!(!result.output.is_empty());
    assert!(result.output.contains("Hello"));
}

#[test]
fn nested_tool_and_system_need_content() {
    assert!(process_line(r#"{"message":{"role":"tool","content":"Result"}}"#, &plain())
        .output
        .contains("Result"));
    assert!(process_line(r#"{"message":{"role":"tool"}}"#, &plain())
        .output
        .is_empty());
    assert!(process_line(r#"{"role":"system","content":"System prompt loaded"}"#, &plain())
        .output
        .contains("System prompt loaded"));
    assert!(process_line(r#"{"role":"system"}"#, &plain()).output.is_empty());
}

#[test]
fn only_known_roles_produce_output() {
    let shown = [
        r#"{"message":{"role":"user","content":"x"}}"#,
        r#"{"message":{"role":"assistant","content":"x"}}"#,
        r#"{"message":{"role":"tool","content":"x"}}"#,
        r#"{"message":{"role":"system","content":"x"}}"#,
        r#"{"role":"thinking","content":"x"}"#,
        r#"{"role":"tool_call","tool_name":"x"}"#,
        r#"{"role":"tool_result","content":"x"}"#,
    ];
    for line in shown {
        assert!(!process_line(line, &plain()).output.is_empty(), "{line}");
    }

    let hidden = [
        r#"{"role":"request","request":{}}"#,
        r#"{"role":"developer","content":"x"}"#,
        r#"{"message":{"role":"Assistant","content":"x"}}"#,
        r#"{"type":"session","version":3}"#,
    ];
    for line in hidden {
        assert_eq!(process_line(line, &plain()), ProcessedLine::default(), "{line}");
    }
}

#[test]
fn request_needs_verbose() {
    let line = r#"{"role":"request","ts":"2026-02-13T10:30:00Z"}"#;
    let verbose = RenderOptions {
        verbose: true,
        color: false,
    };
    assert!(process_line(line, &verbose).output.contains("[request]"));
}

#[test]
fn tool_call_count_ignores_text_blocks() {
    let line = r#"{"message":{"role":"assistant","content":[{"type":"toolCall","name":"read","arguments":{"path":"a"}},{"type":"text","text":"Let me check"},{"type":"toolCall","name":"exec","arguments":{"command":"ls"}}]}}"#;
    let output = process_line(line, &plain()).output;
    assert_eq!(output.matches('⚡').count(), 2);
    assert!(output.contains("Let me check"));
}

#[test]
fn long_tool_result_is_capped() {
    let text = "r".repeat(400);
    let line = format!(r#"{{"message":{{"role":"tool","content":[{{"type":"toolResult","text":"{text}"}}]}}}}"#);
    let output = process_line(&line, &plain()).output;
    assert!(output.contains('…'));
    assert!(output.matches('r').count() <= 300);
}

#[test]
fn large_lines_keep_usage() {
    let big = "x".repeat(100 * 1024);

    let assistant = format!(
        r#"{{"message":{{"role":"assistant","content":"{big}","usage":{{"input":10,"output":500,"totalTokens":50000}}}}}}"#
    );
    assert!(assistant.len() > 64 * 1024);
    let result = process_line(&assistant, &plain());
    assert!(result.output.contains(&big));
    let usage = result.usage.expect("usage should survive large lines");
    assert_eq!(usage.total_tokens, 50000);
    assert_eq!(usage.output, 500);

    let tool = format!(
        r#"{{"message":{{"role":"tool","content":[{{"type":"toolResult","text":"{big}"}}]}}}}"#
    );
    let output = process_line(&tool, &plain()).output;
    assert!(output.contains('…'));
}

#[test]
fn same_line_twice_is_identical() {
    let lines = [
        r#"{"message":{"role":"assistant","content":"Hi","usage":{"output":1,"totalTokens":10}},"timestamp":1739443800}"#,
        r#"{"role":"tool_result","content":"a\nb","ts":"2026-02-13T10:30:00Z"}"#,
        "garbage",
    ];
    for line in lines {
        assert_eq!(process_line(line, &plain()), process_line(line, &plain()));
    }
}
