//! Tests for streaming parser behavior.

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::{
    fragment_queue, rerender, Block, BlockKind, CodeBlock, Feeder, FragmentQueue, InlineSpan,
    InlineStyle, Mode, Session, DEFAULT_LANGUAGE,
};

fn text(s: &str) -> InlineSpan {
    InlineSpan::Text {
        text: s.to_string(),
    }
}

fn styled(style: InlineStyle, content: &str) -> InlineSpan {
    InlineSpan::Styled {
        style,
        content: content.to_string(),
        closed: true,
    }
}

fn code(content: &str) -> InlineSpan {
    InlineSpan::Code {
        content: content.to_string(),
        closed: true,
    }
}

fn paragraph(content: Vec<InlineSpan>, closed: bool) -> Block {
    Block::Paragraph { content, closed }
}

fn code_block(language: &str, content: &str, closed: bool) -> Block {
    Block::CodeBlock(CodeBlock {
        language: Some(language.to_string()),
        content: content.to_string(),
        closed,
    })
}

fn parse(input: &str) -> Session {
    let mut session = Session::new();
    session.append(input);
    session
}

fn parse_ended(input: &str) -> Session {
    let mut session = parse(input);
    session.end_stream();
    session
}

fn parse_char_by_char(input: &str) -> Session {
    let mut session = Session::new();
    for ch in input.chars() {
        session.append(&ch.to_string());
    }
    session
}

#[test]
fn test_heading_complete() {
    let session = parse("# Hello World\n");

    assert_eq!(
        session.document().blocks,
        vec![Block::Heading {
            level: 1,
            content: vec![text("Hello World")],
            closed: true,
        }]
    );
}

#[test]
fn test_heading_streaming() {
    let mut session = Session::new();

    session.append("# Hel");
    assert_eq!(session.document().blocks.len(), 1);
    assert!(!session.document().blocks[0].is_closed());

    session.append("lo Wor");
    assert_eq!(session.document().blocks.len(), 1);

    session.append("ld\n");
    assert_eq!(
        session.document().blocks,
        vec![Block::Heading {
            level: 1,
            content: vec![text("Hello World")],
            closed: true,
        }]
    );
}

#[test]
fn test_heading_levels() {
    let session = parse("# H1\n## H2\n### H3\n");

    let levels: Vec<_> = session
        .document()
        .blocks
        .iter()
        .filter_map(|b| match b.kind() {
            BlockKind::Heading(level) => Some(level),
            _ => None,
        })
        .collect();

    assert_eq!(levels, vec![1, 2, 3]);
}

#[test]
fn test_heading_level_clamped_to_six() {
    let session = parse("####### Deep\n");

    assert_eq!(session.document().blocks[0].kind(), BlockKind::Heading(6));
    assert_eq!(session.document().blocks[0].plain_text(), "Deep");
}

#[test]
fn test_hash_run_without_space_is_text() {
    let session = parse("###NoSpace");

    assert_eq!(
        session.document().blocks,
        vec![paragraph(vec![text("###NoSpace")], false)]
    );
}

#[test]
fn test_hash_run_ended_by_newline_is_text() {
    let session = parse("##\nnext");

    assert_eq!(
        session.document().blocks,
        vec![
            paragraph(vec![text("##")], true),
            paragraph(vec![text("next")], false),
        ]
    );
}

#[test]
fn test_hash_run_pending_until_resolved() {
    let mut session = parse("##");
    assert!(session.document().is_empty());
    assert_eq!(session.parser().mode(), Mode::HeadingHashRun(2));

    session.end_stream();
    assert_eq!(
        session.document().blocks,
        vec![paragraph(vec![text("##")], false)]
    );
}

#[test]
fn test_hash_mid_line_is_text() {
    let session = parse("a # b\n");

    assert_eq!(
        session.document().blocks,
        vec![paragraph(vec![text("a # b")], true)]
    );
}

#[test]
fn test_code_fence_round_trip() {
    let session = parse_ended("```go\nfmt.Println(1)\n```");

    assert_eq!(
        session.document().blocks,
        vec![code_block("go", "fmt.Println(1)\n", true)]
    );
    assert!(session.is_complete());
}

#[test]
fn test_closing_fence_held_until_resolved() {
    let session = parse("```go\nfmt.Println(1)\n```");

    assert_eq!(
        session.document().blocks,
        vec![code_block("go", "fmt.Println(1)\n", false)]
    );
    assert!(session.parser().has_pending());
}

#[test]
fn test_code_block_default_language() {
    let session = parse_ended("```\nhello\n```");

    assert_eq!(
        session.document().blocks,
        vec![code_block(DEFAULT_LANGUAGE, "hello\n", true)]
    );
    assert_eq!(DEFAULT_LANGUAGE, "plain text");
}

#[test]
fn test_code_block_streaming() {
    let mut session = Session::new();

    session.append("```py");
    assert!(session.parser().in_code_block());

    session.append("thon\n");
    assert!(session.parser().in_code_block());
    assert_eq!(session.parser().mode(), Mode::CodeBlockContent);

    session.append("print('hello')\n");
    assert!(session.parser().in_code_block());
    assert!(!session.document().is_complete());

    session.append("```\n");
    assert!(!session.parser().in_code_block());
    assert_eq!(
        session.document().blocks,
        vec![code_block("python", "print('hello')\n", true)]
    );
}

#[test]
fn test_code_block_content_is_verbatim() {
    let session = parse("```md\n**not bold** `x` # no\n```\n");

    assert_eq!(
        session.document().blocks,
        vec![code_block("md", "**not bold** `x` # no\n", true)]
    );
}

#[test]
fn test_unterminated_code_block_stays_open() {
    let mut session = parse("```js\nlet x = 1;");

    assert_eq!(
        session.document().blocks,
        vec![code_block("js", "let x = 1;", false)]
    );

    session.end_stream();
    assert!(!session.document().is_complete());
    assert!(!session.is_complete());
}

#[test]
fn test_finalize_closes_unterminated_code_block() {
    let mut session = parse("```\nunclosed code");
    session.finalize();

    assert_eq!(
        session.document().blocks,
        vec![code_block(DEFAULT_LANGUAGE, "unclosed code", true)]
    );
    assert!(session.is_complete());
}

#[test]
fn test_finalize_commits_language_being_read() {
    let mut session = parse("```rust");
    assert_eq!(session.parser().mode(), Mode::CodeBlockLanguage);

    session.finalize();
    assert_eq!(session.document().blocks, vec![code_block("rust", "", true)]);
}

#[test]
fn test_fence_closes_open_paragraph() {
    let session = parse_ended("text **bold ```js\nx\n```");

    assert_eq!(
        session.document().blocks,
        vec![
            paragraph(
                vec![text("text "), styled(InlineStyle::Bold, "bold ")],
                true
            ),
            code_block("js", "x\n", true),
        ]
    );
}

#[test]
fn test_code_block_after_paragraph_single_newline_streaming() {
    let input = "All events share these common tags:\n```\n[\"d\", \"<session-id>\"]\n```\n";
    let session = parse_char_by_char(input);

    assert_eq!(
        session.document().blocks,
        vec![
            paragraph(vec![text("All events share these common tags:")], true),
            code_block(DEFAULT_LANGUAGE, "[\"d\", \"<session-id>\"]\n", true),
        ]
    );
}

#[test]
fn test_inline_bold() {
    let session = parse_ended("**bold**");

    assert_eq!(
        session.document().blocks,
        vec![paragraph(vec![styled(InlineStyle::Bold, "bold")], false)]
    );
}

#[test]
fn test_inline_italic() {
    let session = parse_ended("*italic*");

    assert_eq!(
        session.document().blocks,
        vec![paragraph(vec![styled(InlineStyle::Italic, "italic")], false)]
    );
}

#[test]
fn test_inline_code() {
    let session = parse("Use `code` here.\n");

    assert_eq!(
        session.document().blocks,
        vec![paragraph(
            vec![text("Use "), code("code"), text(" here.")],
            true
        )]
    );
}

#[test]
fn test_inline_code_is_verbatim() {
    let session = parse_ended("`a *b* c`");

    assert_eq!(
        session.document().blocks,
        vec![paragraph(vec![code("a *b* c")], false)]
    );
}

#[test]
fn test_inline_mixed_formatting() {
    let session = parse("Some **bold**, *italic*, and `code` mixed.\n");

    assert_eq!(
        session.document().blocks,
        vec![paragraph(
            vec![
                text("Some "),
                styled(InlineStyle::Bold, "bold"),
                text(", "),
                styled(InlineStyle::Italic, "italic"),
                text(", and "),
                code("code"),
                text(" mixed."),
            ],
            true
        )]
    );
}

#[test]
fn test_streaming_multiple_code_spans_with_angle_brackets() {
    let input =
        "use `HashMap<K, V>` or `Vec<String>` or `Option<Box<dyn Error>>` in your types\n";
    let session = parse_char_by_char(input);

    let spans: Vec<_> = session.document().blocks[0]
        .inlines()
        .iter()
        .filter(|s| matches!(s, InlineSpan::Code { .. }))
        .map(InlineSpan::text)
        .collect();
    assert_eq!(
        spans,
        vec!["HashMap<K, V>", "Vec<String>", "Option<Box<dyn Error>>"]
    );
}

#[test]
fn test_emphasis_does_not_nest() {
    let session = parse_ended("**a *b* c**");

    assert_eq!(
        session.document().blocks,
        vec![paragraph(vec![styled(InlineStyle::Bold, "a *b* c")], false)]
    );
}

#[test]
fn test_span_ended_by_heading_is_never_reopened() {
    let mut session = parse("# Title *open\n");
    let heading = Block::Heading {
        level: 1,
        content: vec![text("Title "), styled(InlineStyle::Italic, "open")],
        closed: true,
    };
    assert_eq!(session.document().blocks, vec![heading.clone()]);

    // a closing marker on the next line starts a new span instead
    session.append("more* tail");
    session.end_stream();

    assert_eq!(session.document().blocks[0], heading);
    assert_eq!(
        session.document().blocks[1],
        paragraph(
            vec![
                text("more"),
                InlineSpan::Styled {
                    style: InlineStyle::Italic,
                    content: " tail".to_string(),
                    closed: false,
                },
            ],
            false
        )
    );
}

#[test]
fn test_bold_inside_italic_is_text() {
    let session = parse_ended("*a **b** c*");

    assert_eq!(
        session.document().blocks,
        vec![paragraph(vec![styled(InlineStyle::Italic, "a **b** c")], false)]
    );
}

#[test]
fn test_bold_carries_paragraph_across_lines() {
    let session = parse("**multi\nline**\n");

    assert_eq!(
        session.document().blocks,
        vec![paragraph(
            vec![styled(InlineStyle::Bold, "multi\nline")],
            true
        )]
    );
}

#[test]
fn test_heading_newline_ends_open_span() {
    let session = parse("# Title *open\nnext\n");

    assert_eq!(
        session.document().blocks,
        vec![
            Block::Heading {
                level: 1,
                content: vec![text("Title "), styled(InlineStyle::Italic, "open")],
                closed: true,
            },
            paragraph(vec![text("next")], true),
        ]
    );
}

#[test]
fn test_unmatched_marker_runs_are_text() {
    assert_eq!(
        parse("***\n").document().blocks,
        vec![paragraph(vec![text("***")], true)]
    );
    assert_eq!(
        parse_ended("a``b").document().blocks,
        vec![paragraph(vec![text("a``b")], false)]
    );
}

#[test]
fn test_blank_lines_produce_no_blocks() {
    let session = parse("one\n\n\ntwo\n");

    assert_eq!(
        session.document().blocks,
        vec![
            paragraph(vec![text("one")], true),
            paragraph(vec![text("two")], true),
        ]
    );
}

#[test]
fn test_realistic_llm_stream() {
    let mut session = Session::new();

    // Simulate realistic LLM token chunks
    let chunks = [
        "Here's",
        " a ",
        "simple",
        " example:\n\n",
        "```",
        "rust",
        "\n",
        "fn ",
        "main() {\n",
        "    println!(\"Hello\");\n",
        "}",
        "\n```",
        "\n\nThat's",
        " it!",
    ];

    for chunk in chunks {
        session.append(chunk);
    }
    session.end_stream();

    assert_eq!(
        session.document().blocks,
        vec![
            paragraph(vec![text("Here's a simple example:")], true),
            code_block(
                "rust",
                "fn main() {\n    println!(\"Hello\");\n}\n",
                true
            ),
            paragraph(vec![text("That's it!")], false),
        ]
    );
}

#[test]
fn test_empty_push() {
    let mut session = parse("**half");
    let before = session.snapshot();
    let mode = session.parser().mode();

    session.append("");
    session.append("");

    assert_eq!(session.snapshot(), before);
    assert_eq!(session.parser().mode(), mode);
    assert_eq!(session.text(), "**half");
}

#[test]
fn test_sessions_are_independent() {
    let mut a = Session::new();
    let mut b = Session::new();
    assert_ne!(a.id(), b.id());

    for (x, y) in "```sh\nls".chars().zip("*hi* there".chars()) {
        a.append(&x.to_string());
        b.append(&y.to_string());
    }

    assert_eq!(a.document().blocks, vec![code_block("sh", "ls", false)]);
    assert_eq!(b.document().blocks[0].plain_text(), "hi the");
}

#[test]
fn test_rerender_matches_incremental_prefixes() {
    let input = "# Title\n\nSome *italic* and **bold** and `code`.\n```py\nx = 1\n```\n## End\n";
    let mut session = Session::new();
    let mut seen = String::new();

    for ch in input.chars() {
        seen.push(ch);
        session.append(&ch.to_string());

        let fresh = rerender(&seen);
        let closed = session.document().closed_blocks();
        assert_eq!(&fresh.blocks[..closed.len()], closed, "prefix {seen:?}");
        if !session.parser().has_pending() {
            assert_eq!(&fresh, session.document(), "prefix {seen:?}");
        }
    }

    assert_eq!(session.rerender(), *session.document());
}

#[test]
fn test_snapshot_serializes() {
    let session = parse("## Hi\n```\nx\n```\n");
    let json = serde_json::to_value(session.document()).unwrap();

    assert_eq!(json["blocks"][0]["kind"], "heading");
    assert_eq!(json["blocks"][0]["level"], 2);
    assert_eq!(json["blocks"][1]["kind"], "code_block");
    assert_eq!(json["blocks"][1]["language"], "plain text");
}

#[test]
fn test_fragment_queue_closes_with_receiver() {
    let (feeder, queue): (Feeder, FragmentQueue) = fragment_queue();
    assert!(feeder.append("still listening"));

    drop(queue);
    assert!(!feeder.append("nobody home"));
}

proptest! {
    #[test]
    fn prop_split_point_does_not_matter(
        input in "[#*` ab\n]{0,64}",
        split in any::<prop::sample::Index>(),
    ) {
        let at = split.index(input.len() + 1);
        let (head, tail) = input.split_at(at);

        let whole = parse(&input);
        let mut split_session = Session::new();
        split_session.append(head);
        split_session.append(tail);

        prop_assert_eq!(whole.document(), split_session.document());
        prop_assert_eq!(whole.parser().mode(), split_session.parser().mode());
        prop_assert_eq!(whole.parser().has_pending(), split_session.parser().has_pending());
    }

    #[test]
    fn prop_rerender_agrees_on_closed_blocks(input in "[#*` ab\n]{0,64}") {
        let session = parse(&input);
        let fresh = rerender(&input);

        let closed = session.document().closed_blocks();
        prop_assert_eq!(&fresh.blocks[..closed.len()], closed);
        if !session.parser().has_pending() {
            prop_assert_eq!(&fresh, session.document());
        }
    }
}
