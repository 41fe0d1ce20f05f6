/// Edge case integration tests
///
/// These tests cover malformed exports, boundary latencies and unusual role tables
mod common;

use std::fs;

use chat_insights::AnalysisError;
use chat_insights::parsers::parse_messages_file;
use chat_insights::pipeline::{Dataset, analyze};
use common::{ChatExportBuilder, ExportFormat, four_message_chat};

fn analysis_error(err: &anyhow::Error) -> Option<&AnalysisError> {
    err.downcast_ref::<AnalysisError>()
}

#[test]
fn test_edge_case_unparseable_timestamp_names_the_row() {
    let fixture = ChatExportBuilder::new()
        .role("A", "Player")
        .message("A", 0, Some("eerste"))
        .raw_message("A", "gisteren rond de middag", Some("tweede"))
        .build();

    let err = Dataset::load(&fixture.config()).unwrap_err();
    assert_eq!(
        analysis_error(&err),
        Some(&AnalysisError::InvalidTimestamp { index: 1, author: "A".to_string() })
    );
}

#[test]
fn test_edge_case_missing_text_is_not_zero_length() {
    let fixture = four_message_chat()
        .format(ExportFormat::Csv)
        .message("A", 700, None)
        .message("B", 800, Some("<Media weggelaten>"))
        .build();
    let dataset = Dataset::load(&fixture.config()).unwrap();

    let empty = &dataset.enriched[4];
    assert_eq!(empty.text, None);
    assert_eq!(empty.message_length, None);
    assert!(!empty.has_media && !empty.has_payment_link);
    assert!(dataset.enriched[5].has_media);
    assert_eq!(dataset.stats().media_messages, 1);
}

#[test]
fn test_edge_case_latency_exactly_on_a_boundary() {
    // Replies after exactly 1 minute and exactly 5 minutes
    let fixture = ChatExportBuilder::new()
        .role("A", "Player")
        .role("B", "Staff")
        .message("A", 0, Some("vraag"))
        .message("B", 60, Some("antwoord"))
        .message("A", 360, Some("dank"))
        .build();
    let config = fixture.config();
    let dataset = Dataset::load(&config).unwrap();
    let reactions = dataset.reactions(config.boundaries().unwrap()).unwrap();

    // A boundary latency opens the next bucket
    assert_eq!(reactions.bucket_counts(), vec![0, 1, 1, 0, 0, 0, 0]);
    assert_eq!(reactions.buckets[1].label, "1-5 min");
    assert_eq!(reactions.buckets[2].label, "5-15 min");
}

#[test]
fn test_edge_case_latency_beyond_last_boundary_gets_extra_bucket() {
    let fixture = ChatExportBuilder::new()
        .role("A", "Player")
        .role("B", "Staff")
        .message("A", 0, Some("iemand zin om te trainen?"))
        .message("B", 6 * 3600, Some("sorry, net wakker"))
        .build();
    let config = fixture.config();
    let dataset = Dataset::load(&config).unwrap();
    let reactions = dataset.reactions(config.boundaries().unwrap()).unwrap();

    assert_eq!(reactions.buckets.len(), 8);
    let last = reactions.buckets.last().unwrap();
    assert_eq!(last.label, ">240 min");
    assert_eq!(last.upper, 360.0);
    assert_eq!(last.count, 1);
    assert!((last.cumulative_percentage - 1.0).abs() < 1e-9);
}

#[test]
fn test_edge_case_out_of_order_export_fails_reactions_only() {
    let fixture = ChatExportBuilder::new()
        .role("A", "Player")
        .role("B", "Staff")
        .message("A", 600, Some("later"))
        .message("B", 0, Some("eerder"))
        .build();
    let config = fixture.config();
    let dataset = Dataset::load(&config).unwrap();

    let err = dataset.reactions(config.boundaries().unwrap()).unwrap_err();
    assert!(matches!(err, AnalysisError::UnbucketedLatency { index: 1, .. }));

    let report = analyze(&dataset, &config).unwrap();
    assert!(report.reactions.is_none());
    assert!(report.reply_graph.is_some());
}

#[test]
fn test_edge_case_conflicting_role_rows_fail() {
    let fixture = four_message_chat().role("A", "Staff").build();
    let err = Dataset::load(&fixture.config()).unwrap_err();
    assert!(matches!(
        analysis_error(&err),
        Some(AnalysisError::DuplicateRoleMapping { author, .. }) if author == "A"
    ));
}

#[test]
fn test_edge_case_repeated_identical_role_rows_are_accepted() {
    let fixture = four_message_chat().role("A", "Player").build();
    let dataset = Dataset::load(&fixture.config()).unwrap();
    assert_eq!(dataset.joined.messages.len(), 4);
}

#[test]
fn test_edge_case_empty_export() {
    let fixture = ChatExportBuilder::new().role("A", "Player").build();
    let config = fixture.config();
    let dataset = Dataset::load(&config).unwrap();
    assert!(dataset.enriched.is_empty());

    let report = analyze(&dataset, &config).unwrap();
    assert_eq!(report.stats.messages, 0);
    assert_eq!(report.stats.first_message, None);
    let steps: Vec<&str> = report.failures.iter().map(|f| f.step.as_str()).collect();
    assert_eq!(steps, vec!["reactions", "clustering"]);
}

#[test]
fn test_edge_case_malformed_jsonl_lines_are_skipped() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("chat.jsonl");
    let content = [
        r#"{"timestamp":"2024-01-01 09:00:00","author":"A","message":"hoi"}"#,
        "{not json",
        r#"{"timestamp":"2024-01-01 09:01:00","author":"B","message":"hey"}"#,
        r#"{"timestamp":"2024-01-01 09:02:00","author":"A","message":"alles goed?"}"#,
    ]
    .join("\n");
    fs::write(&path, content).unwrap();

    let messages = parse_messages_file(&path).unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].author, "B");
}

#[test]
fn test_edge_case_mostly_malformed_export_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("chat.jsonl");
    let content = [
        r#"{"timestamp":"2024-01-01 09:00:00","author":"A","message":"hoi"}"#,
        "garbage",
        "more garbage",
    ]
    .join("\n");
    fs::write(&path, content).unwrap();

    assert!(parse_messages_file(&path).is_err());
}

#[test]
fn test_edge_case_unsupported_extension() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("chat.txt");
    fs::write(&path, "12/01/2024, 09:00 - A: hoi").unwrap();

    let err = parse_messages_file(&path).unwrap_err();
    assert!(err.to_string().contains("Unsupported file format"));
}

#[test]
fn test_edge_case_rfc3339_and_fractional_timestamps() {
    let fixture = ChatExportBuilder::new()
        .role("A", "Player")
        .role("B", "Staff")
        .raw_message("A", "2024-01-01T09:00:00+01:00", Some("hoi"))
        .raw_message("B", "2024-01-01T09:00:45.500", Some("hey"))
        .build();
    let dataset = Dataset::load(&fixture.config()).unwrap();
    // Offsets are dropped; wall-clock time is kept
    let minutes = dataset.enriched[1].minutes_since_prev().unwrap();
    assert!((minutes - 45.5 / 60.0).abs() < 1e-12);
}
