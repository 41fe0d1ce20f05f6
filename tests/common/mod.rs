//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chat_insights::config::{Config, load_config_from_path};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::json;
use tempfile::TempDir;

/// Start of every generated conversation
pub fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(9, 0, 0).unwrap()
}

/// `t0` plus a number of seconds
pub fn at(seconds: i64) -> NaiveDateTime {
    t0() + Duration::seconds(seconds)
}

/// File format used for the generated chat export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    JsonLines,
    Csv,
}

/// One row of a chat export. `timestamp` is written verbatim so tests can inject bad values.
#[derive(Debug, Clone)]
pub struct ChatRow {
    pub author: String,
    pub timestamp: String,
    pub text: Option<String>,
}

/// Builder for a temp directory holding a chat export, a role table and a config file
pub struct ChatExportBuilder {
    temp_dir: TempDir,
    rows: Vec<ChatRow>,
    roles: Vec<(String, String)>,
    format: ExportFormat,
    settings: Vec<String>,
}

/// Paths produced by [`ChatExportBuilder::build`]
pub struct ChatFixture {
    pub dir: TempDir,
    pub messages_path: PathBuf,
    pub roles_path: PathBuf,
    pub config_path: PathBuf,
    pub output_dir: PathBuf,
}

impl ChatFixture {
    pub fn config(&self) -> Config {
        load_config_from_path(&self.config_path).expect("Fixture config should load")
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl ChatExportBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            temp_dir,
            rows: Vec::new(),
            roles: Vec::new(),
            format: ExportFormat::JsonLines,
            settings: Vec::new(),
        }
    }

    /// Add a message at `seconds` after [`t0`]
    pub fn message(self, author: &str, seconds: i64, text: Option<&str>) -> Self {
        let timestamp = at(seconds).format("%Y-%m-%d %H:%M:%S").to_string();
        self.raw_message(author, &timestamp, text)
    }

    /// Add a message with a literal timestamp value
    pub fn raw_message(mut self, author: &str, timestamp: &str, text: Option<&str>) -> Self {
        self.rows.push(ChatRow {
            author: author.to_string(),
            timestamp: timestamp.to_string(),
            text: text.map(str::to_string),
        });
        self
    }

    pub fn role(mut self, author: &str, role: &str) -> Self {
        self.roles.push((author.to_string(), role.to_string()));
        self
    }

    pub fn format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    /// Extra TOML line for the config file, e.g. `fragment_size = 40`
    pub fn setting(mut self, line: &str) -> Self {
        self.settings.push(line.to_string());
        self
    }

    fn write_messages(&self) -> PathBuf {
        let records: Vec<serde_json::Value> = self
            .rows
            .iter()
            .map(|r| json!({ "timestamp": r.timestamp, "author": r.author, "message": r.text }))
            .collect();

        let (name, content) = match self.format {
            ExportFormat::Json => ("chat.json", serde_json::to_string_pretty(&records).unwrap()),
            ExportFormat::JsonLines => (
                "chat.jsonl",
                records.iter().map(|r| r.to_string()).collect::<Vec<_>>().join("\n"),
            ),
            ExportFormat::Csv => {
                let mut writer = csv::Writer::from_writer(Vec::new());
                writer.write_record(["timestamp", "author", "message"]).unwrap();
                for row in &self.rows {
                    let text = row.text.clone().unwrap_or_default();
                    writer.write_record([&row.timestamp, &row.author, &text]).unwrap();
                }
                ("chat.csv", String::from_utf8(writer.into_inner().unwrap()).unwrap())
            }
        };

        let path = self.temp_dir.path().join(name);
        fs::write(&path, content).expect("Failed to write chat export");
        path
    }

    fn write_roles(&self) -> PathBuf {
        let records: Vec<serde_json::Value> =
            self.roles.iter().map(|(a, r)| json!({ "Author": a, "Function": r })).collect();
        let path = self.temp_dir.path().join("roles.json");
        fs::write(&path, serde_json::to_string(&records).unwrap()).expect("Failed to write roles");
        path
    }

    pub fn build(self) -> ChatFixture {
        let messages_path = self.write_messages();
        let roles_path = self.write_roles();
        let output_dir = self.temp_dir.path().join("output");

        let mut config = format!(
            "messages_file = '{}'\nroles_file = '{}'\noutput_folder = '{}'\n",
            messages_path.display(),
            roles_path.display(),
            output_dir.display()
        );
        for line in &self.settings {
            config.push_str(line);
            config.push('\n');
        }
        let config_path = self.temp_dir.path().join("chat-insights.toml");
        fs::write(&config_path, config).expect("Failed to write config");

        ChatFixture { dir: self.temp_dir, messages_path, roles_path, config_path, output_dir }
    }
}

impl Default for ChatExportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A (Player) and B (Staff): A says hi, B answers after 30s, B follows up at 2 min,
/// A answers at 10 min
pub fn four_message_chat() -> ChatExportBuilder {
    ChatExportBuilder::new()
        .message("A", 0, Some("hi"))
        .message("B", 30, Some("hey"))
        .message("B", 120, Some("you there"))
        .message("A", 600, Some("yes"))
        .role("A", "Player")
        .role("B", "Staff")
}

/// Two talkative authors with clearly different vocabularies, enough for clustering
/// with `fragment_size = 40`
pub fn two_writer_chat() -> ChatExportBuilder {
    let mut builder = ChatExportBuilder::new()
        .role("anna", "Player")
        .role("bram", "Staff")
        .setting("fragment_size = 40");
    for i in 0..8 {
        builder = builder
            .message("anna", i * 120, Some("goedemorgen allemaal, zin in de wedstrijd vandaag"))
            .message("bram", i * 120 + 60, Some("training begint om acht uur, neem je tas mee"));
    }
    builder
}
