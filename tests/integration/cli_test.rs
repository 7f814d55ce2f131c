use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{json, Value};
use tempfile::TempDir;

const BINARY: &str = env!("CARGO_BIN_EXE_slidewright");

/// A scratch home, working directory and history file for one test.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn history_path(&self) -> PathBuf {
        self.dir.path().join("history.json")
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn seed(&self, presentations: Value) {
        std::fs::write(self.history_path(), presentations.to_string()).unwrap();
    }

    fn history(&self) -> Value {
        serde_json::from_str(&std::fs::read_to_string(self.history_path()).unwrap()).unwrap()
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(BINARY);
        cmd.args(args)
            .current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env("XDG_DATA_HOME", self.dir.path().join("data"))
            .env("SLIDEWRIGHT_STORAGE_PATH", self.history_path())
            .env_remove("GOOGLE_API_KEY")
            .env_remove("GEMINI_API_KEY")
            .env_remove("RUST_LOG")
            .env_remove("SLIDEWRIGHT_LOG_LEVEL");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .output()
            .expect("Failed to execute slidewright command")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn sample_history() -> Value {
    json!([
        {
            "id": "deck-2",
            "name": "Offsite",
            "messages": [
                {"id": "m1", "role": "user", "content": "plan a team offsite", "timestamp": "2025-03-14T09:00:00Z"},
                {"id": "m2", "role": "assistant", "content": "Here you go.", "timestamp": "2025-03-14T09:00:05Z"}
            ],
            "slides": [
                {"title": "Agenda", "content": "Day 1\nDay 2", "layout": "title-content"},
                {"title": "Venue", "content": "Lakeside lodge", "layout": "title-content"}
            ],
            "createdAt": "2025-03-14T09:00:05Z",
            "updatedAt": "2025-03-14T09:00:05Z"
        },
        {
            "id": "deck-1",
            "name": "Q3 Review",
            "messages": [],
            "slides": [{"title": "Revenue", "content": "Up 12%", "layout": "title-content"}],
            "createdAt": "2025-03-01T12:00:00Z",
            "updatedAt": "2025-03-01T12:00:00Z"
        }
    ])
}

mod version_command_tests {
    use super::*;

    #[test]
    fn test_version_command_basic() {
        let sandbox = Sandbox::new();
        let output = sandbox.run(&["version"]);

        assert!(output.status.success(), "version command should succeed");
        assert!(stdout(&output).contains("slidewright 0.1.0"));
    }

    #[test]
    fn test_version_command_detailed() {
        let sandbox = Sandbox::new();
        let output = sandbox.run(&["version", "--detailed"]);
        let out = stdout(&output);

        assert!(output.status.success());
        assert!(out.contains("Version"));
        assert!(out.contains("Apache-2.0"));
        assert!(out.contains("PowerPoint"));
    }
}

mod help_command_tests {
    use super::*;

    #[test]
    fn test_help_lists_commands() {
        let sandbox = Sandbox::new();
        let output = sandbox.run(&["--help"]);
        let out = stdout(&output);

        assert!(output.status.success());
        for command in ["serve", "generate", "presentations", "export", "config", "version"] {
            assert!(out.contains(command), "help should mention '{}'", command);
        }
    }

    #[test]
    fn test_generate_help() {
        let sandbox = Sandbox::new();
        let output = sandbox.run(&["generate", "--help"]);
        let out = stdout(&output);

        assert!(output.status.success());
        assert!(out.contains("--slides"));
        assert!(out.contains("--continue"));
        assert!(out.contains("--save"));
    }

    #[test]
    fn test_invalid_command() {
        let sandbox = Sandbox::new();
        let output = sandbox.run(&["frobnicate"]);
        assert!(!output.status.success());
    }
}

mod config_command_tests {
    use super::*;

    #[test]
    fn test_config_masks_api_key() {
        let sandbox = Sandbox::new();
        let output = sandbox
            .command(&["config", "--format", "json"])
            .env("GOOGLE_API_KEY", "AIzaSySecretValue123")
            .output()
            .unwrap();

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let out = stdout(&output);
        assert!(!out.contains("AIzaSySecretValue123"));

        let config: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(config["generation"]["api_key"], "AIza********");
        assert_eq!(config["server"]["port"], 3000);
    }

    #[test]
    fn test_config_env_override() {
        let sandbox = Sandbox::new();
        let output = sandbox
            .command(&["config", "--format", "json"])
            .env("SLIDEWRIGHT_PORT", "8088")
            .env("SLIDEWRIGHT_GENERATION__TEXT_MODEL", "gemini-test")
            .output()
            .unwrap();

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let config: Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(config["server"]["port"], 8088);
        assert_eq!(config["generation"]["text_model"], "gemini-test");
    }

    #[test]
    fn test_rust_log_filters_are_accepted() {
        let sandbox = Sandbox::new();
        for filter in ["off", "hyper"] {
            let output = sandbox
                .command(&["version"])
                .env("RUST_LOG", filter)
                .output()
                .unwrap();
            assert!(
                output.status.success(),
                "RUST_LOG={} stderr: {}",
                filter,
                stderr(&output)
            );
        }
    }

    #[test]
    fn test_invalid_config_fails() {
        let sandbox = Sandbox::new();
        std::fs::write(
            sandbox.path("slidewright.toml"),
            "[storage]\nbackend = \"redis\"\n",
        )
        .unwrap();

        let output = sandbox.run(&["config"]);
        assert!(!output.status.success());
        assert!(stderr(&output).contains("storage.backend"));
    }
}

mod presentations_command_tests {
    use super::*;

    #[test]
    fn test_list_empty() {
        let sandbox = Sandbox::new();
        let output = sandbox.run(&["presentations", "list"]);

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(stdout(&output).contains("No saved presentations"));
    }

    #[test]
    fn test_list_json() {
        let sandbox = Sandbox::new();
        sandbox.seed(sample_history());

        let output = sandbox.run(&["presentations", "list", "--format", "json"]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));

        let list: Value = serde_json::from_str(&stdout(&output)).unwrap();
        let names: Vec<&str> = list
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Offsite", "Q3 Review"]);
    }

    #[test]
    fn test_show() {
        let sandbox = Sandbox::new();
        sandbox.seed(sample_history());

        let output = sandbox.run(&["presentations", "show", "deck-2"]);
        let out = stdout(&output);

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(out.contains("Offsite"));
        assert!(out.contains("Agenda"));
        assert!(out.contains("plan a team offsite"));
    }

    #[test]
    fn test_show_missing() {
        let sandbox = Sandbox::new();
        sandbox.seed(sample_history());

        let output = sandbox.run(&["presentations", "show", "nope"]);
        assert!(!output.status.success());
        assert!(stderr(&output).contains("Presentation not found: nope"));
    }

    #[test]
    fn test_rename_keeps_identity() {
        let sandbox = Sandbox::new();
        sandbox.seed(sample_history());

        let output = sandbox.run(&["presentations", "rename", "deck-1", "Q3 Final"]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));

        let history = sandbox.history();
        let renamed = history
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["id"] == "deck-1")
            .unwrap();
        assert_eq!(renamed["name"], "Q3 Final");
        assert_eq!(renamed["createdAt"], "2025-03-01T12:00:00Z");
        assert_ne!(renamed["updatedAt"], "2025-03-01T12:00:00Z");
    }

    #[test]
    fn test_delete() {
        let sandbox = Sandbox::new();
        sandbox.seed(sample_history());

        let output = sandbox.run(&["presentations", "delete", "deck-2"]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert_eq!(sandbox.history().as_array().unwrap().len(), 1);

        let again = sandbox.run(&["presentations", "delete", "deck-2"]);
        assert!(!again.status.success());
    }
}

mod export_command_tests {
    use super::*;

    fn exported(sandbox: &Sandbox, format: &str, file: &str) -> PathBuf {
        let target = sandbox.path(file);
        let output = sandbox.run(&[
            "export",
            "deck-2",
            "--format",
            format,
            "--output",
            target.to_str().unwrap(),
        ]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));
        target
    }

    fn read(path: &Path) -> Vec<u8> {
        std::fs::read(path).unwrap()
    }

    #[test]
    fn test_export_pptx() {
        let sandbox = Sandbox::new();
        sandbox.seed(sample_history());

        let bytes = read(&exported(&sandbox, "pptx", "offsite.pptx"));
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_export_json() {
        let sandbox = Sandbox::new();
        sandbox.seed(sample_history());

        let bytes = read(&exported(&sandbox, "json", "offsite.json"));
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["name"], "Offsite");
        assert_eq!(value["slides"].as_array().unwrap().len(), 2);
        assert_eq!(value["messages"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_export_chat_default_filename() {
        let sandbox = Sandbox::new();
        sandbox.seed(sample_history());

        let output = sandbox.run(&["export", "deck-2", "--format", "chat"]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));

        let text = std::fs::read_to_string(sandbox.path("Offsite-chat.txt")).unwrap();
        assert!(text.starts_with("Chat History - Offsite\n"));
        assert!(text.contains("[2025-03-14 09:00:00 UTC] You:\nplan a team offsite\n"));
        assert!(text.contains("AI:\nHere you go.\n"));
    }

    #[test]
    fn test_export_unknown_format() {
        let sandbox = Sandbox::new();
        sandbox.seed(sample_history());

        let output = sandbox.run(&["export", "deck-2", "--format", "pdf"]);
        assert!(!output.status.success());
        assert!(stderr(&output).contains("Unknown export format"));
    }
}

mod generate_command_tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_generate_without_key_shows_fallback() {
        let sandbox = Sandbox::new();
        sandbox.seed(sample_history());

        let output = sandbox.run(&["generate", "add a budget slide", "--continue", "deck-2"]);

        assert!(!output.status.success());
        assert!(stdout(&output)
            .contains("Sorry, there was an error generating the slides. Please try again."));
        assert!(stderr(&output).contains("GOOGLE_API_KEY"));

        let history = sandbox.history();
        let deck = history
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["id"] == "deck-2")
            .unwrap();
        let messages = deck["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[2]["content"], "add a budget slide");
        assert_eq!(messages[3]["role"], "assistant");
        assert_eq!(deck["slides"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_generate_and_save() {
        let server = MockServer::start().await;
        let deck = json!({
            "slides": [
                {"title": "Q3 Sales Overview", "content": "Revenue up 12%"},
                {"title": "Next Steps", "content": "Hire two reps"}
            ],
            "message": "Two slides on Q3 sales."
        })
        .to_string();

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": deck}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let sandbox = Sandbox::new();
        let pptx = sandbox.path("q3.pptx");
        let mut cmd = sandbox.command(&[
            "generate",
            "quarterly sales report",
            "--slides",
            "2",
            "--save",
            "Q3",
            "--output",
            pptx.to_str().unwrap(),
            "--format",
            "json",
        ]);
        cmd.env("GOOGLE_API_KEY", "test-key")
            .env("SLIDEWRIGHT_GENERATION__API_BASE", server.uri())
            .env("SLIDEWRIGHT_GENERATION__GENERATE_IMAGES", "false");

        let output = tokio::process::Command::from(cmd).output().await.unwrap();
        assert!(output.status.success(), "stderr: {}", stderr(&output));

        let response: Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(response["slides"].as_array().unwrap().len(), 2);
        assert_eq!(response["message"], "Two slides on Q3 sales.");
        let id = response["presentationId"].as_str().unwrap().to_string();

        let history = sandbox.history();
        let saved = &history.as_array().unwrap()[0];
        assert_eq!(saved["id"], id.as_str());
        assert_eq!(saved["name"], "Q3");
        assert_eq!(saved["messages"][0]["content"], "quarterly sales report");
        assert_eq!(saved["messages"][1]["content"], "Two slides on Q3 sales.");

        assert!(std::fs::read(&pptx).unwrap().starts_with(b"PK"));
    }
}
