//! DUET runner behaviour against mock providers

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use verdict_collect::{CompletionProvider, DuetRunner, ModelSpec, ERROR_SENTINEL};
use verdict_core::{ChatMessage, Error, Result};

/// Answers with the model id and the number of messages it was sent, and
/// records every conversation it sees
struct EchoProvider {
    calls: AtomicU32,
    seen: Mutex<Vec<(String, Vec<ChatMessage>)>>,
    fail_on: Option<&'static str>,
}

impl EchoProvider {
    fn new() -> Self {
        Self {
            calls: AtomicU32::new(0),
            seen: Mutex::new(Vec::new()),
            fail_on: None,
        }
    }

    /// Fail any conversation whose opening prompt contains `marker`
    fn failing_on(marker: &'static str) -> Self {
        Self {
            fail_on: Some(marker),
            ..Self::new()
        }
    }

    fn call_count(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CompletionProvider for EchoProvider {
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.seen
            .lock()
            .unwrap()
            .push((model.to_string(), messages.to_vec()));

        if let Some(marker) = self.fail_on {
            if messages[0].content.contains(marker) && messages.len() > 1 {
                return Err(Error::provider("simulated outage"));
            }
        }
        Ok(format!("{}#{}", model, messages.len()))
    }

    fn name(&self) -> &str {
        "echo"
    }
}

fn models() -> [ModelSpec; 2] {
    [ModelSpec::new("m1", "X"), ModelSpec::new("m2", "Y")]
}

#[tokio::test]
async fn test_four_rounds_with_shared_answers() {
    let runner = DuetRunner::new(EchoProvider::new(), models());
    let row = runner.converse("Which response is better?").await.unwrap();

    assert_eq!(row.first, ["m1#1", "m1#3", "m1#5", "m1#7"].map(String::from));
    assert_eq!(row.second, ["m2#1", "m2#3", "m2#5", "m2#7"].map(String::from));
    assert_eq!(runner.provider().call_count(), 8);

    let seen = runner.provider().seen.lock().unwrap();
    let (_, final_round) = seen
        .iter()
        .find(|(model, msgs)| model == "m1" && msgs.len() == 3)
        .unwrap();
    assert_eq!(final_round[1].role, "assistant");
    assert_eq!(final_round[1].content, "m1#1");
    assert!(final_round[2]
        .content
        .starts_with("The other model (Y) answered:\nm2#1"));

    let (_, last_round) = seen
        .iter()
        .find(|(model, msgs)| model == "m2" && msgs.len() == 7)
        .unwrap();
    assert!(last_round[6]
        .content
        .starts_with("Have you considered all the possibilities?"));
}

#[tokio::test]
async fn test_failed_row_records_sentinels_and_continues() {
    let runner = DuetRunner::new(EchoProvider::failing_on("broken"), models());
    let prompts = vec![
        "first prompt".to_string(),
        "   ".to_string(),
        "broken prompt".to_string(),
        "last prompt".to_string(),
    ];

    let rows = runner.run_prompts(&prompts).await;
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].first[3], "m1#7");
    assert!(rows[1].cells().all(str::is_empty));
    assert!(rows[2].cells().all(|c| c == ERROR_SENTINEL));
    assert_eq!(rows[3].second[0], "m2#1");
}

#[tokio::test]
async fn test_run_file_appends_columns() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("prompts.csv");
    let output = dir.path().join("prompts_raw.csv");
    std::fs::write(&input, "Prompt1,Label\nq1,Response A\n,Response B\n").unwrap();

    let runner = DuetRunner::new(EchoProvider::new(), models());
    let rows = runner.run_file(&input, &output, "Prompt1").await.unwrap();
    assert_eq!(rows, 2);

    let content = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines[0],
        "Prompt1,Label,X_Initial,Y_Initial,X_Final,Y_Final,X_Sure,Y_Sure,X_Considered,Y_Considered"
    );
    assert_eq!(
        lines[1],
        "q1,Response A,m1#1,m2#1,m1#3,m2#3,m1#5,m2#5,m1#7,m2#7"
    );
    assert_eq!(lines[2], ",Response B,,,,,,,,");
}

#[tokio::test]
async fn test_run_file_requires_prompt_column() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("prompts.csv");
    std::fs::write(&input, "Question\nq1\n").unwrap();

    let runner = DuetRunner::new(EchoProvider::new(), models());
    let result = runner
        .run_file(&input, dir.path().join("out.csv"), "Prompt1")
        .await;
    assert!(matches!(result, Err(Error::DataIntegrity(_))));
    assert_eq!(runner.provider().call_count(), 0);
}
