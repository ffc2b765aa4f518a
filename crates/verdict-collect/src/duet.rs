//! The DUET debate protocol
//!
//! For every non-empty prompt two models run four rounds:
//! 1. Initial: the prompt alone
//! 2. Final: each model sees the other's initial answer and must commit
//! 3. Sure: "Are you sure?"
//! 4. Considered: "Have you considered all the possibilities?"
//!
//! Each model keeps its own conversation history across rounds. Both models
//! of a round are queried concurrently.

use crate::provider::{CompletionProvider, CompletionSettings};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};
use verdict_core::{ChatMessage, Error, Result};

/// Written into every field of a row whose conversation failed
pub const ERROR_SENTINEL: &str = "ERROR";

const SURE_PROMPT: &str =
    "Are you sure? Please give your final choice explicitly as 'Response A' or 'Response B'.";

const CONSIDERED_PROMPT: &str = "Have you considered all the possibilities? Please give your final choice as Response A or Response B with no extra explanation.";

/// One debate round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Round {
    Initial,
    Final,
    Sure,
    Considered,
}

impl Round {
    pub const ALL: [Round; 4] = [Self::Initial, Self::Final, Self::Sure, Self::Considered];

    /// Column name suffix
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "Initial",
            Self::Final => "Final",
            Self::Sure => "Sure",
            Self::Considered => "Considered",
        }
    }
}

/// A model taking part in the debate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Model id sent to the provider
    pub id: String,

    /// Name used in column headers and shown to the other model
    pub display_name: String,
}

impl ModelSpec {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }

    /// Output column for `round`
    pub fn column(&self, round: Round) -> String {
        format!("{}_{}", self.display_name, round.as_str())
    }
}

/// Collection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectConfig {
    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// The two debating models
    #[serde(default = "default_models")]
    pub models: [ModelSpec; 2],

    #[serde(default)]
    pub settings: CompletionSettings,

    /// Pause between rows (milliseconds)
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            models: default_models(),
            settings: CompletionSettings::default(),
            delay_ms: default_delay_ms(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_models() -> [ModelSpec; 2] {
    [
        ModelSpec::new("llama-3.1-8b-instant", "LLaMA"),
        ModelSpec::new("gemma2-9b-it", "Gemma"),
    ]
}

fn default_delay_ms() -> u64 {
    500
}

/// Both models' answers for one prompt, indexed by round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuetRow {
    pub first: [String; 4],
    pub second: [String; 4],
}

impl DuetRow {
    fn filled(value: &str) -> Self {
        let cells = || std::array::from_fn(|_| value.to_string());
        Self {
            first: cells(),
            second: cells(),
        }
    }

    /// Row recorded when the conversation failed
    pub fn error() -> Self {
        Self::filled(ERROR_SENTINEL)
    }

    /// Row recorded for an empty prompt
    pub fn blank() -> Self {
        Self::filled("")
    }

    /// Cells in column order: both models per round, rounds in order
    pub fn cells(&self) -> impl Iterator<Item = &str> + '_ {
        (0..Round::ALL.len()).flat_map(move |i| [self.first[i].as_str(), self.second[i].as_str()])
    }
}

/// Runs DUET conversations through a completion provider
pub struct DuetRunner<P> {
    provider: P,
    models: [ModelSpec; 2],
    delay: Duration,
}

impl<P: CompletionProvider> DuetRunner<P> {
    pub fn new(provider: P, models: [ModelSpec; 2]) -> Self {
        Self {
            provider,
            models,
            delay: Duration::ZERO,
        }
    }

    /// Pause between rows
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Output columns in order
    pub fn columns(&self) -> Vec<String> {
        Round::ALL
            .iter()
            .flat_map(|round| self.models.iter().map(move |m| m.column(*round)))
            .collect()
    }

    /// Run all four rounds for one prompt
    pub async fn converse(&self, prompt: &str) -> Result<DuetRow> {
        let [first, second] = &self.models;
        let mut first_msgs = vec![ChatMessage::user(prompt)];
        let mut second_msgs = vec![ChatMessage::user(prompt)];
        let mut row = DuetRow::blank();

        for (i, round) in Round::ALL.iter().enumerate() {
            let (a, b) = tokio::try_join!(
                self.provider.complete(&first.id, &first_msgs),
                self.provider.complete(&second.id, &second_msgs),
            )?;
            info!(
                round = round.as_str(),
                first = %preview(&a),
                second = %preview(&b),
                "round answered"
            );

            if let Some(next) = Round::ALL.get(i + 1) {
                first_msgs.push(ChatMessage::assistant(a.clone()));
                first_msgs.push(ChatMessage::user(follow_up(*next, &second.display_name, &b)));
                second_msgs.push(ChatMessage::assistant(b.clone()));
                second_msgs.push(ChatMessage::user(follow_up(*next, &first.display_name, &a)));
            }

            row.first[i] = a;
            row.second[i] = b;
        }

        Ok(row)
    }

    /// Run every prompt; a failed conversation yields an error row and the
    /// batch carries on
    pub async fn run_prompts(&self, prompts: &[String]) -> Vec<DuetRow> {
        let mut rows = Vec::with_capacity(prompts.len());

        for (idx, prompt) in prompts.iter().enumerate() {
            let row_number = idx + 1;
            if prompt.trim().is_empty() {
                warn!(row = row_number, "skipping row: prompt empty");
                rows.push(DuetRow::blank());
                continue;
            }

            info!(
                row = row_number,
                total = prompts.len(),
                provider = self.provider.name(),
                "starting conversation"
            );
            match self.converse(prompt).await {
                Ok(row) => rows.push(row),
                Err(e) => {
                    error!(row = row_number, error = %e, "conversation failed");
                    rows.push(DuetRow::error());
                }
            }

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        rows
    }

    /// Read prompts from `input`, run the debate, and write `output` with the
    /// eight answer columns added (existing columns of the same name are
    /// overwritten)
    pub async fn run_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        prompt_column: &str,
    ) -> Result<usize> {
        let input = input.as_ref();
        let mut reader = csv::Reader::from_path(input)?;
        let mut headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let prompt_idx = headers.iter().position(|h| h == prompt_column).ok_or_else(|| {
            Error::data_integrity(format!(
                "{}: missing required column {:?}",
                input.display(),
                prompt_column
            ))
        })?;

        let mut records: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            records.push(record?.iter().map(String::from).collect());
        }

        let mut targets = Vec::new();
        for column in self.columns() {
            let idx = match headers.iter().position(|h| *h == column) {
                Some(idx) => idx,
                None => {
                    headers.push(column);
                    headers.len() - 1
                }
            };
            targets.push(idx);
        }

        let prompts: Vec<String> = records
            .iter()
            .map(|r| r.get(prompt_idx).cloned().unwrap_or_default())
            .collect();
        let rows = self.run_prompts(&prompts).await;

        let mut writer = csv::Writer::from_path(output.as_ref())?;
        writer.write_record(&headers)?;
        for (record, row) in records.iter_mut().zip(&rows) {
            record.resize(headers.len(), String::new());
            for (idx, cell) in targets.iter().zip(row.cells()) {
                record[*idx] = cell.to_string();
            }
            writer.write_record(record.iter())?;
        }
        writer.flush()?;

        info!(
            input = %input.display(),
            output = %output.as_ref().display(),
            rows = rows.len(),
            "collection complete"
        );
        Ok(rows.len())
    }
}

/// User turn that opens `round`, given the other model's previous answer
fn follow_up(round: Round, other_name: &str, other_answer: &str) -> String {
    match round {
        Round::Initial => String::new(),
        Round::Final => format!(
            "The other model ({}) answered:\n{}\n\nConsidering their answer and explanation, provide your final answer explicitly as 'Response A' or 'Response B' with explanation.",
            other_name, other_answer
        ),
        Round::Sure => SURE_PROMPT.to_string(),
        Round::Considered => CONSIDERED_PROMPT.to_string(),
    }
}

fn preview(text: &str) -> String {
    text.chars().take(60).collect()
}
