//! Terminal front end for manual review

use std::io::{BufRead, Write};
use verdict_batch::{Decision, Reviewer};
use verdict_core::{ClassificationUnit, Result};

const HELP: &str = "Classify the LLM output as choosing Response A or Response B. \
[a] Response A  [b] Response B  [u] leave as unsure  [q] quit (progress is saved)";

/// Reads review decisions line by line
pub struct TerminalReviewer<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalReviewer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Reviewer for TerminalReviewer<R, W> {
    fn present(&mut self, unit: &ClassificationUnit) -> Result<Decision> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", HELP)?;
        writeln!(self.output, "{}", "=".repeat(60))?;
        writeln!(self.output, "{}", unit.raw_output)?;
        writeln!(self.output)?;
        writeln!(self.output, "################ PROMPT ###############")?;
        writeln!(self.output, "{}", unit.prompt)?;
        writeln!(self.output, "{}", "=".repeat(60))?;
        writeln!(
            self.output,
            "Attempt ID: {}; source: {}, line {}, column {}",
            unit.id,
            unit.source_file.as_deref().unwrap_or("-"),
            unit.source_line.map(|l| l.to_string()).unwrap_or_else(|| "-".to_string()),
            unit.source_column.as_deref().unwrap_or("-"),
        )?;

        loop {
            write!(self.output, "[a/b/u/q] > ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(Decision::Abort);
            }

            match line.trim().to_lowercase().as_str() {
                "a" => return Ok(Decision::A),
                "b" => return Ok(Decision::B),
                "u" => return Ok(Decision::Defer),
                "q" => return Ok(Decision::Abort),
                _ => writeln!(self.output, "Please answer a, b, u or q.")?,
            }
        }
    }
}

/// Ask a yes/no question; anything but `n` means yes
pub fn confirm<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> Result<bool> {
    write!(output, "{} (Y/n) ", question)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_lowercase() != "n")
}
