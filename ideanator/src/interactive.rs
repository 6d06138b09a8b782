//! Terminal front end
//!
//! Subscribes to the event bus and prints progress. When the pipeline emits
//! awaiting-input, a line is read with rustyline on a blocking thread and sent
//! back through the respondent channel.

use colored::Colorize;
use eyre::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

use crate::domain::IdeaResult;
use crate::events::PipelineEvent;
use crate::pipeline::{Pipeline, PipelineError};
use crate::respondent::ChannelRespondent;

/// Format one event for the terminal; `None` for events that print nothing
pub fn render_event(event: &PipelineEvent) -> Option<String> {
    match event {
        PipelineEvent::Status { message, .. } => Some(format!("{}", message.dimmed())),
        PipelineEvent::VaguenessScored {
            score,
            uncovered,
            phases,
            ..
        } => {
            let mut out = format!("{} {}", "Coverage:".bright_cyan(), score);
            if !uncovered.is_empty() {
                out.push_str(&format!("\n{} {}", "Missing:".bright_cyan(), uncovered.join(", ")));
            }
            let names: Vec<&str> = phases.iter().map(|p| p.key()).collect();
            out.push_str(&format!("\n{} {}", "Phases:".bright_cyan(), names.join(" → ")));
            Some(out)
        }
        PipelineEvent::PhaseStarted {
            label,
            phase_index,
            total_phases,
            ..
        } => Some(format!(
            "\n{} {}",
            format!("[{}/{}]", phase_index + 1, total_phases).dimmed(),
            label.bright_cyan().bold()
        )),
        PipelineEvent::InterviewerText { text, .. } => Some(format!("\n{}", text.bright_blue())),
        PipelineEvent::RespondentText { text, .. } => Some(format!("\n{} {}", ">".bright_green(), text)),
        PipelineEvent::AwaitingInput { .. } => None,
        PipelineEvent::GenericFlagged { question, .. } => {
            Some(format!("{} generic question: {}", "!".yellow(), question.yellow()))
        }
        PipelineEvent::LegacySynthesis { text, .. } => {
            Some(format!("\n{}\n{}", "Summary".bright_cyan().bold(), text))
        }
        PipelineEvent::Refactored { summary, .. } => {
            Some(format!("\n{}\n{}", "Idea statement".bright_cyan().bold(), summary))
        }
    }
}

/// Read one line; `None` on Ctrl+C or Ctrl+D
pub async fn read_line(prompt: String) -> Result<Option<String>> {
    tokio::task::spawn_blocking(move || -> Result<Option<String>> {
        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;
        match rl.readline(&prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(eyre::eyre!("Readline error: {}", err)),
        }
    })
    .await
    .context("Input task failed")?
}

/// Read a non-empty line, re-prompting on blank input
async fn read_answer() -> Result<Option<String>> {
    loop {
        match read_line(format!("{} ", ">".bright_green())).await? {
            Some(line) if line.trim().is_empty() => continue,
            Some(line) => return Ok(Some(line.trim().to_string())),
            None => return Ok(None),
        }
    }
}

/// Print events until the refactored result arrives, answering input requests
async fn drive_terminal(mut rx: broadcast::Receiver<PipelineEvent>, answers: mpsc::Sender<String>) -> Result<()> {
    loop {
        let event = match rx.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(skipped = n, "drive_terminal: lagged behind event bus");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => return Ok(()),
        };

        if let Some(text) = render_event(&event) {
            println!("{}", text);
        }
        match event {
            PipelineEvent::AwaitingInput { .. } => match read_answer().await? {
                Some(answer) => {
                    if answers.send(answer).await.is_err() {
                        return Ok(());
                    }
                }
                // Dropping the sender ends the run with InputClosed
                None => return Ok(()),
            },
            PipelineEvent::Refactored { .. } => return Ok(()),
            _ => {}
        }
    }
}

/// Ctrl+D at an answer prompt ends the session quietly, like an empty idea
fn settle(outcome: Result<IdeaResult, PipelineError>) -> Result<Option<IdeaResult>> {
    match outcome {
        Ok(result) => Ok(Some(result)),
        Err(PipelineError::InputClosed) => {
            debug!("InteractiveSession::run: input closed mid-interview");
            Ok(None)
        }
        Err(e) => Err(e).context("Interactive run failed"),
    }
}

/// One interactive run: a human answers every interviewer turn
pub struct InteractiveSession {
    pipeline: Pipeline,
}

impl InteractiveSession {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self, idea: Option<String>) -> Result<Option<IdeaResult>> {
        self.print_welcome();

        let idea = match idea {
            Some(idea) => {
                println!("{} {}", ">".bright_green(), idea);
                idea
            }
            None => {
                println!("Describe your idea in a sentence or two:");
                match read_answer().await? {
                    Some(idea) => idea,
                    None => return Ok(None),
                }
            }
        };
        debug!(idea_len = idea.len(), "InteractiveSession::run: starting pipeline");

        let rx = self.pipeline.events().subscribe();
        let (tx, mut respondent) = ChannelRespondent::channel(1);
        let terminal = tokio::spawn(drive_terminal(rx, tx));

        let outcome = self.pipeline.run_with(&idea, &mut respondent).await;
        if outcome.is_ok() {
            terminal.await.context("Terminal task failed")??;
        } else {
            terminal.abort();
        }
        settle(outcome)
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "Ideanator".bright_cyan().bold());
        println!("Answer each question in your own words. {} to quit.", "Ctrl+D".yellow());
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Phase;
    use crate::llm::LlmError;

    #[test]
    fn test_closed_input_ends_session_quietly() {
        let settled = settle(Err(PipelineError::InputClosed)).unwrap();
        assert!(settled.is_none());
    }

    #[test]
    fn test_other_run_errors_still_fail() {
        let err = settle(Err(PipelineError::Llm(LlmError::EmptyResponse))).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Interactive run failed"));
        assert!(message.contains("no text content"));
    }

    #[test]
    fn test_render_phase_started_shows_label() {
        let event = PipelineEvent::PhaseStarted {
            run_id: "r".into(),
            phase: Phase::Reveal,
            label: Phase::Reveal.label().to_string(),
            phase_index: 1,
            total_phases: 4,
        };
        let text = render_event(&event).unwrap();
        assert!(text.contains("REVEAL"));
        assert!(text.contains("[2/4]"));
    }

    #[test]
    fn test_render_awaiting_input_prints_nothing() {
        let event = PipelineEvent::AwaitingInput {
            run_id: "r".into(),
            phase: Phase::Anchor,
            label: Phase::Anchor.label().to_string(),
        };
        assert!(render_event(&event).is_none());
    }

    #[test]
    fn test_render_vagueness_lists_phases() {
        let event = PipelineEvent::VaguenessScored {
            run_id: "r".into(),
            score: "0/6".into(),
            uncovered: vec!["who specifically this is for".into()],
            phases: vec![Phase::Anchor, Phase::Scope],
        };
        let text = render_event(&event).unwrap();
        assert!(text.contains("0/6"));
        assert!(text.contains("who specifically this is for"));
        assert!(text.contains("anchor"));
        assert!(text.contains("scope"));
    }
}
