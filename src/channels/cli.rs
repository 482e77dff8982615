//! CLI channel — runs the wizard over stdin/stdout for local use.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::Error;
use crate::wizard::model::{SPINNER_TEXT, SUBTITLE, TITLE};
use crate::wizard::view::Progress;
use crate::wizard::{SessionState, WizardController, WizardEvent, WizardStep};

/// Drives one wizard session from line-based input.
pub struct CliChannel<'a> {
    controller: &'a WizardController,
    state: SessionState,
}

impl<'a> CliChannel<'a> {
    pub fn new(controller: &'a WizardController) -> Self {
        Self {
            controller,
            state: SessionState::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Run until EOF or `quit`.
    pub async fn run<R, W>(&mut self, input: R, mut out: W) -> Result<(), Error>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();

        out.write_all(format!("📖 {TITLE}\n{SUBTITLE}\n").as_bytes())
            .await?;

        loop {
            match self.state.step {
                WizardStep::Generating => {
                    out.write_all(format!("⏳ {SPINNER_TEXT}\n").as_bytes())
                        .await?;
                    out.flush().await?;
                    if let Err(e) = self.controller.generate(&mut self.state).await {
                        tracing::debug!(error = %e, "Generation did not complete");
                        out.write_all(
                            format!("❌ {e}\nPress Enter to try again, or type quit.\n")
                                .as_bytes(),
                        )
                        .await?;
                        out.flush().await?;
                        match lines.next_line().await? {
                            Some(line) if line.trim() != "quit" => {
                                self.controller.apply(&mut self.state, WizardEvent::Retry);
                            }
                            _ => break,
                        }
                    }
                }
                WizardStep::Display => {
                    let story = self.state.story.as_deref().unwrap_or_default();
                    out.write_all(
                        format!(
                            "\n🎈🎉🎈\n\n{story}\n\nType 'again' to create another story, or 'quit' to exit.\n"
                        )
                        .as_bytes(),
                    )
                    .await?;
                    out.flush().await?;
                    match lines.next_line().await? {
                        Some(line) if line.trim() == "again" => {
                            self.controller.apply(&mut self.state, WizardEvent::Reset);
                        }
                        Some(line) if line.trim() != "quit" => {}
                        _ => break,
                    }
                }
                step => {
                    let Some(field) = step.field() else {
                        break;
                    };
                    let copy = field.copy();
                    let progress = Progress::for_step(step);
                    out.write_all(
                        format!(
                            "\n[{}]\n### {}\n{} ({})\n[{}] > ",
                            progress.label, copy.heading, copy.help, copy.placeholder, copy.button
                        )
                        .as_bytes(),
                    )
                    .await?;
                    out.flush().await?;

                    let Some(line) = lines.next_line().await? else {
                        break;
                    };
                    if line.trim() == "quit" {
                        break;
                    }
                    // Blank lines are ignored without comment.
                    self.controller
                        .apply(&mut self.state, WizardEvent::Submit { value: line });
                }
            }
        }

        out.flush().await?;
        Ok(())
    }
}

/// Run the wizard on the process's stdin/stdout.
pub async fn run_stdio(controller: &WizardController) -> Result<(), Error> {
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    CliChannel::new(controller)
        .run(input, tokio::io::stdout())
        .await
}
