//! WizardController — applies events to a session and runs the generation
//! call that the state machine asks for.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::GenerationConfig;
use crate::error::{ConfigError, LlmError, WizardError};
use crate::llm::{CompletionRequest, LlmProvider};

use super::state::{Effect, GenerationStatus, SessionState, WizardEvent, WizardStep, transition};

/// A claimed generation call, ready to run outside any session lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    pub arrival: u32,
    pub prompt: String,
}

/// Drives sessions through the wizard.
///
/// Holds no session state itself; callers own the `SessionState` and keep
/// it between events.
pub struct WizardController {
    llm: Option<Arc<dyn LlmProvider>>,
    config: GenerationConfig,
}

impl WizardController {
    /// `llm` is `None` when no credential could be resolved. Generation
    /// attempts then report `ConfigError::MissingApiKey` without calling out.
    pub fn new(llm: Option<Arc<dyn LlmProvider>>, config: GenerationConfig) -> Self {
        Self { llm, config }
    }

    pub fn has_provider(&self) -> bool {
        self.llm.is_some()
    }

    /// Apply one event in place, returning any effect the caller must run.
    pub fn apply(&self, state: &mut SessionState, event: WizardEvent) -> Option<Effect> {
        let from = state.step;
        let t = transition(std::mem::take(state), event);
        *state = t.state;
        if t.changed && from != state.step {
            debug!(from = %from, to = %state.step, "Wizard step advanced");
        }
        t.effect
    }

    /// Claim the pending generation for this arrival, if there is one.
    ///
    /// Returns `Ok(None)` when nothing is pending (already claimed, failed,
    /// or not at the generating step). A missing credential leaves the state
    /// untouched.
    pub fn claim(&self, state: &mut SessionState) -> Result<Option<GenerationJob>, ConfigError> {
        if state.step != WizardStep::Generating || state.generation != GenerationStatus::Pending {
            return Ok(None);
        }
        if self.llm.is_none() {
            warn!("Story generation blocked: no API key configured");
            return Err(ConfigError::MissingApiKey);
        }
        Ok(match self.apply(state, WizardEvent::BeginGeneration) {
            Some(Effect::Generate { arrival, prompt }) => Some(GenerationJob { arrival, prompt }),
            None => None,
        })
    }

    /// Perform the generation call, bounded by the configured timeout.
    pub async fn run(&self, job: &GenerationJob) -> Result<String, LlmError> {
        let llm = self.llm.as_ref().ok_or_else(|| LlmError::RequestFailed {
            provider: "none".to_string(),
            reason: "no provider configured".to_string(),
        })?;

        info!(arrival = job.arrival, model = llm.model_name(), "Generating story");

        let request =
            CompletionRequest::new(job.prompt.as_str()).with_max_tokens(self.config.max_tokens);

        let response = tokio::time::timeout(self.config.timeout, llm.complete(request))
            .await
            .map_err(|_| LlmError::Timeout {
                provider: llm.model_name().to_string(),
                timeout: self.config.timeout,
            })??;

        if response.content.trim().is_empty() {
            return Err(LlmError::EmptyResponse {
                provider: llm.model_name().to_string(),
            });
        }

        info!(
            arrival = job.arrival,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Story generated"
        );
        Ok(response.content)
    }

    /// Feed the result of `run` back into the session.
    pub fn finish(
        &self,
        state: &mut SessionState,
        arrival: u32,
        result: Result<String, LlmError>,
    ) -> Result<(), WizardError> {
        match result {
            Ok(story) => {
                self.apply(state, WizardEvent::GenerationSucceeded { arrival, story });
                Ok(())
            }
            Err(e) => {
                let err = WizardError::Generation(e);
                warn!(arrival, error = %err, "Story generation failed");
                self.apply(
                    state,
                    WizardEvent::GenerationFailed {
                        arrival,
                        message: err.to_string(),
                    },
                );
                Err(err)
            }
        }
    }

    /// Claim, run and finish in one go, for drivers that own the state
    /// exclusively (the terminal driver, tests).
    pub async fn generate(&self, state: &mut SessionState) -> Result<(), WizardError> {
        let Some(job) = self.claim(state)? else {
            return Ok(());
        };
        let result = self.run(&job).await;
        self.finish(state, job.arrival, result)
    }
}
