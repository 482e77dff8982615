//! Wizard state machine — the session record and its pure transition function.

use serde::{Deserialize, Serialize};

use super::model::{StoryElements, StoryField};
use super::prompts::story_prompt;

/// The steps of the wizard.
///
/// Progresses linearly: CollectCharacter → CollectLocation → CollectTheme →
/// CollectChallenges → CollectActivities → Generating → Display. Display
/// returns to CollectCharacter only through a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    CollectCharacter,
    CollectLocation,
    CollectTheme,
    CollectChallenges,
    CollectActivities,
    Generating,
    Display,
}

impl WizardStep {
    /// 1-based step number.
    pub fn number(&self) -> u8 {
        match self {
            Self::CollectCharacter => 1,
            Self::CollectLocation => 2,
            Self::CollectTheme => 3,
            Self::CollectChallenges => 4,
            Self::CollectActivities => 5,
            Self::Generating => 6,
            Self::Display => 7,
        }
    }

    pub fn from_number(n: u8) -> Option<WizardStep> {
        use WizardStep::*;
        match n {
            1 => Some(CollectCharacter),
            2 => Some(CollectLocation),
            3 => Some(CollectTheme),
            4 => Some(CollectChallenges),
            5 => Some(CollectActivities),
            6 => Some(Generating),
            7 => Some(Display),
            _ => None,
        }
    }

    /// The field this step collects, if it is a collection step.
    pub fn field(&self) -> Option<StoryField> {
        match self {
            Self::CollectCharacter => Some(StoryField::MainCharacter),
            Self::CollectLocation => Some(StoryField::Location),
            Self::CollectTheme => Some(StoryField::Theme),
            Self::CollectChallenges => Some(StoryField::Challenges),
            Self::CollectActivities => Some(StoryField::Activities),
            Self::Generating | Self::Display => None,
        }
    }

    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: WizardStep) -> bool {
        use WizardStep::*;
        matches!(
            (self, target),
            (CollectCharacter, CollectLocation)
                | (CollectLocation, CollectTheme)
                | (CollectTheme, CollectChallenges)
                | (CollectChallenges, CollectActivities)
                | (CollectActivities, Generating)
                | (Generating, Display)
                | (Display, CollectCharacter)
        )
    }

    /// The next step in the forward progression. Display has none.
    pub fn next(&self) -> Option<WizardStep> {
        match self {
            Self::Display => None,
            other => Self::from_number(other.number() + 1),
        }
    }
}

impl Default for WizardStep {
    fn default() -> Self {
        Self::CollectCharacter
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::CollectCharacter => "collect_character",
            Self::CollectLocation => "collect_location",
            Self::CollectTheme => "collect_theme",
            Self::CollectChallenges => "collect_challenges",
            Self::CollectActivities => "collect_activities",
            Self::Generating => "generating",
            Self::Display => "display",
        };
        write!(f, "{s}")
    }
}

/// Progress of the generation call for the current arrival at `Generating`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationStatus {
    /// Not at the generating step.
    #[default]
    Idle,
    /// Arrived; the call has not been claimed yet.
    Pending,
    /// The call for this arrival is outstanding.
    InFlight,
    /// The call for this arrival failed; waiting for a retry.
    Failed { message: String },
}

/// Per-session wizard state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub step: WizardStep,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_character: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenges: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activities: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story: Option<String>,
    #[serde(default)]
    pub generation: GenerationStatus,
    /// Arrivals into `Generating`, retries included.
    #[serde(default)]
    pub arrivals: u32,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self, field: StoryField) -> Option<&str> {
        let value = match field {
            StoryField::MainCharacter => &self.main_character,
            StoryField::Location => &self.location,
            StoryField::Theme => &self.theme,
            StoryField::Challenges => &self.challenges,
            StoryField::Activities => &self.activities,
        };
        value.as_deref()
    }

    fn field_mut(&mut self, field: StoryField) -> &mut Option<String> {
        match field {
            StoryField::MainCharacter => &mut self.main_character,
            StoryField::Location => &mut self.location,
            StoryField::Theme => &mut self.theme,
            StoryField::Challenges => &mut self.challenges,
            StoryField::Activities => &mut self.activities,
        }
    }

    /// All five fields, if every one has been collected.
    pub fn elements(&self) -> Option<StoryElements> {
        Some(StoryElements {
            main_character: self.main_character.clone()?,
            location: self.location.clone()?,
            theme: self.theme.clone()?,
            challenges: self.challenges.clone()?,
            activities: self.activities.clone()?,
        })
    }

    /// Whether a generation call is outstanding for this session.
    pub fn is_generating(&self) -> bool {
        self.generation == GenerationStatus::InFlight
    }

    /// The failure message from the last generation attempt, if any.
    pub fn generation_error(&self) -> Option<&str> {
        match &self.generation {
            GenerationStatus::Failed { message } => Some(message),
            _ => None,
        }
    }

    fn advance(&mut self) {
        if let Some(next) = self.step.next() {
            debug_assert!(self.step.can_transition_to(next));
            self.step = next;
        }
        if self.step == WizardStep::Generating {
            self.arrive_at_generation();
        }
    }

    fn arrive_at_generation(&mut self) {
        self.generation = GenerationStatus::Pending;
        self.arrivals += 1;
    }
}

/// An input to the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardEvent {
    /// Confirm the candidate value for the current collection step.
    Submit { value: String },
    /// Claim the pending generation call for this arrival.
    BeginGeneration,
    GenerationSucceeded { arrival: u32, story: String },
    GenerationFailed { arrival: u32, message: String },
    /// Re-trigger generation after a failure.
    Retry,
    /// Start over ("create another story").
    Reset,
}

/// Side effect the caller must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Call the generation collaborator with `prompt`, then report back
    /// with `GenerationSucceeded`/`GenerationFailed` carrying `arrival`.
    Generate { arrival: u32, prompt: String },
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SessionState,
    pub effect: Option<Effect>,
    /// False when the event was a no-op.
    pub changed: bool,
}

impl Transition {
    fn unchanged(state: SessionState) -> Self {
        Self {
            state,
            effect: None,
            changed: false,
        }
    }

    fn changed(state: SessionState) -> Self {
        Self {
            state,
            effect: None,
            changed: true,
        }
    }
}

/// Apply `event` to `state`.
///
/// Events that do not apply to the current step are silent no-ops; that
/// includes empty or whitespace-only submissions.
pub fn transition(mut state: SessionState, event: WizardEvent) -> Transition {
    match event {
        WizardEvent::Submit { value } => {
            let Some(field) = state.step.field() else {
                return Transition::unchanged(state);
            };
            if value.trim().is_empty() {
                return Transition::unchanged(state);
            }
            *state.field_mut(field) = Some(value);
            state.advance();
            Transition::changed(state)
        }

        WizardEvent::BeginGeneration => {
            if state.step != WizardStep::Generating || state.generation != GenerationStatus::Pending
            {
                return Transition::unchanged(state);
            }
            match state.elements() {
                Some(elements) => {
                    state.generation = GenerationStatus::InFlight;
                    let effect = Effect::Generate {
                        arrival: state.arrivals,
                        prompt: story_prompt(&elements),
                    };
                    Transition {
                        state,
                        effect: Some(effect),
                        changed: true,
                    }
                }
                None => {
                    state.generation = GenerationStatus::Failed {
                        message: "Story details are incomplete.".to_string(),
                    };
                    Transition::changed(state)
                }
            }
        }

        WizardEvent::GenerationSucceeded { arrival, story } => {
            if !awaiting_result(&state, arrival) {
                return Transition::unchanged(state);
            }
            if story.trim().is_empty() {
                state.generation = GenerationStatus::Failed {
                    message: "Failed to generate story. Please try again.".to_string(),
                };
            } else {
                state.story = Some(story);
                state.generation = GenerationStatus::Idle;
                state.advance();
            }
            Transition::changed(state)
        }

        WizardEvent::GenerationFailed { arrival, message } => {
            if !awaiting_result(&state, arrival) {
                return Transition::unchanged(state);
            }
            state.generation = GenerationStatus::Failed { message };
            Transition::changed(state)
        }

        WizardEvent::Retry => {
            if state.step != WizardStep::Generating
                || !matches!(state.generation, GenerationStatus::Failed { .. })
            {
                return Transition::unchanged(state);
            }
            state.arrive_at_generation();
            Transition::changed(state)
        }

        WizardEvent::Reset => {
            if state.step != WizardStep::Display {
                return Transition::unchanged(state);
            }
            Transition::changed(SessionState::default())
        }
    }
}

fn awaiting_result(state: &SessionState, arrival: u32) -> bool {
    state.step == WizardStep::Generating
        && state.generation == GenerationStatus::InFlight
        && state.arrivals == arrival
}
