//! View model — what a front-end should draw for a session.
//!
//! The widgets are abstract: a text input, buttons, a progress indicator,
//! an error banner, a story container, and a celebration cue. Any UI can
//! render the serialized form.

use serde::Serialize;

use super::model::{
    COLLECTION_STEPS, RESET_LABEL, RETRY_LABEL, SPINNER_TEXT, SUBTITLE, TITLE,
};
use super::state::{GenerationStatus, SessionState, WizardStep};

/// The action a button triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
    Submit,
    Retry,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Button {
    pub label: String,
    pub action: ButtonAction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextInput {
    pub label: String,
    pub placeholder: String,
    pub help: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    /// Fraction in `[0.0, 1.0]`.
    pub value: f32,
    pub label: String,
}

impl Progress {
    pub fn for_step(step: WizardStep) -> Self {
        let n = step.number();
        let value = f32::from(n - 1) / f32::from(COLLECTION_STEPS);
        Self {
            value: value.clamp(0.0, 1.0),
            label: format!("Step {n} of {COLLECTION_STEPS}"),
        }
    }
}

/// Step-specific body of the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewBody {
    Collect {
        heading: String,
        input: TextInput,
        button: Button,
    },
    Generating {
        /// Present while a call is outstanding.
        #[serde(skip_serializing_if = "Option::is_none")]
        spinner: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        retry: Option<Button>,
    },
    Display {
        story: String,
        celebrate: bool,
        button: Button,
    },
}

/// A full page for one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub title: String,
    pub subtitle: String,
    pub step: u8,
    pub progress: Progress,
    /// Error banner text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub body: ViewBody,
}

impl View {
    /// Overlay an error banner (e.g. a configuration error that does not
    /// live in the session state).
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }
}

/// Render the page for `state`.
pub fn render(state: &SessionState) -> View {
    let body = match state.step.field() {
        Some(field) => {
            let copy = field.copy();
            ViewBody::Collect {
                heading: copy.heading.to_string(),
                input: TextInput {
                    label: copy.label.to_string(),
                    placeholder: copy.placeholder.to_string(),
                    help: copy.help.to_string(),
                },
                button: Button {
                    label: copy.button.to_string(),
                    action: ButtonAction::Submit,
                },
            }
        }
        None if state.step == WizardStep::Generating => match &state.generation {
            GenerationStatus::Failed { .. } => ViewBody::Generating {
                spinner: None,
                retry: Some(Button {
                    label: RETRY_LABEL.to_string(),
                    action: ButtonAction::Retry,
                }),
            },
            _ => ViewBody::Generating {
                spinner: Some(SPINNER_TEXT.to_string()),
                retry: None,
            },
        },
        None => ViewBody::Display {
            story: state.story.clone().unwrap_or_default(),
            celebrate: true,
            button: Button {
                label: RESET_LABEL.to_string(),
                action: ButtonAction::Reset,
            },
        },
    };

    View {
        title: TITLE.to_string(),
        subtitle: SUBTITLE.to_string(),
        step: state.step.number(),
        progress: Progress::for_step(state.step),
        error: state.generation_error().map(String::from),
        body,
    }
}
