//! Story wizard — a five-step form that collects story elements, asks the
//! LLM for a children's story, and shows the result.
//!
//! Each session is an explicit `SessionState` record driven by the pure
//! `transition` function. The controller performs the one side effect (the
//! generation call); drivers (HTTP routes, the terminal) only keep the
//! state between events.

pub mod controller;
pub mod model;
pub mod prompts;
pub mod routes;
pub mod state;
pub mod store;
pub mod view;

pub use controller::{GenerationJob, WizardController};
pub use model::{StepCopy, StoryElements, StoryField};
pub use prompts::story_prompt;
pub use routes::{SessionResponse, WizardRouteState, wizard_routes};
pub use state::{
    Effect, GenerationStatus, SessionState, Transition, WizardEvent, WizardStep, transition,
};
pub use store::{SessionStore, spawn_prune_task};
pub use view::{View, ViewBody, render};
