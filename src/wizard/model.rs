//! Story element fields and the copy shown for each collection step.

use serde::{Deserialize, Serialize};

/// Page title shown above every step.
pub const TITLE: &str = "Magic Story Generator";
/// Subtitle shown under the title.
pub const SUBTITLE: &str = "Create wonderful stories for children!";
/// Progress-indicator text while the story is being written.
pub const SPINNER_TEXT: &str = "Creating your magical story...";
/// Label of the reset action on the display step.
pub const RESET_LABEL: &str = "Create Another Story";
/// Label of the re-trigger action after a failed generation.
pub const RETRY_LABEL: &str = "Try Again";
/// Number of collection steps counted by the progress indicator.
pub const COLLECTION_STEPS: u8 = 5;

/// One of the five values the wizard collects, in collection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryField {
    MainCharacter,
    Location,
    Theme,
    Challenges,
    Activities,
}

impl StoryField {
    pub const ALL: [StoryField; 5] = [
        StoryField::MainCharacter,
        StoryField::Location,
        StoryField::Theme,
        StoryField::Challenges,
        StoryField::Activities,
    ];

    /// Copy for the step that collects this field.
    pub fn copy(&self) -> StepCopy {
        match self {
            Self::MainCharacter => StepCopy {
                heading: "Who is our hero?",
                label: "Character Name",
                placeholder: "Enter the main character's name",
                help: "This could be a child, animal, or magical creature!",
                button: "Next",
            },
            Self::Location => StepCopy {
                heading: "Where does our story take place?",
                label: "Location",
                placeholder: "Enter the magical place",
                help: "Could be a magical forest, a busy city, or even outer space!",
                button: "Next",
            },
            Self::Theme => StepCopy {
                heading: "What lesson should we learn?",
                label: "Theme",
                placeholder: "Enter the story's message",
                help: "Examples: Being kind, trying your best, making friends",
                button: "Next",
            },
            Self::Challenges => StepCopy {
                heading: "What challenges will our hero face?",
                label: "Challenges",
                placeholder: "Enter the challenges",
                help: "What problems or obstacles will they need to overcome?",
                button: "Next",
            },
            Self::Activities => StepCopy {
                heading: "What does our hero love to do?",
                label: "Activities",
                placeholder: "Enter favorite activities",
                help: "What makes our hero happy? What are they good at?",
                button: "Create Story!",
            },
        }
    }
}

impl std::fmt::Display for StoryField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::MainCharacter => "main_character",
            Self::Location => "location",
            Self::Theme => "theme",
            Self::Challenges => "challenges",
            Self::Activities => "activities",
        };
        write!(f, "{s}")
    }
}

/// Static text for one collection step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepCopy {
    pub heading: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub help: &'static str,
    pub button: &'static str,
}

/// The five collected values, complete and ready for templating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryElements {
    pub main_character: String,
    pub location: String,
    pub theme: String,
    pub challenges: String,
    pub activities: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_serde() {
        for field in StoryField::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(format!("\"{field}\""), json);
        }
    }

    #[test]
    fn only_last_step_creates_the_story() {
        for field in &StoryField::ALL[..4] {
            assert_eq!(field.copy().button, "Next");
        }
        assert_eq!(StoryField::Activities.copy().button, "Create Story!");
    }

    #[test]
    fn every_step_has_copy() {
        for field in StoryField::ALL {
            let copy = field.copy();
            assert!(!copy.heading.is_empty());
            assert!(!copy.label.is_empty());
            assert!(!copy.placeholder.is_empty());
            assert!(!copy.help.is_empty());
        }
    }
}
