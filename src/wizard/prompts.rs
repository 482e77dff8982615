//! Prompt templating for story generation.

use super::model::StoryElements;

/// Build the generation prompt from the five collected fields.
///
/// Fields are substituted verbatim. The output depends only on `elements`.
pub fn story_prompt(elements: &StoryElements) -> String {
    format!(
        "\
Please write a cheerful, engaging 10-paragraph children's story (aimed at 5-year-olds) with the following elements:

Main Character: {main_character}
Setting/Location: {location}
Theme/Moral Lesson: {theme}
Challenges: {challenges}
Favorite Activities: {activities}

The story should:
- Use simple language appropriate for young children
- Be upbeat and positive throughout
- Clearly demonstrate the moral lesson
- Include moments of wonder and excitement
- End on a happy, satisfying note
- Keep paragraphs short and easy to follow
",
        main_character = elements.main_character,
        location = elements.location,
        theme = elements.theme,
        challenges = elements.challenges,
        activities = elements.activities,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn luna() -> StoryElements {
        StoryElements {
            main_character: "Luna".to_string(),
            location: "Enchanted Forest".to_string(),
            theme: "Being kind to others".to_string(),
            challenges: "Making new friends".to_string(),
            activities: "Reading books and painting".to_string(),
        }
    }

    #[test]
    fn prompt_matches_template_exactly() {
        let expected = "Please write a cheerful, engaging 10-paragraph children's story (aimed at 5-year-olds) with the following elements:\n\
\n\
Main Character: Luna\n\
Setting/Location: Enchanted Forest\n\
Theme/Moral Lesson: Being kind to others\n\
Challenges: Making new friends\n\
Favorite Activities: Reading books and painting\n\
\n\
The story should:\n\
- Use simple language appropriate for young children\n\
- Be upbeat and positive throughout\n\
- Clearly demonstrate the moral lesson\n\
- Include moments of wonder and excitement\n\
- End on a happy, satisfying note\n\
- Keep paragraphs short and easy to follow\n";
        assert_eq!(story_prompt(&luna()), expected);
    }

    #[test]
    fn prompt_is_deterministic() {
        let elements = luna();
        assert_eq!(story_prompt(&elements), story_prompt(&elements.clone()));
    }

    #[test]
    fn fields_are_not_escaped() {
        let mut elements = luna();
        elements.main_character = "Sir {Braces} <b>Bold</b>".to_string();
        let prompt = story_prompt(&elements);
        assert!(prompt.contains("Main Character: Sir {Braces} <b>Bold</b>\n"));
    }
}
