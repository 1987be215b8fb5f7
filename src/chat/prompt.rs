// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! System prompt template and chat protocol phrases
//!
//! The template carries three placeholders rendered per turn:
//! `{automode_status}`, `{iteration_info}`, and `{active_theme_folder}`.

/// Phrase the model emits to signal that an automode task is finished
pub const EXIT_PHRASE: &str = "AUTOMODE_COMPLETE";

/// Input injected for every automode iteration after the first
pub const CONTINUATION_PROMPT: &str = "Continue with the next step.";

/// Canned reply when a provider round-trip fails mid-turn
pub const APOLOGY: &str =
    "I'm sorry, there was an error processing the message. Please try again.";

/// Canned reply when an image attachment cannot be prepared
pub const IMAGE_APOLOGY: &str =
    "I'm sorry, there was an error processing the image. Please try again.";

/// Built-in system prompt template, overridable from settings
pub const SYSTEM_PROMPT_TEMPLATE: &str = "\
You are Sitecraft, an AI assistant for CMS theme and site development. You \
help build and maintain themes, templates, styles, and site content by \
reading, creating, and editing files in the active workspace.

The active theme folder is {active_theme_folder}. Place new theme files \
there unless told otherwise.

You have tools to create files, write to files, read files, list files, and \
search the web. Use them whenever a request involves the filesystem or \
current information; do not guess at file contents you can read.

{automode_status}
{iteration_info}

When working autonomously, proceed step by step and respond with \
AUTOMODE_COMPLETE once the goal is fully achieved. Do not use that phrase \
otherwise.";

/// Check whether response text signals automode completion
///
/// Plain case-sensitive substring containment. The phrase is also matched
/// inside quoted or incidental text; callers live with that.
pub fn contains_exit_phrase(text: &str) -> bool {
    text.contains(EXIT_PHRASE)
}

/// Render the system prompt for one turn
pub fn render_system_prompt(
    template: &str,
    automode: bool,
    iteration: Option<(u32, u32)>,
    theme_folder: &str,
) -> String {
    let automode_status = if automode {
        "You are currently in automode."
    } else {
        "You are not in automode."
    };

    let iteration_info = match iteration {
        Some((current, max)) => format!(
            "You are currently on iteration {} out of {} in automode.",
            current, max
        ),
        None => String::new(),
    };

    template
        .replace("{automode_status}", automode_status)
        .replace("{iteration_info}", &iteration_info)
        .replace("{active_theme_folder}", theme_folder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fills_all_placeholders() {
        let rendered = render_system_prompt(
            SYSTEM_PROMPT_TEMPLATE,
            true,
            Some((3, 25)),
            "themes/custom/aurora",
        );

        assert!(rendered.contains("You are currently in automode."));
        assert!(rendered.contains("You are currently on iteration 3 out of 25 in automode."));
        assert!(rendered.contains("themes/custom/aurora"));
        assert!(!rendered.contains('{'));
    }

    #[test]
    fn test_render_outside_automode() {
        let rendered =
            render_system_prompt(SYSTEM_PROMPT_TEMPLATE, false, None, "themes/custom");

        assert!(rendered.contains("You are not in automode."));
        assert!(!rendered.contains("iteration"));
    }

    #[test]
    fn test_render_custom_template() {
        let rendered = render_system_prompt(
            "{automode_status} / {iteration_info} / {active_theme_folder}",
            true,
            Some((1, 5)),
            "web/themes/site",
        );

        assert_eq!(
            rendered,
            "You are currently in automode. / You are currently on iteration 1 out of 5 in \
             automode. / web/themes/site"
        );
    }

    #[test]
    fn test_exit_phrase_detection() {
        assert!(contains_exit_phrase("All done. AUTOMODE_COMPLETE"));
        assert!(!contains_exit_phrase("automode_complete"));
        assert!(!contains_exit_phrase("still working"));
    }

    #[test]
    fn test_exit_phrase_matches_inside_quotes() {
        // Substring containment has no quoting awareness; a model merely
        // mentioning the phrase still counts as completion.
        assert!(contains_exit_phrase(
            "I will say \"AUTOMODE_COMPLETE\" when finished."
        ));
    }
}
