//! Prompt pipes: deterministic prompt text for each generated field.
//!
//! Templates may reference `{keyword}` and `{category}`; rendering the same input always
//! yields the same prompts, which is what lets regeneration reproduce them.

use crate::model::{CompletionInput, CompletionPrompts};
use serde::{Deserialize, Serialize};

/// Prompt templates, configurable under `[prompts]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplates {
    /// Article title; rendered locally, never sent to a provider
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_content")]
    pub content: String,

    #[serde(default = "default_meta_desc")]
    pub meta_desc: String,

    #[serde(default = "default_meta_title")]
    pub meta_title: String,
}

fn default_title() -> String {
    "{keyword}".to_string()
}

fn default_content() -> String {
    "We are a web that makes great and polished articles about petanque in spanish. \
     Generate an detailed, eye-catching, SEO optimized web article in html format about \
     \"{keyword}\" in spanish. With introduction and headings. Write it in a professional \
     but casual tone. Make important sentences bold."
        .to_string()
}

fn default_meta_desc() -> String {
    "Genera un parrafo de metadescripción SEO de menos de 155 caracteres sobre \"{keyword}\"."
        .to_string()
}

fn default_meta_title() -> String {
    "Genera un meta-título SEO para la keyword \"{keyword}\" con menos de 57 caracteres y sin separadores."
        .to_string()
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            title: default_title(),
            content: default_content(),
            meta_desc: default_meta_desc(),
            meta_title: default_meta_title(),
        }
    }
}

impl PromptTemplates {
    pub fn title(&self, input: &CompletionInput) -> String {
        render(&self.title, input)
    }

    /// Render the three remote prompts for `input`.
    pub fn render(&self, input: &CompletionInput) -> CompletionPrompts {
        CompletionPrompts {
            content: render(&self.content, input),
            meta_desc: render(&self.meta_desc, input),
            meta_title: render(&self.meta_title, input),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, template) in [
            ("content", &self.content),
            ("meta_desc", &self.meta_desc),
            ("meta_title", &self.meta_title),
        ] {
            if template.trim().is_empty() {
                return Err(format!("Prompt template '{}' cannot be empty", name));
            }
        }
        Ok(())
    }
}

fn render(template: &str, input: &CompletionInput) -> String {
    template
        .replace("{keyword}", &input.key)
        .replace("{category}", &input.category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_keyword_and_category() {
        let templates = PromptTemplates {
            title: "{keyword}".to_string(),
            content: "About {keyword} ({category})".to_string(),
            meta_desc: "Desc {keyword}".to_string(),
            meta_title: "Title {keyword}".to_string(),
        };
        let input = CompletionInput::new("bolas", "equipment");

        assert_eq!(templates.title(&input), "bolas");
        let prompts = templates.render(&input);
        assert_eq!(prompts.content, "About bolas (equipment)");
        assert_eq!(prompts.meta_desc, "Desc bolas");
        assert_eq!(prompts.meta_title, "Title bolas");
    }

    #[test]
    fn default_prompts_are_reproducible() {
        let templates = PromptTemplates::default();
        let input = CompletionInput::new("reglas de petanca", "rules");
        assert_eq!(templates.render(&input), templates.render(&input));
        assert!(templates
            .render(&input)
            .meta_title
            .contains("\"reglas de petanca\""));
    }

    #[test]
    fn empty_template_fails_validation() {
        let templates = PromptTemplates {
            meta_desc: "  ".to_string(),
            ..PromptTemplates::default()
        };
        assert!(templates.validate().is_err());
        assert!(PromptTemplates::default().validate().is_ok());
    }
}
