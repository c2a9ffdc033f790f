//! Provider-agnostic prompt rendering.

use crate::config::{Prompts, SummarizationPrompts};
use crate::options::SummarizationOptions;
use std::collections::HashMap;

/// Renders summarization prompts from resolved options and source text.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    prompts: SummarizationPrompts,
}

impl PromptBuilder {
    pub fn new(prompts: &Prompts) -> Self {
        Self {
            prompts: prompts.summarization.clone(),
        }
    }

    /// The system instruction sent alongside every prompt.
    pub fn system_instruction(&self) -> &str {
        &self.prompts.system
    }

    /// Build the full prompt: instruction, separator, then the source text verbatim.
    ///
    /// Custom instructions replace the length/format phrasing entirely; the
    /// language clause is added only when a language was chosen.
    pub fn build(&self, options: &SummarizationOptions, text: &str) -> String {
        let template = self.select_template(options);

        let mut vars: HashMap<&str, &str> = HashMap::new();
        vars.insert("length", options.length.prompt_phrase());
        vars.insert("format", options.format.prompt_phrase());
        vars.insert("language", options.language.prompt_phrase());
        vars.insert(
            "instructions",
            options.custom_instructions.as_deref().unwrap_or_default(),
        );

        let mut prompt = Prompts::render(template, &vars);
        prompt.push_str(&self.prompts.separator);
        prompt.push_str(text);
        prompt
    }

    fn select_template(&self, options: &SummarizationOptions) -> &str {
        let p = &self.prompts;
        let default_language = options.language.is_default();

        if options.custom_instructions.is_some() {
            return if default_language {
                &p.custom
            } else {
                &p.custom_in_language
            };
        }

        match (options.format.is_default(), default_language) {
            (true, true) => &p.plain,
            (true, false) => &p.in_language,
            (false, true) => &p.styled,
            (false, false) => &p.styled_in_language,
        }
    }
}
