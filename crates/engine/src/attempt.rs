use crate::config::GenerationConfig;
use crate::intake::{GenerationMode, SeedImage};

/// Directive handed to the director when an image is animated without any prompt.
pub const DEFAULT_IMAGE_DIRECTIVE: &str = "Animate the provided frame";

/// Everything one attempt needs, captured by value at submit time.
#[derive(Debug, Clone)]
pub struct AttemptPlan {
    pub mode: GenerationMode,
    pub directive: String,
    pub config: GenerationConfig,
    pub seed: Option<SeedImage>,
}

/// Checks the submit preconditions. `None` means the pipeline must not start;
/// this is a silent skip, not an error.
pub fn plan_attempt(
    mode: GenerationMode,
    prompt: &str,
    config: GenerationConfig,
    seed: Option<SeedImage>,
) -> Option<AttemptPlan> {
    match mode {
        GenerationMode::TextToVideo => {
            if prompt.trim().is_empty() {
                return None;
            }
            Some(AttemptPlan {
                mode,
                directive: prompt.to_string(),
                config,
                seed: None,
            })
        }
        GenerationMode::ImageToVideo => {
            let seed = seed?;
            let directive = if prompt.trim().is_empty() {
                DEFAULT_IMAGE_DIRECTIVE.to_string()
            } else {
                prompt.to_string()
            };
            Some(AttemptPlan {
                mode,
                directive,
                config,
                seed: Some(seed),
            })
        }
    }
}
