use reqwest::Client;
use std::error::Error as StdError;
use std::fmt;
use tracing::{error, info};

use crate::config::Config;
use crate::content::{StudyContent, response_schema};
use crate::gateway::{ContentGenerator, HostContentGenerator, HostImageSearch, ImageSearch};
use crate::model::GenerationRequest;

/// Why an explanation could not be produced. Callers show one generic
/// message for every variant; the distinction only feeds the logs.
#[derive(Debug)]
pub enum FetchError {
    NoResponse,
    Parse(serde_json::Error),
    Transport(anyhow::Error),
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoResponse => "no_response",
            Self::Parse(_) => "parse",
            Self::Transport(_) => "transport",
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResponse => write!(f, "no response from model"),
            Self::Parse(err) => write!(f, "model response did not match study content: {err}"),
            Self::Transport(err) => write!(f, "model request failed: {err:#}"),
        }
    }
}

impl StdError for FetchError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::NoResponse => None,
            Self::Parse(err) => Some(err),
            Self::Transport(err) => {
                let source: &(dyn StdError + 'static) = &**err;
                Some(source)
            }
        }
    }
}

/// Produces study content for a subject/topic pair by running the model call
/// and the image lookup side by side.
pub struct ExplanationFetcher<G, I> {
    generator: G,
    images: I,
    system_instruction: String,
    study_level: String,
}

impl<'a> ExplanationFetcher<HostContentGenerator<'a>, HostImageSearch<'a>> {
    pub fn new(client: &'a Client, cfg: &'a Config) -> Self {
        Self::with_parts(
            HostContentGenerator::new(client, cfg),
            HostImageSearch::new(client, cfg),
            cfg,
        )
    }
}

impl<G, I> ExplanationFetcher<G, I>
where
    G: ContentGenerator,
    I: ImageSearch,
{
    pub fn with_parts(generator: G, images: I, cfg: &Config) -> Self {
        Self {
            generator,
            images,
            system_instruction: cfg.system_prompt.clone(),
            study_level: cfg.study_level.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn generator(&self) -> &G {
        &self.generator
    }

    /// `subject` is the display label, not the catalog id.
    pub async fn fetch_explanation(
        &self,
        subject: &str,
        topic: &str,
    ) -> Result<StudyContent, FetchError> {
        let request = GenerationRequest {
            system_instruction: self.system_instruction.clone(),
            prompt: build_prompt(subject, topic, &self.study_level),
            response_schema: response_schema(),
        };

        let (generated, image_url) = tokio::join!(
            self.generator.generate(&request),
            self.images.find_image(subject, topic)
        );

        match assemble(generated, image_url) {
            Ok(content) => {
                info!(
                    subject = %subject,
                    topic = %topic,
                    key_points = content.key_points.len(),
                    has_image = content.image_url.is_some(),
                    "fetched explanation"
                );
                Ok(content)
            }
            Err(err) => {
                error!(
                    subject = %subject,
                    topic = %topic,
                    kind = err.kind(),
                    error = %err,
                    "failed to fetch explanation"
                );
                Err(err)
            }
        }
    }
}

fn assemble(
    generated: anyhow::Result<Option<String>>,
    image_url: Option<String>,
) -> Result<StudyContent, FetchError> {
    let text = generated
        .map_err(FetchError::Transport)?
        .filter(|text| !text.is_empty())
        .ok_or(FetchError::NoResponse)?;
    let mut content = StudyContent::from_json(&text).map_err(FetchError::Parse)?;
    content.attach_image(image_url);
    Ok(content)
}

pub(crate) fn build_prompt(subject: &str, topic: &str, study_level: &str) -> String {
    format!(
        "You are an expert tutor specializing in the {level} curriculum.
Please provide a clear, concise, and educational explanation for the topic: \"{topic}\"
specifically within the subject of \"{subject}\".

The output must strictly adhere to the following structure:
1. Definition: A clear, academic definition suitable for a {level} student.
2. Key Points: A list of 3-5 crucial facts, formulas, or concepts related to the topic.
3. Example: A short, concise practical example (maximum 2-3 sentences) with brief explanation.",
        level = study_level,
        topic = topic,
        subject = subject,
    )
}
