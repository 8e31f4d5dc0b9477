use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::content::StudyContent;
use crate::fetcher::{ExplanationFetcher, FetchError};
use crate::gateway::{ContentGenerator, ImageSearch};
use crate::subjects::{self, SubjectOption};

pub const GENERIC_ERROR_MESSAGE: &str =
    "We encountered an issue while generating your study material. Please try again.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadingState {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl LoadingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Form and result state for one student. The only writer of `LoadingState`.
#[derive(Debug, Default)]
pub struct StudySession {
    subject: Option<&'static SubjectOption>,
    topic: String,
    state: LoadingState,
    result: Option<StudyContent>,
    error: Option<&'static str>,
    settled_at: Option<DateTime<Utc>>,
}

impl StudySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picking a subject starts a fresh form: topic, result and error are cleared.
    pub fn select_subject(&mut self, id_or_label: &str) -> Result<&'static SubjectOption> {
        let Some(subject) = subjects::lookup(id_or_label) else {
            bail!(
                "Unknown subject '{}'. Available subjects: {}.",
                id_or_label.trim(),
                subjects::known_ids()
            );
        };
        self.subject = Some(subject);
        self.topic.clear();
        self.result = None;
        self.error = None;
        self.state = LoadingState::Idle;
        Ok(subject)
    }

    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.topic = topic.into();
    }

    pub fn can_submit(&self) -> bool {
        self.subject.is_some()
            && !self.topic.trim().is_empty()
            && self.state != LoadingState::Loading
    }

    /// Runs one fetch for the current form. Returns `false` without touching
    /// any state when the form is incomplete or a request is in flight.
    pub async fn submit<G, I>(&mut self, fetcher: &ExplanationFetcher<G, I>) -> bool
    where
        G: ContentGenerator,
        I: ImageSearch,
    {
        let Some((subject, topic)) = self.begin() else {
            return false;
        };
        let outcome = fetcher.fetch_explanation(&subject, &topic).await;
        self.finish(outcome);
        true
    }

    fn begin(&mut self) -> Option<(String, String)> {
        if !self.can_submit() {
            debug!(state = self.state.as_str(), "submission ignored");
            return None;
        }
        let subject = self.subject?;
        self.state = LoadingState::Loading;
        self.error = None;
        self.result = None;
        Some((subject.label.to_string(), self.topic.trim().to_string()))
    }

    fn finish(&mut self, outcome: Result<StudyContent, FetchError>) {
        match outcome {
            Ok(content) => {
                self.result = Some(content);
                self.state = LoadingState::Success;
            }
            Err(_) => {
                self.result = None;
                self.error = Some(GENERIC_ERROR_MESSAGE);
                self.state = LoadingState::Error;
            }
        }
        self.settled_at = Some(Utc::now());
    }

    /// Back to an empty form.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn state(&self) -> LoadingState {
        self.state
    }

    pub fn subject(&self) -> Option<&'static SubjectOption> {
        self.subject
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn result(&self) -> Option<&StudyContent> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    pub fn settled_at(&self) -> Option<DateTime<Utc>> {
        self.settled_at
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use std::cell::RefCell;

    use super::{GENERIC_ERROR_MESSAGE, LoadingState, StudySession};
    use crate::config::test_config;
    use crate::fetcher::{ExplanationFetcher, FetchError};
    use crate::gateway::{ContentGenerator, GenerationFuture, ImageFuture, ImageSearch};
    use crate::model::GenerationRequest;

    const PAYLOAD: &str =
        r#"{"definition":"d","keyPoints":["a","b","c"],"example":{"title":"t","content":"c"}}"#;

    /// Replies with queued texts in order.
    struct ScriptedGenerator {
        replies: RefCell<Vec<&'static str>>,
        prompts: RefCell<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(mut replies: Vec<&'static str>) -> Self {
            replies.reverse();
            Self {
                replies: RefCell::new(replies),
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl ContentGenerator for ScriptedGenerator {
        fn generate<'a>(&'a self, request: &'a GenerationRequest) -> GenerationFuture<'a> {
            self.prompts.borrow_mut().push(request.prompt.clone());
            let reply = self.replies.borrow_mut().pop();
            Box::pin(async move {
                match reply {
                    Some(text) => Ok(Some(text.to_string())),
                    None => Err(anyhow!("no scripted reply left")),
                }
            })
        }
    }

    struct NoImages;

    impl ImageSearch for NoImages {
        fn find_image<'a>(&'a self, _subject: &'a str, _topic: &'a str) -> ImageFuture<'a> {
            Box::pin(async { None })
        }
    }

    fn fetcher(replies: Vec<&'static str>) -> ExplanationFetcher<ScriptedGenerator, NoImages> {
        ExplanationFetcher::with_parts(ScriptedGenerator::new(replies), NoImages, &test_config())
    }

    #[test]
    fn new_session_is_idle_and_cannot_submit() {
        let session = StudySession::new();
        assert_eq!(session.state(), LoadingState::Idle);
        assert!(!session.can_submit());
        assert!(session.settled_at().is_none());
    }

    #[test]
    fn select_subject_clears_topic_and_rejects_unknown_ids() {
        let mut session = StudySession::new();
        session.set_topic("Osmosis");
        let subject = session.select_subject("biology").expect("biology should exist");
        assert_eq!(subject.label, "Biology");
        assert_eq!(session.topic(), "");

        let err = session
            .select_subject("astrology")
            .expect_err("unknown subject should fail");
        assert!(err.to_string().contains("physics"), "unexpected error: {err}");
        assert_eq!(session.subject().map(|subject| subject.id), Some("biology"));
    }

    #[test]
    fn blank_topic_blocks_submission() {
        let mut session = StudySession::new();
        session.select_subject("physics").expect("physics should exist");
        session.set_topic("   ");
        assert!(!session.can_submit());
        session.set_topic("Inertia");
        assert!(session.can_submit());
    }

    #[test]
    fn loading_state_blocks_second_submission() {
        let mut session = StudySession::new();
        session.select_subject("physics").expect("physics should exist");
        session.set_topic("Inertia");

        assert!(session.begin().is_some());
        assert_eq!(session.state(), LoadingState::Loading);
        assert!(!session.can_submit());
        assert!(session.begin().is_none());
    }

    #[tokio::test]
    async fn successful_submission_stores_result_under_subject_label() {
        let fetcher = fetcher(vec![PAYLOAD]);
        let mut session = StudySession::new();
        session.select_subject("math").expect("math should exist");
        session.set_topic("  Derivatives ");

        assert!(session.submit(&fetcher).await);
        assert_eq!(session.state(), LoadingState::Success);
        assert_eq!(session.result().map(|content| content.key_points.len()), Some(3));
        assert!(session.error().is_none());
        assert!(session.settled_at().is_some());

        let prompts = fetcher_prompts(&fetcher);
        assert!(prompts[0].contains("\"Mathematics\""));
        assert!(prompts[0].contains("\"Derivatives\""));
    }

    fn fetcher_prompts(fetcher: &ExplanationFetcher<ScriptedGenerator, NoImages>) -> Vec<String> {
        fetcher.generator().prompts.borrow().clone()
    }

    #[tokio::test]
    async fn malformed_reply_shows_generic_error_and_allows_resubmission() {
        let fetcher = fetcher(vec!["{not json", PAYLOAD]);
        let mut session = StudySession::new();
        session.select_subject("chemistry").expect("chemistry should exist");
        session.set_topic("Catalysis");

        assert!(session.submit(&fetcher).await);
        assert_eq!(session.state(), LoadingState::Error);
        assert_eq!(session.error(), Some(GENERIC_ERROR_MESSAGE));
        assert!(session.result().is_none());
        assert!(session.can_submit());

        assert!(session.submit(&fetcher).await);
        assert_eq!(session.state(), LoadingState::Success);
        assert!(session.error().is_none());
        assert!(session.result().is_some());
    }

    #[test]
    fn finish_maps_every_failure_kind_to_the_generic_message() {
        for err in [
            FetchError::NoResponse,
            FetchError::Transport(anyhow!("connection refused")),
        ] {
            let mut session = StudySession::new();
            session.select_subject("physics").expect("physics should exist");
            session.set_topic("Inertia");
            session.begin();
            session.finish(Err(err));
            assert_eq!(session.error(), Some(GENERIC_ERROR_MESSAGE));
            assert_eq!(session.state(), LoadingState::Error);
        }
    }

    #[tokio::test]
    async fn incomplete_form_is_not_submitted() {
        let fetcher = fetcher(vec![PAYLOAD]);
        let mut session = StudySession::new();
        session.set_topic("Inertia");

        assert!(!session.submit(&fetcher).await);
        assert_eq!(session.state(), LoadingState::Idle);
        assert!(fetcher_prompts(&fetcher).is_empty());
    }

    #[tokio::test]
    async fn reset_returns_to_empty_form() {
        let fetcher = fetcher(vec![PAYLOAD]);
        let mut session = StudySession::new();
        session.select_subject("economics").expect("economics should exist");
        session.set_topic("Elasticity");
        session.submit(&fetcher).await;

        session.reset();
        assert_eq!(session.state(), LoadingState::Idle);
        assert!(session.subject().is_none());
        assert_eq!(session.topic(), "");
        assert!(session.result().is_none());
        assert!(session.error().is_none());
    }
}
