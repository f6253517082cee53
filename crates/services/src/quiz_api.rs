use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use quiz_core::model::{
    Attempt, AttemptId, Difficulty, Question, QuestionDraft, QuestionId, QuestionKind, Response,
};
use quiz_core::Clock;

use crate::config::QuizApiConfig;
use crate::error::{ProviderError, SinkError};
use crate::provider::QuizProvider;
use crate::sink::{SubmissionReceipt, SubmissionSink};

/// Client for the portal's quiz session API.
///
/// Serves as both the quiz provider and the submission sink.
#[derive(Clone)]
pub struct QuizApiClient {
    client: Client,
    config: QuizApiConfig,
    clock: Clock,
}

impl QuizApiClient {
    /// # Errors
    ///
    /// Returns `ProviderError::Http` if the HTTP client cannot be built.
    pub fn new(config: QuizApiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            clock: Clock::system(),
        })
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn config(&self) -> &QuizApiConfig {
        &self.config
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Open a new attempt of `quiz_id` for `student_id`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` when the request fails, the portal rejects it,
    /// or the returned questions do not validate.
    pub async fn start_attempt(
        &self,
        quiz_id: &str,
        student_id: &str,
    ) -> Result<Attempt, ProviderError> {
        let url = self.config.endpoint("/quiz/session/start");
        let request = self.client.post(url).json(&StartRequest {
            quiz_id,
            student_id,
        });
        let response = self.authorize(request).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::HttpStatus(response.status()));
        }

        let envelope: Envelope<StartPayload> = response.json().await?;
        let payload = envelope.into_data().map_err(ProviderError::Rejected)?;
        let attempt = payload.into_attempt(self.config.default_time_limit_secs)?;
        debug!(attempt_id = %attempt.id(), quiz_id, "quiz attempt started");
        Ok(attempt)
    }
}

#[async_trait]
impl QuizProvider for QuizApiClient {
    async fn load_attempt(&self, attempt_id: &AttemptId) -> Result<Attempt, ProviderError> {
        let url = self
            .config
            .endpoint(&format!("/quiz/session/current/{attempt_id}"));
        let response = self.authorize(self.client.get(url)).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => return Err(ProviderError::NotFound(attempt_id.clone())),
            status if !status.is_success() => return Err(ProviderError::HttpStatus(status)),
            _ => {}
        }

        let envelope: Envelope<SessionPayload> = response.json().await?;
        let payload = envelope.into_data().map_err(ProviderError::Rejected)?;
        payload.into_attempt(
            attempt_id,
            self.clock.now(),
            self.config.default_time_limit_secs,
        )
    }
}

#[async_trait]
impl SubmissionSink for QuizApiClient {
    async fn submit(
        &self,
        attempt_id: &AttemptId,
        responses: &[Response],
    ) -> Result<SubmissionReceipt, SinkError> {
        let url = self.config.endpoint("/quiz/session/submit");
        let request = self.client.post(url).json(&SubmitRequest {
            attempt_id,
            responses,
        });
        let response = self.authorize(request).send().await?;
        if !response.status().is_success() {
            return Err(SinkError::HttpStatus(response.status()));
        }

        let envelope: Envelope<SubmitPayload> = response.json().await?;
        let payload = envelope.into_data().map_err(SinkError::Rejected)?;
        Ok(SubmissionReceipt {
            score: payload.score.and_then(Score::value),
        })
    }
}

//
// ─── WIRE TYPES ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
struct StartRequest<'a> {
    quiz_id: &'a str,
    student_id: &'a str,
}

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    attempt_id: &'a AttemptId,
    responses: &'a [Response],
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: Option<bool>,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

impl<T> Envelope<T> {
    /// The payload, or the portal's message when it reported failure.
    fn into_data(self) -> Result<T, String> {
        if self.success == Some(false) {
            return Err(self
                .message
                .unwrap_or_else(|| "request was not successful".to_string()));
        }
        self.data
            .ok_or_else(|| "response carried no data".to_string())
    }
}

#[derive(Debug, Deserialize)]
struct QuestionPayload {
    question_id: String,
    text: String,
    options: Vec<String>,
    correct_answer: String,
    points: u32,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    misconception: Option<String>,
    #[serde(default)]
    difficulty: Option<Difficulty>,
    #[serde(default, rename = "type")]
    kind: Option<QuestionKind>,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    subtopic: Option<String>,
}

impl QuestionPayload {
    fn into_draft(self) -> QuestionDraft {
        QuestionDraft {
            id: QuestionId::new(self.question_id),
            text: self.text,
            options: self.options,
            correct_answer: self.correct_answer,
            points: self.points,
            explanation: self.explanation.filter(|text| !text.trim().is_empty()),
            misconception: self.misconception,
            difficulty: self.difficulty.unwrap_or_default(),
            kind: self.kind.unwrap_or_default(),
            topic: self.topic.unwrap_or_default(),
            subtopic: self.subtopic,
        }
    }
}

fn validate_questions(payloads: Vec<QuestionPayload>) -> Result<Vec<Question>, ProviderError> {
    payloads
        .into_iter()
        .map(|payload| {
            payload
                .into_draft()
                .validate()
                .map_err(|err| ProviderError::InvalidPayload(err.into()))
        })
        .collect()
}

fn ensure_open(status: Option<&str>) -> Result<(), ProviderError> {
    match status {
        None | Some("active" | "in_progress") => Ok(()),
        Some(other) => Err(ProviderError::NotActive {
            status: other.to_string(),
        }),
    }
}

/// `GET /quiz/session/current/{id}` payload.
#[derive(Debug, Deserialize)]
struct SessionPayload {
    #[serde(default)]
    attempt_id: Option<String>,
    questions: Vec<QuestionPayload>,
    #[serde(default)]
    end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    remaining_time: Option<u32>,
    #[serde(default)]
    status: Option<String>,
}

impl SessionPayload {
    fn into_attempt(
        self,
        requested: &AttemptId,
        now: DateTime<Utc>,
        default_time_limit_secs: u32,
    ) -> Result<Attempt, ProviderError> {
        ensure_open(self.status.as_deref())?;

        let time_limit_secs = match (self.end_time, self.remaining_time) {
            (Some(end), _) => {
                let left = (end - now).num_seconds();
                if left <= 0 {
                    return Err(ProviderError::NotActive {
                        status: "expired".to_string(),
                    });
                }
                u32::try_from(left).unwrap_or(u32::MAX)
            }
            (None, Some(remaining)) => remaining,
            (None, None) => default_time_limit_secs,
        };

        let id = self.attempt_id.map_or_else(|| requested.clone(), AttemptId::new);
        if &id != requested {
            warn!(requested = %requested, returned = %id, "portal returned a different attempt id");
        }
        let questions = validate_questions(self.questions)?;
        Attempt::new(id, questions, time_limit_secs)
            .map_err(|err| ProviderError::InvalidPayload(err.into()))
    }
}

/// `POST /quiz/session/start` payload.
#[derive(Debug, Deserialize)]
struct StartPayload {
    #[serde(rename = "quizSession")]
    quiz_session: StartedSession,
    questions: Vec<QuestionPayload>,
}

#[derive(Debug, Deserialize)]
struct StartedSession {
    attempt_id: String,
    #[serde(default)]
    remaining_time: Option<u32>,
    #[serde(default)]
    status: Option<String>,
}

impl StartPayload {
    fn into_attempt(self, default_time_limit_secs: u32) -> Result<Attempt, ProviderError> {
        ensure_open(self.quiz_session.status.as_deref())?;
        let time_limit_secs = self
            .quiz_session
            .remaining_time
            .filter(|secs| *secs > 0)
            .unwrap_or(default_time_limit_secs);
        let questions = validate_questions(self.questions)?;
        Attempt::new(
            AttemptId::new(self.quiz_session.attempt_id),
            questions,
            time_limit_secs,
        )
        .map_err(|err| ProviderError::InvalidPayload(err.into()))
    }
}

#[derive(Debug, Deserialize)]
struct SubmitPayload {
    #[serde(default)]
    score: Option<Score>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Score {
    Number(f64),
    Text(String),
}

impl Score {
    fn value(self) -> Option<f64> {
        match self {
            Score::Number(value) => Some(value),
            Score::Text(raw) => match raw.trim().parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(score = %raw, "ignoring non-numeric score");
                    None
                }
            },
        }
    }
}
