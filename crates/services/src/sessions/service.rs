use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{debug, info, warn};

use quiz_core::model::{Attempt, AttemptId, Question, Response, ResponseId, ResponseStats};
use quiz_core::time::whole_seconds_between;
use quiz_core::Clock;

use crate::error::SessionError;
use crate::sink::SubmissionReceipt;
use super::events::SessionEvent;
use super::snapshot::SessionSnapshot;
use super::state::{FailedSubmission, SessionState, SubmissionRequest, SubmitTrigger, Termination};

/// Remaining time at which the one-time low-time warning fires.
pub const DEFAULT_LOW_TIME_THRESHOLD_SECS: u32 = 60;

//
// ─── STEP RESULTS ─────────────────────────────────────────────────────────────
//

/// Result of an accepted `submit_answer` call.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerStep {
    /// The answer was recorded and the cursor moved to `next_index`.
    Advanced {
        response: Response,
        next_index: usize,
    },
    /// The session entered `Submitting`; hand the request to the sink and feed
    /// the result to `complete_submission`.
    Submit(SubmissionRequest),
}

/// Result of a `tick` call.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The session is not running its clock; nothing changed.
    Ignored,
    Ticked { remaining_secs: u32 },
    /// The clock reached zero and the session entered `Submitting`.
    Expired(SubmissionRequest),
}

//
// ─── SESSION ──────────────────────────────────────────────────────────────────
//

/// State machine for one timed quiz attempt.
///
/// Steps a student through the attempt's questions in order, grading each
/// submitted answer, and funnels completion and time expiry into a single
/// hand-off to the submission sink. The engine never performs I/O: when a
/// step yields a `SubmissionRequest`, the caller delivers it and reports the
/// outcome through [`QuizSession::complete_submission`].
pub struct QuizSession {
    attempt_id: AttemptId,
    clock: Clock,
    low_time_threshold_secs: u32,
    attempt: Option<Attempt>,
    state: SessionState,
    current: usize,
    pending_answer: Option<String>,
    started_at: Option<DateTime<Utc>>,
    question_started_at: DateTime<Utc>,
    question_elapsed_secs: u32,
    remaining_secs: u32,
    low_time_signalled: bool,
    responses: Vec<Response>,
    failed_submission: Option<FailedSubmission>,
    last_error: Option<String>,
    events: Vec<SessionEvent>,
}

impl QuizSession {
    /// Create a session in `Loading` for the given attempt.
    #[must_use]
    pub fn new(attempt_id: AttemptId, clock: Clock) -> Self {
        let now = clock.now();
        Self {
            attempt_id,
            clock,
            low_time_threshold_secs: DEFAULT_LOW_TIME_THRESHOLD_SECS,
            attempt: None,
            state: SessionState::Loading,
            current: 0,
            pending_answer: None,
            started_at: None,
            question_started_at: now,
            question_elapsed_secs: 0,
            remaining_secs: 0,
            low_time_signalled: false,
            responses: Vec::new(),
            failed_submission: None,
            last_error: None,
            events: Vec::new(),
        }
    }

    /// Create an `Active` session from an already validated attempt.
    #[must_use]
    pub fn start(attempt: Attempt, clock: Clock) -> Self {
        let mut session = Self::new(attempt.id().clone(), clock);
        session.begin(attempt);
        session
    }

    #[must_use]
    pub fn with_low_time_threshold(mut self, secs: u32) -> Self {
        self.low_time_threshold_secs = secs;
        self
    }

    /// Load the question set and start the clock.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyStarted` outside `Loading`, and
    /// `SessionError::Attempt` for an empty question list or a zero limit.
    /// The session is unchanged on error.
    pub fn initialize(
        &mut self,
        questions: Vec<Question>,
        time_limit_secs: u32,
    ) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Loading) {
            return Err(SessionError::AlreadyStarted);
        }
        let attempt = Attempt::new(self.attempt_id.clone(), questions, time_limit_secs)?;
        self.begin(attempt);
        Ok(())
    }

    fn begin(&mut self, attempt: Attempt) {
        let now = self.clock.now();
        self.current = 0;
        self.pending_answer = None;
        self.responses.clear();
        self.started_at = Some(now);
        self.question_started_at = now;
        self.question_elapsed_secs = 0;
        self.remaining_secs = attempt.time_limit_secs();
        self.low_time_signalled = false;
        self.failed_submission = None;
        self.last_error = None;

        info!(
            attempt_id = %self.attempt_id,
            questions = attempt.len(),
            time_limit_secs = attempt.time_limit_secs(),
            "quiz session started"
        );
        self.events.push(SessionEvent::Started {
            total_questions: attempt.len(),
            time_limit_secs: attempt.time_limit_secs(),
        });
        self.attempt = Some(attempt);
        self.state = SessionState::Active;
    }

    //
    // ─── ACCESSORS ────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn attempt_id(&self) -> &AttemptId {
        &self.attempt_id
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.state.is_terminated()
    }

    /// Active with time left on the clock; ticks only change state while this holds.
    #[must_use]
    pub fn is_clock_running(&self) -> bool {
        self.state.is_active() && self.remaining_secs > 0
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.attempt.as_ref().map_or(0, Attempt::len)
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn time_remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub fn question_elapsed_secs(&self) -> u32 {
        self.question_elapsed_secs
    }

    #[must_use]
    pub fn pending_answer(&self) -> Option<&str> {
        self.pending_answer.as_deref()
    }

    #[must_use]
    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[must_use]
    pub fn failed_submission(&self) -> Option<&FailedSubmission> {
        self.failed_submission.as_ref()
    }

    #[must_use]
    pub fn time_running_low(&self) -> bool {
        self.low_time_signalled
    }

    /// The question under the cursor.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInitialized` before `initialize`, and the
    /// fatal `SessionError::MissingQuestion` if the cursor is out of range.
    pub fn current_question(&self) -> Result<&Question, SessionError> {
        self.attempt()?
            .question(self.current)
            .ok_or(SessionError::MissingQuestion {
                index: self.current,
            })
    }

    fn attempt(&self) -> Result<&Attempt, SessionError> {
        self.attempt.as_ref().ok_or(SessionError::NotInitialized)
    }

    #[must_use]
    pub fn stats(&self) -> ResponseStats {
        match &self.attempt {
            Some(attempt) => ResponseStats::from_responses(attempt.questions(), &self.responses),
            None => ResponseStats::default(),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            attempt_id: self.attempt_id.clone(),
            state: self.state.clone(),
            current_index: self.current,
            total_questions: self.total_questions(),
            question: self.current_question().ok().cloned(),
            time_remaining_secs: self.remaining_secs,
            question_elapsed_secs: self.question_elapsed_secs,
            pending_answer: self.pending_answer.clone(),
            last_error: self.last_error.clone(),
            failed_submission: self.failed_submission.clone(),
            time_running_low: self.low_time_signalled,
            answered: self.responses.len(),
            stats: self.stats(),
        }
    }

    /// Take the events emitted since the previous call.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Clear the surfaced submission error without touching retry state.
    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    //
    // ─── OPERATIONS ───────────────────────────────────────────────────────────
    //

    /// Advance the session clock by one second.
    ///
    /// Outside `Active` (or once the clock already reads zero) this is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the fatal `SessionError::MissingQuestion` if expiry finds the
    /// cursor out of range.
    pub fn tick(&mut self) -> Result<TickOutcome, SessionError> {
        if !self.is_clock_running() {
            return Ok(TickOutcome::Ignored);
        }

        let previous = self.remaining_secs;
        self.remaining_secs -= 1;
        self.question_elapsed_secs = self.clock.elapsed_secs(self.question_started_at);

        let threshold = self.low_time_threshold_secs;
        if !self.low_time_signalled && previous > threshold && self.remaining_secs <= threshold {
            self.low_time_signalled = true;
            warn!(
                attempt_id = %self.attempt_id,
                remaining_secs = self.remaining_secs,
                "quiz time running low"
            );
            self.events.push(SessionEvent::TimeRunningLow {
                remaining_secs: self.remaining_secs,
            });
        }

        if self.remaining_secs == 0 {
            return self.expire().map(TickOutcome::Expired);
        }

        debug!(
            attempt_id = %self.attempt_id,
            remaining_secs = self.remaining_secs,
            "quiz tick"
        );
        Ok(TickOutcome::Ticked {
            remaining_secs: self.remaining_secs,
        })
    }

    /// Mark `option` as the pending answer for the current question.
    ///
    /// # Errors
    ///
    /// Rejects the call outside `Active`, after time has expired, for an
    /// option the current question does not offer, and for a question that
    /// already has a response.
    pub fn select_answer(&mut self, option: &str) -> Result<(), SessionError> {
        self.ensure_accepting_answers()?;

        let question = self.current_question()?;
        if !question.has_option(option) {
            return Err(SessionError::InvalidOption {
                option: option.to_string(),
            });
        }
        if self.is_answered(question) {
            return Err(SessionError::AlreadyAnswered {
                question_id: question.id().clone(),
            });
        }

        self.pending_answer = Some(option.to_string());
        self.last_error = None;
        self.events.push(SessionEvent::AnswerSelected {
            index: self.current,
            answer: option.to_string(),
        });
        Ok(())
    }

    /// Grade the pending answer and move on, or start the final submission.
    ///
    /// After a failed completion submission this resubmits the existing
    /// response list without grading anything again.
    ///
    /// # Errors
    ///
    /// Rejects the call outside `Active`, after time has expired, and when no
    /// answer is pending.
    pub fn submit_answer(&mut self) -> Result<AnswerStep, SessionError> {
        self.ensure_accepting_answers()?;

        if self.failed_submission.is_some() {
            return self.retry_submission().map(AnswerStep::Submit);
        }

        let answer = self
            .pending_answer
            .clone()
            .ok_or(SessionError::NoAnswerSelected)?;
        let now = self.clock.now();
        let elapsed = whole_seconds_between(self.question_started_at, now);
        let response = self.grade_current(answer, elapsed)?;
        self.responses.push(response.clone());

        if self.current >= self.attempt()?.last_index() {
            info!(
                attempt_id = %self.attempt_id,
                responses = self.responses.len(),
                "final question answered"
            );
            return Ok(AnswerStep::Submit(
                self.begin_submission(SubmitTrigger::Completed),
            ));
        }

        self.current += 1;
        self.pending_answer = None;
        self.question_started_at = now;
        self.question_elapsed_secs = 0;
        info!(
            attempt_id = %self.attempt_id,
            index = self.current,
            "advanced to next question"
        );
        self.events.push(SessionEvent::QuestionAdvanced {
            index: self.current,
        });

        Ok(AnswerStep::Advanced {
            response,
            next_index: self.current,
        })
    }

    /// Resubmit the existing response list after a failed submission.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NothingToRetry` when no submission has failed,
    /// or the usual rejection outside `Active`.
    pub fn retry_submission(&mut self) -> Result<SubmissionRequest, SessionError> {
        self.ensure_active()?;
        let trigger = self
            .failed_submission
            .as_ref()
            .map(|failed| failed.trigger)
            .ok_or(SessionError::NothingToRetry)?;
        Ok(self.begin_submission(trigger))
    }

    /// Record the sink's answer to the request handed out by the last step.
    ///
    /// Success terminates the session. Failure returns it to `Active` at the
    /// same cursor, with the error message surfaced and the submission kept
    /// for retry.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSubmitting` unless the session is `Submitting`.
    pub fn complete_submission<E: fmt::Display>(
        &mut self,
        result: Result<SubmissionReceipt, E>,
    ) -> Result<(), SessionError> {
        let SessionState::Submitting { trigger } = self.state else {
            return Err(SessionError::NotSubmitting);
        };

        match result {
            Ok(receipt) => {
                info!(
                    attempt_id = %self.attempt_id,
                    score = ?receipt.score,
                    ?trigger,
                    "quiz submitted"
                );
                self.terminate(Termination::Submitted {
                    trigger,
                    score: receipt.score,
                });
            }
            Err(err) => {
                let message = err.to_string();
                warn!(
                    attempt_id = %self.attempt_id,
                    ?trigger,
                    error = %message,
                    "quiz submission failed"
                );
                self.state = SessionState::Active;
                self.last_error = Some(message.clone());
                self.failed_submission = Some(FailedSubmission {
                    trigger,
                    message: message.clone(),
                });
                self.events
                    .push(SessionEvent::SubmissionFailed { trigger, message });
            }
        }
        Ok(())
    }

    /// End the attempt without submitting anything.
    ///
    /// # Errors
    ///
    /// Rejects the call outside `Active`.
    pub fn abandon(&mut self) -> Result<(), SessionError> {
        self.ensure_active()?;
        info!(
            attempt_id = %self.attempt_id,
            responses = self.responses.len(),
            "quiz abandoned"
        );
        self.terminate(Termination::Abandoned);
        Ok(())
    }

    //
    // ─── INTERNALS ────────────────────────────────────────────────────────────
    //

    fn ensure_active(&self) -> Result<(), SessionError> {
        match &self.state {
            SessionState::Active => Ok(()),
            SessionState::Loading => Err(SessionError::NotInitialized),
            SessionState::Submitting { .. } => Err(SessionError::SubmissionInProgress),
            state @ SessionState::Terminated(_) => Err(SessionError::NotActive {
                state: state.kind(),
            }),
        }
    }

    fn ensure_accepting_answers(&self) -> Result<(), SessionError> {
        self.ensure_active()?;
        if self.remaining_secs == 0 {
            return Err(SessionError::TimeExpired);
        }
        Ok(())
    }

    fn is_answered(&self, question: &Question) -> bool {
        self.responses
            .iter()
            .any(|response| response.question_id() == question.id())
    }

    fn grade_current(&self, answer: String, elapsed_secs: u32) -> Result<Response, SessionError> {
        let question = self.current_question()?;
        Ok(Response::grade(
            ResponseId::generate(),
            &self.attempt_id,
            question,
            answer,
            elapsed_secs,
        ))
    }

    /// Time-expired path: record the pending answer, if any, then submit.
    fn expire(&mut self) -> Result<SubmissionRequest, SessionError> {
        let now = self.clock.now();
        let question = self.current_question()?;
        let unanswered = !self.is_answered(question);

        if let (Some(answer), true) = (self.pending_answer.clone(), unanswered) {
            let elapsed = self.capped_elapsed(now)?;
            let response = self.grade_current(answer, elapsed)?;
            self.responses.push(response);
        }

        info!(
            attempt_id = %self.attempt_id,
            responses = self.responses.len(),
            "quiz time expired"
        );
        Ok(self.begin_submission(SubmitTrigger::TimeExpired))
    }

    /// Floored time on the current question, capped so that recorded times
    /// never add up to more than the attempt's budget.
    fn capped_elapsed(&self, now: DateTime<Utc>) -> Result<u32, SessionError> {
        let elapsed = whole_seconds_between(self.question_started_at, now);
        let recorded = self
            .responses
            .iter()
            .map(Response::time_taken_secs)
            .fold(0u32, u32::saturating_add);
        let budget = self.attempt()?.time_limit_secs().saturating_sub(recorded);
        Ok(elapsed.min(budget))
    }

    fn begin_submission(&mut self, trigger: SubmitTrigger) -> SubmissionRequest {
        self.state = SessionState::Submitting { trigger };
        self.failed_submission = None;
        self.last_error = None;
        self.events.push(SessionEvent::SubmissionStarted {
            trigger,
            responses: self.responses.len(),
        });
        SubmissionRequest {
            attempt_id: self.attempt_id.clone(),
            trigger,
            responses: self.responses.clone(),
        }
    }

    fn terminate(&mut self, termination: Termination) {
        self.state = SessionState::Terminated(termination.clone());
        self.events.push(SessionEvent::Terminated(termination));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionDraft;
    use quiz_core::time::manual_clock;

    fn question(id: &str, correct: &str, points: u32) -> Question {
        QuestionDraft::multiple_choice(
            id,
            format!("Prompt {id}"),
            ["A) one", "B) two", "C) three"],
            correct,
            points,
        )
        .validate()
        .unwrap()
    }

    fn three_questions() -> Vec<Question> {
        vec![question("q1", "A", 1), question("q2", "B", 2), question("q3", "C", 3)]
    }

    fn active_session(time_limit_secs: u32) -> (QuizSession, Clock) {
        let clock = manual_clock();
        let mut session = QuizSession::new(AttemptId::new("att-1"), clock.clone());
        session.initialize(three_questions(), time_limit_secs).unwrap();
        (session, clock)
    }

    #[test]
    fn initialize_enters_active_at_first_question() {
        let (session, _) = active_session(90);
        assert!(session.state().is_active());
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.time_remaining_secs(), 90);
        assert!(session.responses().is_empty());
    }

    #[test]
    fn initialize_rejects_empty_questions_without_state_change() {
        let mut session = QuizSession::new(AttemptId::new("att-1"), manual_clock());
        let err = session.initialize(Vec::new(), 60).unwrap_err();
        assert!(matches!(err, SessionError::Attempt(_)));
        assert_eq!(session.state(), &SessionState::Loading);
    }

    #[test]
    fn initialize_twice_is_rejected() {
        let (mut session, _) = active_session(90);
        let err = session.initialize(three_questions(), 30).unwrap_err();
        assert!(matches!(err, SessionError::AlreadyStarted));
        assert_eq!(session.time_remaining_secs(), 90);
    }

    #[test]
    fn operations_before_initialize_are_rejected() {
        let mut session = QuizSession::new(AttemptId::new("att-1"), manual_clock());
        assert!(matches!(session.select_answer("A"), Err(SessionError::NotInitialized)));
        assert!(matches!(session.submit_answer(), Err(SessionError::NotInitialized)));
        assert_eq!(session.tick().unwrap(), TickOutcome::Ignored);
    }

    #[test]
    fn select_rejects_unknown_option() {
        let (mut session, _) = active_session(90);
        let err = session.select_answer("Z").unwrap_err();
        assert!(matches!(err, SessionError::InvalidOption { .. }));
        assert_eq!(session.pending_answer(), None);
    }

    #[test]
    fn submit_without_selection_is_rejected() {
        let (mut session, _) = active_session(90);
        assert!(matches!(session.submit_answer(), Err(SessionError::NoAnswerSelected)));
        assert!(session.responses().is_empty());
    }

    #[test]
    fn submit_records_floored_time_and_advances() {
        let (mut session, clock) = active_session(90);
        session.select_answer("A").unwrap();
        clock.advance(chrono::Duration::milliseconds(7_800));

        let step = session.submit_answer().unwrap();

        let AnswerStep::Advanced { response, next_index } = step else {
            panic!("expected advance, got {step:?}");
        };
        assert_eq!(next_index, 1);
        assert_eq!(response.time_taken_secs(), 7);
        assert!(response.is_correct());
        assert_eq!(session.pending_answer(), None);
        assert_eq!(session.question_elapsed_secs(), 0);
        assert_eq!(session.time_remaining_secs(), 90);
    }

    #[test]
    fn last_answer_starts_completion_submission() {
        let (mut session, _) = active_session(90);
        for answer in ["A", "B"] {
            session.select_answer(answer).unwrap();
            session.submit_answer().unwrap();
        }
        session.select_answer("C").unwrap();

        let AnswerStep::Submit(request) = session.submit_answer().unwrap() else {
            panic!("expected submission");
        };
        assert_eq!(request.trigger, SubmitTrigger::Completed);
        assert_eq!(request.responses.len(), 3);
        assert_eq!(session.current_index(), 2);
        assert!(session.state().is_submitting());

        assert!(matches!(session.select_answer("A"), Err(SessionError::SubmissionInProgress)));
        assert!(matches!(session.submit_answer(), Err(SessionError::SubmissionInProgress)));
        assert_eq!(session.tick().unwrap(), TickOutcome::Ignored);
    }

    #[test]
    fn failed_submission_keeps_list_and_retries_without_duplicates() {
        let (mut session, _) = active_session(90);
        for answer in ["A", "B", "C"] {
            session.select_answer(answer).unwrap();
            let _ = session.submit_answer().unwrap();
        }
        let before = session.responses().to_vec();

        session
            .complete_submission::<&str>(Err("network down"))
            .unwrap();

        assert!(session.state().is_active());
        assert_eq!(session.current_index(), 2);
        assert_eq!(session.last_error(), Some("network down"));
        assert_eq!(session.pending_answer(), Some("C"));
        assert_eq!(session.responses(), before.as_slice());
        assert!(matches!(
            session.select_answer("A"),
            Err(SessionError::AlreadyAnswered { .. })
        ));

        let AnswerStep::Submit(request) = session.submit_answer().unwrap() else {
            panic!("expected resubmission");
        };
        assert_eq!(request.responses, before);
        assert_eq!(session.last_error(), None);

        session
            .complete_submission::<&str>(Ok(SubmissionReceipt { score: Some(6.0) }))
            .unwrap();
        assert_eq!(
            session.state(),
            &SessionState::Terminated(Termination::Submitted {
                trigger: SubmitTrigger::Completed,
                score: Some(6.0),
            })
        );
    }

    #[test]
    fn tick_warns_once_when_crossing_threshold() {
        let (mut session, _) = active_session(62);
        session.drain_events();

        session.tick().unwrap();
        session.tick().unwrap();
        session.tick().unwrap();

        let warnings = session
            .drain_events()
            .into_iter()
            .filter(|event| matches!(event, SessionEvent::TimeRunningLow { .. }))
            .count();
        assert_eq!(warnings, 1);
        assert!(session.time_running_low());
        assert_eq!(session.time_remaining_secs(), 59);
    }

    #[test]
    fn short_quiz_never_crosses_threshold() {
        let (mut session, _) = active_session(30);
        session.tick().unwrap();
        assert!(!session.time_running_low());
    }

    #[test]
    fn tick_at_one_expires_exactly_once() {
        let (mut session, clock) = active_session(1);
        session.select_answer("A").unwrap();
        clock.advance_secs(1);

        let TickOutcome::Expired(request) = session.tick().unwrap() else {
            panic!("expected expiry");
        };
        assert_eq!(request.trigger, SubmitTrigger::TimeExpired);
        assert_eq!(request.responses.len(), 1);
        assert_eq!(session.time_remaining_secs(), 0);
        assert_eq!(session.tick().unwrap(), TickOutcome::Ignored);

        session
            .complete_submission::<&str>(Ok(SubmissionReceipt::default()))
            .unwrap();
        assert_eq!(session.tick().unwrap(), TickOutcome::Ignored);
        let terminations = session
            .drain_events()
            .into_iter()
            .filter(|event| matches!(event, SessionEvent::Terminated(_)))
            .count();
        assert_eq!(terminations, 1);
    }

    #[test]
    fn expiry_caps_partial_time_at_budget() {
        let (mut session, clock) = active_session(2);
        session.select_answer("B").unwrap();
        // A stalled timer: the wall clock ran far past the budget.
        clock.advance_secs(40);
        session.tick().unwrap();

        let TickOutcome::Expired(request) = session.tick().unwrap() else {
            panic!("expected expiry");
        };
        assert_eq!(request.responses[0].time_taken_secs(), 2);
    }

    #[test]
    fn expiry_without_pending_answer_submits_existing_list() {
        let (mut session, _) = active_session(2);
        session.tick().unwrap();
        let TickOutcome::Expired(request) = session.tick().unwrap() else {
            panic!("expected expiry");
        };
        assert!(request.responses.is_empty());
    }

    #[test]
    fn failed_expiry_only_allows_retry() {
        let (mut session, _) = active_session(1);
        let _ = session.tick().unwrap();
        session
            .complete_submission::<&str>(Err("timeout"))
            .unwrap();

        assert!(session.state().is_active());
        assert!(!session.is_clock_running());
        assert!(matches!(session.select_answer("A"), Err(SessionError::TimeExpired)));
        assert!(matches!(session.submit_answer(), Err(SessionError::TimeExpired)));

        let request = session.retry_submission().unwrap();
        assert_eq!(request.trigger, SubmitTrigger::TimeExpired);
    }

    #[test]
    fn expiry_after_failed_completion_does_not_duplicate_last_response() {
        let (mut session, _) = active_session(3);
        for answer in ["A", "B", "C"] {
            session.select_answer(answer).unwrap();
            let _ = session.submit_answer().unwrap();
        }
        session.complete_submission::<&str>(Err("busy")).unwrap();

        session.tick().unwrap();
        session.tick().unwrap();
        let TickOutcome::Expired(request) = session.tick().unwrap() else {
            panic!("expected expiry");
        };
        assert_eq!(request.responses.len(), 3);
    }

    #[test]
    fn retry_without_failure_is_rejected() {
        let (mut session, _) = active_session(90);
        assert!(matches!(session.retry_submission(), Err(SessionError::NothingToRetry)));
    }

    #[test]
    fn abandon_terminates_and_keeps_responses() {
        let (mut session, _) = active_session(90);
        session.select_answer("A").unwrap();
        session.submit_answer().unwrap();

        session.abandon().unwrap();

        assert_eq!(
            session.state(),
            &SessionState::Terminated(Termination::Abandoned)
        );
        assert_eq!(session.responses().len(), 1);
        assert!(matches!(session.abandon(), Err(SessionError::NotActive { .. })));
        assert_eq!(session.tick().unwrap(), TickOutcome::Ignored);
    }

    #[test]
    fn select_clears_surfaced_error() {
        let (mut session, _) = active_session(90);
        session.last_error = Some("stale".into());
        session.select_answer("B").unwrap();
        assert_eq!(session.last_error(), None);
    }

    #[test]
    fn out_of_range_cursor_is_fatal() {
        let (mut session, _) = active_session(90);
        session.current = 10;
        let err = session.current_question().unwrap_err();
        assert!(err.is_fatal());
        assert!(session.select_answer("A").unwrap_err().is_fatal());
    }
}
