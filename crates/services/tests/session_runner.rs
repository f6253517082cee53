use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;

use quiz_core::model::{Attempt, AttemptId, QuestionDraft, Response};
use services::{
    Clock, InMemoryQuizProvider, InMemorySubmissionSink, QuizSession, QuizSessionLoop,
    RunningSession, SessionError, SessionEvent, SessionState, SinkError, SubmissionReceipt,
    SubmissionSink, SubmitTrigger, Termination,
};

fn attempt(time_limit_secs: u32) -> Attempt {
    let questions = ["A", "B", "C"]
        .into_iter()
        .enumerate()
        .map(|(i, correct)| {
            QuestionDraft::multiple_choice(
                format!("q{}", i + 1),
                format!("Question {}", i + 1),
                ["A) first", "B) second", "C) third"],
                correct,
                1,
            )
            .validate()
            .unwrap()
        })
        .collect();
    Attempt::new(AttemptId::new("att-run"), questions, time_limit_secs).unwrap()
}

fn quiz(sink: Arc<dyn SubmissionSink>, time_limit_secs: u32) -> QuizSessionLoop {
    let provider = InMemoryQuizProvider::new();
    provider.insert(attempt(time_limit_secs)).unwrap();
    QuizSessionLoop::new(Clock::system(), Arc::new(provider), sink)
}

async fn launch(quiz: &QuizSessionLoop) -> RunningSession {
    quiz.launch(&AttemptId::new("att-run")).await.unwrap()
}

fn drain(events: &mut tokio::sync::mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    seen
}

#[tokio::test(start_paused = true)]
async fn clock_runs_out_and_submits_exactly_once() {
    let sink = InMemorySubmissionSink::new();
    let quiz = quiz(Arc::new(sink.clone()), 3);
    let RunningSession {
        handle,
        mut events,
        task,
    } = launch(&quiz).await;

    handle.select_answer("B").await.unwrap();
    let mut snapshots = handle.subscribe();
    snapshots
        .wait_for(|snapshot| snapshot.is_terminated())
        .await
        .unwrap();

    let session = task.await.unwrap();
    assert_eq!(
        session.state(),
        &SessionState::Terminated(Termination::Submitted {
            trigger: SubmitTrigger::TimeExpired,
            score: Some(0.0),
        })
    );
    assert_eq!(session.responses().len(), 1);
    assert_eq!(sink.submission_count().unwrap(), 1);

    let terminated = drain(&mut events)
        .into_iter()
        .filter(|event| matches!(event, SessionEvent::Terminated(_)))
        .count();
    assert_eq!(terminated, 1);
    assert!(matches!(
        handle.select_answer("A").await,
        Err(SessionError::RunnerStopped)
    ));
}

#[tokio::test(start_paused = true)]
async fn low_time_warning_fires_once() {
    let quiz = quiz(Arc::new(InMemorySubmissionSink::new()), 62);
    let RunningSession {
        handle,
        mut events,
        task,
    } = launch(&quiz).await;

    let mut snapshots = handle.subscribe();
    snapshots
        .wait_for(|snapshot| snapshot.time_remaining_secs <= 57)
        .await
        .unwrap();
    assert!(handle.snapshot().time_running_low);

    handle.abandon().await.unwrap();
    task.await.unwrap();

    let warnings: Vec<_> = drain(&mut events)
        .into_iter()
        .filter(|event| matches!(event, SessionEvent::TimeRunningLow { .. }))
        .collect();
    assert_eq!(
        warnings,
        vec![SessionEvent::TimeRunningLow { remaining_secs: 60 }]
    );
}

struct GatedSink {
    gate: Arc<Notify>,
}

#[async_trait]
impl SubmissionSink for GatedSink {
    async fn submit(
        &self,
        _attempt_id: &AttemptId,
        responses: &[Response],
    ) -> Result<SubmissionReceipt, SinkError> {
        self.gate.notified().await;
        Ok(SubmissionReceipt::scored(responses.len() as f64))
    }
}

#[tokio::test(start_paused = true)]
async fn commands_are_refused_while_submitting() {
    let gate = Arc::new(Notify::new());
    let quiz = quiz(Arc::new(GatedSink { gate: Arc::clone(&gate) }), 600);
    let RunningSession { handle, task, .. } = launch(&quiz).await;

    for answer in ["A", "B"] {
        handle.select_answer(answer).await.unwrap();
        handle.submit_answer().await.unwrap();
    }
    handle.select_answer("C").await.unwrap();

    let submitter = handle.clone();
    let final_submit = tokio::spawn(async move { submitter.submit_answer().await });

    let mut snapshots = handle.subscribe();
    snapshots
        .wait_for(|snapshot| snapshot.is_submitting())
        .await
        .unwrap();

    assert!(matches!(
        handle.select_answer("A").await,
        Err(SessionError::SubmissionInProgress)
    ));
    assert!(matches!(
        handle.abandon().await,
        Err(SessionError::SubmissionInProgress)
    ));

    gate.notify_one();
    final_submit.await.unwrap().unwrap();

    let session = task.await.unwrap();
    assert_eq!(
        session.state(),
        &SessionState::Terminated(Termination::Submitted {
            trigger: SubmitTrigger::Completed,
            score: Some(3.0),
        })
    );
}

#[tokio::test(start_paused = true)]
async fn sink_failure_surfaces_in_snapshot() {
    let sink = InMemorySubmissionSink::new();
    sink.fail_next("502 bad gateway").unwrap();
    let quiz = quiz(Arc::new(sink.clone()), 600);
    let RunningSession { handle, task, .. } = launch(&quiz).await;

    for answer in ["A", "B", "C"] {
        handle.select_answer(answer).await.unwrap();
        handle.submit_answer().await.unwrap();
    }

    let snapshot = handle.snapshot();
    assert!(snapshot.state.is_active());
    assert_eq!(snapshot.current_index, 2);
    assert_eq!(
        snapshot.last_error.as_deref(),
        Some("submission rejected: 502 bad gateway")
    );

    handle.dismiss_error().await.unwrap();
    handle.retry_submission().await.unwrap();

    let session = task.await.unwrap();
    assert!(session.is_terminated());
    assert_eq!(sink.submission_count().unwrap(), 2);
}

#[tokio::test(start_paused = true)]
async fn dropping_every_handle_abandons_the_session() {
    let sink = InMemorySubmissionSink::new();
    let quiz = quiz(Arc::new(sink.clone()), 600);
    let RunningSession { handle, task, .. } = launch(&quiz).await;

    handle.select_answer("A").await.unwrap();
    handle.submit_answer().await.unwrap();
    drop(handle);

    let session = task.await.unwrap();
    assert_eq!(
        session.state(),
        &SessionState::Terminated(Termination::Abandoned)
    );
    assert_eq!(session.responses().len(), 1);
    assert_eq!(sink.submission_count().unwrap(), 0);
}

#[tokio::test]
async fn only_active_sessions_can_be_spawned() {
    let quiz = quiz(Arc::new(InMemorySubmissionSink::new()), 60);
    let loading = QuizSession::new(AttemptId::new("att-run"), Clock::system());
    assert!(matches!(
        quiz.spawn(loading).err(),
        Some(SessionError::NotInitialized)
    ));
}
