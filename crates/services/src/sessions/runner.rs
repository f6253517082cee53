//! Actor that owns one [`QuizSession`] on a tokio task.
//!
//! Ticks, user commands and the sink's completion are serialized through the
//! task's select loop. The interval is only polled while the clock is running
//! and goes away with the task once the session terminates.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::error::SessionError;
use crate::sink::SubmissionSink;
use super::events::SessionEvent;
use super::service::{AnswerStep, QuizSession, TickOutcome};
use super::snapshot::SessionSnapshot;
use super::state::{SessionState, SubmissionRequest};

const COMMAND_BUFFER: usize = 16;

type Reply = oneshot::Sender<Result<(), SessionError>>;

enum Command {
    Select { option: String, reply: Reply },
    Submit { reply: Reply },
    Retry { reply: Reply },
    Abandon { reply: Reply },
    DismissError,
}

impl Command {
    fn reject(self, err: SessionError) {
        let reply = match self {
            Command::Select { reply, .. }
            | Command::Submit { reply }
            | Command::Retry { reply }
            | Command::Abandon { reply } => reply,
            Command::DismissError => return,
        };
        let _ = reply.send(Err(err));
    }
}

/// A session running on its own task.
pub struct RunningSession {
    pub handle: SessionHandle,
    /// Transition events in emission order.
    pub events: mpsc::UnboundedReceiver<SessionEvent>,
    /// Resolves to the terminated session.
    pub task: JoinHandle<QuizSession>,
}

/// Cloneable front end to a running session.
///
/// Once every handle is dropped the runner abandons the session.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    /// # Errors
    ///
    /// Returns the engine's rejection, or `SessionError::RunnerStopped`.
    pub async fn select_answer(&self, option: impl Into<String>) -> Result<(), SessionError> {
        let option = option.into();
        self.request(|reply| Command::Select { option, reply }).await
    }

    /// Submit the pending answer. Resolves after the sink has answered when
    /// this was the final question; a sink failure is reported through the
    /// snapshot's `last_error`, not as `Err`.
    ///
    /// # Errors
    ///
    /// Returns the engine's rejection, or `SessionError::RunnerStopped`.
    pub async fn submit_answer(&self) -> Result<(), SessionError> {
        self.request(|reply| Command::Submit { reply }).await
    }

    /// # Errors
    ///
    /// Returns the engine's rejection, or `SessionError::RunnerStopped`.
    pub async fn retry_submission(&self) -> Result<(), SessionError> {
        self.request(|reply| Command::Retry { reply }).await
    }

    /// # Errors
    ///
    /// Returns the engine's rejection, or `SessionError::RunnerStopped`.
    pub async fn abandon(&self) -> Result<(), SessionError> {
        self.request(|reply| Command::Abandon { reply }).await
    }

    /// # Errors
    ///
    /// Returns `SessionError::RunnerStopped` if the task has exited.
    pub async fn dismiss_error(&self) -> Result<(), SessionError> {
        self.commands
            .send(Command::DismissError)
            .await
            .map_err(|_| SessionError::RunnerStopped)
    }

    /// The most recently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver notified on every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    async fn request(&self, build: impl FnOnce(Reply) -> Command) -> Result<(), SessionError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| SessionError::RunnerStopped)?;
        response.await.map_err(|_| SessionError::RunnerStopped)?
    }
}

/// Spawn the runner task. Must be called from within a tokio runtime.
pub(crate) fn spawn(
    session: QuizSession,
    sink: Arc<dyn SubmissionSink>,
    tick_period: Duration,
) -> Result<RunningSession, SessionError> {
    match session.state() {
        SessionState::Active => {}
        SessionState::Loading => return Err(SessionError::NotInitialized),
        SessionState::Submitting { .. } => return Err(SessionError::SubmissionInProgress),
        state @ SessionState::Terminated(_) => {
            return Err(SessionError::NotActive {
                state: state.kind(),
            });
        }
    }

    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let mut ticker = time::interval_at(Instant::now() + tick_period, tick_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let runner = Runner {
        session,
        sink,
        ticker,
        commands: command_rx,
        snapshots: snapshot_tx,
        events: event_tx,
    };
    let task = tokio::spawn(runner.run());

    Ok(RunningSession {
        handle: SessionHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        },
        events: event_rx,
        task,
    })
}

struct Runner {
    session: QuizSession,
    sink: Arc<dyn SubmissionSink>,
    ticker: Interval,
    commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<SessionSnapshot>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl Runner {
    async fn run(mut self) -> QuizSession {
        self.publish();
        while !self.session.is_terminated() {
            let clock_running = self.session.is_clock_running();
            tokio::select! {
                _ = self.ticker.tick(), if clock_running => self.on_tick().await,
                command = self.commands.recv() => match command {
                    Some(command) => self.on_command(command).await,
                    None => self.on_detached(),
                },
            }
            self.publish();
        }
        info!(attempt_id = %self.session.attempt_id(), "session runner finished");
        self.session
    }

    async fn on_tick(&mut self) {
        match self.session.tick() {
            Ok(TickOutcome::Expired(request)) => self.deliver(request).await,
            Ok(_) => {}
            Err(err) => self.fail(&err),
        }
    }

    /// Replies go out after the snapshot reflecting the command is published.
    async fn on_command(&mut self, command: Command) {
        let (reply, result) = match command {
            Command::Select { option, reply } => {
                let result = self.session.select_answer(&option);
                (reply, result)
            }
            Command::Submit { reply } => (reply, self.submit().await),
            Command::Retry { reply } => (reply, self.retry().await),
            Command::Abandon { reply } => (reply, self.session.abandon()),
            Command::DismissError => {
                self.session.dismiss_error();
                return;
            }
        };
        if let Err(err) = &result {
            if err.is_fatal() {
                self.fail(err);
            }
        }
        self.publish();
        let _ = reply.send(result);
    }

    async fn submit(&mut self) -> Result<(), SessionError> {
        match self.session.submit_answer()? {
            AnswerStep::Advanced { .. } => {}
            AnswerStep::Submit(request) => self.deliver(request).await,
        }
        Ok(())
    }

    async fn retry(&mut self) -> Result<(), SessionError> {
        let request = self.session.retry_submission()?;
        self.deliver(request).await;
        Ok(())
    }

    /// Every handle is gone: nobody can answer or retry any more.
    fn on_detached(&mut self) {
        debug!(attempt_id = %self.session.attempt_id(), "all session handles dropped");
        if let Err(err) = self.session.abandon() {
            error!(
                attempt_id = %self.session.attempt_id(),
                error = %err,
                "could not abandon detached session"
            );
        }
    }

    fn fail(&mut self, err: &SessionError) {
        error!(attempt_id = %self.session.attempt_id(), error = %err, "session invariant violated");
        let _ = self.session.abandon();
    }

    /// Await the sink while turning away any command that arrives meanwhile.
    async fn deliver(&mut self, request: SubmissionRequest) {
        self.publish();

        let sink = Arc::clone(&self.sink);
        let submit = sink.submit(&request.attempt_id, &request.responses);
        tokio::pin!(submit);

        let result = loop {
            tokio::select! {
                result = &mut submit => break result,
                Some(command) = self.commands.recv() => {
                    debug!(attempt_id = %request.attempt_id, "command rejected during submission");
                    command.reject(SessionError::SubmissionInProgress);
                }
            }
        };

        if let Err(err) = self.session.complete_submission(result) {
            error!(
                attempt_id = %request.attempt_id,
                error = %err,
                "submission result had no submission to complete"
            );
        }
        self.ticker.reset();
    }

    fn publish(&mut self) {
        for event in self.session.drain_events() {
            let _ = self.events.send(event);
        }
        self.snapshots.send_replace(self.session.snapshot());
    }
}
