use std::future::Future;
use std::sync::Arc;

use dioxus::prelude::*;
use dioxus_router::Link;
use tracing::{debug, warn};

use quiz_core::model::AttemptId;
use services::{SessionError, SessionHandle, SessionSnapshot};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{HintPanel, QuestionCard, QuizResultPanel, ViewError, ViewState};
use crate::vm::{QuizResultVm, QuizSessionVm};

#[component]
pub fn QuizSessionView(attempt_id: String) -> Element {
    let ctx = use_context::<AppContext>();
    let mut state = use_signal(|| ViewState::<SessionSnapshot>::Loading);
    let mut handle = use_signal(|| None::<SessionHandle>);
    let action_error = use_signal(|| None::<String>);
    let mut warning_dismissed = use_signal(|| false);
    // Index of the question whose hint is open.
    let mut hint_for = use_signal(|| None::<usize>);

    let quiz_loop = ctx.quiz_loop();
    use_future(move || {
        let quiz_loop = Arc::clone(&quiz_loop);
        let attempt_id = AttemptId::new(attempt_id.clone());
        async move {
            // Only the handle is kept; the runner does not need its events read.
            let session = match quiz_loop.launch(&attempt_id).await {
                Ok(running) => running.handle,
                Err(err) => {
                    warn!(%attempt_id, error = %err, "could not start quiz session");
                    state.set(ViewState::Error(ViewError::from(&err)));
                    return;
                }
            };

            let mut snapshots = session.subscribe();
            handle.set(Some(session));
            loop {
                let snapshot = snapshots.borrow_and_update().clone();
                state.set(ViewState::Ready(snapshot));
                if snapshots.changed().await.is_err() {
                    break;
                }
            }
        }
    });

    let select = move |option: String| {
        dispatch(handle, action_error, move |session| async move {
            session.select_answer(option).await
        });
    };
    let submit = move || {
        dispatch(handle, action_error, |session| async move {
            session.submit_answer().await
        });
    };
    let retry = move || {
        dispatch(handle, action_error, |session| async move {
            session.retry_submission().await
        });
    };
    let abandon = move || {
        dispatch(handle, action_error, |session| async move {
            session.abandon().await
        });
    };
    let dismiss = move || {
        dispatch(handle, action_error, |session| async move {
            session.dismiss_error().await
        });
    };

    let snapshot = match state.read().clone() {
        ViewState::Loading => {
            return rsx! {
                div { class: "page quiz-session",
                    p { class: "loading", "Loading quiz..." }
                }
            };
        }
        ViewState::Error(err) => {
            let message = err.message();
            return rsx! {
                div { class: "page quiz-session",
                    div { class: "alert error",
                        h3 { "Quiz unavailable" }
                        p { "{message}" }
                        Link { to: Route::Home {}, "Back to home" }
                    }
                }
            };
        }
        ViewState::Ready(snapshot) => snapshot,
    };

    if let Some(result) = QuizResultVm::from_snapshot(&snapshot) {
        return rsx! {
            div { class: "page quiz-session",
                QuizResultPanel { vm: result }
                Link { to: Route::Home {}, "Back to home" }
            }
        };
    }

    let Some(vm) = QuizSessionVm::from_snapshot(&snapshot) else {
        return rsx! {
            div { class: "page quiz-session",
                div { class: "alert error",
                    h3 { "No Questions Available" }
                    p { "This quiz has no questions to show." }
                }
            }
        };
    };

    let low_time = vm.low_time_banner.clone().filter(|_| !warning_dismissed());
    let current_index = snapshot.current_index;
    let open_hint = vm
        .hint
        .clone()
        .filter(|_| vm.can_show_hint && hint_for() == Some(current_index));

    rsx! {
        div { class: "page quiz-session",
            if let Some(message) = vm.error_banner.clone() {
                div { class: "alert error",
                    strong { "Submission Error" }
                    p { "{message}" }
                    button { class: "link", onclick: move |_| dismiss(), "Dismiss" }
                }
            }
            if let Some(message) = action_error() {
                div { class: "alert warning", "{message}" }
            }
            if let Some(status) = vm.status_banner {
                div { class: "alert info", "{status}" }
            }
            if let Some(message) = low_time {
                div { class: "alert warning toast",
                    strong { "Time Warning" }
                    p { "{message}" }
                    button {
                        class: "link",
                        onclick: move |_| warning_dismissed.set(true),
                        "Dismiss"
                    }
                }
            }
            QuestionCard {
                vm: vm.clone(),
                on_select: move |option: String| select(option),
                on_submit: move |_| submit(),
                on_show_hint: move |_| hint_for.set(Some(current_index)),
            }
            if let Some(text) = open_hint {
                HintPanel { text, on_close: move |_| hint_for.set(None) }
            }
            div { class: "session-actions",
                if vm.needs_retry {
                    button {
                        class: "primary",
                        disabled: vm.is_submitting,
                        onclick: move |_| retry(),
                        "Retry Submission"
                    }
                }
                button {
                    class: "secondary",
                    disabled: vm.is_submitting,
                    onclick: move |_| abandon(),
                    "Leave Quiz"
                }
            }
        }
    }
}

/// Run one session command off the render path and keep its rejection for display.
fn dispatch<F, Fut>(
    handle: Signal<Option<SessionHandle>>,
    mut action_error: Signal<Option<String>>,
    command: F,
) where
    F: FnOnce(SessionHandle) -> Fut + 'static,
    Fut: Future<Output = Result<(), SessionError>> + 'static,
{
    let Some(session) = handle.read().clone() else {
        return;
    };
    spawn(async move {
        match command(session).await {
            Ok(()) => action_error.set(None),
            Err(err) => {
                debug!(error = %err, "quiz command rejected");
                action_error.set(Some(err.to_string()));
            }
        }
    });
}
