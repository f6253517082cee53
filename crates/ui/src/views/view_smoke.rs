use dioxus::prelude::*;
use quiz_core::model::{AttemptId, QuestionDraft, ResponseStats};
use services::{SessionSnapshot, SessionState, SubmitTrigger, Termination};

use super::test_harness::{ATTEMPT_ID, ViewKind, drive_dom, setup_view_harness};
use crate::views::{HintPanel, QuestionCard, QuizResultPanel};
use crate::vm::{QuizResultVm, QuizSessionVm};

fn snapshot(state: SessionState) -> SessionSnapshot {
    let mut draft = QuestionDraft::multiple_choice(
        "q1",
        "Which gas do plants absorb?",
        ["A) Oxygen", "B) Carbon dioxide", "C) Helium"],
        "B",
        1,
    );
    draft.explanation = Some("Think about photosynthesis.".into());
    let question = draft.validate().unwrap();
    SessionSnapshot {
        attempt_id: AttemptId::new("att-1"),
        state,
        current_index: 0,
        total_questions: 2,
        question: Some(question),
        time_remaining_secs: 45,
        question_elapsed_secs: 3,
        pending_answer: Some("B".into()),
        last_error: None,
        failed_submission: None,
        time_running_low: true,
        answered: 0,
        stats: ResponseStats {
            total_questions: 2,
            answered: 2,
            correct_answers: 1,
            total_points: 1,
            max_points: 2,
            avg_time_per_question: 4.0,
            score_percent: 50.0,
        },
    }
}

#[component]
fn CardHarness(vm: QuizSessionVm) -> Element {
    rsx! {
        QuestionCard {
            vm,
            on_select: move |_| {},
            on_submit: move |_| {},
            on_show_hint: move |_| {},
        }
    }
}

#[component]
fn HintHarness(text: String) -> Element {
    rsx! { HintPanel { text, on_close: move |_| {} } }
}

#[component]
fn ResultHarness(vm: QuizResultVm) -> Element {
    rsx! { QuizResultPanel { vm } }
}

#[test]
fn question_card_renders_progress_timer_and_options() {
    let vm = QuizSessionVm::from_snapshot(&snapshot(SessionState::Active)).unwrap();
    let mut dom = VirtualDom::new_with_props(CardHarness, CardHarnessProps { vm });
    dom.rebuild_in_place();
    drive_dom(&mut dom);
    let html = dioxus_ssr::render(&dom);

    assert!(html.contains("Question 1 of 2"), "missing header in {html}");
    assert!(html.contains("0:45"), "missing timer in {html}");
    assert!(html.contains("timer urgent"), "missing urgent timer in {html}");
    assert!(html.contains("Time spent: 3 seconds"), "missing time spent in {html}");
    assert!(html.contains("B) Carbon dioxide"), "missing option in {html}");
    assert!(html.contains("Submit Answer"), "missing submit in {html}");
    assert!(html.contains("Show Hint"), "missing hint button in {html}");
}

#[test]
fn question_card_without_explanation_has_no_hint_button() {
    let mut snapshot = snapshot(SessionState::Active);
    snapshot.question = Some(
        QuestionDraft::multiple_choice("q2", "2 + 2?", ["A) 4", "B) 5"], "A", 1)
            .validate()
            .unwrap(),
    );
    let vm = QuizSessionVm::from_snapshot(&snapshot).unwrap();
    let mut dom = VirtualDom::new_with_props(CardHarness, CardHarnessProps { vm });
    dom.rebuild_in_place();
    drive_dom(&mut dom);
    let html = dioxus_ssr::render(&dom);

    assert!(!html.contains("Show Hint"), "unexpected hint button in {html}");
}

#[test]
fn hint_panel_renders_text() {
    let mut dom = VirtualDom::new_with_props(
        HintHarness,
        HintHarnessProps {
            text: "Think about photosynthesis.".into(),
        },
    );
    dom.rebuild_in_place();
    drive_dom(&mut dom);
    let html = dioxus_ssr::render(&dom);

    assert!(html.contains("Hint"), "missing title in {html}");
    assert!(html.contains("Think about photosynthesis."), "missing text in {html}");
    assert!(html.contains("Close"), "missing close button in {html}");
}

#[test]
fn question_card_shows_submitting_label() {
    let vm = QuizSessionVm::from_snapshot(&snapshot(SessionState::Submitting {
        trigger: SubmitTrigger::Completed,
    }))
    .unwrap();
    let mut dom = VirtualDom::new_with_props(CardHarness, CardHarnessProps { vm });
    dom.rebuild_in_place();
    drive_dom(&mut dom);
    let html = dioxus_ssr::render(&dom);

    assert!(html.contains("Submitting..."), "missing submitting label in {html}");
}

#[test]
fn result_panel_renders_score_and_stats() {
    let vm = QuizResultVm::from_snapshot(&snapshot(SessionState::Terminated(
        Termination::Submitted {
            trigger: SubmitTrigger::TimeExpired,
            score: Some(50.0),
        },
    )))
    .unwrap();
    let mut dom = VirtualDom::new_with_props(ResultHarness, ResultHarnessProps { vm });
    dom.rebuild_in_place();
    drive_dom(&mut dom);
    let html = dioxus_ssr::render(&dom);

    assert!(html.contains("Quiz Results"), "missing title in {html}");
    assert!(html.contains("Score: 50"), "missing score in {html}");
    assert!(html.contains("1 / 2 points"), "missing points in {html}");
    assert!(
        html.contains("Average Time per Question: 4s"),
        "missing average time in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_renders_start_form() {
    let mut harness = setup_view_harness(ViewKind::Home);
    harness.rebuild();
    let html = harness.render();

    assert!(html.contains("Start a quiz"), "missing heading in {html}");
    assert!(html.contains("Questions from the test bank"), "missing backend in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_loads_first_question() {
    let mut harness = setup_view_harness(ViewKind::Quiz(ATTEMPT_ID.to_string()));
    harness.rebuild();
    assert!(harness.render().contains("Loading quiz..."));

    let html = harness.drive_until("Question 1 of 3").await;
    assert!(html.contains("Question 1 of 3"), "missing header in {html}");
    assert!(html.contains("What is 2 + 2?"), "missing prompt in {html}");
    assert!(html.contains("class=\"timer\""), "missing timer in {html}");
    assert_eq!(harness.sink.submission_count().unwrap(), 0);
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_reports_missing_attempt() {
    let mut harness = setup_view_harness(ViewKind::Quiz("nope".to_string()));
    harness.rebuild();

    let html = harness.drive_until("could not be found").await;
    assert!(
        html.contains("This quiz attempt could not be found."),
        "missing error in {html}"
    );
}
