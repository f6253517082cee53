use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use quiz_core::model::{Attempt, AttemptId, QuestionDraft};
use services::{Clock, InMemoryQuizProvider, InMemorySubmissionSink, QuizSessionLoop};

use crate::context::{UiApp, build_app_context};
use crate::views::{HomeView, QuizSessionView};

pub const ATTEMPT_ID: &str = "att-view";

struct TestApp {
    quiz_loop: Arc<QuizSessionLoop>,
}

impl UiApp for TestApp {
    fn quiz_loop(&self) -> Arc<QuizSessionLoop> {
        Arc::clone(&self.quiz_loop)
    }

    fn initial_attempt(&self) -> Option<AttemptId> {
        None
    }

    fn backend_label(&self) -> String {
        "the test bank".to_string()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Quiz(String),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view.clone());
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    match use_context::<ViewKind>() {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Quiz(attempt_id) => rsx! { QuizSessionView { attempt_id } },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub sink: InMemorySubmissionSink,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Drive pending futures until the rendered html contains `needle`.
    pub async fn drive_until(&mut self, needle: &str) -> String {
        for _ in 0..40 {
            let html = self.render();
            if html.contains(needle) {
                return html;
            }
            self.drive_async().await;
        }
        self.render()
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

fn sample_attempt() -> Attempt {
    let questions = [
        ("q1", "What is 2 + 2?", "B"),
        ("q2", "What is 3 + 3?", "C"),
        ("q3", "What is 1 + 1?", "A"),
    ]
    .into_iter()
    .map(|(id, text, correct)| {
        QuestionDraft::multiple_choice(id, text, ["A) 2", "B) 4", "C) 6"], correct, 1)
            .validate()
            .expect("valid question")
    })
    .collect();
    Attempt::new(AttemptId::new(ATTEMPT_ID), questions, 300).expect("valid attempt")
}

pub fn setup_view_harness(view: ViewKind) -> ViewHarness {
    let provider = InMemoryQuizProvider::new();
    provider.insert(sample_attempt()).expect("insert attempt");
    let sink = InMemorySubmissionSink::new();
    let quiz_loop = Arc::new(QuizSessionLoop::new(
        Clock::system(),
        Arc::new(provider),
        Arc::new(sink.clone()),
    ));

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app: Arc::new(TestApp { quiz_loop }),
            view,
        },
    );

    ViewHarness { dom, sink }
}
