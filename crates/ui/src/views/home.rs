use std::str::FromStr;

use dioxus::prelude::*;
use dioxus_router::use_navigator;

use quiz_core::model::AttemptId;

use crate::context::AppContext;
use crate::routes::Route;

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let mut attempt_input = use_signal(String::new);
    let mut input_error = use_signal(|| None::<&'static str>);

    let launch_ctx = ctx.clone();
    use_effect(move || {
        if let Some(attempt_id) = launch_ctx.take_initial_attempt() {
            navigator.push(Route::Quiz {
                attempt_id: attempt_id.to_string(),
            });
        }
    });

    let start = move |_: MouseEvent| {
        let parsed = AttemptId::from_str(&attempt_input.read());
        match parsed {
            Ok(attempt_id) => {
                input_error.set(None);
                navigator.push(Route::Quiz {
                    attempt_id: attempt_id.to_string(),
                });
            }
            Err(_) => input_error.set(Some("Enter an attempt ID to start.")),
        }
    };

    let backend = ctx.backend_label().to_string();

    rsx! {
        div { class: "page",
            h2 { "Start a quiz" }
            p { class: "muted", "Questions from {backend}" }
            div { class: "attempt-form",
                input {
                    r#type: "text",
                    placeholder: "Attempt ID",
                    value: "{attempt_input}",
                    oninput: move |evt| attempt_input.set(evt.value()),
                }
                button { class: "primary", onclick: start, "Start" }
            }
            if let Some(message) = input_error() {
                p { class: "form-error", "{message}" }
            }
        }
    }
}
