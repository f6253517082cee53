use dioxus::prelude::*;

use crate::vm::{OptionVm, QuizSessionVm};

/// Pure render of one question; every interaction goes out through the handlers.
#[component]
pub fn QuestionCard(
    vm: QuizSessionVm,
    on_select: EventHandler<String>,
    on_submit: EventHandler<()>,
    on_show_hint: EventHandler<()>,
) -> Element {
    let timer_class = if vm.timer_urgent { "timer urgent" } else { "timer" };

    rsx! {
        section { class: "question-card",
            header { class: "question-header",
                strong { "{vm.header}" }
                span { class: "progress-label", "{vm.progress_label}" }
            }
            div { class: "question-meta",
                progress { max: "100", value: "{vm.progress_percent}" }
                span { class: "{timer_class}", title: "Quiz time remaining", "{vm.timer_label}" }
            }
            p { class: "time-spent", title: "Time spent on this question", "{vm.time_spent_label}" }
            p { class: "question-text", "{vm.prompt}" }
            fieldset { class: "options", disabled: vm.is_submitting,
                for (index, option) in vm.options.iter().cloned().enumerate() {
                    OptionRow {
                        key: "{index}",
                        option,
                        disabled: vm.is_submitting,
                        on_select,
                    }
                }
            }
            div { class: "actions",
                if vm.hint.is_some() {
                    button {
                        class: "secondary",
                        title: "Get a hint for this question",
                        disabled: !vm.can_show_hint,
                        onclick: move |_| on_show_hint.call(()),
                        "Show Hint"
                    }
                }
                button {
                    class: "primary",
                    disabled: !vm.can_submit,
                    onclick: move |_| on_submit.call(()),
                    "{vm.submit_label}"
                }
            }
        }
    }
}

#[component]
fn OptionRow(option: OptionVm, disabled: bool, on_select: EventHandler<String>) -> Element {
    let class = if option.selected { "option selected" } else { "option" };
    let key = option.key.clone();

    rsx! {
        label { class: "{class}",
            input {
                r#type: "radio",
                name: "answer",
                value: "{option.key}",
                checked: option.selected,
                disabled,
                onchange: move |_| on_select.call(key.clone()),
            }
            span { "{option.label}" }
        }
    }
}

#[component]
pub fn HintPanel(text: String, on_close: EventHandler<()>) -> Element {
    rsx! {
        div { class: "alert info hint-panel", role: "dialog",
            strong { "Hint" }
            p { "{text}" }
            button { class: "link", onclick: move |_| on_close.call(()), "Close" }
        }
    }
}
