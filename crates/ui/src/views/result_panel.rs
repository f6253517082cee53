use dioxus::prelude::*;

use crate::vm::QuizResultVm;

#[component]
pub fn QuizResultPanel(vm: QuizResultVm) -> Element {
    rsx! {
        section { class: "result-panel",
            h2 { "{vm.title}" }
            p { class: "result-status", "{vm.status}" }
            if let Some(score) = vm.score_label.clone() {
                p { class: "result-score", "{score}" }
            }
            dl { class: "result-stats",
                dt { "Total Questions" }
                dd { "{vm.total_questions}" }
                dt { "Answered" }
                dd { "{vm.answered}" }
                dt { "Correct Answers" }
                dd { "{vm.correct_answers}" }
                dt { "Points" }
                dd { "{vm.points_label}" }
            }
            p { class: "result-time", "{vm.avg_time_label}" }
        }
    }
}
