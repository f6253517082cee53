use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::views::{HomeView, QuizSessionView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/quiz/:attempt_id", QuizSessionView)] Quiz { attempt_id: String },
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            header { class: "topbar",
                h1 { "Quiz" }
                nav {
                    Link { to: Route::Home {}, "Home" }
                }
            }
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}
