use dioxus::prelude::*;

use crate::explore::ExploreDashboard;

#[component]
pub fn Explore() -> Element {
    rsx! {
        section { class: "page page-explore",
            h1 { "Data and code transparency" }
            p {
                "Aggregated open-science metrics for the active extraction tool. Pick a \
                 metric and a splitting variable, then narrow the view with the filters."
            }

            ExploreDashboard {}
        }
    }
}
