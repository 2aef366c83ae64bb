//! Transient notification toasts for dashboard transitions.

use dioxus::prelude::*;

/// One informational message, identified so a timer or the user can
/// dismiss it.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub message: String,
}

#[component]
pub fn NoticeStack(notices: Vec<Notice>, on_dismiss: EventHandler<u64>) -> Element {
    rsx! {
        div { class: "notices",
            for notice in notices.into_iter() {
                div { class: "notices__item", key: "{notice.id}",
                    span { class: "notices__message", "{notice.message}" }
                    button {
                        r#type: "button",
                        class: "notices__dismiss",
                        onclick: move |_| on_dismiss.call(notice.id),
                        "×"
                    }
                }
            }
        }
    }
}
