use dioxus::prelude::*;

#[component]
pub fn Navbar(children: Element) -> Element {
    rsx! {
        header { class: "navbar",
            span { class: "navbar__brand", "MetriScope" }
            nav { class: "navbar__links", {children} }
        }
    }
}
