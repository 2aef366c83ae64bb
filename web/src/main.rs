use dioxus::prelude::*;

use ui::components::Navbar;
use ui::views::{Explore, Home};

mod data;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(SiteShell)]
    #[route("/")]
    Home {},
    #[route("/explore")]
    Explore {},
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    init_logging();
    dioxus::launch(App);
}

#[cfg(target_arch = "wasm32")]
fn init_logging() {
    let _ = console_log::init_with_level(log::Level::Debug);
}

#[cfg(not(target_arch = "wasm32"))]
fn init_logging() {
    env_logger::init();
}

#[component]
fn App() -> Element {
    use_context_provider(data::load_registry);

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        Router::<Route> {}
    }
}

/// Shared page chrome: navbar on top, the routed view below.
#[component]
fn SiteShell() -> Element {
    rsx! {
        Navbar {
            Link { class: "navbar__link", to: Route::Home {}, "Home" }
            Link { class: "navbar__link", to: Route::Explore {}, "Explore" }
        }
        Outlet::<Route> {}
    }
}
