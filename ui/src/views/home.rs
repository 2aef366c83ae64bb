use dioxus::prelude::*;

#[component]
pub fn Home() -> Element {
    rsx! {
        section { class: "page page-home",
            h1 { "MetriScope" }
            p { class: "page-home__tagline", "Measuring open science practices in biomedical publications." }
            p {
                "MetriScope evaluates open science practices such as data sharing, code \
                 availability, and research transparency, and tracks how they evolve over \
                 time and across fields, journals, and countries. Use the explorer to dig \
                 into the key metrics and trends."
            }

            ul { class: "page-home__features",
                li { "Data and code sharing rates per publication year" }
                li { "Trends split by journal, affiliation country, or funder institute" }
                li { "Filters for publication date, journals, and countries" }
            }
            p { class: "page-home__cta",
                a { class: "page-home__cta-link", href: "/explore", "Explore the data" }
            }
        }
    }
}
