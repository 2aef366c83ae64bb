//! Filter controls for the explorer sidebar.

use dioxus::prelude::*;

use crate::core::format;
use crate::core::timing;

#[derive(Debug, Clone, PartialEq)]
pub struct PickerOption {
    pub label: String,
    pub selected: bool,
}

/// Multi-select picker with a summary title and bulk actions. Options are
/// rendered in universe order; toggles report the option and its new
/// state back to the owner.
#[component]
pub fn SelectPicker(
    entity: String,
    options: Vec<PickerOption>,
    on_toggle: EventHandler<(String, bool)>,
    on_select_all: EventHandler<bool>,
) -> Element {
    let selected = options.iter().filter(|option| option.selected).count();
    let title = format::picker_title(&entity, selected, options.len());

    rsx! {
        section { class: "picker",
            div { class: "picker__header",
                h3 { class: "picker__title", "{title}" }
                div { class: "picker__bulk",
                    button {
                        r#type: "button",
                        class: "picker__bulk-button",
                        onclick: move |_| on_select_all.call(true),
                        "All"
                    }
                    button {
                        r#type: "button",
                        class: "picker__bulk-button",
                        onclick: move |_| on_select_all.call(false),
                        "None"
                    }
                }
            }
            ul { class: "picker__options",
                for option in options.into_iter() {
                    {render_option(option, on_toggle)}
                }
            }
        }
    }
}

fn render_option(option: PickerOption, on_toggle: EventHandler<(String, bool)>) -> Element {
    let PickerOption { label, selected } = option;
    let toggle_label = label.clone();

    rsx! {
        li { class: "picker__option",
            label { class: "picker__option-label",
                input {
                    r#type: "checkbox",
                    checked: selected,
                    onchange: move |_| on_toggle.call((toggle_label.clone(), !selected)),
                }
                span { "{label}" }
            }
        }
    }
}

/// Publication-date filter: bounded from/to inputs plus shortcut buttons
/// anchored at the current calendar year.
#[component]
pub fn PubdateFilter(
    bounds: (i32, i32),
    value: (i32, i32),
    on_change: EventHandler<(i32, i32)>,
) -> Element {
    let (lower_bound, upper_bound) = bounds;
    let (lower, upper) = value;

    rsx! {
        section { class: "pubdate",
            h3 { class: "pubdate__title", "Publication date" }
            div { class: "pubdate__inputs",
                label { class: "pubdate__field",
                    span { "From" }
                    input {
                        r#type: "number",
                        min: "{lower_bound}",
                        max: "{upper_bound}",
                        value: "{lower}",
                        onchange: move |evt| {
                            if let Ok(new_lower) = evt.value().parse::<i32>() {
                                on_change.call((new_lower, upper));
                            }
                        },
                    }
                }
                label { class: "pubdate__field",
                    span { "To" }
                    input {
                        r#type: "number",
                        min: "{lower_bound}",
                        max: "{upper_bound}",
                        value: "{upper}",
                        onchange: move |evt| {
                            if let Ok(new_upper) = evt.value().parse::<i32>() {
                                on_change.call((lower, new_upper));
                            }
                        },
                    }
                }
            }
            div { class: "pubdate__shortcuts",
                button {
                    r#type: "button",
                    class: "pubdate__shortcut",
                    onclick: move |_| on_change.call(shortcut_range(0, bounds)),
                    "Last year"
                }
                button {
                    r#type: "button",
                    class: "pubdate__shortcut",
                    onclick: move |_| on_change.call(shortcut_range(5, bounds)),
                    "Past 5 years"
                }
                button {
                    r#type: "button",
                    class: "pubdate__shortcut",
                    onclick: move |_| on_change.call(shortcut_range(10, bounds)),
                    "Past 10 years"
                }
            }
        }
    }
}

/// Window ending at the current year, clamped into the filter bounds.
fn shortcut_range(years_back: i32, bounds: (i32, i32)) -> (i32, i32) {
    let current = timing::current_year();
    let upper = current.clamp(bounds.0, bounds.1);
    let lower = (current - years_back).clamp(bounds.0, upper);
    (lower, upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortcut_ranges_clamp_into_bounds() {
        let current = timing::current_year();
        let bounds = (2000, current);

        assert_eq!(shortcut_range(0, bounds), (current, current));
        assert_eq!(shortcut_range(5, bounds), (current - 5, current));
        assert_eq!(shortcut_range(100, bounds), (2000, current));
    }
}
