use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;
use futures_channel::mpsc::UnboundedSender;
use futures_util::StreamExt;

use crate::core::catalog::SplitDimension;
use crate::core::error::CoreResult;
use crate::core::record::DatasetRegistry;
use crate::core::{platform, timing};

use super::chart_pane::ChartPane;
use super::controls::{PickerOption, PubdateFilter, SelectPicker};
use super::engine::{Change, ExploreEngine};
use super::notices::{Notice, NoticeStack};

const NOTICE_DISMISS_MS: u64 = 5000;

#[derive(Debug, Clone)]
enum ExploreEvent {
    SelectSource(String),
    SelectMetric(String),
    SelectSplit(SplitDimension),
    SetPubdate(i32, i32),
    ToggleJournal(String, bool),
    SelectAllJournals(bool),
    ToggleCountry(String, bool),
    SelectAllCountries(bool),
    DismissNotice(u64),
}

#[component]
pub fn ExploreDashboard() -> Element {
    let registry = try_use_context::<DatasetRegistry>().unwrap_or_default();

    let engine = use_signal(move || ExploreEngine::new(registry.clone()));
    let notices = use_signal(Vec::<Notice>::new);
    let notice_seq = use_signal(|| 0u64);
    let last_error = use_signal(|| Option::<String>::None);

    let sender_slot: Rc<RefCell<Option<UnboundedSender<ExploreEvent>>>> =
        Rc::new(RefCell::new(None));
    let sender_slot_for_loop = sender_slot.clone();

    let coroutine = use_coroutine(move |mut rx: UnboundedReceiver<ExploreEvent>| {
        let sender_slot = sender_slot_for_loop.clone();
        let mut engine_signal = engine;
        let mut notices_signal = notices;
        let mut seq_signal = notice_seq;
        let mut error_signal = last_error;

        async move {
            // Surface the boot cascade's notifications.
            drain_engine_notices(
                &mut engine_signal,
                &mut notices_signal,
                &mut seq_signal,
                &sender_slot,
            );

            while let Some(event) = rx.next().await {
                match event {
                    ExploreEvent::SelectSource(name) => {
                        apply_change(Change::Source(name), &mut engine_signal, &mut error_signal);
                    }
                    ExploreEvent::SelectMetric(title) => {
                        apply_change(Change::Metric(title), &mut engine_signal, &mut error_signal);
                    }
                    ExploreEvent::SelectSplit(split) => {
                        apply_change(Change::Split(split), &mut engine_signal, &mut error_signal);
                    }
                    ExploreEvent::SetPubdate(lower, upper) => {
                        apply_change(
                            Change::DateRange(lower, upper),
                            &mut engine_signal,
                            &mut error_signal,
                        );
                    }
                    ExploreEvent::ToggleJournal(name, selected) => {
                        edit_selection(&mut engine_signal, &mut error_signal, |state| {
                            state.set_journal_selected(&name, selected)
                        });
                    }
                    ExploreEvent::SelectAllJournals(selected) => {
                        edit_selection(&mut engine_signal, &mut error_signal, |state| {
                            state.select_all_journals(selected);
                            Ok(())
                        });
                    }
                    ExploreEvent::ToggleCountry(name, selected) => {
                        edit_selection(&mut engine_signal, &mut error_signal, |state| {
                            state.set_country_selected(&name, selected)
                        });
                    }
                    ExploreEvent::SelectAllCountries(selected) => {
                        edit_selection(&mut engine_signal, &mut error_signal, |state| {
                            state.select_all_countries(selected);
                            Ok(())
                        });
                    }
                    ExploreEvent::DismissNotice(id) => {
                        notices_signal.with_mut(|items| items.retain(|notice| notice.id != id));
                    }
                }

                drain_engine_notices(
                    &mut engine_signal,
                    &mut notices_signal,
                    &mut seq_signal,
                    &sender_slot,
                );
            }
        }
    });

    sender_slot.borrow_mut().replace(coroutine.tx());

    let error_message = last_error();
    let active_notices = notices();

    let engine_guard = engine.read();
    let body = match &*engine_guard {
        Err(err) => {
            let message = err.to_string();
            rsx! {
                div { class: "explore__placeholder",
                    h2 { "Explorer unavailable" }
                    p { "{message}" }
                }
            }
        }
        Ok(state) => {
            let sources = state.sources();
            let active_source = state.active_source().to_string();
            let metric_titles: Vec<String> = state
                .catalog()
                .iter()
                .map(|metric| metric.title.clone())
                .collect();
            let active_metric = state.metric().to_string();
            let split_options: Vec<(&'static str, bool)> = state
                .splitting_vars()
                .iter()
                .map(|&option| (option.key(), option == state.split()))
                .collect();
            let bounds = state.date_bounds();
            let pubdate = state.pubdate().unwrap_or(bounds);
            let journal_options: Vec<PickerOption> = state
                .journal_universe()
                .iter()
                .map(|name| PickerOption {
                    label: name.clone(),
                    selected: state.journal_selection().contains(name),
                })
                .collect();
            let country_options: Vec<PickerOption> = state
                .country_universe()
                .iter()
                .map(|name| PickerOption {
                    label: name.clone(),
                    selected: state.country_selection().contains(name),
                })
                .collect();
            let chart = state.chart();

            rsx! {
                div { class: "explore__topbar",
                    label { class: "explore__control",
                        span { "Extraction tool" }
                        select {
                            onchange: move |evt| {
                                coroutine.send(ExploreEvent::SelectSource(evt.value()));
                            },
                            for name in sources.into_iter() {
                                option { value: "{name}", selected: name == active_source, "{name}" }
                            }
                        }
                    }
                    label { class: "explore__control",
                        span { "Metric" }
                        select {
                            onchange: move |evt| {
                                coroutine.send(ExploreEvent::SelectMetric(evt.value()));
                            },
                            for title in metric_titles.into_iter() {
                                option { value: "{title}", selected: title == active_metric, "{title}" }
                            }
                        }
                    }
                    label { class: "explore__control",
                        span { "Splitting variable" }
                        select {
                            onchange: move |evt| {
                                if let Some(split) = SplitDimension::from_key(&evt.value()) {
                                    coroutine.send(ExploreEvent::SelectSplit(split));
                                }
                            },
                            for (key, selected) in split_options.into_iter() {
                                option { value: "{key}", selected, "{key}" }
                            }
                        }
                    }
                }

                div { class: "explore__layout",
                    aside { class: "explore__sidebar",
                        h2 { class: "explore__sidebar-title", "Filters" }
                        PubdateFilter {
                            bounds,
                            value: pubdate,
                            on_change: move |(lower, upper)| {
                                coroutine.send(ExploreEvent::SetPubdate(lower, upper));
                            },
                        }
                        SelectPicker {
                            entity: "journals",
                            options: journal_options,
                            on_toggle: move |(name, selected)| {
                                coroutine.send(ExploreEvent::ToggleJournal(name, selected));
                            },
                            on_select_all: move |selected| {
                                coroutine.send(ExploreEvent::SelectAllJournals(selected));
                            },
                        }
                        SelectPicker {
                            entity: "affiliation countries",
                            options: country_options,
                            on_toggle: move |(name, selected)| {
                                coroutine.send(ExploreEvent::ToggleCountry(name, selected));
                            },
                            on_select_all: move |selected| {
                                coroutine.send(ExploreEvent::SelectAllCountries(selected));
                            },
                        }
                    }
                    main { class: "explore__main",
                        {render_chart(chart)}
                    }
                }
            }
        }
    };

    rsx! {
        section { class: "explore",
            NoticeStack {
                notices: active_notices,
                on_dismiss: move |id| {
                    coroutine.send(ExploreEvent::DismissNotice(id));
                },
            }
            if let Some(message) = error_message {
                div { class: "explore__error", "⚠️ {message}" }
            }
            {body}
        }
    }
}

fn render_chart(chart: CoreResult<crate::core::chart::ChartSpec>) -> Element {
    match chart {
        Ok(spec) => rsx! {
            ChartPane { spec }
        },
        Err(err) => {
            let message = err.to_string();
            rsx! {
                div { class: "explore__error", "⚠️ {message}" }
            }
        }
    }
}

fn apply_change(
    change: Change,
    engine: &mut Signal<CoreResult<ExploreEngine>>,
    last_error: &mut Signal<Option<String>>,
) {
    let outcome = engine.with_mut(|state| match state {
        Ok(engine) => engine.apply(change),
        Err(_) => Ok(()),
    });
    report_outcome(outcome, last_error);
}

fn edit_selection(
    engine: &mut Signal<CoreResult<ExploreEngine>>,
    last_error: &mut Signal<Option<String>>,
    edit: impl FnOnce(&mut ExploreEngine) -> CoreResult<()>,
) {
    let outcome = engine.with_mut(|state| match state {
        Ok(engine) => edit(engine),
        Err(_) => Ok(()),
    });
    report_outcome(outcome, last_error);
}

fn report_outcome(outcome: CoreResult<()>, last_error: &mut Signal<Option<String>>) {
    match outcome {
        Ok(()) => last_error.set(None),
        Err(err) => last_error.set(Some(err.to_string())),
    }
}

fn drain_engine_notices(
    engine: &mut Signal<CoreResult<ExploreEngine>>,
    notices: &mut Signal<Vec<Notice>>,
    seq: &mut Signal<u64>,
    sender_slot: &Rc<RefCell<Option<UnboundedSender<ExploreEvent>>>>,
) {
    let messages = engine.with_mut(|state| match state {
        Ok(engine) => engine.take_notices(),
        Err(_) => Vec::new(),
    });

    for message in messages {
        let id = seq.with_mut(|value| {
            *value += 1;
            *value
        });
        notices.with_mut(|items| items.push(Notice { id, message }));
        schedule_dismiss(sender_slot.clone(), id);
    }
}

fn schedule_dismiss(sender_slot: Rc<RefCell<Option<UnboundedSender<ExploreEvent>>>>, id: u64) {
    if let Some(sender) = sender_slot.borrow().as_ref().cloned() {
        platform::spawn_future(async move {
            timing::sleep_ms(NOTICE_DISMISS_MS).await;
            let _ = sender.unbounded_send(ExploreEvent::DismissNotice(id));
        });
    }
}
