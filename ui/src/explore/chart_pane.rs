//! Inline SVG rendering of a chart specification.

use dioxus::prelude::*;

use crate::core::chart::ChartSpec;

const WIDTH: f64 = 840.0;
const HEIGHT: f64 = 520.0;
const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 36.0;
const MARGIN_BOTTOM: f64 = 52.0;
const Y_TICKS: usize = 5;

const PALETTE: [&str; 12] = [
    "#5470c6", "#91cc75", "#fac858", "#ee6666", "#73c0de", "#3ba272", "#fc8452", "#9a60b4",
    "#ea7ccc", "#48617f", "#b6a2de", "#2f4554",
];

struct PlottedSeries {
    color: &'static str,
    polylines: Vec<String>,
    dots: Vec<Dot>,
}

struct Dot {
    x: f64,
    y: f64,
}

struct AxisTick {
    position: f64,
    label_position: f64,
    label: String,
}

#[component]
pub fn ChartPane(spec: ChartSpec) -> Element {
    if spec.x_axis.is_empty() || spec.is_empty() {
        return rsx! {
            section { class: "chart chart--empty",
                p { class: "chart__placeholder", "No data for the current selection." }
            }
        };
    }

    let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let x_right = WIDTH - MARGIN_RIGHT;
    let y_bottom = HEIGHT - MARGIN_BOTTOM;
    let y_label_x = MARGIN_LEFT - 10.0;
    let x_label_y = y_bottom + 22.0;

    let y_max = spec
        .series
        .iter()
        .flat_map(|series| series.points.iter().flatten())
        .fold(0.0_f64, |acc, value| acc.max(*value));
    let y_max = if y_max <= 0.0 { 1.0 } else { y_max };

    let x_pos = |index: usize| {
        if spec.x_axis.len() == 1 {
            MARGIN_LEFT + plot_width / 2.0
        } else {
            MARGIN_LEFT + plot_width * index as f64 / (spec.x_axis.len() - 1) as f64
        }
    };
    let y_pos = |value: f64| MARGIN_TOP + plot_height * (1.0 - value / y_max);

    let x_ticks: Vec<AxisTick> = spec
        .x_axis
        .iter()
        .enumerate()
        .map(|(index, year)| AxisTick {
            position: round1(x_pos(index)),
            label_position: x_label_y,
            label: year.to_string(),
        })
        .collect();

    let y_ticks: Vec<AxisTick> = (0..=Y_TICKS)
        .map(|step| {
            let value = y_max * step as f64 / Y_TICKS as f64;
            let position = round1(y_pos(value));
            AxisTick {
                position,
                label_position: position + 4.0,
                label: tick_label(value, y_max),
            }
        })
        .collect();

    let plotted: Vec<PlottedSeries> = spec
        .series
        .iter()
        .enumerate()
        .map(|(series_index, series)| {
            let color = PALETTE[series_index % PALETTE.len()];
            let mut polylines = Vec::new();
            let mut dots = Vec::new();
            let mut segment = Vec::new();

            for (index, point) in series.points.iter().enumerate() {
                match point {
                    Some(value) => {
                        let x = round1(x_pos(index));
                        let y = round1(y_pos(*value));
                        dots.push(Dot { x, y });
                        segment.push(format!("{x},{y}"));
                    }
                    // A gap ends the current segment so missing years are
                    // visible as breaks instead of interpolated lines.
                    None => flush_segment(&mut segment, &mut polylines),
                }
            }
            flush_segment(&mut segment, &mut polylines);

            PlottedSeries {
                color,
                polylines,
                dots,
            }
        })
        .collect();

    let legend: Vec<(String, &'static str)> = spec
        .legend
        .iter()
        .enumerate()
        .map(|(index, entry)| (entry.name.clone(), PALETTE[index % PALETTE.len()]))
        .collect();

    rsx! {
        section { class: "chart",
            h2 { class: "chart__title", "{spec.title}" }
            svg {
                class: "chart__svg",
                view_box: "0 0 840 520",
                preserve_aspect_ratio: "xMidYMid meet",

                for tick in y_ticks.iter() {
                    line {
                        x1: "{MARGIN_LEFT}",
                        y1: "{tick.position}",
                        x2: "{x_right}",
                        y2: "{tick.position}",
                        stroke: "#e3e6ee",
                        stroke_width: "1",
                    }
                    text {
                        x: "{y_label_x}",
                        y: "{tick.label_position}",
                        class: "chart__tick",
                        text_anchor: "end",
                        "{tick.label}"
                    }
                }

                line {
                    x1: "{MARGIN_LEFT}",
                    y1: "{MARGIN_TOP}",
                    x2: "{MARGIN_LEFT}",
                    y2: "{y_bottom}",
                    stroke: "#9aa3b2",
                    stroke_width: "1",
                }
                line {
                    x1: "{MARGIN_LEFT}",
                    y1: "{y_bottom}",
                    x2: "{x_right}",
                    y2: "{y_bottom}",
                    stroke: "#9aa3b2",
                    stroke_width: "1",
                }

                for tick in x_ticks.iter() {
                    text {
                        x: "{tick.position}",
                        y: "{tick.label_position}",
                        class: "chart__tick",
                        text_anchor: "middle",
                        "{tick.label}"
                    }
                }

                for series in plotted.iter() {
                    for points in series.polylines.iter() {
                        polyline {
                            points: "{points}",
                            fill: "none",
                            stroke: "{series.color}",
                            stroke_width: "2",
                        }
                    }
                    for dot in series.dots.iter() {
                        circle { cx: "{dot.x}", cy: "{dot.y}", r: "3", fill: "{series.color}" }
                    }
                }
            }
            div { class: "chart__legend",
                for (name, color) in legend.into_iter() {
                    span { class: "chart__legend-entry",
                        span { class: "chart__legend-swatch", style: "background: {color}" }
                        span { class: "chart__legend-name", "{name}" }
                    }
                }
            }
        }
    }
}

fn flush_segment(segment: &mut Vec<String>, polylines: &mut Vec<String>) {
    if segment.len() >= 2 {
        polylines.push(segment.join(" "));
    }
    segment.clear();
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn tick_label(value: f64, y_max: f64) -> String {
    if y_max >= 10.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}
