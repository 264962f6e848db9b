//! Standalone SVG line charts.
//!
//! All series share one x axis (trading-day index across the union of their
//! dates) and one y axis scaled to the combined min/max.

use crate::domain::pipeline::Series;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fmt::Write;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 480.0;
const PADDING: f64 = 60.0;
const COLORS: [&str; 4] = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728"];

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Render `series` as one chart. Returns an empty string when every series
/// is empty.
pub fn render_line_chart(title: &str, y_label: &str, series: &[Series]) -> String {
    let dates: BTreeSet<NaiveDate> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|&(d, _)| d))
        .collect();
    if dates.is_empty() {
        return String::new();
    }
    let dates: Vec<NaiveDate> = dates.into_iter().collect();

    let values = series.iter().flat_map(|s| s.points.iter().map(|&(_, v)| v));
    let (mut min_y, mut max_y) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min_y.is_finite() {
        min_y = 0.0;
        max_y = 1.0;
    }
    if max_y - min_y <= 0.0 {
        min_y -= 0.5;
        max_y += 0.5;
    }

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;
    let scale_x = if dates.len() > 1 {
        plot_width / (dates.len() - 1) as f64
    } else {
        0.0
    };
    let scale_y = plot_height / (max_y - min_y);
    let x_of = |date: NaiveDate| {
        let idx = dates.binary_search(&date).unwrap_or(0);
        PADDING + idx as f64 * scale_x
    };
    let y_of = |v: f64| HEIGHT - PADDING - (v - min_y) * scale_y;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH:.0}" height="{HEIGHT:.0}" viewBox="0 0 {WIDTH:.0} {HEIGHT:.0}">"#
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-family="sans-serif" font-size="16">{}</text>"#,
        WIDTH / 2.0,
        PADDING / 2.0,
        escape(title)
    );

    // axes
    let _ = writeln!(
        svg,
        r#"<line x1="{p:.1}" y1="{p:.1}" x2="{p:.1}" y2="{b:.1}" stroke="black"/>"#,
        p = PADDING,
        b = HEIGHT - PADDING
    );
    let _ = writeln!(
        svg,
        r#"<line x1="{p:.1}" y1="{b:.1}" x2="{r:.1}" y2="{b:.1}" stroke="black"/>"#,
        p = PADDING,
        b = HEIGHT - PADDING,
        r = WIDTH - PADDING
    );
    for (value, y) in [(max_y, PADDING), (min_y, HEIGHT - PADDING)] {
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-family="sans-serif" font-size="11">{:.2}</text>"#,
            PADDING - 6.0,
            y + 4.0,
            value
        );
    }
    if min_y < 0.0 && max_y > 0.0 {
        let zero = y_of(0.0);
        let _ = writeln!(
            svg,
            r##"<line x1="{:.1}" y1="{zero:.1}" x2="{:.1}" y2="{zero:.1}" stroke="#999" stroke-dasharray="4 4"/>"##,
            PADDING,
            WIDTH - PADDING
        );
    }
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="11">{}</text>"#,
        PADDING,
        HEIGHT - PADDING / 3.0,
        dates[0]
    );
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-family="sans-serif" font-size="11">{}</text>"#,
        WIDTH - PADDING,
        HEIGHT - PADDING / 3.0,
        dates[dates.len() - 1]
    );
    let _ = writeln!(
        svg,
        r#"<text x="14" y="{:.1}" transform="rotate(-90 14 {:.1})" text-anchor="middle" font-family="sans-serif" font-size="12">{}</text>"#,
        HEIGHT / 2.0,
        HEIGHT / 2.0,
        escape(y_label)
    );

    for (i, s) in series.iter().enumerate() {
        let color = COLORS[i % COLORS.len()];
        let points: Vec<String> = s
            .points
            .iter()
            .filter(|(_, v)| v.is_finite())
            .map(|&(d, v)| format!("{:.1},{:.1}", x_of(d), y_of(v)))
            .collect();
        if !points.is_empty() {
            let _ = writeln!(
                svg,
                r#"<polyline fill="none" stroke="{color}" stroke-width="1.5" points="{}"/>"#,
                points.join(" ")
            );
        }

        let legend_y = PADDING + 16.0 * i as f64 + 8.0;
        let _ = writeln!(
            svg,
            r#"<line x1="{:.1}" y1="{legend_y:.1}" x2="{:.1}" y2="{legend_y:.1}" stroke="{color}" stroke-width="3"/>"#,
            PADDING + 10.0,
            PADDING + 30.0
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="12">{}</text>"#,
            PADDING + 36.0,
            legend_y + 4.0,
            escape(s.name)
        );
    }

    svg.push_str("</svg>\n");
    svg
}
