//! Horizontal bar chart of a leaderboard, rendered as standalone SVG.

use std::fmt::Write;

use crate::leaderboard::LeaderboardEntry;

const WIDTH: f64 = 1000.0;
const LABEL_GUTTER: f64 = 180.0;
const RIGHT_MARGIN: f64 = 90.0;
const TOP: f64 = 70.0;
const ROW_HEIGHT: f64 = 40.0;
const BAR_FILL: f64 = 0.6;
const AXIS_HEIGHT: f64 = 60.0;
const X_MAX: f64 = 100.0;

const BAR_COLOR: &str = "#818cf8";
const VALUE_COLOR: &str = "#34d399";
const AXIS_COLOR: &str = "#334155";
const TICK_COLOR: &str = "#94a3b8";
const NAME_COLOR: &str = "#e2e8f0";
const TITLE_COLOR: &str = "#f8fafc";

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Entries are drawn bottom-up in the given order, so an ascending list puts
/// the best score on top.
pub fn render_chart_svg(entries: &[LeaderboardEntry], title: &str) -> String {
    let plot_width = WIDTH - LABEL_GUTTER - RIGHT_MARGIN;
    let plot_height = ROW_HEIGHT * entries.len().max(1) as f64;
    let height = TOP + plot_height + AXIS_HEIGHT;
    let axis_y = TOP + plot_height;
    let x_of = |value: f64| LABEL_GUTTER + plot_width * value.clamp(0.0, X_MAX) / X_MAX;

    let mut svg = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{height}" viewBox="0 0 {WIDTH} {height}" font-family="sans-serif">"#
    );
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="36" text-anchor="middle" font-size="22" font-weight="bold" fill="{TITLE_COLOR}">{}</text>"#,
        WIDTH / 2.0,
        escape(title)
    );

    for (i, entry) in entries.iter().enumerate() {
        let row_top = axis_y - ROW_HEIGHT * (i + 1) as f64;
        let bar_height = ROW_HEIGHT * BAR_FILL;
        let bar_y = row_top + (ROW_HEIGHT - bar_height) / 2.0;
        let center_y = row_top + ROW_HEIGHT / 2.0;
        let bar_end = x_of(entry.score);

        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{center_y:.1}" text-anchor="end" dominant-baseline="middle" font-size="14" fill="{NAME_COLOR}">{}</text>"#,
            LABEL_GUTTER - 10.0,
            escape(&entry.name)
        );
        let _ = writeln!(
            svg,
            r#"<rect x="{LABEL_GUTTER}" y="{bar_y:.1}" width="{:.1}" height="{bar_height:.1}" fill="{BAR_COLOR}"/>"#,
            bar_end - LABEL_GUTTER
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{center_y:.1}" dominant-baseline="middle" font-size="13" font-weight="bold" fill="{VALUE_COLOR}">{:.1}%</text>"#,
            bar_end + 6.0,
            entry.score
        );
    }

    let _ = writeln!(
        svg,
        r#"<line x1="{LABEL_GUTTER}" y1="{TOP}" x2="{LABEL_GUTTER}" y2="{axis_y}" stroke="{AXIS_COLOR}"/>"#
    );
    let _ = writeln!(
        svg,
        r#"<line x1="{LABEL_GUTTER}" y1="{axis_y}" x2="{}" y2="{axis_y}" stroke="{AXIS_COLOR}"/>"#,
        LABEL_GUTTER + plot_width
    );
    for tick in (0..=100).step_by(20) {
        let x = x_of(tick as f64);
        let _ = writeln!(
            svg,
            r#"<text x="{x:.1}" y="{:.1}" text-anchor="middle" font-size="12" fill="{TICK_COLOR}">{tick}</text>"#,
            axis_y + 18.0
        );
    }
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="14" fill="{TICK_COLOR}">Final Analytical Score (0-100)</text>"#,
        LABEL_GUTTER + plot_width / 2.0,
        axis_y + 45.0
    );
    svg.push_str("</svg>\n");
    svg
}
