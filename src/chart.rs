//! SVG charts for the three report questions.

use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;
use tracing::debug;

use crate::analyzers::types::{DurationGroup, TimingSummary, TrendSeries, WEEKDAYS};

const SERIES_COLORS: [RGBColor; 6] = [BLUE, RED, GREEN, MAGENTA, CYAN, BLACK];

fn series_color(idx: usize) -> RGBColor {
    SERIES_COLORS[idx % SERIES_COLORS.len()]
}

/// Upper axis bound leaving some room above the tallest value.
fn headroom(max: u32) -> u32 {
    max + max / 10 + 1
}

fn segment_label(value: &SegmentValue<u32>, labels: &[String]) -> String {
    match value {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => {
            labels.get(*i as usize).cloned().unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    }
}

/// Hourly bars with one line per bike type, and a weekday panel below.
pub fn render_timing(summary: &TimingSummary, path: &Path, size: (u32, u32)) -> Result<()> {
    debug!(path = %path.display(), "Rendering timing chart");

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((2, 1));

    let max_hour = summary.by_hour.iter().copied().max().unwrap_or(0) as u32;
    let mut hourly = ChartBuilder::on(&panels[0])
        .caption("Rides by hour of day", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..23u32).into_segmented(), 0u32..headroom(max_hour))?;

    hourly
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(24)
        .x_desc("Hour of day")
        .y_desc("Rides")
        .draw()?;

    hourly
        .draw_series(
            Histogram::vertical(&hourly)
                .style(BLUE.mix(0.3).filled())
                .margin(2)
                .data(
                    summary
                        .by_hour
                        .iter()
                        .enumerate()
                        .map(|(h, c)| (h as u32, *c as u32)),
                ),
        )?
        .label("all bikes")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], BLUE.mix(0.3).filled()));

    for (idx, (kind, counts)) in summary.by_rideable_type.iter().enumerate() {
        let color = series_color(idx + 1);
        hourly
            .draw_series(LineSeries::new(
                counts
                    .by_hour
                    .iter()
                    .enumerate()
                    .map(|(h, c)| (SegmentValue::CenterOf(h as u32), *c as u32)),
                color.stroke_width(2),
            ))?
            .label(kind.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    hourly
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    let day_labels: Vec<String> = WEEKDAYS.iter().map(|d| d[..3].to_string()).collect();
    let weekday_label = |v: &SegmentValue<u32>| segment_label(v, &day_labels);
    let max_day = summary.by_weekday.iter().copied().max().unwrap_or(0) as u32;

    let mut weekly = ChartBuilder::on(&panels[1])
        .caption("Rides by day of week", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..6u32).into_segmented(), 0u32..headroom(max_day))?;

    weekly
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(7)
        .x_label_formatter(&weekday_label)
        .y_desc("Rides")
        .draw()?;

    weekly.draw_series(
        Histogram::vertical(&weekly)
            .style(GREEN.mix(0.5).filled())
            .margin(8)
            .data(
                summary
                    .by_weekday
                    .iter()
                    .enumerate()
                    .map(|(d, c)| (d as u32, *c as u32)),
            ),
    )?;

    root.present()?;
    Ok(())
}

/// Boxplot per member type and year, with the duration histograms below.
pub fn render_durations(groups: &[DurationGroup], path: &Path, size: (u32, u32)) -> Result<()> {
    debug!(path = %path.display(), groups = groups.len(), "Rendering duration chart");

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((2, 1));

    let labels: Vec<String> = groups.iter().map(DurationGroup::label).collect();
    let group_label = |v: &SegmentValue<u32>| segment_label(v, &labels);
    let last = (groups.len() as u32).saturating_sub(1).max(1);
    let y_max = groups
        .iter()
        .map(|g| g.stats.max)
        .fold(0.0, f64::max)
        .max(1.0) as f32
        * 1.05;

    let mut boxes = ChartBuilder::on(&panels[0])
        .caption("Ride duration by user type and year", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..last).into_segmented(), 0f32..y_max)?;

    boxes
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&group_label)
        .y_desc("Duration (minutes)")
        .draw()?;

    boxes.draw_series(
        groups
            .iter()
            .enumerate()
            .filter(|(_, g)| !g.minutes.is_empty())
            .map(|(i, g)| {
                let quartiles = Quartiles::new(&g.minutes);
                Boxplot::new_vertical(SegmentValue::CenterOf(i as u32), &quartiles)
                    .width(30)
                    .whisker_width(0.5)
                    .style(series_color(i))
            }),
    )?;

    let x_max = groups
        .iter()
        .flat_map(|g| g.histogram.iter().map(|b| b.upper))
        .fold(0.0, f64::max)
        .max(1.0);
    let count_max = groups
        .iter()
        .flat_map(|g| g.histogram.iter().map(|b| b.count))
        .max()
        .unwrap_or(0) as f64;

    let mut hist = ChartBuilder::on(&panels[1])
        .caption("Ride duration distribution", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max, 0f64..(count_max * 1.1).max(1.0))?;

    hist.configure_mesh()
        .x_desc("Duration (minutes)")
        .y_desc("Rides")
        .draw()?;

    for (i, group) in groups.iter().enumerate() {
        let color = series_color(i);
        hist.draw_series(LineSeries::new(
            group
                .histogram
                .iter()
                .map(|b| ((b.lower + b.upper) / 2.0, b.count as f64)),
            color.stroke_width(2),
        ))?
        .label(group.label())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    if !groups.is_empty() {
        hist.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

/// Scatter of distance against duration per equity flag, with fitted lines.
pub fn render_trend(series: &[TrendSeries], path: &Path, size: (u32, u32)) -> Result<()> {
    debug!(path = %path.display(), series = series.len(), "Rendering trend chart");

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let points = || series.iter().flat_map(|s| s.points.iter());
    let x_max = points().map(|p| p.duration_min).fold(0.0, f64::max).max(1.0) * 1.05;
    let y_max = points().map(|p| p.distance_m).fold(0.0, f64::max).max(1.0) * 1.05;

    let mut chart = ChartBuilder::on(&root)
        .caption("Distance vs. duration by equity flag", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Duration (minutes)")
        .y_desc("Distance (m)")
        .draw()?;

    for (i, s) in series.iter().enumerate() {
        let color = series_color(i);
        chart
            .draw_series(
                s.points
                    .iter()
                    .map(|p| {
                        Circle::new((p.duration_min, p.distance_m), 2, color.mix(0.4).filled())
                    }),
            )?
            .label(s.label())
            .legend(move |(x, y)| Circle::new((x + 10, y), 3, color.filled()));

        if let Some(fit) = s.fit {
            chart.draw_series(LineSeries::new(
                [(0.0, fit.predict(0.0)), (x_max, fit.predict(x_max))],
                color.stroke_width(2),
            ))?;
        }
    }

    if !series.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}
