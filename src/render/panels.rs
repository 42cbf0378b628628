//! One drawing routine per kind of panel. Every routine draws into its own
//! grid cell and styles text for the dark background.

use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::colormap::magma_scaled;
use super::theme::{
    big_text_font, label_font, title_font, BACKGROUND, BAR_COLORS, FOREGROUND, WAVEFORM,
};
use crate::audio::features::BandEnergy;

pub type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

const COLORBAR_WIDTH: i32 = 80;
const COLORBAR_STEPS: usize = 64;
const MAX_COLUMNS: usize = 600;
const SPECTROGRAM_ROWS: usize = 200;
const WAVEFORM_POINTS: usize = 4000;

pub struct Labels {
    pub title: &'static str,
    pub x_desc: Option<&'static str>,
    pub y_desc: Option<&'static str>,
}

pub fn draw_waveform(area: &Area, samples: &[f32], sample_rate: u32, labels: &Labels) -> Result<()> {
    let duration = (samples.len() as f32 / sample_rate as f32).max(1.0 / sample_rate as f32);
    let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs())).max(1e-3) * 1.05;

    let mut chart = ChartBuilder::on(area)
        .caption(labels.title, title_font())
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(60)
        .build_cartesian_2d(0f32..duration, -peak..peak)?;

    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh()
        .axis_style(&FOREGROUND)
        .label_style(label_font())
        .axis_desc_style(label_font());
    if let Some(x) = labels.x_desc {
        mesh.x_desc(x);
    }
    if let Some(y) = labels.y_desc {
        mesh.y_desc(y);
    }
    mesh.draw()?;

    chart.draw_series(LineSeries::new(
        envelope(samples, sample_rate, WAVEFORM_POINTS),
        &WAVEFORM,
    ))?;
    Ok(())
}

/// Log-frequency heatmap of a frame-major dB spectrogram with a dB colorbar.
pub fn draw_spectrogram(
    area: &Area,
    spectrogram_db: &[Vec<f32>],
    frequencies: &[f32],
    frame_step: f32,
    labels: &Labels,
) -> Result<()> {
    let (plot_area, bar_area) = split_colorbar(area);
    let bin_width = frequencies.get(1).copied().unwrap_or(1.0);
    let top = frequencies.last().copied().unwrap_or(1.0) + bin_width / 2.0;
    let bottom = bin_width / 2.0;
    let rows = log_rows(frequencies.len(), bin_width, bottom, top, SPECTROGRAM_ROWS);

    let (columns, column_width) = pool_columns(spectrogram_db, frame_step, MAX_COLUMNS);
    let (min, max) = value_range(spectrogram_db.iter().flatten().copied());
    let x_max = (columns.len() as f32 * column_width).max(frame_step);

    let mut chart = ChartBuilder::on(&plot_area)
        .caption(labels.title, title_font())
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(60)
        .build_cartesian_2d(0f32..x_max, (bottom..top).log_scale())?;

    let freq_label = |y: &f32| format!("{:.0}", y);
    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh()
        .axis_style(&FOREGROUND)
        .label_style(label_font())
        .axis_desc_style(label_font())
        .y_label_formatter(&freq_label);
    if let Some(x) = labels.x_desc {
        mesh.x_desc(x);
    }
    if let Some(y) = labels.y_desc {
        mesh.y_desc(y);
    }
    mesh.draw()?;

    chart.draw_series(columns.iter().enumerate().flat_map(|(c, column)| {
        let x0 = c as f32 * column_width;
        let x1 = x0 + column_width;
        rows.iter().map(move |row| {
            let value = column[row.bins.clone()]
                .iter()
                .copied()
                .fold(f32::NEG_INFINITY, f32::max);
            Rectangle::new(
                [(x0, row.low), (x1, row.high)],
                magma_scaled(value, min, max).filled(),
            )
        })
    }))?;

    draw_colorbar(&bar_area, min, max, &|v| format!("{:+2.0} dB", v))
}

/// Heatmap of a frame-major matrix with one row per coefficient, optionally
/// naming each row.
pub fn draw_matrix(
    area: &Area,
    matrix: &[Vec<f32>],
    frame_step: f32,
    row_names: Option<&[&str]>,
    labels: &Labels,
) -> Result<()> {
    let (plot_area, bar_area) = split_colorbar(area);
    let n_rows = matrix.first().map_or(1, |f| f.len()).max(1);
    let (columns, column_width) = pool_columns(matrix, frame_step, MAX_COLUMNS);
    let (min, max) = value_range(matrix.iter().flatten().copied());
    let x_max = (columns.len() as f32 * column_width).max(frame_step);

    let mut chart = ChartBuilder::on(&plot_area)
        .caption(labels.title, title_font())
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(60)
        .build_cartesian_2d(0f32..x_max, -0.5f32..(n_rows as f32 - 0.5))?;

    // Row r spans [r - 0.5, r + 0.5], so integer ticks sit on row centers.
    let row_label = |y: &f32| {
        let r = y.round();
        if (y - r).abs() > 1e-3 || r < 0.0 || r as usize >= n_rows {
            return String::new();
        }
        match row_names {
            Some(names) => names.get(r as usize).map(|n| n.to_string()).unwrap_or_default(),
            None => format!("{}", r as usize),
        }
    };
    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh()
        .axis_style(&FOREGROUND)
        .label_style(label_font())
        .axis_desc_style(label_font())
        .y_labels(n_rows)
        .y_label_formatter(&row_label);
    if let Some(x) = labels.x_desc {
        mesh.x_desc(x);
    }
    if let Some(y) = labels.y_desc {
        mesh.y_desc(y);
    }
    mesh.draw()?;

    chart.draw_series(columns.iter().enumerate().flat_map(move |(c, column)| {
        let x0 = c as f32 * column_width;
        let x1 = x0 + column_width;
        column.iter().enumerate().map(move |(r, &v)| {
            Rectangle::new(
                [(x0, r as f32 - 0.5), (x1, r as f32 + 0.5)],
                magma_scaled(v, min, max).filled(),
            )
        })
    }))?;

    draw_colorbar(&bar_area, min, max, &|v| format!("{:.1}", v))
}

pub fn draw_curve(
    area: &Area,
    points: &[(f32, f32)],
    color: RGBColor,
    legend: Option<&str>,
    labels: &Labels,
) -> Result<()> {
    let x_max = points.last().map_or(1.0, |p| p.0).max(1e-3);
    let (lo, hi) = value_range(points.iter().map(|p| p.1));
    let pad = (hi - lo) * 0.05;

    let mut chart = ChartBuilder::on(area)
        .caption(labels.title, title_font())
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(60)
        .build_cartesian_2d(0f32..x_max, (lo - pad)..(hi + pad))?;

    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh()
        .axis_style(&FOREGROUND)
        .label_style(label_font())
        .axis_desc_style(label_font());
    if let Some(x) = labels.x_desc {
        mesh.x_desc(x);
    }
    if let Some(y) = labels.y_desc {
        mesh.y_desc(y);
    }
    mesh.draw()?;

    let series = chart.draw_series(LineSeries::new(points.iter().copied(), &color))?;
    if let Some(name) = legend {
        series
            .label(name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&BACKGROUND)
            .border_style(&FOREGROUND)
            .label_font(label_font())
            .draw()?;
    }
    Ok(())
}

pub fn tempo_label(tempo_bpm: f32) -> String {
    format!("Tempo: {:.2} BPM", tempo_bpm)
}

/// A titled cell with the tempo as centered text and no axes.
pub fn draw_tempo(area: &Area, tempo_bpm: f32, title: &str) -> Result<()> {
    let inner = area.titled(title, title_font())?;
    let (w, h) = inner.dim_in_pixel();
    inner.draw(&Rectangle::new(
        [(10, 0), (w as i32 - 10, h as i32 - 10)],
        FOREGROUND.stroke_width(1),
    ))?;
    let style = big_text_font().pos(Pos::new(HPos::Center, VPos::Center));
    inner.draw_text(&tempo_label(tempo_bpm), &style, (w as i32 / 2, h as i32 / 2))?;
    Ok(())
}

pub fn draw_band_energy(area: &Area, bands: &BandEnergy, labels: &Labels) -> Result<()> {
    let values = [bands.bass, bands.mid, bands.treble];
    let names = ["Bass", "Midrange", "Treble"];
    let lowest = values.iter().copied().fold(0.0f32, f32::min);
    let highest = values.iter().copied().fold(0.0f32, f32::max);

    let mut chart = ChartBuilder::on(area)
        .caption(labels.title, title_font())
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(60)
        .build_cartesian_2d(0f32..3f32, (lowest - 5.0)..(highest + 10.0))?;

    let no_label = |_: &f32| String::new();
    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh()
        .axis_style(&FOREGROUND)
        .label_style(label_font())
        .axis_desc_style(label_font())
        .x_label_formatter(&no_label);
    if let Some(y) = labels.y_desc {
        mesh.y_desc(y);
    }
    mesh.draw()?;

    chart.draw_series(values.iter().zip(BAR_COLORS.iter()).enumerate().map(
        |(i, (&v, color))| {
            Rectangle::new([(i as f32 + 0.15, 0.0), (i as f32 + 0.85, v)], color.filled())
        },
    ))?;
    chart.draw_series(LineSeries::new(vec![(0.0, 0.0), (3.0, 0.0)], &FOREGROUND))?;

    let name_style = label_font().pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(values.iter().zip(names).enumerate().map(|(i, (&v, name))| {
        Text::new(name, (i as f32 + 0.5, v.max(0.0) + 1.0), name_style.clone())
    }))?;
    Ok(())
}

fn split_colorbar<'a>(area: &Area<'a>) -> (Area<'a>, Area<'a>) {
    let (w, _) = area.dim_in_pixel();
    area.split_horizontally(w as i32 - COLORBAR_WIDTH)
}

fn draw_colorbar(area: &Area, min: f32, max: f32, format: &dyn Fn(f32) -> String) -> Result<()> {
    let mut chart = ChartBuilder::on(area)
        .margin_top(40)
        .margin_bottom(45)
        .margin_right(5)
        .right_y_label_area_size(60)
        .build_cartesian_2d(0f32..1f32, min..max)?;

    let tick_label = |v: &f32| format(*v);
    chart
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .axis_style(&FOREGROUND)
        .label_style(label_font())
        .y_labels(5)
        .y_label_formatter(&tick_label)
        .draw()?;

    let step = (max - min) / COLORBAR_STEPS as f32;
    chart.draw_series((0..COLORBAR_STEPS).map(|i| {
        let v0 = min + step * i as f32;
        Rectangle::new(
            [(0.0, v0), (1.0, v0 + step)],
            magma_scaled(v0 + step / 2.0, min, max).filled(),
        )
    }))?;
    Ok(())
}

/// Alternating (min, max) points per bucket so the line fills the envelope.
fn envelope(samples: &[f32], sample_rate: u32, max_points: usize) -> Vec<(f32, f32)> {
    let buckets = (max_points / 2).max(1);
    let size = samples.len().div_ceil(buckets).max(1);
    samples
        .chunks(size)
        .enumerate()
        .flat_map(|(i, chunk)| {
            let t = (i * size) as f32 / sample_rate as f32;
            let (lo, hi) = chunk
                .iter()
                .fold((f32::MAX, f32::MIN), |(lo, hi), &s| (lo.min(s), hi.max(s)));
            [(t, lo), (t, hi)]
        })
        .collect()
}

/// Average consecutive frames so at most `max_columns` remain. Returns the
/// pooled columns and the time span of each.
fn pool_columns(matrix: &[Vec<f32>], frame_step: f32, max_columns: usize) -> (Vec<Vec<f32>>, f32) {
    let group = matrix.len().div_ceil(max_columns.max(1)).max(1);
    let columns = matrix
        .chunks(group)
        .map(|chunk| {
            let rows = chunk[0].len();
            (0..rows)
                .map(|r| chunk.iter().map(|frame| frame[r]).sum::<f32>() / chunk.len() as f32)
                .collect()
        })
        .collect();
    (columns, frame_step * group as f32)
}

struct LogRow {
    low: f32,
    high: f32,
    bins: std::ops::Range<usize>,
}

/// Split `[bottom, top)` into `n_rows` geometric bands, each backed by the
/// bins whose centers fall inside it, or by the nearest bin when none do.
/// Bin 0 (DC) is never used since it has no place on a log axis.
fn log_rows(n_bins: usize, bin_width: f32, bottom: f32, top: f32, n_rows: usize) -> Vec<LogRow> {
    if n_bins < 2 {
        return Vec::new();
    }
    let ratio = top / bottom;
    let edge = |i: usize| bottom * ratio.powf(i as f32 / n_rows as f32);

    (0..n_rows)
        .map(|i| {
            let (low, high) = (edge(i), edge(i + 1));
            let start = ((low / bin_width).ceil() as usize).max(1);
            let end = ((high / bin_width).ceil() as usize).min(n_bins);
            let bins = if start < end {
                start..end
            } else {
                let nearest = (((low * high).sqrt() / bin_width).round() as usize).clamp(1, n_bins - 1);
                nearest..nearest + 1
            };
            LogRow { low, high, bins }
        })
        .collect()
}

fn value_range(values: impl Iterator<Item = f32>) -> (f32, f32) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if hi - lo < 1e-6 {
        return (lo - 1.0, hi + 1.0);
    }
    (lo, hi)
}
