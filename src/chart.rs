//! Declarative chart description and rasterization.
//!
//! The chart is first built as a serializable [`ChartSpec`] value (marks,
//! orders, layers, title) and only then handed to the plotters backend.
//! Ordering, layering and label rules are testable on the spec alone,
//! without a rendering engine.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use itertools::Itertools;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::Serialize;

use crate::{
    natural::NaturalSortKey,
    table::{CanonicalTable, CombinedTable},
};

const SINGLE_BAR_STEP: u32 = 20;
const COMBINED_BAR_STEP: u32 = 8;
const SINGLE_PLOT_WIDTH: u32 = 600;
const COMBINED_PLOT_WIDTH: u32 = 400;

const Y_LABEL_AREA: u32 = 220;
const X_LABEL_AREA: u32 = 44;
const CAPTION_AREA: u32 = 36;
const MARGIN: u32 = 10;
const CAPTION_FONT: u32 = 16;
const LABEL_FONT: u32 = 11;
const DEPTH_LABEL_FONT: u32 = 10;
const DEPTH_LABEL_X: f64 = 0.01;

const BAR_COLOR: RGBColor = RGBColor(70, 130, 180);

/// Metadata rendered into the chart title. All of it describes how the
/// input sketches were produced; none of it affects the data.
#[derive(Debug, Clone, Serialize)]
pub struct TitleOptions {
    pub prefix: String,
    pub kmer: u32,
    pub scaled: u32,
    pub min_depth: u32,
}

impl TitleOptions {
    fn sketch_params(&self) -> String {
        let mut parts = vec![format!("scaled={}", self.scaled)];
        if self.min_depth > 1 {
            parts.push(format!("min_depth={}", self.min_depth));
        }
        parts.join(", ")
    }

    fn single_title(&self) -> String {
        let prefix = if self.prefix.is_empty() {
            String::new()
        } else {
            format!("{} ", self.prefix)
        };
        format!("{prefix}(k={}, {})", self.kmer, self.sketch_params())
    }

    fn combined_title(&self) -> String {
        format!("k={}, {}", self.kmer, self.sketch_params())
    }
}

/// How the display sort key is derived from a categorical value without a
/// space character. The two historical variants agree whenever a space is
/// present (the key is the substring after the first space) and, for
/// spaceless values, produce the same key by different routes; both are kept
/// so callers relying on the exact rule can pick theirs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortKeyMode {
    /// Spaceless values sort by the whole value.
    AfterSpaceOrWhole,
    /// Spaceless values sort by the run before the first space.
    AfterSpaceOrPrefix,
}

impl Default for SortKeyMode {
    fn default() -> Self {
        SortKeyMode::AfterSpaceOrWhole
    }
}

fn sort_value(value: &str, mode: SortKeyMode) -> &str {
    match value.split_once(' ') {
        Some((_, rest)) => rest,
        None => match mode {
            SortKeyMode::AfterSpaceOrWhole => value,
            SortKeyMode::AfterSpaceOrPrefix => value.split(' ').next().unwrap_or(value),
        },
    }
}

/// The display form of an identifier in combined mode: the free-text part
/// after the accession, or the identifier unchanged when it has no space.
fn short_name(name: &str) -> &str {
    match name.split_once(' ') {
        Some((_, rest)) => rest,
        None => name,
    }
}

fn depth_label(median_abund: Option<f64>) -> String {
    match median_abund {
        Some(value) => format!("med(depth): {value:.0}"),
        None => "med(depth): 0".to_string(),
    }
}

/// The score axis: fixed [0,1] containment domain regardless of the data.
#[derive(Debug, Serialize)]
pub struct ValueAxis {
    pub label: &'static str,
    pub domain: (f64, f64),
}

impl ValueAxis {
    fn containment() -> Self {
        ValueAxis {
            label: "Containment",
            domain: (0.0, 1.0),
        }
    }
}

/// One horizontal bar. `sample` is set in combined mode only.
#[derive(Debug, Serialize)]
pub struct BarMark {
    pub category: String,
    pub value: f64,
    pub sample: Option<String>,
}

/// One depth label, drawn at the score-axis origin of its bar.
#[derive(Debug, Serialize)]
pub struct TextMark {
    pub category: String,
    pub sample: Option<String>,
    pub label: String,
}

/// Declarative description of the finished chart.
#[derive(Debug, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub value_axis: ValueAxis,
    /// Categorical axis order, top to bottom.
    pub categories: Vec<String>,
    /// Sample order shared by color, offset and legend; empty in single mode.
    pub samples: Vec<String>,
    pub bars: Vec<BarMark>,
    /// Present exactly when the table carries `median_abund`.
    pub depth_labels: Option<Vec<TextMark>>,
    /// Vertical pixels per bar slot, before resolution scaling.
    pub bar_step: u32,
    /// Plot body width in pixels, before resolution scaling.
    pub plot_width: u32,
}

/// Builds the single-table chart: one bar per row keyed by the full
/// identifier, rows ordered naturally by the derived sort key.
pub fn single(table: &CanonicalTable, title: &TitleOptions, mode: SortKeyMode) -> ChartSpec {
    let mut order: Vec<usize> = (0..table.rows.len()).collect();
    order.sort_by_cached_key(|&index| {
        NaturalSortKey::new(sort_value(&table.rows[index].query_name, mode))
    });

    let categories: Vec<String> = order
        .iter()
        .map(|&index| table.rows[index].query_name.clone())
        .unique()
        .collect();
    let bars = order
        .iter()
        .map(|&index| {
            let row = &table.rows[index];
            BarMark {
                category: row.query_name.clone(),
                value: row.containment,
                sample: None,
            }
        })
        .collect();
    let depth_labels = table.has_median_abund.then(|| {
        order
            .iter()
            .map(|&index| {
                let row = &table.rows[index];
                TextMark {
                    category: row.query_name.clone(),
                    sample: None,
                    label: depth_label(row.median_abund),
                }
            })
            .collect()
    });

    ChartSpec {
        title: title.single_title(),
        value_axis: ValueAxis::containment(),
        categories,
        samples: Vec::new(),
        bars,
        depth_labels,
        bar_step: SINGLE_BAR_STEP,
        plot_width: SINGLE_PLOT_WIDTH,
    }
}

/// Builds the multi-sample chart: bars keyed by short identifier, offset
/// into adjacent sub-bars per sample, one color per sample. Category,
/// sample and row orders all come from [`NaturalSortKey`].
pub fn combined(table: &CombinedTable, title: &TitleOptions) -> ChartSpec {
    let mut order: Vec<usize> = (0..table.rows.len()).collect();
    order.sort_by_cached_key(|&index| {
        let combined = &table.rows[index];
        (
            NaturalSortKey::new(short_name(&combined.row.query_name)),
            NaturalSortKey::new(&combined.barcode),
        )
    });

    let categories: Vec<String> = order
        .iter()
        .map(|&index| short_name(&table.rows[index].row.query_name).to_string())
        .unique()
        .collect();
    let samples: Vec<String> = table
        .rows
        .iter()
        .map(|combined| combined.barcode.clone())
        .unique()
        .sorted_by_cached_key(|barcode| NaturalSortKey::new(barcode))
        .collect();
    let bars = order
        .iter()
        .map(|&index| {
            let combined = &table.rows[index];
            BarMark {
                category: short_name(&combined.row.query_name).to_string(),
                value: combined.row.containment,
                sample: Some(combined.barcode.clone()),
            }
        })
        .collect();
    let depth_labels = table.has_median_abund.then(|| {
        order
            .iter()
            .map(|&index| {
                let combined = &table.rows[index];
                TextMark {
                    category: short_name(&combined.row.query_name).to_string(),
                    sample: Some(combined.barcode.clone()),
                    label: depth_label(combined.row.median_abund),
                }
            })
            .collect()
    });

    ChartSpec {
        title: title.combined_title(),
        value_axis: ValueAxis::containment(),
        categories,
        samples,
        bars,
        depth_labels,
        bar_step: COMBINED_BAR_STEP,
        plot_width: COMBINED_PLOT_WIDTH,
    }
}

/// Rasterizes a spec to a PNG at `path`. `scale_factor` multiplies every
/// pixel dimension and font size.
pub fn render(spec: &ChartSpec, path: &Path, scale_factor: u32) -> Result<()> {
    let scale = scale_factor.max(1);
    let sample_count = spec.samples.len().max(1);
    let slot_count = (spec.categories.len() * sample_count).max(1) as i32;

    let bar_placements = spec
        .bars
        .iter()
        .map(|bar| slot_of(spec, &bar.category, bar.sample.as_deref()).map(|slot| (slot, bar)))
        .collect::<Result<Vec<_>>>()?;

    let width = (spec.plot_width + Y_LABEL_AREA + 2 * MARGIN) * scale;
    let height = (slot_count as u32 * spec.bar_step + X_LABEL_AREA + CAPTION_AREA + 2 * MARGIN)
        * scale;

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE).context("Filling chart background")?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, ("sans-serif", (CAPTION_FONT * scale) as i32))
        .margin(MARGIN * scale)
        .x_label_area_size(X_LABEL_AREA * scale)
        .y_label_area_size(Y_LABEL_AREA * scale)
        .build_cartesian_2d(
            spec.value_axis.domain.0..spec.value_axis.domain.1,
            (0..slot_count).into_segmented(),
        )
        .context("Building chart coordinate system")?;

    let categories = spec.categories.clone();
    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc(spec.value_axis.label)
        .label_style(("sans-serif", (LABEL_FONT * scale) as i32))
        .y_labels(slot_count as usize)
        .y_label_formatter(&move |value| {
            slot_axis_label(&categories, sample_count, slot_count, value)
        })
        .draw()
        .context("Drawing chart axes")?;

    if spec.samples.is_empty() {
        chart
            .draw_series(bar_placements.iter().map(|(slot, bar)| {
                Rectangle::new(
                    [
                        (0.0, SegmentValue::Exact(*slot)),
                        (bar.value, SegmentValue::Exact(*slot + 1)),
                    ],
                    BAR_COLOR.filled(),
                )
            }))
            .context("Drawing bars")?;
    } else {
        for (sample_index, sample) in spec.samples.iter().enumerate() {
            let color = Palette99::pick(sample_index).mix(0.9);
            chart
                .draw_series(
                    bar_placements
                        .iter()
                        .filter(|(_, bar)| bar.sample.as_deref() == Some(sample.as_str()))
                        .map(|(slot, bar)| {
                            Rectangle::new(
                                [
                                    (0.0, SegmentValue::Exact(*slot)),
                                    (bar.value, SegmentValue::Exact(*slot + 1)),
                                ],
                                color.filled(),
                            )
                        }),
                )
                .with_context(|| format!("Drawing bars for sample '{sample}'"))?
                .label(sample.as_str())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                });
        }
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .context("Drawing sample legend")?;
    }

    if let Some(labels) = &spec.depth_labels {
        let label_placements = labels
            .iter()
            .map(|mark| {
                slot_of(spec, &mark.category, mark.sample.as_deref()).map(|slot| (slot, mark))
            })
            .collect::<Result<Vec<_>>>()?;
        let style = ("sans-serif", (DEPTH_LABEL_FONT * scale) as i32)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Left, VPos::Center));
        chart
            .draw_series(label_placements.iter().map(|(slot, mark)| {
                Text::new(
                    mark.label.clone(),
                    (DEPTH_LABEL_X, SegmentValue::CenterOf(*slot)),
                    style.clone(),
                )
            }))
            .context("Drawing depth labels")?;
    }

    root.present()
        .with_context(|| format!("Rasterizing chart to {path:?}"))?;
    Ok(())
}

/// Maps a (category, sample) pair to its bar slot, counted from the bottom
/// of the chart so that the first category renders at the top.
fn slot_of(spec: &ChartSpec, category: &str, sample: Option<&str>) -> Result<i32> {
    let category_index = spec
        .categories
        .iter()
        .position(|candidate| candidate == category)
        .ok_or_else(|| anyhow!("Category '{category}' missing from axis order"))?;
    let sample_count = spec.samples.len().max(1);
    let member = match sample {
        Some(sample) => spec
            .samples
            .iter()
            .position(|candidate| candidate == sample)
            .ok_or_else(|| anyhow!("Sample '{sample}' missing from sample order"))?,
        None => 0,
    };
    let position = category_index * sample_count + member;
    let slot_count = (spec.categories.len() * sample_count).max(1);
    Ok((slot_count - 1 - position) as i32)
}

/// Axis label for one bar slot: the category name at the middle sub-bar of
/// its group, empty everywhere else.
fn slot_axis_label(
    categories: &[String],
    sample_count: usize,
    slot_count: i32,
    value: &SegmentValue<i32>,
) -> String {
    let slot = match value {
        SegmentValue::Exact(slot) | SegmentValue::CenterOf(slot) => *slot,
        SegmentValue::Last => return String::new(),
    };
    if slot < 0 || slot >= slot_count {
        return String::new();
    }
    let position = (slot_count - 1 - slot) as usize;
    let category_index = position / sample_count;
    let member = position % sample_count;
    if member == (sample_count - 1) / 2 {
        categories.get(category_index).cloned().unwrap_or_default()
    } else {
        String::new()
    }
}
