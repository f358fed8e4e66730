//! Chart lifecycle: assembles renderer options and aligned data from a
//! recipe, then creates, updates and resizes the rendered chart.
//!
//! Actual drawing happens behind [`ChartRenderer`]. The dashboard uses
//! [`PlotSpecRenderer`], which produces a serializable [`PlotSpec`] that the
//! browser hands to uPlot.

use crate::recipes::{
    AxisSpec, BandFill, ChartKind, ChartRecipe, Extra, LineStroke, ScaleSpec, Series, StyleSpec,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const DEFAULT_TITLE: &str = "Quarterly Values";
pub const DEFAULT_HEIGHT: u32 = 360;
pub const MIN_WIDTH: u32 = 600;
pub const DEFAULT_PADDING: [u32; 4] = [16, 32, 48, 16];

const PLACEHOLDER_LABELS: [&str; 4] = ["Q1", "Q2", "Q3", "Q4"];
const PLACEHOLDER_VALUES: [f64; 4] = [0.0; 4];

const AXIS_STROKE: &str = "#9ca3af";
const GRID_STROKE: &str = "rgba(148, 163, 184, 0.2)";
const TICK_STROKE: &str = "#d1d5db";

/// `[x indices, ...recipe series]`, all the same length.
pub type AlignedData = Vec<Series>;

/// The element a chart is mounted in. Only its width matters here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Container {
    pub width: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Legend {
    pub show: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub padding: [u32; 4],
    pub legend: Legend,
    pub scales: BTreeMap<String, ScaleSpec>,
    pub axes: Vec<AxisSpec>,
    /// Entry 0 is the x series and carries no styling.
    pub series: Vec<StyleSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bands: Vec<BandFill>,
}

impl ChartOptions {
    fn base(title: &str, width: u32, height: u32) -> Self {
        Self {
            title: title.to_string(),
            width: width.max(MIN_WIDTH),
            height,
            padding: DEFAULT_PADDING,
            legend: Legend { show: true },
            scales: BTreeMap::from([
                (
                    "x".to_string(),
                    ScaleSpec {
                        time: Some(false),
                        ..ScaleSpec::default()
                    },
                ),
                ("y".to_string(), ScaleSpec::default()),
            ]),
            axes: base_axes(),
            series: vec![StyleSpec::default()],
            bands: Vec::new(),
        }
    }

    fn apply(&mut self, extra: Extra) {
        if let Some(bands) = extra.bands {
            self.bands = bands;
        }
        if let Some(scales) = extra.scales {
            self.scales.extend(scales);
        }
        if let Some(axes) = extra.axes {
            self.axes = axes;
        }
    }
}

fn base_axes() -> Vec<AxisSpec> {
    let axis = |label_ticks| AxisSpec {
        stroke: AXIS_STROKE,
        grid: LineStroke { stroke: GRID_STROKE },
        ticks: LineStroke { stroke: TICK_STROKE },
        label_ticks,
    };
    vec![axis(true), axis(false)]
}

/// Label shown under x tick `tick`, or an empty string past either end.
pub fn tick_label(labels: &[String], tick: f64) -> String {
    let idx = tick.round();
    if !idx.is_finite() || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

pub fn labels_to_indices(labels: &[String]) -> Series {
    (0..labels.len()).map(|idx| Some(idx as f64)).collect()
}

pub trait RenderedChart {
    fn set_data(&mut self, data: AlignedData);
    fn set_size(&mut self, width: u32, height: u32);
}

pub trait ChartRenderer {
    type Chart: RenderedChart;

    fn instantiate(&self, options: ChartOptions, data: AlignedData, container: &Container) -> Self::Chart;
}

/// A rendered chart plus what later updates and resizes need to know about it.
#[derive(Debug)]
pub struct ChartHandle<C> {
    chart: C,
    kind: ChartKind,
    height: Option<u32>,
    recipe: &'static ChartRecipe,
    labels: Vec<String>,
}

impl<C> ChartHandle<C> {
    pub fn chart(&self) -> &C {
        &self.chart
    }

    pub fn into_chart(self) -> C {
        self.chart
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }

    pub fn recipe(&self) -> &'static ChartRecipe {
        self.recipe
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn tick_label(&self, tick: f64) -> String {
        tick_label(&self.labels, tick)
    }
}

fn align(recipe: &ChartRecipe, labels: &[String], values: &[f64]) -> (Vec<StyleSpec>, AlignedData, Option<Extra>) {
    let result = recipe.build(labels, values);
    let mut data = Vec::with_capacity(result.data.len() + 1);
    data.push(labels_to_indices(labels));
    data.extend(result.data);
    (result.series, data, result.extra)
}

/// Builds and mounts a chart of `kind` in `container`.
///
/// Empty input is replaced by four zero-valued placeholder quarters so the
/// chart still has axes to draw. An empty `title` falls back to the recipe's
/// own title and an unknown `kind` to `bars`.
pub fn create<R: ChartRenderer>(
    renderer: &R,
    container: &Container,
    labels: &[String],
    values: &[f64],
    title: &str,
    kind: &str,
) -> ChartHandle<R::Chart> {
    let (labels, values) = if labels.is_empty() || values.is_empty() {
        warn!("chart data is empty, using placeholder data");
        (
            PLACEHOLDER_LABELS.iter().map(|label| label.to_string()).collect(),
            PLACEHOLDER_VALUES.to_vec(),
        )
    } else {
        (labels.to_vec(), values.to_vec())
    };

    let kind = ChartKind::resolve(kind);
    let recipe = kind.recipe();
    let title = if title.is_empty() { recipe.title } else { title };

    let mut options = ChartOptions::base(
        title,
        container.width,
        recipe.height.unwrap_or(DEFAULT_HEIGHT),
    );
    let (series, data, extra) = align(recipe, &labels, &values);
    if let Some(extra) = extra {
        options.apply(extra);
    }
    options.series.extend(series);

    debug!(kind = recipe.key, points = labels.len(), "creating chart");
    let chart = renderer.instantiate(options, data, container);

    ChartHandle {
        chart,
        kind,
        height: recipe.height,
        recipe,
        labels,
    }
}

/// Replaces the chart's data in place. `kind` overrides the recipe used for
/// this rebuild only; the handle keeps its original kind.
pub fn update<C: RenderedChart>(handle: &mut ChartHandle<C>, labels: &[String], values: &[f64], kind: Option<&str>) {
    let recipe = kind.map_or(handle.recipe, |key| ChartKind::resolve(key).recipe());
    let (_, data, _) = align(recipe, labels, values);
    handle.labels = labels.to_vec();
    handle.chart.set_data(data);
}

pub fn resize<C: RenderedChart>(handle: Option<&mut ChartHandle<C>>, container: Option<&Container>) {
    let (Some(handle), Some(container)) = (handle, container) else {
        return;
    };
    let width = container.width.max(MIN_WIDTH);
    let height = handle.height.unwrap_or(DEFAULT_HEIGHT);
    handle.chart.set_size(width, height);
}

/// Renderer-ready chart description, serialized for the browser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSpec {
    pub options: ChartOptions,
    pub data: AlignedData,
}

impl RenderedChart for PlotSpec {
    fn set_data(&mut self, data: AlignedData) {
        self.data = data;
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.options.width = width;
        self.options.height = height;
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlotSpecRenderer;

impl ChartRenderer for PlotSpecRenderer {
    type Chart = PlotSpec;

    fn instantiate(&self, options: ChartOptions, data: AlignedData, _container: &Container) -> PlotSpec {
        PlotSpec { options, data }
    }
}
