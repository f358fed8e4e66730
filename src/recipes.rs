//! The fixed catalog of quarterly chart kinds.
//!
//! Each [`ChartKind`] has one [`ChartRecipe`] entry in a static table, in the
//! order the dashboard lists them. A recipe turns `(labels, values)` into
//! series styling for the browser renderer plus index-aligned data arrays.

use crate::models::ChartMeta;
use crate::transform::{self, DEFAULT_MARGIN, DEFAULT_WINDOW};
use serde::Serialize;
use std::collections::BTreeMap;

/// One value per label; `None` marks an index with no value.
pub type Series = Vec<Option<f64>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Bars,
    Line,
    Area,
    Scatter,
    Step,
    Spline,
    Cumulative,
    MovingAverage,
    Range,
    Delta,
}

impl ChartKind {
    pub const ALL: [ChartKind; 10] = [
        ChartKind::Bars,
        ChartKind::Line,
        ChartKind::Area,
        ChartKind::Scatter,
        ChartKind::Step,
        ChartKind::Spline,
        ChartKind::Cumulative,
        ChartKind::MovingAverage,
        ChartKind::Range,
        ChartKind::Delta,
    ];

    pub const DEFAULT: ChartKind = ChartKind::Bars;

    pub fn key(self) -> &'static str {
        self.recipe().key
    }

    pub fn from_key(key: &str) -> Option<Self> {
        RECIPES.iter().find(|recipe| recipe.key == key).map(|recipe| recipe.kind)
    }

    /// Like [`ChartKind::from_key`], but unknown keys resolve to [`ChartKind::Bars`].
    pub fn resolve(key: &str) -> Self {
        Self::from_key(key).unwrap_or(Self::DEFAULT)
    }

    pub fn recipe(self) -> &'static ChartRecipe {
        &RECIPES[self as usize]
    }
}

#[derive(Debug)]
pub struct ChartRecipe {
    pub kind: ChartKind,
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub height: Option<u32>,
}

static RECIPES: [ChartRecipe; 10] = [
    ChartRecipe {
        kind: ChartKind::Bars,
        key: "bars",
        title: "Quarterly Values · Column",
        description: "Baseline columnar view of raw quarterly values.",
        height: None,
    },
    ChartRecipe {
        kind: ChartKind::Line,
        key: "line",
        title: "Quarterly Trend · Line",
        description: "Simple line chart to highlight quarter-to-quarter momentum.",
        height: None,
    },
    ChartRecipe {
        kind: ChartKind::Area,
        key: "area",
        title: "Quarterly Total · Area",
        description: "Line with a soft fill to emphasize magnitude across the quarters.",
        height: None,
    },
    ChartRecipe {
        kind: ChartKind::Scatter,
        key: "scatter",
        title: "Quarterly Distribution · Scatter",
        description: "Points-only scatter plot showing distribution without connective lines.",
        height: None,
    },
    ChartRecipe {
        kind: ChartKind::Step,
        key: "step",
        title: "Quarterly Changes · Step",
        description: "Step chart to underscore discrete quarter-to-quarter shifts.",
        height: None,
    },
    ChartRecipe {
        kind: ChartKind::Spline,
        key: "spline",
        title: "Quarterly Trend · Spline",
        description: "Smoothed spline interpolation for a softer visual trajectory.",
        height: Some(320),
    },
    ChartRecipe {
        kind: ChartKind::Cumulative,
        key: "cumulative",
        title: "Cumulative Performance · Line",
        description: "Running total layered over the raw quarterly values.",
        height: None,
    },
    ChartRecipe {
        kind: ChartKind::MovingAverage,
        key: "moving-average",
        title: "Smoothed Trend · Moving Average",
        description: "Three-quarter moving average contrasted against the actual values.",
        height: None,
    },
    ChartRecipe {
        kind: ChartKind::Range,
        key: "range",
        title: "Forecast Envelope · Range Band",
        description: "Confidence-style envelope built from ±5 units around the actuals.",
        height: None,
    },
    ChartRecipe {
        kind: ChartKind::Delta,
        key: "delta",
        title: "Quarter-over-Quarter Delta · Diverging Bars",
        description: "Positive and negative changes separated to spotlight acceleration or slowdowns.",
        height: None,
    },
];

/// Recipe for `key`, falling back to `bars` for anything unregistered.
pub fn lookup(key: &str) -> &'static ChartRecipe {
    ChartKind::resolve(key).recipe()
}

pub fn catalog() -> Vec<ChartMeta> {
    RECIPES
        .iter()
        .map(|recipe| ChartMeta {
            key: recipe.key,
            title: recipe.title,
            description: recipe.description,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointStyle {
    pub show: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

/// How the browser renderer draws the path between points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PathStyle {
    /// `size` is `[fraction of slot, max px]`; a `None` max is unbounded.
    Bars { size: (f64, Option<f64>), align: i8 },
    Points,
    Stepped { align: i8 },
    Spline,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSpec {
    #[serde(skip_serializing_if = "str::is_empty")]
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<PointStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<PathStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_gaps: Option<bool>,
}

impl StyleSpec {
    pub fn labeled(label: &'static str) -> Self {
        Self {
            label,
            ..Self::default()
        }
    }

    pub fn stroke(mut self, stroke: &'static str) -> Self {
        self.stroke = Some(stroke);
        self
    }

    pub fn fill(mut self, fill: &'static str) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn dash(mut self, on: f64, off: f64) -> Self {
        self.dash = Some([on, off]);
        self
    }

    pub fn points(mut self, size: f64) -> Self {
        self.points = Some(PointStyle {
            show: true,
            size: Some(size),
        });
        self
    }

    pub fn hide_points(mut self) -> Self {
        self.points = Some(PointStyle {
            show: false,
            size: None,
        });
        self
    }

    pub fn paths(mut self, paths: PathStyle) -> Self {
        self.paths = Some(paths);
        self
    }

    pub fn span_gaps(mut self, span: bool) -> Self {
        self.span_gaps = Some(span);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandFill {
    pub series: [usize; 2],
    pub fill: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScaleSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distr: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStroke {
    pub stroke: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisSpec {
    pub stroke: &'static str,
    pub grid: LineStroke,
    pub ticks: LineStroke,
    /// Tick values are indices into the chart labels rather than raw numbers.
    pub label_ticks: bool,
}

/// Optional renderer configuration a recipe layers over the base options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extra {
    pub bands: Option<Vec<BandFill>>,
    pub scales: Option<BTreeMap<String, ScaleSpec>>,
    pub axes: Option<Vec<AxisSpec>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeResult {
    pub series: Vec<StyleSpec>,
    pub data: Vec<Series>,
    pub extra: Option<Extra>,
}

const BAR_SIZE: (f64, Option<f64>) = (0.6, None);
const DELTA_BAR_SIZE: (f64, Option<f64>) = (0.4, None);

fn plain(values: &[f64]) -> Series {
    values.iter().copied().map(Some).collect()
}

impl ChartRecipe {
    /// Builds series styling and data for `values`. Every returned data
    /// series has `values.len()` entries.
    pub fn build(&self, _labels: &[String], values: &[f64]) -> RecipeResult {
        let single = |style: StyleSpec| RecipeResult {
            series: vec![style],
            data: vec![plain(values)],
            extra: None,
        };

        match self.kind {
            ChartKind::Bars => single(
                StyleSpec::labeled("Value")
                    .span_gaps(false)
                    .paths(PathStyle::Bars {
                        size: BAR_SIZE,
                        align: 0,
                    })
                    .fill("rgba(37, 99, 235, 0.35)")
                    .stroke("#2563eb")
                    .hide_points(),
            ),
            ChartKind::Line => single(StyleSpec::labeled("Value").stroke("#2563eb").width(2.0).points(8.0)),
            ChartKind::Area => single(
                StyleSpec::labeled("Value")
                    .stroke("#7c3aed")
                    .width(2.0)
                    .fill("rgba(124, 58, 237, 0.25)")
                    .points(6.0),
            ),
            ChartKind::Scatter => single(
                StyleSpec::labeled("Value")
                    .stroke("#16a34a")
                    .width(0.0)
                    .points(9.0)
                    .paths(PathStyle::Points),
            ),
            ChartKind::Step => single(
                StyleSpec::labeled("Value")
                    .stroke("#dc2626")
                    .width(2.0)
                    .paths(PathStyle::Stepped { align: 1 })
                    .points(6.0),
            ),
            ChartKind::Spline => single(
                StyleSpec::labeled("Value")
                    .stroke("#ea580c")
                    .width(2.0)
                    .paths(PathStyle::Spline)
                    .hide_points(),
            ),
            ChartKind::Cumulative => RecipeResult {
                series: vec![
                    StyleSpec::labeled("Quarterly").stroke("#2563eb").width(2.0).points(6.0),
                    StyleSpec::labeled("Cumulative")
                        .stroke("#0f766e")
                        .width(2.0)
                        .dash(10.0, 6.0)
                        .points(6.0),
                ],
                data: vec![plain(values), plain(&transform::cumulative_sum(values))],
                extra: None,
            },
            ChartKind::MovingAverage => RecipeResult {
                series: vec![
                    StyleSpec::labeled("Quarterly").stroke("#1d4ed8").width(2.0).points(6.0),
                    StyleSpec::labeled("3Q Moving Avg")
                        .stroke("#9333ea")
                        .width(2.0)
                        .dash(6.0, 4.0)
                        .hide_points(),
                ],
                data: vec![
                    plain(values),
                    plain(&transform::moving_average(values, DEFAULT_WINDOW)),
                ],
                extra: None,
            },
            ChartKind::Range => {
                let envelope = transform::band(values, DEFAULT_MARGIN);
                RecipeResult {
                    series: vec![
                        StyleSpec::labeled("Lower").stroke("transparent"),
                        StyleSpec::labeled("Upper").stroke("transparent"),
                        StyleSpec::labeled("Actual").stroke("#2563eb").width(2.0).points(6.0),
                    ],
                    data: vec![plain(&envelope.lower), plain(&envelope.upper), plain(values)],
                    extra: Some(Extra {
                        bands: Some(vec![BandFill {
                            series: [1, 2],
                            fill: "rgba(59, 130, 246, 0.12)",
                        }]),
                        ..Extra::default()
                    }),
                }
            }
            ChartKind::Delta => {
                let change = transform::signed_delta(values);
                let bars = PathStyle::Bars {
                    size: DELTA_BAR_SIZE,
                    align: 0,
                };
                RecipeResult {
                    series: vec![
                        StyleSpec::labeled("Gains")
                            .paths(bars)
                            .fill("rgba(22, 163, 74, 0.35)")
                            .stroke("#16a34a"),
                        StyleSpec::labeled("Losses")
                            .paths(bars)
                            .fill("rgba(220, 38, 38, 0.35)")
                            .stroke("#dc2626"),
                    ],
                    data: vec![change.gains, change.losses],
                    extra: Some(Extra {
                        scales: Some(BTreeMap::from([(
                            "y".to_string(),
                            ScaleSpec {
                                distr: Some(1),
                                ..ScaleSpec::default()
                            },
                        )])),
                        ..Extra::default()
                    }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|idx| format!("Q{} {}", idx % 4 + 1, 2020 + idx / 4)).collect()
    }

    #[test]
    fn table_is_indexed_by_kind() {
        for kind in ChartKind::ALL {
            assert_eq!(kind.recipe().kind, kind);
            assert_eq!(ChartKind::from_key(kind.key()), Some(kind));
        }
    }

    #[test]
    fn every_recipe_keeps_alignment() {
        let values = [12.0, 7.5, 30.0, 2.0, 2.0, 41.25];
        for n in [0, 1, 2, values.len()] {
            let labels = labels(n);
            for kind in ChartKind::ALL {
                let result = kind.recipe().build(&labels, &values[..n]);
                assert_eq!(result.series.len(), result.data.len(), "{}", kind.key());
                assert!(result.data.iter().all(|series| series.len() == n), "{}", kind.key());
            }
        }
    }

    #[test]
    fn unknown_key_resolves_to_bars() {
        let fallback = lookup("nonexistent");
        let bars = lookup("bars");
        assert!(std::ptr::eq(fallback, bars));

        let values = [1.0, 2.0];
        assert_eq!(
            fallback.build(&labels(2), &values),
            bars.build(&labels(2), &values)
        );
    }

    #[test]
    fn catalog_lists_registration_order() {
        let keys: Vec<&str> = catalog().iter().map(|meta| meta.key).collect();
        assert_eq!(
            keys,
            [
                "bars",
                "line",
                "area",
                "scatter",
                "step",
                "spline",
                "cumulative",
                "moving-average",
                "range",
                "delta"
            ]
        );
    }

    #[test]
    fn only_spline_overrides_height() {
        for kind in ChartKind::ALL {
            let expected = (kind == ChartKind::Spline).then_some(320);
            assert_eq!(kind.recipe().height, expected);
        }
    }

    #[test]
    fn moving_average_series_uses_three_quarter_window() {
        let result = lookup("moving-average").build(&labels(4), &[3.0, 5.0, 2.0, 9.0]);
        assert_eq!(result.data[1], vec![Some(3.0), Some(4.0), Some(3.33), Some(5.33)]);
    }

    #[test]
    fn range_orders_lower_upper_actual() {
        let result = lookup("range").build(&labels(2), &[2.0, 20.0]);
        assert_eq!(result.data[0], vec![Some(0.0), Some(15.0)]);
        assert_eq!(result.data[1], vec![Some(7.0), Some(25.0)]);
        assert_eq!(result.data[2], vec![Some(2.0), Some(20.0)]);
        let bands = result.extra.and_then(|extra| extra.bands).expect("range has a band");
        assert_eq!(bands[0].series, [1, 2]);
    }

    #[test]
    fn delta_splits_into_gains_and_losses() {
        let result = lookup("delta").build(&labels(3), &[10.0, 7.0, 9.0]);
        assert_eq!(result.data[0], vec![None, None, Some(2.0)]);
        assert_eq!(result.data[1], vec![None, Some(-3.0), None]);
        let scales = result.extra.and_then(|extra| extra.scales).expect("delta overrides y");
        assert_eq!(scales["y"].distr, Some(1));
    }

    #[test]
    fn cumulative_layers_running_total() {
        let result = lookup("cumulative").build(&labels(3), &[3.0, 5.0, 2.0]);
        assert_eq!(result.data[1], vec![Some(3.0), Some(8.0), Some(10.0)]);
    }

    #[test]
    fn style_serializes_for_renderer() {
        let result = lookup("bars").build(&labels(1), &[1.0]);
        let json = serde_json::to_value(&result.series[0]).unwrap();
        assert_eq!(json["spanGaps"], false);
        assert_eq!(json["paths"]["type"], "bars");
        assert_eq!(json["paths"]["size"], serde_json::json!([0.6, null]));
        assert!(json.get("dash").is_none());
    }
}
