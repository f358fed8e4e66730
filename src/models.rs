use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterPoint {
    pub quarter: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartMeta {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CounterRecord {
    pub id: String,
    pub value: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuarterRecord {
    pub quarter: String,
    pub value: f64,
}

impl From<QuarterRecord> for QuarterPoint {
    fn from(record: QuarterRecord) -> Self {
        Self {
            quarter: record.quarter,
            value: record.value,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListResult<T> {
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub record: Value,
}

#[derive(Debug, Deserialize)]
pub struct CounterRequest {
    pub action: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CounterResponse {
    pub value: i64,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    pub width: Option<u32>,
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChartResponse {
    pub kind: &'static str,
    pub labels: Vec<String>,
    #[serde(flatten)]
    pub plot: crate::chart::PlotSpec,
}
