use crate::errors::{CHART_SETUP_HINT, ServiceError};
use crate::models::{ChartSeries, QuarterPoint, QuarterRecord};
use crate::pocketbase::PocketBase;
use crate::quarter;
use tracing::debug;

pub const COLLECTION: &str = "value_quarters";
const PAGE_SIZE: u32 = 200;

/// Fetches the first page of quarters and returns them as aligned,
/// chronologically sorted labels and values.
pub async fn get_chart_series(client: &PocketBase) -> Result<ChartSeries, ServiceError> {
    let page = client
        .get_list::<QuarterRecord>(COLLECTION, 1, PAGE_SIZE, "quarter")
        .await
        .map_err(|err| ServiceError::from_client(err, "fetch chart data", CHART_SETUP_HINT))?;

    debug!(records = page.items.len(), "fetched quarter records");
    let points: Vec<QuarterPoint> = page.items.into_iter().map(QuarterPoint::from).collect();
    Ok(quarter::into_series(points))
}

pub async fn refresh_chart_data(client: &PocketBase) -> Result<ChartSeries, ServiceError> {
    get_chart_series(client).await
}
