//! Meter sample ingestion and chart aggregation.

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use morea_domain::meter::kinds_for_device;

use crate::domain::repository::{DeviceRepository, MeterReadingRepository};
use crate::domain::types::MeterReading;
use crate::error::ApiError;

/// Samples in a chart window. Controllers report every five minutes, so 288
/// samples cover the last 24 hours.
pub const CHART_WINDOW: u64 = 288;

#[derive(Debug, serde::Deserialize)]
pub struct Measurement {
    #[serde(rename = "type")]
    pub kind: i16,
    pub value: f64,
}

pub struct StoreReadingsInput {
    pub api_token: String,
    pub measurements: Vec<Measurement>,
}

pub struct StoreReadingsUseCase<D, M>
where
    D: DeviceRepository,
    M: MeterReadingRepository,
{
    pub devices: D,
    pub readings: M,
}

impl<D, M> StoreReadingsUseCase<D, M>
where
    D: DeviceRepository,
    M: MeterReadingRepository,
{
    pub async fn execute(&self, input: StoreReadingsInput) -> Result<(), ApiError> {
        let Some(device) = self.devices.find_by_api_token(&input.api_token).await? else {
            return Err(ApiError::InvalidApiToken);
        };
        if !device.is_authorized {
            return Err(ApiError::DeviceNotAuthorized);
        }
        if input.measurements.is_empty() {
            return Err(ApiError::EmptyMeasurements);
        }

        // Every measurement is stored, whatever its kind; the chart plots
        // only the kinds it knows.
        for m in &input.measurements {
            // Running total is carried forward from the latest stored row.
            // Controllers report deltas; the total survives their reboots.
            let last_total = self
                .readings
                .last(device.id, m.kind)
                .await?
                .map(|r| r.total)
                .unwrap_or(0.0);

            let reading = MeterReading {
                id: Uuid::now_v7(),
                device_id: device.id,
                kind: m.kind,
                value: m.value,
                total: last_total + m.value,
                collected_at: Utc::now(),
            };
            self.readings.append(&reading).await?;
        }

        Ok(())
    }
}

#[derive(Debug)]
pub struct ChartDataset {
    pub label: &'static str,
    pub timestamps: Vec<String>,
    pub values: Vec<f64>,
    pub current: f64,
    pub max: f64,
    pub total: f64,
}

#[derive(Debug)]
pub struct ChartData {
    pub datasets: Vec<ChartDataset>,
}

/// The dashboard chart component reads an object keyed by series label,
/// each value shaped `{labels, values, stats: {current, max, total}}`.
impl serde::Serialize for ChartData {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        #[derive(serde::Serialize)]
        struct Stats {
            current: f64,
            max: f64,
            total: f64,
        }

        #[derive(serde::Serialize)]
        struct Series<'a> {
            labels: &'a [String],
            values: &'a [f64],
            stats: Stats,
        }

        let mut map = serializer.serialize_map(Some(self.datasets.len()))?;
        for d in &self.datasets {
            map.serialize_entry(
                d.label,
                &Series {
                    labels: &d.timestamps,
                    values: &d.values,
                    stats: Stats {
                        current: d.current,
                        max: d.max,
                        total: d.total,
                    },
                },
            )?;
        }
        map.end()
    }
}

pub struct ChartDataUseCase<D, M>
where
    D: DeviceRepository,
    M: MeterReadingRepository,
{
    pub devices: D,
    pub readings: M,
}

impl<D, M> ChartDataUseCase<D, M>
where
    D: DeviceRepository,
    M: MeterReadingRepository,
{
    pub async fn execute(&self, device_id: Uuid) -> Result<ChartData, ApiError> {
        let Some(device) = self.devices.find_by_id(device_id).await? else {
            return Err(ApiError::DeviceNotFound);
        };

        let mut datasets = Vec::new();
        for kind in kinds_for_device(device.kind.as_deref()) {
            let mut rows = self.readings.recent(device.id, kind.code(), CHART_WINDOW).await?;
            // Stored newest first; charts read left to right.
            rows.reverse();

            let current = rows.last().map(|r| r.value).unwrap_or(0.0);
            let max = rows.iter().map(|r| r.value).fold(0.0_f64, f64::max);
            // Consumption over the charted window, not the stored running
            // total.
            let total = rows.iter().map(|r| r.value).sum::<f64>();

            datasets.push(ChartDataset {
                label: kind.label(),
                timestamps: rows
                    .iter()
                    .map(|r| r.collected_at.to_rfc3339_opts(SecondsFormat::Millis, true))
                    .collect(),
                values: rows.iter().map(|r| r.value).collect(),
                current: round2(current),
                max: round2(max),
                total: round2(total),
            });
        }

        Ok(ChartData { datasets })
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
