//! Reads observation exports (semicolon-separated CSV, as produced by the
//! Meteomatics API) into [`RawObservation`] rows using polars' lazy CSV reader.

use crate::observations::error::IngestError;
use crate::types::observation::RawObservation;
use bon::Builder;
use log::info;
use polars::prelude::*;
use std::path::Path;

/// Column layout of an observation CSV export.
///
/// # Examples
///
/// ```
/// use windfield::CsvLayout;
///
/// // Defaults match the Meteomatics export.
/// let layout = CsvLayout::default();
/// assert_eq!(layout.separator, b';');
/// assert_eq!(layout.wind_speed_column, "wind_speed_10m:kn");
///
/// // Comma-separated file with plain column names
/// let layout = CsvLayout::builder()
///     .separator(b',')
///     .timestamp_column("time".to_string())
///     .temperature_column("temp_f".to_string())
///     .wind_speed_column("wind_kn".to_string())
///     .build();
/// assert_eq!(layout.lat_column, "lat");
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct CsvLayout {
    #[builder(default = b';')]
    pub separator: u8,
    #[builder(default = "validdate".to_string())]
    pub timestamp_column: String,
    #[builder(default = "lat".to_string())]
    pub lat_column: String,
    #[builder(default = "lon".to_string())]
    pub lon_column: String,
    #[builder(default = "t_2m:F".to_string())]
    pub temperature_column: String,
    #[builder(default = "wind_speed_10m:kn".to_string())]
    pub wind_speed_column: String,
}

impl Default for CsvLayout {
    fn default() -> Self {
        Self::builder().build()
    }
}

// Output column names after projection
const COL_TIMESTAMP: &str = "timestamp";
const COL_LAT: &str = "lat";
const COL_LON: &str = "lon";
const COL_TEMPERATURE: &str = "temperature";
const COL_WIND_SPEED: &str = "wind_speed";

fn column_error(path: &Path, name: &str, source: PolarsError) -> IngestError {
    IngestError::ColumnNotFound {
        path: path.to_path_buf(),
        column: name.to_string(),
        source,
    }
}

fn float_column(
    df: &DataFrame,
    name: &str,
    path: &Path,
) -> Result<Vec<Option<f64>>, IngestError> {
    let values = df
        .column(name)
        .and_then(|column| column.f64())
        .map_err(|e| column_error(path, name, e))?;
    Ok(values.into_iter().collect())
}

fn string_column(
    df: &DataFrame,
    name: &str,
    path: &Path,
) -> Result<Vec<Option<String>>, IngestError> {
    let values = df
        .column(name)
        .and_then(|column| column.str())
        .map_err(|e| column_error(path, name, e))?;
    Ok(values
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Reads an observation CSV into raw rows.
///
/// Cells that are empty or cannot be parsed into the expected type come back
/// as `None`, so that [`crate::ObservationStore::load`] can reject those rows
/// individually instead of failing the whole file.
///
/// # Errors
///
/// Returns [`IngestError::FileNotFound`] if `path` does not exist,
/// [`IngestError::CsvRead`] if polars cannot read the file (which includes a
/// column named in `layout` being absent), and [`IngestError::ColumnNotFound`]
/// if a projected column cannot be extracted.
pub fn read_observations_csv(
    path: &Path,
    layout: &CsvLayout,
) -> Result<Vec<RawObservation>, IngestError> {
    if !path.exists() {
        return Err(IngestError::FileNotFound(path.to_path_buf()));
    }

    // Non-strict casts: unparseable cells become nulls
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_separator(layout.separator)
        .finish()
        .and_then(|frame| {
            frame
                .select([
                    col(layout.timestamp_column.as_str())
                        .cast(DataType::String)
                        .alias(COL_TIMESTAMP),
                    col(layout.lat_column.as_str())
                        .cast(DataType::Float64)
                        .alias(COL_LAT),
                    col(layout.lon_column.as_str())
                        .cast(DataType::Float64)
                        .alias(COL_LON),
                    col(layout.temperature_column.as_str())
                        .cast(DataType::Float64)
                        .alias(COL_TEMPERATURE),
                    col(layout.wind_speed_column.as_str())
                        .cast(DataType::Float64)
                        .alias(COL_WIND_SPEED),
                ])
                .collect()
        })
        .map_err(|source| IngestError::CsvRead {
            path: path.to_path_buf(),
            source,
        })?;

    let timestamps = string_column(&df, COL_TIMESTAMP, path)?;
    let lats = float_column(&df, COL_LAT, path)?;
    let lons = float_column(&df, COL_LON, path)?;
    let temperatures = float_column(&df, COL_TEMPERATURE, path)?;
    let wind_speeds = float_column(&df, COL_WIND_SPEED, path)?;

    let rows: Vec<RawObservation> = timestamps
        .into_iter()
        .zip(lats)
        .zip(lons)
        .zip(temperatures)
        .zip(wind_speeds)
        .map(
            |((((timestamp, lat), lon), temperature), wind_speed)| RawObservation {
                timestamp,
                lat,
                lon,
                temperature,
                wind_speed,
            },
        )
        .collect();

    info!("Read {} observation rows from {:?}", rows.len(), path);
    Ok(rows)
}
