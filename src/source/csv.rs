use crate::core::Waypoint;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Load route waypoints from a CSV file
///
/// Supports flexible column names:
/// - lat,lng
/// - latitude,longitude
/// - lat,lon
///
/// Rows must appear in travel order; non-finite coordinates are rejected.
pub fn load_waypoints(path: &str) -> Result<Vec<Waypoint>> {
    let mut rdr = csv::Reader::from_path(Path::new(path))?;

    let headers = rdr.headers()?;
    let (lat_idx, lng_idx) = detect_columns(headers)?;

    let mut waypoints = Vec::new();
    for result in rdr.records() {
        let record = result.context("Failed to read CSV row")?;
        let lat = parse_coordinate(&record, lat_idx)?;
        let lng = parse_coordinate(&record, lng_idx)?;

        let waypoint = Waypoint::new(lat, lng);
        if !waypoint.is_finite() {
            anyhow::bail!("Non-finite coordinate in row {}", waypoints.len() + 1);
        }
        waypoints.push(waypoint);
    }

    debug!("Loaded {} waypoints from {}", waypoints.len(), path);
    Ok(waypoints)
}

fn parse_coordinate(record: &csv::StringRecord, idx: usize) -> Result<f64> {
    let field = record.get(idx).context("Missing coordinate column")?;
    field
        .trim()
        .parse::<f64>()
        .with_context(|| format!("Failed to parse coordinate: {:?}", field))
}

/// Detect coordinate column indices from CSV headers
fn detect_columns(headers: &csv::StringRecord) -> Result<(usize, usize)> {
    let lat_idx = find_column(headers, &["lat", "latitude", "y"])?;
    let lng_idx = find_column(headers, &["lng", "lon", "long", "longitude", "x"])?;

    Ok((lat_idx, lng_idx))
}

/// Find a column by checking possible names
fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Result<usize> {
    for (idx, header) in headers.iter().enumerate() {
        let header_lower = header.trim().to_lowercase();
        if names.iter().any(|&name| header_lower == name) {
            return Ok(idx);
        }
    }

    anyhow::bail!("Could not find column with names: {:?}", names)
}
