//! Presentation helpers: itinerary text, map links and GeoJSON export
//!
//! These only read a [`TripResult`]; nothing here feeds back into the
//! pipeline.

use std::path::Path;

use colored::Colorize;
use eyre::{Context, Result};
use serde_json::{Value, json};
use tracing::debug;

use crate::domain::{LatLon, PointOfInterest, TripResult};

/// OpenStreetMap link centred on a point
pub fn map_link(point: LatLon) -> String {
    format!(
        "https://www.openstreetmap.org/?mlat={lat}&mlon={lon}#map=17/{lat}/{lon}",
        lat = point.lat,
        lon = point.lon
    )
}

/// `Stop N: name` lines in visiting order, then the route summary if known
pub fn itinerary_lines(trip: &TripResult) -> Vec<String> {
    debug!(stops = trip.stops.len(), "itinerary_lines: called");
    let mut lines: Vec<String> = trip
        .stops
        .iter()
        .enumerate()
        .map(|(idx, stop)| format!("Stop {}: {}", idx + 1, stop.name()))
        .collect();

    if let Some(summary) = trip.route_summary {
        lines.push(format!(
            "Route: {:.1} km, about {}",
            summary.distance_km,
            format_duration(summary.duration_hours)
        ));
    }
    lines
}

/// Print a trip to stdout
pub fn print_trip(trip: &TripResult) {
    println!();
    println!("{}", format!("Your route in {}", trip.city_name).bright_cyan().bold());
    println!("  {} {}", "Start:".dimmed(), trip.city_center);
    for line in itinerary_lines(trip) {
        println!("  {}", line.yellow());
    }
    if !trip.has_route() {
        println!("  {}", "No route line (markers only)".dimmed());
    }
    println!();
    println!("{}", "Open on a map:".bright_cyan());
    for stop in &trip.stops {
        println!("  {:24} {}", stop.name(), map_link(stop.position()).dimmed());
    }
    println!();
}

fn format_duration(hours: f64) -> String {
    let minutes = (hours * 60.0).round() as u64;
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} h"),
        (h, m) => format!("{h} h {m} min"),
    }
}

fn point_feature(position: LatLon, properties: Value) -> Value {
    json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": position.to_lon_lat() },
        "properties": properties,
    })
}

fn stop_feature(index: usize, stop: &PointOfInterest) -> Value {
    point_feature(
        stop.position(),
        json!({
            "role": "stop",
            "index": index,
            "name": stop.name(),
            "map_url": map_link(stop.position()),
        }),
    )
}

/// GeoJSON `FeatureCollection` for a map widget
///
/// Positions are `[lon, lat]` as GeoJSON requires.
pub fn to_geojson(trip: &TripResult) -> Value {
    debug!(city = %trip.city_name, "to_geojson: called");
    let mut features = vec![point_feature(
        trip.city_center,
        json!({ "role": "center", "name": trip.city_name }),
    )];

    features.extend(
        trip.stops
            .iter()
            .enumerate()
            .map(|(idx, stop)| stop_feature(idx + 1, stop)),
    );

    if trip.has_route() {
        let coordinates: Vec<[f64; 2]> = trip.route.points().iter().map(|p| p.to_lon_lat()).collect();
        let mut properties = json!({ "role": "route" });
        if let Some(summary) = trip.route_summary {
            properties["distance_km"] = json!(summary.distance_km);
            properties["duration_hours"] = json!(summary.duration_hours);
        }
        features.push(json!({
            "type": "Feature",
            "geometry": { "type": "LineString", "coordinates": coordinates },
            "properties": properties,
        }));
    }

    json!({ "type": "FeatureCollection", "features": features })
}

/// Write the GeoJSON export to `path`
pub fn write_geojson(trip: &TripResult, path: &Path) -> Result<()> {
    debug!(?path, "write_geojson: called");
    let body = serde_json::to_string_pretty(&to_geojson(trip)).context("Failed to serialize GeoJSON")?;
    std::fs::write(path, body).context(format!("Failed to write GeoJSON to {}", path.display()))?;
    Ok(())
}
