//! Geo Filter: great-circle distance and radius filtering over job postings.

use crate::models::job::Job;

pub const EARTH_RADIUS_MILES: f64 = 3958.8;
pub const DEFAULT_RADIUS_MILES: f64 = 25.0;
pub const MIN_RADIUS_MILES: f64 = 1.0;

/// Haversine distance in miles. Inputs are degrees.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * a.sqrt().asin()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusQuery {
    pub lat: f64,
    pub lon: f64,
    pub radius_miles: f64,
}

pub fn round_to_tenth(miles: f64) -> f64 {
    (miles * 10.0).round() / 10.0
}

/// Keeps jobs with coordinates inside the radius, nearest first.
/// The attached distance is rounded to one decimal.
pub fn filter_within_radius(jobs: Vec<Job>, query: &RadiusQuery) -> Vec<(Job, f64)> {
    let mut kept: Vec<(Job, f64)> = jobs
        .into_iter()
        .filter_map(|job| {
            let (lat, lon) = job.coordinates()?;
            let distance = haversine_distance(query.lat, query.lon, lat, lon);
            (distance <= query.radius_miles).then_some((job, distance))
        })
        .collect();

    kept.sort_by(|a, b| a.1.total_cmp(&b.1));
    kept.into_iter()
        .map(|(job, distance)| (job, round_to_tenth(distance)))
        .collect()
}

/// Case-insensitive substring match on the job's free-text location.
pub fn location_text_matches(job: &Job, needle: &str) -> bool {
    job.location
        .to_lowercase()
        .contains(&needle.trim().to_lowercase())
}
