//! Job search: free text, skills, salary, work type and visa filters, plus either a
//! radius search around a point or a text location match.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::matching::geo::{
    filter_within_radius, location_text_matches, RadiusQuery, DEFAULT_RADIUS_MILES,
    MIN_RADIUS_MILES,
};
use crate::models::job::{Job, WORK_TYPES};

/// Raw query string of `GET /api/v1/jobs`. Everything arrives as text so that
/// malformed numbers surface as validation errors naming the field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobSearchParams {
    pub search: Option<String>,
    pub location: Option<String>,
    pub skills: Option<String>,
    pub salary_min: Option<String>,
    pub salary_max: Option<String>,
    pub work_type: Option<String>,
    pub visa_sponsorship: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub radius_miles: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LocationFilter {
    #[default]
    Any,
    Text(String),
    Near(RadiusQuery),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobSearchFilter {
    pub text: Option<String>,
    /// OR-combined substring terms over required skills.
    pub skills: Vec<String>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub work_type: Option<String>,
    pub visa_sponsorship: bool,
    pub location: LocationFilter,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobHit {
    #[serde(flatten)]
    pub job: Job,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_field<T: FromStr>(field: &str, value: &Option<String>) -> Result<Option<T>, AppError> {
    present(value)
        .map(|v| {
            v.parse::<T>()
                .map_err(|_| AppError::Validation(format!("{field} must be a number, got '{v}'")))
        })
        .transpose()
}

/// Like [`parse_field`], but NaN and infinities are rejected too.
fn parse_finite(field: &str, value: &Option<String>) -> Result<Option<f64>, AppError> {
    match parse_field::<f64>(field, value)? {
        Some(v) if !v.is_finite() => Err(AppError::Validation(format!(
            "{field} must be a finite number"
        ))),
        parsed => Ok(parsed),
    }
}

fn parse_flag(value: &Option<String>) -> bool {
    matches!(
        present(value).map(str::to_ascii_lowercase).as_deref(),
        Some("true" | "1" | "on" | "yes")
    )
}

impl JobSearchParams {
    /// Validates the raw parameters. Coordinates, when given, replace the text
    /// location filter entirely.
    pub fn into_filter(self) -> Result<JobSearchFilter, AppError> {
        let lat = parse_finite("lat", &self.lat)?;
        let lon = parse_finite("lon", &self.lon)?;
        let radius = parse_finite("radius_miles", &self.radius_miles)?;

        let location = match (lat, lon) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                    return Err(AppError::Validation(
                        "lat must be within ±90 and lon within ±180".to_string(),
                    ));
                }
                let radius_miles = radius.unwrap_or(DEFAULT_RADIUS_MILES);
                if !(radius_miles >= MIN_RADIUS_MILES) {
                    return Err(AppError::Validation(format!(
                        "radius_miles must be at least {MIN_RADIUS_MILES}"
                    )));
                }
                LocationFilter::Near(RadiusQuery {
                    lat,
                    lon,
                    radius_miles,
                })
            }
            (None, None) => match present(&self.location) {
                Some(text) => LocationFilter::Text(text.to_string()),
                None => LocationFilter::Any,
            },
            _ => {
                return Err(AppError::Validation(
                    "lat and lon must be supplied together".to_string(),
                ))
            }
        };

        let work_type = present(&self.work_type).map(str::to_ascii_lowercase);
        if let Some(wt) = work_type.as_deref() {
            if !WORK_TYPES.contains(&wt) {
                return Err(AppError::Validation(format!(
                    "work_type must be one of {}",
                    WORK_TYPES.join(", ")
                )));
            }
        }

        let skills = present(&self.skills)
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_lowercase)
                    .collect()
            })
            .unwrap_or_default();

        Ok(JobSearchFilter {
            text: present(&self.search).map(str::to_lowercase),
            skills,
            salary_min: parse_field("salary_min", &self.salary_min)?,
            salary_max: parse_field("salary_max", &self.salary_max)?,
            work_type,
            visa_sponsorship: parse_flag(&self.visa_sponsorship),
            location,
        })
    }
}

impl JobSearchFilter {
    fn accepts(&self, job: &Job) -> bool {
        if !job.is_active {
            return false;
        }
        if let Some(text) = &self.text {
            let hit = [&job.title, &job.company, &job.description]
                .into_iter()
                .any(|field| field.to_lowercase().contains(text));
            if !hit {
                return false;
            }
        }
        if !self.skills.is_empty() {
            let required = job.required_skills.to_lowercase();
            if !self.skills.iter().any(|s| required.contains(s)) {
                return false;
            }
        }
        // Jobs without a published bound are never excluded by salary filters.
        if let (Some(min), Some(job_min)) = (self.salary_min, job.salary_min) {
            if job_min < min {
                return false;
            }
        }
        if let (Some(max), Some(job_max)) = (self.salary_max, job.salary_max) {
            if job_max > max {
                return false;
            }
        }
        if let Some(wt) = &self.work_type {
            if !job.work_type.eq_ignore_ascii_case(wt) {
                return false;
            }
        }
        !self.visa_sponsorship || job.visa_sponsorship
    }
}

/// Radius searches come back nearest first with a distance; everything else newest first.
pub fn search_jobs(jobs: Vec<Job>, filter: &JobSearchFilter) -> Vec<JobHit> {
    let pool: Vec<Job> = jobs.into_iter().filter(|j| filter.accepts(j)).collect();

    let mut listed = match &filter.location {
        LocationFilter::Near(query) => {
            return filter_within_radius(pool, query)
                .into_iter()
                .map(|(job, distance)| JobHit {
                    job,
                    distance_miles: Some(distance),
                })
                .collect();
        }
        LocationFilter::Text(text) => pool
            .into_iter()
            .filter(|j| location_text_matches(j, text))
            .collect::<Vec<_>>(),
        LocationFilter::Any => pool,
    };

    listed.sort_by(|a, b| b.posted_date.cmp(&a.posted_date));
    listed
        .into_iter()
        .map(|job| JobHit {
            job,
            distance_miles: None,
        })
        .collect()
}
