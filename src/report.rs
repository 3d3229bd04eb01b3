use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;

use crate::predict::ClosestApproach;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// A closest approach in the units shown to users.
#[derive(Debug, Clone, Serialize)]
pub struct ApproachReport {
    pub satellite: String,
    pub norad_id: u64,
    pub time: DateTime<Utc>,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
    pub distance_km: f64,
    pub sample_index: usize,
}

impl ApproachReport {
    pub fn new(satellite: &str, norad_id: u64, approach: &ClosestApproach) -> Self {
        Self {
            satellite: satellite.to_string(),
            norad_id,
            time: approach.time,
            latitude_deg: approach.position.latitude_deg(),
            longitude_deg: approach.position.longitude_deg(),
            altitude_km: approach.position.height_km,
            distance_km: round2(approach.distance_km),
            sample_index: approach.sample_index,
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Text => Ok(self.to_text()),
            OutputFormat::Json => serde_json::to_string_pretty(self),
        }
    }

    pub fn to_text(&self) -> String {
        format!(
            "Next closest approach:\nTime: {}\nPosition: Lat {:.4}°, Lon {:.4}°, Alt {:.2} km\nDistance: {:.2} km",
            rfc1123(self.time),
            self.latitude_deg,
            self.longitude_deg,
            self.altitude_km,
            self.distance_km
        )
    }
}

pub fn rfc1123(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::GeodeticCoordinate;

    fn approach() -> ClosestApproach {
        ClosestApproach {
            time: DateTime::parse_from_rfc3339("2026-10-18T07:05:00Z")
                .unwrap()
                .with_timezone(&Utc),
            sample_index: 425,
            position: GeodeticCoordinate::from_degrees(16.5, 45.25, 705.123),
            distance_km: 712.3456,
        }
    }

    #[test]
    fn formats_rfc1123_time() {
        assert_eq!(rfc1123(approach().time), "Sun, 18 Oct 2026 07:05:00 GMT");
    }

    #[test]
    fn text_report() {
        let report = ApproachReport::new("LANDSAT 9", 49260, &approach());
        assert_eq!(
            report.to_text(),
            "Next closest approach:\n\
             Time: Sun, 18 Oct 2026 07:05:00 GMT\n\
             Position: Lat 16.5000°, Lon 45.2500°, Alt 705.12 km\n\
             Distance: 712.35 km"
        );
    }

    #[test]
    fn json_report_uses_degrees() {
        let report = ApproachReport::new("LANDSAT 9", 49260, &approach());
        let json = report.render(OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["norad_id"], 49260);
        assert_eq!(value["distance_km"], 712.35);
        assert!((value["latitude_deg"].as_f64().unwrap() - 16.5).abs() < 1e-9);
        assert_eq!(value["time"], "2026-10-18T07:05:00Z");
    }
}
