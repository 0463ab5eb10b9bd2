use chrono::DateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::gps_point::NewGpsPoint;
use crate::models::status::parse_status;

/// Request envelope for the track detail endpoint. Window bounds are epoch
/// milliseconds, `[begin, end)`.
#[derive(Debug, Serialize)]
pub struct TrackRequest {
    pub cmd: &'static str,
    pub token: String,
    pub language: i32,
    pub params: TrackRequestParams,
}

#[derive(Debug, Serialize)]
pub struct TrackRequestParams {
    #[serde(rename = "VehicleID")]
    pub vehicle_id: i32,
    #[serde(rename = "BeginTime")]
    pub begin_time: i64,
    #[serde(rename = "EndTime")]
    pub end_time: i64,
}

impl TrackRequest {
    pub fn new(token: &str, vehicle_id: i32, begin_time_ms: i64, end_time_ms: i64) -> Self {
        Self {
            cmd: "GetTrackDetail",
            token: token.to_string(),
            language: 2,
            params: TrackRequestParams {
                vehicle_id,
                begin_time: begin_time_ms,
                end_time: end_time_ms,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TrackResponse {
    pub cmd: String,
    pub result: i32,
    #[serde(rename = "resultNote", default)]
    pub result_note: String,
    #[serde(default)]
    pub detail: TrackDetail,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrackDetail {
    #[serde(default)]
    pub data: Vec<RawTrackPoint>,
}

/// One sample as the API returns it. The device firmware is inconsistent
/// about numeric fields, so they tolerate both string and number JSON.
#[derive(Debug, Deserialize)]
pub struct RawTrackPoint {
    #[serde(rename = "VehicleID")]
    pub vehicle_id: i32,
    #[serde(rename = "GpsTime")]
    pub gps_time: i64, // unix seconds
    #[serde(rename = "Lat")]
    pub lat: f64,
    #[serde(rename = "Lon")]
    pub lon: f64,
    #[serde(rename = "Direction", default, deserialize_with = "parse_i32_option")]
    pub direction: Option<i32>,
    #[serde(rename = "Speed", default, deserialize_with = "parse_f64_option")]
    pub speed: Option<f64>,
    #[serde(rename = "Odometer", default, deserialize_with = "parse_f64_option")]
    pub odometer: Option<f64>,
    #[serde(rename = "LoStatus", default, deserialize_with = "parse_i32_option")]
    pub lo_status: Option<i32>,
    #[serde(rename = "Status", default)]
    pub status: String,
}

impl RawTrackPoint {
    /// Converts to the insert form, deriving ignition and voltage from the
    /// status string. `None` when the GPS timestamp is out of range.
    pub fn to_point(&self) -> Option<NewGpsPoint> {
        let gps_time_utc = DateTime::from_timestamp(self.gps_time, 0)?;
        let fields = parse_status(&self.status);

        Some(NewGpsPoint {
            vehicle_id: self.vehicle_id,
            gps_time_utc,
            gps_time_unix: self.gps_time,
            lat: self.lat,
            lon: self.lon,
            direction: self.direction,
            speed_kph: self.speed,
            odometer: self.odometer,
            lo_status: self.lo_status,
            acc_on: fields.acc_on,
            voltage: fields.voltage,
            raw_status: if self.status.is_empty() {
                None
            } else {
                Some(self.status.clone())
            },
        })
    }
}

fn parse_f64_option<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrFloat {
        String(String),
        Float(f64),
    }

    let v: Option<StringOrFloat> = Option::deserialize(deserializer)?;
    match v {
        Some(StringOrFloat::Float(f)) => Ok(Some(f)),
        Some(StringOrFloat::String(s)) => {
            if s.trim().is_empty() {
                Ok(None)
            } else {
                s.parse::<f64>().map(Some).map_err(serde::de::Error::custom)
            }
        }
        None => Ok(None),
    }
}

fn parse_i32_option<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrInt {
        String(String),
        Int(i32),
    }

    let v: Option<StringOrInt> = Option::deserialize(deserializer)?;
    match v {
        Some(StringOrInt::Int(i)) => Ok(Some(i)),
        Some(StringOrInt::String(s)) => {
            if s.trim().is_empty() {
                Ok(None)
            } else {
                s.parse::<i32>().map(Some).map_err(serde::de::Error::custom)
            }
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsing_stringly_typed_payload() {
        let payload = r#"
        {
            "cmd": "GetTrackDetail",
            "result": 0,
            "resultNote": "",
            "detail": {
                "data": [
                    {
                        "VehicleID": 1053633,
                        "GpsTime": 1764396915,
                        "Direction": "180",
                        "Lat": 20.652494,
                        "Lon": -100.391404,
                        "Speed": "42.50",
                        "Odometer": "128433.7",
                        "LoStatus": 0,
                        "Status": "ACC ON, 12.6V"
                    }
                ]
            }
        }
        "#;

        let resp: TrackResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(resp.cmd, "GetTrackDetail");
        assert_eq!(resp.result, 0);
        assert_eq!(resp.detail.data.len(), 1);

        let point = resp.detail.data[0].to_point().unwrap();
        assert_eq!(point.vehicle_id, 1053633);
        assert_eq!(point.direction, Some(180));
        assert_eq!(point.speed_kph, Some(42.5));
        assert_eq!(point.odometer, Some(128433.7));
        assert_eq!(point.acc_on, Some(true));
        assert_eq!(point.voltage, Some(12.6));
        assert_eq!(point.gps_time_unix, 1764396915);
    }

    #[test]
    fn test_error_response_without_detail() {
        let payload = r#"{"cmd": "GetTrackDetail", "result": 1001, "resultNote": "token expired"}"#;
        let resp: TrackResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(resp.result, 1001);
        assert_eq!(resp.result_note, "token expired");
        assert!(resp.detail.data.is_empty());
    }

    #[test]
    fn test_empty_status_stores_no_raw_string() {
        let raw = RawTrackPoint {
            vehicle_id: 7,
            gps_time: 1700000000,
            lat: 0.0,
            lon: 0.0,
            direction: None,
            speed: None,
            odometer: None,
            lo_status: None,
            status: String::new(),
        };
        let point = raw.to_point().unwrap();
        assert_eq!(point.raw_status, None);
        assert_eq!(point.acc_on, None);
    }
}
