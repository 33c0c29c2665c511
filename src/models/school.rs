use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inclusive bounds for the latitude field
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
/// Inclusive bounds for the longitude field
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// School entity representing a registered school and its coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct School {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A school row annotated with its computed distance from the reference point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolWithDistance {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
}

/// Request structure for creating a new school.
/// Fields stay loosely typed (`serde_json::Value`) so validation can inspect
/// every field and report all problems in one response.
#[derive(Debug, Default, Deserialize)]
pub struct CreateSchoolRequest {
    pub name: Option<Value>,
    pub address: Option<Value>,
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
}

/// Fully validated creation payload, produced by `CreateSchoolRequest::validate`
#[derive(Debug, Clone, PartialEq)]
pub struct NewSchool {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Query parameters for listing schools by distance
#[derive(Debug, Default, Deserialize)]
pub struct ListSchoolsQuery {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

/// Caller position validated out of the query string
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferencePoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Response body for a successful school creation
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSchoolResponse {
    pub message: String,
    pub id: i32,
    pub school: School,
}

/// Response body for the distance-ordered listing
#[derive(Debug, Serialize, Deserialize)]
pub struct ListSchoolsResponse {
    pub count: usize,
    pub data: Vec<SchoolWithDistance>,
}

impl CreateSchoolRequest {
    /// Evaluate every field rule and collect every failure.
    /// Rules are checked in field order (name, address, latitude, longitude)
    /// and none of them short-circuits, so a client can fix all problems in
    /// one round trip.
    pub fn validate(&self) -> Result<NewSchool, Vec<String>> {
        let mut errors = Vec::new();

        let name = trimmed_string(self.name.as_ref());
        if name.is_none() {
            errors.push("name is required".to_string());
        }

        let address = trimmed_string(self.address.as_ref());
        if address.is_none() {
            errors.push("address is required".to_string());
        }

        let latitude = validate_coordinate(
            self.latitude.as_ref().and_then(parse_number),
            self.latitude.is_some(),
            "latitude",
            LATITUDE_RANGE,
            &mut errors,
        );

        let longitude = validate_coordinate(
            self.longitude.as_ref().and_then(parse_number),
            self.longitude.is_some(),
            "longitude",
            LONGITUDE_RANGE,
            &mut errors,
        );

        match (name, address, latitude, longitude) {
            (Some(name), Some(address), Some(latitude), Some(longitude)) => Ok(NewSchool {
                name,
                address,
                latitude,
                longitude,
            }),
            _ => Err(errors),
        }
    }
}

impl ListSchoolsQuery {
    /// Validate the caller position out of the query string.
    /// Both coordinates are checked even when the first one already failed.
    pub fn validate(&self) -> Result<ReferencePoint, Vec<String>> {
        let mut errors = Vec::new();

        let latitude = validate_coordinate(
            self.latitude.as_deref().and_then(|s| s.parse().ok()),
            self.latitude.is_some(),
            "latitude",
            LATITUDE_RANGE,
            &mut errors,
        );

        let longitude = validate_coordinate(
            self.longitude.as_deref().and_then(|s| s.parse().ok()),
            self.longitude.is_some(),
            "longitude",
            LONGITUDE_RANGE,
            &mut errors,
        );

        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Ok(ReferencePoint {
                latitude,
                longitude,
            }),
            _ => Err(errors),
        }
    }
}

/// Accepts only JSON strings, trims them, and rejects empty results
fn trimmed_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        _ => None,
    }
}

/// Coordinates arrive either as JSON numbers or as numeric strings
fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Presence and range rules for one coordinate field.
/// A missing field gets the "required" message; a present but unparseable or
/// out-of-range value gets the range message. NaN fails the range comparison.
fn validate_coordinate(
    parsed: Option<f64>,
    present: bool,
    field: &str,
    (min, max): (f64, f64),
    errors: &mut Vec<String>,
) -> Option<f64> {
    if !present {
        errors.push(format!("{} is required", field));
        return None;
    }

    match parsed {
        Some(value) if (min..=max).contains(&value) => Some(value),
        _ => {
            errors.push(format!("{} must be between {} and {}", field, min, max));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_request() -> CreateSchoolRequest {
        CreateSchoolRequest {
            name: Some(json!("Green Valley High")),
            address: Some(json!("12 Hill Road, Bengaluru")),
            latitude: Some(json!(12.9716)),
            longitude: Some(json!(77.5946)),
        }
    }

    #[test]
    fn test_create_school_request_validation() {
        let validated = valid_request().validate().expect("request should be valid");

        assert_eq!(validated.name, "Green Valley High");
        assert_eq!(validated.address, "12 Hill Road, Bengaluru");
        assert_eq!(validated.latitude, 12.9716);
        assert_eq!(validated.longitude, 77.5946);
    }

    #[test]
    fn test_create_school_request_accepts_numeric_strings() {
        let request = CreateSchoolRequest {
            latitude: Some(json!("12.9716")),
            longitude: Some(json!("-77.5946")),
            ..valid_request()
        };

        let validated = request.validate().expect("numeric strings should parse");
        assert_eq!(validated.latitude, 12.9716);
        assert_eq!(validated.longitude, -77.5946);
    }

    #[test]
    fn test_create_school_request_trims_text_fields() {
        let request = CreateSchoolRequest {
            name: Some(json!("  Green Valley High  ")),
            address: Some(json!("  12 Hill Road  ")),
            ..valid_request()
        };

        let validated = request.validate().unwrap();
        assert_eq!(validated.name, "Green Valley High");
        assert_eq!(validated.address, "12 Hill Road");
    }

    #[test]
    fn test_validation_collects_every_failure() {
        let errors = CreateSchoolRequest::default().validate().unwrap_err();

        assert_eq!(
            errors,
            vec![
                "name is required".to_string(),
                "address is required".to_string(),
                "latitude is required".to_string(),
                "longitude is required".to_string(),
            ]
        );
    }

    #[test]
    fn test_latitude_out_of_range() {
        let request = CreateSchoolRequest {
            latitude: Some(json!(95)),
            ..valid_request()
        };

        let errors = request.validate().unwrap_err();
        assert_eq!(errors, vec!["latitude must be between -90 and 90".to_string()]);
    }

    #[test]
    fn test_longitude_out_of_range() {
        let request = CreateSchoolRequest {
            longitude: Some(json!(-200)),
            ..valid_request()
        };

        let errors = request.validate().unwrap_err();
        assert_eq!(
            errors,
            vec!["longitude must be between -180 and 180".to_string()]
        );
    }

    #[test]
    fn test_boundary_coordinates_are_valid() {
        for (latitude, longitude) in [(-90.0, -180.0), (90.0, 180.0), (0.0, 0.0)] {
            let request = CreateSchoolRequest {
                latitude: Some(json!(latitude)),
                longitude: Some(json!(longitude)),
                ..valid_request()
            };
            assert!(request.validate().is_ok(), "({}, {})", latitude, longitude);
        }
    }

    #[test]
    fn test_non_string_name_is_rejected() {
        let request = CreateSchoolRequest {
            name: Some(json!(42)),
            ..valid_request()
        };

        let errors = request.validate().unwrap_err();
        assert_eq!(errors, vec!["name is required".to_string()]);
    }

    #[test]
    fn test_whitespace_only_address_is_rejected() {
        let request = CreateSchoolRequest {
            address: Some(json!("   ")),
            ..valid_request()
        };

        let errors = request.validate().unwrap_err();
        assert_eq!(errors, vec!["address is required".to_string()]);
    }

    #[test]
    fn test_unparseable_latitude_gets_range_message() {
        for raw in [json!("abc"), json!(null), json!(true), json!("NaN12")] {
            let request = CreateSchoolRequest {
                latitude: Some(raw.clone()),
                ..valid_request()
            };

            let errors = request.validate().unwrap_err();
            assert_eq!(
                errors,
                vec!["latitude must be between -90 and 90".to_string()],
                "raw value: {}",
                raw
            );
        }
    }

    #[test]
    fn test_list_schools_query_validation() {
        let query = ListSchoolsQuery {
            latitude: Some("12.9716".to_string()),
            longitude: Some("77.5946".to_string()),
        };

        let point = query.validate().expect("query should be valid");
        assert_eq!(
            point,
            ReferencePoint {
                latitude: 12.9716,
                longitude: 77.5946,
            }
        );
    }

    #[test]
    fn test_list_schools_query_missing_both_coordinates() {
        let errors = ListSchoolsQuery::default().validate().unwrap_err();

        assert_eq!(
            errors,
            vec![
                "latitude is required".to_string(),
                "longitude is required".to_string(),
            ]
        );
    }

    #[test]
    fn test_list_schools_query_rejects_garbage() {
        let query = ListSchoolsQuery {
            latitude: Some("abc".to_string()),
            longitude: Some("200".to_string()),
        };

        let errors = query.validate().unwrap_err();
        assert_eq!(
            errors,
            vec![
                "latitude must be between -90 and 90".to_string(),
                "longitude must be between -180 and 180".to_string(),
            ]
        );
    }

    #[test]
    fn test_school_serialization() {
        let school = School {
            id: 1,
            name: "Green Valley High".to_string(),
            address: "12 Hill Road".to_string(),
            latitude: 12.5,
            longitude: 77.5,
        };

        let json = serde_json::to_string(&school).expect("Failed to serialize school");
        let expected = r#"{"id":1,"name":"Green Valley High","address":"12 Hill Road","latitude":12.5,"longitude":77.5}"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_school_with_distance_serialization() {
        let row = SchoolWithDistance {
            id: 3,
            name: "Lakeside".to_string(),
            address: "Shore St".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            distance_km: 0.0,
        };

        let json = serde_json::to_string(&row).expect("Failed to serialize row");
        let expected = r#"{"id":3,"name":"Lakeside","address":"Shore St","latitude":0.0,"longitude":0.0,"distance_km":0.0}"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_create_school_response_shape() {
        let response = CreateSchoolResponse {
            message: "School added successfully".to_string(),
            id: 7,
            school: School {
                id: 7,
                name: "Green Valley High".to_string(),
                address: "12 Hill Road".to_string(),
                latitude: 12.5,
                longitude: 77.5,
            },
        };

        let json = serde_json::to_value(&response).expect("Failed to serialize response");
        assert_eq!(json["message"], "School added successfully");
        assert_eq!(json["id"], 7);
        assert_eq!(json["school"]["id"], 7);
        assert_eq!(json["school"]["latitude"], 12.5);
    }

    #[test]
    fn test_list_schools_response_shape() {
        let response = ListSchoolsResponse {
            count: 0,
            data: vec![],
        };

        let json = serde_json::to_string(&response).expect("Failed to serialize response");
        assert_eq!(json, r#"{"count":0,"data":[]}"#);
    }

    #[test]
    fn test_create_school_request_deserialization() {
        // Coordinates as numbers
        let json_numbers =
            r#"{"name":"A","address":"B","latitude":12.5,"longitude":77.5}"#;
        let request: CreateSchoolRequest =
            serde_json::from_str(json_numbers).expect("Failed to deserialize request");
        assert!(request.validate().is_ok());

        // Coordinates as strings
        let json_strings =
            r#"{"name":"A","address":"B","latitude":"12.5","longitude":"77.5"}"#;
        let request: CreateSchoolRequest =
            serde_json::from_str(json_strings).expect("Failed to deserialize request");
        assert!(request.validate().is_ok());

        // Unknown extra fields are ignored, missing fields become None
        let json_partial = r#"{"name":"A","board":"CBSE"}"#;
        let request: CreateSchoolRequest =
            serde_json::from_str(json_partial).expect("Failed to deserialize request");
        assert!(request.address.is_none());
        assert!(request.validate().is_err());
    }
}
