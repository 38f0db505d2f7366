use async_trait::async_trait;
use serde_json::{json, Value};

use tendero_llm::{Tool, ToolError};

struct Store {
    name: &'static str,
    address: &'static str,
    lat: f64,
    lon: f64,
}

const STORES: &[Store] = &[
    Store {
        name: "Chapinero",
        address: "Cra 13 #54-21, Bogotá",
        lat: 4.6441,
        lon: -74.0633,
    },
    Store {
        name: "Usaquén",
        address: "Cll 119 #6-16, Bogotá",
        lat: 4.6946,
        lon: -74.0309,
    },
    Store {
        name: "El Poblado",
        address: "Cra 37 #8A-45, Medellín",
        lat: 6.2104,
        lon: -75.5694,
    },
    Store {
        name: "Granada",
        address: "Av 9N #15-55, Cali",
        lat: 3.4629,
        lon: -76.5270,
    },
];

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates.
fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Store locations, optionally sorted by proximity to the user.
pub struct Locations;

#[async_trait]
impl Tool for Locations {
    fn name(&self) -> &str {
        "locations"
    }

    fn description(&self) -> &str {
        "Store addresses. Pass lat/lon to sort by distance and get the nearest store first."
    }

    fn parameter_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "lat": {"type": "number"},
                "lon": {"type": "number"}
            }
        })
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        let position = match (
            params.get("lat").and_then(Value::as_f64),
            params.get("lon").and_then(Value::as_f64),
        ) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        };

        let mut stores: Vec<Value> = match position {
            Some((lat, lon)) => {
                let mut with_distance: Vec<(f64, &Store)> = STORES
                    .iter()
                    .map(|s| (haversine_km(lat, lon, s.lat, s.lon), s))
                    .collect();
                with_distance
                    .sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
                with_distance
                    .into_iter()
                    .map(|(km, s)| {
                        json!({
                            "name": s.name,
                            "address": s.address,
                            "distance_km": (km * 10.0).round() / 10.0,
                        })
                    })
                    .collect()
            }
            None => STORES
                .iter()
                .map(|s| json!({"name": s.name, "address": s.address}))
                .collect(),
        };

        if stores.is_empty() {
            return Err(ToolError("no stores configured".to_string()));
        }
        stores.truncate(5);
        Ok(json!({"stores": stores}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn proximity_sort_puts_nearest_first() {
        // A point in central Bogotá: Chapinero beats Medellín and Cali.
        let result = Locations
            .execute(json!({"lat": 4.65, "lon": -74.06}))
            .await
            .unwrap();
        assert_eq!(result["stores"][0]["name"], "Chapinero");
        assert!(result["stores"][0]["distance_km"].as_f64().unwrap() < 5.0);
    }

    #[tokio::test]
    async fn without_position_lists_all_stores() {
        let result = Locations.execute(json!({})).await.unwrap();
        assert_eq!(result["stores"].as_array().unwrap().len(), 4);
        assert!(result["stores"][0].get("distance_km").is_none());
    }
}
