use crate::util::extract_city;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(pub u64);

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// GeoJSON point geometry. Coordinates are stored in GeoJSON order, `[lng, lat]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type", default = "point_type")]
    pub r#type: String,
    pub coordinates: Vec<f64>,
}

fn point_type() -> String {
    "Point".to_string()
}

fn feature_type() -> String {
    "Feature".to_string()
}

fn collection_type() -> String {
    "FeatureCollection".to_string()
}

impl Geometry {
    pub fn point(lat: f64, lng: f64) -> Self {
        Self {
            r#type: point_type(),
            coordinates: vec![lng, lat],
        }
    }

    pub fn lng(&self) -> f64 {
        self.coordinates.first().copied().unwrap_or(0.0)
    }

    pub fn lat(&self) -> f64 {
        self.coordinates.get(1).copied().unwrap_or(0.0)
    }

    pub fn lat_lng(&self) -> LatLng {
        LatLng::new(self.lat(), self.lng())
    }
}

/// The property bag of a church record. Field names follow the data files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FeatureId>,
    #[serde(rename = "Title", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "Address", default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "City", default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(rename = "Country", default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(rename = "Jurisdiction", default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "Rite", default, skip_serializing_if = "Option::is_none")]
    pub rite: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, JsonValue>,
}

impl Properties {
    /// Derives `City` from `Address` when the data did not carry one.
    pub fn derive_city(&mut self) {
        let missing = self.city.as_deref().map(str::is_empty).unwrap_or(true);
        if missing {
            if let Some(addr) = self.address.as_deref() {
                let city = extract_city(addr);
                if !city.is_empty() {
                    self.city = Some(city);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_type")]
    pub r#type: String,
    pub geometry: Geometry,
    #[serde(default)]
    pub properties: Properties,
}

impl Feature {
    pub fn new(lat: f64, lng: f64, properties: Properties) -> Self {
        Self {
            r#type: feature_type(),
            geometry: Geometry::point(lat, lng),
            properties,
        }
    }

    pub fn id(&self) -> Option<FeatureId> {
        self.properties.id
    }

    pub fn lat_lng(&self) -> LatLng {
        self.geometry.lat_lng()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "collection_type")]
    pub r#type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            r#type: collection_type(),
            name: None,
            features,
        }
    }
}

/// Axis-aligned lat/lng box. Containment is inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.south && p.lat <= self.north && p.lng >= self.west && p.lng <= self.east
    }

    pub fn contains_bounds(&self, other: &Bounds) -> bool {
        other.south >= self.south
            && other.north <= self.north
            && other.west >= self.west
            && other.east <= self.east
    }

    pub fn from_points<I>(points: I) -> Option<Bounds>
    where
        I: IntoIterator<Item = LatLng>,
    {
        let mut out: Option<Bounds> = None;
        for p in points {
            out = Some(match out {
                None => Bounds::new(p.lat, p.lng, p.lat, p.lng),
                Some(b) => Bounds::new(
                    b.south.min(p.lat),
                    b.west.min(p.lng),
                    b.north.max(p.lat),
                    b.east.max(p.lng),
                ),
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_geojson_feature_with_unknown_keys() {
        let raw = r#"{
            "type": "Feature",
            "properties": {"Title": "St. Mary", "Country": "Malta", "Phone": "+356"},
            "geometry": {"type": "Point", "coordinates": [14.51, 35.89]}
        }"#;
        let f: Feature = serde_json::from_str(raw).unwrap();
        assert_eq!(f.properties.title.as_deref(), Some("St. Mary"));
        assert_eq!(f.lat_lng(), LatLng::new(35.89, 14.51));
        assert_eq!(f.properties.extra.get("Phone"), Some(&JsonValue::from("+356")));
        assert_eq!(f.id(), None);
    }

    #[test]
    fn derive_city_keeps_existing_value() {
        let mut p = Properties {
            city: Some("Valletta".into()),
            address: Some("1 Main St, Springfield, IL, USA".into()),
            ..Default::default()
        };
        p.derive_city();
        assert_eq!(p.city.as_deref(), Some("Valletta"));

        p.city = None;
        p.derive_city();
        assert_eq!(p.city.as_deref(), Some("IL"));
    }

    #[test]
    fn bounds_contains_is_inclusive() {
        let b = Bounds::new(10.0, 20.0, 11.0, 21.0);
        assert!(b.contains(LatLng::new(10.0, 20.0)));
        assert!(b.contains(LatLng::new(11.0, 21.0)));
        assert!(!b.contains(LatLng::new(11.0001, 20.5)));
    }

    #[test]
    fn bounds_from_points() {
        assert!(Bounds::from_points(Vec::new()).is_none());
        let b = Bounds::from_points(vec![LatLng::new(1.0, 5.0), LatLng::new(-2.0, 7.0)]).unwrap();
        assert_eq!(b, Bounds::new(-2.0, 5.0, 1.0, 7.0));
        assert!(Bounds::new(-3.0, 0.0, 3.0, 10.0).contains_bounds(&b));
    }
}
