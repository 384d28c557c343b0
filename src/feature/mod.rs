mod io;

use std::collections::HashMap;

use geo::{Geometry, LineString};

pub use io::{load_geo_json, write_geometry, write_geo_json};


#[derive(Clone, Debug)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    String(String),
    Number(f64),
    Array(Vec<PropertyValue>),
}

impl From<&serde_json::Value> for PropertyValue {
    fn from(val: &serde_json::Value) -> Self {
        match val {
            serde_json::Value::Null => Self::Null,
            // nested objects are kept as their JSON text
            serde_json::Value::Object(_) => Self::String(val.to_string()),
            serde_json::Value::Bool(v) => Self::Bool(*v),
            serde_json::Value::String(v) => Self::String(v.clone()),
            serde_json::Value::Number(v) => v.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::Array(v) => Self::Array(v.iter().map(|e| e.into()).collect()),
        }
    }
}

impl From<PropertyValue> for serde_json::Value {
    fn from(val: PropertyValue) -> Self {
        match val {
            PropertyValue::Null => serde_json::Value::Null,
            PropertyValue::Bool(b) => serde_json::Value::Bool(b),
            PropertyValue::String(s) => serde_json::Value::String(s),
            PropertyValue::Number(f) => serde_json::Number::from_f64(f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            PropertyValue::Array(v) => {
                serde_json::Value::Array(v.into_iter().map(|e| e.into()).collect())
            }
        }
    }
}

impl PartialEq for PropertyValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(l0), Self::Bool(r0)) => l0 == r0,
            (Self::String(l0), Self::String(r0)) => l0 == r0,
            (Self::Number(l0), Self::Number(r0)) => l0 == r0,
            (Self::Array(l0), Self::Array(r0)) => l0 == r0,
            _ => false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Feature {
    pub geometry: Geometry<f64>,
    pub properties: HashMap<String, PropertyValue>,
}

impl Feature {
    pub fn new(geometry: Geometry<f64>) -> Self {
        Feature {
            geometry,
            properties: HashMap::new(),
        }
    }

    fn to_geo_json(&self) -> geojson::Feature {
        let properties: serde_json::Map<String, serde_json::Value> = self
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone().into()))
            .collect();

        geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(&self.geometry))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct FeatureCollection(pub Vec<Feature>);

impl std::ops::Deref for FeatureCollection {
    type Target = Vec<Feature>;
    fn deref(&self) -> &Vec<Feature> {
        &self.0
    }
}

impl std::ops::DerefMut for FeatureCollection {
    fn deref_mut(&mut self) -> &mut Vec<Feature> {
        &mut self.0
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        FeatureCollection(iter.into_iter().collect())
    }
}

impl FeatureCollection {
    pub fn new() -> Self {
        FeatureCollection(Vec::new())
    }

    /// Every line in the collection, multi-lines exploded into their parts.
    pub fn line_strings(&self) -> impl Iterator<Item = &LineString<f64>> + '_ {
        self.iter().flat_map(|feature| match &feature.geometry {
            Geometry::LineString(ls) => std::slice::from_ref(ls),
            Geometry::MultiLineString(mls) => mls.0.as_slice(),
            _ => &[][..],
        })
    }

    pub fn to_geo_json(&self) -> geojson::FeatureCollection {
        geojson::FeatureCollection {
            bbox: None,
            features: self.iter().map(Feature::to_geo_json).collect(),
            foreign_members: None,
        }
    }
}
