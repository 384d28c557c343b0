use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::bail;
use flate2::bufread::GzDecoder;
use geojson::GeoJson;
use serde::Serialize;

use super::{Feature, FeatureCollection, PropertyValue};


/// Reads a GeoJSON document, gzip-compressed when the file name ends in `.gz`.
///
/// A bare geometry or a single feature is returned as a one-element collection.
/// Features without geometry are skipped.
pub fn load_geo_json(path: &Path) -> anyhow::Result<FeatureCollection> {
    if !path.is_file() {
        bail!("Couldn't find {}", path.display());
    }

    let mut buf = BufReader::new(File::open(path)?);
    let mut s = String::new();
    if path.extension().map_or(false, |ext| ext == "gz") {
        GzDecoder::new(buf).read_to_string(&mut s)?;
    } else {
        buf.read_to_string(&mut s)?;
    }

    let geojson_features = match s.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(g) => vec![geojson::Feature {
            bbox: None,
            geometry: Some(g),
            id: None,
            properties: None,
            foreign_members: None,
        }],
    };

    let mut collection = FeatureCollection::new();
    for f in geojson_features {
        let gj_geo = match f.geometry {
            Some(g) => g,
            None => continue,
        };

        let properties = match f.properties {
            Some(map) => map
                .iter()
                .map(|(key, val)| -> (String, PropertyValue) { (key.clone(), val.into()) })
                .collect(),
            None => Default::default(),
        };

        let geometry: geo::Geometry<f64> = gj_geo.try_into()?;

        collection.push(Feature { geometry, properties });
    }

    tracing::debug!(path = %path.display(), features = collection.len(), "loaded GeoJSON");

    Ok(collection)
}

pub fn write_geo_json<T: Serialize>(path: &Path, document: &T) -> anyhow::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, document)?;
    writer.flush()?;

    Ok(())
}

/// Writes `geometry` as a standalone `{"type": ..., "coordinates": ...}` document.
pub fn write_geometry(path: &Path, geometry: &geo::Geometry<f64>) -> anyhow::Result<()> {
    write_geo_json(path, &geojson::Geometry::new(geojson::Value::from(geometry)))
}
