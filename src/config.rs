use std::fs::File;
use std::io::{BufReader, Error, ErrorKind};
use std::path::Path;

use serde::Deserialize;

use crate::error::NetworkError;
use crate::raster::AffineTransform;

/// Optional settings shared by the commands. Command line flags win.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    /// Class label to extract from the raster.
    pub pixel_value: Option<f64>,
    /// Linking distance, defaults to the ceiled pixel diagonal.
    pub max_distance: Option<f64>,
    /// Grid size used to merge near-coincident line endpoints into one node.
    pub snap_precision: Option<f64>,
    /// Route over every connected component instead of the largest one only.
    pub keep_all_components: bool,
    /// Truncate raster values to integers before sampling.
    pub truncate_to_integer: bool,
    /// Six GDAL-ordered coefficients replacing the raster's own georeference.
    pub geo_transform: Option<Vec<f64>>,
}

impl PipelineConfig {
    pub fn transform(&self) -> Result<Option<AffineTransform>, NetworkError> {
        self.geo_transform
            .as_deref()
            .map(AffineTransform::from_coefficients)
            .transpose()
    }
}

pub trait ConfigParser {
    fn parse(&self, path: &Path) -> Result<PipelineConfig, Error>;
}

#[cfg(test)]
pub struct DummyConfigParser {
    pub succeeds: bool,
}

#[cfg(test)]
impl ConfigParser for DummyConfigParser {
    fn parse(&self, _: &Path) -> Result<PipelineConfig, Error> {
        if self.succeeds {
            Ok(PipelineConfig {
                pixel_value: Some(1.0),
                ..Default::default()
            })
        } else {
            Err(Error::new(ErrorKind::Other, "dummy error"))
        }
    }
}

pub struct SerdeConfigParser {}

impl ConfigParser for SerdeConfigParser {
    fn parse(&self, path: &Path) -> Result<PipelineConfig, Error> {
        if !path.is_file() {
            return Err(Error::new(
                ErrorKind::NotFound,
                format!("Couldn't find {}", path.display()),
            ));
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);

        serde_json::from_reader(reader).map_err(|err| Error::new(ErrorKind::InvalidData, err))
    }
}

/// Parses `path` when given, otherwise returns the defaults.
pub fn load_config(parser: &dyn ConfigParser, path: Option<&Path>) -> Result<PipelineConfig, Error> {
    match path {
        Some(path) => parser.parse(path),
        None => Ok(PipelineConfig::default()),
    }
}

#[cfg(test)]
#[allow(unused_must_use)]
mod tests {
    use std::fs;
    use std::io::ErrorKind;
    use std::path::Path;

    use crate::config::{load_config, ConfigParser, DummyConfigParser, PipelineConfig, SerdeConfigParser};
    use crate::error::NetworkError;
    use crate::test::with_input_and_output_paths;

    #[test]
    fn reads_file_and_deserializes() {
        with_input_and_output_paths(|input_path, _| {
            let path = input_path.join("config.json");
            fs::write(&path, r#"{
                "pixelValue": 3,
                "maxDistance": 12.5,
                "snapPrecision": 0.01,
                "keepAllComponents": true,
                "truncateToInteger": true,
                "geoTransform": [0, 10, 0, 100, 0, -10]
            }"#).unwrap();

            let config = SerdeConfigParser {}.parse(&path).unwrap();

            assert_eq!(config.pixel_value, Some(3.0));
            assert_eq!(config.max_distance, Some(12.5));
            assert_eq!(config.snap_precision, Some(0.01));
            assert!(config.keep_all_components);
            assert!(config.truncate_to_integer);
            assert_eq!(config.transform().unwrap().unwrap().pixel_width, 10.0);
        });
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        with_input_and_output_paths(|input_path, _| {
            let path = input_path.join("config.json");
            fs::write(&path, "{}").unwrap();

            let config = SerdeConfigParser {}.parse(&path).unwrap();

            assert_eq!(config, PipelineConfig::default());
            assert_eq!(config.transform(), Ok(None));
        });
    }

    #[test]
    fn malformed_transform_is_reported() {
        let config = PipelineConfig {
            geo_transform: Some(vec![0.0, 10.0, 0.0]),
            ..Default::default()
        };

        assert!(matches!(config.transform(), Err(NetworkError::MalformedTransform(_))));
    }

    #[test]
    fn errors_out_with_not_found_on_file_not_found() {
        let parser = SerdeConfigParser {};
        let res = parser.parse(Path::new("./does/not/exist.json"));

        assert!(res.is_err());
        assert_eq!(res.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn errors_out_with_invalid_data_on_broken_json() {
        with_input_and_output_paths(|input_path, _| {
            let path = input_path.join("config.json");
            fs::write(&path, "{\"pixelValue\": \"one\"}").unwrap();

            let res = SerdeConfigParser {}.parse(&path);
            assert_eq!(res.unwrap_err().kind(), ErrorKind::InvalidData);
        });
    }

    #[test]
    fn load_config_without_path_uses_defaults() {
        let failing = DummyConfigParser { succeeds: false };

        assert_eq!(load_config(&failing, None).unwrap(), PipelineConfig::default());
        assert!(load_config(&failing, Some(Path::new("config.json"))).is_err());
        assert_eq!(
            load_config(&DummyConfigParser { succeeds: true }, Some(Path::new("config.json"))).unwrap().pixel_value,
            Some(1.0)
        );
    }
}
