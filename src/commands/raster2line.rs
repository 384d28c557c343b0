use anyhow::bail;
use clap::{App, Arg, ArgMatches};
use geo::{Coordinate, Geometry};

use std::path::Path;
use std::time::Instant;

use crate::commands::{parse_arg, NetworkCommand};
use crate::config::{load_config, ConfigParser};
use crate::error::NetworkError;
use crate::extract::{default_max_distance, link, sample, to_multi_line_string};
use crate::feature::{write_geo_json, Feature, FeatureCollection, PropertyValue};
use crate::raster::{load_raster, RasterGrid};


pub struct RasterToLine {
    config: Box<dyn ConfigParser>,
}

impl RasterToLine {
    pub fn new(config: Box<dyn ConfigParser>) -> Self {
        RasterToLine { config }
    }
}

fn parse_coordinate(raw: &str) -> anyhow::Result<Coordinate<f64>> {
    match raw.split_once(',') {
        Some((x, y)) => Ok(Coordinate {
            x: x.trim().parse()?,
            y: y.trim().parse()?,
        }),
        None => bail!("Expected a coordinate as X,Y, got {}", raw),
    }
}

/// `--value`, otherwise the value of the cell under `--at`.
fn resolve_pixel_value(raster: &RasterGrid, args: &ArgMatches) -> anyhow::Result<Option<f64>> {
    if let Some(value) = parse_arg::<f64>(args, "value")? {
        return Ok(Some(value));
    }

    let coord = match args.value_of("at") {
        Some(raw) => parse_coordinate(raw)?,
        None => return Ok(None),
    };

    match raster.value_at(coord) {
        Some(value) if !value.is_nan() => {
            println!("ℹ️  Picked pixel value {} at ({}, {})", value, coord.x, coord.y);
            Ok(Some(value))
        }
        Some(_) => bail!("The cell at ({}, {}) holds no data", coord.x, coord.y),
        None => bail!("({}, {}) lies outside the raster", coord.x, coord.y),
    }
}

impl NetworkCommand for RasterToLine {
    fn get_description(&self) -> &'static str {
        "Link raster cells carrying one pixel value into a line network (GeoJSON)."
    }

    fn args(&self, app: App<'static>) -> App<'static> {
        app.arg(
            Arg::new("value")
                .long("value")
                .takes_value(true)
                .value_name("PIXEL_VALUE")
                .help("Pixel value of the cells to extract"),
        )
        .arg(
            Arg::new("at")
                .long("at")
                .takes_value(true)
                .allow_hyphen_values(true)
                .value_name("X,Y")
                .conflicts_with("value")
                .help("Extract the pixel value found at this world coordinate"),
        )
        .arg(
            Arg::new("max-distance")
                .long("max-distance")
                .takes_value(true)
                .value_name("DISTANCE")
                .help("Link cells closer than this, defaults to the pixel diagonal"),
        )
    }

    fn exec(&self, input_path: &Path, output_path: &Path, args: &ArgMatches) -> anyhow::Result<()> {
        let start = Instant::now();

        if let Some(dir) = output_path.parent() {
            if !dir.as_os_str().is_empty() && !dir.is_dir() {
                bail!("Output directory {} does not exist", dir.display());
            }
        }

        let config = load_config(self.config.as_ref(), args.value_of("config").map(Path::new))?;

        let now = Instant::now();
        println!("▶️  Loading raster");
        let mut raster = load_raster(input_path)?;
        if let Some(transform) = config.transform()? {
            raster = raster.with_transform(transform);
        }
        if config.truncate_to_integer {
            raster = raster.truncate_to_integer();
        }
        let (columns, rows) = raster.dimensions();
        println!("✔️  Loaded {}x{} raster in {}ms", columns, rows, now.elapsed().as_millis());

        let pixel_value = match resolve_pixel_value(&raster, args)?.or(config.pixel_value) {
            Some(v) => v,
            None => bail!("No pixel value given, use --value, --at or pixelValue in the config"),
        };

        let points = match sample(&raster, pixel_value) {
            Ok(points) => points,
            Err(e @ NetworkError::EmptySelection(_)) => {
                println!("⚠️  {}, nothing to write", e);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        println!("ℹ️  Found {} cells with value {}", points.len(), pixel_value);

        let max_distance = match parse_arg::<f64>(args, "max-distance")?.or(config.max_distance) {
            Some(d) => d,
            None => default_max_distance(raster.transform().pixel_width),
        };

        let now = Instant::now();
        println!("▶️  Linking cells closer than {}", max_distance);
        let segments = link(&points, max_distance);
        println!("✔️  Linked {} segments in {}ms", segments.len(), now.elapsed().as_millis());

        let mut feature = Feature::new(Geometry::MultiLineString(to_multi_line_string(&segments)));
        feature.properties.insert("pixel_value".to_string(), PropertyValue::Number(pixel_value));
        feature.properties.insert("max_distance".to_string(), PropertyValue::Number(max_distance));
        let collection: FeatureCollection = vec![feature].into_iter().collect();

        let now = Instant::now();
        println!("▶️  Writing {}", output_path.display());
        write_geo_json(output_path, &collection.to_geo_json())?;
        println!("✔️  Wrote lines in {}ms", now.elapsed().as_millis());

        println!("\n    🎉  Finished in {}ms", start.elapsed().as_millis());

        Ok(())
    }
}
