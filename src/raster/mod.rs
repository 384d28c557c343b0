mod grid;
mod parser;
mod transform;

use flate2::bufread::GzDecoder;
use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

pub use grid::RasterGrid;
pub use parser::AsciiGridParser;
pub use transform::AffineTransform;

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;

    use crate::raster::load_raster;
    use crate::test::with_input_and_output_paths;

    const GRID: &str = "ncols 2\nnrows 1\nxllcorner 0\nyllcorner 0\ncellsize 1\n3 4\n";

    #[test]
    fn loads_plain_grid() {
        with_input_and_output_paths(|input_path, _| {
            let path = input_path.join("labels.asc");
            File::create(&path).unwrap().write_all(GRID.as_bytes()).unwrap();

            let grid = load_raster(&path).unwrap();
            assert_eq!(grid.value(1, 0), Some(4.0));
        })
        .unwrap();
    }

    #[test]
    fn loads_gzipped_grid() {
        with_input_and_output_paths(|input_path, _| {
            let path = input_path.join("labels.asc.gz");
            let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
            encoder.write_all(GRID.as_bytes()).unwrap();
            encoder.finish().unwrap();

            let grid = load_raster(&path).unwrap();
            assert_eq!(grid.dimensions(), (2, 1));
        })
        .unwrap();
    }

    #[test]
    fn missing_file_is_an_error() {
        with_input_and_output_paths(|input_path, _| {
            assert!(load_raster(&input_path.join("nope.asc")).is_err());
        })
        .unwrap();
    }
}

/// Loads an ESRI ASCII grid, gzip-compressed when the file name ends in `.gz`.
pub fn load_raster(path: &Path) -> anyhow::Result<RasterGrid> {
    let file = File::open(path)?;
    let mut buf = BufReader::new(file);

    let mut s = String::new();
    if path.extension().map_or(false, |ext| ext == "gz") {
        GzDecoder::new(buf).read_to_string(&mut s)?;
    } else {
        buf.read_to_string(&mut s)?;
    }

    let raster = AsciiGridParser::parse(&s)?;

    tracing::debug!(
        path = %path.display(),
        columns = raster.dimensions().0,
        rows = raster.dimensions().1,
        transform = ?raster.transform().coefficients(),
        "loaded raster"
    );

    Ok(raster)
}
