use anyhow::{bail, Context};
use clap::{App, Arg, ArgMatches};
use geo::Geometry;

use std::path::Path;
use std::time::Instant;

use crate::commands::{parse_arg, NetworkCommand};
use crate::config::{load_config, ConfigParser};
use crate::feature::{load_geo_json, write_geometry};
use crate::network::{shortest_path, GraphBuilder, NodeIdentity};

#[cfg(test)]
#[allow(unused_must_use)]
mod tests {
    use std::fs;
    use std::path::Path;

    use serde_json::json;

    use crate::commands::shortest_path::output_stem;
    use crate::commands::{ClapCommand, RasterToLine, ShortestPath};
    use crate::config::SerdeConfigParser;
    use crate::test::with_input_and_output_paths;

    const SQUARE: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {}, "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 0]]}},
        {"type": "Feature", "properties": {}, "geometry": {"type": "LineString", "coordinates": [[1, 0], [1, 1]]}},
        {"type": "Feature", "properties": {}, "geometry": {"type": "LineString", "coordinates": [[1, 1], [0, 1]]}},
        {"type": "Feature", "properties": {}, "geometry": {"type": "LineString", "coordinates": [[0, 0], [0, 1]]}},
        {"type": "Feature", "properties": {}, "geometry": {"type": "LineString", "coordinates": [[7, 7], [8, 8]]}}
    ]}"#;

    fn run(input: &Path, output: &Path, extra: &[&str]) -> anyhow::Result<()> {
        let cmd = ClapCommand::new("shortest_path", Box::new(ShortestPath::new(Box::new(SerdeConfigParser {}))));
        let mut args = vec![
            "shortest_path".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-o".to_string(),
            output.to_string_lossy().to_string(),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));

        let matches = cmd.register().try_get_matches_from(args)?;
        cmd.run(&matches)
    }

    fn read_json(path: &Path) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn writes_nodes_and_path() {
        with_input_and_output_paths(|input_path, output_path| {
            let input = input_path.join("square.geojson");
            fs::write(&input, SQUARE).unwrap();

            run(&input, &output_path, &["--start", "0", "--end", "2"]).unwrap();

            let nodes = read_json(&output_path.join("square_nodes.geojson"));
            assert_eq!(nodes["type"], json!("MultiPoint"));
            // the island is not part of the network
            assert_eq!(nodes["coordinates"].as_array().unwrap().len(), 4);

            let path = read_json(&output_path.join("square_path.geojson"));
            assert_eq!(path["type"], json!("LineString"));
            let coords = path["coordinates"].as_array().unwrap();
            assert_eq!(coords.len(), 3);
            assert_eq!(coords[0], json!([0.0, 0.0]));
            assert_eq!(coords[2], json!([1.0, 1.0]));
        });
    }

    #[test]
    fn out_of_range_node_fails_after_writing_nodes() {
        with_input_and_output_paths(|input_path, output_path| {
            let input = input_path.join("square.geojson");
            fs::write(&input, SQUARE).unwrap();

            assert!(run(&input, &output_path, &["--start", "0", "--end", "4"]).is_err());
            assert!(output_path.join("square_nodes.geojson").is_file());
            assert!(!output_path.join("square_path.geojson").exists());
        });
    }

    #[test]
    fn config_can_keep_every_component() {
        with_input_and_output_paths(|input_path, output_path| {
            let input = input_path.join("square.geojson");
            fs::write(&input, SQUARE).unwrap();
            let config = input_path.join("config.json");
            fs::write(&config, r#"{"keepAllComponents": true}"#).unwrap();

            // nodes 4 and 5 are the island
            run(&input, &output_path, &["--start", "4", "--end", "5", "--config", config.to_str().unwrap()]).unwrap();

            let nodes = read_json(&output_path.join("square_nodes.geojson"));
            assert_eq!(nodes["coordinates"].as_array().unwrap().len(), 6);

            let path = read_json(&output_path.join("square_path.geojson"));
            assert_eq!(path["coordinates"], json!([[7.0, 7.0], [8.0, 8.0]]));
        });
    }

    #[test]
    fn requires_start_end_and_output_directory() {
        with_input_and_output_paths(|input_path, output_path| {
            let input = input_path.join("square.geojson");
            fs::write(&input, SQUARE).unwrap();

            assert!(run(&input, &output_path, &["--start", "0"]).is_err());
            assert!(run(&input, &output_path, &["--start", "-1", "--end", "2"]).is_err());
            assert!(run(&input, &output_path.join("square.geojson"), &["--start", "0", "--end", "2"]).is_err());
        });
    }

    #[test]
    fn empty_network_fails() {
        with_input_and_output_paths(|input_path, output_path| {
            let input = input_path.join("points.geojson");
            fs::write(&input, r#"{"type": "Point", "coordinates": [1, 2]}"#).unwrap();

            assert!(run(&input, &output_path, &["--start", "0", "--end", "0"]).is_err());
        });
    }

    #[test]
    fn routes_through_extracted_raster_lines() {
        with_input_and_output_paths(|input_path, output_path| {
            let raster = input_path.join("labels.asc");
            fs::write(&raster, "ncols 3\nnrows 3\nxllcorner 0\nyllcorner 0\ncellsize 1\n\
                1 1 1\n\
                0 0 1\n\
                0 0 1\n").unwrap();
            let lines = input_path.join("labels.geojson");

            let extract = ClapCommand::new("raster2line", Box::new(RasterToLine::new(Box::new(SerdeConfigParser {}))));
            let matches = extract.register().try_get_matches_from(vec![
                "raster2line",
                "-i", raster.to_str().unwrap(),
                "-o", lines.to_str().unwrap(),
                "--value", "1",
            ]).unwrap();
            extract.run(&matches).unwrap();

            run(&lines, &output_path, &["--start", "0", "--end", "4"]).unwrap();

            let path = read_json(&output_path.join("labels_path.geojson"));
            let coords = path["coordinates"].as_array().unwrap();
            assert_eq!(coords.first().unwrap(), &json!([0.5, 2.5]));
            assert_eq!(coords.last().unwrap(), &json!([2.5, 0.5]));
        });
    }

    #[test]
    fn output_stem_strips_known_extensions() {
        assert_eq!(output_stem(Path::new("/data/roads.geojson")), "roads");
        assert_eq!(output_stem(Path::new("roads.geojson.gz")), "roads");
        assert_eq!(output_stem(Path::new("roads.json")), "roads");
        assert_eq!(output_stem(Path::new("roads")), "roads");
    }
}

pub struct ShortestPath {
    config: Box<dyn ConfigParser>,
}

impl ShortestPath {
    pub fn new(config: Box<dyn ConfigParser>) -> Self {
        ShortestPath { config }
    }
}

/// File name without `.gz`, `.geojson` or `.json`.
fn output_stem(input_path: &Path) -> String {
    let name = input_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(&name);

    [".geojson", ".json"]
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(name)
        .to_string()
}

impl NetworkCommand for ShortestPath {
    fn get_description(&self) -> &'static str {
        "Route the shortest path between two nodes of a line network (GeoJSON)."
    }

    fn args(&self, app: App<'static>) -> App<'static> {
        app.arg(
            Arg::new("start")
                .long("start")
                .takes_value(true)
                .required(true)
                .value_name("NODE")
                .help("Index of the start node"),
        )
        .arg(
            Arg::new("end")
                .long("end")
                .takes_value(true)
                .required(true)
                .value_name("NODE")
                .help("Index of the end node"),
        )
    }

    fn exec(&self, input_path: &Path, output_path: &Path, args: &ArgMatches) -> anyhow::Result<()> {
        let start = Instant::now();

        if !output_path.is_dir() {
            bail!("Output path is not a directory");
        }

        let config = load_config(self.config.as_ref(), args.value_of("config").map(Path::new))?;
        let start_node = parse_arg::<usize>(args, "start")?.context("Missing --start")?;
        let end_node = parse_arg::<usize>(args, "end")?.context("Missing --end")?;

        let now = Instant::now();
        println!("▶️  Loading line network");
        let features = load_geo_json(input_path)?;
        let mut builder = GraphBuilder::default().with_node_identity(NodeIdentity::from_precision(config.snap_precision));
        if config.keep_all_components {
            builder = builder.keep_all_components();
        }
        let graph = builder.build(features.line_strings())?;
        println!("✔️  Loaded network in {}ms", now.elapsed().as_millis());
        println!("ℹ️  Network has {} nodes and {} edges", graph.node_count(), graph.edge_count());

        let stem = output_stem(input_path);

        let nodes_path = output_path.join(format!("{}_nodes.geojson", stem));
        write_geometry(&nodes_path, &Geometry::MultiPoint(graph.nodes_multi_point()))?;
        println!("✔️  Wrote network nodes to {}", nodes_path.display());

        let now = Instant::now();
        let describe = |index: usize| match graph.node(index) {
            Some(c) => format!("node {} ({}, {})", index, c.x, c.y),
            None => format!("node {}", index),
        };
        println!("▶️  Routing from {} to {}", describe(start_node), describe(end_node));
        let route = shortest_path(&graph, start_node, end_node)?;
        println!(
            "✔️  Found path of length {} over {} edges in {}ms",
            route.distance,
            route.segments.len(),
            now.elapsed().as_millis()
        );
        println!("ℹ️  Path visits nodes {:?}", route.nodes);

        let path_path = output_path.join(format!("{}_path.geojson", stem));
        write_geometry(&path_path, &Geometry::LineString(route.path))?;
        println!("✔️  Wrote path to {}", path_path.display());

        println!("\n    🎉  Finished in {}ms", start.elapsed().as_millis());

        Ok(())
    }
}
