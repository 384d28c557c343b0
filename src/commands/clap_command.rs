use clap::{arg, App};
use std::path::{Path, PathBuf};
use anyhow::bail;

use crate::commands::NetworkCommand;


pub struct ClapCommand {
    pub identifier: String,
    pub exec: Box<dyn NetworkCommand>,
}

impl ClapCommand {
    pub fn new(identifier: &str, exec: Box<dyn NetworkCommand>) -> Self {
        ClapCommand { identifier: identifier.to_string(), exec }
    }

    pub fn register(&self) -> App<'static> {
        let app = App::new(self.identifier.clone())
            .about(self.exec.get_description())
            .arg(arg!(-i --input <INPUT> "Path to the input file"))
            .arg(arg!(-o --output <OUTPUT> "Path to the output"))
            .arg(arg!(-c --config [CONFIG] "Path to a JSON config file"));

        self.exec.args(app)
    }

    pub fn run(&self, args: &clap::ArgMatches) -> anyhow::Result<()> {
        let (input_path, output_path) = self.get_in_out_path_params(args)?;

        if !input_path.is_file() {
            bail!("Input path is not a file");
        }

        self.exec.exec(&input_path, &output_path, args)
    }

    fn get_in_out_path_params(&self, args: &clap::ArgMatches) -> anyhow::Result<(PathBuf, PathBuf)> {
        match (args.value_of("input"), args.value_of("output")) {
            (Some(input), Some(output)) => Ok((Path::new(input).to_path_buf(), Path::new(output).to_path_buf())),
            _ => bail!("Both --input and --output are required"),
        }
    }
}
