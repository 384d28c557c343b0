mod clap_command;
mod raster2line;
mod shortest_path;

use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use clap::{App, ArgMatches};

pub use clap_command::ClapCommand;
pub use raster2line::RasterToLine;
pub use shortest_path::ShortestPath;

pub trait NetworkCommand {
    fn get_description(&self) -> &'static str;

    /// Adds the command specific arguments.
    fn args(&self, app: App<'static>) -> App<'static> {
        app
    }

    fn exec(&self, input_path: &Path, output_path: &Path, args: &ArgMatches) -> anyhow::Result<()>;
}

fn parse_arg<T>(args: &ArgMatches, name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    args.value_of(name)
        .map(|raw| {
            raw.parse::<T>()
                .with_context(|| format!("Invalid value for --{}: {}", name, raw))
        })
        .transpose()
}

#[cfg(test)]
pub struct DummyNetworkCommand {}

#[cfg(test)]
impl NetworkCommand for DummyNetworkCommand {
    fn get_description(&self) -> &'static str {
        "dummy"
    }

    fn exec(&self, _: &Path, _: &Path, _: &ArgMatches) -> anyhow::Result<()> {
        Ok(())
    }
}
