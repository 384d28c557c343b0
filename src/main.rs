use clap::{app_from_crate, arg, AppSettings};
use crate::commands::{ClapCommand, RasterToLine, ShortestPath};
use crate::config::SerdeConfigParser;

mod commands;
mod config;
mod error;
mod extract;
mod feature;
mod network;
mod raster;
#[cfg(test)]
mod test;

fn main() {
    let args: Vec<_> = std::env::args().collect();

    if let Err(e) = execute(&args) {
        println!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn execute(input: &[String]) -> anyhow::Result<()> {
    let commands: Vec<ClapCommand> = vec![
        ClapCommand::new("raster2line", Box::new(RasterToLine::new(Box::new(SerdeConfigParser {})))),
        ClapCommand::new("shortest_path", Box::new(ShortestPath::new(Box::new(SerdeConfigParser {})))),
        // Add commands here
    ];

    let mut app = app_from_crate!()
        .global_setting(AppSettings::PropagateVersion)
        .global_setting(AppSettings::UseLongFormatForHelpSubcommand)
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(arg!(-v --verbose "Print debug diagnostics to stderr").global(true));

    app = commands.iter().fold(app, |a, c| a.subcommand(c.register()));

    let matches = app.get_matches_from(input);

    init_tracing(matches.is_present("verbose"));

    match matches.subcommand() {
        Some((name, sub_matches)) => match commands.iter().find(|c| c.identifier == name) {
            Some(command) => command.run(sub_matches),
            None => unreachable!(),
        },
        None => unreachable!(),
    }
}
