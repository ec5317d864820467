//! Commandline entry point for terminal previews of nifti files.

use clap::Parser;

use niiview::{OutputSink, Result};

// use clap to create commandline interface
#[derive(Parser, Debug)]
#[command(author, about, version)]
struct Args {
    /// the input nifti (or png/jpeg) file
    file: String,

    /// use the built-in sixel encoder instead of imgcat
    #[arg(long, conflicts_with = "lb")]
    ls: bool,

    /// pipe the preview through img2sixel instead of imgcat
    #[arg(long)]
    lb: bool,

    /// resolution for plotting
    #[arg(short, long, default_value_t = 200, value_parser = clap::value_parser!(u32).range(1..))]
    dpi: u32,

    /// show the slices at this index instead of the middle of each axis
    #[arg(short, long)]
    slice: Option<usize>,
}

fn run(args: &Args) -> Result<()> {
    let sink = if args.ls {
        OutputSink::Sixel
    } else if args.lb {
        OutputSink::SixelBinary
    } else {
        OutputSink::Imgcat
    };
    log::debug!("rendering {} at {} dpi via {:?}", args.file, args.dpi, sink);
    let canvas = niiview::preview(&args.file, args.dpi, args.slice)?;
    sink.write(&canvas)
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error! {}", e);
        std::process::exit(1);
    }
}
