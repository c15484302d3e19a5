use clap::Parser;
use log::{error, info};
use std::fs::File;
use std::io::{self, BufWriter};
use std::process::ExitCode;

use colo_tools::coco_dataset::{write_partition_listing, write_records};
use colo_tools::config::{FramesArgs, PartitionsArgs, RecordsArgs, SplitArgs};
use colo_tools::{
    Cli, Command, DatasetLoader, Error, FfmpegDecoder, FrameExtractor, Result, Splitter,
    YoloSplitter,
};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Split(args) => run_split(args),
        Command::Frames(args) => run_frames(args),
        Command::Records(args) => run_records(args),
        Command::Partitions(args) => run_partitions(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_split(args: &SplitArgs) -> Result<()> {
    info!("Splitting dataset at {}", args.root.display());
    let mut splitter = YoloSplitter::new(&args.root, args.classes.clone(), args.ratios()?, args.seed);
    splitter.split()?;
    info!("Split completed successfully.");
    Ok(())
}

fn run_frames(args: &FramesArgs) -> Result<()> {
    info!("Extracting frames from {}", args.source.display());
    let extractor = FrameExtractor::new(args.to_extractor_config(), FfmpegDecoder::new(&args.ffmpeg));
    let report = extractor.run()?;
    info!(
        "Wrote {} images, removed {} incomplete recordings",
        report.written.len(),
        report.removed.len()
    );
    Ok(())
}

fn run_records(args: &RecordsArgs) -> Result<()> {
    let loader = DatasetLoader::new(&args.root);
    let records = loader.load(args.partition, args.split)?;

    match &args.output {
        Some(path) => {
            let file = File::create(path).map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
            write_records(&mut BufWriter::new(file), &records).map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })
        }
        None => write_records(&mut BufWriter::new(io::stdout().lock()), &records)
            .map_err(stdout_error),
    }
}

fn run_partitions(args: &PartitionsArgs) -> Result<()> {
    let loader = DatasetLoader::new(&args.root);
    write_partition_listing(&mut io::stdout().lock(), &loader).map_err(stdout_error)
}

fn stdout_error(source: io::Error) -> Error {
    Error::Io {
        path: "<stdout>".into(),
        source,
    }
}
