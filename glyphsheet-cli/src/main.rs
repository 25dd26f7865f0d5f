//! Normalizes a traced glyph sheet for one pass of a job.

mod debug;
mod sheet;

use std::path::PathBuf;

use glyphsheet::{JobDir, Pass, Pipeline, Settings};

use crate::{
    debug::DebugRecorder,
    sheet::{CliError, NormalizedOutput},
};

/// File written to the job directory with the normalized glyphs.
const OUTPUT_FILE: &str = "normalized.json";
/// File written to the job directory with the reference lines.
const REF_LINES_FILE: &str = "ref_lines.json";

#[derive(clap::Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Merge, measure and normalize the glyphs of a traced sheet
    Normalize {
        /// Traced sheet: a JSON object with `paths` and optional `bboxes`
        #[arg(long)]
        input: PathBuf,
        /// Directory holding the files shared by the passes of a job
        #[arg(long)]
        job_dir: PathBuf,
        /// Reuse the cluster centers stored by the first pass of the job
        #[arg(long)]
        regenerate: bool,
        /// Write SVG diagnostics to this directory
        #[arg(long)]
        debug_dir: Option<PathBuf>,
        /// JSON file overriding the default settings
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    env_logger::init();
    use clap::Parser as _;
    let args = Args::parse();
    if let Err(e) = run(args.command) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Normalize {
            input,
            job_dir,
            regenerate,
            debug_dir,
            config,
        } => {
            let settings = match config {
                Some(path) => sheet::read_json::<Settings>(&path)?,
                None => Settings::default(),
            };
            let store = sheet::read_sheet(&input)?;
            let pass = if regenerate {
                Pass::Regenerate
            } else {
                Pass::Initial
            };
            log::info!("{pass:?} pass over {} shapes from {input:?}", store.len());

            let mut job = JobDir::new(job_dir);
            let pipeline = Pipeline::new(settings);
            log::debug!("{:?}", pipeline.settings());
            let result = match &debug_dir {
                Some(dir) => {
                    let mut recorder = DebugRecorder::default();
                    let result = pipeline.run_with_observer(store, &mut job, pass, &mut recorder);
                    // diagnostics are written even when the pass fails
                    recorder.write_to(dir)?;
                    result?
                }
                None => pipeline.run(store, &mut job, pass)?,
            };

            let output = NormalizedOutput::from(result);
            job.write(REF_LINES_FILE, &sheet::to_json(&output.reference_lines)?)?;
            let path = job.write(OUTPUT_FILE, &sheet::to_json(&output)?)?;
            log::info!(
                "wrote {} glyphs at scale {:.3} to {path:?}",
                output.paths.len(),
                output.scale
            );
            Ok(())
        }
    }
}
