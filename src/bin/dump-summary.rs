use docopt::Docopt;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::{fs, io, path};

use glimp_replay::Stream;

const USAGE: &'static str = "
Summarize recorded replay frames.

Usage:
  dump-summary [--check] <dir>...

Options:
  --check    Exit with an error status if any frame's files are incomplete.
";

#[derive(Debug, Deserialize)]
struct Args {
    flag_check: bool,
    arg_dir: Vec<String>,
}

/// The frame numbers with a main stream in `dir`.
fn frame_numbers(dir: &path::Path) -> io::Result<BTreeSet<u32>> {
    let mut frames = BTreeSet::new();
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        let name = match name.to_str() {
            Some(name) => name,
            None => continue,
        };
        let number = name
            .strip_prefix("frame_")
            .and_then(|rest| rest.strip_suffix(".c"))
            .and_then(|digits| digits.parse().ok());
        if let Some(number) = number {
            frames.insert(number);
        }
    }
    Ok(frames)
}

#[derive(Debug, Default)]
struct Summary {
    draws: usize,
    textures: usize,
    matrices: usize,
    program_switches: usize,
    incomplete: Vec<String>,
}

fn summarize(dir: &path::Path, frame: u32) -> io::Result<Summary> {
    let mut summary = Summary::default();
    for &stream in Stream::ALL.iter() {
        let name = stream.file_name(frame);
        let text = match fs::read_to_string(dir.join(&name)) {
            Ok(text) => text,
            // Frames recorded without the limare stream.
            Err(e) if e.kind() == io::ErrorKind::NotFound && stream == Stream::Limare => continue,
            Err(e) => return Err(e),
        };
        if !text.ends_with(&stream.trailer(frame)) {
            log::warn!("{} is missing its trailer", name);
            summary.incomplete.push(name);
        }
        if stream == Stream::Main {
            summary.draws = text.matches("(&Draw_").count();
            summary.textures = text.matches("\ttexture_upload(").count();
            summary.matrices = text.matches("\tglLoadMatrixf(Matrix_").count();
            summary.program_switches = text.matches("\tprogram_switch(").count();
        }
    }
    Ok(summary)
}

fn main() -> io::Result<()> {
    pretty_env_logger::init();

    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    let mut incomplete = 0;
    for dir in &args.arg_dir {
        let dir = path::Path::new(dir);
        let frames = frame_numbers(dir)?;
        log::debug!("{}: {} frames", dir.display(), frames.len());

        for frame in frames {
            let summary = summarize(dir, frame)?;
            println!(
                "{}: frame {:4}: {:4} draws, {:3} textures, {:3} matrices, {:3} program switches{}",
                dir.display(),
                frame,
                summary.draws,
                summary.textures,
                summary.matrices,
                summary.program_switches,
                if summary.incomplete.is_empty() { "" } else { " (incomplete)" }
            );
            incomplete += summary.incomplete.len();
        }
    }

    if args.flag_check && incomplete > 0 {
        eprintln!("{} incomplete files", incomplete);
        std::process::exit(1);
    }
    Ok(())
}
