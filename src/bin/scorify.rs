use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about = "Convert a MIDI file to two-staff MusicXML sheet music")]
struct Opt {
    /// Input Standard MIDI File
    input: PathBuf,
    /// Output MusicXML path
    output: PathBuf,
    /// Work title shown on the score
    title: Option<String>,
}

fn main() {
    env_logger::init();
    let opt = Opt::parse();

    if let Err(err) = scorify::convert_midi_file(&opt.input, &opt.output, opt.title.as_deref()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
    println!(
        "Converted {} to {}",
        opt.input.display(),
        opt.output.display()
    );
}
