use chrono::Utc;
use clap::Parser;
use fgsniffer::convert;
use fgsniffer::demux::DEFAULT_BASE_NAME;
use fgsniffer::demux::Demuxer;
use fgsniffer::parse::Assembler;
use std::fs::File;
use std::io;
use std::io::BufReader;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Convert FortiGate text sniffer dumps to pcap files",
    after_help = "On the FortiGate use\n    \
                  diagnose sniffer packet <interface> '<filter>' <3|6> <count> a\n\
                  to create a parsable dump."
)]
struct Args {
    /// Input dump file; reads standard input when omitted
    input: Option<PathBuf>,

    /// Base name for the output pcap files
    #[arg(short, long, default_value = DEFAULT_BASE_NAME)]
    base: String,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut assembler = Assembler::new(Utc::now());
    let mut demuxer = Demuxer::new(&args.base);

    let result = match &args.input {
        Some(path) => match File::open(path) {
            Ok(file) => convert(BufReader::new(file), &mut assembler, &mut demuxer),
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                process::exit(1);
            }
        },
        None => convert(io::stdin().lock(), &mut assembler, &mut demuxer),
    };
    if let Err(e) = result {
        eprintln!("{e}");
        process::exit(1);
    }

    for (name, count) in demuxer.summary() {
        println!("created output file {name} ({count} packets)");
    }
}
