use std::{
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
    thread,
};

use anyhow::Context as _;
use clap::Parser;
use minilogo::{Geometry, Session};
use minilogo_host::{SvgDevice, TermConsole};

#[derive(Parser, Debug)]
struct Args {
    /// A script to run. Without one, lines are read from stdin.
    input: Option<PathBuf>,

    /// A procedure file to load before starting.
    #[arg(long)]
    load: Option<PathBuf>,

    /// Where to write the drawing when the session ends.
    #[arg(long, default_value = "turtle.svg")]
    svg: PathBuf,

    #[arg(long, default_value_t = 640.0)]
    width: f64,

    #[arg(long, default_value_t = 480.0)]
    height: f64,

    #[command(flatten)]
    config: minilogo::Config,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    // Every level of nested calls costs real stack, so size it to the depth limit.
    let stack = args.config.stack_size();
    log::debug!("running with a {stack} byte stack");
    thread::Builder::new()
        .stack_size(stack)
        .spawn(move || run(args))
        .context("failed to start the interpreter thread")?
        .join()
        .map_err(|_| anyhow::anyhow!("the interpreter thread panicked"))?
}

fn run(args: Args) -> anyhow::Result<()> {
    let max_line = args.config.max_line;
    let console = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open input file {}", path.display()))?;
            TermConsole::script(BufReader::new(file), max_line)
        }
        None if termion::is_tty(&io::stdin()) => TermConsole::terminal(max_line),
        None => TermConsole::script(BufReader::new(io::stdin()), max_line),
    };
    let device = SvgDevice::new(Geometry {
        width: args.width,
        height: args.height,
    });

    let mut session = Session::new(device, console, args.config);
    if let Some(path) = &args.load {
        let count = session
            .env
            .load_procs(path)
            .with_context(|| format!("failed to load procedures from {}", path.display()))?;
        log::info!("loaded {count} procedures");
    }
    session.run()?;

    session
        .env
        .screen
        .device
        .save(&args.svg)
        .with_context(|| format!("failed to write {}", args.svg.display()))?;
    log::info!("wrote {}", args.svg.display());
    Ok(())
}
