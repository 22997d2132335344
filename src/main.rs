use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use typecast::{Director, DirectorConfig, Immediate, MemoryTarget, Pacer, RealTime};

#[derive(Parser, Debug)]
#[command(
    name = "typecast",
    about = "Play a typecast script into a text buffer, one keystroke at a time",
    version
)]
struct Args {
    /// Path to the script file
    #[arg(short, long)]
    script: PathBuf,

    /// File holding the initial buffer (empty if omitted)
    #[arg(short, long)]
    target: Option<PathBuf>,

    /// Write the final buffer here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Index of the block to play
    #[arg(short, long, default_value_t = 0, conflicts_with = "all")]
    block: usize,

    /// Play every block in order
    #[arg(long)]
    all: bool,

    /// List the script's blocks and exit
    #[arg(long)]
    list: bool,

    /// Ignore delays
    #[arg(long)]
    instant: bool,

    /// Redraw the buffer on stdout after every step
    #[arg(long)]
    render: bool,

    /// Seed for the delay generator
    #[arg(long)]
    seed: Option<u64>,

    /// YAML file with timing settings
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let source = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read script file: {}", args.script.display()))?;

    let mut config = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            DirectorConfig::from_yaml(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        }
        None => DirectorConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let mut director = Director::new(config);
    director
        .bind_source(&source)
        .with_context(|| format!("No script blocks in {}", args.script.display()))?;

    if args.list {
        for (index, block) in director.blocks().iter().enumerate() {
            let first = block.text.lines().next().unwrap_or_default();
            println!("{index}: {first}");
        }
        return Ok(());
    }

    let initial = match &args.target {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read target file: {}", path.display()))?,
        None => String::new(),
    };
    let mut target = MemoryTarget::with_text(&initial);

    if args.render {
        director.engine_mut().set_frame_handler(|text, _cursor| {
            print!("\x1B[2J\x1B[1;1H{text}");
            let _ = std::io::stdout().flush();
        });
    }

    let mut pacer: Box<dyn Pacer> = if args.instant {
        Box::new(Immediate)
    } else {
        Box::new(RealTime)
    };

    let runs = if args.all {
        director.blocks().len()
    } else {
        if !director.select(args.block) {
            bail!(
                "Block {} out of range, the script has {} block(s)",
                args.block,
                director.blocks().len()
            );
        }
        1
    };

    for _ in 0..runs {
        let index = director.index();
        director
            .run_current(&mut target, pacer.as_mut())
            .await
            .with_context(|| format!("Failed to play block {index}"))?;
    }

    match &args.output {
        Some(path) => std::fs::write(path, target.text())
            .with_context(|| format!("Failed to write output file: {}", path.display()))?,
        None => {
            if args.render {
                println!();
            }
            print!("{}", target.text());
            std::io::stdout().flush()?;
        }
    }

    Ok(())
}
