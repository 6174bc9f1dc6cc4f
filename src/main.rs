use argh::FromArgs;
use mysh::{Config, Interpreter, RustylineReader, signals};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(FromArgs)]
/// A small interactive shell with aliases and persistent history.
struct Args {
    #[argh(option)]
    /// file holding command history (default: ~/.mysh_history)
    history_file: Option<PathBuf>,

    #[argh(option)]
    /// file holding aliases (default: ~/.mysh_aliases)
    alias_file: Option<PathBuf>,

    #[argh(option)]
    /// number of history entries to keep (default: 1000)
    history_size: Option<usize>,

    #[argh(option, short = 'c')]
    /// run one command line and exit
    command: Option<String>,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config::default();
        if let Some(path) = &self.history_file {
            config.history_file = path.clone();
        }
        if let Some(path) = &self.alias_file {
            config.alias_file = path.clone();
        }
        if let Some(size) = self.history_size {
            config.history_size = size;
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    // Logging is off unless MYSH_LOG asks for it.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_env("MYSH_LOG").unwrap_or_else(|_| EnvFilter::new("off")))
        .init();

    let args: Args = argh::from_env();
    let config = args.config();
    tracing::debug!("using {:?}", config);

    let mut interpreter = Interpreter::with_config(&config);

    if let Some(command) = args.command {
        if let Err(e) = interpreter.process_line(&command, &mut io::stdout(), &mut io::stderr()) {
            tracing::debug!("output failed for {:?}: {}", command, e);
        }
        interpreter.shutdown();
        return Ok(());
    }

    if let Err(e) = signals::install() {
        tracing::warn!("could not install signal handlers: {}", e);
    }
    let mut reader = RustylineReader::new(config.history_size)?;
    interpreter.repl(&mut reader);
    Ok(())
}
