use clap::Parser;
use log::*;
#[cfg(debug_assertions)]
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::{
    append::rolling_file::{
        RollingFileAppender,
        policy::compound::{
            CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
        },
    },
    config::{Appender, Config as LogConfig, Logger, Root},
    encode::pattern::PatternEncoder,
};
use scoreboard_common::{
    feeds::{NbaScoreSource, ScoreSource},
    teams::TeamId,
};
use std::{error::Error, path::PathBuf};
use tokio::time::{Instant, sleep_until};

mod clock_sync;
mod frame_sink;
mod game_manager;

mod config;
use config::{Config, Output};

/// One logger for the whole test binary, shared by every module's tests
#[cfg(test)]
mod test_log {
    use std::sync::Once;

    static INIT: Once = Once::new();

    pub fn initialize() {
        INIT.call_once(|| {
            let _ = env_logger::builder().is_test(true).try_init();
        });
    }

    #[test]
    fn test_initialize_is_repeatable() {
        initialize();
        initialize();
        assert!(env_logger::builder().is_test(true).try_init().is_err());
        initialize();
    }
}
use frame_sink::{FrameSink, JsonSink, LogSink};
use game_manager::GameStateMachine;

const APP_NAME: &str = "scoreboard";

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(long, short, action(clap::ArgAction::Count))]
    /// Increase the log verbosity
    verbose: u8,

    #[clap(long, short)]
    /// Team to follow (tricode or name), overrides the config file
    team: Option<TeamId>,

    #[clap(long)]
    /// Write frames to stdout as JSON lines instead of logging them
    json: bool,

    #[clap(long)]
    /// Don't require HTTPS to connect to the score feeds
    allow_http: bool,

    #[clap(long)]
    /// Directory within which log files will be placed, default is platform dependent
    log_location: Option<PathBuf>,

    #[clap(long, default_value = "5000000")]
    /// Max size in bytes that a log file is allowed to reach before being rolled over
    log_max_file_size: u64,

    #[clap(long, default_value = "3")]
    /// Number of archived logs to keep
    num_old_logs: u32,
}

fn init_logging(args: &Cli) -> Result<(), Box<dyn Error>> {
    let log_level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let log_base_path = match &args.log_location {
        Some(path) => path.clone(),
        None => {
            let mut path = directories::BaseDirs::new()
                .ok_or("Could not find a directory to store logs")?
                .data_local_dir()
                .to_path_buf();
            path.push("scoreboard-logs");
            path
        }
    };
    let mut log_path = log_base_path.clone();
    let mut archived_log_path = log_base_path;
    log_path.push(format!("{APP_NAME}-log.txt"));
    archived_log_path.push(format!("{APP_NAME}-log-{{}}.txt.gz"));

    #[cfg(debug_assertions)]
    println!("Log path: {}", log_path.display());

    // Only log to the console in debug mode
    #[cfg(debug_assertions)]
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("[{d} {h({l:5})} {M}] {m}{n}")))
        .build();

    // Setup the file log roller
    let roller = FixedWindowRoller::builder().build(
        archived_log_path
            .to_str()
            .ok_or("Log path is not valid UTF-8")?,
        args.num_old_logs,
    )?;
    let file_policy = CompoundPolicy::new(
        Box::new(SizeTrigger::new(args.log_max_file_size)),
        Box::new(roller),
    );
    let file_appender = RollingFileAppender::builder()
        .append(true)
        .encoder(Box::new(PatternEncoder::new("[{d} {l:5} {M}] {m}{n}")))
        .build(log_path, Box::new(file_policy))?;

    // Everything else only logs errors
    let root = Root::builder().appender("file_appender");
    #[cfg(debug_assertions)]
    let root = root.appender("console");
    let root = root.build(LevelFilter::Error);

    let log_config = LogConfig::builder()
        .appender(Appender::builder().build("file_appender", Box::new(file_appender)));

    #[cfg(debug_assertions)]
    let log_config = log_config.appender(Appender::builder().build("console", Box::new(console)));

    let log_config = log_config
        .logger(Logger::builder().build(APP_NAME, log_level))
        .logger(Logger::builder().build("scoreboard_common", log_level))
        .build(root)?;

    log4rs::init_config(log_config)?;
    Ok(())
}

fn load_config() -> Config {
    match confy::get_configuration_file_path(APP_NAME, None) {
        Ok(path) => info!("Reading config file from {path:?}"),
        Err(e) => warn!("Could not determine the config file location: {e}"),
    }

    match confy::load(APP_NAME, None) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file, overwriting with default. Error: {e}");
            let config = Config::default();
            if let Err(e) = confy::store(APP_NAME, None, &config) {
                error!("Failed to write default config file: {e}");
            }
            config
        }
    }
}

async fn run<S: ScoreSource, K: FrameSink>(source: S, config: Config, mut sink: K) {
    let frame_interval = config.timing.frame_interval;

    let mut engine =
        GameStateMachine::bootstrap(source, config.team, config.timing, Instant::now()).await;
    info!(
        "Following the {} ({} state)",
        engine.team(),
        engine.state()
    );

    let mut next_frame = Instant::now();
    loop {
        sleep_until(next_frame).await;
        let frame = engine.tick(Instant::now()).await;
        let sync = engine.sync();
        trace!(
            "Clock shown {:?}, feed {:?}, holding: {}",
            sync.current_display_seconds(),
            sync.target_seconds(),
            sync.is_holding()
        );
        sink.render(&frame);

        next_frame += frame_interval;
        let now = Instant::now();
        if next_frame < now {
            debug!(
                "Frame loop is {:?} behind, skipping ahead",
                now - next_frame
            );
            next_frame = now + frame_interval;
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    init_logging(&args)?;
    log_panics::init();

    info!("Starting Scoreboard");

    let mut config = load_config();
    if let Some(team) = args.team {
        config.team = team;
    }
    if args.json {
        config.output = Output::Json;
    }

    if let Ok(offset) = time::UtcOffset::current_local_offset() {
        if offset != config.schedule_feed.timezone {
            warn!(
                "The timezone in the config file ({}) does not match the detected system \
                 timezone ({offset}). The config timezone will be used.",
                config.schedule_feed.timezone
            );
        }
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let source = {
        let _guard = runtime.enter();
        NbaScoreSource::new(&config.live_feed, &config.schedule_feed, !args.allow_http)?
    };

    match config.output {
        Output::Log => runtime.block_on(run(source, config, LogSink::new())),
        Output::Json => runtime.block_on(run(source, config, JsonSink::new(std::io::stdout()))),
    }

    Ok(())
}
