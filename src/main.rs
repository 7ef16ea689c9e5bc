use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use assessment_tui::{AutosaveConfig, Config, Portal};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Open this assessment directly instead of the listing
    #[arg(short, long)]
    assessment: Option<u32>,

    /// Show the results of this survey round instead of the listing
    #[arg(short, long, conflicts_with = "assessment")]
    survey: Option<u32>,

    /// JSON catalog of assessments; the built-in catalog is used otherwise
    #[arg(short, long, env = "ASSESSMENT_CATALOG")]
    catalog: Option<PathBuf>,

    /// Directory where unfinished sessions are kept
    #[arg(long, env = "ASSESSMENT_DATA_DIR", default_value = assessment_tui::config::DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Log file; the terminal itself belongs to the interface
    #[arg(long, env = "ASSESSMENT_LOG_FILE", default_value = "assessment-tui.log")]
    log_file: PathBuf,

    /// Quiet period before progress is saved
    #[arg(long, default_value_t = 1500)]
    autosave_ms: u64,

    /// Longest time progress may stay unsaved while changes keep coming
    #[arg(long, default_value_t = 5000)]
    autosave_max_wait_ms: u64,

    /// Simulated scoring latency
    #[arg(long, default_value_t = 1500)]
    submit_delay_ms: u64,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            assessment: self.assessment,
            survey: self.survey,
            catalog: self.catalog.clone(),
            data_dir: self.data_dir.clone(),
            autosave: AutosaveConfig {
                debounce: Duration::from_millis(self.autosave_ms),
                max_wait: Duration::from_millis(self.autosave_max_wait_ms),
            },
            submit_delay: Duration::from_millis(self.submit_delay_ms),
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match File::create(&args.log_file) {
        Ok(file) => {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("assessment_tui=info"));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        Err(e) => eprintln!("Logging disabled, cannot open {}: {}", args.log_file.display(), e),
    }

    let portal = match Portal::from_config(&args.config()) {
        Ok(portal) => portal,
        Err(e) => {
            eprintln!("Error starting assessments: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = portal.run().await {
        tracing::error!("portal stopped: {e}");
        eprintln!("Error running assessments: {}", e);
        std::process::exit(1);
    }
}
