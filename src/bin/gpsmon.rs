use std::env;
use std::path::PathBuf;

use gpsmon::MonitorConfig;

fn print_usage() {
    eprintln!("Usage: gpsmon [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --headless          Poll and log instead of drawing the TUI");
    eprintln!("  --url <BASE>        Tracker base URL (default: from config)");
    eprintln!("  --config <PATH>     Config file (default: platform config dir)");
    eprintln!("  -h, --help          Show this help");
    eprintln!();
    eprintln!("RUST_LOG controls log verbosity in headless mode.");
}

#[tokio::main]
async fn main() -> gpsmon::Result<()> {
    let mut headless = false;
    let mut url: Option<String> = None;
    let mut config_path: Option<PathBuf> = None;

    let args: Vec<String> = env::args().skip(1).collect();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--headless" => headless = true,
            "--url" => {
                i += 1;
                if i < args.len() {
                    url = Some(args[i].clone());
                } else {
                    eprintln!("Error: --url requires a value");
                    std::process::exit(1);
                }
            }
            "--config" => {
                i += 1;
                if i < args.len() {
                    config_path = Some(PathBuf::from(&args[i]));
                } else {
                    eprintln!("Error: --config requires a value");
                    std::process::exit(1);
                }
            }
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Error: unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    // In TUI mode keep the logger quiet so stray writes don't tear the
    // alternate screen; RUST_LOG still overrides either default.
    let default_level = if headless { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let path = config_path.unwrap_or_else(MonitorConfig::default_path);
    let mut config = MonitorConfig::load_or_create(&path)?;
    if let Some(url) = url {
        config = config.with_base_url(&url);
    }

    if headless {
        #[cfg(feature = "tui")]
        {
            gpsmon::tui::run_headless(config).await
        }
        #[cfg(not(feature = "tui"))]
        {
            let _ = config;
            eprintln!("Built without the 'tui' feature; rebuild with default features");
            std::process::exit(1);
        }
    } else {
        #[cfg(feature = "tui")]
        {
            gpsmon::tui::run(config).await
        }
        #[cfg(not(feature = "tui"))]
        {
            let _ = config;
            eprintln!("Built without the 'tui' feature; rebuild with default features");
            std::process::exit(1);
        }
    }
}
