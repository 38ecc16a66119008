// Grademark entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Load the submission file named on the command line, if any
// 4. Run the TUI until the grader quits

use std::path::PathBuf;

use anyhow::Context;
use grademark_core::config;
use grademark_tui::App;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("grademark starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: columns [{}, {}, {}], exports to {}",
        config.columns.image_1,
        config.columns.image_2,
        config.columns.rubric,
        config.export.directory.display()
    );

    let mut app = App::new(config);

    // 3. Optional file argument; failures show up on the message line.
    if let Some(path) = std::env::args_os().nth(1) {
        app.load_file(PathBuf::from(path));
    }

    // 4. Run the TUI (blocks until quit)
    if let Err(e) = grademark_tui::run(&mut app).await {
        error!("TUI error: {}", e);
        return Err(e);
    }

    let progress = app.session.progress();
    info!(
        "grademark shut down cleanly ({}/{} graded)",
        progress.graded, progress.total
    );
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("grademark.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("grademark_core=info,grademark_tui=info,grademark=info,warn")
        }))
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
