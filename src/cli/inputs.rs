//! Resolve command - print the effective inputs of one evaluation

use crate::cli::Cli;
use crate::client::{CachedFetcher, HttpOptions, Transport, UreqTransport};
use crate::config::Config;
use crate::error::HydraResult;
use crate::graph::{ResolveOptions, Session};
use crate::report::{self, OutputFormat};
use crate::resolve::Resolution;
use crate::ui::{self, TaskSpinner, UiContext};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Execute the command
pub async fn execute(cli: &Cli, config: &Config) -> HydraResult<()> {
    let format = cli.format.unwrap_or(config.output.format);
    let transport: Arc<dyn Transport> = Arc::new(UreqTransport::new(http_options(cli, config)));
    debug!("Using {} transport", transport.transport_name());

    let session = Session::new(
        CachedFetcher::new(&cli.url, transport),
        resolve_options(cli, config),
    );

    let resolution = match format {
        OutputFormat::Table => resolve_with_progress(&session, cli).await?,
        OutputFormat::Json | OutputFormat::Plain => session.resolve(cli.eval).await?,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report::render(format, &resolution, &mut out)
}

async fn resolve_with_progress(session: &Session, cli: &Cli) -> HydraResult<Resolution> {
    let ctx = UiContext::detect();
    ui::intro(&ctx, &format!("Evaluation {}", cli.eval));
    ui::remark(&ctx, session.fetcher().base_url());

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start("Resolving inputs...");

    let resolve = session.resolve(cli.eval);
    tokio::pin!(resolve);
    let mut ticker = tokio::time::interval(Duration::from_millis(150));
    let result = loop {
        tokio::select! {
            result = &mut resolve => break result,
            _ = ticker.tick() => spinner.message(&format!(
                "Resolving inputs... ({} requests)",
                session.fetcher().request_count()
            )),
        }
    };

    let requests = session.fetcher().request_count();
    match result {
        Ok(resolution) => {
            spinner.stop(&format!(
                "Resolved {} inputs with {} requests",
                resolution.inputs.len(),
                requests
            ));
            Ok(resolution)
        }
        Err(e) => {
            spinner.stop_error(&format!("Resolution failed after {} requests", requests));
            Err(e)
        }
    }
}

fn http_options(cli: &Cli, config: &Config) -> HttpOptions {
    let mut options = config.server.http_options();
    if let Some(secs) = cli.timeout {
        options.timeout = Duration::from_secs(secs);
    }
    options
}

fn resolve_options(cli: &Cli, config: &Config) -> ResolveOptions {
    let mut options = config.resolve.options();
    if let Some(depth) = cli.max_depth {
        options.max_depth = depth;
    }
    if cli.no_prefetch {
        options.prefetch = false;
    }
    options
}
