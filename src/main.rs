use std::sync::Arc;

use blaze::core::config::{self, RouterConfig};
use blaze::fetch::{self, HttpTransport};
use blaze::{PrefetchStrategy, Router, Window};
use clap::Parser;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use url::Url;

#[derive(Parser)]
#[command(name = "blaze", about = "Client-side navigation without full page reloads")]
struct Args {
    /// Page to load first
    url: Url,

    /// Navigate to this path after loading (repeatable, in order)
    #[arg(short, long = "go", value_name = "PATH")]
    go: Vec<String>,

    /// Prefetch strategy for links on each page
    #[arg(short, long, value_enum)]
    prefetch: Option<PrefetchStrategy>,

    /// Log route changes and timings
    #[arg(short, long)]
    log: bool,

    /// Wrap page swaps in view transitions
    #[arg(long)]
    page_transitions: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Logs go to stderr so stdout stays one JSON event per line
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let level = if args.log { LevelFilter::Info } else { LevelFilter::Warn };
    let _ = TermLogger::init(level, log_config, TerminalMode::Stderr, ColorChoice::Auto);

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("Using default config: {e}");
        Default::default()
    });
    let caller = RouterConfig {
        log: args.log.then_some(true),
        page_transitions: args.page_transitions.then_some(true),
        prefetch: args.prefetch,
    };
    let options = config::resolve(&file_config, &caller);
    log::info!("Blaze starting at {} with {options:?}", args.url);

    let transport = Arc::new(HttpTransport::new());
    let document = fetch::fetch_document(transport.as_ref(), args.url.as_str()).await?;
    let router = Router::new(Window::new(args.url, document), transport, options);

    let mut events = router.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => log::error!("Cannot serialize {}: {e}", event.name()),
            }
        }
    });

    for path in &args.go {
        if !router.go(path).await {
            log::warn!("Navigation to {path} did not complete");
        }
    }

    let title = router.window().document.title().unwrap_or_default();
    router.teardown();
    drop(router);
    let _ = printer.await;

    println!("{title}");
    Ok(())
}
