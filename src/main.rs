use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rtfmark::config::{self, EngineKind};
use rtfmark::convert::convert_rtf;
use rtfmark::engine;
use rtfmark::gateway;

#[derive(Parser)]
#[command(name = "rtfmark")]
#[command(about = "Convert RTF documents to Markdown and preview them as sanitized HTML")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server and browser UI
    Serve {
        /// Port to bind to (overrides config)
        #[arg(short, long, env = "RTFMARK_PORT")]
        port: Option<u16>,

        /// Bind address (overrides config)
        #[arg(short, long, env = "RTFMARK_BIND")]
        bind: Option<String>,
    },

    /// Convert an RTF file to Markdown
    Convert {
        /// Path to the .rtf file
        input: PathBuf,

        /// Write Markdown here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a Markdown file to sanitized HTML
    Preview {
        /// Path to the Markdown file
        input: PathBuf,

        /// Keep task lists, strikethrough and bare-URL links
        #[arg(long)]
        gfm_extras: bool,
    },

    /// Show configuration and engine status
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = config::load()?;

    match cli.command {
        Commands::Serve { port, bind } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            gateway::run(config).await
        }
        Commands::Convert { input, output } => {
            let bytes = std::fs::read(&input)
                .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", input.display()))?;
            let rtf = String::from_utf8_lossy(&bytes);

            let engine = engine::from_config(&config.engine);
            let conversion = convert_rtf(engine.as_ref(), &config.engine.args, &rtf).await?;

            for warning in &conversion.warnings {
                eprintln!("warning: {warning}");
            }
            if !conversion.stderr.is_empty() {
                eprintln!("{}", conversion.stderr);
            }
            match output {
                Some(path) => std::fs::write(&path, format!("{}\n", conversion.markdown))
                    .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?,
                None => println!("{}", conversion.markdown),
            }
            eprintln!(
                "converted {} bytes to {} bytes in {:.0} ms",
                conversion.meta.bytes_in, conversion.meta.bytes_out, conversion.meta.ms
            );
            Ok(())
        }
        Commands::Preview { input, gfm_extras } => {
            let markdown = std::fs::read_to_string(&input)
                .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", input.display()))?;
            let previewer = config.preview.previewer()?;
            let options = config.preview.options(gfm_extras.then_some(true));

            let rendered = previewer.render(&markdown, options);
            print!("{}", rendered.html);
            if rendered.removed_unsafe > 0 {
                eprintln!(
                    "Sanitizer removed {} unsafe node(s).",
                    rendered.removed_unsafe
                );
            }
            Ok(())
        }
        Commands::Status => {
            println!("rtfmark v{}", env!("CARGO_PKG_VERSION"));
            println!("config: {}", config::config_path().display());
            println!(
                "server: {}:{} (max upload {} bytes)",
                config.server.bind, config.server.port, config.server.max_upload_bytes
            );

            let target = match config.engine.kind {
                EngineKind::Process => &config.engine.program,
                EngineKind::Wasm => &config.engine.module,
            };
            let engine = engine::from_config(&config.engine);
            match engine.init().await {
                Ok(()) => println!("engine: {} ({target}) ready", engine.name()),
                Err(e) => println!("engine: {} ({target}) unavailable: {e}", engine.name()),
            }
            Ok(())
        }
    }
}
