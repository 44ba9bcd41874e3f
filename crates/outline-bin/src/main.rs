use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use anyhow::{Context, Result, bail};
use clap::Parser;
use core_config::{Config, ConfigContext};
use core_minimap::{
    CellRenderer, EditTracker, Minimap, MinimapError, MinimapId, MinimapListener, MinimapOptions,
    PatchMetricsSnapshot, PatchOutcome, Rect, Scale,
};
use core_text::{Buffer, PositionOracle, normalize_line_endings};
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "outline", version, about = "Render a document minimap")]
struct Args {
    /// UTF-8 text file to render.
    pub path: PathBuf,
    /// Visible minimap width in pixels.
    #[arg(long, default_value_t = 120)]
    pub width: usize,
    /// Visible minimap height in pixels.
    #[arg(long, default_value_t = 400)]
    pub height: usize,
    /// Optional configuration file path (overrides discovery of `minimap.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Write the minimap as a binary PGM image.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Text appended to the document through the incremental edit path
    /// (`\n` escapes become newlines).
    #[arg(long)]
    pub append: Option<String>,
    /// Compare the incrementally patched minimap against a full render.
    #[arg(long)]
    pub verify: bool,
}

#[derive(Default)]
struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join("outline.log");
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, "outline.log");
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        if tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
            .is_ok()
        {
            self.log_guard = Some(guard);
        }
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

/// Logs every notification and counts repaint requests.
#[derive(Debug, Default)]
struct LoggingListener {
    repaints: AtomicUsize,
}

impl MinimapListener for LoggingListener {
    fn should_repaint(&self, id: MinimapId, rect: Rect) {
        self.repaints.fetch_add(1, Ordering::Relaxed);
        info!(
            target: "outline.repaint",
            %id,
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            "should_repaint"
        );
    }

    fn handle_error(&self, id: MinimapId, error: &MinimapError) {
        error!(target: "outline.repaint", %id, %error, "minimap_error");
    }
}

#[derive(Debug)]
struct Summary {
    lines: usize,
    scale: Scale,
    outcome: Option<PatchOutcome>,
    verified: Option<bool>,
    repaints: usize,
    metrics: PatchMetricsSnapshot,
}

fn load_document(path: &Path) -> Result<Buffer> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let normalized = normalize_line_endings(&content);
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("file");
    debug!(target: "io", file = %path.display(), size_bytes = content.len(), "file_read_ok");
    Ok(Buffer::from_str(name, &normalized))
}

fn minimap_options(config: &Config) -> MinimapOptions {
    MinimapOptions {
        slack: config.effective_slack,
        renderer: CellRenderer::Plain {
            ink: config.ink_rgb(),
        },
        ..MinimapOptions::default()
    }
}

fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Append `text` at the end of `doc` the way an editor host reports a change.
fn append(minimap: &Minimap, doc: &mut Buffer, text: &str) -> Result<PatchOutcome> {
    let offset = doc.text_length();
    let mut tracker = EditTracker::new();
    tracker.before_change(&*doc, offset, 0)?;
    doc.insert(offset, text)?;
    let edit = tracker.after_change(&*doc, offset, 0, text.chars().count())?;
    Ok(minimap.apply_edit(&*doc, &edit)?)
}

fn run(args: &Args) -> Result<Summary> {
    let mut doc = load_document(&args.path)?;
    let mut config = core_config::load_from(args.config.clone())?;
    config.apply_context(ConfigContext::new(args.width, args.height));
    let options = minimap_options(&config);

    let listener = Arc::new(LoggingListener::default());
    let minimap = Minimap::with_options(listener.clone(), options.clone());
    minimap.ensure_capacity(&doc, args.width, args.height)?;

    let outcome = match &args.append {
        Some(text) => {
            let outcome = append(&minimap, &mut doc, &unescape_newlines(text))?;
            info!(target: "outline", ?outcome, "appended");
            Some(outcome)
        }
        None => None,
    };

    let image = minimap
        .snapshot_visible()
        .context("minimap has no pixel buffer")?;

    // Rows shared by several lines keep whichever line last drew them, so
    // only a 1:1 minimap is comparable with a fresh render.
    let scale = minimap.current_scale();
    let verified = if args.verify && !scale.is_one() {
        info!(target: "outline", %scale, "verify_skipped_compressed");
        None
    } else if args.verify {
        let reference = Minimap::with_options(Arc::new(LoggingListener::default()), options);
        reference.ensure_capacity(&doc, args.width, args.height)?;
        let matches = reference.snapshot_visible().as_ref() == Some(&image);
        if !matches {
            bail!("incremental minimap diverged from a full render");
        }
        Some(matches)
    } else {
        None
    };

    if let Some(out) = &args.out {
        let file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
        image.write_pgm(BufWriter::new(file))?;
        info!(target: "outline", path = %out.display(), "pgm_written");
    }

    Ok(Summary {
        lines: doc.line_count(),
        scale,
        outcome,
        verified,
        repaints: listener.repaints.load(Ordering::Relaxed),
        metrics: minimap.metrics_snapshot(),
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut startup = AppStartup::default();
    startup.configure_logging()?;
    AppStartup::install_panic_hook();

    let summary = run(&args)?;
    println!(
        "{}: {} lines at scale {} ({}x{})",
        args.path.display(),
        summary.lines,
        summary.scale,
        args.width,
        args.height
    );
    if let Some(outcome) = summary.outcome {
        println!("append: {outcome:?}, {} repaint(s)", summary.repaints);
    }
    match summary.verified {
        Some(true) => println!("verify: matches full render"),
        _ if args.verify => println!("verify: skipped at scale {}", summary.scale),
        _ => {}
    }
    println!("{:?}", summary.metrics);
    Ok(())
}
