//! Configuration loading and parsing.
//!
//! Parses `minimap.toml` (or an override path provided by the binary):
//!
//! ```toml
//! [buffer]
//! slack = 40        # extra pixels allocated beyond the visible size, per axis
//! [render]
//! ink = [0, 0, 0]   # RGB used by the plain cell renderer
//! ```
//!
//! The raw slack is retained so the effective value can be re-clamped when the
//! viewport changes; `Config::apply_context` bounds it by [`MAX_SLACK`] and by
//! the larger viewport dimension. Unknown fields are ignored.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const DEFAULT_SLACK: usize = 40;
pub const MAX_SLACK: usize = 512;

const FILE_NAME: &str = "minimap.toml";

/// Viewport the minimap is laid out in, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigContext {
    pub viewport_width: usize,
    pub viewport_height: usize,
}

impl ConfigContext {
    pub const fn new(viewport_width: usize, viewport_height: usize) -> Self {
        Self {
            viewport_width,
            viewport_height,
        }
    }

    pub fn larger_dimension(&self) -> usize {
        self.viewport_width.max(self.viewport_height)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BufferConfig {
    #[serde(default = "BufferConfig::default_slack")]
    pub slack: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            slack: Self::default_slack(),
        }
    }
}

impl BufferConfig {
    const fn default_slack() -> usize {
        DEFAULT_SLACK
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    #[serde(default)]
    pub ink: [u8; 3],
}

impl RenderConfig {
    /// Ink packed as `0x00RRGGBB`.
    pub fn ink_rgb(&self) -> u32 {
        let [r, g, b] = self.ink;
        (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub buffer: BufferConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub raw: Option<String>,    // file contents as read
    pub file: ConfigFile,       // parsed (or default) data
    pub effective_slack: usize, // clamped to viewport semantics
}

impl Default for Config {
    fn default() -> Self {
        Self {
            raw: None,
            file: ConfigFile::default(),
            effective_slack: DEFAULT_SLACK,
        }
    }
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("outline").join(FILE_NAME);
    }
    PathBuf::from(FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            let effective_slack = file.buffer.slack.min(MAX_SLACK);
            Ok(Config {
                raw: Some(content),
                file,
                effective_slack,
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Apply viewport context to compute the clamped buffer slack.
    /// Returns the effective (possibly clamped) value.
    pub fn apply_context(&mut self, ctx: ConfigContext) -> usize {
        let raw = self.file.buffer.slack;
        let max = MAX_SLACK.min(ctx.larger_dimension());
        let clamped = raw.min(max);
        if clamped != raw {
            info!(
                target: "config",
                raw,
                clamped,
                max,
                viewport_width = ctx.viewport_width,
                viewport_height = ctx.viewport_height,
                "buffer_slack_clamped"
            );
        }
        self.effective_slack = clamped;
        clamped
    }

    /// Recompute the effective slack after a viewport change. Returns
    /// `Some(new_slack)` when the effective value changed, else `None`.
    pub fn recompute_with_context(&mut self, ctx: ConfigContext) -> Option<usize> {
        let prev = self.effective_slack;
        let current = self.apply_context(ctx);
        if current != prev { Some(current) } else { None }
    }

    pub fn ink_rgb(&self) -> u32 {
        self.file.render.ink_rgb()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn load_str(content: &str) -> Config {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), content).unwrap();
        load_from(Some(tmp.path().to_path_buf())).unwrap()
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert_eq!(cfg.file.buffer.slack, DEFAULT_SLACK);
        assert_eq!(cfg.effective_slack, DEFAULT_SLACK);
        assert_eq!(cfg.file.render.ink, [0, 0, 0]);
        assert!(cfg.raw.is_none());
    }

    #[test]
    fn parses_slack_and_ink() {
        let mut cfg = load_str("[buffer]\nslack = 16\n[render]\nink = [255, 128, 1]\n");
        assert_eq!(cfg.file.buffer.slack, 16);
        assert_eq!(cfg.ink_rgb(), 0x00FF_8001);
        cfg.apply_context(ConfigContext::new(120, 600));
        assert_eq!(cfg.effective_slack, 16);
    }

    #[test]
    fn missing_sections_fall_back_per_field() {
        let cfg = load_str("[render]\nink = [10, 20, 30]\n");
        assert_eq!(cfg.file.buffer.slack, DEFAULT_SLACK);
        assert_eq!(cfg.file.render.ink, [10, 20, 30]);
    }

    #[test]
    fn parse_error_yields_defaults() {
        let cfg = load_str("[buffer]\nslack = \"wide\"\n");
        assert_eq!(cfg.effective_slack, DEFAULT_SLACK);
        assert!(cfg.raw.is_none());
    }

    #[test]
    fn slack_is_bounded_at_load_and_by_viewport() {
        let mut cfg = load_str("[buffer]\nslack = 4096\n");
        assert_eq!(cfg.effective_slack, MAX_SLACK);
        assert_eq!(cfg.apply_context(ConfigContext::new(100, 300)), 300);
        assert_eq!(cfg.apply_context(ConfigContext::new(2000, 3000)), MAX_SLACK);
    }

    #[test]
    fn recompute_reports_only_changes() {
        let mut cfg = load_str("[buffer]\nslack = 64\n");
        cfg.apply_context(ConfigContext::new(200, 400));
        assert_eq!(cfg.effective_slack, 64);
        assert_eq!(cfg.recompute_with_context(ConfigContext::new(20, 30)), Some(30));
        assert_eq!(cfg.recompute_with_context(ConfigContext::new(30, 10)), None);
        assert_eq!(cfg.recompute_with_context(ConfigContext::new(80, 80)), Some(64));
    }

    #[test]
    fn clamp_logging_uses_config_target() {
        let mut cfg = load_str("[buffer]\nslack = 90\n");
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        with_default(subscriber, || {
            cfg.apply_context(ConfigContext::new(40, 60));
        });

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("INFO config:"));
        assert!(log_output.contains("buffer_slack_clamped"));
        assert_eq!(cfg.effective_slack, 60);
    }
}
