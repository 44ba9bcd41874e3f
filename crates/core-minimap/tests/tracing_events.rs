//! Escalations and reported errors show up on their tracing targets.

mod common;
use common::*;

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use core_minimap::{EditDescriptor, MinimapError};
use core_text::{Buffer, LogicalPosition};
use tracing::Level;
use tracing::subscriber::with_default;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone)]
struct BufferWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

struct LockedWriter<'a> {
    guard: MutexGuard<'a, Vec<u8>>,
}

impl Write for LockedWriter<'_> {
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

fn capture(f: impl FnOnce()) -> String {
    let inner = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_target(true)
        .with_ansi(false)
        .without_time()
        .with_writer(BufferWriter {
            inner: inner.clone(),
        })
        .finish();
    with_default(subscriber, f);
    let bytes = inner.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn escalation_is_logged_on_patch_target() {
    let mut doc = Buffer::from_str("t", "a\nb\nc\n");
    let log = capture(|| {
        let (m, _) = laid_out(&doc, 10, 10);
        edit(&m, &mut doc, 0, 2, "").unwrap();
    });
    assert!(log.contains("minimap.lifecycle:"), "{log}");
    assert!(log.contains("buffer_allocated"), "{log}");
    assert!(log.contains("minimap.patch:"), "{log}");
    assert!(log.contains("escalate_full_render"), "{log}");
}

#[test]
fn reported_errors_are_warnings() {
    let doc = Buffer::from_str("t", "abc");
    let log = capture(|| {
        let (m, _) = laid_out(&doc, 10, 10);
        let pos = LogicalPosition::new(0, 3);
        let err = m
            .apply_edit(&doc, &EditDescriptor::new(9, 0, 0, pos, pos))
            .unwrap_err();
        assert!(matches!(err, MinimapError::InconsistentEdit { .. }));
    });
    assert!(log.contains("WARN minimap.error:"), "{log}");
    assert!(log.contains("minimap_error"), "{log}");
}
