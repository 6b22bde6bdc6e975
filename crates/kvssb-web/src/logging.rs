use std::io::{self, Write};

use tracing::Level;
use wasm_bindgen::JsValue;

/// Buffers one formatted event and writes it to the browser console.
#[derive(Default)]
struct ConsoleWriter {
    buf: Vec<u8>,
}

impl Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.buf);
        web_sys::console::log_1(&JsValue::from_str(line.trim_end()));
    }
}

/// Install the console subscriber. The wall clock isn't available to
/// wasm32-unknown-unknown, so events carry no timestamp.
pub fn init() {
    let level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(ConsoleWriter::default)
        .with_max_level(level)
        .with_ansi(false)
        .without_time()
        .try_init();
}
