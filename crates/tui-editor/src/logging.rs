//! 文件日志
//!
//! 终端被 TUI 占用，日志只写文件。过滤规则读 `RUST_LOG`，默认 `info`，例如：
//!
//! ```bash
//! RUST_LOG=richtext_binary=trace,richtext_core=debug cargo run -p tui-editor
//! ```

use std::{io, path::Path};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILE: &str = "tui-editor.log";

pub fn init(dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init()
        .map_err(io::Error::other)
}
