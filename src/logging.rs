use std::{fs, path::Path, sync::Mutex};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
}

/// Installs the global subscriber. The filter comes from `RUST_LOG` and
/// defaults to `info`.
pub fn init(target: LogTarget<'_>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match target {
        LogTarget::Stderr => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .init(),
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            registry
                .with(
                    fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_target(true)
                        .with_line_number(true),
                )
                .init();
        }
    }
    Ok(())
}
