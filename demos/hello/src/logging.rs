use std::env;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Log at `level` to stderr and, if `dir` is given, to a daily rolled file
/// `<dir>/<app_name>.<date>`.
///
/// `RUST_LOG` overrides `level`. The returned guard flushes the file when
/// dropped.
pub fn init_logging(
    app_name: &str,
    dir: Option<&str>,
    level: &str,
) -> Option<WorkerGuard> {
    let directives =
        env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| level.to_string());

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let (file_layer, guard) = match dir {
        Some(dir) => {
            let (writer, guard) =
                tracing_appender::non_blocking(rolling::daily(dir, app_name));
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(directives))
        .with(stderr_layer)
        .with(file_layer)
        .init();

    set_panic_hook();

    tracing::info!("initialized logging: app={} dir={:?} level={}", app_name, dir, level);
    guard
}

/// Send panics to the log too, a demo run often has stderr scrolled away.
fn set_panic_hook() {
    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let location = panic
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_default();
        tracing::error!(
            message = %panic.to_string().replace('\n', " "),
            location = %location,
            "panic"
        );
        prev_hook(panic);
    }));
}
