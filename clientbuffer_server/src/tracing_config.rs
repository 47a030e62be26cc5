use crate::config::*;
use tracing::Subscriber;
use tracing_core::LevelFilter;
use tracing_subscriber::{filter::filter_fn, prelude::*, registry::LookupSpan, Layer};

use std::{io::Error as IoError, path::Path};

fn build_target<S>(
    conf: LogEntry,
    dir: impl AsRef<Path>,
) -> Result<Box<dyn Layer<S> + Send + Sync + 'static>, IoError>
where
    S: Subscriber + Send + Sync,
    for<'span> S: LookupSpan<'span>,
{
    let layer = match &conf.target {
        LogTarget::File { filename } => tracing_subscriber::fmt::layer()
            .with_writer(tracing_appender::rolling::daily(dir, filename))
            .with_ansi(false)
            .boxed(),
        LogTarget::Builtin(BuiltinLogTarget::Stdout) => {
            tracing_subscriber::fmt::layer().with_writer(std::io::stdout).boxed()
        }
        LogTarget::Builtin(BuiltinLogTarget::Stderr) => {
            tracing_subscriber::fmt::layer().with_writer(std::io::stderr).boxed()
        }
    };

    let level: LevelFilter = conf.level.map_or(LevelFilter::TRACE, Into::into);
    let filter = filter_fn(move |metadata| {
        metadata.level() <= &level
            && (conf.modules.is_empty()
                || metadata
                    .module_path()
                    .map_or(true, |module| conf.modules.iter().any(|m| module.starts_with(m))))
    });

    Ok(layer.with_filter(filter).boxed())
}

/// Build a subscriber writing to every target in `conf`.
///
/// File targets are created under `conf.dir`, which must exist.
pub fn build_subscriber(conf: LoggingConfig) -> Result<impl Subscriber, IoError> {
    let mut layers = Vec::new();

    for target in conf.targets {
        layers.push(build_target(target, &conf.dir)?);
    }

    // Individual targets do their own filtering, so the global default has
    // to let everything through unless configured otherwise
    let filter = tracing_subscriber::filter::Targets::new()
        .with_default(LevelFilter::from(conf.default_level.unwrap_or(LogLevel::Trace)))
        .with_targets(
            conf.module_levels
                .into_iter()
                .map(|(module, level)| (module, LevelFilter::from(level))),
        );

    Ok(tracing_subscriber::registry().with(filter).with(layers))
}
