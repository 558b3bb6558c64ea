//! Various helper-utilities

use crate::{cli::Opts, config::Config};
use anyhow::Result;
use clap::crate_name;
use flexi_logger::{
    style,
    AdaptiveFormat,
    Age,
    Cleanup,
    Criterion,
    DeferredNow,
    Duplicate,
    FileSpec,
    Level,
    Logger,
    LoggerHandle,
    Naming,
    Record,
    WriteMode,
};
use serde::{de, Deserialize};
use std::{
    env,
    io::{self, Write},
    panic,
    path::{Path, PathBuf},
};
use which::which;

/// Shorter way of testing if the user wants color for the output of `--help`
pub(crate) fn wants_color() -> bool {
    env::var_os("NO_COLOR").is_none()
}

/// Log level from `BSPMON_LOG`, otherwise from the number of `-v` flags
fn log_spec(verbose: u8) -> String {
    env::var("BSPMON_LOG").unwrap_or_else(|_| match verbose {
        0 => String::from("info"),
        1 => String::from("debug"),
        _ => String::from("trace"),
    })
}

/// Customize the format of the log (colored)
fn colored_format(w: &mut dyn Write, _now: &mut DeferredNow, record: &Record) -> io::Result<()> {
    let level = record.level();
    write!(
        w,
        "{:<5} [{}:{}]: {}",
        style(level).paint(level.to_string()),
        style(Level::Trace).paint(record.file().unwrap_or("<unnamed>")),
        record.line().unwrap_or(0),
        &record.args()
    )
}

/// Customize the format of the log (uncolored)
fn uncolored_format(w: &mut dyn Write, now: &mut DeferredNow, record: &Record) -> io::Result<()> {
    // Strip the ansi sequences that are put in log messages using the `colored`
    // crate when writing to a file. Also use a date
    let now = now.now();
    let message = String::from_utf8(strip_ansi_escapes::strip(record.args().to_string())?)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    write!(
        w,
        "[{}-{:02}-{:02} {:02}:{:02}:{:02}] {:<5} [{}:{}]: {}",
        now.year(),
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute(),
        now.second(),
        record.level(),
        record.file().unwrap_or("<unnamed>"),
        record.line().unwrap_or(0),
        message
    )
}

/// Initializes logging for this crate
///
/// The returned handle has to be kept alive for buffered logs to be flushed
pub(crate) fn initialize_logging(config: &Config, args: &Opts) -> Result<LoggerHandle> {
    // Much better backtraces, in a Python manner
    if cfg!(debug_assertions) {
        better_panic::install();
        panic::set_hook(Box::new(|panic_info| {
            better_panic::Settings::auto().create_panic_handler()(panic_info);
        }));
    }

    let mut logger = Logger::try_with_str(log_spec(args.verbose))?
        .write_mode(WriteMode::BufferAndFlush)
        .adaptive_format_for_stderr(AdaptiveFormat::Custom(uncolored_format, colored_format))
        .set_palette(String::from("9;11;14;5;13"));

    if config.global.log_to_file {
        let log_dir = config
            .global
            .log_dir
            .clone()
            .unwrap_or_else(|| env::temp_dir().join(crate_name!()));

        logger = logger
            .duplicate_to_stderr(Duplicate::All)
            .rotate(
                Criterion::AgeOrSize(Age::Day, 50_000_000),
                Naming::Numbers,
                Cleanup::KeepLogFiles(2),
            )
            .log_to_file(
                FileSpec::default()
                    .basename(crate_name!())
                    .directory(&log_dir),
            )
            .format_for_files(uncolored_format);
    }

    Ok(logger.start()?)
}

/// Expand `~` and environment variables in a path
fn shellexpand_path<E: de::Error>(value: &Path) -> Result<PathBuf, E> {
    let expanded = shellexpand::full(&value.to_string_lossy())
        .map_err(|e| {
            E::invalid_value(
                de::Unexpected::Str(value.to_string_lossy().as_ref()),
                &e.to_string().as_str(),
            )
        })?
        .to_string();

    Ok(PathBuf::from(expanded))
}

/// [`Deserialize`] something that has a shell variable
pub(crate) fn deserialize_shellexpand<'de, D>(d: D) -> Result<Option<PathBuf>, D::Error>
where
    D: de::Deserializer<'de>,
{
    let value = PathBuf::deserialize(d)?;
    shellexpand_path(&value).map(Some)
}

/// [`Deserialize`] something that has a shell variable into an absolute path
///
/// A bare binary name is looked up in `$PATH`
pub(crate) fn deserialize_absolute_path<'de, D>(d: D) -> Result<Option<PathBuf>, D::Error>
where
    D: de::Deserializer<'de>,
{
    let value = PathBuf::deserialize(d)?;
    let value = shellexpand_path::<D::Error>(&value)?;

    let canonicalize = |p: &PathBuf| -> Result<PathBuf, D::Error> {
        p.canonicalize()
            .map_err(|_| de::Error::custom(format!("failed to canonicalize path: {}", p.display())))
    };

    if let Ok(value) = canonicalize(&value) {
        return Ok(Some(value));
    }

    // Maybe it was a binary name given
    // `which` should return the absolute value
    which(&value)
        .map_err(|_| {
            <D::Error as de::Error>::invalid_value(
                de::Unexpected::Str(&value.to_string_lossy()),
                &"an existing path or a binary in $PATH",
            )
        })
        .and_then(|ret| canonicalize(&ret))
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::{colored_format, deserialize_absolute_path, deserialize_shellexpand, uncolored_format};
    use flexi_logger::{DeferredNow, Level};
    use serde::Deserialize;
    use std::{env, path::PathBuf};

    #[derive(Debug, Deserialize)]
    struct Paths {
        #[serde(default, deserialize_with = "deserialize_shellexpand")]
        dir: Option<PathBuf>,
        #[serde(default, deserialize_with = "deserialize_absolute_path")]
        bin: Option<PathBuf>,
    }

    #[test]
    fn expands_variables() {
        env::set_var("BSPMON_TEST_DIR", "/var/tmp");
        let paths: Paths = serde_yaml::from_str("dir: $BSPMON_TEST_DIR/bspmon\n").unwrap();
        assert_eq!(paths.dir, Some(PathBuf::from("/var/tmp/bspmon")));
        assert_eq!(paths.bin, None);
    }

    #[test]
    fn missing_binary_is_an_error() {
        assert!(serde_yaml::from_str::<Paths>("bin: surely-not-a-real-binary-name\n").is_err());
    }

    #[test]
    fn absolute_path_is_canonicalized() {
        let paths: Paths = serde_yaml::from_str("bin: /\n").unwrap();
        assert_eq!(paths.bin, Some(PathBuf::from("/")));
    }

    #[test]
    fn file_log_lines_have_no_escapes() {
        let mut buf = Vec::new();
        uncolored_format(
            &mut buf,
            &mut DeferredNow::new(),
            &log::Record::builder()
                .args(format_args!("removing \x1b[01;31mHDMI-1\x1b[0m"))
                .level(Level::Info)
                .file(Some("src/reconcile.rs"))
                .line(Some(7))
                .build(),
        )
        .unwrap();

        let line = String::from_utf8(buf).unwrap();
        assert!(line.starts_with('['));
        assert!(line.contains("] INFO  [src/reconcile.rs:7]: removing HDMI-1"));
        assert!(!line.contains('\x1b'));
    }

    #[test]
    fn console_log_lines_keep_message() {
        let mut buf = Vec::new();
        colored_format(
            &mut buf,
            &mut DeferredNow::new(),
            &log::Record::builder()
                .args(format_args!("pass finished"))
                .level(Level::Debug)
                .file(Some("src/watcher.rs"))
                .line(Some(42))
                .build(),
        )
        .unwrap();

        let line = String::from_utf8(buf).unwrap();
        assert!(line.contains("src/watcher.rs"));
        assert!(line.contains(":42]: pass finished"));
    }
}
