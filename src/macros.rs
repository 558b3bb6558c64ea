//! Macros for error/warning printing

/// Expand to an info message
#[macro_export]
macro_rules! bspmon_info {
    ($($err:tt)*) => ({
        use colored::Colorize;
        eprintln!("{}: {}", "[bspmon info]".purple().bold(), format!($($err)*));
    })
}

/// Expand to a fatal message
#[macro_export]
macro_rules! bspmon_fatal {
    ($($err:tt)*) => ({
        use colored::Colorize;
        eprintln!("{}: {}", "[bspmon fatal]".yellow().bold(), format!($($err)*));
        std::process::exit(1);
    })
}
