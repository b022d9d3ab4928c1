use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;

/// Initialize the logging system with timestamp, level, and message formatting.
///
/// Format: `[HH:MM:SS] [LEVEL] message`. `level` is a `log` level name such as
/// "info" or "debug"; unknown names fall back to INFO. `RUST_LOG`, when set,
/// still takes precedence per module.
pub fn init_logger(level: &str) {
    let filter = level.parse::<LevelFilter>().unwrap_or(LevelFilter::Info);

    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(filter)
        .parse_env("RUST_LOG")
        .init();
}
