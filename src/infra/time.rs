//! # Time Utilities / 时间工具
//!
//! Timestamp formatting for reports, the blocking delay primitive and the
//! host name lookup used by report headers.

use chrono::{DateTime, Local};
use std::time::Duration;

/// Formats a timestamp for human-readable report headers.
pub fn local_time_str(t: DateTime<Local>) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Formats a timestamp in the ISO 8601 shape machine consumers expect.
/// 以机器消费者期望的 ISO 8601 形式格式化时间戳。
pub fn iso_time_str(t: DateTime<Local>) -> String {
    t.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Renders a millisecond duration as seconds with millisecond precision,
/// the unit JUnit-style consumers use.
pub fn duration_secs_str(ms: u64) -> String {
    format!("{:.3}", ms as f64 / 1000.0)
}

/// Blocks the calling thread for the given number of milliseconds.
pub fn sleep_ms(ms: u64) {
    std::thread::sleep(Duration::from_millis(ms));
}

/// Best-effort host name for report headers.
/// 报告头使用的尽力而为的主机名。
pub fn hostname() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "localhost".to_string())
}
