use std::num::NonZeroUsize;

/// Logical CPUs available to the process, 1 when unknown
pub fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Worker count for the discovery phase: one per search, leaving a core free
pub fn discovery_workers(jobs: usize, parallelism: usize) -> usize {
    jobs.min(parallelism.saturating_sub(1)).max(1)
}

/// Formats an amount with two decimals and comma thousands separators, e.g. `1,234.50`
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && !fixed.trim_matches(['0', '.']).is_empty() {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, grouped, cents)
}
