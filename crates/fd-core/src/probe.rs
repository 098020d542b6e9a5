//! Resource-usage probes.
//!
//! Probes exist only for side-channel measurement; the engine passes their
//! samples through untouched and never uses them for correctness. Tests use
//! [`NullProbe`] so results stay deterministic.

use fd_common::ResourceSample;

/// Narrow capability for reading the evaluating process's resource usage.
pub trait ResourceProbe: Send + Sync {
    fn sample(&self) -> ResourceSample;
}

/// Deterministic probe that always reports zero usage.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProbe;

impl ResourceProbe for NullProbe {
    fn sample(&self) -> ResourceSample {
        ResourceSample::default()
    }
}

/// Probe reading the current process's system CPU time and resident memory.
///
/// On Linux this parses `/proc/self/stat` and `/proc/self/statm`; elsewhere,
/// and on any read or parse failure, it degrades to zeros (with a debug log)
/// rather than failing the evaluation unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfProbe;

impl ResourceProbe for SelfProbe {
    fn sample(&self) -> ResourceSample {
        match read_self_usage() {
            Some(sample) => sample,
            None => {
                tracing::debug!("resource probe unavailable, reporting zero usage");
                ResourceSample::default()
            }
        }
    }
}

#[cfg(target_os = "linux")]
fn read_self_usage() -> Option<ResourceSample> {
    let stat = std::fs::read_to_string("/proc/self/stat").ok()?;
    // Fields after the parenthesised comm; stime is field 15 of the full
    // line, i.e. index 12 of the remainder.
    let rest = stat.rsplit_once(')')?.1;
    let stime_ticks: f64 = rest.split_whitespace().nth(12)?.parse().ok()?;
    let ticks_per_sec = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
    if ticks_per_sec <= 0 {
        return None;
    }

    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let resident_pages: f64 = statm.split_whitespace().nth(1)?.parse().ok()?;
    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if page_size <= 0 {
        return None;
    }

    Some(ResourceSample {
        cpu_time_secs: stime_ticks / ticks_per_sec as f64,
        rss_mib: resident_pages * page_size as f64 / (1024.0 * 1024.0),
    })
}

#[cfg(not(target_os = "linux"))]
fn read_self_usage() -> Option<ResourceSample> {
    None
}
