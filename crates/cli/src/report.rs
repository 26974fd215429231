use ferrous_dnsperf_domain::{RcodeClass, RunReport};
use std::fmt::Write;

/// Renders the end-of-run summary; the RCODE breakdown is only included
/// when `with_rcodes` is set.
pub fn format_report(report: &RunReport, with_rcodes: bool) -> String {
    let stats = &report.stats;
    let mut out = String::new();

    let _ = writeln!(out, "\n[Status] DNS query performance test finished");
    if let Some(reason) = report.stop_reason {
        let _ = writeln!(out, "[Status] Stopped: {}", reason);
    }
    let _ = writeln!(out, "[Result] Queries sent:\t\t{}", stats.sent);
    let _ = writeln!(out, "[Result] Queries completed:\t{}", stats.received);
    let _ = writeln!(
        out,
        "[Result] Complete percentage:\t{:.2}%",
        report.completion_percent
    );

    if with_rcodes {
        for class in RcodeClass::all() {
            let _ = writeln!(
                out,
                "[Result] Rcode={}:\t{}",
                class.as_str(),
                stats.rcode_count(class)
            );
        }
    }

    let _ = writeln!(out, "[Result] Elapsed time(s):\t{:.5}", report.elapsed_secs());
    let _ = writeln!(
        out,
        "[Result] Queries per second:\t{:.5}",
        report.queries_per_second
    );
    out
}
