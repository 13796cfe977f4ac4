//! # Reporter Module
//!
//! Turns outcomes and batch reports into the messages a user sees.

use super::converter::ConversionOutcome;
use super::worker::BatchReport;
use std::time::Duration;

/// Summary shown when a batch job ends.
pub fn summary(report: &BatchReport) -> String {
    if report.canceled {
        return format!(
            "The conversion operation was canceled while in progress.\n\
             {} images were converted before the cancellation.",
            report.converted_count
        );
    }

    let mut msg = format!(
        "The conversion operation evaluated {} images.\n\
         {} were converted and {} were skipped.\n\
         Total time spent converting images: {}\n",
        report.processed_count,
        report.converted_count,
        report.skipped_count,
        format_duration(report.total_elapsed())
    );

    if report.failed_count > 0 {
        msg.push_str(&format!(
            "{} problems were encountered (see log).",
            report.failed_count
        ));
    }

    msg
}

/// Title and message for a single-file conversion
pub fn describe_outcome(outcome: &ConversionOutcome) -> (&'static str, String) {
    match outcome {
        ConversionOutcome::Converted { target_path, elapsed } => (
            "Conversion complete",
            format!(
                "The file was successfully converted to {} in {}.",
                target_path.display(),
                format_duration(*elapsed)
            ),
        ),
        ConversionOutcome::SkippedExisting { target_path } => (
            "Conversion skipped",
            format!(
                "Conversion was skipped because {} exists.",
                target_path.display()
            ),
        ),
        ConversionOutcome::Failed { reason } => (
            "Conversion error",
            format!("An error occurred: {}", reason),
        ),
    }
}

/// `450ms` below one second, `1.23s` above, `2m 05s` above one minute
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}
