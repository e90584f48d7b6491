/// Result Evaluator
///
/// Turns the raw result file into a summary and an exit code. Pure apart from
/// printing: the same bytes always give the same summary.
use crate::console::{Color, Console};
use extra_sanity_common::config::EXIT_FAILURE;
use extra_sanity_common::types::{ResultReport, Summary};
use tracing::{debug, error};

/// Aggregate a report
///
/// Skipped tests are ignored. Every other test without `"success": true` is
/// failed and contributes the length of its `errors` list to the total.
pub fn summarize(report: &ResultReport) -> Summary {
    let mut failed_tests = Vec::new();
    let mut total_errors = 0;

    for (test, record) in report.iter() {
        if record.is_skipped() {
            continue;
        }
        if !record.passed() {
            failed_tests.push(test.clone());
            total_errors += record.error_count();
        }
    }
    failed_tests.sort();

    Summary {
        failed_tests,
        total_errors,
        total_tests: report.len(),
    }
}

/// Console lines describing a summary
pub fn summary_lines(summary: &Summary) -> Vec<(String, Color)> {
    if summary.is_success() {
        return vec![("Success.".to_string(), Color::Green)];
    }

    let mut lines = vec![(
        format!(
            "Total of {} errors in the following {} tests (out of {}):",
            summary.total_errors,
            summary.failed_tests.len(),
            summary.total_tests
        ),
        Color::Emph,
    )];
    lines.extend(summary.failed_tests.iter().map(|test| (test.clone(), Color::Red)));
    lines
}

/// Console lines and exit code for the retrieved result file
///
/// A missing result yields no lines; the failure is only logged.
pub fn outcome(output: Option<&[u8]>) -> (Vec<(String, Color)>, i32) {
    let Some(bytes) = output else {
        error!("No result was retrieved from the container");
        return (Vec::new(), EXIT_FAILURE);
    };

    let report = match ResultReport::from_slice(bytes) {
        Ok(report) => report,
        Err(e) => {
            let line = format!("FATAL ERROR while receiving output: {}", e);
            return (vec![(line, Color::Red)], EXIT_FAILURE);
        }
    };

    let summary = summarize(&report);
    debug!(
        total_tests = summary.total_tests,
        failed_tests = summary.failed_tests.len(),
        total_errors = summary.total_errors,
        "Evaluation complete"
    );

    (summary_lines(&summary), summary.exit_code())
}

/// Interpret the retrieved result file and return the process exit code
pub fn interpret(output: Option<&[u8]>, console: &Console) -> i32 {
    let (lines, code) = outcome(output);
    for (line, color) in lines {
        console.print(line, color);
    }
    code
}
