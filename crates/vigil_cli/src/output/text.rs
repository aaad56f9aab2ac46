//! Text output formatter

use std::path::Path;

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString};

use super::FileReport;

pub fn output_text(reports: &[FileReport]) {
    for report in reports {
        for diag in &report.diagnostics {
            println!("{}", format_diagnostic(&report.path, diag));
        }
    }

    let total_issues: usize = reports.iter().map(|r| r.diagnostics.len()).sum();
    println!(
        "Checked {} files, found {} issues",
        reports.len(),
        total_issues
    );
}

/// Formats one finding as `path:line:col severity rule message`, 1-based.
fn format_diagnostic(path: &Path, diag: &Diagnostic) -> String {
    let severity = match diag.severity {
        Some(DiagnosticSeverity::ERROR) => "error",
        Some(DiagnosticSeverity::WARNING) => "warning",
        _ => "info",
    };
    let rule = match &diag.code {
        Some(NumberOrString::String(code)) => code.clone(),
        Some(NumberOrString::Number(code)) => code.to_string(),
        None => "-".to_string(),
    };

    format!(
        "{}:{}:{} {} {} {}",
        path.display(),
        diag.range.start.line + 1,
        diag.range.start.character + 1,
        severity,
        rule,
        diag.message
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::{Position, Range};

    #[test]
    fn format_is_one_based() {
        let diag = Diagnostic {
            range: Range::new(Position::new(1, 9), Position::new(1, 19)),
            severity: Some(DiagnosticSeverity::ERROR),
            code: Some(NumberOrString::String("python-security/no-eval".to_string())),
            message: "eval is dangerous".to_string(),
            ..Default::default()
        };

        assert_eq!(
            format_diagnostic(Path::new("src/app.py"), &diag),
            "src/app.py:2:10 error python-security/no-eval eval is dangerous"
        );
    }

    #[test]
    fn missing_code_and_severity() {
        let diag = Diagnostic {
            message: "note".to_string(),
            ..Default::default()
        };

        assert_eq!(
            format_diagnostic(Path::new("a.js"), &diag),
            "a.js:1:1 info - note"
        );
    }
}
