//! Check command implementation

use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, Result};
use tower_lsp::lsp_types::{DiagnosticSeverity, Url};
use tracing::{info, warn};
use vigil_config::{CONFIG_FILE, WorkspaceConfig};
use vigil_lsp::{DocumentSnapshot, ServerSettings, Services};
use vigil_registry::Language;

use crate::output::{FileReport, output_text};
use crate::utils::block_on;

/// Analyses `files` once; returns `true` if any error-level finding was reported.
pub fn run_check(
    settings: ServerSettings,
    files: &[PathBuf],
    workspace: Option<&Path>,
) -> Result<bool> {
    let workspace = match workspace {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().into_diagnostic()?,
    };
    let workspace = std::fs::canonicalize(&workspace).into_diagnostic()?;

    if WorkspaceConfig::discover(&workspace).is_none() {
        return Err(miette::miette!(
            "No {} found in {}. Run `vigil init` first.",
            CONFIG_FILE,
            workspace.display()
        ));
    }

    let services = Services::from_settings(settings).into_diagnostic()?;
    let reports = block_on(check_files(&services, &workspace, files))??;

    output_text(&reports);
    Ok(reports.iter().any(|report| {
        report
            .diagnostics
            .iter()
            .any(|d| d.severity == Some(DiagnosticSeverity::ERROR))
    }))
}

async fn check_files(
    services: &Services,
    workspace: &Path,
    files: &[PathBuf],
) -> Result<Vec<FileReport>> {
    let outcome = services.cache.refresh_workspace(workspace).await;
    if services.cache.get(workspace).is_none() {
        return Err(miette::miette!(
            "Could not load rules for {} ({:?})",
            workspace.display(),
            outcome
        ));
    }

    let workspaces = vec![workspace.to_path_buf()];
    let mut reports = Vec::new();

    for file in files {
        let path = std::fs::canonicalize(file).into_diagnostic()?;
        let text = std::fs::read_to_string(&path).into_diagnostic()?;
        let Ok(uri) = Url::from_file_path(&path) else {
            warn!("Skipping {}: not a file path", file.display());
            continue;
        };

        let snapshot = DocumentSnapshot {
            uri,
            language: Language::from_path(&path),
            path,
            text,
            version: None,
        };

        match services.pipeline.run(&snapshot, &workspaces).await {
            Some(analysis) => reports.push(FileReport {
                path: file.clone(),
                diagnostics: analysis.diagnostics,
            }),
            None => info!("Skipped {}", file.display()),
        }
    }

    Ok(reports)
}
