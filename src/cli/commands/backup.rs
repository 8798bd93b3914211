use std::fs::File;
use std::io::{BufWriter, Write};

use chrono::Local;
use serde_json::json;

use super::App;
use crate::cli::args::BackupCommands;
use crate::error::WorktimeError;
use crate::features::backup::{self, BackupDocument, BackupSummary};
use crate::output::format_action;

/// Execute backup subcommands.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written, the document is
/// not a valid backup, or the import conflicts with the running session.
pub fn backup(app: &App, command: BackupCommands) -> Result<String, WorktimeError> {
    let db = app.database()?;

    match command {
        BackupCommands::Export { file } => {
            let path = file.unwrap_or_else(|| {
                app.paths
                    .backups
                    .join(format!("worktime-{}.xml", Local::now().format("%Y%m%d-%H%M%S")))
            });

            let document = backup::collect(&db)?;
            let mut out = BufWriter::new(File::create(&path)?);
            document.write_to(&mut out)?;
            out.flush()?;

            let summary = BackupSummary {
                projects: document.projects.len(),
                sessions: document.session_count(),
            };
            format_action(
                &format!(
                    "Exported {} projects and {} sessions to {}",
                    summary.projects,
                    summary.sessions,
                    path.display()
                ),
                &json!({ "file": path, "projects": summary.projects, "sessions": summary.sessions }),
                app.format,
            )
        }

        BackupCommands::Import { file } => {
            let xml = std::fs::read_to_string(&file)?;
            let document = BackupDocument::parse(&xml)?;
            let summary = backup::restore(&db, &document)?;

            format_action(
                &format!(
                    "Imported {} projects and {} sessions from {}",
                    summary.projects,
                    summary.sessions,
                    file.display()
                ),
                &summary,
                app.format,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{OutputFormat, ProjectCommands};
    use crate::cli::commands::test_support::app;
    use crate::cli::commands::{project, start};

    #[test]
    fn test_export_then_import_elsewhere() {
        let (dir, source) = app(OutputFormat::Json);
        project(&source, ProjectCommands::Add { name: "Acme".into() }).unwrap();
        start(&source, "Acme", None, None).unwrap();

        let file = dir.path().join("backup.xml");
        let out = backup(&source, BackupCommands::Export { file: Some(file.clone()) }).unwrap();
        assert!(out.contains("\"sessions\": 1"));

        let (_other, target) = app(OutputFormat::Json);
        let out = backup(&target, BackupCommands::Import { file: file.clone() }).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["projects"], 1);
        assert_eq!(value["sessions"], 1);

        // Importing the running session a second time must fail as a whole
        let err = backup(&target, BackupCommands::Import { file }).unwrap_err();
        assert!(matches!(err, WorktimeError::Conflict(_)));
        let listed = project(&target, ProjectCommands::List).unwrap();
        assert!(listed.contains("\"count\": 1"));
    }

    #[test]
    fn test_export_defaults_to_backup_dir() {
        let (_dir, app) = app(OutputFormat::Pretty);
        backup(&app, BackupCommands::Export { file: None }).unwrap();

        let files: Vec<_> = std::fs::read_dir(&app.paths.backups).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_import_rejects_foreign_document() {
        let (dir, app) = app(OutputFormat::Pretty);
        let file = dir.path().join("other.xml");
        std::fs::write(&file, r#"<timesheet ver="1"/>"#).unwrap();

        let err = backup(&app, BackupCommands::Import { file }).unwrap_err();
        assert!(matches!(err, WorktimeError::Backup(_)));
    }
}
