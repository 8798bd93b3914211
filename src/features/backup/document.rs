//! The XML backup document.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8" standalone="yes"?>
//! <my-time-backup ver="1">
//!   <project id="1" name="Acme">
//!     <session id="3" start="1709542800000" end="1709571600000" comment="setup"/>
//!   </project>
//! </my-time-backup>
//! ```
//!
//! Times are milliseconds since the Unix epoch. A session without `end` was
//! running when the backup was taken.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::WorktimeError;

/// Root element name.
pub const ROOT_ELEMENT: &str = "my-time-backup";

/// The only supported document version.
pub const VERSION: &str = "1";

/// A session as written in a backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSession {
    pub id: i64,
    pub start_ms: i64,
    pub end_ms: Option<i64>,
    pub comment: Option<String>,
}

/// A project and its sessions as written in a backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupProject {
    pub id: i64,
    pub name: String,
    pub sessions: Vec<BackupSession>,
}

/// A whole backup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupDocument {
    pub projects: Vec<BackupProject>,
}

impl BackupDocument {
    /// Number of sessions across all projects.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.projects.iter().map(|p| p.sessions.len()).sum()
    }

    /// Write the document as indented XML.
    ///
    /// # Errors
    ///
    /// Returns `Backup` if writing fails.
    pub fn write_to<W: Write>(&self, out: W) -> Result<(), WorktimeError> {
        let mut writer = Writer::new_with_indent(out, b' ', 2);

        write_event(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))),
        )?;
        write_event(
            &mut writer,
            Event::Start(BytesStart::new(ROOT_ELEMENT).with_attributes([("ver", VERSION)])),
        )?;

        for project in &self.projects {
            let id = project.id.to_string();
            write_event(
                &mut writer,
                Event::Start(
                    BytesStart::new("project")
                        .with_attributes([("id", id.as_str()), ("name", project.name.as_str())]),
                ),
            )?;

            for session in &project.sessions {
                let id = session.id.to_string();
                let start = session.start_ms.to_string();
                let end = session.end_ms.map(|ms| ms.to_string());

                let mut element = BytesStart::new("session");
                element.push_attribute(("id", id.as_str()));
                element.push_attribute(("start", start.as_str()));
                if let Some(end) = &end {
                    element.push_attribute(("end", end.as_str()));
                }
                if let Some(comment) = &session.comment {
                    element.push_attribute(("comment", comment.as_str()));
                }
                write_event(&mut writer, Event::Empty(element))?;
            }

            write_event(&mut writer, Event::End(BytesEnd::new("project")))?;
        }

        write_event(&mut writer, Event::End(BytesEnd::new(ROOT_ELEMENT)))
    }

    /// Render the document to a string.
    ///
    /// # Errors
    ///
    /// Returns `Backup` if serialisation fails.
    pub fn to_xml(&self) -> Result<String, WorktimeError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| WorktimeError::Backup(format!("backup is not valid UTF-8: {e}")))
    }

    /// Parse a backup document.
    ///
    /// # Errors
    ///
    /// Returns `Backup` if the document element is not `my-time-backup`, its
    /// version is not "1", or the content is malformed.
    pub fn parse(xml: &str) -> Result<Self, WorktimeError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut parser = Parser::default();
        loop {
            let event = reader.read_event().map_err(|e| {
                WorktimeError::Backup(format!(
                    "malformed XML at byte {}: {e}",
                    reader.buffer_position()
                ))
            })?;

            match event {
                Event::Start(element) => parser.open(&element, false)?,
                Event::Empty(element) => parser.open(&element, true)?,
                Event::End(element) => parser.close(element.name().as_ref())?,
                Event::Eof => break,
                _ => {}
            }
        }

        parser.finish()
    }
}

fn write_event<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), WorktimeError> {
    writer
        .write_event(event)
        .map_err(|e| WorktimeError::Backup(format!("failed to write backup: {e}")))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum RootState {
    #[default]
    Before,
    Open,
    Closed,
}

#[derive(Default)]
struct Parser {
    root: RootState,
    project: Option<BackupProject>,
    document: BackupDocument,
}

impl Parser {
    fn open(&mut self, element: &BytesStart<'_>, empty: bool) -> Result<(), WorktimeError> {
        let name = element.name();
        let name = String::from_utf8_lossy(name.as_ref()).into_owned();

        match (self.root, name.as_str()) {
            (RootState::Before, ROOT_ELEMENT) => {
                let version = attribute(element, "ver")?;
                if version.as_deref() != Some(VERSION) {
                    return Err(WorktimeError::Backup(format!(
                        "unsupported backup version {}, expected {VERSION}",
                        version.as_deref().unwrap_or("(none)")
                    )));
                }
                self.root = if empty {
                    RootState::Closed
                } else {
                    RootState::Open
                };
                Ok(())
            }
            (RootState::Before, other) => Err(WorktimeError::Backup(format!(
                "invalid document element '{other}', should be '{ROOT_ELEMENT}'"
            ))),
            (RootState::Open, "project") if self.project.is_none() => {
                let project = BackupProject {
                    id: required_i64(element, "project", "id")?,
                    name: attribute(element, "name")?.unwrap_or_default(),
                    sessions: Vec::new(),
                };
                if empty {
                    self.document.projects.push(project);
                } else {
                    self.project = Some(project);
                }
                Ok(())
            }
            (RootState::Open, "session") => {
                let session = BackupSession {
                    id: required_i64(element, "session", "id")?,
                    start_ms: required_i64(element, "session", "start")?,
                    end_ms: optional_i64(element, "session", "end")?,
                    comment: attribute(element, "comment")?,
                };
                let project = self.project.as_mut().ok_or_else(|| {
                    WorktimeError::Backup("<session> outside of a <project>".to_string())
                })?;
                project.sessions.push(session);
                if empty {
                    Ok(())
                } else {
                    Err(WorktimeError::Backup(
                        "<session> must not have content".to_string(),
                    ))
                }
            }
            (_, other) => Err(WorktimeError::Backup(format!(
                "unexpected element <{other}>"
            ))),
        }
    }

    fn close(&mut self, name: &[u8]) -> Result<(), WorktimeError> {
        match name {
            b"project" => {
                let project = self.project.take().ok_or_else(|| {
                    WorktimeError::Backup("unbalanced </project>".to_string())
                })?;
                self.document.projects.push(project);
                Ok(())
            }
            b"my-time-backup" if self.project.is_none() => {
                self.root = RootState::Closed;
                Ok(())
            }
            other => Err(WorktimeError::Backup(format!(
                "unexpected closing tag </{}>",
                String::from_utf8_lossy(other)
            ))),
        }
    }

    fn finish(self) -> Result<BackupDocument, WorktimeError> {
        match self.root {
            RootState::Closed => Ok(self.document),
            RootState::Before => Err(WorktimeError::Backup("document is empty".to_string())),
            RootState::Open => Err(WorktimeError::Backup(
                "document ends before </my-time-backup>".to_string(),
            )),
        }
    }
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>, WorktimeError> {
    let Some(attr) = element
        .try_get_attribute(name)
        .map_err(|e| WorktimeError::Backup(format!("bad attribute '{name}': {e}")))?
    else {
        return Ok(None);
    };

    attr.unescape_value()
        .map(|value| Some(value.into_owned()))
        .map_err(|e| WorktimeError::Backup(format!("bad value for '{name}': {e}")))
}

fn optional_i64(
    element: &BytesStart<'_>,
    tag: &str,
    name: &str,
) -> Result<Option<i64>, WorktimeError> {
    attribute(element, name)?
        .map(|value| {
            value.trim().parse::<i64>().map_err(|e| {
                WorktimeError::Backup(format!("<{tag}> {name}='{value}' is not a number: {e}"))
            })
        })
        .transpose()
}

fn required_i64(element: &BytesStart<'_>, tag: &str, name: &str) -> Result<i64, WorktimeError> {
    optional_i64(element, tag, name)?
        .ok_or_else(|| WorktimeError::Backup(format!("<{tag}> is missing '{name}'")))
}
