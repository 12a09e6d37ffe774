//! Organization directory: members and outside collaborators merged into
//! one tagged list.

use std::collections::HashSet;
use std::fmt::{self, Write as _};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use tracing::{info, warn};

use crate::error::{RosterError, Result};
use crate::github::{MemberOps, OrgUser};

/// Header row of an export file.
pub const EXPORT_HEADER: &str = "login,type";

/// Where a directory entry came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Origin {
    OrgMember,
    OutsideCollaborator,
    /// A tag this tool does not know how to act on.
    Unknown(String),
}

impl Origin {
    /// Wire tag, as written in the `type` column of an export.
    pub fn as_str(&self) -> &str {
        match self {
            Origin::OrgMember => "OrgMember",
            Origin::OutsideCollaborator => "OutsideCollaborator",
            Origin::Unknown(tag) => tag,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Origin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "OrgMember" => Origin::OrgMember,
            "OutsideCollaborator" => Origin::OutsideCollaborator,
            other => Origin::Unknown(other.to_string()),
        })
    }
}

/// One login in the organization directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirectoryEntry {
    pub login: String,
    pub origin: Origin,
}

impl DirectoryEntry {
    /// Entry with an explicit origin.
    pub fn new(login: impl Into<String>, origin: Origin) -> Self {
        Self {
            login: login.into(),
            origin,
        }
    }

    /// Entry for an organization member.
    pub fn member(login: impl Into<String>) -> Self {
        Self::new(login, Origin::OrgMember)
    }

    /// Entry for an outside collaborator.
    pub fn collaborator(login: impl Into<String>) -> Self {
        Self::new(login, Origin::OutsideCollaborator)
    }
}

fn tag(users: Vec<OrgUser>, origin: Origin) -> Vec<DirectoryEntry> {
    users
        .into_iter()
        .filter_map(|user| match user.login {
            Some(login) if !login.is_empty() => Some(DirectoryEntry::new(login, origin.clone())),
            _ => {
                warn!(id = ?user.id, %origin, "skipping listed user without a login");
                None
            }
        })
        .collect()
}

/// Fetch members then outside collaborators, tagged with their origin.
///
/// No deduplication is applied; a login may appear once per origin.
pub fn fetch_entries<A: MemberOps + ?Sized>(api: &A, org: &str) -> Result<Vec<DirectoryEntry>> {
    info!(org, "fetching organization members");
    let members = api.list_org_members(org)?;
    info!(org, "fetching outside collaborators");
    let outside = api.list_outside_collaborators(org)?;

    let mut entries = tag(members, Origin::OrgMember);
    entries.extend(tag(outside, Origin::OutsideCollaborator));
    Ok(entries)
}

/// Keep the first entry for each login, then sort ascending by login.
///
/// Logins are compared exactly as returned by the API.
pub fn dedupe_by_login(entries: Vec<DirectoryEntry>) -> Vec<DirectoryEntry> {
    let mut seen = HashSet::new();
    let mut unique: Vec<DirectoryEntry> = entries
        .into_iter()
        .filter(|e| seen.insert(e.login.clone()))
        .collect();
    unique.sort_by(|a, b| a.login.cmp(&b.login));
    unique
}

/// List the organization directory: one entry per login, sorted by login.
/// Members take precedence over outside collaborators on collision.
pub fn list_directory<A: MemberOps + ?Sized>(api: &A, org: &str) -> Result<Vec<DirectoryEntry>> {
    let entries = fetch_entries(api, org)?;
    let total = entries.len();
    let unique = dedupe_by_login(entries);
    info!(org, fetched = total, unique = unique.len(), "directory loaded");
    Ok(unique)
}

/// Write entries as `login,type` rows.
///
/// The file is written next to `path` and renamed into place once complete.
pub fn write_export(entries: &[DirectoryEntry], path: &Path) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| RosterError::Export {
            path: path.to_path_buf(),
            message: "not a file path".into(),
        })?
        .to_string_lossy();
    let partial = path.with_file_name(format!(".{}.partial", file_name));

    let result = (|| -> Result<()> {
        let mut out = BufWriter::new(fs::File::create(&partial)?);
        writeln!(out, "{}", EXPORT_HEADER)?;
        for entry in entries {
            writeln!(out, "{},{}", entry.login, entry.origin)?;
        }
        out.flush()?;
        Ok(())
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&partial);
        return Err(e);
    }

    if let Err(e) = fs::rename(&partial, path) {
        let _ = fs::remove_file(&partial);
        return Err(e.into());
    }
    info!(path = %path.display(), rows = entries.len(), "export written");
    Ok(())
}

/// Read an export file back into entries.
pub fn read_export(path: &Path) -> Result<Vec<DirectoryEntry>> {
    let content = fs::read_to_string(path)?;
    parse_export(&content).map_err(|message| RosterError::Export {
        path: path.to_path_buf(),
        message,
    })
}

fn parse_export(content: &str) -> std::result::Result<Vec<DirectoryEntry>, String> {
    let mut lines = content.lines().enumerate();

    match lines.next() {
        Some((_, header)) if header.trim().trim_start_matches('\u{feff}') == EXPORT_HEADER => {}
        Some((_, header)) => {
            return Err(format!(
                "expected header '{}', found '{}'",
                EXPORT_HEADER,
                header.trim()
            ));
        }
        None => return Err("file is empty".into()),
    }

    let mut entries = Vec::new();
    for (idx, line) in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (login, origin) = line
            .split_once(',')
            .ok_or_else(|| format!("line {}: expected 'login,type'", idx + 1))?;
        let login = login.trim();
        if login.is_empty() {
            return Err(format!("line {}: empty login", idx + 1));
        }
        let Ok(origin) = origin.trim().parse::<Origin>();
        entries.push(DirectoryEntry::new(login, origin));
    }
    Ok(entries)
}

/// Render entries as a fixed-width table with a count footer.
pub fn render_table(entries: &[DirectoryEntry]) -> String {
    let width = entries
        .iter()
        .map(|e| e.login.len())
        .max()
        .unwrap_or(0)
        .max("LOGIN".len());
    let index_width = entries.len().to_string().len().max(1);

    let mut out = String::new();
    let _ = writeln!(out, "{:>iw$}  {:<w$}  TYPE", "#", "LOGIN", iw = index_width, w = width);
    for (idx, entry) in entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>iw$}  {:<w$}  {}",
            idx + 1,
            entry.login,
            entry.origin,
            iw = index_width,
            w = width
        );
    }

    let members = entries
        .iter()
        .filter(|e| e.origin == Origin::OrgMember)
        .count();
    let outside = entries
        .iter()
        .filter(|e| e.origin == Origin::OutsideCollaborator)
        .count();
    let _ = write!(
        out,
        "\n{} user(s): {} member(s), {} outside collaborator(s)",
        entries.len(),
        members,
        outside
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_origin_round_trip_tags() {
        assert_eq!("OrgMember".parse::<Origin>().unwrap(), Origin::OrgMember);
        assert_eq!(
            "OutsideCollaborator".parse::<Origin>().unwrap(),
            Origin::OutsideCollaborator
        );
        assert_eq!(
            "Bot".parse::<Origin>().unwrap(),
            Origin::Unknown("Bot".into())
        );
        assert_eq!(Origin::Unknown("Bot".into()).to_string(), "Bot");
    }

    #[test]
    fn test_dedupe_by_login_first_wins_and_sorts() {
        let entries = vec![
            DirectoryEntry::member("erin"),
            DirectoryEntry::member("bob"),
            DirectoryEntry::collaborator("erin"),
            DirectoryEntry::collaborator("alice"),
        ];

        let unique = dedupe_by_login(entries);
        assert_eq!(
            unique,
            vec![
                DirectoryEntry::collaborator("alice"),
                DirectoryEntry::member("bob"),
                DirectoryEntry::member("erin"),
            ]
        );
    }

    #[test]
    fn test_dedupe_is_case_sensitive() {
        let unique = dedupe_by_login(vec![
            DirectoryEntry::member("Alice"),
            DirectoryEntry::member("alice"),
        ]);
        assert_eq!(unique.len(), 2);
    }

    #[test]
    fn test_tag_skips_missing_login() {
        let users = vec![
            OrgUser::named("alice"),
            OrgUser {
                login: None,
                id: Some(7),
            },
            OrgUser::named(""),
        ];
        let tagged = tag(users, Origin::OrgMember);
        assert_eq!(tagged, vec![DirectoryEntry::member("alice")]);
    }

    #[test]
    fn test_write_and_read_export() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.csv");
        let entries = vec![
            DirectoryEntry::member("alice"),
            DirectoryEntry::collaborator("dave"),
        ];

        write_export(&entries, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "login,type\nalice,OrgMember\ndave,OutsideCollaborator\n");
        assert!(!dir.path().join(".users.csv.partial").exists());

        assert_eq!(read_export(&path).unwrap(), entries);
    }

    #[test]
    fn test_failed_rename_removes_partial() {
        let dir = TempDir::new().unwrap();
        // A non-empty directory at the target makes the rename fail.
        let path = dir.path().join("users.csv");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let result = write_export(&[DirectoryEntry::member("alice")], &path);

        assert!(result.is_err());
        assert!(!dir.path().join(".users.csv.partial").exists());
        assert!(path.join("keep").exists());
    }

    #[test]
    fn test_write_export_empty_has_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");
        write_export(&[], &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "login,type\n");
    }

    #[test]
    fn test_parse_export_unknown_type() {
        let entries = parse_export("login,type\nfrank,Robot\n\n").unwrap();
        assert_eq!(
            entries,
            vec![DirectoryEntry::new("frank", Origin::Unknown("Robot".into()))]
        );
    }

    #[test]
    fn test_parse_export_rejects_bad_input() {
        assert!(parse_export("").is_err());
        assert!(parse_export("name,kind\nalice,OrgMember\n").is_err());
        assert!(parse_export("login,type\nalice\n").is_err());
        assert!(parse_export("login,type\n,OrgMember\n").is_err());
    }

    #[test]
    fn test_render_table() {
        let table = render_table(&[
            DirectoryEntry::member("alice"),
            DirectoryEntry::collaborator("dave"),
        ]);
        assert!(table.contains("LOGIN"));
        assert!(table.contains("alice  OrgMember"));
        assert!(table.contains("dave   OutsideCollaborator"));
        assert!(table.ends_with("2 user(s): 1 member(s), 1 outside collaborator(s)"));
    }
}
