//! User data loading
//!
//! Parses the intranet users XML into names and avatar URLs.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{Kwargs, Producer};
use crate::data::UserId;
use crate::error::{PresenceError, Result};

/// Name and avatar of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonalData {
    pub name: String,
    pub avatar_url: String,
}

/// Personal data of every user listed in the XML.
pub type UsersData = BTreeMap<UserId, PersonalData>;

/// Parses users XML.
///
/// Expected layout:
/// ```xml
/// <intranet>
///   <server><host>intranet.example.com</host><protocol>https</protocol></server>
///   <users>
///     <user id="10"><avatar>/api/images/users/10</avatar><name>Maria K.</name></user>
///   </users>
/// </intranet>
/// ```
/// Avatar URLs are built as `protocol://host` followed by the avatar path.
pub fn parse_users(xml: &str) -> Result<UsersData> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| PresenceError::InvalidUserData(e.to_string()))?;

    let server = doc
        .descendants()
        .find(|n| n.has_tag_name("server"))
        .ok_or_else(|| PresenceError::InvalidUserData("missing <server> element".to_string()))?;
    let host = child_text(server, "host")
        .ok_or_else(|| PresenceError::InvalidUserData("missing server <host>".to_string()))?;
    let protocol = child_text(server, "protocol")
        .ok_or_else(|| PresenceError::InvalidUserData("missing server <protocol>".to_string()))?;

    let mut users = UsersData::new();
    let user_nodes = doc
        .descendants()
        .filter(|n| n.has_tag_name("users"))
        .flat_map(|users| users.children().filter(|n| n.has_tag_name("user")));

    for user in user_nodes {
        let Some(user_id) = user.attribute("id").and_then(|id| id.trim().parse::<UserId>().ok()) else {
            debug!(id = ?user.attribute("id"), "Skipping user with invalid id");
            continue;
        };

        let name = child_text(user, "name").unwrap_or_default().to_string();
        let avatar = child_text(user, "avatar").unwrap_or_default();
        users.insert(
            user_id,
            PersonalData {
                name,
                avatar_url: format!("{protocol}://{host}{avatar}"),
            },
        );
    }

    Ok(users)
}

fn child_text<'a>(node: roxmltree::Node<'a, '_>, tag: &str) -> Option<&'a str> {
    node.children()
        .find(|n| n.has_tag_name(tag))
        .and_then(|n| n.text())
        .map(str::trim)
}

/// Reads and parses the users XML at `path`.
///
/// A missing file yields no users: the file is fetched separately by the
/// `download_users` job and may not exist yet.
pub fn load_users(path: &Path) -> Result<UsersData> {
    let xml = match std::fs::read_to_string(path) {
        Ok(xml) => xml,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "Users file not found, using default names");
            return Ok(UsersData::new());
        }
        Err(source) => {
            return Err(PresenceError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let users = parse_users(&xml)?;
    debug!(path = %path.display(), users = users.len(), "User data loaded");
    Ok(users)
}

/// Cacheable loader of the users XML.
#[derive(Debug, Clone)]
pub struct UsersLoader {
    path: PathBuf,
    /// Cache identity, unique per file
    name: String,
}

impl UsersLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("personal_data:{}", path.display());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Producer for UsersLoader {
    type Args = ();
    type Output = UsersData;
    type Error = PresenceError;

    fn name(&self) -> &str {
        &self.name
    }

    fn produce(&self, _: &(), _: &Kwargs) -> Result<UsersData> {
        load_users(&self.path)
    }
}
