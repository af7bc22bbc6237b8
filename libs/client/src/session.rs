//! Persisted login state

use std::{fs, io::ErrorKind, path::Path};

use domain::User;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    dashboard::Dashboard,
    error::{ClientError, ClientResult},
};

/// The authenticated identity and the bearer token that proves it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub access_token: String,
}

impl Session {
    /// Read a saved session. A missing file means nobody is logged in.
    pub fn load(path: impl AsRef<Path>) -> ClientResult<Option<Self>> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let session: Session = serde_json::from_str(&contents).map_err(|e| {
            ClientError::Session(format!("Unreadable session file {}: {}", path.display(), e))
        })?;
        debug!("Loaded session for {} from {}", session.user.login, path.display());
        Ok(Some(session))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ClientResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ClientError::Session(e.to_string()))?;
        fs::write(path, contents)?;
        debug!("Saved session for {} to {}", self.user.login, path.display());
        Ok(())
    }

    /// Forget the saved session; clearing twice is fine
    pub fn clear(path: impl AsRef<Path>) -> ClientResult<()> {
        match fs::remove_file(path.as_ref()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::for_role(self.user.role)
    }
}
