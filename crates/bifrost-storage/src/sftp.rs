// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! SFTP store backend
//!
//! Backs `sftp://` store URIs through `ssh2`. Authentication is password
//! based when a password is configured and falls back to the SSH agent
//! otherwise. Uploads land under a temporary name and are renamed into place
//! so a concurrent reader never sees a partial object.

use crate::error::{StoreError, StoreResult};
use crate::{PushOutcome, StoreBackend};
use async_trait::async_trait;
use bifrost_config::StoreRecord;
use ssh2::{ErrorCode, RenameFlags, Session, Sftp};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use url::Url;

const DEFAULT_SSH_PORT: u16 = 22;

// SSH_FXP status for a path that does not exist.
const SSH_FX_NO_SUCH_FILE: i32 = 2;

/// Store backend for `sftp://` URIs
pub struct SftpBackend {
    url: Url,
    username: String,
    password: Option<String>,
    session: Option<Session>,
    sftp: Option<Sftp>,
}

impl std::fmt::Debug for SftpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SftpBackend")
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .field("open", &self.sftp.is_some())
            .finish()
    }
}

impl SftpBackend {
    /// Create a backend from a store record; the username falls back from
    /// the record to the URL userinfo.
    pub fn new(record: &StoreRecord) -> StoreResult<Self> {
        let url = record.url.clone();
        if url.host_str().map_or(true, str::is_empty) {
            return Err(StoreError::InvalidUrl {
                url: url.to_string(),
                reason: "missing host".to_string(),
            });
        }

        let username = match record.username.clone() {
            Some(user) => user,
            None if !url.username().is_empty() => url.username().to_string(),
            None => {
                return Err(StoreError::InvalidUrl {
                    url: url.to_string(),
                    reason: "missing username".to_string(),
                })
            }
        };

        let password = record
            .password
            .clone()
            .or_else(|| url.password().map(str::to_string));

        Ok(SftpBackend {
            url,
            username,
            password,
            session: None,
            sftp: None,
        })
    }

    fn remote_path(&self, relative_name: &str) -> PathBuf {
        let base = self.url.path().trim_end_matches('/');
        let mut path = PathBuf::from(if base.is_empty() { "/" } else { base });
        for component in relative_name.split('/') {
            path.push(component);
        }
        path
    }

    fn sftp(&mut self) -> StoreResult<&mut Sftp> {
        self.sftp
            .as_mut()
            .ok_or_else(|| StoreError::NotOpen(self.url.to_string()))
    }

    fn make_parent_dirs(&mut self, path: &Path) {
        let Some(parent) = path.parent() else { return };
        let mut prefix = PathBuf::new();
        for component in parent.components() {
            prefix.push(component);
            if prefix.as_os_str().is_empty() || prefix == Path::new("/") {
                continue;
            }
            if let Ok(sftp) = self.sftp() {
                // Fails when the directory exists; that is the common case.
                let _ = sftp.mkdir(&prefix, 0o755);
            }
        }
    }
}

fn is_absent(error: &ssh2::Error) -> bool {
    matches!(error.code(), ErrorCode::SFTP(SSH_FX_NO_SUCH_FILE))
}

#[async_trait]
impl StoreBackend for SftpBackend {
    async fn open(&mut self) -> StoreResult<()> {
        if self.sftp.is_some() {
            return Ok(());
        }

        let host = self.url.host_str().unwrap_or_default().to_string();
        let port = self.url.port().unwrap_or(DEFAULT_SSH_PORT);
        let url = self.url.to_string();

        let tcp = TcpStream::connect((host.as_str(), port))
            .map_err(|e| StoreError::open_failed(&url, e))?;

        let mut session = Session::new().map_err(|e| StoreError::open_failed(&url, e))?;
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|e| StoreError::open_failed(&url, e))?;

        match &self.password {
            Some(password) => session
                .userauth_password(&self.username, password)
                .map_err(|e| StoreError::open_failed(&url, e))?,
            None => session
                .userauth_agent(&self.username)
                .map_err(|e| StoreError::open_failed(&url, e))?,
        }

        if !session.authenticated() {
            return Err(StoreError::open_failed(&url, "authentication failed"));
        }

        let sftp = session.sftp().map_err(|e| StoreError::open_failed(&url, e))?;
        debug!(store = %self.url, user = %self.username, "sftp session opened");
        self.session = Some(session);
        self.sftp = Some(sftp);
        Ok(())
    }

    async fn push(&mut self, local_path: &Path, relative_name: &str) -> StoreResult<PushOutcome> {
        let remote = self.remote_path(relative_name);

        let data = match std::fs::read(local_path) {
            Ok(data) => data,
            Err(e) => {
                warn!(store = %self.url, path = %local_path.display(), error = %e,
                    "local source unreadable");
                return Ok(PushOutcome::Failed);
            }
        };

        match self.sftp()?.stat(&remote) {
            Ok(stat) if stat.size == Some(data.len() as u64) => {
                debug!(store = %self.url, object = relative_name, "destination already current");
                return Ok(PushOutcome::Skipped);
            }
            Ok(_) => {}
            Err(e) if is_absent(&e) => {}
            Err(e) => {
                warn!(store = %self.url, object = relative_name, error = %e, "stat probe failed");
                return Ok(PushOutcome::Failed);
            }
        }

        self.make_parent_dirs(&remote);

        let temp = remote.with_extension("bin.tmp");
        let url = self.url.to_string();
        let sftp = self.sftp()?;
        let result: anyhow::Result<()> = (|| {
            let mut file = sftp.create(&temp)?;
            file.write_all(&data)?;
            drop(file);
            sftp.rename(&temp, &remote, Some(RenameFlags::OVERWRITE))?;
            Ok(())
        })();

        match result {
            Ok(()) => Ok(PushOutcome::Success),
            Err(e) => {
                warn!(store = %url, object = relative_name, error = %e, "transfer failed");
                let _ = sftp.unlink(&temp);
                Ok(PushOutcome::Failed)
            }
        }
    }

    async fn pull(&mut self, relative_name: &str) -> StoreResult<Option<Vec<u8>>> {
        let remote = self.remote_path(relative_name);
        let url = self.url.to_string();

        let mut file = match self.sftp()?.open(&remote) {
            Ok(file) => file,
            Err(e) if is_absent(&e) => return Ok(None),
            Err(e) => return Err(StoreError::transfer_failed(url, e)),
        };

        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| StoreError::transfer_failed(url, e))?;
        Ok(Some(data))
    }

    async fn close(&mut self) -> StoreResult<()> {
        self.sftp = None;
        if let Some(session) = self.session.take() {
            let _ = session.disconnect(None, "done", None);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bifrost_config::StoreRecord;

    fn record(url: &str) -> StoreRecord {
        StoreRecord {
            name: "depot".to_string(),
            url: Url::parse(url).unwrap(),
            remote: None,
            primary: false,
            username: None,
            password: None,
        }
    }

    #[test]
    fn test_username_required() {
        assert!(SftpBackend::new(&record("sftp://host.example.com/data")).is_err());
    }

    #[test]
    fn test_username_from_url() {
        let backend = SftpBackend::new(&record("sftp://carol@host.example.com/data")).unwrap();
        assert_eq!(backend.username, "carol");
        assert!(backend.password.is_none());
    }

    #[test]
    fn test_record_credentials_take_precedence() {
        let mut rec = record("sftp://carol@host.example.com/data");
        rec.username = Some("dave".to_string());
        rec.password = Some("hunter2".to_string());
        let backend = SftpBackend::new(&rec).unwrap();
        assert_eq!(backend.username, "dave");
        assert_eq!(backend.password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn test_remote_path_joins_base_and_name() {
        let backend = SftpBackend::new(&record("sftp://carol@host.example.com/srv/bifrost")).unwrap();
        assert_eq!(
            backend.remote_path("2/A/A/X.bin"),
            PathBuf::from("/srv/bifrost/2/A/A/X.bin")
        );
    }

    #[tokio::test]
    async fn test_transfer_on_unopened_session_is_an_error() {
        let mut backend = SftpBackend::new(&record("sftp://carol@host.example.com/data")).unwrap();
        assert!(matches!(
            backend.pull("2/A/A/X.bin").await,
            Err(StoreError::NotOpen(_))
        ));
    }
}
