use crate::error::ConsoleError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub access_token: String,
    pub saved_at: i64,
}

pub struct SessionStore {
    token: RwLock<Option<String>>,
    session_file: PathBuf,
}

impl SessionStore {
    pub async fn open(session_file: PathBuf) -> Self {
        let token = match tokio::fs::read(&session_file).await {
            Ok(bytes) if bytes.is_empty() => None,
            Ok(bytes) => match serde_json::from_slice::<SessionRecord>(&bytes) {
                Ok(record) if !record.access_token.trim().is_empty() => {
                    debug!(
                        session_file = %session_file.display(),
                        token = mask_token(&record.access_token, 4),
                        "restored persisted session"
                    );
                    Some(record.access_token)
                }
                Ok(_) => None,
                Err(err) => {
                    warn!(
                        session_file = %session_file.display(),
                        error = %err,
                        "discarding unreadable session file"
                    );
                    None
                }
            },
            Err(_) => None,
        };

        Self {
            token: RwLock::new(token),
            session_file,
        }
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    pub async fn store(&self, access_token: String) -> Result<(), ConsoleError> {
        {
            let mut guard = self.token.write().await;
            *guard = Some(access_token.clone());
        }

        let record = SessionRecord {
            access_token,
            saved_at: Utc::now().timestamp_millis(),
        };
        if let Some(parent) = self.session_file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp_file = self.session_file.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(&record)?;
        tokio::fs::write(&tmp_file, bytes).await?;
        tokio::fs::rename(&tmp_file, &self.session_file).await?;
        debug!(
            session_file = %self.session_file.display(),
            token = mask_token(&record.access_token, 4),
            "persisted session"
        );
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), ConsoleError> {
        {
            let mut guard = self.token.write().await;
            *guard = None;
        }

        match tokio::fs::remove_file(&self.session_file).await {
            Ok(()) => {
                debug!(
                    session_file = %self.session_file.display(),
                    "cleared persisted session"
                );
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn mask_token(token: &str, exposed: usize) -> String {
    if token.len() <= exposed * 2 {
        return "***".to_string();
    }
    format!(
        "{}...{}",
        &token[0..exposed],
        &token[token.len() - exposed..token.len()]
    )
}

#[cfg(test)]
mod tests {
    use super::mask_token;

    #[test]
    fn mask_token_keeps_only_the_edges() {
        assert_eq!(mask_token("abcdefghijkl", 4), "abcd...ijkl");
    }

    #[test]
    fn short_tokens_are_fully_masked() {
        assert_eq!(mask_token("abcdef", 4), "***");
    }
}
