use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::StoreError;
use crate::history_store::{io_error, json_error, write_json};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    username: String,
    salt: String,
    password_hash: String,
    #[serde(default)]
    full_name: String,
}

/// Public part of a user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub full_name: String,
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Flat-file user registry. Passwords are stored as salted SHA-256 digests.
pub struct UserStore {
    path: PathBuf,
    users: Mutex<Vec<UserRecord>>,
}

impl UserStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let users = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content).map_err(|e| json_error(&path, e))?
            }
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            users: Mutex::new(users),
        })
    }

    /// Register a user. Returns `false` if the username is taken.
    pub fn create_user(
        &self,
        username: &str,
        password: &str,
        full_name: &str,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        if users.iter().any(|u| u.username == username) {
            return Ok(false);
        }

        let salt = Uuid::new_v4().as_simple().to_string();
        users.push(UserRecord {
            username: username.to_string(),
            password_hash: hash_password(&salt, password),
            salt,
            full_name: full_name.to_string(),
        });
        if let Err(e) = write_json(&self.path, &*users) {
            users.pop();
            return Err(e);
        }
        tracing::info!("Created user {}", username);
        Ok(true)
    }

    /// Profile of the user if the password matches
    pub fn check_credentials(&self, username: &str, password: &str) -> Option<UserProfile> {
        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        users
            .iter()
            .find(|u| u.username == username && u.password_hash == hash_password(&u.salt, password))
            .map(|u| UserProfile {
                username: u.username.clone(),
                full_name: u.full_name.clone(),
            })
    }
}
