use std::env;

use serde::{Deserialize, Serialize};

fn default_server_url() -> String {
    "http://127.0.0.1:4568".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

/// Where the OCR/lookup server lives and how to authenticate against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default)]
    pub auth_username: String,
    #[serde(default)]
    pub auth_password: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            auth_username: String::new(),
            auth_password: String::new(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl NetworkConfig {
    pub fn apply_env(&mut self) {
        if let Ok(url) = env::var("MANATAN_SERVER_URL") {
            self.server_url = url;
        }
        if let Ok(user) = env::var("MANATAN_AUTH_USER") {
            self.auth_username = user;
        }
        if let Ok(pass) = env::var("MANATAN_AUTH_PASS") {
            self.auth_password = pass;
        }
        if let Some(secs) = env::var("TIMEOUT_SECONDS").ok().and_then(|v| v.parse().ok()) {
            self.timeout_seconds = secs;
        }
    }

    /// Credentials are only sent when both halves are non-blank.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let user = self.auth_username.trim();
        let pass = self.auth_password.trim();
        if user.is_empty() || pass.is_empty() {
            None
        } else {
            Some((user, pass))
        }
    }

    /// Absolute URL for a server path; absolute inputs pass through.
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with("http") {
            return path.to_string();
        }
        format!("{}{}", self.server_url.trim_end_matches('/'), path)
    }
}
