use std::fmt;

/// Login credentials for one cluster host.
///
/// Immutable once supplied; the session obtained from them is only valid
/// against the same host.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn form_fields(&self) -> [(&'static str, &str); 2] {
        [("username", &self.username), ("password", &self.password)]
    }
}

// Keep the password out of logs and error chains.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_password() {
        let credentials = Credentials::new("root@pam", "hunter2");
        let printed = format!("{credentials:?}");
        assert!(printed.contains("root@pam"));
        assert!(!printed.contains("hunter2"));
    }
}
