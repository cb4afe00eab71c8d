// SPDX-License-Identifier: MIT OR Apache-2.0
//! Account directory and device name taken from the environment.

use christmas_core::{AccountDirectory, Discoverability, IdentityError};
use futures::future::{self, BoxFuture, FutureExt};

/// Account id variable
pub const ACCOUNT_ID_VAR: &str = "CHRISTMAS_ACCOUNT_ID";
/// First name variable
pub const ACCOUNT_NAME_VAR: &str = "CHRISTMAS_ACCOUNT_NAME";
/// Set to "0" or "false" to refuse discovery
pub const DISCOVERABLE_VAR: &str = "CHRISTMAS_DISCOVERABLE";
/// Device name variable
pub const DEVICE_NAME_VAR: &str = "CHRISTMAS_DEVICE_NAME";

/// Account directory answering from fixed values
#[derive(Debug, Clone, Default)]
pub struct EnvDirectory {
    account_id: Option<String>,
    discoverable: bool,
    first_name: Option<String>,
}

impl EnvDirectory {
    /// Directory with explicit answers
    pub fn new(account_id: Option<String>, discoverable: bool, first_name: Option<String>) -> Self {
        Self {
            account_id,
            discoverable,
            first_name,
        }
    }

    /// Read the answers from the environment
    pub fn from_env() -> Self {
        let discoverable = std::env::var(DISCOVERABLE_VAR)
            .map(|v| !matches!(v.trim().to_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or(true);
        Self::new(
            std::env::var(ACCOUNT_ID_VAR).ok(),
            discoverable,
            std::env::var(ACCOUNT_NAME_VAR).ok(),
        )
    }
}

impl AccountDirectory for EnvDirectory {
    fn fetch_account_id(&self) -> BoxFuture<'static, Result<String, IdentityError>> {
        let result = self
            .account_id
            .clone()
            .ok_or_else(|| IdentityError::NoAccount(format!("{} not set", ACCOUNT_ID_VAR)));
        future::ready(result).boxed()
    }

    fn request_discoverability(&self) -> BoxFuture<'static, Result<Discoverability, IdentityError>> {
        let status = if self.discoverable {
            Discoverability::Granted
        } else {
            Discoverability::Denied
        };
        future::ready(Ok(status)).boxed()
    }

    fn discover_first_name(
        &self,
        account_id: String,
    ) -> BoxFuture<'static, Result<String, IdentityError>> {
        let result = self.first_name.clone().ok_or_else(|| {
            IdentityError::Discovery(format!("no first name for account {}", account_id))
        });
        future::ready(result).boxed()
    }
}

/// Device name from the config, the environment or the host name
pub fn device_name(configured: Option<String>) -> Option<String> {
    configured
        .or_else(|| std::env::var(DEVICE_NAME_VAR).ok())
        .or_else(|| std::env::var("HOSTNAME").ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use christmas_core::{DirectoryIdentity, IdentityProvider};
    use futures::executor::block_on;

    #[test]
    fn test_granted_account_resolves() {
        let identity = DirectoryIdentity::new(EnvDirectory::new(
            Some("acct-1".to_string()),
            true,
            Some("Marie".to_string()),
        ));
        assert_eq!(block_on(identity.resolve_first_name()), Ok("Marie".to_string()));
    }

    #[test]
    fn test_denied_discovery() {
        let identity = DirectoryIdentity::new(EnvDirectory::new(
            Some("acct-1".to_string()),
            false,
            Some("Marie".to_string()),
        ));
        assert_eq!(
            block_on(identity.resolve_first_name()),
            Err(IdentityError::PermissionDenied)
        );
    }

    #[test]
    fn test_no_account() {
        let identity = DirectoryIdentity::new(EnvDirectory::default());
        assert!(matches!(
            block_on(identity.resolve_first_name()),
            Err(IdentityError::NoAccount(_))
        ));
    }

    #[test]
    fn test_configured_device_name_wins() {
        assert_eq!(
            device_name(Some("Anna's iPad".to_string())).as_deref(),
            Some("Anna's iPad")
        );
    }
}
