// SPDX-License-Identifier: MIT OR Apache-2.0
//! Greeting name resolution.
//!
//! The account service is asked first. If it fails or returns nothing,
//! the device owner's name is guessed locally. A session with no name at
//! all still runs; the greeting just is not personalised.

use crate::providers::{IdentityError, IdentityProvider, LocalNameFallback};
use crate::settings::Script;
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;

/// Resolve the name to greet. Never fails; `None` means "greet without a name".
pub async fn resolve_greeting_name(
    identity: &dyn IdentityProvider,
    fallback: &dyn LocalNameFallback,
) -> Option<String> {
    match identity.resolve_first_name().await {
        Ok(name) if !name.trim().is_empty() => {
            tracing::info!("Greeting name resolved from account");
            return Some(name.trim().to_string());
        }
        Ok(_) => tracing::warn!("Account returned an empty name, using device owner"),
        Err(e) => tracing::warn!("Identity lookup failed, using device owner: {}", e),
    }

    let name = fallback
        .best_effort_first_name()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    if name.is_none() {
        tracing::info!("No greeting name available");
    }
    name
}

/// Greeting text and its font size
#[derive(Debug, Clone, PartialEq)]
pub struct GreetingCopy {
    /// Text to display and speak
    pub text: String,
    /// Font size
    pub size: f32,
}

impl GreetingCopy {
    /// Personalise the greeting. An empty name counts as no name.
    pub fn new(script: &Script, name: Option<&str>) -> Self {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => Self {
                text: format!("{}, {}", script.greeting, name),
                size: script.greeting_size_named,
            },
            None => Self {
                text: script.greeting.clone(),
                size: script.greeting_size_unnamed,
            },
        }
    }
}

/// Outcome of asking the user to be discoverable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discoverability {
    /// The user allowed discovery
    Granted,
    /// The user refused
    Denied,
    /// The request could not be completed
    CouldNotComplete,
}

/// Cloud account directory that can look up the signed-in user
pub trait AccountDirectory: Send + Sync + 'static {
    /// Identifier of the signed-in account
    fn fetch_account_id(&self) -> BoxFuture<'static, Result<String, IdentityError>>;

    /// Ask the user to allow name discovery
    fn request_discoverability(&self) -> BoxFuture<'static, Result<Discoverability, IdentityError>>;

    /// First name of the account
    fn discover_first_name(&self, account_id: String)
        -> BoxFuture<'static, Result<String, IdentityError>>;
}

/// Identity provider backed by an [`AccountDirectory`]: account id, then
/// permission, then the name.
pub struct DirectoryIdentity<D> {
    directory: Arc<D>,
}

impl<D: AccountDirectory> DirectoryIdentity<D> {
    /// Wrap a directory
    pub fn new(directory: D) -> Self {
        Self {
            directory: Arc::new(directory),
        }
    }
}

impl<D: AccountDirectory> IdentityProvider for DirectoryIdentity<D> {
    fn resolve_first_name(&self) -> BoxFuture<'static, Result<String, IdentityError>> {
        let directory = Arc::clone(&self.directory);
        async move {
            let account_id = directory.fetch_account_id().await?;
            match directory.request_discoverability().await? {
                Discoverability::Granted => {}
                status => {
                    tracing::debug!(?status, "Discovery not permitted");
                    return Err(IdentityError::PermissionDenied);
                }
            }
            directory.discover_first_name(account_id).await
        }
        .boxed()
    }
}

/// Guesses the owner's first name from a device name such as
/// "Anna's iPhone" or "iPad de Marie".
#[derive(Debug, Clone, Default)]
pub struct DeviceOwner {
    device_name: Option<String>,
}

impl DeviceOwner {
    /// Create from the device name, if known
    pub fn new(device_name: Option<String>) -> Self {
        Self { device_name }
    }

    /// Extract the owner's first name from a device name
    pub fn parse(device_name: &str) -> Option<String> {
        let name = device_name.trim();

        // Bytes of the marker that still belong to the name
        let owner = [("'s ", 0), ("’s ", 0), ("s' ", 1), ("s’ ", 1)]
            .iter()
            .find_map(|(marker, kept)| name.find(marker).map(|i| &name[..i + kept]))
            .or_else(|| {
                [" de ", " von ", " di ", " da "]
                    .iter()
                    .find_map(|marker| name.rfind(marker).map(|i| &name[i + marker.len()..]))
            })?;

        owner
            .split_whitespace()
            .next()
            .filter(|first| first.chars().next().is_some_and(char::is_alphabetic))
            .map(str::to_string)
    }
}

impl LocalNameFallback for DeviceOwner {
    fn best_effort_first_name(&self) -> Option<String> {
        self.device_name.as_deref().and_then(Self::parse)
    }
}
