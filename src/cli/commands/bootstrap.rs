//! Bootstrap command handler

use anyhow::Context;

use super::{connect, print_profile};
use crate::config::Config;
use crate::models::Identity;
use crate::services::ProfileBootstrapper;

pub async fn cmd_bootstrap(
    config: &Config,
    id: &str,
    email: Option<String>,
    name: Option<String>,
    no_retry: bool,
) -> anyhow::Result<()> {
    let store = connect(config)?;
    let bootstrapper =
        ProfileBootstrapper::new(store).with_retry_policy(config.bootstrap.retry_policy());

    let identity = Identity {
        id: id.to_string(),
        email,
        name,
    };

    let profile = if no_retry {
        bootstrapper.ensure_profile(&identity).await
    } else {
        bootstrapper.ensure_profile_with_retry(&identity).await
    }
    .with_context(|| format!("Bootstrap failed for identity '{id}'"))?;

    println!("✓ Profile ready");
    println!();
    print_profile(&profile);

    Ok(())
}
