//! Grant credits command handler

use anyhow::Context;

use super::{connect, print_profile};
use crate::config::Config;
use crate::services::ProfileMaintenance;

pub async fn cmd_grant_credits(
    config: &Config,
    id: &str,
    find: u32,
    verify: u32,
) -> anyhow::Result<()> {
    if find == 0 && verify == 0 {
        println!("Nothing to grant. Use --find and/or --verify.");
        return Ok(());
    }

    let store = connect(config)?;
    let service = ProfileMaintenance::new(store);

    let profile = service
        .grant_credits(id, find, verify)
        .await
        .with_context(|| format!("Failed to grant credits to profile '{id}'"))?;

    println!("✓ Granted {find} find / {verify} verify credits");
    println!();
    print_profile(&profile);

    Ok(())
}
