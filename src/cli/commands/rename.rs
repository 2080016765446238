//! Rename command handler

use anyhow::Context;

use super::{connect, print_profile};
use crate::config::Config;
use crate::services::ProfileMaintenance;

pub async fn cmd_rename(config: &Config, id: &str, full_name: &str) -> anyhow::Result<()> {
    let store = connect(config)?;
    let service = ProfileMaintenance::new(store);

    let profile = service
        .set_full_name(id, full_name)
        .await
        .with_context(|| format!("Failed to rename profile '{id}'"))?;

    println!("✓ Profile renamed");
    println!();
    print_profile(&profile);

    Ok(())
}
