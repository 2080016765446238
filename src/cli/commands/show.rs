//! Show profile command handler

use anyhow::Context;

use super::{connect, print_profile};
use crate::config::Config;
use crate::services::ProfileMaintenance;

pub async fn cmd_show_profile(config: &Config, id: &str) -> anyhow::Result<()> {
    let store = connect(config)?;
    let service = ProfileMaintenance::new(store);

    let profile = service
        .get(id)
        .await
        .with_context(|| format!("Failed to fetch profile '{id}'"))?;

    print_profile(&profile);

    Ok(())
}
