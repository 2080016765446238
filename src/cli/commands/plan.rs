//! Set-plan command handler

use anyhow::Context;
use chrono::{Duration, Utc};

use super::{connect, print_profile};
use crate::config::Config;
use crate::models::Plan;
use crate::services::ProfileMaintenance;

pub async fn cmd_set_plan(
    config: &Config,
    id: &str,
    plan: Plan,
    days: i64,
) -> anyhow::Result<()> {
    let store = connect(config)?;
    let service = ProfileMaintenance::new(store);

    let expiry = Utc::now() + Duration::days(days);
    let profile = service
        .set_plan(id, plan, expiry)
        .await
        .with_context(|| format!("Failed to change plan for profile '{id}'"))?;

    println!("✓ Plan changed to {plan} for {days} days");
    println!();
    print_profile(&profile);

    Ok(())
}
