mod bootstrap;
mod grant;
mod plan;
mod rename;
mod show;

pub use bootstrap::cmd_bootstrap;
pub use grant::cmd_grant_credits;
pub use plan::cmd_set_plan;
pub use rename::cmd_rename;
pub use show::cmd_show_profile;

use anyhow::{Result, bail};

use crate::config::{API_KEY_ENV, Config};
use crate::models::UserProfile;
use crate::store::HttpRecordStore;

/// Builds the HTTP store from config, refusing to run without a key rather
/// than sending unauthenticated requests the backend will reject anyway.
fn connect(config: &Config) -> Result<HttpRecordStore> {
    if config.store.api_key.is_empty() {
        bail!(
            "No service key configured. Set {} or store.api_key in config.toml",
            API_KEY_ENV
        );
    }

    HttpRecordStore::new(&config.store.http_config())
}

fn print_profile(profile: &UserProfile) {
    println!("Profile {}", profile.id);
    println!("{:-<60}", "");
    println!("  Email:    {}", profile.email);
    println!(
        "  Name:     {}",
        profile.full_name.as_deref().unwrap_or("-")
    );

    let expiry = profile
        .plan_expiry
        .map_or("never expires".to_string(), |e| {
            format!("until {}", e.format("%Y-%m-%d %H:%M UTC"))
        });
    println!("  Plan:     {} ({})", profile.plan, expiry);
    println!(
        "  Credits:  {} find / {} verify",
        profile.credits_find, profile.credits_verify
    );

    if let Some(created) = profile.created_at {
        println!("  Created:  {}", created.format("%Y-%m-%d %H:%M UTC"));
    }
    if let Some(updated) = profile.updated_at {
        println!("  Updated:  {}", updated.format("%Y-%m-%d %H:%M UTC"));
    }
}
