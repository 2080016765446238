pub mod profile;

pub use profile::{DEFAULT_CREDITS, DEFAULT_PLAN_DAYS, Identity, Plan, ProfilePatch, UserProfile};
