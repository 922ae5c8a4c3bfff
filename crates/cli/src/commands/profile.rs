//! `sgctl profile`: saved defaults

use anyhow::Result;
use colored::Colorize;
use guard_lib::{AttackRoute, Environment};

use crate::config::Profile;
use crate::output::{print_json, print_success, OutputFormat};

pub struct ProfileUpdate {
    pub gateway_url: Option<String>,
    pub environment: Option<Environment>,
    pub route: Option<AttackRoute>,
    pub target: Option<String>,
}

impl ProfileUpdate {
    /// Only fields given on the command line change
    fn apply(self, profile: &mut Profile) {
        if let Some(url) = self.gateway_url {
            profile.gateway_url = Some(url);
        }
        if let Some(environment) = self.environment {
            profile.environment = Some(environment.to_string());
        }
        if let Some(route) = self.route {
            profile.attack_route = Some(route.to_string());
        }
        if let Some(target) = self.target {
            profile.default_target = Some(target);
        }
    }
}

pub fn show_profile(profile: &Profile, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(profile),
        OutputFormat::Table => {
            let unset = || "(unset)".dimmed().to_string();
            println!("Profile:     {}", Profile::default_path()?.display());
            println!("Gateway URL: {}", profile.gateway_url.clone().unwrap_or_else(unset));
            println!("Environment: {}", profile.environment.clone().unwrap_or_else(unset));
            println!("Route:       {}", profile.attack_route.clone().unwrap_or_else(unset));
            println!("Target:      {}", profile.default_target.clone().unwrap_or_else(unset));
        }
    }
    Ok(())
}

pub fn set_profile(mut profile: Profile, update: ProfileUpdate) -> Result<()> {
    update.apply(&mut profile);
    let path = profile.save()?;
    print_success(&format!("Profile saved to {}", path.display()));
    Ok(())
}
