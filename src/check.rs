use crate::config::Settings;
use anyhow::Context;
use console::style;

/// Reports which API endpoints the configured token can reach.
pub fn exec(settings: Settings, json: bool) -> anyhow::Result<()> {
    let client = crate::github::connect(&settings).context("Failed to set up GitHub client")?;
    let repository = &settings.repositories[0];
    let access = client.check_access(repository);

    if json {
        println!("{}", serde_json::to_string_pretty(&access)?);
        return Ok(());
    }

    let mark = |ok: bool| if ok { style("✓").green() } else { style("✗").red() };
    println!("Repository access ({}/{}): {}", settings.organization, repository, mark(access.repository_access));
    println!("Organization access: {}", mark(access.organization_access));
    println!("Copilot API access: {}", mark(access.copilot_api_access));
    if !access.repository_access {
        println!("\nCannot read {repository}; check the token's repository permissions.");
    }
    Ok(())
}
