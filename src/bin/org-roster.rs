//! CLI for managing GitHub organization membership.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use org_roster::prelude::*;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "org-roster")]
#[command(author, version, about = "List, export, and prune GitHub organization members", long_about = None)]
struct Cli {
    /// Path to a YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Organization name (overrides the config file)
    #[arg(short, long, global = true)]
    org: Option<String>,

    /// GitHub token with org admin permissions
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// GitHub API base URL (for GitHub Enterprise)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show members and outside collaborators as a table
    List,

    /// Write members and outside collaborators to a CSV file
    Export {
        /// Output path (defaults to the configured output)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Remove users that are not on the allow-list
    Prune {
        /// Actually remove users; without this only a dry-run report is printed
        #[arg(long)]
        apply: bool,

        /// Read candidates from an export file instead of the live directory
        #[arg(long)]
        candidates: Option<PathBuf>,

        /// Remove without asking about each user
        #[arg(short, long)]
        yes: bool,
    },

    /// Add users to the organization (non-members are invited)
    Add {
        /// Logins to add
        #[arg(required = true)]
        logins: Vec<String>,

        /// Role to grant
        #[arg(long, default_value = "member")]
        role: OrgRole,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(org) = cli.org {
        config.org = Some(org);
    }
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    let org = config.require_org()?.to_string();
    let client = connect(cli.token, &config.api_url)?;

    match cli.command {
        Commands::List => cmd_list(&client, &org),
        Commands::Export { output } => {
            let path = output.unwrap_or_else(|| config.output.clone());
            cmd_export(&client, &org, path)
        }
        Commands::Prune {
            apply,
            candidates,
            yes,
        } => cmd_prune(&client, &org, &config.allow_list(), candidates, !apply, yes),
        Commands::Add { logins, role, yes } => cmd_add(&client, &org, logins, role, yes),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "org_roster=debug"
    } else {
        "org_roster=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Build a client and check the token before any directory call.
fn connect(token: Option<String>, api_url: &str) -> Result<GitHubClient> {
    let client = GitHubClient::from_token(token, api_url)?;
    let login = client
        .authenticated_login()
        .context("GitHub authentication failed")?;
    info!(login = %login, "authenticated");
    Ok(client)
}

fn cmd_list(client: &GitHubClient, org: &str) -> Result<()> {
    let entries = list_directory(client, org).context("Failed to fetch organization directory")?;
    println!("{}", render_table(&entries));
    Ok(())
}

fn cmd_export(client: &GitHubClient, org: &str, path: PathBuf) -> Result<()> {
    let entries = list_directory(client, org).context("Failed to fetch organization directory")?;
    write_export(&entries, &path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Exported {} user(s) to {}", entries.len(), path.display());
    Ok(())
}

fn cmd_prune(
    client: &GitHubClient,
    org: &str,
    allowed: &AllowList,
    candidates: Option<PathBuf>,
    dry_run: bool,
    yes: bool,
) -> Result<()> {
    let candidates = match candidates {
        Some(path) => {
            let entries = read_export(&path)
                .with_context(|| format!("Failed to read candidates from {}", path.display()))?;
            compute_removals(&entries, allowed)
        }
        None => removal_candidates(client, org, allowed)
            .context("Failed to fetch organization directory")?,
    };

    if allowed.is_empty() {
        println!("Allowed logins: none");
    } else {
        println!(
            "Allowed logins: {}",
            allowed.iter().collect::<Vec<_>>().join(", ")
        );
    }

    let report = if dry_run || yes {
        remove_users(client, org, &candidates, dry_run)
    } else {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let total = candidates.len();
        let mut position = 0;
        remove_users_confirmed(client, org, &candidates, false, |entry| {
            position += 1;
            ask_removal(&mut input, entry, position, total)
        })
    };
    println!("{}", report);
    Ok(())
}

/// Prompt for one removal. A closed stdin stops the batch.
fn ask_removal(
    input: &mut impl BufRead,
    entry: &DirectoryEntry,
    position: usize,
    total: usize,
) -> Decision {
    print!(
        "{}/{}: {} ({}) - delete this user from the org? [y/N/q]: ",
        position, total, entry.login, entry.origin
    );
    let _ = std::io::stdout().flush();

    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(0) | Err(_) => Decision::Stop,
        Ok(_) => Decision::from_answer(&answer),
    }
}

fn cmd_add(
    client: &GitHubClient,
    org: &str,
    logins: Vec<String>,
    role: OrgRole,
    yes: bool,
) -> Result<()> {
    let logins = if yes {
        logins
    } else {
        confirm_each(&logins, org, role)?
    };

    if logins.is_empty() {
        println!("Nothing to add.");
        return Ok(());
    }

    for outcome in add_members(client, org, &logins, role) {
        match &outcome.result {
            Ok(m) => println!(
                "{}: membership state = {}, role = {}",
                outcome.login, m.state, m.role
            ),
            Err(e) => println!("{}: FAILED: {}", outcome.login, e),
        }
    }
    Ok(())
}

fn confirm_each(logins: &[String], org: &str, role: OrgRole) -> Result<Vec<String>> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut confirmed = Vec::new();

    for login in logins {
        print!("Add '{}' to org '{}' as role '{}'? [y/N]: ", login, org, role);
        std::io::stdout().flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            bail!("stdin closed before confirmation; pass --yes to skip prompts");
        }
        if answer.trim().eq_ignore_ascii_case("y") {
            confirmed.push(login.clone());
        } else {
            println!("Skipping {}.", login);
        }
    }
    Ok(confirmed)
}
