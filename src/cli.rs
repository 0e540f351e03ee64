//! Command-line interface.
//!
//! Running without a subcommand starts the TUI. The subcommands expose
//! the same fetch-and-group pipeline for scripting: route parameters are
//! validated first, so a missing selector fails before any network call.

use crate::api::ApiClient;
use crate::auth::{apply_outcome, Session, SsoOutcome, SsoStrategy};
use crate::config::Config;
use crate::grouping::{category_label, group_services, DEFAULT_CATEGORY_LABEL};
use crate::routes::{SaloonsRoute, ServicesRoute};
use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io::BufRead;
use tokio::runtime::Runtime;

/// Terminal client for the Cosmix salon booking platform
#[derive(Parser, Debug)]
#[command(name = "cosmix", version, about = "Terminal client for the Cosmix salon booking platform", long_about = None, disable_help_subcommand = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Disable colors in the TUI (also respects NO_COLOR env var)
    #[arg(long, global = true)]
    pub no_colors: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List service categories
    Categories,
    /// List services for a category or a salon, grouped for display
    Services {
        /// Category name to browse
        #[arg(short, long)]
        category: Option<String>,
        /// Salon id to browse instead of a category
        #[arg(short, long)]
        salon: Option<String>,
    },
    /// List salons offering a service
    Saloons {
        /// Service id to look up
        service_id: String,
        /// Restrict to one salon id
        #[arg(long)]
        salon: Option<String>,
    },
    /// Sign in through an external provider and store the session
    Login {
        /// Provider: google or apple
        strategy: String,
    },
    /// Show the resolved configuration
    Config,
    /// Shows logs location and how to view them
    Logs,
    /// Generate shell completions
    Completions {
        /// Shell to generate for (detected from $SHELL when omitted)
        shell: Option<Shell>,
    },
}

impl Commands {
    /// Execute the parsed subcommand.
    pub fn execute(self, config: &Config) -> Result<()> {
        match self {
            Commands::Categories => {
                let api = ApiClient::new(config.base_url.clone());
                let categories = runtime()?.block_on(api.categories())?;
                for category in categories {
                    println!("{}  ({})", category.name, category.id);
                }
                Ok(())
            }
            Commands::Services { category, salon } => {
                // Route validation happens before any request is sent.
                let route = ServicesRoute::from_params(category, salon, None)?;
                let api = ApiClient::new(config.base_url.clone());
                let runtime = runtime()?;
                let services = match &route {
                    ServicesRoute::ByCategory { category_name } => {
                        runtime.block_on(api.services_by_category(category_name))?
                    }
                    ServicesRoute::BySalon { salon_id, .. } => {
                        runtime.block_on(api.services_by_salon(salon_id))?
                    }
                };

                let label = match &route {
                    ServicesRoute::ByCategory { category_name } => category_name.clone(),
                    ServicesRoute::BySalon { .. } => {
                        category_label(&services, DEFAULT_CATEGORY_LABEL)
                    }
                };
                println!("{label}");
                for group in group_services(&services, route.origin()) {
                    if group.sub_services.is_empty() {
                        println!("  {}  ({})", group.root.name, group.root.id);
                    } else {
                        println!("  {}", group.root.name);
                        for sub in &group.sub_services {
                            println!("    {}  ({})", sub.name, sub.id);
                        }
                    }
                }
                Ok(())
            }
            Commands::Saloons { service_id, salon } => {
                let route = SaloonsRoute::from_params(Some(service_id), None, None, salon)?;
                let api = ApiClient::new(config.base_url.clone());
                let runtime = runtime()?;
                let saloons = match &route.salon_id {
                    Some(salon_id) => {
                        runtime.block_on(api.salon_by_id(salon_id, &route.service_id))?
                    }
                    None => runtime.block_on(api.saloons_by_service(&route.service_id))?,
                };
                if saloons.is_empty() {
                    println!("No salons offer this service.");
                }
                for saloon in saloons {
                    println!(
                        "{}  {}€ · {} min · rating {:.1}\n  {}",
                        saloon.name, saloon.price, saloon.duration_minutes, saloon.rating,
                        saloon.address
                    );
                }
                Ok(())
            }
            Commands::Login { strategy } => login(&strategy),
            Commands::Config => {
                println!("Mode:      {:?}", config.mode);
                println!("Platform:  {:?}", config.platform);
                println!("Base URL:  {}", config.base_url);
                println!("Session:   {}", Session::default_path().display());
                Ok(())
            }
            Commands::Logs => {
                let log_file = Config::log_dir().join("cosmix.log");
                println!("Logs are written to: {}", log_file.display());
                println!("View logs in real-time: tail -f {}", log_file.display());
                Ok(())
            }
            Commands::Completions { shell } => completions(shell),
        }
    }
}

fn runtime() -> Result<Runtime> {
    Runtime::new().context("Failed to create tokio runtime")
}

/// Hand off to the external provider and react to what comes back. The
/// provider owns the whole OAuth exchange; we only receive the session id
/// pasted from the redirect, or treat an empty line as a failed sign-in.
fn login(strategy: &str) -> Result<()> {
    let strategy = match strategy.to_lowercase().as_str() {
        "google" => SsoStrategy::Google,
        "apple" => SsoStrategy::Apple,
        other => bail!("Unknown provider '{other}', expected google or apple"),
    };
    let request = strategy.request();
    println!("Open the sign-in page for {}:", request.strategy);
    println!("  redirect: {}", request.redirect_url);
    println!("Paste the session id from the redirect (empty to cancel):");

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read session id")?;
    let session_id = line.trim();

    let outcome = if session_id.is_empty() {
        SsoOutcome::Failed {
            message: "Sign-in cancelled".to_string(),
        }
    } else {
        SsoOutcome::Created {
            session_id: session_id.to_string(),
        }
    };

    let path = Session::default_path();
    let current = Session::load(&path)?;
    let (session, error) = apply_outcome(current, outcome);
    if let Some(message) = error {
        println!("Sign-in failed: {message}");
        return Ok(());
    }
    if let Some(session) = session {
        session.save(&path)?;
        println!("Signed in (session {}).", session.session_id);
    }
    Ok(())
}

/// Generate command-line completions.
fn completions(shell: Option<Shell>) -> Result<()> {
    let Some(shell) = shell.or_else(Shell::from_env) else {
        bail!("Could not automatically detect shell");
    };

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());

    Ok(())
}
