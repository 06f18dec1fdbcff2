mod config;
mod contact_cmds;
mod list_cmd;
mod tui;

#[cfg(test)]
mod test_util;

use std::io;
use std::sync::Mutex;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};

use contacts_core::api::{ApiConfig, HttpContactApi};
use contacts_core::manager::ContactManager;
use contacts_core::templates::Templates;

use config::ContactsConfig;

#[derive(Parser)]
#[command(name = "contacts", about = "Manage contacts stored behind a contacts API")]
struct Cli {
    /// Contacts API base URL (overrides CONTACTS_API_URL env var)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a contacts config file
    Init {
        /// Contacts API base URL
        #[arg(long, default_value = ApiConfig::DEFAULT_BASE_URL)]
        api_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// List contacts through the list template
    List {
        /// Only contacts whose full name starts with this text
        #[arg(long, conflicts_with = "tag")]
        search: Option<String>,
        /// Only contacts carrying this tag
        #[arg(long)]
        tag: Option<String>,
    },
    /// List the distinct tags in use
    Tags,
    /// Create a contact
    Add {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone_number: String,
        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,
        /// Additional profile field as key=value (repeatable)
        #[arg(long = "field", value_parser = contact_cmds::parse_key_val)]
        fields: Vec<(String, String)>,
    },
    /// Update fields of an existing contact
    Edit {
        /// Contact ID to edit
        id: u64,
        /// Field to change as key=value (repeatable)
        #[arg(long = "set", value_parser = contact_cmds::parse_key_val, required = true)]
        set: Vec<(String, String)>,
    },
    /// Delete a contact
    Delete {
        /// Contact ID to delete
        id: u64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Launch the interactive contacts dashboard
    Dashboard,
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

/// Execute the `contacts init` command: write config file.
fn cmd_init(api_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        api: config::ApiSection {
            base_url: api_url.to_string(),
            timeout_secs: None,
        },
        templates: config::TemplatesSection::default(),
    };
    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  api.base_url = {api_url}");
    Ok(())
}

fn http_api(resolved: &ContactsConfig) -> anyhow::Result<HttpContactApi> {
    HttpContactApi::new(&resolved.api).context("failed to build HTTP client")
}

fn templates(resolved: &ContactsConfig) -> anyhow::Result<Templates> {
    let sources = resolved.template_sources()?;
    Templates::compile(sources).context("failed to compile contact templates")
}

/// Fetch the contact list and build a manager around it.
async fn connect(resolved: &ContactsConfig) -> anyhow::Result<ContactManager<HttpContactApi>> {
    let api = http_api(resolved)?;
    let templates = templates(resolved)?;
    ContactManager::load(api, templates)
        .await
        .with_context(|| format!("failed to load contacts from {}", resolved.api.base_url))
}

fn init_logging(command: &Commands) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // The dashboard owns the terminal, so its logs go to a file instead.
    if matches!(command, Commands::Dashboard) {
        let dir = config::config_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let path = dir.join("contacts.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.command)?;

    match cli.command {
        Commands::Init { api_url, force } => {
            cmd_init(&api_url, force)?;
        }
        Commands::List { search, tag } => {
            let resolved = ContactsConfig::resolve(cli.api_url.as_deref())?;
            let mut manager = connect(&resolved).await?;
            let filter = list_cmd::ListFilter::from_args(search, tag);
            list_cmd::run_list(&mut manager, &filter, &mut io::stdout())?;
        }
        Commands::Tags => {
            let resolved = ContactsConfig::resolve(cli.api_url.as_deref())?;
            let manager = connect(&resolved).await?;
            list_cmd::run_tags(&manager, &mut io::stdout())?;
        }
        Commands::Add {
            full_name,
            email,
            phone_number,
            tags,
            fields,
        } => {
            let resolved = ContactsConfig::resolve(cli.api_url.as_deref())?;
            let mut values = vec![
                ("full_name".to_string(), full_name),
                ("email".to_string(), email),
                ("phone_number".to_string(), phone_number),
                ("tags".to_string(), tags),
            ];
            values.extend(fields);
            let id = contact_cmds::run_add(http_api(&resolved)?, templates(&resolved)?, &values).await?;
            println!("Contact {id} created.");
        }
        Commands::Edit { id, set } => {
            let resolved = ContactsConfig::resolve(cli.api_url.as_deref())?;
            let id = contact_cmds::run_edit(http_api(&resolved)?, templates(&resolved)?, id, &set).await?;
            println!("Contact {id} updated.");
        }
        Commands::Delete { id, yes } => {
            let resolved = ContactsConfig::resolve(cli.api_url.as_deref())?;
            let mut manager = connect(&resolved).await?;
            let stdin = io::stdin();
            let deleted = contact_cmds::run_delete(
                &mut manager,
                id,
                yes,
                &mut stdin.lock(),
                &mut io::stdout(),
            )
            .await?;
            if deleted {
                println!("Contact {id} deleted.");
            }
        }
        Commands::Dashboard => {
            let resolved = ContactsConfig::resolve(cli.api_url.as_deref())?;
            let manager = connect(&resolved).await?;
            tui::run_dashboard(manager).await?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "contacts", &mut io::stdout());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn search_and_tag_conflict() {
        let result = Cli::try_parse_from(["contacts", "list", "--search", "al", "--tag", "x"]);
        assert!(result.is_err());
    }

    #[test]
    fn edit_requires_a_set() {
        assert!(Cli::try_parse_from(["contacts", "edit", "3"]).is_err());
        let cli = Cli::try_parse_from(["contacts", "edit", "3", "--set", "email=a@b.c"]).unwrap();
        match cli.command {
            Commands::Edit { id, set } => {
                assert_eq!(id, 3);
                assert_eq!(set, [("email".to_string(), "a@b.c".to_string())]);
            }
            _ => panic!("expected edit"),
        }
    }

    #[test]
    fn global_api_url_flag() {
        let cli = Cli::try_parse_from(["contacts", "tags", "--api-url", "http://h:1"]).unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://h:1"));
    }
}
