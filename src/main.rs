use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::EnvFilter;

mod api;
mod app;
mod config;
mod errors;
mod models;

use crate::api::tasks::{FetchScope, TaskFetcher};
use crate::app::{App, FetchOutcome};
use crate::config::settings::{ConfigStore, Configuration};
use crate::errors::TaskDockError;
use crate::models::task::{browse_url, Task};

#[derive(Parser)]
#[command(name = "taskdock")]
#[command(version)]
#[command(about = "Keep your open Jira tasks in view", long_about = None)]
struct Cli {
    /// Log requests and responses to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save Jira credentials and the board to watch
    Login {
        /// Jira Cloud host (e.g., yourcompany.atlassian.net)
        #[arg(long)]
        domain: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// API token (prompted without echo when omitted)
        #[arg(long)]
        token: Option<String>,

        /// Board id (the number in the board URL)
        #[arg(long)]
        board: Option<String>,

        /// Save without testing the credentials against Jira
        #[arg(long)]
        no_verify: bool,
    },

    /// Remove saved credentials
    Logout,

    /// List your open tasks on the board
    Tasks {
        /// Every issue on the board, not only yours
        #[arg(long)]
        all: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,

        /// Pick a task and open it in the browser
        #[arg(long, short)]
        interactive: bool,
    },

    /// Open a task in the browser
    Open {
        /// Issue key (e.g., WEB-123)
        key: String,
    },

    /// Show the board name and its columns
    Board,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Display current configuration (with masked token)
    Show,

    /// Get the path to the config file
    Path,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "taskdock=debug" } else { "taskdock=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match build_app() {
        Ok(mut app) => {
            app.init();
            run(&mut app, cli.command).await
        }
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        match e.downcast_ref::<TaskDockError>() {
            Some(err) => eprintln!("\n{}", err.render()),
            None => eprintln!("\n{}", e.to_string().red().bold()),
        }
        std::process::exit(1);
    }
}

fn build_app() -> anyhow::Result<App> {
    Ok(App::new(ConfigStore::open()?, TaskFetcher::new()?))
}

async fn run(app: &mut App, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Login {
            domain,
            email,
            token,
            board,
            no_verify,
        } => handle_login(app, domain, email, token, board, no_verify).await,

        Commands::Logout => handle_logout(app),

        Commands::Tasks { all, json, interactive } => {
            let scope = if all { FetchScope::Board } else { FetchScope::Mine };
            handle_tasks(app, scope, json, interactive).await
        }

        Commands::Open { key } => handle_open(app, &key),

        Commands::Board => handle_board(app).await,

        Commands::Config { action } => handle_config(app, action),
    }
}

async fn handle_login(
    app: &mut App,
    domain: Option<String>,
    email: Option<String>,
    token: Option<String>,
    board: Option<String>,
    no_verify: bool,
) -> anyhow::Result<()> {
    use dialoguer::{Input, Password};

    println!("{}", "Jira Configuration".cyan().bold());
    println!(
        "{}",
        format!("Credentials are stored in {}", app.config_path().display()).dimmed()
    );
    println!();

    let current = app.get_config().clone();

    let domain = match domain {
        Some(d) => d,
        None => Input::<String>::new()
            .with_prompt("Jira domain (e.g., yourcompany.atlassian.net)")
            .with_initial_text(current.domain.clone())
            .interact_text()?,
    };
    let email = match email {
        Some(e) => e,
        None => Input::<String>::new()
            .with_prompt("Jira email")
            .with_initial_text(current.email.clone())
            .interact_text()?,
    };
    let api_token = match token {
        Some(t) => t,
        None => {
            println!(
                "{}",
                "  Create one at https://id.atlassian.com/manage-profile/security/api-tokens".dimmed()
            );
            Password::new().with_prompt("Jira API token").interact()?
        }
    };
    let board_id = match board {
        Some(b) => b,
        None => Input::<String>::new()
            .with_prompt("Board id")
            .with_initial_text(current.board_id.clone())
            .interact_text()?,
    };

    let config = Configuration::new(domain, email, api_token, board_id);
    let missing = config.missing_fields();
    if !missing.is_empty() {
        return Err(TaskDockError::ConfigInvalid(format!("missing {}", missing.join(", "))).into());
    }

    if !no_verify {
        println!();
        print!("{}", "  Testing Jira connection... ".dimmed());
        std::io::Write::flush(&mut std::io::stdout())?;

        match app.verify(&config).await {
            Ok(board) => println!("{} {}", "✓".green().bold(), board.name.dimmed()),
            Err(e) => {
                println!("{}", "✗".red().bold());
                return Err(e.into());
            }
        }
    }

    let outcome = app.save_config(config);
    if let Some(error) = outcome.error {
        anyhow::bail!(error);
    }

    println!();
    println!("{}", "Configuration saved!".green().bold());
    Ok(())
}

fn handle_logout(app: &mut App) -> anyhow::Result<()> {
    let outcome = app.logout();
    if let Some(error) = outcome.error {
        anyhow::bail!(error);
    }

    println!("{}", "Logged out, credentials removed".green());
    Ok(())
}

async fn handle_tasks(
    app: &App,
    scope: FetchScope,
    json_output: bool,
    interactive: bool,
) -> anyhow::Result<()> {
    let outcome = app.fetch_tasks(scope).await;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        if let FetchOutcome::Error(error) = outcome {
            anyhow::bail!(error);
        }
        return Ok(());
    }

    let tasks = match outcome {
        FetchOutcome::Tasks(tasks) => tasks,
        FetchOutcome::Error(error) => anyhow::bail!(error),
    };

    let heading = match scope {
        FetchScope::Mine => "Your Open Tasks",
        FetchScope::Board => "Board Tasks",
    };
    println!("{}", heading.cyan().bold());
    println!();

    if tasks.is_empty() {
        println!("{}", "  Nothing open, enjoy the quiet".dimmed());
        return Ok(());
    }

    println!("  {} tasks", tasks.len().to_string().bright_white());
    println!();

    for task in &tasks {
        print_task(task);
    }

    if interactive {
        use dialoguer::Select;

        println!();
        let items: Vec<String> = tasks
            .iter()
            .map(|t| format!("{} [{}] {}", t.key, t.status, t.title))
            .collect();

        let selection = Select::new()
            .with_prompt("Select a task to open")
            .items(&items)
            .interact_opt()?;

        match selection.and_then(|index| tasks.get(index)) {
            Some(task) => {
                println!("{} {}", "Opening:".dimmed(), task.url.bright_white());
                app.open_external(&task.url)?;
            }
            None => println!("\n{}", "No task selected".yellow()),
        }
    }

    Ok(())
}

fn print_task(task: &Task) {
    let status = match task.status.as_str() {
        "In Progress" => task.status.green(),
        "To Do" | "Open" => task.status.yellow(),
        "In Review" | "Code Review" => task.status.blue(),
        "Done" | "Closed" => task.status.bright_black(),
        _ => task.status.normal(),
    };

    println!(
        "  {} [{}]  {}",
        task.key.bright_white().bold(),
        status,
        task.title
    );
    println!(
        "      {} {}  {} {}",
        "priority:".dimmed(),
        task.priority,
        "assignee:".dimmed(),
        task.assignee
    );
}

fn handle_open(app: &App, key: &str) -> anyhow::Result<()> {
    let config = app.get_config();
    if config.domain.is_empty() {
        return Err(TaskDockError::ConfigMissing.into());
    }

    let url = browse_url(&config.domain, key);
    println!("{} {}", "Opening task:".dimmed(), url.bright_white());
    app.open_external(&url)?;
    Ok(())
}

async fn handle_board(app: &App) -> anyhow::Result<()> {
    let board = app.board_summary().await?;

    println!(
        "{} {}",
        board.name.cyan().bold(),
        format!("(#{})", board.id).dimmed()
    );
    println!();
    for column in &board.column_config.columns {
        println!("  {}", column.name);
    }

    Ok(())
}

fn handle_config(app: &App, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let config = app.get_config();
            if config == &Configuration::default() {
                return Err(TaskDockError::ConfigMissing.into());
            }

            println!("{}", "Current Configuration".cyan().bold());
            println!();
            println!("  {} {}", "domain:".dimmed(), config.domain.bright_white());
            println!("  {} {}", "email:".dimmed(), config.email.bright_white());
            println!("  {} {}", "api_token:".dimmed(), config.masked_token().yellow());
            println!("  {} {}", "board_id:".dimmed(), config.board_id.bright_white());

            Ok(())
        }

        ConfigAction::Path => {
            println!("{}", app.config_path().display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_tasks_flags() {
        let cli = Cli::parse_from(["taskdock", "tasks", "--all", "--json"]);
        assert!(matches!(
            cli.command,
            Commands::Tasks {
                all: true,
                json: true,
                interactive: false
            }
        ));
    }

    #[test]
    fn test_cli_parses_login_flags() {
        let cli = Cli::parse_from([
            "taskdock",
            "login",
            "--domain",
            "acme.atlassian.net",
            "--board",
            "42",
            "--no-verify",
        ]);

        match cli.command {
            Commands::Login {
                domain,
                board,
                email,
                no_verify,
                ..
            } => {
                assert_eq!(domain.as_deref(), Some("acme.atlassian.net"));
                assert_eq!(board.as_deref(), Some("42"));
                assert!(email.is_none());
                assert!(no_verify);
            }
            _ => panic!("expected login"),
        }
    }

    #[test]
    fn test_cli_verbose_is_global() {
        let cli = Cli::parse_from(["taskdock", "board", "--verbose"]);
        assert!(cli.verbose);
    }
}
