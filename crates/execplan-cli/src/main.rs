mod config;
mod goal_cmds;
mod serve_cmd;
mod task_cmds;
#[cfg(test)]
mod test_util;
mod wiring;

use clap::{ArgGroup, Parser, Subcommand};

use execplan_core::generation::models::{DEFAULT_MODEL_SELECTOR, resolve_model_id, selectors};
use execplan_db::pool;

use config::ExecplanConfig;

#[derive(Parser)]
#[command(name = "execplan", about = "Turn goals into tracked tasks and subtasks")]
struct Cli {
    /// Database URL (overrides EXECPLAN_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write an execplan config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/execplan")]
        db_url: String,
        /// API key for the generation endpoint
        #[arg(long)]
        api_key: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the execplan database (requires config file or env vars)
    DbInit,
    /// Serve the planner over HTTP
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
    /// Goal management
    Goal {
        #[command(subcommand)]
        command: GoalCommands,
    },
    /// Task management
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Subtask management
    Subtask {
        #[command(subcommand)]
        command: SubtaskCommands,
    },
    /// List the model selectors accepted by --model
    Models,
}

#[derive(Subcommand)]
pub enum GoalCommands {
    /// Create a goal and generate its tasks
    Create {
        /// Free-text goal
        title: String,
        /// Model selector (see `execplan models`)
        #[arg(long)]
        model: Option<String>,
    },
    /// List all goals
    List,
    /// Show a goal with its tasks and subtasks
    Show {
        /// Goal ID
        goal_id: i64,
    },
    /// Delete a goal with all of its tasks and subtasks
    Delete {
        /// Goal ID
        goal_id: i64,
    },
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Mark a task completed and record the effort
    Complete {
        /// Task ID
        task_id: i64,
        /// Minutes spent on the task
        #[arg(long)]
        time_spent: i64,
        /// Problems encountered
        #[arg(long)]
        problems: Option<String>,
        /// Insights gained
        #[arg(long)]
        insights: Option<String>,
    },
    /// Generate subtasks for a task that has none
    Subtasks {
        /// Task ID
        task_id: i64,
        /// Model selector (see `execplan models`)
        #[arg(long)]
        model: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SubtaskCommands {
    /// Set a subtask's completion flag
    #[command(group(ArgGroup::new("state").required(true).args(["done", "undone"])))]
    Toggle {
        /// Subtask ID
        subtask_id: i64,
        /// Mark completed
        #[arg(long)]
        done: bool,
        /// Mark not completed
        #[arg(long)]
        undone: bool,
    },
}

fn cmd_init(db_url: &str, api_key: Option<String>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let has_key = api_key.is_some();
    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        generation: config::GenerationSection {
            api_key,
            ..Default::default()
        },
    };

    config::save_config_to(&cfg, &path)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    if has_key {
        println!("  generation.api_key = (set)");
    } else {
        println!(
            "  generation.api_key not set; export {} before creating goals.",
            config::API_KEY_VARS[0]
        );
    }
    println!();
    println!("Next: run `execplan db-init` to create and migrate the database.");

    Ok(())
}

async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = ExecplanConfig::resolve(cli_db_url)?;

    println!("Initializing execplan database...");

    pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("execplan db-init complete.");
    Ok(())
}

fn cmd_models() {
    for selector in selectors() {
        let model_id = resolve_model_id(selector);
        let marker = if selector == DEFAULT_MODEL_SELECTOR {
            " (default)"
        } else {
            ""
        };
        println!("{selector:<18} {model_id}{marker}");
    }
}

/// Whether a command needs the generation endpoint.
fn needs_generation(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Serve { .. }
            | Commands::Goal {
                command: GoalCommands::Create { .. }
            }
            | Commands::Task {
                command: TaskCommands::Subtasks { .. }
            }
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            db_url,
            api_key,
            force,
        } => cmd_init(&db_url, api_key, force),
        Commands::DbInit => cmd_db_init(cli.database_url.as_deref()).await,
        Commands::Models => {
            cmd_models();
            Ok(())
        }
        command => {
            let resolved = ExecplanConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let service = if needs_generation(&command) {
                match wiring::generating_service(&resolved, db_pool.clone()) {
                    Ok(service) => service,
                    Err(e) => {
                        db_pool.close().await;
                        return Err(e);
                    }
                }
            } else {
                wiring::storage_service(db_pool.clone())
            };

            let result = match command {
                Commands::Serve { bind, port } => {
                    serve_cmd::run_serve(service, &bind, port).await
                }
                Commands::Goal { command } => goal_cmds::run_goal_command(command, &service).await,
                Commands::Task { command } => task_cmds::run_task_command(command, &service).await,
                Commands::Subtask { command } => {
                    task_cmds::run_subtask_command(command, &service).await
                }
                Commands::Init { .. } | Commands::DbInit | Commands::Models => Ok(()),
            };
            db_pool.close().await;
            result
        }
    }
}
