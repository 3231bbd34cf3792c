use crate::config::Config;
use crate::store::{StoreFormat, TodoService};
use crate::trace::TraceId;
use clap::{ArgGroup, Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

/// Track todo items in a local file, from the shell or over HTTP.
#[derive(Parser, Debug)]
#[command(name = "todo-app", version)]
pub struct Cli {
    /// File holding the todo items (overrides TODO_STORE_PATH)
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    /// Layout of the todo file (overrides TODO_STORE_FORMAT)
    #[arg(long, global = true, value_enum)]
    pub format: Option<StoreFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Add a new todo item
    Add {
        description: String,
        /// One of: not started, started, completed
        #[arg(short, long, default_value = "not started")]
        status: String,
    },
    /// List all todo items
    List,
    /// Change the description and/or status of a todo item
    #[command(group(
        ArgGroup::new("changes")
            .required(true)
            .multiple(true)
            .args(["description", "status"])
    ))]
    Update {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        id: u32,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Delete a todo item
    Delete {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        id: u32,
    },
    /// Serve the JSON API and list page over HTTP
    Serve(ServeArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides TODO_PORT)
    #[arg(long)]
    pub port: Option<u16>,
    /// Directory served under /static (overrides TODO_STATIC_DIR)
    #[arg(long)]
    pub static_dir: Option<PathBuf>,
}

impl Cli {
    /// Applies command line overrides on top of the loaded configuration.
    pub fn configure(&self, mut config: Config) -> Config {
        if let Some(file) = &self.file {
            config.store_path = file.clone();
        }
        if let Some(format) = self.format {
            config.store_format = format;
        }
        if let Commands::Serve(args) = &self.command {
            if let Some(port) = args.port {
                config.port = port;
            }
            if let Some(static_dir) = &args.static_dir {
                config.static_dir = static_dir.clone();
            }
        }
        config
    }
}

/// Runs the parsed command line to completion.
pub async fn run(cli: Cli, config: Config, out: &mut impl Write) -> anyhow::Result<()> {
    let config = cli.configure(config);
    match cli.command {
        Commands::Serve(_) => crate::web::start_web_server(config).await,
        command => {
            let service = TodoService::new(config.storage());
            execute(&service, &TraceId::new(), command, out)
        }
    }
}

/// Performs a single store operation and reports the outcome to `out`.
pub fn execute(
    service: &TodoService,
    trace_id: &TraceId,
    command: Commands,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        Commands::Add {
            description,
            status,
        } => {
            let todo = service.add(trace_id, description, &status)?;
            writeln!(out, "Added {}", todo)?;
        }
        Commands::List => {
            let todos = service.list(trace_id)?;
            if todos.is_empty() {
                writeln!(out, "No todo items found.")?;
            }
            for todo in todos {
                writeln!(out, "{}", todo)?;
            }
        }
        Commands::Update {
            id,
            description,
            status,
        } => {
            let todo = service.update(trace_id, id, description.as_deref(), status.as_deref())?;
            writeln!(out, "Updated {}", todo)?;
        }
        Commands::Delete { id } => {
            service.delete(trace_id, id)?;
            writeln!(out, "Deleted todo item {}.", id)?;
        }
        Commands::Serve(_) => anyhow::bail!("serve cannot run as a single store operation"),
    }
    Ok(())
}
