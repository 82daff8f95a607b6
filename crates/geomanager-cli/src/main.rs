mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::store::StoreKind;
use commands::{EXIT_CONFIG_ERROR, EXIT_FAILURE, EXIT_REMOTE_ERROR};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "geomanager",
    version,
    about = "Client for the GeoServer importer and datastore REST API"
)]
struct Cli {
    /// GeoServer root URL, e.g. http://localhost:8080/geoserver (overrides config file).
    #[arg(long, global = true)]
    url: Option<String>,

    /// REST user name.
    #[arg(long, global = true)]
    user: Option<String>,

    /// REST password.
    #[arg(long, global = true)]
    password: Option<String>,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage import contexts.
    #[command(subcommand)]
    Import(ImportCommand),
    /// Manage tasks inside an import context.
    #[command(subcommand)]
    Task(TaskCommand),
    /// Build and validate datastore definitions.
    #[command(subcommand)]
    Store(StoreCommand),
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Debug, Subcommand)]
enum ImportCommand {
    /// Create an import context and print its id.
    Create {
        /// JSON file with the import definition.
        #[arg(long)]
        body: Option<PathBuf>,
    },
    /// Show an import context.
    Get { import: u64 },
    /// List import contexts.
    List,
    /// Execute a READY import.
    Start { import: u64 },
    /// Delete an import context.
    Delete { import: u64 },
}

#[derive(Debug, Subcommand)]
enum TaskCommand {
    /// Show a task with all details expanded.
    Get { import: u64, task: u64 },
    /// Upload a zip archive as a new task.
    AttachFile { import: u64, file: PathBuf },
    /// Upload the files of a directory as a new task.
    AttachDir { import: u64, dir: PathBuf },
    /// Expand a tar archive and upload its contents as a new task.
    ///
    /// The archive is deleted after expansion; the work directory is kept.
    AttachArchive {
        import: u64,
        archive: PathBuf,
        /// Directory under which the work directory is created.
        #[arg(long, default_value = "target")]
        work_dir: PathBuf,
    },
    /// Update a task, either setting its SRS or sending a JSON file.
    Update {
        import: u64,
        task: u64,
        /// SRS code to assign to the task layer, e.g. EPSG:4326.
        #[arg(long, conflicts_with = "body", required_unless_present = "body")]
        srs: Option<String>,
        /// JSON file with the task update.
        #[arg(long)]
        body: Option<PathBuf>,
    },
    /// Update the layer of a task from a JSON file.
    Layer {
        import: u64,
        task: u64,
        file: PathBuf,
    },
    /// Add a transform to a task from a JSON file.
    Transform {
        import: u64,
        task: u64,
        file: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
enum StoreCommand {
    /// Print the REST representation of a new datastore.
    Encode {
        kind: StoreKind,
        name: String,
        /// Database name (PostGIS) or package file (GeoPackage).
        #[arg(long)]
        database: String,
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        schema: Option<String>,
        /// Database user.
        #[arg(long)]
        db_user: Option<String>,
        /// Database password.
        #[arg(long)]
        db_password: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Validate a datastore document read from the server.
    Check { kind: StoreKind, file: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("GEOMANAGER_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let json = cli.json;
    let conn = commands::Connection {
        url: cli.url,
        user: cli.user,
        password: cli.password,
    };

    let result = match cli.command {
        Commands::Import(cmd) => match cmd {
            ImportCommand::Create { body } => {
                commands::import::create(&conn, body.as_deref(), json)
            }
            ImportCommand::Get { import } => commands::import::get(&conn, import, json),
            ImportCommand::List => commands::import::list(&conn, json),
            ImportCommand::Start { import } => commands::import::start(&conn, import, json),
            ImportCommand::Delete { import } => commands::import::delete(&conn, import, json),
        },
        Commands::Task(cmd) => match cmd {
            TaskCommand::Get { import, task } => commands::task::get(&conn, import, task, json),
            TaskCommand::AttachFile { import, file } => {
                commands::task::attach_file(&conn, import, &file, json)
            }
            TaskCommand::AttachDir { import, dir } => {
                commands::task::attach_dir(&conn, import, &dir, json)
            }
            TaskCommand::AttachArchive {
                import,
                archive,
                work_dir,
            } => commands::task::attach_archive(&conn, import, &archive, &work_dir, json),
            TaskCommand::Update {
                import,
                task,
                srs,
                body,
            } => commands::task::update(&conn, import, task, srs.as_deref(), body.as_deref(), json),
            TaskCommand::Layer { import, task, file } => {
                commands::task::layer(&conn, import, task, &file, json)
            }
            TaskCommand::Transform { import, task, file } => {
                commands::task::transform(&conn, import, task, &file, json)
            }
        },
        Commands::Store(cmd) => match cmd {
            StoreCommand::Encode {
                kind,
                name,
                database,
                host,
                port,
                schema,
                db_user,
                db_password,
                description,
            } => commands::store::encode(
                kind,
                &name,
                &database,
                &commands::store::ConnectionOptions {
                    host,
                    port,
                    schema,
                    user: db_user,
                    password: db_password,
                    description,
                },
            ),
            StoreCommand::Check { kind, file } => commands::store::check(kind, &file, json),
        },
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("invalid store:") || msg.starts_with("rest config error:")
            {
                EXIT_CONFIG_ERROR
            } else if msg.starts_with("remote error:") {
                EXIT_REMOTE_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}
