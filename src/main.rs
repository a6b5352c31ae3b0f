use std::io::IsTerminal;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use userfeed::config;
use userfeed::feed::{EndReason, Subscription};
use userfeed::models::{AppState, UserRecord};
use userfeed::render::{LiveTable, RenderOptions, TerminalTable};
use userfeed::routes::build_router;
use userfeed::services::UserStore;

fn open_store(users_file: Option<PathBuf>) -> UserStore {
    let path = users_file.unwrap_or_else(config::get_users_file);
    match UserStore::load(&path, config::get_channel_capacity()) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(%e, "Failed to load users file");
            eprintln!("{}: {}", yansi::Paint::new("Failed to load users file").red(), e);
            process::exit(1);
        }
    }
}

fn build_state(users_file: Option<PathBuf>, mask_passwords: bool) -> AppState {
    let store = open_store(users_file);
    AppState::new(
        store,
        config::get_keep_alive(),
        mask_passwords || config::get_mask_passwords(),
    )
}

async fn start_server(state: AppState, host: &str, port: u16) {
    let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(%e, "Invalid host/port format");
            eprintln!("{}: {}", yansi::Paint::red("Invalid host/port format"), e);
            process::exit(1);
        }
    };
    let users = state.store.snapshot().len();
    let stopping = state.clone();
    tokio::spawn(
        state
            .store
            .clone()
            .watch_file(config::get_file_poll_interval(), state.shutdown_signal()),
    );
    let app = build_router(state);
    tracing::info!(%addr, users, "Starting userfeed server");
    println!(
        "{} {}",
        yansi::Paint::new("Live user table on").green(),
        yansi::Paint::new(format!("http://{}", addr)).cyan()
    );
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_signal().await;
                    tracing::info!("Shutting down, closing event streams");
                    stopping.begin_shutdown();
                })
                .await
            {
                tracing::error!(%e, "Server encountered an error while running");
                eprintln!("{}: {}", yansi::Paint::new("Server error").red(), e);
                process::exit(1);
            }
            tracing::info!("Server stopped");
        }
        Err(e) => {
            tracing::error!(%e, "Failed to bind to address; is the port already in use?");
            eprintln!(
                "{}: {}\n{}",
                yansi::Paint::new(format!("Failed to bind to {}", addr)).red(),
                e,
                yansi::Paint::new(
                    "Please stop any process using this port, \
                     or start the server with a different --port value."
                )
                .yellow()
            );
            process::exit(1);
        }
    }
}

fn fail(context: &str, e: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", yansi::Paint::new(context).red(), e);
    process::exit(1);
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(%e, "Failed to listen for Ctrl-C");
    }
}

async fn run_watch(url: String, mask_passwords: bool) {
    let client = match reqwest::Client::builder()
        .user_agent(format!("userfeed/{}", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(10))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {}", yansi::Paint::new("Failed to create HTTP client").red(), e);
            process::exit(1);
        }
    };

    let mut table = match LiveTable::new(TerminalTable::new(), RenderOptions { mask_passwords }) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{}: {}", yansi::Paint::new("Failed to prepare table").red(), e);
            process::exit(1);
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let mut subscription = Subscription::new(client, config::sse_url(&url));
    println!(
        "{} {}",
        yansi::Paint::new("Subscribing to").green(),
        yansi::Paint::new(subscription.url()).cyan()
    );

    let interactive = std::io::stdout().is_terminal();
    let result = subscription
        .run(&mut table, shutdown_rx, |t| {
            if interactive {
                print!("\x1b[2J\x1b[H");
            }
            println!("\n{}", t.target());
            println!(
                "{}",
                yansi::Paint::new(format!(
                    "{} user(s) | updated {}",
                    t.target().rows().len().saturating_sub(1),
                    chrono::Local::now().format("%H:%M:%S")
                ))
                .dim()
            );
        })
        .await;

    match result {
        Ok(summary) => {
            let why = match summary.reason {
                EndReason::Shutdown => "interrupted",
                EndReason::StreamEnded => "server closed the stream",
            };
            println!(
                "{}",
                yansi::Paint::new(format!(
                    "Subscription ended ({}): {} snapshot(s) rendered, {} skipped",
                    why, summary.rendered, summary.skipped
                ))
                .dim()
            );
        }
        Err(e) => {
            tracing::error!(%e, "Subscription failed");
            eprintln!("{}: {}", yansi::Paint::new("Subscription failed").red(), e);
            process::exit(1);
        }
    }
}

#[derive(Parser)]
#[command(
    name = "userfeed",
    author,
    version,
    about = "Live user table over server-sent events",
    long_about = r#"userfeed keeps a table of users in sync with a push channel.

The server stores users in a JSON file and publishes the full list to every
client connected to /sse whenever it changes. The page at / and the `watch`
command both re-render their table from each snapshot they receive.

Examples:
  1) Run the server:
      userfeed serve --port 3000
  2) Follow it from a terminal:
      userfeed watch --url http://127.0.0.1:3000
  3) Manage the users file:
      userfeed users add a@x.com secret
"#,
    after_help = "Use `userfeed <subcommand> --help` to get subcommand specific options."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Disable colorized output
    #[arg(long, global = true)]
    no_color: bool,
    /// Path to .env file
    #[arg(long, global = true)]
    env_file: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,
        /// Path to the users file
        #[arg(long)]
        users_file: Option<PathBuf>,
        /// Replace passwords with a mask before they leave the server
        #[arg(long)]
        mask_passwords: bool,
    },
    /// Subscribe to a running server and render its users in the terminal
    #[command(long_about = "Open one long-lived subscription to <url>/sse and redraw \
        the table after every snapshot. Stops on Ctrl-C or when the server closes the \
        stream; there is no reconnect.")]
    Watch {
        /// Base URL of the server
        #[arg(long)]
        url: Option<String>,
        /// Show a mask instead of each password
        #[arg(long)]
        mask_passwords: bool,
    },
    /// Manage the users file
    Users {
        #[command(subcommand)]
        sub: UserCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    #[command(
        about = "List users",
        long_about = "Print every user in the users file, in file order."
    )]
    List {
        #[arg(long)]
        mask_passwords: bool,
    },
    #[command(
        about = "Add a user",
        long_about = "Append a user to the users file. Duplicate emails are allowed; \
            blank emails are rejected. A running server publishes the change on its \
            next poll of the file."
    )]
    Add { email: String, password: String },
    #[command(
        about = "Remove a user",
        long_about = "Remove every user with the given email from the users file. \
            A running server publishes the change on its next poll of the file."
    )]
    Remove { email: String },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=debug,tower_http=debug", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        yansi::whenever(yansi::Condition::NEVER);
    }

    config::load_env_file(cli.env_file.as_deref());

    let command = cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
        users_file: None,
        mask_passwords: false,
    });

    match command {
        Commands::Serve {
            host,
            port,
            users_file,
            mask_passwords,
        } => {
            let state = build_state(users_file, mask_passwords);
            let host = host.unwrap_or_else(config::get_host);
            let port = port.unwrap_or_else(config::get_port);
            start_server(state, &host, port).await;
        }
        Commands::Watch { url, mask_passwords } => {
            let url = url
                .map(|u| config::sanitize_base_url(&u))
                .unwrap_or_else(config::get_feed_url);
            run_watch(url, mask_passwords || config::get_mask_passwords()).await;
        }
        Commands::Users { sub } => {
            let store = open_store(None);
            match sub {
                UserCommands::List { mask_passwords } => {
                    let options = RenderOptions {
                        mask_passwords: mask_passwords || config::get_mask_passwords(),
                    };
                    let mut table = match LiveTable::new(TerminalTable::new(), options) {
                        Ok(t) => t,
                        Err(e) => fail("Failed to prepare table", e),
                    };
                    if let Err(e) = table.render(&store.snapshot()) {
                        fail("Failed to render users", e);
                    }
                    println!("\n{}\n", table.target());
                }
                UserCommands::Add { email, password } => {
                    let email = email.trim().to_string();
                    if email.is_empty() {
                        eprintln!("{}", yansi::Paint::new("Email must not be empty").red());
                        process::exit(1);
                    }
                    if let Err(e) = store.insert(UserRecord::new(email.clone(), password)) {
                        fail("Failed to persist users file", e);
                    }
                    println!(
                        "{} '{}' {}",
                        yansi::Paint::new("User").green(),
                        email,
                        yansi::Paint::new("added").green()
                    );
                }
                UserCommands::Remove { email } => match store.remove(&email) {
                    Ok(0) => {
                        eprintln!(
                            "{} '{}' {}",
                            yansi::Paint::new("User").red(),
                            email,
                            yansi::Paint::new("not found").red()
                        );
                        process::exit(1);
                    }
                    Ok(n) => {
                        println!(
                            "{} {} {} '{}'",
                            yansi::Paint::new("Removed").green(),
                            n,
                            yansi::Paint::new("user(s) with email").green(),
                            email
                        );
                    }
                    Err(e) => fail("Failed to persist users file", e),
                },
            }
        }
    }
}
