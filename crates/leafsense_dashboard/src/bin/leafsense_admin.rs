use clap::{Parser, Subcommand};
use leafsense_common::logging;
use leafsense_config::{load_config, DashboardConfig};
use leafsense_dashboard::actions::{AdminConsole, AssumeYes, InquireOperator, Operator};
use leafsense_dashboard::models::AppointmentStatus;
use leafsense_dashboard::poller::{watch, WatchCommand, WATCH_HELP};
use leafsense_dashboard::{
    render, AdminApiClient, Banner, BannerKind, DashboardState, RenderOptions, Section,
    StatusFilter, TimeDisplay,
};
use std::io::BufRead;
use std::process::ExitCode;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{warn, Level};

#[derive(Parser)]
#[command(name = "leafsense-admin", about = "LeafSense admin console")]
struct Cli {
    /// Overrides `dashboard.api_base_url`.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log at INFO instead of WARN.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh and redraw on the configured interval until Ctrl-C, reading
    /// commands from stdin.
    Watch {
        #[arg(long, default_value = "all")]
        section: Section,
        #[arg(long, default_value = "all")]
        filter: StatusFilter,
    },
    /// Refresh once and print.
    Show {
        #[arg(long, default_value = "all")]
        section: Section,
        #[arg(long, default_value = "all")]
        filter: StatusFilter,
    },
    Approve { id: i64 },
    Reject { id: i64 },
    Cancel {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
}

fn dashboard_config(base_url: Option<String>) -> DashboardConfig {
    let mut config = match load_config() {
        Ok(app) => app.dashboard.unwrap_or_default(),
        Err(e) => {
            warn!("Using default dashboard settings: {}", e);
            DashboardConfig::default()
        }
    };
    if let Some(url) = base_url {
        config.api_base_url = url;
    }
    config
}

/// Prints the refreshed appointments with the banner of the mutation.
fn print_outcome(state: &DashboardState, banner: Option<Banner>, options: &RenderOptions) -> ExitCode {
    println!("{}", render(state, options));
    match banner {
        Some(banner) if banner.kind == BannerKind::Error => ExitCode::FAILURE,
        Some(_) => ExitCode::SUCCESS,
        None => {
            println!("Nothing done.");
            ExitCode::SUCCESS
        }
    }
}

/// Reads watch commands from stdin on a dedicated thread. Cancel and delete
/// are only sent after a `y` on the following line.
fn spawn_command_reader(commands: mpsc::Sender<WatchCommand>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut lines = stdin.lock().lines();
        while let Some(Ok(line)) = lines.next() {
            if line.trim().is_empty() {
                continue;
            }
            let command = match line.parse::<WatchCommand>() {
                Ok(command) => command,
                Err(e) => {
                    println!("{}. {}", e, WATCH_HELP);
                    continue;
                }
            };
            if let Some(prompt) = command.confirmation() {
                println!("{} [y/N]", prompt);
                match lines.next() {
                    Some(Ok(answer)) if matches!(answer.trim(), "y" | "Y" | "yes") => {}
                    Some(Ok(_)) => continue,
                    _ => break,
                }
            }
            if commands.blocking_send(command).is_err() {
                break;
            }
        }
    });
}

async fn run<O: Operator>(
    mut console: AdminConsole<O>,
    command: Commands,
    config: &DashboardConfig,
) -> ExitCode {
    let base_url = console.client.base_url().to_string();
    let options = |section, filter| RenderOptions {
        section,
        filter,
        time: TimeDisplay::new(config.display_time_zone.as_deref()),
        base_url: base_url.clone(),
    };
    let appointments = options(Section::Appointments, StatusFilter::All);

    match command {
        Commands::Watch { section, filter } => {
            let options = options(section, filter);
            let period = Duration::from_secs(config.refresh_interval_secs.max(1));
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Ctrl-C handler failed: {}", e);
                    std::future::pending::<()>().await;
                }
            };
            let (sender, mut commands) = mpsc::channel(8);
            spawn_command_reader(sender);
            watch(
                &mut console,
                period,
                &mut commands,
                |state| {
                    // clear screen, cursor home
                    print!("\x1b[2J\x1b[H");
                    println!("{}", render(state, &options));
                    println!("{}", WATCH_HELP);
                },
                shutdown,
            )
            .await;
            ExitCode::SUCCESS
        }
        Commands::Show { section, filter } => {
            let options = options(section, filter);
            console.refresh().await;
            println!("{}", render(&console.state, &options));
            ExitCode::SUCCESS
        }
        Commands::Approve { id } => {
            console.refresh().await;
            let banner = console.set_status(id, AppointmentStatus::Approved).await;
            print_outcome(&console.state, Some(banner), &appointments)
        }
        Commands::Reject { id } => {
            console.refresh().await;
            let banner = console.set_status(id, AppointmentStatus::Rejected).await;
            print_outcome(&console.state, Some(banner), &appointments)
        }
        Commands::Cancel { id, .. } => {
            console.refresh().await;
            let banner = console.cancel(id).await;
            print_outcome(&console.state, banner, &appointments)
        }
        Commands::Delete { id, .. } => {
            console.refresh().await;
            let banner = console.delete(id).await;
            print_outcome(&console.state, banner, &appointments)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_with_level(if cli.verbose { Level::INFO } else { Level::WARN });

    let config = dashboard_config(cli.base_url);
    let client = match AdminApiClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // watch confirms on its own stdin reader
    let assume_yes = matches!(
        cli.command,
        Commands::Cancel { yes: true, .. }
            | Commands::Delete { yes: true, .. }
            | Commands::Watch { .. }
    );
    if assume_yes {
        run(AdminConsole::new(client, AssumeYes), cli.command, &config).await
    } else {
        run(AdminConsole::new(client, InquireOperator), cli.command, &config).await
    }
}
