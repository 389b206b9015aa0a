use clap::Parser;
use pmvault::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose when set.
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("pmvault={log_level}"))),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Init => pmvault::cli::commands::init::execute(&cli),
        Commands::Add {
            ref service,
            ref username,
            ref password,
            ref notes,
        } => pmvault::cli::commands::add::execute(
            &cli,
            service,
            username,
            password.as_deref(),
            notes.as_deref(),
        ),
        Commands::List { show_passwords } => {
            pmvault::cli::commands::list::execute(&cli, show_passwords)
        }
        Commands::Remove { ref id } => pmvault::cli::commands::remove::execute(&cli, id),
        Commands::Genkeys {
            ref public_key,
            ref private_key,
            bits,
            pem,
        } => pmvault::cli::commands::genkeys::execute(public_key, private_key, bits, pem),
        Commands::Export {
            ref id,
            ref public_key,
            ref output,
        } => pmvault::cli::commands::export::execute(&cli, id, public_key, output),
        Commands::Import {
            ref private_key,
            ref input,
        } => pmvault::cli::commands::import_cmd::execute(&cli, private_key, input),
    };

    if let Err(e) = result {
        pmvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
