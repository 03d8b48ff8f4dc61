mod args;
mod cli;
mod tui;

fn main() {
    env_logger::init();
    let args = args::Args::parse().unwrap_or_else(|e| e.exit());
    cli::run(args);
}
