use clap::Parser;
use miette::Result;
use riskreg::cli::{commands, Cli, Commands};

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    cli.global.setup_logging();

    match cli.command {
        Commands::Init(args) => commands::init::run(args, &cli.global),
        Commands::Info(cmd) => commands::info::run(cmd, &cli.global),
        Commands::Process(cmd) => commands::process::run(cmd, &cli.global),
        Commands::Hazard(cmd) => commands::hazard::run(cmd, &cli.global),
        Commands::Assess(cmd) => commands::assess::run(cmd, &cli.global),
        Commands::Rollup(args) => commands::rollup::run(args, &cli.global),
        Commands::Improvements(args) => commands::improvements::run(args, &cli.global),
        Commands::Export(args) => commands::export::run(args, &cli.global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
