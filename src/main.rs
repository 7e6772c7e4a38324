use clap::Parser;

use salescope::cli::{self, Cli, Commands, ReportCommands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir, company } => cli::init::run(data_dir, company),
        Commands::Demo => cli::demo::run(),
        Commands::Report { command } => match command {
            ReportCommands::Summary { range, group_by } => cli::report::summary(range, group_by),
            ReportCommands::Dealers {
                range,
                search,
                min_sales,
                limit,
            } => cli::report::dealers(range, search, min_sales, limit),
            ReportCommands::Orders {
                range,
                search,
                status,
                dealer,
                page,
                page_size,
                sort,
                desc,
                expand,
            } => cli::report::orders(range, search, status, dealer, page, page_size, sort, desc, expand),
            ReportCommands::Items { order } => cli::report::items(order),
        },
        Commands::Export {
            view,
            format,
            range,
            search,
            status,
            name,
            output,
        } => cli::export::dispatch(view, format, range, search, status, name, output),
        Commands::Status => cli::status::run(),
    };

    match result {
        Ok(out) => println!("{out}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
