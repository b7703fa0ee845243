use colored::Colorize;
use schema_wagon::cli::CommandLineInterface;
use schema_wagon::logging::init_logging;

fn main() {
    let command_line_interface = CommandLineInterface::load();
    init_logging(command_line_interface.verbose());
    if let Err(error) = command_line_interface.run() {
        eprintln!("{} {error:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
