use etch8::cli;
use log::error;

fn main() {
    let cli = cli::init();
    let result = match cli.command {
        cli::Commands::Run { path, config } => cli::run(&path, config),
        cli::Commands::Disassemble { path, output_file } => cli::disassemble(&path, output_file),
    };
    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
