// Tue Jan 13 2026 - Alex

use emu_pointer_finder::ui::{cli, display};

fn main() {
    if let Err(e) = cli::run() {
        display::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
