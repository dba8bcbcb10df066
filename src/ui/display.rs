// Tue Jan 13 2026 - Alex

use crate::emulator::{AdapterEntry, EmulatorAdapter};
use crate::pointer::PointerPath;
use crate::scan::{ScanOutcome, StructureGroup};
use crate::validation::{FilterOutcome, StopReason};
use colored::*;

/// Console rendering of results. Paths print in the attached adapter's
/// address format.
pub struct DisplayRenderer<'a> {
    adapter: &'a dyn EmulatorAdapter,
    max_items: Option<usize>,
}

impl<'a> DisplayRenderer<'a> {
    pub fn new(adapter: &'a dyn EmulatorAdapter) -> Self {
        Self {
            adapter,
            max_items: None,
        }
    }

    pub fn with_max_items(mut self, max_items: Option<usize>) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn path_line(&self, path: &PointerPath) -> String {
        format!(
            "{} {} {}",
            path.display_with(self.adapter),
            "->".dimmed(),
            self.adapter.format_display_address(path.final_address()).cyan()
        )
    }

    pub fn print_paths(&self, paths: &[PointerPath]) {
        let shown = self.max_items.unwrap_or(paths.len()).min(paths.len());
        for path in &paths[..shown] {
            println!("  {} {}", format!("L{}", path.level()).yellow(), self.path_line(path));
        }
        if shown < paths.len() {
            println!("  {}", format!("... {} more", paths.len() - shown).dimmed());
        }
    }

    pub fn print_resolved(&self, path: &PointerPath, now: Option<u32>) {
        let saved = self.adapter.format_display_address(path.final_address());
        match now {
            Some(now) if self.adapter.are_addresses_equivalent(now, path.final_address()) => {
                println!("  {} {}", path.display_with(self.adapter), saved.green());
            }
            Some(now) => println!(
                "  {} {} {}",
                path.display_with(self.adapter),
                self.adapter.format_display_address(now).yellow(),
                format!("(was {})", saved).dimmed()
            ),
            None => println!("  {} {}", path.display_with(self.adapter), "unreadable".red()),
        }
    }

    pub fn print_scan_outcome(&self, outcome: &ScanOutcome) {
        println!("{}", "Scan Results".cyan().bold());
        println!("{}", "-".repeat(40).cyan());
        println!("  Paths found: {}", outcome.paths.len().to_string().green());
        println!("  Levels searched: {}", outcome.levels_searched);
        println!("  Nodes explored: {}", outcome.nodes_explored);
        if outcome.truncated {
            println!("  {}", "Candidate limit reached; results are partial".yellow());
        }
        if outcome.cancelled {
            println!("  {}", "Scan cancelled; results are partial".yellow());
        }
        println!();
        self.print_paths(&outcome.paths);
        if !outcome.structures.is_empty() {
            println!();
            self.print_structures(&outcome.structures);
        }
    }

    pub fn print_structures(&self, groups: &[StructureGroup]) {
        println!("{}", "Structures:".yellow().bold());
        for group in groups {
            let firsts = group
                .first_offsets
                .iter()
                .map(|o| format!("0x{:X}", o))
                .collect::<Vec<_>>()
                .join(", ");
            let kind = match group.stride {
                Some(stride) => format!("array, stride 0x{:X}", stride),
                None => "structure".to_string(),
            };
            println!(
                "  {} paths, first offsets [{}] ({})",
                group.paths.len().to_string().green(),
                firsts,
                kind.dimmed()
            );
        }
    }

    pub fn print_filter_outcome(&self, outcome: &FilterOutcome) {
        let reason = match outcome.stop_reason {
            StopReason::Cancelled => "cancelled".normal(),
            StopReason::Exhausted => "no paths left".yellow(),
            StopReason::PassLimit => "pass limit reached".normal(),
            StopReason::ProcessExited => "emulator exited".red(),
        };
        println!(
            "{} {} survivor(s) after {} pass(es), {}",
            "[+]".green(),
            outcome.survivors.len(),
            outcome.passes,
            reason
        );
        self.print_paths(&outcome.survivors);
    }
}

pub fn print_supported(entries: &[AdapterEntry]) {
    println!("{}", "Supported emulators".cyan().bold());
    for entry in entries {
        println!("  {:<12} {}", entry.emulator.green(), entry.process_names.join(", ").dimmed());
    }
}

pub fn print_processes(processes: &[(u32, String, Option<&'static str>)]) {
    for (pid, name, emulator) in processes {
        match emulator {
            Some(emulator) => println!("  {:>7} {} {}", pid, name.green(), format!("({})", emulator).cyan()),
            None => println!("  {:>7} {}", pid, name.dimmed()),
        }
    }
}

pub fn print_info(message: &str) {
    println!("{} {}", "[*]".blue(), message);
}

pub fn print_success(message: &str) {
    println!("{} {}", "[+]".green(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "[WARN]".yellow(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "[!]".red(), message);
}
