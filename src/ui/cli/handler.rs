// Wed Jan 15 2026 - Alex

use super::args::{Args, Command, FilterArgs, ListArgs, RefineArgs, ResolveArgs, ScanArgs, SearchArgs, StatesArgs, TargetArgs};
use crate::config::Config;
use crate::emulator::{AdapterLog, AdapterRegistry, EmulatorAdapter, LogFacade};
use crate::memory;
use crate::pointer::{resolve_path, sort_paths, PointerPath, ScanParameters};
use crate::scan::{self, CancelToken, LiveView, ThrottledProgress};
use crate::state::{ScanState, StateCorrelator, MAX_STATES, MIN_STATES};
use crate::ui::display::{self, DisplayRenderer};
use crate::ui::progress::ProgressReporter;
use crate::utils::logging::LoggingUtils;
use crate::utils::{format_bytes, format_duration, pluralize};
use crate::validation::{self, ContinuousFilter};
use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

const SHOWN_PATHS: usize = 50;

/// On-disk form of a path list, shared by every command that reads or
/// writes paths.
#[derive(Debug, Serialize, Deserialize)]
pub struct SavedPaths {
    pub emulator: String,
    pub paths: Vec<PointerPath>,
}

impl SavedPaths {
    pub fn new(adapter: &dyn EmulatorAdapter, paths: Vec<PointerPath>) -> Self {
        Self {
            emulator: adapter.emulator_name().to_string(),
            paths,
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        serde_json::from_str(&text).with_context(|| format!("Invalid path file {:?}", path))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))
    }

    fn warn_if_foreign(&self, adapter: &dyn EmulatorAdapter) {
        if self.emulator != adapter.emulator_name() {
            display::print_warning(&format!(
                "Paths were found with {}, now attached to {}",
                self.emulator,
                adapter.emulator_name()
            ));
        }
    }
}

pub struct CommandHandler {
    config: Config,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn execute(&mut self, args: Args) -> anyhow::Result<()> {
        LoggingUtils::init(LoggingUtils::level_from_str(&args.log_level));
        if args.no_color {
            colored::control::set_override(false);
        }

        if let Some(path) = &args.config {
            self.config = Config::load(path).map_err(|e| anyhow!(e))?;
        }
        if let Some(threads) = args.threads {
            self.config.max_threads = threads;
        }
        if args.quiet {
            self.config.enable_progress_bars = false;
        }
        self.config.validate().map_err(|e| anyhow!(e))?;
        self.config.apply_thread_pool();

        match args.command {
            Command::List(list_args) => self.handle_list(list_args),
            Command::Scan(scan_args) => self.handle_scan(scan_args),
            Command::Filter(filter_args) => self.handle_filter(filter_args),
            Command::Refine(refine_args) => self.handle_refine(refine_args),
            Command::Resolve(resolve_args) => self.handle_resolve(resolve_args),
            Command::States(states_args) => self.handle_states(states_args),
        }
    }

    fn handle_list(&self, args: ListArgs) -> anyhow::Result<()> {
        let registry = AdapterRegistry::global();
        display::print_supported(registry.supported());
        println!();

        let rows: Vec<_> = memory::list_processes()?
            .into_iter()
            .map(|(pid, name)| {
                let emulator = registry
                    .supported()
                    .iter()
                    .find(|entry| entry.matches_process(&name))
                    .map(|entry| entry.emulator);
                (pid, name, emulator)
            })
            .filter(|(_, _, emulator)| args.all || emulator.is_some())
            .collect();

        if rows.is_empty() {
            display::print_warning("No running emulator found");
        } else {
            display::print_processes(&rows);
        }
        Ok(())
    }

    fn handle_scan(&self, args: ScanArgs) -> anyhow::Result<()> {
        let adapter = self.attach(&args.target)?;
        let target = parse_console_address(&*adapter, &args.address)?;
        let params = self.scan_parameters(&*adapter, target, &args.search)?;

        let reporter = ProgressReporter::new(self.config.enable_progress_bars);
        let throttled = ThrottledProgress::with_interval(&reporter, self.config.progress_throttle());
        let started = Instant::now();
        let mut outcome = scan::scan(&*adapter, &params, &throttled, &CancelToken::new())?;
        sort_paths(&mut outcome.paths);
        display::print_info(&format!("Scan finished in {}", format_duration(started.elapsed())));

        DisplayRenderer::new(&*adapter)
            .with_max_items(Some(args.show))
            .print_scan_outcome(&outcome);
        self.save(&*adapter, outcome.paths, &args.output)
    }

    fn handle_filter(&self, args: FilterArgs) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow!(e))?;
        let saved = SavedPaths::load(&args.input)?;
        let adapter = self.attach(&args.target)?;
        saved.warn_if_foreign(&*adapter);

        let interval = args
            .interval_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.config.filter_interval());
        let filter = ContinuousFilter::new(&*adapter, saved.paths)
            .with_interval(interval)
            .with_max_passes(args.passes);

        let cancel = CancelToken::new();
        if args.passes.is_none() {
            display::print_info("Filtering; press Enter to stop");
            let stop = cancel.clone();
            std::thread::spawn(move || {
                let mut line = String::new();
                let _ = io::stdin().read_line(&mut line);
                stop.cancel();
            });
        }

        let reporter = ProgressReporter::new(self.config.enable_progress_bars);
        let outcome = filter.run(&cancel, &reporter);
        DisplayRenderer::new(&*adapter)
            .with_max_items(Some(SHOWN_PATHS))
            .print_filter_outcome(&outcome);

        let output = args.output.as_deref().unwrap_or(&args.input);
        self.save(&*adapter, outcome.survivors.to_vec(), output)
    }

    fn handle_refine(&self, args: RefineArgs) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow!(e))?;
        let saved = SavedPaths::load(&args.input)?;
        let adapter = self.attach(&args.target)?;
        saved.warn_if_foreign(&*adapter);

        let target = parse_console_address(&*adapter, &args.address)?;
        let params = self.scan_parameters(&*adapter, target, &args.search)?;

        let reporter = ProgressReporter::new(self.config.enable_progress_bars);
        let throttled = ThrottledProgress::with_interval(&reporter, self.config.progress_throttle());
        let outcome = validation::refine_with_scan(&saved.paths, &*adapter, &params, &throttled, &CancelToken::new())?;

        display::print_success(&format!(
            "{} of {} kept",
            outcome.paths.len(),
            pluralize(saved.paths.len(), "path", "paths")
        ));
        DisplayRenderer::new(&*adapter)
            .with_max_items(Some(SHOWN_PATHS))
            .print_paths(&outcome.paths);

        let output = args.output.as_deref().unwrap_or(&args.input);
        self.save(&*adapter, outcome.paths, output)
    }

    fn handle_resolve(&self, args: ResolveArgs) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow!(e))?;
        let saved = SavedPaths::load(&args.input)?;
        let adapter = self.attach(&args.target)?;
        saved.warn_if_foreign(&*adapter);

        let view = LiveView::new(&*adapter);
        let renderer = DisplayRenderer::new(&*adapter);
        for path in &saved.paths {
            renderer.print_resolved(path, resolve_path(&view, path));
        }
        Ok(())
    }

    fn handle_states(&self, args: StatesArgs) -> anyhow::Result<()> {
        if !(MIN_STATES..=MAX_STATES).contains(&args.count) {
            bail!("--count must be between {} and {}", MIN_STATES, MAX_STATES);
        }
        let adapter = self.attach(&args.target)?;

        let mut states = Vec::with_capacity(args.count);
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        while states.len() < args.count {
            print!(
                "State {}/{}: set up the game, then enter the target address: ",
                states.len() + 1,
                args.count
            );
            io::stdout().flush()?;

            let line = lines
                .next()
                .ok_or_else(|| anyhow!("Input closed before all states were captured"))??;
            let target = match parse_console_address(&*adapter, &line) {
                Ok(target) => target,
                Err(e) => {
                    display::print_error(&e.to_string());
                    continue;
                }
            };
            let label = format!("state {}", states.len() + 1);
            let state = ScanState::capture(&*adapter, target, &label)?;
            display::print_success(&format!("Captured {} ({})", label, format_bytes(state.dump().len() as u64)));
            states.push(state);
        }

        let live_target = args
            .live_address
            .as_deref()
            .map(|text| parse_console_address(&*adapter, text))
            .transpose()?;
        let params = self
            .scan_parameters(&*adapter, states[0].target_address(), &args.search)?
            .with_final_address_target(live_target);

        let reporter = ProgressReporter::new(self.config.enable_progress_bars);
        let throttled = ThrottledProgress::with_interval(&reporter, self.config.progress_throttle());
        let started = Instant::now();
        let mut outcome = StateCorrelator::scan(&*adapter, &params, &states, &throttled, &CancelToken::new())?;
        sort_paths(&mut outcome.paths);
        display::print_info(&format!("State scan finished in {}", format_duration(started.elapsed())));

        DisplayRenderer::new(&*adapter)
            .with_max_items(Some(SHOWN_PATHS))
            .print_scan_outcome(&outcome);
        self.save(&*adapter, outcome.paths, &args.output)
    }

    fn attach(&self, target: &TargetArgs) -> anyhow::Result<Box<dyn EmulatorAdapter>> {
        target.validate().map_err(|e| anyhow!(e))?;

        let processes = memory::list_processes()?;
        let (pid, name) = match (target.pid, target.process.as_deref()) {
            (Some(pid), _) => processes
                .into_iter()
                .find(|(p, _)| *p == pid)
                .ok_or_else(|| anyhow!("No process with pid {}", pid))?,
            (None, Some(wanted)) => processes
                .into_iter()
                .find(|(_, name)| process_name_matches(name, wanted))
                .ok_or_else(|| anyhow!("No process named '{}'", wanted))?,
            (None, None) => bail!("No process selected"),
        };

        let log: Arc<dyn AdapterLog> = Arc::new(LogFacade);
        let registry = AdapterRegistry::global();
        let adapter = match target.emulator.as_deref() {
            Some(emulator) => registry
                .by_emulator(emulator, log)
                .ok_or_else(|| anyhow!("Unknown emulator '{}'", emulator))?,
            None => registry
                .detect(&name, log)
                .ok_or_else(|| anyhow!("No adapter for process '{}' (pid {}); pass --emulator", name, pid))?,
        };

        let process = memory::open_process(pid)?;
        adapter
            .attach(process)
            .with_context(|| format!("Failed to attach to {} (pid {})", adapter.emulator_name(), pid))?;
        display::print_success(&format!("Attached to {} (pid {})", adapter.emulator_name(), pid));
        Ok(adapter)
    }

    /// Static range defaults to the adapter's main memory window.
    fn scan_parameters(
        &self,
        adapter: &dyn EmulatorAdapter,
        target: u32,
        search: &SearchArgs,
    ) -> anyhow::Result<ScanParameters> {
        let static_start = parse_console_address(adapter, &search.static_start)?;
        let static_end = parse_console_address(adapter, &search.static_end)?;

        let mut params = self
            .config
            .scan_parameters(target)
            .with_static_range(static_start, static_end)
            .with_16_byte_alignment(search.align16)
            .with_structure_analysis(search.structures)
            .with_structure_base_scan(search.structure_base)
            .with_stop_on_first(search.stop_on_first)
            .with_all_path_levels(search.all_levels);
        if let Some(max_level) = search.max_level {
            params = params.with_max_level(max_level);
        }
        if let Some(max_offset) = search.max_offset {
            params = params.with_max_offset(max_offset);
        }
        if let Some(max_negative_offset) = search.max_negative_offset {
            params = params.with_max_negative_offset(max_negative_offset);
        }
        if let Some(max_results) = search.max_results {
            params = params.with_max_results(max_results);
        }
        if let Some(max_candidates) = search.max_candidates {
            params = params.with_max_candidates(max_candidates);
        }
        if let Some(candidates_per_level) = search.candidates_per_level {
            params = params.with_candidates_per_level(candidates_per_level);
        }
        Ok(params)
    }

    fn save(&self, adapter: &dyn EmulatorAdapter, paths: Vec<PointerPath>, output: &Path) -> anyhow::Result<()> {
        let count = paths.len();
        SavedPaths::new(adapter, paths).save(output)?;
        display::print_success(&format!(
            "{} written to {}",
            pluralize(count, "path", "paths"),
            output.display()
        ));
        Ok(())
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_console_address(adapter: &dyn EmulatorAdapter, text: &str) -> anyhow::Result<u32> {
    adapter
        .unnormalize_address(text)
        .ok_or_else(|| anyhow!("'{}' is not a valid {} address", text.trim(), adapter.emulator_name()))
}

// /proc/<pid>/comm is cut to 15 bytes
fn process_name_matches(actual: &str, wanted: &str) -> bool {
    let actual = actual.to_lowercase();
    let wanted = wanted.trim().to_lowercase();
    actual == wanted || (actual.len() == 15 && wanted.starts_with(&actual))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::DuckStationAdapter;

    #[test]
    fn test_saved_paths_round_trip_through_file() {
        let adapter = DuckStationAdapter::new(Arc::new(LogFacade));
        let paths = vec![PointerPath::new(0x8000_1000, vec![0, 4], 0x8000_3004).unwrap()];
        let file = std::env::temp_dir().join(format!("emu-pointer-finder-{}.json", std::process::id()));

        SavedPaths::new(&adapter, paths.clone()).save(&file).unwrap();
        let loaded = SavedPaths::load(&file).unwrap();
        let _ = std::fs::remove_file(&file);

        assert_eq!(loaded.emulator, adapter.emulator_name());
        assert_eq!(loaded.paths, paths);
        assert_eq!(loaded.paths[0].final_address(), 0x8000_3004);
    }

    #[test]
    fn test_search_args_override_config() {
        let adapter = DuckStationAdapter::new(Arc::new(LogFacade));
        let handler = CommandHandler::with_config(Config::new().with_max_level(3));
        let search = SearchArgs {
            static_start: "0x010000".to_string(),
            static_end: "0xA001FFFF".to_string(),
            max_level: None,
            max_offset: Some(0x200),
            max_negative_offset: None,
            max_results: None,
            max_candidates: None,
            candidates_per_level: None,
            align16: false,
            structures: true,
            structure_base: false,
            stop_on_first: false,
            all_levels: false,
        };

        let params = handler.scan_parameters(&adapter, 0x8000_2000, &search).unwrap();
        assert_eq!(params.max_level, 3);
        assert_eq!(params.max_offset, 0x200);
        assert!(params.analyze_structures);
        assert_eq!(params.static_base_start, 0x8001_0000);
        assert_eq!(params.static_base_end, 0x8001_FFFF);
    }

    #[test]
    fn test_process_name_matches_truncated_comm() {
        assert!(process_name_matches("duckstation-qt", "DuckStation-Qt"));
        assert!(process_name_matches("duckstation-qt-", "duckstation-qt-x64-ReleaseLTCG"));
        assert!(!process_name_matches("pcsx2", "pcsx2-qt"));
    }
}
