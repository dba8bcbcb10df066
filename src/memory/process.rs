// Mon Feb 02 2026 - Alex

use crate::memory::{Address, HostProcess, MemoryError, MemoryRange, MemoryRegion, Protection};
use goblin::elf::header::ET_DYN;
use goblin::elf::program_header::PT_LOAD;
use goblin::elf::Elf;
use libc::{c_void, iovec, pid_t};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

static MAPS_LINE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^([0-9a-f]+)-([0-9a-f]+)\s+([rwxps-]{4})\s+([0-9a-f]+)\s+\S+\s+\d+\s*(.*)$").ok()
});

const PAGE_MASK: u64 = !0xFFF;

/// A live Linux process read through `process_vm_readv`.
pub struct LinuxProcess {
    pid: u32,
    name: String,
}

impl LinuxProcess {
    pub fn open(pid: u32) -> Result<Self, MemoryError> {
        let proc_dir = PathBuf::from(format!("/proc/{}", pid));
        if !proc_dir.exists() {
            return Err(MemoryError::ProcessNotFound(format!("No process with pid {}", pid)));
        }

        let name = fs::read_to_string(proc_dir.join("comm"))
            .map(|s| s.trim().to_string())
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::PermissionDenied => {
                    MemoryError::PermissionDenied(format!("Cannot inspect process {}", pid))
                }
                _ => MemoryError::Io(e),
            })?;

        // maps is only readable with ptrace-read rights, which process_vm_readv needs too
        fs::read_to_string(proc_dir.join("maps")).map_err(|_| {
            MemoryError::PermissionDenied(format!(
                "Cannot read memory map of process {} ({}). ptrace rights may be required.",
                pid, name
            ))
        })?;

        log::debug!("Opened process {} ({})", pid, name);
        Ok(Self { pid, name })
    }

    pub fn find_processes_by_name(name: &str) -> Result<Vec<u32>, MemoryError> {
        let wanted = name.to_lowercase();
        Ok(list_processes()?
            .into_iter()
            .filter(|(_, comm)| comm.to_lowercase() == wanted)
            .map(|(pid, _)| pid)
            .collect())
    }

    fn exe_path(&self) -> Result<PathBuf, MemoryError> {
        fs::read_link(format!("/proc/{}/exe", self.pid)).map_err(MemoryError::Io)
    }

    fn load_bias(&self, elf: &Elf, exe: &Path) -> Result<u64, MemoryError> {
        if elf.header.e_type != ET_DYN {
            return Ok(0);
        }

        let first_load = elf
            .program_headers
            .iter()
            .filter(|ph| ph.p_type == PT_LOAD)
            .min_by_key(|ph| ph.p_vaddr)
            .ok_or_else(|| MemoryError::BinaryParseError("No PT_LOAD segment".to_string()))?;

        let exe_name = exe.to_string_lossy();
        let mapped = self
            .regions_unfiltered()?
            .into_iter()
            .filter(|r| r.name() == exe_name)
            .min_by_key(|r| r.start())
            .ok_or_else(|| {
                MemoryError::SymbolNotFound(format!("{} is not mapped in process {}", exe_name, self.pid))
            })?;

        Ok(mapped.start().as_u64().wrapping_sub(first_load.p_vaddr & PAGE_MASK))
    }

    fn regions_unfiltered(&self) -> Result<Vec<MemoryRegion>, MemoryError> {
        let maps = fs::read_to_string(format!("/proc/{}/maps", self.pid)).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MemoryError::ProcessExited(self.pid)
            } else {
                MemoryError::Io(e)
            }
        })?;
        Ok(maps.lines().filter_map(parse_maps_line).collect())
    }
}

fn parse_maps_line(line: &str) -> Option<MemoryRegion> {
    let caps = MAPS_LINE.as_ref()?.captures(line)?;
    let start = u64::from_str_radix(&caps[1], 16).ok()?;
    let end = u64::from_str_radix(&caps[2], 16).ok()?;
    let protection = Protection::from_maps_perms(&caps[3]);
    let offset = u64::from_str_radix(&caps[4], 16).ok()?;
    let name = match caps[5].trim() {
        "" => "[anon]".to_string(),
        other => other.to_string(),
    };
    let range = MemoryRange::new(Address::new(start), Address::new(end));
    Some(MemoryRegion::new(range, protection, name).with_offset(offset))
}

/// Matches plain symbol names and Itanium-mangled names whose last component
/// is `symbol` (e.g. `_ZN6Memory6EEmemE`).
fn symbol_matches(candidate: &str, symbol: &str) -> bool {
    candidate == symbol
        || (candidate.starts_with("_Z") && candidate.ends_with(&format!("{}{}E", symbol.len(), symbol)))
}

impl HostProcess for LinuxProcess {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn read_bytes(&self, address: Address, buf: &mut [u8]) -> Result<(), MemoryError> {
        if buf.is_empty() {
            return Ok(());
        }

        let local = iovec {
            iov_base: buf.as_mut_ptr() as *mut c_void,
            iov_len: buf.len(),
        };
        let remote = iovec {
            iov_base: address.as_u64() as *mut c_void,
            iov_len: buf.len(),
        };

        let read = unsafe { libc::process_vm_readv(self.pid as pid_t, &local, 1, &remote, 1, 0) };

        if read < 0 {
            let err = std::io::Error::last_os_error();
            return Err(match err.raw_os_error() {
                Some(libc::ESRCH) => MemoryError::ProcessExited(self.pid),
                Some(libc::EPERM) => MemoryError::PermissionDenied(format!("process_vm_readv on {}", self.pid)),
                _ => MemoryError::ReadFailed(address.as_u64()),
            });
        }

        if read as usize != buf.len() {
            return Err(MemoryError::PartialRead {
                address: address.as_u64(),
                read: read as usize,
                requested: buf.len(),
            });
        }

        Ok(())
    }

    fn regions(&self) -> Result<Vec<MemoryRegion>, MemoryError> {
        let mut regions: Vec<MemoryRegion> = self
            .regions_unfiltered()?
            .into_iter()
            .filter(|r| r.is_readable())
            .collect();
        regions.sort_by_key(|r| r.start());
        Ok(regions)
    }

    fn find_export(&self, symbol: &str) -> Result<Address, MemoryError> {
        let exe = self.exe_path()?;
        let data = fs::read(&exe)?;
        let elf = Elf::parse(&data)
            .map_err(|e| MemoryError::BinaryParseError(format!("Failed to parse {}: {}", exe.display(), e)))?;

        let dynamic = elf
            .dynsyms
            .iter()
            .find(|sym| sym.st_value != 0 && elf.dynstrtab.get_at(sym.st_name).is_some_and(|n| symbol_matches(n, symbol)));
        let found = dynamic.or_else(|| {
            elf.syms
                .iter()
                .find(|sym| sym.st_value != 0 && elf.strtab.get_at(sym.st_name).is_some_and(|n| symbol_matches(n, symbol)))
        });

        let sym = found.ok_or_else(|| {
            MemoryError::SymbolNotFound(format!("'{}' not exported by {}", symbol, exe.display()))
        })?;

        let bias = self.load_bias(&elf, &exe)?;
        let address = Address::new(bias.wrapping_add(sym.st_value));
        log::debug!("Resolved {} in {} to {}", symbol, self.name, address);
        Ok(address)
    }

    fn is_alive(&self) -> bool {
        let result = unsafe { libc::kill(self.pid as pid_t, 0) };
        result == 0 || std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
    }
}

/// Every process visible under `/proc` as `(pid, comm)`.
pub fn list_processes() -> Result<Vec<(u32, String)>, MemoryError> {
    let mut processes = Vec::new();

    for entry in fs::read_dir("/proc")? {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let pid = match entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) {
            Some(pid) => pid,
            None => continue,
        };
        if let Ok(comm) = fs::read_to_string(entry.path().join("comm")) {
            processes.push((pid, comm.trim().to_string()));
        }
    }

    processes.sort_by_key(|(pid, _)| *pid);
    Ok(processes)
}
