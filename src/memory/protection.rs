// Mon Feb 02 2026 - Alex

use bitflags::bitflags;
use std::fmt;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Protection: u32 {
        const READ = 1;
        const WRITE = 2;
        const EXECUTE = 4;
        const PRIVATE = 8;
    }
}

impl Protection {
    /// Parses the permission column of `/proc/<pid>/maps`, e.g. `rw-p`.
    pub fn from_maps_perms(perms: &str) -> Self {
        let mut protection = Protection::empty();
        for (i, c) in perms.chars().enumerate() {
            match (i, c) {
                (0, 'r') => protection |= Protection::READ,
                (1, 'w') => protection |= Protection::WRITE,
                (2, 'x') => protection |= Protection::EXECUTE,
                (3, 'p') => protection |= Protection::PRIVATE,
                _ => {}
            }
        }
        protection
    }

    pub fn can_read(self) -> bool {
        self.contains(Protection::READ)
    }

    pub fn can_write(self) -> bool {
        self.contains(Protection::WRITE)
    }

    pub fn can_execute(self) -> bool {
        self.contains(Protection::EXECUTE)
    }
}

impl fmt::Display for Protection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            if self.can_read() { 'r' } else { '-' },
            if self.can_write() { 'w' } else { '-' },
            if self.can_execute() { 'x' } else { '-' },
            if self.contains(Protection::PRIVATE) { 'p' } else { 's' },
        )
    }
}
