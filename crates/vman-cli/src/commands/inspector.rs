//! Process inspection for the disassembly view.

use std::collections::HashSet;

use vman_bytecode::{EnvironmentInspector, ResidentLibrary};

/// Reports the current process id and its mapped shared libraries.
pub struct ProcessInspector;

impl EnvironmentInspector for ProcessInspector {
    fn process_id(&self) -> Option<u32> {
        Some(std::process::id())
    }

    fn resident_libraries(&self) -> Vec<ResidentLibrary> {
        #[cfg(target_os = "linux")]
        {
            match std::fs::read_to_string("/proc/self/maps") {
                Ok(maps) => parse_proc_maps(&maps),
                Err(e) => {
                    tracing::debug!(error = %e, "cannot read /proc/self/maps");
                    Vec::new()
                }
            }
        }
        #[cfg(not(target_os = "linux"))]
        {
            Vec::new()
        }
    }
}

/// Shared objects listed in a `/proc/<pid>/maps` dump, in mapping order.
///
/// Each library appears once, based at its lowest (first listed) mapping.
pub fn parse_proc_maps(maps: &str) -> Vec<ResidentLibrary> {
    let mut seen = HashSet::new();
    let mut libraries = Vec::new();

    for line in maps.lines() {
        let mut fields = line.splitn(6, char::is_whitespace);
        let Some(range) = fields.next() else {
            continue;
        };
        // perms, offset, dev, inode
        let Some(path) = fields.nth(4).map(str::trim) else {
            continue;
        };
        if !path.starts_with('/') || !is_shared_object(path) {
            continue;
        }
        let Some(base) = range
            .split('-')
            .next()
            .and_then(|start| u64::from_str_radix(start, 16).ok())
        else {
            continue;
        };
        if seen.insert(path) {
            libraries.push(ResidentLibrary {
                name: path.to_string(),
                base,
            });
        }
    }

    libraries
}

fn is_shared_object(path: &str) -> bool {
    let file = path.rsplit('/').next().unwrap_or(path);
    file.ends_with(".so") || file.contains(".so.")
}
