use super::inspector::{ProcessInspector, parse_proc_maps};
use vman_bytecode::EnvironmentInspector;

const MAPS: &str = "\
55d0c0a00000-55d0c0a02000 r--p 00000000 08:01 131090                     /usr/bin/vman
7f3a1c000000-7f3a1c028000 r--p 00000000 08:01 262401                     /usr/lib/x86_64-linux-gnu/libc.so.6
7f3a1c028000-7f3a1c1bd000 r-xp 00028000 08:01 262401                     /usr/lib/x86_64-linux-gnu/libc.so.6
7f3a1c400000-7f3a1c401000 rw-p 00000000 00:00 0 
7f3a1c500000-7f3a1c510000 r-xp 00000000 08:01 262500                     /opt/plugins/libsample.so
7f3a1c600000-7f3a1c621000 rw-p 00000000 00:00 0                          [heap]
7f3a1c700000-7f3a1c701000 r--p 00000000 08:01 262600                     /usr/share/locale/sources.sort
7ffd4e9f0000-7ffd4e9f2000 r-xp 00000000 00:00 0                          [vdso]
";

#[test]
fn lists_each_shared_object_once_at_first_mapping() {
    let libraries = parse_proc_maps(MAPS);

    let rendered: Vec<String> = libraries
        .iter()
        .map(|lib| format!("{} @ {:#x}", lib.name, lib.base))
        .collect();
    assert_eq!(
        rendered,
        [
            "/usr/lib/x86_64-linux-gnu/libc.so.6 @ 0x7f3a1c000000",
            "/opt/plugins/libsample.so @ 0x7f3a1c500000",
        ]
    );
}

#[test]
fn ignores_anonymous_and_malformed_lines() {
    let maps = "garbage\n\nzz-10 r--p 0 0 0 /lib/libbad.so\n7f00-7f10 r--p\n";
    assert!(parse_proc_maps(maps).is_empty());
}

#[test]
fn process_inspector_reports_own_pid() {
    assert_eq!(ProcessInspector.process_id(), Some(std::process::id()));
}

#[test]
#[cfg(target_os = "linux")]
fn process_inspector_finds_resident_libraries() {
    // Test binaries link dynamically against the C runtime on Linux hosts.
    let libraries = ProcessInspector.resident_libraries();
    if cfg!(target_env = "gnu") {
        assert!(libraries.iter().any(|lib| lib.name.contains("libc")));
    }
}
