use std::path::PathBuf;

/// Environment variables that commonly point at a JDK.
const JAVA_HOME_VARS: [&str; 2] = ["JAVA_HOME", "JDK_HOME"];

pub fn java_exe() -> &'static str {
    if cfg!(windows) {
        "java.exe"
    } else {
        "java"
    }
}

/// Conventional JVM install roots for the current OS, primary first.
fn platform_roots() -> Vec<PathBuf> {
    if cfg!(windows) {
        vec![
            PathBuf::from(r"C:\Program Files\Java"),
            PathBuf::from(r"C:\Program Files\Eclipse Adoptium"),
        ]
    } else if cfg!(target_os = "macos") {
        vec![
            PathBuf::from("/Library/Java/JavaVirtualMachines"),
            PathBuf::from("/opt"),
        ]
    } else {
        vec![PathBuf::from("/usr/lib/jvm"), PathBuf::from("/opt")]
    }
}

/// Directories walked (depth-limited) when looking for `bin/java`.
///
/// Missing or unset entries are dropped.
pub fn default_search_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(home) = dirs::home_dir() {
        roots.push(home);
    }
    roots.extend(platform_roots());
    roots.extend(
        JAVA_HOME_VARS
            .iter()
            .filter_map(|var| std::env::var_os(var))
            .filter(|value| !value.is_empty())
            .map(PathBuf::from),
    );
    roots.retain(|root| root.is_dir());
    roots
}

/// Entries of `PATH`, in order.
pub fn path_entries() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|value| std::env::split_paths(&value).collect())
        .unwrap_or_default()
}
