use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, instrument};

use crate::core::error::{SetupError, SetupResult};

use super::paths::{default_search_roots, java_exe, path_entries};

/// How many directory levels below each search root are inspected.
pub const DEFAULT_SEARCH_DEPTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaInstallation {
    pub path: PathBuf,
    pub major: u32,
}

/// Discovers Java runtimes on the host and picks one for a game version.
///
/// Nothing is cached: every lookup rescans the filesystem.
#[derive(Debug, Clone)]
pub struct JavaLocator {
    search_roots: Vec<PathBuf>,
    path_dirs: Vec<PathBuf>,
    max_depth: usize,
}

impl JavaLocator {
    pub fn new(search_roots: Vec<PathBuf>, path_dirs: Vec<PathBuf>) -> Self {
        Self {
            search_roots,
            path_dirs,
            max_depth: DEFAULT_SEARCH_DEPTH,
        }
    }

    /// Home directory, the OS install roots, `JAVA_HOME`/`JDK_HOME` and `PATH`.
    pub fn from_env() -> Self {
        Self::new(default_search_roots(), path_entries())
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Best runtime for `minecraft_version`, or `None` when nothing is installed.
    #[instrument(skip(self))]
    pub fn find_runtime(&self, minecraft_version: &str) -> Option<JavaInstallation> {
        let required = required_java_for_minecraft_version(minecraft_version);
        let candidates = self.discover();
        let selected = select_runtime(&candidates, required).cloned();
        match &selected {
            Some(java) => info!(
                "Selected Java {} at {:?} (required {})",
                java.major, java.path, required
            ),
            None => info!("No Java runtime found (required {})", required),
        }
        selected
    }

    /// `find_runtime` on the blocking pool, failing with an actionable message.
    pub async fn require_runtime(&self, minecraft_version: &str) -> SetupResult<JavaInstallation> {
        let locator = self.clone();
        let version = minecraft_version.to_string();
        let found = tokio::task::spawn_blocking(move || locator.find_runtime(&version))
            .await
            .map_err(|e| SetupError::Other(format!("Task join error: {e}")))?;
        found.ok_or_else(|| {
            SetupError::JavaNotFound(required_java_for_minecraft_version(minecraft_version))
        })
    }

    /// Every runtime that answers `-version`, deduplicated by resolved path.
    pub fn discover(&self) -> Vec<JavaInstallation> {
        let detected: Vec<JavaInstallation> = self
            .candidate_executables()
            .iter()
            .filter_map(|exe| probe::probe_java(exe))
            .collect();
        debug!("Detected {} Java runtimes", detected.len());
        detected
    }

    fn candidate_executables(&self) -> Vec<PathBuf> {
        let mut found = Vec::new();
        for root in &self.search_roots {
            found.extend(walk_for_java(root, self.max_depth));
        }
        for dir in &self.path_dirs {
            let exe = dir.join(java_exe());
            if is_executable(&exe) {
                found.push(exe);
            }
        }

        let mut seen = HashSet::new();
        found
            .into_iter()
            .map(|exe| std::fs::canonicalize(&exe).unwrap_or(exe))
            .filter(|exe| seen.insert(exe.clone()))
            .collect()
    }
}

/// Bounded breadth-first walk from `root` collecting `<dir>/bin/java` for
/// every directory at most `max_depth` levels below `root` (root is level 0).
///
/// Symlinked directories are followed; each resolved directory is visited once.
pub fn walk_for_java(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut visited = HashSet::new();
    let mut queue = std::collections::VecDeque::from([(root.to_path_buf(), 0_usize)]);

    while let Some((dir, depth)) = queue.pop_front() {
        let resolved = std::fs::canonicalize(&dir).unwrap_or_else(|_| dir.clone());
        if !visited.insert(resolved) {
            continue;
        }

        let exe = dir.join("bin").join(java_exe());
        if is_executable(&exe) {
            found.push(exe);
        }

        if depth >= max_depth {
            continue;
        }
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.filter_map(Result::ok) {
            let path = entry.path();
            if path.is_dir() {
                queue.push_back((path, depth + 1));
            }
        }
    }

    found
}

fn is_executable(path: &Path) -> bool {
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    if !meta.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

/// Pick a runtime for `required_major`.
///
/// Exact match first, then the lowest major above the requirement, then the
/// newest runtime available even if it is older than required.
pub fn select_runtime(
    candidates: &[JavaInstallation],
    required_major: u32,
) -> Option<&JavaInstallation> {
    if let Some(exact) = candidates.iter().find(|c| c.major == required_major) {
        return Some(exact);
    }
    if let Some(above) = candidates
        .iter()
        .filter(|c| c.major > required_major)
        .min_by_key(|c| c.major)
    {
        return Some(above);
    }
    candidates.iter().max_by_key(|c| c.major)
}

/// Split a game version into `(major, minor, patch)`; anything missing or
/// non-numeric counts as 0.
pub fn parse_game_version(version: &str) -> (u32, u32, u32) {
    let mut parts = version
        .split(['.', '-'])
        .map(|part| part.trim().parse::<u32>().unwrap_or(0));
    (
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
    )
}

pub fn required_java_for_minecraft_version(minecraft_version: &str) -> u32 {
    let (major, minor, patch) = parse_game_version(minecraft_version);
    if major == 1 && minor <= 12 {
        8
    } else if major == 1 && minor <= 16 {
        11
    } else if major == 1 && minor == 17 {
        16
    } else if major == 1 && (18..=19).contains(&minor) {
        17
    } else if major == 1 && minor == 20 && patch < 5 {
        17
    } else {
        21
    }
}

/// Major version from `java -version` output. Accepts `1.8.0_392` (legacy
/// scheme, major 8) as well as `17.0.8`, `21` or `22-ea`.
pub fn parse_java_major(output: &str) -> Option<u32> {
    output.lines().find_map(|line| {
        let start = line.find("version \"")? + "version \"".len();
        let end = line[start..].find('"')?;
        major_from_version_string(&line[start..start + end])
    })
}

fn major_from_version_string(version: &str) -> Option<u32> {
    let rest = match version.strip_prefix("1.") {
        Some(legacy) if legacy.starts_with(|c: char| c.is_ascii_digit()) => legacy,
        _ => version,
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse::<u32>().ok().filter(|major| *major > 0)
}

mod probe {
    use super::*;

    #[instrument]
    pub fn probe_java(path: &Path) -> Option<JavaInstallation> {
        let output = Command::new(path).arg("-version").output().ok()?;

        // `-version` writes to stderr; some wrappers use stdout.
        let version_output = format!(
            "{}\n{}",
            String::from_utf8_lossy(&output.stderr),
            String::from_utf8_lossy(&output.stdout)
        );
        debug!(
            "Probing {:?}: {}",
            path,
            version_output.lines().next().unwrap_or("")
        );

        let major = parse_java_major(&version_output)?;
        Some(JavaInstallation {
            path: path.to_path_buf(),
            major,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn install(path: &str, major: u32) -> JavaInstallation {
        JavaInstallation {
            path: PathBuf::from(path),
            major,
        }
    }

    #[test]
    fn java_required_by_minecraft_version() {
        assert_eq!(required_java_for_minecraft_version("1.8.8"), 8);
        assert_eq!(required_java_for_minecraft_version("1.12.2"), 8);
        assert_eq!(required_java_for_minecraft_version("1.16.5"), 11);
        assert_eq!(required_java_for_minecraft_version("1.17"), 16);
        assert_eq!(required_java_for_minecraft_version("1.17.1"), 16);
        assert_eq!(required_java_for_minecraft_version("1.18.2"), 17);
        assert_eq!(required_java_for_minecraft_version("1.19.4"), 17);
        assert_eq!(required_java_for_minecraft_version("1.20.4"), 17);
        assert_eq!(required_java_for_minecraft_version("1.20.5"), 21);
        assert_eq!(required_java_for_minecraft_version("1.21"), 21);
        assert_eq!(required_java_for_minecraft_version("1.21.5"), 21);
    }

    #[test]
    fn malformed_versions_default_to_zero_components() {
        assert_eq!(parse_game_version("1.20"), (1, 20, 0));
        assert_eq!(parse_game_version("1.x.4"), (1, 0, 4));
        assert_eq!(parse_game_version("1.21-pre1"), (1, 21, 0));
        assert_eq!(parse_game_version(""), (0, 0, 0));
        // 1.x with a garbage minor falls into the oldest bucket.
        assert_eq!(required_java_for_minecraft_version("1.x"), 8);
        assert_eq!(required_java_for_minecraft_version("snapshot"), 21);
    }

    #[test]
    fn parses_modern_and_legacy_version_output() {
        let modern = "openjdk version \"17.0.8\" 2023-07-18\nOpenJDK Runtime Environment";
        assert_eq!(parse_java_major(modern), Some(17));

        let legacy = "java version \"1.8.0_392\"\nJava(TM) SE Runtime Environment";
        assert_eq!(parse_java_major(legacy), Some(8));

        assert_eq!(parse_java_major("openjdk version \"21\" 2023-09-19"), Some(21));
        assert_eq!(parse_java_major("openjdk version \"22-ea\" 2024-03-19"), Some(22));
        assert_eq!(parse_java_major("Picked up _JAVA_OPTIONS\nopenjdk version \"11.0.2\""), Some(11));
        assert_eq!(parse_java_major("command not found"), None);
        assert_eq!(parse_java_major("openjdk version \"abc\""), None);
    }

    #[test]
    fn selection_prefers_closest_above() {
        let candidates = [
            install("/jvm/8", 8),
            install("/jvm/11", 11),
            install("/jvm/17", 17),
            install("/jvm/21", 21),
        ];
        assert_eq!(select_runtime(&candidates, 16).unwrap().major, 17);
    }

    #[test]
    fn selection_falls_back_to_newest_available() {
        let candidates = [install("/jvm/8", 8), install("/jvm/17", 17), install("/jvm/11", 11)];
        assert_eq!(select_runtime(&candidates, 21).unwrap().major, 17);
    }

    #[test]
    fn selection_prefers_exact_match() {
        let candidates = [install("/jvm/17", 17), install("/jvm/11", 11)];
        let selected = select_runtime(&candidates, 11).unwrap();
        assert_eq!(selected.path, PathBuf::from("/jvm/11"));
    }

    #[test]
    fn selection_without_candidates() {
        assert!(select_runtime(&[], 17).is_none());
    }

    #[cfg(unix)]
    fn fake_java(dir: &Path, version_line: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let bin = dir.join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let exe = bin.join("java");
        std::fs::write(&exe, format!("#!/bin/sh\necho '{version_line}' >&2\n")).unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();
        exe
    }

    #[cfg(unix)]
    #[test]
    fn walk_respects_depth_limit() {
        let root = tempfile::tempdir().unwrap();
        let shallow = fake_java(&root.path().join("jdk-17"), "openjdk version \"17\"");
        let at_limit = fake_java(
            &root.path().join("a").join("b").join("jdk-11"),
            "openjdk version \"11\"",
        );
        fake_java(
            &root.path().join("a").join("b").join("c").join("jdk-8"),
            "java version \"1.8.0_392\"",
        );

        let mut found = walk_for_java(root.path(), 3);
        found.sort();
        let mut expected = vec![shallow, at_limit];
        expected.sort();
        assert_eq!(found, expected);
    }

    #[cfg(unix)]
    #[test]
    fn locator_discovers_and_dedupes_runtimes() {
        let root = tempfile::tempdir().unwrap();
        let jdk17 = fake_java(&root.path().join("jdk-17"), "openjdk version \"17.0.8\"");
        fake_java(&root.path().join("jdk-11"), "openjdk version \"11.0.2\"");
        let broken = root.path().join("broken").join("bin");
        std::fs::create_dir_all(&broken).unwrap();
        std::fs::write(broken.join("java"), "not executable").unwrap();

        // The same JDK reachable through PATH must be reported once.
        let locator = JavaLocator::new(
            vec![root.path().to_path_buf()],
            vec![jdk17.parent().unwrap().to_path_buf()],
        );
        let mut majors: Vec<u32> = locator.discover().iter().map(|j| j.major).collect();
        majors.sort();
        assert_eq!(majors, vec![11, 17]);

        assert_eq!(locator.find_runtime("1.18.2").unwrap().major, 17);
        assert_eq!(locator.find_runtime("1.16.5").unwrap().major, 11);
        // Nothing >= 21 installed: newest available wins.
        assert_eq!(locator.find_runtime("1.21").unwrap().major, 17);
    }

    #[tokio::test]
    async fn require_runtime_names_missing_major() {
        let empty = tempfile::tempdir().unwrap();
        let locator = JavaLocator::new(vec![empty.path().to_path_buf()], Vec::new());
        let err = locator.require_runtime("1.20.5").await.unwrap_err();
        assert!(matches!(err, SetupError::JavaNotFound(21)));
    }
}
