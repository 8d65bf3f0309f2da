use std::path::{Path, PathBuf};
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, error, warn};

/// Spelling correction through an external checker.
///
/// The checker is invoked as `<binary> <text>`, or `<runtime> <script> <text>`
/// when a runtime is configured, and must print the corrected text on stdout.
/// Failures are never fatal: the original text comes back unchanged.
pub struct Spellchecker {
    program: Option<PathBuf>,
    runtime: Option<String>,
    prepared: OnceCell<()>,
}

impl Spellchecker {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: Some(program.into()),
            runtime: None,
            prepared: OnceCell::new(),
        }
    }

    /// Run `program` as a script through `runtime` (e.g. `node`, `python3`).
    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = Some(runtime.into());
        self
    }

    /// A checker that never suggests anything.
    pub fn disabled() -> Self {
        Self {
            program: None,
            runtime: None,
            prepared: OnceCell::new(),
        }
    }

    pub fn from_options(program: Option<PathBuf>, runtime: Option<String>) -> Self {
        match (program, runtime) {
            (Some(program), Some(runtime)) => Self::new(program).with_runtime(runtime),
            (Some(program), None) => Self::new(program),
            (None, _) => Self::disabled(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.program.is_some()
    }

    /// Return the corrected text, or `text` itself when there is no
    /// correction or the checker failed.
    pub async fn correct_spelling(&self, text: &str) -> String {
        let Some(program) = &self.program else {
            return text.to_string();
        };
        if text.is_empty() {
            return String::new();
        }

        self.prepared
            .get_or_init(|| async {
                // Bundled assets may lose their execute bit when copied
                if let Err(e) = ensure_executable(program).await {
                    warn!("Could not mark {} executable: {}", program.display(), e);
                }
            })
            .await;

        let mut command = match &self.runtime {
            Some(runtime) => {
                let mut command = Command::new(runtime);
                command.arg(program);
                command
            }
            None => Command::new(program),
        };

        let output = match command.arg(text).kill_on_drop(true).output().await {
            Ok(output) => output,
            Err(e) => {
                error!("Spellcheck failed to start {}: {}", program.display(), e);
                return text.to_string();
            }
        };

        if !output.status.success() {
            error!(
                "Spellcheck exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return text.to_string();
        }

        match String::from_utf8(output.stdout) {
            Ok(stdout) => {
                let corrected = stdout.strip_suffix('\n').unwrap_or(&stdout);
                let corrected = corrected.strip_suffix('\r').unwrap_or(corrected);
                debug!("Spellcheck returned {} chars", corrected.len());
                corrected.to_string()
            }
            Err(e) => {
                error!("Spellcheck printed invalid UTF-8: {}", e);
                text.to_string()
            }
        }
    }
}

/// Add the 0755 bits to the checker unless everyone may already execute it.
#[cfg(unix)]
pub async fn ensure_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = tokio::fs::metadata(path).await?.permissions();
    let mode = permissions.mode();
    if mode & 0o111 != 0o111 {
        permissions.set_mode(mode | 0o755);
        tokio::fs::set_permissions(path, permissions).await?;
    }
    Ok(())
}

#[cfg(not(unix))]
pub async fn ensure_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// Write a shell script without the execute bit, like a freshly copied asset.
    fn write_script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("Failed to write script");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644))
            .expect("Failed to set permissions");
        path
    }

    // Scripts are exec'd right after being written; serialize to avoid ETXTBSY
    #[tokio::test]
    #[serial]
    async fn test_correct_spelling_returns_stdout() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "fix", r#"echo "$1" | sed 's/teh/the/g'"#);

        let checker = Spellchecker::new(&script);
        let corrected = checker.correct_spelling("teh cat and teh dog").await;

        assert_eq!(corrected, "the cat and the dog");
    }

    #[tokio::test]
    #[serial]
    async fn test_correct_spelling_marks_binary_executable() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "echo", r#"echo "$1""#);

        Spellchecker::new(&script).correct_spelling("hello").await;

        let mode = std::fs::metadata(&script).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[tokio::test]
    async fn test_ensure_executable_only_adds_bits() {
        let dir = TempDir::new().unwrap();
        let group_writable = dir.path().join("shared");
        let private = dir.path().join("private");
        std::fs::write(&group_writable, "").unwrap();
        std::fs::write(&private, "").unwrap();
        std::fs::set_permissions(&group_writable, std::fs::Permissions::from_mode(0o775)).unwrap();
        std::fs::set_permissions(&private, std::fs::Permissions::from_mode(0o700)).unwrap();

        ensure_executable(&group_writable).await.unwrap();
        ensure_executable(&private).await.unwrap();

        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&group_writable), 0o775);
        assert_eq!(mode(&private), 0o755);
    }

    #[tokio::test]
    #[serial]
    async fn test_correct_spelling_through_runtime() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "fix.sh", r#"printf '%s' "$1" | tr 'a-z' 'A-Z'"#);

        let checker = Spellchecker::new(&script).with_runtime("sh");
        assert_eq!(checker.correct_spelling("shout").await, "SHOUT");
    }

    #[tokio::test]
    #[serial]
    async fn test_non_zero_exit_returns_original() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "broken", "echo oops >&2\nexit 3");

        let checker = Spellchecker::new(&script);
        assert_eq!(checker.correct_spelling("speling").await, "speling");
    }

    #[tokio::test]
    async fn test_missing_binary_returns_original() {
        let checker = Spellchecker::new("/nonexistent/spellcheck");
        assert_eq!(checker.correct_spelling("speling").await, "speling");
    }

    #[tokio::test]
    async fn test_disabled_returns_original() {
        let checker = Spellchecker::from_options(None, Some("node".to_string()));
        assert!(!checker.is_enabled());
        assert_eq!(checker.correct_spelling("speling").await, "speling");
    }

    #[tokio::test]
    async fn test_empty_text_skips_process() {
        let checker = Spellchecker::new("/nonexistent/spellcheck");
        assert_eq!(checker.correct_spelling("").await, "");
    }
}
