//! Character diff of a spelling correction, rendered to an SVG file.

use anyhow::{Context, Result};
use similar::{ChangeTag, TextDiff};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::OnceCell;
use tracing::{debug, info};

pub const SVG_WIDTH: u32 = 520;
pub const SVG_HEIGHT: u32 = 200;

const PADDING_TOP: f64 = 10.0;
/// Advance of one monospace glyph relative to the font size
const GLYPH_WIDTH: f64 = 0.6;

const ADDED_COLOR: &str = "#7AA874";
const ADDED_BACKGROUND: &str = "#7AA87430";
const REMOVED_COLOR: &str = "#F96666";
const REMOVED_BACKGROUND: &str = "#F9666620";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Equal,
    Added,
    Removed,
}

/// A run of characters sharing one diff status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSpan {
    pub kind: SpanKind,
    pub text: String,
}

/// Character-level diff, with consecutive changes of the same kind merged.
pub fn char_diff(original: &str, corrected: &str) -> Vec<DiffSpan> {
    let diff = TextDiff::from_chars(original, corrected);
    let mut spans: Vec<DiffSpan> = Vec::new();

    for change in diff.iter_all_changes() {
        let kind = match change.tag() {
            ChangeTag::Equal => SpanKind::Equal,
            ChangeTag::Insert => SpanKind::Added,
            ChangeTag::Delete => SpanKind::Removed,
        };
        match spans.last_mut() {
            Some(last) if last.kind == kind => last.text.push_str(change.value()),
            _ => spans.push(DiffSpan {
                kind,
                text: change.value().to_string(),
            }),
        }
    }

    spans.retain(|span| !span.text.is_empty());
    spans
}

/// Font size shrinks for longer corrections so they fit the fixed canvas.
pub fn font_size(corrected: &str) -> u32 {
    match corrected.chars().count() {
        n if n > 24 => 18,
        n if n > 15 => 35,
        _ => 50,
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Render spans on one line: a background box per changed span, then the text.
pub fn render_svg(spans: &[DiffSpan], corrected: &str, foreground: &str) -> String {
    let size = font_size(corrected) as f64;
    let advance = size * GLYPH_WIDTH;
    let baseline = PADDING_TOP + size;

    let mut backgrounds = String::new();
    let mut text = String::new();
    let mut x = 0.0;

    for span in spans {
        let width = span.text.chars().count() as f64 * advance;
        let (color, background) = match span.kind {
            SpanKind::Added => (ADDED_COLOR, Some(ADDED_BACKGROUND)),
            SpanKind::Removed => (REMOVED_COLOR, Some(REMOVED_BACKGROUND)),
            SpanKind::Equal => (foreground, None),
        };

        if let Some(background) = background {
            let _ = write!(
                backgrounds,
                r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
                x,
                PADDING_TOP,
                width,
                size * 1.2,
                background
            );
        }
        let _ = write!(
            text,
            r#"<tspan x="{:.1}" fill="{}">{}</tspan>"#,
            x,
            color,
            escape_xml(&span.text)
        );
        x += width;
    }

    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            "{backgrounds}",
            r#"<text y="{baseline:.1}" font-family="Roboto Mono, monospace" font-size="{size}" xml:space="preserve">{text}</text>"#,
            "</svg>"
        ),
        w = SVG_WIDTH,
        h = SVG_HEIGHT,
        backgrounds = backgrounds,
        baseline = baseline,
        size = size,
        text = text,
    )
}

/// Color of unchanged characters in rendered images (dark theme).
const FOREGROUND: &str = "white";

/// Whether `path` is a diff image this renderer writes (`<32 hex>.svg`).
fn is_rendered_image(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "svg")
        && path.file_stem().and_then(|stem| stem.to_str()).is_some_and(|stem| {
            stem.len() == 32 && stem.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        })
}

/// Renders diff images into a directory and remembers them per text pair.
///
/// Diff images left in the directory by an earlier run are deleted on first
/// use. Other files, including other SVGs, are left alone.
pub struct DiffRenderer {
    dir: PathBuf,
    rendered: Mutex<HashMap<(String, String), PathBuf>>,
    cleaned: OnceCell<()>,
}

impl DiffRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            rendered: Mutex::new(HashMap::new()),
            cleaned: OnceCell::new(),
        }
    }

    fn lookup(&self, key: &(String, String)) -> Option<PathBuf> {
        self.rendered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    async fn remove_stale(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create diff directory {}", self.dir.display()))?;

        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("Failed to read diff directory {}", self.dir.display()))?;

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if is_rendered_image(&path) {
                tokio::fs::remove_file(&path)
                    .await
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
                removed += 1;
            }
        }

        if removed > 0 {
            info!("Removed {} stale diff image(s) from {}", removed, self.dir.display());
        }
        Ok(())
    }

    /// Path to an SVG showing how `original` became `corrected`.
    pub async fn get_diff_svg(&self, original: &str, corrected: &str) -> Result<PathBuf> {
        let key = (original.to_string(), corrected.to_string());
        if let Some(path) = self.lookup(&key) {
            return Ok(path);
        }

        self.cleaned.get_or_try_init(|| self.remove_stale()).await?;

        let spans = char_diff(original, corrected);
        let svg = render_svg(&spans, corrected, FOREGROUND);

        let path = self.dir.join(format!("{}.svg", uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&path, svg)
            .await
            .with_context(|| format!("Failed to write diff image {}", path.display()))?;
        debug!("Rendered diff image {}", path.display());

        // A concurrent call for the same pair may have finished first; keep its file
        let mut rendered = self
            .rendered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(rendered.entry(key).or_insert(path).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn span(kind: SpanKind, text: &str) -> DiffSpan {
        DiffSpan {
            kind,
            text: text.to_string(),
        }
    }

    // ==================== char_diff Tests ====================

    #[test]
    fn test_char_diff_identical() {
        assert_eq!(char_diff("hello", "hello"), vec![span(SpanKind::Equal, "hello")]);
    }

    #[test]
    fn test_char_diff_insertion() {
        assert_eq!(
            char_diff("helo", "hello"),
            vec![
                span(SpanKind::Equal, "hel"),
                span(SpanKind::Added, "l"),
                span(SpanKind::Equal, "o"),
            ]
        );
    }

    #[test]
    fn test_char_diff_replacement_has_both_kinds() {
        let spans = char_diff("cat", "cut");
        assert!(spans.iter().any(|s| s.kind == SpanKind::Removed && s.text == "a"));
        assert!(spans.iter().any(|s| s.kind == SpanKind::Added && s.text == "u"));
    }

    #[test]
    fn test_char_diff_rebuilds_both_sides() {
        let spans = char_diff("recieve teh", "receive the");
        let original: String = spans
            .iter()
            .filter(|s| s.kind != SpanKind::Added)
            .map(|s| s.text.as_str())
            .collect();
        let corrected: String = spans
            .iter()
            .filter(|s| s.kind != SpanKind::Removed)
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(original, "recieve teh");
        assert_eq!(corrected, "receive the");
    }

    // ==================== Rendering Tests ====================

    #[test]
    fn test_font_size_thresholds() {
        assert_eq!(font_size("short"), 50);
        assert_eq!(font_size(&"a".repeat(15)), 50);
        assert_eq!(font_size(&"a".repeat(16)), 35);
        assert_eq!(font_size(&"a".repeat(24)), 35);
        assert_eq!(font_size(&"a".repeat(25)), 18);
    }

    #[test]
    fn test_render_svg_styles_spans() {
        let svg = render_svg(&char_diff("helo", "hello"), "hello", "white");

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="520""#));
        assert!(svg.contains(r#"height="200""#));
        assert!(svg.contains(r##"fill="#7AA874">l</tspan>"##));
        assert!(svg.contains(r##"fill="#7AA87430""##));
        assert!(svg.contains(r#"fill="white">hel</tspan>"#));
        assert!(svg.contains(r#"font-size="50""#));
        assert!(!svg.contains("#F96666"));
    }

    #[test]
    fn test_render_svg_escapes_markup() {
        let svg = render_svg(&char_diff("a<b", "a&b"), "a&b", "white");
        assert!(svg.contains("&lt;"));
        assert!(svg.contains("&amp;"));
        assert!(!svg.contains("<b"));
    }

    // ==================== DiffRenderer Tests ====================

    #[tokio::test]
    async fn test_get_diff_svg_writes_file() {
        let dir = TempDir::new().unwrap();
        let renderer = DiffRenderer::new(dir.path().join("diffs"));

        let path = renderer.get_diff_svg("helo", "hello").await.unwrap();

        assert!(path.starts_with(dir.path().join("diffs")));
        assert_eq!(path.extension().unwrap(), "svg");
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("#7AA874"));
    }

    #[tokio::test]
    async fn test_get_diff_svg_is_memoized() {
        let dir = TempDir::new().unwrap();
        let renderer = DiffRenderer::new(dir.path());

        let first = renderer.get_diff_svg("teh", "the").await.unwrap();
        let second = renderer.get_diff_svg("teh", "the").await.unwrap();
        let other = renderer.get_diff_svg("teh", "tea").await.unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
        let files = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 2);
    }

    #[tokio::test]
    async fn test_stale_images_removed_on_first_use() {
        let dir = TempDir::new().unwrap();
        let stale = dir.path().join("0123456789abcdef0123456789abcdef.svg");
        let unrelated = dir.path().join("notes.txt");
        std::fs::write(&stale, "<svg/>").unwrap();
        std::fs::write(&unrelated, "keep me").unwrap();

        let renderer = DiffRenderer::new(dir.path());
        let fresh = renderer.get_diff_svg("a", "b").await.unwrap();

        assert!(!stale.exists());
        assert!(unrelated.exists());
        assert!(fresh.exists());

        // Cleanup happens once: later renders keep earlier files
        let later = renderer.get_diff_svg("c", "d").await.unwrap();
        assert!(fresh.exists());
        assert!(later.exists());
    }

    #[tokio::test]
    async fn test_cleanup_keeps_foreign_svgs() {
        let dir = TempDir::new().unwrap();
        let logo = dir.path().join("logo.svg");
        let upper = dir.path().join("0123456789ABCDEF0123456789ABCDEF.svg");
        let short = dir.path().join("deadbeef.svg");
        for file in [&logo, &upper, &short] {
            std::fs::write(file, "<svg/>").unwrap();
        }

        let renderer = DiffRenderer::new(dir.path());
        renderer.get_diff_svg("helo", "hello").await.unwrap();

        assert!(logo.exists());
        assert!(upper.exists());
        assert!(short.exists());
    }

    #[test]
    fn test_is_rendered_image() {
        let name = format!("{}.svg", uuid::Uuid::new_v4().simple());
        assert!(is_rendered_image(Path::new(&name)));
        assert!(!is_rendered_image(Path::new("logo.svg")));
        assert!(!is_rendered_image(Path::new("0123456789abcdef0123456789abcdef.png")));
        assert!(!is_rendered_image(Path::new("0123456789abcdef0123456789abcdeg.svg")));
    }

    #[tokio::test]
    async fn test_unwritable_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, "").unwrap();

        let renderer = DiffRenderer::new(&file);
        assert!(renderer.get_diff_svg("a", "b").await.is_err());
    }
}
