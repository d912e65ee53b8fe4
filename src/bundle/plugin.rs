//! Transform plugins applied to bundle output.
//!
//! Two transforms exist:
//! - [`CssTransform`] - gathers stylesheets from the source tree, minifies
//!   them with lightningcss, and emits `<name>.css` next to the bundle
//! - [`AssetCopy`] - copies asset files (extension-filtered) into an
//!   `assets/` subfolder of the output tree and rewrites references in the
//!   emitted bundle text to resolve against that subfolder

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use regex::Regex;

use crate::utils::path::{has_extension, is_newer_than};
use crate::{debug, log};

/// Context handed to plugins after the bundler has emitted its output.
pub struct TransformContext<'a> {
    /// Source tree root.
    pub home: &'a Path,
    /// Output directory root.
    pub output_dir: &'a Path,
    /// The emitted bundle file (`out/<name>.js`).
    pub bundle_output: &'a Path,
    /// Ignore freshness checks and copy everything.
    pub clean: bool,
}

/// A named processing step applied to bundle contents.
#[derive(Debug, Clone)]
pub enum TransformPlugin {
    /// Stylesheet processing.
    Css(CssTransform),
    /// Asset copying with reference rewriting.
    CopyAssets(AssetCopy),
}

impl TransformPlugin {
    /// Stylesheet transform with default settings.
    pub fn css() -> Self {
        Self::Css(CssTransform)
    }

    /// Apply this transform.
    pub fn apply(&self, ctx: &TransformContext<'_>) -> Result<()> {
        match self {
            Self::Css(t) => t.apply(ctx),
            Self::CopyAssets(t) => t.apply(ctx),
        }
    }
}

// ============================================================================
// Stylesheet transform
// ============================================================================

/// Collects `.css` files under the source tree, concatenates them in path
/// order, minifies, and emits the result next to the bundle output.
#[derive(Debug, Clone, Copy)]
pub struct CssTransform;

impl CssTransform {
    pub fn apply(&self, ctx: &TransformContext<'_>) -> Result<()> {
        let sheets = collect_files(ctx.home, &["css"]);
        if sheets.is_empty() {
            return Ok(());
        }

        let mut combined = String::new();
        for sheet in &sheets {
            let source = fs::read_to_string(sheet)
                .with_context(|| format!("Failed to read stylesheet `{}`", sheet.display()))?;
            combined.push_str(&source);
            combined.push('\n');
        }

        let emitted = minify_css(&combined).unwrap_or(combined);
        let css_path = ctx.bundle_output.with_extension("css");
        fs::write(&css_path, emitted)
            .with_context(|| format!("Failed to write `{}`", css_path.display()))?;

        debug!("bundle"; "emitted {} ({} stylesheets)", css_path.display(), sheets.len());
        Ok(())
    }
}

/// Minify CSS source code.
///
/// Returns `None` when the stylesheet does not parse; callers fall back to
/// the unminified source so a bad stylesheet never breaks the build.
fn minify_css(source: &str) -> Option<String> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default()).ok()?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .ok()?;
    Some(result.code)
}

// ============================================================================
// Asset-copy transform
// ============================================================================

/// Copies asset files into a subfolder of the output tree and rewrites
/// references in emitted bundle text to resolve against it.
#[derive(Debug, Clone)]
pub struct AssetCopy {
    /// File extensions to copy (lowercase, without dot).
    pub extensions: Vec<String>,
    /// Destination subfolder under the output directory.
    pub dest: String,
    /// Prefix substituted into rewritten references.
    pub resolve: String,
}

impl AssetCopy {
    /// Asset-copy transform with the standard `assets/` destination.
    pub fn from_extensions(extensions: &[String]) -> Self {
        Self {
            extensions: extensions.to_vec(),
            dest: "assets".to_string(),
            resolve: "assets/".to_string(),
        }
    }

    pub fn apply(&self, ctx: &TransformContext<'_>) -> Result<()> {
        let exts: Vec<&str> = self.extensions.iter().map(String::as_str).collect();
        let sources = collect_files(ctx.home, &exts);
        if sources.is_empty() {
            return Ok(());
        }

        let dest_dir = ctx.output_dir.join(&self.dest);
        fs::create_dir_all(&dest_dir)
            .with_context(|| format!("Failed to create `{}`", dest_dir.display()))?;

        let mut names = Vec::new();
        let mut copied = 0usize;
        for source in &sources {
            let Some(file_name) = source.file_name() else {
                continue;
            };
            let dest = dest_dir.join(file_name);

            // mtime-incremental: skip fresh copies
            if ctx.clean || !dest.exists() || is_newer_than(source, &dest) {
                fs::copy(source, &dest).with_context(|| {
                    format!("Failed to copy `{}` to `{}`", source.display(), dest.display())
                })?;
                copied += 1;
            }
            names.push(file_name.to_string_lossy().into_owned());
        }

        if copied > 0 {
            log!("assets"; "copied {} file(s) to {}", copied, self.dest);
        }

        self.rewrite_emitted(ctx, &names)?;
        Ok(())
    }

    /// Rewrite references in the emitted bundle (and its stylesheet, when
    /// one exists) to resolve against the destination subfolder.
    fn rewrite_emitted(&self, ctx: &TransformContext<'_>, names: &[String]) -> Result<()> {
        for path in [
            ctx.bundle_output.to_path_buf(),
            ctx.bundle_output.with_extension("css"),
        ] {
            if !path.exists() {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            let (rewritten, count) = rewrite_references(&content, names, &self.resolve);
            if count > 0 {
                fs::write(&path, rewritten)?;
                debug!("assets"; "rewrote {} reference(s) in {}", count, path.display());
            }
        }
        Ok(())
    }
}

/// Rewrite bare references to `names` so they resolve against `resolve`.
///
/// Matches quoted tokens (`"logo.png"`, `'logo.png'`, optionally with a
/// leading `./`) and CSS `url(logo.png)` forms. Already-resolved
/// references are left alone because the quoted token must equal the bare
/// file name.
fn rewrite_references(content: &str, names: &[String], resolve: &str) -> (String, usize) {
    let mut out = content.to_string();
    let mut count = 0;

    for name in names {
        let escaped = regex::escape(name);

        let quoted = Regex::new(&format!(r#"(["'])(?:\./)?{escaped}(["'])"#))
            .expect("static reference pattern");
        let replaced = quoted
            .replace_all(&out, format!("${{1}}{resolve}{name}${{2}}"))
            .into_owned();
        if replaced != out {
            count += 1;
            out = replaced;
        }

        let url = Regex::new(&format!(r"url\(\s*(?:\./)?{escaped}\s*\)"))
            .expect("static url pattern");
        let replaced = url
            .replace_all(&out, format!("url({resolve}{name})"))
            .into_owned();
        if replaced != out {
            count += 1;
            out = replaced;
        }
    }

    (out, count)
}

// ============================================================================
// Helpers
// ============================================================================

/// Collect files under `root` whose extension matches, sorted by path for
/// deterministic ordering.
pub fn collect_files(root: &Path, exts: &[&str]) -> Vec<PathBuf> {
    if !root.exists() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = jwalk::WalkDir::new(root)
        .skip_hidden(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && has_extension(p, exts))
        .collect();
    files.sort();
    files
}

// ============================================================================
// Tests
// ============================================================================
