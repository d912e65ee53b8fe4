//! Asset staging: the HTML shell copy that precedes every build.
//!
//! Copies the shell entry file into the output directory preserving its
//! name, and in watch mode injects the reload client script tag and writes
//! the client next to it. Any failure here is fatal and prevents all later
//! phases.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::debug;
use crate::embed;
use crate::sequencer::SequencerError;

/// Copy the HTML shell into the output directory.
///
/// Returns the destination path. The file name is preserved; when
/// `inject_reload` is set, the reload client script tag is injected before
/// `</body>` (or appended when no closing tag exists) and the client
/// script is written alongside.
pub fn stage_shell(config: &AppConfig, inject_reload: bool) -> Result<PathBuf, SequencerError> {
    let source = config.shell_entry_source();
    let staging_err = |e| SequencerError::Staging(source.clone(), e);

    let file_name = source
        .file_name()
        .ok_or_else(|| {
            staging_err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "shell entry has no file name",
            ))
        })?
        .to_owned();

    fs::create_dir_all(&config.build.output)
        .map_err(|e| SequencerError::Staging(config.build.output.clone(), e))?;

    let html = fs::read_to_string(&source).map_err(staging_err)?;
    let dest = config.build.output.join(file_name);

    let html = if inject_reload {
        embed::write_reload_client(&config.build.output, config.serve.port)
            .map_err(|e| SequencerError::Staging(config.build.output.clone(), e))?;
        inject_script_tag(&html, embed::RELOAD_JS_NAME)
    } else {
        html
    };

    fs::write(&dest, html).map_err(|e| SequencerError::Staging(dest.clone(), e))?;
    debug!("stage"; "{} -> {}", config.root_relative(&source).display(), dest.display());

    Ok(dest)
}

/// Insert a script tag before `</body>`, or append when no closing tag
/// exists (malformed shells still get a working client).
fn inject_script_tag(html: &str, src: &str) -> String {
    let tag = format!("<script src=\"{src}\"></script>");
    if html.contains(&tag) {
        return html.to_string();
    }

    match find_case_insensitive(html, "</body>") {
        Some(pos) => {
            let mut out = String::with_capacity(html.len() + tag.len() + 1);
            out.push_str(&html[..pos]);
            out.push_str(&tag);
            out.push('\n');
            out.push_str(&html[pos..]);
            out
        }
        None => format!("{html}\n{tag}\n"),
    }
}

/// Byte position of the first case-insensitive occurrence of `needle`.
fn find_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .to_ascii_lowercase()
        .find(&needle.to_ascii_lowercase())
}

/// Whether a changed path is the shell entry source.
pub fn is_shell_entry(config: &AppConfig, path: &Path) -> bool {
    path == config.shell_entry_source()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> AppConfig {
        let mut config = test_parse_config("");
        config.root = dir.path().to_path_buf();
        config.build.home = dir.path().join("src");
        config.build.output = dir.path().join("out");
        config
    }

    #[test]
    fn test_stage_shell_preserves_name() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        fs::create_dir_all(config.build.home.join("app")).unwrap();
        fs::write(
            config.shell_entry_source(),
            "<html><body></body></html>",
        )
        .unwrap();

        let dest = stage_shell(&config, false).unwrap();

        assert_eq!(dest, config.build.output.join("index.html"));
        assert!(dest.exists());
        assert_eq!(
            fs::read_to_string(dest).unwrap(),
            "<html><body></body></html>"
        );
    }

    #[test]
    fn test_stage_shell_missing_source() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        let err = stage_shell(&config, false).unwrap_err();
        assert!(matches!(err, SequencerError::Staging(..)));
    }

    #[test]
    fn test_stage_shell_injects_reload_client() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        fs::create_dir_all(config.build.home.join("app")).unwrap();
        fs::write(
            config.shell_entry_source(),
            "<html><body><div id=\"root\"></div></BODY></html>",
        )
        .unwrap();

        let dest = stage_shell(&config, true).unwrap();

        let staged = fs::read_to_string(dest).unwrap();
        let tag_pos = staged.find("<script src=\"reload.js\">").unwrap();
        let body_pos = staged.find("</BODY>").unwrap();
        assert!(tag_pos < body_pos);
        assert!(config.build.output.join("reload.js").exists());
    }

    #[test]
    fn test_inject_without_body_tag() {
        let out = inject_script_tag("<p>bare</p>", "reload.js");
        assert!(out.contains("<script src=\"reload.js\"></script>"));
    }

    #[test]
    fn test_inject_idempotent() {
        let once = inject_script_tag("<body></body>", "reload.js");
        let twice = inject_script_tag(&once, "reload.js");
        assert_eq!(once.matches("reload.js").count(), twice.matches("reload.js").count());
    }

    #[test]
    fn test_is_shell_entry() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        assert!(is_shell_entry(&config, &config.shell_entry_source()));
        assert!(!is_shell_entry(
            &config,
            &config.build.home.join("app/main.ts")
        ));
    }
}
