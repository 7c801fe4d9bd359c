//! `random.js` emitter
//!
//! The generated script lists every figure artifact and, when loaded in a
//! browser, points the page's `frame` element at one of them at random.
//! The figure directory is never cleaned, so the listing deliberately picks
//! up artifacts left by earlier runs.

use std::{fs, path::Path};

#[derive(thiserror::Error, Debug)]
pub enum SelectorError {
    #[error("Invalid artifact pattern")]
    Pattern(#[from] glob::PatternError),
    #[error("Failed to read an artifact directory entry")]
    Glob(#[from] glob::GlobError),
    #[error("Failed to write the selector script")]
    Io(#[from] std::io::Error),
}
type Result<T> = std::result::Result<T, SelectorError>;

/// Enumerates the `TIC*.html` artifacts of the figure directory, sorted
pub fn scan_artifacts<P: AsRef<Path>>(fig_dir: P) -> Result<Vec<String>> {
    let pattern = fig_dir.as_ref().join("TIC*.html");
    let mut links = Vec::new();
    for entry in glob::glob(&pattern.to_string_lossy())? {
        links.push(entry?.to_string_lossy().into_owned());
    }
    links.sort();
    Ok(links)
}

/// Renders the selector script for the given artifact paths
pub fn selector_script(links: &[String]) -> String {
    let mut script = String::from("    var links=new Array()\n");
    for (index, link) in links.iter().enumerate() {
        script.push_str(&format!("    links[{}]=\"data/{}\"\n", index, link));
    }
    script.push_str("\nvar myFrame = document.getElementsByClassName(\"frame\")[0];\n");
    script.push_str("function getRandomUrl(myFrame) {\n");
    script.push_str("  var index = Math.floor(Math.random() * links.length);\n");
    script.push_str("  var url = links[index];\n  myFrame.src = url;\n}\n\n");
    script.push_str("function codeAddress() {\n  getRandomUrl(myFrame);\n}\n\n");
    script.push_str("codeAddress();");
    script
}

/// Overwrites the selector script at `path` unconditionally
pub fn write_selector_script<P: AsRef<Path>>(path: P, links: &[String]) -> Result<()> {
    fs::write(path, selector_script(links))?;
    Ok(())
}
