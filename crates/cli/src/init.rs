//! `uap init` -- lay out the platform directories and install the default
//! templates and assets.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::render::templates::{bundled_template, ACTIONS_SCRIPT, STYLESHEET};
use crate::render::Page;

#[derive(Debug, thiserror::Error)]
#[error("could not write '{}': {source}", path.display())]
pub(crate) struct InitError {
    path: PathBuf,
    #[source]
    source: std::io::Error,
}

/// Files installed and files left alone because they already existed.
#[derive(Debug, Default)]
pub(crate) struct InitReport {
    pub(crate) written: Vec<PathBuf>,
    pub(crate) kept: Vec<PathBuf>,
}

fn create_dir(path: &Path) -> Result<(), InitError> {
    fs::create_dir_all(path).map_err(|source| InitError {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `content` unless the file exists. Existing files are never
/// overwritten, so local template edits survive a re-run.
fn install(path: PathBuf, content: &str, report: &mut InitReport) -> Result<(), InitError> {
    let file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path);
    match file {
        Ok(mut file) => {
            file.write_all(content.as_bytes()).map_err(|source| InitError {
                path: path.clone(),
                source,
            })?;
            tracing::info!(path = %path.display(), "installed");
            report.written.push(path);
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            tracing::debug!(path = %path.display(), "exists, kept");
            report.kept.push(path);
        }
        Err(source) => return Err(InitError { path, source }),
    }
    Ok(())
}

pub(crate) fn run(config: &Config) -> Result<InitReport, InitError> {
    create_dir(&config.state.data_dir)?;
    create_dir(&config.state.backup_dir)?;
    create_dir(&config.template_dir)?;
    create_dir(&config.static_dir)?;
    if let Some(log_dir) = &config.log_dir {
        create_dir(log_dir)?;
    }

    let mut report = InitReport::default();
    for page in Page::ALL {
        let path = config.template_dir.join(format!("{}.html", page.name()));
        install(path, bundled_template(page), &mut report)?;
    }
    install(config.static_dir.join("style.css"), STYLESHEET, &mut report)?;
    install(config.static_dir.join("actions.js"), ACTIONS_SCRIPT, &mut report)?;

    Ok(report)
}
