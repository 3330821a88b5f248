use std::path::{Path, PathBuf};

use tracing::warn;
use url::Url;
use walkdir::WalkDir;

use crate::config::IntakeSettings;

use super::model::RawFile;

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn raw_file(path: &Path) -> Option<RawFile> {
    match path.metadata() {
        Ok(meta) => Some(RawFile::from_path(path.to_path_buf(), meta.len())),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read file metadata");
            None
        }
    }
}

/// Walk one folder, returning every regular file as a candidate.
fn scan_dir(dir: &Path, settings: &IntakeSettings, out: &mut Vec<RawFile>) {
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() && (settings.include_hidden || !is_hidden(path)) {
            if let Some(raw) = raw_file(path) {
                out.push(raw);
            }
        }
    }
}

/// Turn user-selected paths into intake candidates.
///
/// Files are taken as-is (hidden or not, the user picked them); folders are
/// walked according to `settings`.
pub fn collect_raw_files(paths: &[PathBuf], settings: &IntakeSettings) -> Vec<RawFile> {
    let mut out: Vec<RawFile> = Vec::new();
    for path in paths {
        if path.is_dir() {
            scan_dir(path, settings, &mut out);
        } else if path.is_file() {
            if let Some(raw) = raw_file(path) {
                out.push(raw);
            }
        } else {
            warn!(path = %path.display(), "no such file or folder");
        }
    }
    out
}

fn unquote(s: &str) -> &str {
    for q in ['\'', '"'] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Split text pasted into the terminal (a drag-and-drop, usually) into paths.
///
/// Terminals differ: some paste one quoted path per line, some a single line
/// of backslash-escaped paths separated by spaces, some `file://` URIs.
pub fn parse_dropped_paths(text: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let unquoted = unquote(line);
        if unquoted.len() != line.len() {
            paths.push(dropped_path(unquoted));
            continue;
        }
        let whole = dropped_path(line);
        if whole.exists() {
            paths.push(whole);
            continue;
        }

        // Unquoted: split on spaces that are not backslash-escaped.
        let mut current = String::new();
        let mut chars = line.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                }
                ' ' => {
                    if !current.is_empty() {
                        paths.push(dropped_path(&current));
                        current.clear();
                    }
                }
                _ => current.push(c),
            }
        }
        if !current.is_empty() {
            paths.push(dropped_path(&current));
        }
    }

    paths
}

/// `file:` URLs are percent-decoded into a local path; anything else is
/// taken literally.
fn dropped_path(s: &str) -> PathBuf {
    match Url::parse(s) {
        Ok(url) if url.scheme() == "file" => url.to_file_path().unwrap_or_else(|()| {
            warn!(url = s, "file URL does not name a local path");
            PathBuf::from(s)
        }),
        _ => PathBuf::from(s),
    }
}
