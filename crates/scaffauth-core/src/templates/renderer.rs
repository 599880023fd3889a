//! Template tree rendering
//!
//! Walks a template directory depth-first and mirrors it into the target:
//! directories are recreated, `.hbs` files are rendered through Handlebars
//! with the suffix stripped, everything else is copied byte for byte.

use super::context::TemplateContext;
use super::helpers::TemplateHelpers;
use crate::error::RenderError;
use handlebars::Handlebars;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Filename suffix marking a file for variable substitution
pub const TEMPLATE_SUFFIX: &str = ".hbs";

/// What a render call produced, as paths relative to the target root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub rendered: Vec<PathBuf>,
    pub copied: Vec<PathBuf>,
    pub directories: Vec<PathBuf>,
}

impl RenderReport {
    pub fn file_count(&self) -> usize {
        self.rendered.len() + self.copied.len()
    }
}

/// Destination file name for a template entry
fn destination_name(name: &str) -> &str {
    name.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(name)
}

fn walk_error(err: walkdir::Error, root: &Path) -> RenderError {
    let path = err.path().unwrap_or(root).to_path_buf();
    RenderError::Read {
        path,
        source: io::Error::from(err),
    }
}

/// Render `template_root` into `target_root`.
///
/// A missing `template_root` fails with a `NotFound` read error rather than
/// producing an empty project.
pub async fn render(
    template_root: &Path,
    target_root: &Path,
    context: &TemplateContext,
    helpers: &TemplateHelpers,
) -> Result<RenderReport, RenderError> {
    let mut registry = Handlebars::new();
    registry.register_escape_fn(handlebars::no_escape);
    helpers.install(&mut registry);

    let mut report = RenderReport::default();

    // Read the template root before touching the target so an unknown
    // combination leaves no empty project directory behind.
    fs::metadata(template_root)
        .await
        .map_err(|source| RenderError::Read {
            path: template_root.to_path_buf(),
            source,
        })?;

    fs::create_dir_all(target_root)
        .await
        .map_err(|source| RenderError::Write {
            path: target_root.to_path_buf(),
            source,
        })?;

    let walker = WalkDir::new(template_root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();

    for entry in walker {
        let entry = entry.map_err(|e| walk_error(e, template_root))?;
        let relative = entry
            .path()
            .strip_prefix(template_root)
            .unwrap_or(entry.path());

        if entry.file_type().is_dir() {
            let dest = target_root.join(relative);
            fs::create_dir_all(&dest)
                .await
                .map_err(|source| RenderError::Write {
                    path: dest.clone(),
                    source,
                })?;
            report.directories.push(relative.to_path_buf());
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        let dest_relative = relative.with_file_name(destination_name(&file_name));
        let dest = target_root.join(&dest_relative);

        if file_name.ends_with(TEMPLATE_SUFFIX) {
            render_file(&registry, entry.path(), &dest, context).await?;
            tracing::debug!(source = %relative.display(), "rendered template");
            report.rendered.push(dest_relative);
        } else {
            fs::copy(entry.path(), &dest)
                .await
                .map_err(|source| RenderError::Write {
                    path: dest.clone(),
                    source,
                })?;
            report.copied.push(dest_relative);
        }
    }

    Ok(report)
}

async fn render_file(
    registry: &Handlebars<'_>,
    source_path: &Path,
    dest: &Path,
    context: &TemplateContext,
) -> Result<(), RenderError> {
    let content = fs::read_to_string(source_path)
        .await
        .map_err(|source| RenderError::Read {
            path: source_path.to_path_buf(),
            source,
        })?;

    let rendered =
        registry
            .render_template(&content, context)
            .map_err(|source| RenderError::Template {
                path: source_path.to_path_buf(),
                source,
            })?;

    fs::write(dest, rendered)
        .await
        .map_err(|source| RenderError::Write {
            path: dest.to_path_buf(),
            source,
        })
}
