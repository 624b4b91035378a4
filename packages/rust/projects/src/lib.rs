//! Projects ingestion pipeline: README + metadata → markdown page.
//!
//! For each declared project, fetches the README from the default branch
//! and repository metadata from the API, optionally downloads a banner,
//! and writes `<content_root>/projects/<slug>/index.md`. Every project is
//! processed independently; a skipped one never affects the next.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};
use url::Url;

use foliofetch_github::{GithubClient, RepoMetadata};
use foliofetch_shared::{FolioFetchError, PipelineSummary, ProjectSpec, Result};

/// The one branch the README is fetched from. Repositories still on a
/// legacy default branch are skipped.
const DEFAULT_BRANCH: &str = "main";

/// Frontmatter description when the API reports none.
const NO_DESCRIPTION: &str = "No description";

/// Banner path as referenced from an entry's `index.md`.
const BANNER_RELATIVE_PATH: &str = "./images/banner.png";

/// What happened to a single project.
enum EmitOutcome {
    Written,
    Skipped(String),
}

/// Run the projects pipeline, writing under `<content_root>/projects/`.
///
/// An empty project list is a silent no-op with no filesystem writes.
/// Output is a full overwrite: re-running with unchanged inputs yields
/// byte-identical files.
#[instrument(skip_all, fields(count = projects.len()))]
pub async fn run(
    projects: &[ProjectSpec],
    client: &GithubClient,
    content_root: &Path,
) -> Result<PipelineSummary> {
    let start = Instant::now();
    let mut summary = PipelineSummary::new("projects");

    if projects.is_empty() {
        info!("no projects declared, nothing to do");
        return Ok(summary);
    }

    let out_dir = content_root.join("projects");
    std::fs::create_dir_all(&out_dir).map_err(|e| FolioFetchError::io(&out_dir, e))?;

    for spec in projects {
        let slug = spec.slug();
        info!(%slug, repo = %spec.url, "processing project");

        match emit_project(spec, client, &out_dir, &slug).await {
            Ok(EmitOutcome::Written) => summary.record_processed(&slug),
            Ok(EmitOutcome::Skipped(reason)) => {
                warn!(%slug, reason, "skipping project");
                summary.record_skipped(&slug, reason);
            }
            Err(e) => {
                warn!(%slug, error = %e, "failed to emit project");
                summary.record_skipped(&slug, e.to_string());
            }
        }
    }

    summary.duration = start.elapsed();

    info!(
        processed = summary.processed(),
        skipped = summary.skipped(),
        duration_ms = summary.duration.as_millis(),
        "projects pipeline complete"
    );

    Ok(summary)
}

/// Emit one project page. Missing README or metadata skips the project
/// before anything touches the filesystem.
async fn emit_project(
    spec: &ProjectSpec,
    client: &GithubClient,
    out_dir: &Path,
    slug: &str,
) -> Result<EmitOutcome> {
    let Some(readme) = client.readme(&spec.url, DEFAULT_BRANCH).await else {
        return Ok(EmitOutcome::Skipped(format!(
            "no README found on {DEFAULT_BRANCH}"
        )));
    };

    let Some(meta) = client.repo_metadata(&spec.url).await else {
        return Ok(EmitOutcome::Skipped("repository metadata unavailable".into()));
    };

    let entry_dir = out_dir.join(slug);

    let banner_path = match &spec.banner {
        Some(src) if !src.is_empty() => {
            if download_banner(client, src, &entry_dir).await {
                BANNER_RELATIVE_PATH
            } else {
                ""
            }
        }
        _ => "",
    };

    let page = compose_page(spec, slug, &meta, &readme, banner_path);

    std::fs::create_dir_all(&entry_dir).map_err(|e| FolioFetchError::io(&entry_dir, e))?;
    let index = entry_dir.join("index.md");
    std::fs::write(&index, page).map_err(|e| FolioFetchError::io(&index, e))?;

    debug!(slug, banner = banner_path, "wrote project page");
    Ok(EmitOutcome::Written)
}

/// Download the declared banner into `<entry>/images/banner.png`.
///
/// Returns whether the file was written; every failure is logged and the
/// project ships without a banner.
async fn download_banner(client: &GithubClient, src: &str, entry_dir: &Path) -> bool {
    let url = match Url::parse(src) {
        Ok(u) => u,
        Err(e) => {
            warn!(src, error = %e, "invalid banner URL");
            return false;
        }
    };

    let Some(bytes) = client.fetch_bytes(url).await else {
        warn!(src, "failed to download banner");
        return false;
    };

    let images_dir = entry_dir.join("images");
    if let Err(e) = std::fs::create_dir_all(&images_dir) {
        warn!(path = %images_dir.display(), error = %e, "failed to create images directory");
        return false;
    }

    let file = images_dir.join("banner.png");
    if let Err(e) = std::fs::write(&file, &bytes) {
        warn!(path = %file.display(), error = %e, "failed to write banner");
        return false;
    }

    info!(path = %file.display(), "banner saved");
    true
}

/// Compose the full page: frontmatter plus the README body with its first
/// line stripped (the README's own title heading is redundant under the
/// frontmatter title).
fn compose_page(
    spec: &ProjectSpec,
    slug: &str,
    meta: &RepoMetadata,
    readme: &str,
    banner: &str,
) -> String {
    let title = spec
        .name
        .clone()
        .or_else(|| (!meta.name.is_empty()).then(|| meta.name.clone()))
        .unwrap_or_else(|| slug.to_string());

    let description = meta
        .description
        .as_deref()
        .filter(|d| !d.is_empty())
        .unwrap_or(NO_DESCRIPTION);

    let topics = meta.topics.join(", ");
    let banner_value = if banner.is_empty() { "\"\"" } else { banner };
    let body: String = readme.lines().skip(1).collect::<Vec<_>>().join("\n");

    format!(
        "---\n\
         title: \"{title}\"\n\
         description: \"{description}\"\n\
         url: \"{url}\"\n\
         updated: \"{updated}\"\n\
         topics: \"{topics}\"\n\
         banner: {banner_value}\n\
         ---\n\n\
         {body}\n",
        url = meta.html_url,
        updated = meta.updated_at,
    )
}
