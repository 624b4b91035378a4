//! Writeups ingestion pipeline: clone → scrub → rename → annotate.
//!
//! Clones the writeups repository into the content tree, strips VCS
//! metadata, renames every `README.md` to the generator's `index.md`
//! convention, then injects per-entry frontmatter. The clone is the one
//! hard dependency; everything after it degrades per entry.

mod banner;

pub use banner::{MIN_BANNER_WIDTH, ensure_min_width};

use std::path::{Path, PathBuf};
use std::time::Instant;

use tokio::process::Command;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use foliofetch_github::GithubClient;
use foliofetch_shared::{FolioFetchError, PipelineSummary, Result, WriteupsSource};

/// Banner path as referenced from an entry's `index.md`.
const BANNER_RELATIVE_PATH: &str = "./images/banner.png";

/// Run the writeups pipeline, writing under `<content_root>/writeups/`.
///
/// A clone failure is fatal and surfaces as [`FolioFetchError::Vcs`]; each
/// entry after that succeeds or is skipped independently, recorded in the
/// returned summary.
#[instrument(skip_all, fields(owner = %source.owner, repo = %source.repo))]
pub async fn run(
    source: &WriteupsSource,
    client: &GithubClient,
    content_root: &Path,
) -> Result<PipelineSummary> {
    let start = Instant::now();
    let dest = content_root.join("writeups");

    info!(url = %source.clone_url(), dest = %dest.display(), "cloning writeups repository");
    clone_writeups(&source.clone_url(), &dest).await?;

    scrub_clone(&dest)?;
    promote_readmes(&dest)?;

    let mut summary = annotate_entries(source, client, &dest).await?;
    summary.duration = start.elapsed();

    info!(
        processed = summary.processed(),
        skipped = summary.skipped(),
        duration_ms = summary.duration.as_millis(),
        "writeups pipeline complete"
    );

    Ok(summary)
}

/// Shallow-clone the writeups repository into `dest`.
///
/// Depth 1 — the site only needs the latest tree; per-folder history comes
/// from the commits API instead.
async fn clone_writeups(clone_url: &str, dest: &Path) -> Result<()> {
    let output = Command::new("git")
        .args(["clone", "--depth", "1", clone_url])
        .arg(dest)
        .output()
        .await
        .map_err(|e| FolioFetchError::Vcs(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(FolioFetchError::Vcs(format!(
            "git clone of {clone_url} failed ({}): {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(())
}

/// Remove VCS metadata and the repository's own top-level README so they do
/// not pollute the content tree. Missing paths are fine.
fn scrub_clone(dest: &Path) -> Result<()> {
    for dir in [".git", ".github"] {
        let path = dest.join(dir);
        if path.is_dir() {
            std::fs::remove_dir_all(&path).map_err(|e| FolioFetchError::io(&path, e))?;
        }
    }

    let readme = dest.join("README.md");
    if readme.is_file() {
        std::fs::remove_file(&readme).map_err(|e| FolioFetchError::io(&readme, e))?;
    }

    Ok(())
}

/// Rename every nested `README.md` to `index.md`, the static-site
/// generator's directory-index convention.
fn promote_readmes(dest: &Path) -> Result<()> {
    let readmes: Vec<PathBuf> = WalkDir::new(dest)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == "README.md")
        .map(|entry| entry.into_path())
        .collect();

    debug!(count = readmes.len(), "renaming README.md files to index.md");

    for readme in readmes {
        let target = readme.with_file_name("index.md");
        std::fs::rename(&readme, &target).map_err(|e| FolioFetchError::io(&readme, e))?;
    }

    Ok(())
}

/// Inject frontmatter into every top-level `*/index.md`.
///
/// Entries are visited in name order for deterministic output. One entry's
/// failure never aborts the rest.
async fn annotate_entries(
    source: &WriteupsSource,
    client: &GithubClient,
    dest: &Path,
) -> Result<PipelineSummary> {
    let mut summary = PipelineSummary::new("writeups");

    let mut entry_dirs: Vec<PathBuf> = std::fs::read_dir(dest)
        .map_err(|e| FolioFetchError::io(dest, e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir() && path.join("index.md").is_file())
        .collect();
    entry_dirs.sort();

    for dir in entry_dirs {
        let Some(folder) = dir.file_name().and_then(|n| n.to_str()).map(String::from) else {
            // Folder names become frontmatter titles and API query values,
            // so a non-UTF-8 name cannot be annotated. Surface it in the
            // summary rather than dropping it silently.
            let lossy = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| dir.display().to_string());
            warn!(entry = %lossy, "skipping entry with non-UTF-8 folder name");
            summary.record_skipped(lossy, "folder name is not valid UTF-8");
            continue;
        };

        match annotate_entry(source, client, &dir, &folder).await {
            Ok(()) => summary.record_processed(&folder),
            Err(e) => {
                warn!(entry = %folder, error = %e, "failed to annotate entry");
                summary.record_skipped(&folder, e.to_string());
            }
        }
    }

    Ok(summary)
}

/// Annotate one entry: look up its last-modified date, resize its banner if
/// present, and prepend the frontmatter block.
async fn annotate_entry(
    source: &WriteupsSource,
    client: &GithubClient,
    dir: &Path,
    folder: &str,
) -> Result<()> {
    let index = dir.join("index.md");

    // Empty on any API failure — the entry still ships, just undated.
    let updated = client
        .latest_commit_date(&source.owner, &source.repo, folder)
        .await
        .unwrap_or_default();

    let banner_file = dir.join("images").join("banner.png");
    let banner_path = if banner_file.is_file() {
        match ensure_min_width(&banner_file) {
            Ok(true) => info!(entry = folder, "resized banner"),
            Ok(false) => {}
            Err(e) => warn!(entry = folder, error = %e, "failed to resize banner"),
        }
        BANNER_RELATIVE_PATH
    } else {
        ""
    };

    let content = std::fs::read_to_string(&index).map_err(|e| FolioFetchError::io(&index, e))?;
    let block = frontmatter(folder, &updated, banner_path);

    std::fs::write(&index, format!("{block}{content}"))
        .map_err(|e| FolioFetchError::io(&index, e))?;

    debug!(entry = folder, updated = %updated, banner = banner_path, "annotated entry");
    Ok(())
}

/// Frontmatter block for a writeup entry: title, description template,
/// last-updated date, banner path (`""` literal when absent).
fn frontmatter(folder: &str, updated: &str, banner: &str) -> String {
    let banner_value = if banner.is_empty() {
        "\"\"".to_string()
    } else {
        banner.to_string()
    };

    format!(
        "---\n\
         title: \"{folder}\"\n\
         description: \"My write up for some challenges from {folder}\"\n\
         updated: \"{updated}\"\n\
         banner: {banner_value}\n\
         ---\n\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use foliofetch_shared::GithubAuth;
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn write_file(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn mock_client(server: &MockServer) -> GithubClient {
        let uri = server.uri();
        GithubClient::with_bases(&GithubAuth::default(), &uri, &uri).expect("client")
    }

    /// Run git in `repo`, panicking on failure.
    fn git(repo: &Path, args: &[&str]) {
        let output = std::process::Command::new("git")
            .arg("-C")
            .arg(repo)
            .args(args)
            .output()
            .expect("run git");
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    /// Build a local origin repository shaped like a writeups repo: one
    /// entry folder with a README, plus top-level files the scrub removes.
    fn init_origin_repo(root: &Path) -> PathBuf {
        let origin = root.join("origin");
        write_file(&origin.join("README.md"), "# repo readme");
        write_file(&origin.join("Alpha CTF/README.md"), "# Alpha\nbody\n");

        git(&origin, &["init", "-q"]);
        git(&origin, &["config", "user.email", "tests@localhost"]);
        git(&origin, &["config", "user.name", "tests"]);
        git(&origin, &["add", "-A"]);
        git(&origin, &["commit", "-q", "-m", "seed"]);

        origin
    }

    #[test]
    fn promote_readmes_renames_recursively() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();

        write_file(&root.join("CTF 2024/README.md"), "# writeup");
        write_file(&root.join("CTF 2024/pwn/README.md"), "# chall");
        write_file(&root.join("CTF 2024/pwn/exploit.py"), "pass");

        promote_readmes(root).unwrap();

        assert!(root.join("CTF 2024/index.md").is_file());
        assert!(root.join("CTF 2024/pwn/index.md").is_file());
        assert!(!root.join("CTF 2024/README.md").exists());
        assert!(root.join("CTF 2024/pwn/exploit.py").is_file());
    }

    #[test]
    fn scrub_clone_removes_vcs_and_top_readme() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();

        write_file(&root.join(".git/HEAD"), "ref: refs/heads/main");
        write_file(&root.join(".github/workflows/ci.yml"), "on: push");
        write_file(&root.join("README.md"), "# repo readme");
        write_file(&root.join("CTF 2024/README.md"), "# keep me");

        scrub_clone(root).unwrap();

        assert!(!root.join(".git").exists());
        assert!(!root.join(".github").exists());
        assert!(!root.join("README.md").exists());
        assert!(root.join("CTF 2024/README.md").is_file());
    }

    #[test]
    fn scrub_clone_tolerates_missing_paths() {
        let tmp = tempfile::tempdir().unwrap();
        scrub_clone(tmp.path()).unwrap();
    }

    #[test]
    fn frontmatter_without_banner_uses_empty_literal() {
        let block = frontmatter("Some CTF", "2024-03-01T10:00:00Z", "");
        assert_eq!(
            block,
            "---\n\
             title: \"Some CTF\"\n\
             description: \"My write up for some challenges from Some CTF\"\n\
             updated: \"2024-03-01T10:00:00Z\"\n\
             banner: \"\"\n\
             ---\n\n"
        );
    }

    #[test]
    fn frontmatter_with_banner_uses_relative_path() {
        let block = frontmatter("Some CTF", "", BANNER_RELATIVE_PATH);
        assert!(block.contains("banner: ./images/banner.png\n"));
        assert!(block.contains("updated: \"\"\n"));
    }

    #[tokio::test]
    async fn clone_failure_is_a_vcs_error() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("writeups");

        let err = clone_writeups("file:///nonexistent/repo.git", &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, FolioFetchError::Vcs(_)));
        assert!(err.to_string().contains("git clone"));
    }

    #[tokio::test]
    async fn run_clones_scrubs_and_annotates_end_to_end() {
        let server = MockServer::start().await;
        // No commits mock mounted: the date lookup degrades to "".
        let client = mock_client(&server);

        let tmp = tempfile::tempdir().unwrap();
        let origin = init_origin_repo(tmp.path());
        let content_root = tmp.path().join("site");
        std::fs::create_dir_all(&content_root).unwrap();

        let source = WriteupsSource {
            remote: Some(origin.to_string_lossy().into_owned()),
            ..WriteupsSource::default()
        };

        let summary = run(&source, &client, &content_root).await.unwrap();
        assert_eq!(summary.processed(), 1);
        assert_eq!(summary.skipped(), 0);

        let dest = content_root.join("writeups");
        assert!(!dest.join(".git").exists());
        assert!(!dest.join("README.md").exists());

        let content = std::fs::read_to_string(dest.join("Alpha CTF/index.md")).unwrap();
        assert!(content.starts_with("---\ntitle: \"Alpha CTF\"\n"));
        assert!(content.contains("updated: \"\"\n"));
        assert!(content.ends_with("# Alpha\nbody\n"));
    }

    #[tokio::test]
    async fn run_propagates_clone_failure() {
        let server = MockServer::start().await;
        let client = mock_client(&server);

        let tmp = tempfile::tempdir().unwrap();
        let source = WriteupsSource {
            remote: Some("file:///nonexistent/repo.git".into()),
            ..WriteupsSource::default()
        };

        let err = run(&source, &client, tmp.path()).await.unwrap_err();
        assert!(matches!(err, FolioFetchError::Vcs(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_utf8_entry_name_is_recorded_as_skip() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let server = MockServer::start().await;
        let client = mock_client(&server);

        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let dir = root.join(OsStr::from_bytes(b"Bad\xFF CTF"));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.md"), "body\n").unwrap();

        let source = WriteupsSource::default();
        let summary = annotate_entries(&source, &client, root).await.unwrap();

        assert_eq!(summary.processed(), 0);
        assert_eq!(summary.skipped(), 1);
        let skips: Vec<_> = summary.skips().collect();
        assert_eq!(skips[0].1, "folder name is not valid UTF-8");
    }

    #[tokio::test]
    async fn annotate_entries_survives_api_failure() {
        let server = MockServer::start().await;
        // No mocks mounted: every commits lookup 404s.
        let client = mock_client(&server);

        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write_file(&root.join("Alpha CTF/index.md"), "# Alpha\nbody\n");

        let source = WriteupsSource::default();
        let summary = annotate_entries(&source, &client, root).await.unwrap();
        assert_eq!(summary.processed(), 1);

        let content = std::fs::read_to_string(root.join("Alpha CTF/index.md")).unwrap();
        assert!(content.starts_with("---\ntitle: \"Alpha CTF\"\n"));
        assert!(content.contains("updated: \"\"\n"));
        assert!(content.contains("banner: \"\"\n"));
        assert!(content.ends_with("# Alpha\nbody\n"));
    }

    #[tokio::test]
    async fn annotate_entries_uses_commit_date_when_available() {
        let server = MockServer::start().await;

        let body = r#"[{"commit": {"committer": {"date": "2024-07-08T09:10:11Z"}}}]"#;
        Mock::given(method("GET"))
            .and(path_regex(r"^/repos/.+/commits$"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let client = mock_client(&server);

        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write_file(&root.join("Beta CTF/index.md"), "body\n");

        let source = WriteupsSource::default();
        let summary = annotate_entries(&source, &client, root).await.unwrap();
        assert_eq!(summary.processed(), 1);

        let content = std::fs::read_to_string(root.join("Beta CTF/index.md")).unwrap();
        assert!(content.contains("updated: \"2024-07-08T09:10:11Z\"\n"));
    }

    #[tokio::test]
    async fn annotate_entries_skips_non_entry_files() {
        let server = MockServer::start().await;
        let client = mock_client(&server);

        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write_file(&root.join("loose.md"), "not an entry");
        write_file(&root.join("NoIndex/notes.txt"), "also not");

        let source = WriteupsSource::default();
        let summary = annotate_entries(&source, &client, root).await.unwrap();
        assert_eq!(summary.outcomes.len(), 0);
    }
}
