use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use proto_gather::clone::CloneFetcher;
use proto_gather::contract::{MockGitTransport, RemoteFetcher};
use proto_gather::error::Error;
use proto_gather::repo_ref::RepoRef;

/// Lays out what a checkout of the fake `billing` repository looks like.
fn write_fake_checkout(root: &Path) {
    std::fs::create_dir_all(root.join(".git")).expect("create .git");
    std::fs::write(root.join(".git/HEAD"), "ref: refs/heads/main\n").expect("write HEAD");
    std::fs::create_dir_all(root.join("proto/nested")).expect("create dirs");
    std::fs::write(
        root.join("proto/service.proto"),
        "import \"proto/nested/deep.proto\";\n",
    )
    .expect("write service.proto");
    std::fs::write(root.join("proto/nested/deep.proto"), "syntax = \"proto3\";\n")
        .expect("write deep.proto");
    std::fs::write(root.join("proto/README.md"), "docs\n").expect("write README");
    std::fs::write(root.join("main.go"), "package main\n").expect("write main.go");
}

/// Transport stub that materialises the fake checkout and records where the
/// fetcher asked it to clone.
fn recording_transport(seen: Arc<Mutex<Option<PathBuf>>>, succeed: bool) -> MockGitTransport {
    let mut transport = MockGitTransport::new();
    transport.expect_clone_repo().returning(move |_, dest| {
        *seen.lock().expect("lock") = Some(dest.to_path_buf());
        if succeed {
            write_fake_checkout(dest);
            Ok(())
        } else {
            Err(Error::Transport(
                "failed to clone repository using SSH".to_string(),
            ))
        }
    });
    transport
}

#[tokio::test]
async fn clone_fetch_copies_the_requested_subtree_with_rewritten_imports() {
    let mut transport = MockGitTransport::new();
    transport
        .expect_clone_repo()
        .withf(|repo, _| repo.ssh_url() == "git@github.com:acme/billing.git")
        .returning(|_, dest| {
            write_fake_checkout(dest);
            Ok(())
        });

    let dest = tempfile::tempdir().expect("temp dir");
    let repo: RepoRef = "github.com/acme/billing/proto".parse().expect("specifier");

    let summary = CloneFetcher::with_transport(transport)
        .fetch(&repo, dest.path())
        .await
        .expect("fetch should succeed");

    assert_eq!(summary.files, 2);
    let service =
        std::fs::read_to_string(dest.path().join("proto/service.proto")).expect("read service");
    assert_eq!(service, "import \"billing/proto/nested/deep.proto\";\n");
    assert!(dest.path().join("proto/nested/deep.proto").is_file());
    assert!(!dest.path().join("proto/README.md").exists());
    assert!(!dest.path().join("main.go").exists());
}

#[tokio::test]
async fn single_proto_file_path_is_copied_and_rewritten() {
    let seen = Arc::new(Mutex::new(None));
    let transport = recording_transport(Arc::clone(&seen), true);

    let dest = tempfile::tempdir().expect("temp dir");
    let repo: RepoRef = "github.com/acme/billing/proto/service.proto"
        .parse()
        .expect("specifier");

    let summary = CloneFetcher::with_transport(transport)
        .fetch(&repo, dest.path())
        .await
        .expect("fetch should succeed");

    assert_eq!(summary.files, 1);
    let service =
        std::fs::read_to_string(dest.path().join("proto/service.proto")).expect("read service");
    assert_eq!(service, "import \"billing/proto/nested/deep.proto\";\n");
}

#[tokio::test]
async fn non_proto_file_path_is_rejected() {
    let transport = recording_transport(Arc::new(Mutex::new(None)), true);

    let dest = tempfile::tempdir().expect("temp dir");
    let repo: RepoRef = "github.com/acme/billing/main.go".parse().expect("specifier");

    let err = CloneFetcher::with_transport(transport)
        .fetch(&repo, dest.path())
        .await
        .expect_err("fetch must fail");
    assert!(matches!(err, Error::UnsupportedEntry(_)), "got {:?}", err);
}

#[tokio::test]
async fn missing_subtree_reports_not_found() {
    let transport = recording_transport(Arc::new(Mutex::new(None)), true);

    let dest = tempfile::tempdir().expect("temp dir");
    let repo: RepoRef = "github.com/acme/billing/missing/path"
        .parse()
        .expect("specifier");

    let err = CloneFetcher::with_transport(transport)
        .fetch(&repo, dest.path())
        .await
        .expect_err("fetch must fail");
    assert!(matches!(err, Error::NotFound { .. }), "got {:?}", err);
}

#[tokio::test]
async fn scratch_clone_dir_is_removed_after_success() {
    let seen = Arc::new(Mutex::new(None));
    let transport = recording_transport(Arc::clone(&seen), true);

    let dest = tempfile::tempdir().expect("temp dir");
    let repo: RepoRef = "github.com/acme/billing/proto".parse().expect("specifier");

    CloneFetcher::with_transport(transport)
        .fetch(&repo, dest.path())
        .await
        .expect("fetch should succeed");

    let scratch = seen
        .lock()
        .expect("lock")
        .clone()
        .expect("transport saw the scratch dir");
    assert!(
        !scratch.exists(),
        "scratch clone dir must be cleaned up: {}",
        scratch.display()
    );
}

#[tokio::test]
async fn scratch_clone_dir_is_removed_after_failure() {
    let seen = Arc::new(Mutex::new(None));
    let transport = recording_transport(Arc::clone(&seen), false);

    let dest = tempfile::tempdir().expect("temp dir");
    let repo: RepoRef = "github.com/acme/billing/proto".parse().expect("specifier");

    let err = CloneFetcher::with_transport(transport)
        .fetch(&repo, dest.path())
        .await
        .expect_err("fetch must fail");
    assert!(matches!(err, Error::Transport(_)), "got {:?}", err);

    let scratch = seen
        .lock()
        .expect("lock")
        .clone()
        .expect("transport saw the scratch dir");
    assert!(
        !scratch.exists(),
        "scratch clone dir must be cleaned up: {}",
        scratch.display()
    );
    // Nothing may land in the destination for a failed source.
    assert_eq!(std::fs::read_dir(dest.path()).expect("read dest").count(), 0);
}
