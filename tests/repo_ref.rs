use proto_gather::error::Error;
use proto_gather::repo_ref::RepoRef;

#[test]
fn parses_full_specifier_with_branch() {
    let repo: RepoRef = "github.com/acme/billing/proto/v1@release-3"
        .parse()
        .expect("specifier should parse");
    assert_eq!(repo.owner, "acme");
    assert_eq!(repo.repo, "billing");
    assert_eq!(repo.path_in_repo, "proto/v1");
    assert_eq!(repo.branch.as_deref(), Some("release-3"));
}

#[test]
fn parses_specifier_without_branch() {
    let repo: RepoRef = "github.com/acme/billing/proto"
        .parse()
        .expect("specifier should parse");
    assert_eq!(repo.owner, "acme");
    assert_eq!(repo.repo, "billing");
    assert_eq!(repo.path_in_repo, "proto");
    assert_eq!(repo.branch, None);
}

#[test]
fn branch_splits_on_the_last_at_sign() {
    let repo: RepoRef = "github.com/acme/billing/odd@path@v2"
        .parse()
        .expect("specifier should parse");
    assert_eq!(repo.path_in_repo, "odd@path");
    assert_eq!(repo.branch.as_deref(), Some("v2"));
}

#[test]
fn empty_branch_suffix_means_default_branch() {
    let repo: RepoRef = "github.com/acme/billing/proto@"
        .parse()
        .expect("specifier should parse");
    assert_eq!(repo.path_in_repo, "proto");
    assert_eq!(repo.branch, None);
}

#[test]
fn repository_root_path_is_allowed() {
    let repo: RepoRef = "github.com/acme/billing/"
        .parse()
        .expect("specifier should parse");
    assert_eq!(repo.path_in_repo, "");
}

#[test]
fn rejects_malformed_specifiers() {
    struct TestCase {
        name: &'static str,
        spec: &'static str,
    }

    let test_cases = vec![
        TestCase {
            name: "missing path segment",
            spec: "github.com/acme/billing",
        },
        TestCase {
            name: "wrong host",
            spec: "gitlab.com/acme/billing/proto",
        },
        TestCase {
            name: "empty owner",
            spec: "github.com//billing/proto",
        },
        TestCase {
            name: "bare repo name",
            spec: "billing",
        },
        TestCase {
            name: "empty string",
            spec: "",
        },
        TestCase {
            name: "owner only",
            spec: "github.com/acme",
        },
    ];

    for tc in test_cases {
        let err = tc
            .spec
            .parse::<RepoRef>()
            .expect_err(&format!("{}: specifier must be rejected", tc.name));
        assert!(
            matches!(err, Error::InvalidSpec(_)),
            "{}: expected InvalidSpec, got {:?}",
            tc.name,
            err
        );
        assert!(
            err.to_string().contains("invalid repo path format"),
            "{}: unexpected message: {}",
            tc.name,
            err
        );
    }
}

#[test]
fn display_reconstructs_the_specifier() {
    for spec in [
        "github.com/acme/billing/proto/v1@release-3",
        "github.com/acme/billing/proto",
        "github.com/acme/billing/",
    ] {
        let repo: RepoRef = spec.parse().expect("specifier should parse");
        assert_eq!(repo.to_string(), spec);
    }
}

#[test]
fn ssh_url_targets_github() {
    let repo: RepoRef = "github.com/acme/billing/proto@main"
        .parse()
        .expect("specifier should parse");
    assert_eq!(repo.ssh_url(), "git@github.com:acme/billing.git");
}
