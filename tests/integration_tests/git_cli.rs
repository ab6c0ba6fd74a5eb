use git_overview::git::{CommandTimeouts, GitCli, GitClient, Upstream};

use crate::common::{TestWorkspace, commit, git, push_branch};

fn client() -> GitCli {
    GitCli::new(CommandTimeouts::default())
}

#[test]
fn test_toplevel_from_subdirectory() {
    let ws = TestWorkspace::new();
    let repo = ws.repo("R");
    let sub = repo.join("src/deep");
    std::fs::create_dir_all(&sub).unwrap();

    let top = client().toplevel(&sub).unwrap();
    assert_eq!(dunce::canonicalize(top).unwrap(), repo);
}

#[test]
fn test_toplevel_outside_repository_fails() {
    let ws = TestWorkspace::new();
    let plain = ws.scan_root().join("plain");
    std::fs::create_dir_all(&plain).unwrap();

    let err = client().toplevel(&plain).unwrap_err();
    assert!(!err.is_fatal());
}

#[test]
fn test_branches_and_upstream() {
    let ws = TestWorkspace::new();
    let repo = ws.repo("R");
    push_branch(&repo, "feature");
    git(&repo, &["branch", "local-only"]);
    let git_cli = client();

    assert_eq!(
        git_cli.current_branch(&repo).unwrap().as_deref(),
        Some("feature")
    );
    assert_eq!(
        git_cli.local_branches(&repo).unwrap(),
        vec!["feature", "local-only", "main"]
    );
    assert!(git_cli.branch_exists(&repo, "main").unwrap());
    assert!(!git_cli.branch_exists(&repo, "missing").unwrap());

    assert_eq!(
        git_cli.upstream(&repo, "feature").unwrap(),
        Some(Upstream {
            remote: "origin".into(),
            merge: "refs/heads/feature".into(),
        })
    );
    assert_eq!(git_cli.upstream(&repo, "local-only").unwrap(), None);
}

#[test]
fn test_detached_head_has_no_current_branch() {
    let ws = TestWorkspace::new();
    let repo = ws.repo("R");
    git(&repo, &["checkout", "--quiet", "--detach"]);
    assert_eq!(client().current_branch(&repo).unwrap(), None);
}

#[test]
fn test_ahead_behind_against_remote_tip() {
    let ws = TestWorkspace::new();
    let repo = ws.repo("R");
    ws.advance_remote(&repo, "main", 3);
    commit(&repo, "local");

    let git_cli = client();
    git_cli.fetch(&repo).unwrap();

    let upstream = git_cli.upstream(&repo, "main").unwrap().unwrap();
    let remote = git_cli.remote_tip(&repo, &upstream).unwrap().unwrap();
    assert_eq!(remote, git(&repo, &["rev-parse", "origin/main"]));

    let local = git_cli.local_tip(&repo, "main").unwrap();
    assert_eq!(local, git(&repo, &["rev-parse", "HEAD"]));

    assert_eq!(git_cli.ahead_behind(&repo, &local, &remote).unwrap(), (1, 3));
}

#[test]
fn test_remote_tip_for_missing_remote_branch() {
    let ws = TestWorkspace::new();
    let repo = ws.repo("R");
    let upstream = Upstream {
        remote: "origin".into(),
        merge: "refs/heads/gone".into(),
    };
    assert_eq!(client().remote_tip(&repo, &upstream).unwrap(), None);
}

#[test]
fn test_dirty_working_tree() {
    let ws = TestWorkspace::new();
    let repo = ws.repo("R");
    let git_cli = client();

    assert!(!git_cli.is_dirty(&repo).unwrap());
    std::fs::write(repo.join("new.txt"), "x").unwrap();
    assert!(git_cli.is_dirty(&repo).unwrap());
}

#[test]
fn test_count_commits_with_unknown_revision_fails() {
    let ws = TestWorkspace::new();
    let repo = ws.repo("R");
    let err = client()
        .count_commits(&repo, "HEAD", "0000000000000000000000000000000000000001")
        .unwrap_err();
    assert!(!err.is_fatal());
    assert!(err.to_string().contains("rev-list --count"), "{err}");
}
