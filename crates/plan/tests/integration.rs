//! Integration tests for plan loading and validation

#[cfg(test)]
mod tests {
    use rigup_errors::{Error, PlanError};
    use rigup_plan::*;
    use std::path::{Path, PathBuf};

    const FULL_PLAN: &str = r#"
name = "ocr-bootstrap"

[[step]]
name = "build-tools"

[step.packages]
entries = [
    { name = "autoconf" },
    { name = "automake" },
    { name = "libtool" },
    { name = "libicu-dev", enabled = false },
]

[[step]]
name = "ocr-engine"
precondition = { command = ["tesseract", "-v"] }
postcondition = { command = ["tesseract", "-v"] }

[step.artifact]
url = "https://example.com/archive/3.05.02.tar.gz"
path = "tesseract-3.05.02.tar.gz"

[step.unpack]
dest = "/home/op/tesseract-3.05.02"

[[step.build]]
argv = ["./autogen.sh"]

[[step.build]]
argv = ["./configure"]
env = { CXXFLAGS = "-fPIC" }

[[step.build]]
argv = ["make"]

[[step]]
name = "ocr-data"
precondition = { file = "/usr/local/share/tessdata/eng.traineddata" }

[step.artifact]
url = "https://example.com/tessdata/eng.traineddata"
min_size = 490000000
"#;

    #[test]
    fn test_parse_full_plan() {
        let plan: Plan = FULL_PLAN.parse().unwrap();
        assert_eq!(plan.name.as_deref(), Some("ocr-bootstrap"));
        assert_eq!(plan.steps.len(), 3);

        let packages = &plan.steps[0];
        assert_eq!(packages.kind(), StepKind::Packages);
        let set = packages.packages.as_ref().unwrap();
        assert_eq!(set.manager, "apt-get");
        assert_eq!(set.install_args, vec!["install", "-y"]);
        assert_eq!(set.probe, vec!["dpkg", "-s"]);
        assert_eq!(set.entries.len(), 4);
        assert_eq!(set.enabled_names(), vec!["autoconf", "automake", "libtool"]);
        assert_eq!(
            set.install_argv(&["autoconf".to_string()]),
            vec!["apt-get", "install", "-y", "autoconf"]
        );
        assert_eq!(set.probe_argv("libtool"), vec!["dpkg", "-s", "libtool"]);

        let engine = &plan.steps[1];
        assert_eq!(engine.kind(), StepKind::Source);
        assert_eq!(engine.build.len(), 3);
        assert_eq!(
            engine.build[1].env.get("CXXFLAGS").map(String::as_str),
            Some("-fPIC")
        );
        assert_eq!(
            engine.unpack.as_ref().unwrap().extract_root(),
            PathBuf::from("/home/op")
        );

        let data = &plan.steps[2];
        assert_eq!(data.artifact.as_ref().unwrap().min_size, Some(490_000_000));
        // Postcondition falls back to the declared precondition
        assert_eq!(
            data.effective_postcondition().map(Probe::describe),
            Some("file /usr/local/share/tessdata/eng.traineddata".to_string())
        );
    }

    #[test]
    fn test_probe_forms_parse() {
        let plan: Plan = r#"
[[step]]
name = "a"
precondition = { command = ["true"] }
postcondition = { dir = "/tmp" }

[[step.build]]
argv = ["true"]

[[step]]
name = "b"
precondition = { path = "/etc/hostname" }

[[step.build]]
argv = ["true"]
"#
        .parse()
        .unwrap();
        assert!(matches!(
            plan.steps[0].precondition,
            Some(Probe::Command { .. })
        ));
        assert!(matches!(plan.steps[0].postcondition, Some(Probe::Dir { .. })));
        assert!(matches!(plan.steps[1].precondition, Some(Probe::Path { .. })));
    }

    #[test]
    fn test_artifact_local_path() {
        let artifact = Artifact {
            url: "https://example.com/a/b/data.tar.gz".to_string(),
            path: None,
            min_size: None,
            blake3: None,
        };
        assert_eq!(
            artifact.local_path(Path::new("/home/op")),
            PathBuf::from("/home/op/data.tar.gz")
        );

        let absolute = Artifact {
            path: Some(PathBuf::from("/var/cache/data.tar.gz")),
            ..artifact.clone()
        };
        assert_eq!(
            absolute.local_path(Path::new("/home/op")),
            PathBuf::from("/var/cache/data.tar.gz")
        );

        let relative = Artifact {
            path: Some(PathBuf::from("downloads/data.tar.gz")),
            ..artifact
        };
        assert_eq!(
            relative.local_path(Path::new("/home/op")),
            PathBuf::from("/home/op/downloads/data.tar.gz")
        );
    }

    #[test]
    fn test_empty_plan_rejected() {
        let err = "".parse::<Plan>().unwrap_err();
        assert!(matches!(err, Error::Plan(PlanError::Empty)));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = r#"
[[step]]
name = "same"
precondition = { dir = "/tmp" }

[[step.build]]
argv = ["true"]

[[step]]
name = "same"
precondition = { dir = "/tmp" }

[[step.build]]
argv = ["true"]
"#
        .parse::<Plan>()
        .unwrap_err();
        assert!(matches!(err, Error::Plan(PlanError::DuplicateStep { .. })));
    }

    #[test]
    fn test_missing_condition_rejected() {
        let err = r#"
[[step]]
name = "blind"

[[step.build]]
argv = ["true"]
"#
        .parse::<Plan>()
        .unwrap_err();
        assert!(matches!(err, Error::Plan(PlanError::MissingCondition { .. })));
    }

    #[test]
    fn test_packages_step_rejects_source_fields() {
        let err = r#"
[[step]]
name = "mixed"

[step.artifact]
url = "https://example.com/x.tar.gz"

[step.packages]
entries = [{ name = "jq" }]
"#
        .parse::<Plan>()
        .unwrap_err();
        assert!(matches!(err, Error::Plan(PlanError::InvalidStep { .. })));
    }

    #[test]
    fn test_packages_step_rejects_explicit_conditions() {
        let err = r#"
[[step]]
name = "pkgs"
precondition = { command = ["true"] }

[step.packages]
entries = [{ name = "jq" }]
"#
        .parse::<Plan>()
        .unwrap_err();
        assert!(matches!(err, Error::Plan(PlanError::InvalidStep { .. })));
    }

    #[test]
    fn test_unpack_requires_artifact() {
        let err = r#"
[[step]]
name = "floating-unpack"
precondition = { dir = "/tmp/x" }

[step.unpack]
dest = "/tmp/x"
"#
        .parse::<Plan>()
        .unwrap_err();
        assert!(matches!(err, Error::Plan(PlanError::InvalidStep { .. })));
    }

    #[test]
    fn test_bad_blake3_rejected() {
        let err = r#"
[[step]]
name = "bad-hash"
precondition = { file = "/tmp/f" }

[step.artifact]
url = "https://example.com/f"
blake3 = "zz"
"#
        .parse::<Plan>()
        .unwrap_err();
        assert!(matches!(err, Error::Plan(PlanError::InvalidStep { .. })));
    }

    #[test]
    fn test_empty_build_argv_rejected() {
        let err = r#"
[[step]]
name = "empty-argv"
precondition = { dir = "/tmp" }

[[step.build]]
argv = []
"#
        .parse::<Plan>()
        .unwrap_err();
        assert!(matches!(err, Error::Plan(PlanError::InvalidStep { .. })));
    }

    #[test]
    fn test_select_preserves_plan_order() {
        let plan: Plan = FULL_PLAN.parse().unwrap();
        let picked = plan
            .select(&["ocr-data".to_string(), "build-tools".to_string()])
            .unwrap();
        let names: Vec<&str> = picked.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["build-tools", "ocr-data"]);

        let all = plan.select(&[]).unwrap();
        assert_eq!(all.len(), 3);

        let err = plan.select(&["nope".to_string()]).unwrap_err();
        assert!(matches!(err, Error::Plan(PlanError::UnknownStep { .. })));
    }

    #[test]
    fn test_summary() {
        let plan: Plan = FULL_PLAN.parse().unwrap();
        let summary = plan.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.steps[0].kind, "packages");
        assert_eq!(summary.steps[0].detail, "3 of 4 packages enabled");
        assert_eq!(
            summary.steps[0].precondition.as_deref(),
            Some("dpkg -s <package>")
        );
        assert_eq!(summary.steps[1].kind, "source");
        assert!(summary.steps[1].detail.contains("3.05.02.tar.gz"));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = Plan::load(Path::new("/nonexistent/plan.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Plan(PlanError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.toml");
        tokio::fs::write(&path, FULL_PLAN).await.unwrap();
        let plan = Plan::load(&path).await.unwrap();
        assert_eq!(plan.steps.len(), 3);
    }
}
