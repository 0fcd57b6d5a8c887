use inspector_testing::fixtures::write_sample_corpus;
use tempfile::tempdir;

#[test]
fn status_reports_the_configured_traces_dir_even_when_populated() {
    let dir = tempdir().unwrap();
    let traces_dir = dir.path().join("traces");
    std::fs::create_dir_all(&traces_dir).unwrap();
    write_sample_corpus(&traces_dir, &["sessionone", "sessiontwo"]);

    let entries: Vec<_> = std::fs::read_dir(&traces_dir).unwrap().collect();
    assert_eq!(entries.len(), 2);

    let mut cmd = assert_cmd::Command::cargo_bin("mcp-agent-inspector").unwrap();
    cmd.env("TRACES_DIR", &traces_dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicates::str::contains(traces_dir.display().to_string()));
}
