//! End-to-end menu sessions driven by scripted input and a recording runner.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::Cursor;

use gcp_vm_manager_cli::app::App;
use gcp_vm_manager_cli::menus::console::Console;
use gcp_vm_manager_cli::menus::port_forward::TunnelOutcome;
use gcp_vm_manager_cli::menus::style::OutputStyle;
use gcp_vm_manager_core::compute::VmInstance;
use gcp_vm_manager_core::error::{Error, Result};
use gcp_vm_manager_core::execution::{CommandOutput, CommandRunner, SessionOutcome};
use gcp_vm_manager_core::file_handling::{get_project_config, write_project_config};
use gcp_vm_manager_core::gcloud::Gcloud;
use gcp_vm_manager_core::project_definitions::ProjectConfig;

#[derive(Default)]
struct FakeGcloud {
    outputs: RefCell<VecDeque<CommandOutput>>,
    sessions: RefCell<VecDeque<Result<SessionOutcome>>>,
    log: RefCell<Vec<(bool, Vec<String>)>>,
}

impl FakeGcloud {
    fn output(self, code: i32, stdout: &str, stderr: &str) -> Self {
        self.outputs
            .borrow_mut()
            .push_back(CommandOutput::new(code, stdout, stderr));
        self
    }

    fn session(self, outcome: Result<SessionOutcome>) -> Self {
        self.sessions.borrow_mut().push_back(outcome);
        self
    }

    fn interactive(&self) -> Vec<Vec<String>> {
        self.log
            .borrow()
            .iter()
            .filter(|(interactive, _)| *interactive)
            .map(|(_, args)| args.clone())
            .collect()
    }

    fn captured_count(&self) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|(interactive, _)| !*interactive)
            .count()
    }
}

impl CommandRunner for FakeGcloud {
    fn run(&self, args: &[String]) -> CommandOutput {
        self.log.borrow_mut().push((false, args.to_vec()));
        self.outputs.borrow_mut().pop_front().unwrap_or_default()
    }

    fn run_interactive(&self, args: &[String]) -> Result<SessionOutcome> {
        self.log.borrow_mut().push((true, args.to_vec()));
        self.sessions
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(SessionOutcome::Completed(0)))
    }
}

fn session<'r>(
    runner: &'r FakeGcloud,
    gcloud: Gcloud,
    input: &str,
    config_path: &str,
) -> App<'r, Cursor<Vec<u8>>, Vec<u8>> {
    let console = Console::new(
        Cursor::new(input.as_bytes().to_vec()),
        Vec::new(),
        OutputStyle::plain(),
    );
    App::new(runner, gcloud, console, config_path, false)
}

fn transcript(app: App<'_, Cursor<Vec<u8>>, Vec<u8>>) -> String {
    String::from_utf8(app.into_console().into_output()).unwrap()
}

fn config_file(projects: &[&str]) -> (tempfile::TempDir, String) {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("config.json");
    let path = path.to_str().unwrap().to_string();

    let mut config = ProjectConfig::default();
    for project in projects {
        config.add_project(project).unwrap();
    }
    write_project_config(&path, &config).unwrap();
    (temp_dir, path)
}

const LISTING: &str = r#"[
    {"name": "web-1", "zone": "projects/acme/zones/us-central1-a", "machineType": "projects/acme/machineTypes/e2-medium", "status": "RUNNING"}
]"#;

#[test]
fn test_port_forward_session_from_main_menu() {
    let (_temp_dir, path) = config_file(&["acme-staging"]);
    let runner = FakeGcloud::default()
        .output(0, LISTING, "")
        .output(0, r#"{"status": "RUNNING"}"#, "")
        .output(0, r#"{"status": "RUNNING"}"#, "")
        .output(0, LISTING, "")
        .session(Ok(SessionOutcome::Interrupted));

    // VMs > acme-staging > web-1 > port forward (bad ports first) > back out > exit
    let input = [
        "1", "1", "1", "9", "abc", "0", "-1", "70000", "8080", "8080", "", "0", "0", "0", "0",
    ]
    .join("\n");
    let mut app = session(&runner, Gcloud::new("/opt/sdk/bin/gcloud"), &input, &path);

    app.run().unwrap();

    assert_eq!(
        runner.interactive(),
        vec![vec![
            "/opt/sdk/bin/gcloud",
            "compute",
            "start-iap-tunnel",
            "web-1",
            "8080",
            "--local-host-port",
            "localhost:8080",
            "--project",
            "acme-staging",
            "--zone",
            "us-central1-a",
        ]]
    );
    assert_eq!(runner.captured_count(), 4);

    let output = transcript(app);
    assert!(output.contains("Tunnel terminated."));
    assert!(output.contains("Goodbye!"));
}

#[test]
fn test_tunnel_launch_failure_returns_to_menu() {
    let runner = FakeGcloud::default().session(Err(Error::SubProcess(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        "No such file or directory (os error 2)",
    ))));
    let mut app = session(&runner, Gcloud::default(), "3000\n3000\n\n", "unused.json");
    let vm = VmInstance {
        name: "db".to_string(),
        zone: "europe-west4-b".to_string(),
        region: "europe-west4".to_string(),
        region_display: "Europe".to_string(),
        machine_type: "n2-standard-4".to_string(),
        status: "RUNNING".to_string(),
        internal_ip: None,
    };

    let outcome = app.configure_port_forward("acme", &vm).unwrap();

    assert!(matches!(outcome, TunnelOutcome::Failed(_)));
    assert_eq!(runner.interactive().len(), 1);
}

#[test]
fn test_viewing_vms_never_writes_the_cache() {
    let (_temp_dir, path) = config_file(&["acme"]);
    let before = std::fs::read_to_string(&path).unwrap();
    let runner = FakeGcloud::default().output(0, LISTING, "");

    // VMs > acme > (list shown) back > back > exit
    let mut app = session(&runner, Gcloud::default(), "1\n1\n0\n0\n", &path);
    app.run().unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    assert!(transcript(app).contains("e2-medium instance"));
}

#[test]
fn test_project_management_round_trip() {
    let (_temp_dir, path) = config_file(&[]);
    let runner = FakeGcloud::default().output(0, LISTING, "");

    // Projects > add > refresh cache for it > back > exit
    let input = "3\n2\nacme-production\n\n4\n1\n\n0\n0\n";
    let mut app = session(&runner, Gcloud::default(), input, &path);
    app.run().unwrap();

    let config = get_project_config(&path).unwrap();
    assert_eq!(config.project_ids(), vec!["acme-production"]);
    assert_eq!(config.projects["acme-production"].vms[0].name, "web-1");
    assert_eq!(config.projects["acme-production"].vms[0].region, "US Central");

    let output = transcript(app);
    assert!(output.contains("1) acme-production [PRODUCTION]"));
}

#[test]
fn test_end_of_input_anywhere_exits_cleanly() {
    let (_temp_dir, path) = config_file(&["acme"]);
    let runner = FakeGcloud::default()
        .output(0, LISTING, "")
        .output(0, r#"{"status": "RUNNING"}"#, "");

    // Input stops in the middle of the VM action menu
    let mut app = session(&runner, Gcloud::default(), "1\n1\n1\n", &path);

    assert!(app.run().is_ok());
}

#[test]
fn test_corrupt_config_is_reported_and_the_session_continues() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();
    let runner = FakeGcloud::default();

    // VMs (config unreadable, back after pause) > projects > add > list > back > exit
    let input = "1\n\n3\n2\nnew-project\n\n1\n\n0\n0\n";
    let mut app = session(&runner, Gcloud::default(), input, path.to_str().unwrap());

    app.run().unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    assert_eq!(runner.captured_count(), 0);
    let output = transcript(app);
    assert_eq!(output.matches("Error loading config file").count(), 3);
    assert!(!output.contains("Project added successfully."));
    assert!(output.contains("Goodbye!"));
}
