//! Integration tests for hydra-inputs

mod fixture {
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    /// Minimal HTTP server answering GETs from a path -> JSON map.
    /// Unknown paths get a 404. Runs until the test process exits.
    pub fn serve(routes: HashMap<&'static str, Value>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                respond(stream, &routes);
            }
        });
        format!("http://{}/", addr)
    }

    fn respond(mut stream: TcpStream, routes: &HashMap<&'static str, Value>) {
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }

        let text = String::from_utf8_lossy(&request);
        let path = text
            .split_whitespace()
            .nth(1)
            .unwrap_or("/")
            .trim_start_matches('/');
        let (status, body) = match routes.get(path) {
            Some(value) => ("200 OK", value.to_string()),
            None => ("404 Not Found", "not found".to_string()),
        };
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let _ = stream.write_all(response.as_bytes());
    }

    /// Evaluation 1 with a string input and a build input whose
    /// dependency publishes a `-src` git input.
    pub fn hydra() -> String {
        let mut routes = HashMap::new();
        routes.insert(
            "eval/1",
            json!({
                "builds": [10],
                "jobsetevalinputs": {
                    "version": { "type": "string", "value": "1.0" },
                    "dep": { "type": "build", "dependency": 20 }
                }
            }),
        );
        routes.insert(
            "build/10",
            json!({
                "project": "proj",
                "jobset": "app",
                "jobsetevals": [1],
                "buildoutputs": { "out": { "path": "/nix/store/aaa-app" } }
            }),
        );
        routes.insert(
            "jobset/proj/app",
            json!({
                "jobsetinputs": {
                    "dep": { "jobsetinputalts": ["proj:job:srcinput"] },
                    "version": { "jobsetinputalts": ["1.0"] }
                }
            }),
        );
        routes.insert(
            "build/20",
            json!({
                "project": "proj",
                "jobset": "job",
                "jobsetevals": [2],
                "buildoutputs": { "out": { "path": "/nix/store/bbb-job" } }
            }),
        );
        routes.insert(
            "eval/2",
            json!({
                "builds": [21],
                "jobsetevalinputs": {
                    "srcinput-src": {
                        "type": "git",
                        "uri": "https://git.example/src",
                        "revision": "deadbeef"
                    }
                }
            }),
        );
        serve(routes)
    }
}

mod cli_tests {
    use super::fixture;
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// The binary with config isolated from the user's own file
    fn hydra_inputs(config_dir: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("hydra-inputs");
        cmd.env("HYDRA_INPUTS_CONFIG", config_dir.path().join("config.toml"));
        cmd
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        hydra_inputs(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Hydra evaluation"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        hydra_inputs(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("hydra-inputs"));
    }

    #[test]
    fn wrong_arity_prints_usage() {
        let temp = TempDir::new().unwrap();
        hydra_inputs(&temp)
            .arg("https://hydra.example")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Usage"));
    }

    #[test]
    fn non_numeric_eval_is_rejected() {
        let temp = TempDir::new().unwrap();
        hydra_inputs(&temp)
            .args(["https://hydra.example", "latest"])
            .assert()
            .failure();
    }

    #[test]
    fn resolves_to_json() {
        let temp = TempDir::new().unwrap();
        let url = fixture::hydra();
        let output = hydra_inputs(&temp)
            .args(["--format", "json", url.as_str(), "1"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "dep": { "is": "git", "uri": "https://git.example/src", "rev": "deadbeef" },
                "version": { "is": "str", "value": "1.0" }
            })
        );
    }

    #[test]
    fn resolves_to_plain_without_prefetch() {
        let temp = TempDir::new().unwrap();
        let url = fixture::hydra();
        hydra_inputs(&temp)
            .args(["--format", "plain", "--no-prefetch", url.as_str(), "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("dep\tis\tgit"))
            .stdout(predicate::str::contains("dep\trev\tdeadbeef"))
            .stdout(predicate::str::contains("version\tvalue\t1.0"));
    }

    #[test]
    fn format_can_come_from_config() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.toml"), "[output]\nformat = \"plain\"\n").unwrap();
        let url = fixture::hydra();
        hydra_inputs(&temp)
            .args([url.as_str(), "1"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("dep\tis\tgit"));
    }

    #[test]
    fn table_report_owns_stdout() {
        let temp = TempDir::new().unwrap();
        let url = fixture::hydra();
        hydra_inputs(&temp)
            .args(["--format", "table", url.as_str(), "1"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("NAME"))
            .stdout(predicate::str::contains("Resolving").not())
            .stderr(predicate::str::contains("Resolved 2 inputs"));
    }

    #[test]
    fn missing_evaluation_fails_with_hint() {
        let temp = TempDir::new().unwrap();
        let url = fixture::hydra();
        hydra_inputs(&temp)
            .args(["--format", "json", url.as_str(), "999"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("HTTP 404"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn invalid_config_is_reported() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.toml"), "[output\n").unwrap();
        hydra_inputs(&temp)
            .args(["https://hydra.example", "1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }
}
