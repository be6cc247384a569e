//! Built-in load-test scenario: the default parameters and the script they feed.
//!
//! The script restarts the service under test, waits for its port, stages the
//! wrk2 Lua script in a per-run directory, runs wrk2, keeps the results under a
//! per-run log directory and removes the staging files. Every path is
//! namespaced by the run identifier (`AdhocName`) so concurrent runs on the same
//! host do not collide.
//!
//! Remote prerequisites: `supervisorctl`, `netstat`, `/usr/local/bin/wrk2` and
//! `~/live.lua` for the connecting user, with passwordless `sudo`.

use serde::Serialize;

use crate::remote::compose::{ParameterRecord, ScriptTemplate};
use crate::remote::error::CompositionError;

/// Parameters of one load-test run.
///
/// Field names serialize in PascalCase and are the placeholder names used by
/// [`ScriptTemplate::load_test`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoadProfile {
    /// Label prefixed to the results file.
    pub name: String,
    /// Run identifier namespacing staging and output paths.
    pub adhoc_name: String,
    /// Supervisor program to restart before the run.
    pub service_name: String,
    /// Port the service listens on once it is healthy.
    pub health_port: String,
    pub wrk_threads: String,
    pub max_connections: String,
    pub test_minutes: String,
    pub target_rps: String,
    /// URL wrk2 sends requests to.
    pub target_address: String,
    pub staging_root: String,
    pub results_root: String,
}

impl LoadProfile {
    /// Flatten into template parameters.
    pub fn to_parameters(&self) -> Result<ParameterRecord, CompositionError> {
        ParameterRecord::from_serializable(self)
    }

    /// Remote path of the results file this profile produces.
    pub fn results_path(&self) -> String {
        format!(
            "{}/{}/{}_resp_results",
            self.results_root, self.adhoc_name, self.name
        )
    }
}

impl Default for LoadProfile {
    fn default() -> Self {
        Self {
            name: "lets_gooooooo".to_string(),
            adhoc_name: run_identifier(),
            service_name: "plexd".to_string(),
            health_port: "8080".to_string(),
            wrk_threads: "12".to_string(),
            max_connections: "100".to_string(),
            test_minutes: "1".to_string(),
            target_rps: "90000".to_string(),
            target_address: "http://127.0.0.1:8080".to_string(),
            staging_root: "/var/tmp/plex/stressplex".to_string(),
            results_root: "/var/log/plex/stressplex".to_string(),
        }
    }
}

/// Identifier for a run, derived from the current time in nanoseconds.
pub fn run_identifier() -> String {
    let now = chrono::Utc::now();
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros() * 1_000)
        .to_string()
}

impl ScriptTemplate {
    /// The wrk2 load-test script driven by [`LoadProfile`].
    pub fn load_test() -> Self {
        Self::new([
            "echo \"[restarting {{ServiceName}}]\"",
            "sudo supervisorctl restart {{ServiceName}}",
            // Loop until the health port shows up in the listening sockets.
            "while netstat -lnt | awk '$4 ~ /:{{HealthPort}}$/ {exit 1}'; do sleep 10; done",
            "echo \"[creating input directory]\"",
            "sudo mkdir {{StagingRoot}}/{{AdhocName}} -p",
            "sudo cp ~/live.lua {{StagingRoot}}/{{AdhocName}}/live.lua",
            "echo \"[running wrk2]\"",
            "sudo /usr/local/bin/wrk2 -s {{StagingRoot}}/{{AdhocName}}/live.lua -t{{WrkThreads}} -c{{MaxConnections}} -d{{TestMinutes}}m -R {{TargetRps}} --latency {{TargetAddress}} > ~/results.txt",
            "sudo cat ~/results.txt",
            "echo \"[writing output]\"",
            "sudo mkdir {{ResultsRoot}}/{{AdhocName}} -p",
            "sudo cp ~/results.txt {{ResultsRoot}}/{{AdhocName}}/{{Name}}_resp_results",
            "echo \"[cleaning up]\"",
            "sudo rm ~/results.txt",
            "sudo rm -rf {{StagingRoot}}/{{AdhocName}}",
            "echo \"RESULTS LOCATED: {{ResultsRoot}}/{{AdhocName}}/{{Name}}_resp_results\"",
        ])
    }
}
