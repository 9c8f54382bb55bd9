use anyhow::Result;
use rand_chacha::ChaCha8Rng;

use crate::logic::{TesterAssets, checks};

/// Body of a logic scenario: one seeded iteration against fresh state.
pub type ScenarioFn = fn(&TesterAssets, &mut ChaCha8Rng) -> Result<()>;

#[derive(Clone)]
pub struct TestScenario {
    pub name: String,
    pub description: &'static str,
    pub run: ScenarioFn,
}

impl TestScenario {
    #[must_use]
    pub fn new(name: impl Into<String>, description: &'static str, run: ScenarioFn) -> Self {
        Self {
            name: name.into(),
            description,
            run,
        }
    }
}

const SCENARIOS: &[(&str, &str, ScenarioFn)] = &[
    (
        "smoke",
        "Play the full campaign with random failures and restore it",
        checks::smoke,
    ),
    (
        "fusion",
        "Random fusion attempts against the piece and cap rules",
        checks::fusion,
    ),
    (
        "rotation",
        "Rotated drops against a brute-force nearest-target oracle",
        checks::rotation,
    ),
    (
        "hints",
        "Clicks on catalogue hint zones with and without rotation",
        checks::hints,
    ),
    (
        "persistence",
        "Corrupt snapshots and offline storage during play",
        checks::persistence,
    ),
];

/// Every registered scenario key with its description, in run order.
pub fn list_scenarios() -> impl Iterator<Item = (&'static str, &'static str)> {
    SCENARIOS.iter().map(|(key, description, _)| (*key, *description))
}

#[must_use]
pub fn get_scenario(name: &str) -> Option<TestScenario> {
    SCENARIOS
        .iter()
        .find(|(key, _, _)| key.eq_ignore_ascii_case(name))
        .map(|(key, description, run)| TestScenario::new(*key, *description, *run))
}
