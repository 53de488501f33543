// Post-game result domain model
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Happiness {
    pub environment_problem_score: f64,
    pub environment_problem_number: u32,
    pub power_stability_score: f64,
    pub power_stability_number: u32,
    pub infrastructure_comfort_score: f64,
    pub infrastructure_comfort_number: u32,
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameResult {
    pub total_power_generation: f64,
    pub hydrogen_maximum_instantaneous_power_generation: f64,
    pub wind_maximum_instantaneous_power_generation: f64,
    pub solar_maximum_instantaneous_power_generation: f64,
    pub geothermal_maximum_instantaneous_power_generation: f64,
    pub co2_reduction_amount: f64,
    pub happiness: Happiness,
    /// Facility name to villager comment.
    pub villagers_texts: BTreeMap<String, String>,
}

impl GameResult {
    /// Largest per-source peak, the figure shown as the team's peak output.
    pub fn peak_instantaneous_power(&self) -> f64 {
        [
            self.hydrogen_maximum_instantaneous_power_generation,
            self.wind_maximum_instantaneous_power_generation,
            self.solar_maximum_instantaneous_power_generation,
            self.geothermal_maximum_instantaneous_power_generation,
        ]
        .into_iter()
        .fold(0.0, f64::max)
    }

    pub fn complaint_count(&self) -> u32 {
        self.happiness
            .environment_problem_number
            .saturating_add(self.happiness.power_stability_number)
            .saturating_add(self.happiness.infrastructure_comfort_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_partial_result() {
        let result: GameResult = serde_json::from_str(
            r#"{
                "totalPowerGeneration": 123.456,
                "windMaximumInstantaneousPowerGeneration": 40,
                "solarMaximumInstantaneousPowerGeneration": 55.5,
                "co2ReductionAmount": 7,
                "happiness": {"powerStabilityNumber": 2, "environmentProblemNumber": 1, "comments": ["quiet town"]},
                "villagersTexts": {"school": "bright classrooms"}
            }"#,
        )
        .unwrap();

        assert_eq!(result.total_power_generation, 123.456);
        assert_eq!(result.peak_instantaneous_power(), 55.5);
        assert_eq!(result.complaint_count(), 3);
        assert_eq!(result.happiness.comments, vec!["quiet town"]);
        assert_eq!(result.villagers_texts["school"], "bright classrooms");
    }

    #[test]
    fn test_complaint_count_saturates() {
        let result: GameResult = serde_json::from_str(&format!(
            r#"{{"happiness": {{"powerStabilityNumber": {max}, "environmentProblemNumber": {max}, "infrastructureComfortNumber": 1}}}}"#,
            max = u32::MAX
        ))
        .unwrap();
        assert_eq!(result.complaint_count(), u32::MAX);
    }
}
