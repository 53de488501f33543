// Power history domain model
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::time_label::{clock_seconds, format_timestamp, parse_timestamp, shift_time_label_by_hours};

/// One polled snapshot of a session's power history.
///
/// Index `i` of every series refers to the instant in `time_labels[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerSample {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub time_labels: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub geothermal: Vec<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub hydro: Vec<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub wind: Vec<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub solar: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_power: Option<f64>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PowerSource {
    Geothermal,
    Hydro,
    Wind,
    Solar,
}

impl PowerSource {
    pub const ALL: [PowerSource; 4] = [
        PowerSource::Geothermal,
        PowerSource::Hydro,
        PowerSource::Wind,
        PowerSource::Solar,
    ];

    pub fn label_key(&self) -> &'static str {
        match self {
            PowerSource::Geothermal => "energy.geothermalShort",
            PowerSource::Hydro => "energy.hydrogenShort",
            PowerSource::Wind => "energy.windShort",
            PowerSource::Solar => "energy.solarShort",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            PowerSource::Geothermal => "#f87171",
            PowerSource::Hydro => "#60a5fa",
            PowerSource::Wind => "#34d399",
            PowerSource::Solar => "#fbbf24",
        }
    }
}

impl PowerSample {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.time_labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_labels.is_empty()
    }

    pub fn series(&self, source: PowerSource) -> &[f64] {
        match source {
            PowerSource::Geothermal => &self.geothermal,
            PowerSource::Hydro => &self.hydro,
            PowerSource::Wind => &self.wind,
            PowerSource::Solar => &self.solar,
        }
    }

    /// Resize every series to the label count, filling gaps with zero.
    pub fn normalized(mut self) -> Self {
        let len = self.time_labels.len();
        for series in [
            &mut self.geothermal,
            &mut self.hydro,
            &mut self.wind,
            &mut self.solar,
        ] {
            series.resize(len, 0.0);
        }
        self
    }

    /// Subsequence at the given indices, in the order given.
    pub fn select(&self, indices: &[usize]) -> Self {
        let pick = |series: &[f64]| -> Vec<f64> {
            indices
                .iter()
                .map(|&i| series.get(i).copied().unwrap_or(0.0))
                .collect()
        };

        Self {
            time_labels: indices
                .iter()
                .filter_map(|&i| self.time_labels.get(i).cloned())
                .collect(),
            geothermal: pick(&self.geothermal),
            hydro: pick(&self.hydro),
            wind: pick(&self.wind),
            solar: pick(&self.solar),
            total_power: self.total_power,
        }
    }

    /// Entries whose label parses to an instant at or after `start`.
    /// Unparsable labels are dropped.
    pub fn since(&self, start: DateTime<Utc>) -> Self {
        let indices: Vec<usize> = self
            .time_labels
            .iter()
            .enumerate()
            .filter(|(_, label)| parse_timestamp(label).is_some_and(|t| t >= start))
            .map(|(i, _)| i)
            .collect();
        self.select(&indices)
    }

    /// Entries whose displayed clock time (label shifted by `offset_hours`)
    /// is at or after `from` (`HH:MM[:SS]`).
    pub fn from_clock_time(&self, from: &str, offset_hours: i64) -> Self {
        let Some(threshold) = clock_seconds(from) else {
            return self.clone();
        };

        let indices: Vec<usize> = self
            .time_labels
            .iter()
            .enumerate()
            .filter(|(_, label)| {
                clock_seconds(&shift_time_label_by_hours(label, offset_hours))
                    .is_some_and(|s| s >= threshold)
            })
            .map(|(i, _)| i)
            .collect();
        self.select(&indices)
    }

    /// A single-point series cannot be drawn as a line, so prepend a zero
    /// point one minute earlier. Any other length is returned as is.
    pub fn padded(&self) -> Self {
        if self.len() != 1 {
            return self.clone();
        }

        let Some(instant) = parse_timestamp(&self.time_labels[0]) else {
            return self.clone();
        };

        let prepend = |series: &[f64]| -> Vec<f64> {
            std::iter::once(0.0).chain(series.iter().copied()).collect()
        };

        Self {
            time_labels: vec![
                format_timestamp(instant - Duration::minutes(1)),
                self.time_labels[0].clone(),
            ],
            geothermal: prepend(&self.geothermal),
            hydro: prepend(&self.hydro),
            wind: prepend(&self.wind),
            solar: prepend(&self.solar),
            total_power: self.total_power,
        }
    }

    pub fn energy_mix(&self) -> EnergyMix {
        let sum = |source| self.series(source).iter().sum::<f64>();
        let totals: Vec<(PowerSource, f64)> =
            PowerSource::ALL.iter().map(|&s| (s, sum(s))).collect();
        let total: f64 = totals.iter().map(|(_, v)| v).sum();

        let shares = totals
            .into_iter()
            .map(|(source, value)| EnergyShare {
                source,
                total: value,
                percent: if total > 0.0 { value / total * 100.0 } else { 0.0 },
            })
            .collect();

        EnergyMix { total, shares }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyShare {
    pub source: PowerSource,
    pub total: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyMix {
    pub total: f64,
    pub shares: Vec<EnergyShare>,
}
