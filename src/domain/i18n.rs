// Localized strings for labels and messages emitted by the dashboard
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ja,
    En,
}

impl Language {
    pub fn toggled(self) -> Self {
        match self {
            Language::Ja => Language::En,
            Language::En => Language::Ja,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::Ja => "ja",
            Language::En => "en",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "ja" => Some(Language::Ja),
            "en" => Some(Language::En),
            _ => None,
        }
    }
}

// (key, ja, en)
const TRANSLATIONS: &[(&str, &str, &str)] = &[
    ("dashboard.alert.fillAll", "すべての項目を入力してください", "Please fill in every field."),
    ("dashboard.section.teamTitle", "チーム {teamName}", "Team {teamName}"),
    ("energy.geothermal", "地熱発電", "Geothermal"),
    ("energy.hydrogen", "人力発電", "Human power"),
    ("energy.wind", "風力発電", "Wind power"),
    ("energy.solar", "太陽光発電", "Solar power"),
    ("energy.geothermalShort", "地熱", "Geothermal"),
    ("energy.hydrogenShort", "人力発電", "Human power"),
    ("energy.windShort", "風力", "Wind"),
    ("energy.solarShort", "太陽光", "Solar"),
    ("chart.buttons.start", "スタート", "Start"),
    ("chart.buttons.stop", "ストップ", "Stop"),
    ("chart.buttons.clear", "クリア", "Clear"),
    ("chart.buttons.fullView", "全体表示", "Show all"),
    ("chart.totalPower", "総発電量 {value}kWh", "Total power {value}kWh"),
    ("chart.loading", "データを読み込み中です...", "Loading data..."),
    ("chart.errorTitle", "エラーが発生しました", "An error occurred"),
    ("chart.resultErrorTitle", "グラフデータの取得に失敗しました", "Failed to load chart data"),
    ("chart.noData", "グラフデータがありません", "No chart data available"),
    ("chart.title", "各モジュールにおける発電能力の推移", "Power output trends by module"),
    ("chart.axis.power", "発電能力(kW)", "Power (kW)"),
    ("chart.axis.time", "時間", "Time"),
    ("result.summary.energyMixTitle", "発電割合", "Energy mix"),
    ("result.summary.totalPowerLabel", "総発電量(kWh)", "Total power (kWh)"),
    ("result.summary.maxInstantTitle", "最大瞬間発電量", "Peak output"),
    ("result.team.heading", "チーム {teamName}", "Team {teamName}"),
    ("result.team.co2Title", "CO₂削減量", "CO₂ reduction"),
    ("result.team.happinessTitle", "街の暮らしやすさ", "Town comfort"),
    ("result.team.happiness.environment", "環境問題（CO₂・騒音）", "Environment (CO₂ / noise)"),
    ("result.team.happiness.power", "電力安定性（停電回数）", "Power stability (outages)"),
    (
        "result.team.happiness.infrastructure",
        "インフラ（家・電車・お店）",
        "Infrastructure (homes / trains / shops)",
    ),
    ("result.team.complaintCount", "{count} 件", "{count} reports"),
    ("result.villagerTitle", "村人の声", "Feedback from villagers"),
    ("result.page.fetchError", "データ取得に失敗しました", "Failed to fetch data"),
    ("session.delete.missingId", "セッションIDを入力してください", "Please enter a session ID"),
    ("session.delete.success", "セッションが正常に削除されました", "Session deleted"),
    ("session.delete.failed", "削除に失敗しました: {reason}", "Delete failed: {reason}"),
    (
        "session.delete.network",
        "ネットワークエラー: {reason}。CORS設定またはサーバー接続を確認してください。",
        "Network error: {reason}. Check the server connection.",
    ),
];

/// Translation lookup bound to one language, resolved once per request.
#[derive(Debug, Clone, Copy)]
pub struct Translator {
    language: Language,
}

impl Translator {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn t(&self, key: &str) -> String {
        self.translate(key, &[])
    }

    /// Look up `key` and substitute `{name}` placeholders from `vars`.
    /// Unknown keys come back verbatim.
    pub fn translate(&self, key: &str, vars: &[(&str, &str)]) -> String {
        let Some(&(_, ja, en)) = TRANSLATIONS.iter().find(|(k, _, _)| *k == key) else {
            tracing::warn!("Missing translation for key: {}", key);
            return key.to_string();
        };

        let template = match self.language {
            Language::Ja => ja,
            Language::En => en,
        };
        replace_variables(template, vars)
    }
}

fn replace_variables(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_word(&after[..close]) => {
                let name = &after[..close];
                match vars.iter().find(|(k, _)| *k == name) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}
