use crate::error::Result;
use crate::models::{DayPhase, Policy, VpdTarget};
use regex_lite::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

const LANGUAGE_FILE: &str = "language";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{(\w+)\}").unwrap());

/// Words kept upper-case when a key is humanized.
const ACRONYMS: [&str; 5] = ["vpd", "rh", "co2", "uv", "ph"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    En,
    Pt,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Pt => "pt",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Some(Locale::En),
            "pt" | "pt-pt" | "portuguese" | "português" => Some(Locale::Pt),
            _ => None,
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Locale::En => Locale::Pt,
            Locale::Pt => Locale::En,
        }
    }

    fn table(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Locale::En => EN,
            Locale::Pt => PT,
        }
    }

    fn lookup(&self, key: &str) -> Option<&'static str> {
        self.table()
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Plain lookup: the locale's table, then English, then the key itself.
pub fn translate(locale: Locale, key: &str) -> String {
    locale
        .lookup(key)
        .or_else(|| Locale::En.lookup(key))
        .unwrap_or(key)
        .to_string()
}

/// Status keys try `status_<key>`, then `<key>`, then a humanized form.
pub fn status_text(locale: Locale, key: &str) -> String {
    locale
        .lookup(&format!("status_{}", key))
        .or_else(|| locale.lookup(key))
        .map(str::to_string)
        .unwrap_or_else(|| humanize_status_key(key))
}

pub fn humanize_status_key(key: &str) -> String {
    key.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|word| {
            let lower = word.to_lowercase();
            if ACRONYMS.contains(&lower.as_str()) {
                return lower.to_uppercase();
            }
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replace `{name}` placeholders; unknown names stay as written.
pub fn format_template(template: &str, vars: &HashMap<&str, String>) -> String {
    PLACEHOLDER.replace_all(template, |caps: &regex_lite::Captures| {
        let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        vars.get(name)
            .cloned()
            .unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

pub fn translate_with(locale: Locale, key: &str, vars: &[(&str, String)]) -> String {
    let vars: HashMap<&str, String> = vars.iter().cloned().collect();
    format_template(&translate(locale, key), &vars)
}

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

/// Temperatures where growth is steady, inside the policy band.
pub fn growth_window(policy: &Policy) -> (f64, f64) {
    (policy.temperature_c.min + 3.0, policy.temperature_c.max - 2.0)
}

/// Desiccation and fungus thresholds around the humidity band.
pub fn humidity_thresholds(policy: &Policy) -> (f64, f64) {
    (policy.humidity_pct.min - 5.0, policy.humidity_pct.max + 5.0)
}

pub fn vpd_too_low_threshold(vpd: VpdTarget) -> f64 {
    vpd.target - vpd.tolerance - 0.2
}

pub fn vpd_too_high_threshold(vpd: VpdTarget) -> f64 {
    vpd.target + vpd.tolerance + 0.5
}

fn number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        format!("{:.1}", v)
    }
}

pub fn temperature_range_label(policy: &Policy) -> String {
    let band = policy.temperature_c;
    format!(
        "{}–{}°C ({:.0}–{:.0}°F)",
        number(band.min),
        number(band.max),
        celsius_to_fahrenheit(band.min).round(),
        celsius_to_fahrenheit(band.max).round()
    )
}

/// Guidance lines derived from the active policy and phase.
pub fn policy_notes(locale: Locale, policy: &Policy, phase: DayPhase) -> Vec<String> {
    let (low_temp, high_temp) = growth_window(policy);
    let (below, above) = humidity_thresholds(policy);
    let vpd = policy.vpd_for(phase);
    let band = vpd.band();

    vec![
        translate_with(
            locale,
            "card_temp_growth_dynamic",
            &[("low_temp", number(low_temp)), ("high_temp", number(high_temp))],
        ),
        translate_with(
            locale,
            "card_hum_balance_dynamic",
            &[
                ("below", number(below)),
                ("above", number(above)),
                ("h_min", number(policy.humidity_pct.min)),
                ("h_max", number(policy.humidity_pct.max)),
            ],
        ),
        translate_with(
            locale,
            "card_vpd_sweet_dynamic",
            &[
                ("min", format!("{:.1}", band.min)),
                ("max", format!("{:.1}", band.max)),
            ],
        ),
        translate_with(
            locale,
            "card_vpd_too_low_dynamic",
            &[("threshold", format!("{:.2}", vpd_too_low_threshold(vpd)))],
        ),
        translate_with(
            locale,
            "card_vpd_too_high_dynamic",
            &[("threshold", format!("{:.2}", vpd_too_high_threshold(vpd)))],
        ),
    ]
}

fn language_path(data_dir: &Path) -> PathBuf {
    data_dir.join(LANGUAGE_FILE)
}

pub fn load_saved_locale(data_dir: &Path) -> Option<Locale> {
    let saved = std::fs::read_to_string(language_path(data_dir)).ok()?;
    Locale::from_str(&saved)
}

pub fn save_locale(data_dir: &Path, locale: Locale) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;
    std::fs::write(language_path(data_dir), locale.as_str())?;
    Ok(())
}

static EN: &[(&str, &str)] = &[
    ("app_title", "VanillaOps"),
    ("tab_dashboard", "Dashboard"),
    ("tab_probes", "Probes"),
    ("tab_trends", "Trends"),
    ("greenhouse", "Greenhouse"),
    ("outdoor", "Outdoor"),
    ("phase_day", "Day"),
    ("phase_night", "Night"),
    ("policy", "Policy"),
    ("target", "Target"),
    ("no_data", "No data"),
    ("loading", "Loading..."),
    ("last_updated", "Updated"),
    ("help_keys", "1-3 screens  l language  r refresh  q quit"),
    ("plant_status_title", "Plant Status Indicators"),
    ("explanation_title", "Assessment"),
    ("comparison_title", "Inside vs. Outside"),
    ("guidance_title", "Guidance"),
    ("trends_title", "Last 24 Hours"),
    ("metric_temperature", "Temperature"),
    ("metric_humidity", "Humidity"),
    ("metric_vpd", "VPD"),
    ("metric_soil_moisture", "Soil Moisture"),
    ("metric_soil_conductivity", "Soil Conductivity"),
    ("metric_illuminance", "Illuminance"),
    ("device_first", "Sensor 1"),
    ("device_second", "Sensor 2"),
    ("status_optimal", "Optimal"),
    ("status_ideal", "Ideal"),
    ("status_caution", "Caution"),
    ("status_critical", "Critical"),
    ("status_unavailable", "Unavailable"),
    ("status_within_policy", "Within Policy"),
    ("status_too_dry", "Too Dry"),
    ("status_too_wet", "Too Wet"),
    ("status_too_dark", "Too Dark"),
    ("status_too_bright", "Too Bright"),
    ("status_cond_low", "Nutrients Low"),
    ("status_cond_high", "Too Salty"),
    ("status_mixed", "Mixed Readings"),
    ("status_below_min", "Below Minimum"),
    ("status_above_max", "Above Maximum"),
    ("status_too_humid", "Too Humid"),
    ("status_too_low", "Too Low"),
    ("status_too_high", "Too High"),
    ("status_label_growth", "Growth"),
    ("status_label_photosynthesis", "Photosynthesis"),
    ("status_label_co2_uptake", "CO2 Uptake"),
    ("status_label_moisture", "Moisture Risk"),
    ("status_label_transpiration", "Transpiration"),
    ("status_label_fungus", "Fungus Risk"),
    ("status_growth_optimal", "Optimal growth phase"),
    ("status_growth_caution", "Growth slowing"),
    ("status_growth_critical", "Growth stalled"),
    ("vpd_day_photo_optimal", "Photosynthesis optimal"),
    ("vpd_day_photo_limited", "Photosynthesis limited"),
    ("vpd_night_co2_optimal", "CO2 uptake optimal"),
    ("vpd_night_co2_limited", "CO2 uptake limited"),
    ("vpd_day_excess_moisture", "Excess moisture"),
    ("vpd_night_trans_limited", "Transpiration limited"),
    ("status_fungus_low", "Low risk"),
    ("status_fungus_elevated", "Elevated risk"),
    ("status_fungus_high", "High risk"),
    (
        "explanation_all_optimal",
        "The greenhouse is in an optimal growth window. Conditions support active nutrient uptake and VPD suits stomatal function.",
    ),
    (
        "explanation_temp_critical",
        "Temperature is far outside the phase target. Correct heating or ventilation before anything else.",
    ),
    (
        "explanation_trans_critical",
        "VPD is far from target and the plant cannot regulate water through its stomata.",
    ),
    (
        "explanation_moisture_critical",
        "The air is saturated during the day. Leaves stay wet and fungal disease can take hold quickly.",
    ),
    (
        "explanation_temp_warning",
        "Temperature is drifting outside the target band. Growth is slowing.",
    ),
    (
        "explanation_trans_warning",
        "VPD is slightly outside target. Transpiration is reduced but recoverable.",
    ),
    (
        "explanation_trans_warning_high_hum",
        "VPD is slightly outside target and humidity is well off its band. Adjust ventilation to restore transpiration.",
    ),
    (
        "explanation_moisture_warning",
        "Humid daytime air is limiting evaporation. Watch for condensation on leaves.",
    ),
    (
        "card_temp_growth_dynamic",
        "Growth is steadiest between {low_temp} and {high_temp}°C.",
    ),
    (
        "card_hum_balance_dynamic",
        "Below {below}% RH the plant desiccates; above {above}% RH fungi take over. Aim for {h_min}–{h_max}%.",
    ),
    (
        "card_vpd_sweet_dynamic",
        "VPD in the sweet spot ({min}–{max} kPa) keeps water and nutrients moving.",
    ),
    (
        "card_vpd_too_low_dynamic",
        "VPD too low (< {threshold} kPa): the air is too humid for the plant to release water.",
    ),
    (
        "card_vpd_too_high_dynamic",
        "VPD too high (> {threshold} kPa): the plant loses water faster than its roots can replace it.",
    ),
    ("error_title", "Error"),
    ("history_empty", "No data available for the selected filters"),
    ("history_range", "Maximum 2 days per request"),
];

static PT: &[(&str, &str)] = &[
    ("app_title", "VanillaOps"),
    ("tab_dashboard", "Painel"),
    ("tab_probes", "Sondas"),
    ("tab_trends", "Tendências"),
    ("greenhouse", "Estufa"),
    ("outdoor", "Exterior"),
    ("phase_day", "Dia"),
    ("phase_night", "Noite"),
    ("policy", "Política"),
    ("target", "Alvo"),
    ("no_data", "Sem dados"),
    ("loading", "A carregar..."),
    ("last_updated", "Atualizado"),
    ("help_keys", "1-3 ecrãs  l idioma  r atualizar  q sair"),
    ("plant_status_title", "Indicadores de Estado da Planta"),
    ("explanation_title", "Avaliação"),
    ("comparison_title", "Interior vs. Exterior"),
    ("guidance_title", "Orientação"),
    ("trends_title", "Últimas 24 Horas"),
    ("metric_temperature", "Temperatura"),
    ("metric_humidity", "Humidade"),
    ("metric_vpd", "VPD"),
    ("metric_soil_moisture", "Humidade do Substrato"),
    ("metric_soil_conductivity", "Condutividade do Substrato"),
    ("metric_illuminance", "Iluminância"),
    ("device_first", "Sensor 1"),
    ("device_second", "Sensor 2"),
    ("status_optimal", "Ótimo"),
    ("status_ideal", "Ideal"),
    ("status_caution", "Atenção"),
    ("status_critical", "Crítico"),
    ("status_unavailable", "Indisponível"),
    ("status_within_policy", "Dentro da Política"),
    ("status_too_dry", "Muito Seco"),
    ("status_too_wet", "Muito Molhado"),
    ("status_too_dark", "Pouca Luz"),
    ("status_too_bright", "Luz Excessiva"),
    ("status_cond_low", "Nutrientes Baixos"),
    ("status_cond_high", "Muito Salgado"),
    ("status_mixed", "Leituras Mistas"),
    ("status_below_min", "Abaixo do Mínimo"),
    ("status_above_max", "Acima do Máximo"),
    ("status_too_humid", "Muito Húmido"),
    ("status_too_low", "Muito Baixo"),
    ("status_too_high", "Muito Alto"),
    ("status_label_growth", "Crescimento"),
    ("status_label_photosynthesis", "Fotossíntese"),
    ("status_label_co2_uptake", "Absorção de CO2"),
    ("status_label_moisture", "Risco de Humidade"),
    ("status_label_transpiration", "Transpiração"),
    ("status_label_fungus", "Risco de Fungos"),
    ("status_growth_optimal", "Fase de crescimento ótima"),
    ("status_growth_caution", "Crescimento a abrandar"),
    ("status_growth_critical", "Crescimento parado"),
    ("vpd_day_photo_optimal", "Fotossíntese ótima"),
    ("vpd_day_photo_limited", "Fotossíntese limitada"),
    ("vpd_night_co2_optimal", "Absorção de CO2 ótima"),
    ("vpd_night_co2_limited", "Absorção de CO2 limitada"),
    ("vpd_day_excess_moisture", "Humidade excessiva"),
    ("vpd_night_trans_limited", "Transpiração limitada"),
    ("status_fungus_low", "Risco baixo"),
    ("status_fungus_elevated", "Risco elevado"),
    ("status_fungus_high", "Risco alto"),
    (
        "explanation_all_optimal",
        "A estufa está numa janela de crescimento ótima. As condições apoiam a absorção ativa de nutrientes e o VPD favorece a função estomatal.",
    ),
    (
        "explanation_temp_critical",
        "A temperatura está muito fora do alvo da fase. Corrija o aquecimento ou a ventilação primeiro.",
    ),
    (
        "explanation_trans_critical",
        "O VPD está longe do alvo e a planta não consegue regular a água pelos estomas.",
    ),
    (
        "explanation_moisture_critical",
        "O ar está saturado durante o dia. As folhas ficam molhadas e as doenças fúngicas instalam-se depressa.",
    ),
    (
        "explanation_temp_warning",
        "A temperatura está a sair da faixa alvo. O crescimento está a abrandar.",
    ),
    (
        "explanation_trans_warning",
        "O VPD está ligeiramente fora do alvo. A transpiração está reduzida mas recuperável.",
    ),
    (
        "explanation_trans_warning_high_hum",
        "O VPD está ligeiramente fora do alvo e a humidade está bem fora da sua faixa. Ajuste a ventilação.",
    ),
    (
        "explanation_moisture_warning",
        "O ar húmido durante o dia limita a evaporação. Vigie a condensação nas folhas.",
    ),
    (
        "card_temp_growth_dynamic",
        "O crescimento é mais estável entre {low_temp} e {high_temp}°C.",
    ),
    (
        "card_hum_balance_dynamic",
        "Abaixo de {below}% HR a planta desidrata; acima de {above}% HR os fungos dominam. Procure {h_min}–{h_max}%.",
    ),
    (
        "card_vpd_sweet_dynamic",
        "VPD no ponto ideal ({min}–{max} kPa) mantém a água e os nutrientes em movimento.",
    ),
    (
        "card_vpd_too_low_dynamic",
        "VPD demasiado baixo (< {threshold} kPa): o ar é tão húmido que a planta não consegue libertar água.",
    ),
    (
        "card_vpd_too_high_dynamic",
        "VPD demasiado alto (> {threshold} kPa): a planta perde água mais depressa do que as raízes a repõem.",
    ),
    ("error_title", "Erro"),
    ("history_empty", "Sem dados para os filtros selecionados"),
    ("history_range", "Máximo de 2 dias por pedido"),
];
