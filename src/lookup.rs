use ratatui::style::Color;

/// Liveries for constructors the dashboard knows about. Unrecognized ids fall
/// back to a neutral gray rather than failing.
const TEAM_COLORS: &[(&str, Color)] = &[
    ("red_bull", Color::Rgb(0x36, 0x71, 0xC6)),
    ("ferrari", Color::Rgb(0xE8, 0x00, 0x2D)),
    ("mercedes", Color::Rgb(0x27, 0xF4, 0xD2)),
    ("mclaren", Color::Rgb(0xFF, 0x80, 0x00)),
    ("aston_martin", Color::Rgb(0x22, 0x99, 0x71)),
    ("alpine", Color::Rgb(0xFF, 0x87, 0xBC)),
    ("williams", Color::Rgb(0x64, 0xC4, 0xFF)),
    ("rb", Color::Rgb(0x66, 0x92, 0xFF)),
    ("haas", Color::Rgb(0xB6, 0xBA, 0xBD)),
    ("sauber", Color::Rgb(0x52, 0xE2, 0x52)),
    ("kick_sauber", Color::Rgb(0x52, 0xE2, 0x52)),
    ("audi", Color::Rgb(0xC0, 0x39, 0x2B)),
    ("renault", Color::Rgb(0xFF, 0xF5, 0x00)),
    ("alphatauri", Color::Rgb(0x5E, 0x8F, 0xAA)),
    ("toro_rosso", Color::Rgb(0x46, 0x9B, 0xFF)),
];

pub const FALLBACK_TEAM_COLOR: Color = Color::Rgb(0x88, 0x88, 0x88);

pub fn team_color(constructor_id: &str) -> Color {
    TEAM_COLORS
        .iter()
        .find(|(id, _)| *id == constructor_id)
        .map(|(_, color)| *color)
        .unwrap_or(FALLBACK_TEAM_COLOR)
}

const FLAGS: &[(&str, &str)] = &[
    ("Australia", "🇦🇺"),
    ("China", "🇨🇳"),
    ("Japan", "🇯🇵"),
    ("Bahrain", "🇧🇭"),
    ("Saudi Arabia", "🇸🇦"),
    ("USA", "🇺🇸"),
    ("United States", "🇺🇸"),
    ("Italy", "🇮🇹"),
    ("Monaco", "🇲🇨"),
    ("Canada", "🇨🇦"),
    ("Spain", "🇪🇸"),
    ("Austria", "🇦🇹"),
    ("UK", "🇬🇧"),
    ("United Kingdom", "🇬🇧"),
    ("Hungary", "🇭🇺"),
    ("Belgium", "🇧🇪"),
    ("Netherlands", "🇳🇱"),
    ("Azerbaijan", "🇦🇿"),
    ("Singapore", "🇸🇬"),
    ("Mexico", "🇲🇽"),
    ("Brazil", "🇧🇷"),
    ("UAE", "🇦🇪"),
    ("Qatar", "🇶🇦"),
    ("Abu Dhabi", "🇦🇪"),
    ("France", "🇫🇷"),
    ("Germany", "🇩🇪"),
    ("Russia", "🇷🇺"),
    ("Portugal", "🇵🇹"),
    ("Turkey", "🇹🇷"),
    ("Vietnam", "🇻🇳"),
    ("Korea", "🇰🇷"),
    ("India", "🇮🇳"),
    ("Malaysia", "🇲🇾"),
    ("South Africa", "🇿🇦"),
    ("Argentina", "🇦🇷"),
    ("Sweden", "🇸🇪"),
];

pub fn country_flag(country: &str) -> &'static str {
    FLAGS
        .iter()
        .find(|(name, _)| *name == country)
        .map(|(_, flag)| *flag)
        .unwrap_or("🏁")
}

const NATIONALITY_ISO: &[(&str, &str)] = &[
    ("British", "GB"),
    ("Dutch", "NL"),
    ("Mexican", "MX"),
    ("Monégasque", "MC"),
    ("Monegasque", "MC"),
    ("Spanish", "ES"),
    ("Australian", "AU"),
    ("Finnish", "FI"),
    ("German", "DE"),
    ("French", "FR"),
    ("Canadian", "CA"),
    ("Thai", "TH"),
    ("Danish", "DK"),
    ("Chinese", "CN"),
    ("Italian", "IT"),
    ("New Zealander", "NZ"),
    ("American", "US"),
    ("Brazilian", "BR"),
    ("Japanese", "JP"),
    ("Belgian", "BE"),
    ("Austrian", "AT"),
    ("Swiss", "CH"),
    ("Argentine", "AR"),
    ("Swedish", "SE"),
    ("Czech", "CZ"),
    ("Polish", "PL"),
    ("Portuguese", "PT"),
    ("Russian", "RU"),
];

pub fn nationality_code(nationality: &str) -> Option<&'static str> {
    NATIONALITY_ISO
        .iter()
        .find(|(name, _)| *name == nationality)
        .map(|(_, code)| *code)
}

#[derive(Debug, Clone, Copy)]
pub struct CircuitInfo {
    pub laps: u32,
    pub length: &'static str,
}

const CIRCUIT_DATA: &[(&str, CircuitInfo)] = &[
    ("albert_park", CircuitInfo { laps: 58, length: "5.278 km" }),
    ("bahrain", CircuitInfo { laps: 57, length: "5.412 km" }),
    ("jeddah", CircuitInfo { laps: 50, length: "6.174 km" }),
    ("suzuka", CircuitInfo { laps: 53, length: "5.807 km" }),
    ("shanghai", CircuitInfo { laps: 56, length: "5.451 km" }),
    ("miami", CircuitInfo { laps: 57, length: "5.412 km" }),
    ("imola", CircuitInfo { laps: 63, length: "4.909 km" }),
    ("monaco", CircuitInfo { laps: 78, length: "3.337 km" }),
    ("villeneuve", CircuitInfo { laps: 70, length: "4.361 km" }),
    ("catalunya", CircuitInfo { laps: 66, length: "4.657 km" }),
    ("red_bull_ring", CircuitInfo { laps: 71, length: "4.318 km" }),
    ("silverstone", CircuitInfo { laps: 52, length: "5.891 km" }),
    ("hungaroring", CircuitInfo { laps: 70, length: "4.381 km" }),
    ("spa", CircuitInfo { laps: 44, length: "7.004 km" }),
    ("zandvoort", CircuitInfo { laps: 72, length: "4.259 km" }),
    ("monza", CircuitInfo { laps: 53, length: "5.793 km" }),
    ("baku", CircuitInfo { laps: 51, length: "6.003 km" }),
    ("marina_bay", CircuitInfo { laps: 62, length: "5.063 km" }),
    ("americas", CircuitInfo { laps: 56, length: "5.513 km" }),
    ("rodriguez", CircuitInfo { laps: 71, length: "4.304 km" }),
    ("interlagos", CircuitInfo { laps: 71, length: "4.309 km" }),
    ("vegas", CircuitInfo { laps: 50, length: "6.120 km" }),
    ("losail", CircuitInfo { laps: 57, length: "5.380 km" }),
    ("yas_marina", CircuitInfo { laps: 58, length: "5.281 km" }),
    ("paul_ricard", CircuitInfo { laps: 53, length: "5.842 km" }),
    ("hockenheimring", CircuitInfo { laps: 67, length: "4.574 km" }),
    ("sochi", CircuitInfo { laps: 53, length: "5.848 km" }),
    ("portimao", CircuitInfo { laps: 66, length: "4.653 km" }),
    ("istanbul", CircuitInfo { laps: 58, length: "5.338 km" }),
    ("nurburgring", CircuitInfo { laps: 60, length: "5.148 km" }),
    ("mugello", CircuitInfo { laps: 59, length: "5.245 km" }),
    ("sepang", CircuitInfo { laps: 56, length: "5.543 km" }),
    ("yeongam", CircuitInfo { laps: 55, length: "5.615 km" }),
    ("buddh", CircuitInfo { laps: 60, length: "5.125 km" }),
];

pub fn circuit_info(circuit_id: &str) -> Option<CircuitInfo> {
    CIRCUIT_DATA
        .iter()
        .find(|(id, _)| *id == circuit_id)
        .map(|(_, info)| *info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_team_gets_gray() {
        assert_eq!(team_color("brabham"), FALLBACK_TEAM_COLOR);
        assert_ne!(team_color("ferrari"), FALLBACK_TEAM_COLOR);
    }

    #[test]
    fn unknown_country_gets_chequered_flag() {
        assert_eq!(country_flag("Atlantis"), "🏁");
        assert_eq!(country_flag("Monaco"), "🇲🇨");
    }

    #[test]
    fn circuit_info_known_and_unknown() {
        assert_eq!(circuit_info("monaco").map(|c| c.laps), Some(78));
        assert!(circuit_info("never_raced_here").is_none());
    }
}
