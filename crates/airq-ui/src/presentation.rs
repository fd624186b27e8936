//! Grade presentation: label, emoji and color per grade and locale.

use airq_airkorea::{Grade, PollutantKind};
use airq_core::Locale;

/// Background color for a grade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeColor {
    Blue,
    Green,
    Yellow,
    Red,
    Gray,
}

impl GradeColor {
    pub fn hex(&self) -> &'static str {
        match self {
            GradeColor::Blue => "#1E88E5",
            GradeColor::Green => "#43A047",
            GradeColor::Yellow => "#FDD835",
            GradeColor::Red => "#E53935",
            GradeColor::Gray => "#9E9E9E",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradePresentation {
    pub label: &'static str,
    pub emoji: &'static str,
    pub color: GradeColor,
}

impl GradePresentation {
    pub fn of(grade: Grade, locale: Locale) -> Self {
        let (label_ko, label_en, emoji, color) = match grade {
            Grade::Good => ("좋음", "Good", "😊", GradeColor::Blue),
            Grade::Normal => ("보통", "Normal", "😃", GradeColor::Green),
            Grade::Bad => ("나쁨", "Bad", "😠", GradeColor::Yellow),
            Grade::Awful => ("매우 나쁨", "Very bad", "😡", GradeColor::Red),
            Grade::Unknown => ("미측정", "Not measured", "🤔", GradeColor::Gray),
        };

        Self {
            label: match locale {
                Locale::Ko => label_ko,
                Locale::En => label_en,
            },
            emoji,
            color,
        }
    }
}

impl std::fmt::Display for GradePresentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.label, self.emoji)
    }
}

/// Display name of a pollutant
pub fn pollutant_label(kind: PollutantKind, locale: Locale) -> &'static str {
    match (locale, kind) {
        (Locale::Ko, PollutantKind::Pm10) => "미세먼지",
        (Locale::Ko, PollutantKind::Pm25) => "초미세먼지",
        (Locale::Ko, PollutantKind::So2) => "아황산가스",
        (Locale::Ko, PollutantKind::Co) => "일산화탄소",
        (Locale::Ko, PollutantKind::O3) => "오존",
        (Locale::Ko, PollutantKind::No2) => "이산화질소",
        (Locale::Ko, PollutantKind::Khai) => "통합대기환경지수",
        (Locale::En, PollutantKind::Pm10) => "Fine dust",
        (Locale::En, PollutantKind::Pm25) => "Ultrafine dust",
        (Locale::En, PollutantKind::So2) => "Sulfur dioxide",
        (Locale::En, PollutantKind::Co) => "Carbon monoxide",
        (Locale::En, PollutantKind::O3) => "Ozone",
        (Locale::En, PollutantKind::No2) => "Nitrogen dioxide",
        (Locale::En, PollutantKind::Khai) => "Air quality index",
    }
}

/// Widget text shown when location permission is missing
pub fn no_permission_text(locale: Locale) -> &'static str {
    match locale {
        Locale::Ko => "권한없음",
        Locale::En => "No permission",
    }
}
