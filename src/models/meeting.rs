//! Meeting schedule data structures.
//!
//! Field names on the wire (`semana`, `secoes`, `titulo`, `partes`,
//! `titulo_parte`, `tempo`, `tem_contador`) are consumed downstream and must
//! stay stable.

use serde::{Deserialize, Serialize};

/// One week's meeting schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MeetingWeek {
    /// Week title as shown in the page heading (e.g., "5-11 de janeiro")
    #[serde(rename = "semana")]
    pub title: String,

    /// Sections in meeting running order
    #[serde(rename = "secoes", default)]
    pub sections: Vec<Section>,
}

impl MeetingWeek {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
        }
    }

    /// Total number of parts across all sections.
    pub fn part_count(&self) -> usize {
        self.sections.iter().map(|s| s.parts.len()).sum()
    }

    /// Sum of all part durations in minutes, saturating at `u64::MAX`.
    pub fn total_minutes(&self) -> u64 {
        self.sections
            .iter()
            .flat_map(|s| s.parts.iter())
            .fold(0u64, |total, p| total.saturating_add(p.duration_minutes))
    }
}

/// A named group of parts within a meeting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Section {
    #[serde(rename = "titulo")]
    pub title: String,

    #[serde(rename = "partes", default)]
    pub parts: Vec<Part>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            parts: Vec::new(),
        }
    }
}

/// A single timed agenda item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Part {
    /// Label with any inline "(N min)" annotation removed
    #[serde(rename = "titulo_parte")]
    pub title: String,

    /// Duration in minutes, 0 when none was stated
    #[serde(rename = "tempo")]
    pub duration_minutes: u64,

    /// Whether the part shows a running counter during the meeting
    #[serde(rename = "tem_contador")]
    pub has_counter: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_week() -> MeetingWeek {
        MeetingWeek {
            title: "5-11 de janeiro".to_string(),
            sections: vec![Section {
                title: "Tesouros da Palavra de Deus".to_string(),
                parts: vec![
                    Part {
                        title: "Joias espirituais".to_string(),
                        duration_minutes: 10,
                        has_counter: true,
                    },
                    Part {
                        title: "Leitura da Bíblia".to_string(),
                        duration_minutes: 4,
                        has_counter: false,
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_serializes_with_wire_field_names() {
        let json = serde_json::to_value(sample_week()).unwrap();
        assert_eq!(json["semana"], "5-11 de janeiro");
        let part = &json["secoes"][0]["partes"][1];
        assert_eq!(json["secoes"][0]["titulo"], "Tesouros da Palavra de Deus");
        assert_eq!(part["titulo_parte"], "Leitura da Bíblia");
        assert_eq!(part["tempo"], 4);
        assert_eq!(part["tem_contador"], false);
    }

    #[test]
    fn test_totals() {
        let week = sample_week();
        assert_eq!(week.part_count(), 2);
        assert_eq!(week.total_minutes(), 14);
        assert_eq!(MeetingWeek::new("x").part_count(), 0);
    }

    #[test]
    fn test_total_minutes_saturates() {
        let json = r#"{"semana": "x", "secoes": [{"titulo": "T", "partes": [
            {"titulo_parte": "a", "tempo": 18446744073709551615, "tem_contador": false},
            {"titulo_parte": "b", "tempo": 5000000000, "tem_contador": false}
        ]}]}"#;
        let week: MeetingWeek = serde_json::from_str(json).unwrap();
        assert_eq!(week.sections[0].parts[1].duration_minutes, 5_000_000_000);
        assert_eq!(week.total_minutes(), u64::MAX);
    }
}
