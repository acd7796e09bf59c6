use crate::houses::io_common::parse_hex_color;
use crate::houses::*;

use house_assignment::House;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct HouseSetting {
    pub name: String,
    pub color: String,
}

/// The configuration file. Every key is optional.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HousesConfig {
    #[serde(rename = "dataFolder")]
    pub data_folder: String,
    /// The 0-based row of the header in every input worksheet.
    #[serde(rename = "headerRow")]
    pub header_row: usize,
    pub houses: Vec<HouseSetting>,
    /// The gender values offered by the filters and used for the workbook sheets.
    pub genders: Vec<String>,
    #[serde(rename = "genderColors")]
    pub gender_colors: BTreeMap<String, String>,
    #[serde(rename = "defaultColumns")]
    pub default_columns: Vec<String>,
    #[serde(rename = "adminPasswordSha256")]
    pub admin_password_sha256: Option<String>,
    #[serde(rename = "exportFileName")]
    pub export_file_name: String,
    #[serde(rename = "randomSeed")]
    pub random_seed: Option<u64>,
}

pub const UNKNOWN_GENDER_COLOR: &str = "#AAAAAA";

impl Default for HousesConfig {
    fn default() -> Self {
        let palette = HousePalette::default();
        HousesConfig {
            data_folder: "Data".to_string(),
            header_row: 2,
            houses: palette
                .houses
                .iter()
                .map(|h| HouseSetting {
                    name: h.name.clone(),
                    color: h.color.clone(),
                })
                .collect(),
            genders: vec!["M".to_string(), "F".to_string()],
            gender_colors: [("M", "#0074D9"), ("F", "#FF69B4")]
                .iter()
                .map(|(g, c)| (g.to_string(), c.to_string()))
                .collect(),
            default_columns: vec![
                ENROLLMENT_COL.to_string(),
                NAME_COL.to_string(),
                "Email-ID".to_string(),
            ],
            admin_password_sha256: None,
            export_file_name: "final_house_distribution.xlsx".to_string(),
            random_seed: None,
        }
    }
}

impl HousesConfig {
    /// The validated house palette.
    pub fn palette(&self) -> HousesResult<HousePalette> {
        for h in self.houses.iter() {
            parse_hex_color(&h.color)?;
        }
        let palette = HousePalette {
            houses: self
                .houses
                .iter()
                .map(|h| House {
                    name: h.name.clone(),
                    color: h.color.clone(),
                })
                .collect(),
        };
        palette.validate().context(AssignmentSnafu {})?;
        Ok(palette)
    }

    pub fn gender_color(&self, gender: &str) -> &str {
        self.gender_colors
            .get(gender)
            .map(|s| s.as_str())
            .unwrap_or(UNKNOWN_GENDER_COLOR)
    }
}

pub fn read_config(path: &str) -> HousesResult<HousesConfig> {
    let contents = fs::read_to_string(path).context(OpeningConfigSnafu { path })?;
    let config: HousesConfig =
        serde_json::from_str(contents.as_str()).context(ParsingConfigSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let c = HousesConfig::default();
        assert_eq!(c.header_row, 2);
        assert_eq!(c.palette().unwrap(), HousePalette::default());
        assert_eq!(c.gender_color("F"), "#FF69B4");
        assert_eq!(c.gender_color("X"), UNKNOWN_GENDER_COLOR);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r##"{{"dataFolder": "rosters", "randomSeed": 12,
                "houses": [{{"name": "Agni", "color": "#FF0000"}}, {{"name": "Vayu", "color": "#00FF00"}}]}}"##
        )
        .unwrap();
        let c = read_config(f.path().to_str().unwrap()).unwrap();
        assert_eq!(c.data_folder, "rosters");
        assert_eq!(c.random_seed, Some(12));
        assert_eq!(c.header_row, 2);
        assert_eq!(c.genders, vec!["M", "F"]);
        let p = c.palette().unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p.color_of("Vayu"), Some("#00FF00"));
    }

    #[test]
    fn bad_color_is_rejected() {
        let c = HousesConfig {
            houses: vec![HouseSetting {
                name: "Agni".to_string(),
                color: "red".to_string(),
            }],
            ..HousesConfig::default()
        };
        assert!(matches!(c.palette(), Err(HousesError::InvalidColor { .. })));
    }

    #[test]
    fn empty_palette_is_rejected() {
        let c = HousesConfig {
            houses: vec![],
            ..HousesConfig::default()
        };
        assert!(matches!(c.palette(), Err(HousesError::Assignment { .. })));
    }

    #[test]
    fn unreadable_file() {
        let res = read_config("/nonexistent/houses.json");
        assert!(matches!(res, Err(HousesError::OpeningConfig { .. })));
    }
}
