use crate::level::Level;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionConfig {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub positions: Vec<PositionConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct DepartmentsFile {
    departments: Vec<DepartmentConfig>,
}

/// Shape of a generated demo directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Head count per level.
    pub headcount: BTreeMap<Level, usize>,
    /// Records provisioned with no level.
    #[serde(default)]
    pub unassigned: usize,
    /// Probability that a generated record is linked to a supervisor.
    pub supervised_share: f64,
    pub email_domain: String,
}

impl PopulationConfig {
    pub fn total(&self) -> usize {
        self.headcount.values().sum::<usize>() + self.unassigned
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    pub departments: Vec<DepartmentConfig>,
    pub population: PopulationConfig,
}

impl DirectoryConfig {
    /// Load from the data/ directory.
    /// In tests, use DirectoryConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let dept_path = format!("{data_dir}/directory/departments.json");
        let dept_content = std::fs::read_to_string(&dept_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {dept_path}: {e}"))?;
        let dept_file: DepartmentsFile = serde_json::from_str(&dept_content)?;

        let pop_path = format!("{data_dir}/directory/population.json");
        let pop_content = std::fs::read_to_string(&pop_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {pop_path}: {e}"))?;
        let population: PopulationConfig = serde_json::from_str(&pop_content)?;

        let config = Self {
            departments: dept_file.departments,
            population,
        };
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> anyhow::Result<()> {
        let share = self.population.supervised_share;
        if !(0.0..=1.0).contains(&share) {
            anyhow::bail!("supervised_share must be within [0, 1], got {share}");
        }
        if self.population.total() > 0 && self.departments.is_empty() {
            anyhow::bail!("a population needs at least one department");
        }
        Ok(())
    }

    pub fn default_test() -> Self {
        let dept = |id: &str, name: &str, positions: &[(&str, &str)]| DepartmentConfig {
            id: id.into(),
            name: name.into(),
            positions: positions
                .iter()
                .map(|(pid, pname)| PositionConfig {
                    id: (*pid).into(),
                    name: (*pname).into(),
                })
                .collect(),
        };

        Self {
            departments: vec![
                dept("d-hr", "HR", &[("p-hr-mgr", "Manager"), ("p-hr-rec", "Recruiter")]),
                dept("d-it", "IT", &[("p-it-dev", "Developer"), ("p-it-lead", "Tech Lead")]),
                dept("d-fin", "Finance", &[("p-fin-acc", "Accountant")]),
            ],
            population: PopulationConfig {
                headcount: [
                    (Level::Level1, 1),
                    (Level::Level2, 2),
                    (Level::Level3, 4),
                    (Level::Level4, 8),
                    (Level::Level5, 12),
                ]
                .into(),
                unassigned: 3,
                supervised_share: 1.0,
                email_domain: "example.test".into(),
            },
        }
    }
}
