//! Which KPI (if any) is expanded in each perspective group.
//!
//! A group is either collapsed or expanded on exactly one KPI. Selecting the
//! expanded KPI again collapses the group; selecting another KPI replaces it.

use contracts::shared::kpi::{KpiDefinition, KpiId, Perspective};
use std::collections::BTreeMap;

use super::catalog::MetricCatalog;
use super::error::{KpiError, KpiResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub kpi_id: KpiId,
    /// Explicit subdivision choice; `None` means the KPI's first subdivision.
    pub subdivision: Option<String>,
}

impl Expansion {
    pub fn active_subdivision<'a>(&'a self, def: &'a KpiDefinition) -> Option<&'a str> {
        self.subdivision
            .as_deref()
            .or_else(|| def.applicable_subdivisions.first().map(String::as_str))
    }
}

/// Per-group expansion state. Absent key = collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    groups: BTreeMap<Perspective, Expansion>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expanded(&self, group: Perspective) -> Option<&Expansion> {
        self.groups.get(&group)
    }

    pub fn is_collapsed(&self, group: Perspective) -> bool {
        !self.groups.contains_key(&group)
    }

    /// Toggle `kpi_id` in `group`; returns the resulting expansion.
    pub fn select(&mut self, group: Perspective, kpi_id: KpiId) -> Option<&Expansion> {
        let same = self
            .groups
            .get(&group)
            .is_some_and(|e| e.kpi_id == kpi_id);

        if same {
            self.groups.remove(&group);
            None
        } else {
            self.groups.insert(
                group,
                Expansion {
                    kpi_id,
                    subdivision: None,
                },
            );
            self.groups.get(&group)
        }
    }

    /// Pick the subdivision for the KPI expanded in `group`.
    pub fn choose_subdivision(
        &mut self,
        group: Perspective,
        subdivision: &str,
        catalog: &MetricCatalog,
    ) -> KpiResult<()> {
        let expansion = self.groups.get_mut(&group).ok_or_else(|| {
            KpiError::InvalidSelection(format!("no KPI is expanded in the {group} group"))
        })?;

        let def = catalog.lookup(&expansion.kpi_id)?;
        if !def.tracks_subdivision(subdivision) {
            return Err(KpiError::InvalidSelection(format!(
                "{} is not tracked for subdivision {subdivision}",
                def.kpi_id
            )));
        }

        expansion.subdivision = Some(subdivision.to_string());
        Ok(())
    }

    pub fn clear_all(&mut self) {
        self.groups.clear();
    }
}
