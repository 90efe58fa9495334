//! Process - one workflow step of the workplace and its assessed hazards

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::core::lookup::LookupTable;
use crate::entities::category::{HazardCategorySet, MajorCategory};
use crate::entities::entry::{EntryPatch, RiskEntry};
use crate::entities::rating::HIGH_RISK_THRESHOLD;
use crate::entities::register::RegisterError;

/// The three free-form inventories kept per process (위험정보)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemList {
    /// 원(재)료
    Materials,
    /// 기계기구 및 설비명
    Equipment,
    /// 유해화학물질
    Chemicals,
}

impl ItemList {
    pub fn label(self) -> &'static str {
        match self {
            ItemList::Materials => "원(재)료",
            ItemList::Equipment => "기계기구 및 설비명",
            ItemList::Chemicals => "유해화학물질",
        }
    }
}

impl std::fmt::Display for ItemList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemList::Materials => write!(f, "materials"),
            ItemList::Equipment => write!(f, "equipment"),
            ItemList::Chemicals => write!(f, "chemicals"),
        }
    }
}

/// A workflow step (작업공정)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub equipment: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chemicals: Vec<String>,

    /// Hazards ticked in the classification step
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    selected_hazards: BTreeMap<MajorCategory, BTreeSet<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    entries: Vec<RiskEntry>,
}

impl Process {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            materials: Vec::new(),
            equipment: Vec::new(),
            chemicals: Vec::new(),
            selected_hazards: BTreeMap::new(),
            entries: Vec::new(),
        }
    }

    /// Placeholder name for the n-th process (1-based)
    pub fn default_name(n: usize) -> String {
        format!("공정 {}", n)
    }

    pub fn items(&self, list: ItemList) -> &[String] {
        match list {
            ItemList::Materials => &self.materials,
            ItemList::Equipment => &self.equipment,
            ItemList::Chemicals => &self.chemicals,
        }
    }

    fn items_mut(&mut self, list: ItemList) -> &mut Vec<String> {
        match list {
            ItemList::Materials => &mut self.materials,
            ItemList::Equipment => &mut self.equipment,
            ItemList::Chemicals => &mut self.chemicals,
        }
    }

    pub fn add_item(&mut self, list: ItemList, value: impl Into<String>) {
        self.items_mut(list).push(value.into());
    }

    pub fn update_item(
        &mut self,
        list: ItemList,
        index: usize,
        value: impl Into<String>,
    ) -> Result<(), RegisterError> {
        let items = self.items_mut(list);
        let len = items.len();
        let slot = items
            .get_mut(index)
            .ok_or(RegisterError::ItemIndex { list, index, len })?;
        *slot = value.into();
        Ok(())
    }

    pub fn remove_item(&mut self, list: ItemList, index: usize) -> Result<String, RegisterError> {
        let items = self.items_mut(list);
        if index >= items.len() {
            return Err(RegisterError::ItemIndex {
                list,
                index,
                len: items.len(),
            });
        }
        Ok(items.remove(index))
    }

    pub fn selected_hazards(&self) -> &BTreeMap<MajorCategory, BTreeSet<String>> {
        &self.selected_hazards
    }

    /// Number of (category, hazard) pairs currently selected
    pub fn selected_count(&self) -> usize {
        self.selected_hazards.values().map(BTreeSet::len).sum()
    }

    /// Replace the selection for one category
    ///
    /// Every hazard must exist in `catalog` under `category`. An empty
    /// selection drops the category.
    pub fn select_hazards<I, S>(
        &mut self,
        category: MajorCategory,
        hazards: I,
        catalog: &HazardCategorySet,
    ) -> Result<(), RegisterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if catalog.is_empty() {
            return Err(RegisterError::CatalogUnavailable);
        }

        let mut selected = BTreeSet::new();
        for hazard in hazards {
            let hazard = hazard.into();
            if !catalog.contains(category, &hazard) {
                return Err(RegisterError::UnknownHazard { category, hazard });
            }
            selected.insert(hazard);
        }

        if selected.is_empty() {
            self.selected_hazards.remove(&category);
        } else {
            self.selected_hazards.insert(category, selected);
        }
        Ok(())
    }

    pub fn clear_hazards(&mut self) {
        self.selected_hazards.clear();
    }

    pub fn entries(&self) -> &[RiskEntry] {
        &self.entries
    }

    /// Rebuild the entries from the selected hazards
    ///
    /// One entry per selected (category, hazard) pair, in category order and
    /// then hazard order, with citations from `table`. The previous entries
    /// are discarded, including any edits made to them. Returns the number of
    /// entries built.
    pub fn regenerate(&mut self, table: &LookupTable) -> usize {
        self.entries = self
            .selected_hazards
            .iter()
            .flat_map(|(category, hazards)| {
                hazards
                    .iter()
                    .map(move |hazard| RiskEntry::new(*category, hazard.clone(), table.citations_for(hazard)))
            })
            .collect();
        debug!(process = %self.name, entries = self.entries.len(), "regenerated entries");
        self.entries.len()
    }

    /// Rederive every entry's score from its rating
    pub fn recompute_scores(&mut self) {
        for entry in &mut self.entries {
            entry.recompute_in_place();
        }
    }

    /// Bring entry text into canonical form and rederive scores
    pub(crate) fn normalize_entries(&mut self) {
        for entry in &mut self.entries {
            entry.normalize_text();
        }
        self.recompute_scores();
    }

    /// Apply an edit to one entry, then recompute the whole table
    pub fn edit_entry(&mut self, index: usize, patch: &EntryPatch) -> Result<&RiskEntry, RegisterError> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(RegisterError::EntryIndex { index, len })?;
        patch.apply(entry)?;
        self.recompute_scores();
        Ok(&self.entries[index])
    }

    /// Entries at or above the high-risk threshold, in table order
    pub fn high_risk_entries(&self) -> impl Iterator<Item = &RiskEntry> {
        self.entries
            .iter()
            .filter(|e| e.risk_score() >= HIGH_RISK_THRESHOLD)
    }

    #[cfg(test)]
    pub(crate) fn set_entries(&mut self, entries: Vec<RiskEntry>) {
        self.entries = entries;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lookup::RegulationRow;
    use crate::entities::rating::{Likelihood, Severity};

    fn table() -> LookupTable {
        LookupTable::from_rows(vec![
            RegulationRow::new("전기적 요인", "감전", "A"),
            RegulationRow::new("전기적 요인", "감전", "B"),
            RegulationRow::new("전기적 요인", "정전기", "C"),
            RegulationRow::new("기계(설비)적 요인", "끼임", "D"),
            RegulationRow::new("작업환경 요인", "소음", "E"),
        ])
    }

    #[test]
    fn test_regenerate_empty_selection_clears_entries() {
        let mut p = Process::new("공정 1");
        p.set_entries(vec![RiskEntry::new(MajorCategory::Electrical, "감전", vec![])]);
        assert_eq!(p.regenerate(&table()), 0);
        assert!(p.entries().is_empty());
    }

    #[test]
    fn test_regenerate_single_hazard_pulls_all_citations() {
        let table = table();
        let mut p = Process::new("공정 1");
        p.select_hazards(MajorCategory::Electrical, ["감전"], table.categories_by_major())
            .unwrap();
        assert_eq!(p.regenerate(&table), 1);

        let e = &p.entries()[0];
        assert_eq!(e.category, MajorCategory::Electrical);
        assert_eq!(e.hazard, "감전");
        assert_eq!(e.legal_basis, vec!["A", "B"]);
        assert_eq!(e.likelihood, Likelihood::Moderate);
        assert_eq!(e.severity, Severity::Moderate);
        assert_eq!(e.risk_score(), 6);
    }

    #[test]
    fn test_regenerate_orders_by_category_then_hazard() {
        let table = table();
        let catalog = table.categories_by_major();
        let mut p = Process::new("공정 1");
        p.select_hazards(MajorCategory::WorkEnvironment, ["소음"], catalog).unwrap();
        p.select_hazards(MajorCategory::Electrical, ["정전기", "감전"], catalog).unwrap();
        p.select_hazards(MajorCategory::Mechanical, ["끼임"], catalog).unwrap();
        p.regenerate(&table);

        let hazards: Vec<&str> = p.entries().iter().map(|e| e.hazard.as_str()).collect();
        assert_eq!(hazards, vec!["끼임", "감전", "정전기", "소음"]);
    }

    #[test]
    fn test_regenerate_discards_prior_edits() {
        let table = table();
        let mut p = Process::new("공정 1");
        p.select_hazards(MajorCategory::Electrical, ["감전"], table.categories_by_major())
            .unwrap();
        p.regenerate(&table);
        p.edit_entry(
            0,
            &EntryPatch {
                reduction_plan: Some("접지".into()),
                likelihood: Some(5),
                ..Default::default()
            },
        )
        .unwrap();

        p.regenerate(&table);
        assert!(p.entries()[0].reduction_plan.is_empty());
        assert_eq!(p.entries()[0].risk_score(), 6);
    }

    #[test]
    fn test_hazard_without_citations_gets_empty_basis() {
        let table = LookupTable::from_rows(vec![RegulationRow::new("생물학적 요인", "감염", "F")]);
        let mut p = Process::new("공정 1");
        p.select_hazards(MajorCategory::Biological, ["감염"], table.categories_by_major())
            .unwrap();
        // Swap in a table that no longer cites the hazard
        let other = LookupTable::from_rows(vec![RegulationRow::new("전기적 요인", "감전", "A")]);
        p.regenerate(&other);
        assert_eq!(p.entries().len(), 1);
        assert!(p.entries()[0].legal_basis.is_empty());
    }

    #[test]
    fn test_select_unknown_hazard_rejected() {
        let table = table();
        let mut p = Process::new("공정 1");
        let err = p
            .select_hazards(MajorCategory::Chemical, ["감전"], table.categories_by_major())
            .unwrap_err();
        assert!(matches!(err, RegisterError::UnknownHazard { .. }));
        assert_eq!(p.selected_count(), 0);
    }

    #[test]
    fn test_select_with_empty_catalog_rejected() {
        let mut p = Process::new("공정 1");
        let err = p
            .select_hazards(MajorCategory::Chemical, ["감전"], &HazardCategorySet::new())
            .unwrap_err();
        assert!(matches!(err, RegisterError::CatalogUnavailable));
    }

    #[test]
    fn test_empty_selection_drops_category() {
        let table = table();
        let catalog = table.categories_by_major();
        let mut p = Process::new("공정 1");
        p.select_hazards(MajorCategory::Electrical, ["감전"], catalog).unwrap();
        p.select_hazards(MajorCategory::Electrical, Vec::<String>::new(), catalog)
            .unwrap();
        assert!(p.selected_hazards().is_empty());
    }

    #[test]
    fn test_edit_recomputes_every_entry() {
        let mut p = Process::new("공정 1");
        let mut stale = RiskEntry::new(MajorCategory::Electrical, "감전", vec![]);
        stale.likelihood = Likelihood::Frequent;
        p.set_entries(vec![
            stale,
            RiskEntry::new(MajorCategory::Mechanical, "끼임", vec![]),
        ]);

        p.edit_entry(
            1,
            &EntryPatch {
                severity: Some(4),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(p.entries()[0].risk_score(), 8);
        assert_eq!(p.entries()[1].risk_score(), 12);
    }

    #[test]
    fn test_edit_out_of_range_entry() {
        let mut p = Process::new("공정 1");
        let err = p.edit_entry(0, &EntryPatch::default()).unwrap_err();
        assert!(matches!(err, RegisterError::EntryIndex { index: 0, len: 0 }));
    }

    #[test]
    fn test_item_lists() {
        let mut p = Process::new("공정 1");
        p.add_item(ItemList::Equipment, "프레스");
        p.add_item(ItemList::Equipment, "컨베이어");
        p.update_item(ItemList::Equipment, 1, "벨트 컨베이어").unwrap();
        assert_eq!(p.items(ItemList::Equipment), ["프레스", "벨트 컨베이어"]);

        assert_eq!(p.remove_item(ItemList::Equipment, 0).unwrap(), "프레스");
        assert!(p.remove_item(ItemList::Chemicals, 0).is_err());
        assert!(p.update_item(ItemList::Materials, 3, "x").is_err());
    }
}
