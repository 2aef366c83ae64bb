//! Derived-state engine for the explorer dashboard.
//!
//! Four root parameters (active source, splitting variable, publication
//! date range, metric) fan out into dependent state through an explicit
//! rule table. Each change is prechecked, committed, and then its rule
//! list runs synchronously in order; cascaded changes are queued rather
//! than applied recursively, so a cascade never overlaps itself.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use crate::core::aggregate::{aggregate, AggregatedRow};
use crate::core::catalog::{catalog_for, source_spec, Metric, SplitDimension};
use crate::core::chart::{build_series, ChartSpec};
use crate::core::error::{CoreError, CoreResult};
use crate::core::filters::FilterState;
use crate::core::record::{CountCache, DatasetRegistry, Snapshot};
use crate::core::timing;

/// Occurrence floor a country must clear to qualify for preselection.
const COUNTRY_MENTION_FLOOR: usize = 10;
/// Descending rank index of the preselection cutoff. The lookup needs at
/// least eleven qualifying countries; fewer is a fatal data error.
const PRESELECT_RANK: usize = 10;
/// Number of journals preselected when splitting by journal.
const TOP_JOURNALS: usize = 10;

/// A root-parameter change entering the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Source(String),
    Split(SplitDimension),
    DateRange(i32, i32),
    Metric(String),
}

/// One dependent recomputation. The per-signal rule lists below are the
/// whole dependency graph; order within a list is execution order.
#[derive(Debug, Clone, Copy)]
enum Rule {
    ReloadSnapshot,
    RebuildCatalog,
    DefaultMetric,
    ResetDateBounds,
    RebuildJournalUniverse,
    RebuildCountryUniverse,
    CascadeSplitReset,
    ResetJournalSelection,
    ResetCountrySelection,
    EmitSplitNotice,
}

fn rules_for(change: &Change) -> &'static [Rule] {
    match change {
        Change::Source(_) => &[
            Rule::ReloadSnapshot,
            Rule::RebuildCatalog,
            Rule::DefaultMetric,
            Rule::ResetDateBounds,
            Rule::RebuildJournalUniverse,
            Rule::RebuildCountryUniverse,
            Rule::CascadeSplitReset,
        ],
        Change::Split(_) => &[
            Rule::ResetJournalSelection,
            Rule::ResetCountrySelection,
            Rule::EmitSplitNotice,
        ],
        Change::DateRange(..) | Change::Metric(_) => &[],
    }
}

/// Owns the root parameters and everything derived from them. One engine
/// per user session; all transitions run on the caller's thread.
#[derive(Debug, Clone)]
pub struct ExploreEngine {
    registry: DatasetRegistry,
    active_source: String,
    snapshot: Arc<Snapshot>,
    catalog: Vec<Metric>,
    metric: String,
    split: SplitDimension,
    date_bounds: (i32, i32),
    pubdate: Option<(i32, i32)>,
    journal_universe: Vec<String>,
    journal_selection: BTreeSet<String>,
    country_universe: Vec<String>,
    country_selection: BTreeSet<String>,
    country_counts: CountCache,
    notices: Vec<String>,
    cascading: bool,
}

impl ExploreEngine {
    /// Boots against the registry's first source, running the full source
    /// cascade. The boot notices stay queued for [Self::take_notices].
    pub fn new(registry: DatasetRegistry) -> CoreResult<Self> {
        let first = registry
            .first_source()
            .ok_or(CoreError::EmptyRegistry)?
            .to_string();
        let snapshot = registry
            .get(&first)
            .cloned()
            .ok_or(CoreError::EmptyRegistry)?;

        let mut engine = Self {
            registry,
            active_source: String::new(),
            snapshot,
            catalog: Vec::new(),
            metric: String::new(),
            split: SplitDimension::None,
            date_bounds: (0, 0),
            pubdate: None,
            journal_universe: Vec::new(),
            journal_selection: BTreeSet::new(),
            country_universe: Vec::new(),
            country_selection: BTreeSet::new(),
            country_counts: CountCache::default(),
            notices: Vec::new(),
            cascading: false,
        };
        engine.apply(Change::Source(first))?;
        Ok(engine)
    }

    /// Applies one root-parameter change and its dependent rule cascade.
    /// Fails before mutating anything when the change's precheck rejects
    /// it; a queued follow-up change is prechecked the same way when its
    /// turn comes.
    pub fn apply(&mut self, change: Change) -> CoreResult<()> {
        debug_assert!(!self.cascading, "cascade already in flight");
        self.cascading = true;
        let result = self.run_cascade(change);
        self.cascading = false;
        result
    }

    fn run_cascade(&mut self, change: Change) -> CoreResult<()> {
        let mut queue = VecDeque::new();
        queue.push_back(change);

        while let Some(change) = queue.pop_front() {
            self.precheck(&change)?;
            self.commit(&change);
            log::debug!("applied {change:?}");
            for rule in rules_for(&change) {
                self.run_rule(*rule, &mut queue);
            }
        }
        Ok(())
    }

    fn precheck(&mut self, change: &Change) -> CoreResult<()> {
        match change {
            Change::Source(name) => {
                if self.registry.get(name).is_none() || source_spec(name).is_none() {
                    return Err(CoreError::UnknownSource(name.clone()));
                }
            }
            Change::Split(SplitDimension::AffiliationCountry) => {
                self.ranked_country_default()?;
            }
            Change::Split(_) => {}
            Change::DateRange(lower, upper) => {
                if lower > upper {
                    return Err(CoreError::InvalidDateRange {
                        lower: *lower,
                        upper: *upper,
                    });
                }
            }
            Change::Metric(title) => {
                if !self.catalog.iter().any(|metric| metric.title == *title) {
                    return Err(CoreError::UnknownMetric(title.clone()));
                }
            }
        }
        Ok(())
    }

    fn commit(&mut self, change: &Change) {
        match change {
            Change::Source(name) => self.active_source = name.clone(),
            Change::Split(split) => self.split = *split,
            Change::DateRange(lower, upper) => self.pubdate = Some((*lower, *upper)),
            Change::Metric(title) => self.metric = title.clone(),
        }
    }

    fn run_rule(&mut self, rule: Rule, queue: &mut VecDeque<Change>) {
        match rule {
            Rule::ReloadSnapshot => {
                if let Some(snapshot) = self.registry.get(&self.active_source) {
                    self.snapshot = snapshot.clone();
                }
            }
            Rule::RebuildCatalog => {
                if let Some(spec) = source_spec(&self.active_source) {
                    self.catalog = catalog_for(spec);
                }
            }
            Rule::DefaultMetric => {
                self.metric = self
                    .catalog
                    .first()
                    .map(|metric| metric.title.clone())
                    .unwrap_or_default();
            }
            Rule::ResetDateBounds => {
                let current = timing::current_year();
                let min = self.snapshot.year_min().unwrap_or(current);
                let max = self.snapshot.year_max().unwrap_or(min);
                self.date_bounds = (min, current);
                self.pubdate = Some((min, max));
            }
            Rule::RebuildJournalUniverse => {
                self.journal_universe = self.snapshot.journal_universe();
            }
            Rule::RebuildCountryUniverse => {
                let counts = self.country_counts.counts(&self.snapshot);
                let mut universe: Vec<String> = counts.keys().cloned().collect();
                universe.sort_by(|a, b| counts[b].cmp(&counts[a]).then_with(|| a.cmp(b)));
                self.country_universe = universe;
            }
            Rule::CascadeSplitReset => {
                if let Some(first) = source_spec(&self.active_source)
                    .and_then(|spec| spec.splitting_vars.first())
                {
                    queue.push_back(Change::Split(*first));
                }
            }
            Rule::ResetJournalSelection => {
                self.journal_selection = if self.split == SplitDimension::Journal {
                    self.top_journals()
                } else {
                    self.journal_universe.iter().cloned().collect()
                };
            }
            Rule::ResetCountrySelection => {
                if self.split == SplitDimension::AffiliationCountry {
                    // Prechecked before the commit; a failure here would be
                    // an engine defect, so the selection is left untouched.
                    if let Ok(selection) = self.ranked_country_default() {
                        self.country_selection = selection;
                    }
                } else {
                    self.country_selection = self.country_universe.iter().cloned().collect();
                }
            }
            Rule::EmitSplitNotice => {
                let message = match self.split {
                    SplitDimension::Journal => {
                        "Splitting by journal. Top 10 journals selected by default."
                    }
                    SplitDimension::AffiliationCountry => {
                        "Splitting by affiliation country. Top 10 countries selected by default."
                    }
                    SplitDimension::FunderInstitute => "Splitting by funder institute.",
                    SplitDimension::None => "No more splitting. Filters reset to default",
                };
                self.notices.push(message.to_string());
            }
        }
    }

    /// Journals preselected when splitting by journal: most frequent
    /// first, ties broken by name so the default is deterministic.
    fn top_journals(&self) -> BTreeSet<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for record in self.snapshot.records() {
            *counts.entry(record.journal.as_str()).or_insert(0) += 1;
        }

        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
            .into_iter()
            .take(TOP_JOURNALS)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Countries preselected when splitting by country: everything at or
    /// above the count of the candidate ranked at [PRESELECT_RANK], so
    /// boundary ties are all included and the result can exceed ten.
    fn ranked_country_default(&mut self) -> CoreResult<BTreeSet<String>> {
        let counts = self.country_counts.counts(&self.snapshot);
        let qualifying: Vec<(&String, usize)> = counts
            .iter()
            .map(|(name, &count)| (name, count))
            .filter(|&(_, count)| count > COUNTRY_MENTION_FLOOR)
            .collect();

        if qualifying.len() <= PRESELECT_RANK {
            return Err(CoreError::InsufficientData {
                qualifying: qualifying.len(),
                floor: COUNTRY_MENTION_FLOOR,
            });
        }

        let mut ranked: Vec<usize> = qualifying.iter().map(|(_, count)| *count).collect();
        ranked.sort_unstable_by(|a, b| b.cmp(a));
        let cutoff = ranked[PRESELECT_RANK];

        Ok(qualifying
            .into_iter()
            .filter(|(_, count)| *count >= cutoff)
            .map(|(name, _)| name.clone())
            .collect())
    }

    /// Replaces one journal's membership in the selection. Values outside
    /// the universe are rejected, never silently added.
    pub fn set_journal_selected(&mut self, name: &str, selected: bool) -> CoreResult<()> {
        if !self.journal_universe.iter().any(|journal| journal == name) {
            return Err(CoreError::InvalidFilterValue {
                field: "journal",
                value: name.to_string(),
            });
        }
        if selected {
            self.journal_selection.insert(name.to_string());
        } else {
            self.journal_selection.remove(name);
        }
        Ok(())
    }

    pub fn select_all_journals(&mut self, selected: bool) {
        self.journal_selection = if selected {
            self.journal_universe.iter().cloned().collect()
        } else {
            BTreeSet::new()
        };
    }

    pub fn set_country_selected(&mut self, name: &str, selected: bool) -> CoreResult<()> {
        if !self.country_universe.iter().any(|country| country == name) {
            return Err(CoreError::InvalidFilterValue {
                field: "country",
                value: name.to_string(),
            });
        }
        if selected {
            self.country_selection.insert(name.to_string());
        } else {
            self.country_selection.remove(name);
        }
        Ok(())
    }

    pub fn select_all_countries(&mut self, selected: bool) {
        self.country_selection = if selected {
            self.country_universe.iter().cloned().collect()
        } else {
            BTreeSet::new()
        };
    }

    /// Current filter values, or `None` until the first source cascade
    /// has initialized the date range.
    pub fn filter_state(&self) -> Option<FilterState> {
        self.pubdate.map(|pubdate| {
            FilterState::new(
                pubdate,
                self.journal_selection.clone(),
                self.country_selection.clone(),
            )
        })
    }

    /// Runs the aggregation engine over the active snapshot with the
    /// current filters and split.
    pub fn aggregated(&self) -> CoreResult<Vec<AggregatedRow>> {
        let Some(filters) = self.filter_state() else {
            return Ok(Vec::new());
        };
        aggregate(self.snapshot.records(), &filters, self.split, &self.catalog)
    }

    /// Aggregates and builds the chart for the current selections.
    pub fn chart(&self) -> CoreResult<ChartSpec> {
        let rows = self.aggregated()?;
        build_series(
            &rows,
            self.split,
            &self.split_selection(),
            &self.metric,
            &self.catalog,
            self.pubdate,
        )
    }

    /// Split labels the chart builder should produce series for. Funder
    /// splitting has no picker; the full funder universe stands in.
    fn split_selection(&self) -> BTreeSet<String> {
        match self.split {
            SplitDimension::Journal => self.journal_selection.clone(),
            SplitDimension::AffiliationCountry => self.country_selection.clone(),
            SplitDimension::FunderInstitute => {
                self.snapshot.funder_counts().into_keys().collect()
            }
            SplitDimension::None => BTreeSet::new(),
        }
    }

    /// Drains the notification queue accumulated by recent transitions.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    pub fn sources(&self) -> Vec<String> {
        self.registry.source_names()
    }

    pub fn active_source(&self) -> &str {
        &self.active_source
    }

    pub fn catalog(&self) -> &[Metric] {
        &self.catalog
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn split(&self) -> SplitDimension {
        self.split
    }

    pub fn splitting_vars(&self) -> &'static [SplitDimension] {
        source_spec(&self.active_source)
            .map(|spec| spec.splitting_vars)
            .unwrap_or(&[])
    }

    pub fn date_bounds(&self) -> (i32, i32) {
        self.date_bounds
    }

    pub fn pubdate(&self) -> Option<(i32, i32)> {
        self.pubdate
    }

    pub fn journal_universe(&self) -> &[String] {
        &self.journal_universe
    }

    pub fn journal_selection(&self) -> &BTreeSet<String> {
        &self.journal_selection
    }

    pub fn country_universe(&self) -> &[String] {
        &self.country_universe
    }

    pub fn country_selection(&self) -> &BTreeSet<String> {
        &self.country_selection
    }
}
