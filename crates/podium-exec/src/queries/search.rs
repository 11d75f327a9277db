use std::collections::BTreeSet;

use podium_core::Value;
use podium_operators::{
    filter_project_sorted, filter_project_stream, Condition, FilterProject, Page, Predicate, RowSource,
    SortKey,
};

use crate::error::{QueryError, Result};
use crate::metrics::QueryTimer;
use crate::queries::{selector, SearchOrder, SearchPage, SearchParams};
use crate::runtime::{Engine, Table};

impl SearchParams {
    fn predicate(&self) -> Predicate {
        let mut p = Predicate::all();
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            p = p.and(Condition::contains("Name", name));
        }
        if self.medal_only {
            p = p.and(Condition::not_null("Medal"));
        }
        if self.year_min.is_some() || self.year_max.is_some() {
            p = p.and(Condition::range(
                "Year",
                self.year_min.map(Value::Int),
                self.year_max.map(Value::Int),
            ));
        }
        for (column, value) in [("Season", &self.season), ("NOC", &self.noc), ("Sport", &self.sport)] {
            if let Some(v) = selector(value) {
                p = p.and(Condition::eq(column, v));
            }
        }
        p
    }
}

impl Engine {
    /// Filtered, paginated scan of the events table. `total` counts every
    /// match in the file; only the requested page is held in memory.
    pub fn search_athletes(&self, params: &SearchParams) -> Result<SearchPage> {
        let timer = QueryTimer::start("search_athletes");
        let max = self.config().max_page_size;
        if params.page_size == 0 || params.page_size > max {
            return Err(QueryError::Invalid(format!(
                "page_size must be between 1 and {max}, got {}",
                params.page_size
            )));
        }
        let page_size = params.page_size;
        let page = params.page.max(1);
        let window = Page::from_number(page, page_size);
        let predicate = params.predicate();
        let projection = params.columns.as_deref();

        let mut reader = self.open(Table::Events)?;
        let paged = match params.order {
            SearchOrder::File => filter_project_stream(&mut reader, &predicate, projection, window)?,
            SearchOrder::Year => {
                filter_project_sorted(&mut reader, &predicate, projection, &SortKey::asc("Year"), window)?
            }
        };

        let metrics = timer.finish(paged.rows.len(), &reader.stats());
        Ok(SearchPage {
            data: paged.rows,
            total: paged.total,
            page,
            page_size,
            columns: paged.columns.to_vec(),
            metrics: Some(metrics),
        })
    }

    /// Distinct non-empty sports, ascending.
    pub fn list_sports(&self) -> Result<Vec<String>> {
        let timer = QueryTimer::start("list_sports");
        let projection = ["Sport".to_string()];
        let mut sports_only = FilterProject::new(
            self.open(Table::Events)?,
            &Predicate::all().and(Condition::not_null("Sport")),
            Some(&projection[..]),
        )?;
        let mut sports = BTreeSet::new();
        while let Some(row) = sports_only.next_row()? {
            if let Some(sport) = row.value(0) {
                let sport = sport.to_string();
                if !sport.trim().is_empty() {
                    sports.insert(sport);
                }
            }
        }
        timer.finish(sports.len(), &sports_only.source().stats());
        Ok(sports.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_selectors_add_no_conditions() {
        let params = SearchParams {
            season: Some("All".into()),
            noc: Some("All".into()),
            sport: Some("".into()),
            ..SearchParams::default()
        };
        assert!(params.predicate().is_empty());
    }

    #[test]
    fn filters_become_conditions() {
        let params = SearchParams {
            name: Some("  bolt ".into()),
            season: Some("Summer".into()),
            year_min: Some(2008),
            medal_only: true,
            ..SearchParams::default()
        };
        let p = params.predicate();
        assert_eq!(p.conditions().len(), 4);
        assert_eq!(p.conditions()[0], Condition::contains("Name", "bolt"));
        assert_eq!(p.conditions()[2], Condition::range("Year", Some(Value::Int(2008)), None));
    }
}
