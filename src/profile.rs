//! Variant Selector: which extraction rules apply to a URL.
//!
//! The selection is a two-level lookup, hosting platform x page intent,
//! written as one exhaustive `match` so that a new site variant is an
//! addition here rather than an edit to branching logic elsewhere.

use crate::error::{Result, TabError};
use crate::types::{PageKind, Platform, RoundSelectors, ScrapeProfile, TableSelectors};

const CALICO_MOTION_STATS: RoundSelectors = RoundSelectors {
    container: "div.list-group.mt-3",
    round_name: "span.badge.badge-secondary",
    motion: "h4.mb-3.mt-1",
    info_panel: "div.modal-body.lead",
};

const CALICO_MOTION_LIST: RoundSelectors = RoundSelectors {
    container: "div.list-group.list-group-flush",
    round_name: "h4.card-title.mt-0.mb-2.d-inline-block",
    motion: "div.mr-auto.pr-3.lead",
    info_panel: "div.modal-body.lead",
};

const HEROKU_MOTION_STATS: RoundSelectors = RoundSelectors {
    container: "div.list-group.mt-3",
    round_name: "span.badge.badge-secondary",
    motion: "h4.mb-4.mt-2",
    info_panel: "div.modal-body.lead",
};

const HEROKU_MOTION_LIST: RoundSelectors = RoundSelectors {
    container: "div.card.mt-3",
    round_name: "h4.card-title.mt-0.mb-2.d-inline-block",
    motion: "div.mr-auto.pr-3.lead",
    info_panel: "div.modal-body.lead",
};

/// Speaker and team tabs render the same `table.table` markup on both
/// platforms.
const TAB_TABLE: TableSelectors = TableSelectors {
    table: "table.table",
    fallback: None,
};

const RESULTS_TABLE: TableSelectors = TableSelectors {
    table: "div.table-responsive-md",
    fallback: Some("table.table-responsive-md"),
};

impl ScrapeProfile {
    /// Resolves the profile for a URL, or fails with `UnsupportedSite` when
    /// the host matches neither known platform. Callers can rely on the
    /// distinction between "no such site" and "page had zero rounds".
    pub fn resolve(url: &str) -> Result<Self> {
        let platform = Platform::from_url(url)
            .ok_or_else(|| TabError::UnsupportedSite(url.to_string()))?;
        Ok(Self::lookup(platform, PageKind::from_url(url)))
    }

    /// Total over every (platform, kind) pair; the compiler keeps it that way.
    pub fn lookup(platform: Platform, kind: PageKind) -> Self {
        match (platform, kind) {
            (Platform::Calicotab, PageKind::MotionStatistics) => {
                ScrapeProfile::Rounds(&CALICO_MOTION_STATS)
            }
            (Platform::Calicotab, PageKind::MotionsList) => {
                ScrapeProfile::Rounds(&CALICO_MOTION_LIST)
            }
            (Platform::Heroku, PageKind::MotionStatistics) => {
                ScrapeProfile::Rounds(&HEROKU_MOTION_STATS)
            }
            (Platform::Heroku, PageKind::MotionsList) => {
                ScrapeProfile::Rounds(&HEROKU_MOTION_LIST)
            }
            (_, PageKind::SpeakerTab) | (_, PageKind::TeamTab) => ScrapeProfile::Tab(&TAB_TABLE),
            (_, PageKind::Results) => ScrapeProfile::Tab(&RESULTS_TABLE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_host_is_unsupported_not_empty() {
        let err = ScrapeProfile::resolve("https://tabbykitten.example.org/motions/").unwrap_err();
        assert!(matches!(err, TabError::UnsupportedSite(_)));
    }

    #[test]
    fn same_url_always_yields_same_profile() {
        let url = "https://hhiv2020.calicotab.com/hhiv2020/motions/statistics/";
        let a = ScrapeProfile::resolve(url).unwrap();
        let b = ScrapeProfile::resolve(url).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, ScrapeProfile::Rounds(&CALICO_MOTION_STATS));
    }

    #[test]
    fn lookup_is_total_over_known_combinations() {
        let platforms = [Platform::Calicotab, Platform::Heroku];
        let kinds = [
            PageKind::MotionsList,
            PageKind::MotionStatistics,
            PageKind::SpeakerTab,
            PageKind::TeamTab,
            PageKind::Results,
        ];
        for platform in platforms {
            for kind in kinds {
                // Must not panic, and every profile carries usable selectors.
                match ScrapeProfile::lookup(platform, kind) {
                    ScrapeProfile::Rounds(sel) => {
                        assert!(!sel.container.is_empty());
                        assert!(!sel.round_name.is_empty());
                    }
                    ScrapeProfile::Tab(sel) => assert!(!sel.table.is_empty()),
                }
            }
        }
    }

    #[test]
    fn heroku_motion_list_uses_card_containers() {
        let profile =
            ScrapeProfile::resolve("https://chancellors2019.herokuapp.com/chancellors2019/motions/")
                .unwrap();
        assert_eq!(profile, ScrapeProfile::Rounds(&HEROKU_MOTION_LIST));
    }
}
