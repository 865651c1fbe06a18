//! Demographic summaries over member records.
//!
//! `aggregate` is a pure reduction: the caller fetches the scoped member set
//! and the store-side counts, and passes the current date in.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{member::MarriageStatus, zone::ZoneRollup, ministry::MinistryRollup, Member};

/// Store-side counts only the global dashboard shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalCounts {
    pub families: i64,
    pub children: i64,
    pub ministries: i64,
    pub zones: i64,
    pub zone_rollups: Vec<ZoneRollup>,
    pub ministry_rollups: Vec<MinistryRollup>,
}

/// Store-side counts for one zone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneCounts {
    pub families: i64,
    pub children: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatsScope {
    Global(GlobalCounts),
    Zone(ZoneCounts),
    Ministry,
}

impl StatsScope {
    /// Bucket label for members without an education status
    fn unknown_education_label(&self) -> &'static str {
        match self {
            StatsScope::Global(_) => "UNKNOWN",
            StatsScope::Zone(_) | StatsScope::Ministry => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeBracket {
    #[serde(rename = "0-18")]
    UpTo18,
    #[serde(rename = "19-25")]
    From19To25,
    #[serde(rename = "26-35")]
    From26To35,
    #[serde(rename = "36-45")]
    From36To45,
    #[serde(rename = "46-55")]
    From46To55,
    #[serde(rename = "55+")]
    Over55,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl AgeBracket {
    /// Age is the whole-year difference between the two calendar years.
    pub fn classify(birth_date: Option<NaiveDate>, today: NaiveDate) -> Self {
        let Some(birth_date) = birth_date else {
            return AgeBracket::Unknown;
        };

        match today.year() - birth_date.year() {
            age if age < 19 => AgeBracket::UpTo18,
            age if age < 26 => AgeBracket::From19To25,
            age if age < 36 => AgeBracket::From26To35,
            age if age < 46 => AgeBracket::From36To45,
            age if age < 56 => AgeBracket::From46To55,
            _ => AgeBracket::Over55,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarriageBreakdown {
    pub single: i64,
    pub married: i64,
    pub widow: i64,
    pub divorced: i64,
}

impl MarriageBreakdown {
    pub fn total(&self) -> i64 {
        self.single + self.married + self.widow + self.divorced
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Percentages {
    pub baptized: f64,
    pub employed: f64,
    pub from_other_church: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_members: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_families: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_children: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_ministries: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_zones: Option<i64>,

    pub baptized_count: i64,
    pub not_baptized_count: i64,
    pub from_other_church_count: i64,
    pub employed_count: i64,
    pub unemployed_count: i64,

    pub marriage_status: MarriageBreakdown,
    pub education_status: BTreeMap<String, i64>,
    pub age_groups: BTreeMap<AgeBracket, i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<ZoneRollup>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ministries: Option<Vec<MinistryRollup>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents_count: Option<i64>,

    pub percentages: Percentages,
}

/// Share of `part` in `total` as a percentage with two decimals; 0 when total is 0.
pub fn percent_of(part: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let raw = part as f64 * 100.0 / total as f64;
    (raw * 100.0).round() / 100.0
}

/// Reduces a scoped member set into fixed-shape summary buckets.
pub fn aggregate(members: &[Member], scope: &StatsScope, today: NaiveDate) -> StatsSummary {
    let total = members.len() as i64;
    let unknown_education = scope.unknown_education_label();

    let mut summary = StatsSummary {
        total_members: total,
        ..StatsSummary::default()
    };

    let mut parents = 0i64;

    for member in members {
        if member.is_baptized() {
            summary.baptized_count += 1;
        }
        if member.from_other_church {
            summary.from_other_church_count += 1;
        }
        if member.is_employed() {
            summary.employed_count += 1;
        }

        // Null and unrecognised statuses fall out of the breakdown
        match member.marriage() {
            Some(MarriageStatus::Single) => summary.marriage_status.single += 1,
            Some(MarriageStatus::Married) => summary.marriage_status.married += 1,
            Some(MarriageStatus::Widow) => summary.marriage_status.widow += 1,
            Some(MarriageStatus::Divorced) => summary.marriage_status.divorced += 1,
            None => {}
        }

        let education = match member.education_status.as_deref() {
            Some(value) if !value.is_empty() => value,
            _ => unknown_education,
        };
        *summary
            .education_status
            .entry(education.to_string())
            .or_insert(0) += 1;

        *summary
            .age_groups
            .entry(AgeBracket::classify(member.birth_date, today))
            .or_insert(0) += 1;

        if member.role_in_family().is_some_and(|role| role.is_parent()) {
            parents += 1;
        }
    }

    summary.not_baptized_count = total - summary.baptized_count;
    summary.unemployed_count = total - summary.employed_count;

    match scope {
        StatsScope::Global(counts) => {
            summary.total_families = Some(counts.families);
            summary.total_children = Some(counts.children);
            summary.total_ministries = Some(counts.ministries);
            summary.total_zones = Some(counts.zones);
            summary.zones = Some(counts.zone_rollups.clone());
            summary.ministries = Some(counts.ministry_rollups.clone());
            summary.parents_count = Some(parents);
        }
        StatsScope::Zone(counts) => {
            summary.total_families = Some(counts.families);
            summary.total_children = Some(counts.children);
        }
        StatsScope::Ministry => {}
    }

    summary.percentages = Percentages {
        baptized: percent_of(summary.baptized_count, total),
        employed: percent_of(summary.employed_count, total),
        from_other_church: percent_of(summary.from_other_church_count, total),
    };

    summary
}
