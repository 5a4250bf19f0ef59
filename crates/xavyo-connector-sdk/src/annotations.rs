//! Response annotations forwarded to the caller alongside each page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider rate-limit state observed on a response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitStatus {
    Ok,
    Overlimit,
    #[default]
    Unknown,
}

/// Rate-limit metadata extracted from provider response headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitDescription {
    pub status: RateLimitStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<DateTime<Utc>>,
}

/// One annotation on a sync page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    /// Rate-limit state of a provider response.
    RateLimit(RateLimitDescription),
    /// A subject was left out of the page because its data could not be processed.
    SkippedSubject { subject_id: String, reason: String },
}

/// Ordered collection of annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotations(Vec<Annotation>);

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, annotation: Annotation) {
        self.0.push(annotation);
    }

    pub fn with_rate_limit(&mut self, description: RateLimitDescription) {
        self.push(Annotation::RateLimit(description));
    }

    /// Append every annotation from `other`.
    pub fn extend(&mut self, other: Annotations) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.0.iter()
    }

    /// The most recent rate-limit description, if any.
    pub fn latest_rate_limit(&self) -> Option<&RateLimitDescription> {
        self.0.iter().rev().find_map(|a| match a {
            Annotation::RateLimit(d) => Some(d),
            _ => None,
        })
    }

    /// Subject ids that were skipped.
    pub fn skipped_subjects(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter_map(|a| match a {
                Annotation::SkippedSubject { subject_id, .. } => Some(subject_id.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl From<RateLimitDescription> for Annotations {
    fn from(description: RateLimitDescription) -> Self {
        Self(vec![Annotation::RateLimit(description)])
    }
}

impl IntoIterator for Annotations {
    type Item = Annotation;
    type IntoIter = std::vec::IntoIter<Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_rate_limit_picks_last() {
        let mut annos = Annotations::new();
        annos.with_rate_limit(RateLimitDescription {
            status: RateLimitStatus::Ok,
            remaining: Some(10),
            ..Default::default()
        });
        annos.push(Annotation::SkippedSubject {
            subject_id: "u1".into(),
            reason: "bad".into(),
        });
        annos.with_rate_limit(RateLimitDescription {
            status: RateLimitStatus::Overlimit,
            remaining: Some(0),
            ..Default::default()
        });

        let latest = annos.latest_rate_limit().unwrap();
        assert_eq!(latest.status, RateLimitStatus::Overlimit);
        assert_eq!(annos.skipped_subjects(), vec!["u1"]);
        assert_eq!(annos.len(), 3);
    }

    #[test]
    fn test_annotation_serialization() {
        let anno = Annotation::SkippedSubject {
            subject_id: "u1".into(),
            reason: "settings".into(),
        };
        let json = serde_json::to_value(&anno).unwrap();
        assert_eq!(json["type"], "skipped_subject");
        assert_eq!(json["subject_id"], "u1");
    }
}
