//! Best-effort track metadata enrichment
//!
//! Attaches cloud metadata to resolved tracks after a command has already
//! succeeded. Enrichment never gates device control: missing credentials or
//! a cloud outage returns the bare track ids unchanged.

use std::collections::HashMap;
use std::sync::Arc;

use oasis_api::{CloudApi, TrackMetadata};
use tracing::debug;

/// A resolved track, optionally annotated with display metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTrack {
    pub id: u32,
    pub metadata: Option<TrackMetadata>,
}

/// Wraps an optional cloud connection
pub struct Enricher {
    cloud: Option<Arc<dyn CloudApi>>,
}

impl Enricher {
    pub fn new(cloud: Option<Arc<dyn CloudApi>>) -> Self {
        Self { cloud }
    }

    /// Annotate track ids with cloud metadata where available
    ///
    /// Output order matches input order; duplicates each get the same
    /// metadata. Any cloud failure degrades to bare ids.
    pub async fn enrich(&self, ids: &[u32]) -> Vec<ResolvedTrack> {
        let Some(cloud) = &self.cloud else {
            return bare(ids);
        };
        let metadata = match cloud.tracks(ids).await {
            Ok(tracks) => tracks,
            Err(e) => {
                debug!("enrichment skipped: {e}");
                return bare(ids);
            }
        };
        let by_id: HashMap<u32, TrackMetadata> =
            metadata.into_iter().map(|m| (m.id, m)).collect();
        ids.iter()
            .map(|&id| ResolvedTrack {
                id,
                metadata: by_id.get(&id).cloned(),
            })
            .collect()
    }
}

fn bare(ids: &[u32]) -> Vec<ResolvedTrack> {
    ids.iter()
        .map(|&id| ResolvedTrack { id, metadata: None })
        .collect()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use oasis_api::ApiError;

    use super::*;

    struct FixedCloud {
        tracks: Vec<TrackMetadata>,
    }

    #[async_trait]
    impl CloudApi for FixedCloud {
        async fn tracks(&self, _ids: &[u32]) -> oasis_api::Result<Vec<TrackMetadata>> {
            Ok(self.tracks.clone())
        }
    }

    struct DownCloud;

    #[async_trait]
    impl CloudApi for DownCloud {
        async fn tracks(&self, _ids: &[u32]) -> oasis_api::Result<Vec<TrackMetadata>> {
            Err(ApiError::Timeout)
        }
    }

    #[tokio::test]
    async fn test_no_cloud_returns_bare_ids() {
        let enricher = Enricher::new(None);
        let tracks = enricher.enrich(&[63, 12]).await;
        assert_eq!(
            tracks,
            vec![
                ResolvedTrack {
                    id: 63,
                    metadata: None
                },
                ResolvedTrack {
                    id: 12,
                    metadata: None
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_cloud_failure_returns_bare_ids() {
        let enricher = Enricher::new(Some(Arc::new(DownCloud)));
        let tracks = enricher.enrich(&[63]).await;
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, 63);
        assert!(tracks[0].metadata.is_none());
    }

    #[tokio::test]
    async fn test_metadata_attached_in_input_order() {
        let enricher = Enricher::new(Some(Arc::new(FixedCloud {
            tracks: vec![TrackMetadata {
                id: 12,
                name: "Turtle".to_string(),
                author: None,
                image: None,
            }],
        })));
        let tracks = enricher.enrich(&[63, 12, 12]).await;

        assert_eq!(tracks[0].id, 63);
        assert!(tracks[0].metadata.is_none());
        assert_eq!(
            tracks[1].metadata.as_ref().map(|m| m.name.as_str()),
            Some("Turtle")
        );
        assert_eq!(tracks[2].metadata, tracks[1].metadata);
    }
}
