//! Snippet Extractor: which bounded sub-recordings get converted.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use std::borrow::Cow;
use trafficgraph_recording::{Recording, SnippetBounds};

/// One snippet ready for assembly.
#[derive(Debug, Clone)]
pub struct Snippet<'a> {
    /// `None` when the whole recording is converted as one snippet.
    pub id: Option<u32>,
    pub recording: Cow<'a, Recording>,
}

/// The snippets selected from one recording.
///
/// Snippets are materialized lazily by [`SnippetPlan::snippets`], which may
/// be called any number of times.
#[derive(Debug, Clone)]
pub enum SnippetPlan<'a> {
    Bounded {
        recording: &'a Recording,
        bounds: Vec<SnippetBounds>,
    },
    /// The recording has no snippet boundaries.
    Whole(&'a Recording),
}

impl<'a> SnippetPlan<'a> {
    pub fn len(&self) -> usize {
        match self {
            SnippetPlan::Bounded { bounds, .. } => bounds.len(),
            SnippetPlan::Whole(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snippets(&self) -> Box<dyn Iterator<Item = Result<Snippet<'a>, PipelineError>> + '_> {
        match self {
            SnippetPlan::Bounded { recording, bounds } => {
                let recording: &'a Recording = *recording;
                Box::new(bounds.iter().map(move |b| -> Result<Snippet<'a>, PipelineError> {
                    Ok(Snippet {
                        id: Some(b.id),
                        recording: Cow::Owned(recording.extract(b)?),
                    })
                }))
            }
            SnippetPlan::Whole(recording) => Box::new(std::iter::once(Ok(Snippet {
                id: None,
                recording: Cow::Borrowed(*recording),
            }))),
        }
    }
}

pub struct SnippetExtractor<'a> {
    recording: &'a Recording,
    ids: Option<&'a [u32]>,
    max_duration: Option<f64>,
}

impl<'a> SnippetExtractor<'a> {
    pub fn new(recording: &'a Recording, ids: Option<&'a [u32]>, max_duration: Option<f64>) -> Self {
        Self {
            recording,
            ids,
            max_duration,
        }
    }

    pub fn from_config(recording: &'a Recording, config: &'a PipelineConfig) -> Self {
        Self::new(
            recording,
            config.snippet_ids.as_deref(),
            config.max_scenario_duration,
        )
    }

    /// Select snippets, falling back to the whole recording when it defines
    /// no snippet boundaries.
    pub fn plan(&self) -> SnippetPlan<'a> {
        let bounds = match self.recording.snippet_bounds(self.ids) {
            Ok(bounds) => bounds,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "snippet extraction not applicable, converting the whole recording"
                );
                return SnippetPlan::Whole(self.recording);
            }
        };

        let kept = bounds
            .into_iter()
            .filter(|b| {
                let Some(max) = self.max_duration else {
                    return true;
                };
                match self.recording.snippet_duration(b) {
                    Some(duration) if duration > max => {
                        tracing::debug!(
                            snippet = b.id,
                            duration,
                            max,
                            "skipping snippet longer than the maximum scenario duration"
                        );
                        false
                    }
                    _ => true,
                }
            })
            .collect();
        SnippetPlan::Bounded {
            recording: self.recording,
            bounds: kept,
        }
    }
}
