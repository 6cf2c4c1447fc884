// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use std::sync::Arc;

/// Events emitted while scraping programmes, for progress reporting
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// The run is about to process its programmes
    RunStarting { total_programmes: usize },

    /// A programme page is being fetched
    FetchingProgramme {
        slug: String,
        url: String,
        /// Position of this programme in the run
        programme_index: usize,
        total_programmes: usize,
    },

    /// A programme was skipped because its page was unavailable
    ProgrammeSkipped { slug: String, error: String },

    /// Episodes have been extracted and normalized
    EpisodesExtracted {
        slug: String,
        programme_title: String,
        episode_count: usize,
        /// Whether the embedded data path produced the episodes
        from_embedded_data: bool,
    },

    /// An episode's audio URL is being resolved
    ResolvingAudio {
        slug: String,
        episode_title: String,
        episode_index: usize,
        total_episodes: usize,
    },

    /// A feed file has been written
    FeedWritten {
        slug: String,
        path: PathBuf,
        episode_count: usize,
        with_audio: usize,
    },

    /// A feed could not be rendered or written
    FeedFailed { slug: String, error: String },

    /// The run completed
    RunCompleted {
        written_count: usize,
        skipped_count: usize,
        failed_count: usize,
    },
}

/// Trait for reporting progress events during a run.
///
/// Implementations can use this to display spinners, log messages,
/// or collect statistics.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {}
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CollectingReporter {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl ProgressReporter for CollectingReporter {
        fn report(&self, event: ProgressEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[test]
    fn noop_reporter_handles_all_events() {
        let reporter = NoopReporter::shared();

        reporter.report(ProgressEvent::RunStarting {
            total_programmes: 2,
        });
        reporter.report(ProgressEvent::ProgrammeSkipped {
            slug: "jack-off".to_string(),
            error: "HTTP error 503".to_string(),
        });
        reporter.report(ProgressEvent::RunCompleted {
            written_count: 1,
            skipped_count: 1,
            failed_count: 0,
        });
    }

    #[test]
    fn shared_reporter_receives_events_in_order() {
        let collector = Arc::new(CollectingReporter::default());
        let reporter: SharedProgressReporter = collector.clone();

        reporter.report(ProgressEvent::FetchingProgramme {
            slug: "utility-fog".to_string(),
            url: "https://www.fbi.radio/programs/utility-fog".to_string(),
            programme_index: 0,
            total_programmes: 1,
        });
        reporter.report(ProgressEvent::FeedFailed {
            slug: "utility-fog".to_string(),
            error: "disk full".to_string(),
        });

        let events = collector.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ProgressEvent::FetchingProgramme { .. }));
        assert!(matches!(events[1], ProgressEvent::FeedFailed { .. }));
    }
}
