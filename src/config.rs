//! Drawing parameters shared by the library and the CLI.

use std::time::Duration;

use crate::flow::Deadline;
use crate::operations::compaction::Spacing;

/// How a graph is drawn.
#[derive(Debug, Clone)]
pub struct DrawParams {
    /// Minimum columns of edge between two boxes side by side.
    pub edge_width: i64,
    /// Minimum rows of edge between two stacked boxes.
    pub edge_height: i64,
    /// Write node labels inside their boxes.
    pub labels: bool,
    /// Wall-clock bound for each optimization solve.
    pub solve_timeout: Option<Duration>,
    /// Lay out components on scoped threads.
    pub parallel: bool,
}

impl Default for DrawParams {
    fn default() -> Self {
        Self {
            edge_width: 4,
            edge_height: 1,
            labels: false,
            solve_timeout: Some(Duration::from_secs(30)),
            parallel: true,
        }
    }
}

impl DrawParams {
    /// Compaction spacing for boxes wide enough to hold `label_width` characters.
    #[must_use]
    pub fn spacing(&self, label_width: usize) -> Spacing {
        Spacing {
            edge_width: self.edge_width,
            edge_height: self.edge_height,
            label_width: if self.labels { label_width } else { 0 },
        }
    }

    /// A fresh deadline for one solve.
    #[must_use]
    pub fn deadline(&self) -> Deadline {
        Deadline::from_timeout(self.solve_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spacing_defaults() {
        let params = DrawParams::default();
        assert_eq!(params.spacing(7), Spacing::default());
        assert!(params.parallel);
    }

    #[test]
    fn labels_widen_boxes_only_when_enabled() {
        let params = DrawParams {
            labels: true,
            ..DrawParams::default()
        };
        assert_eq!(params.spacing(7).label_width, 7);
        assert!(!DrawParams {
            solve_timeout: None,
            ..DrawParams::default()
        }
        .deadline()
        .expired());
    }
}
