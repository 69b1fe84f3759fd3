/*!
 * Rebuilding directory nesting from a flat sequence of visits
 *
 * The walker hands over one directory at a time. Instead of building a tree,
 * the reconciler keeps a stack of open containers and diffs each new path
 * against the previous one: the previous path's tail is closed, the new
 * path's tail is opened, then the directory's files are emitted.
 */

use tracing::trace;

use crate::error::Result;
use crate::path::{divergence, slash_join, NormalizedPath};
use crate::registry::IdentityRegistry;
use crate::types::{ContainerFrame, DirectoryVisit, LeafRecord};

/// Receiver of the markup produced while reconciling
pub trait MarkupSink {
    /// A directory level starts
    fn open_container(&mut self, frame: &ContainerFrame) -> Result<()>;

    /// A directory level ends
    fn close_container(&mut self, frame: &ContainerFrame) -> Result<()>;

    /// A file inside the innermost open container
    fn leaf(&mut self, record: &LeafRecord) -> Result<()>;
}

/// Counts gathered over a complete run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub containers_opened: usize,
    pub containers_closed: usize,
    pub components: usize,
}

/// Stack machine turning directory visits into nested markup
pub struct NestingReconciler<'r> {
    registry: &'r mut IdentityRegistry,
    root: NormalizedPath,
    root_frame: ContainerFrame,
    current_path: NormalizedPath,
    open_frames: Vec<ContainerFrame>,
    current_depth: usize,
    summary: ReconcileSummary,
}

impl<'r> NestingReconciler<'r> {
    /// Start reconciling below `root`
    ///
    /// `root_frame` describes the container the surrounding template opened
    /// for the root directory; its children start one level deeper.
    pub fn new(
        registry: &'r mut IdentityRegistry,
        root: NormalizedPath,
        root_frame: ContainerFrame,
    ) -> Self {
        Self {
            registry,
            current_path: root.clone(),
            current_depth: root_frame.depth + 1,
            root,
            root_frame,
            open_frames: Vec::new(),
            summary: ReconcileSummary::default(),
        }
    }

    /// Depth at which the next element will be written
    pub fn current_depth(&self) -> usize {
        self.current_depth
    }

    /// Containers currently open, outermost first
    pub fn open_frames(&self) -> &[ContainerFrame] {
        &self.open_frames
    }

    /// Move from the previous directory to `visit` and emit its files
    ///
    /// Visits must arrive in pre-order and lie below the root. A visit
    /// outside the root trips a debug assertion.
    pub fn visit<S: MarkupSink>(&mut self, visit: &DirectoryVisit, sink: &mut S) -> Result<()> {
        let (close, open) = {
            let tails = divergence(&self.current_path, &visit.path);
            (tails.left.len(), tails.right.to_vec())
        };

        self.close_frames(close, sink)?;

        for name in open {
            let frame = ContainerFrame {
                index: self.registry.containers_issued() + 1,
                id: self.registry.next_container_id(),
                name,
                depth: self.current_depth,
            };
            trace!(id = %frame.id, name = %frame.name, depth = frame.depth, "open container");
            sink.open_container(&frame)?;
            self.open_frames.push(frame);
            self.current_depth += 1;
            self.summary.containers_opened += 1;
        }

        let dir = visit.path.to_string();
        for file in &visit.files {
            let token = self.registry.new_instance_token();
            let component = self.registry.next_component_id(token);
            let record = LeafRecord {
                component_id: component.id,
                instance_token: component.instance_token,
                source: slash_join([dir.as_str(), file.as_str()]),
            };
            trace!(id = %record.component_id, source = %record.source, "emit component");
            sink.leaf(&record)?;
            self.summary.components += 1;
        }

        self.current_path = visit.path.clone();
        Ok(())
    }

    /// Close every open container and the root container itself
    pub fn finish<S: MarkupSink>(mut self, sink: &mut S) -> Result<ReconcileSummary> {
        let remaining = divergence(&self.current_path, &self.root).left.len();
        self.close_frames(remaining, sink)?;

        self.current_depth -= 1;
        sink.close_container(&self.root_frame)?;

        Ok(self.summary)
    }

    fn close_frames<S: MarkupSink>(&mut self, count: usize, sink: &mut S) -> Result<()> {
        debug_assert!(count <= self.open_frames.len());
        for _ in 0..count {
            let Some(frame) = self.open_frames.pop() else {
                break;
            };
            self.current_depth -= 1;
            trace!(id = %frame.id, depth = frame.depth, "close container");
            sink.close_container(&frame)?;
            self.summary.containers_closed += 1;
        }
        Ok(())
    }
}
