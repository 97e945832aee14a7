use std::collections::HashMap;

use tracing::debug;

use crate::config::GraphConfig;
use crate::error::{GraphError, Result};
use crate::media::keys::KeyedRegistry;
use crate::media::types::{InputSource, MediaBlock, OutputSource, SourceKey, VisualFilter};
use super::types::{Filter, FilterGraph, InputMedia, MediaNode, Node, NodeId, SourceOf, StreamKind};

/// Lowers one output's media blocks into a `FilterGraph`
///
/// Every block becomes a video leg and an audio leg; the root concatenates
/// all legs and yields one video and one audio stream. Input keys get
/// zero-based `-i` indices in order of first appearance.
pub struct FilterBuilder<'a> {
    inputs: &'a KeyedRegistry<InputSource>,
    config: &'a GraphConfig,
    key_index: HashMap<SourceKey, usize>,
    graph: FilterGraph,
}

impl<'a> FilterBuilder<'a> {
    pub fn new(inputs: &'a KeyedRegistry<InputSource>, config: &'a GraphConfig) -> Self {
        Self {
            inputs,
            config,
            key_index: HashMap::new(),
            graph: FilterGraph::new(),
        }
    }

    /// Build the graph for `output`, consuming the builder
    pub fn build(mut self, output: &OutputSource) -> Result<FilterGraph> {
        let root = self.visit_output_source(output)?;
        self.graph.set_root(root);
        Ok(self.graph)
    }

    fn visit_output_source(&mut self, output: &OutputSource) -> Result<NodeId> {
        if output.media_block_list.is_empty() {
            return Err(GraphError::InvalidBlock {
                details: format!("output {} has no media blocks", output.file_path.display()),
            }
            .into());
        }

        let mut children = Vec::with_capacity(output.media_block_list.len() * 2);
        for block in &output.media_block_list {
            children.extend(self.visit_media_block(block)?);
        }

        let concat = Filter::new("concat")
            .kwarg("n", output.media_block_list.len())
            .kwarg("v", 1)
            .kwarg("a", 1);

        debug!(
            "Lowered {} blocks for {:?} into {} nodes",
            output.media_block_list.len(),
            output.file_path,
            self.graph.len() + 1
        );

        Ok(self.graph.push(Node::Media(MediaNode {
            children,
            filters: vec![concat],
            outputs: 2,
            output_path: Some(output.file_path.clone()),
        })))
    }

    fn visit_media_block(&mut self, block: &MediaBlock) -> Result<[NodeId; 2]> {
        let input = self.visit_input_source(&block.input_key)?;

        let mut leg = |kind: StreamKind| {
            let leaf = self.graph.push(Node::Source(SourceOf {
                source: input.clone(),
                kind,
            }));
            let filters = self.trim_with_speed(block, kind);
            self.graph.push(Node::Media(MediaNode {
                children: vec![leaf],
                filters,
                outputs: 1,
                output_path: None,
            }))
        };

        let video = leg(StreamKind::Video);
        let audio = leg(StreamKind::Audio);
        Ok([video, audio])
    }

    fn trim_with_speed(&self, block: &MediaBlock, kind: StreamKind) -> Vec<Filter> {
        let mut filters = vec![
            Filter::new(kind.filter_name("trim"))
                .kwarg("start", block.start_point)
                .kwarg("end", block.end_point),
            Filter::with_args(kind.filter_name("setpts"), "PTS-STARTPTS"),
        ];

        if block.speed != 1.0 {
            match kind {
                StreamKind::Video => {
                    filters.push(Filter::with_args("setpts", format!("PTS*{}", 1.0 / block.speed)));
                    if self.config.motion_interpolation {
                        filters.push(
                            Filter::new("minterpolate")
                                .kwarg("mi_mode", "mci")
                                .kwarg("mc_mode", "aobmc")
                                .kwarg("vsbmc", 1),
                        );
                    }
                }
                StreamKind::Audio => {
                    filters.push(Filter::with_args("atempo", block.speed.to_string()));
                }
            }
        }

        if kind == StreamKind::Video {
            filters.extend(block.filter_list.iter().map(visual_filter));
        }

        filters
    }

    fn visit_input_source(&mut self, key: &SourceKey) -> Result<InputMedia> {
        let input = self
            .inputs
            .get(key)
            .ok_or_else(|| GraphError::UnknownInput { key: key.to_string() })?;

        let next = self.key_index.len();
        let index = *self.key_index.entry(key.clone()).or_insert(next);

        Ok(InputMedia {
            index,
            file_path: input.file_path.clone(),
        })
    }
}

fn visual_filter(filter: &VisualFilter) -> Filter {
    match filter {
        VisualFilter::Rotate { degrees } => Filter::with_args("rotate", format!("{}*PI/180", degrees)),
        VisualFilter::Transpose { dir } => Filter::new("transpose").kwarg("dir", dir),
        VisualFilter::Crop { width, height, x, y } => Filter::new("crop")
            .kwarg("w", width)
            .kwarg("h", height)
            .kwarg("x", x)
            .kwarg("y", y),
    }
}
