use std::path::PathBuf;

use tracing::debug;

use crate::config::FfmpegConfig;
use crate::error::{GraphError, Result};
use super::types::{FilterGraph, MediaNode, Node, NodeId, SourceOf};

/// A fully serialized ffmpeg invocation
#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegCommand {
    pub program: String,
    /// Input paths, position = `-i` index
    pub inputs: Vec<PathBuf>,
    pub filter_complex: String,
    /// Root output labels, one `-map` each
    pub maps: Vec<String>,
    pub quality_flags: Vec<String>,
    pub output: PathBuf,
    /// Pass `-y` so an existing output is replaced without prompting
    pub overwrite: bool,
}

impl FfmpegCommand {
    /// Arguments after the program name
    pub fn arguments(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.inputs.len() * 2 + self.maps.len() * 2 + 5);

        if self.overwrite {
            args.push("-y".to_string());
        }

        for input in &self.inputs {
            args.push("-i".to_string());
            args.push(input.display().to_string());
        }

        args.push("-filter_complex".to_string());
        args.push(self.filter_complex.clone());

        for label in &self.maps {
            args.push("-map".to_string());
            args.push(label.clone());
        }

        args.extend(self.quality_flags.iter().cloned());
        args.push(self.output.display().to_string());
        args
    }

    /// Full command line, program name first
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![self.program.clone()];
        args.extend(self.arguments());
        args
    }
}

/// Serializes a `FilterGraph` into `-filter_complex` text and arguments
///
/// The walk is depth-first pre-order. Each internal node gets fresh
/// `[z<n>]` labels from a counter that only ever increases, so no two
/// nodes of one graph share a label.
pub struct CommandBuilder<'a> {
    graph: &'a FilterGraph,
    stream: String,
    next_label: usize,
    inputs: Vec<Option<PathBuf>>,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(graph: &'a FilterGraph) -> Self {
        Self {
            graph,
            stream: String::new(),
            next_label: 1,
            inputs: Vec::new(),
        }
    }

    /// Serialize the whole graph into a command for `config.program`
    pub fn build(mut self, config: &FfmpegConfig) -> Result<FfmpegCommand> {
        let root = self.graph.root().ok_or(GraphError::EmptyGraph)?;
        let maps = self.visit(root);

        let output = match self.graph.node(root) {
            Node::Media(MediaNode { output_path: Some(path), .. }) => path.clone(),
            _ => return Err(GraphError::MissingOutputPath.into()),
        };

        let inputs = self
            .inputs
            .into_iter()
            .enumerate()
            .map(|(index, path)| path.ok_or(GraphError::MissingInput { index }))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(
            "Serialized graph: {} inputs, {} labels, {} bytes",
            inputs.len(),
            self.next_label - 1,
            self.stream.len()
        );

        Ok(FfmpegCommand {
            program: config.program.clone(),
            inputs,
            filter_complex: self.stream,
            maps,
            quality_flags: config.quality_flags.clone(),
            output,
            overwrite: config.overwrite_existing,
        })
    }

    fn visit(&mut self, id: NodeId) -> Vec<String> {
        let graph = self.graph;
        match graph.node(id) {
            Node::Media(media) => self.visit_media(media),
            Node::Source(source) => vec![self.visit_source_of(source)],
        }
    }

    fn visit_media(&mut self, media: &MediaNode) -> Vec<String> {
        let mut child_labels = String::new();
        for &child in &media.children {
            for label in self.visit(child) {
                child_labels.push_str(&label);
            }
            if let Node::Media(_) = self.graph.node(child) {
                self.stream.push(';');
            }
        }
        self.stream.push_str(&child_labels);

        let chain: Vec<String> = media.filters.iter().map(|f| f.to_string()).collect();
        self.stream.push_str(&chain.join(","));

        let labels: Vec<String> = (0..media.outputs).map(|_| self.next_label()).collect();
        for label in &labels {
            self.stream.push_str(label);
        }
        labels
    }

    fn visit_source_of(&mut self, source_of: &SourceOf) -> String {
        let index = source_of.source.index;
        if self.inputs.len() <= index {
            self.inputs.resize(index + 1, None);
        }
        if self.inputs[index].is_none() {
            self.inputs[index] = Some(source_of.source.file_path.clone());
        }

        format!("[{}:{}]", index, source_of.kind.tag())
    }

    fn next_label(&mut self) -> String {
        let label = format!("[z{}]", self.next_label);
        self.next_label += 1;
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{Filter, InputMedia, StreamKind};
    use std::collections::HashSet;

    fn leaf(graph: &mut FilterGraph, index: usize, path: &str, kind: StreamKind) -> NodeId {
        graph.push(Node::Source(SourceOf {
            source: InputMedia { index, file_path: PathBuf::from(path) },
            kind,
        }))
    }

    fn chain(graph: &mut FilterGraph, child: NodeId, filter: Filter) -> NodeId {
        graph.push(Node::Media(MediaNode {
            children: vec![child],
            filters: vec![filter],
            outputs: 1,
            output_path: None,
        }))
    }

    fn two_input_graph() -> FilterGraph {
        let mut graph = FilterGraph::new();
        let v0 = leaf(&mut graph, 0, "a.mp4", StreamKind::Video);
        let v0 = chain(&mut graph, v0, Filter::with_args("setpts", "PTS-STARTPTS"));
        let a0 = leaf(&mut graph, 0, "a.mp4", StreamKind::Audio);
        let a0 = chain(&mut graph, a0, Filter::with_args("asetpts", "PTS-STARTPTS"));
        let v1 = leaf(&mut graph, 1, "b.mp4", StreamKind::Video);
        let v1 = chain(&mut graph, v1, Filter::with_args("setpts", "PTS-STARTPTS"));
        let a1 = leaf(&mut graph, 1, "b.mp4", StreamKind::Audio);
        let a1 = chain(&mut graph, a1, Filter::with_args("asetpts", "PTS-STARTPTS"));
        let root = graph.push(Node::Media(MediaNode {
            children: vec![v0, a0, v1, a1],
            filters: vec![Filter::new("concat").kwarg("n", 2).kwarg("v", 1).kwarg("a", 1)],
            outputs: 2,
            output_path: Some(PathBuf::from("out.mp4")),
        }));
        graph.set_root(root);
        graph
    }

    #[test]
    fn test_serialize_two_inputs() {
        let graph = two_input_graph();
        let command = CommandBuilder::new(&graph).build(&FfmpegConfig::default()).unwrap();

        assert_eq!(
            command.filter_complex,
            "[0:v]setpts=PTS-STARTPTS[z1];[0:a]asetpts=PTS-STARTPTS[z2];\
             [1:v]setpts=PTS-STARTPTS[z3];[1:a]asetpts=PTS-STARTPTS[z4];\
             [z1][z2][z3][z4]concat=n=2:v=1:a=1[z5][z6]"
        );
        assert_eq!(command.inputs, vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")]);
        assert_eq!(command.maps, vec!["[z5]", "[z6]"]);
        assert_eq!(command.output, PathBuf::from("out.mp4"));
    }

    #[test]
    fn test_labels_are_unique_and_monotonic() {
        let graph = two_input_graph();
        let command = CommandBuilder::new(&graph).build(&FfmpegConfig::default()).unwrap();

        let produced: Vec<usize> = command
            .filter_complex
            .split(';')
            .flat_map(|part| {
                // labels after the last filter of each chain are the ones produced
                let tail = part.rsplit(|c: char| c == '=' || c == ',').next().unwrap_or("");
                tail.split('[')
                    .filter_map(|l| l.strip_prefix('z'))
                    .filter_map(|l| l.trim_end_matches(']').parse().ok())
                    .collect::<Vec<_>>()
            })
            .collect();

        assert_eq!(produced, vec![1, 2, 3, 4, 5, 6]);
        let unique: HashSet<_> = produced.iter().collect();
        assert_eq!(unique.len(), produced.len());
    }

    #[test]
    fn test_argument_layout() {
        let graph = two_input_graph();
        let command = CommandBuilder::new(&graph).build(&FfmpegConfig::default()).unwrap();
        let args = command.to_args();

        assert_eq!(&args[..5], &["ffmpeg", "-i", "a.mp4", "-i", "b.mp4"]);
        assert_eq!(args[5], "-filter_complex");
        assert_eq!(&args[7..11], &["-map", "[z5]", "-map", "[z6]"]);
        assert_eq!(&args[11..15], &["-b:v", "10M", "-b:a", "320k"]);
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
        assert!(!args.contains(&"-y".to_string()));
    }

    #[test]
    fn test_overwrite_flag_precedes_inputs() {
        let graph = two_input_graph();
        let config = FfmpegConfig {
            overwrite_existing: true,
            ..FfmpegConfig::default()
        };
        let command = CommandBuilder::new(&graph).build(&config).unwrap();

        assert!(command.overwrite);
        assert_eq!(&command.to_args()[..3], &["ffmpeg", "-y", "-i"]);
    }

    #[test]
    fn test_missing_input_index() {
        let mut graph = FilterGraph::new();
        let v = leaf(&mut graph, 1, "b.mp4", StreamKind::Video);
        let root = graph.push(Node::Media(MediaNode {
            children: vec![v],
            filters: vec![Filter::with_args("setpts", "PTS-STARTPTS")],
            outputs: 1,
            output_path: Some(PathBuf::from("out.mp4")),
        }));
        graph.set_root(root);

        let result = CommandBuilder::new(&graph).build(&FfmpegConfig::default());
        assert!(matches!(
            result,
            Err(crate::error::CompositorError::Graph(GraphError::MissingInput { index: 0 }))
        ));
    }

    #[test]
    fn test_root_without_output_path() {
        let mut graph = FilterGraph::new();
        let v = leaf(&mut graph, 0, "a.mp4", StreamKind::Video);
        let root = chain(&mut graph, v, Filter::with_args("setpts", "PTS-STARTPTS"));
        graph.set_root(root);

        assert!(CommandBuilder::new(&graph).build(&FfmpegConfig::default()).is_err());
    }

    #[test]
    fn test_empty_graph() {
        let graph = FilterGraph::new();
        assert!(CommandBuilder::new(&graph).build(&FfmpegConfig::default()).is_err());
    }
}
