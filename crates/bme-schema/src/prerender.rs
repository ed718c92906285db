//! `prerender.xml`: the post-effect graphs the renderer runs before the
//! main pass.
//!
//! Graphs sit one level below the document root, inside `postfx_graphs`,
//! so they are indexed from a parsed document with
//! [`Prerender::graph_collection`] rather than streamed.

use bme_ingest::{IndexedCollection, IndexedEntity, Result as IngestResult, SecondaryIndex};
use bme_model::{
    ElementBuilder, NodeReader, Optional, ParseContext, RoundTripNode, Scalar, Unknown, XmlBool,
    XmlElement, scalar_or,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prerender {
    pub base_type: Option<String>,
    pub graphs: Optional<PostfxGraphs>,
    pub unknown: Unknown,
}

impl Prerender {
    pub fn graphs(&self) -> &[PostfxGraph] {
        self.graphs
            .get()
            .map(|graphs| graphs.graphs.as_slice())
            .unwrap_or_default()
    }

    /// Copies every graph into a collection carrying the graph indexes.
    pub fn graph_collection(&self) -> IngestResult<IndexedCollection<PostfxGraph>> {
        let mut collection = IndexedCollection::for_entity();
        collection.ingest_chunk(self.graphs().to_vec(), 0)?;
        Ok(collection)
    }
}

impl RoundTripNode for Prerender {
    const TAG: &'static str = "base";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let base_type = reader.attr("type");
        let graphs = reader.optional();
        Self {
            base_type,
            graphs,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("type", self.base_type.as_deref())
            .optional(&self.graphs)
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostfxGraphs {
    pub graphs: Vec<PostfxGraph>,
    pub unknown: Unknown,
}

impl RoundTripNode for PostfxGraphs {
    const TAG: &'static str = "postfx_graphs";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let graphs = reader.repeated();
        Self {
            graphs,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .repeated(&self.graphs)
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostfxGraph {
    pub id: Option<String>,
    pub nodes: Vec<PostfxNode>,
    pub unknown: Unknown,
}

impl PostfxGraph {
    pub fn node(&self, id: &str) -> Option<&PostfxNode> {
        self.nodes.iter().find(|node| node.id.as_deref() == Some(id))
    }

    /// Distinct input sources across all nodes, in document order.
    pub fn input_sources(&self) -> Vec<String> {
        let mut sources: Vec<String> = Vec::new();
        for source in self
            .nodes
            .iter()
            .flat_map(|node| &node.inputs)
            .filter_map(|input| input.source.as_ref())
        {
            if !sources.contains(source) {
                sources.push(source.clone());
            }
        }
        sources
    }
}

impl RoundTripNode for PostfxGraph {
    const TAG: &'static str = "postfx_graph";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let id = reader.attr("id");
        let nodes = reader.repeated();
        Self {
            id,
            nodes,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("id", self.id.as_deref())
            .repeated(&self.nodes)
            .finish(&self.unknown)
    }
}

impl IndexedEntity for PostfxGraph {
    const ROOT_TAG: &'static str = "postfx_graphs";

    fn indexes() -> Vec<SecondaryIndex<Self>> {
        vec![
            SecondaryIndex::single("by_id", |graph: &PostfxGraph| graph.id.clone()),
            SecondaryIndex::new("by_input_source", |graph: &PostfxGraph| {
                Ok(graph.input_sources())
            }),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostfxNode {
    pub id: Option<String>,
    pub class: Option<String>,
    pub shader: Option<String>,
    pub format: Option<String>,
    pub size: Option<String>,
    pub width: Option<Scalar<f32>>,
    pub height: Option<Scalar<f32>>,
    pub compute: Option<Scalar<XmlBool>>,
    pub compute_tg_size_x: Option<Scalar<u32>>,
    pub compute_tg_size_y: Option<Scalar<u32>>,
    pub inputs: Vec<Input>,
    pub preconditions: Optional<Preconditions>,
    pub unknown: Unknown,
}

impl PostfxNode {
    pub fn is_compute(&self) -> bool {
        scalar_or(&self.compute, XmlBool(false)).0
    }
}

impl RoundTripNode for PostfxNode {
    const TAG: &'static str = "postfx_node";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let id = reader.attr("id");
        let class = reader.attr("class");
        let shader = reader.attr("shader");
        let format = reader.attr("format");
        let size = reader.attr("size");
        let width = reader.scalar("width");
        let height = reader.scalar("height");
        let compute = reader.scalar("compute");
        let compute_tg_size_x = reader.scalar("compute_tg_size_x");
        let compute_tg_size_y = reader.scalar("compute_tg_size_y");
        let inputs = reader.repeated();
        let preconditions = reader.optional();
        Self {
            id,
            class,
            shader,
            format,
            size,
            width,
            height,
            compute,
            compute_tg_size_x,
            compute_tg_size_y,
            inputs,
            preconditions,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("id", self.id.as_deref())
            .attr("class", self.class.as_deref())
            .attr("shader", self.shader.as_deref())
            .attr("format", self.format.as_deref())
            .attr("size", self.size.as_deref())
            .scalar("width", self.width.as_ref())
            .scalar("height", self.height.as_ref())
            .scalar("compute", self.compute.as_ref())
            .scalar("compute_tg_size_x", self.compute_tg_size_x.as_ref())
            .scalar("compute_tg_size_y", self.compute_tg_size_y.as_ref())
            .repeated(&self.inputs)
            .optional(&self.preconditions)
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Input {
    pub index: Option<Scalar<u32>>,
    pub input_type: Option<String>,
    pub source: Option<String>,
    pub unknown: Unknown,
}

impl RoundTripNode for Input {
    const TAG: &'static str = "input";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let index = reader.scalar("index");
        let input_type = reader.attr("type");
        let source = reader.attr("source");
        Self {
            index,
            input_type,
            source,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .scalar("index", self.index.as_ref())
            .attr("type", self.input_type.as_deref())
            .attr("source", self.source.as_deref())
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preconditions {
    pub configs: Vec<Config>,
    pub unknown: Unknown,
}

impl RoundTripNode for Preconditions {
    const TAG: &'static str = "preconditions";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let configs = reader.repeated();
        Self {
            configs,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .repeated(&self.configs)
            .finish(&self.unknown)
    }
}

/// A render config name the node is gated on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub name: Option<String>,
    pub unknown: Unknown,
}

impl RoundTripNode for Config {
    const TAG: &'static str = "config";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let name = reader.attr("name");
        Self {
            name,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("name", self.name.as_deref())
            .finish(&self.unknown)
    }
}
