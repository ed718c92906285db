//! `Credits.xml` and its platform variants.
//!
//! Categories mix sections, entries, blank lines, images and file
//! includes in an order that matters for display, so every container here
//! keeps its children in one [`OrderedList`].

use bme_model::{
    ElementBuilder, ListVariant, NodeReader, OrderedList, ParseContext, RoundTripNode, Scalar,
    Unknown, XmlBool, XmlElement,
};

/// Tag order the old regrouping writer used inside a category.
pub const LEGACY_CATEGORY_ORDER: [&str; 5] =
    ["Section", "Entry", "EmptyLine", "LoadFromFile", "Image"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credits {
    pub items: OrderedList<CreditsItem>,
    pub unknown: Unknown,
}

impl Credits {
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.items.known().filter_map(|item| match item {
            CreditsItem::Category(category) => Some(category),
            CreditsItem::LoadFromFile(_) => None,
        })
    }

    pub fn includes(&self) -> impl Iterator<Item = &LoadFromFile> {
        self.items.known().filter_map(|item| match item {
            CreditsItem::LoadFromFile(include) => Some(include),
            CreditsItem::Category(_) => None,
        })
    }
}

impl RoundTripNode for Credits {
    const TAG: &'static str = "Credits";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let items = reader.ordered();
        Self {
            items,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .ordered(&self.items)
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CreditsItem {
    Category(Category),
    LoadFromFile(LoadFromFile),
}

impl ListVariant for CreditsItem {
    fn parse_tagged(element: &XmlElement, ctx: &mut ParseContext) -> Option<Self> {
        match element.name.as_str() {
            "Category" => Some(Self::Category(ctx.parse(element))),
            "LoadFromFile" => Some(Self::LoadFromFile(ctx.parse(element))),
            _ => None,
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            Self::Category(_) => Category::TAG,
            Self::LoadFromFile(_) => LoadFromFile::TAG,
        }
    }

    fn to_tree(&self) -> XmlElement {
        match self {
            Self::Category(node) => node.to_tree(),
            Self::LoadFromFile(node) => node.to_tree(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Category {
    pub text: Option<String>,
    pub items: OrderedList<CategoryItem>,
    pub unknown: Unknown,
}

impl Category {
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.items.known().filter_map(|item| match item {
            CategoryItem::Section(section) => Some(section),
            _ => None,
        })
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.items.known().filter_map(|item| match item {
            CategoryItem::Entry(entry) => Some(entry),
            _ => None,
        })
    }

    /// The category as the regrouping writer laid it out: all sections,
    /// then all entries, and so on.
    pub fn to_legacy_tree(&self) -> XmlElement {
        let mut builder = ElementBuilder::new(Self::TAG).attr("Text", self.text.as_deref());
        for (_, child) in self.items.regrouped_by_tag(&LEGACY_CATEGORY_ORDER) {
            builder = builder.child(child);
        }
        builder.finish(&self.unknown)
    }
}

impl RoundTripNode for Category {
    const TAG: &'static str = "Category";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let text = reader.attr("Text");
        let items = reader.ordered();
        Self {
            text,
            items,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("Text", self.text.as_deref())
            .ordered(&self.items)
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CategoryItem {
    Section(Section),
    Entry(Entry),
    EmptyLine(EmptyLine),
    LoadFromFile(LoadFromFile),
    Image(Image),
}

impl ListVariant for CategoryItem {
    fn parse_tagged(element: &XmlElement, ctx: &mut ParseContext) -> Option<Self> {
        match element.name.as_str() {
            "Section" => Some(Self::Section(ctx.parse(element))),
            "Entry" => Some(Self::Entry(ctx.parse(element))),
            "EmptyLine" => Some(Self::EmptyLine(ctx.parse(element))),
            "LoadFromFile" => Some(Self::LoadFromFile(ctx.parse(element))),
            "Image" => Some(Self::Image(ctx.parse(element))),
            _ => None,
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            Self::Section(_) => Section::TAG,
            Self::Entry(_) => Entry::TAG,
            Self::EmptyLine(_) => EmptyLine::TAG,
            Self::LoadFromFile(_) => LoadFromFile::TAG,
            Self::Image(_) => Image::TAG,
        }
    }

    fn to_tree(&self) -> XmlElement {
        match self {
            Self::Section(node) => node.to_tree(),
            Self::Entry(node) => node.to_tree(),
            Self::EmptyLine(node) => node.to_tree(),
            Self::LoadFromFile(node) => node.to_tree(),
            Self::Image(node) => node.to_tree(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    pub text: Option<String>,
    pub items: OrderedList<SectionItem>,
    pub unknown: Unknown,
}

impl RoundTripNode for Section {
    const TAG: &'static str = "Section";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let text = reader.attr("Text");
        let items = reader.ordered();
        Self {
            text,
            items,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("Text", self.text.as_deref())
            .ordered(&self.items)
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionItem {
    Entry(Entry),
    EmptyLine(EmptyLine),
}

impl ListVariant for SectionItem {
    fn parse_tagged(element: &XmlElement, ctx: &mut ParseContext) -> Option<Self> {
        match element.name.as_str() {
            "Entry" => Some(Self::Entry(ctx.parse(element))),
            "EmptyLine" => Some(Self::EmptyLine(ctx.parse(element))),
            _ => None,
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            Self::Entry(_) => Entry::TAG,
            Self::EmptyLine(_) => EmptyLine::TAG,
        }
    }

    fn to_tree(&self) -> XmlElement {
        match self {
            Self::Entry(node) => node.to_tree(),
            Self::EmptyLine(node) => node.to_tree(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entry {
    pub text: Option<String>,
    pub empty_lines: Vec<EmptyLine>,
    pub unknown: Unknown,
}

impl Entry {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

impl RoundTripNode for Entry {
    const TAG: &'static str = "Entry";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let text = reader.attr("Text");
        let empty_lines = reader.repeated();
        Self {
            text,
            empty_lines,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("Text", self.text.as_deref())
            .repeated(&self.empty_lines)
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmptyLine {
    pub unknown: Unknown,
}

impl RoundTripNode for EmptyLine {
    const TAG: &'static str = "EmptyLine";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        Self {
            unknown: NodeReader::new(element, ctx).finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG).finish(&self.unknown)
    }
}

/// Pulls another credits file in at this position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadFromFile {
    pub name: Option<String>,
    pub platform_specific: Option<Scalar<XmlBool>>,
    pub console_specific: Option<Scalar<XmlBool>>,
    pub unknown: Unknown,
}

impl RoundTripNode for LoadFromFile {
    const TAG: &'static str = "LoadFromFile";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let name = reader.attr("Name");
        let platform_specific = reader.scalar("PlatformSpecific");
        let console_specific = reader.scalar("ConsoleSpecific");
        Self {
            name,
            platform_specific,
            console_specific,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("Name", self.name.as_deref())
            .scalar("PlatformSpecific", self.platform_specific.as_ref())
            .scalar("ConsoleSpecific", self.console_specific.as_ref())
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Image {
    pub text: Option<String>,
    pub unknown: Unknown,
}

impl RoundTripNode for Image {
    const TAG: &'static str = "Image";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let text = reader.attr("Text");
        Self {
            text,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("Text", self.text.as_deref())
            .finish(&self.unknown)
    }
}
