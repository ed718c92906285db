//! Round-trip behavior of the node protocol on small hand-written schemas.

use bme_model::{
    Document, ElementBuilder, ErrorPolicy, ListVariant, ModelError, NodeReader, NodeState,
    Optional, OrderedList, ParseContext, PresenceFlag, RoundTripNode, Scalar, Unknown, XmlElement,
    structural_diff, structurally_equal,
};

macro_rules! leaf_node {
    ($name:ident, $tag:literal) => {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct $name {
            x: Option<Scalar<i32>>,
            unknown: Unknown,
        }

        impl RoundTripNode for $name {
            const TAG: &'static str = $tag;

            fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
                let mut reader = NodeReader::new(element, ctx);
                let x = reader.scalar("x");
                Self {
                    x,
                    unknown: reader.finish(),
                }
            }

            fn to_tree(&self) -> XmlElement {
                ElementBuilder::new(Self::TAG)
                    .scalar("x", self.x.as_ref())
                    .finish(&self.unknown)
            }
        }
    };
}

leaf_node!(A, "a");
leaf_node!(B, "b");
leaf_node!(C, "c");

#[derive(Debug, Default)]
struct Root {
    a: Optional<A>,
    b: Optional<B>,
    c: Optional<C>,
    unknown: Unknown,
}

impl RoundTripNode for Root {
    const TAG: &'static str = "root";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let a = reader.optional();
        let b = reader.optional();
        let c = reader.optional();
        Self {
            a,
            b,
            c,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .optional(&self.a)
            .optional(&self.b)
            .optional(&self.c)
            .finish(&self.unknown)
    }
}

fn sample_root() -> XmlElement {
    XmlElement::new("root")
        .with_child(XmlElement::new("a").with_attribute("x", "1"))
        .with_child(XmlElement::new("b"))
}

#[test]
fn presence_of_declared_optionals() {
    let (root, diagnostics) = Root::parse_standalone(&sample_root());
    assert!(diagnostics.is_clean());
    assert_eq!(root.a.presence(), PresenceFlag::PresentWithValues);
    assert_eq!(root.b.presence(), PresenceFlag::PresentEmpty);
    assert_eq!(root.c.presence(), PresenceFlag::Absent);

    let written = root.to_tree();
    assert_eq!(written, sample_root());
    assert!(written.first_element("c").is_none());
}

#[test]
fn unknown_child_survives() {
    let source = XmlElement::new("root")
        .with_child(XmlElement::new("a").with_attribute("x", "1"))
        .with_child(XmlElement::new("foo"))
        .with_child(XmlElement::new("b"));
    let (root, _) = Root::parse_standalone(&source);
    assert_eq!(root.unknown.tags().collect::<Vec<_>>(), ["foo"]);
    assert_eq!(root.to_tree(), source);
}

#[test]
fn malformed_scalar_is_collected_and_kept_raw() {
    let source = XmlElement::new("root")
        .with_child(XmlElement::new("a").with_attribute("x", "one"))
        .with_child(XmlElement::new("b").with_attribute("x", "2"));
    let (root, diagnostics) = Root::parse_standalone(&source);
    assert_eq!(diagnostics.len(), 1);
    let error = &diagnostics.errors()[0];
    assert_eq!(error.path, "root/a");
    assert_eq!(error.field, "x");
    assert_eq!(error.raw_value, "one");
    assert_eq!(root.b.get().and_then(|b| b.x.as_ref()).and_then(Scalar::value), Some(&2));
    assert_eq!(root.to_tree(), source);
}

#[test]
fn emptied_child_is_written_empty_not_dropped() {
    let (mut root, _) = Root::parse_standalone(&sample_root());
    if let Some(a) = root.a.get_mut() {
        a.x = None;
    }
    assert_eq!(root.a.refresh(), PresenceFlag::PresentEmpty);
    let written = root.to_tree();
    assert_eq!(written.first_element("a"), Some(&XmlElement::new("a")));

    root.b.take();
    assert!(root.to_tree().first_element("b").is_none());
}

#[test]
fn setting_an_absent_child_emits_it() {
    let (mut root, _) = Root::parse_standalone(&sample_root());
    root.c.set(C {
        x: Some(Scalar::new(5)),
        unknown: Unknown::default(),
    });
    assert_eq!(root.c.presence(), PresenceFlag::PresentWithValues);
    let written = root.to_tree();
    let tags: Vec<&str> = written.elements().map(|e| e.name.as_str()).collect();
    assert_eq!(tags, ["a", "b", "c"]);
}

#[test]
fn document_lifecycle() {
    let mut document = Document::<Root>::parse(&sample_root(), ErrorPolicy::FailFast).unwrap();
    assert_eq!(document.state(), NodeState::Parsed);
    document.edit(|root| root.b.take()).unwrap();
    assert_eq!(document.state(), NodeState::Edited);
    let written = document.serialize().unwrap();
    assert_eq!(document.state(), NodeState::Serialized);
    assert_eq!(written.elements().count(), 1);
    document.edit(|_| ()).unwrap();
    assert_eq!(document.state(), NodeState::Edited);
}

#[test]
fn unparsed_document_rejects_serialize() {
    let mut document = Document::<Root>::new();
    let err = document.serialize().unwrap_err();
    assert!(matches!(
        err,
        ModelError::InvalidTransition {
            state: NodeState::Unparsed,
            ..
        }
    ));
    assert!(document.load(&sample_root(), ErrorPolicy::default()).is_ok());
    assert!(matches!(
        document.load(&sample_root(), ErrorPolicy::default()),
        Err(ModelError::InvalidTransition { .. })
    ));
}

#[test]
fn wrong_root_is_rejected() {
    let err = Document::<Root>::parse(&XmlElement::new("other"), ErrorPolicy::default())
        .unwrap_err();
    assert!(err.to_string().contains("<root>"));
}

#[test]
fn fail_fast_rejects_malformed_document() {
    let source = XmlElement::new("root").with_child(XmlElement::new("a").with_attribute("x", "?"));
    assert!(matches!(
        Document::<Root>::parse(&source, ErrorPolicy::FailFast),
        Err(ModelError::ParseFailed { count: 1, .. })
    ));
    let document = Document::<Root>::parse(&source, ErrorPolicy::WarnAndContinue).unwrap();
    assert_eq!(document.diagnostics().len(), 1);
}

#[derive(Debug, Clone, PartialEq)]
enum Line {
    A(A),
    B(B),
    C(C),
}

impl ListVariant for Line {
    fn parse_tagged(element: &XmlElement, ctx: &mut ParseContext) -> Option<Self> {
        match element.name.as_str() {
            A::TAG => Some(Line::A(ctx.parse(element))),
            B::TAG => Some(Line::B(ctx.parse(element))),
            C::TAG => Some(Line::C(ctx.parse(element))),
            _ => None,
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            Line::A(_) => A::TAG,
            Line::B(_) => B::TAG,
            Line::C(_) => C::TAG,
        }
    }

    fn to_tree(&self) -> XmlElement {
        match self {
            Line::A(node) => node.to_tree(),
            Line::B(node) => node.to_tree(),
            Line::C(node) => node.to_tree(),
        }
    }
}

#[derive(Debug)]
struct Listing {
    name: Option<String>,
    lines: OrderedList<Line>,
    unknown: Unknown,
}

impl RoundTripNode for Listing {
    const TAG: &'static str = "listing";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let name = reader.attr("name");
        let lines = reader.ordered();
        Self {
            name,
            lines,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("name", self.name.as_deref())
            .ordered(&self.lines)
            .finish(&self.unknown)
    }
}

#[test]
fn interleaved_order_is_preserved() {
    let source = XmlElement::new("listing")
        .with_child(XmlElement::new("a"))
        .with_child(XmlElement::new("b"))
        .with_child(XmlElement::new("c"))
        .with_child(XmlElement::new("b"));
    let (listing, _) = Listing::parse_standalone(&source);
    assert_eq!(listing.lines.tags(), ["a", "b", "c", "b"]);
    let written = listing.to_tree();
    assert!(structural_diff(&source, &written).is_empty());

    let legacy: Vec<String> = listing
        .lines
        .regrouped_by_tag(&["a", "b", "c"])
        .into_iter()
        .map(|(tag, _)| tag)
        .collect();
    assert_eq!(legacy, ["a", "b", "b", "c"]);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn leaf() -> impl Strategy<Value = XmlElement> {
        (
            prop::sample::select(vec!["a", "b", "c", "z"]),
            prop::collection::btree_map("[a-z]{1,3}", "[A-Za-z0-9 ._-]{0,6}", 0..3),
            prop::option::of("[A-Za-z0-9]{1,8}"),
        )
            .prop_map(|(tag, attributes, text)| {
                let mut element = XmlElement::new(tag);
                for (name, value) in attributes {
                    element.set_attribute(name, value);
                }
                if let Some(text) = text {
                    element.push_text(text);
                }
                element
            })
    }

    fn element() -> impl Strategy<Value = XmlElement> {
        leaf().prop_recursive(3, 24, 4, |inner| {
            (
                prop::sample::select(vec!["a", "b", "c", "z"]),
                prop::collection::vec(inner, 0..4),
            )
                .prop_map(|(tag, children)| {
                    let mut element = XmlElement::new(tag);
                    for child in children {
                        element.push_child(child);
                    }
                    element
                })
        })
    }

    proptest! {
        #[test]
        fn unedited_listing_reproduces_source(
            name in prop::option::of("[a-z]{1,5}"),
            children in prop::collection::vec(element(), 0..6),
        ) {
            let mut source = XmlElement::new("listing");
            if let Some(name) = name {
                source.set_attribute("name", name);
            }
            for child in children {
                source.push_child(child);
            }
            let (listing, _) = Listing::parse_standalone(&source);
            let written = listing.to_tree();
            prop_assert!(structurally_equal(&source, &written), "{:?}", structural_diff(&source, &written));
        }

        #[test]
        fn classify_never_reports_absent_for_an_element(element in element()) {
            prop_assert_ne!(PresenceFlag::classify(Some(&element)), PresenceFlag::Absent);
        }
    }
}
