pub mod builder;
pub mod compare;
pub mod context;
pub mod error;
pub mod lifecycle;
pub mod mapper;
pub mod node;
pub mod ordered;
pub mod presence;
pub mod reader;
pub mod scalar;
pub mod tree;

pub use builder::ElementBuilder;
pub use compare::{Difference, DifferenceKind, structural_diff, structurally_equal};
pub use context::{Diagnostics, ErrorPolicy, ParseContext, ParseError};
pub use error::{ModelError, Result};
pub use lifecycle::{Document, NodeState};
pub use mapper::{Mapper, rederive_presence};
pub use node::{AnchoredElement, Optional, RoundTripNode, Unknown};
pub use ordered::{ListItem, ListVariant, OrderedList};
pub use presence::PresenceFlag;
pub use reader::NodeReader;
pub use scalar::{Scalar, XmlBool, scalar_or};
pub use tree::{Attribute, XmlDeclaration, XmlDocument, XmlElement, XmlNode};
