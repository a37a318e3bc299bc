//! In-memory representation of a flat configuration-document schema
//!
//! Only the constructs the compiler understands are modelled: named complex
//! types holding an `all` group of elements, and elements that either point at
//! a type or wrap one level of anonymous type (a repeated element, or a
//! wildcard).

/// A parsed schema document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    /// Target namespace of the schema
    pub target_namespace: Option<String>,
    /// The top-level element declaration naming the document root
    pub root_element: Option<RootElement>,
    /// Named complex types in declaration order
    pub complex_types: Vec<ComplexType>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the top-level element
    pub fn with_root(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.root_element = Some(RootElement {
            name: name.into(),
            type_ref: Some(TypeName::Named(type_name.into())),
        });
        self
    }

    /// Append a complex type
    pub fn with_type(mut self, complex_type: ComplexType) -> Self {
        self.complex_types.push(complex_type);
        self
    }

    /// Name of the type the top-level element is declared with
    pub fn designated_root_type(&self) -> Option<&str> {
        match self.root_element.as_ref()?.type_ref.as_ref()? {
            TypeName::Named(name) => Some(name),
            TypeName::Builtin(_) => None,
        }
    }
}

/// The top-level `xs:element`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootElement {
    /// Tag of the document root
    pub name: String,
    /// Type of the document root
    pub type_ref: Option<TypeName>,
}

/// A type reference with its namespace prefix already resolved
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeName {
    /// A type from the XML Schema namespace, by local name
    Builtin(String),
    /// A type declared in this schema, by local name
    Named(String),
}

impl TypeName {
    /// Built-in type by local name
    pub fn builtin(name: impl Into<String>) -> Self {
        TypeName::Builtin(name.into())
    }

    /// Schema-declared type by name
    pub fn named(name: impl Into<String>) -> Self {
        TypeName::Named(name.into())
    }

    /// Local name of the referenced type
    pub fn local_name(&self) -> &str {
        match self {
            TypeName::Builtin(n) | TypeName::Named(n) => n,
        }
    }
}

/// A named complex type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplexType {
    /// Type name; required by the compiler
    pub name: Option<String>,
    /// Type annotation
    pub annotation: Annotation,
    /// Child elements of the `all` group, in declaration order
    pub elements: Vec<ElementDecl>,
}

impl ComplexType {
    /// Create a named complex type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Set the annotation
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotation = annotation;
        self
    }

    /// Append a child element
    pub fn with_element(mut self, element: ElementDecl) -> Self {
        self.elements.push(element);
        self
    }
}

/// A child element of a complex type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementDecl {
    /// Element name
    pub name: Option<String>,
    /// Explicit `type` attribute
    pub type_ref: Option<TypeName>,
    /// Anonymous inline type
    pub inline: Option<InlineShape>,
    /// Raw `minOccurs` attribute
    pub min_occurs: Option<String>,
    /// Raw `default` attribute
    pub default: Option<String>,
    /// Element annotation
    pub annotation: Annotation,
}

impl ElementDecl {
    /// Element with an explicit type
    pub fn typed(name: impl Into<String>, type_ref: TypeName) -> Self {
        Self {
            name: Some(name.into()),
            type_ref: Some(type_ref),
            min_occurs: Some("0".to_string()),
            ..Default::default()
        }
    }

    /// Element wrapping a sequence of one repeated element
    pub fn list(name: impl Into<String>, item_name: impl Into<String>, item_type: TypeName) -> Self {
        Self {
            name: Some(name.into()),
            inline: Some(InlineShape {
                sequence: vec![SequenceElement::repeated(item_name, item_type)],
                ..Default::default()
            }),
            min_occurs: Some("0".to_string()),
            ..Default::default()
        }
    }

    /// Element wrapping an unbounded wildcard
    pub fn wildcard(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            inline: Some(InlineShape {
                wildcards: vec![Wildcard::unbounded()],
                ..Default::default()
            }),
            min_occurs: Some("0".to_string()),
            ..Default::default()
        }
    }

    /// Set the raw `minOccurs`
    pub fn with_min_occurs(mut self, min_occurs: impl Into<String>) -> Self {
        self.min_occurs = Some(min_occurs.into());
        self
    }

    /// Set the default value
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Set the annotation
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotation = annotation;
        self
    }

    /// Whether the element may be absent
    pub fn is_optional(&self) -> bool {
        self.min_occurs.as_deref().map(str::trim) == Some("0")
    }
}

/// Content of an anonymous inline `xs:complexType`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineShape {
    /// Elements of the inner sequence
    pub sequence: Vec<SequenceElement>,
    /// Wildcards of the inner sequence
    pub wildcards: Vec<Wildcard>,
    /// Local names of particles the compiler does not support
    pub unsupported: Vec<String>,
}

impl InlineShape {
    /// True when the shape holds no particles at all
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty() && self.wildcards.is_empty() && self.unsupported.is_empty()
    }
}

/// An element inside an inline sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceElement {
    /// Element name
    pub name: Option<String>,
    /// Explicit type
    pub type_ref: Option<TypeName>,
    /// Raw `minOccurs`
    pub min_occurs: Option<String>,
    /// Raw `maxOccurs`
    pub max_occurs: Option<String>,
    /// Whether the element carries its own anonymous type
    pub has_inline_type: bool,
}

impl SequenceElement {
    /// An unbounded, typed sequence element
    pub fn repeated(name: impl Into<String>, type_ref: TypeName) -> Self {
        Self {
            name: Some(name.into()),
            type_ref: Some(type_ref),
            min_occurs: Some("0".to_string()),
            max_occurs: Some("unbounded".to_string()),
            has_inline_type: false,
        }
    }

    /// Whether the element may occur more than once
    pub fn is_repeated(&self) -> bool {
        match self.max_occurs.as_deref().map(str::trim) {
            Some("unbounded") => true,
            Some(n) => n.parse::<u64>().map_or(false, |n| n > 1),
            None => false,
        }
    }
}

/// An `xs:any` wildcard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wildcard {
    /// Raw `minOccurs`
    pub min_occurs: Option<String>,
    /// Raw `maxOccurs`
    pub max_occurs: Option<String>,
    /// Raw `processContents`
    pub process_contents: Option<String>,
}

impl Wildcard {
    /// `<xs:any minOccurs="0" maxOccurs="unbounded" processContents="skip"/>`
    pub fn unbounded() -> Self {
        Self {
            min_occurs: Some("0".to_string()),
            max_occurs: Some("unbounded".to_string()),
            process_contents: Some("skip".to_string()),
        }
    }
}

/// An `xs:annotation`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    /// Documentation entries in order
    pub documentation: Vec<Documentation>,
}

impl Annotation {
    /// Build an annotation from entry texts
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            documentation: texts
                .into_iter()
                .map(|text| Documentation {
                    source: None,
                    text: text.into(),
                })
                .collect(),
        }
    }

    /// The human-readable description
    ///
    /// Schemas in this family put version metadata in the first entry and the
    /// description in the second; anything short of two entries has none.
    pub fn description(&self) -> Option<String> {
        let text = self.documentation.get(1)?.text.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.replace("\r\n", "\n"))
        }
    }
}

/// An `xs:documentation` entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Documentation {
    /// Raw `source` attribute
    pub source: Option<String>,
    /// Text content
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_uses_second_entry() {
        let annotation = Annotation::from_texts(["4.0.0+", "  The name.  "]);
        assert_eq!(annotation.description().as_deref(), Some("The name."));

        let single = Annotation::from_texts(["4.0.0+"]);
        assert_eq!(single.description(), None);
        assert_eq!(Annotation::default().description(), None);
    }

    #[test]
    fn test_designated_root_type() {
        let schema = Schema::new().with_root("project", "Model");
        assert_eq!(schema.designated_root_type(), Some("Model"));
        assert_eq!(Schema::new().designated_root_type(), None);
    }

    #[test]
    fn test_sequence_element_repetition() {
        let mut element = SequenceElement::repeated("tag", TypeName::builtin("string"));
        assert!(element.is_repeated());
        element.max_occurs = Some("1".to_string());
        assert!(!element.is_repeated());
        element.max_occurs = Some("5".to_string());
        assert!(element.is_repeated());
    }

    #[test]
    fn test_element_optionality() {
        assert!(ElementDecl::typed("a", TypeName::builtin("string")).is_optional());
        assert!(!ElementDecl::typed("a", TypeName::builtin("string"))
            .with_min_occurs("1")
            .is_optional());
    }
}
