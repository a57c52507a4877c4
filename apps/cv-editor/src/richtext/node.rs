use serde::{Deserialize, Serialize};

/// A boolean text-level style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
}

/// The set of marks carried by one text leaf.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marks {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
}

impl Marks {
    pub fn has(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
        }
    }

    pub fn set(&mut self, mark: Mark, on: bool) {
        match mark {
            Mark::Bold => self.bold = on,
            Mark::Italic => self.italic = on,
            Mark::Underline => self.underline = on,
        }
    }

    pub fn with(mut self, mark: Mark) -> Self {
        self.set(mark, true);
        self
    }

    pub fn without(mut self, mark: Mark) -> Self {
        self.set(mark, false);
        self
    }

    /// Union of both mark sets.
    pub fn union(self, other: Marks) -> Self {
        Marks {
            bold: self.bold || other.bold,
            italic: self.italic || other.italic,
            underline: self.underline || other.underline,
        }
    }

    pub fn is_plain(&self) -> bool {
        !(self.bold || self.italic || self.underline)
    }
}

/// A run of text with uniform marks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    pub text: String,
    pub marks: Marks,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
        }
    }

    pub fn marked(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Length in Unicode scalar values, the unit used by selection offsets.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Element kinds supported by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Paragraph,
    Link { url: String },
    BulletedList,
    ListItem,
}

impl ElementKind {
    /// Links live inside text blocks; every other kind is a block.
    pub fn is_inline(&self) -> bool {
        matches!(self, ElementKind::Link { .. })
    }

    /// Blocks whose children are inline content.
    pub fn is_text_block(&self) -> bool {
        matches!(self, ElementKind::Paragraph | ElementKind::ListItem)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub kind: ElementKind,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(kind: ElementKind, children: Vec<Node>) -> Self {
        let children = if children.is_empty() {
            vec![Node::Text(Text::empty())]
        } else {
            children
        };
        Self { kind, children }
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Self::new(ElementKind::Paragraph, children)
    }

    pub fn link(url: impl Into<String>, children: Vec<Node>) -> Self {
        Self::new(ElementKind::Link { url: url.into() }, children)
    }

    pub fn list_item(children: Vec<Node>) -> Self {
        Self::new(ElementKind::ListItem, children)
    }

    pub fn bulleted_list(items: Vec<Element>) -> Self {
        Self::new(
            ElementKind::BulletedList,
            items.into_iter().map(Node::Element).collect(),
        )
    }

    pub fn empty_paragraph() -> Self {
        Self::paragraph(Vec::new())
    }

    /// Concatenated text of every descendant leaf.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(Text),
    Element(Element),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(Text::new(text))
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(t) => Some(t),
            Node::Element(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    pub fn children(&self) -> Option<&[Node]> {
        self.as_element().map(|e| e.children.as_slice())
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// A rich-text document: an ordered, never-empty sequence of top-level blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Element>,
}

impl Document {
    /// Builds a document from already-normalized top-level blocks.
    /// An empty block list yields the canonical empty document.
    pub fn from_blocks(blocks: Vec<Element>) -> Self {
        if blocks.is_empty() {
            Self::empty()
        } else {
            Self { blocks }
        }
    }

    /// The canonical empty document: one paragraph holding one empty text leaf.
    pub fn empty() -> Self {
        Self {
            blocks: vec![Element::empty_paragraph()],
        }
    }

    pub fn blocks(&self) -> &[Element] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Element> {
        self.blocks
    }

    /// Resolves a node path below the top-level blocks. The first index picks
    /// the block, so a path needs at least two indices to address a node.
    pub fn node(&self, path: &[usize]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        let block = self.blocks.get(*first)?;
        let mut children = block.children.as_slice();
        let mut found: Option<&Node> = None;
        for (depth, index) in rest.iter().enumerate() {
            let node = children.get(*index)?;
            if depth + 1 < rest.len() {
                children = node.children()?;
            }
            found = Some(node);
        }
        found
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }

    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Element::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(&t.text),
            Node::Element(e) => collect_text(&e.children, out),
        }
    }
}
