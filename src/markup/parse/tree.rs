use crate::region::Region;

/// A piece of parsed markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Text outside of tags and calls, which may still hold `${}` and `#{}`
    /// tokens.
    Text(Region),
    /// An inline `{{ name(arguments) }}` call.
    Call(Call),
    /// A tag, with its children when it is not self closing.
    Element(Element),
}

/// Represents a tag such as `<Card title="x">...</Card>` or `<Button />`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Location of the tag name.
    pub name: Region,
    pub attributes: Vec<Attribute>,
    /// Empty for a self closing tag.
    pub children: Vec<Node>,
    /// Location of the opening tag.
    pub region: Region,
}

/// Represents a single attribute of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Location of the attribute name, without the `:` prefix.
    pub name: Region,
    /// Location of the value between its quotes, or None for a valueless
    /// attribute like `disabled`.
    pub value: Option<Region>,
    /// True when the attribute was written as `:name="path"`.
    pub bound: bool,
    /// Location of the whole attribute.
    pub region: Region,
}

/// Represents an inline call such as `{{ upper(`hi`) }}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Location of the function name.
    pub name: Region,
    /// Location of the text between the parentheses, or None when there is
    /// nothing there.
    pub arguments: Option<Region>,
    /// Location of the whole call.
    pub region: Region,
}
