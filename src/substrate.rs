use crate::{
    component::{ComponentNode, Components, IdGenerator, Random},
    function::Functions,
    log::Error,
    markup::{syntax, Context, Parser},
    resolve::Resolver,
    store::Store,
};
use morel::Finder;
use serde::Serialize;
use tracing::debug;

/// Markers used to write elements in bracketed notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    /// Written before the name of an element.
    pub component_start: String,
    /// Written after the props and body of an element.
    pub component_end: String,
    /// Written between props.
    pub delimiter: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            component_start: "@{".to_string(),
            component_end: "}".to_string(),
            delimiter: ",".to_string(),
        }
    }
}

/// Result of a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Output {
    /// One node per top level element.
    Tree(Vec<ComponentNode>),
    /// The markup written in bracketed notation.
    Text(String),
}

impl Output {
    /// Return the nodes if this is [`Output::Tree`].
    #[inline]
    pub fn as_tree(&self) -> Option<&[ComponentNode]> {
        match self {
            Output::Tree(tree) => Some(tree),
            Output::Text(_) => None,
        }
    }

    /// Return the text if this is [`Output::Text`].
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Output::Text(text) => Some(text),
            Output::Tree(_) => None,
        }
    }
}

/// Converts component markup into a tree of [`ComponentNode`] instances.
///
/// Holds the variables, functions and components that markup is converted
/// with. None of them are changed by a conversion, so one `Substrate` may
/// serve many conversions at once.
///
/// # Examples
///
/// ```
/// use substrate::{Components, Functions, Store, Substrate, Value};
/// use serde_json::json;
///
/// let substrate = Substrate::new()
///     .with_variables(Store::try_from(json!({ "user": { "name": "John" } })).unwrap())
///     .with_functions(
///         Functions::new().with_raw("upper", |text: &str| Ok(Value::from(text.to_uppercase()))),
///     )
///     .with_components(Components::new().with("Button"), true);
///
/// let output = substrate
///     .convert("<Button :label=\"user.name\">{{ upper(`hi`) }}</Button>")
///     .unwrap();
/// let tree = output.as_tree().unwrap();
///
/// assert_eq!(tree[0].name, "Button");
/// assert_eq!(tree[0].props["label"], "John");
/// assert_eq!(tree[0].children.as_ref().unwrap().body, "HI");
/// ```
pub struct Substrate {
    finder: Finder,
    variables: Store,
    functions: Functions,
    components: Components,
    emit_tree: bool,
    markers: Markers,
    variable_resolver: Resolver,
    function_resolver: Resolver,
    ids: Box<dyn IdGenerator>,
}

impl Substrate {
    /// Create a new [`Substrate`] with empty scopes, default resolvers and
    /// random node ids.
    #[inline]
    pub fn new() -> Self {
        Self {
            finder: Finder::new(syntax()),
            variables: Store::new(),
            functions: Functions::new(),
            components: Components::new(),
            emit_tree: true,
            markers: Markers::default(),
            variable_resolver: Resolver::variables(),
            function_resolver: Resolver::functions(),
            ids: Box::new(Random),
        }
    }

    /// Set the variables that paths are resolved against.
    #[inline]
    pub fn with_variables(mut self, variables: Store) -> Self {
        self.variables = variables;

        self
    }

    /// Set the functions that calls are dispatched to.
    #[inline]
    pub fn with_functions(mut self, functions: Functions) -> Self {
        self.functions = functions;

        self
    }

    /// Set the registered components.
    ///
    /// When `emit_tree` is false, [`Substrate::convert`] returns the markup
    /// in bracketed notation instead of a tree.
    #[inline]
    pub fn with_components(mut self, components: Components, emit_tree: bool) -> Self {
        self.components = components;
        self.emit_tree = emit_tree;

        self
    }

    /// Set the markers used for bracketed notation.
    #[inline]
    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;

        self
    }

    /// Set the resolvers used for `${}` and `#{}` tokens.
    ///
    /// # Examples
    ///
    /// ```
    /// use substrate::{Components, Config, Resolver, Store, Substrate};
    ///
    /// let variables = Resolver::new(Config::new().with_delimiters("[[", "]]")).unwrap();
    /// let substrate = Substrate::new()
    ///     .with_variables(Store::new().with_must("name", "John"))
    ///     .with_components(Components::new().with("Tag"), false)
    ///     .with_resolvers(variables, Resolver::functions());
    ///
    /// let output = substrate.convert("<Tag>[[ name ]]</Tag>").unwrap();
    /// assert_eq!(output.as_text(), Some("@{Tag:||John}"));
    /// ```
    #[inline]
    pub fn with_resolvers(mut self, variables: Resolver, functions: Resolver) -> Self {
        self.variable_resolver = variables;
        self.function_resolver = functions;

        self
    }

    /// Set the warning policy of both resolvers.
    #[inline]
    pub fn with_warn(mut self, warn: bool) -> Self {
        self.variable_resolver = self.variable_resolver.with_warn(warn);
        self.function_resolver = self.function_resolver.with_warn(warn);

        self
    }

    /// Set the generator used for node ids.
    #[inline]
    pub fn with_ids<T>(mut self, ids: T) -> Self
    where
        T: IdGenerator + 'static,
    {
        self.ids = Box::new(ids);

        self
    }

    /// Convert the markup.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the markup is malformed, when it uses an
    /// unregistered component, or when resolving a token or call fails.
    /// Misses only fail when warnings are enabled.
    pub fn convert(&self, template: &str) -> Result<Output, Error> {
        debug!(
            length = template.len(),
            emit_tree = self.emit_tree,
            "converting markup"
        );
        let nodes = Parser::new(template, &self.finder).compile()?;
        let context = Context {
            source: template,
            variables: &self.variables,
            functions: &self.functions,
            components: &self.components,
            variable_resolver: &self.variable_resolver,
            function_resolver: &self.function_resolver,
            markers: &self.markers,
            ids: self.ids.as_ref(),
        };

        let output = if self.emit_tree {
            Output::Tree(context.to_tree(&nodes)?)
        } else {
            Output::Text(context.to_text(&nodes)?)
        };
        debug!("converted markup");

        Ok(output)
    }
}

impl Default for Substrate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Markers, Output, Substrate};
    use crate::{
        ComponentNode, Components, Error, ErrorKind, Functions, Sequential, Store, TextNode, Value,
    };
    use serde_json::json;
    use std::{
        collections::{BTreeMap, HashSet},
        thread,
    };

    #[test]
    fn test_convert_round_trip() {
        let output = substrate(true)
            .convert("<Button :label=\"user.name\" />")
            .unwrap();

        assert_eq!(
            output,
            Output::Tree(vec![ComponentNode {
                id: "node-1".to_string(),
                name: "Button".to_string(),
                props: BTreeMap::from([("label".to_string(), "John".to_string())]),
                children: None,
            }])
        );
    }

    #[test]
    fn test_convert_nested_content() {
        let output = substrate(true)
            .convert("<Card>{{ upper(`hi`) }}</Card>")
            .unwrap();
        let tree = output.as_tree().unwrap();

        assert_eq!(
            tree[0].children,
            Some(TextNode::new("node-2".to_string(), "HI".to_string()))
        );
    }

    #[test]
    fn test_convert_unregistered() {
        for warn in [true, false] {
            for template in [
                "<Ghost />",
                "<Card><Ghost /></Card>",
                "<Card :x=\"nope\"><Ghost /></Card>",
            ] {
                let error = substrate(true)
                    .with_warn(warn)
                    .convert(template)
                    .unwrap_err();

                assert_eq!(error.kind(), ErrorKind::UnregisteredComponent, "{template}");
            }
        }
    }

    #[test]
    fn test_convert_malformed_arguments() {
        for warn in [true, false] {
            let error = substrate(false)
                .with_warn(warn)
                .convert("<Card>#{test:}</Card>")
                .unwrap_err();

            assert_eq!(error.kind(), ErrorKind::MalformedArguments);
            assert!(error.kind().is_function_error());
        }
    }

    #[test]
    fn test_convert_execution_error() {
        for warn in [true, false] {
            let error = substrate(false)
                .with_warn(warn)
                .convert("<Card>{{ fail() }}</Card>")
                .unwrap_err();

            assert_eq!(error.kind(), ErrorKind::FunctionExecution);
            assert_eq!(error.reason(), "function error: broken");
        }
    }

    #[test]
    fn test_convert_text() {
        let template = "Dear ${user.name}: \
            <Card title=\"Hi\" :age=\"user.age\">{{ greet(user.name) }}</Card>";
        let output = substrate(false).convert(template).unwrap();

        assert_eq!(
            output.as_text(),
            Some("Dear John: @{Card:age=30,title=Hi||Hello, John!}")
        );
    }

    #[test]
    fn test_convert_markers() {
        let output = substrate(false)
            .with_markers(Markers {
                component_start: "[".to_string(),
                component_end: "]".to_string(),
                delimiter: ";".to_string(),
            })
            .convert("<Card a=\"1\" b=\"2\"><Button /></Card>")
            .unwrap();

        assert_eq!(output.as_text(), Some("[Card:a=1;b=2||[Button:]]"));
    }

    #[test]
    fn test_convert_nested_notation_in_body() {
        let output = substrate(true)
            .convert("<Card>\n  Hi <Button :label=\"user.name\" />\n</Card>")
            .unwrap();
        let tree = output.as_tree().unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(
            tree[0].children.as_ref().unwrap().body,
            "Hi @{Button:label=John}"
        );
    }

    #[test]
    fn test_convert_multiple_calls() {
        let template = "<Card>{{ greet(user.name) }} \
            {{ upper(`${user.name}`) }} {{ count(a:b:c) }}</Card>";
        let output = substrate(true).convert(template).unwrap();
        let tree = output.as_tree().unwrap();

        assert_eq!(
            tree[0].children.as_ref().unwrap().body,
            "Hello, John! JOHN 3"
        );
    }

    #[test]
    fn test_convert_top_level_dropped() {
        let output = substrate(true)
            .convert("intro <Button /> middle <Card>x</Card> outro")
            .unwrap();
        let tree = output.as_tree().unwrap();

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].name, "Button");
        assert_eq!(tree[1].name, "Card");
        assert_eq!(tree[1].id, "node-2");
        assert_eq!(tree[1].children.as_ref().unwrap().id, "node-3");
    }

    #[test]
    fn test_convert_warn_toggle() {
        let template = "<Button :label=\"user.email\" />";
        let error = substrate(true).convert(template).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MissingBinding);

        let output = substrate(true).with_warn(false).convert(template).unwrap();
        assert_eq!(output.as_tree().unwrap()[0].props["label"], "undefined");
    }

    #[test]
    fn test_convert_syntax_error() {
        let error = substrate(true).convert("<Card>open").unwrap_err();

        assert_eq!(error.kind(), ErrorKind::InvalidSyntax);
    }

    #[test]
    fn test_convert_serialize() {
        let output = substrate(true)
            .convert("<Card title=\"x\">body</Card>")
            .unwrap();

        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!([{
                "id": "node-1",
                "name": "Card",
                "props": { "title": "x" },
                "children": { "id": "node-2", "name": "Text", "props": {}, "body": "body" },
            }])
        );
    }

    #[test]
    fn test_convert_random_ids() {
        let substrate = Substrate::new().with_components(Components::new().with("Card"), true);
        let output = substrate.convert("<Card /><Card />").unwrap();
        let tree = output.as_tree().unwrap();

        assert_ne!(tree[0].id, tree[1].id);
    }

    #[test]
    fn test_convert_error_points_into_template() {
        let error = substrate(true)
            .convert("<Card\n\n   :label=\"x ${user.email}\" />")
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::MissingBinding);
        assert!(format!("{error:#}").contains("?:3:14"));

        let error = substrate(true)
            .convert("<Card>\n  {{ greet(user.email) }}\n</Card>")
            .unwrap_err();

        assert!(format!("{error:#}").contains("?:2:12"));
    }

    #[test]
    fn test_convert_function_token_arguments() {
        let output = substrate(false)
            .convert("<Card>#{greet:${user.name}}</Card>")
            .unwrap();

        assert_eq!(output.as_text(), Some("@{Card:||Hello, John!}"));
    }

    #[test]
    fn test_convert_positional_values_escaped() {
        let output = substrate(false)
            .convert("<Card>{{ count(`${user.note}`) }} #{count:${user.note}}</Card>")
            .unwrap();

        assert_eq!(output.as_text(), Some("@{Card:||1 1}"));
    }

    #[test]
    fn test_convert_unfinished_tag_is_text() {
        let output = substrate(true).convert("<Card>Price <b</Card>").unwrap();
        let tree = output.as_tree().unwrap();

        assert_eq!(tree[0].children.as_ref().unwrap().body, "Price <b");
    }

    #[test]
    fn test_convert_number_format() {
        let variables = Store::try_from(json!({ "price": 10.0, "rate": 0.5 })).unwrap();
        let output = substrate(false)
            .with_variables(variables)
            .convert("<Card :price=\"price\">${rate}</Card>")
            .unwrap();

        assert_eq!(output.as_text(), Some("@{Card:price=10||0.5}"));
    }

    #[test]
    fn test_convert_shared_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Substrate>();

        let substrate = &substrate(true);
        let template = "<Card>hi</Card><Button />";
        let outputs: Vec<Output> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(move || substrate.convert(template)))
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap().unwrap())
                .collect()
        });

        let mut ids = HashSet::new();
        for output in &outputs {
            let tree = output.as_tree().unwrap();
            assert_eq!(tree[0].children.as_ref().unwrap().body, "hi");

            for node in tree {
                assert!(ids.insert(node.id.clone()), "{}", node.id);
                if let Some(text) = &node.children {
                    assert!(ids.insert(text.id.clone()), "{}", text.id);
                }
            }
        }
        assert_eq!(ids.len(), 8 * 3);
    }

    fn substrate(emit_tree: bool) -> Substrate {
        let variables = Store::try_from(json!({
            "user": { "name": "John", "age": 30, "note": "a:b" },
        }))
        .unwrap();
        let functions = Functions::new()
            .with_raw("upper", |text: &str| Ok(Value::from(text.to_uppercase())))
            .with_raw("greet", |name: &str| {
                Ok(Value::from(format!("Hello, {name}!")))
            })
            .with_raw("test", |text: &str| Ok(Value::from(text)))
            .with_raw("fail", |_: &str| Err(Error::build("broken")))
            .with_positional("count", |args: &[String]| {
                Ok(Value::from(args.len() as i64))
            });
        let components = Components::new().with("Card").with("Button");

        Substrate::new()
            .with_variables(variables)
            .with_functions(functions)
            .with_components(components, emit_tree)
            .with_ids(Sequential::new())
    }
}
