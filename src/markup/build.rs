use super::parse::tree::{Call, Element, Node};
use crate::{
    component::{ComponentNode, Components, IdGenerator, TextNode},
    function::{escape, invoke_parts, Convention, Functions},
    log::Error,
    region::Region,
    resolve::Resolver,
    store::Store,
    substrate::Markers,
};
use regex::Regex;
use std::{borrow::Cow, collections::BTreeMap, fmt::Write, sync::LazyLock};
use tracing::trace;

/// Separates the props of a component from its body in bracketed notation.
const BODY_SEPARATOR: &str = "||";

/// Value given to attributes written without one, like `disabled`.
const VALUELESS: &str = "true";

/// Everything a single conversion reads from.
///
/// Built fresh for every call and never mutated, so a facade may run many
/// conversions at once.
pub(crate) struct Context<'a> {
    pub source: &'a str,
    pub variables: &'a Store,
    pub functions: &'a Functions,
    pub components: &'a Components,
    pub variable_resolver: &'a Resolver,
    pub function_resolver: &'a Resolver,
    pub markers: &'a Markers,
    pub ids: &'a dyn IdGenerator,
}

impl<'a> Context<'a> {
    /// Build one [`ComponentNode`] for each top level element.
    ///
    /// Top level text and calls are dropped.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if any element in the tree is unregistered, or
    /// if resolving an attribute, call or body fails.
    pub fn to_tree(&self, nodes: &[Node]) -> Result<Vec<ComponentNode>, Error> {
        self.validate(nodes)?;

        let mut tree = vec![];
        for node in nodes {
            match node {
                Node::Element(element) => tree.push(self.component(element)?),
                Node::Text(region) | Node::Call(Call { region, .. }) => {
                    trace!(?region, "dropped top level content");
                }
            }
        }

        Ok(tree)
    }

    /// Write every node, with elements in bracketed notation.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] under the same conditions as [`Context::to_tree`].
    pub fn to_text(&self, nodes: &[Node]) -> Result<String, Error> {
        self.validate(nodes)?;

        self.body(nodes)
    }

    /// Check every element in the tree against the registry, before any of
    /// them is evaluated.
    fn validate(&self, nodes: &[Node]) -> Result<(), Error> {
        for node in nodes {
            if let Node::Element(element) = node {
                self.components
                    .validate(&self.source[element.name])
                    .map_err(|e| e.with_pointer(self.source, element.name))?;
                self.validate(&element.children)?;
            }
        }

        Ok(())
    }

    fn component(&self, element: &Element) -> Result<ComponentNode, Error> {
        let id = self.ids.generate();
        let name = self.source[element.name].to_string();
        let props = self.props(element)?;
        let body = self.body(&element.children)?;
        let body = body.trim();
        let children =
            (!body.is_empty()).then(|| TextNode::new(self.ids.generate(), body.to_string()));
        trace!(id = id.as_str(), name = name.as_str(), "built component");

        Ok(ComponentNode {
            id,
            name,
            props,
            children,
        })
    }

    /// Write an element as `<start>Name:k=v<delimiter>k=v||body<end>`.
    ///
    /// The `||body` part is left out when the trimmed body is empty.
    fn notation(&self, element: &Element) -> Result<String, Error> {
        let Markers {
            component_start,
            component_end,
            delimiter,
        } = self.markers;
        let props = self.props(element)?;
        let body = self.body(&element.children)?;

        let mut notation = format!("{component_start}{}:", &self.source[element.name]);
        for (index, (key, value)) in props.iter().enumerate() {
            if index > 0 {
                notation.push_str(delimiter);
            }
            write!(notation, "{key}={value}").expect("writing to a string should not fail");
        }
        let body = body.trim();
        if !body.is_empty() {
            notation.push_str(BODY_SEPARATOR);
            notation.push_str(body);
        }
        notation.push_str(component_end);

        Ok(notation)
    }

    /// Resolve the attributes of an element.
    ///
    /// Literal values are kept as written. Bound values holding variable
    /// tokens are resolved as a template, other bound values as one path.
    fn props(&self, element: &Element) -> Result<BTreeMap<String, String>, Error> {
        element
            .attributes
            .iter()
            .map(|attribute| {
                let name = self.source[attribute.name].to_string();
                let value = match attribute.value {
                    None => VALUELESS.to_string(),
                    Some(value) if !attribute.bound => self.source[value].to_string(),
                    Some(value) => self
                        .bound(value)
                        .map_err(|e| e.or_pointer(self.source, attribute.region))?,
                };

                Ok((name, value))
            })
            .collect()
    }

    fn bound(&self, region: Region) -> Result<String, Error> {
        let resolver = self.variable_resolver;
        let value = &self.source[region];
        if value.contains(resolver.config().start()) {
            resolver.resolve_region(self.source, region, self.variables)
        } else {
            resolver
                .resolve_token(value, self.variables)
                .map_err(|e| e.or_pointer(self.source, region))
        }
    }

    /// Resolve and join a list of nodes.
    fn body(&self, nodes: &[Node]) -> Result<String, Error> {
        let mut body = String::new();
        for node in nodes {
            let resolved = match node {
                Node::Text(region) => self.text(*region)?,
                Node::Call(call) => self.call(call)?,
                Node::Element(element) => self.notation(element)?,
            };
            body.push_str(&resolved);
        }

        Ok(body)
    }

    /// Resolve the function and variable tokens in a stretch of text, in a
    /// single pass.
    fn text(&self, region: Region) -> Result<String, Error> {
        self.function_resolver.scan(
            self.source,
            region,
            |token, at| {
                self.function_token(token)
                    .map_err(|e| e.or_pointer(self.source, at))
            },
            |_, at, buffer| {
                let resolved = self
                    .variable_resolver
                    .resolve_region(self.source, at, self.variables)?;
                buffer.push_str(&resolved);

                Ok(())
            },
        )
    }

    /// Evaluate a `name:arguments` function token found in text.
    ///
    /// Variable tokens in the arguments are resolved before the call.
    fn function_token(&self, token: Region) -> Result<String, Error> {
        let text = &self.source[token];
        let Some(colon) = text.find(':') else {
            return self.dispatch(text.trim(), None);
        };
        let name = text[..colon].trim();
        let arguments = Region::new(token.begin + colon + 1..token.end);
        let arguments = self.substitute_arguments(name, arguments, false)?;

        self.dispatch(name, Some(&arguments))
    }

    /// Evaluate an inline call.
    ///
    /// Variables in the arguments are resolved first, then the function is
    /// called with the resolved text.
    fn call(&self, call: &Call) -> Result<String, Error> {
        let name = &self.source[call.name];
        let arguments = match call.arguments.map(|region| trim(self.source, region)) {
            Some(region) if !region.is_empty() => Some(self.call_arguments(name, region)?),
            _ => None,
        };

        self.dispatch(name, arguments.as_deref())
            .map_err(|e| e.or_pointer(self.source, call.region))
    }

    /// Resolve the variables in call arguments.
    ///
    /// Back-quoted arguments only resolve explicit variable tokens. Bare
    /// arguments also treat dotted references like `user.name` as paths.
    fn call_arguments(&self, name: &str, region: Region) -> Result<String, Error> {
        let raw = &self.source[region];
        if raw.len() >= 2 && raw.starts_with('`') && raw.ends_with('`') {
            let quoted = Region::new(region.begin + 1..region.end - 1);
            return self.substitute_arguments(name, quoted, false);
        }

        self.substitute_arguments(name, region, true)
    }

    /// Replace the variables in argument text with their values.
    ///
    /// Values given to a positional function are escaped, so they never add
    /// separators of their own.
    fn substitute_arguments(
        &self,
        name: &str,
        region: Region,
        references: bool,
    ) -> Result<String, Error> {
        let resolver = self.variable_resolver;
        let positional = self
            .functions
            .get(name)
            .is_some_and(|(convention, _)| convention == Convention::Positional);
        let finish = |value: String| if positional { escape(&value) } else { value };

        resolver.scan(
            self.source,
            region,
            |token, at| {
                resolver
                    .substitute(&self.source[token], self.variables)
                    .map(finish)
                    .map_err(|e| e.or_pointer(self.source, at))
            },
            |text, at, buffer| {
                if !references {
                    buffer.push_str(text);
                    return Ok(());
                }
                let mut cursor = 0;
                for found in REFERENCES.find_iter(text) {
                    let reference = Region::new(found.range()).offset(at.begin);
                    let value = resolver
                        .resolve_token(found.as_str(), self.variables)
                        .map_err(|e| e.or_pointer(self.source, reference))?;
                    buffer.push_str(&text[cursor..found.start()]);
                    buffer.push_str(&finish(value));
                    cursor = found.end();
                }
                buffer.push_str(&text[cursor..]);

                Ok(())
            },
        )
    }

    /// Call a function and convert the result to text, applying the warning
    /// policy of the function resolver.
    fn dispatch(&self, name: &str, arguments: Option<&str>) -> Result<String, Error> {
        trace!(name, arguments, "evaluating function");
        let result = invoke_parts(self.functions, name, arguments).map(Cow::Owned);

        self.function_resolver.render(name, result)
    }
}

/// Finds bare dotted references like `user.name` in call arguments.
static REFERENCES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)+\b")
        .expect("reference pattern should compile")
});

/// Shrink a [`Region`] to exclude surrounding whitespace.
fn trim(source: &str, region: Region) -> Region {
    let text = &source[region];
    let begin = region.begin + (text.len() - text.trim_start().len());
    let end = region.end - (text.len() - text.trim_end().len());

    Region::new(begin..end.max(begin))
}

#[cfg(test)]
mod tests {
    use super::Context;
    use crate::{
        markup::{syntax, Parser},
        Components,
        Functions,
        Markers,
        Resolver,
        Sequential,
        Store,
        Value,
    };
    use morel::Finder;
    use serde_json::json;

    #[test]
    fn test_notation() {
        let result = helper_to_text(
            "<Card title=\"Hi\" :user=\"user.name\" disabled>body</Card>",
            &Resolver::variables(),
        );

        assert_eq!(
            result.unwrap(),
            "@{Card:disabled=true,title=Hi,user=John||body}"
        );
    }

    #[test]
    fn test_notation_nested() {
        let result = helper_to_text(
            "<Card>  <Badge :text=\"user.name\" />  </Card>",
            &Resolver::variables(),
        );

        assert_eq!(result.unwrap(), "@{Card:||@{Badge:text=John}}");
    }

    #[test]
    fn test_text_keeps_surroundings() {
        let result = helper_to_text(
            "Hi ${user.name}, <Badge /> #{shout:ok}",
            &Resolver::variables(),
        );

        assert_eq!(result.unwrap(), "Hi John, @{Badge:} OK");
    }

    #[test]
    fn test_bound_template() {
        let result = helper_to_text(
            "<Badge :text=\"${user.name} (${user.age})\" />",
            &Resolver::variables(),
        );

        assert_eq!(result.unwrap(), "@{Badge:text=John (30)}");
    }

    #[test]
    fn test_bare_arguments() {
        let result = helper_to_text(
            "{{ shout(hello user.name) }} {{ shout(`user.name`) }}",
            &Resolver::variables(),
        );

        assert_eq!(result.unwrap(), "HELLO JOHN USER.NAME");
    }

    #[test]
    fn test_bare_arguments_keep_tokens() {
        let result = helper_to_text("{{ shout(${user.name} user.age) }}", &Resolver::variables());

        assert_eq!(result.unwrap(), "JOHN 30");
    }

    #[test]
    fn test_function_token_arguments() {
        let result = helper_to_text(
            "<Card>#{shout:${user.name}} #{count:${user.note}:x}</Card>",
            &Resolver::variables(),
        );

        assert_eq!(result.unwrap(), "@{Card:||JOHN 2}");
    }

    #[test]
    fn test_positional_values_escaped() {
        let result = helper_to_text(
            "{{ count(`${user.note}`) }} {{ count(user.note:user.name) }}",
            &Resolver::variables(),
        );

        assert_eq!(result.unwrap(), "1 2");
    }

    #[test]
    fn test_pointers_measured_from_source() {
        for (source, position) in [
            ("<Card\n  :label=\"a ${user.email}\" />", "?:2:13"),
            ("<Card>\nHi\n  ${user.email}</Card>", "?:3:3"),
            ("<Card>\n\n {{ shout(user.email) }}</Card>", "?:3:11"),
            ("<Card>\n#{shout:${user.email}}</Card>", "?:2:9"),
        ] {
            let error = helper_to_text(source, &Resolver::variables()).unwrap_err();

            assert!(format!("{error:#}").contains(position), "{source}");
        }
    }

    #[test]
    fn test_missing_function_quiet() {
        let result = helper_to_text("{{ ghost() }}", &Resolver::variables());
        assert!(result.is_err());

        let result = helper_to_text_quiet("{{ ghost() }}");
        assert_eq!(result.unwrap(), "undefined");
    }

    fn helper_to_text(source: &str, variables: &Resolver) -> Result<String, crate::Error> {
        helper(source, variables, &Resolver::functions())
    }

    fn helper_to_text_quiet(source: &str) -> Result<String, crate::Error> {
        helper(
            source,
            &Resolver::variables().with_warn(false),
            &Resolver::functions().with_warn(false),
        )
    }

    fn helper(
        source: &str,
        variable_resolver: &Resolver,
        function_resolver: &Resolver,
    ) -> Result<String, crate::Error> {
        let finder = Finder::new(syntax());
        let nodes = Parser::new(source, &finder).compile()?;
        let variables = Store::try_from(json!({
            "user": { "name": "John", "age": 30, "note": "a:b" }
        }))?;
        let functions = Functions::new()
            .with_raw("shout", |text: &str| Ok(Value::from(text.to_uppercase())))
            .with_positional("count", |args: &[String]| {
                Ok(Value::from(args.len() as u64))
            });
        let components = Components::new().with("Card").with("Badge");
        let markers = Markers::default();
        let ids = Sequential::new();
        let context = Context {
            source,
            variables: &variables,
            functions: &functions,
            components: &components,
            variable_resolver,
            function_resolver,
            markers: &markers,
            ids: &ids,
        };

        context.to_text(&nodes)
    }
}
