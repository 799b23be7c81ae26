//! Routed components: builders that also deliver each node they build.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::callable::{CallArgs, Callable, Environment};
use crate::component::Component;
use crate::errors::EvalResult;
use crate::{Dict, Node, Value};

/// Where a routed component sends its nodes.
#[derive(Clone)]
pub enum Receiver {
    /// Merge the node's flat mapping form into a shared dict.
    Map(Rc<RefCell<Dict>>),
    /// Hand the node to a callback.
    Callback(Rc<dyn Fn(&Node)>),
}

impl Receiver {
    pub fn callback(f: impl Fn(&Node) + 'static) -> Self {
        Receiver::Callback(Rc::new(f))
    }

    fn deliver(&self, node: &Node) {
        match self {
            Receiver::Map(target) => target.borrow_mut().extend_from(&node.entries()),
            Receiver::Callback(f) => f(node),
        }
    }
}

impl fmt::Debug for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Receiver::Map(target) => f.debug_tuple("Map").field(&target.borrow()).finish(),
            Receiver::Callback(_) => f.write_str("Callback"),
        }
    }
}

/// A component that, after building its node, delivers it to a receiver
/// and still returns it.
#[derive(Clone, Debug)]
pub struct RoutedComponent {
    component: Component,
    receiver: Receiver,
}

impl RoutedComponent {
    pub fn new(component: Component, receiver: Receiver) -> Self {
        RoutedComponent {
            component,
            receiver,
        }
    }

    pub fn invoke(&self, args: &CallArgs) -> EvalResult<Node> {
        let node = self.component.invoke(args)?;
        tracing::debug!(component = self.component.name(), "routing node");
        self.receiver.deliver(&node);
        Ok(node)
    }
}

impl Callable for RoutedComponent {
    fn name(&self) -> &str {
        self.component.name()
    }

    fn call(&self, _env: &mut dyn Environment, args: CallArgs) -> EvalResult {
        self.invoke(&args).map(Value::node)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::component::Signature;
    use pretty_assertions::assert_eq;

    fn greeting() -> Component {
        Component::markup(Signature::new("greeting").positional("name"))
    }

    #[test]
    fn test_map_receiver_collects_entries() {
        let target = Rc::new(RefCell::new(Dict::new()));
        let routed = RoutedComponent::new(greeting(), Receiver::Map(Rc::clone(&target)));
        let node = routed
            .invoke(&CallArgs::new().arg("Ada").kwarg("lang", "en"))
            .unwrap();

        let collected = target.borrow();
        assert_eq!(collected.get("tag"), Some(&Value::str("greeting")));
        assert_eq!(collected.get("lang"), Some(&Value::str("en")));
        assert_eq!(node.tag(), Some("greeting"));
    }

    #[test]
    fn test_callback_receiver_sees_each_node() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let receiver = Receiver::callback(move |node| {
            sink.borrow_mut().push(node.children().to_vec());
        });
        let routed = RoutedComponent::new(greeting(), receiver);
        let _ = routed.invoke(&CallArgs::new().arg("a"));
        let _ = routed.invoke(&CallArgs::new().arg("b"));
        assert_eq!(
            *seen.borrow(),
            vec![vec![Value::str("a")], vec![Value::str("b")]]
        );
    }

    #[test]
    fn test_failed_binding_delivers_nothing() {
        let target = Rc::new(RefCell::new(Dict::new()));
        let routed = RoutedComponent::new(greeting(), Receiver::Map(Rc::clone(&target)));
        assert!(routed.invoke(&CallArgs::new()).is_err());
        assert!(target.borrow().is_empty());
    }
}
