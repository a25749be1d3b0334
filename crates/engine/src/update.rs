//! Update pass
//!
//! One slice walks the tree pre-order in the depth order of the last render
//! pass. Each node runs its update callback and then receives the slice's
//! signals.

use std::time::Duration;

use crate::instance::Instance;
use crate::layout::Layout;
use crate::node::{Context, Node};
use crate::signal::Signal;

pub(crate) struct UpdatePass<'a, S> {
    pub state: &'a mut S,
    pub layout: &'a mut Layout,
    pub instance: &'a Instance,
    pub signals: &'a [Signal],
    pub delta: Duration,
    pub delivered: usize,
}

impl<S> UpdatePass<'_, S> {
    /// Update a sibling list, visiting it in `order` when that covers it
    pub fn run(&mut self, nodes: &mut [Node<S>], order: &[usize]) {
        if order.len() == nodes.len() {
            for &i in order {
                self.visit(&mut nodes[i]);
            }
        } else {
            for node in nodes.iter_mut() {
                self.visit(node);
            }
        }
    }

    fn visit(&mut self, node: &mut Node<S>) {
        let mut cx = Context {
            state: &mut *self.state,
            signals: self.signals,
            instance: self.instance,
            layout: &mut *self.layout,
            node: node.id(),
            delta: self.delta,
        };
        self.delivered += node.element.update(&mut cx);

        let order = std::mem::take(&mut node.order);
        self.run(&mut node.children, &order);
        node.order = order;
    }
}
