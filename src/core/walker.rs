//! Post-order walker: children first, then the node's own handler, so a
//! handler always sees the final events of every descendant.

use super::registry::{HandlerContext, ProgramRegistry};
use super::types::Instruction;

/// Interprets every root in execution order.
pub fn walk(registry: &ProgramRegistry, roots: &mut [Instruction], ctx: &mut HandlerContext<'_>) {
    for root in roots.iter_mut() {
        visit(registry, root, ctx);
    }
}

fn visit(registry: &ProgramRegistry, node: &mut Instruction, ctx: &mut HandlerContext<'_>) {
    for child in node.children.iter_mut() {
        visit(registry, child, ctx);
    }
    let handler = registry.handler_for(node.program_id());
    handler(node, ctx);
}
