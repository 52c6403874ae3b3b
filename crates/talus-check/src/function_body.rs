//! Function-body checking (§4.2.1 pass 4, §4.2.6 `BodyChecked`).
//!
//! Declaration registration (`decl.rs`) only ever resolves a function's
//! *signature* into a `FunctionDescriptor` — nothing walks the statements
//! inside `FnDecl::body` until this pass runs, once every signature in the
//! program is registered so calls to not-yet-visited functions still
//! resolve.

use talus_ast::{FnDecl, NodeArena};

use crate::context::CheckerContext;
use crate::scope::{Binding, BindingKind};
use crate::stmt::{check_stmt, sweep_unused};

/// Pushes a scope holding the receiver (if any) and parameters, walks the
/// body, then sweeps that scope for unused bindings exactly like any other
/// block (§4.2.1 pass 5). A no-body declaration (`[no_body]`/extern-style)
/// has nothing to walk.
pub fn check_fn_body(ctx: &mut CheckerContext<'_>, arena: &NodeArena, fd: &FnDecl) {
    let Some(body) = fd.body else { return };

    ctx.scopes.push();

    if let Some(recv) = &fd.receiver {
        let typ = ctx.resolve_type_name(&recv.type_name);
        ctx.scopes.declare(
            recv.name.clone(),
            Binding {
                typ,
                kind: BindingKind::Param,
                is_mut: recv.is_mut,
                is_shared: false,
                declared_at: recv.span,
                used: false,
                mutated: false,
            },
        );
    }

    for p in &fd.params {
        if p.name == "_" {
            continue;
        }
        let typ = ctx.resolve_type_name(&p.type_name);
        ctx.scopes.declare(
            p.name.clone(),
            Binding {
                typ,
                kind: BindingKind::Param,
                is_mut: p.is_mut,
                is_shared: false,
                declared_at: p.span,
                used: false,
                mutated: false,
            },
        );
    }

    check_stmt(ctx, arena, body);

    let unused = ctx.scopes.pop();
    sweep_unused(ctx, unused);
}

#[cfg(test)]
#[path = "tests/function_body.rs"]
mod tests;
