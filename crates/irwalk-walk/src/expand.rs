// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Expansion of opaque units into walkable composites.
//!
//! Opaque units are condensed function bodies. The walker never decodes them
//! itself; it asks an [`Expander`] once per unit it reaches and walks the
//! resulting composite in the unit's place. A failed expansion aborts the
//! walk.

use irwalk_core::{Composite, Node, OpaqueUnit, WalkError, WalkResult};

/// Format name understood by [`JsonExpander`].
pub const JSON_FORMAT: &str = "json";

/// Decompression collaborator.
pub trait Expander {
    /// Expand `unit` into a composite.
    fn expand(&self, unit: &OpaqueUnit) -> WalkResult<Composite>;
}

impl<E: Expander + ?Sized> Expander for &E {
    fn expand(&self, unit: &OpaqueUnit) -> WalkResult<Composite> {
        (**self).expand(unit)
    }
}

/// Expander for trees that must not contain opaque units.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoExpander;

impl Expander for NoExpander {
    fn expand(&self, unit: &OpaqueUnit) -> WalkResult<Composite> {
        Err(WalkError::expansion(&unit.format, "no expander configured"))
    }
}

/// Expander for units whose payload is a JSON-encoded composite node.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonExpander;

impl Expander for JsonExpander {
    fn expand(&self, unit: &OpaqueUnit) -> WalkResult<Composite> {
        if unit.format != JSON_FORMAT {
            return Err(WalkError::expansion(&unit.format, "unsupported format"));
        }
        let node: Node = serde_json::from_str(&unit.payload)
            .map_err(|e| WalkError::expansion(&unit.format, e.to_string()))?;
        match node {
            Node::Composite(composite) => Ok(composite),
            other => Err(WalkError::expansion(
                &unit.format,
                format!("payload is not a composite: {}", other),
            )),
        }
    }
}
