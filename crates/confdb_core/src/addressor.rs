//! Location resolution against a snapshot tree.
//!
//! A *location* is the sequence of path segments a handle stores: object
//! keys, or decimal digit strings for array indices. A segment is treated
//! as an array index iff it is not the first segment, consists solely of
//! decimal digits, and the current node is an array; otherwise it is an
//! object key. The first-segment exclusion keeps digit-named keys under the
//! root addressable.

use crate::error::{StoreError, StoreResult};
use confdb_tree::Node;

fn is_digits(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

fn parse_index(segment: &str, len: usize) -> StoreResult<usize> {
    let index: u64 = segment
        .parse()
        .map_err(|_| StoreError::index_overflow(segment))?;
    let index = usize::try_from(index).map_err(|_| StoreError::index_overflow(segment))?;
    if index >= len {
        return Err(StoreError::index_out_of_range(index as u64, len));
    }
    Ok(index)
}

/// Resolves a location to a node reference.
pub(crate) fn resolve<'t>(root: &'t Node, location: &[String]) -> StoreResult<&'t Node> {
    let mut current = root;
    for (depth, segment) in location.iter().enumerate() {
        current = match current {
            Node::Array(items) if depth > 0 && is_digits(segment) => {
                let index = parse_index(segment, items.len())?;
                &items[index]
            }
            Node::Object(_) => current
                .get(segment)
                .ok_or_else(|| StoreError::key_not_found(segment.clone()))?,
            other => return Err(StoreError::type_mismatch("object", other.type_name())),
        };
    }
    Ok(current)
}

/// Resolves a location to a mutable node reference.
pub(crate) fn resolve_mut<'t>(
    root: &'t mut Node,
    location: &[String],
) -> StoreResult<&'t mut Node> {
    let mut current = root;
    for (depth, segment) in location.iter().enumerate() {
        let is_array_index = depth > 0 && is_digits(segment) && matches!(current, Node::Array(_));
        current = if is_array_index {
            match current {
                Node::Array(items) => {
                    let index = parse_index(segment, items.len())?;
                    &mut items[index]
                }
                _ => unreachable!(),
            }
        } else {
            match current {
                Node::Object(entries) => entries
                    .iter_mut()
                    .find(|(key, _)| key == segment)
                    .map(|(_, value)| value)
                    .ok_or_else(|| StoreError::key_not_found(segment.clone()))?,
                other => return Err(StoreError::type_mismatch("object", other.type_name())),
            }
        };
    }
    Ok(current)
}
