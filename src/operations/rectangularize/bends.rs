use slotmap::SecondaryMap;

use crate::error::{MeshError, Result};
use crate::operations::orthogonalize::{Bend, OrthogonalRepresentation};
use crate::topology::{HalfEdgeId, Mesh, NodeCounter, NodeKind, Side, SideMap, Turn, VertexId};

/// Replaces every bend with a degree-2 [`NodeKind::Bend`] vertex.
///
/// Returns the corner angles of the refined mesh: original corners keep
/// their value, a right bend gets a quarter turn on the face of the bent
/// half-edge and three on the other side.
pub(super) fn materialize_bends(mesh: &mut Mesh, shape: &OrthogonalRepresentation) -> Result<SecondaryMap<HalfEdgeId, u8>> {
    let mut angles = shape.angles.clone();
    let mut counter = NodeCounter::new(NodeKind::Bend);
    let mut done: SecondaryMap<HalfEdgeId, ()> = SecondaryMap::new();

    let originals: Vec<HalfEdgeId> = mesh.half_edges().map(|(id, _)| id).collect();
    for he in originals {
        if done.contains_key(he) {
            continue;
        }
        done.insert(mesh.twin(he)?, ());
        let mut current = he;
        for &bend in shape.bends(he) {
            mesh.subdivide(current, counter.next_id())?;
            let ahead = mesh.succ(current)?;
            let behind = mesh.twin(current)?;
            let (inside, outside) = match bend {
                Bend::Right => (1, 3),
                Bend::Left => (3, 1),
            };
            angles.insert(ahead, inside);
            angles.insert(behind, outside);
            current = ahead;
        }
    }
    Ok(angles)
}

/// One entry per undirected edge, as `(origin, dest)`.
pub(super) fn segments(mesh: &Mesh) -> Result<Vec<(VertexId, VertexId)>> {
    let mut seen: SecondaryMap<HalfEdgeId, ()> = SecondaryMap::new();
    let mut segments = Vec::with_capacity(mesh.edge_count());
    for (he, data) in mesh.half_edges() {
        if seen.contains_key(he) {
            continue;
        }
        seen.insert(data.twin, ());
        segments.push((data.origin, mesh.dest(he)?));
    }
    Ok(segments)
}

/// Gives every half-edge a drawing side.
///
/// The external face's incident half-edge points down; each face cycle
/// then turns by its corner angles and twins point the opposite way.
pub(super) fn assign_sides(mesh: &Mesh, angles: &SecondaryMap<HalfEdgeId, u8>) -> Result<SideMap> {
    let ext = mesh.external_face()?;
    let mut sides = SideMap::new();
    let mut stack = vec![(mesh.face(ext)?.incident, Side::Down)];

    while let Some((first, side)) = stack.pop() {
        if sides.contains_key(first) {
            continue;
        }
        let cycle = mesh.cycle(first)?;
        let mut current = side;
        for &he in &cycle {
            sides.insert(he, current);
            let next = mesh.succ(he)?;
            let angle = *angles
                .get(next)
                .ok_or(MeshError::EntityNotFound("corner angle"))?;
            current = current.rotate(Turn::from_angle(angle).quarter_turns());
        }
        if current != side {
            return Err(MeshError::Inconsistent(format!(
                "sides around the cycle at {} do not close",
                mesh.node(mesh.origin(first)?)?
            ))
            .into());
        }
        for &he in &cycle {
            let twin = mesh.twin(he)?;
            if !sides.contains_key(twin) {
                stack.push((twin, sides[he].opposite()));
            }
        }
    }

    for (he, data) in mesh.half_edges() {
        match (sides.get(he), sides.get(data.twin)) {
            (Some(&a), Some(&b)) if a == b.opposite() => {}
            _ => {
                return Err(MeshError::Inconsistent(format!(
                    "half-edge leaving {} has no side opposite its twin",
                    mesh.node(data.origin)?
                ))
                .into())
            }
        }
    }
    Ok(sides)
}
