use std::collections::HashMap;

use slotmap::{SecondaryMap, SlotMap};
use tracing::trace;

use crate::geometry::{Piece, Pline};
use crate::math::arc_2d::bulge_from_sweep;
use crate::math::{cross_2d, Point2};

slotmap::new_key_type! {
    /// A boundary end point shared by the pieces meeting there.
    pub struct NodeId;
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    from: NodeId,
    to: NodeId,
    piece: Piece,
}

/// Chains kept boundary pieces into closed loops.
///
/// Coincident end points are merged within `tol`. Where several pieces leave
/// one node, the walk takes the sharpest left turn; loops that still visit a
/// node twice are cut there, so regions touching at a point stay separate.
/// Chains that do not close and loops enclosing no area are dropped.
#[must_use]
pub fn assemble_loops(pieces: &[Piece], tol: f64) -> Vec<Pline> {
    let mut merger = NodeMerger::new(tol.max(f64::MIN_POSITIVE) * 2.0);
    let mut edges: Vec<Edge> = Vec::with_capacity(pieces.len());
    for piece in pieces {
        let from = merger.get_or_create(&piece.start);
        let to = merger.get_or_create(&piece.end);
        if from == to {
            continue;
        }
        edges.push(Edge {
            from,
            to,
            piece: *piece,
        });
    }

    let mut outgoing: SecondaryMap<NodeId, Vec<usize>> = SecondaryMap::new();
    for (i, edge) in edges.iter().enumerate() {
        if let Some(list) = outgoing.get_mut(edge.from) {
            list.push(i);
        } else {
            outgoing.insert(edge.from, vec![i]);
        }
    }

    let mut used = vec![false; edges.len()];
    let mut loops = Vec::new();
    for first in 0..edges.len() {
        if used[first] {
            continue;
        }
        used[first] = true;
        let mut path = vec![first];
        let start = edges[first].from;
        let mut current = first;
        let closed = loop {
            let node = edges[current].to;
            if node == start {
                break true;
            }
            let Some(next) = next_edge(&edges, &outgoing, &used, current) else {
                break false;
            };
            used[next] = true;
            path.push(next);
            current = next;
        };
        if !closed {
            trace!(pieces = path.len(), "dropping open chain");
            continue;
        }
        for simple in cut_at_repeated_nodes(&edges, path) {
            let chain: Vec<Piece> = simple.iter().map(|&i| edges[i].piece).collect();
            let merged = merge_continuations(&chain, tol);
            let pline = Pline::from_pieces(&merged, true);
            if pline.signed_area().abs() > tol * pline.length().max(1.0) {
                loops.push(pline);
            }
        }
    }
    loops
}

fn next_edge(
    edges: &[Edge],
    outgoing: &SecondaryMap<NodeId, Vec<usize>>,
    used: &[bool],
    current: usize,
) -> Option<usize> {
    let incoming = edges[current].piece.tangent_at(1.0);
    outgoing
        .get(edges[current].to)?
        .iter()
        .copied()
        .filter(|&i| !used[i])
        .map(|i| {
            let out = edges[i].piece.tangent_at(0.0);
            (i, cross_2d(&incoming, &out).atan2(incoming.dot(&out)))
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// Splits a closed edge path into loops that visit every node once.
fn cut_at_repeated_nodes(edges: &[Edge], mut path: Vec<usize>) -> Vec<Vec<usize>> {
    let mut result = Vec::new();
    'outer: loop {
        for j in 1..path.len() {
            if let Some(i) = path[..j].iter().position(|&e| edges[e].from == edges[path[j]].from) {
                let inner: Vec<usize> = path.drain(i..j).collect();
                result.push(inner);
                continue 'outer;
            }
        }
        break;
    }
    if !path.is_empty() {
        result.push(path);
    }
    result
}

/// Merges consecutive collinear segments and consecutive arcs of one circle.
fn merge_continuations(chain: &[Piece], tol: f64) -> Vec<Piece> {
    let mut out: Vec<Piece> = Vec::with_capacity(chain.len());
    for piece in chain {
        if let Some(last) = out.last_mut() {
            if let Some(joined) = join(last, piece, tol) {
                *last = joined;
                continue;
            }
        }
        out.push(*piece);
    }
    while out.len() > 2 {
        let (Some(last), Some(first)) = (out.last(), out.first()) else {
            break;
        };
        let Some(joined) = join(last, first, tol) else {
            break;
        };
        out[0] = joined;
        out.pop();
    }
    out
}

fn join(a: &Piece, b: &Piece, tol: f64) -> Option<Piece> {
    match (a.arc_geometry(), b.arc_geometry()) {
        (None, None) => {
            let da = a.end - a.start;
            let db = b.end - b.start;
            let la = da.norm();
            let lb = db.norm();
            if la <= 0.0 || lb <= 0.0 || da.dot(&db) <= 0.0 {
                return None;
            }
            // Offset of b's end from the line through a.
            (cross_2d(&da, &(b.end - a.start)).abs() / la <= tol)
                .then(|| Piece::segment(a.start, b.end))
        }
        (Some(arc_a), Some(arc_b)) => {
            let same_circle = (arc_a.cx - arc_b.cx).hypot(arc_a.cy - arc_b.cy) <= tol
                && (arc_a.radius - arc_b.radius).abs() <= tol
                && arc_a.sweep.signum() == arc_b.sweep.signum();
            let sweep = arc_a.sweep + arc_b.sweep;
            (same_circle && sweep.abs() < std::f64::consts::TAU - 1e-9)
                .then(|| Piece::arc(a.start, b.end, bulge_from_sweep(sweep)))
        }
        _ => None,
    }
}

/// Spatial hash that maps nearby points to one node.
struct NodeMerger {
    cell_size: f64,
    nodes: SlotMap<NodeId, Point2>,
    map: HashMap<(i64, i64), Vec<NodeId>>,
}

impl NodeMerger {
    fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            nodes: SlotMap::with_key(),
            map: HashMap::new(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell_key(&self, p: &Point2) -> (i64, i64) {
        let inv = 1.0 / self.cell_size;
        ((p.x * inv).floor() as i64, (p.y * inv).floor() as i64)
    }

    fn get_or_create(&mut self, point: &Point2) -> NodeId {
        let key = self.cell_key(point);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(entries) = self.map.get(&(key.0 + dx, key.1 + dy)) {
                    for &id in entries {
                        if (point - self.nodes[id]).norm() < self.cell_size {
                            return id;
                        }
                    }
                }
            }
        }
        let id = self.nodes.insert(*point);
        self.map.entry(key).or_default().push(id);
        id
    }
}
