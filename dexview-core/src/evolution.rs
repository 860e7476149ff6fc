///! Evolution-chain flattening
use crate::error::FetchError;
use crate::types::{ChainNode, EvolutionChain, EvolutionStep};

/// Chains are tiny trees in practice (longest real line is 3 deep plus
/// branches). The bound only exists to reject malformed cyclic input.
const MAX_CHAIN_DEPTH: usize = 32;

/// Flatten an evolution tree into an ordered sequence of steps.
///
/// Traversal is depth-first, pre-order: the current node is emitted, then
/// each child in array order before the next sibling. The root carries no
/// minimum level; every other step takes it from the first trigger entry of
/// the edge leading into its node.
pub fn flatten(chain: &EvolutionChain) -> Result<Vec<EvolutionStep>, FetchError> {
    let mut steps = Vec::new();
    walk(&chain.chain, None, 0, &mut steps)?;
    Ok(steps)
}

fn walk(
    node: &ChainNode,
    min_level: Option<u32>,
    depth: usize,
    out: &mut Vec<EvolutionStep>,
) -> Result<(), FetchError> {
    if depth > MAX_CHAIN_DEPTH {
        return Err(FetchError::malformed(
            &node.species.name,
            format!("evolution chain exceeds depth bound of {}", MAX_CHAIN_DEPTH),
        ));
    }

    out.push(EvolutionStep {
        name: node.species.name.clone(),
        min_level,
    });

    for child in &node.evolves_to {
        let level = child.evolution_details.first().and_then(|d| d.min_level);
        walk(child, level, depth + 1, out)?;
    }

    Ok(())
}
