//! Invocation tree builder
//!
//! The runtime reports CPIs as one flat list per outer instruction, each entry
//! tagged with its stack height. This module folds those lists back into the
//! nested call hierarchy.

use super::input::{CompiledInstruction, InnerInstructions, RawMessage};
use super::types::{AccountMeta, Instruction, RawInstruction};

/// Stack height of an outer instruction.
pub const OUTER_STACK_HEIGHT: u16 = 1;

/// Flattened CPIs of one outer instruction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InnerGroup {
    pub outer_index: u16,
    pub instructions: Vec<RawInstruction>,
}

/// Dereferences a compiled instruction through the account table.
///
/// Out-of-range indices resolve to a default (all-zero) account so that
/// positional account layouts stay aligned.
pub fn materialize(ix: &CompiledInstruction, accounts: &[AccountMeta], default_height: u16) -> RawInstruction {
    let program_id = accounts.get(ix.program_id_index as usize).map(|a| a.key).unwrap_or_default();
    RawInstruction {
        program_id,
        accounts: ix
            .accounts
            .iter()
            .map(|&idx| accounts.get(idx as usize).copied().unwrap_or_default())
            .collect(),
        data: ix.data.clone(),
        stack_height: ix
            .stack_height
            .and_then(|h| u16::try_from(h).ok())
            .unwrap_or(default_height),
        parsed: ix.parsed.clone(),
    }
}

/// Resolves a message and its inner-instruction metadata into a forest, one
/// root per outer instruction.
pub fn build_from_message(
    message: &RawMessage,
    inner: &[InnerInstructions],
    accounts: &[AccountMeta],
) -> Vec<Instruction> {
    let outer = message
        .instructions
        .iter()
        .map(|ix| {
            let mut raw = materialize(ix, accounts, OUTER_STACK_HEIGHT);
            raw.stack_height = OUTER_STACK_HEIGHT;
            raw
        })
        .collect();
    let groups = inner
        .iter()
        .map(|group| InnerGroup {
            outer_index: group.index as u16,
            instructions: group
                .instructions
                .iter()
                .map(|ix| materialize(ix, accounts, OUTER_STACK_HEIGHT + 1))
                .collect(),
        })
        .collect();
    build_invocation_forest(outer, groups)
}

/// Builds the forest and numbers every node in execution order.
pub fn build_invocation_forest(outer: Vec<RawInstruction>, mut groups: Vec<InnerGroup>) -> Vec<Instruction> {
    let mut roots = Vec::with_capacity(outer.len());
    for (i, raw) in outer.into_iter().enumerate() {
        let children = groups
            .iter()
            .position(|g| g.outer_index as usize == i)
            .map(|pos| build_level(std::mem::take(&mut groups[pos].instructions)))
            .unwrap_or_default();
        roots.push(Instruction::new(raw, children));
    }

    let mut seq = 0u32;
    for root in &mut roots {
        number(root, &mut seq);
    }
    roots
}

/// Splits one flattened level into siblings.
///
/// Each entry owns the run of following entries that are strictly deeper
/// than itself; the first entry that is not starts the next sibling. A
/// malformed list that drops below an earlier height therefore yields
/// siblings, never a child that is shallower than its parent.
fn build_level(items: Vec<RawInstruction>) -> Vec<Instruction> {
    let mut nodes = Vec::new();
    let mut items = items.into_iter().peekable();
    while let Some(raw) = items.next() {
        let mut descendants = Vec::new();
        while let Some(next) = items.next_if(|ix| ix.stack_height > raw.stack_height) {
            descendants.push(next);
        }
        nodes.push(Instruction::new(raw, build_level(descendants)));
    }
    nodes
}

fn number(node: &mut Instruction, seq: &mut u32) {
    node.seq = *seq;
    *seq += 1;
    for child in &mut node.children {
        number(child, seq);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::pubkey::Pubkey;

    fn raw(tag: u8, stack_height: u16) -> RawInstruction {
        RawInstruction {
            program_id: Pubkey::default(),
            accounts: Vec::new(),
            data: vec![tag],
            stack_height,
            parsed: None,
        }
    }

    fn flatten(node: &Instruction, out: &mut Vec<u8>) {
        for child in &node.children {
            out.push(child.raw.data[0]);
            flatten(child, out);
        }
    }

    fn assert_heights_increase(node: &Instruction) {
        for child in &node.children {
            assert!(node.raw.stack_height < child.raw.stack_height);
            assert_heights_increase(child);
        }
    }

    #[test]
    fn test_nested_inner_instructions() {
        // 2 -> (3 -> 4), 3 ; 2 ; 2 -> 3
        let inner = vec![raw(1, 2), raw(2, 3), raw(3, 4), raw(4, 3), raw(5, 2), raw(6, 2), raw(7, 3)];
        let forest = build_invocation_forest(
            vec![raw(0, 1)],
            vec![InnerGroup { outer_index: 0, instructions: inner }],
        );

        assert_eq!(forest.len(), 1);
        let root = &forest[0];
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.children[0].children.len(), 2);
        assert_eq!(root.children[0].children[0].children.len(), 1);
        assert!(root.children[1].children.is_empty());
        assert_eq!(root.children[2].children.len(), 1);

        let mut order = Vec::new();
        flatten(root, &mut order);
        assert_eq!(order, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_heights_increase(root);
    }

    #[test]
    fn test_seq_follows_execution_order() {
        let forest = build_invocation_forest(
            vec![raw(0, 1), raw(1, 1)],
            vec![
                InnerGroup { outer_index: 1, instructions: vec![raw(2, 2), raw(3, 3)] },
                InnerGroup { outer_index: 0, instructions: vec![raw(4, 2)] },
            ],
        );
        assert_eq!(forest[0].seq, 0);
        assert_eq!(forest[0].children[0].seq, 1);
        assert_eq!(forest[1].seq, 2);
        assert_eq!(forest[1].children[0].seq, 3);
        assert_eq!(forest[1].children[0].children[0].seq, 4);
    }

    #[test]
    fn test_empty_and_missing_groups() {
        assert!(build_invocation_forest(Vec::new(), Vec::new()).is_empty());

        let forest = build_invocation_forest(
            vec![raw(0, 1), raw(1, 1)],
            vec![InnerGroup { outer_index: 0, instructions: Vec::new() }],
        );
        assert!(forest.iter().all(|root| root.children.is_empty()));
    }

    #[test]
    fn test_single_inner_instruction() {
        let forest = build_invocation_forest(
            vec![raw(0, 1)],
            vec![InnerGroup { outer_index: 0, instructions: vec![raw(9, 2)] }],
        );
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].raw.data, vec![9]);
    }

    #[test]
    fn test_unexpected_first_height_is_trusted() {
        // first inner entry already at height 3: it still roots the level
        let forest = build_invocation_forest(
            vec![raw(0, 1)],
            vec![InnerGroup { outer_index: 0, instructions: vec![raw(1, 3), raw(2, 4), raw(3, 3)] }],
        );
        let root = &forest[0];
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].children.len(), 1);
    }

    #[test]
    fn test_height_below_first_entry_becomes_sibling() {
        // 3 ; 2 -> 3
        let forest = build_invocation_forest(
            vec![raw(0, 1)],
            vec![InnerGroup { outer_index: 0, instructions: vec![raw(1, 3), raw(2, 2), raw(3, 3)] }],
        );
        let root = &forest[0];
        assert_eq!(root.children.len(), 2);
        assert!(root.children[0].children.is_empty());
        assert_eq!(root.children[1].children.len(), 1);

        let mut order = Vec::new();
        flatten(root, &mut order);
        assert_eq!(order, vec![1, 2, 3]);
        assert_heights_increase(root);
    }

    #[test]
    fn test_materialize_resolves_accounts() {
        let program = Pubkey::new_unique();
        let a = Pubkey::new_unique();
        let accounts = vec![
            AccountMeta { key: program, writable: false, signer: false },
            AccountMeta { key: a, writable: true, signer: true },
        ];
        let compiled = CompiledInstruction {
            program_id_index: 0,
            accounts: vec![1, 7],
            data: vec![1, 2],
            stack_height: Some(3),
            parsed: None,
        };
        let raw = materialize(&compiled, &accounts, 2);
        assert_eq!(raw.program_id, program);
        assert_eq!(raw.accounts[0], accounts[1]);
        assert_eq!(raw.accounts[1].key, Pubkey::default());
        assert_eq!(raw.stack_height, 3);
    }
}
