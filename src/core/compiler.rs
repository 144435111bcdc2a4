//! STRling Compiler - AST to IR Lowering with Semantic Checks
//!
//! The compiler is a validating structural copy: every AST variant maps to
//! the identically named IR variant. On top of the copy it:
//!   - validates quantifier bounds (non-negative, ordered)
//!   - re-verifies backreferences against the final capture table, so ASTs
//!     built outside the parser (JSON fixtures) get the same guarantees
//!   - rejects contradictory group shapes and inverted class ranges
//!   - flattens nested sequences and alternations, coalesces adjacent
//!     literals, and collapses single-element containers
//!   - wraps quantifier children that are not emission atoms (lookarounds,
//!     multi-character literals, bare sequences or alternations) in a
//!     non-capturing group so `(?=a)+` emits as `(?:(?=a))+`
//!
//! The first violation aborts compilation with a single diagnostic.

use crate::core::errors::STRlingError;
use crate::core::ir::{IRClassItem, IRMax, IROp};
use crate::core::nodes::{ClassItem, LookDir, Max, Mode, Node};
use std::collections::{BTreeSet, HashSet};

/// The final capture table of an AST: total count and the set of names.
struct CaptureTable {
    count: u32,
    names: HashSet<String>,
}

/// Compiler transforming AST nodes into normalized IR.
pub struct Compiler {
    features_used: BTreeSet<String>,
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            features_used: BTreeSet::new(),
        }
    }

    /// Compile an AST to IR, returning the first diagnostic on violation.
    pub fn compile(&mut self, root: &Node) -> Result<IROp, STRlingError> {
        let captures = collect_captures(root)?;
        let ir = self.lower(root, &captures)?;
        Ok(self.normalize(ir))
    }

    /// Compile and additionally report which regex features the pattern
    /// uses (for target-capability metadata).
    pub fn compile_with_metadata(&mut self, root: &Node) -> Result<CompileResult, STRlingError> {
        let ir = self.compile(root)?;
        self.analyze_features(&ir);
        Ok(CompileResult {
            ir,
            metadata: Metadata {
                features_used: self.features_used.iter().cloned().collect(),
            },
        })
    }

    fn lower(&self, node: &Node, captures: &CaptureTable) -> Result<IROp, STRlingError> {
        match node {
            Node::Lit { value } => Ok(IROp::Lit {
                value: value.clone(),
            }),
            Node::Dot => Ok(IROp::Dot),
            Node::Anchor { at } => Ok(IROp::Anchor { at: *at }),
            Node::Seq { parts } => {
                let parts = parts
                    .iter()
                    .map(|p| self.lower(p, captures))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(IROp::Seq { parts })
            }
            Node::Alt { branches } => {
                if branches.is_empty() {
                    return Err(STRlingError::semantics(
                        "Alternation requires at least one branch",
                    ));
                }
                let branches = branches
                    .iter()
                    .map(|b| self.lower(b, captures))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(IROp::Alt { branches })
            }
            Node::Quant {
                child,
                min,
                max,
                mode,
            } => {
                if *min < 0 {
                    return Err(STRlingError::bound(
                        "Quantifier minimum may not be negative",
                    ));
                }
                let min = u32::try_from(*min)
                    .map_err(|_| STRlingError::bound("Quantifier bound too large"))?;
                let max = match max {
                    Max::Unbounded => IRMax::Unbounded,
                    Max::Finite(m) => {
                        if *m < 0 {
                            return Err(STRlingError::bound(
                                "Quantifier maximum may not be negative",
                            ));
                        }
                        let m = u32::try_from(*m)
                            .map_err(|_| STRlingError::bound("Quantifier bound too large"))?;
                        if m < min {
                            return Err(STRlingError::bound(
                                "Quantifier minimum exceeds maximum",
                            ));
                        }
                        IRMax::Finite(m)
                    }
                };
                if matches!(**child, Node::Anchor { .. }) {
                    return Err(STRlingError::semantics("Cannot quantify anchor"));
                }
                Ok(IROp::Quant {
                    child: Box::new(self.lower(child, captures)?),
                    min,
                    max,
                    mode: *mode,
                })
            }
            Node::Group {
                capturing,
                name,
                atomic,
                body,
            } => {
                if name.is_some() && !capturing {
                    return Err(STRlingError::semantics("Named group must be capturing"));
                }
                if *atomic && *capturing {
                    return Err(STRlingError::semantics("Atomic group cannot capture"));
                }
                Ok(IROp::Group {
                    capturing: *capturing,
                    name: name.clone(),
                    atomic: *atomic,
                    body: Box::new(self.lower(body, captures)?),
                })
            }
            Node::Look { dir, neg, body } => Ok(IROp::Look {
                dir: *dir,
                neg: *neg,
                body: Box::new(self.lower(body, captures)?),
            }),
            Node::BackRef { by_index, by_name } => {
                match (by_index, by_name) {
                    (Some(_), Some(_)) => {
                        return Err(STRlingError::semantics(
                            "Backreference cannot carry both an index and a name",
                        ));
                    }
                    (Some(n), None) => {
                        if *n == 0 || *n > captures.count {
                            return Err(STRlingError::semantics(
                                "Backreference to undefined group",
                            ));
                        }
                    }
                    (None, Some(name)) => {
                        if !captures.names.contains(name) {
                            return Err(STRlingError::semantics(
                                "Backreference to undefined group",
                            ));
                        }
                    }
                    (None, None) => {
                        return Err(STRlingError::semantics(
                            "Backreference needs an index or a name",
                        ));
                    }
                }
                Ok(IROp::Backref {
                    by_index: *by_index,
                    by_name: by_name.clone(),
                })
            }
            Node::CharClass { negated, items } => {
                let items = items
                    .iter()
                    .map(lower_class_item)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(IROp::CharClass {
                    negated: *negated,
                    items,
                })
            }
        }
    }

    /// Flatten, coalesce and collapse; wrap quantifier children that are
    /// not atoms for emission.
    fn normalize(&self, node: IROp) -> IROp {
        match node {
            IROp::Seq { parts } => {
                let mut flat = Vec::new();
                for part in parts {
                    match self.normalize(part) {
                        IROp::Seq { parts: inner } => flat.extend(inner),
                        other => flat.push(other),
                    }
                }

                // Coalesce adjacent literals.
                let mut coalesced: Vec<IROp> = Vec::new();
                let mut pending = String::new();
                for part in flat {
                    if let IROp::Lit { value } = &part {
                        pending.push_str(value);
                    } else {
                        if !pending.is_empty() {
                            coalesced.push(IROp::Lit {
                                value: std::mem::take(&mut pending),
                            });
                        }
                        coalesced.push(part);
                    }
                }
                if !pending.is_empty() {
                    coalesced.push(IROp::Lit { value: pending });
                }

                if coalesced.len() == 1 {
                    coalesced.remove(0)
                } else {
                    IROp::Seq { parts: coalesced }
                }
            }
            IROp::Alt { branches } => {
                let mut flat = Vec::new();
                for branch in branches {
                    match self.normalize(branch) {
                        IROp::Alt { branches: inner } => flat.extend(inner),
                        other => flat.push(other),
                    }
                }
                if flat.len() == 1 {
                    flat.remove(0)
                } else {
                    IROp::Alt { branches: flat }
                }
            }
            IROp::Quant {
                child,
                min,
                max,
                mode,
            } => {
                let child = self.normalize(*child);
                let needs_group = match &child {
                    IROp::Look { .. } | IROp::Seq { .. } | IROp::Alt { .. } => true,
                    IROp::Lit { value } => value.chars().count() > 1,
                    _ => false,
                };
                let child = if needs_group {
                    IROp::Group {
                        capturing: false,
                        name: None,
                        atomic: false,
                        body: Box::new(child),
                    }
                } else {
                    child
                };
                IROp::Quant {
                    child: Box::new(child),
                    min,
                    max,
                    mode,
                }
            }
            IROp::Group {
                capturing,
                name,
                atomic,
                body,
            } => IROp::Group {
                capturing,
                name,
                atomic,
                body: Box::new(self.normalize(*body)),
            },
            IROp::Look { dir, neg, body } => IROp::Look {
                dir,
                neg,
                body: Box::new(self.normalize(*body)),
            },
            other => other,
        }
    }

    /// Record which engine features the IR tree relies on.
    fn analyze_features(&mut self, node: &IROp) {
        match node {
            IROp::Group {
                atomic,
                name,
                body,
                ..
            } => {
                if *atomic {
                    self.features_used.insert("atomic_group".to_string());
                }
                if name.is_some() {
                    self.features_used.insert("named_group".to_string());
                }
                self.analyze_features(body);
            }
            IROp::Quant { child, mode, .. } => {
                if *mode == Mode::Possessive {
                    self.features_used
                        .insert("possessive_quantifier".to_string());
                }
                self.analyze_features(child);
            }
            IROp::Look { dir, body, .. } => {
                let feature = match dir {
                    LookDir::Ahead => "lookahead",
                    LookDir::Behind => "lookbehind",
                };
                self.features_used.insert(feature.to_string());
                self.analyze_features(body);
            }
            IROp::Backref { .. } => {
                self.features_used.insert("backreference".to_string());
            }
            IROp::CharClass { items, .. } => {
                if items
                    .iter()
                    .any(|i| matches!(i, IRClassItem::UnicodeProp { .. }))
                {
                    self.features_used.insert("unicode_property".to_string());
                }
            }
            IROp::Seq { parts } => {
                for part in parts {
                    self.analyze_features(part);
                }
            }
            IROp::Alt { branches } => {
                for branch in branches {
                    self.analyze_features(branch);
                }
            }
            _ => {}
        }
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

fn lower_class_item(item: &ClassItem) -> Result<IRClassItem, STRlingError> {
    match item {
        ClassItem::Lit { ch } => Ok(IRClassItem::Char { ch: *ch }),
        ClassItem::Range { from, to } => {
            if (*from as u32) > (*to as u32) {
                return Err(STRlingError::semantics("Invalid character range"));
            }
            Ok(IRClassItem::Range {
                from: *from,
                to: *to,
            })
        }
        ClassItem::Shorthand { kind } => Ok(IRClassItem::Shorthand { kind: *kind }),
        ClassItem::UnicodeProp { negated, value } => Ok(IRClassItem::UnicodeProp {
            negated: *negated,
            value: value.clone(),
        }),
    }
}

/// Walk the AST in source order collecting the final capture table.
/// Duplicate capture names are rejected here so fixture-built ASTs get the
/// same guarantee the parser enforces for DSL input.
fn collect_captures(root: &Node) -> Result<CaptureTable, STRlingError> {
    let mut table = CaptureTable {
        count: 0,
        names: HashSet::new(),
    };
    walk_captures(root, &mut table)?;
    Ok(table)
}

fn walk_captures(node: &Node, table: &mut CaptureTable) -> Result<(), STRlingError> {
    match node {
        Node::Group {
            capturing,
            name,
            body,
            ..
        } => {
            if *capturing {
                table.count += 1;
            }
            if let Some(name) = name {
                if !table.names.insert(name.clone()) {
                    return Err(STRlingError::semantics("Duplicate group name"));
                }
            }
            walk_captures(body, table)
        }
        Node::Seq { parts } => {
            for part in parts {
                walk_captures(part, table)?;
            }
            Ok(())
        }
        Node::Alt { branches } => {
            for branch in branches {
                walk_captures(branch, table)?;
            }
            Ok(())
        }
        Node::Quant { child, .. } => walk_captures(child, table),
        Node::Look { body, .. } => walk_captures(body, table),
        _ => Ok(()),
    }
}

/// Compile an AST node to IR.
pub fn compile(root: &Node) -> Result<IROp, STRlingError> {
    Compiler::new().compile(root)
}

/// Result of compilation with metadata.
#[derive(Debug, Clone)]
pub struct CompileResult {
    pub ir: IROp,
    pub metadata: Metadata,
}

/// Metadata about the compiled pattern.
#[derive(Debug, Clone)]
pub struct Metadata {
    pub features_used: Vec<String>,
}
