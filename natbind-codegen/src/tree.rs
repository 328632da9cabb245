//! Namespace/type/member symbol tree.
//!
//! The tree is an arena: namespace and type nodes live in two vectors and
//! refer to their children by index through insertion-ordered maps keyed by
//! [`SymbolId`]. Nodes are created lazily while inserting a member's
//! containing chain; [`SymbolTree::consolidate`] prunes whatever ends up
//! empty.

use indexmap::{IndexMap, IndexSet};
use natbind_core::SymbolId;
use natbind_ir::{ContainingChain, TypeDecl};

use crate::builder::CodeFragment;
use crate::pipeline::{Diagnostic, DiagnosticFamily, DiagnosticKind, DiagnosticSink};

const ROOT: usize = 0;

#[derive(Debug)]
struct NamespaceNode {
    name: String,
    namespaces: IndexMap<SymbolId, usize>,
    types: IndexMap<SymbolId, usize>,
}

impl NamespaceNode {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespaces: IndexMap::new(),
            types: IndexMap::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.namespaces.is_empty() && self.types.is_empty()
    }
}

#[derive(Debug)]
struct TypeNode<M> {
    decl: TypeDecl,
    types: IndexMap<SymbolId, usize>,
    members: IndexMap<SymbolId, M>,
}

impl<M> TypeNode<M> {
    fn is_empty(&self) -> bool {
        self.types.is_empty() && self.members.is_empty()
    }
}

/// Outcome of [`SymbolTree::insert_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The member was validated and added.
    Inserted,
    /// A member with the same identity already exists; nothing changed.
    Duplicate,
    /// An ancestor or the member itself was rejected with a diagnostic,
    /// possibly on an earlier attempt for the same identity.
    Rejected,
}

impl Insertion {
    /// The member is present in the tree after the call.
    pub fn is_present(self) -> bool {
        !matches!(self, Insertion::Rejected)
    }
}

/// Language-specific rendering of tree nodes.
pub trait TreeSyntax<M> {
    /// Header for a (possibly collapsed) namespace, e.g. `namespace A.B`.
    fn namespace_header(&self, qualified_name: &str) -> String;

    /// Header re-declaring a containing type.
    fn type_header(&self, decl: &TypeDecl) -> String;

    fn member(&self, member: &M) -> Vec<CodeFragment>;
}

/// Hierarchy of namespaces, partial types and rendered members.
#[derive(Debug)]
pub struct SymbolTree<M> {
    family: DiagnosticFamily,
    namespaces: Vec<NamespaceNode>,
    types: Vec<TypeNode<M>>,
    /// Members whose own validation failed.
    rejected: IndexSet<SymbolId>,
}

#[derive(Clone, Copy)]
enum Container {
    Namespace(usize),
    Type(usize),
}

impl<M> SymbolTree<M> {
    /// Create an empty tree; `family` selects the diagnostic id prefix.
    pub fn new(family: DiagnosticFamily) -> Self {
        Self {
            family,
            namespaces: vec![NamespaceNode::new("")],
            types: Vec::new(),
            rejected: IndexSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces[ROOT].is_empty()
    }

    /// Number of members across all type nodes still attached to the tree.
    pub fn member_count(&self) -> usize {
        self.members().count()
    }

    /// `member` was already inserted or rejected.
    pub fn is_known(&self, member: SymbolId) -> bool {
        self.rejected.contains(&member)
            || self.types.iter().any(|t| t.members.contains_key(&member))
    }

    /// Record a member rejected before reaching [`SymbolTree::insert_with`].
    pub fn mark_rejected(&mut self, member: SymbolId) {
        self.rejected.insert(member);
    }

    /// Members in render order.
    pub fn members(&self) -> impl Iterator<Item = &M> {
        let mut order = Vec::new();
        self.collect_namespace(ROOT, &mut order);
        order
            .into_iter()
            .flat_map(move |t| self.types[t].members.values())
    }

    fn collect_namespace(&self, index: usize, order: &mut Vec<usize>) {
        let node = &self.namespaces[index];
        for &t in node.types.values() {
            self.collect_type(t, order);
        }
        for &ns in node.namespaces.values() {
            self.collect_namespace(ns, order);
        }
    }

    fn collect_type(&self, index: usize, order: &mut Vec<usize>) {
        order.push(index);
        for &t in self.types[index].types.values() {
            self.collect_type(t, order);
        }
    }

    /// Insert the member `member` declared in `chain`.
    ///
    /// Ancestors are created first; a new type node must be re-declarable,
    /// otherwise one diagnostic naming it is reported and nothing else runs.
    /// An identity that was already inserted or rejected is left untouched
    /// without calling `accept`, so its diagnostics are reported once.
    /// Otherwise `accept` validates the member, reporting its own
    /// diagnostics, and returns the value to store.
    pub fn insert_with<F>(
        &mut self,
        chain: &ContainingChain,
        member: SymbolId,
        sink: &mut dyn DiagnosticSink,
        accept: F,
    ) -> Insertion
    where
        F: FnOnce(&mut dyn DiagnosticSink) -> Option<M>,
    {
        let Some(type_index) = self.ensure_chain(chain, sink) else {
            return Insertion::Rejected;
        };

        if self.types[type_index].members.contains_key(&member) {
            tracing::debug!(member = %member, "duplicate member ignored");
            return Insertion::Duplicate;
        }
        if self.rejected.contains(&member) {
            tracing::debug!(member = %member, "member already rejected");
            return Insertion::Rejected;
        }

        match accept(sink) {
            Some(value) => {
                self.types[type_index].members.insert(member, value);
                Insertion::Inserted
            }
            None => {
                self.rejected.insert(member);
                Insertion::Rejected
            }
        }
    }

    fn ensure_chain(
        &mut self,
        chain: &ContainingChain,
        sink: &mut dyn DiagnosticSink,
    ) -> Option<usize> {
        let mut namespace = ROOT;
        for decl in &chain.namespaces {
            namespace = match self.namespaces[namespace].namespaces.get(&decl.id) {
                Some(&existing) => existing,
                None => {
                    let index = self.namespaces.len();
                    self.namespaces.push(NamespaceNode::new(&decl.name));
                    self.namespaces[namespace].namespaces.insert(decl.id, index);
                    index
                }
            };
        }

        let mut container = Container::Namespace(namespace);
        for (depth, decl) in chain.types.iter().enumerate() {
            let existing = match container {
                Container::Namespace(ns) => self.namespaces[ns].types.get(&decl.id),
                Container::Type(t) => self.types[t].types.get(&decl.id),
            };
            let index = match existing {
                Some(&existing) => existing,
                None => {
                    if !decl.is_extensible() {
                        let name = chain.qualified_type_name(depth + 1);
                        tracing::debug!(type_name = %name, "containing type is not partial");
                        sink.report(
                            Diagnostic::error(
                                self.family,
                                DiagnosticKind::UnsupportedTypeDeclaration,
                                self.non_partial_message(&name),
                            )
                            .at(decl.location.clone()),
                        );
                        return None;
                    }
                    let index = self.types.len();
                    self.types.push(TypeNode {
                        decl: decl.clone(),
                        types: IndexMap::new(),
                        members: IndexMap::new(),
                    });
                    match container {
                        Container::Namespace(ns) => {
                            self.namespaces[ns].types.insert(decl.id, index);
                        }
                        Container::Type(t) => {
                            self.types[t].types.insert(decl.id, index);
                        }
                    }
                    index
                }
            };
            container = Container::Type(index);
        }

        match container {
            Container::Type(index) => Some(index),
            Container::Namespace(_) => None,
        }
    }

    fn non_partial_message(&self, name: &str) -> String {
        let content = match self.family {
            DiagnosticFamily::NativeImports => "native imports",
            DiagnosticFamily::FormattedConstants => "formatted constant members",
        };
        format!(
            "The type declaration of \"{name}\" must be a 'partial' type in order for it to contain {content} or contain nested types containing {content}"
        )
    }

    /// Remove every node that has no members below it.
    pub fn consolidate(&mut self) {
        self.consolidate_namespace(ROOT);
    }

    fn consolidate_namespace(&mut self, index: usize) -> bool {
        let children: Vec<usize> = self.namespaces[index].namespaces.values().copied().collect();
        let empty: Vec<usize> = children
            .into_iter()
            .filter(|&child| self.consolidate_namespace(child))
            .collect();
        self.namespaces[index]
            .namespaces
            .retain(|_, child| !empty.contains(child));

        let types: Vec<usize> = self.namespaces[index].types.values().copied().collect();
        let empty: Vec<usize> = types
            .into_iter()
            .filter(|&child| self.consolidate_type(child))
            .collect();
        self.namespaces[index]
            .types
            .retain(|_, child| !empty.contains(child));

        self.namespaces[index].is_empty()
    }

    fn consolidate_type(&mut self, index: usize) -> bool {
        let nested: Vec<usize> = self.types[index].types.values().copied().collect();
        let empty: Vec<usize> = nested
            .into_iter()
            .filter(|&child| self.consolidate_type(child))
            .collect();
        self.types[index].types.retain(|_, child| !empty.contains(child));
        self.types[index].is_empty()
    }

    /// Render the tree as a sequence of top-level items separated by blank lines.
    ///
    /// Within a type, members come before nested types; within a namespace,
    /// types come before child namespaces. A namespace with a single child
    /// namespace and no types is merged into one dotted header.
    pub fn render(&self, syntax: &impl TreeSyntax<M>) -> Vec<CodeFragment> {
        self.namespace_items(ROOT, syntax)
    }

    fn namespace_items(&self, index: usize, syntax: &impl TreeSyntax<M>) -> Vec<CodeFragment> {
        let node = &self.namespaces[index];
        let items = node
            .types
            .values()
            .map(|&t| self.render_type(t, syntax))
            .chain(
                node.namespaces
                    .values()
                    .map(|&ns| self.render_namespace(ns, syntax)),
            );
        separated(items)
    }

    fn render_namespace(&self, mut index: usize, syntax: &impl TreeSyntax<M>) -> CodeFragment {
        let mut name = self.namespaces[index].name.clone();
        loop {
            let node = &self.namespaces[index];
            match node.namespaces.first() {
                Some((_, &only)) if node.types.is_empty() && node.namespaces.len() == 1 => {
                    name.push('.');
                    name.push_str(&self.namespaces[only].name);
                    index = only;
                }
                _ => break,
            }
        }
        CodeFragment::braced(
            syntax.namespace_header(&name),
            self.namespace_items(index, syntax),
        )
    }

    fn render_type(&self, index: usize, syntax: &impl TreeSyntax<M>) -> CodeFragment {
        let node = &self.types[index];
        let items = node
            .members
            .values()
            .map(|m| CodeFragment::sequence(syntax.member(m)))
            .chain(node.types.values().map(|&t| self.render_type(t, syntax)));
        CodeFragment::braced(syntax.type_header(&node.decl), separated(items))
    }
}

fn separated(items: impl Iterator<Item = CodeFragment>) -> Vec<CodeFragment> {
    let mut out = Vec::new();
    for item in items {
        if !out.is_empty() {
            out.push(CodeFragment::Blank);
        }
        out.push(item);
    }
    out
}

#[cfg(test)]
mod tests {
    use natbind_ir::{MemberDecl, TypeDeclKind};

    use super::*;
    use crate::{CodeBuilder, testing::Fixtures};

    struct Plain;

    impl TreeSyntax<String> for Plain {
        fn namespace_header(&self, qualified_name: &str) -> String {
            format!("namespace {qualified_name}")
        }

        fn type_header(&self, decl: &TypeDecl) -> String {
            format!("partial class {}", decl.header_name())
        }

        fn member(&self, member: &String) -> Vec<CodeFragment> {
            vec![CodeFragment::line(member.clone())]
        }
    }

    fn insert(
        tree: &mut SymbolTree<String>,
        member: &MemberDecl,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Insertion {
        let value = format!("// {}", member.name);
        tree.insert_with(&member.containing, member.id, diagnostics, |_| Some(value))
    }

    fn render(tree: &SymbolTree<String>) -> String {
        let mut builder = CodeBuilder::csharp();
        builder.emit_all(tree.render(&Plain));
        builder.build()
    }

    #[test]
    fn test_duplicate_insertion_is_idempotent() {
        let mut fx = Fixtures::new();
        let mut tree = SymbolTree::new(DiagnosticFamily::FormattedConstants);
        let mut diagnostics = Vec::new();
        let member = fx.method("Demo.Consts", "A").build();

        assert_eq!(insert(&mut tree, &member, &mut diagnostics), Insertion::Inserted);
        let mut called = false;
        let second = tree.insert_with(&member.containing, member.id, &mut diagnostics, |_| {
            called = true;
            Some("// replaced".to_string())
        });

        assert_eq!(second, Insertion::Duplicate);
        assert!(second.is_present());
        assert!(!called);
        assert_eq!(tree.member_count(), 1);
        assert_eq!(tree.members().next().map(String::as_str), Some("// A"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_rejected_member_is_validated_once() {
        let mut fx = Fixtures::new();
        let mut tree: SymbolTree<String> = SymbolTree::new(DiagnosticFamily::FormattedConstants);
        let mut diagnostics = Vec::new();
        let member = fx.method("Demo.Consts", "A").build();

        let mut calls = 0;
        for _ in 0..2 {
            let outcome = tree.insert_with(&member.containing, member.id, &mut diagnostics, |_| {
                calls += 1;
                None
            });
            assert_eq!(outcome, Insertion::Rejected);
            assert!(!outcome.is_present());
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_non_partial_ancestor_is_reported_once_per_attempt() {
        let mut fx = Fixtures::new();
        fx.declare_type("Demo.Outer", TypeDeclKind::Class, false);
        let mut tree = SymbolTree::new(DiagnosticFamily::NativeImports);
        let mut diagnostics = Vec::new();

        let member = fx.method("Demo.Outer+Inner", "A").build();
        assert_eq!(insert(&mut tree, &member, &mut diagnostics), Insertion::Rejected);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].id, "NBIMP0011");
        assert_eq!(
            diagnostics[0].message,
            "The type declaration of \"Demo.Outer\" must be a 'partial' type in order for it to contain native imports or contain nested types containing native imports"
        );
    }

    #[test]
    fn test_sibling_unaffected_by_rejected_ancestor() {
        let mut fx = Fixtures::new();
        fx.declare_type("Demo.Flags", TypeDeclKind::Enum, true);
        let mut tree = SymbolTree::new(DiagnosticFamily::FormattedConstants);
        let mut diagnostics = Vec::new();

        let bad = fx.method("Demo.Flags", "A").build();
        let good = fx.method("Demo.Consts", "B").build();
        assert_eq!(insert(&mut tree, &bad, &mut diagnostics), Insertion::Rejected);
        assert_eq!(insert(&mut tree, &good, &mut diagnostics), Insertion::Inserted);

        tree.consolidate();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].id, "NBFMT0011");
        assert_eq!(
            render(&tree),
            "namespace Demo\n{\n\tpartial class Consts\n\t{\n\t\t// B\n\t}\n}\n"
        );
    }

    #[test]
    fn test_rejected_member_leaves_no_output_after_consolidation() {
        let mut fx = Fixtures::new();
        let mut tree: SymbolTree<String> = SymbolTree::new(DiagnosticFamily::NativeImports);
        let mut diagnostics = Vec::new();
        let member = fx.method("Demo.Deep.Sdl+Inner", "A").build();

        let outcome = tree.insert_with(&member.containing, member.id, &mut diagnostics, |_| None);
        assert_eq!(outcome, Insertion::Rejected);
        assert!(!tree.is_empty());

        tree.consolidate();
        assert!(tree.is_empty());
        assert_eq!(render(&tree), "");
    }

    #[test]
    fn test_consolidation_prunes_only_empty_branches() {
        let mut fx = Fixtures::new();
        let mut tree = SymbolTree::new(DiagnosticFamily::NativeImports);
        let mut diagnostics = Vec::new();

        let kept = fx.method("Demo.Sdl", "A").build();
        let dropped = fx.method("Demo.Other.Audio", "B").build();
        insert(&mut tree, &kept, &mut diagnostics);
        tree.insert_with(&dropped.containing, dropped.id, &mut diagnostics, |_| None);

        tree.consolidate();
        assert_eq!(tree.member_count(), 1);
        assert!(!render(&tree).contains("Other"));
    }

    #[test]
    fn test_namespace_chain_collapses() {
        let mut fx = Fixtures::new();
        let mut tree = SymbolTree::new(DiagnosticFamily::FormattedConstants);
        let mut diagnostics = Vec::new();
        let member = fx.method("Foo.Bar.Baz.Consts", "A").build();
        insert(&mut tree, &member, &mut diagnostics);
        tree.consolidate();

        assert_eq!(
            render(&tree),
            "namespace Foo.Bar.Baz\n{\n\tpartial class Consts\n\t{\n\t\t// A\n\t}\n}\n"
        );
    }

    #[test]
    fn test_collapse_stops_at_namespace_with_types() {
        let mut fx = Fixtures::new();
        let mut tree = SymbolTree::new(DiagnosticFamily::FormattedConstants);
        let mut diagnostics = Vec::new();
        insert(&mut tree, &fx.method("Foo.Bar.Baz.Consts", "A").build(), &mut diagnostics);
        insert(&mut tree, &fx.method("Foo.Bar.Top", "B").build(), &mut diagnostics);

        let expected = "\
namespace Foo.Bar
{
\tpartial class Top
\t{
\t\t// B
\t}

\tnamespace Baz
\t{
\t\tpartial class Consts
\t\t{
\t\t\t// A
\t\t}
\t}
}
";
        assert_eq!(render(&tree), expected);
    }

    #[test]
    fn test_members_before_nested_types_in_insertion_order() {
        let mut fx = Fixtures::new();
        let mut tree = SymbolTree::new(DiagnosticFamily::FormattedConstants);
        let mut diagnostics = Vec::new();
        insert(&mut tree, &fx.method("Sdl+Inner", "Nested").build(), &mut diagnostics);
        insert(&mut tree, &fx.method("Sdl", "Zeta").build(), &mut diagnostics);
        insert(&mut tree, &fx.method("Sdl", "Alpha").build(), &mut diagnostics);

        let expected = "\
partial class Sdl
{
\t// Zeta

\t// Alpha

\tpartial class Inner
\t{
\t\t// Nested
\t}
}
";
        assert_eq!(render(&tree), expected);
        let order: Vec<_> = tree.members().map(String::as_str).collect();
        assert_eq!(order, vec!["// Zeta", "// Alpha", "// Nested"]);
    }
}
