//! The compressed trie ("radix tree") that maps route patterns to handlers.
//!
//! A pattern is literal text in which a run starting at the placeholder byte
//! (`:` by default) and ending at the next delimiter (`/` by default) names one
//! capture. Shared prefixes are stored once: registering
//!
//! ```text
//! /params/:one/:two
//! /params/:one/fixed/:two
//! ```
//!
//! yields one edge `/params/:one/` with two children, `:two` and
//! `fixed/:two`. Lookup walks the concrete path down the edges in
//! O(path-length), binding captures as it goes.
//!
//! [`Tree`] is the unguarded form: `insert` needs `&mut self`, `lookup` needs
//! `&self`, so the borrow checker enforces register-then-freeze and readers
//! share it freely behind an `Arc`. [`GuardedTree`] puts the same tree behind a
//! read/write lock for callers that keep registering while serving.

mod guarded;
pub mod node;

use std::collections::HashMap;

use tracing::trace;

use crate::error::InsertError;

pub use guarded::GuardedTree;
use node::{Edge, Node};

/// Captured path parameters, keyed by placeholder name.
pub type Params = HashMap<String, String>;

// ── Config ────────────────────────────────────────────────────────────────────

/// Syntax markers used to split and match patterns.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    placeholder: u8,
    delimiter: u8,
}

impl Config {
    /// Sets the byte that introduces a capture (default `:`).
    ///
    /// # Panics
    ///
    /// Panics if `byte` is not ASCII or equals the delimiter.
    pub fn placeholder(mut self, byte: u8) -> Self {
        assert!(byte.is_ascii(), "placeholder must be an ASCII byte");
        assert_ne!(byte, self.delimiter, "placeholder and delimiter must differ");
        self.placeholder = byte;
        self
    }

    /// Sets the byte that separates path segments (default `/`).
    ///
    /// # Panics
    ///
    /// Panics if `byte` is not ASCII or equals the placeholder.
    pub fn delimiter(mut self, byte: u8) -> Self {
        assert!(byte.is_ascii(), "delimiter must be an ASCII byte");
        assert_ne!(byte, self.placeholder, "placeholder and delimiter must differ");
        self.delimiter = byte;
        self
    }

    pub fn placeholder_byte(&self) -> u8 {
        self.placeholder
    }

    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter
    }

    /// True when cutting `label` and `key` after their shared `k` bytes would
    /// leave a placeholder token straddling two edges.
    fn splits_placeholder(&self, label: &[u8], key: &[u8], k: usize) -> bool {
        let shared = &label[..k];
        let open = shared
            .iter()
            .rposition(|&b| b == self.placeholder || b == self.delimiter)
            .is_some_and(|i| shared[i] == self.placeholder);
        if !open {
            return false;
        }
        let closed = |rest: &[u8]| rest.first().is_none_or(|&b| b == self.delimiter);
        !(closed(&label[k..]) && closed(&key[k..]))
    }

    /// Matches one edge label against the front of `path`.
    ///
    /// Returns the unconsumed remainder of the path when the whole label
    /// matched, pushing every capture it bound onto `params`. A capture may
    /// bind the empty string.
    fn match_label<'l, 'p>(
        &self,
        mut label: &'l [u8],
        mut path: &'p [u8],
        params: &mut Vec<(&'l [u8], &'p [u8])>,
    ) -> Option<&'p [u8]> {
        loop {
            let literal = find(label, self.placeholder).unwrap_or(label.len());
            path = path.strip_prefix(&label[..literal])?;
            label = &label[literal..];
            if label.is_empty() {
                return Some(path);
            }

            // `label` now starts with the placeholder byte.
            let name_end = find(&label[1..], self.delimiter).map_or(label.len(), |i| i + 1);
            let value_end = find(path, self.delimiter).unwrap_or(path.len());
            params.push((&label[1..name_end], &path[..value_end]));
            label = &label[name_end..];
            path = &path[value_end..];
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self { placeholder: b':', delimiter: b'/' }
    }
}

// ── Match ─────────────────────────────────────────────────────────────────────

/// A successful lookup: the registered handler and the bound parameters.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Match<H> {
    pub handler: H,
    pub params: Params,
}

impl<H> Match<H> {
    pub fn map<U>(self, f: impl FnOnce(H) -> U) -> Match<U> {
        Match { handler: f(self.handler), params: self.params }
    }
}

// ── Tree ──────────────────────────────────────────────────────────────────────

/// A radix tree of route patterns.
///
/// Build it once, then look paths up from as many threads as you like.
#[derive(Debug)]
pub struct Tree<T> {
    root: Node<T>,
    len: usize,
    size: usize,
    config: Config,
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self { root: Node::new(0), len: 0, size: 0, config }
    }

    /// Number of distinct registered patterns.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total label bytes added by insertions.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn config(&self) -> Config {
        self.config
    }

    pub fn root(&self) -> &Node<T> {
        &self.root
    }

    /// Registers `handler` for `pattern`.
    ///
    /// Registering the same pattern again replaces the previous handler.
    ///
    /// ```rust
    /// use tine::tree::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert("/users/:id", "user").unwrap();
    ///
    /// let found = tree.lookup("/users/42").unwrap();
    /// assert_eq!(*found.handler, "user");
    /// assert_eq!(found.params["id"], "42");
    /// ```
    pub fn insert(&mut self, pattern: &str, handler: T) -> Result<(), InsertError> {
        self.insert_at_root(pattern, handler)?;
        trace!(pattern, routes = self.len, bytes = self.size, "route inserted");
        Ok(())
    }

    fn insert_at_root(&mut self, pattern: &str, handler: T) -> Result<(), InsertError> {
        if pattern.is_empty() {
            return Err(InsertError::EmptyPattern);
        }

        let config = self.config;
        let mut node = &mut self.root;
        let mut key = pattern.as_bytes();

        loop {
            let found = node.edges.iter().enumerate().find_map(|(i, edge)| {
                let k = common_prefix(&edge.label, key);
                (k > 0).then_some((i, k))
            });

            let Some((i, k)) = found else {
                let depth = node.depth + 1;
                node.edges.push(Edge::new(key, Node::leaf(depth, handler)));
                self.len += 1;
                self.size += key.len();
                return Ok(());
            };

            let edge = &mut node.edges[i];
            if config.splits_placeholder(&edge.label, key, k) {
                let registered = &pattern.as_bytes()[..pattern.len() - key.len()];
                return Err(InsertError::conflict(registered, edge));
            }

            edge.node.priority += 1;

            if k == edge.label.len() {
                if k == key.len() {
                    if edge.node.handler.replace(handler).is_none() {
                        self.len += 1;
                    }
                    return Ok(());
                }
                key = &key[k..];
                node = &mut edge.node;
                continue;
            }

            // The label outlives the shared prefix: cut it at `k` and move the
            // old target one level down under the leftover tail.
            let tail = edge.label.split_off(k);
            let mut moved = edge.node.push_down();
            moved.priority -= 1;
            edge.node.edges.push(Edge::new(tail, moved));

            if k == key.len() {
                edge.node.handler = Some(handler);
            } else {
                let rest = &key[k..];
                let depth = edge.node.depth + 1;
                edge.node.edges.push(Edge::new(rest, Node::leaf(depth, handler)));
                self.size += rest.len();
            }
            self.len += 1;
            return Ok(());
        }
    }

    /// Finds the handler registered for a concrete request path.
    ///
    /// Static edges are tried before the placeholder edge of the same node,
    /// and a branch that dead-ends further down falls back to its sibling, so
    /// `/a/fixed` and `/a/:x` resolve the same way whichever was registered
    /// first.
    pub fn lookup(&self, path: &str) -> Option<Match<&T>> {
        let mut params = Vec::new();
        let node = self.walk(&self.root, path.as_bytes(), &mut params)?;
        let handler = node.handler.as_ref()?;
        // Names and values start after an ASCII marker and end at an ASCII
        // delimiter or the end of the input, so they are always whole UTF-8.
        let params = params
            .into_iter()
            .map(|(name, value)| (utf8(name), utf8(value)))
            .collect();
        Some(Match { handler, params })
    }

    fn walk<'t, 'p>(
        &'t self,
        node: &'t Node<T>,
        path: &'p [u8],
        params: &mut Vec<(&'t [u8], &'p [u8])>,
    ) -> Option<&'t Node<T>> {
        if path.is_empty() && node.handler.is_some() {
            return Some(node);
        }

        // An exhausted path can still descend through a placeholder-led edge
        // binding the empty string; static-led edges never match it.
        let placeholder = self.config.placeholder;
        let is_capture = |edge: &&Edge<T>| edge.label.first() == Some(&placeholder);
        let literal = node.edges.iter().filter(|edge| !is_capture(edge));
        let capture = node.edges.iter().filter(&is_capture);

        for edge in literal.chain(capture) {
            let mark = params.len();
            if let Some(rest) = self.config.match_label(&edge.label, path, params) {
                if let Some(found) = self.walk(&edge.node, rest, params) {
                    return Some(found);
                }
            }
            params.truncate(mark);
        }
        None
    }

    /// Consumes the tree, yielding every registered pattern with its handler.
    pub fn into_routes(self) -> Vec<(String, T)> {
        fn collect<T>(node: Node<T>, pattern: &mut Vec<u8>, routes: &mut Vec<(String, T)>) {
            if let Some(handler) = node.handler {
                routes.push((utf8(pattern), handler));
            }
            for edge in node.edges {
                let mark = pattern.len();
                pattern.extend_from_slice(&edge.label);
                collect(edge.node, pattern, routes);
                pattern.truncate(mark);
            }
        }

        let mut routes = Vec::with_capacity(self.len);
        collect(self.root, &mut Vec::new(), &mut routes);
        routes
    }
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Length of the longest common byte prefix of `a` and `b`.
fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn find(haystack: &[u8], byte: u8) -> Option<usize> {
    haystack.iter().position(|&b| b == byte)
}

fn utf8(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels<T>(node: &Node<T>) -> Vec<String> {
        node.edges().iter().map(|edge| utf8(edge.label())).collect()
    }

    fn raw_labels<T>(node: &Node<T>) -> Vec<&[u8]> {
        node.edges().iter().map(Edge::label).collect()
    }

    #[test]
    fn common_prefix_counts_bytes() {
        assert_eq!(common_prefix(b"/abc", b"/abd"), 3);
        assert_eq!(common_prefix(b"/ab", b"/abc"), 3);
        assert_eq!(common_prefix(b"x", b"y"), 0);
        // 'é' and 'è' share their first UTF-8 byte.
        assert_eq!(common_prefix("/é".as_bytes(), "/è".as_bytes()), 2);
    }

    #[test]
    fn multibyte_siblings_split_inside_a_character() {
        let mut tree = Tree::new();
        tree.insert("/é", 1).unwrap();
        tree.insert("/è", 2).unwrap();

        assert_eq!(raw_labels(tree.root()), [b"/\xC3"]);
        let branch = tree.root().edges()[0].node();
        assert!(branch.handler().is_none());
        assert_eq!(raw_labels(branch), [b"\xA9", b"\xA8"]);

        assert_eq!(*tree.lookup("/é").unwrap().handler, 1);
        assert_eq!(*tree.lookup("/è").unwrap().handler, 2);
        assert!(tree.lookup("/e").is_none());
    }

    #[test]
    fn empty_capture_on_a_child_edge() {
        let mut tree = Tree::new();
        tree.insert("/params/:one/:two", 1).unwrap();
        assert_eq!(tree.lookup("/params/x/").unwrap().params["two"], "");

        tree.insert("/params/:one/fixed/:two", 2).unwrap();
        assert_eq!(labels(tree.root().edges()[0].node()), [":two", "fixed/:two"]);

        let found = tree.lookup("/params/x/").unwrap();
        assert_eq!(*found.handler, 1);
        assert_eq!(found.params["one"], "x");
        assert_eq!(found.params["two"], "");
    }

    #[test]
    fn into_routes_yields_every_pattern() {
        let mut tree = Tree::new();
        for (i, route) in ["/users/:id", "/users", "/é", "/è"].into_iter().enumerate() {
            tree.insert(route, i).unwrap();
        }

        let mut routes = tree.into_routes();
        routes.sort();
        assert_eq!(
            routes,
            [
                ("/users".to_owned(), 1),
                ("/users/:id".to_owned(), 0),
                ("/è".to_owned(), 3),
                ("/é".to_owned(), 2),
            ]
        );
    }

    #[test]
    fn unmatched_key_becomes_new_edge() {
        let mut tree = Tree::new();
        tree.insert("/a", 1).unwrap();
        tree.insert("b", 2).unwrap();
        assert_eq!(labels(tree.root()), ["/a", "b"]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.size(), 3);
    }

    #[test]
    fn key_ending_inside_label_splits_edge() {
        let mut tree = Tree::new();
        tree.insert("/test", 1).unwrap();
        tree.insert("/te", 2).unwrap();

        assert_eq!(labels(tree.root()), ["/te"]);
        let short = tree.root().edges()[0].node();
        assert_eq!(short.handler(), Some(&2));
        assert_eq!(short.depth(), 1);
        assert_eq!(labels(short), ["st"]);

        let long = short.edges()[0].node();
        assert_eq!(long.handler(), Some(&1));
        assert_eq!(long.depth(), 2);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.size(), 5);
    }

    #[test]
    fn diverging_key_creates_intermediate_node() {
        let mut tree = Tree::new();
        tree.insert("/team", 1).unwrap();
        tree.insert("/test", 2).unwrap();

        assert_eq!(labels(tree.root()), ["/te"]);
        let branch = tree.root().edges()[0].node();
        assert!(branch.handler().is_none());
        assert_eq!(labels(branch), ["am", "st"]);
        assert_eq!(branch.edges()[0].node().depth(), 2);
        assert_eq!(branch.edges()[1].node().depth(), 2);
        assert_eq!(tree.size(), 5 + 2);
    }

    #[test]
    fn priority_counts_traversals() {
        let mut tree = Tree::new();
        tree.insert("/team", 1).unwrap();
        tree.insert("/test", 2).unwrap();
        tree.insert("/tests", 3).unwrap();

        let branch = tree.root().edges()[0].node();
        assert_eq!(branch.priority(), 2);
        // The moved "/team" subtree keeps the count it had before the split.
        assert_eq!(branch.edges()[0].node().priority(), 0);
        assert_eq!(branch.edges()[1].node().priority(), 1);
    }

    #[test]
    fn shared_placeholder_token_is_compressed() {
        let mut tree = Tree::new();
        tree.insert("/params/:one/:two", 1).unwrap();
        tree.insert("/params/:one/fixed/:two", 2).unwrap();

        assert_eq!(labels(tree.root()), ["/params/:one/"]);
        assert_eq!(labels(tree.root().edges()[0].node()), [":two", "fixed/:two"]);
    }

    #[test]
    fn placeholder_name_mismatch_is_a_conflict() {
        let mut tree = Tree::new();
        tree.insert("/users/:id", 1).unwrap();

        let err = tree.insert("/users/:name", 2).unwrap_err();
        assert_eq!(err, InsertError::Conflict { with: "/users/:id".to_owned() });

        let err = tree.insert("/users/:idx", 3).unwrap_err();
        assert_eq!(err, InsertError::Conflict { with: "/users/:id".to_owned() });

        tree.insert("/users/:id/posts", 4).unwrap();
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn empty_pattern_is_rejected() {
        let mut tree = Tree::new();
        assert_eq!(tree.insert("", ()), Err(InsertError::EmptyPattern));
        assert!(tree.is_empty());
    }

    #[test]
    fn lookup_binds_multiple_captures_in_one_label() {
        let mut tree = Tree::new();
        tree.insert("/:a/:b", 1).unwrap();

        let found = tree.lookup("/one-x/two").unwrap();
        assert_eq!(found.params.len(), 2);
        assert_eq!(found.params["a"], "one-x");
        assert_eq!(found.params["b"], "two");
        assert_eq!(tree.root().edges().len(), 1);
    }

    #[test]
    fn capture_inside_a_segment() {
        let mut tree = Tree::new();
        tree.insert("/user_:name", 1).unwrap();

        let found = tree.lookup("/user_alice").unwrap();
        assert_eq!(found.params["name"], "alice");
        assert!(tree.lookup("/admin_alice").is_none());
    }

    #[test]
    fn custom_syntax_markers() {
        let config = Config::default().placeholder(b'$').delimiter(b'.');
        let mut tree = Tree::with_config(config);
        tree.insert("api.$version.users", "users").unwrap();

        let found = tree.lookup("api.v2.users").unwrap();
        assert_eq!(*found.handler, "users");
        assert_eq!(found.params["version"], "v2");
        assert!(tree.lookup("api/v2/users").is_none());
    }

    #[test]
    fn empty_path_never_matches() {
        let mut tree = Tree::new();
        tree.insert("/", 0).unwrap();
        assert!(tree.lookup("").is_none());
    }
}
